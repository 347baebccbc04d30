//! String trie domain: a prefix tree over possible byte-array contents
//! (spec §4.7).
//!
//! Grounded on `original_source/lib/ArrayStringTrie.cpp`. A `TrieNode`
//! holds one byte value plus an ordered set of children; a path from the
//! root to a leaf is one possible string. `join` only implements the
//! cases the original implements (`top`/`bottom` absorption, cloning into
//! an empty trie); merging two genuinely different non-trivial tries is
//! left as `NotImplemented`, matching the original's own
//! `CANAL_NOT_IMPLEMENTED()` for that case.

use std::collections::BTreeSet;

use lmlang_core::id::NodeId;

use crate::error::AnalysisError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrieNode {
    pub byte: u8,
    pub children: BTreeSet<TrieNode>,
}

impl TrieNode {
    fn leaf(byte: u8) -> TrieNode {
        TrieNode { byte, children: BTreeSet::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTrie {
    is_bottom: bool,
    /// `None` root with `is_bottom == false` means `top` (ground:
    /// `StringTrie::isTop` — `!mIsBottom && mRoot == NULL`).
    root: Option<TrieNode>,
}

impl StringTrie {
    pub fn bottom() -> StringTrie {
        StringTrie { is_bottom: true, root: None }
    }

    /// Ground: the default constructor sets top unless the element type
    /// is `int8`, matching the byte-oriented nature of this domain.
    pub fn top() -> StringTrie {
        StringTrie { is_bottom: false, root: None }
    }

    /// Ground: the byte-constant-run constructor. Stops at the first
    /// non-constant or zero byte, building a single linear path.
    pub fn from_byte_run(bytes: &[u8]) -> StringTrie {
        let run: Vec<u8> = bytes.iter().take_while(|&&b| b != 0).copied().collect();
        StringTrie::from_literal(&run)
    }

    /// Ground: the literal-string constructor — builds one exact path.
    pub fn from_literal(bytes: &[u8]) -> StringTrie {
        let mut root: Option<TrieNode> = None;
        for &b in bytes.iter().rev() {
            let mut node = TrieNode::leaf(b);
            if let Some(child) = root.take() {
                node.children.insert(child);
            }
            root = Some(node);
        }
        StringTrie { is_bottom: false, root }
    }

    pub fn is_bottom(&self) -> bool {
        self.is_bottom
    }

    pub fn is_top(&self) -> bool {
        !self.is_bottom && self.root.is_none()
    }

    pub fn set_top(&mut self) {
        self.is_bottom = false;
        self.root = None;
    }

    /// Ground: `StringTrie::join`. `top.join(_) = top`; a bottom operand
    /// is a no-op; joining into a bottom trie clones the other; any other
    /// combination of two real, distinct tries is not implemented.
    pub fn join(&mut self, other: &StringTrie, node: NodeId) -> Result<(), AnalysisError> {
        if self.is_top() {
            return Ok(());
        }
        if other.is_bottom {
            return Ok(());
        }
        if other.is_top() {
            self.set_top();
            return Ok(());
        }
        if self.is_bottom {
            self.is_bottom = false;
            self.root = other.root.clone();
            return Ok(());
        }
        if self.root == other.root {
            return Ok(());
        }
        Err(AnalysisError::NotImplemented {
            node,
            detail: "joining two distinct non-trivial string tries".into(),
        })
    }

    pub fn meet(&mut self, _other: &StringTrie, node: NodeId) -> Result<(), AnalysisError> {
        Err(AnalysisError::NotImplemented { node, detail: "StringTrie::meet".into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_absorbs_anything_on_join() {
        let mut a = StringTrie::top();
        let b = StringTrie::from_literal(b"hi");
        a.join(&b, NodeId(0)).unwrap();
        assert!(a.is_top());
    }

    #[test]
    fn joining_into_bottom_clones_the_other() {
        let mut a = StringTrie::bottom();
        let b = StringTrie::from_literal(b"hi");
        a.join(&b, NodeId(0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn joining_two_distinct_tries_is_not_implemented() {
        let mut a = StringTrie::from_literal(b"hi");
        let b = StringTrie::from_literal(b"bye");
        assert!(a.join(&b, NodeId(0)).is_err());
    }
}
