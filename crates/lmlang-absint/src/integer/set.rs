//! Integer Set domain: a finite collection of concrete `w`-bit values.
//!
//! Grounded on `original_source/lib/IntegerSet.cpp` and `IntegerSet.h`: a
//! sorted set of concrete values in unsigned order, collapsing to `top`
//! once it grows past a threshold.

use std::collections::BTreeSet;

use crate::predicate::{FourValued, Predicate};

/// Mask of the low `width` bits of a `u64`.
fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

fn sign_bit(width: u32) -> u64 {
    1u64 << (width - 1)
}

/// Interpret the low `width` bits of `v` as a two's-complement signed value.
fn as_signed(v: u64, width: u32) -> i64 {
    let v = v & mask(width);
    if width < 64 && (v & sign_bit(width)) != 0 {
        (v | !mask(width)) as i64
    } else {
        v as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntSet {
    width: u32,
    values: BTreeSet<u64>,
    top: bool,
}

impl IntSet {
    pub fn bottom(width: u32, threshold: usize) -> IntSet {
        let _ = threshold;
        IntSet { width, values: BTreeSet::new(), top: false }
    }

    pub fn top(width: u32) -> IntSet {
        IntSet { width, values: BTreeSet::new(), top: true }
    }

    pub fn singleton(width: u32, value: u64) -> IntSet {
        let mut values = BTreeSet::new();
        values.insert(value & mask(width));
        IntSet { width, values, top: false }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_bottom(&self) -> bool {
        !self.top && self.values.is_empty()
    }

    pub fn is_top(&self) -> bool {
        self.top
    }

    pub fn values(&self) -> Option<&BTreeSet<u64>> {
        if self.top {
            None
        } else {
            Some(&self.values)
        }
    }

    pub fn is_constant(&self) -> bool {
        !self.top && self.values.len() == 1
    }

    /// Collapse to top once the set exceeds `threshold` distinct values.
    fn collapse_if_over(&mut self, threshold: usize) {
        if !self.top && self.values.len() > threshold {
            self.top = true;
            self.values.clear();
        }
    }

    pub fn join(&mut self, other: &IntSet, threshold: usize) {
        if self.top {
            return;
        }
        if other.top {
            self.set_top();
            return;
        }
        self.values.extend(other.values.iter().copied());
        self.collapse_if_over(threshold);
    }

    pub fn meet(&mut self, other: &IntSet) {
        if other.top {
            return;
        }
        if self.top {
            self.values = other.values.clone();
            self.top = false;
            return;
        }
        self.values = self.values.intersection(&other.values).copied().collect();
    }

    pub fn set_top(&mut self) {
        self.top = true;
        self.values.clear();
    }

    /// A set representing `[lo, hi]` for meeting against a refinement hint
    /// from another product component. Used only by `reduce` (§4.8); not a
    /// precise domain value, just a bound to intersect against. Ranges
    /// wider than the set threshold are represented as `top` (intersecting
    /// with top is a no-op, which is the safe choice when the hint is too
    /// coarse to be worth materializing).
    pub fn range_hint(width: u32, lo: u64, hi: u64) -> IntSet {
        let lo = lo & mask(width);
        let hi = hi & mask(width);
        if hi < lo || hi - lo > 256 {
            return IntSet::top(width);
        }
        IntSet { width, values: (lo..=hi).collect(), top: false }
    }

    pub fn set_bottom(&mut self) {
        self.top = false;
        self.values.clear();
    }

    pub fn accuracy(&self) -> f32 {
        if self.top {
            0.0
        } else if self.values.is_empty() {
            1.0
        } else {
            1.0 / self.values.len() as f32
        }
    }

    /// Pointwise Cartesian product over `self x other`, with overflow and
    /// threshold both collapsing to top.
    fn pointwise(
        &self,
        other: &IntSet,
        threshold: usize,
        op: impl Fn(u64, u64) -> Option<u64>,
    ) -> IntSet {
        if self.top || other.top {
            return IntSet::top(self.width);
        }
        let mut result = BTreeSet::new();
        for &a in &self.values {
            for &b in &other.values {
                match op(a, b) {
                    Some(v) => {
                        result.insert(v & mask(self.width));
                    }
                    None => return IntSet::top(self.width),
                }
            }
        }
        let mut out = IntSet { width: self.width, values: result, top: false };
        out.collapse_if_over(threshold);
        out
    }

    pub fn add(&self, other: &IntSet, threshold: usize) -> IntSet {
        self.pointwise(other, threshold, |a, b| Some(a.wrapping_add(b)))
    }

    pub fn sub(&self, other: &IntSet, threshold: usize) -> IntSet {
        self.pointwise(other, threshold, |a, b| Some(a.wrapping_sub(b)))
    }

    pub fn mul(&self, other: &IntSet, threshold: usize) -> IntSet {
        let w = self.width;
        self.pointwise(other, threshold, move |a, b| {
            let sa = as_signed(a, w) as i128;
            let sb = as_signed(b, w) as i128;
            let product = sa * sb;
            let min = -(1i128 << (w - 1));
            let max = (1i128 << (w - 1)) - 1;
            if product < min || product > max {
                None
            } else {
                Some(a.wrapping_mul(b) & mask(w))
            }
        })
    }

    pub fn udiv(&self, other: &IntSet, threshold: usize) -> IntSet {
        if other.top {
            return IntSet::top(self.width);
        }
        if !other.values.is_empty() && other.values.iter().all(|&v| v == 0) {
            return IntSet::top(self.width);
        }
        self.pointwise(other, threshold, |a, b| if b == 0 { None } else { Some(a / b) })
    }

    pub fn sdiv(&self, other: &IntSet, threshold: usize) -> IntSet {
        let w = self.width;
        if other.top {
            return IntSet::top(w);
        }
        if !other.values.is_empty() && other.values.iter().all(|&v| v == 0) {
            return IntSet::top(w);
        }
        self.pointwise(other, threshold, move |a, b| {
            if b == 0 {
                None
            } else {
                let sa = as_signed(a, w);
                let sb = as_signed(b, w);
                Some((sa.wrapping_div(sb)) as u64)
            }
        })
    }

    pub fn urem(&self, other: &IntSet, threshold: usize) -> IntSet {
        if other.top {
            return IntSet::top(self.width);
        }
        if !other.values.is_empty() && other.values.iter().all(|&v| v == 0) {
            return IntSet::top(self.width);
        }
        self.pointwise(other, threshold, |a, b| if b == 0 { None } else { Some(a % b) })
    }

    pub fn srem(&self, other: &IntSet, threshold: usize) -> IntSet {
        let w = self.width;
        if other.top {
            return IntSet::top(w);
        }
        if !other.values.is_empty() && other.values.iter().all(|&v| v == 0) {
            return IntSet::top(w);
        }
        self.pointwise(other, threshold, move |a, b| {
            if b == 0 {
                None
            } else {
                let sa = as_signed(a, w);
                let sb = as_signed(b, w);
                Some((sa.wrapping_rem(sb)) as u64)
            }
        })
    }

    pub fn shl(&self, other: &IntSet, threshold: usize) -> IntSet {
        self.pointwise(other, threshold, |a, b| {
            if b >= self.width as u64 {
                None
            } else {
                Some(a << b)
            }
        })
    }

    pub fn lshr(&self, other: &IntSet, threshold: usize) -> IntSet {
        self.pointwise(other, threshold, |a, b| {
            if b >= self.width as u64 {
                None
            } else {
                Some(a >> b)
            }
        })
    }

    pub fn ashr(&self, other: &IntSet, threshold: usize) -> IntSet {
        let w = self.width;
        self.pointwise(other, threshold, move |a, b| {
            if b >= w as u64 {
                None
            } else {
                Some((as_signed(a, w) >> b) as u64)
            }
        })
    }

    pub fn and(&self, other: &IntSet, threshold: usize) -> IntSet {
        self.pointwise(other, threshold, |a, b| Some(a & b))
    }

    pub fn or(&self, other: &IntSet, threshold: usize) -> IntSet {
        self.pointwise(other, threshold, |a, b| Some(a | b))
    }

    pub fn xor(&self, other: &IntSet, threshold: usize) -> IntSet {
        self.pointwise(other, threshold, |a, b| Some(a ^ b))
    }

    fn unsigned_bounds(&self) -> Option<(u64, u64)> {
        if self.top || self.values.is_empty() {
            return None;
        }
        Some((*self.values.iter().next().unwrap(), *self.values.iter().next_back().unwrap()))
    }

    fn signed_bounds(&self) -> Option<(i64, i64)> {
        if self.top || self.values.is_empty() {
            return None;
        }
        let (lo, hi) = self.values.iter().map(|&v| as_signed(v, self.width)).fold(
            (i64::MAX, i64::MIN),
            |(lo, hi), v| (lo.min(v), hi.max(v)),
        );
        Some((lo, hi))
    }

    /// `icmp(pred)`, truth tables verbatim from spec §4.2.
    pub fn icmp(&self, other: &IntSet, pred: Predicate) -> IntSet {
        if self.top || other.top {
            return IntSet::top(1);
        }
        let result = match pred {
            Predicate::Eq => {
                if self.is_constant() && other.is_constant() && self.values == other.values {
                    FourValued::MustTrue
                } else if self.values.is_disjoint(&other.values) {
                    FourValued::MustFalse
                } else {
                    FourValued::Unknown
                }
            }
            Predicate::Ne => {
                if self.values.is_disjoint(&other.values) {
                    FourValued::MustTrue
                } else if self.is_constant() && other.is_constant() && self.values == other.values
                {
                    FourValued::MustFalse
                } else {
                    FourValued::Unknown
                }
            }
            Predicate::ULt | Predicate::ULe | Predicate::UGt | Predicate::UGe => {
                match (self.unsigned_bounds(), other.unsigned_bounds()) {
                    (Some((alo, ahi)), Some((blo, bhi))) => {
                        unsigned_cmp_truth(pred, alo, ahi, blo, bhi)
                    }
                    _ => FourValued::Unknown,
                }
            }
            Predicate::SLt | Predicate::SLe | Predicate::SGt | Predicate::SGe => {
                match (self.signed_bounds(), other.signed_bounds()) {
                    (Some((alo, ahi)), Some((blo, bhi))) => {
                        signed_cmp_truth(pred, alo, ahi, blo, bhi)
                    }
                    _ => FourValued::Unknown,
                }
            }
        };
        from_truth(result)
    }

    pub fn trunc(&self, new_width: u32) -> IntSet {
        if self.top {
            return IntSet::top(new_width);
        }
        IntSet {
            width: new_width,
            values: self.values.iter().map(|&v| v & mask(new_width)).collect(),
            top: false,
        }
    }

    pub fn zext(&self, new_width: u32) -> IntSet {
        if self.top {
            return IntSet::top(new_width);
        }
        IntSet { width: new_width, values: self.values.clone(), top: false }
    }

    pub fn sext(&self, new_width: u32) -> IntSet {
        if self.top {
            return IntSet::top(new_width);
        }
        let w = self.width;
        IntSet {
            width: new_width,
            values: self
                .values
                .iter()
                .map(|&v| (as_signed(v, w) as u64) & mask(new_width))
                .collect(),
            top: false,
        }
    }

    /// Widening: "go to top" per spec §4.10's Set widening rule.
    pub fn widen(&mut self, _other: &IntSet) {
        self.set_top();
    }
}

fn from_truth(t: FourValued) -> IntSet {
    match t {
        FourValued::MustTrue => IntSet::singleton(1, 1),
        FourValued::MustFalse => IntSet::singleton(1, 0),
        FourValued::Unknown => {
            let mut v = BTreeSet::new();
            v.insert(0);
            v.insert(1);
            IntSet { width: 1, values: v, top: false }
        }
        FourValued::Unordered => IntSet::bottom(1, 0),
    }
}

fn unsigned_cmp_truth(pred: Predicate, alo: u64, ahi: u64, blo: u64, bhi: u64) -> FourValued {
    match pred {
        Predicate::ULt => {
            if ahi < blo {
                FourValued::MustTrue
            } else if alo >= bhi {
                FourValued::MustFalse
            } else {
                FourValued::Unknown
            }
        }
        Predicate::ULe => {
            if ahi <= blo {
                FourValued::MustTrue
            } else if alo > bhi {
                FourValued::MustFalse
            } else {
                FourValued::Unknown
            }
        }
        Predicate::UGt => {
            if alo > bhi {
                FourValued::MustTrue
            } else if ahi <= blo {
                FourValued::MustFalse
            } else {
                FourValued::Unknown
            }
        }
        Predicate::UGe => {
            if alo >= bhi {
                FourValued::MustTrue
            } else if ahi < blo {
                FourValued::MustFalse
            } else {
                FourValued::Unknown
            }
        }
        _ => unreachable!(),
    }
}

fn signed_cmp_truth(pred: Predicate, alo: i64, ahi: i64, blo: i64, bhi: i64) -> FourValued {
    match pred {
        Predicate::SLt => {
            if ahi < blo {
                FourValued::MustTrue
            } else if alo >= bhi {
                FourValued::MustFalse
            } else {
                FourValued::Unknown
            }
        }
        Predicate::SLe => {
            if ahi <= blo {
                FourValued::MustTrue
            } else if alo > bhi {
                FourValued::MustFalse
            } else {
                FourValued::Unknown
            }
        }
        Predicate::SGt => {
            if alo > bhi {
                FourValued::MustTrue
            } else if ahi <= blo {
                FourValued::MustFalse
            } else {
                FourValued::Unknown
            }
        }
        Predicate::SGe => {
            if alo >= bhi {
                FourValued::MustTrue
            } else if ahi < blo {
                FourValued::MustFalse
            } else {
                FourValued::Unknown
            }
        }
        _ => unreachable!(),
    }
}
