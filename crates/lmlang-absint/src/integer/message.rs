//! Reduction messages exchanged between integer domain components.
//!
//! A closed sum type per spec §9's REDESIGN FLAG ("new messages require a
//! single place to extend"). Currently one variant: the signed/unsigned
//! bounds a component can contribute toward tightening its siblings.

use crate::integer::interval::Half;

/// A canonical summary a product component can `extract` and other
/// components can `refine` themselves from.
#[derive(Debug, Clone)]
pub enum Message {
    FieldMinMax { signed: Half, unsigned: Half },
}

impl Message {
    /// Meet of several messages of the same kind, used by the product to
    /// combine every component's contribution before broadcasting.
    pub fn meet_all(messages: &[Message]) -> Option<Message> {
        let mut iter = messages.iter();
        let first = iter.next()?;
        let Message::FieldMinMax { mut signed, mut unsigned } = first.clone();
        for m in iter {
            let Message::FieldMinMax { signed: s, unsigned: u } = m;
            meet_half(&mut signed, s);
            meet_half(&mut unsigned, u);
        }
        Some(Message::FieldMinMax { signed, unsigned })
    }
}

fn meet_half(a: &mut Half, b: &Half) {
    if a.bottom || b.bottom {
        a.bottom = true;
        return;
    }
    a.top = a.top && b.top;
    a.from = a.from.max(b.from);
    a.to = a.to.min(b.to);
    if a.from > a.to {
        a.bottom = true;
    }
}
