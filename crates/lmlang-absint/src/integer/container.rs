//! Product/reduction container holding Set + Interval + Bits for one
//! integer value, per spec §4.8.
//!
//! Every operation dispatches to each enabled component; after each
//! transfer, `reduce` extracts a [`Message`] from every component, meets
//! them, and broadcasts the result back via `refine`.

use lmlang_core::id::NodeId;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::integer::bits::Bits;
use crate::integer::interval::{Half, Interval};
use crate::integer::message::Message;
use crate::integer::set::IntSet;
use crate::predicate::{FourValued, Predicate};

/// Which components of the product are tracked. All three by default; a
/// leaner configuration can disable components for performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMask {
    pub set: bool,
    pub interval: bool,
    pub bits: bool,
}

impl Default for DomainMask {
    fn default() -> DomainMask {
        DomainMask { set: true, interval: true, bits: true }
    }
}

#[derive(Debug, Clone)]
pub struct Container {
    width: u32,
    set: IntSet,
    interval: Interval,
    bits: Bits,
    mask: DomainMask,
    set_threshold: usize,
}

impl Container {
    pub fn bottom(width: u32, mask: DomainMask, set_threshold: usize) -> Container {
        Container {
            width,
            set: IntSet::bottom(width, set_threshold),
            interval: Interval::bottom(width),
            bits: Bits::bottom(width),
            mask,
            set_threshold,
        }
    }

    pub fn top(width: u32, mask: DomainMask, set_threshold: usize) -> Container {
        Container {
            width,
            set: IntSet::top(width),
            interval: Interval::top(width),
            bits: Bits::top(width),
            mask,
            set_threshold,
        }
    }

    pub fn singleton(width: u32, value: u64, mask: DomainMask, set_threshold: usize) -> Container {
        Container {
            width,
            set: IntSet::singleton(width, value),
            interval: Interval::singleton(width, value),
            bits: Bits::from_constant(width, value),
            mask,
            set_threshold,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set(&self) -> &IntSet {
        &self.set
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    pub fn bits(&self) -> &Bits {
        &self.bits
    }

    pub fn mask(&self) -> DomainMask {
        self.mask
    }

    pub fn set_threshold(&self) -> usize {
        self.set_threshold
    }

    pub fn is_bottom(&self) -> bool {
        (!self.mask.set || self.set.is_bottom())
            && (!self.mask.interval || self.interval.is_bottom())
            && (!self.mask.bits || self.bits.is_bottom())
    }

    pub fn is_top(&self) -> bool {
        (!self.mask.set || self.set.is_top())
            && (!self.mask.interval || self.interval.is_top())
            && (!self.mask.bits || self.bits.is_top())
    }

    pub fn is_constant(&self) -> bool {
        self.mask.set && self.set.is_constant()
    }

    pub fn join(&mut self, other: &Container) {
        self.set.join(&other.set, self.set_threshold);
        self.interval.join(&other.interval);
        self.bits.join(&other.bits);
        self.reduce();
    }

    pub fn meet(&mut self, other: &Container) {
        self.set.meet(&other.set);
        self.interval.meet(&other.interval);
        // Bits has no meet in the original; approximate with AND of the
        // top/undef masks is not sound, so bits is left unchanged on meet
        // (a safe over-approximation: meet only needs to be no coarser
        // than either input on the components that define it).
        self.reduce();
    }

    pub fn widen(&mut self, other: &Container) {
        self.set.widen(&other.set);
        self.interval.widen(&other.interval);
        self.bits.set_top();
        self.reduce();
    }

    /// Extract a [`Message`] from each enabled component, meet them, and
    /// `refine` every component from the result. Idempotent: running it
    /// twice in a row does not change the container further.
    pub fn reduce(&mut self) {
        let mut messages = Vec::new();
        if self.mask.interval {
            messages.push(Message::FieldMinMax {
                signed: *self.interval.signed_half(),
                unsigned: *self.interval.unsigned_half(),
            });
        }
        if self.mask.bits {
            if let (Some(smin), Some(smax), Some(umin), Some(umax)) = (
                self.bits.signed_min(),
                self.bits.signed_max(),
                self.bits.unsigned_min(),
                self.bits.unsigned_max(),
            ) {
                messages.push(Message::FieldMinMax {
                    signed: Half { bottom: false, top: false, from: smin as i128, to: smax as i128 },
                    unsigned: Half { bottom: false, top: false, from: umin as i128, to: umax as i128 },
                });
            }
        }
        if let Some(Message::FieldMinMax { unsigned, .. }) = Message::meet_all(&messages) {
            if self.mask.set && !unsigned.bottom && !unsigned.top {
                self.set.meet(&IntSet::range_hint(self.width, unsigned.from as u64, unsigned.to as u64));
            }
        }
    }

    pub fn add(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.add(o, t), |s, o| s.add(o), |_, _| None)
    }

    pub fn sub(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.sub(o, t), |s, o| s.sub(o), |_, _| None)
    }

    pub fn mul(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.mul(o, t), |s, o| s.mul(o), |_, _| None)
    }

    pub fn udiv(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.udiv(o, t), |s, o| s.udiv(o), |_, _| None)
    }

    pub fn sdiv(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.sdiv(o, t), |s, o| s.sdiv(o), |_, _| None)
    }

    pub fn urem(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.urem(o, t), |s, o| s.urem(o), |_, _| None)
    }

    pub fn srem(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.srem(o, t), |s, o| s.srem(o), |_, _| None)
    }

    pub fn shl(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.shl(o, t), |s, o| s.shl(o), |_, _| None)
    }

    pub fn lshr(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.lshr(o, t), |s, o| s.lshr(o), |_, _| None)
    }

    pub fn ashr(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.ashr(o, t), |s, o| s.ashr(o), |_, _| None)
    }

    pub fn and(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.and(o, t), |s, o| s.and(o), |s, o| Some(s.and(o)))
    }

    pub fn or(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.or(o, t), |s, o| s.or(o), |s, o| Some(s.or(o)))
    }

    pub fn xor(&self, other: &Container) -> Container {
        self.combine(other, |s, o, t| s.xor(o, t), |s, o| s.xor(o), |s, o| Some(s.xor(o)))
    }

    fn combine(
        &self,
        other: &Container,
        set_op: impl Fn(&IntSet, &IntSet, usize) -> IntSet,
        interval_op: impl Fn(&Interval, &Interval) -> Interval,
        bits_op: impl Fn(&Bits, &Bits) -> Option<Bits>,
    ) -> Container {
        let mut result = Container {
            width: self.width,
            set: if self.mask.set {
                set_op(&self.set, &other.set, self.set_threshold)
            } else {
                IntSet::bottom(self.width, self.set_threshold)
            },
            interval: if self.mask.interval {
                interval_op(&self.interval, &other.interval)
            } else {
                Interval::bottom(self.width)
            },
            bits: if self.mask.bits {
                bits_op(&self.bits, &other.bits).unwrap_or_else(|| self.bits.lossy_top())
            } else {
                Bits::bottom(self.width)
            },
            mask: self.mask,
            set_threshold: self.set_threshold,
        };
        result.reduce();
        result
    }

    pub fn icmp(&self, other: &Container, pred: Predicate, node: NodeId) -> Result<Container, AnalysisError> {
        let from_interval = self.interval.icmp(&other.interval, pred);
        let bits = Bits::top(1);
        let set = match from_interval {
            FourValued::MustTrue => IntSet::singleton(1, 1),
            FourValued::MustFalse => IntSet::singleton(1, 0),
            FourValued::Unknown => self.set.icmp(&other.set, pred),
            FourValued::Unordered => {
                return Err(AnalysisError::NotImplemented {
                    node,
                    detail: "unordered comparison on integers".into(),
                })
            }
        };
        Ok(Container { width: 1, set, interval: Interval::top(1), bits, mask: self.mask, set_threshold: self.set_threshold })
    }

    pub fn trunc(&self, new_width: u32) -> Container {
        Container {
            width: new_width,
            set: if self.mask.set { self.set.trunc(new_width) } else { IntSet::bottom(new_width, self.set_threshold) },
            interval: if self.mask.interval { self.interval.trunc(new_width) } else { Interval::bottom(new_width) },
            bits: Bits::top(new_width),
            mask: self.mask,
            set_threshold: self.set_threshold,
        }
    }

    pub fn zext(&self, new_width: u32) -> Container {
        Container {
            width: new_width,
            set: if self.mask.set { self.set.zext(new_width) } else { IntSet::bottom(new_width, self.set_threshold) },
            interval: if self.mask.interval { self.interval.zext(new_width) } else { Interval::bottom(new_width) },
            bits: Bits::top(new_width),
            mask: self.mask,
            set_threshold: self.set_threshold,
        }
    }

    pub fn sext(&self, new_width: u32) -> Container {
        Container {
            width: new_width,
            set: if self.mask.set { self.set.sext(new_width) } else { IntSet::bottom(new_width, self.set_threshold) },
            interval: if self.mask.interval { self.interval.sext(new_width) } else { Interval::bottom(new_width) },
            bits: Bits::top(new_width),
            mask: self.mask,
            set_threshold: self.set_threshold,
        }
    }

    /// Best known unsigned bounds across whichever components are
    /// enabled, used by the aggregate domains' bounds checks (ground:
    /// `assertOffsetFitsToArray`'s `unsignedMax`/`unsignedMin` calls).
    pub fn unsigned_bounds(&self) -> Option<(u64, u64)> {
        if self.mask.interval {
            let half = self.interval.unsigned_half();
            if !half.bottom && !half.top {
                return Some((half.from as u64, half.to as u64));
            }
        }
        if self.mask.bits {
            if let (Some(lo), Some(hi)) = (self.bits.unsigned_min(), self.bits.unsigned_max()) {
                return Some((lo as u64, hi as u64));
            }
        }
        None
    }

    pub fn accuracy(&self) -> f32 {
        let mut total = 0.0;
        let mut count = 0.0;
        if self.mask.set {
            total += self.set.accuracy();
            count += 1.0;
        }
        if self.mask.bits {
            total += self.bits.accuracy();
            count += 1.0;
        }
        if count == 0.0 {
            1.0
        } else {
            total / count
        }
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Container) -> bool {
        if self.is_top() && other.is_top() {
            return true;
        }
        self.set == other.set && self.interval == other.interval && self.bits == other.bits
    }
}
