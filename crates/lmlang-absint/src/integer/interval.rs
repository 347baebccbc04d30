//! Integer Interval domain: independent signed and unsigned halves.
//!
//! Grounded on `original_source/lib/IntegerInterval.h`: separate
//! `bottom`/`top` flags and `from`/`to` endpoints for the signed and
//! unsigned interpretations of the same bit pattern, concretizing as their
//! *intersection*.

use crate::predicate::{FourValued, Predicate};

fn umask(width: u32) -> u128 {
    if width >= 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

fn signed_min_value(width: u32) -> i128 {
    -(1i128 << (width - 1))
}

fn signed_max_value(width: u32) -> i128 {
    (1i128 << (width - 1)) - 1
}

/// One half of the interval (either the signed or the unsigned reading).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Half {
    pub bottom: bool,
    pub top: bool,
    pub from: i128,
    pub to: i128,
}

impl Half {
    fn bottom_half() -> Half {
        Half { bottom: true, top: false, from: 0, to: 0 }
    }

    fn top_half(lo: i128, hi: i128) -> Half {
        Half { bottom: false, top: true, from: lo, to: hi }
    }

    fn constant(v: i128) -> Half {
        Half { bottom: false, top: false, from: v, to: v }
    }

    fn join(&mut self, other: &Half) {
        if self.bottom {
            *self = *other;
            return;
        }
        if other.bottom {
            return;
        }
        self.top = self.top || other.top;
        self.from = self.from.min(other.from);
        self.to = self.to.max(other.to);
    }

    fn meet(&mut self, other: &Half) {
        if self.bottom || other.bottom {
            *self = Half::bottom_half();
            return;
        }
        self.top = self.top && other.top;
        self.from = self.from.max(other.from);
        self.to = self.to.min(other.to);
        if self.from > self.to {
            *self = Half::bottom_half();
        }
    }

    fn widen(&mut self, other: &Half, lo_bound: i128, hi_bound: i128) {
        if self.bottom {
            *self = *other;
            return;
        }
        if other.bottom {
            return;
        }
        // Keep the endpoint stable if it did not move; otherwise jump to
        // the domain's infinity sentinel, per spec §4.10.
        if other.from < self.from {
            self.from = lo_bound;
        }
        if other.to > self.to {
            self.to = hi_bound;
        }
        self.top = self.top || other.top;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    width: u32,
    signed: Half,
    unsigned: Half,
}

impl Interval {
    pub fn bottom(width: u32) -> Interval {
        Interval { width, signed: Half::bottom_half(), unsigned: Half::bottom_half() }
    }

    pub fn top(width: u32) -> Interval {
        Interval {
            width,
            signed: Half::top_half(signed_min_value(width), signed_max_value(width)),
            unsigned: Half::top_half(0, umask(width) as i128),
        }
    }

    pub fn singleton(width: u32, bits: u64) -> Interval {
        let bits = (bits as u128) & umask(width);
        let signed_v = if width < 128 && bits & (1u128 << (width - 1)) != 0 {
            (bits as i128) - (1i128 << width)
        } else {
            bits as i128
        };
        Interval {
            width,
            signed: Half::constant(signed_v),
            unsigned: Half::constant(bits as i128),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_bottom(&self) -> bool {
        self.signed.bottom && self.unsigned.bottom
    }

    pub fn is_top(&self) -> bool {
        self.signed.top && self.unsigned.top
    }

    pub fn signed_half(&self) -> &Half {
        &self.signed
    }

    pub fn unsigned_half(&self) -> &Half {
        &self.unsigned
    }

    pub fn is_constant(&self) -> bool {
        !self.signed.bottom && self.signed.from == self.signed.to
    }

    pub fn join(&mut self, other: &Interval) {
        self.signed.join(&other.signed);
        self.unsigned.join(&other.unsigned);
    }

    pub fn meet(&mut self, other: &Interval) {
        self.signed.meet(&other.signed);
        self.unsigned.meet(&other.unsigned);
    }

    pub fn widen(&mut self, other: &Interval) {
        self.signed.widen(&other.signed, signed_min_value(self.width), signed_max_value(self.width));
        self.unsigned.widen(&other.unsigned, 0, umask(self.width) as i128);
    }

    fn binop_signed(
        &self,
        other: &Interval,
        f: impl Fn(i128, i128) -> i128,
    ) -> Half {
        if self.signed.bottom || other.signed.bottom {
            return Half::bottom_half();
        }
        let lo = f(self.signed.from, other.signed.from);
        let hi = f(self.signed.to, other.signed.to);
        let (lo, hi) = (lo.min(hi), lo.max(hi));
        let overflow = lo < signed_min_value(self.width) || hi > signed_max_value(self.width);
        if overflow {
            Half::top_half(signed_min_value(self.width), signed_max_value(self.width))
        } else {
            Half { bottom: false, top: self.signed.top || other.signed.top, from: lo, to: hi }
        }
    }

    fn binop_unsigned(&self, other: &Interval, f: impl Fn(i128, i128) -> i128) -> Half {
        if self.unsigned.bottom || other.unsigned.bottom {
            return Half::bottom_half();
        }
        let lo = f(self.unsigned.from, other.unsigned.from);
        let hi = f(self.unsigned.to, other.unsigned.to);
        let (lo, hi) = (lo.min(hi), lo.max(hi));
        let max = umask(self.width) as i128;
        let overflow = lo < 0 || hi > max;
        if overflow {
            Half::top_half(0, max)
        } else {
            Half { bottom: false, top: self.unsigned.top || other.unsigned.top, from: lo, to: hi }
        }
    }

    pub fn add(&self, other: &Interval) -> Interval {
        Interval {
            width: self.width,
            signed: self.binop_signed(other, |a, b| a + b),
            unsigned: self.binop_unsigned(other, |a, b| a + b),
        }
    }

    pub fn sub(&self, other: &Interval) -> Interval {
        Interval {
            width: self.width,
            signed: self.binop_signed(other, |a, b| a - b),
            unsigned: self.binop_unsigned(other, |a, b| a - b),
        }
    }

    pub fn mul(&self, other: &Interval) -> Interval {
        let signed = if self.signed.bottom || other.signed.bottom {
            Half::bottom_half()
        } else {
            let candidates = [
                self.signed.from * other.signed.from,
                self.signed.from * other.signed.to,
                self.signed.to * other.signed.from,
                self.signed.to * other.signed.to,
            ];
            let lo = *candidates.iter().min().unwrap();
            let hi = *candidates.iter().max().unwrap();
            if lo < signed_min_value(self.width) || hi > signed_max_value(self.width) {
                Half::top_half(signed_min_value(self.width), signed_max_value(self.width))
            } else {
                Half { bottom: false, top: self.signed.top || other.signed.top, from: lo, to: hi }
            }
        };
        let unsigned = if self.unsigned.bottom || other.unsigned.bottom {
            Half::bottom_half()
        } else {
            let lo = self.unsigned.from * other.unsigned.from;
            let hi = self.unsigned.to * other.unsigned.to;
            let max = umask(self.width) as i128;
            if hi > max {
                Half::top_half(0, max)
            } else {
                Half {
                    bottom: false,
                    top: self.unsigned.top || other.unsigned.top,
                    from: lo,
                    to: hi,
                }
            }
        };
        Interval { width: self.width, signed, unsigned }
    }

    pub fn udiv(&self, other: &Interval) -> Interval {
        if other.unsigned.bottom || (other.unsigned.from == 0 && other.unsigned.to == 0) {
            return Interval::top(self.width);
        }
        let divisor_lo = other.unsigned.from.max(1);
        let unsigned = if self.unsigned.bottom {
            Half::bottom_half()
        } else {
            Half {
                bottom: false,
                top: false,
                from: self.unsigned.from / other.unsigned.to.max(1),
                to: self.unsigned.to / divisor_lo,
            }
        };
        Interval { width: self.width, signed: Half::top_half(signed_min_value(self.width), signed_max_value(self.width)), unsigned }
    }

    pub fn sdiv(&self, other: &Interval) -> Interval {
        if other.signed.bottom || (other.signed.from <= 0 && other.signed.to >= 0) {
            return Interval::top(self.width);
        }
        let candidates = [
            self.signed.from / other.signed.from,
            self.signed.from / other.signed.to,
            self.signed.to / other.signed.from,
            self.signed.to / other.signed.to,
        ];
        let lo = *candidates.iter().min().unwrap();
        let hi = *candidates.iter().max().unwrap();
        Interval {
            width: self.width,
            signed: Half { bottom: false, top: false, from: lo, to: hi },
            unsigned: Half::top_half(0, umask(self.width) as i128),
        }
    }

    /// Repository policy (ground: `urem_any_result` in `IntegerInterval.h`):
    /// if the divisor's magnitude always exceeds the dividend's, the
    /// dividend passes through unchanged; otherwise the result is bounded
    /// by `[0, |max divisor| - 1]`.
    pub fn urem(&self, other: &Interval) -> Interval {
        if other.unsigned.bottom {
            return Interval::bottom(self.width);
        }
        let max_divisor = other.unsigned.to;
        if max_divisor == 0 {
            return Interval::top(self.width);
        }
        if self.unsigned.to < other.unsigned.from && other.unsigned.from > 0 {
            return self.clone();
        }
        Interval {
            width: self.width,
            signed: Half::top_half(signed_min_value(self.width), signed_max_value(self.width)),
            unsigned: Half { bottom: false, top: false, from: 0, to: (max_divisor - 1).max(0) },
        }
    }

    /// Signed remainder policy, ground: `srem_any_result`. Bounded by the
    /// larger-magnitude divisor, sign-matching the dividend.
    pub fn srem(&self, other: &Interval) -> Interval {
        if other.signed.bottom {
            return Interval::bottom(self.width);
        }
        let max_divisor_mag = other.signed.from.unsigned_abs().max(other.signed.to.unsigned_abs()) as i128;
        if max_divisor_mag == 0 {
            return Interval::top(self.width);
        }
        let min_divisor_mag = other.signed.from.unsigned_abs().min(other.signed.to.unsigned_abs());
        if self.signed.to.unsigned_abs() < min_divisor_mag && self.signed.from.unsigned_abs() < min_divisor_mag {
            return self.clone();
        }
        let bound = max_divisor_mag - 1;
        Interval {
            width: self.width,
            signed: Half { bottom: false, top: false, from: -bound, to: bound },
            unsigned: Half::top_half(0, umask(self.width) as i128),
        }
    }

    pub fn shl(&self, other: &Interval) -> Interval {
        if other.is_constant() {
            let shift = other.unsigned.from;
            if shift < self.width as i128 {
                return self.binop_const_shift(|v| v << shift);
            }
        }
        Interval::top(self.width)
    }

    pub fn lshr(&self, other: &Interval) -> Interval {
        if other.is_constant() {
            let shift = other.unsigned.from;
            if shift < self.width as i128 {
                let unsigned = Half {
                    bottom: self.unsigned.bottom,
                    top: self.unsigned.top,
                    from: self.unsigned.from >> shift,
                    to: self.unsigned.to >> shift,
                };
                return Interval {
                    width: self.width,
                    signed: Half::top_half(signed_min_value(self.width), signed_max_value(self.width)),
                    unsigned,
                };
            }
        }
        Interval::top(self.width)
    }

    pub fn ashr(&self, other: &Interval) -> Interval {
        if other.is_constant() {
            let shift = other.unsigned.from;
            if shift < self.width as i128 {
                let signed = Half {
                    bottom: self.signed.bottom,
                    top: self.signed.top,
                    from: self.signed.from >> shift,
                    to: self.signed.to >> shift,
                };
                return Interval {
                    width: self.width,
                    signed,
                    unsigned: Half::top_half(0, umask(self.width) as i128),
                };
            }
        }
        Interval::top(self.width)
    }

    fn binop_const_shift(&self, f: impl Fn(i128) -> i128) -> Interval {
        let unsigned = Half {
            bottom: self.unsigned.bottom,
            top: self.unsigned.top,
            from: f(self.unsigned.from) & umask(self.width) as i128,
            to: f(self.unsigned.to) & umask(self.width) as i128,
        };
        Interval { width: self.width, signed: Half::top_half(signed_min_value(self.width), signed_max_value(self.width)), unsigned }
    }

    /// Bitwise ops are `top` unless both sides are single constants.
    pub fn and(&self, other: &Interval) -> Interval {
        self.bitwise_exact_or_top(other, |a, b| a & b)
    }

    pub fn or(&self, other: &Interval) -> Interval {
        self.bitwise_exact_or_top(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &Interval) -> Interval {
        self.bitwise_exact_or_top(other, |a, b| a ^ b)
    }

    fn bitwise_exact_or_top(&self, other: &Interval, f: impl Fn(u128, u128) -> u128) -> Interval {
        if self.is_constant() && other.is_constant() {
            let a = self.unsigned.from as u128;
            let b = other.unsigned.from as u128;
            Interval::singleton(self.width, f(a, b) as u64)
        } else {
            Interval::top(self.width)
        }
    }

    pub fn icmp(&self, other: &Interval, pred: Predicate) -> FourValued {
        match pred {
            Predicate::Eq => {
                if self.is_constant() && other.is_constant() && self.signed.from == other.signed.from {
                    FourValued::MustTrue
                } else if self.signed.to < other.signed.from || self.signed.from > other.signed.to
                {
                    FourValued::MustFalse
                } else {
                    FourValued::Unknown
                }
            }
            Predicate::Ne => match self.icmp(other, Predicate::Eq) {
                FourValued::MustTrue => FourValued::MustFalse,
                FourValued::MustFalse => FourValued::MustTrue,
                other => other,
            },
            Predicate::SLt => cmp_halves(self.signed.from, self.signed.to, other.signed.from, other.signed.to, false, false),
            Predicate::SLe => cmp_halves(self.signed.from, self.signed.to, other.signed.from, other.signed.to, true, false),
            Predicate::SGt => cmp_halves(self.signed.from, self.signed.to, other.signed.from, other.signed.to, false, true),
            Predicate::SGe => cmp_halves(self.signed.from, self.signed.to, other.signed.from, other.signed.to, true, true),
            Predicate::ULt => cmp_halves(self.unsigned.from, self.unsigned.to, other.unsigned.from, other.unsigned.to, false, false),
            Predicate::ULe => cmp_halves(self.unsigned.from, self.unsigned.to, other.unsigned.from, other.unsigned.to, true, false),
            Predicate::UGt => cmp_halves(self.unsigned.from, self.unsigned.to, other.unsigned.from, other.unsigned.to, false, true),
            Predicate::UGe => cmp_halves(self.unsigned.from, self.unsigned.to, other.unsigned.from, other.unsigned.to, true, true),
        }
    }

    pub fn trunc(&self, new_width: u32) -> Interval {
        if self.is_constant() {
            Interval::singleton(new_width, self.unsigned.from as u64)
        } else {
            Interval::top(new_width)
        }
    }

    pub fn zext(&self, new_width: u32) -> Interval {
        Interval {
            width: new_width,
            signed: self.unsigned,
            unsigned: self.unsigned,
        }
    }

    pub fn sext(&self, new_width: u32) -> Interval {
        Interval { width: new_width, signed: self.signed, unsigned: self.signed }
    }
}

fn cmp_halves(alo: i128, ahi: i128, blo: i128, bhi: i128, or_eq: bool, swap: bool) -> FourValued {
    let (alo, ahi, blo, bhi) = if swap { (blo, bhi, alo, ahi) } else { (alo, ahi, blo, bhi) };
    if or_eq {
        if ahi <= blo {
            FourValued::MustTrue
        } else if alo > bhi {
            FourValued::MustFalse
        } else {
            FourValued::Unknown
        }
    } else if ahi < blo {
        FourValued::MustTrue
    } else if alo >= bhi {
        FourValued::MustFalse
    } else {
        FourValued::Unknown
    }
}
