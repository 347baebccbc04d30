//! Floating-point interval domain (spec §4.5).
//!
//! Endpoint pair over an IEEE format with explicit tags for `bottom`,
//! `top`, and NaN-possibility. Storage is `f64` regardless of format,
//! matching the convention `lmlang_core::types::ConstValue::F32` already
//! uses (stored as `f64` internally to sidestep `Eq` on `f32`).

use serde::{Deserialize, Serialize};

use crate::predicate::FloatPredicate;
use crate::predicate::FourValued;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloatFormat {
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatInterval {
    format: FloatFormat,
    bottom: bool,
    top: bool,
    has_nan: bool,
    from: f64,
    to: f64,
}

impl FloatInterval {
    pub fn bottom(format: FloatFormat) -> FloatInterval {
        FloatInterval { format, bottom: true, top: false, has_nan: false, from: 0.0, to: 0.0 }
    }

    pub fn top(format: FloatFormat) -> FloatInterval {
        FloatInterval {
            format,
            bottom: false,
            top: true,
            has_nan: true,
            from: f64::NEG_INFINITY,
            to: f64::INFINITY,
        }
    }

    pub fn singleton(format: FloatFormat, value: f64) -> FloatInterval {
        if value.is_nan() {
            return FloatInterval { format, bottom: false, top: false, has_nan: true, from: f64::NAN, to: f64::NAN };
        }
        FloatInterval { format, bottom: false, top: false, has_nan: false, from: value, to: value }
    }

    pub fn format(&self) -> FloatFormat {
        self.format
    }

    pub fn is_bottom(&self) -> bool {
        self.bottom
    }

    pub fn is_top(&self) -> bool {
        self.top
    }

    pub fn has_nan(&self) -> bool {
        self.has_nan
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn join(&mut self, other: &FloatInterval) {
        if self.bottom {
            *self = *other;
            return;
        }
        if other.bottom {
            return;
        }
        self.top = self.top || other.top;
        self.has_nan = self.has_nan || other.has_nan;
        self.from = self.from.min(other.from);
        self.to = self.to.max(other.to);
    }

    pub fn meet(&mut self, other: &FloatInterval) {
        if self.bottom || other.bottom {
            *self = FloatInterval::bottom(self.format);
            return;
        }
        self.top = self.top && other.top;
        self.has_nan = self.has_nan && other.has_nan;
        self.from = self.from.max(other.from);
        self.to = self.to.min(other.to);
        if self.from > self.to {
            *self = FloatInterval::bottom(self.format);
        }
    }

    pub fn widen(&mut self, other: &FloatInterval) {
        if self.bottom {
            *self = *other;
            return;
        }
        if other.from < self.from {
            self.from = f64::NEG_INFINITY;
        }
        if other.to > self.to {
            self.to = f64::INFINITY;
        }
        self.has_nan = self.has_nan || other.has_nan;
    }

    fn binop(&self, other: &FloatInterval, f: impl Fn(f64, f64) -> f64) -> FloatInterval {
        if self.bottom || other.bottom {
            return FloatInterval::bottom(self.format);
        }
        let candidates =
            [f(self.from, other.from), f(self.from, other.to), f(self.to, other.from), f(self.to, other.to)];
        let lo = candidates.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = candidates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        FloatInterval {
            format: self.format,
            bottom: false,
            top: self.top || other.top,
            has_nan: self.has_nan || other.has_nan || candidates.iter().any(|v| v.is_nan()),
            from: lo,
            to: hi,
        }
    }

    pub fn add(&self, other: &FloatInterval) -> FloatInterval {
        self.binop(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &FloatInterval) -> FloatInterval {
        self.binop(other, |a, b| a - b)
    }

    pub fn mul(&self, other: &FloatInterval) -> FloatInterval {
        self.binop(other, |a, b| a * b)
    }

    pub fn div(&self, other: &FloatInterval) -> FloatInterval {
        let mut r = self.binop(other, |a, b| a / b);
        if !other.bottom && other.from <= 0.0 && other.to >= 0.0 {
            r.has_nan = true;
        }
        r
    }

    pub fn rem(&self, other: &FloatInterval) -> FloatInterval {
        self.binop(other, |a, b| a % b)
    }

    /// `compare(other, pred)`: ordered predicates compare endpoints;
    /// unordered variants treat NaN-possible operands as `Unknown`.
    pub fn compare(&self, other: &FloatInterval, pred: FloatPredicate) -> FourValued {
        if self.bottom || other.bottom {
            return FourValued::Unordered;
        }
        if (self.has_nan || other.has_nan) && !pred.is_ordered() {
            return FourValued::Unknown;
        }
        if self.has_nan || other.has_nan {
            return FourValued::Unordered;
        }
        use FloatPredicate::*;
        match pred {
            OEq | UEq => cmp_result(self.from == self.to && other.from == other.to && self.from == other.from, self.to < other.from || self.from > other.to),
            ONe | UNe => cmp_result(self.to < other.from || self.from > other.to, self.from == self.to && other.from == other.to && self.from == other.from),
            OLt | ULt => cmp_result(self.to < other.from, self.from >= other.to),
            OLe | ULe => cmp_result(self.to <= other.from, self.from > other.to),
            OGt | UGt => cmp_result(self.from > other.to, self.to <= other.from),
            OGe | UGe => cmp_result(self.from >= other.to, self.to < other.from),
        }
    }

    pub fn fptoui(&self, width: u32) -> crate::integer::set::IntSet {
        if self.bottom {
            return crate::integer::set::IntSet::bottom(width, 256);
        }
        if self.top || self.has_nan || self.from < 0.0 {
            return crate::integer::set::IntSet::top(width);
        }
        crate::integer::set::IntSet::singleton(width, self.from as u64)
    }

    pub fn fptosi(&self, width: u32) -> crate::integer::set::IntSet {
        if self.bottom {
            return crate::integer::set::IntSet::bottom(width, 256);
        }
        if self.top || self.has_nan {
            return crate::integer::set::IntSet::top(width);
        }
        crate::integer::set::IntSet::singleton(width, self.from as i64 as u64)
    }
}

fn cmp_result(must_true: bool, must_false: bool) -> FourValued {
    if must_true {
        FourValued::MustTrue
    } else if must_false {
        FourValued::MustFalse
    } else {
        FourValued::Unknown
    }
}
