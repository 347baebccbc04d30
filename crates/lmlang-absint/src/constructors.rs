//! Builds initial [`AbstractValue`]s from types and constants (spec §4.1).
//!
//! Ground: `original_source/lib/Constructors.cpp`'s `Constructors::create`
//! dispatch table, re-typed onto `lmlang_core::types::LmType`.

use lmlang_core::type_id::{TypeId, TypeRegistry};
use lmlang_core::types::{ConstValue, LmType, ScalarType};

use crate::aggregate::{ArrayFixed, StructValue};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::float::{FloatFormat, FloatInterval};
use crate::integer::Container;
use crate::pointer::PointerDomain;
use crate::value::AbstractValue;

pub struct Constructors<'a> {
    pub types: &'a TypeRegistry,
    pub config: &'a AnalysisConfig,
}

impl<'a> Constructors<'a> {
    pub fn new(types: &'a TypeRegistry, config: &'a AnalysisConfig) -> Constructors<'a> {
        Constructors { types, config }
    }

    fn scalar_width(scalar: ScalarType) -> u32 {
        match scalar {
            ScalarType::Bool => 1,
            ScalarType::I8 => 8,
            ScalarType::I16 => 16,
            ScalarType::I32 => 32,
            ScalarType::I64 => 64,
            ScalarType::F32 | ScalarType::F64 => unreachable!("float scalars go through FloatInterval"),
        }
    }

    /// The least-precise value of a type: `bottom` in whichever domain the
    /// type maps to.
    pub fn bottom(&self, type_id: TypeId) -> Result<AbstractValue, AnalysisError> {
        let ty = self.types.get(type_id).ok_or(AnalysisError::UnsupportedType { type_id })?;
        match ty {
            LmType::Scalar(ScalarType::F32) => Ok(AbstractValue::Float(FloatInterval::bottom(FloatFormat::F32))),
            LmType::Scalar(ScalarType::F64) => Ok(AbstractValue::Float(FloatInterval::bottom(FloatFormat::F64))),
            LmType::Scalar(scalar) => Ok(AbstractValue::Integer(Container::bottom(
                Self::scalar_width(*scalar),
                self.config.domain_mask,
                self.config.set_threshold,
            ))),
            LmType::Pointer { pointee, .. } => Ok(AbstractValue::Pointer(PointerDomain::bottom(*pointee))),
            LmType::Array { element, length } => {
                let item = self.bottom(*element)?;
                Ok(AbstractValue::Array(ArrayFixed::new(vec![item; *length as usize])))
            }
            LmType::Struct(def) => {
                let mut fields = Vec::with_capacity(def.fields.len());
                for field_type in def.fields.values() {
                    fields.push(self.bottom(*field_type)?);
                }
                Ok(AbstractValue::Struct(StructValue { fields }))
            }
            LmType::Unit => Ok(AbstractValue::Struct(StructValue { fields: Vec::new() })),
            LmType::Never | LmType::Function { .. } | LmType::Enum(_) => {
                Err(AnalysisError::UnsupportedType { type_id })
            }
        }
    }

    /// The most-precise-nothing-is-known value of a type: `top` in whichever
    /// domain the type maps to. Used to model operations this crate does not
    /// give a transfer function to (console/file I/O, closures, indirect
    /// calls) without claiming soundness it cannot back up — the Non-goals
    /// already accept unmodeled external calls returning top of the result
    /// type.
    pub fn top(&self, type_id: TypeId) -> Result<AbstractValue, AnalysisError> {
        let ty = self.types.get(type_id).ok_or(AnalysisError::UnsupportedType { type_id })?;
        match ty {
            LmType::Scalar(ScalarType::F32) => Ok(AbstractValue::Float(FloatInterval::top(FloatFormat::F32))),
            LmType::Scalar(ScalarType::F64) => Ok(AbstractValue::Float(FloatInterval::top(FloatFormat::F64))),
            LmType::Scalar(scalar) => Ok(AbstractValue::Integer(Container::top(
                Self::scalar_width(*scalar),
                self.config.domain_mask,
                self.config.set_threshold,
            ))),
            LmType::Pointer { pointee, .. } => Ok(AbstractValue::Pointer(PointerDomain::top(*pointee))),
            LmType::Array { element, length } => {
                let item = self.top(*element)?;
                Ok(AbstractValue::Array(ArrayFixed::new(vec![item; *length as usize])))
            }
            LmType::Struct(def) => {
                let mut fields = Vec::with_capacity(def.fields.len());
                for field_type in def.fields.values() {
                    fields.push(self.top(*field_type)?);
                }
                Ok(AbstractValue::Struct(StructValue { fields }))
            }
            LmType::Unit => Ok(AbstractValue::Struct(StructValue { fields: Vec::new() })),
            LmType::Never | LmType::Function { .. } | LmType::Enum(_) => {
                Err(AnalysisError::UnsupportedType { type_id })
            }
        }
    }

    /// Decodes a literal constant into a precise singleton value.
    pub fn from_const(&self, const_value: &ConstValue, type_id: TypeId) -> Result<AbstractValue, AnalysisError> {
        match const_value {
            ConstValue::Bool(b) => Ok(AbstractValue::Integer(Container::singleton(
                1,
                *b as u64,
                self.config.domain_mask,
                self.config.set_threshold,
            ))),
            ConstValue::I8(v) => Ok(self.int_singleton(8, *v as u8 as u64)),
            ConstValue::I16(v) => Ok(self.int_singleton(16, *v as u16 as u64)),
            ConstValue::I32(v) => Ok(self.int_singleton(32, *v as u32 as u64)),
            ConstValue::I64(v) => Ok(self.int_singleton(64, *v as u64)),
            ConstValue::F32(v) => Ok(AbstractValue::Float(FloatInterval::singleton(FloatFormat::F32, *v))),
            ConstValue::F64(v) => Ok(AbstractValue::Float(FloatInterval::singleton(FloatFormat::F64, *v))),
            ConstValue::Unit => {
                let _ = type_id;
                Ok(AbstractValue::Struct(StructValue { fields: Vec::new() }))
            }
        }
    }

    fn int_singleton(&self, width: u32, value: u64) -> AbstractValue {
        AbstractValue::Integer(Container::singleton(width, value, self.config.domain_mask, self.config.set_threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_of_i32_is_bottom_integer() {
        let types = TypeRegistry::new();
        let config = AnalysisConfig::default();
        let ctors = Constructors::new(&types, &config);
        let v = ctors.bottom(TypeId::I32).unwrap();
        assert!(v.is_bottom());
    }

    #[test]
    fn from_const_bool_is_constant() {
        let types = TypeRegistry::new();
        let config = AnalysisConfig::default();
        let ctors = Constructors::new(&types, &config);
        let v = ctors.from_const(&ConstValue::Bool(true), TypeId::BOOL).unwrap();
        assert!(v.is_constant());
    }

    #[test]
    fn bottom_of_never_is_unsupported() {
        let types = TypeRegistry::new();
        let config = AnalysisConfig::default();
        let ctors = Constructors::new(&types, &config);
        assert!(ctors.bottom(TypeId::NEVER).is_err());
    }
}
