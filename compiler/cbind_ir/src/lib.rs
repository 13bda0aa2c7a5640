//! cbind IR
//!
//! The normalized model that lowering produces and the visitor/renamer passes
//! edit: units (macros, enums, structs, functions, delegates, fixed arrays),
//! type references, the primitive vocabulary, and the [`Registry`] that owns
//! them all for one generator run.

mod name;
mod primitive;
mod registry;
mod types;
mod unit;

pub use name::{Name, StringInterner};
pub use primitive::Primitive;
pub use registry::{Registry, UnitId};
pub use types::{Modifier, Modifiers, TypeKey, TypeRef};
pub use unit::{
    CallingConvention, DelegateUnit, Doc, EnumItem, EnumUnit, EnumValue, Field, FixedArrayUnit,
    FunctionUnit, MacroUnit, Param, ParamModifier, Signature, StructUnit, Unit, UnitKind,
    UnitMeta,
};
