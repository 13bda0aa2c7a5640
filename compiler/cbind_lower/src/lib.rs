//! cbind lowering
//!
//! Turns the declaration view of parsed C headers into registered IR units.
//!
//! Each translation unit is drained in a fixed order: macros, then enums,
//! then structs, then functions. Structs, enums, delegates and fixed arrays
//! referenced from a type are materialized on demand by the resolver, so a
//! function parameter pointing at a forward-declared struct sees at worst an
//! incomplete placeholder.
//!
//! # Failure Model
//!
//! - Unparsable macros are kept inert (logged at `debug`)
//! - Functions without an export are skipped, recorded and logged at `warn`
//! - Type shapes the resolver cannot map abort lowering with a [`LowerError`]

mod decl;
mod error;
mod export_map;
mod filter;
mod lower;
pub mod naming;

pub use decl::{
    ArraySize, Builtin, CType, CallConv, EnumDecl, EnumItemDecl, FieldDecl, FunctionDecl,
    FunctionType, MacroDecl, ParamDecl, RecordDecl, TranslationUnit, TypedefDecl,
};
pub use error::LowerError;
pub use export_map::{Export, ExportMap};
pub use filter::DeclFilters;
pub use lower::{Lowerer, NoOverride, TypeOverride};
