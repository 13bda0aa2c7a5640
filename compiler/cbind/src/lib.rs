//! cbind
//!
//! Generates foreign-function bindings from C header declarations. The
//! pipeline:
//!
//! 1. Exports: symbol names mapped to their native library, given directly or
//!    read from a PE image's export table
//! 2. Lowering: translation units from a [`DeclarationSource`] become IR units
//!    (macros, enums, structs, functions, delegates, fixed arrays)
//! 3. Visitor pass: target semantics ([`VisitPolicy`])
//! 4. Renamer pass: final identifiers ([`RenamePolicy`])
//! 5. Emission: an [`Emitter`] renders the read-only [`Bindings`]
//!
//! Targets plug in through three hooks: a [`TypeOverride`] consulted before
//! the built-in type rules, a visitor policy and a rename policy. Stock
//! building blocks live in [`policy`].
//!
//! # Tracing
//!
//! Call [`init_tracing`] and set `CBIND_LOG`:
//! - `CBIND_LOG=debug`: pass boundaries and recovered failures in every
//!   pipeline crate
//! - `CBIND_LOG=cbind_lower=trace,cbind=trace`: every unit, full directive
//!   syntax

mod emit;
mod error;
mod generator;
pub mod policy;
mod rename;
mod source;
mod visit;

use std::sync::Once;

pub use cbind_ir::{
    CallingConvention, DelegateUnit, Doc, EnumItem, EnumUnit, EnumValue, Field, FixedArrayUnit,
    FunctionUnit, MacroUnit, Modifier, Param, ParamModifier, Primitive, Registry, Signature,
    StructUnit, TypeRef, Unit, UnitKind, UnitMeta,
};
pub use cbind_lower::naming;
pub use cbind_lower::{
    ArraySize, Builtin, CType, CallConv, DeclFilters, EnumDecl, EnumItemDecl, FieldDecl,
    FunctionDecl, FunctionType, LowerError, MacroDecl, ParamDecl, RecordDecl, TranslationUnit,
    TypeOverride, TypedefDecl,
};
pub use cbind_macro::MacroType;
pub use cbind_pe::ImageError;

pub use emit::{EmitConfig, Emitter, KindImports, UnitGroup, UnitGrouping};
pub use error::GenerateError;
pub use generator::{Bindings, Generator};
pub use rename::{
    default_rename_delegate, default_rename_enum, default_rename_function, default_rename_struct,
    default_rename_struct_field, display_name, enum_item_names, rename_all, DefaultRenamer,
    RenamePolicy,
};
pub use source::{DeclarationError, DeclarationSource, Diagnostic, Severity};
pub use visit::{
    default_visit_delegate, default_visit_enum, default_visit_function, default_visit_struct,
    default_visit_struct_field, visit_all, DefaultVisitor, VisitPolicy,
};

static TRACING_INIT: Once = Once::new();

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CBIND_LOG";

const PIPELINE_CRATES: [&str; 5] = ["cbind", "cbind_lower", "cbind_ir", "cbind_pe", "cbind_macro"];

/// Install a `tracing` subscriber filtered by `CBIND_LOG`.
///
/// Does nothing when `CBIND_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(value) = std::env::var(LOG_ENV) else {
            return;
        };
        let filter = EnvFilter::try_new(log_directives(&value))
            .unwrap_or_else(|_| EnvFilter::new(log_directives("")));
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}

/// Filter directives for a `CBIND_LOG` value.
///
/// A bare level applies to the pipeline crates only; anything with a target
/// is used as written. Empty means `info` for the pipeline crates.
fn log_directives(value: &str) -> String {
    let value = value.trim();
    if value.contains('=') || value.contains(',') {
        return value.to_owned();
    }
    let level = if value.is_empty() { "info" } else { value };
    PIPELINE_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
