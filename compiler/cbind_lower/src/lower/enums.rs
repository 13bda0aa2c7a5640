//! Enum units.

use tracing::trace;

use cbind_ir::{EnumItem, EnumUnit, EnumValue, Name, Primitive, Unit, UnitMeta};

use super::Lowerer;
use crate::decl::{CType, EnumDecl};
use crate::error::LowerError;

impl Lowerer {
    /// Top-level enums need a name and an integer underlying type.
    pub(super) fn lower_top_level_enum(&mut self, decl: &EnumDecl) -> Result<(), LowerError> {
        let Some(name) = decl.name.as_deref().filter(|n| !n.is_empty()) else {
            trace!("skipping anonymous top-level enum");
            return Ok(());
        };
        if integer_underlying(&decl.underlying).is_none() {
            trace!(name, underlying = %decl.underlying, "skipping enum over a non-integer type");
            return Ok(());
        }
        if self.filters.skips_enum(decl) {
            return Ok(());
        }
        self.make_enum(decl, None)?;
        Ok(())
    }

    /// Register `decl` under its tag, or `fallback` when it has none. A name
    /// already registered is left alone.
    pub(super) fn make_enum(
        &mut self,
        decl: &EnumDecl,
        fallback: Option<&str>,
    ) -> Result<Option<Name>, LowerError> {
        let Some(name) = decl.name.as_deref().or(fallback).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };
        let interned = self.registry.intern(name);
        if self.registry.lookup(interned).is_some() || self.registry.is_suppressed(interned) {
            return Ok(Some(interned));
        }

        let underlying =
            integer_underlying(&decl.underlying).ok_or_else(|| LowerError::NonIntegerEnum {
                name: name.to_owned(),
                underlying: decl.underlying.to_string(),
            })?;
        let items = decl
            .items
            .iter()
            .map(|item| EnumItem {
                name: item.name.clone(),
                host_name: None,
                value: enum_value(underlying, item.value),
                doc: item.doc.clone(),
            })
            .collect();

        self.registry.insert(Unit::Enum(EnumUnit {
            meta: UnitMeta::new(interned).with_doc(decl.doc.clone()),
            underlying,
            items,
            is_flags: false,
        }));
        Ok(Some(interned))
    }
}

fn integer_underlying(ty: &CType) -> Option<Primitive> {
    match ty.desugar() {
        CType::Builtin(builtin) => Some(builtin.primitive()).filter(|p| p.is_integer()),
        _ => None,
    }
}

/// Reinterpret raw value bits at the underlying type's width.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    reason = "raw enum bits are deliberately narrowed to the declared width"
)]
fn enum_value(underlying: Primitive, raw: u64) -> EnumValue {
    match underlying {
        Primitive::SByte => EnumValue::Signed(i64::from(raw as u8 as i8)),
        Primitive::Short => EnumValue::Signed(i64::from(raw as u16 as i16)),
        Primitive::Int => EnumValue::Signed(i64::from(raw as u32 as i32)),
        Primitive::Long | Primitive::NInt => EnumValue::Signed(raw as i64),
        Primitive::Byte => EnumValue::Unsigned(u64::from(raw as u8)),
        Primitive::UShort => EnumValue::Unsigned(u64::from(raw as u16)),
        Primitive::UInt => EnumValue::Unsigned(u64::from(raw as u32)),
        _ => EnumValue::Unsigned(raw),
    }
}
