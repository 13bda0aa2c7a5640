//! Struct units.
//!
//! A struct name is registered as an incomplete placeholder the first time it
//! is seen and filled from the first complete definition. Later definitions
//! are ignored. Type references only hold the name, so a reference taken
//! from the placeholder sees the fields once they land.

use tracing::{debug, trace};

use cbind_ir::{Doc, Field, Name, Primitive, Registry, StructUnit, Unit, UnitMeta};

use super::Lowerer;
use crate::decl::{FieldDecl, RecordDecl};
use crate::error::LowerError;
use crate::naming::to_camel;

impl Lowerer {
    /// Register `record` under its tag, or `fallback` when it has none.
    ///
    /// Returns `None` only for a record with no name at all.
    pub(super) fn make_struct(
        &mut self,
        record: &RecordDecl,
        fallback: Option<&str>,
    ) -> Result<Option<Name>, LowerError> {
        let Some(name) = record.name.as_deref().or(fallback).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };
        let interned = self.registry.intern(name);
        let id = match self.registry.lookup(interned) {
            Some(id) => id,
            None => {
                let placeholder = StructUnit::placeholder(UnitMeta::new(interned));
                let Some(id) = self.registry.insert(Unit::Struct(placeholder)) else {
                    return Ok(Some(interned));
                };
                id
            }
        };
        let Some(decls) = &record.fields else {
            return Ok(Some(interned));
        };

        // Marked complete before the fields are lowered, so a field that
        // reaches this record again stops here.
        match self.registry.get_mut(id) {
            Some(Unit::Struct(unit)) if !unit.complete => {
                unit.complete = true;
                unit.is_union = record.is_union;
                unit.meta.doc = record.doc.clone();
            }
            Some(Unit::Struct(_)) => return Ok(Some(interned)),
            _ => {
                debug!(name, "name already taken by a non-struct unit");
                return Ok(Some(interned));
            }
        }

        let fields = self.lower_fields(name, decls)?;
        trace!(name, fields = fields.len(), "filled struct");
        if let Some(Unit::Struct(unit)) = self.registry.get_mut(id) {
            unit.fields = fields;
        }
        Ok(Some(interned))
    }

    fn lower_fields(&mut self, record: &str, decls: &[FieldDecl]) -> Result<Vec<Field>, LowerError> {
        let mut fields = Vec::with_capacity(decls.len());
        let mut run = BitFieldRun::default();

        for decl in decls {
            if let Some(width) = decl.bit_width {
                run.push(decl, width);
                continue;
            }
            fields.extend(run.flush(&self.registry, record)?);

            let hint = format!("{record}_{}", to_camel(&decl.name));
            let ty = self.resolve(&decl.ty, Some(&hint), true)?;
            let mut field = Field::new(decl.name.clone(), ty);
            field.doc = decl.doc.clone();
            field.deprecated.clone_from(&decl.deprecated);
            fields.push(field);
        }
        fields.extend(run.flush(&self.registry, record)?);
        Ok(fields)
    }
}

/// Consecutive bit-field members waiting to share one storage field.
#[derive(Default)]
struct BitFieldRun {
    names: Vec<String>,
    docs: Vec<String>,
    bits: u64,
}

impl BitFieldRun {
    /// Zero-width members hold no storage and leave the run unchanged.
    fn push(&mut self, decl: &FieldDecl, width: u32) {
        if width == 0 {
            return;
        }
        self.names.push(format!("{}{width}", decl.name));
        if let Some(summary) = decl.doc.summary.as_deref().map(str::trim) {
            if !summary.is_empty() {
                self.docs.push(summary.to_owned());
            }
        }
        self.bits += u64::from(width);
    }

    /// Storage field for the run so far: `a1_b1_c1`, sized to the smallest
    /// of byte, ushort, uint and ulong that holds every bit.
    fn flush(&mut self, registry: &Registry, record: &str) -> Result<Option<Field>, LowerError> {
        if self.bits == 0 {
            self.names.clear();
            self.docs.clear();
            return Ok(None);
        }

        let name = self.names.join("_");
        let storage = u32::try_from(self.bits)
            .ok()
            .and_then(Primitive::unsigned_for_bits)
            .ok_or_else(|| LowerError::BitFieldOverflow {
                record: record.to_owned(),
                fields: name.clone(),
                bits: self.bits,
            })?;

        let mut field = Field::new(name, registry.primitive(storage));
        if !self.docs.is_empty() {
            field.doc = Doc::summary(self.docs.join(" "));
        }
        self.names.clear();
        self.docs.clear();
        self.bits = 0;
        Ok(Some(field))
    }
}
