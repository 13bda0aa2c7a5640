//! Declaration → IR lowering.
//!
//! [`Lowerer`] owns the registry for the construction phase. The builders
//! live in submodules as `impl Lowerer` blocks:
//! - `macros`: `#define` bodies through the macro engine
//! - `enums`: enum units, with values reinterpreted at the underlying width
//! - `structs`: one-shot struct fill and bit-field packing
//! - `functions`: export gating, parameters, delegates
//! - `resolve`: raw C type → [`TypeRef`], materializing nested units

use std::fmt;

use tracing::{debug, trace, warn};

use cbind_ir::{Registry, TypeRef};

use crate::decl::{CType, TranslationUnit};
use crate::error::LowerError;
use crate::export_map::ExportMap;
use crate::filter::DeclFilters;

mod enums;
mod functions;
mod macros;
mod resolve;
mod structs;


/// Target hook consulted before the built-in resolution rules.
///
/// Returning `Some` replaces the resolver's answer for that raw type. The
/// hook may register units of its own.
pub trait TypeOverride {
    fn resolve(&mut self, registry: &mut Registry, ty: &CType) -> Option<TypeRef> {
        let _ = (registry, ty);
        None
    }
}

/// Leaves every type to the built-in rules.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOverride;

impl TypeOverride for NoOverride {}

pub struct Lowerer {
    registry: Registry,
    exports: ExportMap,
    filters: DeclFilters,
    type_override: Box<dyn TypeOverride>,
    unresolved_exports: Vec<String>,
}

impl Default for Lowerer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lowerer {
    pub fn new() -> Self {
        Lowerer {
            registry: Registry::new(),
            exports: ExportMap::new(),
            filters: DeclFilters::new(),
            type_override: Box::new(NoOverride),
            unresolved_exports: Vec::new(),
        }
    }

    pub fn set_type_override(&mut self, type_override: Box<dyn TypeOverride>) {
        self.type_override = type_override;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn exports_mut(&mut self) -> &mut ExportMap {
        &mut self.exports
    }

    pub fn filters_mut(&mut self) -> &mut DeclFilters {
        &mut self.filters
    }

    /// Functions skipped for lack of an export, in the order they were met.
    pub fn unresolved_exports(&self) -> &[String] {
        &self.unresolved_exports
    }

    /// Lower translation units in order, skipping system headers.
    #[tracing::instrument(level = "debug", skip_all, fields(units = units.len()))]
    pub fn process(&mut self, units: &[TranslationUnit]) -> Result<(), LowerError> {
        for unit in units {
            if unit.is_system_header {
                trace!(file = %unit.file, "skipping system header");
                continue;
            }
            self.lower_unit(unit)?;
        }
        debug!(
            units = self.registry.len(),
            unresolved = self.unresolved_exports.len(),
            "lowering done"
        );
        Ok(())
    }

    /// Macros, enums, structs, then functions.
    pub fn lower_unit(&mut self, unit: &TranslationUnit) -> Result<(), LowerError> {
        debug!(file = %unit.file, "lowering translation unit");
        self.lower_macros(&unit.macros);

        for decl in &unit.enums {
            self.lower_top_level_enum(decl)?;
        }

        for record in &unit.records {
            if record.name.is_some() && !self.filters.skips_record(record) {
                self.make_struct(record, None)?;
            }
        }
        for typedef in &unit.typedefs {
            if let Some(record) = typedef.ty.as_record() {
                if !self.filters.skips_record(record) {
                    self.make_struct(record, Some(&typedef.name))?;
                }
            }
        }

        for function in &unit.functions {
            if function.is_inline || self.filters.skips_function(function) {
                continue;
            }
            self.lower_function(function)?;
        }
        Ok(())
    }

    /// Hand the registry over to the passes.
    pub fn finish(self) -> (Registry, Vec<String>) {
        (self.registry, self.unresolved_exports)
    }

    fn record_unresolved(&mut self, function: &str) {
        warn!(function, "export not found; skipping function");
        self.unresolved_exports.push(function.to_owned());
    }
}

impl fmt::Debug for Lowerer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lowerer")
            .field("units", &self.registry.len())
            .field("exports", &self.exports.len())
            .field("filters", &self.filters)
            .field("unresolved_exports", &self.unresolved_exports)
            .finish_non_exhaustive()
    }
}
