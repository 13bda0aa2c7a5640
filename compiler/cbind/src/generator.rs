//! Generator façade.
//!
//! [`Generator`] is the construction phase: it collects exports, policies
//! and translation units. [`Generator::finalize`] consumes it, runs the
//! visitor pass and then the renamer pass, and returns [`Bindings`], the
//! read-only result emitters work from.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use cbind_ir::{Registry, Unit, UnitKind};
use cbind_lower::{DeclFilters, Lowerer, TranslationUnit, TypeOverride};

use crate::emit::{EmitConfig, Emitter, UnitGroup, UnitGrouping, KIND_ORDER};
use crate::error::GenerateError;
use crate::rename::{rename_all, DefaultRenamer, RenamePolicy};
use crate::source::{DeclarationError, DeclarationSource};
use crate::visit::{visit_all, DefaultVisitor, VisitPolicy};

pub struct Generator {
    lowerer: Lowerer,
    visitor: Box<dyn VisitPolicy>,
    renamer: Box<dyn RenamePolicy>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Generator {
            lowerer: Lowerer::new(),
            visitor: Box::new(DefaultVisitor),
            renamer: Box::new(DefaultRenamer),
        }
    }

    #[must_use]
    pub fn with_type_override(mut self, type_override: impl TypeOverride + 'static) -> Self {
        self.lowerer.set_type_override(Box::new(type_override));
        self
    }

    #[must_use]
    pub fn with_visitor(mut self, visitor: impl VisitPolicy + 'static) -> Self {
        self.visitor = Box::new(visitor);
        self
    }

    #[must_use]
    pub fn with_renamer(mut self, renamer: impl RenamePolicy + 'static) -> Self {
        self.renamer = Box::new(renamer);
        self
    }

    /// Map `names` to `library`. The first library a name is added with wins.
    pub fn add_exports<I, S>(
        &mut self,
        names: I,
        library: &str,
        library_is_const: bool,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lowerer
            .exports_mut()
            .add(names, library, library_is_const);
        self
    }

    /// Map every name exported by the image at `path` to `library`.
    ///
    /// Returns how many names the image exports.
    pub fn add_image_exports(
        &mut self,
        path: impl AsRef<Path>,
        library: &str,
    ) -> Result<usize, GenerateError> {
        let names = cbind_pe::read_exports(path)?;
        let count = names.len();
        self.add_exports(names, library, true);
        Ok(count)
    }

    /// Remove `name` and keep it from being registered again.
    pub fn suppress(&mut self, name: &str) -> &mut Self {
        self.lowerer.registry_mut().suppress(name);
        self
    }

    pub fn filters_mut(&mut self) -> &mut DeclFilters {
        self.lowerer.filters_mut()
    }

    pub fn registry(&self) -> &Registry {
        self.lowerer.registry()
    }

    /// Lower translation units, in order.
    pub fn process(&mut self, units: &[TranslationUnit]) -> Result<(), GenerateError> {
        self.lowerer.process(units)?;
        Ok(())
    }

    /// Parse `files` with `source` and lower the result.
    pub fn parse(
        &mut self,
        source: &mut dyn DeclarationSource,
        files: &[PathBuf],
    ) -> Result<(), GenerateError> {
        let units = source.parse(files).inspect_err(log_diagnostics)?;
        self.process(&units)
    }

    /// Run the visitor and renamer passes.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn finalize(self) -> Bindings {
        let Generator {
            lowerer,
            mut visitor,
            mut renamer,
        } = self;
        let (mut registry, unresolved_exports) = lowerer.finish();

        visit_all(&mut registry, visitor.as_mut());
        rename_all(&mut registry, renamer.as_mut());

        info!(
            units = registry.len(),
            unresolved = unresolved_exports.len(),
            "bindings finalized"
        );
        Bindings {
            registry,
            unresolved_exports,
        }
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("lowerer", &self.lowerer)
            .finish_non_exhaustive()
    }
}

fn log_diagnostics(err: &DeclarationError) {
    for diagnostic in err.diagnostics() {
        if diagnostic.severity.is_error() {
            error!("{diagnostic}");
        } else {
            debug!("{diagnostic}");
        }
    }
}

/// Finished, renamed units.
#[derive(Debug)]
pub struct Bindings {
    registry: Registry,
    unresolved_exports: Vec<String>,
}

impl Bindings {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Units in registration order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.registry.iter().map(|(_, unit)| unit)
    }

    /// Unit by source name.
    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.registry
            .lookup_str(name)
            .and_then(|id| self.registry.get(id))
    }

    pub fn units_of(&self, kind: UnitKind) -> impl Iterator<Item = &Unit> + '_ {
        self.units().filter(move |unit| unit.kind() == kind)
    }

    /// Source name of a unit.
    pub fn source_name(&self, unit: &Unit) -> &str {
        self.registry.resolve_name(unit.name())
    }

    /// Declared functions dropped for lack of an export, in order.
    pub fn unresolved_exports(&self) -> &[String] {
        &self.unresolved_exports
    }

    /// Split units for emission. Kinds without units get no group.
    pub fn group(&self, grouping: UnitGrouping) -> Vec<UnitGroup<'_>> {
        match grouping {
            UnitGrouping::Single => vec![UnitGroup {
                kind: None,
                units: self.units().collect(),
            }],
            UnitGrouping::ByKind => KIND_ORDER
                .into_iter()
                .map(|kind| UnitGroup {
                    kind: Some(kind),
                    units: self.units_of(kind).collect(),
                })
                .filter(|group| !group.units.is_empty())
                .collect(),
        }
    }

    pub fn emit<E: Emitter>(&self, emitter: &mut E, config: &EmitConfig) -> Result<(), E::Error> {
        emitter.emit(self, config)
    }
}
