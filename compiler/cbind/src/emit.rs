//! Emission boundary.
//!
//! Text rendering lives outside this workspace. An [`Emitter`] receives the
//! finished [`Bindings`] read-only, together with an [`EmitConfig`].

use cbind_ir::{Unit, UnitKind};

use crate::generator::Bindings;

/// How units are split across output files.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitGrouping {
    /// One group per unit kind.
    #[default]
    ByKind,
    /// Everything in one group.
    Single,
}

/// Imports to emit at the top of each kind's output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KindImports {
    pub macros: Vec<String>,
    pub enums: Vec<String>,
    pub structs: Vec<String>,
    pub functions: Vec<String>,
    pub delegates: Vec<String>,
    pub fixed_arrays: Vec<String>,
}

impl KindImports {
    pub fn for_kind(&self, kind: UnitKind) -> &[String] {
        match kind {
            UnitKind::Macro => &self.macros,
            UnitKind::Enum => &self.enums,
            UnitKind::Struct => &self.structs,
            UnitKind::Function => &self.functions,
            UnitKind::Delegate => &self.delegates,
            UnitKind::FixedArray => &self.fixed_arrays,
        }
    }

    /// Every import, deduplicated, in kind order.
    pub fn all(&self) -> Vec<&str> {
        let mut all: Vec<&str> = Vec::new();
        for kind in KIND_ORDER {
            for import in self.for_kind(kind) {
                if !all.contains(&import.as_str()) {
                    all.push(import);
                }
            }
        }
        all
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EmitConfig {
    pub grouping: UnitGrouping,
    /// Target namespace or module the output is placed in.
    pub namespace: String,
    pub imports: KindImports,
}

/// Order of groups under [`UnitGrouping::ByKind`].
pub const KIND_ORDER: [UnitKind; 6] = [
    UnitKind::Macro,
    UnitKind::Enum,
    UnitKind::Struct,
    UnitKind::Function,
    UnitKind::Delegate,
    UnitKind::FixedArray,
];

/// Units emitted together. `kind` is `None` for a [`UnitGrouping::Single`]
/// group.
#[derive(Clone, Debug)]
pub struct UnitGroup<'a> {
    pub kind: Option<UnitKind>,
    pub units: Vec<&'a Unit>,
}

impl UnitGroup<'_> {
    /// Imports this group needs under `config`.
    pub fn imports<'c>(&self, config: &'c EmitConfig) -> Vec<&'c str> {
        match self.kind {
            Some(kind) => config
                .imports
                .for_kind(kind)
                .iter()
                .map(String::as_str)
                .collect(),
            None => config.imports.all(),
        }
    }
}

/// Renders finished bindings into target source.
pub trait Emitter {
    type Error;

    fn emit(&mut self, bindings: &Bindings, config: &EmitConfig) -> Result<(), Self::Error>;
}
