//! Exported symbol to owning library.

use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub library: String,
    /// `library` is a literal name rather than an expression the emitter
    /// should splice in verbatim.
    pub library_is_const: bool,
}

/// Function name to [`Export`]. The first library to claim a name keeps it.
#[derive(Clone, Debug, Default)]
pub struct ExportMap {
    map: FxHashMap<String, Export>,
}

impl ExportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every name in `names` as exported by `library`.
    pub fn add<I, S>(&mut self, names: I, library: &str, library_is_const: bool)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if let Some(existing) = self.map.get(&name) {
                debug!(
                    export = %name,
                    kept = %existing.library,
                    ignored = library,
                    "export already claimed"
                );
                continue;
            }
            self.map.insert(
                name,
                Export {
                    library: library.to_owned(),
                    library_is_const,
                },
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<&Export> {
        self.map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
