//! Caller-installed declaration filters.
//!
//! A filter returns `true` for declarations to skip. Any matching filter
//! skips the declaration.

use std::fmt;

use crate::decl::{EnumDecl, FunctionDecl, MacroDecl, RecordDecl};

type Filter<T> = Box<dyn Fn(&T) -> bool>;

#[derive(Default)]
pub struct DeclFilters {
    macros: Vec<Filter<MacroDecl>>,
    enums: Vec<Filter<EnumDecl>>,
    records: Vec<Filter<RecordDecl>>,
    functions: Vec<Filter<FunctionDecl>>,
}

impl DeclFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_macros(&mut self, filter: impl Fn(&MacroDecl) -> bool + 'static) -> &mut Self {
        self.macros.push(Box::new(filter));
        self
    }

    pub fn skip_enums(&mut self, filter: impl Fn(&EnumDecl) -> bool + 'static) -> &mut Self {
        self.enums.push(Box::new(filter));
        self
    }

    /// Applies to struct sources: tagged records and typedefs of records.
    pub fn skip_records(&mut self, filter: impl Fn(&RecordDecl) -> bool + 'static) -> &mut Self {
        self.records.push(Box::new(filter));
        self
    }

    pub fn skip_functions(
        &mut self,
        filter: impl Fn(&FunctionDecl) -> bool + 'static,
    ) -> &mut Self {
        self.functions.push(Box::new(filter));
        self
    }

    pub(crate) fn skips_macro(&self, decl: &MacroDecl) -> bool {
        self.macros.iter().any(|f| f(decl))
    }

    pub(crate) fn skips_enum(&self, decl: &EnumDecl) -> bool {
        self.enums.iter().any(|f| f(decl))
    }

    pub(crate) fn skips_record(&self, decl: &RecordDecl) -> bool {
        self.records.iter().any(|f| f(decl))
    }

    pub(crate) fn skips_function(&self, decl: &FunctionDecl) -> bool {
        self.functions.iter().any(|f| f(decl))
    }
}

impl fmt::Debug for DeclFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclFilters")
            .field("macros", &self.macros.len())
            .field("enums", &self.enums.len())
            .field("records", &self.records.len())
            .field("functions", &self.functions.len())
            .finish()
    }
}
