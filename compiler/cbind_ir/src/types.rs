//! Type references.
//!
//! A reference names its base unit (or primitive) by [`Name`], never by
//! value, so self-referential structs and cyclic delegate graphs need no
//! special handling.

use smallvec::SmallVec;

use crate::name::Name;

/// One level of indirection on top of a base type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Pointer,
    /// Pointer to const.
    ConstPointer,
    /// Array of unknown length.
    Array,
    /// Array of unknown length with const elements.
    ConstArray,
}

impl Modifier {
    pub fn is_pointer(self) -> bool {
        matches!(self, Modifier::Pointer | Modifier::ConstPointer)
    }
}

pub type Modifiers = SmallVec<[Modifier; 2]>;

/// Structural identity of a type reference, ignoring display names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub base: Name,
    pub modifiers: Modifiers,
}

/// Base name plus modifier stack, closest-to-base first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    pub base: Name,
    pub modifiers: Modifiers,
    /// Display name; set by the renamer.
    pub host_name: Option<String>,
}

impl TypeRef {
    pub fn new(base: Name) -> Self {
        TypeRef {
            base,
            modifiers: SmallVec::new(),
            host_name: None,
        }
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn push(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    /// Remove the outermost modifier if it is a pointer.
    pub fn pop_pointer(&mut self) -> bool {
        match self.modifiers.last() {
            Some(m) if m.is_pointer() => {
                self.modifiers.pop();
                true
            }
            _ => false,
        }
    }

    /// No modifiers at all.
    pub fn is_plain(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn is_pointer(&self) -> bool {
        self.modifiers.last().is_some_and(|m| m.is_pointer())
    }

    pub fn key(&self) -> TypeKey {
        TypeKey {
            base: self.base,
            modifiers: self.modifiers.clone(),
        }
    }
}
