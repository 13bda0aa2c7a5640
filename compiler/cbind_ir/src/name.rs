//! Interned unit names.
//!
//! Every registered unit and every type reference base is keyed by a
//! [`Name`]. Strings are leaked into `'static` storage so resolving a name
//! never borrows the interner; a generator run interns a few thousand
//! identifiers at most.

use std::cell::RefCell;
use std::fmt;

use rustc_hash::FxHashMap;

/// Interned string identifier.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[derive(Default)]
struct Strings {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// Single-threaded string interner.
///
/// Interning goes through a `RefCell` so passes holding `&Registry` can still
/// mint names for the units they are about to register.
pub struct StringInterner {
    inner: RefCell<Strings>,
}

impl StringInterner {
    pub fn new() -> Self {
        let mut strings = Strings::default();
        strings.map.insert("", Name::EMPTY);
        strings.strings.push("");
        StringInterner {
            inner: RefCell::new(strings),
        }
    }

    /// Intern `s`, returning the existing name when already present.
    ///
    /// # Panics
    /// Panics past `u32::MAX` distinct strings.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(name) = self.get(s) {
            return name;
        }
        let mut inner = self.inner.borrow_mut();
        let index = u32::try_from(inner.strings.len())
            .unwrap_or_else(|_| panic!("string interner exceeded {} entries", u32::MAX));
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name(index);
        inner.strings.push(leaked);
        inner.map.insert(leaked, name);
        name
    }

    /// Name of `s` if it was interned before.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.inner.borrow().map.get(s).copied()
    }

    /// String behind `name`; unknown names resolve to `""`.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.inner
            .borrow()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}
