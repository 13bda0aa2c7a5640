//! Unit registry.
//!
//! Owns every unit of a generator run, keyed by interned source name.
//!
//! # Design
//!
//! - Arena of slots indexed by [`UnitId`]; ids are stable, so a struct
//!   placeholder filled in later keeps every reference valid
//! - Name index (`FxHashMap`) for lookup; slot order is insertion order
//! - Structural index for fixed arrays, keyed by (element type, length)
//! - Suppressed names are removed and can never be registered again

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use cbind_macro::{MacroEnv, MacroInfo};

use crate::name::{Name, StringInterner};
use crate::primitive::Primitive;
use crate::types::{TypeKey, TypeRef};
use crate::unit::{FixedArrayUnit, Unit, UnitKind};


/// Stable handle to a registered unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(u32);

impl UnitId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    interner: StringInterner,
    /// `None` for suppressed units and for a unit checked out by
    /// [`Registry::update_detached`].
    slots: Vec<Option<Unit>>,
    by_name: FxHashMap<Name, UnitId>,
    suppressed: FxHashSet<Name>,
    fixed_arrays: FxHashMap<(TypeKey, u32), UnitId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn resolve_name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Reference to a primitive type.
    pub fn primitive(&self, primitive: Primitive) -> TypeRef {
        TypeRef::new(self.intern(primitive.name()))
    }

    /// Register `unit` under its source name.
    ///
    /// When the name is taken the existing id is returned and `unit` is
    /// dropped. Suppressed names yield `None`.
    pub fn insert(&mut self, unit: Unit) -> Option<UnitId> {
        let name = unit.name();
        if self.suppressed.contains(&name) {
            trace!(name = self.resolve_name(name), "refusing suppressed unit");
            return None;
        }
        if let Some(&id) = self.by_name.get(&name) {
            return Some(id);
        }

        let index = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("registry exceeded {} units", u32::MAX));
        let id = UnitId(index);
        trace!(name = self.resolve_name(name), kind = %unit.kind(), "registered unit");
        self.slots.push(Some(unit));
        self.by_name.insert(name, id);
        Some(id)
    }

    pub fn lookup(&self, name: Name) -> Option<UnitId> {
        self.by_name.get(&name).copied()
    }

    /// Lookup by string without interning it.
    pub fn lookup_str(&self, name: &str) -> Option<UnitId> {
        self.interner.get(name).and_then(|name| self.lookup(name))
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn unit_by_name(&self, name: Name) -> Option<&Unit> {
        self.lookup(name).and_then(|id| self.get(id))
    }

    pub fn kind_of(&self, name: Name) -> Option<UnitKind> {
        self.unit_by_name(name).map(Unit::kind)
    }

    /// Remove the unit named `name` (if any) and refuse it from now on.
    pub fn suppress(&mut self, name: &str) {
        let name = self.intern(name);
        self.suppressed.insert(name);
        if let Some(id) = self.by_name.remove(&name) {
            if let Some(slot) = self.slots.get_mut(id.index()) {
                *slot = None;
            }
            self.fixed_arrays.retain(|_, v| *v != id);
        }
    }

    pub fn is_suppressed(&self, name: Name) -> bool {
        self.suppressed.contains(&name)
    }

    /// A base name with no registered unit that names a primitive.
    pub fn is_primitive(&self, name: Name) -> bool {
        self.lookup(name).is_none() && Primitive::from_name(self.resolve_name(name)).is_some()
    }

    /// Existing fixed array of `element` × `len`.
    pub fn fixed_array(&self, element: &TypeRef, len: u32) -> Option<UnitId> {
        self.fixed_arrays.get(&(element.key(), len)).copied()
    }

    /// Register a fixed array, deduplicating by element type and length.
    pub fn register_fixed_array(&mut self, unit: FixedArrayUnit) -> Option<UnitId> {
        let key = (unit.element.key(), unit.len);
        if let Some(&id) = self.fixed_arrays.get(&key) {
            return Some(id);
        }
        let id = self.insert(Unit::FixedArray(unit))?;
        self.fixed_arrays.insert(key, id);
        Some(id)
    }

    /// Live units in insertion order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot count is bounded by u32 in insert"
    )]
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &Unit)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|unit| (UnitId(i as u32), unit)))
    }

    /// Snapshot of live ids, for passes that mutate while walking.
    pub fn ids(&self) -> Vec<UnitId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Check out one unit for mutation while the rest stays readable.
    ///
    /// While `f` runs the unit is absent from the registry: `get(id)` returns
    /// `None`. Returns `None` if `id` is not live.
    pub fn update_detached<R>(
        &mut self,
        id: UnitId,
        f: impl FnOnce(&mut Unit, &Registry) -> R,
    ) -> Option<R> {
        let mut unit = self.slots.get_mut(id.index())?.take()?;
        let result = f(&mut unit, self);
        self.slots[id.index()] = Some(unit);
        Some(result)
    }
}

impl MacroEnv for Registry {
    fn lookup(&self, name: &str) -> Option<MacroInfo<'_>> {
        let unit = self.lookup_str(name).and_then(|id| self.get(id))?;
        let Unit::Macro(m) = unit else {
            return None;
        };
        // Classification and rewriting happen together; a macro without a
        // rewritten form has not been classified yet.
        Some(MacroInfo {
            ty: m.ty.as_ref(),
            expr: m.expr.as_ref(),
            constant: m.rewritten.is_some().then_some(m.constant),
        })
    }
}
