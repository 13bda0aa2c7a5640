//! Naming pass.
//!
//! Runs after the visitor pass and gives every unit, enum item, field and
//! parameter its final identifier, and every type reference its display
//! name. [`RenamePolicy`] has one hook per unit kind and per child; a hook
//! that leaves a name unset gets the source name.
//!
//! Units are renamed lazily: naming a unit first names every unit its type
//! references reach, then fills the display names of its own references.
//! Each unit is named once, which also stops the walk on cyclic type graphs.

use tracing::trace;

use cbind_ir::{
    DelegateUnit, EnumItem, EnumUnit, Field, FixedArrayUnit, FunctionUnit, MacroUnit, Param,
    Registry, StructUnit, TypeRef, Unit, UnitId, UnitMeta,
};
use cbind_lower::naming::{camel_join, common_prefix_len, split_words, to_camel};


pub trait RenamePolicy {
    fn rename_macro(&mut self, registry: &Registry, unit: &mut MacroUnit) {
        let _ = (registry, unit);
    }

    fn rename_enum(&mut self, registry: &Registry, unit: &mut EnumUnit) {
        default_rename_enum(self, registry, unit);
    }

    /// Runs after the item got its prefix-stripped name.
    fn rename_enum_item(&mut self, registry: &Registry, owner: &UnitMeta, item: &mut EnumItem) {
        let _ = (registry, owner, item);
    }

    fn rename_struct(&mut self, registry: &Registry, unit: &mut StructUnit) {
        default_rename_struct(self, registry, unit);
    }

    fn rename_struct_field(&mut self, registry: &Registry, owner: &UnitMeta, field: &mut Field) {
        let _ = (registry, owner);
        default_rename_struct_field(field);
    }

    fn rename_function(&mut self, registry: &Registry, unit: &mut FunctionUnit) {
        default_rename_function(self, registry, unit);
    }

    fn rename_param(&mut self, registry: &Registry, owner: &UnitMeta, param: &mut Param) {
        let _ = (registry, owner, param);
    }

    fn rename_delegate(&mut self, registry: &Registry, unit: &mut DelegateUnit) {
        default_rename_delegate(self, registry, unit);
    }

    fn rename_fixed_array(&mut self, registry: &Registry, unit: &mut FixedArrayUnit) {
        let _ = (registry, unit);
    }
}

/// Stock policy: only the default behavior.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultRenamer;

impl RenamePolicy for DefaultRenamer {}

/// Strip the words every item shares and camel-join the rest.
pub fn default_rename_enum<P: RenamePolicy + ?Sized>(
    policy: &mut P,
    registry: &Registry,
    unit: &mut EnumUnit,
) {
    let names = enum_item_names(unit.items.iter().map(|item| item.name.as_str()));
    let EnumUnit { meta, items, .. } = unit;
    for (item, name) in items.iter_mut().zip(names) {
        item.host_name = Some(name);
        policy.rename_enum_item(registry, meta, item);
    }
}

/// `{COLOR_RED, COLOR_GREEN}` → `{Red, Green}`. A name starting with a digit
/// gets a leading underscore.
pub fn enum_item_names<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let split: Vec<Vec<&str>> = items.into_iter().map(split_words).collect();
    let prefix = common_prefix_len(&split);
    split
        .iter()
        .map(|words| {
            let name = camel_join(words.iter().skip(prefix).copied());
            if name.starts_with(|c: char| c.is_ascii_digit()) {
                format!("_{name}")
            } else {
                name
            }
        })
        .collect()
}

pub fn default_rename_struct<P: RenamePolicy + ?Sized>(
    policy: &mut P,
    registry: &Registry,
    unit: &mut StructUnit,
) {
    let StructUnit { meta, fields, .. } = unit;
    for field in fields {
        policy.rename_struct_field(registry, meta, field);
    }
}

pub fn default_rename_struct_field(field: &mut Field) {
    field.host_name = Some(to_camel(&field.name));
}

pub fn default_rename_function<P: RenamePolicy + ?Sized>(
    policy: &mut P,
    registry: &Registry,
    unit: &mut FunctionUnit,
) {
    let FunctionUnit { meta, sig, .. } = unit;
    for param in &mut sig.params {
        policy.rename_param(registry, meta, param);
    }
}

pub fn default_rename_delegate<P: RenamePolicy + ?Sized>(
    policy: &mut P,
    registry: &Registry,
    unit: &mut DelegateUnit,
) {
    let DelegateUnit { meta, sig, .. } = unit;
    for param in &mut sig.params {
        policy.rename_param(registry, meta, param);
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum State {
    Pending,
    Named,
    Done,
}

/// Rename every unit, walking from each unit to the units it references.
#[tracing::instrument(level = "debug", skip_all, fields(units = registry.len()))]
pub fn rename_all(registry: &mut Registry, policy: &mut dyn RenamePolicy) {
    let ids = registry.ids();
    let slots = ids.last().map_or(0, |id| id.index() + 1);
    let mut state = vec![State::Pending; slots];
    let mut stack: Vec<(UnitId, bool)> = Vec::new();

    for root in ids {
        stack.push((root, false));
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                registry.update_detached(id, |unit, rest| fill_type_names(unit, rest));
                state[id.index()] = State::Done;
                continue;
            }
            if state[id.index()] != State::Pending {
                continue;
            }

            let referenced = registry.update_detached(id, |unit, rest| {
                name_unit(policy, rest, unit);
                referenced_units(unit, rest)
            });
            state[id.index()] = State::Named;
            stack.push((id, true));
            for next in referenced.unwrap_or_default() {
                if state.get(next.index()) == Some(&State::Pending) {
                    stack.push((next, false));
                }
            }
        }
    }
}

fn name_unit(policy: &mut dyn RenamePolicy, registry: &Registry, unit: &mut Unit) {
    match unit {
        Unit::Macro(m) => policy.rename_macro(registry, m),
        Unit::Enum(e) => {
            policy.rename_enum(registry, e);
            for item in &mut e.items {
                item.host_name.get_or_insert_with(|| item.name.clone());
            }
        }
        Unit::Struct(s) => {
            policy.rename_struct(registry, s);
            for field in &mut s.fields {
                field.host_name.get_or_insert_with(|| field.name.clone());
            }
        }
        Unit::Function(f) => {
            policy.rename_function(registry, f);
            name_params(&mut f.sig.params);
        }
        Unit::Delegate(d) => {
            policy.rename_delegate(registry, d);
            name_params(&mut d.sig.params);
        }
        Unit::FixedArray(a) => policy.rename_fixed_array(registry, a),
    }
    let source = registry.resolve_name(unit.name());
    let meta = unit.meta_mut();
    meta.host_name.get_or_insert_with(|| source.to_owned());
    trace!(name = source, host = meta.host_name.as_deref(), "renamed");
}

fn name_params(params: &mut [Param]) {
    for param in params {
        param.host_name.get_or_insert_with(|| param.name.clone());
    }
}

fn type_refs(unit: &Unit) -> Vec<&TypeRef> {
    match unit {
        Unit::Macro(_) | Unit::Enum(_) => Vec::new(),
        Unit::Struct(s) => s.fields.iter().map(|f| &f.ty).collect(),
        Unit::Function(FunctionUnit { sig, .. }) | Unit::Delegate(DelegateUnit { sig, .. }) => {
            std::iter::once(&sig.return_type)
                .chain(sig.params.iter().map(|p| &p.ty))
                .collect()
        }
        Unit::FixedArray(a) => vec![&a.element],
    }
}

fn type_refs_mut(unit: &mut Unit) -> Vec<&mut TypeRef> {
    match unit {
        Unit::Macro(_) | Unit::Enum(_) => Vec::new(),
        Unit::Struct(s) => s.fields.iter_mut().map(|f| &mut f.ty).collect(),
        Unit::Function(FunctionUnit { sig, .. }) | Unit::Delegate(DelegateUnit { sig, .. }) => {
            std::iter::once(&mut sig.return_type)
                .chain(sig.params.iter_mut().map(|p| &mut p.ty))
                .collect()
        }
        Unit::FixedArray(a) => vec![&mut a.element],
    }
}

fn referenced_units(unit: &Unit, registry: &Registry) -> Vec<UnitId> {
    type_refs(unit)
        .into_iter()
        .filter_map(|ty| registry.lookup(ty.base))
        .collect()
}

fn fill_type_names(unit: &mut Unit, registry: &Registry) {
    let own = unit.name();
    let own_host = unit.host_name().map(str::to_owned);
    for ty in type_refs_mut(unit) {
        if ty.host_name.is_some() {
            continue;
        }
        let base = if ty.base == own {
            own_host.as_deref()
        } else {
            registry.unit_by_name(ty.base).and_then(Unit::host_name)
        };
        ty.host_name = Some(display_name(registry, ty, base));
    }
}

/// `base` plus one `*` per modifier. Unregistered bases display as their
/// source name.
pub fn display_name(registry: &Registry, ty: &TypeRef, base: Option<&str>) -> String {
    let base = base.unwrap_or_else(|| registry.resolve_name(ty.base));
    format!("{base}{}", "*".repeat(ty.modifiers.len()))
}
