//! Semantic pass.
//!
//! One forward walk over every registered unit. [`VisitPolicy`] has a hook
//! per unit kind and per child (enum item, struct field, parameter); a target
//! overrides the hooks it cares about and calls the matching `default_*`
//! function to keep the stock behavior.
//!
//! Each unit is checked out of the registry while its hooks run, so hooks
//! get the unit mutably and the rest of the registry read-only.
//!
//! Stock behavior:
//! - enums whose name reads as a flag set are marked `is_flags`
//! - a struct field typed as a fixed array of a primitive becomes the
//!   primitive with an inline length

use tracing::trace;

use cbind_ir::{
    DelegateUnit, EnumItem, EnumUnit, Field, FixedArrayUnit, FunctionUnit, MacroUnit, Param,
    Registry, StructUnit, Unit, UnitMeta,
};
use cbind_lower::naming::is_flags_name;


pub trait VisitPolicy {
    /// Runs after the kind-specific hook of every unit.
    fn visit_unit(&mut self, registry: &Registry, unit: &mut Unit) {
        let _ = (registry, unit);
    }

    fn visit_macro(&mut self, registry: &Registry, unit: &mut MacroUnit) {
        let _ = (registry, unit);
    }

    fn visit_enum(&mut self, registry: &Registry, unit: &mut EnumUnit) {
        default_visit_enum(self, registry, unit);
    }

    fn visit_enum_item(&mut self, registry: &Registry, owner: &UnitMeta, item: &mut EnumItem) {
        let _ = (registry, owner, item);
    }

    fn visit_struct(&mut self, registry: &Registry, unit: &mut StructUnit) {
        default_visit_struct(self, registry, unit);
    }

    fn visit_struct_field(&mut self, registry: &Registry, owner: &UnitMeta, field: &mut Field) {
        let _ = owner;
        default_visit_struct_field(registry, field);
    }

    fn visit_function(&mut self, registry: &Registry, unit: &mut FunctionUnit) {
        default_visit_function(self, registry, unit);
    }

    fn visit_function_param(&mut self, registry: &Registry, owner: &UnitMeta, param: &mut Param) {
        let _ = (registry, owner, param);
    }

    fn visit_delegate(&mut self, registry: &Registry, unit: &mut DelegateUnit) {
        default_visit_delegate(self, registry, unit);
    }

    fn visit_delegate_param(&mut self, registry: &Registry, owner: &UnitMeta, param: &mut Param) {
        let _ = (registry, owner, param);
    }

    fn visit_fixed_array(&mut self, registry: &Registry, unit: &mut FixedArrayUnit) {
        let _ = (registry, unit);
    }
}

/// Stock policy: only the default behavior.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultVisitor;

impl VisitPolicy for DefaultVisitor {}

pub fn default_visit_enum<P: VisitPolicy + ?Sized>(
    policy: &mut P,
    registry: &Registry,
    unit: &mut EnumUnit,
) {
    if is_flags_name(registry.resolve_name(unit.meta.name)) {
        unit.is_flags = true;
    }
    let EnumUnit { meta, items, .. } = unit;
    for item in items {
        policy.visit_enum_item(registry, meta, item);
    }
}

pub fn default_visit_struct<P: VisitPolicy + ?Sized>(
    policy: &mut P,
    registry: &Registry,
    unit: &mut StructUnit,
) {
    let StructUnit { meta, fields, .. } = unit;
    for field in fields {
        policy.visit_struct_field(registry, meta, field);
    }
}

/// Collapse a field typed as a primitive fixed array.
pub fn default_visit_struct_field(registry: &Registry, field: &mut Field) {
    if !field.ty.is_plain() {
        return;
    }
    let Some(array) = registry
        .unit_by_name(field.ty.base)
        .and_then(Unit::as_fixed_array)
    else {
        return;
    };
    if array.element_is_primitive {
        field.ty = array.element.clone();
        field.fixed_len = Some(array.len);
    }
}

pub fn default_visit_function<P: VisitPolicy + ?Sized>(
    policy: &mut P,
    registry: &Registry,
    unit: &mut FunctionUnit,
) {
    let FunctionUnit { meta, sig, .. } = unit;
    for param in &mut sig.params {
        policy.visit_function_param(registry, meta, param);
    }
}

pub fn default_visit_delegate<P: VisitPolicy + ?Sized>(
    policy: &mut P,
    registry: &Registry,
    unit: &mut DelegateUnit,
) {
    let DelegateUnit { meta, sig, .. } = unit;
    for param in &mut sig.params {
        policy.visit_delegate_param(registry, meta, param);
    }
}

/// Run `policy` over every unit, in registration order.
#[tracing::instrument(level = "debug", skip_all, fields(units = registry.len()))]
pub fn visit_all(registry: &mut Registry, policy: &mut dyn VisitPolicy) {
    for id in registry.ids() {
        registry.update_detached(id, |unit, rest| {
            trace!(name = rest.resolve_name(unit.name()), kind = %unit.kind(), "visit");
            dispatch(policy, rest, unit);
        });
    }
}

fn dispatch(policy: &mut dyn VisitPolicy, registry: &Registry, unit: &mut Unit) {
    match unit {
        Unit::Macro(m) => policy.visit_macro(registry, m),
        Unit::Enum(e) => policy.visit_enum(registry, e),
        Unit::Struct(s) => policy.visit_struct(registry, s),
        Unit::Function(f) => policy.visit_function(registry, f),
        Unit::Delegate(d) => policy.visit_delegate(registry, d),
        Unit::FixedArray(a) => policy.visit_fixed_array(registry, a),
    }
    policy.visit_unit(registry, unit);
}
