//! Stock target policies.
//!
//! Building blocks for target modules. Each is a small policy object a
//! generator is configured with; none of them is active by default.
//!
//! Type overrides: [`OpaqueHandles`], [`BoolTypedef`], [`ChainOverride`].
//!
//! Visitors: [`OutParams`], [`ErrorMessageParams`], [`BoolMarshal`],
//! [`TextParams`], [`StructAttribute`], [`BoolFields`], combined with
//! [`ChainVisitor`].
//!
//! Renamers: [`PrefixStripRenamer`].

use tracing::trace;

use cbind_ir::{
    DelegateUnit, EnumItem, EnumUnit, Field, FixedArrayUnit, FunctionUnit, MacroUnit, Modifier,
    Param, ParamModifier, Primitive, Registry, Signature, StructUnit, TypeRef, Unit, UnitMeta,
};
use cbind_lower::{CType, TypeOverride};

use crate::rename::{default_rename_function, RenamePolicy};
use crate::visit::{
    default_visit_delegate, default_visit_function, default_visit_struct,
    default_visit_struct_field, VisitPolicy,
};

/// Opaque handle typedefs become single-pointer structs.
///
/// A typedef named `<prefix>...<suffix>` whose target is a pointer to a
/// record resolves to a complete struct of that name holding one `void*`
/// field called `Pointer`, so every handle type stays distinct.
#[derive(Clone, Debug)]
pub struct OpaqueHandles {
    pub prefix: String,
    pub suffix: String,
}

impl OpaqueHandles {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        OpaqueHandles {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        name.len() > self.prefix.len() + self.suffix.len()
            && name.starts_with(&self.prefix)
            && name.ends_with(&self.suffix)
    }
}

impl TypeOverride for OpaqueHandles {
    fn resolve(&mut self, registry: &mut Registry, ty: &CType) -> Option<TypeRef> {
        let CType::Typedef(def) = ty else {
            return None;
        };
        if !self.matches(&def.name) {
            return None;
        }
        let CType::Pointer { pointee, .. } = &def.ty else {
            return None;
        };
        if !matches!(pointee.desugar(), CType::Record(_)) {
            return None;
        }

        let name = registry.intern(&def.name);
        if registry.lookup(name).is_none() {
            let void = registry.primitive(Primitive::Void);
            let mut handle = StructUnit::placeholder(UnitMeta::new(name));
            handle.complete = true;
            handle.fields = vec![Field::new("Pointer", void.with_modifier(Modifier::Pointer))];
            trace!(name = %def.name, "registered opaque handle");
            registry.insert(Unit::Struct(handle));
        }
        Some(TypeRef::new(name))
    }
}

/// A typedef with this name resolves to `bool`.
#[derive(Clone, Debug)]
pub struct BoolTypedef {
    pub name: String,
}

impl BoolTypedef {
    pub fn new(name: impl Into<String>) -> Self {
        BoolTypedef { name: name.into() }
    }
}

impl TypeOverride for BoolTypedef {
    fn resolve(&mut self, registry: &mut Registry, ty: &CType) -> Option<TypeRef> {
        match ty {
            CType::Typedef(def) if def.name == self.name => {
                Some(registry.primitive(Primitive::Bool))
            }
            _ => None,
        }
    }
}

/// Tries each override in order; the first answer wins.
#[derive(Default)]
pub struct ChainOverride {
    overrides: Vec<Box<dyn TypeOverride>>,
}

impl ChainOverride {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, type_override: impl TypeOverride + 'static) -> Self {
        self.overrides.push(Box::new(type_override));
        self
    }
}

impl TypeOverride for ChainOverride {
    fn resolve(&mut self, registry: &mut Registry, ty: &CType) -> Option<TypeRef> {
        self.overrides
            .iter_mut()
            .find_map(|type_override| type_override.resolve(registry, ty))
    }
}

/// Function names lose a shared library prefix: `LLVMGetValueName`
/// becomes `GetValueName`.
#[derive(Clone, Debug)]
pub struct PrefixStripRenamer {
    pub prefix: String,
}

impl PrefixStripRenamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        PrefixStripRenamer {
            prefix: prefix.into(),
        }
    }
}

impl RenamePolicy for PrefixStripRenamer {
    fn rename_function(&mut self, registry: &Registry, unit: &mut FunctionUnit) {
        default_rename_function(self, registry, unit);
        let source = registry.resolve_name(unit.meta.name);
        let stripped = source
            .strip_prefix(self.prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(source);
        unit.meta.host_name = Some(stripped.to_owned());
    }
}

/// Out-parameter detection.
///
/// In functions and delegates whose name starts with one of
/// `function_prefixes`, a parameter named `Out<Upper>...` with at least one
/// modifier is marked [`ParamModifier::Out`] and loses its outermost
/// modifier: `LLVMValueRef *OutValue` becomes `out LLVMValueRef`.
#[derive(Clone, Debug, Default)]
pub struct OutParams {
    pub function_prefixes: Vec<String>,
}

impl OutParams {
    pub fn new<I, S>(function_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OutParams {
            function_prefixes: function_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    fn applies_to(&self, registry: &Registry, owner: &UnitMeta) -> bool {
        let name = registry.resolve_name(owner.name);
        self.function_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    fn mark(&self, registry: &Registry, owner: &UnitMeta, param: &mut Param) {
        if !self.applies_to(registry, owner) || !is_out_name(&param.name) {
            return;
        }
        if param.ty.modifiers.pop().is_some() {
            param.modifier = ParamModifier::Out;
        }
    }
}

/// `Out` followed by an uppercase letter.
fn is_out_name(name: &str) -> bool {
    name.strip_prefix("Out")
        .and_then(|rest| rest.bytes().next())
        .is_some_and(|b| b.is_ascii_uppercase())
}

impl VisitPolicy for OutParams {
    fn visit_function_param(&mut self, registry: &Registry, owner: &UnitMeta, param: &mut Param) {
        self.mark(registry, owner, param);
    }

    fn visit_delegate_param(&mut self, registry: &Registry, owner: &UnitMeta, param: &mut Param) {
        self.mark(registry, owner, param);
    }
}

/// Runs several visit policies, in order, over each unit.
///
/// A policy sees the unit as the previous one left it. Every policy that
/// keeps a default kind hook repeats the stock behavior, which is
/// idempotent. An empty chain leaves units untouched.
#[derive(Default)]
pub struct ChainVisitor {
    policies: Vec<Box<dyn VisitPolicy>>,
}

impl ChainVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, policy: impl VisitPolicy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }
}

impl VisitPolicy for ChainVisitor {
    fn visit_unit(&mut self, registry: &Registry, unit: &mut Unit) {
        for policy in &mut self.policies {
            policy.visit_unit(registry, unit);
        }
    }

    fn visit_macro(&mut self, registry: &Registry, unit: &mut MacroUnit) {
        for policy in &mut self.policies {
            policy.visit_macro(registry, unit);
        }
    }

    fn visit_enum(&mut self, registry: &Registry, unit: &mut EnumUnit) {
        for policy in &mut self.policies {
            policy.visit_enum(registry, unit);
        }
    }

    fn visit_enum_item(&mut self, registry: &Registry, owner: &UnitMeta, item: &mut EnumItem) {
        for policy in &mut self.policies {
            policy.visit_enum_item(registry, owner, item);
        }
    }

    fn visit_struct(&mut self, registry: &Registry, unit: &mut StructUnit) {
        for policy in &mut self.policies {
            policy.visit_struct(registry, unit);
        }
    }

    fn visit_struct_field(&mut self, registry: &Registry, owner: &UnitMeta, field: &mut Field) {
        for policy in &mut self.policies {
            policy.visit_struct_field(registry, owner, field);
        }
    }

    fn visit_function(&mut self, registry: &Registry, unit: &mut FunctionUnit) {
        for policy in &mut self.policies {
            policy.visit_function(registry, unit);
        }
    }

    fn visit_function_param(&mut self, registry: &Registry, owner: &UnitMeta, param: &mut Param) {
        for policy in &mut self.policies {
            policy.visit_function_param(registry, owner, param);
        }
    }

    fn visit_delegate(&mut self, registry: &Registry, unit: &mut DelegateUnit) {
        for policy in &mut self.policies {
            policy.visit_delegate(registry, unit);
        }
    }

    fn visit_delegate_param(&mut self, registry: &Registry, owner: &UnitMeta, param: &mut Param) {
        for policy in &mut self.policies {
            policy.visit_delegate_param(registry, owner, param);
        }
    }

    fn visit_fixed_array(&mut self, registry: &Registry, unit: &mut FixedArrayUnit) {
        for policy in &mut self.policies {
            policy.visit_fixed_array(registry, unit);
        }
    }
}

fn has_base(registry: &Registry, ty: &TypeRef, primitive: Primitive) -> bool {
    ty.base == registry.primitive(primitive).base
}

/// `char` behind exactly `modifiers`.
fn is_char_pointer(registry: &Registry, ty: &TypeRef, modifiers: &[Modifier]) -> bool {
    has_base(registry, ty, Primitive::Byte) && ty.modifiers.as_slice() == modifiers
}

/// Error-message out parameters become text handles.
///
/// A `char**` parameter named `OutMessage...`, `ErrorMessage...`,
/// `...OutError` or containing `ErrMsg` becomes `out <text_handle>`: the
/// callee allocates the message and the caller disposes of it.
#[derive(Clone, Debug)]
pub struct ErrorMessageParams {
    pub text_handle: String,
}

impl ErrorMessageParams {
    pub fn new(text_handle: impl Into<String>) -> Self {
        ErrorMessageParams {
            text_handle: text_handle.into(),
        }
    }

    fn mark(&self, registry: &Registry, param: &mut Param) {
        if param.modifier != ParamModifier::None
            || !is_error_message_name(&param.name)
            || !is_char_pointer(registry, &param.ty, &[Modifier::Pointer, Modifier::Pointer])
        {
            return;
        }
        param.ty = TypeRef::new(registry.intern(&self.text_handle));
        param.modifier = ParamModifier::Out;
    }
}

fn is_error_message_name(name: &str) -> bool {
    name.starts_with("OutMessage")
        || name.starts_with("ErrorMessage")
        || name.contains("ErrMsg")
        || name.ends_with("OutError")
}

impl VisitPolicy for ErrorMessageParams {
    fn visit_function_param(&mut self, registry: &Registry, _owner: &UnitMeta, param: &mut Param) {
        self.mark(registry, param);
    }

    fn visit_delegate_param(&mut self, registry: &Registry, _owner: &UnitMeta, param: &mut Param) {
        self.mark(registry, param);
    }
}

/// `bool` returns and parameters carry a marshaling attribute, for targets
/// whose native boolean is wider than the host's.
#[derive(Clone, Debug)]
pub struct BoolMarshal {
    pub attr: String,
}

impl BoolMarshal {
    pub fn new(attr: impl Into<String>) -> Self {
        BoolMarshal { attr: attr.into() }
    }

    fn mark_return(&self, registry: &Registry, sig: &mut Signature) {
        if sig.return_type.is_plain() && has_base(registry, &sig.return_type, Primitive::Bool) {
            sig.return_attrs = vec![self.attr.clone()];
        }
    }

    fn mark_param(&self, registry: &Registry, param: &mut Param) {
        if param.ty.is_plain() && has_base(registry, &param.ty, Primitive::Bool) {
            param.attrs = vec![self.attr.clone()];
        }
    }
}

impl VisitPolicy for BoolMarshal {
    fn visit_function(&mut self, registry: &Registry, unit: &mut FunctionUnit) {
        default_visit_function(self, registry, unit);
        self.mark_return(registry, &mut unit.sig);
    }

    fn visit_function_param(&mut self, registry: &Registry, _owner: &UnitMeta, param: &mut Param) {
        self.mark_param(registry, param);
    }

    fn visit_delegate(&mut self, registry: &Registry, unit: &mut DelegateUnit) {
        default_visit_delegate(self, registry, unit);
        self.mark_return(registry, &mut unit.sig);
    }

    fn visit_delegate_param(&mut self, registry: &Registry, _owner: &UnitMeta, param: &mut Param) {
        self.mark_param(registry, param);
    }
}

/// `const char*` text becomes the host string type.
///
/// Returns of type `const char*` are retyped to `string_type` and tagged
/// with `attr`. So are `const char*` parameters whose name reads as text:
/// a `Name` or `Str` word (`FuncName`, `NameStr`, but not `Named` or
/// `Stride`), or exactly `ModuleID`, `Path` or `Ident`.
#[derive(Clone, Debug)]
pub struct TextParams {
    pub string_type: String,
    pub attr: String,
}

impl TextParams {
    pub fn new(string_type: impl Into<String>, attr: impl Into<String>) -> Self {
        TextParams {
            string_type: string_type.into(),
            attr: attr.into(),
        }
    }

    fn string(&self, registry: &Registry) -> TypeRef {
        TypeRef::new(registry.intern(&self.string_type))
    }

    fn mark_return(&self, registry: &Registry, sig: &mut Signature) {
        if is_char_pointer(registry, &sig.return_type, &[Modifier::ConstPointer]) {
            sig.return_type = self.string(registry);
            sig.return_attrs = vec![self.attr.clone()];
        }
    }

    fn mark_param(&self, registry: &Registry, param: &mut Param) {
        if param.modifier == ParamModifier::None
            && is_text_name(&param.name)
            && is_char_pointer(registry, &param.ty, &[Modifier::ConstPointer])
        {
            param.ty = self.string(registry);
            param.attrs = vec![self.attr.clone()];
        }
    }
}

fn is_text_name(name: &str) -> bool {
    if matches!(name, "ModuleID" | "Path" | "Ident") {
        return true;
    }
    ["Name", "Str"].into_iter().any(|word| {
        name.match_indices(word).any(|(at, _)| {
            matches!(
                name[at + word.len()..].bytes().next(),
                None | Some(b'A'..=b'Z')
            )
        })
    })
}

impl VisitPolicy for TextParams {
    fn visit_function(&mut self, registry: &Registry, unit: &mut FunctionUnit) {
        default_visit_function(self, registry, unit);
        self.mark_return(registry, &mut unit.sig);
    }

    fn visit_function_param(&mut self, registry: &Registry, _owner: &UnitMeta, param: &mut Param) {
        self.mark_param(registry, param);
    }

    fn visit_delegate(&mut self, registry: &Registry, unit: &mut DelegateUnit) {
        default_visit_delegate(self, registry, unit);
        self.mark_return(registry, &mut unit.sig);
    }

    fn visit_delegate_param(&mut self, registry: &Registry, _owner: &UnitMeta, param: &mut Param) {
        self.mark_param(registry, param);
    }
}

/// Structs named `<prefix>...<suffix>` get `attr`, once.
///
/// `StructAttribute::new("LLVM", "Ref", r#"DebuggerDisplay("{Pointer}")"#)`
/// shows handle structs by their pointer in a debugger.
#[derive(Clone, Debug)]
pub struct StructAttribute {
    pub prefix: String,
    pub suffix: String,
    pub attr: String,
}

impl StructAttribute {
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        attr: impl Into<String>,
    ) -> Self {
        StructAttribute {
            prefix: prefix.into(),
            suffix: suffix.into(),
            attr: attr.into(),
        }
    }
}

impl VisitPolicy for StructAttribute {
    fn visit_struct(&mut self, registry: &Registry, unit: &mut StructUnit) {
        default_visit_struct(self, registry, unit);
        let name = registry.resolve_name(unit.meta.name);
        if name.starts_with(self.prefix.as_str())
            && name.ends_with(self.suffix.as_str())
            && !unit.attrs.contains(&self.attr)
        {
            unit.attrs.push(self.attr.clone());
        }
    }
}

/// `bool` struct fields take a fixed-width boolean type (`bool_t`), keeping
/// their modifiers.
#[derive(Clone, Debug)]
pub struct BoolFields {
    pub type_name: String,
}

impl BoolFields {
    pub fn new(type_name: impl Into<String>) -> Self {
        BoolFields {
            type_name: type_name.into(),
        }
    }
}

impl VisitPolicy for BoolFields {
    fn visit_struct_field(&mut self, registry: &Registry, _owner: &UnitMeta, field: &mut Field) {
        default_visit_struct_field(registry, field);
        if has_base(registry, &field.ty, Primitive::Bool) {
            field.ty.base = registry.intern(&self.type_name);
        }
    }
}
