//! Type resolution.
//!
//! Maps a raw [`CType`] to a [`TypeRef`]. Rules, after the name-hint reuse
//! check and the target override:
//!
//! | Raw shape | Result |
//! |-----------|--------|
//! | builtin | primitive |
//! | `size_t` typedef | `size_t` |
//! | other typedef | its target, with the typedef name as the hint |
//! | `T[N]` | shared fixed array unit |
//! | `T[]`, `T[*]` | element + `Array` (`T *x[]` of non-builtin `T`: `T**`) |
//! | struct, union, enum | nested unit, named by tag or hint |
//! | `T*` | pointee + `Pointer`/`ConstPointer`, unless the pointee is a delegate |
//! | function | delegate named by the hint |
//!
//! The hint is the name a nameless type would take. It flows down through
//! typedefs, pointers and arrays.

use std::fmt::Write;

use cbind_ir::{FixedArrayUnit, Modifier, Primitive, TypeRef, UnitKind, UnitMeta};

use super::Lowerer;
use crate::decl::{ArraySize, CType, EnumDecl, RecordDecl};
use crate::error::LowerError;

impl Lowerer {
    pub(super) fn resolve(
        &mut self,
        ty: &CType,
        hint: Option<&str>,
        in_struct: bool,
    ) -> Result<TypeRef, LowerError> {
        if let Some(existing) = hint.and_then(|hint| self.known_delegate(hint)) {
            return Ok(existing);
        }
        if let Some(resolved) = self.type_override.resolve(&mut self.registry, ty) {
            return Ok(resolved);
        }

        match ty {
            CType::Builtin(builtin) => Ok(self.registry.primitive(builtin.primitive())),
            CType::Typedef(def) if def.name == "size_t" => {
                Ok(self.registry.primitive(Primitive::SizeT))
            }
            CType::Typedef(def) => self.resolve(&def.ty, Some(&def.name), in_struct),
            CType::Array {
                element,
                size: ArraySize::Constant(len),
                ..
            } => self.fixed_array(element, *len, hint),
            CType::Array {
                element,
                element_const,
                ..
            } => self.open_array(element, *element_const, hint, in_struct),
            CType::Record(record) => self.nested_record(record, hint),
            CType::Enum(decl) => self.nested_enum(decl, hint),
            CType::Pointer {
                pointee,
                pointee_const,
            } => {
                let mut resolved = self.resolve(pointee, hint, in_struct)?;
                if !self.is_delegate(&resolved) {
                    resolved.push(if *pointee_const {
                        Modifier::ConstPointer
                    } else {
                        Modifier::Pointer
                    });
                }
                Ok(resolved)
            }
            CType::Function(function) => {
                let name = hint.ok_or(LowerError::AnonymousType {
                    kind: "function type",
                })?;
                self.make_delegate(function, name, in_struct)
            }
            CType::Unsupported(spelling) => Err(LowerError::UnsupportedType {
                spelling: spelling.clone(),
            }),
        }
    }

    fn known_delegate(&self, name: &str) -> Option<TypeRef> {
        let unit = self
            .registry
            .lookup_str(name)
            .and_then(|id| self.registry.get(id))?;
        (unit.kind() == UnitKind::Delegate).then(|| TypeRef::new(unit.name()))
    }

    /// A delegate already denotes a callable reference.
    pub(super) fn is_delegate(&self, ty: &TypeRef) -> bool {
        ty.is_plain() && self.registry.kind_of(ty.base) == Some(UnitKind::Delegate)
    }

    fn fixed_array(
        &mut self,
        element: &CType,
        len: u32,
        hint: Option<&str>,
    ) -> Result<TypeRef, LowerError> {
        let element = self.resolve(element, hint, true)?;
        if let Some(unit) = self
            .registry
            .fixed_array(&element, len)
            .and_then(|id| self.registry.get(id))
        {
            return Ok(TypeRef::new(unit.name()));
        }

        let name = fixed_array_name(self.registry.resolve_name(element.base), &element, len);
        let name = self.registry.intern(&name);
        let element_is_primitive = element.is_plain() && self.registry.is_primitive(element.base);
        self.registry.register_fixed_array(FixedArrayUnit {
            meta: UnitMeta::new(name),
            element,
            len,
            element_is_primitive,
        });
        Ok(TypeRef::new(name))
    }

    fn open_array(
        &mut self,
        element: &CType,
        element_const: bool,
        hint: Option<&str>,
        in_struct: bool,
    ) -> Result<TypeRef, LowerError> {
        let mut resolved = self.resolve(element, hint, in_struct)?;
        match element {
            // The element count is unknown here, so `T *x[]` is modeled as `T**`.
            CType::Pointer { pointee, .. } if !is_builtin_like(pointee) => {
                resolved.push(Modifier::Pointer);
            }
            _ => resolved.push(if element_const {
                Modifier::ConstArray
            } else {
                Modifier::Array
            }),
        }
        Ok(resolved)
    }

    fn nested_record(
        &mut self,
        record: &RecordDecl,
        hint: Option<&str>,
    ) -> Result<TypeRef, LowerError> {
        let name = self
            .make_struct(record, hint)?
            .ok_or(LowerError::AnonymousType {
                kind: if record.is_union { "union" } else { "struct" },
            })?;
        Ok(TypeRef::new(name))
    }

    fn nested_enum(&mut self, decl: &EnumDecl, hint: Option<&str>) -> Result<TypeRef, LowerError> {
        let name = self
            .make_enum(decl, hint)?
            .ok_or(LowerError::AnonymousType { kind: "enum" })?;
        Ok(TypeRef::new(name))
    }
}

/// A builtin, or a typedef of one.
fn is_builtin_like(ty: &CType) -> bool {
    match ty {
        CType::Builtin(_) => true,
        CType::Typedef(def) => def.ty.is_builtin(),
        _ => false,
    }
}

/// `int_array4`, `byte_ptrArray4`, `byte_ptrPtrArray4`, `int_array4_array2`.
fn fixed_array_name(element: &str, element_ty: &TypeRef, len: u32) -> String {
    let mut name = format!("{element}_");
    if element_ty.modifiers.is_empty() {
        name.push_str("array");
    } else {
        name.push_str("ptr");
        for _ in 1..element_ty.modifiers.len() {
            name.push_str("Ptr");
        }
        name.push_str("Array");
    }
    let _ = write!(name, "{len}");
    name
}
