//! Function and delegate units.
//!
//! Parameters and return types resolve outside struct context: a fixed
//! array there decays to a pointer to its element.

use cbind_ir::{
    CallingConvention, DelegateUnit, FunctionUnit, Modifier, Param, Signature, TypeRef, Unit,
    UnitMeta,
};

use super::Lowerer;
use crate::decl::{CType, CallConv, FunctionDecl, FunctionType, ParamDecl};
use crate::error::LowerError;

impl Lowerer {
    /// Functions without an export are recorded and skipped.
    pub(super) fn lower_function(&mut self, decl: &FunctionDecl) -> Result<(), LowerError> {
        let Some(export) = self.exports.get(&decl.name).cloned() else {
            self.record_unresolved(&decl.name);
            return Ok(());
        };

        let return_type = self.resolve_signature_type(&decl.return_type, None)?;
        let params = self.lower_params(&decl.name, &decl.params)?;
        let unit = FunctionUnit {
            meta: UnitMeta::new(self.registry.intern(&decl.name)).with_doc(decl.doc.clone()),
            sig: Signature {
                return_type,
                params,
                calling_convention: calling_convention(decl.call_conv),
                return_attrs: Vec::new(),
            },
            library: export.library,
            library_is_const: export.library_is_const,
            deprecated: decl.deprecated.clone(),
        };
        self.registry.insert(Unit::Function(unit));
        Ok(())
    }

    /// Register a delegate called `name` unless the name is already taken.
    pub(super) fn make_delegate(
        &mut self,
        function: &FunctionType,
        name: &str,
        embedded: bool,
    ) -> Result<TypeRef, LowerError> {
        let interned = self.registry.intern(name);
        if self.registry.lookup(interned).is_none() {
            let return_type = self.resolve_signature_type(&function.return_type, None)?;
            let params = self.lower_params(name, &function.params)?;
            self.registry.insert(Unit::Delegate(DelegateUnit {
                meta: UnitMeta::new(interned),
                sig: Signature {
                    return_type,
                    params,
                    calling_convention: calling_convention(function.call_conv),
                    return_attrs: Vec::new(),
                },
                embedded,
            }));
        }
        Ok(TypeRef::new(interned))
    }

    /// Unnamed parameters become `p<i>`. A callback type in parameter `i`
    /// is named `<owner>_<param>`, or `<owner>_p<i>` when unnamed.
    fn lower_params(&mut self, owner: &str, decls: &[ParamDecl]) -> Result<Vec<Param>, LowerError> {
        let mut params = Vec::with_capacity(decls.len());
        for (i, decl) in decls.iter().enumerate() {
            let (name, hint) = if decl.name.is_empty() {
                (format!("p{i}"), format!("{owner}_p{i}"))
            } else {
                (decl.name.clone(), format!("{owner}_{}", decl.name))
            };
            let ty = self.resolve_signature_type(&decl.ty, Some(&hint))?;
            let mut param = Param::new(name, ty);
            param.doc = decl.doc.clone();
            params.push(param);
        }
        Ok(params)
    }

    fn resolve_signature_type(
        &mut self,
        ty: &CType,
        hint: Option<&str>,
    ) -> Result<TypeRef, LowerError> {
        let resolved = self.resolve(ty, hint, false)?;
        if resolved.is_plain() {
            if let Some(array) = self
                .registry
                .unit_by_name(resolved.base)
                .and_then(Unit::as_fixed_array)
            {
                return Ok(array.element.clone().with_modifier(Modifier::Pointer));
            }
        }
        Ok(resolved)
    }
}

fn calling_convention(conv: CallConv) -> CallingConvention {
    match conv {
        CallConv::StdCall => CallingConvention::StdCall,
        CallConv::ThisCall => CallingConvention::ThisCall,
        CallConv::FastCall => CallingConvention::FastCall,
        CallConv::C | CallConv::Other => CallingConvention::Cdecl,
    }
}
