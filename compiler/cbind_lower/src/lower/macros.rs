//! Macro units.

use tracing::debug;

use cbind_ir::{Doc, MacroUnit, Unit, UnitMeta};
use cbind_macro::{fold_line_continuations, infer_type, is_constant, parse, rewrite};

use super::Lowerer;
use crate::decl::MacroDecl;

impl Lowerer {
    /// Register a translation unit's macros, then classify and rewrite
    /// every typed macro not yet classified.
    pub(super) fn lower_macros(&mut self, macros: &[MacroDecl]) {
        for decl in macros {
            if decl.text.trim().is_empty() || self.filters.skips_macro(decl) {
                continue;
            }
            let unit = self.macro_unit(decl);
            self.registry.insert(Unit::Macro(unit));
        }

        for id in self.registry.ids() {
            let Some(Unit::Macro(m)) = self.registry.get(id) else {
                continue;
            };
            if m.rewritten.is_some() || m.ty.is_none() {
                continue;
            }
            let Some(expr) = &m.expr else {
                continue;
            };
            let constant = is_constant(expr, &self.registry);
            let rewritten = rewrite(expr);
            if let Some(Unit::Macro(m)) = self.registry.get_mut(id) {
                m.constant = constant;
                m.rewritten = Some(rewritten);
            }
        }
    }

    fn macro_unit(&self, decl: &MacroDecl) -> MacroUnit {
        let text = fold_line_continuations(&decl.text).trim().to_owned();
        let meta = UnitMeta::new(self.registry.intern(&decl.name))
            .with_doc(Doc::summary(format!("{} = {text}", decl.name)));

        let (expr, ty) = match parse(&text) {
            Ok(expr) => {
                let ty = infer_type(&expr, &self.registry);
                if ty.is_none() {
                    debug!(name = %decl.name, "macro type not inferable");
                }
                (Some(expr), ty)
            }
            Err(err) => {
                debug!(name = %decl.name, %err, "macro body not parsed; keeping it inert");
                (None, None)
            }
        };

        MacroUnit {
            meta,
            text,
            expr,
            ty,
            constant: false,
            rewritten: None,
        }
    }
}
