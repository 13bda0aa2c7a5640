//! Type inference and constant classification for macro expressions.
//!
//! Both walks are bottom-up. Identifiers are resolved through a [`MacroEnv`]
//! so a macro can build on previously registered macros.

use crate::ast::{Expr, SizeofOperand, UnaryOp};
use crate::ty::MacroType;

#[cfg(test)]
mod tests;

/// What the environment knows about a previously seen macro.
#[derive(Copy, Clone, Debug, Default)]
pub struct MacroInfo<'a> {
    pub ty: Option<&'a MacroType>,
    pub expr: Option<&'a Expr>,
    /// `None` when the macro has not been classified yet.
    pub constant: Option<bool>,
}

/// Lookup of other macros by source name.
pub trait MacroEnv {
    fn lookup(&self, name: &str) -> Option<MacroInfo<'_>>;
}

/// Environment with no macros; every reference is unresolved.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoMacros;

impl MacroEnv for NoMacros {
    fn lookup(&self, _name: &str) -> Option<MacroInfo<'_>> {
        None
    }
}

/// Infer the type `expr` evaluates to, or `None` when it cannot be known
/// (calls, unresolved references, arithmetic on named casts).
///
/// A ternary takes the type of its else branch.
pub fn infer_type<E: MacroEnv + ?Sized>(expr: &Expr, env: &E) -> Option<MacroType> {
    match expr {
        Expr::Literal(literal) => Some(literal.ty()),
        Expr::Ident(name) => env.lookup(name)?.ty.cloned(),
        Expr::Call { .. } => None,
        Expr::Unary {
            op: UnaryOp::Not,
            operand,
        } => {
            infer_type(operand, env)?;
            Some(MacroType::Bool)
        }
        Expr::Unary { operand, .. } => infer_type(operand, env),
        Expr::Cast { target, .. } => Some(
            MacroType::from_type_name(target).unwrap_or_else(|| MacroType::Named(target.clone())),
        ),
        Expr::Sizeof(_) => Some(MacroType::I32),
        Expr::Binary { op, left, right } => {
            let left = infer_type(left, env)?;
            let right = infer_type(right, env)?;
            if op.is_comparison() {
                Some(MacroType::Bool)
            } else {
                MacroType::arithmetic(&left, &right)
            }
        }
        Expr::Ternary { else_expr, .. } => infer_type(else_expr, env),
    }
}

/// Whether `expr` is a compile-time constant.
///
/// References to typed macros that have not been classified yet are
/// classified on the spot; a reference cycle is never constant.
pub fn is_constant<E: MacroEnv + ?Sized>(expr: &Expr, env: &E) -> bool {
    Classifier {
        env,
        visiting: Vec::new(),
    }
    .constant(expr)
}

struct Classifier<'e, E: ?Sized> {
    env: &'e E,
    /// Names currently being classified, for cycle detection.
    visiting: Vec<&'e str>,
}

impl<'e, E: MacroEnv + ?Sized> Classifier<'e, E> {
    fn constant(&mut self, expr: &'e Expr) -> bool {
        match expr {
            Expr::Literal(_) => true,
            Expr::Ident(name) => self.reference(name),
            Expr::Call { .. } | Expr::Sizeof(SizeofOperand::Tag(_)) => false,
            Expr::Unary { operand, .. } | Expr::Cast { operand, .. } => self.constant(operand),
            Expr::Sizeof(SizeofOperand::Builtin(_)) => true,
            Expr::Sizeof(SizeofOperand::Expr(operand)) => matches!(**operand, Expr::Literal(_)),
            Expr::Binary { left, right, .. } => self.constant(left) && self.constant(right),
            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
            } => self.constant(cond) && self.constant(then_expr) && self.constant(else_expr),
        }
    }

    fn reference(&mut self, name: &'e str) -> bool {
        let env = self.env;
        let Some(info) = env.lookup(name) else {
            return false;
        };
        if info.ty.is_none() {
            return false;
        }
        if let Some(constant) = info.constant {
            return constant;
        }
        let Some(expr) = info.expr else {
            return false;
        };
        if self.visiting.contains(&name) {
            return false;
        }

        self.visiting.push(name);
        let constant = self.constant(expr);
        self.visiting.pop();
        constant
    }
}
