//! Re-serialize a macro expression in target infix syntax.
//!
//! Parentheses are emitted only where the tree shape needs them: a child
//! binding looser than its parent, or binding equally on the right of a
//! left-associative operator. Type names go through the primitive table so
//! `(uint32_t)x` comes out as `(uint)x`.

use std::fmt::Write as _;

use crate::ast::{Expr, IntLiteral, Literal, Radix, SizeofOperand, UnaryOp};
use crate::ast::{TERNARY_PRECEDENCE, UNARY_PRECEDENCE};
use crate::ty::MacroType;

#[cfg(test)]
mod tests;

pub fn rewrite(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Literal(literal) => write_literal(out, literal),
        Expr::Ident(name) => out.push_str(name),
        Expr::Call { callee, args } => {
            out.push_str(callee);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg);
            }
            out.push(')');
        }
        Expr::Unary { op, operand } => {
            out.push_str(op.as_str());
            let wrap = operand.precedence() < UNARY_PRECEDENCE || same_sign(*op, operand);
            write_child(out, operand, wrap);
        }
        Expr::Cast { target, operand } => {
            out.push('(');
            out.push_str(&type_spelling(target));
            out.push(')');
            write_child(out, operand, operand.precedence() < UNARY_PRECEDENCE);
        }
        Expr::Sizeof(operand) => {
            out.push_str("sizeof(");
            match operand {
                SizeofOperand::Builtin(ty) => out.push_str(ty.spelling()),
                SizeofOperand::Tag(tag) => out.push_str(tag),
                SizeofOperand::Expr(inner) => match &**inner {
                    Expr::Literal(literal) => out.push_str(sizeof_spelling(&literal.ty())),
                    other => write_expr(out, other),
                },
            }
            out.push(')');
        }
        Expr::Binary { op, left, right } => {
            let precedence = op.precedence();
            write_child(out, left, left.precedence() < precedence);
            out.push(' ');
            out.push_str(op.as_str());
            out.push(' ');
            write_child(out, right, right.precedence() <= precedence);
        }
        Expr::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            write_child(out, cond, cond.precedence() <= TERNARY_PRECEDENCE);
            out.push_str(" ? ");
            write_expr(out, then_expr);
            out.push_str(" : ");
            write_expr(out, else_expr);
        }
    }
}

fn write_child(out: &mut String, expr: &Expr, wrap: bool) {
    if wrap {
        out.push('(');
        write_expr(out, expr);
        out.push(')');
    } else {
        write_expr(out, expr);
    }
}

/// `-(-x)` and `+(+x)` must not collapse into `--x` / `++x`.
fn same_sign(op: UnaryOp, operand: &Expr) -> bool {
    matches!(
        (op, operand),
        (UnaryOp::Neg, Expr::Unary { op: UnaryOp::Neg, .. })
            | (UnaryOp::Plus, Expr::Unary { op: UnaryOp::Plus, .. })
    )
}

fn type_spelling(name: &str) -> String {
    MacroType::from_type_name(name).map_or_else(|| name.to_owned(), |ty| ty.spelling().to_owned())
}

/// `sizeof` over a literal is spelled as the literal's type.
fn sizeof_spelling(ty: &MacroType) -> &str {
    match ty {
        MacroType::Char => MacroType::U8.spelling(),
        other => other.spelling(),
    }
}

fn write_literal(out: &mut String, literal: &Literal) {
    match literal {
        Literal::Int(int) => write_int(out, int),
        Literal::Float { text, single } => {
            out.push_str(text);
            if *single {
                out.push('f');
            }
        }
        Literal::Char(value) => write_char(out, *value),
        Literal::Str(raw) => out.push_str(raw),
    }
}

fn write_int(out: &mut String, int: &IntLiteral) {
    match int.radix {
        Radix::Decimal => out.push_str(&int.digits),
        Radix::Octal => {
            let _ = write!(out, "{}", int.value);
        }
        Radix::Hex => {
            out.push_str("0x");
            out.push_str(&int.digits);
        }
        Radix::Binary => {
            out.push_str("0b");
            out.push_str(&int.digits);
        }
    }
    out.push_str(match int.ty {
        MacroType::U32 => "U",
        MacroType::I64 => "L",
        MacroType::U64 => "UL",
        _ => "",
    });
}

fn write_char(out: &mut String, value: u8) {
    out.push('\'');
    match value {
        b'\\' => out.push_str("\\\\"),
        b'\'' => out.push_str("\\'"),
        b'\n' => out.push_str("\\n"),
        b'\r' => out.push_str("\\r"),
        b'\t' => out.push_str("\\t"),
        0x07 => out.push_str("\\a"),
        0x08 => out.push_str("\\b"),
        0x0b => out.push_str("\\v"),
        0x0c => out.push_str("\\f"),
        0x20..=0x7e => out.push(char::from(value)),
        _ => {
            let _ = write!(out, "\\x{value:02x}");
        }
    }
    out.push('\'');
}
