//! Macro expression tree.
//!
//! Owned and boxed rather than arena-allocated: macro bodies are tiny and
//! each unit keeps its own tree for the lifetime of a generator run.

use crate::ty::MacroType;

/// Precedence of `?:`, the loosest-binding form.
pub(crate) const TERNARY_PRECEDENCE: u8 = 0;
/// Precedence of prefix operators, casts and `sizeof`.
pub(crate) const UNARY_PRECEDENCE: u8 = 11;
/// Precedence of atoms: literals, identifiers, calls.
pub(crate) const ATOM_PRECEDENCE: u8 = 12;

/// Binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter. All levels are left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::BitOr => 3,
            BinaryOp::BitXor => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::Eq | BinaryOp::NotEq => 6,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => 7,
            BinaryOp::Shl | BinaryOp::Shr => 8,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Relational and equality operators, which always yield `bool`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::Eq
                | BinaryOp::NotEq
        )
    }
}

/// Prefix operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

/// Base an integer literal was written in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Radix {
    Decimal,
    Octal,
    Binary,
    Hex,
}

impl Radix {
    pub fn base(self) -> u32 {
        match self {
            Radix::Decimal => 10,
            Radix::Octal => 8,
            Radix::Binary => 2,
            Radix::Hex => 16,
        }
    }
}

/// Integer literal with its source digits and resolved type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntLiteral {
    pub value: u64,
    pub radix: Radix,
    /// Digits as written, without prefix or suffix.
    pub digits: String,
    pub ty: MacroType,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Int(IntLiteral),
    /// Floating literal; `text` has no `f` suffix.
    Float { text: String, single: bool },
    /// Character literal, escapes already decoded.
    Char(u8),
    /// String literal, kept verbatim including quotes and escapes.
    Str(String),
}

impl Literal {
    pub fn ty(&self) -> MacroType {
        match self {
            Literal::Int(int) => int.ty.clone(),
            Literal::Float { single: true, .. } => MacroType::F32,
            Literal::Float { single: false, .. } => MacroType::F64,
            Literal::Char(_) => MacroType::Char,
            Literal::Str(_) => MacroType::Str,
        }
    }
}

/// Operand of `sizeof`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SizeofOperand {
    /// `sizeof(unsigned int)` and friends.
    Builtin(MacroType),
    /// `sizeof(struct foo)` / `sizeof(enum bar)`.
    Tag(String),
    Expr(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(Literal),
    /// Reference to another macro (or any other name).
    Ident(String),
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Cast {
        /// Type name as written.
        target: String,
        operand: Box<Expr>,
    },
    Sizeof(SizeofOperand),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
}

impl Expr {
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expr::Literal(_) | Expr::Ident(_) | Expr::Call { .. } => ATOM_PRECEDENCE,
            Expr::Unary { .. } | Expr::Cast { .. } | Expr::Sizeof(_) => UNARY_PRECEDENCE,
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Ternary { .. } => TERNARY_PRECEDENCE,
        }
    }
}
