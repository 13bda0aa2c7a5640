//! Macro expression parser.
//!
//! Precedence climbing over the binary levels in [`BinaryOp::precedence`],
//! with a hand-written ternary on top and unary/cast/`sizeof` below.
//!
//! # Casts
//!
//! `(NAME) x` is ambiguous in a macro body: `NAME` may be a typedef or a
//! reference to another macro. The parser takes the cast reading whenever a
//! unary expression follows the parenthesized name, and otherwise backtracks
//! to a bare reference, so `(FOO) * 2` multiplies while `(uint32_t)1` casts.

use tracing::trace;

use crate::ast::{BinaryOp, Expr, SizeofOperand, UnaryOp};
use crate::error::ParseError;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::stack::ensure_sufficient_stack;
use crate::ty::MacroType;


/// Parse a macro body (continuations already folded) into an expression.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end: text.len(),
    };
    let expr = parser.parse_expr()?;
    match parser.peek() {
        Some(token) => Err(ParseError::TrailingInput { pos: token.pos }),
        None => Ok(expr),
    }
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::PipePipe => BinaryOp::Or,
        _ => return None,
    };
    Some(op)
}

fn unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Bang => Some(UnaryOp::Not),
        TokenKind::Tilde => Some(UnaryOp::BitNot),
        _ => None,
    }
}

/// `sizeof` operand spelled as a C base type (`unsigned long long`,
/// `struct foo`, `uint32_t`).
fn base_type(words: &[&str]) -> Option<SizeofOperand> {
    if let ["struct" | "union" | "enum", tag] = words {
        return Some(SizeofOperand::Tag((*tag).to_owned()));
    }

    let (signedness, rest) = match words.split_first() {
        Some((&"unsigned", rest)) => (Some(true), rest),
        Some((&"signed", rest)) => (Some(false), rest),
        _ => (None, words),
    };
    let ty = match (rest, signedness) {
        ([], Some(_)) => MacroType::I32,
        (["char"], Some(false)) => MacroType::I8,
        (["char"], _) => MacroType::U8,
        (["short"] | ["short", "int"], _) => MacroType::I16,
        (["int"], _) => MacroType::I32,
        (["long"] | ["long", "int"] | ["long", "long"] | ["long", "long", "int"], _) => {
            MacroType::I64
        }
        ([name], None) => MacroType::from_type_name(name)?,
        _ => return None,
    };
    let ty = match signedness {
        Some(true) => ty.to_unsigned(),
        _ => ty,
    };
    Some(SizeofOperand::Builtin(ty))
}

#[derive(Copy, Clone, Debug)]
struct Snapshot(usize);

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Offset reported for errors at end of input.
    end: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek().map(|token| &token.kind)
    }

    fn nth_kind(&self, n: usize) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos + n).map(|token| &token.kind)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        let matched = self.check(kind);
        if matched {
            self.advance();
        }
        matched
    }

    fn current_pos(&self) -> usize {
        self.peek().map_or(self.end, |token| token.pos)
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected,
                pos: self.current_pos(),
            })
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot(self.pos)
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.pos = snapshot.0;
    }

    /// Run `f`, rewinding on failure.
    fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Option<T> {
        let snapshot = self.snapshot();
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.restore(snapshot);
                None
            }
        }
    }

    /// expr = cond ( '?' expr ':' expr )?
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| {
            let cond = self.parse_binary(1)?;
            if !self.eat(&TokenKind::Question) {
                return Ok(cond);
            }
            let then_expr = self.parse_expr()?;
            self.expect(&TokenKind::Colon, "`:`")?;
            let else_expr = self.parse_expr()?;
            Ok(Expr::Ternary {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            })
        })
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_cast()?;
        while let Some(op) = self.peek_kind().and_then(binary_op) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// `(NAME)` followed by something that is not an operand is a reference.
    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| {
            let Some(target) = self.cast_prefix() else {
                return self.parse_unary();
            };
            if let Some(operand) = self.try_parse(Self::parse_cast) {
                return Ok(Expr::Cast {
                    target,
                    operand: Box::new(operand),
                });
            }
            trace!(name = %target, "parenthesized name has no operand; reading as reference");
            Ok(Expr::Ident(target))
        })
    }

    /// Consume `( IDENT )` when present.
    fn cast_prefix(&mut self) -> Option<String> {
        match (self.nth_kind(0), self.nth_kind(1), self.nth_kind(2)) {
            (Some(TokenKind::LParen), Some(TokenKind::Ident(name)), Some(TokenKind::RParen))
                if name != "sizeof" =>
            {
                self.pos += 3;
                Some(name.clone())
            }
            _ => None,
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Ident(name)) if name == "sizeof" => {
                self.advance();
                self.parse_sizeof()
            }
            Some(kind) => match unary_op(kind) {
                Some(op) => {
                    self.advance();
                    let operand = self.parse_cast()?;
                    Ok(Expr::Unary {
                        op,
                        operand: Box::new(operand),
                    })
                }
                None => self.parse_atom(),
            },
            None => self.parse_atom(),
        }
    }

    fn parse_sizeof(&mut self) -> Result<Expr, ParseError> {
        if let Some(operand) = self.try_parse(Self::parse_sizeof_type) {
            return Ok(Expr::Sizeof(operand));
        }
        let operand = self.parse_unary()?;
        Ok(Expr::Sizeof(SizeofOperand::Expr(Box::new(operand))))
    }

    /// '(' base-type-words ')'
    fn parse_sizeof_type(&mut self) -> Result<SizeofOperand, ParseError> {
        self.expect(&TokenKind::LParen, "`(`")?;
        let start = self.current_pos();
        let mut words = Vec::new();
        while let Some(TokenKind::Ident(word)) = self.peek_kind() {
            words.push(word.as_str());
            self.advance();
        }
        self.expect(&TokenKind::RParen, "`)`")?;
        base_type(&words).ok_or(ParseError::Expected {
            expected: "a base type name",
            pos: start,
        })
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let pos = self.current_pos();
        match self.peek_kind() {
            Some(TokenKind::Ident(name)) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    return self.parse_call(name.clone());
                }
                Ok(Expr::Ident(name.clone()))
            }
            Some(TokenKind::Literal(literal)) => {
                self.advance();
                Ok(Expr::Literal(literal.clone()))
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            _ => Err(ParseError::Expected {
                expected: "an operand",
                pos,
            }),
        }
    }

    /// NAME '(' (expr (',' expr)*)? ')'; the cursor is on the '('.
    fn parse_call(&mut self, callee: String) -> Result<Expr, ParseError> {
        self.advance();
        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen, "`)` or `,`")?;
        }
        Ok(Expr::Call { callee, args })
    }
}
