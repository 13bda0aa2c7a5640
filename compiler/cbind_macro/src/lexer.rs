//! Macro body tokenizer.
//!
//! Hand-written over bytes: macro bodies are a handful of tokens, and the C
//! literal grammar (suffix-driven widths, octal, escapes) needs more than a
//! regex table can express cleanly. Operators use maximal munch.

use std::num::IntErrorKind;

use crate::ast::{IntLiteral, Literal, Radix};
use crate::error::ParseError;
use crate::ty::MacroType;

#[cfg(test)]
mod tests;

const I32_MAX: u64 = 0x7fff_ffff;
const U32_MAX: u64 = 0xffff_ffff;
const I64_MAX: u64 = 0x7fff_ffff_ffff_ffff;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Literal(Literal),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Shl,
    Shr,
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    NotEq,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Bang,
    Question,
    Colon,
    LParen,
    RParen,
    Comma,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character.
    pub pos: usize,
}

/// Punctuation, two-character spellings first.
const PUNCT: &[(&str, TokenKind)] = &[
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("!", TokenKind::Bang),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    (",", TokenKind::Comma),
];

/// Fold `\`-newline continuations into single spaces and trim the result.
pub fn fold_line_continuations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('\\') {
        let (head, tail) = rest.split_at(idx);
        let after = &tail[1..];
        match after
            .strip_prefix("\r\n")
            .or_else(|| after.strip_prefix('\n'))
        {
            Some(next) => {
                out.push_str(head.trim_end());
                out.push(' ');
                rest = next.trim_start();
            }
            None => {
                out.push_str(head);
                out.push('\\');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_owned()
}

pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        text,
        bytes: text.as_bytes(),
        pos: 0,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

/// Integer suffix, normalized: case is ignored, `lu` is `ul` and `ll` is `l`.
///
/// `l` is 64-bit: rewritten literals carry the host spellings `L` and `UL`
/// for 64-bit widths, and they must lex back to the same width.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Suffix {
    Plain,
    U,
    L,
    UL,
}

impl Suffix {
    fn parse(text: &str) -> Option<Suffix> {
        let suffix = match text.to_ascii_lowercase().as_str() {
            "" => Suffix::Plain,
            "u" => Suffix::U,
            "l" | "ll" => Suffix::L,
            "ul" | "lu" | "ull" | "llu" => Suffix::UL,
            _ => return None,
        };
        Some(suffix)
    }

    /// Starting width from the suffix, widened to 64 bits when the value
    /// does not fit. `None` when nothing holds it.
    fn literal_type(self, value: u64, radix: Radix) -> Option<MacroType> {
        let unsigned_fallback = radix != Radix::Decimal;
        match self {
            Suffix::Plain if value <= I32_MAX => Some(MacroType::I32),
            Suffix::Plain | Suffix::L if value <= I64_MAX => Some(MacroType::I64),
            Suffix::Plain | Suffix::L if unsigned_fallback => Some(MacroType::U64),
            Suffix::Plain | Suffix::L => None,
            Suffix::U if value <= U32_MAX => Some(MacroType::U32),
            Suffix::U | Suffix::UL => Some(MacroType::U64),
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

fn is_ident_continue(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek_byte(0).is_some_and(&pred) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    /// Length of a `\`-newline continuation at the cursor, 0 if none.
    fn continuation_len(&self) -> usize {
        match (self.peek_byte(0), self.peek_byte(1), self.peek_byte(2)) {
            (Some(b'\\'), Some(b'\n'), _) => 2,
            (Some(b'\\'), Some(b'\r'), Some(b'\n')) => 3,
            _ => 0,
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            if self.peek_byte(0).is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
                continue;
            }
            match self.continuation_len() {
                0 => break,
                len => self.pos += len,
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_trivia();
        let start = self.pos;
        let Some(b) = self.peek_byte(0) else {
            return Ok(None);
        };

        let kind = match b {
            b'0'..=b'9' => self.number(start)?,
            b'.' if self.peek_byte(1).is_some_and(|c| c.is_ascii_digit()) => self.number(start)?,
            b'\'' => self.char_literal(start)?,
            b'"' => self.string_literal(start)?,
            b if is_ident_start(b) => {
                TokenKind::Ident(self.take_while(is_ident_continue).to_owned())
            }
            _ => self.punct(start)?,
        };
        Ok(Some(Token { kind, pos: start }))
    }

    fn punct(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        let rest = &self.text[start..];
        for (spelling, kind) in PUNCT {
            if rest.starts_with(spelling) {
                self.pos += spelling.len();
                return Ok(kind.clone());
            }
        }
        Err(ParseError::UnexpectedChar {
            ch: rest.chars().next().unwrap_or('\0'),
            pos: start,
        })
    }

    fn invalid(&self, start: usize) -> ParseError {
        // The cursor may sit inside a multi-byte character after a bad escape.
        let text = self
            .text
            .get(start..self.pos)
            .unwrap_or(&self.text[start..]);
        ParseError::InvalidLiteral {
            text: text.to_owned(),
            pos: start,
        }
    }

    /// A literal glued to identifier characters (`10ms`, `0x1g`) is malformed.
    fn reject_ident_tail(&mut self, start: usize) -> Result<(), ParseError> {
        if self.peek_byte(0).is_some_and(is_ident_continue) {
            self.take_while(is_ident_continue);
            return Err(self.invalid(start));
        }
        Ok(())
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        let radix_prefix = match (self.peek_byte(0), self.peek_byte(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => Some(Radix::Hex),
            (Some(b'0'), Some(b'b' | b'B')) if matches!(self.peek_byte(2), Some(b'0' | b'1')) => {
                Some(Radix::Binary)
            }
            _ => None,
        };
        if let Some(radix) = radix_prefix {
            self.pos += 2;
            let digits = match radix {
                Radix::Hex => self.take_while(|b| b.is_ascii_hexdigit()),
                _ => self.take_while(|b| b == b'0' || b == b'1'),
            };
            return self.integer(start, digits, radix);
        }

        let digits = self.take_while(|b| b.is_ascii_digit());
        if self.at_float_tail() {
            return self.float(start);
        }
        if digits.len() > 1 && digits.starts_with('0') {
            self.integer(start, &digits[1..], Radix::Octal)
        } else {
            self.integer(start, digits, Radix::Decimal)
        }
    }

    fn at_float_tail(&self) -> bool {
        match self.peek_byte(0) {
            Some(b'.') => true,
            Some(b'e' | b'E') => match self.peek_byte(1) {
                Some(b'+' | b'-') => self.peek_byte(2).is_some_and(|b| b.is_ascii_digit()),
                Some(b) => b.is_ascii_digit(),
                None => false,
            },
            _ => false,
        }
    }

    fn float(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        if self.peek_byte(0) == Some(b'.') {
            self.pos += 1;
            self.take_while(|b| b.is_ascii_digit());
        }
        if matches!(self.peek_byte(0), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek_byte(0), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.take_while(|b| b.is_ascii_digit()).is_empty() {
                return Err(self.invalid(start));
            }
        }
        let text = self.text[start..self.pos].to_owned();

        let single = matches!(self.peek_byte(0), Some(b'f' | b'F'));
        if single || matches!(self.peek_byte(0), Some(b'l' | b'L')) {
            self.pos += 1;
        }
        self.reject_ident_tail(start)?;
        Ok(TokenKind::Literal(Literal::Float { text, single }))
    }

    fn integer(&mut self, start: usize, digits: &str, radix: Radix) -> Result<TokenKind, ParseError> {
        let suffix = self.take_while(|b| matches!(b, b'u' | b'U' | b'l' | b'L'));
        let suffix = Suffix::parse(suffix);
        self.reject_ident_tail(start)?;
        let (Some(suffix), false) = (suffix, digits.is_empty()) else {
            return Err(self.invalid(start));
        };

        let overflow = || ParseError::Overflow {
            text: self.text[start..self.pos].to_owned(),
            pos: start,
        };
        let value = u64::from_str_radix(digits, radix.base()).map_err(|err| match err.kind() {
            IntErrorKind::PosOverflow => overflow(),
            _ => self.invalid(start),
        })?;
        let ty = suffix.literal_type(value, radix).ok_or_else(overflow)?;

        Ok(TokenKind::Literal(Literal::Int(IntLiteral {
            value,
            radix,
            digits: digits.to_owned(),
            ty,
        })))
    }

    fn char_literal(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        self.pos += 1;
        let value = match self.peek_byte(0) {
            None | Some(b'\n') => return Err(ParseError::Unterminated { pos: start }),
            Some(b'\\') => {
                self.pos += 1;
                self.escape(start)?
            }
            Some(b'\'') => {
                self.pos += 1;
                return Err(self.invalid(start));
            }
            Some(b) if b.is_ascii() => {
                self.pos += 1;
                b
            }
            Some(_) => {
                return Err(ParseError::InvalidLiteral {
                    text: self.text[start..].chars().take(3).collect(),
                    pos: start,
                })
            }
        };
        if self.peek_byte(0) != Some(b'\'') {
            return Err(ParseError::Unterminated { pos: start });
        }
        self.pos += 1;
        Ok(TokenKind::Literal(Literal::Char(value)))
    }

    /// Decode one escape; the cursor is just past the backslash.
    fn escape(&mut self, start: usize) -> Result<u8, ParseError> {
        let Some(b) = self.peek_byte(0) else {
            return Err(ParseError::Unterminated { pos: start });
        };
        self.pos += 1;
        let value = match b {
            b'\\' | b'\'' | b'"' | b'?' => b,
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'v' => 0x0b,
            b'0'..=b'7' => {
                let digits_start = self.pos - 1;
                while self.pos - digits_start < 3 && matches!(self.peek_byte(0), Some(b'0'..=b'7')) {
                    self.pos += 1;
                }
                u8::from_str_radix(&self.text[digits_start..self.pos], 8)
                    .map_err(|_| self.invalid(start))?
            }
            b'x' => {
                let digits_start = self.pos;
                while self.pos - digits_start < 2 && self.peek_byte(0).is_some_and(|b| b.is_ascii_hexdigit()) {
                    self.pos += 1;
                }
                u8::from_str_radix(&self.text[digits_start..self.pos], 16)
                    .map_err(|_| self.invalid(start))?
            }
            _ => return Err(self.invalid(start)),
        };
        Ok(value)
    }

    fn string_literal(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        self.pos += 1;
        loop {
            match self.peek_byte(0) {
                None | Some(b'\n') => return Err(ParseError::Unterminated { pos: start }),
                Some(b'\\') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        Ok(TokenKind::Literal(Literal::Str(
            self.text[start..self.pos].to_owned(),
        )))
    }
}
