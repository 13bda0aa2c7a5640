//! Types a macro expression can evaluate to.
//!
//! The spellings double as the host-side primitive names: `sbyte`, `byte`,
//! `short`, `ushort`, `int`, `uint`, `long`, `ulong`, `float`, `double`.

use std::fmt;

/// Inferred type of a macro expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MacroType {
    Bool,
    /// Character literal.
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// String literal.
    Str,
    /// Cast to a name outside the primitive table (typedef, struct, ...).
    Named(String),
}

impl MacroType {
    /// Host spelling of this type.
    pub fn spelling(&self) -> &str {
        match self {
            MacroType::Bool => "bool",
            MacroType::Char => "char",
            MacroType::I8 => "sbyte",
            MacroType::U8 => "byte",
            MacroType::I16 => "short",
            MacroType::U16 => "ushort",
            MacroType::I32 => "int",
            MacroType::U32 => "uint",
            MacroType::I64 => "long",
            MacroType::U64 => "ulong",
            MacroType::F32 => "float",
            MacroType::F64 => "double",
            MacroType::Str => "string",
            MacroType::Named(name) => name,
        }
    }

    /// Look up a single-word type name in the primitive table.
    ///
    /// Accepts C spellings (`unsigned`, `uint32_t`, `char`, ...) as well as
    /// the host spellings produced by [`MacroType::spelling`], so rewritten
    /// text parses back to the same types.
    pub fn from_type_name(name: &str) -> Option<MacroType> {
        let ty = match name {
            "bool" | "_Bool" => MacroType::Bool,
            "char" | "byte" | "uint8_t" => MacroType::U8,
            "sbyte" | "int8_t" => MacroType::I8,
            "short" | "int16_t" => MacroType::I16,
            "ushort" | "uint16_t" => MacroType::U16,
            "int" | "signed" | "int32_t" => MacroType::I32,
            "uint" | "unsigned" | "uint32_t" => MacroType::U32,
            "long" | "int64_t" => MacroType::I64,
            "ulong" | "uint64_t" => MacroType::U64,
            "float" => MacroType::F32,
            "double" => MacroType::F64,
            _ => return None,
        };
        Some(ty)
    }

    /// Unsigned counterpart of an integer type; other types are unchanged.
    pub(crate) fn to_unsigned(&self) -> MacroType {
        match self {
            MacroType::I8 => MacroType::U8,
            MacroType::I16 => MacroType::U16,
            MacroType::I32 => MacroType::U32,
            MacroType::I64 => MacroType::U64,
            other => other.clone(),
        }
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            MacroType::U8 | MacroType::U16 | MacroType::U32 | MacroType::U64
        )
    }

    fn bits(&self) -> u32 {
        match self {
            MacroType::Bool | MacroType::Char | MacroType::I8 | MacroType::U8 => 8,
            MacroType::I16 | MacroType::U16 => 16,
            MacroType::I32 | MacroType::U32 | MacroType::F32 => 32,
            MacroType::I64 | MacroType::U64 | MacroType::F64 => 64,
            MacroType::Str | MacroType::Named(_) => 0,
        }
    }

    /// Integer promotion: everything narrower than 32 bits becomes `int`.
    /// Named types do not take part in arithmetic.
    fn promoted(&self) -> Option<MacroType> {
        match self {
            MacroType::Bool
            | MacroType::Char
            | MacroType::I8
            | MacroType::U8
            | MacroType::I16
            | MacroType::U16 => Some(MacroType::I32),
            MacroType::Named(_) => None,
            other => Some(other.clone()),
        }
    }

    /// Result type of a binary arithmetic or bitwise operator.
    ///
    /// Strings dominate, then `double`, then `float`. Integers widen to the
    /// larger of 32/64 bits; at the winning width unsigned beats signed.
    pub fn arithmetic(left: &MacroType, right: &MacroType) -> Option<MacroType> {
        let left = left.promoted()?;
        let right = right.promoted()?;

        if left == MacroType::Str || right == MacroType::Str {
            return Some(MacroType::Str);
        }
        if left == MacroType::F64 || right == MacroType::F64 {
            return Some(MacroType::F64);
        }
        if left == MacroType::F32 || right == MacroType::F32 {
            return Some(MacroType::F32);
        }

        let width = left.bits().max(right.bits());
        let unsigned = [&left, &right]
            .iter()
            .any(|ty| ty.bits() == width && ty.is_unsigned());
        Some(match (width, unsigned) {
            (64, true) => MacroType::U64,
            (64, false) => MacroType::I64,
            (_, true) => MacroType::U32,
            (_, false) => MacroType::I32,
        })
    }
}

impl fmt::Display for MacroType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}
