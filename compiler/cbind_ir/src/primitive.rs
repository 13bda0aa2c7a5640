//! Primitive type vocabulary.
//!
//! A type reference whose base is not a registered unit names one of these.

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Void,
    Bool,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    /// Pointer-sized signed integer.
    NInt,
    /// Pointer-sized unsigned integer.
    NUInt,
    /// Kept distinct from `nuint` so emitters can spell it natively.
    SizeT,
}

impl Primitive {
    pub const ALL: [Primitive; 15] = [
        Primitive::Void,
        Primitive::Bool,
        Primitive::SByte,
        Primitive::Byte,
        Primitive::Short,
        Primitive::UShort,
        Primitive::Int,
        Primitive::UInt,
        Primitive::Long,
        Primitive::ULong,
        Primitive::Float,
        Primitive::Double,
        Primitive::NInt,
        Primitive::NUInt,
        Primitive::SizeT,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Bool => "bool",
            Primitive::SByte => "sbyte",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::UShort => "ushort",
            Primitive::Int => "int",
            Primitive::UInt => "uint",
            Primitive::Long => "long",
            Primitive::ULong => "ulong",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::NInt => "nint",
            Primitive::NUInt => "nuint",
            Primitive::SizeT => "size_t",
        }
    }

    pub fn from_name(name: &str) -> Option<Primitive> {
        Primitive::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            Primitive::Void | Primitive::Bool | Primitive::Float | Primitive::Double
        )
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::SByte
                | Primitive::Short
                | Primitive::Int
                | Primitive::Long
                | Primitive::NInt
        )
    }

    /// Unsigned integer storage for `bits` bits: byte, ushort, uint or ulong.
    pub fn unsigned_for_bits(bits: u32) -> Option<Primitive> {
        match bits {
            0..=8 => Some(Primitive::Byte),
            9..=16 => Some(Primitive::UShort),
            17..=32 => Some(Primitive::UInt),
            33..=64 => Some(Primitive::ULong),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for primitive in Primitive::ALL {
            assert_eq!(Primitive::from_name(primitive.name()), Some(primitive));
        }
        assert_eq!(Primitive::from_name("AVFrame"), None);
    }

    #[test]
    fn storage_tiers() {
        assert_eq!(Primitive::unsigned_for_bits(3), Some(Primitive::Byte));
        assert_eq!(Primitive::unsigned_for_bits(16), Some(Primitive::UShort));
        assert_eq!(Primitive::unsigned_for_bits(17), Some(Primitive::UInt));
        assert_eq!(Primitive::unsigned_for_bits(40), Some(Primitive::ULong));
        assert_eq!(Primitive::unsigned_for_bits(65), None);
    }
}
