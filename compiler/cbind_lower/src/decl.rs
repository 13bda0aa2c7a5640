//! Declaration view.
//!
//! The structured form in which a header parser hands over one translation
//! unit. Nothing here knows about the IR; the lowering builders read these
//! values and never keep them.
//!
//! Records, enums and typedefs are shared through `Rc` because a type may
//! refer to the same declaration from many places. A forward declaration is
//! a [`RecordDecl`] whose `fields` is `None`.

use std::fmt;
use std::rc::Rc;

use cbind_ir::{Doc, Primitive};

/// Everything one parsed file contributes.
#[derive(Clone, Debug, Default)]
pub struct TranslationUnit {
    pub file: String,
    /// System headers are parsed for context but never lowered.
    pub is_system_header: bool,
    pub macros: Vec<MacroDecl>,
    pub enums: Vec<Rc<EnumDecl>>,
    pub records: Vec<Rc<RecordDecl>>,
    pub typedefs: Vec<Rc<TypedefDecl>>,
    pub functions: Vec<FunctionDecl>,
}

impl TranslationUnit {
    pub fn new(file: impl Into<String>) -> Self {
        TranslationUnit {
            file: file.into(),
            ..TranslationUnit::default()
        }
    }
}

/// Object-like `#define`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacroDecl {
    pub name: String,
    /// Replacement text as written, continuations included.
    pub text: String,
}

impl MacroDecl {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        MacroDecl {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub name: Option<String>,
    pub underlying: CType,
    pub items: Vec<EnumItemDecl>,
    pub doc: Doc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumItemDecl {
    pub name: String,
    /// Value bits as the parser reports them; reinterpreted at the enum's
    /// underlying width.
    pub value: u64,
    pub doc: Doc,
}

impl EnumItemDecl {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        EnumItemDecl {
            name: name.into(),
            value,
            doc: Doc::default(),
        }
    }
}

/// `struct` or `union`.
#[derive(Clone, Debug, Default)]
pub struct RecordDecl {
    pub name: Option<String>,
    /// `None` for a forward declaration.
    pub fields: Option<Vec<FieldDecl>>,
    pub is_union: bool,
    pub doc: Doc,
}

impl RecordDecl {
    pub fn forward(name: impl Into<String>) -> Self {
        RecordDecl {
            name: Some(name.into()),
            ..RecordDecl::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.fields.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: String,
    pub ty: CType,
    /// Width of a bit-field member.
    pub bit_width: Option<u32>,
    pub doc: Doc,
    pub deprecated: Option<String>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: CType) -> Self {
        FieldDecl {
            name: name.into(),
            ty,
            bit_width: None,
            doc: Doc::default(),
            deprecated: None,
        }
    }

    #[must_use]
    pub fn bits(mut self, width: u32) -> Self {
        self.bit_width = Some(width);
        self
    }
}

#[derive(Clone, Debug)]
pub struct TypedefDecl {
    pub name: String,
    pub ty: CType,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CallConv {
    #[default]
    C,
    StdCall,
    ThisCall,
    FastCall,
    /// Anything else the parser reports (vectorcall, regcall, ...).
    Other,
}

#[derive(Clone, Debug)]
pub struct ParamDecl {
    /// Empty when the prototype leaves the parameter unnamed.
    pub name: String,
    pub ty: CType,
    pub doc: Doc,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: CType) -> Self {
        ParamDecl {
            name: name.into(),
            ty,
            doc: Doc::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: CType,
    pub params: Vec<ParamDecl>,
    pub call_conv: CallConv,
    pub is_inline: bool,
    pub deprecated: Option<String>,
    pub doc: Doc,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, return_type: CType, params: Vec<ParamDecl>) -> Self {
        FunctionDecl {
            name: name.into(),
            return_type,
            params,
            call_conv: CallConv::C,
            is_inline: false,
            deprecated: None,
            doc: Doc::default(),
        }
    }
}

/// Shape of a function type, as found behind a function pointer.
#[derive(Clone, Debug)]
pub struct FunctionType {
    pub return_type: CType,
    pub params: Vec<ParamDecl>,
    pub call_conv: CallConv,
}

/// C builtin types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Void,
    Bool,
    Char,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    IntPtr,
    UIntPtr,
}

impl Builtin {
    /// Plain `char` is treated as a byte.
    pub fn primitive(self) -> Primitive {
        match self {
            Builtin::Void => Primitive::Void,
            Builtin::Bool => Primitive::Bool,
            Builtin::Char | Builtin::UChar => Primitive::Byte,
            Builtin::SChar => Primitive::SByte,
            Builtin::Short => Primitive::Short,
            Builtin::UShort => Primitive::UShort,
            Builtin::Int => Primitive::Int,
            Builtin::UInt => Primitive::UInt,
            Builtin::Long | Builtin::LongLong => Primitive::Long,
            Builtin::ULong | Builtin::ULongLong => Primitive::ULong,
            Builtin::Float => Primitive::Float,
            Builtin::Double => Primitive::Double,
            Builtin::IntPtr => Primitive::NInt,
            Builtin::UIntPtr => Primitive::NUInt,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArraySize {
    Constant(u32),
    /// `T x[]`
    Incomplete,
    /// Variable-length array.
    Variable,
}

/// Raw C type shape.
#[derive(Clone, Debug)]
pub enum CType {
    Builtin(Builtin),
    Pointer {
        pointee: Box<CType>,
        pointee_const: bool,
    },
    Array {
        element: Box<CType>,
        size: ArraySize,
        element_const: bool,
    },
    Typedef(Rc<TypedefDecl>),
    Record(Rc<RecordDecl>),
    Enum(Rc<EnumDecl>),
    Function(Box<FunctionType>),
    /// A shape the parser could not express; carries its spelling.
    Unsupported(String),
}

impl CType {
    pub fn pointer(pointee: CType) -> CType {
        CType::Pointer {
            pointee: Box::new(pointee),
            pointee_const: false,
        }
    }

    pub fn const_pointer(pointee: CType) -> CType {
        CType::Pointer {
            pointee: Box::new(pointee),
            pointee_const: true,
        }
    }

    pub fn array(element: CType, size: ArraySize) -> CType {
        CType::Array {
            element: Box::new(element),
            size,
            element_const: false,
        }
    }

    pub fn typedef(name: impl Into<String>, ty: CType) -> CType {
        CType::Typedef(Rc::new(TypedefDecl {
            name: name.into(),
            ty,
        }))
    }

    pub fn function(return_type: CType, params: Vec<ParamDecl>) -> CType {
        CType::Function(Box::new(FunctionType {
            return_type,
            params,
            call_conv: CallConv::C,
        }))
    }

    /// Strip typedef sugar.
    pub fn desugar(&self) -> &CType {
        let mut ty = self;
        while let CType::Typedef(def) = ty {
            ty = &def.ty;
        }
        ty
    }

    /// The record this type names, looking through typedefs.
    pub fn as_record(&self) -> Option<&Rc<RecordDecl>> {
        match self.desugar() {
            CType::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, CType::Builtin(_))
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Builtin(builtin) => write!(f, "{}", builtin.primitive()),
            CType::Pointer {
                pointee,
                pointee_const,
            } => {
                if *pointee_const {
                    f.write_str("const ")?;
                }
                write!(f, "{pointee}*")
            }
            CType::Array { element, size, .. } => match size {
                ArraySize::Constant(n) => write!(f, "{element}[{n}]"),
                ArraySize::Incomplete => write!(f, "{element}[]"),
                ArraySize::Variable => write!(f, "{element}[*]"),
            },
            CType::Typedef(def) => f.write_str(&def.name),
            CType::Record(record) => {
                let keyword = if record.is_union { "union" } else { "struct" };
                match &record.name {
                    Some(name) => write!(f, "{keyword} {name}"),
                    None => write!(f, "{keyword} <anonymous>"),
                }
            }
            CType::Enum(decl) => match &decl.name {
                Some(name) => write!(f, "enum {name}"),
                None => f.write_str("enum <anonymous>"),
            },
            CType::Function(function) => write!(f, "{} (*)(...)", function.return_type),
            CType::Unsupported(spelling) => f.write_str(spelling),
        }
    }
}
