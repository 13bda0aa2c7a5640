//! IR units.
//!
//! A closed set of unit kinds, one struct per kind. Units are built by the
//! lowering builders, edited in place by the visitor pass, and given their
//! final identifiers by the renamer pass.

use std::fmt;

use cbind_macro::{Expr, MacroType};

use crate::name::Name;
use crate::primitive::Primitive;
use crate::types::TypeRef;

/// Documentation carried over from the declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Doc {
    pub summary: Option<String>,
    pub detail: Option<String>,
}

impl Doc {
    pub fn summary(text: impl Into<String>) -> Self {
        Doc {
            summary: Some(text.into()),
            detail: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.detail.is_none()
    }
}

/// Fields every unit carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitMeta {
    /// Source name; the registry key.
    pub name: Name,
    /// Final identifier; set by the renamer.
    pub host_name: Option<String>,
    pub doc: Doc,
}

impl UnitMeta {
    pub fn new(name: Name) -> Self {
        UnitMeta {
            name,
            host_name: None,
            doc: Doc::default(),
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: Doc) -> Self {
        self.doc = doc;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Macro,
    Enum,
    Struct,
    Function,
    Delegate,
    FixedArray,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitKind::Macro => "macro",
            UnitKind::Enum => "enum",
            UnitKind::Struct => "struct",
            UnitKind::Function => "function",
            UnitKind::Delegate => "delegate",
            UnitKind::FixedArray => "fixed array",
        })
    }
}

/// Preprocessor constant.
///
/// A body that failed to parse keeps `expr`, `ty` and `rewritten` empty.
#[derive(Clone, Debug, PartialEq)]
pub struct MacroUnit {
    pub meta: UnitMeta,
    /// Body text with continuations folded.
    pub text: String,
    pub expr: Option<Expr>,
    pub ty: Option<MacroType>,
    /// Meaningful once `rewritten` is set.
    pub constant: bool,
    pub rewritten: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EnumValue {
    Signed(i64),
    Unsigned(u64),
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Signed(v) => write!(f, "{v}"),
            EnumValue::Unsigned(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumItem {
    pub name: String,
    pub host_name: Option<String>,
    pub value: EnumValue,
    pub doc: Doc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumUnit {
    pub meta: UnitMeta,
    pub underlying: Primitive,
    pub items: Vec<EnumItem>,
    /// Bit-flag enum; set by the visitor.
    pub is_flags: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub host_name: Option<String>,
    pub ty: TypeRef,
    /// Inline array length, for fields collapsed from a fixed array.
    pub fixed_len: Option<u32>,
    pub attrs: Vec<String>,
    /// Deprecation message; `Some("")` when deprecated without one.
    pub deprecated: Option<String>,
    pub doc: Doc,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Field {
            name: name.into(),
            host_name: None,
            ty,
            fixed_len: None,
            attrs: Vec::new(),
            deprecated: None,
            doc: Doc::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructUnit {
    pub meta: UnitMeta,
    pub fields: Vec<Field>,
    /// False while only a forward declaration has been seen.
    pub complete: bool,
    pub is_union: bool,
    pub attrs: Vec<String>,
}

impl StructUnit {
    /// Forward-declared placeholder.
    pub fn placeholder(meta: UnitMeta) -> Self {
        StructUnit {
            meta,
            fields: Vec::new(),
            complete: false,
            is_union: false,
            attrs: Vec::new(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CallingConvention {
    #[default]
    Cdecl,
    StdCall,
    ThisCall,
    FastCall,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParamModifier {
    #[default]
    None,
    In,
    Out,
    Ref,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub host_name: Option<String>,
    pub ty: TypeRef,
    pub modifier: ParamModifier,
    pub attrs: Vec<String>,
    pub doc: Doc,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Param {
            name: name.into(),
            host_name: None,
            ty,
            modifier: ParamModifier::None,
            attrs: Vec::new(),
            doc: Doc::default(),
        }
    }
}

/// Shape shared by functions and delegates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub return_type: TypeRef,
    pub params: Vec<Param>,
    pub calling_convention: CallingConvention,
    pub return_attrs: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionUnit {
    pub meta: UnitMeta,
    pub sig: Signature,
    /// Owning native library.
    pub library: String,
    /// `library` is a constant literal rather than a runtime expression.
    pub library_is_const: bool,
    pub deprecated: Option<String>,
}

/// Function-pointer type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegateUnit {
    pub meta: UnitMeta,
    pub sig: Signature,
    /// Declared inline in a struct field; emitters add an invoke shim.
    pub embedded: bool,
}

/// Fixed-length inline array, shared by element type and length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedArrayUnit {
    pub meta: UnitMeta,
    pub element: TypeRef,
    pub len: u32,
    pub element_is_primitive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Unit {
    Macro(MacroUnit),
    Enum(EnumUnit),
    Struct(StructUnit),
    Function(FunctionUnit),
    Delegate(DelegateUnit),
    FixedArray(FixedArrayUnit),
}

impl Unit {
    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Macro(_) => UnitKind::Macro,
            Unit::Enum(_) => UnitKind::Enum,
            Unit::Struct(_) => UnitKind::Struct,
            Unit::Function(_) => UnitKind::Function,
            Unit::Delegate(_) => UnitKind::Delegate,
            Unit::FixedArray(_) => UnitKind::FixedArray,
        }
    }

    pub fn meta(&self) -> &UnitMeta {
        match self {
            Unit::Macro(u) => &u.meta,
            Unit::Enum(u) => &u.meta,
            Unit::Struct(u) => &u.meta,
            Unit::Function(u) => &u.meta,
            Unit::Delegate(u) => &u.meta,
            Unit::FixedArray(u) => &u.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut UnitMeta {
        match self {
            Unit::Macro(u) => &mut u.meta,
            Unit::Enum(u) => &mut u.meta,
            Unit::Struct(u) => &mut u.meta,
            Unit::Function(u) => &mut u.meta,
            Unit::Delegate(u) => &mut u.meta,
            Unit::FixedArray(u) => &mut u.meta,
        }
    }

    pub fn name(&self) -> Name {
        self.meta().name
    }

    pub fn host_name(&self) -> Option<&str> {
        self.meta().host_name.as_deref()
    }

    pub fn as_struct(&self) -> Option<&StructUnit> {
        match self {
            Unit::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumUnit> {
        match self {
            Unit::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionUnit> {
        match self {
            Unit::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_delegate(&self) -> Option<&DelegateUnit> {
        match self {
            Unit::Delegate(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_macro(&self) -> Option<&MacroUnit> {
        match self {
            Unit::Macro(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_fixed_array(&self) -> Option<&FixedArrayUnit> {
        match self {
            Unit::FixedArray(a) => Some(a),
            _ => None,
        }
    }
}
