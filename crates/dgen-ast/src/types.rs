//! Type descriptors.

use crate::decl::DeclId;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Builtin scalar kinds as classified by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinKind {
    Void,
    Bool,
    /// plain `char` on a target where it is signed
    CharS,
    /// plain `char` on a target where it is unsigned
    CharU,
    SChar,
    UChar,
    WChar,
    Char8,
    Char16,
    Char32,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Int128,
    UInt128,
    Half,
    Float,
    Double,
    LongDouble,
    Float128,
    NullPtr,
}

impl BuiltinKind {
    /// The front end's own spelling of the type.
    pub fn default_spelling(self) -> &'static str {
        match self {
            BuiltinKind::Void => "void",
            BuiltinKind::Bool => "bool",
            BuiltinKind::CharS | BuiltinKind::CharU => "char",
            BuiltinKind::SChar => "signed char",
            BuiltinKind::UChar => "unsigned char",
            BuiltinKind::WChar => "wchar_t",
            BuiltinKind::Char8 => "char8_t",
            BuiltinKind::Char16 => "char16_t",
            BuiltinKind::Char32 => "char32_t",
            BuiltinKind::Short => "short",
            BuiltinKind::UShort => "unsigned short",
            BuiltinKind::Int => "int",
            BuiltinKind::UInt => "unsigned int",
            BuiltinKind::Long => "long",
            BuiltinKind::ULong => "unsigned long",
            BuiltinKind::LongLong => "long long",
            BuiltinKind::ULongLong => "unsigned long long",
            BuiltinKind::Int128 => "__int128",
            BuiltinKind::UInt128 => "unsigned __int128",
            BuiltinKind::Half => "__fp16",
            BuiltinKind::Float => "float",
            BuiltinKind::Double => "double",
            BuiltinKind::LongDouble => "long double",
            BuiltinKind::Float128 => "__float128",
            BuiltinKind::NullPtr => "std::nullptr_t",
        }
    }

    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            BuiltinKind::CharS
                | BuiltinKind::SChar
                | BuiltinKind::WChar
                | BuiltinKind::Short
                | BuiltinKind::Int
                | BuiltinKind::Long
                | BuiltinKind::LongLong
                | BuiltinKind::Int128
        )
    }
}

/// Reference to a record or enum declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclRef {
    pub id: DeclId,
    /// Name as the front end knows it; empty for anonymous declarations.
    #[serde(default)]
    pub name: SmolStr,
}

/// A template argument of a specialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateArg {
    Type(Type),
    Integral {
        value: i128,
        #[serde(default = "default_bits")]
        bits: u32,
        #[serde(default = "default_signed")]
        signed: bool,
    },
    /// Value-dependent or otherwise unevaluated argument, already spelled.
    Expression(SmolStr),
}

fn default_bits() -> u32 {
    32
}

fn default_signed() -> bool {
    true
}

/// A fully resolved type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    /// Builtin scalar
    Builtin(BuiltinKind),
    /// Pointer type: T*
    Pointer(Box<Type>),
    /// Reference type: T& (lvalue) or T&& (rvalue)
    Reference {
        inner: Box<Type>,
        #[serde(default)]
        rvalue: bool,
    },
    /// Array type: T[N]
    ConstantArray { element: Box<Type>, size: u64 },
    /// Array type without a bound: T[]
    Array(Box<Type>),
    /// Function type: R(Args...)
    Function {
        ret: Box<Type>,
        #[serde(default)]
        params: Vec<Type>,
        #[serde(default)]
        variadic: bool,
    },
    Record(DeclRef),
    Enum(DeclRef),
    /// Template specialization: Name<Args...>
    TemplateSpecialization {
        template: SmolStr,
        #[serde(default)]
        args: Vec<TemplateArg>,
    },
    /// cv-qualified type
    Qualified { is_const: bool, inner: Box<Type> },
    /// Named typedef, kept as written
    Typedef { name: SmolStr, underlying: Box<Type> },
    /// Template parameter (used inside class and function templates)
    TemplateParam(SmolStr),
    /// A type the front end could not resolve; printed with its own spelling.
    Dependent(SmolStr),
}

impl Type {
    pub fn void() -> Self {
        Type::Builtin(BuiltinKind::Void)
    }

    pub fn bool() -> Self {
        Type::Builtin(BuiltinKind::Bool)
    }

    pub fn int() -> Self {
        Type::Builtin(BuiltinKind::Int)
    }

    pub fn uint() -> Self {
        Type::Builtin(BuiltinKind::UInt)
    }

    pub fn float() -> Self {
        Type::Builtin(BuiltinKind::Float)
    }

    pub fn double() -> Self {
        Type::Builtin(BuiltinKind::Double)
    }

    pub fn char() -> Self {
        Type::Builtin(BuiltinKind::CharS)
    }

    pub fn record(id: u32, name: &str) -> Self {
        Type::Record(DeclRef {
            id: DeclId(id),
            name: name.into(),
        })
    }

    pub fn enumeration(id: u32, name: &str) -> Self {
        Type::Enum(DeclRef {
            id: DeclId(id),
            name: name.into(),
        })
    }

    /// Pointer to this type.
    pub fn ptr(self) -> Self {
        Type::Pointer(Box::new(self))
    }

    /// const-qualified version of this type.
    pub fn constant(self) -> Self {
        Type::Qualified {
            is_const: true,
            inner: Box::new(self),
        }
    }

    /// Lvalue reference to this type.
    pub fn lref(self) -> Self {
        Type::Reference {
            inner: Box::new(self),
            rvalue: false,
        }
    }

    /// Rvalue reference to this type.
    pub fn rref(self) -> Self {
        Type::Reference {
            inner: Box::new(self),
            rvalue: true,
        }
    }

    /// Const lvalue reference to this type.
    pub fn const_ref(self) -> Self {
        self.constant().lref()
    }

    pub fn array(self, size: u64) -> Self {
        Type::ConstantArray {
            element: Box::new(self),
            size,
        }
    }

    /// Strip typedef sugar and qualifiers, leaving the type that decides
    /// the shape (pointer, reference, record, ...).
    pub fn desugar(&self) -> &Type {
        let mut ty = self;
        loop {
            match ty {
                Type::Qualified { inner, .. } => ty = inner,
                Type::Typedef { underlying, .. } => ty = underlying,
                _ => return ty,
            }
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.desugar(), Type::Builtin(BuiltinKind::Void))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.desugar(), Type::Pointer(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.desugar(), Type::Reference { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.desugar(), Type::Function { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self.desugar(), Type::ConstantArray { .. } | Type::Array(_))
    }

    pub fn is_const(&self) -> bool {
        match self {
            Type::Qualified { is_const, inner } => *is_const || inner.is_const(),
            _ => false,
        }
    }

    /// Pointee of a pointer or referent of a reference.
    pub fn pointee(&self) -> Option<&Type> {
        match self.desugar() {
            Type::Pointer(inner) | Type::Reference { inner, .. } => Some(inner),
            _ => None,
        }
    }

    /// The record this type names, looking through qualifiers, typedefs
    /// and references (but not pointers).
    pub fn as_record(&self) -> Option<&DeclRef> {
        match self.desugar() {
            Type::Record(r) => Some(r),
            Type::Reference { inner, .. } => inner.as_record(),
            _ => None,
        }
    }
}
