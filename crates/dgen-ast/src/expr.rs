//! Resolved expressions, as found in default arguments, initializers and
//! inline bodies.

use crate::decl::OverloadedOperator;
use crate::types::{BuiltinKind, TemplateArg, Type};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    PostInc,
    PostDec,
    PreInc,
    PreDec,
    AddrOf,
    Deref,
    Plus,
    Minus,
    /// Bitwise not `~`
    Not,
    /// Logical not `!`
    LNot,
}

impl UnaryOp {
    pub fn spelling(self) -> &'static str {
        match self {
            UnaryOp::PostInc | UnaryOp::PreInc => "++",
            UnaryOp::PostDec | UnaryOp::PreDec => "--",
            UnaryOp::AddrOf => "&",
            UnaryOp::Deref => "*",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "~",
            UnaryOp::LNot => "!",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Xor,
    Or,
    LAnd,
    LOr,
    Assign,
    MulAssign,
    DivAssign,
    RemAssign,
    AddAssign,
    SubAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    XorAssign,
    OrAssign,
    Comma,
}

impl BinaryOp {
    pub fn spelling(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&",
            BinaryOp::Xor => "^",
            BinaryOp::Or => "|",
            BinaryOp::LAnd => "&&",
            BinaryOp::LOr => "||",
            BinaryOp::Assign => "=",
            BinaryOp::MulAssign => "*=",
            BinaryOp::DivAssign => "/=",
            BinaryOp::RemAssign => "%=",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubAssign => "-=",
            BinaryOp::ShlAssign => "<<=",
            BinaryOp::ShrAssign => ">>=",
            BinaryOp::AndAssign => "&=",
            BinaryOp::XorAssign => "^=",
            BinaryOp::OrAssign => "|=",
            BinaryOp::Comma => ",",
        }
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::LAnd | BinaryOp::LOr)
    }
}

/// Implicit conversions the printer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastKind {
    ArrayToPointerDecay,
    FunctionToPointerDecay,
    NullToPointer,
    LValueToRValue,
    DerivedToBase,
    IntegralCast,
    FloatingCast,
    IntegralToFloating,
    FloatingToIntegral,
    ToVoid,
    NoOp,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedCastKind {
    Static,
    Dynamic,
    Reinterpret,
    Const,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharKind {
    #[default]
    Ascii,
    Wide,
    Utf8,
    Utf16,
    Utf32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewInitStyle {
    #[default]
    None,
    Call,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    SizeOf,
    AlignOf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitArg {
    Type(Type),
    Expr(Box<Expr>),
}

/// An overloaded operator named by a member access, with the number of
/// explicit parameters of the selected overload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorRef {
    pub op: OverloadedOperator,
    pub params: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    IntegerLiteral {
        value: i128,
        #[serde(default = "int_kind")]
        ty: BuiltinKind,
    },
    FloatLiteral {
        value: f64,
        #[serde(default = "double_kind")]
        ty: BuiltinKind,
    },
    CharLiteral {
        value: u32,
        #[serde(default)]
        kind: CharKind,
    },
    StringLiteral {
        value: String,
        #[serde(default)]
        wide: bool,
    },
    BoolLiteral(bool),
    NullPtr,
    This {
        #[serde(default)]
        implicit: bool,
    },
    DeclRef {
        name: SmolStr,
        ty: Type,
        /// Type named by a `Type::` qualifier
        #[serde(default)]
        qualifier: Option<Type>,
        #[serde(default)]
        template_args: Vec<TemplateArg>,
    },
    Member {
        base: Box<Expr>,
        member: SmolStr,
        ty: Type,
        #[serde(default)]
        arrow: bool,
        #[serde(default)]
        qualifier: Option<Type>,
        /// Set when the member is an overloaded operator
        #[serde(default)]
        operator: Option<OperatorRef>,
        /// The member is an anonymous struct or union field
        #[serde(default)]
        anonymous: bool,
        #[serde(default)]
        template_args: Vec<TemplateArg>,
    },
    Call {
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
        /// Parameter types of a direct, non-variadic callee
        #[serde(default)]
        callee_params: Option<Vec<Type>>,
    },
    MemberCall {
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        callee_params: Option<Vec<Type>>,
        /// The called method is a conversion operator
        #[serde(default)]
        conversion: bool,
    },
    OperatorCall {
        op: OverloadedOperator,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Paren(Box<Expr>),
    ImplicitCast {
        kind: CastKind,
        expr: Box<Expr>,
        ty: Type,
    },
    CStyleCast {
        ty: Type,
        expr: Box<Expr>,
    },
    NamedCast {
        kind: NamedCastKind,
        ty: Type,
        expr: Box<Expr>,
    },
    FunctionalCast {
        ty: Type,
        expr: Box<Expr>,
        /// Written with parentheses rather than braces
        #[serde(default = "yes")]
        parens: bool,
    },
    Construct {
        ty: Type,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        list_init: bool,
        #[serde(default)]
        std_init_list: bool,
    },
    TemporaryObject {
        ty: Type,
        #[serde(default)]
        args: Vec<Expr>,
    },
    UnresolvedConstruct {
        ty: Type,
        #[serde(default)]
        args: Vec<Expr>,
    },
    MaterializeTemporary {
        expr: Box<Expr>,
        ty: Type,
    },
    /// Placeholder for an argument filled in from a default value
    DefaultArg,
    New {
        ty: Type,
        #[serde(default)]
        placement: Vec<Expr>,
        #[serde(default)]
        init: Option<Box<Expr>>,
        #[serde(default)]
        init_style: NewInitStyle,
    },
    Delete {
        expr: Box<Expr>,
        #[serde(default)]
        array: bool,
    },
    PseudoDestructor {
        base: Box<Expr>,
    },
    TypeTrait {
        kind: TraitKind,
        arg: TraitArg,
    },
    ArraySubscript {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    InitList {
        ty: Type,
        #[serde(default)]
        exprs: Vec<Expr>,
    },
    DependentMember {
        #[serde(default)]
        base: Option<Box<Expr>>,
        member: SmolStr,
        #[serde(default)]
        template_args: Vec<TemplateArg>,
    },
    /// Anything the front end could not classify, already spelled out.
    Unknown(SmolStr),
}

fn int_kind() -> BuiltinKind {
    BuiltinKind::Int
}

fn double_kind() -> BuiltinKind {
    BuiltinKind::Double
}

fn yes() -> bool {
    true
}

impl Expr {
    pub fn int(value: i128) -> Self {
        Expr::IntegerLiteral {
            value,
            ty: BuiltinKind::Int,
        }
    }

    pub fn decl_ref(name: &str, ty: Type) -> Self {
        Expr::DeclRef {
            name: name.into(),
            ty,
            qualifier: None,
            template_args: Vec::new(),
        }
    }

    /// Access to `member` through the implicit `this` of a method body.
    pub fn this_member(member: &str, ty: Type) -> Self {
        Expr::Member {
            base: Box::new(Expr::This { implicit: true }),
            member: member.into(),
            ty,
            arrow: true,
            qualifier: None,
            operator: None,
            anonymous: false,
            template_args: Vec::new(),
        }
    }

    pub fn implicit(kind: CastKind, expr: Expr, ty: Type) -> Self {
        Expr::ImplicitCast {
            kind,
            expr: Box::new(expr),
            ty,
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// The static type of the expression, for the variants that carry one.
    pub fn ty(&self) -> Option<&Type> {
        match self {
            Expr::DeclRef { ty, .. }
            | Expr::Member { ty, .. }
            | Expr::ImplicitCast { ty, .. }
            | Expr::CStyleCast { ty, .. }
            | Expr::NamedCast { ty, .. }
            | Expr::FunctionalCast { ty, .. }
            | Expr::Construct { ty, .. }
            | Expr::TemporaryObject { ty, .. }
            | Expr::UnresolvedConstruct { ty, .. }
            | Expr::MaterializeTemporary { ty, .. }
            | Expr::InitList { ty, .. } => Some(ty),
            Expr::Paren(inner) => inner.ty(),
            _ => None,
        }
    }

    /// Strip implicit casts and temporaries wrapped around the expression.
    pub fn ignore_implicit(&self) -> &Expr {
        let mut expr = self;
        loop {
            match expr {
                Expr::ImplicitCast { expr: inner, .. }
                | Expr::MaterializeTemporary { expr: inner, .. } => expr = inner,
                _ => return expr,
            }
        }
    }

    /// Strip parentheses and implicit casts.
    pub fn ignore_parens_implicit(&self) -> &Expr {
        let mut expr = self;
        loop {
            match expr {
                Expr::Paren(inner)
                | Expr::ImplicitCast { expr: inner, .. }
                | Expr::MaterializeTemporary { expr: inner, .. } => expr = inner,
                _ => return expr,
            }
        }
    }

    /// Whether this expression is a null pointer constant: `nullptr`,
    /// integer literal zero, or a cast of either to a pointer type.
    pub fn is_null_pointer_constant(&self) -> bool {
        match self {
            Expr::NullPtr => true,
            Expr::IntegerLiteral { value, .. } => *value == 0,
            Expr::Paren(inner) => inner.is_null_pointer_constant(),
            Expr::ImplicitCast { kind, expr, .. } => {
                *kind == CastKind::NullToPointer || expr.is_null_pointer_constant()
            }
            Expr::CStyleCast { ty, expr } | Expr::NamedCast { ty, expr, .. } => {
                (ty.is_pointer() || ty.is_void()) && expr.is_null_pointer_constant()
            }
            _ => false,
        }
    }

    /// Whether an explicit (written) `this` appears anywhere in the
    /// expression.
    pub fn mentions_explicit_this(&self) -> bool {
        match self {
            Expr::This { implicit } => !implicit,
            Expr::Member { base, .. } => base.mentions_explicit_this(),
            Expr::Unary { operand, .. } => operand.mentions_explicit_this(),
            Expr::Paren(e)
            | Expr::ImplicitCast { expr: e, .. }
            | Expr::CStyleCast { expr: e, .. }
            | Expr::NamedCast { expr: e, .. }
            | Expr::MaterializeTemporary { expr: e, .. } => e.mentions_explicit_this(),
            Expr::ArraySubscript { base, index } => {
                base.mentions_explicit_this() || index.mentions_explicit_this()
            }
            Expr::Binary { lhs, rhs, .. } => {
                lhs.mentions_explicit_this() || rhs.mentions_explicit_this()
            }
            _ => false,
        }
    }

    /// Whether a temporary-object construction occurs anywhere in this
    /// construct expression's arguments.
    pub fn contains_temporary_object(&self) -> bool {
        match self {
            Expr::TemporaryObject { .. } => true,
            Expr::Construct { args, .. } => args.iter().any(Expr::contains_temporary_object),
            Expr::ImplicitCast { expr, .. }
            | Expr::MaterializeTemporary { expr, .. }
            | Expr::Paren(expr) => expr.contains_temporary_object(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_pointer_constants() {
        assert!(Expr::NullPtr.is_null_pointer_constant());
        assert!(Expr::int(0).is_null_pointer_constant());
        assert!(!Expr::int(1).is_null_pointer_constant());
        let cast = Expr::CStyleCast {
            ty: Type::void().ptr(),
            expr: Box::new(Expr::int(0)),
        };
        assert!(cast.is_null_pointer_constant());
        let to_ptr = Expr::implicit(CastKind::NullToPointer, Expr::int(0), Type::int().ptr());
        assert!(Expr::Paren(Box::new(to_ptr)).is_null_pointer_constant());
    }

    #[test]
    fn test_explicit_this_detection() {
        let implicit = Expr::this_member("x", Type::int());
        assert!(!implicit.mentions_explicit_this());
        let deref = Expr::Unary {
            op: UnaryOp::Deref,
            operand: Box::new(Expr::This { implicit: false }),
        };
        assert!(deref.mentions_explicit_this());
    }
}
