//! Statements of inline bodies.

use crate::expr::Expr;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// How a variable was initialized in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStyle {
    /// `T x = init;`
    #[default]
    C,
    /// `T x(args);`
    Call,
    /// `T x{args};`
    List,
}

/// A block-scope variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalVar {
    pub name: SmolStr,
    pub ty: Type,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(default)]
    pub init_style: InitStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Compound(Vec<Stmt>),
    Expr(Expr),
    Decl(Vec<LocalVar>),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then: Box<Stmt>,
        #[serde(default)]
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Do {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        inc: Option<Expr>,
        body: Box<Stmt>,
    },
    Switch {
        cond: Expr,
        body: Box<Stmt>,
    },
    Case {
        value: Expr,
        body: Box<Stmt>,
    },
    Default(Box<Stmt>),
    Label {
        name: SmolStr,
        body: Box<Stmt>,
    },
    Goto(SmolStr),
    Break,
    Continue,
    Null,
}

impl Stmt {
    pub fn is_empty_compound(&self) -> bool {
        matches!(self, Stmt::Compound(body) if body.is_empty())
    }

    pub fn ret(expr: Expr) -> Self {
        Stmt::Return(Some(expr))
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Compound(stmts)
    }
}
