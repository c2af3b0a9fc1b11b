//! Resolved declaration tree for the D binding emitter.
//!
//! Everything in this crate is produced by an external semantic front end:
//! types are fully resolved, templates instantiated, virtual dispatch decided
//! and ABI layout computed. The emitter only reads it.
//!
//! # Architecture
//!
//! ```text
//! C/C++ front end → TranslationUnit (JSON) → dgen-emit → D bindings
//! ```
//!
//! The tree is serializable so a front end written in any language can hand
//! it over as a JSON document.

mod decl;
mod expr;
mod loc;
mod stmt;
mod types;

pub use decl::{
    Access, BaseSpec, CtorInitializer, CtorKind, Decl, DeclContext, DeclId, DeclKind, EnumDecl,
    Enumerator, FieldDecl, FunctionDecl, Layout, MacroDecl, MacroToken, MethodInfo, MethodRole,
    NamespaceDecl, OverloadedOperator, ParamDecl, RecordDecl, RecordTag, RecordTemplate, Scope,
    StorageClass, TemplateParam, TokenKind, TypedefDecl, VarDecl,
};
pub use expr::{
    BinaryOp, CastKind, CharKind, Expr, NamedCastKind, NewInitStyle, OperatorRef, TraitArg,
    TraitKind, UnaryOp,
};
pub use loc::SourceLoc;
pub use stmt::{InitStyle, LocalVar, Stmt};
pub use types::{BuiltinKind, DeclRef, TemplateArg, Type};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A whole translation unit, grouped by source file in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Files in the order the front end entered them.
    #[serde(default)]
    pub files: Vec<SourceFile>,
}

/// Top-level declarations of one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    #[serde(default)]
    pub decls: Vec<Decl>,
}

impl TranslationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a single-file unit.
    pub fn single(path: impl Into<PathBuf>, decls: Vec<Decl>) -> Self {
        Self {
            files: vec![SourceFile {
                path: path.into(),
                decls,
            }],
        }
    }

    /// Visit every declaration reachable from the unit, depth first,
    /// including namespace members, nested record members and methods.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Decl)) {
        for file in &self.files {
            for decl in &file.decls {
                decl.walk(visit);
            }
        }
    }
}
