//! Document-order walk of a translation unit.
//!
//! The driver owns traversal order only; everything it finds is pushed to
//! a [`DeclSink`], which decides what to write.

use crate::error::Result;
use dgen_ast::{Decl, DeclKind, MacroDecl, SourceLoc, TranslationUnit};
use std::path::Path;
use tracing::trace;

/// Receiver of the driver's declaration stream.
///
/// Calls arrive in source order. `enter_record`/`leave_record` bracket
/// each top-level record; nested members are reached through the record
/// itself, not through separate calls.
pub trait DeclSink {
    fn begin_file(&mut self, path: &Path) -> Result<()>;
    fn end_file(&mut self, path: &Path) -> Result<()>;
    fn define_macro(&mut self, name: &str, mac: &MacroDecl, loc: &SourceLoc) -> Result<()>;
    fn enter_record(&mut self, decl: &Decl) -> Result<()>;
    fn leave_record(&mut self, decl: &Decl) -> Result<()>;
    fn enum_decl(&mut self, decl: &Decl) -> Result<()>;
    fn function_decl(&mut self, decl: &Decl) -> Result<()>;
    fn typedef_decl(&mut self, decl: &Decl) -> Result<()>;
    fn global_var_decl(&mut self, decl: &Decl) -> Result<()>;
}

/// Push every file of `unit` to `sink`, descending into namespaces.
pub fn drive<S: DeclSink + ?Sized>(unit: &TranslationUnit, sink: &mut S) -> Result<()> {
    for file in &unit.files {
        trace!(path = %file.path.display(), decls = file.decls.len(), "entering file");
        sink.begin_file(&file.path)?;
        for decl in &file.decls {
            visit(decl, sink)?;
        }
        sink.end_file(&file.path)?;
    }
    Ok(())
}

fn visit<S: DeclSink + ?Sized>(decl: &Decl, sink: &mut S) -> Result<()> {
    match &decl.kind {
        DeclKind::Namespace(ns) => {
            for member in &ns.members {
                visit(member, sink)?;
            }
            Ok(())
        }
        DeclKind::Record(_) => {
            sink.enter_record(decl)?;
            sink.leave_record(decl)
        }
        DeclKind::Enum(_) => sink.enum_decl(decl),
        DeclKind::Function(_) => sink.function_decl(decl),
        DeclKind::Typedef(_) => sink.typedef_decl(decl),
        DeclKind::Variable(_) => sink.global_var_decl(decl),
        DeclKind::Macro(mac) => {
            let name = decl.name.as_deref().unwrap_or_default();
            sink.define_macro(name, mac, &decl.loc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dgen_ast::{EnumDecl, FunctionDecl, RecordDecl, RecordTag, Type};

    /// Records the call sequence.
    #[derive(Default)]
    struct Trace(Vec<String>);

    impl DeclSink for Trace {
        fn begin_file(&mut self, path: &Path) -> Result<()> {
            self.0.push(format!("begin {}", path.display()));
            Ok(())
        }
        fn end_file(&mut self, path: &Path) -> Result<()> {
            self.0.push(format!("end {}", path.display()));
            Ok(())
        }
        fn define_macro(&mut self, name: &str, _mac: &MacroDecl, _loc: &SourceLoc) -> Result<()> {
            self.0.push(format!("macro {}", name));
            Ok(())
        }
        fn enter_record(&mut self, decl: &Decl) -> Result<()> {
            self.0.push(format!("enter {}", decl.id));
            Ok(())
        }
        fn leave_record(&mut self, decl: &Decl) -> Result<()> {
            self.0.push(format!("leave {}", decl.id));
            Ok(())
        }
        fn enum_decl(&mut self, decl: &Decl) -> Result<()> {
            self.0.push(format!("enum {}", decl.id));
            Ok(())
        }
        fn function_decl(&mut self, decl: &Decl) -> Result<()> {
            self.0.push(format!("function {}", decl.id));
            Ok(())
        }
        fn typedef_decl(&mut self, decl: &Decl) -> Result<()> {
            self.0.push(format!("typedef {}", decl.id));
            Ok(())
        }
        fn global_var_decl(&mut self, decl: &Decl) -> Result<()> {
            self.0.push(format!("var {}", decl.id));
            Ok(())
        }
    }

    #[test]
    fn test_document_order_through_namespaces() {
        let ns = Decl::namespace(
            1,
            "geo",
            vec![
                Decl::record(2, Some("Point"), RecordDecl::new(RecordTag::Struct)),
                Decl::function(3, "origin", FunctionDecl::new(Type::void())),
            ],
        );
        let unit = TranslationUnit::single(
            "geo.h",
            vec![
                Decl::macro_def(
                    4,
                    "GEO_H",
                    MacroDecl {
                        params: None,
                        tokens: Vec::new(),
                        header_guard: true,
                    },
                ),
                ns,
                Decl::enumeration(5, Some("Axis"), EnumDecl::new(Type::int(), &[("X", 0)])),
            ],
        );

        let mut sink = Trace::default();
        drive(&unit, &mut sink).unwrap();
        assert_eq!(
            sink.0,
            vec![
                "begin geo.h",
                "macro GEO_H",
                "enter #2",
                "leave #2",
                "function #3",
                "enum #5",
                "end geo.h",
            ]
        );
    }
}
