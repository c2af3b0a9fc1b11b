//! Linkage and namespace wrappers for top-level declarations.

use crate::writer::CodeWriter;
use dgen_ast::DeclContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    Cpp,
    C,
}

impl Linkage {
    /// C++ linkage applies when the source standard is C++ and the
    /// declaration is not inside `extern "C"`.
    pub fn of(context: &DeclContext, cpp_default: bool) -> Self {
        if cpp_default && !context.extern_c {
            Linkage::Cpp
        } else {
            Linkage::C
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Linkage::Cpp => "C++",
            Linkage::C => "C",
        }
    }
}

/// How a declaration's enclosing namespaces are expressed in D.
pub trait NamespacePolicy {
    /// Write the attribute line that opens a declaration in `context`.
    fn begin_entry(&mut self, w: &mut CodeWriter, context: &DeclContext, linkage: Linkage);

    /// Close whatever `begin_entry` opened.
    fn finish_entry(&mut self, w: &mut CodeWriter, context: &DeclContext);
}

/// Writes `extern(C++, "outer", "inner")` ahead of each declaration.
#[derive(Debug, Default)]
pub struct StringListPolicy;

impl NamespacePolicy for StringListPolicy {
    fn begin_entry(&mut self, w: &mut CodeWriter, context: &DeclContext, linkage: Linkage) {
        let namespaces = context.namespaces();
        if namespaces.is_empty() || linkage == Linkage::C {
            w.writeln(&format!("extern({})", linkage.as_str()));
            return;
        }
        let quoted: Vec<String> = namespaces.iter().map(|ns| format!("\"{}\"", ns)).collect();
        w.writeln(&format!("extern(C++, {})", quoted.join(", ")));
    }

    fn finish_entry(&mut self, _w: &mut CodeWriter, _context: &DeclContext) {}
}
