//! Type translation to D syntax.

use crate::naming::NameTable;
use dgen_ast::{BuiltinKind, TemplateArg, Type};

/// Pick the D integer type of a given bit width.
pub fn int_type_for_size(bits: u32, signed: bool) -> &'static str {
    match (bits, signed) {
        (8, true) => "byte",
        (8, false) => "ubyte",
        (16, true) => "short",
        (16, false) => "ushort",
        (64, true) => "long",
        (64, false) => "ulong",
        (_, true) => "int",
        (_, false) => "uint",
    }
}

/// D spelling of a builtin. Kinds without a fixed mapping keep the front
/// end's spelling.
pub fn builtin_to_d(kind: BuiltinKind) -> &'static str {
    match kind {
        BuiltinKind::Bool => "bool",
        BuiltinKind::CharS | BuiltinKind::SChar => "char",
        BuiltinKind::CharU | BuiltinKind::UChar => "ubyte",
        BuiltinKind::UShort => "ushort",
        BuiltinKind::UInt => "uint",
        BuiltinKind::ULong => "cpp_ulong",
        BuiltinKind::Long => "cpp_long",
        BuiltinKind::ULongLong => "ulong",
        BuiltinKind::LongLong => "long",
        other => other.default_spelling(),
    }
}

/// Closing marker pushed while descending a pointer/qualifier chain.
#[derive(Clone, Copy)]
enum Close {
    Paren,
    Star,
}

/// Renders resolved types as D type expressions.
///
/// Record and enum references render as their bare (possibly synthetic)
/// name; scope qualification is the namespace policy's business.
#[derive(Clone, Copy)]
pub struct TypeTranslator<'n> {
    names: &'n NameTable,
}

impl<'n> TypeTranslator<'n> {
    pub fn new(names: &'n NameTable) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &'n NameTable {
        self.names
    }

    pub fn render(&self, ty: &Type) -> String {
        let rendered = match ty {
            Type::Pointer(_) | Type::Reference { .. } | Type::Qualified { .. } => self.roll(ty),
            _ => self.render_leaf(ty),
        };
        rendered.replace("::", ".")
    }

    /// Render a pointer/reference/qualifier chain.
    ///
    /// Descending the chain writes `ref ` and `const(` as they are met and
    /// remembers a closer per level; after the innermost type the closers
    /// are written in reverse, so `T * const *` nests as `const(T*)*`.
    fn roll(&self, ty: &Type) -> String {
        let mut out = String::new();
        let mut closers = Vec::new();
        let mut cur = ty;
        loop {
            match cur {
                Type::Reference { inner, .. } => {
                    out.push_str("ref ");
                    cur = inner;
                }
                Type::Qualified { is_const, inner } => {
                    if *is_const {
                        out.push_str("const(");
                        closers.push(Close::Paren);
                    }
                    cur = inner;
                }
                Type::Pointer(inner) if !inner.is_function() => {
                    closers.push(Close::Star);
                    cur = inner;
                }
                _ => break,
            }
        }
        out.push_str(&self.render_leaf(cur));
        for close in closers.iter().rev() {
            out.push(match close {
                Close::Paren => ')',
                Close::Star => '*',
            });
        }
        out
    }

    fn render_leaf(&self, ty: &Type) -> String {
        match ty {
            Type::Builtin(kind) => builtin_to_d(*kind).to_string(),
            // D function types are already pointers.
            Type::Pointer(inner) => self.render(inner.desugar()),
            Type::Reference { .. } | Type::Qualified { .. } => self.roll(ty),
            Type::ConstantArray { element, size } => {
                format!("{}[{}]", self.render(element), size)
            }
            // The bound is lost on purpose: D has no sized open array.
            Type::Array(element) => format!("{}[]", self.render(element)),
            Type::Function {
                ret,
                params,
                variadic,
            } => {
                let mut params: Vec<String> = params.iter().map(|p| self.render(p)).collect();
                if *variadic {
                    params.push("...".to_string());
                }
                format!("{} function({})", self.render(ret), params.join(", "))
            }
            Type::Record(r) | Type::Enum(r) => self.names.ref_name(r).to_string(),
            Type::TemplateSpecialization { template, args } => {
                let args: Vec<String> = args.iter().map(|a| self.render_arg(a)).collect();
                format!("{}!({})", template, args.join(", "))
            }
            Type::Typedef { name, .. } => name.to_string(),
            Type::TemplateParam(name) | Type::Dependent(name) => name.to_string(),
        }
    }

    pub fn render_arg(&self, arg: &TemplateArg) -> String {
        match arg {
            TemplateArg::Type(ty) => self.render(ty),
            TemplateArg::Integral { value, .. } => value.to_string(),
            TemplateArg::Expression(spelling) => spelling.replace("::", "."),
        }
    }
}
