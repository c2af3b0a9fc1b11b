//! Declaration emitter.
//!
//! Receives declarations from the driver in document order and appends
//! their D rendering to a single output buffer. Every top-level entry
//! point first checks the input-root filter and the emission registry, so
//! a declaration reached twice (a record named by a typedef, say) is only
//! written once.

mod record;

use crate::driver::DeclSink;
use crate::error::Result;
use crate::feedback::{FeedbackQueue, FeedbackRequest};
use crate::ident::sanitize;
use crate::macros::MacroWriter;
use crate::namespace::{Linkage, NamespacePolicy, StringListPolicy};
use crate::naming::{DeclIndex, NameTable};
use crate::preamble::MODULE_PREAMBLE;
use crate::printer::Printer;
use crate::types::TypeTranslator;
use crate::writer::CodeWriter;
use dgen_ast::{
    Decl, DeclContext, DeclId, DeclKind, EnumDecl, FunctionDecl, MacroDecl, SourceLoc,
    StorageClass, Stmt, TemplateParam, TranslationUnit, Type,
};
use dgen_config::{GenConfig, ManglingScheme, PathFilter};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::path::Path;
use tracing::{debug, debug_span, trace};

/// Settings of one emission run.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// C++ linkage unless a declaration sits in `extern "C"`.
    pub cpp_default: bool,
    /// Mark every function `@nogc`.
    pub nogc: bool,
    pub mangling: ManglingScheme,
    /// Start the output with the module preamble.
    pub preamble: bool,
    pub filter: PathFilter,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            cpp_default: true,
            nogc: false,
            mangling: ManglingScheme::default(),
            preamble: true,
            filter: PathFilter::accept_all(),
        }
    }
}

impl EmitOptions {
    pub fn from_config(config: &GenConfig) -> Self {
        Self {
            cpp_default: config.input.cpp_is_default(),
            nogc: config.output.nogc(),
            mangling: config.output.mangling,
            preamble: true,
            filter: PathFilter::new(&config.input.paths),
        }
    }

    pub fn with_preamble(mut self, preamble: bool) -> Self {
        self.preamble = preamble;
        self
    }

    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_nogc(mut self, nogc: bool) -> Self {
        self.nogc = nogc;
        self
    }

    pub fn with_mangling(mut self, mangling: ManglingScheme) -> Self {
        self.mangling = mangling;
        self
    }
}

/// Where a record's closing brace was written.
#[derive(Debug, Clone, Copy)]
struct ClosedRecord {
    offset: usize,
    /// Indent level of the record body
    indent: usize,
    struct_shape: bool,
}

/// Emits a translation unit as a D module.
pub struct Emitter<'u> {
    options: EmitOptions,
    index: DeclIndex<'u>,
    names: NameTable,
    registry: FxHashSet<DeclId>,
    macros: MacroWriter,
    feedback: FeedbackQueue,
    closed: FxHashMap<DeclId, ClosedRecord>,
    /// Records that already carry the `RvalueRef` mixin
    with_mixin: FxHashSet<DeclId>,
    nesting: Vec<(DeclId, SmolStr)>,
    policy: Box<dyn NamespacePolicy>,
    w: CodeWriter,
}

impl<'u> Emitter<'u> {
    /// Run the naming pre-pass over `unit` and write the preamble.
    pub fn new(unit: &'u TranslationUnit, options: EmitOptions) -> Self {
        let index = DeclIndex::build(unit);
        let names = NameTable::assign(unit, &index);
        debug!(decls = index.len(), "indexed translation unit");

        let mut w = CodeWriter::new();
        if options.preamble {
            w.push(MODULE_PREAMBLE);
        }
        Self {
            options,
            index,
            names,
            registry: FxHashSet::default(),
            macros: MacroWriter::new(),
            feedback: FeedbackQueue::new(),
            closed: FxHashMap::default(),
            with_mixin: FxHashSet::default(),
            nesting: Vec::new(),
            policy: Box::new(StringListPolicy),
            w,
        }
    }

    pub fn with_policy(mut self, policy: Box<dyn NamespacePolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Text written so far, without the finalize pass.
    pub fn output(&self) -> &str {
        self.w.as_str()
    }

    /// Apply feedback requests that arrived after their record closed and
    /// return the module text.
    pub fn finish(mut self) -> String {
        let mut inserts = Vec::new();
        for request in self.feedback.drain() {
            let FeedbackRequest::RvalueRef { record, name } = request;
            if self.with_mixin.contains(&record) {
                continue;
            }
            match self.closed.get(&record) {
                Some(closed) if closed.struct_shape => {
                    debug!(record = %name, "adding RvalueRef mixin after close");
                    inserts.push((closed.offset, closed.indent));
                    self.with_mixin.insert(record);
                }
                Some(_) => {
                    debug!(record = %name, "dropping RvalueRef request for class-shape record")
                }
                None => debug!(record = %name, "dropping RvalueRef request for unemitted record"),
            }
        }

        // Later offsets first so earlier ones stay valid.
        inserts.sort_by(|a, b| b.0.cmp(&a.0));
        for (offset, indent) in inserts {
            let line = format!("{}mixin RvalueRef;\n", "    ".repeat(indent));
            self.w.insert(offset, &line);
        }
        self.w.finish()
    }

    fn is_relevant(&self, decl: &Decl) -> bool {
        let relevant = self.options.filter.is_relevant(decl.loc.file.as_deref());
        if !relevant {
            trace!(decl = %decl.id, loc = %decl.loc, "outside input roots");
        }
        relevant
    }

    /// Claim `decl` for emission; false when it was already emitted.
    fn register(&mut self, decl: &Decl) -> bool {
        let fresh = self.registry.insert(decl.id);
        if !fresh {
            debug!(decl = %decl.id, name = ?decl.name, "already emitted");
        }
        fresh
    }

    fn linkage(&self, context: &DeclContext) -> Linkage {
        Linkage::of(context, self.options.cpp_default)
    }

    fn nesting_name(&self) -> String {
        let names: Vec<&str> = self.nesting.iter().map(|(_, n)| n.as_str()).collect();
        names.join("_")
    }

    fn render(&self, ty: &Type) -> String {
        TypeTranslator::new(&self.names).render(ty)
    }

    fn printer(&mut self) -> Printer<'_> {
        Printer::new(TypeTranslator::new(&self.names), &mut self.feedback)
    }

    fn nogc_suffix(&self) -> &'static str {
        if self.options.nogc {
            " @nogc"
        } else {
            ""
        }
    }

    /// Parameter list, without the parentheses.
    fn params(&mut self, func: &FunctionDecl) -> String {
        let mut params = Vec::with_capacity(func.params.len() + 1);
        for param in &func.params {
            let mut text = self.render(&param.ty);
            if let Some(name) = param.name.as_deref().filter(|n| !n.is_empty()) {
                text.push(' ');
                text.push_str(&sanitize(name));
            }
            if let Some(default) = &param.default {
                if param.ty.is_pointer() && default.is_null_pointer_constant() {
                    text.push_str(" = null");
                } else if param.ty.is_reference() {
                    // D cannot bind a temporary to `ref`; go through the mixin.
                    let value = self.printer().print_expr(default);
                    text.push_str(&format!(" = {}.byRef", value));
                    if let Some(r) = param.ty.as_record() {
                        self.feedback.push(FeedbackRequest::RvalueRef {
                            record: r.id,
                            name: self.names.ref_name(r),
                        });
                    }
                } else {
                    let value = self.printer().print_expr(default);
                    text.push_str(&format!(" = {}", value));
                }
            }
            params.push(text);
        }
        if func.variadic {
            params.push("...".to_string());
        }
        params.join(", ")
    }

    /// Compile-time parameter list, without the parentheses.
    fn template_params(&mut self, params: &[TemplateParam]) -> String {
        let mut out = Vec::with_capacity(params.len());
        for param in params {
            match &param.non_type {
                None => out.push(param.name.to_string()),
                Some(ty) => {
                    let mut text = format!("{} {}", self.render(ty), param.name);
                    if let Some(default) = &param.default {
                        let value = self.printer().print_expr(default);
                        text.push_str(&format!(" = {}", value));
                    }
                    out.push(text);
                }
            }
        }
        out.join(", ")
    }

    /// Write one line of a function body. C++ scope and arrow operators
    /// both become `.` in D.
    fn write_body_line(&mut self, line: &str, comment_out: bool) {
        let line = line.replace("::", ".").replace("->", ".");
        if comment_out {
            self.w.writeln(&format!("//{}", line));
        } else {
            self.w.writeln(&line);
        }
    }

    /// Write `sig` followed by `body`, or terminate it with `;`.
    ///
    /// `initializers` are the printed member initializers of a constructor;
    /// they open the body in a block of their own.
    fn write_definition(
        &mut self,
        sig: &str,
        func: &FunctionDecl,
        body: Option<&Stmt>,
        initializers: &[String],
        polymorphic: bool,
        comment_out: bool,
    ) {
        let Some(body) = body else {
            self.w.writeln(&format!("{};", sig));
            return;
        };
        let empty = body.is_empty_compound();
        if empty && initializers.is_empty() {
            self.w.writeln(&format!("{};", sig));
            return;
        }

        let text = if empty {
            String::new()
        } else {
            self.printer()
                .polymorphic(polymorphic)
                .pointer_return(func.return_type.is_pointer())
                .print_stmt(body)
        };

        let mut lines = Vec::new();
        if initializers.is_empty() {
            lines.extend(text.lines().map(str::to_string));
        } else {
            lines.push("{".to_string());
            lines.push("    // initializer list".to_string());
            lines.extend(initializers.iter().map(|i| format!("    {}", i)));
            if !empty {
                lines.push("    // ctor body".to_string());
                lines.extend(text.lines().map(|l| format!("    {}", l)));
            }
            lines.push("}".to_string());
        }

        self.w.writeln(sig);
        for line in &lines {
            self.write_body_line(line, comment_out);
        }
    }

    fn emit_enum(&mut self, decl: &Decl, decl_enum: &EnumDecl) {
        let int = self.render(&decl_enum.integer_type);
        let name = self.names.decl_name(decl);
        let head = if name.is_empty() {
            format!("enum : {}", int)
        } else {
            self.w.writeln(&format!("alias {} = {};", name, int));
            format!("enum : {}", name)
        };
        self.w.writeln(&head);
        self.w.writeln("{");
        self.w.indent();
        let separator = if decl_enum.enumerators.len() > 1 { "," } else { "" };
        for e in &decl_enum.enumerators {
            self.w
                .writeln(&format!("{} = {}{}", sanitize(&e.name), e.value, separator));
        }
        self.w.dedent();
        self.w.writeln("}");
        self.w.writeln("");
    }

    /// Emit a typedef. A typedef of a record emits the record itself,
    /// followed by an alias when the names differ.
    fn emit_typedef(&mut self, decl: &Decl, underlying: &Type, nested: bool) -> Result<()> {
        let name = decl.name.clone().unwrap_or_default();

        if let Type::Record(r) = underlying.desugar() {
            if let Some((record, _)) = self.index.record(r.id) {
                let record_name = self.names.decl_name(record);
                self.emit_record_once(record, nested)?;
                if record_name != name {
                    self.w.writeln(&format!("alias {} = {};", name, record_name));
                    self.w.writeln("");
                }
                return Ok(());
            }
            trace!(typedef = %name, record = %r.id, "typedef of unknown record, emitting alias");
        }

        let is_function =
            underlying.is_function() || underlying.pointee().is_some_and(Type::is_function);
        let linkage = if is_function {
            format!("extern({}) ", self.linkage(&decl.context).as_str())
        } else {
            String::new()
        };
        let ty = self.render(underlying);
        self.w.writeln(&format!("alias {} = {}{};", name, linkage, ty));
        if !nested {
            self.w.writeln("");
        }
        Ok(())
    }

    fn emit_record_once(&mut self, record: &Decl, nested: bool) -> Result<()> {
        if !nested {
            self.enter_record(record)?;
            return self.leave_record(record);
        }
        let Some(rec) = record.as_record() else {
            return Ok(());
        };
        if !rec.complete || rec.dependent || !self.register(record) {
            return Ok(());
        }
        self.nesting.push((record.id, self.names.decl_name(record)));
        self.emit_record(record, rec, false)?;
        self.nesting.pop();
        self.w.writeln("");
        Ok(())
    }
}

impl DeclSink for Emitter<'_> {
    fn begin_file(&mut self, path: &Path) -> Result<()> {
        self.w.writeln("");
        self.w.writeln(&format!("// ------ {}", path.display()));
        self.w.writeln("");
        Ok(())
    }

    fn end_file(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn define_macro(&mut self, name: &str, mac: &MacroDecl, loc: &SourceLoc) -> Result<()> {
        if !self.options.filter.is_relevant(loc.file.as_deref()) {
            trace!(name, loc = %loc, "macro outside input roots");
            return Ok(());
        }
        self.macros.define(&mut self.w, name, mac, loc);
        Ok(())
    }

    fn enter_record(&mut self, decl: &Decl) -> Result<()> {
        let Some(rec) = decl.as_record() else {
            return Ok(());
        };
        if rec.dependent {
            debug!(decl = %decl.id, name = ?decl.name, "skipping dependent record");
            return Ok(());
        }
        if !self.is_relevant(decl) || !self.register(decl) {
            return Ok(());
        }

        self.nesting.push((decl.id, self.names.decl_name(decl)));
        let span = debug_span!("record", name = %self.nesting_name());
        let _enter = span.enter();
        self.emit_record(decl, rec, true)
    }

    fn leave_record(&mut self, decl: &Decl) -> Result<()> {
        if matches!(self.nesting.last(), Some((id, _)) if *id == decl.id) {
            self.nesting.pop();
            self.w.writeln("");
        }
        Ok(())
    }

    fn enum_decl(&mut self, decl: &Decl) -> Result<()> {
        let DeclKind::Enum(decl_enum) = &decl.kind else {
            return Ok(());
        };
        if !self.is_relevant(decl) || !self.register(decl) {
            return Ok(());
        }
        self.emit_enum(decl, decl_enum);
        Ok(())
    }

    fn function_decl(&mut self, decl: &Decl) -> Result<()> {
        let Some(func) = decl.as_function() else {
            return Ok(());
        };
        if !self.is_relevant(decl) || !self.register(decl) {
            return Ok(());
        }
        let name = decl.name.as_deref().unwrap_or_default();
        if name.starts_with("operator") {
            debug!(name, loc = %decl.loc, "skipping free operator function");
            return Ok(());
        }

        let linkage = self.linkage(&decl.context);
        self.policy.begin_entry(&mut self.w, &decl.context, linkage);

        let mut sig = format!("{} {}", self.render(&func.return_type), sanitize(name));
        if let Some(params) = &func.template_params {
            let params = self.template_params(params);
            sig.push_str(&format!("({})", params));
        }
        let params = self.params(func);
        sig.push_str(&format!("({}){}", params, self.nogc_suffix()));

        let body = func.body.as_ref().filter(|_| func.has_inline_body());
        self.write_definition(&sig, func, body, &[], false, false);

        self.policy.finish_entry(&mut self.w, &decl.context);
        self.w.writeln("");
        Ok(())
    }

    fn typedef_decl(&mut self, decl: &Decl) -> Result<()> {
        let DeclKind::Typedef(td) = &decl.kind else {
            return Ok(());
        };
        if !self.is_relevant(decl) || !self.register(decl) {
            return Ok(());
        }
        self.emit_typedef(decl, &td.underlying, false)
    }

    fn global_var_decl(&mut self, decl: &Decl) -> Result<()> {
        let DeclKind::Variable(var) = &decl.kind else {
            return Ok(());
        };
        if !self.is_relevant(decl) || !self.register(decl) {
            return Ok(());
        }

        let mut line = String::new();
        // Linkage only changes the type of function (pointer) variables.
        let is_function = var.ty.is_function() || var.ty.pointee().is_some_and(Type::is_function);
        if is_function {
            line.push_str(&format!("extern({}) ", self.linkage(&decl.context).as_str()));
        }
        match var.storage {
            StorageClass::Extern => line.push_str("extern "),
            StorageClass::Static => line.push_str("__gshared static "),
            StorageClass::None => {}
        }
        let name = decl.name.as_deref().unwrap_or_default();
        line.push_str(&format!("{} {}", self.render(&var.ty), sanitize(name)));
        if let Some(init) = &var.init {
            let value = if var.ty.is_pointer() && init.is_null_pointer_constant() {
                "null".to_string()
            } else {
                self.printer()
                    .pointer_return(var.ty.is_pointer())
                    .print_expr(init)
            };
            line.push_str(&format!(" = {}", value));
        }
        line.push(';');
        self.w.writeln(&line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::drive;
    use dgen_ast::{BinaryOp, Enumerator, Expr, ParamDecl, VarDecl};

    fn emit(decls: Vec<Decl>) -> String {
        let unit = TranslationUnit::single("a.h", decls);
        let mut emitter = Emitter::new(&unit, EmitOptions::default().with_preamble(false));
        drive(&unit, &mut emitter).unwrap();
        emitter.finish()
    }

    #[test]
    fn test_file_banner() {
        let code = emit(Vec::new());
        assert_eq!(code, "\n// ------ a.h\n\n");
    }

    #[test]
    fn test_preamble_is_written_first() {
        let unit = TranslationUnit::new();
        let emitter = Emitter::new(&unit, EmitOptions::default());
        assert!(emitter.output().starts_with(MODULE_PREAMBLE));
    }

    #[test]
    fn test_named_enum() {
        let decl = Decl::enumeration(
            1,
            Some("Color"),
            EnumDecl::new(Type::uint(), &[("Red", 0), ("Green", 1), ("Blue", -2)]),
        );
        let code = emit(vec![decl]);
        assert!(code.contains(
            "alias Color = uint;\nenum : Color\n{\n    Red = 0,\n    Green = 1,\n    Blue = -2,\n}\n"
        ));
    }

    #[test]
    fn test_anonymous_single_member_enum() {
        let decl = Decl::enumeration(
            1,
            None,
            EnumDecl {
                integer_type: Type::int(),
                enumerators: vec![Enumerator {
                    name: "version".into(),
                    value: 3,
                }],
            },
        );
        let code = emit(vec![decl]);
        assert!(code.contains("enum : int\n{\n    version_ = 3\n}\n"));
        assert!(!code.contains("alias"));
    }

    #[test]
    fn test_free_function_declaration() {
        let func = FunctionDecl::new(Type::void())
            .with_param(ParamDecl::new("data", Type::char().constant().ptr()))
            .with_param(
                ParamDecl::new("hint", Type::void().ptr()).with_default(Expr::int(0)),
            );
        let decl = Decl::function(1, "log_message", func)
            .with_context(DeclContext::namespaced(&["util"]));
        let code = emit(vec![decl]);
        assert!(code.contains(
            "extern(C++, \"util\")\nvoid log_message(const(char)* data, void* hint = null);\n"
        ));
    }

    #[test]
    fn test_inline_free_function_has_body() {
        let x = Expr::decl_ref("x", Type::int());
        let func = FunctionDecl::new(Type::int())
            .with_param(ParamDecl::new("x", Type::int()))
            .with_body(Stmt::block(vec![Stmt::ret(Expr::binary(
                BinaryOp::Mul,
                x.clone(),
                x,
            ))]));
        let code = emit(vec![Decl::function(1, "square", func)]);
        assert!(code.contains("extern(C++)\nint square(int x)\n{\n    return x * x;\n}\n"));
    }

    #[test]
    fn test_nogc_and_c_linkage() {
        let unit = TranslationUnit::single(
            "a.h",
            vec![Decl::function(1, "tick", FunctionDecl::new(Type::void()))],
        );
        let options = EmitOptions {
            cpp_default: false,
            ..EmitOptions::default()
        }
        .with_preamble(false)
        .with_nogc(true);
        let mut emitter = Emitter::new(&unit, options);
        drive(&unit, &mut emitter).unwrap();
        assert!(emitter.finish().contains("extern(C)\nvoid tick() @nogc;\n"));
    }

    #[test]
    fn test_function_pointer_typedef() {
        let callback = Type::Function {
            ret: Box::new(Type::void()),
            params: vec![Type::int()],
            variadic: false,
        }
        .ptr();
        let code = emit(vec![Decl::typedef(1, "Callback", callback)]);
        assert!(code.contains("alias Callback = extern(C++) void function(int);\n"));
    }

    #[test]
    fn test_plain_typedef() {
        let size = Type::Builtin(dgen_ast::BuiltinKind::ULong);
        let code = emit(vec![Decl::typedef(1, "Size", size)]);
        assert!(code.contains("alias Size = cpp_ulong;\n"));
    }

    #[test]
    fn test_global_variables() {
        let mut counter = VarDecl::new(Type::int());
        counter.storage = StorageClass::Extern;
        let mut limit = VarDecl::new(Type::int());
        limit.storage = StorageClass::Static;
        limit.init = Some(Expr::int(8));
        let mut head = VarDecl::new(Type::int().ptr());
        head.init = Some(Expr::int(0));
        let handler = Type::Function {
            ret: Box::new(Type::void()),
            params: vec![Type::int()],
            variadic: false,
        }
        .ptr();
        let mut on_signal = VarDecl::new(handler);
        on_signal.storage = StorageClass::Extern;

        let code = emit(vec![
            Decl::variable(1, "counter", counter),
            Decl::variable(2, "limit", limit),
            Decl::variable(3, "head", head),
            Decl::variable(4, "on_signal", on_signal),
        ]);
        assert!(code.contains("\nextern int counter;\n"));
        assert!(!code.contains("extern(C++) extern int counter"));
        assert!(code.contains("extern(C++) extern void function(int) on_signal;\n"));
        assert!(code.contains("__gshared static int limit = 8;\n"));
        assert!(code.contains("int* head = null;\n"));
    }

    #[test]
    fn test_registry_skips_second_emission() {
        let decl = Decl::enumeration(1, Some("Mode"), EnumDecl::new(Type::int(), &[("A", 0)]));
        let unit = TranslationUnit::single("a.h", vec![decl.clone()]);
        let mut emitter = Emitter::new(&unit, EmitOptions::default().with_preamble(false));
        emitter.enum_decl(&decl).unwrap();
        let first = emitter.output().len();
        emitter.enum_decl(&decl).unwrap();
        assert_eq!(emitter.output().len(), first);
    }
}
