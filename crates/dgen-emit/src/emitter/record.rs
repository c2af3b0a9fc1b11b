//! Records and their members.

use super::{ClosedRecord, Emitter};
use crate::bitfield::BitfieldPacker;
use crate::error::Result;
use crate::ident::sanitize;
use crate::operators::{classify, MethodClass};
use crate::types::{int_type_for_size, TypeTranslator};
use dgen_ast::{
    Access, CtorKind, Decl, DeclId, DeclKind, FunctionDecl, MethodInfo, MethodRole, RecordDecl,
    RecordTag, RecordTemplate, TemplateArg, VarDecl,
};
use dgen_config::ManglingScheme;
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

/// D aggregate keyword of an emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    Struct,
    Class,
    Union,
}

impl RecordShape {
    /// Records without virtual methods in their hierarchy are value types;
    /// polymorphic ones keep the union shape or become classes.
    pub fn choose(tag: RecordTag, polymorphic: bool) -> Self {
        match (tag, polymorphic) {
            (_, false) => RecordShape::Struct,
            (RecordTag::Union, true) => RecordShape::Union,
            (_, true) => RecordShape::Class,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            RecordShape::Struct => "struct",
            RecordShape::Class => "class",
            RecordShape::Union => "union",
        }
    }
}

/// Access keyword of a member. Unspecified access follows the C++ default
/// of the record's tag.
fn access_keyword(access: Access, tag: RecordTag) -> &'static str {
    match access {
        Access::Public => "public",
        Access::Protected => "protected",
        Access::Private => "private",
        Access::None if tag == RecordTag::Class => "private",
        Access::None => "public",
    }
}

fn is_virtual(method: &Decl) -> bool {
    method
        .as_function()
        .and_then(|f| f.method.as_ref())
        .is_some_and(|m| m.is_virtual || m.is_pure)
}

impl<'u> Emitter<'u> {
    /// Whether `rec` or any of its bases declares a virtual method.
    pub(super) fn has_virtual_methods(&self, rec: &RecordDecl) -> bool {
        let mut seen = FxHashSet::default();
        self.hierarchy_has_virtual(rec, &mut seen)
    }

    fn hierarchy_has_virtual(&self, rec: &RecordDecl, seen: &mut FxHashSet<DeclId>) -> bool {
        if rec.methods.iter().any(is_virtual) {
            return true;
        }
        for base in &rec.bases {
            let Some(r) = base.ty.as_record() else {
                continue;
            };
            if !seen.insert(r.id) {
                continue;
            }
            if let Some((_, base_rec)) = self.index.record(r.id) {
                if self.hierarchy_has_virtual(base_rec, seen) {
                    return true;
                }
            }
        }
        false
    }

    /// Split bases into those written in the header and those flattened
    /// into `_bN` members. A struct-shape record cannot inherit, so a base
    /// the unit does not define is flattened unless the record is a class.
    fn split_bases(&self, rec: &RecordDecl, polymorphic: bool) -> (Vec<String>, Vec<String>) {
        let mut inherited = Vec::new();
        let mut flattened = Vec::new();
        for base in &rec.bases {
            let ty = self.render(&base.ty);
            let base_polymorphic = match base.ty.as_record() {
                Some(r) => match self.index.record(r.id) {
                    Some((_, base_rec)) => self.has_virtual_methods(base_rec),
                    None => polymorphic,
                },
                None => true,
            };
            if base_polymorphic {
                inherited.push(ty);
            } else {
                flattened.push(ty);
            }
        }
        (inherited, flattened)
    }

    fn specialization_args(&self, args: &[TemplateArg]) -> String {
        let types = TypeTranslator::new(&self.names);
        let args: Vec<String> = args
            .iter()
            .map(|arg| match arg {
                TemplateArg::Integral {
                    value,
                    bits,
                    signed,
                } => format!("{} T: {}", int_type_for_size(*bits, *signed), value),
                other => types.render_arg(other),
            })
            .collect();
        args.join(", ")
    }

    /// Emit a record whose registry and filter checks already passed.
    /// Top-level records are wrapped by the namespace policy; nested ones
    /// inherit the linkage of their parent.
    pub(super) fn emit_record(
        &mut self,
        decl: &Decl,
        rec: &RecordDecl,
        top_level: bool,
    ) -> Result<()> {
        let name = self.names.decl_name(decl);
        if top_level {
            let linkage = self.linkage(&decl.context);
            self.policy.begin_entry(&mut self.w, &decl.context, linkage);
        }

        if !rec.complete {
            trace!(record = %name, "forward declaration");
            self.w.writeln(&format!("struct {};", name));
            if top_level {
                self.policy.finish_entry(&mut self.w, &decl.context);
            }
            return Ok(());
        }

        let polymorphic = self.has_virtual_methods(rec);
        let shape = RecordShape::choose(rec.tag, polymorphic);

        match rec.layout {
            Some(layout) if layout.size > 0 && !rec.is_templated() => {
                let mut attr = format!("@cppclasssize({})", layout.size);
                if layout.align > 0 {
                    attr.push_str(&format!(" align({})", layout.align));
                }
                self.w.writeln(&attr);
            }
            _ => trace!(record = %name, "no size annotation"),
        }

        let mut header = format!("{} {}", shape.keyword(), name);
        match &rec.template {
            Some(RecordTemplate::Described { params }) => {
                let params = self.template_params(params);
                header.push_str(&format!("({})", params));
            }
            Some(RecordTemplate::Specialization { args }) => {
                header.push_str(&format!("({})", self.specialization_args(args)));
            }
            None => {}
        }
        let (inherited, flattened) = self.split_bases(rec, polymorphic);
        if !inherited.is_empty() {
            header.push_str(&format!(" : {}", inherited.join(", ")));
        }
        self.w.writeln(&header);
        self.w.writeln("{");
        self.w.indent();

        for (i, base) in flattened.iter().enumerate() {
            self.w.writeln(&format!("{} _b{};", base, i));
            self.w.writeln(&format!("alias _b{} this;", i));
        }

        self.emit_members(decl, rec, polymorphic)?;
        self.emit_fields(decl, rec, &name)?;
        for method in &rec.methods {
            self.emit_method(decl, rec, polymorphic, method)?;
        }

        // Requests raised by this record's own bodies can go in directly.
        let pending = self.feedback.take_for(decl.id);
        if !pending.is_empty() {
            if shape == RecordShape::Struct {
                if self.with_mixin.insert(decl.id) {
                    self.w.writeln("mixin RvalueRef;");
                }
            } else {
                debug!(
                    record = %name,
                    shape = shape.keyword(),
                    "RvalueRef mixin needs a struct, dropping"
                );
            }
        }

        let indent = self.w.indent_level();
        self.w.dedent();
        self.closed.insert(
            decl.id,
            ClosedRecord {
                offset: self.w.offset(),
                indent,
                struct_shape: shape == RecordShape::Struct,
            },
        );
        self.w.writeln("}");

        if top_level {
            self.policy.finish_entry(&mut self.w, &decl.context);
        }
        Ok(())
    }

    /// Nested enums, records, typedefs, static data members and member
    /// function templates.
    fn emit_members(&mut self, record: &Decl, rec: &RecordDecl, polymorphic: bool) -> Result<()> {
        for member in &rec.members {
            match &member.kind {
                DeclKind::Enum(decl_enum) => {
                    if self.register(member) {
                        self.emit_enum(member, decl_enum);
                    }
                }
                DeclKind::Record(_) => self.emit_record_once(member, true)?,
                DeclKind::Typedef(td) => {
                    if self.register(member) {
                        self.emit_typedef(member, &td.underlying, true)?;
                    }
                }
                DeclKind::Variable(var) => self.emit_static_member(member, var, rec.tag),
                DeclKind::Function(_) => self.emit_method(record, rec, polymorphic, member)?,
                DeclKind::Namespace(_) | DeclKind::Macro(_) => {
                    trace!(decl = %member.id, "ignoring record member");
                }
            }
        }
        Ok(())
    }

    fn emit_static_member(&mut self, decl: &Decl, var: &VarDecl, tag: RecordTag) {
        let name = decl.name.as_deref().unwrap_or_default();
        let line = format!(
            "static {} {} {};",
            access_keyword(decl.access, tag),
            self.render(&var.ty),
            sanitize(name)
        );
        self.w.writeln(&line);
    }

    fn close_bitfields(&mut self, packer: &mut BitfieldPacker) {
        if let Some(lines) = packer.close() {
            for line in &lines {
                self.w.writeln(line);
            }
        }
    }

    fn emit_fields(&mut self, decl: &Decl, rec: &RecordDecl, record_name: &str) -> Result<()> {
        let mut packer = BitfieldPacker::new(record_name);
        for (i, field) in rec.fields.iter().enumerate() {
            let ty = self.render(&field.ty);
            let given = field.name.as_deref().filter(|n| !n.is_empty());

            if let Some(width) = field.bit_width {
                packer.push(ty, given.map(sanitize).unwrap_or_default(), width)?;
                continue;
            }
            self.close_bitfields(&mut packer);

            let name = match given {
                Some(name) => sanitize(name),
                None => self
                    .names
                    .field_name(decl.id, i)
                    .map_or_else(|| format!("_field{}", i), |n| n.to_string()),
            };
            let bytes = field.size_bits.map_or(0, |bits| bits / 8);
            let mut line = format!(
                "@cppsize({}) {} {} {}",
                bytes,
                access_keyword(field.access, rec.tag),
                ty,
                name
            );
            if let Some(init) = &field.in_class_init {
                let value = self.printer().print_expr(init);
                line.push_str(&format!(" = {}", value));
            }
            line.push(';');
            self.w.writeln(&line);
        }
        self.close_bitfields(&mut packer);
        Ok(())
    }

    /// Pin a directly bound operator to its C++ symbol.
    fn write_binding(
        &mut self,
        record: &Decl,
        method: &Decl,
        func: &FunctionDecl,
        class: &MethodClass,
        comment_out: bool,
    ) {
        let method_name = method.name.as_deref().unwrap_or_default();
        let line = match self.options.mangling {
            ManglingScheme::Microsoft => {
                let record_name = self.names.decl_name(record);
                format!(
                    "@pyExtract(\"{rec}::{method}\") pragma(mangle, nsgen.{rec}_{name}.mangleof)",
                    rec = record_name,
                    method = method_name,
                    name = class.name
                )
            }
            ManglingScheme::Itanium => match &func.mangled_name {
                Some(symbol) => format!("pragma(mangle, \"{}\")", symbol),
                None => {
                    warn!(
                        method = method_name,
                        loc = %method.loc,
                        "no mangled name for bound operator, emitting a plain method"
                    );
                    return;
                }
            },
        };
        if comment_out {
            self.w.writeln(&format!("// {}", line));
        } else {
            self.w.writeln(&line);
        }
    }

    fn emit_method(
        &mut self,
        record: &Decl,
        rec: &RecordDecl,
        polymorphic: bool,
        method: &Decl,
    ) -> Result<()> {
        let Some(func) = method.as_function() else {
            return Ok(());
        };
        let default_info = MethodInfo::default();
        let info = func.method.as_ref().unwrap_or(&default_info);
        let name = method.name.as_deref().unwrap_or_default();

        if info.is_defaulted && !info.is_explicitly_defaulted {
            trace!(method = name, "skipping implicit special member");
            return Ok(());
        }
        let Some(class) = classify(name, func, record.id, &TypeTranslator::new(&self.names)) else {
            debug!(method = name, "identity assignment is built into D, skipping");
            return Ok(());
        };

        let is_ctor = info.is_ctor();
        let is_dtor = info.is_dtor();
        let ctor_kind = info.ctor_kind();
        let possible_override =
            !is_ctor && !is_dtor && info.overridden_count > 0 && func.body.is_some();
        // D structs have no default ctor, and copies and moves are blits.
        let special_ctor = matches!(
            ctor_kind,
            Some(CtorKind::Default | CtorKind::Copy | CtorKind::Move)
        );
        let comment_out = !polymorphic && (special_ctor || possible_override);

        if class.direct_binding {
            self.write_binding(record, method, func, &class, comment_out);
        }
        match ctor_kind {
            Some(CtorKind::Move) => self.w.writeln("// move ctor"),
            Some(CtorKind::Copy) => self.w.writeln("// copy ctor"),
            _ => {}
        }

        let mut sig = String::new();
        if info.is_defaulted {
            sig.push_str("// (default) ");
        } else if comment_out {
            sig.push_str("// ");
        }
        if func.has_inline_body() {
            sig.push_str("/* inline */ ");
        }
        sig.push_str(access_keyword(method.access, rec.tag));
        sig.push(' ');
        if info.has_override_attr || possible_override {
            sig.push_str("override ");
        }
        if info.is_static {
            sig.push_str("static ");
        }
        if !info.is_virtual && !info.is_pure && !info.is_static && !is_ctor && !is_dtor {
            sig.push_str("final ");
        }
        if info.is_pure {
            sig.push_str("abstract ");
        }
        if ctor_kind == Some(CtorKind::Move) && method.access == Access::Private {
            sig.push_str("@disable ");
        }
        if !is_ctor && !is_dtor {
            sig.push_str(&self.render(&func.return_type));
            sig.push(' ');
        }
        sig.push_str(&class.name);

        let mut compile_time = Vec::new();
        if let Some(arg) = &class.template_arg {
            compile_time.push(arg.clone());
        }
        if let Some(params) = &func.template_params {
            compile_time.push(self.template_params(params));
        }
        if !compile_time.is_empty() {
            sig.push_str(&format!("({})", compile_time.join(", ")));
        }
        let params = self.params(func);
        sig.push_str(&format!("({})", params));
        if info.is_const {
            sig.push_str(" const");
        }
        sig.push_str(self.nogc_suffix());

        let body = func
            .body
            .as_ref()
            .filter(|_| func.has_inline_body() && !is_dtor);
        let templated = rec.is_templated() || func.is_templated();
        let mut initializers = Vec::new();
        if let (Some(_), MethodRole::Constructor { initializers: inits, .. }) = (body, &info.role) {
            if !templated {
                for init in inits {
                    let line = self
                        .printer()
                        .polymorphic(polymorphic)
                        .print_ctor_initializer(init);
                    initializers.extend(line);
                }
            }
        }

        self.write_definition(&sig, func, body, &initializers, polymorphic, comment_out);
        Ok(())
    }
}
