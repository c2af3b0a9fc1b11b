//! Pretty-printer for expressions and statements of inline bodies,
//! initializers and default arguments.
//!
//! The output only has to be compilable D, not an equivalent program, so a
//! handful of C++ idioms are rewritten on the way:
//!
//! - decayed arrays get `.ptr`, except string literals and subscripts
//! - null pointer constants print as `null`
//! - `(void)((!!(c)) || __assert(msg, file, line), 0)` becomes `assert(c, msg)`
//! - temporaries bound to reference parameters go through `.byRef`, which
//!   raises a [`FeedbackRequest::RvalueRef`] for the argument's record

use crate::feedback::{FeedbackQueue, FeedbackRequest};
use crate::ident::sanitize;
use crate::operators::operator_member_name;
use crate::types::TypeTranslator;
use dgen_ast::{
    BinaryOp, BuiltinKind, CastKind, CharKind, CtorInitializer, Expr, InitStyle, LocalVar, NewInitStyle,
    OverloadedOperator, Stmt, TemplateArg, TraitArg, TraitKind, Type, UnaryOp,
};

/// D suffix for an integer literal of the given type.
pub fn integer_suffix(kind: BuiltinKind) -> &'static str {
    match kind {
        BuiltinKind::UInt => "U",
        BuiltinKind::Long | BuiltinKind::LongLong => "L",
        BuiltinKind::ULong | BuiltinKind::ULongLong => "UL",
        _ => "",
    }
}

pub fn format_float(value: f64, kind: BuiltinKind) -> String {
    let ty = match kind {
        BuiltinKind::Float => "float",
        BuiltinKind::LongDouble => "real",
        _ => "double",
    };
    if value.is_nan() {
        return format!("{}.nan", ty);
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{}{}.infinity", sign, ty);
    }
    let mut s = value.to_string();
    if !s.contains(['.', 'e', 'E']) {
        s.push_str(".0");
    }
    if kind == BuiltinKind::Float {
        s.push('f');
    }
    s
}

/// Character literal with C escapes; values that are not printable ASCII
/// use `\x`, `\u` or `\U` depending on magnitude. Wide and UTF-16
/// literals take a `w` suffix, UTF-32 ones a `d`.
pub fn format_char(value: u32, kind: CharKind) -> String {
    let mut value = value;
    // Sign-extended plain chars.
    if kind == CharKind::Ascii && (value & !0xFF) == !0xFF {
        value &= 0xFF;
    }
    let body = match value {
        0x5C => "\\\\".to_string(),
        0x27 => "\\'".to_string(),
        0x07 => "\\a".to_string(),
        0x08 => "\\b".to_string(),
        0x0C => "\\f".to_string(),
        0x0A => "\\n".to_string(),
        0x0D => "\\r".to_string(),
        0x09 => "\\t".to_string(),
        0x0B => "\\v".to_string(),
        0x20..=0x7E => char::from(value as u8).to_string(),
        0..=0xFF => format!("\\x{:02x}", value),
        0x100..=0xFFFF => format!("\\u{:04x}", value),
        _ => format!("\\U{:08x}", value),
    };
    let suffix = match kind {
        CharKind::Ascii | CharKind::Utf8 => "",
        CharKind::Wide | CharKind::Utf16 => "w",
        CharKind::Utf32 => "d",
    };
    format!("'{}'{}", body, suffix)
}

pub fn format_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 || c as u32 == 0x7F => {
                out.push_str(&format!("\\x{:02x}", c as u32))
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Renders expression and statement trees to D text.
///
/// Statement output is indented four spaces per nesting level relative to
/// its first line; callers place the text in the surrounding code.
pub struct Printer<'a> {
    types: TypeTranslator<'a>,
    feedback: &'a mut FeedbackQueue,
    polymorphic: bool,
    pointer_return: bool,
    ctor_initializer: bool,
    indent: usize,
    out: String,
}

impl<'a> Printer<'a> {
    pub fn new(types: TypeTranslator<'a>, feedback: &'a mut FeedbackQueue) -> Self {
        Self {
            types,
            feedback,
            polymorphic: false,
            pointer_return: false,
            ctor_initializer: false,
            indent: 0,
            out: String::new(),
        }
    }

    /// Members of `this` keep an explicit receiver in polymorphic records.
    pub fn polymorphic(mut self, polymorphic: bool) -> Self {
        self.polymorphic = polymorphic;
        self
    }

    /// Print every null pointer constant as `null`.
    pub fn pointer_return(mut self, pointer_return: bool) -> Self {
        self.pointer_return = pointer_return;
        self
    }

    pub fn print_expr(&mut self, expr: &Expr) -> String {
        self.out.clear();
        self.expr(expr);
        std::mem::take(&mut self.out)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        self.out.clear();
        self.indent = 0;
        self.stmt(stmt);
        std::mem::take(&mut self.out)
    }

    /// `member = init;` for a written member initializer. Base initializers
    /// and in-class defaults have no D counterpart here.
    pub fn print_ctor_initializer(&mut self, init: &CtorInitializer) -> Option<String> {
        if !init.written || init.in_class_default {
            return None;
        }
        let member = init.member.as_ref()?;
        self.out.clear();
        self.ctor_initializer = true;
        self.out.push_str(&sanitize(member));
        self.out.push_str(" = ");
        self.expr(&init.init);
        self.out.push(';');
        self.ctor_initializer = false;
        Some(std::mem::take(&mut self.out))
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn ty(&self, ty: &Type) -> String {
        self.types.render(ty)
    }

    fn template_args(&mut self, args: &[TemplateArg]) {
        if args.is_empty() {
            return;
        }
        let rendered: Vec<String> = args.iter().map(|a| self.types.render_arg(a)).collect();
        self.push("!(");
        self.push(&rendered.join(", "));
        self.push(")");
    }

    fn args_until_default(&mut self, args: &[Expr]) {
        for (i, arg) in args.iter().enumerate() {
            if matches!(arg, Expr::DefaultArg) {
                break;
            }
            if i > 0 {
                self.push(", ");
            }
            self.expr(arg);
        }
    }

    fn call_args(&mut self, args: &[Expr], params: Option<&[Type]>) {
        for (i, arg) in args.iter().enumerate() {
            if matches!(arg, Expr::DefaultArg) {
                break;
            }
            if i > 0 {
                self.push(", ");
            }
            self.expr(arg);

            let binds_ref = params
                .and_then(|p| p.get(i))
                .is_some_and(|p| p.is_reference());
            if binds_ref && matches!(arg, Expr::MaterializeTemporary { .. }) {
                self.push(".byRef");
                if let Some(r) = arg.ty().and_then(|t| t.as_record()) {
                    self.feedback.push(FeedbackRequest::RvalueRef {
                        record: r.id,
                        name: self.types.names().ref_name(r),
                    });
                }
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::IntegerLiteral { value, ty } => {
                self.push(&value.to_string());
                self.push(integer_suffix(*ty));
            }
            Expr::FloatLiteral { value, ty } => self.push(&format_float(*value, *ty)),
            Expr::CharLiteral { value, kind } => {
                self.push(&format_char(*value, *kind));
            }
            Expr::StringLiteral { value, .. } => self.push(&format_string(value)),
            Expr::BoolLiteral(b) => self.push(if *b { "true" } else { "false" }),
            Expr::NullPtr => self.push("null"),
            Expr::This { implicit } => {
                if !implicit {
                    self.push("this");
                }
            }
            Expr::DeclRef {
                name,
                qualifier,
                template_args,
                ..
            } => {
                if let Some(q) = qualifier {
                    let q = self.ty(q);
                    self.push(&q);
                    self.push(".");
                }
                self.push(&sanitize(name));
                self.template_args(template_args);
            }
            Expr::Member {
                base,
                member,
                qualifier,
                operator,
                anonymous,
                template_args,
                ..
            } => {
                let implicit_this = matches!(base.ignore_implicit(), Expr::This { implicit: true });
                if implicit_this {
                    if self.polymorphic {
                        self.push("this.");
                    }
                } else {
                    self.expr(base);
                    let parent_anonymous =
                        matches!(base.ignore_implicit(), Expr::Member { anonymous: true, .. });
                    if !parent_anonymous {
                        self.push(".");
                    }
                    if let Some(q) = qualifier {
                        let q = self.ty(q);
                        self.push(&q);
                        self.push(".");
                    }
                }
                if *anonymous {
                    return;
                }
                match operator {
                    Some(op) => self.push(&operator_member_name(op.op, op.params)),
                    None => self.push(&sanitize(member)),
                }
                self.template_args(template_args);
            }
            Expr::Call {
                callee,
                args,
                callee_params,
            } => {
                self.expr(callee);
                // `destroy(x)` already carries its parentheses.
                if matches!(callee.ignore_parens_implicit(), Expr::PseudoDestructor { .. }) {
                    return;
                }
                self.push("(");
                self.call_args(args, callee_params.as_deref());
                self.push(")");
            }
            Expr::MemberCall {
                callee,
                args,
                callee_params,
                conversion,
            } => {
                if *conversion {
                    // Only the converted object is printed.
                    match callee.ignore_parens_implicit() {
                        Expr::Member { base, .. } => self.expr(base),
                        other => self.expr(other),
                    }
                    return;
                }
                self.expr(callee);
                self.push("(");
                self.call_args(args, callee_params.as_deref());
                self.push(")");
            }
            Expr::OperatorCall { op, args } => self.operator_call(*op, args),
            Expr::Unary { op, operand } => {
                if !op.is_postfix() {
                    if !matches!(operand.as_ref(), Expr::This { .. }) {
                        self.push(op.spelling());
                    }
                    if matches!(op, UnaryOp::Plus | UnaryOp::Minus)
                        && matches!(operand.as_ref(), Expr::Unary { .. })
                    {
                        self.push(" ");
                    }
                }
                self.expr(operand);
                if op.is_postfix() {
                    self.push(op.spelling());
                }
            }
            Expr::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.expr(cond);
                self.push(" ? ");
                self.expr(then);
                self.push(" : ");
                self.expr(otherwise);
            }
            Expr::Paren(inner) => {
                self.push("(");
                self.expr(inner);
                self.push(")");
            }
            Expr::ImplicitCast { kind, expr: inner, .. } => {
                if self.pointer_return && expr.is_null_pointer_constant() {
                    self.push("null");
                    return;
                }
                match kind {
                    CastKind::ArrayToPointerDecay => {
                        self.expr(inner);
                        if !matches!(inner.ignore_implicit(), Expr::StringLiteral { .. }) {
                            self.push(".ptr");
                        }
                    }
                    CastKind::NullToPointer => self.push("null"),
                    _ => self.expr(inner),
                }
            }
            Expr::CStyleCast { ty, expr: inner } => {
                if ty.is_void() && self.try_assert(inner) {
                    return;
                }
                let t = self.ty(ty);
                self.push(&format!("cast({})", t));
                self.expr(inner);
            }
            Expr::NamedCast { ty, expr: inner, .. } => {
                let target = match ty.desugar() {
                    Type::Reference { inner, .. } => inner.as_ref(),
                    _ => ty,
                };
                let t = self.ty(target);
                self.push(&format!("cast({})(", t));
                self.expr(inner);
                self.push(")");
            }
            Expr::FunctionalCast {
                ty,
                expr: inner,
                parens,
            } => {
                let t = self.ty(ty);
                self.push(&t);
                if *parens {
                    self.push("(");
                }
                self.expr(inner);
                if *parens {
                    self.push(")");
                }
            }
            Expr::Construct {
                ty,
                args,
                list_init,
                std_init_list,
            } => {
                let mut prepend = self.ctor_initializer
                    || *list_init
                    || args.iter().any(Expr::contains_temporary_object);
                if args.len() == 1 {
                    prepend = false;
                }
                if prepend {
                    let t = self.ty(ty);
                    self.push(&t);
                }
                let parens = prepend || (*list_init && !*std_init_list);
                if parens {
                    self.push("(");
                }
                self.args_until_default(args);
                if parens {
                    self.push(")");
                }
            }
            Expr::TemporaryObject { ty, args } | Expr::UnresolvedConstruct { ty, args } => {
                let t = self.ty(ty);
                self.push(&t);
                self.push("(");
                self.args_until_default(args);
                self.push(")");
            }
            Expr::MaterializeTemporary { expr: inner, .. } => self.expr(inner),
            Expr::DefaultArg => {}
            Expr::New {
                ty,
                placement,
                init,
                init_style,
            } => {
                let emplace = placement
                    .first()
                    .is_some_and(|p| !matches!(p, Expr::DefaultArg));
                if emplace {
                    self.push("emplace(");
                    self.args_until_default(placement);
                    self.push(", ");
                } else {
                    self.push("new ");
                }
                let t = self.ty(ty);
                self.push(&t);
                if let Some(init) = init {
                    let call = *init_style == NewInitStyle::Call;
                    if call {
                        self.push("(");
                    }
                    self.expr(init);
                    if call {
                        self.push(")");
                    }
                }
                if emplace {
                    self.push(")");
                }
            }
            Expr::Delete { expr: inner, .. } | Expr::PseudoDestructor { base: inner } => {
                self.push("destroy(");
                self.expr(inner);
                self.push(")");
            }
            Expr::TypeTrait { kind, arg } => {
                match arg {
                    TraitArg::Type(ty) => {
                        let t = self.ty(ty);
                        self.push(&format!("({})", t));
                    }
                    TraitArg::Expr(e) if e.mentions_explicit_this() => self.push("typeof(this)"),
                    TraitArg::Expr(e) => self.expr(e),
                }
                self.push(match kind {
                    TraitKind::SizeOf => ".sizeof",
                    TraitKind::AlignOf => ".alignof",
                });
            }
            Expr::ArraySubscript { base, index } => {
                // `arr[0]`, never `arr.ptr[0]`.
                match base.as_ref() {
                    Expr::ImplicitCast {
                        kind: CastKind::ArrayToPointerDecay,
                        expr: array,
                        ..
                    } => self.expr(array.ignore_implicit()),
                    _ => self.expr(base),
                }
                self.push("[");
                self.expr(index);
                self.push("]");
            }
            Expr::InitList { ty, exprs } => {
                if ty.is_array() {
                    self.push("[");
                    self.args_until_default(exprs);
                    self.push("]");
                } else {
                    let t = self.ty(ty);
                    self.push(&t);
                    self.push("(");
                    self.args_until_default(exprs);
                    self.push(")");
                }
            }
            Expr::DependentMember {
                base,
                member,
                template_args,
            } => {
                if let Some(base) = base {
                    self.expr(base);
                    self.push(".");
                }
                self.push(member);
                self.template_args(template_args);
            }
            Expr::Unknown(spelling) => self.push(spelling),
        }
    }

    fn operator_call(&mut self, op: OverloadedOperator, args: &[Expr]) {
        use OverloadedOperator::*;
        let sym = op.spelling();
        match (op, args) {
            (PlusPlus | MinusMinus, [operand]) => {
                self.push(sym);
                self.push(" ");
                self.expr(operand);
            }
            (PlusPlus | MinusMinus, [operand, ..]) => {
                self.expr(operand);
                self.push(" ");
                self.push(sym);
            }
            (Arrow, [object, ..]) => self.expr(object),
            (Call, [callee, rest @ ..]) => {
                self.expr(callee);
                self.push("(");
                self.args_until_default(rest);
                self.push(")");
            }
            (Subscript, [base, index]) => {
                self.expr(base);
                self.push("[");
                self.expr(index);
                self.push("]");
            }
            (_, [operand]) => {
                self.push(sym);
                self.push(" ");
                self.expr(operand);
            }
            (_, [lhs, rhs]) => {
                self.expr(lhs);
                self.push(&format!(" {} ", sym));
                self.expr(rhs);
            }
            _ => {
                tracing::debug!(operator = sym, args = args.len(), "unexpected operator arity");
                self.args_until_default(args);
            }
        }
    }

    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) {
        let lhs_ptr = match lhs {
            Expr::Member { ty, .. } | Expr::DeclRef { ty, .. } => ty.is_pointer(),
            _ => false,
        };
        self.expr(lhs);
        self.push(&format!(" {} ", op.spelling()));

        match rhs.ignore_implicit() {
            Expr::IntegerLiteral { value, .. } if lhs_ptr => {
                if *value == 0 {
                    self.push("null");
                } else {
                    let t = lhs.ty().map(|t| self.ty(t)).unwrap_or_default();
                    self.push(&format!("cast({}) ", t));
                    self.expr(rhs);
                }
            }
            _ => self.expr(rhs),
        }
    }

    /// Recognize `(void)((cond) || __assert(msg, file, line), 0)`.
    fn try_assert(&mut self, inner: &Expr) -> bool {
        let Expr::Paren(outer) = inner else {
            return false;
        };
        let Expr::Binary {
            op: logic,
            lhs: cond,
            rhs,
        } = outer.as_ref()
        else {
            return false;
        };
        if !logic.is_logical() {
            return false;
        }
        let Expr::Binary {
            op: BinaryOp::Comma,
            lhs: call,
            ..
        } = rhs.ignore_parens_implicit()
        else {
            return false;
        };
        let Expr::Call { callee, args, .. } = call.as_ref() else {
            return false;
        };
        let is_assert = matches!(
            callee.ignore_implicit(),
            Expr::DeclRef { name, .. } if name.contains("assert")
        );
        if !is_assert || args.len() != 3 {
            return false;
        }

        let cond = match cond.as_ref() {
            Expr::Paren(c) => c.as_ref(),
            c => c,
        };
        self.push("assert(");
        self.expr(cond);
        self.push(", ");
        self.expr(&args[0]);
        self.push(")");
        true
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn local_var(&mut self, var: &LocalVar) {
        if var.is_static {
            self.push("__gshared static ");
        }
        let t = self.ty(&var.ty);
        let name = sanitize(&var.name);

        // D has no reference locals; a ref-returning helper stands in.
        if var.ty.is_reference() {
            if let Some(init) = &var.init {
                self.push(&format!("{} {}() {{ return ", t, name));
                self.expr(init);
                self.push("; }");
                return;
            }
        }

        self.push(&format!("{} {}", t, name));
        let Some(init) = &var.init else {
            return;
        };
        let implicit = var.init_style == InitStyle::Call
            && matches!(
                init.ignore_implicit(),
                Expr::Construct { list_init: false, args, .. }
                    if args.first().map_or(true, |a| matches!(a, Expr::DefaultArg))
            );
        if implicit {
            return;
        }
        match var.init_style {
            InitStyle::Call => {
                self.push(&format!(" = {}(", t));
                self.expr(init);
                self.push(")");
            }
            InitStyle::C | InitStyle::List => {
                self.push(" = ");
                self.expr(init);
            }
        }
    }

    fn decl_list(&mut self, vars: &[LocalVar]) {
        for (i, var) in vars.iter().enumerate() {
            if i > 0 {
                self.push("; ");
            }
            self.local_var(var);
        }
    }

    /// Body of a control statement: braces stay on the same line, anything
    /// else goes one level deeper on the next line.
    fn sub_stmt(&mut self, body: &Stmt) {
        if matches!(body, Stmt::Compound(_)) {
            self.push(" ");
            self.stmt(body);
        } else {
            self.indent += 1;
            self.newline();
            self.stmt(body);
            self.indent -= 1;
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Compound(body) => {
                self.push("{");
                self.indent += 1;
                for s in body {
                    self.newline();
                    self.stmt(s);
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
            Stmt::Expr(e) => {
                self.expr(e);
                self.push(";");
            }
            Stmt::Decl(vars) => {
                self.decl_list(vars);
                self.push(";");
            }
            Stmt::Return(value) => {
                self.push("return");
                if let Some(v) = value {
                    self.push(" ");
                    self.expr(v);
                }
                self.push(";");
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                self.push("if (");
                self.expr(cond);
                self.push(")");
                self.sub_stmt(then);
                if let Some(otherwise) = otherwise {
                    if matches!(then.as_ref(), Stmt::Compound(_)) {
                        self.push(" else");
                    } else {
                        self.newline();
                        self.push("else");
                    }
                    if matches!(otherwise.as_ref(), Stmt::If { .. }) {
                        self.push(" ");
                        self.stmt(otherwise);
                    } else {
                        self.sub_stmt(otherwise);
                    }
                }
            }
            Stmt::While { cond, body } => {
                self.push("while (");
                self.expr(cond);
                self.push(")");
                self.sub_stmt(body);
            }
            Stmt::Do { body, cond } => {
                self.push("do");
                self.sub_stmt(body);
                if matches!(body.as_ref(), Stmt::Compound(_)) {
                    self.push(" ");
                } else {
                    self.newline();
                }
                self.push("while (");
                self.expr(cond);
                self.push(");");
            }
            Stmt::For {
                init,
                cond,
                inc,
                body,
            } => {
                self.push("for (");
                match init.as_deref() {
                    Some(Stmt::Decl(vars)) => self.decl_list(vars),
                    Some(Stmt::Expr(e)) => self.expr(e),
                    Some(other) => self.stmt(other),
                    None => {}
                }
                self.push(";");
                if let Some(cond) = cond {
                    self.push(" ");
                    self.expr(cond);
                }
                self.push(";");
                if let Some(inc) = inc {
                    self.push(" ");
                    self.expr(inc);
                }
                self.push(")");
                self.sub_stmt(body);
            }
            Stmt::Switch { cond, body } => {
                self.push("switch (");
                self.expr(cond);
                self.push(")");
                self.sub_stmt(body);
            }
            Stmt::Case { value, body } => {
                self.push("case ");
                self.expr(value);
                self.push(":");
                self.sub_stmt(body);
            }
            Stmt::Default(body) => {
                self.push("default:");
                self.sub_stmt(body);
            }
            Stmt::Label { name, body } => {
                self.push(name);
                self.push(":");
                self.newline();
                self.stmt(body);
            }
            Stmt::Goto(label) => self.push(&format!("goto {};", label)),
            Stmt::Break => self.push("break;"),
            Stmt::Continue => self.push("continue;"),
            Stmt::Null => self.push("{}"),
        }
    }
}
