//! Declarations.

use crate::expr::Expr;
use crate::loc::SourceLoc;
use crate::stmt::{InitStyle, Stmt};
use crate::types::{TemplateArg, Type};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Declaration identity assigned by the front end, unique within a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// C++ access specifier for class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Protected,
    Private,
    /// Not a member, or access was never specified
    #[default]
    None,
}

/// One enclosing scope of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Namespace(SmolStr),
    Record(SmolStr),
}

/// The chain of scopes enclosing a declaration, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclContext {
    #[serde(default)]
    pub scopes: Vec<Scope>,
    /// Declared inside an `extern "C"` block
    #[serde(default)]
    pub extern_c: bool,
}

impl DeclContext {
    pub fn namespaced(names: &[&str]) -> Self {
        Self {
            scopes: names.iter().map(|n| Scope::Namespace((*n).into())).collect(),
            extern_c: false,
        }
    }

    /// Whether the immediately enclosing scope is a namespace.
    pub fn in_namespace(&self) -> bool {
        matches!(self.scopes.last(), Some(Scope::Namespace(_)))
    }

    /// Every enclosing namespace name, outermost first.
    pub fn namespaces(&self) -> Vec<SmolStr> {
        self.scopes
            .iter()
            .filter_map(|s| match s {
                Scope::Namespace(n) => Some(n.clone()),
                Scope::Record(_) => None,
            })
            .collect()
    }
}

/// A declaration of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    pub id: DeclId,
    /// Absent for anonymous declarations
    #[serde(default)]
    pub name: Option<SmolStr>,
    #[serde(default)]
    pub context: DeclContext,
    #[serde(default)]
    pub loc: SourceLoc,
    #[serde(default)]
    pub access: Access,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Namespace(NamespaceDecl),
    Record(RecordDecl),
    Enum(EnumDecl),
    Function(FunctionDecl),
    Typedef(TypedefDecl),
    Variable(VarDecl),
    Macro(MacroDecl),
}

impl Decl {
    fn new(id: u32, name: Option<&str>, kind: DeclKind) -> Self {
        Self {
            id: DeclId(id),
            name: name.map(SmolStr::new),
            context: DeclContext::default(),
            loc: SourceLoc::default(),
            access: Access::None,
            kind,
        }
    }

    pub fn namespace(id: u32, name: &str, members: Vec<Decl>) -> Self {
        Self::new(id, Some(name), DeclKind::Namespace(NamespaceDecl { members }))
    }

    pub fn record(id: u32, name: Option<&str>, record: RecordDecl) -> Self {
        Self::new(id, name, DeclKind::Record(record))
    }

    pub fn function(id: u32, name: &str, function: FunctionDecl) -> Self {
        Self::new(id, Some(name), DeclKind::Function(function))
    }

    pub fn enumeration(id: u32, name: Option<&str>, decl: EnumDecl) -> Self {
        Self::new(id, name, DeclKind::Enum(decl))
    }

    pub fn typedef(id: u32, name: &str, underlying: Type) -> Self {
        Self::new(id, Some(name), DeclKind::Typedef(TypedefDecl { underlying }))
    }

    pub fn variable(id: u32, name: &str, var: VarDecl) -> Self {
        Self::new(id, Some(name), DeclKind::Variable(var))
    }

    pub fn macro_def(id: u32, name: &str, mac: MacroDecl) -> Self {
        Self::new(id, Some(name), DeclKind::Macro(mac))
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_context(mut self, context: DeclContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_loc(mut self, loc: SourceLoc) -> Self {
        self.loc = loc;
        self
    }

    pub fn as_record(&self) -> Option<&RecordDecl> {
        match &self.kind {
            DeclKind::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match &self.kind {
            DeclKind::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Visit this declaration and every declaration nested in it.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Decl)) {
        visit(self);
        match &self.kind {
            DeclKind::Namespace(ns) => {
                for member in &ns.members {
                    member.walk(visit);
                }
            }
            DeclKind::Record(rec) => {
                for member in &rec.members {
                    member.walk(visit);
                }
                for method in &rec.methods {
                    method.walk(visit);
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    #[serde(default)]
    pub members: Vec<Decl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTag {
    Struct,
    Class,
    Union,
}

/// Size and alignment of a complete record, in bytes. Zero means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub size: u64,
    pub align: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSpec {
    pub ty: Type,
    #[serde(default)]
    pub access: Access,
    #[serde(default)]
    pub is_virtual: bool,
}

/// A template parameter of a class or function template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateParam {
    pub name: SmolStr,
    /// Type of a non-type parameter; `None` for type parameters.
    #[serde(default)]
    pub non_type: Option<Type>,
    #[serde(default)]
    pub default: Option<Expr>,
}

impl TemplateParam {
    pub fn ty(name: &str) -> Self {
        Self {
            name: name.into(),
            non_type: None,
            default: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTemplate {
    /// Primary class template
    Described { params: Vec<TemplateParam> },
    /// Instantiated or explicitly specialized template
    Specialization { args: Vec<TemplateArg> },
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDecl {
    pub tag: RecordTag,
    /// `false` for forward declarations
    #[serde(default = "yes")]
    pub complete: bool,
    /// Declared inside a template without a template header of its own
    #[serde(default)]
    pub dependent: bool,
    #[serde(default)]
    pub layout: Option<Layout>,
    #[serde(default)]
    pub bases: Vec<BaseSpec>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<Decl>,
    /// Nested records, enums, typedefs and static data members
    #[serde(default)]
    pub members: Vec<Decl>,
    #[serde(default)]
    pub template: Option<RecordTemplate>,
    /// Name of the typedef that names this record when it is anonymous
    #[serde(default)]
    pub typedef_name: Option<SmolStr>,
}

impl RecordDecl {
    pub fn new(tag: RecordTag) -> Self {
        Self {
            tag,
            complete: true,
            dependent: false,
            layout: None,
            bases: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            members: Vec::new(),
            template: None,
            typedef_name: None,
        }
    }

    pub fn with_layout(mut self, size: u64, align: u64) -> Self {
        self.layout = Some(Layout { size, align });
        self
    }

    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: Decl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_base(mut self, ty: Type) -> Self {
        self.bases.push(BaseSpec {
            ty,
            access: Access::Public,
            is_virtual: false,
        });
        self
    }

    pub fn is_templated(&self) -> bool {
        matches!(self.template, Some(RecordTemplate::Described { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    #[serde(default)]
    pub name: Option<SmolStr>,
    pub ty: Type,
    #[serde(default)]
    pub access: Access,
    /// Storage size in bits, when the front end could compute it
    #[serde(default)]
    pub size_bits: Option<u64>,
    /// Declared width of a bit-field
    #[serde(default)]
    pub bit_width: Option<u32>,
    #[serde(default)]
    pub in_class_init: Option<Expr>,
}

impl FieldDecl {
    pub fn new(name: &str, ty: Type, size_bits: u64) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            access: Access::None,
            size_bits: Some(size_bits),
            bit_width: None,
            in_class_init: None,
        }
    }

    pub fn bitfield(name: &str, ty: Type, width: u32) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            access: Access::None,
            size_bits: None,
            bit_width: Some(width),
            in_class_init: None,
        }
    }

    pub fn unnamed(ty: Type, size_bits: u64) -> Self {
        Self {
            name: None,
            ..Self::new("", ty, size_bits)
        }
    }
}

/// Overloadable C++ operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverloadedOperator {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Amp,
    Pipe,
    Tilde,
    Exclaim,
    Equal,
    Less,
    Greater,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    CaretEqual,
    AmpEqual,
    PipeEqual,
    LessLess,
    GreaterGreater,
    LessLessEqual,
    GreaterGreaterEqual,
    EqualEqual,
    ExclaimEqual,
    LessEqual,
    GreaterEqual,
    Spaceship,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    Comma,
    ArrowStar,
    Arrow,
    Call,
    Subscript,
    New,
    Delete,
    ArrayNew,
    ArrayDelete,
}

impl OverloadedOperator {
    /// C++ spelling of the operator symbol.
    pub fn spelling(self) -> &'static str {
        use OverloadedOperator::*;
        match self {
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Caret => "^",
            Amp => "&",
            Pipe => "|",
            Tilde => "~",
            Exclaim => "!",
            Equal => "=",
            Less => "<",
            Greater => ">",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            PercentEqual => "%=",
            CaretEqual => "^=",
            AmpEqual => "&=",
            PipeEqual => "|=",
            LessLess => "<<",
            GreaterGreater => ">>",
            LessLessEqual => "<<=",
            GreaterGreaterEqual => ">>=",
            EqualEqual => "==",
            ExclaimEqual => "!=",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Spaceship => "<=>",
            AmpAmp => "&&",
            PipePipe => "||",
            PlusPlus => "++",
            MinusMinus => "--",
            Comma => ",",
            ArrowStar => "->*",
            Arrow => "->",
            Call => "()",
            Subscript => "[]",
            New => "new",
            Delete => "delete",
            ArrayNew => "new[]",
            ArrayDelete => "delete[]",
        }
    }
}

/// C++ constructor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtorKind {
    /// Default constructor (no parameters or all defaulted)
    Default,
    /// Copy constructor (takes const T&)
    Copy,
    /// Move constructor (takes T&&)
    Move,
    /// Other constructor (parameterized, converting, etc.)
    #[default]
    Other,
}

/// One entry of a constructor's member-initializer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtorInitializer {
    /// Initialized member; `None` for base or delegating initializers
    #[serde(default)]
    pub member: Option<SmolStr>,
    pub init: Expr,
    /// Written in source rather than synthesized by the front end
    #[serde(default = "yes")]
    pub written: bool,
    /// Comes from the member's in-class default initializer
    #[serde(default)]
    pub in_class_default: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodRole {
    #[default]
    Normal,
    Constructor {
        #[serde(default)]
        kind: CtorKind,
        #[serde(default)]
        initializers: Vec<CtorInitializer>,
    },
    Destructor,
    Conversion { target: Type },
}

/// Member-function facts computed by the front end.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MethodInfo {
    #[serde(default)]
    pub role: MethodRole,
    #[serde(default)]
    pub operator: Option<OverloadedOperator>,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub is_pure: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_const: bool,
    /// Carries an explicit `override` specifier
    #[serde(default)]
    pub has_override_attr: bool,
    /// Number of base-class virtual methods this one overrides
    #[serde(default)]
    pub overridden_count: u32,
    #[serde(default)]
    pub is_defaulted: bool,
    #[serde(default)]
    pub is_explicitly_defaulted: bool,
}

impl MethodInfo {
    pub fn is_ctor(&self) -> bool {
        matches!(self.role, MethodRole::Constructor { .. })
    }

    pub fn is_dtor(&self) -> bool {
        matches!(self.role, MethodRole::Destructor)
    }

    pub fn ctor_kind(&self) -> Option<CtorKind> {
        match &self.role {
            MethodRole::Constructor { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    #[serde(default)]
    pub name: Option<SmolStr>,
    pub ty: Type,
    #[serde(default)]
    pub default: Option<Expr>,
}

impl ParamDecl {
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub return_type: Type,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    /// Present for function templates
    #[serde(default)]
    pub template_params: Option<Vec<TemplateParam>>,
    #[serde(default)]
    pub variadic: bool,
    /// Declared inline (explicitly or by being defined in the class body)
    #[serde(default)]
    pub is_inline: bool,
    #[serde(default)]
    pub body: Option<Stmt>,
    /// Symbol name computed by the front end's mangler
    #[serde(default)]
    pub mangled_name: Option<SmolStr>,
    /// Present for member functions
    #[serde(default)]
    pub method: Option<MethodInfo>,
}

impl FunctionDecl {
    pub fn new(return_type: Type) -> Self {
        Self {
            return_type,
            params: Vec::new(),
            template_params: None,
            variadic: false,
            is_inline: false,
            body: None,
            mangled_name: None,
            method: None,
        }
    }

    pub fn method(return_type: Type, info: MethodInfo) -> Self {
        Self {
            method: Some(info),
            ..Self::new(return_type)
        }
    }

    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Attach an inline body.
    pub fn with_body(mut self, body: Stmt) -> Self {
        self.is_inline = true;
        self.body = Some(body);
        self
    }

    pub fn with_mangled_name(mut self, name: &str) -> Self {
        self.mangled_name = Some(name.into());
        self
    }

    /// Has a body that is emitted along with the declaration.
    pub fn has_inline_body(&self) -> bool {
        self.is_inline && self.body.is_some()
    }

    pub fn is_templated(&self) -> bool {
        self.template_params.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: SmolStr,
    pub value: i128,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub integer_type: Type,
    #[serde(default)]
    pub enumerators: Vec<Enumerator>,
}

impl EnumDecl {
    pub fn new(integer_type: Type, enumerators: &[(&str, i128)]) -> Self {
        Self {
            integer_type,
            enumerators: enumerators
                .iter()
                .map(|(name, value)| Enumerator {
                    name: (*name).into(),
                    value: *value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedefDecl {
    pub underlying: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageClass {
    #[default]
    None,
    Extern,
    Static,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub ty: Type,
    #[serde(default)]
    pub storage: StorageClass,
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(default)]
    pub init_style: InitStyle,
}

impl VarDecl {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            storage: StorageClass::None,
            init: None,
            init_style: InitStyle::C,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Identifier,
    Keyword,
    Literal,
    Punctuation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroToken {
    pub kind: TokenKind,
    pub text: SmolStr,
}

impl MacroToken {
    pub fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A preprocessor `#define`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroDecl {
    /// Parameter names of a function-like macro
    #[serde(default)]
    pub params: Option<Vec<SmolStr>>,
    #[serde(default)]
    pub tokens: Vec<MacroToken>,
    /// The preprocessor used this macro as an include guard
    #[serde(default)]
    pub header_guard: bool,
}
