//! Integration tests for D binding emission.

use dgen_ast::{
    Access, BinaryOp, CtorInitializer, CtorKind, Decl, DeclContext, EnumDecl, Expr, FieldDecl,
    FunctionDecl, MacroDecl, MacroToken, MethodInfo, MethodRole, OverloadedOperator, ParamDecl,
    RecordDecl, RecordTag, RecordTemplate, SourceLoc, Stmt, TemplateParam, TokenKind,
    TranslationUnit, Type,
};
use dgen_config::{ManglingScheme, PathFilter};
use dgen_emit::{drive, emit_unit, DeclSink, EmitError, EmitOptions, Emitter};
use std::path::PathBuf;

fn options() -> EmitOptions {
    EmitOptions::default().with_preamble(false)
}

fn emit(decls: Vec<Decl>) -> String {
    let unit = TranslationUnit::single("test.h", decls);
    emit_unit(&unit, options()).expect("emission succeeds")
}

fn method(name: &str, func: FunctionDecl) -> Decl {
    Decl::function(100 + name.len() as u32, name, func)
}

fn point() -> Decl {
    let x = Expr::this_member("x", Type::int());
    let y = Expr::this_member("y", Type::int());
    let norm = FunctionDecl::method(Type::float(), MethodInfo::default()).with_body(Stmt::block(
        vec![Stmt::ret(Expr::binary(
            BinaryOp::Add,
            Expr::binary(BinaryOp::Mul, x.clone(), x),
            Expr::binary(BinaryOp::Mul, y.clone(), y),
        ))],
    ));
    let rec = RecordDecl::new(RecordTag::Struct)
        .with_layout(8, 4)
        .with_field(FieldDecl::new("x", Type::int(), 32))
        .with_field(FieldDecl::new("y", Type::int(), 32))
        .with_method(Decl::function(2, "norm", norm));
    Decl::record(1, Some("Point"), rec)
}

/// Test the plain-struct round trip.
#[test]
fn test_point_struct() {
    let code = emit(vec![point()]);

    assert!(code.contains("struct Point\n"));
    assert_eq!(code.matches("@cppsize(4)").count(), 2);
    assert!(code.contains("final float norm()"));
    assert!(!code.contains("override"));
    assert!(!code.lines().any(|l| l.trim_start().starts_with("//") && !l.contains("------")));

    insta::assert_snapshot!(code.trim(), @r"
// ------ test.h

extern(C++)
@cppclasssize(8) align(4)
struct Point
{
    @cppsize(4) public int x;
    @cppsize(4) public int y;
    /* inline */ public final float norm()
    {
        return x * x + y * y;
    }
}
");
}

/// Test that the module preamble comes first.
#[test]
fn test_preamble() {
    let unit = TranslationUnit::single("test.h", vec![point()]);
    let code = emit_unit(&unit, EmitOptions::default()).unwrap();
    assert!(code.starts_with(dgen_emit::MODULE_PREAMBLE));
    assert!(code.contains("mixin template RvalueRef()"));
    assert!(code.contains("struct Point\n"));
}

/// Test naming of an anonymous nested struct and the member using it.
#[test]
fn test_anonymous_nested_struct() {
    let anon = RecordDecl::new(RecordTag::Struct).with_field(FieldDecl::new("v", Type::int(), 32));
    let mut outer = RecordDecl::new(RecordTag::Struct);
    outer.members.push(Decl::record(2, None, anon));
    outer.fields.push(FieldDecl::unnamed(Type::record(2, ""), 32));

    let code = emit(vec![Decl::record(1, Some("Outer"), outer)]);

    assert!(code.contains("    struct _anon1\n    {\n        @cppsize(4) public int v;\n    }\n"));
    assert!(code.contains("@cppsize(4) public _anon1 a1_;"));
}

/// Test value-like and long macros.
#[test]
fn test_macros() {
    let literal = |text: &str| MacroToken::new(TokenKind::Literal, text);
    let minus = MacroToken::new(TokenKind::Punctuation, "-");
    let object = |tokens| MacroDecl {
        params: None,
        tokens,
        header_guard: false,
    };

    let code = emit(vec![
        Decl::macro_def(1, "MAX_SIZE", object(vec![literal("100")])),
        Decl::macro_def(2, "NEG", object(vec![minus, literal("1")])),
        Decl::macro_def(
            3,
            "TWICE",
            object(vec![literal("2"), MacroToken::new(TokenKind::Punctuation, "*"), literal("x")]),
        )
        .with_loc(SourceLoc::new("test.h", 7, 9)),
    ]);

    assert!(code.contains("enum MAX_SIZE = 100;\n"));
    assert!(code.contains("enum NEG = -1;\n"));
    assert!(code.contains("//test.h:7:9\n//#define TWICE ...\n"));
}

/// Test that a declaration reached twice is written once.
#[test]
fn test_registry_idempotence() {
    let decl = point();
    let unit = TranslationUnit::single("test.h", vec![decl.clone()]);
    let mut emitter = Emitter::new(&unit, options());

    emitter.enter_record(&decl).unwrap();
    emitter.leave_record(&decl).unwrap();
    let once = emitter.output().to_string();

    emitter.enter_record(&decl).unwrap();
    emitter.leave_record(&decl).unwrap();
    assert_eq!(emitter.output(), once);
    assert_eq!(emitter.finish().matches("struct Point").count(), 1);
}

fn shape_hierarchy(virtual_area: bool) -> Vec<Decl> {
    let info = MethodInfo {
        is_virtual: virtual_area,
        ..MethodInfo::default()
    };
    let area = FunctionDecl::method(Type::float(), info);
    let shape = RecordDecl::new(RecordTag::Struct).with_method(Decl::function(2, "area", area));
    let circle = RecordDecl::new(RecordTag::Struct)
        .with_base(Type::record(1, "Shape"))
        .with_field(FieldDecl::new("radius", Type::float(), 32));
    vec![
        Decl::record(1, Some("Shape"), shape),
        Decl::record(3, Some("Circle"), circle),
    ]
}

/// Test that one virtual method turns the whole hierarchy into classes.
#[test]
fn test_virtual_method_flips_shape() {
    let code = emit(shape_hierarchy(false));
    assert!(code.contains("struct Shape\n"));
    assert!(code.contains("struct Circle\n"));
    assert!(code.contains("    Shape _b0;\n    alias _b0 this;\n"));
    assert!(code.contains("public final float area();"));

    let code = emit(shape_hierarchy(true));
    assert!(code.contains("class Shape\n"));
    assert!(code.contains("class Circle : Shape\n"));
    assert!(!code.contains("_b0"));
    assert!(code.contains("public float area();"));
    assert!(!code.contains("final float area"));
}

fn bits_union() -> RecordDecl {
    RecordDecl::new(RecordTag::Union)
        .with_layout(4, 4)
        .with_field(FieldDecl::new("i", Type::int(), 32))
        .with_field(FieldDecl::new("f", Type::float(), 32))
}

fn virtual_method(id: u32, name: &str) -> Decl {
    let info = MethodInfo {
        is_virtual: true,
        ..MethodInfo::default()
    };
    Decl::function(id, name, FunctionDecl::method(Type::void(), info))
}

/// Test that a union without virtual methods is a plain value type.
#[test]
fn test_non_virtual_union_is_struct() {
    let code = emit(vec![Decl::record(1, Some("Bits"), bits_union())]);
    assert!(code.contains("@cppclasssize(4) align(4)\nstruct Bits\n{\n"));
    assert!(!code.contains("union Bits"));
}

/// Test that a virtual method keeps a union in union shape.
#[test]
fn test_virtual_union_keeps_union_shape() {
    let rec = bits_union().with_method(virtual_method(2, "reset"));
    let code = emit(vec![Decl::record(1, Some("Bits"), rec)]);
    assert!(code.contains("union Bits\n{\n"));
    assert!(!code.contains("struct Bits"));
    assert!(!code.contains("class Bits"));
}

/// Test that a virtual method inherited from a base also selects the
/// union shape.
#[test]
fn test_union_with_virtual_base_keeps_union_shape() {
    let base = RecordDecl::new(RecordTag::Struct).with_method(virtual_method(2, "reset"));
    let rec = bits_union().with_base(Type::record(1, "Resettable"));
    let code = emit(vec![
        Decl::record(1, Some("Resettable"), base),
        Decl::record(3, Some("Bits"), rec),
    ]);
    assert!(code.contains("class Resettable\n"));
    assert!(code.contains("union Bits : Resettable\n{\n"));
    assert!(!code.contains("struct Bits"));
}

fn vec_record(methods: Vec<Decl>) -> Decl {
    let mut rec = RecordDecl::new(RecordTag::Struct).with_field(FieldDecl::new("x", Type::int(), 32));
    rec.methods = methods;
    Decl::record(1, Some("Vec"), rec)
}

fn operator(op: OverloadedOperator, ret: Type, param: Type) -> FunctionDecl {
    let info = MethodInfo {
        operator: Some(op),
        ..MethodInfo::default()
    };
    FunctionDecl::method(ret, info).with_param(ParamDecl::new("rhs", param))
}

/// Test that `Vec& operator=(const Vec&)` is dropped while other
/// assignment forms are kept.
#[test]
fn test_identity_assignment_suppressed() {
    let vec = Type::record(1, "Vec");
    let assign = operator(OverloadedOperator::Equal, vec.clone().lref(), vec.clone().const_ref());
    let assign_int = operator(OverloadedOperator::Equal, vec.clone().lref(), Type::int());
    let add_assign = operator(OverloadedOperator::PlusEqual, vec.clone().lref(), vec.clone().const_ref());

    let code = emit(vec![vec_record(vec![
        Decl::function(2, "operator=", assign),
        Decl::function(3, "operator=", assign_int),
        Decl::function(4, "operator+=", add_assign),
    ])]);

    assert_eq!(code.matches("opAssign").count(), 1);
    assert!(code.contains("public final ref Vec opAssign(int rhs);"));
    assert!(code.contains("public final ref Vec opOpAssign(string op : \"+\")(ref const(Vec) rhs);"));
}

/// Test direct symbol binding of comparison operators.
#[test]
fn test_comparison_operator_binding() {
    let vec = Type::record(1, "Vec");
    let mut eq = operator(OverloadedOperator::EqualEqual, Type::bool(), vec.clone().const_ref())
        .with_mangled_name("_ZNK3VeceqERKS_");
    if let Some(info) = eq.method.as_mut() {
        info.is_const = true;
    }
    let lt = operator(OverloadedOperator::Less, Type::bool(), vec.const_ref());
    let decl = vec_record(vec![
        Decl::function(2, "operator==", eq),
        Decl::function(3, "operator<", lt),
    ]);

    let code = emit(vec![decl.clone()]);
    assert!(code.contains(
        "    pragma(mangle, \"_ZNK3VeceqERKS_\")\n    public final bool opEquals(ref const(Vec) rhs) const;\n"
    ));
    // No symbol: degrade to a plain method.
    assert!(code.contains("    public final bool op_lt(ref const(Vec) rhs);\n"));

    let unit = TranslationUnit::single("test.h", vec![decl]);
    let code = emit_unit(&unit, options().with_mangling(ManglingScheme::Microsoft)).unwrap();
    assert!(code.contains(
        "@pyExtract(\"Vec::operator<\") pragma(mangle, nsgen.Vec_op_lt.mangleof)\n    public final bool op_lt("
    ));
}

/// Test bit-field packing and padding.
#[test]
fn test_bitfield_runs() {
    let rec = RecordDecl::new(RecordTag::Struct)
        .with_field(FieldDecl::bitfield("a", Type::uint(), 2))
        .with_field(FieldDecl::bitfield("b", Type::uint(), 3))
        .with_field(FieldDecl::bitfield("c", Type::uint(), 2))
        .with_field(FieldDecl::new("next", Type::int(), 32))
        .with_field(FieldDecl::bitfield("flag", Type::bool(), 1));
    let code = emit(vec![Decl::record(1, Some("Flags"), rec)]);

    assert!(code.contains(concat!(
        "    mixin(bitfields!(\n",
        "        uint, \"a\", 2,\n",
        "        uint, \"b\", 3,\n",
        "        uint, \"c\", 2,\n",
        "        uint, \"\", 1\n",
        "    ));\n",
        "    @cppsize(4) public int next;\n",
        "    mixin(bitfields!(\n",
        "        bool, \"flag\", 1,\n",
        "        uint, \"\", 7\n",
        "    ));\n",
    )));
}

/// Test that a run past 64 bits aborts the run.
#[test]
fn test_bitfield_overflow_is_fatal() {
    let rec = RecordDecl::new(RecordTag::Struct)
        .with_field(FieldDecl::bitfield("lo", Type::uint(), 40))
        .with_field(FieldDecl::bitfield("hi", Type::uint(), 30));
    let unit = TranslationUnit::single("test.h", vec![Decl::record(1, Some("Wide"), rec)]);

    let err = emit_unit(&unit, options()).unwrap_err();
    assert!(matches!(
        err,
        EmitError::BitfieldOverflow { ref record, accumulated: 70 } if record == "Wide"
    ));
}

fn ctor(kind: CtorKind, params: Vec<ParamDecl>, inits: Vec<CtorInitializer>) -> FunctionDecl {
    let info = MethodInfo {
        role: MethodRole::Constructor {
            kind,
            initializers: inits,
        },
        ..MethodInfo::default()
    };
    let mut func = FunctionDecl::method(Type::void(), info).with_body(Stmt::block(Vec::new()));
    func.params = params;
    func
}

fn init(member: &str, value: Expr) -> CtorInitializer {
    CtorInitializer {
        member: Some(member.into()),
        init: value,
        written: true,
        in_class_default: false,
    }
}

/// Test constructors with member initializer lists.
#[test]
fn test_constructors() {
    let default = ctor(CtorKind::Default, Vec::new(), vec![init("n", Expr::int(0))]);
    let start = ctor(
        CtorKind::Other,
        vec![ParamDecl::new("start", Type::int())],
        vec![init("n", Expr::decl_ref("start", Type::int()))],
    );
    let rec = RecordDecl::new(RecordTag::Struct)
        .with_field(FieldDecl::new("n", Type::int(), 32))
        .with_method(Decl::function(2, "Counter", default))
        .with_method(Decl::function(3, "Counter", start));
    let code = emit(vec![Decl::record(1, Some("Counter"), rec)]);

    // D structs cannot declare a default constructor.
    assert!(code.contains(concat!(
        "    // /* inline */ public this()\n",
        "    //{\n",
        "    //    // initializer list\n",
        "    //    n = 0;\n",
        "    //}\n",
    )));
    assert!(code.contains(concat!(
        "    /* inline */ public this(int start)\n",
        "    {\n",
        "        // initializer list\n",
        "        n = start;\n",
        "    }\n",
    )));
}

/// Test that implicit special members are skipped and explicitly
/// defaulted ones are marked.
#[test]
fn test_defaulted_members() {
    let implicit = MethodInfo {
        role: MethodRole::Destructor,
        is_defaulted: true,
        ..MethodInfo::default()
    };
    let explicit = MethodInfo {
        role: MethodRole::Destructor,
        is_defaulted: true,
        is_explicitly_defaulted: true,
        ..MethodInfo::default()
    };
    let code = emit(vec![vec_record(vec![Decl::function(
        2,
        "~Vec",
        FunctionDecl::method(Type::void(), implicit),
    )])]);
    assert!(!code.contains("~this"));

    let code = emit(vec![vec_record(vec![Decl::function(
        2,
        "~Vec",
        FunctionDecl::method(Type::void(), explicit),
    )])]);
    assert!(code.contains("// (default) public ~this();"));
}

/// Test virtual method annotations in a class hierarchy.
#[test]
fn test_method_annotations() {
    let pure = MethodInfo {
        is_virtual: true,
        is_pure: true,
        ..MethodInfo::default()
    };
    let overriding = MethodInfo {
        is_virtual: true,
        has_override_attr: true,
        overridden_count: 1,
        ..MethodInfo::default()
    };
    let make = MethodInfo {
        is_static: true,
        ..MethodInfo::default()
    };
    let base = RecordDecl::new(RecordTag::Class).with_method(
        Decl::function(2, "draw", FunctionDecl::method(Type::void(), pure)).with_access(Access::Public),
    );
    let derived = RecordDecl::new(RecordTag::Class)
        .with_base(Type::record(1, "Widget"))
        .with_method(
            Decl::function(4, "draw", FunctionDecl::method(Type::void(), overriding))
                .with_access(Access::Public),
        )
        .with_method(
            Decl::function(5, "make", FunctionDecl::method(Type::record(3, "Button").ptr(), make))
                .with_access(Access::Public),
        );

    let unit = TranslationUnit::single(
        "test.h",
        vec![
            Decl::record(1, Some("Widget"), base),
            Decl::record(3, Some("Button"), derived),
        ],
    );
    let code = emit_unit(&unit, options().with_nogc(true)).unwrap();

    assert!(code.contains("class Widget\n"));
    assert!(code.contains("public abstract void draw() @nogc;"));
    assert!(code.contains("class Button : Widget\n"));
    assert!(code.contains("public override void draw() @nogc;"));
    assert!(code.contains("public static Button* make() @nogc;"));
}

/// Test `.byRef` defaults and the `RvalueRef` mixin they request.
#[test]
fn test_rvalue_ref_mixin() {
    let vec = Type::record(1, "Vec");
    let temp = Expr::TemporaryObject {
        ty: vec.clone(),
        args: vec![Expr::int(1), Expr::int(2)],
    };
    let scale = FunctionDecl::method(Type::void(), MethodInfo::default())
        .with_param(ParamDecl::new("by", vec.clone().const_ref()).with_default(temp.clone()));
    let add = FunctionDecl::method(Type::void(), MethodInfo::default())
        .with_param(ParamDecl::new("v", vec.const_ref()).with_default(temp));

    let mesh = RecordDecl::new(RecordTag::Struct).with_method(method("add", add));
    let code = emit(vec![
        vec_record(vec![method("scale", scale)]),
        Decl::record(2, Some("Mesh"), mesh),
    ]);

    assert!(code.contains("public final void scale(ref const(Vec) by = Vec(1, 2).byRef);"));
    assert!(code.contains("public final void add(ref const(Vec) v = Vec(1, 2).byRef);"));
    assert_eq!(code.matches("mixin RvalueRef;").count(), 1);
    assert!(code.contains("Vec(1, 2).byRef);\n    mixin RvalueRef;\n}\n"));
}

/// Test that a request arriving after its record closed is applied at
/// the end of the run.
#[test]
fn test_rvalue_ref_after_close() {
    let vec = Type::record(1, "Vec");
    let temp = Expr::TemporaryObject {
        ty: vec.clone(),
        args: vec![Expr::int(3)],
    };
    let add = FunctionDecl::new(Type::void())
        .with_param(ParamDecl::new("v", vec.const_ref()).with_default(temp));

    let code = emit(vec![
        vec_record(Vec::new()),
        Decl::function(2, "push", add),
    ]);

    assert!(code.contains("struct Vec\n{\n    @cppsize(4) public int x;\n    mixin RvalueRef;\n}\n"));
    assert!(code.contains("void push(ref const(Vec) v = Vec(3).byRef);"));
}

/// Test that a late request reaches the right record when two records
/// share a name in different namespaces.
#[test]
fn test_rvalue_ref_after_close_same_name() {
    let first = Decl::record(
        1,
        Some("Vec"),
        RecordDecl::new(RecordTag::Struct).with_field(FieldDecl::new("x", Type::int(), 32)),
    )
    .with_context(DeclContext::namespaced(&["a"]));
    let second = Decl::record(
        5,
        Some("Vec"),
        RecordDecl::new(RecordTag::Struct).with_field(FieldDecl::new("y", Type::int(), 32)),
    )
    .with_context(DeclContext::namespaced(&["b"]));
    let temp = Expr::TemporaryObject {
        ty: Type::record(1, "Vec"),
        args: vec![Expr::int(3)],
    };
    let push = FunctionDecl::new(Type::void())
        .with_param(ParamDecl::new("v", Type::record(1, "Vec").const_ref()).with_default(temp));
    let push = Decl::function(2, "push", push).with_context(DeclContext::namespaced(&["a"]));

    let code = emit(vec![first, second, push]);

    assert_eq!(code.matches("mixin RvalueRef;").count(), 1);
    assert!(code.contains("    @cppsize(4) public int x;\n    mixin RvalueRef;\n}\n"));
    assert!(code.contains("    @cppsize(4) public int y;\n}\n"));
}

/// Test typedefs naming records.
#[test]
fn test_record_typedefs() {
    let anon = RecordDecl::new(RecordTag::Struct).with_field(FieldDecl::new("fd", Type::int(), 32));
    let named = RecordDecl::new(RecordTag::Struct).with_field(FieldDecl::new("id", Type::int(), 32));

    let code = emit(vec![
        Decl::record(1, None, anon),
        Decl::typedef(2, "Handle", Type::record(1, "")),
        Decl::record(3, Some("Impl"), named),
        Decl::typedef(4, "Ref", Type::record(3, "Impl")),
    ]);

    assert_eq!(code.matches("struct Handle\n").count(), 1);
    assert!(!code.contains("alias Handle"));
    assert_eq!(code.matches("struct Impl\n").count(), 1);
    assert!(code.contains("alias Ref = Impl;\n"));
}

/// Test template records.
#[test]
fn test_template_record() {
    let mut rec = RecordDecl::new(RecordTag::Struct)
        .with_layout(16, 4)
        .with_field(FieldDecl::new("data", Type::TemplateParam("T".into()).array(4), 0));
    rec.template = Some(RecordTemplate::Described {
        params: vec![
            TemplateParam::ty("T"),
            TemplateParam {
                name: "N".into(),
                non_type: Some(Type::int()),
                default: Some(Expr::int(4)),
            },
        ],
    });
    let code = emit(vec![Decl::record(1, Some("Array"), rec)]);

    assert!(code.contains("struct Array(T, int N = 4)\n"));
    assert!(code.contains("@cppsize(0) public T[4] data;"));
    assert!(!code.contains("@cppclasssize"));
}

/// Test forward declarations inside a namespace.
#[test]
fn test_forward_declaration() {
    let mut rec = RecordDecl::new(RecordTag::Class);
    rec.complete = false;
    let decl = Decl::record(1, Some("Opaque"), rec).with_context(DeclContext::namespaced(&["io"]));
    let code = emit(vec![decl]);
    assert!(code.contains("extern(C++, \"io\")\nstruct Opaque;\n"));
}

/// Test that declarations outside the input roots are ignored.
#[test]
fn test_input_roots() {
    let inside = Decl::enumeration(1, Some("Kept"), EnumDecl::new(Type::int(), &[("A", 0)]))
        .with_loc(SourceLoc::new("include/a.h", 1, 1));
    let outside = Decl::enumeration(2, Some("Dropped"), EnumDecl::new(Type::int(), &[("B", 0)]))
        .with_loc(SourceLoc::new("vendor/b.h", 1, 1));
    let unit = TranslationUnit::single("include/a.h", vec![inside, outside]);

    let filter = PathFilter::new(&[PathBuf::from("include")]);
    let mut emitter = Emitter::new(&unit, options().with_filter(filter));
    drive(&unit, &mut emitter).unwrap();
    let code = emitter.finish();

    assert!(code.contains("alias Kept = int;"));
    assert!(!code.contains("Dropped"));
}
