//! Mapping of C++ special members and overloaded operators onto D method
//! names.
//!
//! Arithmetic, bitwise and increment operators go through D's templated
//! `opBinary`/`opUnary`/`opOpAssign` forms. Comparison, logical and arrow
//! operators have no D counterpart with matching argument and return
//! shapes, so they keep a plain D name and are pinned to the mangled
//! symbol instead.

use crate::ident::sanitize;
use crate::types::TypeTranslator;
use dgen_ast::{DeclId, FunctionDecl, MethodRole, OverloadedOperator, Type};

/// How a method is spelled in D.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodClass {
    pub name: String,
    /// Compile-time parameter of the D declaration, e.g. `string op : "+"`.
    pub template_arg: Option<String>,
    /// The method must be bound to its mangled symbol with `pragma(mangle)`.
    pub direct_binding: bool,
}

impl MethodClass {
    fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template_arg: None,
            direct_binding: false,
        }
    }

    fn generic(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            template_arg: Some(format!("string op : \"{}\"", symbol)),
            direct_binding: false,
        }
    }

    fn bound(name: &str) -> Self {
        Self {
            name: name.to_string(),
            template_arg: None,
            direct_binding: true,
        }
    }
}

/// D name of an operator that needs direct symbol binding.
pub fn bound_operator_name(op: OverloadedOperator) -> Option<&'static str> {
    use OverloadedOperator::*;
    Some(match op {
        EqualEqual => "opEquals",
        ExclaimEqual => "op_ne",
        AmpAmp => "op_and",
        PipePipe => "op_or",
        Less => "op_lt",
        Greater => "op_gt",
        LessEqual => "op_le",
        GreaterEqual => "op_ge",
        Exclaim => "op_not",
        Arrow => "op_arrow",
        _ => return None,
    })
}

fn is_generic_arithmetic(op: OverloadedOperator) -> bool {
    use OverloadedOperator::*;
    matches!(
        op,
        Plus | Minus
            | Star
            | Slash
            | Percent
            | Caret
            | Amp
            | Pipe
            | Tilde
            | PlusPlus
            | MinusMinus
            | LessLess
            | GreaterGreater
    )
}

fn is_compound_assign(op: OverloadedOperator) -> bool {
    use OverloadedOperator::*;
    matches!(
        op,
        PlusEqual
            | MinusEqual
            | StarEqual
            | SlashEqual
            | PercentEqual
            | CaretEqual
            | AmpEqual
            | PipeEqual
            | LessLessEqual
            | GreaterGreaterEqual
    )
}

fn classify_operator(op: OverloadedOperator, params: usize) -> MethodClass {
    use OverloadedOperator::*;
    if let Some(name) = bound_operator_name(op) {
        return MethodClass::bound(name);
    }
    let symbol = op.spelling();
    match op {
        Tilde | PlusPlus | MinusMinus => MethodClass::generic("opUnary", symbol),
        _ if is_generic_arithmetic(op) => {
            if params == 0 {
                MethodClass::generic("opUnary", symbol)
            } else {
                MethodClass::generic("opBinary", symbol)
            }
        }
        _ if is_compound_assign(op) => {
            MethodClass::generic("opOpAssign", symbol.trim_end_matches('='))
        }
        Call => MethodClass::plain("opCall"),
        Subscript => MethodClass::plain("opIndex"),
        Equal => MethodClass::plain("opAssign"),
        _ => MethodClass::plain("op"),
    }
}

/// Name used where an operator method is referenced from an expression,
/// e.g. `opBinary!("+")`.
pub fn operator_member_name(op: OverloadedOperator, params: usize) -> String {
    let class = classify_operator(op, params);
    match class.template_arg {
        Some(_) => {
            let symbol = match class.name.as_str() {
                "opOpAssign" => op.spelling().trim_end_matches('='),
                _ => op.spelling(),
            };
            format!("{}!(\"{}\")", class.name, symbol)
        }
        None => class.name,
    }
}

fn refers_to(ty: &Type, record: DeclId) -> bool {
    ty.is_reference() && ty.as_record().is_some_and(|r| r.id == record)
}

/// `Rec& operator=(const Rec&)`: D's built-in assignment already covers it.
pub fn is_identity_assignment(func: &FunctionDecl, record: DeclId) -> bool {
    let is_assign = func
        .method
        .as_ref()
        .is_some_and(|m| m.operator == Some(OverloadedOperator::Equal));
    is_assign
        && func.params.len() == 1
        && refers_to(&func.params[0].ty, record)
        && refers_to(&func.return_type, record)
}

/// Classify a member function. `None` means the method is not emitted.
pub fn classify(
    name: &str,
    func: &FunctionDecl,
    record: DeclId,
    types: &TypeTranslator<'_>,
) -> Option<MethodClass> {
    let Some(info) = &func.method else {
        return Some(MethodClass::plain(sanitize(name)));
    };
    match &info.role {
        MethodRole::Constructor { .. } => Some(MethodClass::plain("this")),
        MethodRole::Destructor => Some(MethodClass::plain("~this")),
        MethodRole::Conversion { target } => {
            let target = match target.desugar() {
                Type::Reference { inner, .. } => inner.as_ref(),
                other => other,
            };
            Some(MethodClass {
                name: "opCast".to_string(),
                template_arg: Some(format!("Ty : {}", types.render(target))),
                direct_binding: false,
            })
        }
        MethodRole::Normal => match info.operator {
            Some(OverloadedOperator::Equal) if is_identity_assignment(func, record) => None,
            Some(op) => Some(classify_operator(op, func.params.len())),
            None => Some(MethodClass::plain(sanitize(name))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NameTable;
    use dgen_ast::{MethodInfo, ParamDecl};

    fn operator(op: OverloadedOperator, ret: Type, params: Vec<Type>) -> FunctionDecl {
        let info = MethodInfo {
            operator: Some(op),
            ..MethodInfo::default()
        };
        let mut func = FunctionDecl::method(ret, info);
        for (i, ty) in params.into_iter().enumerate() {
            func = func.with_param(ParamDecl::new(&format!("p{}", i), ty));
        }
        func
    }

    fn class_of(func: &FunctionDecl) -> Option<MethodClass> {
        let names = NameTable::default();
        classify("operator", func, DeclId(1), &TypeTranslator::new(&names))
    }

    #[test]
    fn test_identity_assignment_is_suppressed() {
        let vec = Type::record(1, "Vec");
        let func = operator(
            OverloadedOperator::Equal,
            vec.clone().lref(),
            vec![vec.clone().const_ref()],
        );
        assert!(is_identity_assignment(&func, DeclId(1)));
        assert!(class_of(&func).is_none());
    }

    #[test]
    fn test_other_assignments_are_op_assign() {
        let vec = Type::record(1, "Vec");
        // Returns by value.
        let by_value = operator(OverloadedOperator::Equal, vec.clone(), vec![vec.clone().const_ref()]);
        // Assigns from another type.
        let from_int = operator(OverloadedOperator::Equal, vec.clone().lref(), vec![Type::int()]);
        // Parameter of a different record.
        let other = operator(
            OverloadedOperator::Equal,
            vec.clone().lref(),
            vec![Type::record(2, "Other").const_ref()],
        );
        for func in [by_value, from_int, other] {
            let class = class_of(&func).expect("emitted");
            assert_eq!(class.name, "opAssign");
            assert!(!class.direct_binding);
        }
    }

    #[test]
    fn test_arithmetic_uses_generic_forms() {
        let plus = operator(OverloadedOperator::Plus, Type::int(), vec![Type::int()]);
        let class = class_of(&plus).unwrap();
        assert_eq!(class.name, "opBinary");
        assert_eq!(class.template_arg.as_deref(), Some("string op : \"+\""));

        let neg = operator(OverloadedOperator::Minus, Type::int(), vec![]);
        assert_eq!(class_of(&neg).unwrap().name, "opUnary");

        let add_assign = operator(OverloadedOperator::PlusEqual, Type::int(), vec![Type::int()]);
        let class = class_of(&add_assign).unwrap();
        assert_eq!(class.name, "opOpAssign");
        assert_eq!(class.template_arg.as_deref(), Some("string op : \"+\""));
    }

    #[test]
    fn test_comparisons_need_direct_binding() {
        let lt = operator(OverloadedOperator::Less, Type::bool(), vec![Type::int()]);
        let class = class_of(&lt).unwrap();
        assert_eq!(class.name, "op_lt");
        assert!(class.direct_binding);
        let eq = operator(OverloadedOperator::EqualEqual, Type::bool(), vec![Type::int()]);
        assert_eq!(class_of(&eq).unwrap().name, "opEquals");
    }

    #[test]
    fn test_special_members() {
        let names = NameTable::default();
        let types = TypeTranslator::new(&names);
        let ctor = FunctionDecl::method(
            Type::void(),
            MethodInfo {
                role: MethodRole::Constructor {
                    kind: Default::default(),
                    initializers: Vec::new(),
                },
                ..MethodInfo::default()
            },
        );
        assert_eq!(classify("Vec", &ctor, DeclId(1), &types).unwrap().name, "this");

        let conv = FunctionDecl::method(
            Type::bool(),
            MethodInfo {
                role: MethodRole::Conversion {
                    target: Type::bool().const_ref(),
                },
                ..MethodInfo::default()
            },
        );
        let class = classify("operator bool", &conv, DeclId(1), &types).unwrap();
        assert_eq!(class.name, "opCast");
        assert_eq!(class.template_arg.as_deref(), Some("Ty : const(bool)"));
    }

    #[test]
    fn test_member_reference_names() {
        assert_eq!(operator_member_name(OverloadedOperator::Plus, 1), "opBinary!(\"+\")");
        assert_eq!(operator_member_name(OverloadedOperator::MinusEqual, 1), "opOpAssign!(\"-\")");
        assert_eq!(operator_member_name(OverloadedOperator::Subscript, 1), "opIndex");
        assert_eq!(operator_member_name(OverloadedOperator::Less, 1), "op_lt");
    }

    #[test]
    fn test_reserved_method_names_are_sanitized() {
        let func = FunctionDecl::method(Type::void(), MethodInfo::default());
        let names = NameTable::default();
        let class = classify("version", &func, DeclId(1), &TypeTranslator::new(&names)).unwrap();
        assert_eq!(class.name, "version_");
    }
}
