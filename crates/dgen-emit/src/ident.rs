//! Identifier policy: keeping C/C++ names legal in D.

/// D keywords and builtin type names that are valid C/C++ identifiers.
const D_RESERVED: &[&str] = &[
    "out", "ref", "version", "debug", "mixin", "with", "unittest", "typeof", "typeid", "super",
    "body", "shared", "pure", "package", "module", "inout", "in", "is", "import", "invariant",
    "immutable", "interface", "function", "delegate", "final", "export", "deprecated", "alias",
    "abstract", "synchronized", "byte", "ubyte", "uint", "ushort", "string",
];

pub fn is_reserved(name: &str) -> bool {
    D_RESERVED.contains(&name)
}

/// Append `_` to names that collide with a reserved word.
///
/// Not idempotent for names that end up reserved again after the suffix,
/// so call it exactly once per emission site.
pub fn sanitize(name: &str) -> String {
    if is_reserved(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}
