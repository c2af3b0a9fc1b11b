//! Error types for dgen-emit.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for emission.
pub type Result<T> = std::result::Result<T, EmitError>;

/// Conditions that abort a generation run.
///
/// Unsupported declarations are skipped rather than reported here; only
/// layouts the target cannot represent stop the run.
#[derive(Error, Diagnostic, Debug)]
pub enum EmitError {
    /// A run of bit-fields does not fit the widest packed group.
    #[error("bit-field run in `{record}` accumulates {accumulated} bits without closing")]
    #[diagnostic(
        code(dgen::emit::bitfield_overflow),
        help("a packed group holds at most 64 bits; split the bit-fields with a regular member")
    )]
    BitfieldOverflow { record: String, accumulated: u32 },
}
