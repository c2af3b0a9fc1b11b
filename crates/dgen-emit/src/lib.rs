//! D binding emitter for resolved C/C++ declarations.
//!
//! Takes a [`TranslationUnit`](dgen_ast::TranslationUnit) produced by a
//! semantic front end and writes a D module declaring the same types and
//! functions with matching ABI:
//!
//! ```text
//! TranslationUnit → naming pre-pass → drive → Emitter (DeclSink) → finish → D text
//! ```
//!
//! - [`types`] renders type descriptors (`const(char)*`, `ref Point`, ...)
//! - [`printer`] renders inline bodies, initializers and default arguments
//! - [`operators`] maps special members and operators onto D method names
//! - [`bitfield`] packs bit-field runs into `std.bitmanip` groups
//! - [`naming`] assigns names to anonymous records and fields
//!
//! # Example
//!
//! ```
//! use dgen_ast::{Decl, FieldDecl, RecordDecl, RecordTag, TranslationUnit, Type};
//! use dgen_emit::{emit_unit, EmitOptions};
//!
//! let point = RecordDecl::new(RecordTag::Struct)
//!     .with_layout(8, 4)
//!     .with_field(FieldDecl::new("x", Type::int(), 32))
//!     .with_field(FieldDecl::new("y", Type::int(), 32));
//! let unit = TranslationUnit::single("point.h", vec![Decl::record(1, Some("Point"), point)]);
//!
//! let code = emit_unit(&unit, EmitOptions::default()).unwrap();
//! assert!(code.contains("@cppsize(4) public int x;"));
//! ```

pub mod bitfield;
mod driver;
mod emitter;
mod error;
pub mod feedback;
pub mod ident;
pub mod macros;
pub mod namespace;
pub mod naming;
pub mod operators;
mod preamble;
pub mod printer;
pub mod types;
pub mod writer;

pub use driver::{drive, DeclSink};
pub use emitter::{EmitOptions, Emitter};
pub use error::{EmitError, Result};
pub use namespace::{Linkage, NamespacePolicy, StringListPolicy};
pub use preamble::MODULE_PREAMBLE;

use dgen_ast::TranslationUnit;
use tracing::debug;

/// Emit a whole unit and return the module text.
pub fn emit_unit(unit: &TranslationUnit, options: EmitOptions) -> Result<String> {
    let mut emitter = Emitter::new(unit, options);
    drive(unit, &mut emitter)?;
    let code = emitter.finish();
    debug!(bytes = code.len(), files = unit.files.len(), "emitted unit");
    Ok(code)
}
