//! Object- and function-like macros as D manifest constants.
//!
//! Only macros that look like a single value are translated. Anything
//! longer may expand into arbitrary code, so it is left as a comment
//! pointing at its definition.

use crate::writer::CodeWriter;
use dgen_ast::{MacroDecl, MacroToken, SourceLoc, TokenKind};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

/// One token, or a leading minus and one token.
pub fn is_value_like(mac: &MacroDecl) -> bool {
    match mac.tokens.as_slice() {
        [_] => true,
        [first, _] => first.kind == TokenKind::Punctuation && first.text == "-",
        _ => false,
    }
}

/// Spell a replacement list. Words are separated by one space; punctuation
/// only gets a space after `,` `)` `}` and `;`.
pub fn render_tokens(tokens: &[MacroToken]) -> String {
    let mut out = String::new();
    for tok in tokens {
        out.push_str(&tok.text);
        let spaced = match tok.kind {
            TokenKind::Identifier | TokenKind::Keyword | TokenKind::Literal => true,
            TokenKind::Punctuation => matches!(tok.text.as_str(), "," | ")" | "}" | ";"),
        };
        if spaced {
            out.push(' ');
        }
    }
    out.trim_end().to_string()
}

/// Emits each macro name at most once per run.
#[derive(Debug, Default)]
pub struct MacroWriter {
    seen: FxHashSet<SmolStr>,
}

impl MacroWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `mac`, returning whether anything was written.
    pub fn define(&mut self, w: &mut CodeWriter, name: &str, mac: &MacroDecl, loc: &SourceLoc) -> bool {
        if mac.header_guard || mac.tokens.is_empty() {
            trace!(name, "skipping header guard or empty macro");
            return false;
        }
        if !self.seen.insert(SmolStr::new(name)) {
            trace!(name, "macro already emitted");
            return false;
        }

        if !is_value_like(mac) {
            w.writeln(&format!("//{}", loc));
            w.writeln(&format!("//#define {} ...", name));
            return true;
        }

        let value = render_tokens(&mac.tokens);
        match &mac.params {
            Some(params) => {
                w.writeln("/*");
                w.writeln(&format!("enum {}({}) = {};", name, params.join(", "), value));
                w.writeln("*/");
            }
            None => w.writeln(&format!("enum {} = {};", name, value)),
        }
        true
    }
}
