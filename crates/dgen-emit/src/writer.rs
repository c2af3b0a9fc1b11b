//! Indenting text sink for generated D code.

/// Output buffer with four-space indentation.
#[derive(Debug, Default)]
pub struct CodeWriter {
    output: String,
    indent: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one indented line. Empty lines carry no indentation.
    pub fn writeln(&mut self, s: &str) {
        if !s.is_empty() {
            self.write_indent();
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    /// Start a line without terminating it.
    pub fn write(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
    }

    /// Append to the current line.
    pub fn push(&mut self, s: &str) {
        self.output.push_str(s);
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn indent_level(&self) -> usize {
        self.indent
    }

    /// Byte offset of the next write.
    pub fn offset(&self) -> usize {
        self.output.len()
    }

    /// Splice text in at an earlier offset.
    pub fn insert(&mut self, offset: usize, s: &str) {
        self.output.insert_str(offset.min(self.output.len()), s);
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn finish(self) -> String {
        self.output
    }
}
