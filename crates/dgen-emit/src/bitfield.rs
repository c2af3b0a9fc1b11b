//! Packing of consecutive bit-fields into `std.bitmanip.bitfields` groups.

use crate::error::{EmitError, Result};

/// Widest group `bitfields!` can hold.
const MAX_RUN_BITS: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    ty: String,
    name: String,
    width: u32,
}

/// Accumulates one record's bit-field runs.
///
/// Bit-fields are pushed in declaration order; any other member closes the
/// open run first. Closing pads the run up to the next of 8, 16, 32 or 64
/// bits with an unnamed member, which is written even when the padding is 0.
#[derive(Debug)]
pub struct BitfieldPacker {
    record: String,
    entries: Vec<Entry>,
    accumulated: u32,
}

impl BitfieldPacker {
    pub fn new(record: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            entries: Vec::new(),
            accumulated: 0,
        }
    }

    pub fn in_run(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn accumulated(&self) -> u32 {
        self.accumulated
    }

    pub fn push(
        &mut self,
        ty: impl Into<String>,
        name: impl Into<String>,
        width: u32,
    ) -> Result<()> {
        let accumulated = match self.accumulated.checked_add(width) {
            Some(bits) if bits <= MAX_RUN_BITS => bits,
            bits => {
                return Err(EmitError::BitfieldOverflow {
                    record: self.record.clone(),
                    accumulated: bits.unwrap_or(u32::MAX),
                })
            }
        };
        self.accumulated = accumulated;
        self.entries.push(Entry {
            ty: ty.into(),
            name: name.into(),
            width,
        });
        Ok(())
    }

    /// Padding that rounds the current run up to its boundary.
    pub fn padding(&self) -> u32 {
        let boundary = [8, 16, 32, 64]
            .into_iter()
            .find(|b| *b >= self.accumulated)
            .unwrap_or(MAX_RUN_BITS);
        boundary - self.accumulated
    }

    /// Close the open run, returning the lines of its `mixin` group.
    pub fn close(&mut self) -> Option<Vec<String>> {
        if !self.in_run() {
            return None;
        }
        let padding = self.padding();
        let mut entries = std::mem::take(&mut self.entries);
        self.accumulated = 0;
        entries.push(Entry {
            ty: "uint".to_string(),
            name: String::new(),
            width: padding,
        });

        let mut lines = Vec::with_capacity(entries.len() + 2);
        lines.push("mixin(bitfields!(".to_string());
        let last = entries.len() - 1;
        for (i, e) in entries.iter().enumerate() {
            let sep = if i == last { "" } else { "," };
            lines.push(format!("    {}, \"{}\", {}{}", e.ty, e.name, e.width, sep));
        }
        lines.push("));".to_string());
        Some(lines)
    }
}
