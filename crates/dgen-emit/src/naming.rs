//! Anonymous-entity naming.
//!
//! D has no anonymous aggregate usable at module scope, so every anonymous
//! record gets a synthetic name before anything is emitted. The names live
//! in a side table keyed by declaration identity; the resolved tree itself
//! is never modified.
//!
//! - top-level anonymous records take their typedef name, or `AnonType_<N>`
//!   from a run-wide counter
//! - anonymous records nested anywhere inside a top-level record are named
//!   `_anon<N>`, numbered by a counter shared by that record's whole tree
//! - an unnamed field whose type is `_anon<N>` is named `a<N>_`; other
//!   unnamed non-bit-field members become `_field<index>`

use dgen_ast::{Decl, DeclId, DeclKind, DeclRef, RecordDecl, TranslationUnit, Type};
use rustc_hash::FxHashMap;
use smol_str::{format_smolstr, SmolStr};
use tracing::trace;

/// Every declaration of a unit by identity.
#[derive(Debug, Default)]
pub struct DeclIndex<'u> {
    decls: FxHashMap<DeclId, &'u Decl>,
}

impl<'u> DeclIndex<'u> {
    pub fn build(unit: &'u TranslationUnit) -> Self {
        let mut decls = FxHashMap::default();
        unit.walk(&mut |decl| {
            decls.entry(decl.id).or_insert(decl);
        });
        Self { decls }
    }

    pub fn get(&self, id: DeclId) -> Option<&'u Decl> {
        self.decls.get(&id).copied()
    }

    pub fn record(&self, id: DeclId) -> Option<(&'u Decl, &'u RecordDecl)> {
        let decl = self.get(id)?;
        decl.as_record().map(|rec| (decl, rec))
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Synthetic names assigned to anonymous declarations and fields.
#[derive(Debug, Default)]
pub struct NameTable {
    decls: FxHashMap<DeclId, SmolStr>,
    fields: FxHashMap<(DeclId, usize), SmolStr>,
    global_anon: u32,
}

impl NameTable {
    /// Run the naming pre-pass over a whole unit.
    pub fn assign(unit: &TranslationUnit, index: &DeclIndex<'_>) -> Self {
        let mut table = NameTable::default();

        // Typedef names win over counters.
        unit.walk(&mut |decl| {
            match &decl.kind {
                DeclKind::Typedef(td) => {
                    if let (Some(name), Type::Record(r)) = (&decl.name, td.underlying.desugar()) {
                        if index.get(r.id).is_some_and(|rd| rd.name.is_none()) {
                            table.decls.entry(r.id).or_insert_with(|| name.clone());
                        }
                    }
                }
                DeclKind::Record(rec) if decl.name.is_none() => {
                    if let Some(name) = &rec.typedef_name {
                        table.decls.entry(decl.id).or_insert_with(|| name.clone());
                    }
                }
                _ => {}
            }
        });

        for file in &unit.files {
            for decl in &file.decls {
                table.visit_scope(decl);
            }
        }
        table
    }

    fn visit_scope(&mut self, decl: &Decl) {
        match &decl.kind {
            DeclKind::Namespace(ns) => {
                for member in &ns.members {
                    self.visit_scope(member);
                }
            }
            DeclKind::Record(rec) => {
                if decl.name.is_none() && !self.decls.contains_key(&decl.id) {
                    self.global_anon += 1;
                    let name = format_smolstr!("AnonType_{}", self.global_anon);
                    trace!(decl = %decl.id, %name, "named top-level anonymous record");
                    self.decls.insert(decl.id, name);
                }
                let mut counter = 1;
                self.name_members(decl.id, rec, &mut counter);
            }
            _ => {}
        }
    }

    fn name_members(&mut self, id: DeclId, rec: &RecordDecl, counter: &mut u32) {
        for member in &rec.members {
            if let DeclKind::Record(nested) = &member.kind {
                if member.name.is_none() && !self.decls.contains_key(&member.id) {
                    let name = format_smolstr!("_anon{}", counter);
                    *counter += 1;
                    trace!(decl = %member.id, %name, "named nested anonymous record");
                    self.decls.insert(member.id, name);
                }
                self.name_members(member.id, nested, counter);
            }
        }

        for (i, field) in rec.fields.iter().enumerate() {
            if field.name.is_some() || field.bit_width.is_some() {
                continue;
            }
            let anon_index = match field.ty.desugar() {
                Type::Record(r) => self
                    .decls
                    .get(&r.id)
                    .and_then(|n| n.strip_prefix("_anon"))
                    .and_then(|n| n.parse::<u32>().ok()),
                _ => None,
            };
            let name = match anon_index {
                Some(n) => format_smolstr!("a{}_", n),
                None => format_smolstr!("_field{}", i),
            };
            self.fields.insert((id, i), name);
        }
    }

    /// Synthetic name of a declaration, if it was given one.
    pub fn get(&self, id: DeclId) -> Option<&SmolStr> {
        self.decls.get(&id)
    }

    /// Name to emit for a declaration: the synthetic one, else its own.
    pub fn decl_name(&self, decl: &Decl) -> SmolStr {
        self.decls
            .get(&decl.id)
            .cloned()
            .or_else(|| decl.name.clone())
            .unwrap_or_default()
    }

    /// Name to emit where a type refers to a declaration.
    pub fn ref_name(&self, r: &DeclRef) -> SmolStr {
        self.decls.get(&r.id).cloned().unwrap_or_else(|| r.name.clone())
    }

    /// Synthetic name of the `index`-th field of a record.
    pub fn field_name(&self, record: DeclId, index: usize) -> Option<&SmolStr> {
        self.fields.get(&(record, index))
    }
}
