//! Requests raised while printing expressions that change how a record
//! must be emitted.

use dgen_ast::DeclId;
use indexmap::IndexSet;
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedbackRequest {
    /// A temporary was bound to a reference parameter of this record type;
    /// its body needs the `RvalueRef` mixin for `.byRef`.
    RvalueRef { record: DeclId, name: SmolStr },
}

impl FeedbackRequest {
    pub fn record(&self) -> DeclId {
        match self {
            FeedbackRequest::RvalueRef { record, .. } => *record,
        }
    }
}

/// Insertion-ordered, de-duplicated queue of requests.
#[derive(Debug, Default)]
pub struct FeedbackQueue {
    pending: IndexSet<FeedbackRequest>,
}

impl FeedbackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: FeedbackRequest) {
        self.pending.insert(request);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return every request for `record`.
    pub fn take_for(&mut self, record: DeclId) -> Vec<FeedbackRequest> {
        let (taken, kept): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|r| r.record() == record);
        self.pending = kept.into_iter().collect();
        taken
    }

    pub fn drain(&mut self) -> Vec<FeedbackRequest> {
        self.pending.drain(..).collect()
    }
}
