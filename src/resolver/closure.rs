//! Transitive-closure expansion over the screened candidate set.
//!
//! Pure set computation, no I/O: undetermined candidates are promoted when
//! one of their declared dependencies is already accepted, pass by pass,
//! until a pass promotes nothing.

use log::debug;
use std::collections::HashSet;
use std::mem;

use crate::package::PackageMetadata;

/// Owned state of one closure run: identifiers already accepted plus the
/// metadata records whose relevance is still undetermined.
pub struct WorkingSet {
    accepted: HashSet<String>,
    pending: Vec<PackageMetadata>,
}

impl WorkingSet {
    /// Panics if an identity appears in both collections; that state is a
    /// pipeline defect, not a recoverable input.
    pub fn new(accepted: HashSet<String>, pending: Vec<PackageMetadata>) -> Self {
        for record in &pending {
            assert!(
                !accepted.contains(&record.identity.id),
                "identity {} is both accepted and pending",
                record.identity.id
            );
        }
        WorkingSet { accepted, pending }
    }

    /// Breadth-first fixed point: each pass promotes every pending record
    /// declaring a dependency on the current accepted set, and the batch is
    /// applied only between passes, so same-pass siblings never see each
    /// other. Promoted records are returned in discovery order.
    pub fn expand(mut self) -> Vec<PackageMetadata> {
        let mut promoted = Vec::new();
        let mut pass = 0;

        loop {
            pass += 1;
            let pending = mem::take(&mut self.pending);
            let remaining = pending.len();

            let (batch, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(|record| {
                record
                    .dependency_ids()
                    .any(|id| self.accepted.contains(id))
            });
            self.pending = rest;

            debug!(
                "Closure pass {} promoted {} of {} pending",
                pass,
                batch.len(),
                remaining
            );

            if batch.is_empty() {
                return promoted;
            }

            for record in batch {
                self.accepted.insert(record.identity.id.clone());
                promoted.push(record);
            }
        }
    }
}
