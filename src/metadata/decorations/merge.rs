//! The decoration merge shared by native queries and projections.
//!
//! Results are assembled in a fixed order: declared (table) decorations, then the entity's own
//! native decorations, then one level per ancestor along the inheritance chain (nearest first).
//!
//! * Declared decorations are appended unconditionally.
//! * A native decoration is appended if its kind allows multiple instances or no decoration of
//!   the exact same kind is present yet.
//! * An ancestor decoration is appended only if its kind is inherited and, in addition, allows
//!   multiple instances or is not yet present.
//!
//! Each ancestor level is the ancestor's own non-inherited view. Walking the levels in order
//! yields the same result as querying the parent recursively with inheritance, without the
//! recursion.

use crate::metadata::decorations::{Decoration, KindFilter, UsageResolver};

/// Accumulates a kind-filtered decoration list
pub(crate) struct DecorationMerge<'a> {
    usage: &'a UsageResolver,
    filter: &'a KindFilter,
    items: Vec<Decoration>,
}

impl<'a> DecorationMerge<'a> {
    /// Start an empty merge
    pub(crate) fn new(usage: &'a UsageResolver, filter: &'a KindFilter) -> Self {
        DecorationMerge {
            usage,
            filter,
            items: Vec::new(),
        }
    }

    fn contains_kind(&self, decoration: &Decoration) -> bool {
        self.items
            .iter()
            .any(|present| present.kind() == decoration.kind())
    }

    /// Append table-declared decorations
    pub(crate) fn declared(mut self, decorations: &[Decoration]) -> Self {
        self.items.extend(
            decorations
                .iter()
                .filter(|decoration| self.filter.admits(decoration))
                .cloned(),
        );
        self
    }

    /// Append the entity's own native decorations
    pub(crate) fn native(mut self, decorations: impl IntoIterator<Item = Decoration>) -> Self {
        for decoration in decorations {
            if !self.filter.admits(&decoration) {
                continue;
            }

            let policy = self.usage.resolve(decoration.kind());
            if policy.allow_multiple || !self.contains_kind(&decoration) {
                self.items.push(decoration);
            } else {
                tracing::trace!(kind = %decoration.kind(), "suppressed duplicate single-use decoration");
            }
        }
        self
    }

    /// Append one ancestor level
    pub(crate) fn inherited(mut self, decorations: impl IntoIterator<Item = Decoration>) -> Self {
        for decoration in decorations {
            if !self.filter.admits(&decoration) {
                continue;
            }

            let policy = self.usage.resolve(decoration.kind());
            if policy.inherited && (policy.allow_multiple || !self.contains_kind(&decoration)) {
                self.items.push(decoration);
            }
        }
        self
    }

    /// Append every level of an ancestor chain
    pub(crate) fn ancestors<I, L>(self, levels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = Decoration>,
    {
        levels
            .into_iter()
            .fold(self, |merge, level| merge.inherited(level))
    }

    /// The accumulated result
    pub(crate) fn finish(self) -> Vec<Decoration> {
        self.items
    }
}
