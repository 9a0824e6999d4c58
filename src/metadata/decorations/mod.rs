//! Decorations: metadata annotations attachable to types, members and parameters.
//!
//! This module provides the decoration value model and the rules that govern combining
//! decorations from several sources.
//!
//! # Key Components
//!
//! - [`Decoration`]: A kind plus fixed and named arguments
//! - [`DecorationKind`]: The "attribute class" of a decoration, optionally deriving from another kind
//! - [`KindFilter`]: Selects decorations by kind (including derived kinds)
//! - [`UsagePolicy`] / [`UsageResolver`]: Multiplicity and inheritability per kind
//!
//! # Examples
//!
//! ```rust
//! use decorscope::metadata::decorations::{
//!     Decoration, DecorationKind, DecorationTargets, KindFilter, UsagePolicy,
//! };
//!
//! let display = DecorationKind::with_usage(
//!     "UI.DisplayAttribute",
//!     UsagePolicy::new(DecorationTargets::PROPERTY | DecorationTargets::FIELD),
//! );
//! let decoration = Decoration::new(&display).arg("Customer name");
//!
//! assert!(KindFilter::from(&display).admits(&decoration));
//! ```

pub(crate) mod merge;
mod types;
mod usage;

pub use types::{
    Decoration, DecorationArgument, DecorationKind, DecorationList, DecorationNamedArgument,
    DecorationValue,
};
pub use usage::{DecorationTargets, UsagePolicy, UsageResolver};

/// Selects decorations by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KindFilter {
    /// Every decoration
    #[default]
    Any,
    /// Decorations whose kind is, or derives from, the given kind
    Kind(DecorationKind),
}

impl KindFilter {
    /// Returns true if `decoration` passes the filter
    #[must_use]
    pub fn admits(&self, decoration: &Decoration) -> bool {
        match self {
            KindFilter::Any => true,
            KindFilter::Kind(kind) => decoration.kind().is_assignable_to(kind),
        }
    }
}

impl From<&DecorationKind> for KindFilter {
    fn from(kind: &DecorationKind) -> Self {
        KindFilter::Kind(kind.clone())
    }
}

impl From<DecorationKind> for KindFilter {
    fn from(kind: DecorationKind) -> Self {
        KindFilter::Kind(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_any() {
        let kind = DecorationKind::new("Tests.AnyAttribute");
        assert!(KindFilter::Any.admits(&Decoration::new(&kind)));
    }

    #[test]
    fn test_filter_by_base_kind() {
        let validation = DecorationKind::new("Tests.ValidationAttribute");
        let required = DecorationKind::derived("Tests.RequiredAttribute", &validation, None);
        let display = DecorationKind::new("Tests.DisplayAttribute");

        let filter = KindFilter::from(&validation);
        assert!(filter.admits(&Decoration::new(&required)));
        assert!(filter.admits(&Decoration::new(&validation)));
        assert!(!filter.admits(&Decoration::new(&display)));
    }
}
