//! Usage policies of decoration kinds.
//!
//! A [`UsagePolicy`] answers two questions for every merge: may several instances of a kind
//! coexist on one member (`allow_multiple`), and does the kind propagate to overriding and
//! derived members (`inherited`). Policies are declared on the kind, looked up along the kind's
//! base chain, and default to [`UsagePolicy::DEFAULT`].

use bitflags::bitflags;
use dashmap::DashMap;

use crate::metadata::decorations::DecorationKind;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Targets a decoration kind may be applied to
    pub struct DecorationTargets: u32 {
        /// Assemblies
        const ASSEMBLY = 0x0001;
        /// Modules
        const MODULE = 0x0002;
        /// Classes
        const CLASS = 0x0004;
        /// Value types
        const STRUCT = 0x0008;
        /// Enumerations
        const ENUM = 0x0010;
        /// Constructors
        const CONSTRUCTOR = 0x0020;
        /// Methods
        const METHOD = 0x0040;
        /// Properties
        const PROPERTY = 0x0080;
        /// Fields
        const FIELD = 0x0100;
        /// Events
        const EVENT = 0x0200;
        /// Interfaces
        const INTERFACE = 0x0400;
        /// Parameters
        const PARAMETER = 0x0800;
        /// Delegates
        const DELEGATE = 0x1000;
        /// Return values
        const RETURN_VALUE = 0x2000;
        /// Generic parameters
        const GENERIC_PARAMETER = 0x4000;
        /// Every target
        const ALL = 0x7FFF;
    }
}

/// Multiplicity and inheritability of a decoration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsagePolicy {
    /// Targets the kind is declared valid on
    pub valid_on: DecorationTargets,
    /// More than one instance may coexist on one member
    pub allow_multiple: bool,
    /// Propagates to overriding / derived members
    pub inherited: bool,
}

impl UsagePolicy {
    /// The policy of kinds that declare none: every target, single instance, inherited
    pub const DEFAULT: UsagePolicy = UsagePolicy {
        valid_on: DecorationTargets::ALL,
        allow_multiple: false,
        inherited: true,
    };

    /// Create a policy for `valid_on` with the default multiplicity and inheritance
    #[must_use]
    pub const fn new(valid_on: DecorationTargets) -> Self {
        UsagePolicy {
            valid_on,
            allow_multiple: false,
            inherited: true,
        }
    }

    /// Set `allow_multiple`
    #[must_use]
    pub const fn allow_multiple(mut self, allow_multiple: bool) -> Self {
        self.allow_multiple = allow_multiple;
        self
    }

    /// Set `inherited`
    #[must_use]
    pub const fn inherited(mut self, inherited: bool) -> Self {
        self.inherited = inherited;
        self
    }

    /// Returns true if the policy admits `target`
    #[must_use]
    pub fn is_valid_on(&self, target: DecorationTargets) -> bool {
        self.valid_on.intersects(target)
    }
}

impl Default for UsagePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Resolves the effective [`UsagePolicy`] of decoration kinds.
///
/// Resolution is memoised per kind instance, not per name: two kinds sharing a name but
/// declaring different usage each resolve to their own policy. The cache holds a clone of every
/// kind it has seen, so a cached address is never reused by another kind.
#[derive(Debug, Default)]
pub struct UsageResolver {
    cache: DashMap<usize, (DecorationKind, UsagePolicy)>,
}

impl UsageResolver {
    /// Create an empty resolver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective policy of `kind`: declared usage of the kind, else of its nearest base kind
    /// declaring one, else [`UsagePolicy::DEFAULT`]
    pub fn resolve(&self, kind: &DecorationKind) -> UsagePolicy {
        if let Some(cached) = self.cache.get(&kind.identity()) {
            return cached.1;
        }

        let policy = resolve_uncached(kind);
        self.cache.insert(kind.identity(), (kind.clone(), policy));
        policy
    }
}

fn resolve_uncached(kind: &DecorationKind) -> UsagePolicy {
    let mut current = Some(kind);
    while let Some(kind) = current {
        if let Some(policy) = kind.declared_usage() {
            return policy;
        }
        current = kind.base();
    }
    UsagePolicy::DEFAULT
}
