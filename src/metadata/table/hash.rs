//! Method signature hashing for table keys.
//!
//! [`SignatureHash`] computes the hash a [`crate::metadata::table::MethodKey`] carries. The hash
//! uses FNV-1a inspired sequential mixing, so component order matters and repeated components
//! never cancel out (`Method(T, T)` and `Method()` hash differently).

use std::hash::{DefaultHasher, Hash, Hasher};

/// Hash builder for method signatures using FNV-1a inspired mixing
pub(crate) struct SignatureHash {
    state: u64,
}

impl SignatureHash {
    /// Create a new signature hash builder, seeded with the FNV-1a offset basis
    #[must_use]
    pub(crate) fn new() -> Self {
        SignatureHash {
            state: 0xcbf2_9ce4_8422_2325_u64,
        }
    }

    fn mix(&mut self, value: u64) {
        self.state ^= value;
        self.state = self.state.wrapping_mul(0x0100_0000_01b3_u64);

        self.state ^= self.state >> 33;
        self.state = self.state.wrapping_mul(0xff51_afd7_ed55_8ccd_u64);
        self.state ^= self.state >> 33;
    }

    /// Add a hashable component to the signature
    #[must_use]
    pub(crate) fn add_component<T: Hash + ?Sized>(mut self, component: &T) -> Self {
        let mut hasher = DefaultHasher::new();
        component.hash(&mut hasher);
        self.mix(hasher.finish());
        self
    }

    /// Add a count (generic arity, parameter count) to the signature
    #[must_use]
    pub(crate) fn add_count(mut self, count: usize) -> Self {
        self.mix(count as u64);
        self
    }

    /// The computed signature hash
    #[must_use]
    pub(crate) fn finalize(self) -> u64 {
        self.state
    }
}
