//! Metadata identity for native entities.
//!
//! Every entity defined in a [`crate::metadata::typesystem::TypeUniverse`] receives a [`Token`]
//! laid out like an ECMA-335 metadata token (table byte + 1-based row). Because several universes
//! can coexist in one process, the globally unique identity of an entity is the pair
//! ([`UniverseId`], [`Token`]) exposed as [`EntityId`].
//!
//! Generic instantiations share the identity of their definition, the same way
//! `typeof(List<int>).MetadataToken == typeof(List<>).MetadataToken` holds on the CLR. This is what
//! makes table lookups insensitive to generic arguments.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::{Error, Result};

/// Table identifiers used in the high byte of a [`Token`]
#[allow(non_snake_case, missing_docs)]
pub mod TABLE {
    pub const TYPE_DEF: u8 = 0x02;
    pub const FIELD: u8 = 0x04;
    pub const METHOD_DEF: u8 = 0x06;
    pub const EVENT: u8 = 0x14;
    pub const PROPERTY: u8 = 0x17;
    pub const ASSEMBLY: u8 = 0x20;
    pub const GENERIC_PARAM: u8 = 0x2A;
}

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Highest row a token can address
    pub const MAX_ROW: u32 = 0x00FF_FFFF;

    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token for the 0-based arena index `index` of `table`
    ///
    /// # Errors
    /// Returns [`Error::TableFull`] if the row `index + 1` does not fit into 24 bits.
    pub fn from_index(table: u8, index: usize) -> Result<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|index| index.checked_add(1))
            .filter(|row| *row <= Self::MAX_ROW)
            .map(|row| Token((u32::from(table) << 24) | row))
            .ok_or(Error::TableFull { table })
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

static NEXT_UNIVERSE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identifier of a type universe
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UniverseId(u32);

impl UniverseId {
    /// Allocate a fresh identifier
    pub(crate) fn next() -> Self {
        UniverseId(NEXT_UNIVERSE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Globally unique identity of a metadata definition
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId {
    /// The universe that defined the entity
    pub universe: UniverseId,
    /// The entity's token within its universe
    pub token: Token,
}

impl EntityId {
    /// Create a new identity
    #[must_use]
    pub fn new(universe: UniverseId, token: Token) -> Self {
        EntityId { universe, token }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.universe.0, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_token_from_index() {
        let token = Token::from_index(TABLE::METHOD_DEF, 0).unwrap();
        assert_eq!(token.value(), 0x06000001);
        assert_eq!(token.table(), TABLE::METHOD_DEF);
        assert_eq!(token.row(), 1);

        let token = Token::from_index(TABLE::TYPE_DEF, 4).unwrap();
        assert_eq!(token.value(), 0x02000005);
    }

    #[test]
    fn test_token_from_index_rejects_overflow() {
        let last = Token::from_index(TABLE::FIELD, 0x00FF_FFFE).unwrap();
        assert_eq!(last.row(), Token::MAX_ROW);
        assert_eq!(last.table(), TABLE::FIELD);

        assert!(matches!(
            Token::from_index(TABLE::FIELD, 0x00FF_FFFF),
            Err(Error::TableFull { table: TABLE::FIELD })
        ));
        assert!(matches!(
            Token::from_index(TABLE::TYPE_DEF, usize::MAX),
            Err(Error::TableFull { .. })
        ));
    }

    #[test]
    fn test_token_row_and_table() {
        let token = Token(0x06FFFFFF);
        assert_eq!(token.row(), 0x00FFFFFF);
        assert_eq!(token.table(), 0x06);
    }

    #[test]
    fn test_token_is_null() {
        assert!(Token(0).is_null());
        assert!(!Token(0x06000001).is_null());
    }

    #[test]
    fn test_token_display_and_debug() {
        let token = Token(0x06000001);
        assert_eq!(format!("{}", token), "0x06000001");

        let debug_str = format!("{:?}", token);
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_universe_ids_unique() {
        let a = UniverseId::next();
        let b = UniverseId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entity_id_as_key() {
        let universe = UniverseId::next();
        let other = UniverseId::next();
        let token = Token::from_index(TABLE::TYPE_DEF, 0).unwrap();

        let mut map = HashMap::new();
        map.insert(EntityId::new(universe, token), "first");
        map.insert(EntityId::new(other, token), "second");

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&EntityId::new(universe, token)), Some(&"first"));
    }
}
