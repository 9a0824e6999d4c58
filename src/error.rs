use thiserror::Error;

use crate::metadata::reflection::MemberKind;

macro_rules! invalid_argument {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvalidArgument($msg.to_string())
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidArgument(format!($fmt, $($arg)*))
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// All failures are local and synchronous. Operations that mutate state (table builders, type
/// definitions) validate their input before changing anything, so an error never leaves a
/// partially applied change behind.
///
/// # Error Categories
///
/// ## Argument Errors
/// - [`Error::InvalidArgument`] - An argument is out of range or inconsistent
/// - [`Error::MemberNotFound`] - A named member does not exist on the given type
/// - [`Error::NotDeclared`] - A member is only inherited, not declared, by the given type
/// - [`Error::AmbiguousMatch`] - A lookup matched more than one overload
/// - [`Error::NotSupported`] - The entity kind is not supported by the operation
///
/// ## Type System Errors
/// - [`Error::TypeInsert`] - Failed to register a new type in a universe
/// - [`Error::TypeNotFound`] - Requested type not found
/// - [`Error::MemberInsert`] - A member with the same identity is already declared on the type
/// - [`Error::TableFull`] - A metadata table has no row left for a new entity
///
/// # Examples
///
/// ```rust
/// use decorscope::{prelude::*, Error};
///
/// let universe = TypeUniverse::new();
/// let assembly = universe.define_assembly("Samples")?;
/// let customer = TypeBuilder::class("Customer").namespace("Samples").build(&assembly)?;
///
/// let display = DecorationKind::new("UI.DisplayAttribute");
/// let mut builder = MetadataTableBuilder::new();
/// match builder.add_property_decorations(&customer, "Missing", [Decoration::new(&display)]) {
///     Err(Error::MemberNotFound { name, .. }) => assert_eq!(name, "Missing"),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// # Ok::<(), decorscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An argument is invalid.
    ///
    /// Raised for out-of-range parameter positions, members without a declaring type,
    /// definitions referencing entities of another type, or instantiations with the wrong
    /// number of generic arguments.
    #[error("Invalid argument - {0}")]
    InvalidArgument(String),

    /// The named member does not exist on the specified declaring type.
    #[error("No {kind} named '{name}' is declared on '{type_name}'")]
    MemberNotFound {
        /// Kind of the member that was looked up
        kind: MemberKind,
        /// Name that was looked up
        name: String,
        /// Full name of the type that was searched
        type_name: String,
    },

    /// The member is visible on the type only through inheritance.
    ///
    /// Decorations are attached per concrete declaration, so the declaring type of the member
    /// must be the type the caller names.
    #[error("'{name}' is not declared on '{type_name}'")]
    NotDeclared {
        /// Name of the member
        name: String,
        /// Full name of the type the caller named
        type_name: String,
    },

    /// More than one member matched a lookup.
    #[error("Ambiguous match for '{name}' on '{type_name}'")]
    AmbiguousMatch {
        /// Name that was looked up
        name: String,
        /// Full name of the type that was searched
        type_name: String,
    },

    /// The entity kind is not supported by this operation.
    #[error("Operation not supported - {0}")]
    NotSupported(String),

    /// Failed to insert new type into a `TypeUniverse`.
    ///
    /// Occurs when a type with the same full name already exists.
    #[error("Failed to insert new type into TypeUniverse - {0}")]
    TypeInsert(String),

    /// Failed to find type in a `TypeUniverse`.
    #[error("Failed to find type - {0}")]
    TypeNotFound(String),

    /// Failed to insert a new member into a type definition.
    ///
    /// Occurs when the type already declares a field, property or event of the same name, or a
    /// method or constructor with the same name, generic arity and parameter signature.
    #[error("Failed to insert new member - {0}")]
    MemberInsert(String),

    /// A metadata table has run out of rows.
    ///
    /// Rows are addressed by the low 24 bits of a [`crate::metadata::token::Token`].
    #[error("Metadata table 0x{table:02x} is full")]
    TableFull {
        /// The table byte of the exhausted table
        table: u8,
    },
}
