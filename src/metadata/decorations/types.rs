//! Decoration values, kinds and argument types.
//!
//! A [`Decoration`] is a kind plus constructor-style fixed arguments and named (field/property)
//! arguments, mirroring the shape of a parsed custom attribute blob (ECMA-335 II.23.3).

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::metadata::decorations::UsagePolicy;

/// A list of decorations, as stored on native entities and in the metadata table
pub type DecorationList = Vec<Decoration>;

/// Represents a single decoration argument value
#[derive(Debug, Clone, PartialEq)]
pub enum DecorationArgument {
    /// Boolean value
    Bool(bool),
    /// Character value
    Char(char),
    /// Signed 32-bit integer
    I4(i32),
    /// Unsigned 32-bit integer
    U4(u32),
    /// Signed 64-bit integer
    I8(i64),
    /// Unsigned 64-bit integer
    U8(u64),
    /// 64-bit floating point
    R8(f64),
    /// UTF-8 string
    String(String),
    /// Type reference (as full name)
    Type(String),
    /// Array of arguments
    Array(Vec<DecorationArgument>),
    /// Enum value (enum type name + underlying value)
    Enum(String, Box<DecorationArgument>),
}

impl fmt::Display for DecorationArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecorationArgument::Bool(value) => write!(f, "{value}"),
            DecorationArgument::Char(value) => write!(f, "'{value}'"),
            DecorationArgument::I4(value) => write!(f, "{value}"),
            DecorationArgument::U4(value) => write!(f, "{value}"),
            DecorationArgument::I8(value) => write!(f, "{value}"),
            DecorationArgument::U8(value) => write!(f, "{value}"),
            DecorationArgument::R8(value) => write!(f, "{value}"),
            DecorationArgument::String(value) => write!(f, "\"{value}\""),
            DecorationArgument::Type(value) => write!(f, "typeof({value})"),
            DecorationArgument::Array(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            DecorationArgument::Enum(name, value) => write!(f, "({name}){value}"),
        }
    }
}

impl From<bool> for DecorationArgument {
    fn from(value: bool) -> Self {
        DecorationArgument::Bool(value)
    }
}

impl From<i32> for DecorationArgument {
    fn from(value: i32) -> Self {
        DecorationArgument::I4(value)
    }
}

impl From<i64> for DecorationArgument {
    fn from(value: i64) -> Self {
        DecorationArgument::I8(value)
    }
}

impl From<f64> for DecorationArgument {
    fn from(value: f64) -> Self {
        DecorationArgument::R8(value)
    }
}

impl From<&str> for DecorationArgument {
    fn from(value: &str) -> Self {
        DecorationArgument::String(value.to_string())
    }
}

impl From<String> for DecorationArgument {
    fn from(value: String) -> Self {
        DecorationArgument::String(value)
    }
}

/// Represents a named argument (field or property) of a decoration
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationNamedArgument {
    /// Whether this is a field (true) or property (false)
    pub is_field: bool,
    /// Name of the field or property
    pub name: String,
    /// Value of the argument
    pub value: DecorationArgument,
}

struct KindData {
    name: String,
    base: Option<DecorationKind>,
    usage: Option<UsagePolicy>,
}

/// The kind ("attribute class") of a decoration.
///
/// Kinds are compared by their fully qualified name. A kind may derive from another kind; a
/// [`crate::metadata::decorations::KindFilter`] on the base admits decorations of derived kinds.
/// The declared [`UsagePolicy`] is optional, resolution falls back to base kinds and finally to
/// [`UsagePolicy::DEFAULT`].
#[derive(Clone)]
pub struct DecorationKind(Arc<KindData>);

impl DecorationKind {
    /// Create a kind without declared usage
    pub fn new(name: impl Into<String>) -> Self {
        DecorationKind(Arc::new(KindData {
            name: name.into(),
            base: None,
            usage: None,
        }))
    }

    /// Create a kind with a declared usage policy
    pub fn with_usage(name: impl Into<String>, usage: UsagePolicy) -> Self {
        DecorationKind(Arc::new(KindData {
            name: name.into(),
            base: None,
            usage: Some(usage),
        }))
    }

    /// Create a kind deriving from `base`, optionally declaring its own usage
    pub fn derived(name: impl Into<String>, base: &DecorationKind, usage: Option<UsagePolicy>) -> Self {
        DecorationKind(Arc::new(KindData {
            name: name.into(),
            base: Some(base.clone()),
            usage,
        }))
    }

    /// Fully qualified name of the kind
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The kind this one derives from
    #[must_use]
    pub fn base(&self) -> Option<&DecorationKind> {
        self.0.base.as_ref()
    }

    /// Address of the shared kind data; distinct for kinds created separately, even under one
    /// name
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// The usage declared directly on this kind, without consulting base kinds
    #[must_use]
    pub fn declared_usage(&self) -> Option<UsagePolicy> {
        self.0.usage
    }

    /// Returns true if this kind is `other` or derives from it
    #[must_use]
    pub fn is_assignable_to(&self, other: &DecorationKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.base();
        }
        false
    }
}

impl PartialEq for DecorationKind {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.name == other.0.name
    }
}

impl Eq for DecorationKind {}

impl Hash for DecorationKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl fmt::Debug for DecorationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecorationKind({})", self.0.name)
    }
}

impl fmt::Display for DecorationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// The content of a decoration
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationValue {
    /// The decoration kind
    pub kind: DecorationKind,
    /// Fixed (constructor) arguments
    pub fixed_args: Vec<DecorationArgument>,
    /// Named arguments (fields and properties)
    pub named_args: Vec<DecorationNamedArgument>,
}

/// A metadata annotation attachable to a type, member or parameter.
///
/// Cheap to clone; the value is shared. Two decorations are equal when kind and all arguments
/// are equal.
#[derive(Clone, PartialEq)]
pub struct Decoration(Arc<DecorationValue>);

impl Decoration {
    /// Create a decoration without arguments
    #[must_use]
    pub fn new(kind: &DecorationKind) -> Self {
        Decoration(Arc::new(DecorationValue {
            kind: kind.clone(),
            fixed_args: Vec::new(),
            named_args: Vec::new(),
        }))
    }

    /// Append a fixed argument
    #[must_use]
    pub fn arg(mut self, value: impl Into<DecorationArgument>) -> Self {
        Arc::make_mut(&mut self.0).fixed_args.push(value.into());
        self
    }

    /// Append a named property argument
    #[must_use]
    pub fn property(mut self, name: &str, value: impl Into<DecorationArgument>) -> Self {
        Arc::make_mut(&mut self.0).named_args.push(DecorationNamedArgument {
            is_field: false,
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    /// Append a named field argument
    #[must_use]
    pub fn field(mut self, name: &str, value: impl Into<DecorationArgument>) -> Self {
        Arc::make_mut(&mut self.0).named_args.push(DecorationNamedArgument {
            is_field: true,
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    /// The runtime kind of this decoration
    #[must_use]
    pub fn kind(&self) -> &DecorationKind {
        &self.0.kind
    }

    /// Fixed arguments
    #[must_use]
    pub fn fixed_args(&self) -> &[DecorationArgument] {
        &self.0.fixed_args
    }

    /// Named arguments
    #[must_use]
    pub fn named_args(&self) -> &[DecorationNamedArgument] {
        &self.0.named_args
    }

    /// Looks up a named argument by name
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&DecorationArgument> {
        self.0
            .named_args
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }
}

impl fmt::Debug for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.0.kind)?;
        let mut first = true;
        for arg in &self.0.fixed_args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{arg}")?;
        }
        for arg in &self.0.named_args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{} = {}", arg.name, arg.value)?;
        }
        write!(f, ")")
    }
}
