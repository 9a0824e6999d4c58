//! Fluent builders defining native entities in a [`TypeUniverse`].
//!
//! Every builder validates its complete input before touching the universe, so a failed
//! `build` leaves no partially defined entity behind.
//!
//! # Example
//!
//! ```rust
//! use decorscope::prelude::*;
//!
//! let universe = TypeUniverse::new();
//! let assembly = universe.define_assembly("Samples")?;
//! let string = universe.primitive(PrimitiveKind::String);
//!
//! let list = TypeBuilder::class("List`1")
//!     .namespace("Samples")
//!     .generic_params(["T"])
//!     .build(&assembly)?;
//! MethodBuilder::new("Add")
//!     .param("item", TypeArg::TypeParameter(0))
//!     .build(&list)?;
//!
//! let strings = list.instantiate(&[string])?;
//! assert_eq!(strings.full_name(), "Samples.List`1[System.String]");
//! # Ok::<(), decorscope::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    metadata::{
        decorations::Decoration,
        reflection::{
            GenericOwner, GenericPosition, MemberInfo, MemberKind, MethodFlags, TypeFlavor,
            TypeInfo, CONSTRUCTOR_NAME,
        },
        table::{MethodKey, TypeSig},
        token::Token,
        typesystem::{
            EventEntry, FieldEntry, MethodEntry, NativeAssembly, NativeEvent, NativeField,
            NativeMethod, NativeProperty, NativeType, ParamEntry, PrimitiveKind, PropertyEntry,
            TypeEntry, TypeShape, TypeUniverse,
        },
    },
    Error, Result,
};

/// A type reference in a definition signature
#[derive(Clone, Debug)]
pub enum TypeArg {
    /// An existing type of the same universe
    Type(NativeType),
    /// Formal type parameter of the declaring type, by position
    TypeParameter(u16),
    /// Formal method parameter of the method being defined, by position
    MethodParameter(u16),
    /// A generic type definition instantiated with arguments
    Generic(NativeType, Vec<TypeArg>),
}

impl TypeArg {
    /// Shorthand for [`TypeArg::Generic`]
    #[must_use]
    pub fn generic(definition: &NativeType, args: impl IntoIterator<Item = TypeArg>) -> Self {
        TypeArg::Generic(definition.clone(), args.into_iter().collect())
    }

    fn check(&self, universe: &TypeUniverse, type_arity: usize, method_arity: usize) -> Result<()> {
        match self {
            TypeArg::Type(ty) => check_universe(universe, ty),
            TypeArg::TypeParameter(index) if usize::from(*index) < type_arity => Ok(()),
            TypeArg::TypeParameter(index) => Err(invalid_argument!(
                "type parameter !{} is out of range (declaring type has {} generic parameters)",
                index,
                type_arity
            )),
            TypeArg::MethodParameter(index) if usize::from(*index) < method_arity => Ok(()),
            TypeArg::MethodParameter(index) => Err(invalid_argument!(
                "method parameter !!{} is out of range (method has {} generic parameters)",
                index,
                method_arity
            )),
            TypeArg::Generic(definition, args) => {
                check_universe(universe, definition)?;
                if !definition.is_open_definition() {
                    return Err(invalid_argument!(
                        "'{}' is not a generic type definition",
                        definition.full_name_string()
                    ));
                }
                let arity = definition.entry().generic_params.count();
                if arity != args.len() {
                    return Err(invalid_argument!(
                        "'{}' expects {} generic arguments, got {}",
                        definition.full_name_string(),
                        arity,
                        args.len()
                    ));
                }
                args.iter()
                    .try_for_each(|arg| arg.check(universe, type_arity, method_arity))
            }
        }
    }

    fn resolve(&self, type_params: &[usize], method_params: &[usize]) -> Result<TypeShape> {
        match self {
            TypeArg::Type(ty) => Ok(ty.shape().clone()),
            TypeArg::TypeParameter(index) => type_params
                .get(usize::from(*index))
                .map(|param| TypeShape::Definition(*param))
                .ok_or_else(|| invalid_argument!("type parameter !{} is out of range", index)),
            TypeArg::MethodParameter(index) => method_params
                .get(usize::from(*index))
                .map(|param| TypeShape::Definition(*param))
                .ok_or_else(|| invalid_argument!("method parameter !!{} is out of range", index)),
            TypeArg::Generic(definition, args) => Ok(TypeShape::Instance {
                definition: definition.shape().definition(),
                args: args
                    .iter()
                    .map(|arg| arg.resolve(type_params, method_params))
                    .collect::<Result<Arc<[TypeShape]>>>()?,
            }),
        }
    }

    /// Normalized signature, as a [`MethodKey`] records it
    fn signature(&self) -> TypeSig {
        match self {
            TypeArg::Type(ty) => TypeSig::of(&ty.rc()),
            TypeArg::TypeParameter(index) => TypeSig::TypeParameter(*index),
            TypeArg::MethodParameter(index) => TypeSig::MethodParameter(*index),
            TypeArg::Generic(definition, args) => TypeSig::Instance(
                definition.metadata_id(),
                args.iter().map(TypeArg::signature).collect(),
            ),
        }
    }

    /// Flavor of the referenced type; `None` for formal parameters
    fn flavor(&self) -> Option<TypeFlavor> {
        match self {
            TypeArg::Type(ty) | TypeArg::Generic(ty, _) => Some(ty.entry().flavor),
            TypeArg::TypeParameter(_) | TypeArg::MethodParameter(_) => None,
        }
    }
}

impl From<&NativeType> for TypeArg {
    fn from(ty: &NativeType) -> Self {
        TypeArg::Type(ty.clone())
    }
}

impl From<NativeType> for TypeArg {
    fn from(ty: NativeType) -> Self {
        TypeArg::Type(ty)
    }
}

fn check_universe(universe: &TypeUniverse, ty: &NativeType) -> Result<()> {
    if ty.universe().id() == universe.id() {
        Ok(())
    } else {
        Err(invalid_argument!(
            "'{}' belongs to another type universe",
            ty.full_name_string()
        ))
    }
}

/// The owner of a member must be a type definition of the builder's universe
fn check_owner(owner: &NativeType, what: &str) -> Result<()> {
    if !matches!(owner.shape(), TypeShape::Definition(_)) {
        return Err(invalid_argument!(
            "{} can only be declared on type definitions, not on '{}'",
            what,
            owner.full_name_string()
        ));
    }
    if owner.entry().flavor == TypeFlavor::GenericParameter {
        return Err(invalid_argument!(
            "{} cannot be declared on generic parameter '{}'",
            what,
            owner.full_name_string()
        ));
    }
    Ok(())
}

fn check_generic_count(count: usize) -> Result<()> {
    if u16::try_from(count).is_err() {
        return Err(invalid_argument!("too many generic parameters: {}", count));
    }
    Ok(())
}

fn duplicate_member(owner: &NativeType, kind: MemberKind, name: &str) -> Error {
    Error::MemberInsert(format!(
        "{} '{}' is already declared on '{}'",
        kind,
        name,
        owner.full_name_string()
    ))
}

fn type_params_of(owner: &NativeType) -> Vec<usize> {
    owner
        .entry()
        .generic_params
        .iter()
        .map(|(_, param)| *param)
        .collect()
}

fn generic_parameter_entry(
    name: String,
    assembly: usize,
    enclosing: usize,
    position: GenericPosition,
) -> TypeEntry {
    let mut entry = TypeEntry::new(name, String::new(), assembly, TypeFlavor::GenericParameter);
    entry.generic = Some(position);
    entry.enclosing = Some(enclosing);
    entry
}

/// Provides a fluent API for defining types
pub struct TypeBuilder {
    name: String,
    namespace: String,
    flavor: TypeFlavor,
    base: Option<TypeArg>,
    interfaces: Vec<TypeArg>,
    generic_params: Vec<String>,
    enclosing: Option<NativeType>,
    decorations: Vec<Decoration>,
}

impl TypeBuilder {
    fn new(name: &str, flavor: TypeFlavor) -> Self {
        TypeBuilder {
            name: name.to_string(),
            namespace: String::new(),
            flavor,
            base: None,
            interfaces: Vec::new(),
            generic_params: Vec::new(),
            enclosing: None,
            decorations: Vec::new(),
        }
    }

    /// Start defining a class
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self::new(name, TypeFlavor::Class)
    }

    /// Start defining an interface
    #[must_use]
    pub fn interface(name: &str) -> Self {
        Self::new(name, TypeFlavor::Interface)
    }

    /// Start defining a value type
    #[must_use]
    pub fn value_type(name: &str) -> Self {
        Self::new(name, TypeFlavor::Struct)
    }

    /// Set the namespace (ignored for nested types)
    #[must_use]
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    /// Set the base type. Classes and value types default to `System.Object`.
    #[must_use]
    pub fn base(mut self, base: impl Into<TypeArg>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Add an implemented interface
    #[must_use]
    pub fn implements(mut self, interface: impl Into<TypeArg>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Declare formal generic parameters
    #[must_use]
    pub fn generic_params<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.generic_params.extend(names.into_iter().map(Into::into));
        self
    }

    /// Nest the new type inside `outer`
    #[must_use]
    pub fn nested_in(mut self, outer: &NativeType) -> Self {
        self.enclosing = Some(outer.clone());
        self
    }

    /// Add a native decoration
    #[must_use]
    pub fn decoration(mut self, decoration: Decoration) -> Self {
        self.decorations.push(decoration);
        self
    }

    /// Add native decorations
    #[must_use]
    pub fn decorations(mut self, decorations: impl IntoIterator<Item = Decoration>) -> Self {
        self.decorations.extend(decorations);
        self
    }

    /// Define the type in `assembly`
    ///
    /// # Errors
    /// Returns [`Error::TypeInsert`] if a type with the same full name exists, and
    /// [`Error::InvalidArgument`] for an invalid base type, interface or enclosing type.
    pub fn build(self, assembly: &NativeAssembly) -> Result<NativeType> {
        let universe = assembly.universe();
        let arity = self.generic_params.len();
        check_generic_count(arity)?;

        let full_name = match &self.enclosing {
            Some(outer) => {
                check_universe(universe, outer)?;
                check_owner(outer, "nested types")?;
                if outer.entry().assembly != assembly.index() {
                    return Err(invalid_argument!(
                        "'{}' is defined in another assembly",
                        outer.full_name_string()
                    ));
                }
                format!("{}+{}", outer.full_name_string(), self.name)
            }
            None if self.namespace.is_empty() => self.name.clone(),
            None => format!("{}.{}", self.namespace, self.name),
        };
        if universe.contains_fullname(&full_name) {
            return Err(Error::TypeInsert(format!("'{full_name}' is already defined")));
        }

        if let Some(base) = &self.base {
            if self.flavor == TypeFlavor::Interface {
                return Err(invalid_argument!(
                    "interface '{}' cannot have a base type",
                    full_name
                ));
            }
            base.check(universe, arity, 0)?;
            if !matches!(base.flavor(), Some(TypeFlavor::Class | TypeFlavor::Struct)) {
                return Err(invalid_argument!(
                    "base type of '{}' must be a class or value type",
                    full_name
                ));
            }
        }
        for interface in &self.interfaces {
            interface.check(universe, arity, 0)?;
            if interface.flavor() != Some(TypeFlavor::Interface) {
                return Err(invalid_argument!(
                    "'{}' can only implement interfaces",
                    full_name
                ));
            }
        }

        let (namespace, enclosing) = match &self.enclosing {
            Some(outer) => (String::new(), Some(outer.shape().definition())),
            None => (self.namespace, None),
        };
        universe.check_type_rows(1 + arity)?;
        let mut entry = TypeEntry::new(self.name, namespace, assembly.index(), self.flavor);
        entry.enclosing = enclosing;
        entry.decorations = self.decorations;
        let index = universe.push_type(entry)?;

        for (position, name) in self.generic_params.into_iter().enumerate() {
            let param = universe.push_type(generic_parameter_entry(
                name,
                assembly.index(),
                index,
                GenericPosition {
                    owner: GenericOwner::Type,
                    index: u16::try_from(position).unwrap_or(u16::MAX),
                },
            ))?;
            universe.type_entry(index).generic_params.push(param);
        }

        let ty = NativeType::new(universe.clone(), TypeShape::Definition(index));
        let type_params = type_params_of(&ty);
        let base = match (&self.base, self.flavor) {
            (Some(base), _) => Some(base.resolve(&type_params, &[])?),
            (None, TypeFlavor::Interface) => None,
            (None, _) => Some(TypeShape::Definition(
                universe.primitive_index(PrimitiveKind::Object),
            )),
        };
        if let Some(base) = base {
            universe.type_entry(index).base.set(base).ok();
        }
        for interface in &self.interfaces {
            universe
                .type_entry(index)
                .interfaces
                .push(interface.resolve(&type_params, &[])?);
        }

        match enclosing {
            Some(outer) => universe.register_nested(outer, index),
            None => universe.register_top_level(assembly.index(), index),
        }

        tracing::trace!(name = %full_name, flavor = %self.flavor, "defined type");
        Ok(ty)
    }
}

struct ParamSpec {
    name: String,
    ty: TypeArg,
    decorations: Vec<Decoration>,
}

/// Provides a fluent API for defining methods and constructors
pub struct MethodBuilder {
    name: String,
    flags: MethodFlags,
    is_constructor: bool,
    generic_params: Vec<String>,
    params: Vec<ParamSpec>,
    returns: Option<TypeArg>,
    return_decorations: Vec<Decoration>,
    decorations: Vec<Decoration>,
}

impl MethodBuilder {
    /// Start defining a method named `name`
    #[must_use]
    pub fn new(name: &str) -> Self {
        MethodBuilder {
            name: name.to_string(),
            flags: MethodFlags::empty(),
            is_constructor: false,
            generic_params: Vec::new(),
            params: Vec::new(),
            returns: None,
            return_decorations: Vec::new(),
            decorations: Vec::new(),
        }
    }

    /// Start defining an instance constructor
    #[must_use]
    pub fn constructor() -> Self {
        let mut builder = Self::new(CONSTRUCTOR_NAME);
        builder.is_constructor = true;
        builder
    }

    /// Replace the attribute flags
    #[must_use]
    pub fn flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Mark the method virtual
    #[must_use]
    pub fn virtual_method(mut self) -> Self {
        self.flags |= MethodFlags::VIRTUAL;
        self
    }

    /// Mark the method abstract (implies virtual)
    #[must_use]
    pub fn abstract_method(mut self) -> Self {
        self.flags |= MethodFlags::VIRTUAL | MethodFlags::ABSTRACT;
        self
    }

    /// Mark the method as introducing a new virtual slot
    #[must_use]
    pub fn new_slot(mut self) -> Self {
        self.flags |= MethodFlags::NEW_SLOT;
        self
    }

    /// Mark the method sealed
    #[must_use]
    pub fn final_method(mut self) -> Self {
        self.flags |= MethodFlags::FINAL;
        self
    }

    /// Mark the method static
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.flags |= MethodFlags::STATIC;
        self
    }

    /// Declare formal generic method parameters
    #[must_use]
    pub fn generic_params<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.generic_params.extend(names.into_iter().map(Into::into));
        self
    }

    /// Append a parameter
    #[must_use]
    pub fn param(self, name: &str, ty: impl Into<TypeArg>) -> Self {
        self.param_decorated(name, ty, [])
    }

    /// Append a parameter carrying native decorations
    #[must_use]
    pub fn param_decorated(
        mut self,
        name: &str,
        ty: impl Into<TypeArg>,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            ty: ty.into(),
            decorations: decorations.into_iter().collect(),
        });
        self
    }

    /// Set the return type. Methods default to `System.Void`.
    #[must_use]
    pub fn returns(mut self, ty: impl Into<TypeArg>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    /// Add a native decoration to the return parameter
    #[must_use]
    pub fn return_decoration(mut self, decoration: Decoration) -> Self {
        self.return_decorations.push(decoration);
        self
    }

    /// Add a native decoration
    #[must_use]
    pub fn decoration(mut self, decoration: Decoration) -> Self {
        self.decorations.push(decoration);
        self
    }

    /// Add native decorations
    #[must_use]
    pub fn decorations(mut self, decorations: impl IntoIterator<Item = Decoration>) -> Self {
        self.decorations.extend(decorations);
        self
    }

    fn validate(&self, owner: &NativeType) -> Result<()> {
        check_owner(owner, "methods")?;
        check_generic_count(self.generic_params.len())?;

        if self.is_constructor {
            if !self.generic_params.is_empty() {
                return Err(invalid_argument!("constructors cannot be generic"));
            }
            if self.returns.is_some() || !self.return_decorations.is_empty() {
                return Err(invalid_argument!("constructors have no return parameter"));
            }
            if self.flags.contains(MethodFlags::VIRTUAL) {
                return Err(invalid_argument!("constructors cannot be virtual"));
            }
        }
        if self.flags.contains(MethodFlags::STATIC) && self.flags.contains(MethodFlags::VIRTUAL) {
            return Err(invalid_argument!(
                "method '{}' cannot be both static and virtual",
                self.name
            ));
        }

        let universe = owner.universe();
        let type_arity = owner.entry().generic_params.count();
        let method_arity = self.generic_params.len();
        for param in &self.params {
            param.ty.check(universe, type_arity, method_arity)?;
        }
        if let Some(returns) = &self.returns {
            returns.check(universe, type_arity, method_arity)?;
        }

        let key = MethodKey::new(
            &self.name,
            method_arity,
            self.params.iter().map(|param| param.ty.signature()).collect(),
        );
        let (kind, declared) = if self.is_constructor {
            (MemberKind::Constructor, owner.constructors())
        } else {
            (MemberKind::Method, owner.methods())
        };
        if declared.iter().any(|method| MethodKey::of(method) == key) {
            return Err(duplicate_member(owner, kind, &key.to_string()));
        }
        Ok(())
    }

    /// Define the method on `owner`
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `owner` is not a type definition, a signature type
    /// is out of range or foreign, or a constructor is given generic parameters or a return
    /// parameter. Returns [`Error::MemberInsert`] if `owner` already declares a method with the
    /// same name, generic arity and parameter types.
    pub fn build(self, owner: &NativeType) -> Result<NativeMethod> {
        self.validate(owner)?;

        let universe = owner.universe();
        let owner_index = owner.shape().definition();
        let assembly = owner.entry().assembly;
        universe.check_type_rows(self.generic_params.len())?;
        let index = universe.push_method(MethodEntry {
            token: Token::new(0),
            name: self.name,
            owner: owner_index,
            flags: self.flags,
            is_constructor: self.is_constructor,
            generic_params: boxcar::Vec::new(),
            params: boxcar::Vec::new(),
            return_type: std::sync::OnceLock::new(),
            return_decorations: self.return_decorations,
            decorations: self.decorations,
        })?;
        let entry = universe.method_entry(index);

        let mut method_params = Vec::with_capacity(self.generic_params.len());
        for (position, name) in self.generic_params.into_iter().enumerate() {
            let mut param = generic_parameter_entry(
                name,
                assembly,
                owner_index,
                GenericPosition {
                    owner: GenericOwner::Method,
                    index: u16::try_from(position).unwrap_or(u16::MAX),
                },
            );
            param.owner_method = Some(index);
            let param = universe.push_type(param)?;
            entry.generic_params.push(param);
            method_params.push(param);
        }

        let type_params = type_params_of(owner);
        for param in self.params {
            entry.params.push(ParamEntry {
                name: param.name,
                ty: param.ty.resolve(&type_params, &method_params)?,
                decorations: param.decorations,
            });
        }

        if !self.is_constructor {
            let returns = match &self.returns {
                Some(returns) => returns.resolve(&type_params, &method_params)?,
                None => TypeShape::Definition(universe.primitive_index(PrimitiveKind::Void)),
            };
            entry.return_type.set(returns).ok();
        }

        tracing::trace!(owner = %owner.full_name_string(), method = %entry.name, "defined method");
        Ok(NativeMethod::new(
            universe.clone(),
            index,
            owner.shape().clone(),
            Arc::from([]),
        ))
    }
}

/// Provides a fluent API for defining fields
pub struct FieldBuilder {
    name: String,
    ty: TypeArg,
    is_static: bool,
    decorations: Vec<Decoration>,
}

impl FieldBuilder {
    /// Start defining a field of type `ty`
    #[must_use]
    pub fn new(name: &str, ty: impl Into<TypeArg>) -> Self {
        FieldBuilder {
            name: name.to_string(),
            ty: ty.into(),
            is_static: false,
            decorations: Vec::new(),
        }
    }

    /// Mark the field static
    #[must_use]
    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Add a native decoration
    #[must_use]
    pub fn decoration(mut self, decoration: Decoration) -> Self {
        self.decorations.push(decoration);
        self
    }

    /// Define the field on `owner`
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `owner` is not a type definition or the field type
    /// is invalid, and [`Error::MemberInsert`] if `owner` already declares a field of that name.
    pub fn build(self, owner: &NativeType) -> Result<NativeField> {
        check_owner(owner, "fields")?;
        if owner.fields().iter().any(|field| field.name() == self.name) {
            return Err(duplicate_member(owner, MemberKind::Field, &self.name));
        }
        self.ty
            .check(owner.universe(), owner.entry().generic_params.count(), 0)?;

        let universe = owner.universe();
        let ty = self.ty.resolve(&type_params_of(owner), &[])?;
        let index = universe.push_field(FieldEntry {
            token: Token::new(0),
            name: self.name,
            owner: owner.shape().definition(),
            ty,
            is_static: self.is_static,
            decorations: self.decorations,
        })?;
        Ok(NativeField::new(universe.clone(), index, owner.shape().clone()))
    }
}

/// An accessor given explicitly or generated from the member name
enum Accessor {
    None,
    Existing(NativeMethod),
    Generated(MethodFlags),
}

impl Accessor {
    fn check(&self, owner: &NativeType) -> Result<()> {
        match self {
            Accessor::Existing(method) => {
                if method.universe().id() != owner.universe().id()
                    || method.declaring_shape().definition() != owner.shape().definition()
                    || method.entry().is_constructor
                {
                    return Err(invalid_argument!(
                        "accessor '{}' must be a method declared on '{}'",
                        method.entry().name,
                        owner.full_name_string()
                    ));
                }
                Ok(())
            }
            Accessor::None | Accessor::Generated(_) => Ok(()),
        }
    }

    /// Validate the accessor completely, generating its builder if needed
    fn plan(
        self,
        owner: &NativeType,
        generate: impl FnOnce(MethodFlags) -> MethodBuilder,
    ) -> Result<PlannedAccessor> {
        self.check(owner)?;
        match self {
            Accessor::None => Ok(PlannedAccessor::None),
            Accessor::Existing(method) => Ok(PlannedAccessor::Existing(method.index())),
            Accessor::Generated(flags) => {
                let builder = generate(flags);
                builder.validate(owner)?;
                Ok(PlannedAccessor::Generated(builder))
            }
        }
    }
}

/// A validated accessor, ready to be defined
enum PlannedAccessor {
    None,
    Existing(usize),
    Generated(MethodBuilder),
}

impl PlannedAccessor {
    fn build(self, owner: &NativeType) -> Result<Option<usize>> {
        match self {
            PlannedAccessor::None => Ok(None),
            PlannedAccessor::Existing(index) => Ok(Some(index)),
            PlannedAccessor::Generated(builder) => Ok(Some(builder.build(owner)?.index())),
        }
    }
}

/// Provides a fluent API for defining properties
pub struct PropertyBuilder {
    name: String,
    ty: TypeArg,
    getter: Accessor,
    setter: Accessor,
    decorations: Vec<Decoration>,
}

impl PropertyBuilder {
    /// Start defining a property of type `ty`
    #[must_use]
    pub fn new(name: &str, ty: impl Into<TypeArg>) -> Self {
        PropertyBuilder {
            name: name.to_string(),
            ty: ty.into(),
            getter: Accessor::None,
            setter: Accessor::None,
            decorations: Vec::new(),
        }
    }

    /// Use an existing method as get accessor
    #[must_use]
    pub fn getter(mut self, method: &NativeMethod) -> Self {
        self.getter = Accessor::Existing(method.clone());
        self
    }

    /// Use an existing method as set accessor
    #[must_use]
    pub fn setter(mut self, method: &NativeMethod) -> Self {
        self.setter = Accessor::Existing(method.clone());
        self
    }

    /// Generate a `get_<Name>` accessor with `flags`
    #[must_use]
    pub fn generate_getter(mut self, flags: MethodFlags) -> Self {
        self.getter = Accessor::Generated(flags);
        self
    }

    /// Generate a `set_<Name>` accessor with `flags`
    #[must_use]
    pub fn generate_setter(mut self, flags: MethodFlags) -> Self {
        self.setter = Accessor::Generated(flags);
        self
    }

    /// Generate both accessors with `flags`
    #[must_use]
    pub fn accessors(self, flags: MethodFlags) -> Self {
        self.generate_getter(flags).generate_setter(flags)
    }

    /// Add a native decoration
    #[must_use]
    pub fn decoration(mut self, decoration: Decoration) -> Self {
        self.decorations.push(decoration);
        self
    }

    /// Define the property on `owner`
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `owner` is not a type definition, the property
    /// type is invalid or an explicit accessor is declared on another type. Returns
    /// [`Error::MemberInsert`] if `owner` already declares a property of that name or a method
    /// clashing with a generated accessor.
    pub fn build(self, owner: &NativeType) -> Result<NativeProperty> {
        check_owner(owner, "properties")?;
        if owner.properties().iter().any(|property| property.name() == self.name) {
            return Err(duplicate_member(owner, MemberKind::Property, &self.name));
        }
        self.ty
            .check(owner.universe(), owner.entry().generic_params.count(), 0)?;

        let name = self.name;
        let ty = self.ty;
        let getter = self.getter.plan(owner, |flags| {
            MethodBuilder::new(&format!("get_{name}"))
                .flags(flags)
                .returns(ty.clone())
        })?;
        let setter = self.setter.plan(owner, |flags| {
            MethodBuilder::new(&format!("set_{name}"))
                .flags(flags)
                .param("value", ty.clone())
        })?;
        let getter = getter.build(owner)?;
        let setter = setter.build(owner)?;

        let universe = owner.universe();
        let index = universe.push_property(PropertyEntry {
            token: Token::new(0),
            ty: ty.resolve(&type_params_of(owner), &[])?,
            name,
            owner: owner.shape().definition(),
            getter,
            setter,
            decorations: self.decorations,
        })?;
        Ok(NativeProperty::new(universe.clone(), index, owner.shape().clone()))
    }
}

/// Provides a fluent API for defining events
pub struct EventBuilder {
    name: String,
    handler: TypeArg,
    add: Accessor,
    remove: Accessor,
    raise: Option<NativeMethod>,
    decorations: Vec<Decoration>,
}

impl EventBuilder {
    /// Start defining an event with delegate type `handler`
    #[must_use]
    pub fn new(name: &str, handler: impl Into<TypeArg>) -> Self {
        EventBuilder {
            name: name.to_string(),
            handler: handler.into(),
            add: Accessor::None,
            remove: Accessor::None,
            raise: None,
            decorations: Vec::new(),
        }
    }

    /// Use an existing method as add accessor
    #[must_use]
    pub fn add_method(mut self, method: &NativeMethod) -> Self {
        self.add = Accessor::Existing(method.clone());
        self
    }

    /// Use an existing method as remove accessor
    #[must_use]
    pub fn remove_method(mut self, method: &NativeMethod) -> Self {
        self.remove = Accessor::Existing(method.clone());
        self
    }

    /// Use an existing method as raise accessor
    #[must_use]
    pub fn raise_method(mut self, method: &NativeMethod) -> Self {
        self.raise = Some(method.clone());
        self
    }

    /// Generate `add_<Name>` and `remove_<Name>` accessors with `flags`
    #[must_use]
    pub fn accessors(mut self, flags: MethodFlags) -> Self {
        self.add = Accessor::Generated(flags);
        self.remove = Accessor::Generated(flags);
        self
    }

    /// Add a native decoration
    #[must_use]
    pub fn decoration(mut self, decoration: Decoration) -> Self {
        self.decorations.push(decoration);
        self
    }

    /// Define the event on `owner`
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `owner` is not a type definition, the handler type
    /// is invalid or an explicit accessor is declared on another type. Returns
    /// [`Error::MemberInsert`] if `owner` already declares an event of that name or a method
    /// clashing with a generated accessor.
    pub fn build(self, owner: &NativeType) -> Result<NativeEvent> {
        check_owner(owner, "events")?;
        if owner.events().iter().any(|event| event.name() == self.name) {
            return Err(duplicate_member(owner, MemberKind::Event, &self.name));
        }
        self.handler
            .check(owner.universe(), owner.entry().generic_params.count(), 0)?;

        let name = self.name;
        let handler = self.handler;
        let add = self.add.plan(owner, |flags| {
            MethodBuilder::new(&format!("add_{name}"))
                .flags(flags)
                .param("value", handler.clone())
        })?;
        let remove = self.remove.plan(owner, |flags| {
            MethodBuilder::new(&format!("remove_{name}"))
                .flags(flags)
                .param("value", handler.clone())
        })?;
        let raise = self
            .raise
            .map_or(Accessor::None, Accessor::Existing)
            .plan(owner, |flags| MethodBuilder::new(&format!("raise_{name}")).flags(flags))?;
        let add = add.build(owner)?;
        let remove = remove.build(owner)?;
        let raise = raise.build(owner)?;

        let universe = owner.universe();
        let index = universe.push_event(EventEntry {
            token: Token::new(0),
            handler: handler.resolve(&type_params_of(owner), &[])?,
            name,
            owner: owner.shape().definition(),
            add,
            remove,
            raise,
            decorations: self.decorations,
        })?;
        Ok(NativeEvent::new(universe.clone(), index, owner.shape().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::reflection::{MethodInfo, PropertyInfo};

    #[test]
    fn test_duplicate_type_rejected() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        TypeBuilder::class("Widget")
            .namespace("Tests")
            .build(&assembly)
            .unwrap();

        let result = TypeBuilder::class("Widget").namespace("Tests").build(&assembly);
        assert!(matches!(result, Err(Error::TypeInsert(_))));
    }

    #[test]
    fn test_default_base_is_object() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let widget = TypeBuilder::class("Widget").build(&assembly).unwrap();
        let shape = TypeBuilder::interface("IShape").build(&assembly).unwrap();

        assert_eq!(
            widget.base_type().map(|base| base.full_name()),
            Some("System.Object".to_string())
        );
        assert!(shape.base_type().is_none());
    }

    #[test]
    fn test_nested_type_name() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let outer = TypeBuilder::class("Outer").namespace("Tests").build(&assembly).unwrap();
        let inner = TypeBuilder::class("Inner").nested_in(&outer).build(&assembly).unwrap();

        assert_eq!(inner.full_name(), "Tests.Outer+Inner");
        assert_eq!(
            inner.declaring_type().map(|ty| ty.full_name()),
            Some("Tests.Outer".to_string())
        );
        assert_eq!(outer.nested_types().len(), 1);
        assert!(universe.get_type("Tests.Outer+Inner").is_some());
    }

    #[test]
    fn test_interface_as_base_rejected() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let shape = TypeBuilder::interface("IShape").build(&assembly).unwrap();

        let result = TypeBuilder::class("Square").base(&shape).build(&assembly);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(universe.get_type("Square").is_none());
    }

    #[test]
    fn test_out_of_range_type_parameter_leaves_no_method() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let list = TypeBuilder::class("List`1")
            .generic_params(["T"])
            .build(&assembly)
            .unwrap();

        let result = MethodBuilder::new("Add")
            .param("item", TypeArg::TypeParameter(1))
            .build(&list);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(list.methods().is_empty());
    }

    #[test]
    fn test_constructor_restrictions() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let widget = TypeBuilder::class("Widget").build(&assembly).unwrap();
        let int = universe.primitive(PrimitiveKind::Int32);

        assert!(MethodBuilder::constructor()
            .generic_params(["T"])
            .build(&widget)
            .is_err());
        assert!(MethodBuilder::constructor().returns(&int).build(&widget).is_err());

        let ctor = MethodBuilder::constructor().param("size", &int).build(&widget).unwrap();
        assert!(ctor.is_constructor());
        assert!(ctor.return_type().is_none());
        assert_eq!(widget.constructors().len(), 1);
        assert!(widget.methods().is_empty());
    }

    #[test]
    fn test_generated_property_accessors() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let widget = TypeBuilder::class("Widget").build(&assembly).unwrap();
        let string = universe.primitive(PrimitiveKind::String);

        let title = PropertyBuilder::new("Title", &string)
            .accessors(MethodFlags::VIRTUAL)
            .build(&widget)
            .unwrap();

        let getter = title.getter().unwrap();
        let setter = title.setter().unwrap();
        assert_eq!(getter.name(), "get_Title");
        assert_eq!(setter.name(), "set_Title");
        assert_eq!(setter.parameters().len(), 1);
        assert_eq!(title.property_type().full_name(), "System.String");
        assert_eq!(widget.methods().len(), 2);
    }

    #[test]
    fn test_foreign_accessor_rejected() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let first = TypeBuilder::class("First").build(&assembly).unwrap();
        let second = TypeBuilder::class("Second").build(&assembly).unwrap();
        let int = universe.primitive(PrimitiveKind::Int32);

        let getter = MethodBuilder::new("get_Count").returns(&int).build(&first).unwrap();
        let result = PropertyBuilder::new("Count", &int).getter(&getter).build(&second);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(second.properties().is_empty());
    }

    #[test]
    fn test_types_from_other_universe_rejected() {
        let universe = TypeUniverse::new();
        let other = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let widget = TypeBuilder::class("Widget").build(&assembly).unwrap();
        let foreign = other.primitive(PrimitiveKind::Int32);

        let result = FieldBuilder::new("count", &foreign).build(&widget);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_duplicate_members_rejected() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let int = universe.primitive(PrimitiveKind::Int32);
        let object = universe.primitive(PrimitiveKind::Object);
        let widget = TypeBuilder::class("Widget").build(&assembly).unwrap();

        MethodBuilder::new("Resize").param("width", &int).build(&widget).unwrap();
        let result = MethodBuilder::new("Resize").param("height", &int).build(&widget);
        assert!(matches!(result, Err(Error::MemberInsert(_))));
        MethodBuilder::new("Resize").param("scale", &object).build(&widget).unwrap();
        assert_eq!(widget.methods().len(), 2);

        MethodBuilder::constructor().build(&widget).unwrap();
        let result = MethodBuilder::constructor().build(&widget);
        assert!(matches!(result, Err(Error::MemberInsert(_))));
        assert_eq!(widget.constructors().len(), 1);

        FieldBuilder::new("size", &int).build(&widget).unwrap();
        let result = FieldBuilder::new("size", &object).build(&widget);
        assert!(matches!(result, Err(Error::MemberInsert(_))));
        assert_eq!(widget.fields().len(), 1);

        PropertyBuilder::new("Name", &object).build(&widget).unwrap();
        let result = PropertyBuilder::new("Name", &int).build(&widget);
        assert!(matches!(result, Err(Error::MemberInsert(_))));
        assert_eq!(widget.properties().len(), 1);

        EventBuilder::new("Changed", &object).build(&widget).unwrap();
        let result = EventBuilder::new("Changed", &object).build(&widget);
        assert!(matches!(result, Err(Error::MemberInsert(_))));
        assert_eq!(widget.events().len(), 1);
    }

    #[test]
    fn test_duplicate_generic_signature_rejected() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let list = TypeBuilder::class("List`1")
            .generic_params(["T"])
            .build(&assembly)
            .unwrap();
        let parameter = list.generic_parameter(0).unwrap();

        MethodBuilder::new("Add")
            .param("item", TypeArg::TypeParameter(0))
            .build(&list)
            .unwrap();
        let result = MethodBuilder::new("Add").param("value", &parameter).build(&list);
        assert!(matches!(result, Err(Error::MemberInsert(_))));

        MethodBuilder::new("Add")
            .generic_params(["U"])
            .param("item", TypeArg::MethodParameter(0))
            .build(&list)
            .unwrap();
        assert_eq!(list.methods().len(), 2);
    }

    #[test]
    fn test_generated_accessor_clash_leaves_no_property() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let int = universe.primitive(PrimitiveKind::Int32);
        let widget = TypeBuilder::class("Widget").build(&assembly).unwrap();
        MethodBuilder::new("set_Count").param("value", &int).build(&widget).unwrap();

        let result = PropertyBuilder::new("Count", &int)
            .accessors(MethodFlags::empty())
            .build(&widget);
        assert!(matches!(result, Err(Error::MemberInsert(_))));
        assert!(widget.properties().is_empty());
        assert_eq!(widget.methods().len(), 1);
    }
}
