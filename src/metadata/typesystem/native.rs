//! Native handles over [`TypeUniverse`] entries.
//!
//! Handles are cheap to clone (an `Arc` to the universe plus indices) and implement the
//! [`crate::metadata::reflection`] traits with the host platform's native decoration semantics.
//! Members reached through a generic instantiation carry the instantiated declaring type, so
//! their signatures are substituted on access.

use std::{fmt, iter, sync::Arc};

use crate::{
    metadata::{
        decorations::{merge::DecorationMerge, Decoration, KindFilter},
        reflection::{
            AssemblyInfo, AssemblyRc, Decorated, EventInfo, EventRc, FieldInfo, FieldRc,
            GenericPosition, InterfaceMapping, MemberInfo, MemberKind, MethodFlags, MethodInfo,
            MethodRc, ParameterInfo, ParameterRc, PropertyInfo, PropertyRc, TypeFlavor, TypeInfo,
            TypeRc,
        },
        token::EntityId,
        typesystem::{
            AssemblyEntry, EventEntry, FieldEntry, MethodEntry, PrimitiveKind, PropertyEntry,
            TypeEntry, TypeShape, TypeUniverse,
        },
    },
    Result,
};

fn own_decorations(
    universe: &TypeUniverse,
    filter: &KindFilter,
    decorations: &[Decoration],
) -> Vec<Decoration> {
    DecorationMerge::new(universe.usage(), filter)
        .native(decorations.iter().cloned())
        .finish()
}

fn signatures_match(left: &[TypeShape], right: &[TypeShape], universe: &TypeUniverse) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(left, right)| left.matches(right, universe))
}

/// A native assembly
#[derive(Clone)]
pub struct NativeAssembly {
    universe: Arc<TypeUniverse>,
    index: usize,
}

impl NativeAssembly {
    pub(crate) fn new(universe: Arc<TypeUniverse>, index: usize) -> Self {
        NativeAssembly { universe, index }
    }

    /// The owning universe
    #[must_use]
    pub fn universe(&self) -> &Arc<TypeUniverse> {
        &self.universe
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    fn entry(&self) -> &AssemblyEntry {
        self.universe.assembly_entry(self.index)
    }

    /// Type-erased handle
    #[must_use]
    pub fn rc(&self) -> AssemblyRc {
        Arc::new(self.clone())
    }
}

impl fmt::Debug for NativeAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeAssembly({})", self.entry().name)
    }
}

impl Decorated for NativeAssembly {
    fn decorations(&self, filter: &KindFilter, _inherit: bool) -> Vec<Decoration> {
        own_decorations(&self.universe, filter, &self.entry().decorations)
    }
}

impl AssemblyInfo for NativeAssembly {
    fn name(&self) -> &str {
        &self.entry().name
    }

    fn metadata_id(&self) -> EntityId {
        self.universe.entity_id(self.entry().token)
    }

    fn types(&self) -> Vec<TypeRc> {
        self.entry()
            .types
            .iter()
            .map(|(_, index)| NativeType::new(self.universe.clone(), TypeShape::Definition(*index)).rc())
            .collect()
    }

    fn get_type(&self, full_name: &str) -> Option<TypeRc> {
        self.universe
            .get_type(full_name)
            .filter(|ty| ty.entry().assembly == self.index)
            .map(|ty| ty.rc())
    }
}

/// A native type: definition, generic instantiation or formal generic parameter
#[derive(Clone)]
pub struct NativeType {
    universe: Arc<TypeUniverse>,
    shape: TypeShape,
}

impl NativeType {
    pub(crate) fn new(universe: Arc<TypeUniverse>, shape: TypeShape) -> Self {
        NativeType { universe, shape }
    }

    /// The owning universe
    #[must_use]
    pub fn universe(&self) -> &Arc<TypeUniverse> {
        &self.universe
    }

    /// The structural reference of this type
    #[must_use]
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    pub(crate) fn entry(&self) -> &TypeEntry {
        self.universe.type_entry(self.shape.definition())
    }

    pub(crate) fn full_name_string(&self) -> String {
        self.shape.full_name(&self.universe)
    }

    pub(crate) fn is_open_definition(&self) -> bool {
        matches!(self.shape, TypeShape::Definition(_)) && self.entry().generic_params.count() > 0
    }

    fn with_shape(&self, shape: TypeShape) -> NativeType {
        NativeType::new(self.universe.clone(), shape)
    }

    /// Type-erased handle
    #[must_use]
    pub fn rc(&self) -> TypeRc {
        Arc::new(self.clone())
    }

    /// Instantiate a generic type definition with `args`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if this is not an open generic definition, the
    /// argument count differs from the definition's arity or an argument belongs to another
    /// universe.
    pub fn instantiate(&self, args: &[NativeType]) -> Result<NativeType> {
        if !self.is_open_definition() {
            return Err(invalid_argument!(
                "'{}' is not a generic type definition",
                self.full_name_string()
            ));
        }
        let arity = self.entry().generic_params.count();
        if args.len() != arity {
            return Err(invalid_argument!(
                "'{}' expects {} generic arguments, got {}",
                self.full_name_string(),
                arity,
                args.len()
            ));
        }
        if let Some(foreign) = args
            .iter()
            .find(|arg| arg.universe.id() != self.universe.id())
        {
            return Err(invalid_argument!(
                "'{}' belongs to another type universe",
                foreign.full_name_string()
            ));
        }

        Ok(self.with_shape(TypeShape::Instance {
            definition: self.shape.definition(),
            args: args.iter().map(|arg| arg.shape.clone()).collect(),
        }))
    }

    /// The formal generic parameter at `index` of this type's definition
    #[must_use]
    pub fn generic_parameter(&self, index: usize) -> Option<NativeType> {
        self.entry()
            .generic_params
            .get(index)
            .map(|param| self.with_shape(TypeShape::Definition(*param)))
    }

    /// The direct base type, substituted for instantiations
    #[must_use]
    pub fn native_base(&self) -> Option<NativeType> {
        self.entry()
            .base
            .get()
            .map(|base| self.with_shape(base.substitute(&self.universe, self.shape.args(), &[])))
    }

    /// Methods declared on this type, constructors excluded
    #[must_use]
    pub fn native_methods(&self) -> Vec<NativeMethod> {
        self.entry()
            .methods
            .iter()
            .map(|(_, index)| self.member_method(*index))
            .collect()
    }

    fn member_method(&self, index: usize) -> NativeMethod {
        NativeMethod::new(self.universe.clone(), index, self.shape.clone(), Arc::from([]))
    }

    fn native_interfaces(&self) -> Vec<NativeType> {
        self.entry()
            .interfaces
            .iter()
            .map(|(_, interface)| {
                self.with_shape(interface.substitute(&self.universe, self.shape.args(), &[]))
            })
            .collect()
    }

    /// This type followed by its base types, nearest first
    fn lineage(&self) -> impl Iterator<Item = NativeType> {
        iter::successors(Some(self.clone()), NativeType::native_base)
    }

    /// Every interface implemented by this type, its bases or its interfaces
    fn implemented_interfaces(&self) -> Vec<NativeType> {
        let mut pending: Vec<NativeType> =
            self.lineage().flat_map(|ty| ty.native_interfaces()).collect();
        let mut found: Vec<NativeType> = Vec::new();
        while let Some(interface) = pending.pop() {
            if found.iter().any(|known| known.shape == interface.shape) {
                continue;
            }
            pending.extend(interface.native_interfaces());
            found.push(interface);
        }
        found
    }

    fn find_implementation(&self, interface_method: &NativeMethod) -> Option<NativeMethod> {
        let wanted = interface_method.entry();
        let signature = interface_method.signature();
        self.lineage().find_map(|ty| {
            ty.native_methods().into_iter().find(|candidate| {
                let entry = candidate.entry();
                entry.name == wanted.name
                    && !entry.flags.contains(MethodFlags::STATIC)
                    && entry.generic_params.count() == wanted.generic_params.count()
                    && signatures_match(&candidate.signature(), &signature, &self.universe)
            })
        })
    }
}

impl fmt::Debug for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeType({})", self.full_name_string())
    }
}

impl Decorated for NativeType {
    fn decorations(&self, filter: &KindFilter, inherit: bool) -> Vec<Decoration> {
        let merge = DecorationMerge::new(self.universe.usage(), filter)
            .native(self.entry().decorations.iter().cloned());
        if !inherit {
            return merge.finish();
        }

        merge
            .ancestors(
                self.lineage()
                    .skip(1)
                    .map(|base| base.entry().decorations.clone()),
            )
            .finish()
    }
}

impl MemberInfo for NativeType {
    fn kind(&self) -> MemberKind {
        MemberKind::Type
    }

    fn name(&self) -> &str {
        &self.entry().name
    }

    fn declaring_type(&self) -> Option<TypeRc> {
        self.entry()
            .enclosing
            .map(|outer| self.with_shape(TypeShape::Definition(outer)).rc())
    }

    fn metadata_id(&self) -> EntityId {
        self.universe.entity_id(self.entry().token)
    }
}

impl TypeInfo for NativeType {
    fn namespace(&self) -> &str {
        &self.entry().namespace
    }

    fn full_name(&self) -> String {
        self.full_name_string()
    }

    fn flavor(&self) -> TypeFlavor {
        self.entry().flavor
    }

    fn assembly(&self) -> AssemblyRc {
        NativeAssembly::new(self.universe.clone(), self.entry().assembly).rc()
    }

    fn base_type(&self) -> Option<TypeRc> {
        self.native_base().map(|base| base.rc())
    }

    fn interfaces(&self) -> Vec<TypeRc> {
        self.native_interfaces()
            .into_iter()
            .map(|interface| interface.rc())
            .collect()
    }

    fn nested_types(&self) -> Vec<TypeRc> {
        self.entry()
            .nested
            .iter()
            .map(|(_, index)| self.with_shape(TypeShape::Definition(*index)).rc())
            .collect()
    }

    fn generic_arguments(&self) -> Vec<TypeRc> {
        match &self.shape {
            TypeShape::Instance { args, .. } => args
                .iter()
                .map(|arg| self.with_shape(arg.clone()).rc())
                .collect(),
            TypeShape::Definition(_) => self
                .entry()
                .generic_params
                .iter()
                .map(|(_, param)| self.with_shape(TypeShape::Definition(*param)).rc())
                .collect(),
        }
    }

    fn generic_type_definition(&self) -> Option<TypeRc> {
        match &self.shape {
            TypeShape::Instance { definition, .. } => {
                Some(self.with_shape(TypeShape::Definition(*definition)).rc())
            }
            TypeShape::Definition(_) => None,
        }
    }

    fn is_generic_type_definition(&self) -> bool {
        self.is_open_definition()
    }

    fn generic_parameter_position(&self) -> Option<GenericPosition> {
        self.entry().generic
    }

    fn declaring_method(&self) -> Option<MethodRc> {
        self.entry().owner_method.map(|index| {
            let owner = self.universe.method_entry(index).owner;
            NativeMethod::new(
                self.universe.clone(),
                index,
                TypeShape::Definition(owner),
                Arc::from([]),
            )
            .rc()
        })
    }

    fn constructors(&self) -> Vec<MethodRc> {
        self.entry()
            .constructors
            .iter()
            .map(|(_, index)| self.member_method(*index).rc())
            .collect()
    }

    fn methods(&self) -> Vec<MethodRc> {
        self.native_methods()
            .into_iter()
            .map(|method| method.rc())
            .collect()
    }

    fn fields(&self) -> Vec<FieldRc> {
        self.entry()
            .fields
            .iter()
            .map(|(_, index)| {
                NativeField::new(self.universe.clone(), *index, self.shape.clone()).rc()
            })
            .collect()
    }

    fn properties(&self) -> Vec<PropertyRc> {
        self.entry()
            .properties
            .iter()
            .map(|(_, index)| {
                NativeProperty::new(self.universe.clone(), *index, self.shape.clone()).rc()
            })
            .collect()
    }

    fn events(&self) -> Vec<EventRc> {
        self.entry()
            .events
            .iter()
            .map(|(_, index)| {
                NativeEvent::new(self.universe.clone(), *index, self.shape.clone()).rc()
            })
            .collect()
    }

    fn interface_map(&self, interface: &TypeRc) -> Result<InterfaceMapping> {
        let wanted_id = interface.metadata_id();
        let wanted_name = interface.full_name();
        let native = self
            .implemented_interfaces()
            .into_iter()
            .find(|candidate| {
                candidate.metadata_id() == wanted_id && candidate.full_name_string() == wanted_name
            })
            .ok_or_else(|| {
                invalid_argument!(
                    "'{}' does not implement '{}'",
                    self.full_name_string(),
                    wanted_name
                )
            })?;

        let interface_methods = native.native_methods();
        let mut target_methods = Vec::with_capacity(interface_methods.len());
        for method in &interface_methods {
            let target = self.find_implementation(method).ok_or_else(|| {
                invalid_argument!(
                    "'{}' has no implementation of '{}.{}'",
                    self.full_name_string(),
                    wanted_name,
                    method.entry().name
                )
            })?;
            target_methods.push(target.rc());
        }

        Ok(InterfaceMapping {
            interface_type: native.rc(),
            interface_methods: interface_methods
                .into_iter()
                .map(|method| method.rc())
                .collect(),
            target_methods,
        })
    }
}

/// A native method or constructor
#[derive(Clone)]
pub struct NativeMethod {
    universe: Arc<TypeUniverse>,
    index: usize,
    declaring: TypeShape,
    method_args: Arc<[TypeShape]>,
}

impl NativeMethod {
    pub(crate) fn new(
        universe: Arc<TypeUniverse>,
        index: usize,
        declaring: TypeShape,
        method_args: Arc<[TypeShape]>,
    ) -> Self {
        NativeMethod {
            universe,
            index,
            declaring,
            method_args,
        }
    }

    /// The owning universe
    #[must_use]
    pub fn universe(&self) -> &Arc<TypeUniverse> {
        &self.universe
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn entry(&self) -> &MethodEntry {
        self.universe.method_entry(self.index)
    }

    pub(crate) fn declaring_shape(&self) -> &TypeShape {
        &self.declaring
    }

    /// The declaring type, as reached (instantiated or open)
    #[must_use]
    pub fn declaring(&self) -> NativeType {
        NativeType::new(self.universe.clone(), self.declaring.clone())
    }

    /// Type-erased handle
    #[must_use]
    pub fn rc(&self) -> MethodRc {
        Arc::new(self.clone())
    }

    fn resolve(&self, shape: &TypeShape) -> TypeShape {
        shape.substitute(&self.universe, self.declaring.args(), &self.method_args)
    }

    /// Parameter types with the declaring type's arguments applied; method generic parameters
    /// stay formal so overrides compare by position
    fn signature(&self) -> Vec<TypeShape> {
        self.entry()
            .params
            .iter()
            .map(|(_, param)| param.ty.substitute(&self.universe, self.declaring.args(), &[]))
            .collect()
    }

    /// Instantiate a generic method definition with `args`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if this is not a generic method definition or
    /// the argument count differs from its arity.
    pub fn instantiate(&self, args: &[NativeType]) -> Result<NativeMethod> {
        let arity = self.entry().generic_params.count();
        if arity == 0 || !self.method_args.is_empty() {
            return Err(invalid_argument!(
                "'{}' is not a generic method definition",
                self.entry().name
            ));
        }
        if args.len() != arity {
            return Err(invalid_argument!(
                "'{}' expects {} generic arguments, got {}",
                self.entry().name,
                arity,
                args.len()
            ));
        }
        if args.iter().any(|arg| arg.universe().id() != self.universe.id()) {
            return Err(invalid_argument!(
                "generic arguments of '{}' belong to another type universe",
                self.entry().name
            ));
        }

        Ok(NativeMethod {
            method_args: args.iter().map(|arg| arg.shape().clone()).collect(),
            ..self.clone()
        })
    }

    /// The method this one directly overrides: the nearest virtual method up the base chain
    /// with the same name, generic arity and parameter signature
    #[must_use]
    pub fn native_parent(&self) -> Option<NativeMethod> {
        let entry = self.entry();
        if entry.is_constructor
            || !entry.flags.contains(MethodFlags::VIRTUAL)
            || entry
                .flags
                .intersects(MethodFlags::NEW_SLOT | MethodFlags::STATIC)
        {
            return None;
        }

        let arity = entry.generic_params.count();
        let signature = self.signature();
        self.declaring().lineage().skip(1).find_map(|base| {
            base.native_methods()
                .into_iter()
                .find(|candidate| {
                    let other = candidate.entry();
                    other.name == entry.name
                        && other.flags.contains(MethodFlags::VIRTUAL)
                        && !other.flags.contains(MethodFlags::STATIC)
                        && other.generic_params.count() == arity
                        && signatures_match(&candidate.signature(), &signature, &self.universe)
                })
                .map(|parent| NativeMethod {
                    method_args: self.method_args.clone(),
                    ..parent
                })
        })
    }
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NativeMethod({}::{})",
            self.declaring.full_name(&self.universe),
            self.entry().name
        )
    }
}

impl Decorated for NativeMethod {
    fn decorations(&self, filter: &KindFilter, inherit: bool) -> Vec<Decoration> {
        let merge = DecorationMerge::new(self.universe.usage(), filter)
            .native(self.entry().decorations.iter().cloned());
        if !inherit {
            return merge.finish();
        }

        merge
            .ancestors(
                iter::successors(self.native_parent(), NativeMethod::native_parent)
                    .map(|parent| parent.entry().decorations.clone()),
            )
            .finish()
    }
}

impl MemberInfo for NativeMethod {
    fn kind(&self) -> MemberKind {
        if self.entry().is_constructor {
            MemberKind::Constructor
        } else {
            MemberKind::Method
        }
    }

    fn name(&self) -> &str {
        &self.entry().name
    }

    fn declaring_type(&self) -> Option<TypeRc> {
        Some(self.declaring().rc())
    }

    fn metadata_id(&self) -> EntityId {
        self.universe.entity_id(self.entry().token)
    }
}

impl MethodInfo for NativeMethod {
    fn parameters(&self) -> Vec<ParameterRc> {
        self.entry()
            .params
            .iter()
            .map(|(position, _)| NativeParameter::new(self.clone(), Some(position)).rc())
            .collect()
    }

    fn return_parameter(&self) -> Option<ParameterRc> {
        if self.entry().is_constructor {
            None
        } else {
            Some(NativeParameter::new(self.clone(), None).rc())
        }
    }

    fn return_type(&self) -> Option<TypeRc> {
        self.entry()
            .return_type
            .get()
            .map(|returns| NativeType::new(self.universe.clone(), self.resolve(returns)).rc())
    }

    fn flags(&self) -> MethodFlags {
        self.entry().flags
    }

    fn generic_arguments(&self) -> Vec<TypeRc> {
        if self.method_args.is_empty() {
            self.entry()
                .generic_params
                .iter()
                .map(|(_, param)| {
                    NativeType::new(self.universe.clone(), TypeShape::Definition(*param)).rc()
                })
                .collect()
        } else {
            self.method_args
                .iter()
                .map(|arg| NativeType::new(self.universe.clone(), arg.clone()).rc())
                .collect()
        }
    }

    fn is_generic_method_definition(&self) -> bool {
        self.method_args.is_empty() && self.entry().generic_params.count() > 0
    }

    fn generic_method_definition(&self) -> Option<MethodRc> {
        if self.method_args.is_empty() {
            None
        } else {
            Some(
                NativeMethod {
                    method_args: Arc::from([]),
                    ..self.clone()
                }
                .rc(),
            )
        }
    }

    fn parent_definition(&self) -> Option<MethodRc> {
        self.native_parent().map(|parent| parent.rc())
    }
}

/// A native field
#[derive(Clone)]
pub struct NativeField {
    universe: Arc<TypeUniverse>,
    index: usize,
    declaring: TypeShape,
}

impl NativeField {
    pub(crate) fn new(universe: Arc<TypeUniverse>, index: usize, declaring: TypeShape) -> Self {
        NativeField {
            universe,
            index,
            declaring,
        }
    }

    fn entry(&self) -> &FieldEntry {
        self.universe.field_entry(self.index)
    }

    /// Type-erased handle
    #[must_use]
    pub fn rc(&self) -> FieldRc {
        Arc::new(self.clone())
    }
}

impl Decorated for NativeField {
    fn decorations(&self, filter: &KindFilter, _inherit: bool) -> Vec<Decoration> {
        own_decorations(&self.universe, filter, &self.entry().decorations)
    }
}

impl MemberInfo for NativeField {
    fn kind(&self) -> MemberKind {
        MemberKind::Field
    }

    fn name(&self) -> &str {
        &self.entry().name
    }

    fn declaring_type(&self) -> Option<TypeRc> {
        Some(NativeType::new(self.universe.clone(), self.declaring.clone()).rc())
    }

    fn metadata_id(&self) -> EntityId {
        self.universe.entity_id(self.entry().token)
    }
}

impl FieldInfo for NativeField {
    fn field_type(&self) -> TypeRc {
        let ty = self
            .entry()
            .ty
            .substitute(&self.universe, self.declaring.args(), &[]);
        NativeType::new(self.universe.clone(), ty).rc()
    }

    fn is_static(&self) -> bool {
        self.entry().is_static
    }
}

/// Resolves the property or event owning `parent_accessor` on the accessor's declaring type
fn accessor_owner<T>(
    parent_accessor: &NativeMethod,
    candidates: &boxcar::Vec<usize>,
    owns: impl Fn(usize) -> bool,
    make: impl FnOnce(usize, TypeShape) -> T,
) -> Option<T> {
    candidates
        .iter()
        .map(|(_, index)| *index)
        .find(|index| owns(*index))
        .map(|index| make(index, parent_accessor.declaring_shape().clone()))
}

/// A native property
#[derive(Clone)]
pub struct NativeProperty {
    universe: Arc<TypeUniverse>,
    index: usize,
    declaring: TypeShape,
}

impl NativeProperty {
    pub(crate) fn new(universe: Arc<TypeUniverse>, index: usize, declaring: TypeShape) -> Self {
        NativeProperty {
            universe,
            index,
            declaring,
        }
    }

    fn entry(&self) -> &PropertyEntry {
        self.universe.property_entry(self.index)
    }

    fn accessor(&self, index: Option<usize>) -> Option<NativeMethod> {
        index.map(|index| {
            NativeMethod::new(
                self.universe.clone(),
                index,
                self.declaring.clone(),
                Arc::from([]),
            )
        })
    }

    /// Type-erased handle
    #[must_use]
    pub fn rc(&self) -> PropertyRc {
        Arc::new(self.clone())
    }

    /// The property overridden by this one, found through its accessors
    #[must_use]
    pub fn native_parent(&self) -> Option<NativeProperty> {
        let entry = self.entry();
        [entry.getter, entry.setter]
            .into_iter()
            .filter_map(|accessor| self.accessor(accessor))
            .find_map(|accessor| {
                let parent = accessor.native_parent()?;
                let parent_index = parent.index();
                let owner = parent.declaring();
                accessor_owner(
                    &parent,
                    &owner.entry().properties,
                    |index| {
                        let candidate = self.universe.property_entry(index);
                        candidate.getter == Some(parent_index)
                            || candidate.setter == Some(parent_index)
                    },
                    |index, declaring| NativeProperty::new(self.universe.clone(), index, declaring),
                )
            })
    }
}

impl Decorated for NativeProperty {
    /// Properties report their own decorations, even when `inherit` is set
    fn decorations(&self, filter: &KindFilter, _inherit: bool) -> Vec<Decoration> {
        own_decorations(&self.universe, filter, &self.entry().decorations)
    }
}

impl MemberInfo for NativeProperty {
    fn kind(&self) -> MemberKind {
        MemberKind::Property
    }

    fn name(&self) -> &str {
        &self.entry().name
    }

    fn declaring_type(&self) -> Option<TypeRc> {
        Some(NativeType::new(self.universe.clone(), self.declaring.clone()).rc())
    }

    fn metadata_id(&self) -> EntityId {
        self.universe.entity_id(self.entry().token)
    }
}

impl PropertyInfo for NativeProperty {
    fn property_type(&self) -> TypeRc {
        let ty = self
            .entry()
            .ty
            .substitute(&self.universe, self.declaring.args(), &[]);
        NativeType::new(self.universe.clone(), ty).rc()
    }

    fn getter(&self) -> Option<MethodRc> {
        self.accessor(self.entry().getter).map(|method| method.rc())
    }

    fn setter(&self) -> Option<MethodRc> {
        self.accessor(self.entry().setter).map(|method| method.rc())
    }

    fn parent_definition(&self) -> Option<PropertyRc> {
        self.native_parent().map(|parent| parent.rc())
    }
}

/// A native event
#[derive(Clone)]
pub struct NativeEvent {
    universe: Arc<TypeUniverse>,
    index: usize,
    declaring: TypeShape,
}

impl NativeEvent {
    pub(crate) fn new(universe: Arc<TypeUniverse>, index: usize, declaring: TypeShape) -> Self {
        NativeEvent {
            universe,
            index,
            declaring,
        }
    }

    fn entry(&self) -> &EventEntry {
        self.universe.event_entry(self.index)
    }

    fn accessor(&self, index: Option<usize>) -> Option<NativeMethod> {
        index.map(|index| {
            NativeMethod::new(
                self.universe.clone(),
                index,
                self.declaring.clone(),
                Arc::from([]),
            )
        })
    }

    /// Type-erased handle
    #[must_use]
    pub fn rc(&self) -> EventRc {
        Arc::new(self.clone())
    }

    /// The event overridden by this one, found through its accessors
    #[must_use]
    pub fn native_parent(&self) -> Option<NativeEvent> {
        let entry = self.entry();
        [entry.add, entry.remove, entry.raise]
            .into_iter()
            .filter_map(|accessor| self.accessor(accessor))
            .find_map(|accessor| {
                let parent = accessor.native_parent()?;
                let parent_index = parent.index();
                let owner = parent.declaring();
                accessor_owner(
                    &parent,
                    &owner.entry().events,
                    |index| {
                        let candidate = self.universe.event_entry(index);
                        candidate.add == Some(parent_index)
                            || candidate.remove == Some(parent_index)
                            || candidate.raise == Some(parent_index)
                    },
                    |index, declaring| NativeEvent::new(self.universe.clone(), index, declaring),
                )
            })
    }
}

impl Decorated for NativeEvent {
    /// Events report their own decorations, even when `inherit` is set
    fn decorations(&self, filter: &KindFilter, _inherit: bool) -> Vec<Decoration> {
        own_decorations(&self.universe, filter, &self.entry().decorations)
    }
}

impl MemberInfo for NativeEvent {
    fn kind(&self) -> MemberKind {
        MemberKind::Event
    }

    fn name(&self) -> &str {
        &self.entry().name
    }

    fn declaring_type(&self) -> Option<TypeRc> {
        Some(NativeType::new(self.universe.clone(), self.declaring.clone()).rc())
    }

    fn metadata_id(&self) -> EntityId {
        self.universe.entity_id(self.entry().token)
    }
}

impl EventInfo for NativeEvent {
    fn handler_type(&self) -> TypeRc {
        let ty = self
            .entry()
            .handler
            .substitute(&self.universe, self.declaring.args(), &[]);
        NativeType::new(self.universe.clone(), ty).rc()
    }

    fn add_method(&self) -> Option<MethodRc> {
        self.accessor(self.entry().add).map(|method| method.rc())
    }

    fn remove_method(&self) -> Option<MethodRc> {
        self.accessor(self.entry().remove).map(|method| method.rc())
    }

    fn raise_method(&self) -> Option<MethodRc> {
        self.accessor(self.entry().raise).map(|method| method.rc())
    }

    fn parent_definition(&self) -> Option<EventRc> {
        self.native_parent().map(|parent| parent.rc())
    }
}

/// A native parameter or return parameter
#[derive(Clone)]
pub struct NativeParameter {
    method: NativeMethod,
    /// `None` for the return parameter
    position: Option<usize>,
}

impl NativeParameter {
    pub(crate) fn new(method: NativeMethod, position: Option<usize>) -> Self {
        NativeParameter { method, position }
    }

    /// Type-erased handle
    #[must_use]
    pub fn rc(&self) -> ParameterRc {
        Arc::new(self.clone())
    }
}

impl Decorated for NativeParameter {
    fn decorations(&self, filter: &KindFilter, _inherit: bool) -> Vec<Decoration> {
        let entry = self.method.entry();
        let decorations: &[Decoration] = match self.position {
            Some(position) => entry
                .params
                .get(position)
                .map_or(&[][..], |param| param.decorations.as_slice()),
            None => &entry.return_decorations,
        };
        own_decorations(&self.method.universe, filter, decorations)
    }
}

impl ParameterInfo for NativeParameter {
    fn name(&self) -> Option<&str> {
        let position = self.position?;
        self.method
            .entry()
            .params
            .get(position)
            .map(|param| param.name.as_str())
    }

    fn position(&self) -> i32 {
        self.position
            .map_or(-1, |position| i32::try_from(position).unwrap_or(i32::MAX))
    }

    fn parameter_type(&self) -> TypeRc {
        let entry = self.method.entry();
        let universe = &self.method.universe;
        let shape = match self.position {
            Some(position) => entry.params.get(position).map(|param| &param.ty),
            None => entry.return_type.get(),
        };
        let shape = shape.map_or_else(
            || TypeShape::Definition(universe.primitive_index(PrimitiveKind::Void)),
            |shape| self.method.resolve(shape),
        );
        NativeType::new(universe.clone(), shape).rc()
    }

    fn member(&self) -> MethodRc {
        self.method.rc()
    }
}
