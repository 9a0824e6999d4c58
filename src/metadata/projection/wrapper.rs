//! Forwarding wrappers produced by a [`ProjectionContext`].
//!
//! Every query is delegated to the inner entity. Entities returned by the inner entity are mapped
//! through the owning context before they are handed out, so navigation never leaves the
//! projection. Decoration queries are merged in `decorate.rs`.

use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        projection::ProjectionContext,
        reflection::{
            AssemblyInfo, AssemblyRc, EventInfo, EventRc, FieldInfo, FieldRc, GenericPosition,
            InterfaceMapping, MemberInfo, MemberKind, MethodFlags, MethodInfo, MethodRc,
            ParameterInfo, ParameterRc, PropertyInfo, PropertyRc, TypeFlavor, TypeInfo, TypeRc,
        },
        token::EntityId,
    },
    Result,
};

/// An entity re-exposed through a [`ProjectionContext`]
pub struct Projected<T: ?Sized> {
    pub(crate) inner: Arc<T>,
    pub(crate) context: ProjectionContext,
}

impl<T: ?Sized> Projected<T> {
    pub(crate) fn new(inner: Arc<T>, context: ProjectionContext) -> Self {
        Projected { inner, context }
    }

    /// The wrapped entity
    #[must_use]
    pub fn inner(&self) -> &Arc<T> {
        &self.inner
    }

    /// The context that produced this wrapper
    #[must_use]
    pub fn context(&self) -> &ProjectionContext {
        &self.context
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Projected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Projected[{}]({:?})", self.context.id(), self.inner)
    }
}

macro_rules! forward_member_info {
    ($($trait:ident),*) => {
        $(
            impl MemberInfo for Projected<dyn $trait> {
                fn kind(&self) -> MemberKind {
                    self.inner.kind()
                }

                fn name(&self) -> &str {
                    self.inner.name()
                }

                fn declaring_type(&self) -> Option<TypeRc> {
                    self.inner
                        .declaring_type()
                        .map(|ty| self.context.map_type(&ty))
                }

                fn metadata_id(&self) -> EntityId {
                    self.inner.metadata_id()
                }
            }
        )*
    };
}

forward_member_info!(TypeInfo, MethodInfo, FieldInfo, PropertyInfo, EventInfo);

impl TypeInfo for Projected<dyn TypeInfo> {
    fn namespace(&self) -> &str {
        self.inner.namespace()
    }

    fn full_name(&self) -> String {
        self.inner.full_name()
    }

    fn flavor(&self) -> TypeFlavor {
        self.inner.flavor()
    }

    fn assembly(&self) -> AssemblyRc {
        self.context.map_assembly(&self.inner.assembly())
    }

    fn base_type(&self) -> Option<TypeRc> {
        self.inner
            .base_type()
            .map(|base| self.context.map_type(&base))
    }

    fn interfaces(&self) -> Vec<TypeRc> {
        self.context.map_types(self.inner.interfaces())
    }

    fn nested_types(&self) -> Vec<TypeRc> {
        self.context.map_types(self.inner.nested_types())
    }

    fn generic_arguments(&self) -> Vec<TypeRc> {
        self.context.map_types(self.inner.generic_arguments())
    }

    fn generic_type_definition(&self) -> Option<TypeRc> {
        self.inner
            .generic_type_definition()
            .map(|definition| self.context.map_type(&definition))
    }

    fn is_generic_type_definition(&self) -> bool {
        self.inner.is_generic_type_definition()
    }

    fn generic_parameter_position(&self) -> Option<GenericPosition> {
        self.inner.generic_parameter_position()
    }

    fn declaring_method(&self) -> Option<MethodRc> {
        self.inner
            .declaring_method()
            .map(|method| self.context.map_method(&method))
    }

    fn constructors(&self) -> Vec<MethodRc> {
        self.context.map_methods(self.inner.constructors())
    }

    fn methods(&self) -> Vec<MethodRc> {
        self.context.map_methods(self.inner.methods())
    }

    fn fields(&self) -> Vec<FieldRc> {
        self.inner
            .fields()
            .iter()
            .map(|field| self.context.map_field(field))
            .collect()
    }

    fn properties(&self) -> Vec<PropertyRc> {
        self.inner
            .properties()
            .iter()
            .map(|property| self.context.map_property(property))
            .collect()
    }

    fn events(&self) -> Vec<EventRc> {
        self.inner
            .events()
            .iter()
            .map(|event| self.context.map_event(event))
            .collect()
    }

    fn interface_map(&self, interface: &TypeRc) -> Result<InterfaceMapping> {
        let mapping = self.inner.interface_map(interface)?;
        Ok(InterfaceMapping {
            interface_type: self.context.map_type(&mapping.interface_type),
            interface_methods: self.context.map_methods(mapping.interface_methods),
            target_methods: self.context.map_methods(mapping.target_methods),
        })
    }
}

impl MethodInfo for Projected<dyn MethodInfo> {
    fn parameters(&self) -> Vec<ParameterRc> {
        self.inner
            .parameters()
            .iter()
            .map(|parameter| self.context.map_parameter(parameter))
            .collect()
    }

    fn return_parameter(&self) -> Option<ParameterRc> {
        self.inner
            .return_parameter()
            .map(|parameter| self.context.map_parameter(&parameter))
    }

    fn return_type(&self) -> Option<TypeRc> {
        self.inner
            .return_type()
            .map(|ty| self.context.map_type(&ty))
    }

    fn flags(&self) -> MethodFlags {
        self.inner.flags()
    }

    fn generic_arguments(&self) -> Vec<TypeRc> {
        self.context.map_types(self.inner.generic_arguments())
    }

    fn is_generic_method_definition(&self) -> bool {
        self.inner.is_generic_method_definition()
    }

    fn generic_method_definition(&self) -> Option<MethodRc> {
        self.inner
            .generic_method_definition()
            .map(|definition| self.context.map_method(&definition))
    }

    fn parent_definition(&self) -> Option<MethodRc> {
        self.inner
            .parent_definition()
            .map(|parent| self.context.map_method(&parent))
    }
}

impl FieldInfo for Projected<dyn FieldInfo> {
    fn field_type(&self) -> TypeRc {
        self.context.map_type(&self.inner.field_type())
    }

    fn is_static(&self) -> bool {
        self.inner.is_static()
    }
}

impl PropertyInfo for Projected<dyn PropertyInfo> {
    fn property_type(&self) -> TypeRc {
        self.context.map_type(&self.inner.property_type())
    }

    fn getter(&self) -> Option<MethodRc> {
        self.inner
            .getter()
            .map(|getter| self.context.map_method(&getter))
    }

    fn setter(&self) -> Option<MethodRc> {
        self.inner
            .setter()
            .map(|setter| self.context.map_method(&setter))
    }

    fn parent_definition(&self) -> Option<PropertyRc> {
        self.inner
            .parent_definition()
            .map(|parent| self.context.map_property(&parent))
    }
}

impl EventInfo for Projected<dyn EventInfo> {
    fn handler_type(&self) -> TypeRc {
        self.context.map_type(&self.inner.handler_type())
    }

    fn add_method(&self) -> Option<MethodRc> {
        self.inner
            .add_method()
            .map(|method| self.context.map_method(&method))
    }

    fn remove_method(&self) -> Option<MethodRc> {
        self.inner
            .remove_method()
            .map(|method| self.context.map_method(&method))
    }

    fn raise_method(&self) -> Option<MethodRc> {
        self.inner
            .raise_method()
            .map(|method| self.context.map_method(&method))
    }

    fn parent_definition(&self) -> Option<EventRc> {
        self.inner
            .parent_definition()
            .map(|parent| self.context.map_event(&parent))
    }
}

impl ParameterInfo for Projected<dyn ParameterInfo> {
    fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    fn position(&self) -> i32 {
        self.inner.position()
    }

    fn parameter_type(&self) -> TypeRc {
        self.context.map_type(&self.inner.parameter_type())
    }

    fn member(&self) -> MethodRc {
        self.context.map_method(&self.inner.member())
    }
}

impl AssemblyInfo for Projected<dyn AssemblyInfo> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn metadata_id(&self) -> EntityId {
        self.inner.metadata_id()
    }

    fn types(&self) -> Vec<TypeRc> {
        self.context.map_types(self.inner.types())
    }

    fn get_type(&self, full_name: &str) -> Option<TypeRc> {
        self.inner
            .get_type(full_name)
            .map(|ty| self.context.map_type(&ty))
    }
}
