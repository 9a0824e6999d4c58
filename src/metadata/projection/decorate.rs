//! Decoration queries on projected entities.
//!
//! Each entity kind feeds the shared [`DecorationMerge`] with the table's declared decorations,
//! the inner entity's own decorations and, when inheritance is requested, one level per ancestor.
//! Ancestors are reached through this same projection, so every level already includes the
//! table's decorations for that ancestor.

use std::iter;

use crate::metadata::{
    decorations::{merge::DecorationMerge, Decoration, KindFilter},
    projection::{ContextId, Projected, ProjectionOptions},
    reflection::{
        AssemblyInfo, Decorated, EventInfo, FieldInfo, Member, MethodInfo, ParameterInfo,
        PropertyInfo, TypeInfo,
    },
};

impl<T: ?Sized + Decorated> Projected<T> {
    fn merge<'a>(&'a self, filter: &'a KindFilter, declared: &[Decoration]) -> DecorationMerge<'a> {
        DecorationMerge::new(self.context.usage(), filter)
            .declared(declared)
            .native(self.inner.decorations(filter, false))
    }

    fn produced_by(&self, context: ContextId) -> bool {
        self.context.id() == context || self.inner.is_projected_by(context)
    }
}

impl Decorated for Projected<dyn TypeInfo> {
    fn decorations(&self, filter: &KindFilter, inherit: bool) -> Vec<Decoration> {
        let declared = self.context.table().type_decorations(self.inner.as_ref());
        let merge = self.merge(filter, declared);
        if !inherit {
            return merge.finish();
        }

        merge
            .ancestors(
                iter::successors(self.base_type(), |ty| ty.base_type())
                    .map(|base| base.decorations(filter, false)),
            )
            .finish()
    }

    fn is_projected_by(&self, context: ContextId) -> bool {
        self.produced_by(context)
    }
}

impl Decorated for Projected<dyn MethodInfo> {
    fn decorations(&self, filter: &KindFilter, inherit: bool) -> Vec<Decoration> {
        let declared = self.context.table().method_decorations(&self.inner);
        let merge = self.merge(filter, declared);
        if !inherit {
            return merge.finish();
        }

        merge
            .ancestors(
                iter::successors(self.parent_definition(), |method| method.parent_definition())
                    .map(|parent| parent.decorations(filter, false)),
            )
            .finish()
    }

    fn is_projected_by(&self, context: ContextId) -> bool {
        self.produced_by(context)
    }
}

impl Decorated for Projected<dyn PropertyInfo> {
    fn decorations(&self, filter: &KindFilter, inherit: bool) -> Vec<Decoration> {
        let member = Member::Property(self.inner.clone());
        let declared = self.context.table().member_decorations(&member);
        let merge = self.merge(filter, declared);
        if !inherit
            || !self
                .context
                .options()
                .contains(ProjectionOptions::HONOR_PROPERTY_INHERITANCE)
        {
            return merge.finish();
        }

        merge
            .ancestors(
                iter::successors(self.parent_definition(), |property| {
                    property.parent_definition()
                })
                .map(|parent| parent.decorations(filter, false)),
            )
            .finish()
    }

    fn is_projected_by(&self, context: ContextId) -> bool {
        self.produced_by(context)
    }
}

impl Decorated for Projected<dyn EventInfo> {
    fn decorations(&self, filter: &KindFilter, inherit: bool) -> Vec<Decoration> {
        let member = Member::Event(self.inner.clone());
        let declared = self.context.table().member_decorations(&member);
        let merge = self.merge(filter, declared);
        if !inherit
            || !self
                .context
                .options()
                .contains(ProjectionOptions::HONOR_EVENT_INHERITANCE)
        {
            return merge.finish();
        }

        merge
            .ancestors(
                iter::successors(self.parent_definition(), |event| event.parent_definition())
                    .map(|parent| parent.decorations(filter, false)),
            )
            .finish()
    }

    fn is_projected_by(&self, context: ContextId) -> bool {
        self.produced_by(context)
    }
}

impl Decorated for Projected<dyn FieldInfo> {
    fn decorations(&self, filter: &KindFilter, _inherit: bool) -> Vec<Decoration> {
        let member = Member::Field(self.inner.clone());
        let declared = self.context.table().member_decorations(&member);
        self.merge(filter, declared).finish()
    }

    fn is_projected_by(&self, context: ContextId) -> bool {
        self.produced_by(context)
    }
}

impl Decorated for Projected<dyn ParameterInfo> {
    fn decorations(&self, filter: &KindFilter, _inherit: bool) -> Vec<Decoration> {
        let declared = self
            .context
            .table()
            .parameter_decorations(self.inner.as_ref());
        self.merge(filter, declared).finish()
    }

    fn is_projected_by(&self, context: ContextId) -> bool {
        self.produced_by(context)
    }
}

// The table has no assembly slot.
impl Decorated for Projected<dyn AssemblyInfo> {
    fn decorations(&self, filter: &KindFilter, _inherit: bool) -> Vec<Decoration> {
        self.merge(filter, &[]).finish()
    }

    fn is_projected_by(&self, context: ContextId) -> bool {
        self.produced_by(context)
    }
}
