//! Per-type and per-method table entries.

use std::collections::HashMap;

use crate::metadata::{
    decorations::Decoration,
    table::{MemberKey, MethodKey},
};

/// Decorations attached to one method
#[derive(Debug, Clone, Default)]
pub struct MethodMetadata {
    pub(crate) decorations: Vec<Decoration>,
    /// One list per parameter, index-aligned with the method's parameters
    pub(crate) parameters: Vec<Vec<Decoration>>,
    pub(crate) return_parameter: Vec<Decoration>,
}

impl MethodMetadata {
    pub(crate) fn new(parameter_count: usize) -> Self {
        MethodMetadata {
            decorations: Vec::new(),
            parameters: vec![Vec::new(); parameter_count],
            return_parameter: Vec::new(),
        }
    }

    /// Method-level decorations
    #[must_use]
    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Number of parameter slots
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Decorations of the parameter at `position`; `-1` selects the return parameter.
    /// Positions without a slot yield an empty list.
    #[must_use]
    pub fn parameter(&self, position: i32) -> &[Decoration] {
        if position == -1 {
            return &self.return_parameter;
        }

        usize::try_from(position)
            .ok()
            .and_then(|position| self.parameters.get(position))
            .map_or(&[][..], Vec::as_slice)
    }

    pub(crate) fn parameter_mut(&mut self, position: i32) -> Option<&mut Vec<Decoration>> {
        if position == -1 {
            return Some(&mut self.return_parameter);
        }

        usize::try_from(position)
            .ok()
            .and_then(|position| self.parameters.get_mut(position))
    }
}

/// Decorations attached to one declaring type and its members
#[derive(Debug, Clone, Default)]
pub struct TypeMetadata {
    pub(crate) decorations: Vec<Decoration>,
    pub(crate) members: HashMap<MemberKey, Vec<Decoration>>,
    pub(crate) methods: HashMap<MethodKey, MethodMetadata>,
}

impl TypeMetadata {
    /// Type-level decorations
    #[must_use]
    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Decorations of the field, property or event addressed by `key`
    #[must_use]
    pub fn member(&self, key: &MemberKey) -> &[Decoration] {
        self.members.get(key).map_or(&[][..], Vec::as_slice)
    }

    /// Entry of the method addressed by `key`
    #[must_use]
    pub fn method(&self, key: &MethodKey) -> Option<&MethodMetadata> {
        self.methods.get(key)
    }

    /// All decorated fields, properties and events
    pub fn members(&self) -> impl Iterator<Item = (&MemberKey, &[Decoration])> {
        self.members
            .iter()
            .map(|(key, decorations)| (key, decorations.as_slice()))
    }

    /// All decorated methods
    pub fn methods(&self) -> impl Iterator<Item = (&MethodKey, &MethodMetadata)> {
        self.methods.iter()
    }

    /// Total number of decorations in this entry
    #[must_use]
    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
            + self.members.values().map(Vec::len).sum::<usize>()
            + self
                .methods
                .values()
                .map(|method| {
                    method.decorations.len()
                        + method.return_parameter.len()
                        + method.parameters.iter().map(Vec::len).sum::<usize>()
                })
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::decorations::DecorationKind;

    #[test]
    fn test_parameter_slots() {
        let kind = DecorationKind::new("Tests.NoteAttribute");
        let mut method = MethodMetadata::new(2);

        method
            .parameter_mut(0)
            .unwrap()
            .push(Decoration::new(&kind));
        method
            .parameter_mut(-1)
            .unwrap()
            .push(Decoration::new(&kind));

        assert_eq!(method.parameter(0).len(), 1);
        assert!(method.parameter(1).is_empty());
        assert_eq!(method.parameter(-1).len(), 1);
        assert!(method.parameter(2).is_empty());
        assert!(method.parameter(-2).is_empty());
        assert!(method.parameter_mut(2).is_none());
        assert!(method.parameter_mut(-2).is_none());
    }

    #[test]
    fn test_absent_member_is_empty() {
        let metadata = TypeMetadata::default();
        assert!(metadata
            .member(&MemberKey::new(crate::metadata::reflection::MemberKind::Field, "x"))
            .is_empty());
        assert_eq!(metadata.decoration_count(), 0);
    }
}
