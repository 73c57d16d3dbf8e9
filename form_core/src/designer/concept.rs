//! Control ids and concept-driven metadata construction.

use crate::metadata::{Concept, ControlMetadata, Label, Location};

/// Hands out control ids above every numeric id already in use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start after the highest numeric id anywhere in `controls`.
    /// Non-numeric ids are ignored.
    pub fn from_controls(controls: &[ControlMetadata]) -> Self {
        let last = controls
            .iter()
            .flat_map(|c| c.ids())
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        IdGenerator { last }
    }

    pub fn current(&self) -> u64 {
        self.last
    }

    pub fn next_id(&mut self) -> String {
        self.last += 1;
        self.last.to_string()
    }
}

/// Build the control tree for `concept`.
///
/// A concept set becomes a `group_type` node with one child per set member,
/// each on its own row in column 0; member sets nest the same way. Anything
/// else becomes a single `leaf_type` node. `id` is used for the root when
/// given, all other ids come from `id_gen` in depth-first order.
pub fn metadata_for_concept(
    concept: &Concept,
    id_gen: &mut IdGenerator,
    group_type: &str,
    leaf_type: &str,
    location: Option<Location>,
    id: Option<&str>,
) -> ControlMetadata {
    let id = id.map(str::to_string).unwrap_or_else(|| id_gen.next_id());
    let location = location.unwrap_or(Location::new(0, 0));

    if !concept.is_set() {
        return ControlMetadata::new(id, leaf_type)
            .with_label(Label::new(concept.name.clone()))
            .with_concept(concept.clone())
            .with_location(location.row, location.column);
    }

    let mut group_concept = concept.clone();
    let members = std::mem::take(&mut group_concept.set_members);
    let mut metadata = ControlMetadata::new(id, group_type)
        .with_label(Label::new(concept.name.clone()))
        .with_concept(group_concept)
        .with_location(location.row, location.column);

    for (row, member) in members.iter().enumerate() {
        metadata = metadata.with_control(metadata_for_concept(
            member,
            id_gen,
            group_type,
            leaf_type,
            Some(Location::new(row, 0)),
            None,
        ));
    }
    metadata
}
