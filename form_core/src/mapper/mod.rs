//! # Obs-Group Mappers
//!
//! A mapper rewrites a group observation after one of its descendants changed:
//! `(group, childEdit, errors) -> newGroup`. Mappers hold no state; the group
//! control that owns one keeps the current group `Obs` and swaps it for the
//! mapper's result on every edit.
//!
//! ## Member rules (shared by every mapper)
//!
//! - An edit whose identity (namespace, else concept uuid) already exists in
//!   the group replaces that member at the same index.
//! - An unknown identity is appended as exactly one new member. Orphans are
//!   accepted; metadata/obs consistency is the design tooling's contract.
//! - A cleared leaf is kept and marked `voided`, so the member count never
//!   drops on a clear.
//! - A multi-select edit carries every current selection of one control.
//!   Earlier entries still selected keep their uuid, deselected ones are
//!   voided in place and new selections follow the control's block.
//! - A single edit of an identity that holds several entries replaces the
//!   one with its uuid (else the first) and voids the rest.
//!
//! ## Variants
//!
//! - [`ObsGroupMapper`] - the member rules, nothing else
//! - [`AbnormalObsGroupMapper`] - additionally derives the group's `abnormal`
//!   indicator through a pluggable [`AbnormalPolicy`]
//!
//! ## Example
//!
//! ```rust
//! use form_core::mapper::{mapper_for, MapperKind};
//! use form_core::metadata::{ControlMetadata, Properties};
//!
//! let plain = ControlMetadata::new("1", "obsGroupControl");
//! assert_eq!(mapper_for(&plain).kind(), MapperKind::ObsGroup);
//!
//! let flagged = plain.with_properties(Properties { is_abnormal: Some(true), ..Default::default() });
//! assert_eq!(mapper_for(&flagged).kind(), MapperKind::AbnormalObsGroup);
//! ```

pub mod abnormal;
pub mod obs_group;

pub use abnormal::{AbnormalObsGroupMapper, AbnormalPolicy, RangeAbnormalPolicy};
pub use obs_group::ObsGroupMapper;

use std::fmt::Debug;

use tracing::trace;

use crate::errors::ValidationError;
use crate::metadata::ControlMetadata;
use crate::obs::{is_empty_value, Obs};

/// What a child reported: one observation, or the full selection of a
/// multi-select leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildEdit {
    Single(Obs),
    /// Every current selection of the control owning `namespace`; an empty
    /// list clears them all
    Multiple { namespace: String, selections: Vec<Obs> },
}

impl ChildEdit {
    pub fn multiple(namespace: impl Into<String>, selections: Vec<Obs>) -> Self {
        ChildEdit::Multiple {
            namespace: namespace.into(),
            selections,
        }
    }

    /// Namespace of the control that sent the edit, when known.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            ChildEdit::Single(obs) => obs.form_namespace.as_deref(),
            ChildEdit::Multiple { namespace, .. } => Some(namespace),
        }
    }
}

impl From<Obs> for ChildEdit {
    fn from(obs: Obs) -> Self {
        ChildEdit::Single(obs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperKind {
    ObsGroup,
    AbnormalObsGroup,
}

/// Strategy for folding a child edit into its parent group.
pub trait ObsMapper: Debug + Send + Sync {
    fn kind(&self) -> MapperKind;

    /// Produce the new group. `group` is left untouched.
    fn set_value(&self, group: &Obs, edit: &ChildEdit, errors: &[ValidationError]) -> Obs;
}

/// Pick the mapper for a group control. Pure in `properties.isAbnormal`.
pub fn mapper_for(metadata: &ControlMetadata) -> Box<dyn ObsMapper> {
    if metadata.is_abnormal() {
        Box::new(AbnormalObsGroupMapper::new())
    } else {
        Box::new(ObsGroupMapper)
    }
}

/// Apply the member rules and return the rewritten group.
pub(crate) fn apply_member_edit(group: &Obs, edit: &ChildEdit) -> Obs {
    let mut members = group.members().to_vec();
    match edit {
        ChildEdit::Single(obs) => upsert(&mut members, normalize(obs)),
        ChildEdit::Multiple { namespace, selections } => replace_selections(&mut members, namespace, selections),
    }
    group.with_members(members)
}

fn upsert(members: &mut Vec<Obs>, obs: Obs) {
    let positions: Vec<usize> = members
        .iter()
        .enumerate()
        .filter(|(_, m)| m.same_identity(&obs))
        .map(|(index, _)| index)
        .collect();
    if positions.is_empty() {
        trace!(concept = %obs.concept.name, "appending group member");
        members.push(obs);
        return;
    }

    let target = positions
        .iter()
        .copied()
        .find(|&index| obs.uuid.is_some() && members[index].uuid == obs.uuid)
        .unwrap_or(positions[0]);
    trace!(concept = %obs.concept.name, index = target, "replacing group member");
    members[target] = obs;

    // leftovers of an earlier multi-select
    for index in positions.into_iter().filter(|&index| index != target) {
        if !members[index].voided {
            members[index] = members[index].void();
        }
    }
}

/// Multi-select: rewrite the block of entries owned by `namespace`, placed
/// where its first entry was. Nothing is removed.
fn replace_selections(members: &mut Vec<Obs>, namespace: &str, selections: &[Obs]) {
    let owned = |m: &Obs| m.form_namespace.as_deref() == Some(namespace);
    let start = members.iter().position(|m| owned(m)).unwrap_or(members.len());
    let previous: Vec<Obs> = members.iter().filter(|m| owned(m)).cloned().collect();
    members.retain(|m| !owned(m));

    let mut pending: Vec<Option<Obs>> = selections
        .iter()
        .map(|s| {
            Some(Obs {
                form_namespace: Some(namespace.to_string()),
                ..normalize(s)
            })
        })
        .collect();

    let mut block = Vec::with_capacity(previous.len() + selections.len());
    for old in previous {
        match take_match(&mut pending, &old) {
            Some(selected) => {
                let uuid = selected.uuid.clone().or(old.uuid);
                block.push(Obs { uuid, ..selected });
            }
            None if old.voided => block.push(old),
            None => {
                trace!(concept = %old.concept.name, "voiding deselected member");
                block.push(old.void());
            }
        }
    }
    block.extend(pending.into_iter().flatten());

    // entries before `start` are never owned, so `start` survives the retain
    members.splice(start..start, block);
}

/// The pending selection standing for `old`: same uuid, else same live value.
fn take_match(pending: &mut [Option<Obs>], old: &Obs) -> Option<Obs> {
    let index = pending.iter().position(|candidate| match candidate {
        Some(c) => match (&c.uuid, &old.uuid) {
            (Some(a), Some(b)) => a == b,
            _ => !old.voided && c.value.is_some() && c.value == old.value,
        },
        None => false,
    })?;
    pending[index].take()
}

/// Cleared leaves become voided; groups are voided only once every member is.
fn normalize(obs: &Obs) -> Obs {
    if obs.is_group() {
        let members = obs.members();
        let all_voided = !members.is_empty() && members.iter().all(|m| m.voided);
        return Obs {
            voided: all_voided,
            ..obs.clone()
        };
    }
    match &obs.value {
        None => obs.void(),
        Some(value) if is_empty_value(value) => obs.void(),
        Some(_) => obs.clone(),
    }
}
