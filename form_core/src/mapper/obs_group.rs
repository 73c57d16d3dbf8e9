//! Plain group mapper.

use super::{apply_member_edit, ChildEdit, MapperKind, ObsMapper};
use crate::errors::ValidationError;
use crate::obs::Obs;

/// Keeps the edited child in place and leaves the rest of the group alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObsGroupMapper;

impl ObsMapper for ObsGroupMapper {
    fn kind(&self) -> MapperKind {
        MapperKind::ObsGroup
    }

    fn set_value(&self, group: &Obs, edit: &ChildEdit, _errors: &[ValidationError]) -> Obs {
        apply_member_edit(group, edit)
    }
}
