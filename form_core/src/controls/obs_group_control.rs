//! Obs-group control: composes its children and keeps the group observation
//! in sync with every descendant edit.
//!
//! The mapper is chosen once, from `properties.isAbnormal`, when the control
//! is constructed, and never replaced afterwards; [`ObsGroupControl::rebind`]
//! swaps the observation but keeps the mapper.
//!
//! Validation errors are tracked per member identity so a clean edit of one
//! member does not hide an outstanding error on another. What bubbles up is
//! the union of all of them.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{group_by_row, ChildControls, Control, ControlProps, ControlValue, ValueChanged};
use crate::errors::{merge_errors, FormError, FormResult, ValidationError};
use crate::mapper::{mapper_for, ChildEdit, MapperKind, ObsMapper};
use crate::metadata::ControlMetadata;
use crate::obs::Obs;
use crate::registry::ComponentStore;
use crate::view::View;

#[derive(Debug)]
pub struct ObsGroupControl {
    metadata: ControlMetadata,
    form_uuid: String,
    store: Arc<ComponentStore>,
    mapper: Box<dyn ObsMapper>,
    obs: Obs,
    children: ChildControls,
    member_errors: Vec<(String, Vec<ValidationError>)>,
}

impl ObsGroupControl {
    pub fn new(props: ControlProps) -> FormResult<Self> {
        let namespace = props.namespace();
        let concept = props
            .metadata
            .concept
            .clone()
            .ok_or_else(|| FormError::missing_field(format!("controls[{}].concept", props.metadata.id)))?;

        let mapper = mapper_for(&props.metadata);
        let obs = props
            .obs
            .unwrap_or_else(|| Obs::group(concept, Vec::new()).with_namespace(namespace));
        let children = ChildControls::build(&props.metadata.controls, &props.form_uuid, obs.members(), &props.store)?;
        debug!(id = %props.metadata.id, mapper = ?mapper.kind(), "bound obs group");

        Ok(ObsGroupControl {
            metadata: props.metadata,
            form_uuid: props.form_uuid,
            store: props.store,
            mapper,
            obs,
            children,
            member_errors: Vec::new(),
        })
    }

    pub fn create(props: ControlProps) -> FormResult<Box<dyn Control>> {
        Ok(Box::new(Self::new(props)?))
    }

    pub fn obs(&self) -> &Obs {
        &self.obs
    }

    pub fn mapper(&self) -> &dyn ObsMapper {
        self.mapper.as_ref()
    }

    pub fn mapper_kind(&self) -> MapperKind {
        self.mapper.kind()
    }

    pub fn children(&self) -> &ChildControls {
        &self.children
    }

    /// Union of the outstanding errors of every member.
    pub fn errors(&self) -> Vec<ValidationError> {
        self.member_errors
            .iter()
            .fold(Vec::new(), |acc, (_, errors)| merge_errors(&acc, errors))
    }

    /// Fold a child's change into the group and produce the notification for
    /// this control's parent.
    pub fn on_change(&mut self, edit: impl Into<ChildEdit>, errors: Vec<ValidationError>) -> ValueChanged {
        let edit = edit.into();
        self.obs = self.mapper.set_value(&self.obs, &edit, &errors);
        self.record_errors(edit_key(&edit), errors);
        ValueChanged::new(self.obs.clone(), self.errors())
    }

    /// Bind a new observation (re-render); the mapper stays.
    pub fn rebind(&mut self, obs: Obs) -> FormResult<()> {
        self.children = ChildControls::build(&self.metadata.controls, &self.form_uuid, obs.members(), &self.store)?;
        self.obs = obs;
        self.member_errors.clear();
        Ok(())
    }

    fn record_errors(&mut self, key: String, errors: Vec<ValidationError>) {
        match self.member_errors.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = errors,
            None => self.member_errors.push((key, errors)),
        }
    }
}

/// Stable key for a member: namespace, else concept uuid.
fn edit_key(edit: &ChildEdit) -> String {
    match edit {
        ChildEdit::Single(obs) => obs.form_namespace.clone().unwrap_or_else(|| obs.concept.uuid.clone()),
        ChildEdit::Multiple { namespace, .. } => namespace.clone(),
    }
}

impl Control for ObsGroupControl {
    fn metadata(&self) -> &ControlMetadata {
        &self.metadata
    }

    fn get_value(&self) -> FormResult<Option<ControlValue>> {
        if self.obs.has_data() {
            Ok(Some(ControlValue::Obs(self.obs.clone())))
        } else {
            Ok(None)
        }
    }

    fn render(&self) -> View {
        let legend = self
            .metadata
            .concept
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_default();

        let mut view = View::element("fieldset");
        if self.metadata.is_add_more() {
            view = view.with_child(View::element("addMore"));
        }
        let rows = group_by_row(&self.metadata.controls)
            .into_values()
            .map(|controls| {
                let ids: Vec<&str> = controls.iter().map(|c| c.id.as_str()).collect();
                View::element("row").with_children(self.children.render_ids(&ids))
            })
            .collect();

        view.with_child(View::element("legend").with_text(legend))
            .with_child(View::element("obsGroupControls").with_children(rows))
    }

    fn edit(&mut self, target: &str, value: Value) -> FormResult<Option<ValueChanged>> {
        if target == self.metadata.id {
            return Err(FormError::invalid_input(
                target,
                value.to_string(),
                "an obs group takes its value from its members",
            ));
        }
        let Some(changed) = self.children.route_edit(target, value)? else {
            return Ok(None);
        };
        Ok(Some(self.on_change(changed.obs, changed.errors)))
    }
}
