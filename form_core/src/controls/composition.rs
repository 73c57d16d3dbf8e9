//! Child-control composition shared by every container control.
//!
//! A container hands its ordered child metadata to [`ChildControls::build`],
//! which resolves each type through the store, locates each child's
//! observation by namespace, and keeps the live children in definition
//! order with an id index built once per build.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{Control, ControlProps, ControlValue, ValueChanged};
use crate::errors::{FormError, FormResult};
use crate::metadata::ControlMetadata;
use crate::obs::{find_by_namespace, Obs};
use crate::registry::ComponentStore;
use crate::view::View;

/// One child position: a live control, or an empty slot for an unresolved type.
#[derive(Debug)]
enum Slot {
    Live(Box<dyn Control>),
    Unresolved(String),
}

#[derive(Debug, Default)]
pub struct ChildControls {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

impl ChildControls {
    /// Instantiate every child of `controls`.
    ///
    /// `records` are the observations children look their own up in: the
    /// form's records for top-level containers, the group members inside an
    /// obs group. Constructor errors propagate.
    pub fn build(
        controls: &[ControlMetadata],
        form_uuid: &str,
        records: &[Obs],
        store: &Arc<ComponentStore>,
    ) -> FormResult<Self> {
        let mut slots = Vec::with_capacity(controls.len());
        let mut index = HashMap::new();

        for metadata in controls {
            let Some(factory) = store.get_component(&metadata.control_type) else {
                debug!(id = %metadata.id, control_type = %metadata.control_type, "skipping unresolved control");
                slots.push(Slot::Unresolved(metadata.id.clone()));
                continue;
            };

            let namespace = Obs::namespace(form_uuid, &metadata.id);
            let mut props = ControlProps::new(metadata.clone(), form_uuid, Arc::clone(store))
                .with_records(records.to_vec());
            if let Some(obs) = find_by_namespace(records, &namespace) {
                props = props.with_obs(obs.clone());
            }

            let control = factory(props)?;
            index.insert(metadata.id.clone(), slots.len());
            slots.push(Slot::Live(control));
        }

        Ok(ChildControls { slots, index })
    }

    /// Live children in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Control> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Live(control) => Some(control.as_ref()),
            Slot::Unresolved(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&dyn Control> {
        match self.slots.get(*self.index.get(id)?)? {
            Slot::Live(control) => Some(control.as_ref()),
            Slot::Unresolved(_) => None,
        }
    }

    /// Ids of children whose type did not resolve.
    pub fn unresolved(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Unresolved(id) => Some(id.as_str()),
                Slot::Live(_) => None,
            })
            .collect()
    }

    /// Children's values in order, without the ones that reported nothing.
    ///
    /// The first child error is returned as is.
    pub fn values(&self) -> FormResult<Vec<ControlValue>> {
        let mut values = Vec::new();
        for control in self.iter() {
            if let Some(value) = control.get_value()? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Views in definition order; unresolved slots render [`View::Empty`].
    pub fn render(&self) -> Vec<View> {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Live(control) => control.render(),
                Slot::Unresolved(_) => View::Empty,
            })
            .collect()
    }

    /// Render the children whose ids are listed, in the listed order.
    pub fn render_ids(&self, ids: &[&str]) -> Vec<View> {
        ids.iter()
            .map(|id| self.get(id).map(|c| c.render()).unwrap_or(View::Empty))
            .collect()
    }

    /// Id of the direct child whose subtree holds `target`.
    pub fn owner_of(&self, target: &str) -> Option<&str> {
        self.iter()
            .find(|c| c.metadata().find(target).is_some())
            .map(|c| c.id())
    }

    /// Send an edit down to the child whose subtree holds `target`.
    pub fn route_edit(&mut self, target: &str, value: Value) -> FormResult<Option<ValueChanged>> {
        for slot in &mut self.slots {
            if let Slot::Live(control) = slot {
                if control.metadata().find(target).is_some() {
                    return control.edit(target, value);
                }
            }
        }
        Err(FormError::unknown_control(target))
    }
}

/// Group controls by `properties.location.row`, keeping relative order.
pub fn group_by_row(controls: &[ControlMetadata]) -> BTreeMap<usize, Vec<&ControlMetadata>> {
    let mut rows: BTreeMap<usize, Vec<&ControlMetadata>> = BTreeMap::new();
    for control in controls {
        rows.entry(control.row()).or_default().push(control);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Concept;
    use serde_json::json;

    #[derive(Debug)]
    struct Silent {
        metadata: ControlMetadata,
    }

    impl Control for Silent {
        fn metadata(&self) -> &ControlMetadata {
            &self.metadata
        }

        fn get_value(&self) -> FormResult<Option<ControlValue>> {
            Ok(None)
        }

        fn render(&self) -> View {
            View::element("silent")
        }
    }

    #[derive(Debug)]
    struct Echo {
        metadata: ControlMetadata,
        form_uuid: String,
    }

    impl Control for Echo {
        fn metadata(&self) -> &ControlMetadata {
            &self.metadata
        }

        fn get_value(&self) -> FormResult<Option<ControlValue>> {
            let obs = Obs::new(Concept::default())
                .with_uuid(self.form_uuid.clone())
                .with_namespace(self.metadata.id.clone());
            Ok(Some(ControlValue::Obs(obs)))
        }

        fn render(&self) -> View {
            View::element("echo")
        }
    }

    #[derive(Debug)]
    struct Broken {
        metadata: ControlMetadata,
    }

    impl Control for Broken {
        fn metadata(&self) -> &ControlMetadata {
            &self.metadata
        }

        fn get_value(&self) -> FormResult<Option<ControlValue>> {
            Err(FormError::missing_field("concept"))
        }

        fn render(&self) -> View {
            View::Empty
        }
    }

    fn silent(p: ControlProps) -> FormResult<Box<dyn Control>> {
        Ok(Box::new(Silent { metadata: p.metadata }))
    }

    fn echo(p: ControlProps) -> FormResult<Box<dyn Control>> {
        Ok(Box::new(Echo {
            metadata: p.metadata,
            form_uuid: p.form_uuid,
        }))
    }

    fn broken(p: ControlProps) -> FormResult<Box<dyn Control>> {
        Ok(Box::new(Broken { metadata: p.metadata }))
    }

    fn store() -> Arc<ComponentStore> {
        let store = ComponentStore::new();
        store.register_component("silent", silent);
        store.register_component("echo", echo);
        store.register_component("broken", broken);
        Arc::new(store)
    }

    #[test]
    fn test_values_drop_silent_children_and_keep_order() {
        let controls = vec![
            ControlMetadata::new("1", "echo"),
            ControlMetadata::new("2", "silent"),
            ControlMetadata::new("3", "echo"),
            ControlMetadata::new("4", "silent"),
        ];
        let children = ChildControls::build(&controls, "formUuid", &[], &store()).unwrap();

        let namespaces: Vec<_> = children
            .values()
            .unwrap()
            .into_iter()
            .map(|v| v.as_obs().and_then(|o| o.form_namespace.clone()).unwrap())
            .collect();
        assert_eq!(namespaces, vec!["1", "3"]);
    }

    #[test]
    fn test_child_error_propagates() {
        let controls = vec![ControlMetadata::new("1", "echo"), ControlMetadata::new("2", "broken")];
        let children = ChildControls::build(&controls, "f", &[], &store()).unwrap();

        assert_eq!(children.values(), Err(FormError::missing_field("concept")));
    }

    #[test]
    fn test_unresolved_type_renders_empty() {
        let controls = vec![ControlMetadata::new("1", "echo"), ControlMetadata::new("2", "nope")];
        let children = ChildControls::build(&controls, "f", &[], &store()).unwrap();

        assert_eq!(children.len(), 1);
        assert_eq!(children.unresolved(), vec!["2"]);
        assert_eq!(children.render(), vec![View::element("echo"), View::Empty]);
    }

    #[test]
    fn test_route_edit_to_unknown_target() {
        let controls = vec![ControlMetadata::new("1", "silent")];
        let mut children = ChildControls::build(&controls, "f", &[], &store()).unwrap();

        assert_eq!(children.route_edit("1", json!(1)), Ok(None));
        assert_eq!(
            children.route_edit("9", json!(1)),
            Err(FormError::unknown_control("9"))
        );
    }

    #[test]
    fn test_group_by_row_preserves_order() {
        let controls = vec![
            ControlMetadata::new("a", "x").with_location(1, 0),
            ControlMetadata::new("b", "x").with_location(0, 1),
            ControlMetadata::new("c", "x").with_location(1, 1),
            ControlMetadata::new("d", "x").with_location(0, 0),
        ];
        let rows = group_by_row(&controls);

        let ids = |row: usize| rows[&row].iter().map(|c| c.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids(0), vec!["b", "d"]);
        assert_eq!(ids(1), vec!["a", "c"]);
    }
}
