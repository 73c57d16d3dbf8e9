//! Section: a titled container. Transparent to change notifications.

use serde_json::Value;

use super::{ChildControls, Control, ControlProps, ControlValue, ValueChanged};
use crate::errors::FormResult;
use crate::metadata::ControlMetadata;
use crate::view::View;

#[derive(Debug)]
pub struct Section {
    metadata: ControlMetadata,
    children: ChildControls,
}

impl Section {
    pub fn new(props: ControlProps) -> FormResult<Self> {
        let children = ChildControls::build(
            &props.metadata.controls,
            &props.form_uuid,
            &props.records,
            &props.store,
        )?;
        Ok(Section {
            metadata: props.metadata,
            children,
        })
    }

    pub fn create(props: ControlProps) -> FormResult<Box<dyn Control>> {
        Ok(Box::new(Self::new(props)?))
    }

    pub fn children(&self) -> &ChildControls {
        &self.children
    }
}

impl Control for Section {
    fn metadata(&self) -> &ControlMetadata {
        &self.metadata
    }

    /// Always a list, possibly empty.
    fn get_value(&self) -> FormResult<Option<ControlValue>> {
        Ok(Some(ControlValue::List(self.children.values()?)))
    }

    fn render(&self) -> View {
        View::element("fieldset")
            .with_child(View::element("legend").with_text(self.metadata.display_text().unwrap_or_default()))
            .with_child(View::element("sectionControls").with_children(self.children.render()))
    }

    fn edit(&mut self, target: &str, value: Value) -> FormResult<Option<ValueChanged>> {
        self.children.route_edit(target, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Concept;
    use crate::obs::Obs;
    use crate::registry::ComponentStore;
    use serde_json::json;
    use std::sync::Arc;

    fn section() -> ControlMetadata {
        ControlMetadata::new("1", "section")
            .with_value("Vitals")
            .with_control(ControlMetadata::new("2", "label").with_value("Take vitals"))
            .with_control(
                ControlMetadata::new("3", "obsControl")
                    .with_concept(Concept::new("pulseUuid", "Pulse", "Numeric")),
            )
            .with_control(
                ControlMetadata::new("4", "obsControl")
                    .with_concept(Concept::new("tempUuid", "Temperature", "Numeric")),
            )
    }

    #[test]
    fn test_section_collects_child_observations() {
        let store = Arc::new(ComponentStore::with_defaults());
        let recorded = Obs::new(Concept::new("tempUuid", "Temperature", "Numeric"))
            .with_uuid("t-1")
            .with_namespace("formUuid/4")
            .set_value(json!(37.2));
        let props = ControlProps::new(section(), "formUuid", store).with_records(vec![recorded.clone()]);

        let mut section = Section::new(props).unwrap();
        assert_eq!(section.get_value(), Ok(Some(ControlValue::List(vec![ControlValue::Obs(recorded)]))));

        // edits pass through untouched
        let changed = section.edit("3", json!(80)).unwrap().unwrap();
        assert!(changed.errors.is_empty());

        let values = section.get_value().unwrap().unwrap().into_observations();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value, Some(json!(80)));
    }

    #[test]
    fn test_section_render() {
        let store = Arc::new(ComponentStore::with_defaults());
        let section = Section::new(ControlProps::new(section(), "f", store)).unwrap();
        let view = section.render();

        assert_eq!(view.find("legend").and_then(View::text), Some("Vitals"));
        assert_eq!(view.count("obsControl"), 2);
        assert_eq!(view.count("label"), 3);
    }
}
