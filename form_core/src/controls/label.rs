//! Presentational label. Never reports a value.

use super::{Control, ControlProps, ControlValue};
use crate::errors::FormResult;
use crate::metadata::ControlMetadata;
use crate::view::View;

#[derive(Debug)]
pub struct LabelControl {
    metadata: ControlMetadata,
}

impl LabelControl {
    pub fn create(props: ControlProps) -> FormResult<Box<dyn Control>> {
        Ok(Box::new(LabelControl {
            metadata: props.metadata,
        }))
    }
}

impl Control for LabelControl {
    fn metadata(&self) -> &ControlMetadata {
        &self.metadata
    }

    fn get_value(&self) -> FormResult<Option<ControlValue>> {
        Ok(None)
    }

    fn render(&self) -> View {
        View::element("label").with_text(self.metadata.display_text().unwrap_or_default())
    }
}
