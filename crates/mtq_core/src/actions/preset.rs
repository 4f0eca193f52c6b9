//! Metadata preset actions.

use crate::models::MetadataPreset;

use super::{ActionContext, ActionOutcome, ActionResult, ActionStep, ItemWorkspace};

/// Applies a saved metadata snapshot to the item.
///
/// The preset is copied into the action when it is created, so later
/// edits to the saved preset don't affect queued items.
#[derive(Debug, Clone, PartialEq, bitcode::Encode, bitcode::Decode)]
pub struct PresetApply {
    pub preset: MetadataPreset,
}

impl PresetApply {
    pub fn new(preset: MetadataPreset) -> Self {
        Self { preset }
    }
}

impl ActionStep for PresetApply {
    fn name(&self) -> &'static str {
        "PresetApply"
    }

    fn description(&self) -> String {
        format!("Apply {} preset", self.preset.title)
    }

    fn working_description(&self) -> String {
        format!("Applying {} preset", self.preset.title)
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        ctx.logger.debug(&format!(
            "Preset '{}': {} tags, {} artworks (replace annotations: {}, replace artworks: {})",
            self.preset.title,
            self.preset.metadata.tags.len(),
            self.preset.metadata.artworks.len(),
            self.preset.replace_annotations,
            self.preset.replace_artworks
        ));
        self.preset.apply_to(&mut item.file.metadata);
        Ok(ActionOutcome::Applied)
    }
}

/// Removes every existing annotation and artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearExistingMetadata;

impl ActionStep for ClearExistingMetadata {
    fn name(&self) -> &'static str {
        "ClearExistingMetadata"
    }

    fn description(&self) -> String {
        "Clear existing metadata".to_string()
    }

    fn working_description(&self) -> String {
        "Clearing existing metadata".to_string()
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        _ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        if item.file.metadata.is_empty() {
            return Ok(ActionOutcome::Skipped("No metadata".to_string()));
        }
        item.file.metadata.clear();
        Ok(ActionOutcome::Applied)
    }
}
