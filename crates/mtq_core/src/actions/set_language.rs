//! Set language action - tags tracks with unknown language.

use crate::models::{is_undetermined, normalize_language};

use super::{ActionContext, ActionError, ActionOutcome, ActionResult, ActionStep, ItemWorkspace};

/// Sets the language of every track currently marked `und`.
#[derive(Debug, Clone, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct SetLanguage {
    /// Language code or English name.
    pub language: String,
}

impl SetLanguage {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    fn resolved(&self) -> Option<String> {
        resolve_language(&self.language)
    }
}

/// Resolve a language code or English name to an ISO 639-2 code.
pub(super) fn resolve_language(language: &str) -> Option<String> {
    if let Some(code) = normalize_language(language) {
        return Some(code.to_string());
    }
    let trimmed = language.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(trimmed.to_ascii_lowercase())
    } else {
        None
    }
}

impl ActionStep for SetLanguage {
    fn name(&self) -> &'static str {
        "SetLanguage"
    }

    fn description(&self) -> String {
        format!("Set tracks language to {}", self.language)
    }

    fn working_description(&self) -> String {
        format!("Setting tracks language to {}", self.language)
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        let code = self.resolved().ok_or_else(|| {
            ActionError::precondition_failed(format!(
                "'{}' is not a valid language",
                self.language
            ))
        })?;

        if code == crate::models::UNDETERMINED {
            return Ok(ActionOutcome::Skipped("Target language is undetermined".to_string()));
        }

        let mut changed = 0;
        for track in item.file.tracks.iter_mut() {
            if is_undetermined(&track.language) {
                track.language = code.clone();
                changed += 1;
            }
        }

        if changed == 0 {
            return Ok(ActionOutcome::Skipped("No tracks with unknown language".to_string()));
        }
        ctx.logger
            .info(&format!("Set language '{}' on {} tracks", code, changed));
        Ok(ActionOutcome::Applied)
    }
}
