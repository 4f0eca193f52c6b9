//! Choose the enabled audio or subtitle track by language.

use crate::models::{MediaFile, MediaKind};

use super::set_language::resolve_language;
use super::{ActionContext, ActionError, ActionOutcome, ActionResult, ActionStep, ItemWorkspace};

/// Enable the first track of `kind` in `language` and disable the other
/// tracks of that kind. Files without such a track are left alone.
fn select_by_language(
    file: &mut MediaFile,
    kind: MediaKind,
    language: &str,
    ctx: &ActionContext<'_>,
) -> ActionResult<ActionOutcome> {
    let code = resolve_language(language).ok_or_else(|| {
        ActionError::precondition_failed(format!("'{}' is not a valid language", language))
    })?;

    let Some(chosen) = file
        .tracks_of(kind)
        .find(|t| t.language.eq_ignore_ascii_case(&code))
        .map(|t| t.id)
    else {
        return Ok(ActionOutcome::Skipped(format!(
            "No {} track in '{}'",
            kind.as_str(),
            code
        )));
    };

    let mut changed = false;
    for track in file.tracks_of_mut(kind) {
        let enabled = track.id == chosen;
        changed |= track.enabled != enabled;
        track.enabled = enabled;
    }

    if !changed {
        return Ok(ActionOutcome::Skipped(format!(
            "{} track in '{}' already selected",
            kind.as_str(),
            code
        )));
    }
    ctx.logger
        .info(&format!("Selected {} track {} ({})", kind.as_str(), chosen, code));
    Ok(ActionOutcome::Applied)
}

/// Make the audio track in a given language the default one.
#[derive(Debug, Clone, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct SelectAudioLanguage {
    /// Language code or English name.
    pub language: String,
}

impl SelectAudioLanguage {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl ActionStep for SelectAudioLanguage {
    fn name(&self) -> &'static str {
        "SelectAudioLanguage"
    }

    fn description(&self) -> String {
        format!("Select {} audio track", self.language)
    }

    fn working_description(&self) -> String {
        format!("Selecting {} audio track", self.language)
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        select_by_language(item.file, MediaKind::Audio, &self.language, ctx)
    }
}

/// Make the subtitle track in a given language the default one.
#[derive(Debug, Clone, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct SelectSubtitleLanguage {
    /// Language code or English name.
    pub language: String,
}

impl SelectSubtitleLanguage {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl ActionStep for SelectSubtitleLanguage {
    fn name(&self) -> &'static str {
        "SelectSubtitleLanguage"
    }

    fn description(&self) -> String {
        format!("Select {} subtitle track", self.language)
    }

    fn working_description(&self) -> String {
        format!("Selecting {} subtitle track", self.language)
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        select_by_language(item.file, MediaKind::Subtitle, &self.language, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::models::Track;
    use crate::test_support::ActionFixture;

    fn fixture() -> ActionFixture {
        let mut fixture = ActionFixture::new("/media/a.mkv");
        fixture.file.tracks = vec![
            Track::new(1, MediaKind::Video, "avc1"),
            Track::new(2, MediaKind::Audio, "mp4a").with_language("eng"),
            Track::new(3, MediaKind::Audio, "mp4a").with_language("ita"),
            Track::new(4, MediaKind::Subtitle, "tx3g").with_language("eng"),
            Track::new(5, MediaKind::Subtitle, "tx3g").with_language("ita"),
        ];
        for track in fixture.file.tracks.iter_mut() {
            track.enabled = matches!(track.id, 1 | 2 | 4);
        }
        fixture
    }

    fn enabled(fixture: &ActionFixture) -> Vec<u32> {
        fixture
            .file
            .tracks
            .iter()
            .filter(|t| t.enabled)
            .map(|t| t.id)
            .collect()
    }

    #[test]
    fn audio_selection_leaves_subtitles_alone() {
        let mut fixture = fixture();
        let outcome = fixture
            .run(&Action::SelectAudioLanguage(SelectAudioLanguage::new("Italian")))
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Applied);
        assert_eq!(enabled(&fixture), vec![1, 3, 4]);
    }

    #[test]
    fn subtitle_selection_uses_two_letter_codes() {
        let mut fixture = fixture();
        fixture
            .run(&Action::SelectSubtitleLanguage(SelectSubtitleLanguage::new("it")))
            .unwrap();
        assert_eq!(enabled(&fixture), vec![1, 2, 5]);
    }

    #[test]
    fn missing_or_selected_language_is_skipped() {
        let mut fixture = fixture();
        assert!(matches!(
            fixture.run(&Action::SelectAudioLanguage(SelectAudioLanguage::new("fra"))),
            Ok(ActionOutcome::Skipped(_))
        ));
        assert!(matches!(
            fixture.run(&Action::SelectAudioLanguage(SelectAudioLanguage::new("eng"))),
            Ok(ActionOutcome::Skipped(_))
        ));
        assert_eq!(enabled(&fixture), vec![1, 2, 4]);

        assert!(matches!(
            fixture.run(&Action::SelectSubtitleLanguage(SelectSubtitleLanguage::new("??"))),
            Err(ActionError::PreconditionFailed(_))
        ));
    }
}
