//! Output filename action - names the destination after the metadata.

use crate::models::{keys, Metadata};

use super::{ActionContext, ActionOutcome, ActionResult, ActionStep, ItemWorkspace};

/// Characters not allowed in a file name on common filesystems.
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Rename the destination file from the title or episode metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetOutputFilename;

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

fn integer(metadata: &Metadata, key: &str) -> Option<i64> {
    let value = metadata.get(key)?;
    value
        .as_integer()
        .or_else(|| value.as_text().and_then(|s| s.trim().parse().ok()))
}

/// `Show S01E02` for episodes, `Title` for everything else.
fn output_stem(metadata: &Metadata) -> Option<String> {
    let show = metadata
        .get(keys::TV_SHOW)
        .and_then(|v| v.as_text())
        .filter(|s| !s.trim().is_empty());
    if let (Some(show), Some(season), Some(episode)) = (
        show,
        integer(metadata, keys::TV_SEASON),
        integer(metadata, keys::TV_EPISODE_NUMBER),
    ) {
        return Some(format!("{} S{:02}E{:02}", show.trim(), season, episode));
    }

    metadata
        .get(keys::NAME)
        .and_then(|v| v.as_text())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
}

impl ActionStep for SetOutputFilename {
    fn name(&self) -> &'static str {
        "SetOutputFilename"
    }

    fn description(&self) -> String {
        "Set output filename".to_string()
    }

    fn working_description(&self) -> String {
        "Setting output filename".to_string()
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        let Some(stem) = output_stem(&item.file.metadata).map(|s| sanitize(&s)) else {
            return Ok(ActionOutcome::Skipped("Not enough metadata".to_string()));
        };
        if stem.is_empty() {
            return Ok(ActionOutcome::Skipped("Not enough metadata".to_string()));
        }

        let mut renamed = item.destination.clone();
        let file_name = match item.destination.extension() {
            Some(ext) => format!("{}.{}", stem, ext.to_string_lossy()),
            None => stem,
        };
        renamed.set_file_name(file_name);

        if renamed.as_path() == item.source {
            return Ok(ActionOutcome::Skipped("Name would overwrite source".to_string()));
        }

        ctx.logger.info(&format!(
            "Output renamed: {} -> {}",
            item.destination.display(),
            renamed.display()
        ));
        *item.destination = renamed;
        Ok(ActionOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::test_support::ActionFixture;
    use std::path::PathBuf;

    #[test]
    fn movie_title() {
        let mut fixture = ActionFixture::new("/media/heat.1995.mkv");
        fixture.destination = PathBuf::from("/out/heat.1995.mp4");
        fixture.file.metadata = Metadata::new().with_tag(keys::NAME, "Heat: Director's Cut");

        fixture.run(&Action::SetOutputFilename(SetOutputFilename)).unwrap();
        assert_eq!(fixture.destination, PathBuf::from("/out/Heat_ Director's Cut.mp4"));
    }

    #[test]
    fn tv_episode() {
        let mut fixture = ActionFixture::new("/media/x.mkv");
        fixture.destination = PathBuf::from("/out/x.m4v");
        fixture.file.metadata = Metadata::new()
            .with_tag(keys::NAME, "Pilot")
            .with_tag(keys::TV_SHOW, "Lost")
            .with_tag(keys::TV_SEASON, 1i64)
            .with_tag(keys::TV_EPISODE_NUMBER, "3");

        fixture.run(&Action::SetOutputFilename(SetOutputFilename)).unwrap();
        assert_eq!(fixture.destination, PathBuf::from("/out/Lost S01E03.m4v"));
    }

    #[test]
    fn insufficient_metadata_is_a_no_op() {
        let mut fixture = ActionFixture::new("/media/x.mkv");
        fixture.destination = PathBuf::from("/out/x.mp4");
        let outcome = fixture.run(&Action::SetOutputFilename(SetOutputFilename)).unwrap();
        assert!(matches!(outcome, ActionOutcome::Skipped(_)));
        assert_eq!(fixture.destination, PathBuf::from("/out/x.mp4"));
    }
}
