//! Chapter title cleanup.

use super::{ActionContext, ActionOutcome, ActionResult, ActionStep, ItemWorkspace};

/// Replace chapter titles with sequential "Chapter N" names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenameChapters;

impl ActionStep for RenameChapters {
    fn name(&self) -> &'static str {
        "RenameChapters"
    }

    fn description(&self) -> String {
        "Rename chapters".to_string()
    }

    fn working_description(&self) -> String {
        "Renaming chapters".to_string()
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        if item.file.chapters.is_empty() {
            return Ok(ActionOutcome::Skipped("No chapters".to_string()));
        }

        let mut renamed = 0;
        for (index, chapter) in item.file.chapters.iter_mut().enumerate() {
            let title = format!("Chapter {}", index + 1);
            if chapter.title != title {
                chapter.title = title;
                renamed += 1;
            }
        }

        if renamed == 0 {
            return Ok(ActionOutcome::Skipped("Chapters already numbered".to_string()));
        }
        ctx.logger.info(&format!("Renamed {} chapters", renamed));
        Ok(ActionOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::models::Chapter;
    use crate::test_support::ActionFixture;

    #[test]
    fn chapters_get_sequential_titles() {
        let mut fixture = ActionFixture::new("/media/a.mkv");
        fixture.file.chapters = vec![
            Chapter::new(0, "Opening"),
            Chapter::new(90_000, "Chapter 2"),
            Chapter::new(300_000, ""),
        ];

        let outcome = fixture.run(&Action::RenameChapters(RenameChapters)).unwrap();
        assert_eq!(outcome, ActionOutcome::Applied);
        let titles: Vec<_> = fixture.file.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Chapter 1", "Chapter 2", "Chapter 3"]);
        assert_eq!(fixture.file.chapters[1].start_ms, 90_000);

        assert!(matches!(
            fixture.run(&Action::RenameChapters(RenameChapters)),
            Ok(ActionOutcome::Skipped(_))
        ));
    }

    #[test]
    fn files_without_chapters_are_skipped() {
        let mut fixture = ActionFixture::new("/media/a.mkv");
        assert!(matches!(
            fixture.run(&Action::RenameChapters(RenameChapters)),
            Ok(ActionOutcome::Skipped(_))
        ));
    }
}
