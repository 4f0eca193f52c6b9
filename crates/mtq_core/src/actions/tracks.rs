//! Track housekeeping actions: alternate groups, fallbacks and names.

use std::collections::{BTreeMap, HashSet};

use crate::models::{MediaFile, MediaKind, Track};

use super::{ActionContext, ActionOutcome, ActionResult, ActionStep, ItemWorkspace};

/// Alternate group for audio tracks.
const AUDIO_GROUP: u16 = 1;
/// Alternate group for subtitle and closed caption tracks.
const TEXT_GROUP: u16 = 2;

fn group_for(kind: MediaKind) -> u16 {
    match kind {
        MediaKind::Audio => AUDIO_GROUP,
        MediaKind::Subtitle | MediaKind::ClosedCaption => TEXT_GROUP,
        _ => 0,
    }
}

/// Put mutually exclusive tracks into consistent alternate groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupsOrganize;

impl ActionStep for GroupsOrganize {
    fn name(&self) -> &'static str {
        "GroupsOrganize"
    }

    fn description(&self) -> String {
        "Organize alternate groups".to_string()
    }

    fn working_description(&self) -> String {
        "Organizing alternate groups".to_string()
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        if item.file.tracks.is_empty() {
            return Ok(ActionOutcome::Skipped("No tracks".to_string()));
        }

        for track in item.file.tracks.iter_mut() {
            track.alternate_group = group_for(track.kind);
        }

        // Keep exactly one enabled track per group.
        let mut members: BTreeMap<u16, Vec<usize>> = BTreeMap::new();
        for (index, track) in item.file.tracks.iter().enumerate() {
            if track.alternate_group != 0 {
                members.entry(track.alternate_group).or_default().push(index);
            }
        }
        for (group, indexes) in members {
            let keep = indexes
                .iter()
                .copied()
                .find(|&i| item.file.tracks[i].enabled)
                .unwrap_or(indexes[0]);
            for i in indexes {
                item.file.tracks[i].enabled = i == keep;
            }
            ctx.logger.debug(&format!(
                "Group {}: track {} enabled",
                group, item.file.tracks[keep].id
            ));
        }

        Ok(ActionOutcome::Applied)
    }
}

/// Repair fallback references after tracks were added or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FallbacksFix;

impl FallbacksFix {
    fn valid_fallback(file: &MediaFile, track: &Track, target: u32) -> bool {
        target != track.id
            && file
                .track(target)
                .is_some_and(|t| t.kind == MediaKind::Audio)
    }
}

impl ActionStep for FallbacksFix {
    fn name(&self) -> &'static str {
        "FallbacksFix"
    }

    fn description(&self) -> String {
        "Fix fallbacks".to_string()
    }

    fn working_description(&self) -> String {
        "Fixing fallbacks".to_string()
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        let file = &*item.file;
        let mut cleared = HashSet::new();
        for track in &file.tracks {
            if let Some(target) = track.fallback_track_id {
                if !Self::valid_fallback(file, track, target) {
                    cleared.insert(track.id);
                }
            }
        }

        // AC-3 tracks fall back to an AAC track of the same language and group.
        let mut linked = Vec::new();
        for track in file.tracks.iter().filter(|t| t.is_ac3()) {
            let needs_link = track.fallback_track_id.is_none() || cleared.contains(&track.id);
            if !needs_link {
                continue;
            }
            let aac = file.tracks.iter().find(|t| {
                t.is_aac()
                    && t.language == track.language
                    && t.alternate_group == track.alternate_group
            });
            if let Some(aac) = aac {
                linked.push((track.id, aac.id));
            }
        }

        if cleared.is_empty() && linked.is_empty() {
            return Ok(ActionOutcome::Skipped("Fallbacks already valid".to_string()));
        }

        for track in item.file.tracks.iter_mut() {
            if cleared.contains(&track.id) {
                track.fallback_track_id = None;
            }
            if let Some((_, target)) = linked.iter().find(|(id, _)| *id == track.id) {
                track.fallback_track_id = Some(*target);
            }
        }

        ctx.logger.info(&format!(
            "Cleared {} invalid fallbacks, linked {} tracks",
            cleared.len(),
            linked.len()
        ));
        Ok(ActionOutcome::Applied)
    }
}

/// Remove user-visible track names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearTrackNames;

impl ActionStep for ClearTrackNames {
    fn name(&self) -> &'static str {
        "ClearTrackNames"
    }

    fn description(&self) -> String {
        "Clear tracks names".to_string()
    }

    fn working_description(&self) -> String {
        "Clearing tracks names".to_string()
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        _ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        let mut changed = false;
        for track in item.file.tracks.iter_mut() {
            changed |= track.name.take().is_some();
        }
        Ok(if changed {
            ActionOutcome::Applied
        } else {
            ActionOutcome::Skipped("No named tracks".to_string())
        })
    }
}

/// Name unnamed audio tracks after their channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrettifyAudioTrackNames;

fn channel_layout_name(channels: u16) -> Option<&'static str> {
    match channels {
        0 => None,
        1 => Some("Mono"),
        2 => Some("Stereo"),
        _ => Some("Surround"),
    }
}

impl ActionStep for PrettifyAudioTrackNames {
    fn name(&self) -> &'static str {
        "PrettifyAudioTrackNames"
    }

    fn description(&self) -> String {
        "Prettify audio tracks names".to_string()
    }

    fn working_description(&self) -> String {
        "Prettifying audio tracks names".to_string()
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        _ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        let mut changed = false;
        for track in item.file.tracks_of_mut(MediaKind::Audio) {
            if track.name.as_deref().is_some_and(|n| !n.trim().is_empty()) {
                continue;
            }
            if let Some(name) = channel_layout_name(track.channels) {
                track.name = Some(name.to_string());
                changed = true;
            }
        }
        Ok(if changed {
            ActionOutcome::Applied
        } else {
            ActionOutcome::Skipped("No unnamed audio tracks".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::test_support::ActionFixture;

    fn sample_tracks() -> Vec<Track> {
        let mut tracks = vec![
            Track::new(1, MediaKind::Video, "avc1"),
            Track::new(2, MediaKind::Audio, "mp4a").with_language("eng").with_channels(2),
            Track::new(3, MediaKind::Audio, "ac-3").with_language("eng").with_channels(6),
            Track::new(4, MediaKind::Subtitle, "tx3g").with_language("eng"),
            Track::new(5, MediaKind::Subtitle, "tx3g").with_language("fra"),
        ];
        tracks[2].enabled = true;
        tracks[3].enabled = false;
        tracks[4].enabled = false;
        tracks
    }

    #[test]
    fn groups_organize_assigns_groups_and_single_enabled() {
        let mut fixture = ActionFixture::new("/media/a.mp4");
        fixture.file.tracks = sample_tracks();

        fixture.run(&Action::GroupsOrganize(GroupsOrganize)).unwrap();

        let groups: Vec<_> = fixture.file.tracks.iter().map(|t| t.alternate_group).collect();
        assert_eq!(groups, vec![0, 1, 1, 2, 2]);

        let enabled: Vec<_> = fixture.file.tracks.iter().map(|t| t.enabled).collect();
        // Video untouched; first enabled audio kept; first subtitle forced on.
        assert_eq!(enabled, vec![true, true, false, true, false]);
    }

    #[test]
    fn fallbacks_fix_links_ac3_to_aac() {
        let mut fixture = ActionFixture::new("/media/a.mp4");
        let mut tracks = sample_tracks();
        for track in tracks.iter_mut() {
            track.alternate_group = group_for(track.kind);
        }
        tracks[3].fallback_track_id = Some(99);
        fixture.file.tracks = tracks;

        let outcome = fixture.run(&Action::FallbacksFix(FallbacksFix)).unwrap();
        assert_eq!(outcome, ActionOutcome::Applied);
        assert_eq!(fixture.file.tracks[2].fallback_track_id, Some(2));
        assert_eq!(fixture.file.tracks[3].fallback_track_id, None);

        let again = fixture.run(&Action::FallbacksFix(FallbacksFix)).unwrap();
        assert!(matches!(again, ActionOutcome::Skipped(_)));
    }

    #[test]
    fn fallbacks_fix_ignores_other_languages() {
        let mut fixture = ActionFixture::new("/media/a.mp4");
        fixture.file.tracks = vec![
            Track::new(1, MediaKind::Audio, "mp4a").with_language("fra"),
            Track::new(2, MediaKind::Audio, "ec-3").with_language("eng"),
        ];
        let outcome = fixture.run(&Action::FallbacksFix(FallbacksFix)).unwrap();
        assert!(matches!(outcome, ActionOutcome::Skipped(_)));
        assert_eq!(fixture.file.tracks[1].fallback_track_id, None);
    }

    #[test]
    fn clear_track_names() {
        let mut fixture = ActionFixture::new("/media/a.mp4");
        fixture.file.tracks = vec![
            Track::new(1, MediaKind::Video, "avc1").with_name("Main"),
            Track::new(2, MediaKind::Audio, "mp4a"),
        ];
        fixture.run(&Action::ClearTrackNames(ClearTrackNames)).unwrap();
        assert!(fixture.file.tracks.iter().all(|t| t.name.is_none()));
    }

    #[test]
    fn prettify_names_only_unnamed_audio() {
        let mut fixture = ActionFixture::new("/media/a.mp4");
        fixture.file.tracks = vec![
            Track::new(1, MediaKind::Audio, "mp4a").with_channels(1),
            Track::new(2, MediaKind::Audio, "mp4a").with_channels(2),
            Track::new(3, MediaKind::Audio, "ac-3").with_channels(6),
            Track::new(4, MediaKind::Audio, "mp4a").with_channels(2).with_name("Commentary"),
        ];
        fixture
            .run(&Action::PrettifyAudioTrackNames(PrettifyAudioTrackNames))
            .unwrap();

        let names: Vec<_> = fixture
            .file
            .tracks
            .iter()
            .map(|t| t.name.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(names, vec!["Mono", "Stereo", "Surround", "Commentary"]);
    }
}
