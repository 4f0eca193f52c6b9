//! Color space action - stamps color description on video tracks.

use crate::models::{ColorInfo, MediaKind};

use super::{ActionContext, ActionOutcome, ActionResult, ActionStep, ItemWorkspace};

/// Named color spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub enum ColorSpaceTag {
    /// Remove any explicit color description.
    Implicit,
    Rec601Ntsc,
    Rec601Pal,
    Rec709,
    Rec2020,
    Rec2020Pq,
    Rec2020Hlg,
}

impl ColorSpaceTag {
    /// Every tag, in numeric order.
    pub const ALL: [ColorSpaceTag; 7] = [
        Self::Implicit,
        Self::Rec601Ntsc,
        Self::Rec601Pal,
        Self::Rec709,
        Self::Rec2020,
        Self::Rec2020Pq,
        Self::Rec2020Hlg,
    ];

    /// Numeric tag stored in settings.
    pub fn code(self) -> u16 {
        match self {
            Self::Implicit => 1,
            Self::Rec601Ntsc => 2,
            Self::Rec601Pal => 3,
            Self::Rec709 => 4,
            Self::Rec2020 => 5,
            Self::Rec2020Pq => 6,
            Self::Rec2020Hlg => 7,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Implicit => "Implicit",
            Self::Rec601Ntsc => "Rec. 601 (NTSC)",
            Self::Rec601Pal => "Rec. 601 (PAL)",
            Self::Rec709 => "Rec. 709",
            Self::Rec2020 => "Rec. 2020",
            Self::Rec2020Pq => "Rec. 2020 PQ",
            Self::Rec2020Hlg => "Rec. 2020 HLG",
        }
    }

    /// Primaries/transfer/matrix triple, `None` for `Implicit`.
    pub fn color_info(self) -> Option<ColorInfo> {
        match self {
            Self::Implicit => None,
            Self::Rec601Ntsc => Some(ColorInfo::new(6, 6, 6)),
            Self::Rec601Pal => Some(ColorInfo::new(5, 6, 6)),
            Self::Rec709 => Some(ColorInfo::new(1, 1, 1)),
            Self::Rec2020 => Some(ColorInfo::new(9, 1, 9)),
            Self::Rec2020Pq => Some(ColorInfo::new(9, 16, 9)),
            Self::Rec2020Hlg => Some(ColorInfo::new(9, 18, 9)),
        }
    }
}

/// Either a named color space or an explicit triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub enum ColorSpace {
    Named(ColorSpaceTag),
    Explicit {
        primaries: u16,
        transfer: u16,
        matrix: u16,
    },
}

impl ColorSpace {
    fn color_info(self) -> Option<ColorInfo> {
        match self {
            Self::Named(tag) => tag.color_info(),
            Self::Explicit {
                primaries,
                transfer,
                matrix,
            } => Some(ColorInfo::new(primaries, transfer, matrix)),
        }
    }

    fn label(self) -> String {
        match self {
            Self::Named(tag) => tag.as_str().to_string(),
            Self::Explicit {
                primaries,
                transfer,
                matrix,
            } => format!("{}-{}-{}", primaries, transfer, matrix),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct ColorSpaceFix {
    pub color_space: ColorSpace,
}

impl ColorSpaceFix {
    pub fn new(color_space: ColorSpace) -> Self {
        Self { color_space }
    }

    pub fn named(tag: ColorSpaceTag) -> Self {
        Self::new(ColorSpace::Named(tag))
    }
}

impl ActionStep for ColorSpaceFix {
    fn name(&self) -> &'static str {
        "ColorSpaceFix"
    }

    fn description(&self) -> String {
        format!("Set video color space to {}", self.color_space.label())
    }

    fn working_description(&self) -> String {
        format!("Setting video color space to {}", self.color_space.label())
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        let info = self.color_space.color_info();
        let mut count = 0;
        for track in item.file.tracks_of_mut(MediaKind::Video) {
            track.color = info;
            count += 1;
        }
        if count == 0 {
            return Ok(ActionOutcome::Skipped("No video tracks".to_string()));
        }
        ctx.logger.info(&format!(
            "Color space {} set on {} video tracks",
            self.color_space.label(),
            count
        ));
        Ok(ActionOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::models::Track;
    use crate::test_support::ActionFixture;

    #[test]
    fn codes_round_trip() {
        for tag in ColorSpaceTag::ALL {
            assert_eq!(ColorSpaceTag::from_code(tag.code()), Some(tag));
        }
        assert_eq!(ColorSpaceTag::from_code(0), None);
    }

    #[test]
    fn stamps_video_tracks_only() {
        let mut fixture = ActionFixture::new("/media/a.mp4");
        fixture.file.tracks = vec![
            Track::new(1, MediaKind::Video, "hvc1"),
            Track::new(2, MediaKind::Audio, "mp4a"),
        ];

        let action = Action::ColorSpaceFix(ColorSpaceFix::named(ColorSpaceTag::Rec2020Pq));
        fixture.run(&action).unwrap();
        assert_eq!(fixture.file.tracks[0].color, Some(ColorInfo::new(9, 16, 9)));
        assert_eq!(fixture.file.tracks[1].color, None);

        let implicit = Action::ColorSpaceFix(ColorSpaceFix::named(ColorSpaceTag::Implicit));
        fixture.run(&implicit).unwrap();
        assert_eq!(fixture.file.tracks[0].color, None);
    }

    #[test]
    fn explicit_triple() {
        let mut fixture = ActionFixture::new("/media/a.mp4");
        fixture.file.tracks = vec![Track::new(1, MediaKind::Video, "avc1")];
        let action = Action::ColorSpaceFix(ColorSpaceFix::new(ColorSpace::Explicit {
            primaries: 1,
            transfer: 13,
            matrix: 1,
        }));
        assert_eq!(action.description(), "Set video color space to 1-13-1");
        fixture.run(&action).unwrap();
        assert_eq!(fixture.file.tracks[0].color, Some(ColorInfo::new(1, 13, 1)));
    }
}
