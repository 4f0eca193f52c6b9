//! Filename convention parsing.

use std::sync::LazyLock;

use regex::Regex;

use super::importer::SearchQuery;

/// What a filename says about its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameInfo {
    /// Movie title or series name.
    pub title: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub year: Option<u32>,
}

impl FilenameInfo {
    /// A filename with both season and episode numbers is a TV episode.
    pub fn is_tv_show(&self) -> bool {
        self.season.is_some() && self.episode.is_some()
    }

    /// Build the provider search query for this filename.
    pub fn to_query(&self) -> SearchQuery {
        match (self.season, self.episode) {
            (Some(season), Some(episode)) => SearchQuery::TvShow {
                series: self.title.clone(),
                season,
                episode,
            },
            _ => SearchQuery::Movie {
                title: self.title.clone(),
            },
        }
    }
}

/// Best-effort filename parser.
pub trait FilenameParser: Send + Sync {
    /// Parse a file name (with or without extension).
    ///
    /// Returns `None` when nothing usable can be derived.
    fn parse(&self, filename: &str) -> Option<FilenameInfo>;
}

static SEASON_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)[\s\-]*\bs(\d{1,2})\s?e(\d{1,3})\b").unwrap());

static CROSS_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)[\s\-]*\b(\d{1,2})x(\d{2,3})\b").unwrap());

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)[\s\(\[]*\b((?:19|20)\d{2})\b").unwrap());

static KNOWN_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(mp4|m4v|m4a|mkv|mov|avi|ts|m2ts|webm)$").unwrap()
});

/// Parser for the common `Show S01E02` / `Show 1x02` / `Movie (2010)`
/// naming conventions.
#[derive(Debug, Default)]
pub struct ConventionFilenameParser;

impl ConventionFilenameParser {
    pub fn new() -> Self {
        Self
    }

    fn clean(raw: &str) -> String {
        raw.replace(['.', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_matches(|c: char| c == '-' || c == '(' || c == '[' || c.is_whitespace())
            .to_string()
    }
}

impl FilenameParser for ConventionFilenameParser {
    fn parse(&self, filename: &str) -> Option<FilenameInfo> {
        let stem = KNOWN_EXTENSION.replace(filename, "");
        let normalized = stem.replace(['.', '_'], " ");

        for re in [&*SEASON_EPISODE, &*CROSS_EPISODE] {
            if let Some(caps) = re.captures(&normalized) {
                let title = Self::clean(&caps[1]);
                if title.is_empty() {
                    continue;
                }
                return Some(FilenameInfo {
                    title,
                    season: caps[2].parse().ok(),
                    episode: caps[3].parse().ok(),
                    year: None,
                });
            }
        }

        if let Some(caps) = YEAR.captures(&normalized) {
            let title = Self::clean(&caps[1]);
            if !title.is_empty() {
                return Some(FilenameInfo {
                    title,
                    season: None,
                    episode: None,
                    year: caps[2].parse().ok(),
                });
            }
        }

        let title = Self::clean(&normalized);
        if title.is_empty() {
            None
        } else {
            Some(FilenameInfo {
                title,
                season: None,
                episode: None,
                year: None,
            })
        }
    }
}
