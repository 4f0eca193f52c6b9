//! Encoding and decoding of the persisted queue.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::actions::{
    tags, Action, ClearExistingMetadata, ClearTrackNames, FallbacksFix, GroupsOrganize,
    PrettifyAudioTrackNames, RenameChapters, SetOutputFilename, SubtitlesScan,
};
use crate::queue::{AttributeValue, ItemSnapshot, ItemStatus};

use super::errors::{PersistenceError, PersistenceResult};

const MAGIC: &[u8; 4] = b"MTQ1";

/// Current schema version written by this build.
///
/// Version 1 stored paths as UTF-8 strings; version 2 stores the raw
/// path bytes. Older versions are still read.
pub const SCHEMA_VERSION: u16 = 2;

const FIRST_SCHEMA_VERSION: u16 = 1;

const HEADER_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, bitcode::Encode, bitcode::Decode)]
struct PersistedQueue {
    items: Vec<PersistedItem>,
}

#[derive(Debug, Clone, PartialEq, bitcode::Encode, bitcode::Decode)]
struct PersistedItem {
    id: String,
    source: Vec<u8>,
    destination: Option<Vec<u8>>,
    status: u8,
    actions: Vec<PersistedAction>,
    attributes: BTreeMap<String, AttributeValue>,
    error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, bitcode::Encode, bitcode::Decode)]
struct PersistedQueueV1 {
    items: Vec<PersistedItemV1>,
}

#[derive(Debug, Clone, PartialEq, bitcode::Encode, bitcode::Decode)]
struct PersistedItemV1 {
    id: String,
    source: String,
    destination: Option<String>,
    status: u8,
    actions: Vec<PersistedAction>,
    attributes: BTreeMap<String, AttributeValue>,
    error_message: Option<String>,
}

impl From<PersistedItemV1> for PersistedItem {
    fn from(item: PersistedItemV1) -> Self {
        Self {
            id: item.id,
            source: item.source.into_bytes(),
            destination: item.destination.map(String::into_bytes),
            status: item.status,
            actions: item.actions,
            attributes: item.attributes,
            error_message: item.error_message,
        }
    }
}

#[cfg(unix)]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(std::ffi::OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

/// One action: variant tag plus that variant's own encoded parameters.
#[derive(Debug, Clone, PartialEq, bitcode::Encode, bitcode::Decode)]
struct PersistedAction {
    tag: String,
    payload: Vec<u8>,
}

fn encode_action(action: &Action) -> PersistedAction {
    let payload = match action {
        Action::MetadataFetch(a) => bitcode::encode(a),
        Action::PresetApply(a) => bitcode::encode(a),
        Action::SetLanguage(a) => bitcode::encode(a),
        Action::ColorSpaceFix(a) => bitcode::encode(a),
        Action::SelectAudioLanguage(a) => bitcode::encode(a),
        Action::SelectSubtitleLanguage(a) => bitcode::encode(a),
        Action::SubtitlesScan(_)
        | Action::GroupsOrganize(_)
        | Action::FallbacksFix(_)
        | Action::ClearTrackNames(_)
        | Action::ClearExistingMetadata(_)
        | Action::PrettifyAudioTrackNames(_)
        | Action::SetOutputFilename(_)
        | Action::RenameChapters(_) => Vec::new(),
    };
    PersistedAction {
        tag: action.tag().to_string(),
        payload,
    }
}

/// Decode one action; `None` for unknown tags or bad payloads.
fn decode_action(record: &PersistedAction) -> Option<Action> {
    if !tags::ALL.contains(&record.tag.as_str()) {
        tracing::warn!("Dropping action with unknown tag '{}'", record.tag);
        return None;
    }

    let decoded = match record.tag.as_str() {
        tags::METADATA_FETCH => bitcode::decode(&record.payload).map(Action::MetadataFetch),
        tags::PRESET_APPLY => bitcode::decode(&record.payload).map(Action::PresetApply),
        tags::SET_LANGUAGE => bitcode::decode(&record.payload).map(Action::SetLanguage),
        tags::COLOR_SPACE_FIX => bitcode::decode(&record.payload).map(Action::ColorSpaceFix),
        tags::SELECT_AUDIO_LANGUAGE => {
            bitcode::decode(&record.payload).map(Action::SelectAudioLanguage)
        }
        tags::SELECT_SUBTITLE_LANGUAGE => {
            bitcode::decode(&record.payload).map(Action::SelectSubtitleLanguage)
        }
        tags::SUBTITLES_SCAN => Ok(Action::SubtitlesScan(SubtitlesScan)),
        tags::GROUPS_ORGANIZE => Ok(Action::GroupsOrganize(GroupsOrganize)),
        tags::FALLBACKS_FIX => Ok(Action::FallbacksFix(FallbacksFix)),
        tags::CLEAR_TRACK_NAMES => Ok(Action::ClearTrackNames(ClearTrackNames)),
        tags::CLEAR_EXISTING_METADATA => Ok(Action::ClearExistingMetadata(ClearExistingMetadata)),
        tags::PRETTIFY_AUDIO_TRACK_NAMES => {
            Ok(Action::PrettifyAudioTrackNames(PrettifyAudioTrackNames))
        }
        tags::SET_OUTPUT_FILENAME => Ok(Action::SetOutputFilename(SetOutputFilename)),
        tags::RENAME_CHAPTERS => Ok(Action::RenameChapters(RenameChapters)),
        _ => return None,
    };

    match decoded {
        Ok(action) => Some(action),
        Err(e) => {
            tracing::warn!("Dropping '{}' action with bad parameters: {}", record.tag, e);
            None
        }
    }
}

fn encode_item(item: &ItemSnapshot) -> PersistedItem {
    PersistedItem {
        id: item.id.clone(),
        source: path_to_bytes(&item.source),
        destination: item.destination.as_deref().map(path_to_bytes),
        status: item.status.code(),
        actions: item.actions.iter().map(encode_action).collect(),
        attributes: item.attributes.clone(),
        error_message: item.error_message.clone(),
    }
}

fn decode_item(item: PersistedItem) -> ItemSnapshot {
    let status = match ItemStatus::from_code(item.status) {
        // In-flight status has no meaning after a restart.
        Some(ItemStatus::Working) => ItemStatus::Ready,
        Some(status) => status,
        None => {
            tracing::warn!("Item {} has unknown status {}, marking failed", item.id, item.status);
            ItemStatus::Failed
        }
    };

    ItemSnapshot {
        id: item.id,
        source: path_from_bytes(item.source),
        destination: item.destination.map(path_from_bytes),
        status,
        actions: item.actions.iter().filter_map(decode_action).collect(),
        attributes: item.attributes,
        error_message: item.error_message,
    }
}

/// Encode items into the versioned envelope.
pub fn encode_queue(items: &[ItemSnapshot]) -> Vec<u8> {
    let queue = PersistedQueue {
        items: items.iter().map(encode_item).collect(),
    };
    wrap(&bitcode::encode(&queue))
}

fn wrap(body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
    bytes.extend_from_slice(body);
    bytes
}

/// Decode the versioned envelope.
///
/// Working items come back Ready; unknown actions are dropped. Files
/// written by an older schema are upgraded; newer ones are rejected.
pub fn decode_queue(bytes: &[u8]) -> PersistenceResult<Vec<ItemSnapshot>> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err(PersistenceError::BadMagic);
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    let body = &bytes[HEADER_LEN..];

    let items = match version {
        FIRST_SCHEMA_VERSION => {
            let queue: PersistedQueueV1 = bitcode::decode(body)?;
            tracing::info!("Upgrading queue file from schema {}", version);
            queue.items.into_iter().map(PersistedItem::from).collect()
        }
        SCHEMA_VERSION => bitcode::decode::<PersistedQueue>(body)?.items,
        _ => return Err(PersistenceError::UnsupportedVersion(version)),
    };
    Ok(items.into_iter().map(decode_item).collect())
}

/// Read and decode the queue file at `path`.
pub fn load_queue(path: &Path) -> PersistenceResult<Vec<ItemSnapshot>> {
    let bytes = fs::read(path)?;
    decode_queue(&bytes)
}

/// Encode and write the queue file atomically (temp file, then rename).
pub fn save_queue(path: &Path, items: &[ItemSnapshot]) -> PersistenceResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let bytes = encode_queue(items);
    let temp_path = path.with_extension("mtq.tmp");
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}
