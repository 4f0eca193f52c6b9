//! Free space lookup for the destination volume.

use std::path::{Path, PathBuf};

use sysinfo::Disks;

/// Reports the space available for new files under a directory.
pub trait DiskSpace: Send + Sync {
    /// Bytes available on the volume holding `dir`, `None` if unknown.
    fn available_space(&self, dir: &Path) -> Option<u64>;
}

/// Mounted volumes as reported by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDiskSpace;

impl SystemDiskSpace {
    pub fn new() -> Self {
        Self
    }
}

/// Closest existing ancestor of `dir`, resolved.
fn existing_ancestor(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .find(|p| !p.as_os_str().is_empty() && p.exists())
        .and_then(|p| p.canonicalize().ok())
}

impl DiskSpace for SystemDiskSpace {
    fn available_space(&self, dir: &Path) -> Option<u64> {
        let dir = existing_ancestor(dir)?;
        let disks = Disks::new_with_refreshed_list();
        // Deepest mount point containing the directory.
        disks
            .list()
            .iter()
            .filter(|disk| dir.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().components().count())
            .map(|disk| disk.available_space())
    }
}

/// A fixed amount of free space everywhere.
#[derive(Debug, Clone, Copy)]
pub struct FixedDiskSpace(pub Option<u64>);

impl DiskSpace for FixedDiskSpace {
    fn available_space(&self, _dir: &Path) -> Option<u64> {
        self.0
    }
}
