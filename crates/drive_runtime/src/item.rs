//! Display-ready drive items.

use drive_host::{FileRecord, FolderRecord, ItemKind};
use serde::{Deserialize, Serialize};

use crate::overlay::OverlaySnapshot;

/// A folder or file joined with its overlay state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveItem {
    /// Canonical id (temporary id for pending uploads).
    pub id: String,
    /// Folder or file.
    pub kind: ItemKind,
    /// Display name.
    pub name: String,
    /// Parent folder (folders) or containing folder (files); `None` is root.
    pub parent_id: Option<String>,
    /// Creation time in unix milliseconds.
    pub created_at_ms: Option<i64>,
    /// Last modification time in unix milliseconds.
    pub modified_at_ms: Option<i64>,
    /// Size in bytes (files only).
    pub size_bytes: Option<u64>,
    /// MIME type (files only).
    pub mime_type: Option<String>,
    /// Member of the starred overlay.
    pub starred: bool,
    /// Member of the trashed overlay.
    pub trashed: bool,
    /// Placeholder for an upload in flight.
    pub pending: bool,
}

impl DriveItem {
    /// Joins a folder with the overlay.
    pub fn from_folder(folder: &FolderRecord, overlay: &OverlaySnapshot) -> Self {
        Self {
            id: folder.id.clone(),
            kind: ItemKind::Folder,
            name: folder.name.clone(),
            parent_id: folder.parent_id.clone(),
            created_at_ms: folder.created_at_ms,
            modified_at_ms: folder.modified_at_ms,
            size_bytes: None,
            mime_type: None,
            starred: overlay.is_starred(&folder.id),
            trashed: overlay.is_trashed(&folder.id),
            pending: false,
        }
    }

    /// Joins a file with the overlay.
    pub fn from_file(file: &FileRecord, overlay: &OverlaySnapshot) -> Self {
        Self {
            id: file.id.clone(),
            kind: ItemKind::File,
            name: file.name.clone(),
            parent_id: file.folder_id.clone(),
            created_at_ms: file.created_at_ms,
            modified_at_ms: file.modified_at_ms,
            size_bytes: file.size_bytes,
            mime_type: file.mime_type.clone(),
            starred: overlay.is_starred(&file.id),
            trashed: overlay.is_trashed(&file.id),
            pending: false,
        }
    }

    /// Recency used for sorting: modified, then created, then `now_ms`.
    pub fn recency_ms(&self, now_ms: i64) -> i64 {
        self.modified_at_ms.or(self.created_at_ms).unwrap_or(now_ms)
    }

    /// Returns `true` for folders.
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ItemKind::Folder)
    }
}

/// Local placeholder shown while an upload is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Locally generated id, unique per upload.
    pub temp_id: String,
    /// File name.
    pub name: String,
    /// Target folder.
    pub folder_id: Option<String>,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type.
    pub mime_type: String,
}

impl PendingUpload {
    /// Placeholder item; never starred or trashed.
    pub fn to_item(&self) -> DriveItem {
        DriveItem {
            id: self.temp_id.clone(),
            kind: ItemKind::File,
            name: self.name.clone(),
            parent_id: self.folder_id.clone(),
            created_at_ms: None,
            modified_at_ms: None,
            size_bytes: Some(self.size_bytes),
            mime_type: Some(self.mime_type.clone()),
            starred: false,
            trashed: false,
            pending: true,
        }
    }
}
