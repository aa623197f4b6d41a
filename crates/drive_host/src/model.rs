//! Drive data types shared across host contracts and implementations.
//!
//! Records are parsed from loosely-typed backend JSON through [`FolderRecord::from_value`] and
//! [`FileRecord::from_value`], which route every id through [`crate::normalize_id`]. Request
//! payloads serialize with the backend's camelCase field names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ids::normalize_id, time::parse_timestamp_ms};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Drive item kind.
pub enum ItemKind {
    /// Folder entry.
    Folder,
    /// File entry.
    File,
}

impl ItemKind {
    /// Returns a stable string token.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Folder as returned by the folder API.
pub struct FolderRecord {
    /// Canonical id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Parent folder id; `None` means root.
    pub parent_id: Option<String>,
    /// Creation time in unix milliseconds.
    pub created_at_ms: Option<i64>,
    /// Last modification time in unix milliseconds.
    pub modified_at_ms: Option<i64>,
}

impl FolderRecord {
    /// Parses a backend folder document. Returns `None` when no id resolves.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = normalize_id(value)?;
        Some(Self {
            id,
            name: string_field(value, &["name"]).unwrap_or_default(),
            parent_id: value
                .get("parentFolderId")
                .or_else(|| value.get("parentId"))
                .and_then(normalize_id),
            created_at_ms: timestamp_field(value, &["createdAt"]),
            modified_at_ms: timestamp_field(value, &["modifiedAt", "updatedAt"]),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// File as returned by the file API.
pub struct FileRecord {
    /// Canonical id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Containing folder id; `None` means root.
    pub folder_id: Option<String>,
    /// Size in bytes.
    pub size_bytes: Option<u64>,
    /// MIME type recorded at upload.
    pub mime_type: Option<String>,
    /// Object-storage key; absent until the upload is persisted.
    pub storage_key: Option<String>,
    /// Creation time in unix milliseconds.
    pub created_at_ms: Option<i64>,
    /// Last modification time in unix milliseconds.
    pub modified_at_ms: Option<i64>,
}

impl FileRecord {
    /// Parses a backend file document. Returns `None` when no id resolves.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = normalize_id(value)?;
        Some(Self {
            id,
            name: string_field(value, &["name", "fileName"]).unwrap_or_default(),
            folder_id: value.get("folderId").and_then(normalize_id),
            size_bytes: value
                .get("fileSize")
                .or_else(|| value.get("size"))
                .and_then(Value::as_u64),
            mime_type: string_field(value, &["mimeType", "fileType"]),
            storage_key: string_field(value, &["s3Key", "fileKey"]),
            created_at_ms: timestamp_field(value, &["createdAt"]),
            modified_at_ms: timestamp_field(value, &["modifiedAt", "updatedAt"]),
        })
    }

    /// Returns `true` once the file has a storage key, i.e. its bytes were persisted.
    pub fn is_persisted(&self) -> bool {
        self.storage_key.is_some()
    }
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|raw| !raw.is_empty())
        .map(str::to_string)
}

fn timestamp_field(value: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(parse_timestamp_ms)
}

/// Returns the entity inside a `{ "<wrapper>": … }` envelope, or the value itself.
pub fn unwrap_entity<'a>(value: &'a Value, wrapper: &str) -> &'a Value {
    match value.get(wrapper) {
        Some(inner) if inner.is_object() => inner,
        _ => value,
    }
}

/// Returns the elements of a bare array or of a `{ "<wrapper>": [...] }` envelope.
pub fn unwrap_list<'a>(value: &'a Value, wrapper: &str) -> &'a [Value] {
    value
        .as_array()
        .or_else(|| value.get(wrapper).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload for `POST /folders`.
pub struct CreateFolderRequest {
    /// Folder name (already trimmed).
    pub name: String,
    /// Parent folder; `null` creates at root.
    pub parent_folder_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload for folder and file rename.
pub struct RenameRequest {
    /// New name.
    pub name: String,
    /// Duplicate of `name` expected by the file endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl RenameRequest {
    /// Builds the rename payload for an item kind.
    pub fn for_kind(kind: ItemKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: matches!(kind, ItemKind::File).then(|| name.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload for `POST /files/upload-url`.
pub struct UploadSlotRequest {
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub file_type: String,
    /// Target folder; `null` means root.
    pub folder_id: Option<String>,
    /// Acting user id.
    pub owner_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One-time write target issued for an upload.
pub struct UploadSlot {
    /// Pre-signed URL accepting a single PUT.
    pub upload_url: String,
    /// Object-storage key to record in the file metadata.
    pub file_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload for `POST /files`, persisting metadata after the bytes are stored.
pub struct CreateFileRequest {
    /// Original file name.
    pub file_name: String,
    /// Size in bytes.
    pub file_size: u64,
    /// MIME type.
    pub mime_type: String,
    /// Storage key returned by the upload slot.
    pub s3_key: String,
    /// Containing folder; `null` means root.
    pub folder_id: Option<String>,
    /// `"root"` when the file lands at root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Download handle for a single file.
pub struct DownloadTicket {
    /// Pre-signed GET URL.
    pub download_url: String,
    /// Suggested save name.
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Bytes selected by the user for upload.
pub struct LocalFile {
    /// File name.
    pub name: String,
    /// MIME type; empty when the browser could not determine one.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl LocalFile {
    /// Size of the contents in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type sent to storage, defaulting to `application/octet-stream`.
    pub fn effective_mime_type(&self) -> &str {
        if self.mime_type.trim().is_empty() {
            "application/octet-stream"
        } else {
            &self.mime_type
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload for `POST /auth/register`.
pub struct RegisterRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Payload for `POST /auth/login`.
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Response of `POST /auth/login`.
pub struct LoginResponse {
    /// Bearer token (JWT).
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Payload for `POST /auth/reset-password`.
pub struct ResetPasswordRequest {
    /// Reset token delivered by email.
    pub token: String,
    /// New password.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Informational response returned by the auth endpoints.
pub struct AuthMessage {
    /// Server message, when provided.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn folder_record_normalizes_wrapped_ids() {
        let raw = json!({
            "_id": {"$oid": "f2"},
            "name": "Reports",
            "parentFolderId": {"$oid": "f1"},
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-02T10:00:00Z"
        });
        let folder = FolderRecord::from_value(&raw).expect("folder");
        assert_eq!(
            folder,
            FolderRecord {
                id: "f2".into(),
                name: "Reports".into(),
                parent_id: Some("f1".into()),
                created_at_ms: Some(1_714_557_600_000),
                modified_at_ms: Some(1_714_644_000_000),
            }
        );
    }

    #[test]
    fn folder_without_id_is_rejected_and_null_parent_is_root() {
        assert_eq!(FolderRecord::from_value(&json!({"name": "x"})), None);
        let root = FolderRecord::from_value(&json!({"_id": "f1", "parentFolderId": null}))
            .expect("folder");
        assert_eq!(root.parent_id, None);
    }

    #[test]
    fn file_record_falls_back_to_file_name() {
        let raw = json!({
            "_id": "x1",
            "fileName": "report.pdf",
            "fileSize": 2048,
            "mimeType": "application/pdf",
            "s3Key": "u1/report.pdf",
            "folderId": "f1"
        });
        let file = FileRecord::from_value(&raw).expect("file");
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.size_bytes, Some(2048));
        assert_eq!(file.folder_id.as_deref(), Some("f1"));
        assert!(file.is_persisted());

        let pending = FileRecord::from_value(&json!({"_id": "x2", "name": "a"})).expect("file");
        assert!(!pending.is_persisted());
    }

    #[test]
    fn envelopes_unwrap_to_entities_and_lists() {
        let wrapped = json!({"folder": {"_id": "f1"}});
        assert_eq!(unwrap_entity(&wrapped, "folder"), &json!({"_id": "f1"}));
        let bare = json!({"_id": "f1"});
        assert_eq!(unwrap_entity(&bare, "folder"), &bare);

        assert_eq!(unwrap_list(&json!([1, 2]), "files").len(), 2);
        assert_eq!(unwrap_list(&json!({"files": [1]}), "files").len(), 1);
        assert!(unwrap_list(&json!({"other": 1}), "files").is_empty());
    }

    #[test]
    fn request_payloads_use_backend_field_names() {
        let create = CreateFileRequest {
            file_name: "a.txt".into(),
            file_size: 3,
            mime_type: "text/plain".into(),
            s3_key: "k".into(),
            folder_id: None,
            path: Some("root".into()),
        };
        assert_eq!(
            serde_json::to_value(&create).expect("serialize"),
            json!({
                "fileName": "a.txt",
                "fileSize": 3,
                "mimeType": "text/plain",
                "s3Key": "k",
                "folderId": null,
                "path": "root"
            })
        );

        assert_eq!(
            serde_json::to_value(RenameRequest::for_kind(ItemKind::File, "b.txt"))
                .expect("serialize"),
            json!({"name": "b.txt", "fileName": "b.txt"})
        );
        assert_eq!(
            serde_json::to_value(RenameRequest::for_kind(ItemKind::Folder, "Docs"))
                .expect("serialize"),
            json!({"name": "Docs"})
        );
    }

    #[test]
    fn local_file_defaults_mime_type() {
        let file = LocalFile {
            name: "blob".into(),
            mime_type: String::new(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(file.size(), 3);
        assert_eq!(file.effective_mime_type(), "application/octet-stream");
    }
}
