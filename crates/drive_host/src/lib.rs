//! Typed host-domain contracts and shared models for the CloudDrive browser client.
//!
//! This crate is the API-first boundary between the drive runtime and its collaborators. It
//! exposes the item records returned by the backend, the identifier normalizer, REST and
//! object-storage service traits, the key/value prefs contract used for local overlays, and the
//! auth session capability. Concrete browser adapters live in `drive_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod auth;
pub mod error;
pub mod ids;
pub mod memory;
pub mod model;
pub mod storage;
pub mod time;

pub use api::{
    AuthApi, DownloadSink, DriveApi, DriveApiFuture, NoopAuthApi, NoopDownloadSink, NoopDriveApi,
    NoopObjectTransfer, ObjectTransfer,
};
pub use auth::{
    decode_token_claims, user_id_from_token, AuthSession, IdentityProvider, MemoryAuthSession,
    PrefsAuthSession, SessionIdentity, TOKEN_KEY,
};
pub use error::DriveError;
pub use ids::{normalize_id, normalize_id_str, same_id};
pub use memory::{
    memory_token, MemoryAuthApi, MemoryDownloadSink, MemoryDriveApi, MemoryObjectTransfer,
    SavedDownload,
};
pub use model::{
    unwrap_entity, unwrap_list, AuthMessage, CreateFileRequest, CreateFolderRequest, DownloadTicket,
    FileRecord, FolderRecord, ItemKind, LocalFile, LoginRequest, LoginResponse, RegisterRequest,
    RenameRequest, ResetPasswordRequest, UploadSlot, UploadSlotRequest,
};
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsStore,
};
pub use time::{parse_timestamp_ms, unix_time_ms_now};
