//! In-memory adapters for the remote contracts, used by tests and offline demos.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::json;

use crate::{
    api::{AuthApi, DownloadSink, DriveApi, DriveApiFuture, ObjectTransfer},
    error::DriveError,
    model::{
        AuthMessage, CreateFileRequest, CreateFolderRequest, DownloadTicket, FileRecord,
        FolderRecord, LoginRequest, LoginResponse, RegisterRequest, RenameRequest,
        ResetPasswordRequest, UploadSlot, UploadSlotRequest,
    },
};

const MEMORY_CLOCK_START_MS: i64 = 1_700_000_000_000;

#[derive(Debug, Default)]
struct MemoryDriveState {
    folders: Vec<FolderRecord>,
    files: Vec<FileRecord>,
    failing_ids: HashSet<String>,
    fail_listing: bool,
    defer_listing: bool,
    next_id: u64,
    clock_ms: i64,
    calls: Vec<String>,
}

impl MemoryDriveState {
    fn tick(&mut self) -> i64 {
        if self.clock_ms == 0 {
            self.clock_ms = MEMORY_CLOCK_START_MS;
        }
        self.clock_ms += 1_000;
        self.clock_ms
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn check(&mut self, op: &str, id: &str) -> Result<(), DriveError> {
        self.calls.push(format!("{op}:{id}"));
        if self.failing_ids.contains(id) {
            return Err(DriveError::Remote {
                status: Some(500),
                message: format!("{op} failed for {id}"),
            });
        }
        Ok(())
    }
}

/// Returns `Pending` once, waking itself, so other tasks run before the caller resumes.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

fn missing(kind: &str, id: &str) -> DriveError {
    DriveError::Remote {
        status: Some(404),
        message: format!("{kind} {id} not found"),
    }
}

/// In-memory backend implementing [`DriveApi`].
///
/// Clones share state. Ids registered with [`MemoryDriveApi::fail_on`] make every mutating call
/// against them fail with a 500.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriveApi {
    inner: Rc<RefCell<MemoryDriveState>>,
}

impl MemoryDriveApi {
    /// Seeds folders.
    pub fn with_folders(self, folders: Vec<FolderRecord>) -> Self {
        self.inner.borrow_mut().folders = folders;
        self
    }

    /// Seeds files.
    pub fn with_files(self, files: Vec<FileRecord>) -> Self {
        self.inner.borrow_mut().files = files;
        self
    }

    /// Makes every mutating call targeting `id` fail.
    pub fn fail_on(&self, id: impl Into<String>) {
        self.inner.borrow_mut().failing_ids.insert(id.into());
    }

    /// Makes list calls fail.
    pub fn fail_listing(&self, fail: bool) {
        self.inner.borrow_mut().fail_listing = fail;
    }

    /// Makes list calls yield to the executor once before answering.
    pub fn defer_listing(&self, defer: bool) {
        self.inner.borrow_mut().defer_listing = defer;
    }

    fn listing_gate(&self) -> YieldOnce {
        YieldOnce(!self.inner.borrow().defer_listing)
    }

    /// Current server-side folders.
    pub fn folders(&self) -> Vec<FolderRecord> {
        self.inner.borrow().folders.clone()
    }

    /// Current server-side files.
    pub fn files(&self) -> Vec<FileRecord> {
        self.inner.borrow().files.clone()
    }

    /// Recorded calls as `op:target` strings, in order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.borrow().calls.clone()
    }
}

impl DriveApi for MemoryDriveApi {
    fn list_folders(&self) -> DriveApiFuture<'_, Result<Vec<FolderRecord>, DriveError>> {
        let gate = self.listing_gate();
        Box::pin(async move {
            gate.await;
            let mut state = self.inner.borrow_mut();
            state.calls.push("list_folders".to_string());
            if state.fail_listing {
                return Err(DriveError::remote("Failed to fetch folders"));
            }
            Ok(state.folders.clone())
        })
    }

    fn create_folder<'a>(
        &'a self,
        request: &'a CreateFolderRequest,
    ) -> DriveApiFuture<'a, Result<FolderRecord, DriveError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.calls.push(format!("create_folder:{}", request.name));
            let now = state.tick();
            let folder = FolderRecord {
                id: state.next_id("folder"),
                name: request.name.clone(),
                parent_id: request.parent_folder_id.clone(),
                created_at_ms: Some(now),
                modified_at_ms: Some(now),
            };
            state.folders.push(folder.clone());
            Ok(folder)
        })
    }

    fn rename_folder<'a>(
        &'a self,
        id: &'a str,
        request: &'a RenameRequest,
    ) -> DriveApiFuture<'a, Result<FolderRecord, DriveError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.check("rename_folder", id)?;
            let now = state.tick();
            let folder = state
                .folders
                .iter_mut()
                .find(|folder| folder.id == id)
                .ok_or_else(|| missing("folder", id))?;
            folder.name = request.name.clone();
            folder.modified_at_ms = Some(now);
            Ok(folder.clone())
        })
    }

    fn delete_folder<'a>(&'a self, id: &'a str) -> DriveApiFuture<'a, Result<(), DriveError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.check("delete_folder", id)?;
            let before = state.folders.len();
            state.folders.retain(|folder| folder.id != id);
            if state.folders.len() == before {
                return Err(missing("folder", id));
            }
            Ok(())
        })
    }

    fn download_folder_archive<'a>(
        &'a self,
        id: &'a str,
    ) -> DriveApiFuture<'a, Result<Vec<u8>, DriveError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.check("download_folder", id)?;
            let folder = state
                .folders
                .iter()
                .find(|folder| folder.id == id)
                .ok_or_else(|| missing("folder", id))?;
            let mut archive = b"PK\x03\x04".to_vec();
            archive.extend_from_slice(folder.name.as_bytes());
            Ok(archive)
        })
    }

    fn list_files<'a>(
        &'a self,
        folder_id: Option<&'a str>,
    ) -> DriveApiFuture<'a, Result<Vec<FileRecord>, DriveError>> {
        let gate = self.listing_gate();
        Box::pin(async move {
            gate.await;
            let mut state = self.inner.borrow_mut();
            state
                .calls
                .push(format!("list_files:{}", folder_id.unwrap_or("*")));
            if state.fail_listing {
                return Err(DriveError::remote("Failed to fetch files"));
            }
            Ok(state
                .files
                .iter()
                .filter(|file| folder_id.is_none() || file.folder_id.as_deref() == folder_id)
                .cloned()
                .collect())
        })
    }

    fn request_upload_slot<'a>(
        &'a self,
        request: &'a UploadSlotRequest,
    ) -> DriveApiFuture<'a, Result<UploadSlot, DriveError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.check("upload_slot", &request.file_name)?;
            let slot_id = state.next_id("slot");
            Ok(UploadSlot {
                upload_url: format!("memory://upload/{slot_id}"),
                file_key: format!("{}/{slot_id}-{}", request.owner_id, request.file_name),
            })
        })
    }

    fn create_file<'a>(
        &'a self,
        request: &'a CreateFileRequest,
    ) -> DriveApiFuture<'a, Result<FileRecord, DriveError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.check("create_file", &request.file_name)?;
            let now = state.tick();
            let file = FileRecord {
                id: state.next_id("file"),
                name: request.file_name.clone(),
                folder_id: request.folder_id.clone(),
                size_bytes: Some(request.file_size),
                mime_type: Some(request.mime_type.clone()),
                storage_key: Some(request.s3_key.clone()),
                created_at_ms: Some(now),
                modified_at_ms: Some(now),
            };
            state.files.push(file.clone());
            Ok(file)
        })
    }

    fn rename_file<'a>(
        &'a self,
        id: &'a str,
        request: &'a RenameRequest,
    ) -> DriveApiFuture<'a, Result<FileRecord, DriveError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.check("rename_file", id)?;
            let now = state.tick();
            let file = state
                .files
                .iter_mut()
                .find(|file| file.id == id)
                .ok_or_else(|| missing("file", id))?;
            file.name = request.name.clone();
            file.modified_at_ms = Some(now);
            Ok(file.clone())
        })
    }

    fn delete_file<'a>(&'a self, id: &'a str) -> DriveApiFuture<'a, Result<(), DriveError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.check("delete_file", id)?;
            let before = state.files.len();
            state.files.retain(|file| file.id != id);
            if state.files.len() == before {
                return Err(missing("file", id));
            }
            Ok(())
        })
    }

    fn request_download_url<'a>(
        &'a self,
        id: &'a str,
    ) -> DriveApiFuture<'a, Result<DownloadTicket, DriveError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.check("download_url", id)?;
            let file = state
                .files
                .iter()
                .find(|file| file.id == id)
                .ok_or_else(|| missing("file", id))?;
            Ok(DownloadTicket {
                download_url: format!("memory://download/{id}"),
                file_name: Some(file.name.clone()),
            })
        })
    }
}

#[derive(Debug, Default)]
struct MemoryTransferState {
    objects: HashMap<String, Vec<u8>>,
    put_failure: Option<(u16, String)>,
}

/// In-memory object storage implementing [`ObjectTransfer`].
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectTransfer {
    inner: Rc<RefCell<MemoryTransferState>>,
}

impl MemoryObjectTransfer {
    /// Makes every PUT fail with `status` and `body`.
    pub fn fail_puts(&self, status: u16, body: impl Into<String>) {
        self.inner.borrow_mut().put_failure = Some((status, body.into()));
    }

    /// Stores an object directly.
    pub fn insert_object(&self, url: impl Into<String>, bytes: Vec<u8>) {
        self.inner.borrow_mut().objects.insert(url.into(), bytes);
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.inner.borrow().objects.len()
    }
}

impl ObjectTransfer for MemoryObjectTransfer {
    fn put_object<'a>(
        &'a self,
        url: &'a str,
        _mime_type: &'a str,
        bytes: &'a [u8],
    ) -> DriveApiFuture<'a, Result<(), DriveError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            if let Some((status, body)) = state.put_failure.clone() {
                return Err(DriveError::Transfer { status, body });
            }
            state.objects.insert(url.to_string(), bytes.to_vec());
            Ok(())
        })
    }

    fn get_object<'a>(&'a self, url: &'a str) -> DriveApiFuture<'a, Result<Vec<u8>, DriveError>> {
        Box::pin(async move {
            self.inner
                .borrow()
                .objects
                .get(url)
                .cloned()
                .ok_or_else(|| DriveError::Transfer {
                    status: 404,
                    body: "NoSuchKey".to_string(),
                })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Download recorded by [`MemoryDownloadSink`].
pub struct SavedDownload {
    /// Save name.
    pub file_name: String,
    /// MIME type of the saved blob.
    pub mime_type: String,
    /// Saved bytes.
    pub bytes: Vec<u8>,
}

/// [`DownloadSink`] that records saves instead of prompting.
#[derive(Debug, Clone, Default)]
pub struct MemoryDownloadSink {
    saved: Rc<RefCell<Vec<SavedDownload>>>,
}

impl MemoryDownloadSink {
    /// Saves recorded so far.
    pub fn saved(&self) -> Vec<SavedDownload> {
        self.saved.borrow().clone()
    }
}

impl DownloadSink for MemoryDownloadSink {
    fn save_bytes(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<(), DriveError> {
        self.saved.borrow_mut().push(SavedDownload {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

/// Unsigned token whose payload carries `{"id": user_id}`.
pub fn memory_token(user_id: &str) -> String {
    let claims = json!({ "id": user_id }).to_string();
    format!("memory.{}.unsigned", URL_SAFE_NO_PAD.encode(claims))
}

/// In-memory account backend: any non-blank credentials sign in as one fixed user.
#[derive(Debug, Clone)]
pub struct MemoryAuthApi {
    user_id: String,
}

impl MemoryAuthApi {
    /// Backend that signs everyone in as `user_id`.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// Token issued by [`AuthApi::login`].
    pub fn token(&self) -> String {
        memory_token(&self.user_id)
    }

    fn message(text: &str) -> AuthMessage {
        AuthMessage {
            message: Some(text.to_string()),
        }
    }
}

impl AuthApi for MemoryAuthApi {
    fn register<'a>(
        &'a self,
        _request: &'a RegisterRequest,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async { Ok(Self::message("Demo account ready; no activation needed.")) })
    }

    fn activate<'a>(
        &'a self,
        _token: &'a str,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async { Ok(Self::message("Demo account activated.")) })
    }

    fn login<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> DriveApiFuture<'a, Result<LoginResponse, DriveError>> {
        Box::pin(async move {
            if request.email.trim().is_empty() || request.password.is_empty() {
                return Err(DriveError::Remote {
                    status: Some(401),
                    message: "Invalid credentials".to_string(),
                });
            }
            Ok(LoginResponse {
                token: self.token(),
            })
        })
    }

    fn forgot_password<'a>(
        &'a self,
        _email: &'a str,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async { Ok(Self::message("Demo accounts have no email; nothing was sent.")) })
    }

    fn reset_password<'a>(
        &'a self,
        _request: &'a ResetPasswordRequest,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async { Ok(Self::message("Demo password updated.")) })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn memory_api_creates_and_deletes_folders() {
        let api = MemoryDriveApi::default();
        let created = block_on(api.create_folder(&CreateFolderRequest {
            name: "Docs".into(),
            parent_folder_id: None,
        }))
        .expect("create");
        assert_eq!(api.folders().len(), 1);

        block_on(api.delete_folder(&created.id)).expect("delete");
        assert!(api.folders().is_empty());
        assert!(block_on(api.delete_folder(&created.id)).is_err());
    }

    #[test]
    fn failing_ids_reject_mutations() {
        let api = MemoryDriveApi::default().with_files(vec![FileRecord {
            id: "x1".into(),
            name: "a".into(),
            folder_id: None,
            size_bytes: None,
            mime_type: None,
            storage_key: Some("k".into()),
            created_at_ms: None,
            modified_at_ms: None,
        }]);
        api.fail_on("x1");
        let err = block_on(api.delete_file("x1")).expect_err("delete should fail");
        assert!(matches!(err, DriveError::Remote { status: Some(500), .. }));
        assert_eq!(api.files().len(), 1);
        assert_eq!(api.calls(), vec!["delete_file:x1".to_string()]);
    }

    #[test]
    fn transfer_failure_reports_status_and_body() {
        let transfer = MemoryObjectTransfer::default();
        transfer.fail_puts(500, "SlowDown");
        let err = block_on(transfer.put_object("u", "text/plain", b"x")).expect_err("put");
        assert_eq!(
            err,
            DriveError::Transfer {
                status: 500,
                body: "SlowDown".into()
            }
        );
        assert_eq!(transfer.object_count(), 0);
    }

    #[test]
    fn memory_login_issues_a_token_naming_the_demo_user() {
        let api = MemoryAuthApi::new("demo-user");
        let reply = block_on(api.login(&LoginRequest {
            email: "a@b.c".into(),
            password: "pw".into(),
        }))
        .expect("login");
        assert_eq!(reply.token, api.token());
        assert_eq!(
            crate::auth::user_id_from_token(&reply.token).as_deref(),
            Some("demo-user")
        );

        let refused = block_on(api.login(&LoginRequest {
            email: " ".into(),
            password: "pw".into(),
        }));
        assert!(refused.is_err());
    }
}
