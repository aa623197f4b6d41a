//! Remote service contracts consumed by the drive runtime.

use std::{future::Future, pin::Pin};

use crate::{
    error::DriveError,
    model::{
        AuthMessage, CreateFileRequest, CreateFolderRequest, DownloadTicket, FileRecord,
        FolderRecord, LoginRequest, LoginResponse, RegisterRequest, RenameRequest,
        ResetPasswordRequest, UploadSlot, UploadSlotRequest,
    },
};

/// Object-safe boxed future used by the drive service traits.
pub type DriveApiFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Backend folder and file REST API.
pub trait DriveApi {
    /// Lists every folder owned by the acting user.
    fn list_folders(&self) -> DriveApiFuture<'_, Result<Vec<FolderRecord>, DriveError>>;

    /// Creates a folder.
    fn create_folder<'a>(
        &'a self,
        request: &'a CreateFolderRequest,
    ) -> DriveApiFuture<'a, Result<FolderRecord, DriveError>>;

    /// Renames a folder and returns the server representation.
    fn rename_folder<'a>(
        &'a self,
        id: &'a str,
        request: &'a RenameRequest,
    ) -> DriveApiFuture<'a, Result<FolderRecord, DriveError>>;

    /// Permanently deletes a folder.
    fn delete_folder<'a>(&'a self, id: &'a str) -> DriveApiFuture<'a, Result<(), DriveError>>;

    /// Downloads a folder as a zip archive.
    fn download_folder_archive<'a>(
        &'a self,
        id: &'a str,
    ) -> DriveApiFuture<'a, Result<Vec<u8>, DriveError>>;

    /// Lists files, optionally scoped to a folder.
    fn list_files<'a>(
        &'a self,
        folder_id: Option<&'a str>,
    ) -> DriveApiFuture<'a, Result<Vec<FileRecord>, DriveError>>;

    /// Requests a one-time upload target.
    fn request_upload_slot<'a>(
        &'a self,
        request: &'a UploadSlotRequest,
    ) -> DriveApiFuture<'a, Result<UploadSlot, DriveError>>;

    /// Persists file metadata after the bytes were stored.
    fn create_file<'a>(
        &'a self,
        request: &'a CreateFileRequest,
    ) -> DriveApiFuture<'a, Result<FileRecord, DriveError>>;

    /// Renames a file and returns the server representation.
    fn rename_file<'a>(
        &'a self,
        id: &'a str,
        request: &'a RenameRequest,
    ) -> DriveApiFuture<'a, Result<FileRecord, DriveError>>;

    /// Permanently deletes a file.
    fn delete_file<'a>(&'a self, id: &'a str) -> DriveApiFuture<'a, Result<(), DriveError>>;

    /// Requests a pre-signed download URL for a file.
    fn request_download_url<'a>(
        &'a self,
        id: &'a str,
    ) -> DriveApiFuture<'a, Result<DownloadTicket, DriveError>>;
}

/// Backend account endpoints.
pub trait AuthApi {
    /// Registers a new account; activation is confirmed by email.
    fn register<'a>(
        &'a self,
        request: &'a RegisterRequest,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>>;

    /// Activates an account with the emailed token.
    fn activate<'a>(&'a self, token: &'a str)
        -> DriveApiFuture<'a, Result<AuthMessage, DriveError>>;

    /// Exchanges credentials for a bearer token.
    fn login<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> DriveApiFuture<'a, Result<LoginResponse, DriveError>>;

    /// Sends a password-reset email.
    fn forgot_password<'a>(
        &'a self,
        email: &'a str,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>>;

    /// Sets a new password with a reset token.
    fn reset_password<'a>(
        &'a self,
        request: &'a ResetPasswordRequest,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>>;
}

/// Direct byte transfer against pre-signed object-storage URLs.
pub trait ObjectTransfer {
    /// PUTs raw bytes with the given content type.
    ///
    /// A non-success status must surface as [`DriveError::Transfer`] with the body text.
    fn put_object<'a>(
        &'a self,
        url: &'a str,
        mime_type: &'a str,
        bytes: &'a [u8],
    ) -> DriveApiFuture<'a, Result<(), DriveError>>;

    /// GETs the bytes behind a URL.
    fn get_object<'a>(&'a self, url: &'a str) -> DriveApiFuture<'a, Result<Vec<u8>, DriveError>>;
}

/// Browser-level "save as" for downloaded bytes.
pub trait DownloadSink {
    /// Hands the bytes to the user under `file_name`.
    fn save_bytes(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<(), DriveError>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op drive API adapter for unsupported targets and baseline tests.
pub struct NoopDriveApi;

impl NoopDriveApi {
    fn unsupported_error(op: &str) -> DriveError {
        DriveError::remote(format!("drive api unavailable: {op}"))
    }
}

impl DriveApi for NoopDriveApi {
    fn list_folders(&self) -> DriveApiFuture<'_, Result<Vec<FolderRecord>, DriveError>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn create_folder<'a>(
        &'a self,
        _request: &'a CreateFolderRequest,
    ) -> DriveApiFuture<'a, Result<FolderRecord, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("create_folder")) })
    }

    fn rename_folder<'a>(
        &'a self,
        _id: &'a str,
        _request: &'a RenameRequest,
    ) -> DriveApiFuture<'a, Result<FolderRecord, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("rename_folder")) })
    }

    fn delete_folder<'a>(&'a self, _id: &'a str) -> DriveApiFuture<'a, Result<(), DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("delete_folder")) })
    }

    fn download_folder_archive<'a>(
        &'a self,
        _id: &'a str,
    ) -> DriveApiFuture<'a, Result<Vec<u8>, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("download_folder_archive")) })
    }

    fn list_files<'a>(
        &'a self,
        _folder_id: Option<&'a str>,
    ) -> DriveApiFuture<'a, Result<Vec<FileRecord>, DriveError>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn request_upload_slot<'a>(
        &'a self,
        _request: &'a UploadSlotRequest,
    ) -> DriveApiFuture<'a, Result<UploadSlot, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("request_upload_slot")) })
    }

    fn create_file<'a>(
        &'a self,
        _request: &'a CreateFileRequest,
    ) -> DriveApiFuture<'a, Result<FileRecord, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("create_file")) })
    }

    fn rename_file<'a>(
        &'a self,
        _id: &'a str,
        _request: &'a RenameRequest,
    ) -> DriveApiFuture<'a, Result<FileRecord, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("rename_file")) })
    }

    fn delete_file<'a>(&'a self, _id: &'a str) -> DriveApiFuture<'a, Result<(), DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("delete_file")) })
    }

    fn request_download_url<'a>(
        &'a self,
        _id: &'a str,
    ) -> DriveApiFuture<'a, Result<DownloadTicket, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("request_download_url")) })
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op auth API adapter; every call fails.
pub struct NoopAuthApi;

impl NoopAuthApi {
    fn unsupported_error(op: &str) -> DriveError {
        DriveError::remote(format!("auth api unavailable: {op}"))
    }
}

impl AuthApi for NoopAuthApi {
    fn register<'a>(
        &'a self,
        _request: &'a RegisterRequest,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("register")) })
    }

    fn activate<'a>(
        &'a self,
        _token: &'a str,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("activate")) })
    }

    fn login<'a>(
        &'a self,
        _request: &'a LoginRequest,
    ) -> DriveApiFuture<'a, Result<LoginResponse, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("login")) })
    }

    fn forgot_password<'a>(
        &'a self,
        _email: &'a str,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("forgot_password")) })
    }

    fn reset_password<'a>(
        &'a self,
        _request: &'a ResetPasswordRequest,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async { Err(Self::unsupported_error("reset_password")) })
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op object transfer adapter; every call fails.
pub struct NoopObjectTransfer;

impl ObjectTransfer for NoopObjectTransfer {
    fn put_object<'a>(
        &'a self,
        _url: &'a str,
        _mime_type: &'a str,
        _bytes: &'a [u8],
    ) -> DriveApiFuture<'a, Result<(), DriveError>> {
        Box::pin(async { Err(DriveError::remote("object storage unavailable: put_object")) })
    }

    fn get_object<'a>(&'a self, _url: &'a str) -> DriveApiFuture<'a, Result<Vec<u8>, DriveError>> {
        Box::pin(async { Err(DriveError::remote("object storage unavailable: get_object")) })
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op download sink; every save fails.
pub struct NoopDownloadSink;

impl DownloadSink for NoopDownloadSink {
    fn save_bytes(
        &self,
        _file_name: &str,
        _mime_type: &str,
        _bytes: &[u8],
    ) -> Result<(), DriveError> {
        Err(DriveError::remote("browser downloads unavailable"))
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn noop_drive_api_lists_empty_and_rejects_mutations() {
        let api = NoopDriveApi;
        let api_obj: &dyn DriveApi = &api;

        assert!(block_on(api_obj.list_folders()).expect("folders").is_empty());
        assert!(block_on(api_obj.list_files(None)).expect("files").is_empty());

        let request = CreateFolderRequest {
            name: "Docs".into(),
            parent_folder_id: None,
        };
        let err = block_on(api_obj.create_folder(&request)).expect_err("create should fail");
        assert!(err.to_string().contains("create_folder"));
    }

    #[test]
    fn noop_transfer_and_sink_fail() {
        assert!(block_on(NoopObjectTransfer.put_object("u", "text/plain", b"x")).is_err());
        assert!(NoopDownloadSink.save_bytes("a", "b", b"c").is_err());
        assert!(block_on(NoopAuthApi.activate("t")).is_err());
    }
}
