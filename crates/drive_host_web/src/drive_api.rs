//! REST implementations of the folder, file, and account APIs.

use std::rc::Rc;

use drive_host::{
    unwrap_entity, unwrap_list, AuthApi, AuthMessage, AuthSession, CreateFileRequest,
    CreateFolderRequest, DownloadTicket, DriveApi, DriveApiFuture, DriveError, FileRecord,
    FolderRecord, LoginRequest, LoginResponse, RegisterRequest, RenameRequest,
    ResetPasswordRequest, UploadSlot, UploadSlotRequest,
};
use reqwest::Method;
use serde_json::{json, Value};

use crate::rest::{decode, RestClient};

fn folder_from(value: &Value) -> Result<FolderRecord, DriveError> {
    FolderRecord::from_value(unwrap_entity(value, "folder"))
        .ok_or_else(|| DriveError::remote("malformed folder response: missing id"))
}

fn file_from(value: &Value) -> Result<FileRecord, DriveError> {
    FileRecord::from_value(unwrap_entity(value, "file"))
        .ok_or_else(|| DriveError::remote("malformed file response: missing id"))
}

/// Folders parsed from a list response; entries without an id are skipped.
pub(crate) fn folders_from(value: &Value) -> Vec<FolderRecord> {
    unwrap_list(value, "folders")
        .iter()
        .filter_map(FolderRecord::from_value)
        .collect()
}

/// Persisted files parsed from a list response.
pub(crate) fn files_from(value: &Value) -> Vec<FileRecord> {
    unwrap_list(value, "files")
        .iter()
        .filter_map(FileRecord::from_value)
        .filter(FileRecord::is_persisted)
        .collect()
}

/// Folder and file API over HTTP with the session's bearer token.
#[derive(Clone)]
pub struct HttpDriveApi {
    rest: RestClient,
}

impl HttpDriveApi {
    /// Client for `base_url`, authenticated through `session`.
    pub fn new(base_url: &str, session: Rc<dyn AuthSession>) -> Self {
        Self {
            rest: RestClient::new(base_url, Some(session)),
        }
    }
}

impl DriveApi for HttpDriveApi {
    fn list_folders(&self) -> DriveApiFuture<'_, Result<Vec<FolderRecord>, DriveError>> {
        Box::pin(async move {
            let value = self.rest.get_json("/folders", "folder list").await?;
            Ok(folders_from(&value))
        })
    }

    fn create_folder<'a>(
        &'a self,
        request: &'a CreateFolderRequest,
    ) -> DriveApiFuture<'a, Result<FolderRecord, DriveError>> {
        Box::pin(async move {
            let value = self
                .rest
                .send_json(Method::POST, "/folders", request, "folder")
                .await?;
            folder_from(&value)
        })
    }

    fn rename_folder<'a>(
        &'a self,
        id: &'a str,
        request: &'a RenameRequest,
    ) -> DriveApiFuture<'a, Result<FolderRecord, DriveError>> {
        Box::pin(async move {
            let path = format!("/folders/{id}");
            let value = self
                .rest
                .send_json(Method::PATCH, &path, request, "folder")
                .await?;
            folder_from(&value)
        })
    }

    fn delete_folder<'a>(&'a self, id: &'a str) -> DriveApiFuture<'a, Result<(), DriveError>> {
        Box::pin(async move { self.rest.delete(&format!("/folders/{id}")).await })
    }

    fn download_folder_archive<'a>(
        &'a self,
        id: &'a str,
    ) -> DriveApiFuture<'a, Result<Vec<u8>, DriveError>> {
        Box::pin(async move { self.rest.get_bytes(&format!("/folders/{id}/download")).await })
    }

    fn list_files<'a>(
        &'a self,
        folder_id: Option<&'a str>,
    ) -> DriveApiFuture<'a, Result<Vec<FileRecord>, DriveError>> {
        Box::pin(async move {
            let mut request = self.rest.request(Method::GET, "/files");
            if let Some(folder_id) = folder_id {
                request = request.query(&[("folderId", folder_id)]);
            }
            let value = self.rest.json(request, "file list").await?;
            let files = files_from(&value);
            Ok(match folder_id {
                Some(folder_id) => files
                    .into_iter()
                    .filter(|file| file.folder_id.as_deref() == Some(folder_id))
                    .collect(),
                None => files,
            })
        })
    }

    fn request_upload_slot<'a>(
        &'a self,
        request: &'a UploadSlotRequest,
    ) -> DriveApiFuture<'a, Result<UploadSlot, DriveError>> {
        Box::pin(async move {
            let value = self
                .rest
                .send_json(Method::POST, "/files/upload-url", request, "upload slot")
                .await?;
            decode(value, "upload slot")
        })
    }

    fn create_file<'a>(
        &'a self,
        request: &'a CreateFileRequest,
    ) -> DriveApiFuture<'a, Result<FileRecord, DriveError>> {
        Box::pin(async move {
            let value = self
                .rest
                .send_json(Method::POST, "/files", request, "file")
                .await?;
            file_from(&value)
        })
    }

    fn rename_file<'a>(
        &'a self,
        id: &'a str,
        request: &'a RenameRequest,
    ) -> DriveApiFuture<'a, Result<FileRecord, DriveError>> {
        Box::pin(async move {
            let path = format!("/files/{id}");
            let value = self
                .rest
                .send_json(Method::PATCH, &path, request, "file")
                .await?;
            file_from(&value)
        })
    }

    fn delete_file<'a>(&'a self, id: &'a str) -> DriveApiFuture<'a, Result<(), DriveError>> {
        Box::pin(async move { self.rest.delete(&format!("/files/{id}")).await })
    }

    fn request_download_url<'a>(
        &'a self,
        id: &'a str,
    ) -> DriveApiFuture<'a, Result<DownloadTicket, DriveError>> {
        Box::pin(async move {
            let path = format!("/files/{id}/download-url");
            let value = self.rest.get_json(&path, "download url").await?;
            decode(value, "download url")
        })
    }
}

/// Account API over HTTP. Requests are unauthenticated.
#[derive(Clone)]
pub struct HttpAuthApi {
    rest: RestClient,
}

impl HttpAuthApi {
    /// Client for `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            rest: RestClient::new(base_url, None),
        }
    }

    async fn message(&self, request: reqwest::RequestBuilder) -> Result<AuthMessage, DriveError> {
        let value = self.rest.json(request, "auth").await?;
        Ok(AuthMessage {
            message: value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

impl AuthApi for HttpAuthApi {
    fn register<'a>(
        &'a self,
        request: &'a RegisterRequest,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async move {
            self.message(self.rest.request(Method::POST, "/auth/register").json(request))
                .await
        })
    }

    fn activate<'a>(
        &'a self,
        token: &'a str,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async move {
            self.message(
                self.rest
                    .request(Method::GET, "/auth/activate")
                    .query(&[("token", token)]),
            )
            .await
        })
    }

    fn login<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> DriveApiFuture<'a, Result<LoginResponse, DriveError>> {
        Box::pin(async move {
            let value = self
                .rest
                .send_json(Method::POST, "/auth/login", request, "login")
                .await?;
            decode(value, "login")
        })
    }

    fn forgot_password<'a>(
        &'a self,
        email: &'a str,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async move {
            self.message(
                self.rest
                    .request(Method::POST, "/auth/forgot-password")
                    .json(&json!({ "email": email })),
            )
            .await
        })
    }

    fn reset_password<'a>(
        &'a self,
        request: &'a ResetPasswordRequest,
    ) -> DriveApiFuture<'a, Result<AuthMessage, DriveError>> {
        Box::pin(async move {
            self.message(
                self.rest
                    .request(Method::POST, "/auth/reset-password")
                    .json(request),
            )
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_responses_accept_bare_and_wrapped_arrays() {
        let bare = json!([{ "_id": "f1", "name": "Docs", "parentFolderId": null }]);
        let wrapped = json!({ "folders": [{ "_id": { "$oid": "f1" }, "name": "Docs" }] });
        assert_eq!(folders_from(&bare), folders_from(&wrapped));
        assert_eq!(folders_from(&json!({ "unexpected": true })), Vec::new());
    }

    #[test]
    fn unpersisted_files_are_skipped() {
        let value = json!({ "files": [
            { "_id": "x1", "fileName": "a.txt", "s3Key": "u/a.txt", "folderId": "f1" },
            { "_id": "x2", "fileName": "b.txt" },
            { "fileName": "c.txt", "s3Key": "u/c.txt" }
        ]});
        let files = files_from(&value);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.txt");
        assert_eq!(files[0].folder_id.as_deref(), Some("f1"));
    }

    #[test]
    fn entity_responses_unwrap_envelopes() {
        let wrapped = json!({ "folder": { "_id": "f9", "name": "New" } });
        assert_eq!(folder_from(&wrapped).map(|f| f.id), Ok("f9".to_string()));
        let direct = json!({ "_id": "x9", "name": "n.txt", "s3Key": "k" });
        assert_eq!(file_from(&direct).map(|f| f.name), Ok("n.txt".to_string()));
        assert!(folder_from(&json!({ "folder": {} })).is_err());
    }
}
