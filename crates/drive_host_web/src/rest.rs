//! Shared `reqwest` plumbing for the backend REST API.

use std::rc::Rc;

use drive_host::{AuthSession, DriveError};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

/// Joins a base URL and an absolute API path.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Maps a non-success API response to [`DriveError::Remote`], preferring the server's message.
pub(crate) fn remote_error(status: u16, body: &str) -> DriveError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .filter_map(|key| value.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .find(|message| !message.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Request failed with status {status}"));
    DriveError::Remote {
        status: Some(status),
        message,
    }
}

fn transport_error(err: reqwest::Error) -> DriveError {
    DriveError::remote(format!("network request failed: {err}"))
}

fn decode_error(what: &str, err: impl std::fmt::Display) -> DriveError {
    DriveError::remote(format!("malformed {what} response: {err}"))
}

/// Bearer-authenticated JSON client rooted at the API base URL.
#[derive(Clone)]
pub(crate) struct RestClient {
    client: Client,
    base_url: String,
    session: Option<Rc<dyn AuthSession>>,
}

impl RestClient {
    pub(crate) fn new(base_url: &str, session: Option<Rc<dyn AuthSession>>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            session,
        }
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, join_url(&self.base_url, path));
        match self.session.as_ref().and_then(|session| session.current_token()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, DriveError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(remote_error(status.as_u16(), &body))
    }

    pub(crate) async fn json(&self, builder: RequestBuilder, what: &str) -> Result<Value, DriveError> {
        let response = self.send(builder).await?;
        response
            .json::<Value>()
            .await
            .map_err(|err| decode_error(what, err))
    }

    pub(crate) async fn get_json(&self, path: &str, what: &str) -> Result<Value, DriveError> {
        self.json(self.request(Method::GET, path), what).await
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<Value, DriveError> {
        self.json(self.request(method, path).json(body), what).await
    }

    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, DriveError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), DriveError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

/// Decodes a typed payload out of a JSON value.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T, DriveError> {
    serde_json::from_value(value).map_err(|err| decode_error(what, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_with_one_slash() {
        assert_eq!(
            join_url("https://api.example.com/", "/folders"),
            "https://api.example.com/folders"
        );
        assert_eq!(
            join_url("https://api.example.com", "files/x1/download-url"),
            "https://api.example.com/files/x1/download-url"
        );
    }

    #[test]
    fn remote_error_prefers_server_message() {
        assert_eq!(
            remote_error(400, r#"{"message":"Folder already exists"}"#),
            DriveError::Remote {
                status: Some(400),
                message: "Folder already exists".to_string()
            }
        );
        assert_eq!(
            remote_error(401, r#"{"error":"Unauthorized"}"#).to_string(),
            "Unauthorized"
        );
        assert_eq!(
            remote_error(502, "<html>bad gateway</html>").to_string(),
            "Request failed with status 502"
        );
        assert_eq!(
            remote_error(500, r#"{"message":"  "}"#).to_string(),
            "Request failed with status 500"
        );
    }
}
