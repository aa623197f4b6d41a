//! Direct object-storage transfers against pre-signed URLs.

use drive_host::{DriveApiFuture, DriveError, ObjectTransfer};
use reqwest::{header::CONTENT_TYPE, Client, Response};

#[derive(Debug, Clone, Default)]
/// Object-storage client; pre-signed URLs carry their own authorization.
pub struct HttpObjectTransfer {
    client: Client,
}

async fn transfer_result(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DriveError::Transfer {
        status: status.as_u16(),
        body,
    })
}

fn transport_error(err: reqwest::Error) -> DriveError {
    DriveError::remote(format!("storage request failed: {err}"))
}

impl ObjectTransfer for HttpObjectTransfer {
    fn put_object<'a>(
        &'a self,
        url: &'a str,
        mime_type: &'a str,
        bytes: &'a [u8],
    ) -> DriveApiFuture<'a, Result<(), DriveError>> {
        Box::pin(async move {
            let response = self
                .client
                .put(url)
                .header(CONTENT_TYPE, mime_type)
                .body(bytes.to_vec())
                .send()
                .await
                .map_err(transport_error)?;
            transfer_result(response).await?;
            Ok(())
        })
    }

    fn get_object<'a>(&'a self, url: &'a str) -> DriveApiFuture<'a, Result<Vec<u8>, DriveError>> {
        Box::pin(async move {
            let response = self.client.get(url).send().await.map_err(transport_error)?;
            let bytes = transfer_result(response)
                .await?
                .bytes()
                .await
                .map_err(transport_error)?;
            Ok(bytes.to_vec())
        })
    }
}
