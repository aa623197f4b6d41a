//! Browser-level "save as" through a Blob URL and a transient anchor.

use drive_host::{DownloadSink, DriveError};

#[derive(Debug, Clone, Copy, Default)]
/// Saves bytes through the browser's download prompt.
pub struct BrowserDownloadSink;

#[cfg(target_arch = "wasm32")]
fn save_in_browser(file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<(), String> {
    use wasm_bindgen::JsCast;
    use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

    let window = web_sys::window().ok_or("window unavailable")?;
    let document = window.document().ok_or("document unavailable")?;
    let body = document.body().ok_or("document body unavailable")?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| format!("blob build failed: {e:?}"))?;
    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|e| format!("object url failed: {e:?}"))?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("anchor create failed: {e:?}"))?
        .dyn_into()
        .map_err(|_| "anchor cast failed".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.set_rel("noopener");
    body.append_child(&anchor)
        .map_err(|e| format!("anchor attach failed: {e:?}"))?;
    anchor.click();
    let _ = body.remove_child(&anchor);
    let _ = Url::revoke_object_url(&url);
    Ok(())
}

impl DownloadSink for BrowserDownloadSink {
    fn save_bytes(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<(), DriveError> {
        #[cfg(target_arch = "wasm32")]
        {
            save_in_browser(file_name, mime_type, bytes)
                .map_err(|message| DriveError::Remote {
                    status: None,
                    message: format!("Download failed: {message}"),
                })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (mime_type, bytes);
            Err(DriveError::remote(format!(
                "Download failed: browser downloads unavailable for {file_name}"
            )))
        }
    }
}
