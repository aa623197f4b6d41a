//! Reading user-selected files into memory.

use drive_host::{DriveError, LocalFile};

/// Reads a file picked through an `<input type="file">` element.
///
/// # Errors
///
/// Returns [`DriveError::Validation`] when the browser could not read the file.
pub async fn read_browser_file(file: &web_sys::File) -> Result<LocalFile, DriveError> {
    #[cfg(target_arch = "wasm32")]
    {
        let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
            .await
            .map_err(|e| DriveError::Validation(format!("Could not read {}: {e:?}", file.name())))?;
        Ok(LocalFile {
            name: file.name(),
            mime_type: file.type_(),
            bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = file;
        Err(DriveError::Validation(
            "Reading local files requires a browser.".to_string(),
        ))
    }
}
