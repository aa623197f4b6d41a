//! Browser (`wasm32`) implementations of [`drive_host`] service contracts.
//!
//! REST calls go through `reqwest` (fetch-backed on `wasm32`), overlays and the token live in
//! `localStorage`, and downloads are handed to the browser through a Blob URL. Non-browser
//! targets compile the same types with inert fallbacks so the workspace builds and tests
//! natively.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and the drive host factory.
pub mod adapters;
pub mod config;
pub mod downloads;
pub mod drive_api;
pub mod files;
mod rest;
pub mod storage;
pub mod transfer;

pub use adapters::{
    build_drive_host, host_strategy_name, prefs_store, selected_host_strategy, DriveHost,
    HostStrategy, PrefsStoreAdapter, STUB_USER_ID,
};
pub use config::{DriveConfig, API_BASE_URL_ENV};
pub use downloads::BrowserDownloadSink;
pub use drive_api::{HttpAuthApi, HttpDriveApi};
pub use files::read_browser_file;
pub use storage::local_prefs::WebPrefsStore;
pub use transfer::HttpObjectTransfer;
