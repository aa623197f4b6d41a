//! Drive runtime: overlay state, item reconciliation, folder navigation, and the mutation
//! controller shared by every drive view.
//!
//! Views (Home, My Drive, Starred, Trash) are presets over one reconciliation pipeline
//! ([`reconcile`]) and one controller ([`DriveController`]); they differ only in the
//! [`ViewMode`] predicate and a few presentation flags carried by [`DriveView`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod auth_flow;
pub mod batch;
pub mod controller;
pub mod item;
pub mod lifetime;
pub mod navigation;
pub mod overlay;
pub mod present;
pub mod reconcile;
pub mod views;
pub mod workspace;

pub use auth_flow::{AuthFlow, ACTIVATION_EMAIL_KEY, ACTIVATION_PENDING_KEY};
pub use batch::{BatchFailure, BatchOutcome, BatchReport};
pub use controller::{DriveController, DriveServices};
pub use item::{DriveItem, PendingUpload};
pub use lifetime::{LifetimeTicket, SessionLifetime};
pub use navigation::{breadcrumb_chain, FolderNavigation, MAX_BREADCRUMB_DEPTH};
pub use overlay::{OverlaySet, OverlaySnapshot, OverlayStore, STARRED_IDS_KEY, TRASHED_IDS_KEY};
pub use present::{date_label, file_glyph, format_file_size, FileGlyph};
pub use reconcile::{reconcile, ItemOrder, ReconcileInput, ViewMode};
pub use views::DriveView;
pub use workspace::DriveWorkspace;
