//! Leptos views for the drive client: one parameterized drive page for Home, My Drive,
//! Starred, and Trash, plus the account forms.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod account;
mod context;
mod drive_page;

pub use account::{ActivatePage, ForgotPasswordPage, LoginPage, RegisterPage, ResetPasswordPage};
pub use context::{use_drive_context, DriveContext, DriveProvider};
pub use drive_page::{DriveNav, DrivePage};
