//! The four drive screens as presets over one pipeline.

use serde::{Deserialize, Serialize};

use crate::reconcile::{ItemOrder, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// A drive screen.
pub enum DriveView {
    /// Recent items across the drive.
    Home,
    /// The folder browser.
    MyDrive,
    /// Starred items.
    Starred,
    /// Trashed items.
    Trash,
}

impl DriveView {
    /// Every view, in sidebar order.
    pub const ALL: [Self; 4] = [Self::Home, Self::MyDrive, Self::Starred, Self::Trash];

    /// Heading text.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::MyDrive => "My Drive",
            Self::Starred => "Starred",
            Self::Trash => "Trash",
        }
    }

    /// Route path.
    pub const fn route(self) -> &'static str {
        match self {
            Self::Home => "/home",
            Self::MyDrive => "/my-drive",
            Self::Starred => "/starred",
            Self::Trash => "/trash",
        }
    }

    /// Parses a route path.
    pub fn from_route(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        Self::ALL.into_iter().find(|view| view.route() == path)
    }

    /// Reconciliation predicate.
    pub const fn mode(self) -> ViewMode {
        match self {
            Self::Home | Self::MyDrive => ViewMode::All,
            Self::Starred => ViewMode::StarredOnly,
            Self::Trash => ViewMode::TrashedOnly,
        }
    }

    /// Default ordering.
    pub const fn order(self) -> ItemOrder {
        match self {
            Self::Home => ItemOrder::Recent,
            Self::MyDrive | Self::Starred | Self::Trash => ItemOrder::Auto,
        }
    }

    /// Whether opening a folder navigates into it.
    pub const fn browses_folders(self) -> bool {
        matches!(self, Self::Home | Self::MyDrive)
    }

    /// Whether the view offers upload and new-folder actions.
    pub const fn allows_upload(self) -> bool {
        !matches!(self, Self::Trash)
    }

    /// Whether folders created here are starred immediately.
    pub const fn stars_new_folders(self) -> bool {
        matches!(self, Self::Starred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_round_trip() {
        for view in DriveView::ALL {
            assert_eq!(DriveView::from_route(view.route()), Some(view));
        }
        assert_eq!(DriveView::from_route("/trash/"), Some(DriveView::Trash));
        assert_eq!(DriveView::from_route("/login"), None);
    }

    #[test]
    fn presets_pick_the_right_predicates() {
        assert_eq!(DriveView::Home.mode(), ViewMode::All);
        assert_eq!(DriveView::Starred.mode(), ViewMode::StarredOnly);
        assert_eq!(DriveView::Trash.mode(), ViewMode::TrashedOnly);
        assert!(!DriveView::Trash.allows_upload());
        assert!(!DriveView::Starred.browses_folders());
        assert!(DriveView::Starred.stars_new_folders());
    }
}
