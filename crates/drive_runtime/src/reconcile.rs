//! Pure merge of fetched records, pending uploads, and overlay state into a display list.

use std::collections::HashSet;

use drive_host::{normalize_id_str, FileRecord, FolderRecord, ItemKind};
use serde::{Deserialize, Serialize};

use crate::{item::DriveItem, item::PendingUpload, overlay::OverlaySnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// View predicate applied after containment.
pub enum ViewMode {
    /// Every non-trashed item.
    All,
    /// Starred, non-trashed items.
    StarredOnly,
    /// Trashed items regardless of containment.
    TrashedOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Requested ordering.
pub enum ItemOrder {
    /// Recency at root, fetch order inside a folder, creation time in Trash.
    #[default]
    Auto,
    /// Most recently modified first.
    Recent,
    /// Case-insensitive name order.
    Name,
}

#[derive(Debug, Clone, Copy)]
/// Everything [`reconcile`] reads.
pub struct ReconcileInput<'a> {
    /// Fetched folders.
    pub folders: &'a [FolderRecord],
    /// Fetched files.
    pub files: &'a [FileRecord],
    /// Uploads in flight.
    pub pending: &'a [PendingUpload],
    /// Starred/trashed membership.
    pub overlay: &'a OverlaySnapshot,
    /// Current folder; `None` is root.
    pub current_folder: Option<&'a str>,
    /// View predicate.
    pub mode: ViewMode,
    /// Ordering.
    pub order: ItemOrder,
    /// Optional case-insensitive name filter.
    pub query: Option<&'a str>,
    /// Clock reading substituted for items without timestamps.
    pub now_ms: i64,
}

impl ReconcileInput<'_> {
    /// Returns `true` when containment is ignored.
    ///
    /// Trash is always flat. Starred is flat at root so every starred item shows exactly once.
    pub fn is_flat(&self) -> bool {
        match self.mode {
            ViewMode::TrashedOnly => true,
            ViewMode::StarredOnly => self.current_folder.is_none(),
            ViewMode::All => false,
        }
    }
}

/// Produces the ordered item list for one view.
///
/// Identical inputs always yield an identical list.
pub fn reconcile(input: &ReconcileInput<'_>) -> Vec<DriveItem> {
    let overlay = input.overlay;
    let mut seen: HashSet<(ItemKind, String)> = HashSet::new();
    let mut items = Vec::with_capacity(
        input.folders.len() + input.files.len() + input.pending.len(),
    );

    let folders = input
        .folders
        .iter()
        .map(|folder| DriveItem::from_folder(folder, overlay));
    let pending = input
        .pending
        .iter()
        .filter(|_| input.mode == ViewMode::All)
        .map(PendingUpload::to_item);
    let files = input
        .files
        .iter()
        .map(|file| DriveItem::from_file(file, overlay));

    for item in folders.chain(pending).chain(files) {
        if seen.insert((item.kind, item.id.clone())) {
            items.push(item);
        }
    }

    let current = input.current_folder.and_then(normalize_id_str);
    let flat = input.is_flat();
    let needle = input
        .query
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .map(str::to_lowercase);

    items.retain(|item| {
        if !flat && item.parent_id != current {
            return false;
        }
        let visible = match input.mode {
            ViewMode::All => !item.trashed,
            ViewMode::StarredOnly => item.starred && !item.trashed,
            ViewMode::TrashedOnly => item.trashed,
        };
        visible
            && needle
                .as_deref()
                .map_or(true, |needle| item.name.to_lowercase().contains(needle))
    });

    sort_items(&mut items, input);
    items
}

fn sort_items(items: &mut [DriveItem], input: &ReconcileInput<'_>) {
    let now = input.now_ms;
    match input.order {
        ItemOrder::Recent => items.sort_by_key(|item| std::cmp::Reverse(item.recency_ms(now))),
        ItemOrder::Name => items.sort_by_cached_key(|item| item.name.to_lowercase()),
        ItemOrder::Auto => match input.mode {
            ViewMode::TrashedOnly => items
                .sort_by_key(|item| std::cmp::Reverse(item.created_at_ms.unwrap_or(i64::MIN))),
            _ if input.current_folder.is_none() => {
                items.sort_by_key(|item| std::cmp::Reverse(item.recency_ms(now)))
            }
            _ => {}
        },
    }
}
