//! Client-local "starred" and "trashed" membership sets.
//!
//! Each set is a JSON array of canonical ids persisted under its own prefs key. The store is
//! constructed once per app and shared by reference; clones share the backing [`PrefsStore`].
//! Unreadable stored data never raises: it reads back as an empty set.

use std::{collections::BTreeSet, rc::Rc};

use drive_host::{load_pref_with, normalize_id, normalize_id_str, save_pref_with, PrefsStore};
use leptos::logging;
use serde_json::Value;

/// Prefs key of the starred set.
pub const STARRED_IDS_KEY: &str = "starred-ids";
/// Prefs key of the trashed set.
pub const TRASHED_IDS_KEY: &str = "trashed-ids";

/// One durable id set.
#[derive(Clone)]
pub struct OverlaySet {
    key: &'static str,
    store: Rc<dyn PrefsStore>,
}

impl std::fmt::Debug for OverlaySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlaySet").field("key", &self.key).finish()
    }
}

impl OverlaySet {
    /// Creates a set persisted under `key`.
    pub fn new(key: &'static str, store: Rc<dyn PrefsStore>) -> Self {
        Self { key, store }
    }

    /// Prefs key backing this set.
    pub fn key(&self) -> &'static str {
        self.key
    }

    fn read(&self) -> Vec<String> {
        match load_pref_with::<_, Vec<Value>>(self.store.as_ref(), self.key) {
            Ok(Some(raw)) => {
                let mut ids: Vec<String> = Vec::with_capacity(raw.len());
                for id in raw.iter().filter_map(normalize_id) {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                ids
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                logging::warn!("overlay `{}` unreadable, treating as empty: {err}", self.key);
                Vec::new()
            }
        }
    }

    fn write(&self, ids: &[String]) {
        if let Err(err) = save_pref_with(self.store.as_ref(), self.key, &ids) {
            logging::warn!("overlay `{}` persist failed: {err}", self.key);
        }
    }

    /// Returns `true` when `id` is a member.
    pub fn contains(&self, id: &str) -> bool {
        match normalize_id_str(id) {
            Some(id) => self.read().contains(&id),
            None => false,
        }
    }

    /// Flips membership and returns the new state. Unresolvable ids stay non-members.
    pub fn toggle(&self, id: &str) -> bool {
        let Some(id) = normalize_id_str(id) else {
            return false;
        };
        let mut ids = self.read();
        let now_member = match ids.iter().position(|existing| *existing == id) {
            Some(index) => {
                ids.remove(index);
                false
            }
            None => {
                ids.push(id);
                true
            }
        };
        self.write(&ids);
        now_member
    }

    /// Adds `id`; adding a present id is a no-op.
    pub fn add(&self, id: &str) {
        let Some(id) = normalize_id_str(id) else {
            return;
        };
        let mut ids = self.read();
        if !ids.contains(&id) {
            ids.push(id);
            self.write(&ids);
        }
    }

    /// Removes `id`; removing an absent id is a no-op.
    pub fn remove(&self, id: &str) {
        let Some(id) = normalize_id_str(id) else {
            return;
        };
        let mut ids = self.read();
        let before = ids.len();
        ids.retain(|existing| *existing != id);
        if ids.len() != before {
            self.write(&ids);
        }
    }

    /// Every member id.
    pub fn list_all(&self) -> BTreeSet<String> {
        self.read().into_iter().collect()
    }

    /// Removes every member.
    pub fn clear(&self) {
        self.write(&[]);
    }
}

/// The starred and trashed sets, constructed once and passed to every view.
#[derive(Clone, Debug)]
pub struct OverlayStore {
    /// Starred ids.
    pub starred: OverlaySet,
    /// Trashed ids.
    pub trashed: OverlaySet,
}

impl OverlayStore {
    /// Builds both sets over one prefs store.
    pub fn new(store: Rc<dyn PrefsStore>) -> Self {
        Self {
            starred: OverlaySet::new(STARRED_IDS_KEY, store.clone()),
            trashed: OverlaySet::new(TRASHED_IDS_KEY, store),
        }
    }

    /// Drops `id` from both sets (after a permanent delete).
    pub fn forget(&self, id: &str) {
        self.starred.remove(id);
        self.trashed.remove(id);
    }

    /// Captures both sets for a reconciliation pass.
    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            starred: self.starred.list_all(),
            trashed: self.trashed.list_all(),
        }
    }
}

/// Point-in-time copy of the overlay sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySnapshot {
    /// Starred ids.
    pub starred: BTreeSet<String>,
    /// Trashed ids.
    pub trashed: BTreeSet<String>,
}

impl OverlaySnapshot {
    /// Adds starred ids.
    pub fn with_starred<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.starred
            .extend(ids.into_iter().filter_map(normalize_id_str));
        self
    }

    /// Adds trashed ids.
    pub fn with_trashed<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.trashed
            .extend(ids.into_iter().filter_map(normalize_id_str));
        self
    }

    /// Starred membership.
    pub fn is_starred(&self, id: &str) -> bool {
        self.starred.contains(id)
    }

    /// Trashed membership.
    pub fn is_trashed(&self, id: &str) -> bool {
        self.trashed.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use drive_host::MemoryPrefsStore;
    use pretty_assertions::assert_eq;

    use super::*;

    fn store() -> (MemoryPrefsStore, OverlayStore) {
        let prefs = MemoryPrefsStore::default();
        let overlay = OverlayStore::new(Rc::new(prefs.clone()));
        (prefs, overlay)
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let (_, overlay) = store();
        assert!(!overlay.starred.contains("x1"));
        assert!(overlay.starred.toggle("x1"));
        assert!(overlay.starred.contains("x1"));
        assert!(!overlay.starred.toggle("x1"));
        assert!(!overlay.starred.contains("x1"));
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let (prefs, overlay) = store();
        overlay.trashed.add("x1");
        overlay.trashed.add("x1");
        assert_eq!(prefs.raw(TRASHED_IDS_KEY).as_deref(), Some("[\"x1\"]"));

        overlay.trashed.remove("x1");
        overlay.trashed.remove("x1");
        overlay.trashed.remove("never-added");
        assert!(overlay.trashed.list_all().is_empty());

        overlay.trashed.remove("x2");
        overlay.trashed.add("x2");
        assert!(overlay.trashed.contains("x2"));
    }

    #[test]
    fn sets_are_independent() {
        let (_, overlay) = store();
        overlay.starred.add("x1");
        overlay.trashed.add("x1");
        overlay.trashed.remove("x1");
        assert!(overlay.starred.contains("x1"));
        assert!(!overlay.trashed.contains("x1"));
    }

    #[test]
    fn membership_survives_reload_through_shared_prefs() {
        let (prefs, overlay) = store();
        overlay.starred.add("x1");
        let reloaded = OverlayStore::new(Rc::new(prefs));
        assert!(reloaded.starred.contains("x1"));
    }

    #[test]
    fn corrupt_or_foreign_data_reads_as_empty() {
        let (prefs, overlay) = store();
        for raw in ["{not json", "{\"a\":1}", "\"x1\"", "null"] {
            prefs.save_pref(STARRED_IDS_KEY, raw).expect("seed");
            assert!(overlay.starred.list_all().is_empty(), "raw={raw}");
            assert!(!overlay.starred.contains("x1"));
        }

        overlay.starred.add("x1");
        assert_eq!(overlay.starred.list_all().len(), 1);
    }

    #[test]
    fn stored_ids_are_normalized_on_read() {
        let (prefs, overlay) = store();
        prefs
            .save_pref(
                TRASHED_IDS_KEY,
                "[\" x1 \", {\"$oid\": \"x2\"}, \"x1\", \"\", 7]",
            )
            .expect("seed");
        let ids: Vec<String> = overlay.trashed.list_all().into_iter().collect();
        assert_eq!(ids, vec!["7".to_string(), "x1".to_string(), "x2".to_string()]);
        assert!(overlay.trashed.contains("  x2"));
    }

    #[test]
    fn blank_ids_are_never_members() {
        let (_, overlay) = store();
        assert!(!overlay.starred.toggle("  "));
        overlay.starred.add("");
        assert!(overlay.starred.list_all().is_empty());
    }

    #[test]
    fn clear_and_forget() {
        let (_, overlay) = store();
        overlay.starred.add("a");
        overlay.trashed.add("a");
        overlay.trashed.add("b");
        overlay.forget("a");
        assert!(!overlay.starred.contains("a"));
        assert_eq!(
            overlay.snapshot(),
            OverlaySnapshot::default().with_trashed(["b"])
        );
        overlay.trashed.clear();
        assert!(overlay.trashed.list_all().is_empty());
    }
}
