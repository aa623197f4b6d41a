//! Current-folder state and breadcrumb derivation.

use std::collections::HashSet;

use drive_host::{normalize_id_str, FolderRecord};

/// Upper bound on breadcrumb length; cyclic or corrupted parent graphs stop here.
pub const MAX_BREADCRUMB_DEPTH: usize = 100;

/// Walks parent pointers from `current` up to root and returns the root-to-current chain.
///
/// The walk stops at a dangling parent, a revisited folder, or [`MAX_BREADCRUMB_DEPTH`]
/// entries, yielding a truncated chain instead of looping.
pub fn breadcrumb_chain(current: &FolderRecord, folders: &[FolderRecord]) -> Vec<FolderRecord> {
    let mut chain = vec![current.clone()];
    let mut visited: HashSet<&str> = HashSet::from([current.id.as_str()]);
    let mut parent = current.parent_id.as_deref().and_then(normalize_id_str);

    while chain.len() < MAX_BREADCRUMB_DEPTH {
        let Some(parent_id) = parent.take() else {
            break;
        };
        let Some(folder) = folders.iter().find(|folder| folder.id == parent_id) else {
            break;
        };
        if !visited.insert(folder.id.as_str()) {
            break;
        }
        chain.push(folder.clone());
        parent = folder.parent_id.as_deref().and_then(normalize_id_str);
    }

    chain.reverse();
    chain
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Which folder the user is looking at.
pub struct FolderNavigation {
    current: Option<FolderRecord>,
}

impl FolderNavigation {
    /// Enters `folder`, or root for `None`.
    pub fn enter(&mut self, folder: Option<FolderRecord>) {
        self.current = folder;
    }

    /// Current folder; `None` at root.
    pub fn current(&self) -> Option<&FolderRecord> {
        self.current.as_ref()
    }

    /// Id of the current folder.
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(|folder| folder.id.as_str())
    }

    /// Returns `true` at root.
    pub fn is_root(&self) -> bool {
        self.current.is_none()
    }

    /// Swaps in a newer representation of the current folder, if it is the one given.
    pub fn refresh(&mut self, folder: &FolderRecord) {
        if let Some(current) = self.current.as_mut() {
            if current.id == folder.id {
                *current = folder.clone();
            }
        }
    }

    /// Root-to-current chain; empty at root.
    pub fn breadcrumbs(&self, folders: &[FolderRecord]) -> Vec<FolderRecord> {
        self.current
            .as_ref()
            .map(|current| breadcrumb_chain(current, folders))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn folder(id: &str, parent: Option<&str>) -> FolderRecord {
        FolderRecord {
            id: id.to_string(),
            name: format!("Folder {id}"),
            parent_id: parent.map(str::to_string),
            created_at_ms: None,
            modified_at_ms: None,
        }
    }

    fn chain_ids(chain: &[FolderRecord]) -> Vec<&str> {
        chain.iter().map(|folder| folder.id.as_str()).collect()
    }

    #[test]
    fn chain_runs_root_to_current() {
        let folders = vec![folder("a", None), folder("b", Some("a")), folder("c", Some("b"))];
        assert_eq!(chain_ids(&breadcrumb_chain(&folders[2], &folders)), vec!["a", "b", "c"]);
    }

    #[test]
    fn dangling_parent_truncates() {
        let folders = vec![folder("b", Some("gone")), folder("c", Some("b"))];
        assert_eq!(chain_ids(&breadcrumb_chain(&folders[1], &folders)), vec!["b", "c"]);
    }

    #[test]
    fn cycles_terminate() {
        let folders = vec![folder("a", Some("b")), folder("b", Some("a"))];
        assert_eq!(chain_ids(&breadcrumb_chain(&folders[0], &folders)), vec!["b", "a"]);

        let selfish = vec![folder("s", Some("s"))];
        assert_eq!(chain_ids(&breadcrumb_chain(&selfish[0], &selfish)), vec!["s"]);
    }

    #[test]
    fn deep_chains_are_bounded() {
        let folders: Vec<FolderRecord> = (0..250)
            .map(|index| {
                let parent = (index > 0).then(|| format!("n{}", index - 1));
                folder(&format!("n{index}"), parent.as_deref())
            })
            .collect();
        let chain = breadcrumb_chain(&folders[249], &folders);
        assert_eq!(chain.len(), MAX_BREADCRUMB_DEPTH);
        assert_eq!(chain.last().map(|folder| folder.id.as_str()), Some("n249"));
    }

    #[test]
    fn navigation_enter_refresh_and_root() {
        let folders = vec![folder("a", None), folder("b", Some("a"))];
        let mut navigation = FolderNavigation::default();
        assert!(navigation.is_root());
        assert!(navigation.breadcrumbs(&folders).is_empty());

        navigation.enter(Some(folders[1].clone()));
        assert_eq!(navigation.current_id(), Some("b"));
        assert_eq!(chain_ids(&navigation.breadcrumbs(&folders)), vec!["a", "b"]);

        let mut renamed = folders[1].clone();
        renamed.name = "Renamed".to_string();
        navigation.refresh(&renamed);
        assert_eq!(navigation.current().map(|f| f.name.as_str()), Some("Renamed"));
        navigation.refresh(&folder("other", None));
        assert_eq!(navigation.current_id(), Some("b"));

        navigation.enter(None);
        assert!(navigation.is_root());
    }
}
