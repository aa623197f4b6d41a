//! Local working set: fetched records, pending uploads, and navigation.

use drive_host::{normalize_id_str, DriveError, FileRecord, FolderRecord, ItemKind};

use crate::{
    item::{DriveItem, PendingUpload},
    navigation::FolderNavigation,
    overlay::OverlaySnapshot,
    reconcile::{reconcile, ItemOrder, ReconcileInput, ViewMode},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Everything a drive view has fetched or synthesized locally.
///
/// Ids passed in are normalized before lookups. Records are stored as parsed.
pub struct DriveWorkspace {
    folders: Vec<FolderRecord>,
    files: Vec<FileRecord>,
    pending: Vec<PendingUpload>,
    navigation: FolderNavigation,
}

impl DriveWorkspace {
    /// Fetched folders.
    pub fn folders(&self) -> &[FolderRecord] {
        &self.folders
    }

    /// Fetched files.
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    /// Uploads in flight.
    pub fn pending(&self) -> &[PendingUpload] {
        &self.pending
    }

    /// Navigation state.
    pub fn navigation(&self) -> &FolderNavigation {
        &self.navigation
    }

    /// Replaces the folder collection after a full listing.
    pub fn replace_folders(&mut self, folders: Vec<FolderRecord>) {
        self.folders = folders;
        let current = self
            .navigation
            .current_id()
            .and_then(|id| self.folders.iter().find(|folder| folder.id == id))
            .cloned();
        if let Some(current) = current {
            self.navigation.refresh(&current);
        }
    }

    /// Replaces the file collection after a full listing; unpersisted entries are dropped.
    pub fn replace_files(&mut self, files: Vec<FileRecord>) {
        self.files = files.into_iter().filter(FileRecord::is_persisted).collect();
    }

    /// Replaces the files of one folder with a fresh listing of that folder.
    pub fn merge_folder_files(&mut self, folder_id: Option<&str>, files: Vec<FileRecord>) {
        let folder_id = folder_id.and_then(normalize_id_str);
        self.files.retain(|file| file.folder_id != folder_id);
        for file in files.into_iter().filter(FileRecord::is_persisted) {
            self.upsert_file(file);
        }
    }

    /// Adds a folder confirmed by the server, replacing any entry with the same id.
    pub fn insert_folder(&mut self, folder: FolderRecord) {
        if !self.replace_folder(folder.clone()) {
            self.folders.push(folder);
        }
    }

    /// Adds or replaces a file.
    pub fn upsert_file(&mut self, file: FileRecord) {
        if !self.replace_file(file.clone()) {
            self.files.push(file);
        }
    }

    /// Replaces a folder in place. Returns `false` when it is not present.
    pub fn replace_folder(&mut self, folder: FolderRecord) -> bool {
        let Some(slot) = self.folders.iter_mut().find(|entry| entry.id == folder.id) else {
            return false;
        };
        self.navigation.refresh(&folder);
        *slot = folder;
        true
    }

    /// Replaces a file in place. Returns `false` when it is not present.
    pub fn replace_file(&mut self, file: FileRecord) -> bool {
        match self.files.iter_mut().find(|entry| entry.id == file.id) {
            Some(slot) => {
                *slot = file;
                true
            }
            None => false,
        }
    }

    /// Removes an item from every local collection. Leaving a removed current folder returns
    /// to root.
    pub fn remove_item(&mut self, kind: ItemKind, id: &str) -> bool {
        let Some(id) = normalize_id_str(id) else {
            return false;
        };
        match kind {
            ItemKind::Folder => {
                let before = self.folders.len();
                self.folders.retain(|folder| folder.id != id);
                if self.navigation.current_id() == Some(id.as_str()) {
                    self.navigation.enter(None);
                }
                self.folders.len() != before
            }
            ItemKind::File => {
                let before = self.files.len();
                self.files.retain(|file| file.id != id);
                self.files.len() != before
            }
        }
    }

    /// Shows a placeholder for an upload.
    pub fn begin_upload(&mut self, upload: PendingUpload) {
        self.pending.push(upload);
    }

    /// Drops an upload placeholder.
    pub fn finish_upload(&mut self, temp_id: &str) {
        self.pending.retain(|upload| upload.temp_id != temp_id);
    }

    /// Looks up a folder.
    pub fn find_folder(&self, id: &str) -> Option<&FolderRecord> {
        let id = normalize_id_str(id)?;
        self.folders.iter().find(|folder| folder.id == id)
    }

    /// Looks up a file.
    pub fn find_file(&self, id: &str) -> Option<&FileRecord> {
        let id = normalize_id_str(id)?;
        self.files.iter().find(|file| file.id == id)
    }

    /// Kind of a locally known id; folders win when both collections hold it.
    pub fn kind_of(&self, id: &str) -> Option<ItemKind> {
        if self.find_folder(id).is_some() {
            Some(ItemKind::Folder)
        } else if self.find_file(id).is_some() {
            Some(ItemKind::File)
        } else {
            None
        }
    }

    /// Enters a known folder, or root for `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::NotFound`] when the folder is not in the working set.
    pub fn enter_folder(&mut self, folder_id: Option<&str>) -> Result<(), DriveError> {
        let folder = match folder_id {
            Some(id) => Some(
                self.find_folder(id)
                    .cloned()
                    .ok_or_else(|| DriveError::not_found(id))?,
            ),
            None => None,
        };
        self.navigation.enter(folder);
        Ok(())
    }

    /// Root-to-current breadcrumb chain.
    pub fn breadcrumbs(&self) -> Vec<FolderRecord> {
        self.navigation.breadcrumbs(&self.folders)
    }

    /// Reconciles the working set for one view.
    pub fn items(
        &self,
        overlay: &OverlaySnapshot,
        mode: ViewMode,
        order: ItemOrder,
        query: Option<&str>,
        now_ms: i64,
    ) -> Vec<DriveItem> {
        reconcile(&ReconcileInput {
            folders: &self.folders,
            files: &self.files,
            pending: &self.pending,
            overlay,
            current_folder: self.navigation.current_id(),
            mode,
            order,
            query,
            now_ms,
        })
    }
}
