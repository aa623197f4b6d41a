//! Fetch and mutation operations shared by every drive view.
//!
//! A [`DriveController`] owns one view's working set and routes every mutation through the
//! injected services. Two [`SessionLifetime`]s guard it: the view lifetime ends on
//! [`DriveController::detach`], and the navigation lifetime moves whenever a different folder is
//! entered. Listings resolved under a stale lifetime are dropped; mutation results only need the
//! view lifetime, and overlay effects of a completed remote delete always apply.
//!
//! `RefCell` borrows of the working set are never held across an `.await`.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    rc::Rc,
};

use drive_host::{
    normalize_id_str, unix_time_ms_now, CreateFileRequest, CreateFolderRequest, DownloadSink,
    DriveApi, DriveError, FileRecord, FolderRecord, IdentityProvider, ItemKind, LocalFile,
    NoopDownloadSink, NoopDriveApi, NoopObjectTransfer, ObjectTransfer, RenameRequest,
    UploadSlotRequest,
};
use futures::future::try_join;
use leptos::logging;

use crate::{
    batch::BatchReport,
    item::{DriveItem, PendingUpload},
    lifetime::{LifetimeTicket, SessionLifetime},
    overlay::OverlayStore,
    reconcile::{ItemOrder, ViewMode},
    views::DriveView,
    workspace::DriveWorkspace,
};

/// Content type for folder archives.
const ARCHIVE_MIME_TYPE: &str = "application/zip";
/// Content type for single-file downloads.
const DOWNLOAD_MIME_TYPE: &str = "application/octet-stream";
/// Save name used when the server does not suggest one.
const FALLBACK_DOWNLOAD_NAME: &str = "download";

#[derive(Clone)]
/// Service bundle injected into every controller.
pub struct DriveServices {
    /// Folder and file API.
    pub api: Rc<dyn DriveApi>,
    /// Object-storage transfers.
    pub transfer: Rc<dyn ObjectTransfer>,
    /// Browser save.
    pub downloads: Rc<dyn DownloadSink>,
    /// Acting identity.
    pub identity: Rc<dyn IdentityProvider>,
}

impl DriveServices {
    /// Services that list nothing and reject every mutation.
    pub fn noop(identity: Rc<dyn IdentityProvider>) -> Self {
        Self {
            api: Rc::new(NoopDriveApi),
            transfer: Rc::new(NoopObjectTransfer),
            downloads: Rc::new(NoopDownloadSink),
            identity,
        }
    }
}

struct ListingGuard {
    view: LifetimeTicket,
    navigation: LifetimeTicket,
}

impl ListingGuard {
    fn is_current(&self) -> bool {
        self.view.is_current() && self.navigation.is_current()
    }
}

#[derive(Clone)]
/// Operations and working set for one mounted drive view.
pub struct DriveController {
    view: DriveView,
    services: DriveServices,
    overlay: OverlayStore,
    workspace: Rc<RefCell<DriveWorkspace>>,
    view_lifetime: SessionLifetime,
    navigation_lifetime: SessionLifetime,
    upload_counter: Rc<Cell<u64>>,
    listed: Rc<Cell<bool>>,
    change_hook: Option<Rc<dyn Fn()>>,
    quiet_fetch_errors: bool,
}

impl DriveController {
    /// Builds a controller for `view`.
    pub fn new(view: DriveView, services: DriveServices, overlay: OverlayStore) -> Self {
        Self {
            view,
            services,
            overlay,
            workspace: Rc::new(RefCell::new(DriveWorkspace::default())),
            view_lifetime: SessionLifetime::default(),
            navigation_lifetime: SessionLifetime::default(),
            upload_counter: Rc::new(Cell::new(0)),
            listed: Rc::new(Cell::new(false)),
            change_hook: None,
            quiet_fetch_errors: false,
        }
    }

    /// Runs `hook` whenever the working set changes while an operation is still in flight
    /// (listings landing, upload placeholders appearing or leaving).
    pub fn with_change_hook(mut self, hook: impl Fn() + 'static) -> Self {
        self.change_hook = Some(Rc::new(hook));
        self
    }

    fn notify_changed(&self) {
        if let Some(hook) = &self.change_hook {
            hook();
        }
    }

    /// Whether a full listing has been applied to the working set.
    pub fn is_listed(&self) -> bool {
        self.listed.get()
    }

    /// Swallows listing failures (logged) instead of returning them.
    pub fn with_quiet_fetch_errors(mut self, quiet: bool) -> Self {
        self.quiet_fetch_errors = quiet;
        self
    }

    /// View preset this controller serves.
    pub fn view(&self) -> DriveView {
        self.view
    }

    /// Shared overlay store.
    pub fn overlay(&self) -> &OverlayStore {
        &self.overlay
    }

    /// Runs `f` against the working set.
    pub fn with_workspace<R>(&self, f: impl FnOnce(&DriveWorkspace) -> R) -> R {
        f(&self.workspace.borrow())
    }

    /// Ends the view lifetime; responses still in flight will not touch the working set.
    pub fn detach(&self) {
        self.view_lifetime.invalidate();
        self.navigation_lifetime.invalidate();
    }

    fn listing_guard(&self) -> ListingGuard {
        ListingGuard {
            view: self.view_lifetime.ticket(),
            navigation: self.navigation_lifetime.ticket(),
        }
    }

    fn listing_failed(&self, err: DriveError) -> Result<(), DriveError> {
        if self.quiet_fetch_errors {
            logging::warn!("drive listing failed: {err}");
            Ok(())
        } else {
            Err(err)
        }
    }

    /// Fetches every folder and file.
    ///
    /// The lifetime is captured when this is called, so a [`DriveController::detach`] before
    /// the returned future resolves discards the listing.
    ///
    /// # Errors
    ///
    /// Returns the listing failure unless fetch errors are quiet.
    pub fn load(&self) -> impl Future<Output = Result<(), DriveError>> + '_ {
        let guard = self.listing_guard();
        async move {
            let api = self.services.api.clone();
            let fetched = try_join(api.list_folders(), api.list_files(None)).await;
            if !guard.is_current() {
                logging::warn!("dropping stale drive listing for {}", self.view.title());
                return Ok(());
            }
            match fetched {
                Ok((folders, files)) => {
                    {
                        let mut workspace = self.workspace.borrow_mut();
                        workspace.replace_folders(folders);
                        workspace.replace_files(files);
                    }
                    self.listed.set(true);
                    self.notify_changed();
                    Ok(())
                }
                Err(err) => self.listing_failed(err),
            }
        }
    }

    /// Enters a folder (or root) and refreshes its files.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::NotFound`] for an unknown folder, or the listing failure unless
    /// fetch errors are quiet.
    pub async fn enter_folder(&self, folder_id: Option<&str>) -> Result<(), DriveError> {
        self.navigation_lifetime.invalidate();
        self.workspace.borrow_mut().enter_folder(folder_id)?;
        let Some(folder_id) = folder_id.and_then(normalize_id_str) else {
            return Ok(());
        };

        let guard = self.listing_guard();
        let api = self.services.api.clone();
        let fetched = api.list_files(Some(folder_id.as_str())).await;
        if !guard.is_current() {
            logging::warn!("dropping stale file listing for folder {folder_id}");
            return Ok(());
        }
        match fetched {
            Ok(files) => {
                self.workspace
                    .borrow_mut()
                    .merge_folder_files(Some(folder_id.as_str()), files);
                self.notify_changed();
                Ok(())
            }
            Err(err) => self.listing_failed(err),
        }
    }

    /// Current folder, if any.
    pub fn current_folder(&self) -> Option<FolderRecord> {
        self.workspace.borrow().navigation().current().cloned()
    }

    /// Root-to-current breadcrumb chain.
    pub fn breadcrumbs(&self) -> Vec<FolderRecord> {
        self.workspace.borrow().breadcrumbs()
    }

    /// Reconciled items in the view's default order.
    pub fn items(&self, query: Option<&str>) -> Vec<DriveItem> {
        self.items_ordered(self.view.order(), query)
    }

    /// Reconciled items in an explicit order.
    pub fn items_ordered(&self, order: ItemOrder, query: Option<&str>) -> Vec<DriveItem> {
        self.reconciled(self.view.mode(), order, query)
    }

    fn reconciled(&self, mode: ViewMode, order: ItemOrder, query: Option<&str>) -> Vec<DriveItem> {
        let overlay = self.overlay.snapshot();
        self.workspace
            .borrow()
            .items(&overlay, mode, order, query, unix_time_ms_now())
    }

    /// Creates a folder under `parent_id` (root for `None`).
    ///
    /// Nothing is inserted before the server confirms. Folders created from the Starred view are
    /// starred.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`] for a blank name, or the remote failure.
    pub async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<FolderRecord, DriveError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DriveError::Validation("Folder name is required.".to_string()));
        }
        let request = CreateFolderRequest {
            name: name.to_string(),
            parent_folder_id: parent_id.and_then(normalize_id_str),
        };

        let ticket = self.view_lifetime.ticket();
        let api = self.services.api.clone();
        let folder = api.create_folder(&request).await?;
        if self.view.stars_new_folders() {
            self.overlay.starred.add(&folder.id);
        }
        if ticket.is_current() {
            self.workspace.borrow_mut().insert_folder(folder.clone());
        }
        Ok(folder)
    }

    fn next_upload_id(&self) -> String {
        let next = self.upload_counter.get() + 1;
        self.upload_counter.set(next);
        format!("upload-{next}")
    }

    /// Uploads one file: upload slot, byte transfer, metadata create.
    ///
    /// A placeholder is visible for the whole sequence and removed whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`] for a nameless file, [`DriveError::Auth`] without an
    /// acting user, [`DriveError::Transfer`] when storage rejects the bytes, or the remote
    /// failure.
    pub async fn upload_file(
        &self,
        file: &LocalFile,
        folder_id: Option<&str>,
    ) -> Result<FileRecord, DriveError> {
        if file.name.trim().is_empty() {
            return Err(DriveError::Validation("File name is required.".to_string()));
        }
        let folder_id = folder_id.and_then(normalize_id_str);
        let temp_id = self.next_upload_id();
        let ticket = self.view_lifetime.ticket();
        self.workspace.borrow_mut().begin_upload(PendingUpload {
            temp_id: temp_id.clone(),
            name: file.name.clone(),
            folder_id: folder_id.clone(),
            size_bytes: file.size(),
            mime_type: file.effective_mime_type().to_string(),
        });
        self.notify_changed();

        let result = self.transfer_upload(file, folder_id).await;

        {
            let mut workspace = self.workspace.borrow_mut();
            workspace.finish_upload(&temp_id);
            if let (Ok(record), true) = (&result, ticket.is_current()) {
                workspace.upsert_file(record.clone());
            }
        }
        self.notify_changed();
        if let Err(err) = &result {
            logging::error!("upload of {} failed: {err}", file.name);
        }
        result
    }

    async fn transfer_upload(
        &self,
        file: &LocalFile,
        folder_id: Option<String>,
    ) -> Result<FileRecord, DriveError> {
        let owner_id = self.services.identity.acting_user_id()?;
        let mime_type = file.effective_mime_type().to_string();
        let api = self.services.api.clone();
        let transfer = self.services.transfer.clone();

        let slot = api
            .request_upload_slot(&UploadSlotRequest {
                file_name: file.name.clone(),
                file_type: mime_type.clone(),
                folder_id: folder_id.clone(),
                owner_id,
            })
            .await?;
        transfer
            .put_object(&slot.upload_url, &mime_type, &file.bytes)
            .await?;
        let path = folder_id.is_none().then(|| "root".to_string());
        api.create_file(&CreateFileRequest {
            file_name: file.name.clone(),
            file_size: file.size(),
            mime_type,
            s3_key: slot.file_key,
            folder_id,
            path,
        })
        .await
    }

    /// Uploads files one after another; one failure does not stop the rest.
    pub async fn upload_files(&self, files: &[LocalFile], folder_id: Option<&str>) -> BatchReport {
        let mut report = BatchReport::default();
        for file in files {
            match self.upload_file(file, folder_id).await {
                Ok(_) => report.record_success(file.name.clone()),
                Err(err) => report.record_failure(file.name.clone(), err),
            }
        }
        report
    }

    /// Reads and uploads sources one after another, so each placeholder appears as soon as its
    /// bytes are in hand. A source that cannot be read is recorded as failed and skipped.
    pub async fn upload_sources<S, Fut>(
        &self,
        sources: &[S],
        folder_id: Option<&str>,
        name_of: impl Fn(&S) -> String,
        read: impl Fn(&S) -> Fut,
    ) -> BatchReport
    where
        Fut: Future<Output = Result<LocalFile, DriveError>>,
    {
        let mut report = BatchReport::default();
        for source in sources {
            let name = name_of(source);
            let outcome = match read(source).await {
                Ok(file) => self.upload_file(&file, folder_id).await.map(|_| ()),
                Err(err) => {
                    logging::warn!("could not read {name} for upload: {err}");
                    Err(err)
                }
            };
            match outcome {
                Ok(()) => report.record_success(name),
                Err(err) => report.record_failure(name, err),
            }
        }
        report
    }

    /// Renames a folder or file and swaps in the server's representation.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`] for a blank name and [`DriveError::NotFound`] when the
    /// item is gone locally, both without a remote call; otherwise the remote failure.
    pub async fn rename_item(
        &self,
        kind: ItemKind,
        id: &str,
        new_name: &str,
    ) -> Result<(), DriveError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(DriveError::Validation("Name cannot be empty.".to_string()));
        }
        let id = normalize_id_str(id).ok_or_else(|| DriveError::not_found(id))?;
        let known = {
            let workspace = self.workspace.borrow();
            match kind {
                ItemKind::Folder => workspace.find_folder(&id).is_some(),
                ItemKind::File => workspace.find_file(&id).is_some(),
            }
        };
        if !known {
            return Err(DriveError::not_found(id));
        }

        let request = RenameRequest::for_kind(kind, new_name);
        let ticket = self.view_lifetime.ticket();
        let api = self.services.api.clone();
        match kind {
            ItemKind::Folder => {
                let mut folder = api.rename_folder(&id, &request).await?;
                folder.modified_at_ms = folder.modified_at_ms.or(Some(unix_time_ms_now()));
                if ticket.is_current() {
                    self.workspace.borrow_mut().replace_folder(folder);
                }
            }
            ItemKind::File => {
                let mut file = api.rename_file(&id, &request).await?;
                file.modified_at_ms = file.modified_at_ms.or(Some(unix_time_ms_now()));
                if ticket.is_current() {
                    self.workspace.borrow_mut().replace_file(file);
                }
            }
        }
        Ok(())
    }

    /// Flips starred membership and returns the new state.
    pub fn toggle_star(&self, id: &str) -> bool {
        self.overlay.starred.toggle(id)
    }

    /// Moves an item to Trash. Local only.
    pub fn trash_item(&self, id: &str) {
        self.overlay.trashed.add(id);
    }

    /// Restores an item from Trash. Local only; restoring an untrashed id is a no-op.
    pub fn restore_item(&self, id: &str) {
        self.overlay.trashed.remove(id);
    }

    /// Restores several items.
    pub fn restore_items(&self, ids: &[String]) -> BatchReport {
        let mut report = BatchReport::default();
        for raw in ids {
            match normalize_id_str(raw) {
                Some(id) => {
                    self.overlay.trashed.remove(&id);
                    report.record_success(id);
                }
                None => report.record_failure(
                    raw.clone(),
                    DriveError::Validation("Missing item id.".to_string()),
                ),
            }
        }
        report
    }

    /// Permanently deletes an item and forgets its overlay membership.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`] for a blank id, or the remote failure.
    pub async fn delete_item(&self, kind: ItemKind, id: &str) -> Result<(), DriveError> {
        let id = normalize_id_str(id)
            .ok_or_else(|| DriveError::Validation("Missing item id.".to_string()))?;
        let ticket = self.view_lifetime.ticket();
        let api = self.services.api.clone();
        match kind {
            ItemKind::Folder => api.delete_folder(&id).await?,
            ItemKind::File => api.delete_file(&id).await?,
        }
        self.overlay.forget(&id);
        if ticket.is_current() {
            self.workspace.borrow_mut().remove_item(kind, &id);
        }
        Ok(())
    }

    /// Permanently deletes several locally known items, best-effort, one at a time.
    pub async fn delete_items(&self, ids: &[String]) -> BatchReport {
        let mut report = BatchReport::default();
        for raw in ids {
            let kind = self.workspace.borrow().kind_of(raw);
            let result = match kind {
                Some(kind) => self.delete_item(kind, raw).await,
                None => Err(DriveError::not_found(raw.trim())),
            };
            let id = normalize_id_str(raw).unwrap_or_else(|| raw.clone());
            match result {
                Ok(()) => report.record_success(id),
                Err(err) => report.record_failure(id, err),
            }
        }
        report
    }

    /// Permanently deletes everything in Trash, one item at a time.
    ///
    /// Deleted ids leave the trashed set as they go and failed ids stay trashed. When every
    /// deletion succeeded, trashed ids the listing no longer knows are dropped too.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`], touching nothing, until a listing has been applied.
    pub async fn empty_trash(&self) -> Result<BatchReport, DriveError> {
        if !self.is_listed() {
            return Err(DriveError::Validation(
                "Trash is still loading. Try again in a moment.".to_string(),
            ));
        }
        let targets: Vec<(ItemKind, String)> = self
            .reconciled(ViewMode::TrashedOnly, ItemOrder::Auto, None)
            .into_iter()
            .map(|item| (item.kind, item.id))
            .collect();

        let mut report = BatchReport::default();
        for (kind, id) in targets {
            match self.delete_item(kind, &id).await {
                Ok(()) => report.record_success(id),
                Err(err) => {
                    logging::warn!("empty trash: delete of {id} failed: {err}");
                    report.record_failure(id, err);
                }
            }
        }
        if report.failed.is_empty() {
            let stale: Vec<String> = {
                let workspace = self.workspace.borrow();
                self.overlay
                    .trashed
                    .list_all()
                    .into_iter()
                    .filter(|id| workspace.kind_of(id).is_none())
                    .collect()
            };
            for id in stale {
                self.overlay.trashed.remove(&id);
            }
        }
        Ok(report)
    }

    /// Fetches a file through its pre-signed URL and hands it to the browser.
    ///
    /// # Errors
    ///
    /// Returns the remote, transfer, or save failure.
    pub async fn download_file(&self, id: &str) -> Result<(), DriveError> {
        let id = normalize_id_str(id).ok_or_else(|| DriveError::not_found(id))?;
        let local_name = self
            .workspace
            .borrow()
            .find_file(&id)
            .map(|file| file.name.clone());
        let api = self.services.api.clone();
        let transfer = self.services.transfer.clone();

        let ticket = api.request_download_url(&id).await?;
        let bytes = transfer.get_object(&ticket.download_url).await?;
        let file_name = ticket
            .file_name
            .filter(|name| !name.trim().is_empty())
            .or(local_name)
            .unwrap_or_else(|| FALLBACK_DOWNLOAD_NAME.to_string());
        self.services
            .downloads
            .save_bytes(&file_name, DOWNLOAD_MIME_TYPE, &bytes)
    }

    /// Downloads a folder as `<name>.zip`.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::NotFound`] for an unknown folder, or the remote or save failure.
    pub async fn download_folder(&self, id: &str) -> Result<(), DriveError> {
        let (id, name) = {
            let workspace = self.workspace.borrow();
            let folder = workspace
                .find_folder(id)
                .ok_or_else(|| DriveError::not_found(id))?;
            (folder.id.clone(), folder.name.clone())
        };
        let api = self.services.api.clone();
        let archive = api.download_folder_archive(&id).await?;
        self.services
            .downloads
            .save_bytes(&format!("{name}.zip"), ARCHIVE_MIME_TYPE, &archive)
    }

    /// Pre-signed link to a file.
    ///
    /// # Errors
    ///
    /// Returns the remote failure.
    pub async fn file_link(&self, id: &str) -> Result<String, DriveError> {
        let id = normalize_id_str(id).ok_or_else(|| DriveError::not_found(id))?;
        let api = self.services.api.clone();
        Ok(api.request_download_url(&id).await?.download_url)
    }
}
