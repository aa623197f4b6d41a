use std::rc::Rc;

use drive_host::{
    DriveError, FileRecord, FolderRecord, IdentityProvider, ItemKind, LocalFile,
    MemoryAuthSession, MemoryDownloadSink, MemoryDriveApi, MemoryObjectTransfer,
    MemoryPrefsStore, SessionIdentity,
};
use drive_runtime::{
    BatchOutcome, DriveController, DriveServices, DriveView, OverlayStore, TRASHED_IDS_KEY,
};
use futures::executor::block_on;
use pretty_assertions::assert_eq;

struct Fixture {
    api: MemoryDriveApi,
    transfer: MemoryObjectTransfer,
    prefs: MemoryPrefsStore,
    identity: Rc<dyn IdentityProvider>,
}

impl Fixture {
    fn new(api: MemoryDriveApi) -> Self {
        // Payload {"id":"user-1"}.
        let token = "eyJhbGciOiJIUzI1NiJ9.eyJpZCI6InVzZXItMSJ9.sig";
        Self {
            api,
            transfer: MemoryObjectTransfer::default(),
            prefs: MemoryPrefsStore::default(),
            identity: Rc::new(SessionIdentity::new(Rc::new(MemoryAuthSession::signed_in(
                token,
            )))),
        }
    }

    fn controller(&self, view: DriveView) -> DriveController {
        let services = DriveServices {
            api: Rc::new(self.api.clone()),
            transfer: Rc::new(self.transfer.clone()),
            downloads: Rc::new(MemoryDownloadSink::default()),
            identity: self.identity.clone(),
        };
        DriveController::new(view, services, OverlayStore::new(Rc::new(self.prefs.clone())))
    }

    fn open(&self, view: DriveView) -> DriveController {
        let controller = self.controller(view);
        block_on(controller.load()).expect("load");
        controller
    }
}

fn folder(id: &str, parent: Option<&str>, created: i64) -> FolderRecord {
    FolderRecord {
        id: id.to_string(),
        name: format!("Folder {id}"),
        parent_id: parent.map(str::to_string),
        created_at_ms: Some(created),
        modified_at_ms: Some(created),
    }
}

fn file(id: &str, folder: Option<&str>, created: i64) -> FileRecord {
    FileRecord {
        id: id.to_string(),
        name: format!("{id}.pdf"),
        folder_id: folder.map(str::to_string),
        size_bytes: Some(1024),
        mime_type: Some("application/pdf".to_string()),
        storage_key: Some(format!("user-1/{id}")),
        created_at_ms: Some(created),
        modified_at_ms: Some(created),
    }
}

fn visible_ids(controller: &DriveController) -> Vec<String> {
    controller
        .items(None)
        .into_iter()
        .map(|item| item.id)
        .collect()
}

#[test]
fn folder_view_lists_only_direct_children() {
    let fixture = Fixture::new(
        MemoryDriveApi::default().with_folders(vec![folder("f1", None, 1), folder("f2", Some("f1"), 2)]),
    );
    let drive = fixture.open(DriveView::MyDrive);
    block_on(drive.enter_folder(Some("f1"))).unwrap();
    assert_eq!(visible_ids(&drive), vec!["f2".to_string()]);
}

#[test]
fn starred_then_trashed_file_only_shows_in_trash() {
    let fixture = Fixture::new(MemoryDriveApi::default().with_files(vec![file("x1", None, 1)]));
    let home = fixture.open(DriveView::Home);
    assert!(home.toggle_star("x1"));
    home.trash_item("x1");

    for view in [DriveView::Home, DriveView::MyDrive, DriveView::Starred] {
        assert!(visible_ids(&fixture.open(view)).is_empty(), "{view:?}");
    }
    assert_eq!(visible_ids(&fixture.open(DriveView::Trash)), vec!["x1".to_string()]);
}

#[test]
fn empty_trash_keeps_failed_deletions_trashed() {
    let fixture = Fixture::new(MemoryDriveApi::default().with_files(vec![
        file("a", None, 3),
        file("b", None, 2),
        file("c", None, 1),
    ]));
    let trash = fixture.open(DriveView::Trash);
    for id in ["a", "b", "c"] {
        trash.trash_item(id);
    }
    fixture.api.fail_on("b");

    let report = block_on(trash.empty_trash()).expect("listed");
    assert_eq!(report.outcome(), BatchOutcome::Partial);
    assert_eq!(report.succeeded, vec!["a".to_string(), "c".to_string()]);
    assert_eq!(report.failed_ids(), vec!["b"]);

    let trashed = trash.overlay().trashed.list_all();
    assert_eq!(trashed.into_iter().collect::<Vec<_>>(), vec!["b".to_string()]);
    assert_eq!(visible_ids(&trash), vec!["b".to_string()]);
    assert_eq!(fixture.api.files().len(), 1);
}

#[test]
fn empty_trash_clears_overlay_on_full_success() {
    let fixture = Fixture::new(MemoryDriveApi::default().with_files(vec![file("a", None, 1)]));
    let trash = fixture.open(DriveView::Trash);
    trash.trash_item("a");
    trash.trash_item("long-gone");

    let report = block_on(trash.empty_trash()).expect("listed");
    assert_eq!(report.outcome(), BatchOutcome::Succeeded);
    assert_eq!(fixture.prefs.raw(TRASHED_IDS_KEY).as_deref(), Some("[]"));
}

#[test]
fn empty_trash_refuses_to_run_before_a_listing_lands() {
    let fixture = Fixture::new(MemoryDriveApi::default().with_files(vec![
        file("x1", None, 2),
        file("x2", None, 1),
    ]));
    let home = fixture.open(DriveView::Home);
    home.trash_item("x1");
    home.trash_item("x2");

    fixture.api.fail_listing(true);
    let trash = fixture.controller(DriveView::Trash);
    assert!(block_on(trash.load()).is_err());
    assert!(!trash.is_listed());
    assert!(matches!(
        block_on(trash.empty_trash()),
        Err(DriveError::Validation(_))
    ));

    assert_eq!(fixture.api.files().len(), 2);
    let trashed: Vec<String> = trash.overlay().trashed.list_all().into_iter().collect();
    assert_eq!(trashed, vec!["x1".to_string(), "x2".to_string()]);
    fixture.api.fail_listing(false);
    assert!(visible_ids(&fixture.open(DriveView::Home)).is_empty());
}

#[test]
fn failed_transfer_leaves_no_placeholder_and_no_record() {
    let fixture = Fixture::new(MemoryDriveApi::default());
    fixture.transfer.fail_puts(500, "Internal Error");
    let drive = fixture.open(DriveView::MyDrive);

    let upload = LocalFile {
        name: "big.bin".to_string(),
        mime_type: "application/octet-stream".to_string(),
        bytes: vec![0; 10 * 1024 * 1024],
    };
    let err = block_on(drive.upload_file(&upload, None)).unwrap_err();
    assert_eq!(
        err,
        DriveError::Transfer {
            status: 500,
            body: "Internal Error".to_string()
        }
    );
    drive.with_workspace(|workspace| assert!(workspace.pending().is_empty()));
    assert!(visible_ids(&drive).is_empty());
    assert!(fixture.api.files().is_empty());
}

#[test]
fn upload_without_identity_is_an_auth_error() {
    let mut fixture = Fixture::new(MemoryDriveApi::default());
    fixture.identity = Rc::new(SessionIdentity::new(Rc::new(MemoryAuthSession::default())));
    let drive = fixture.open(DriveView::MyDrive);
    let upload = LocalFile {
        name: "a.txt".to_string(),
        mime_type: "text/plain".to_string(),
        bytes: b"a".to_vec(),
    };
    assert!(matches!(
        block_on(drive.upload_file(&upload, None)),
        Err(DriveError::Auth(_))
    ));
    drive.with_workspace(|workspace| assert!(workspace.pending().is_empty()));
}

#[test]
fn restoring_an_untrashed_id_is_a_no_op() {
    let fixture = Fixture::new(MemoryDriveApi::default().with_files(vec![file("x1", None, 1)]));
    let trash = fixture.open(DriveView::Trash);
    trash.restore_item("x1");
    assert!(!trash.overlay().trashed.contains("x1"));
    assert_eq!(fixture.prefs.raw(TRASHED_IDS_KEY), None);
    assert_eq!(visible_ids(&fixture.open(DriveView::Home)), vec!["x1".to_string()]);
}

#[test]
fn restore_items_returns_everything_to_its_folder() {
    let fixture = Fixture::new(
        MemoryDriveApi::default()
            .with_folders(vec![folder("f1", None, 1)])
            .with_files(vec![file("x1", Some("f1"), 2)]),
    );
    let trash = fixture.open(DriveView::Trash);
    trash.trash_item("f1");
    trash.trash_item("x1");
    assert_eq!(visible_ids(&trash), vec!["x1".to_string(), "f1".to_string()]);

    let report = trash.restore_items(&["x1".to_string(), "f1".to_string()]);
    assert_eq!(report.outcome(), BatchOutcome::Succeeded);
    assert!(visible_ids(&trash).is_empty());

    let drive = fixture.open(DriveView::MyDrive);
    block_on(drive.enter_folder(Some("f1"))).unwrap();
    assert_eq!(visible_ids(&drive), vec!["x1".to_string()]);
}

#[test]
fn starred_items_appear_exactly_once() {
    let fixture = Fixture::new(
        MemoryDriveApi::default()
            .with_folders(vec![folder("f1", None, 1), folder("f2", Some("f1"), 2)])
            .with_files(vec![file("x1", Some("f2"), 3), file("x2", None, 4)]),
    );
    let home = fixture.open(DriveView::Home);
    for id in ["f2", "x1", "x2"] {
        home.toggle_star(id);
    }
    home.trash_item("x2");

    let mut starred = visible_ids(&fixture.open(DriveView::Starred));
    starred.sort();
    assert_eq!(starred, vec!["f2".to_string(), "x1".to_string()]);
}

#[test]
fn toggle_twice_restores_membership() {
    let fixture = Fixture::new(MemoryDriveApi::default());
    let drive = fixture.open(DriveView::Home);
    let initial = drive.overlay().starred.contains("x1");
    drive.toggle_star("x1");
    drive.toggle_star("x1");
    assert_eq!(drive.overlay().starred.contains("x1"), initial);
}

#[test]
fn deleted_items_vanish_from_every_view() {
    let fixture = Fixture::new(MemoryDriveApi::default().with_files(vec![file("x1", None, 1)]));
    let home = fixture.open(DriveView::Home);
    home.toggle_star("x1");
    block_on(home.delete_item(ItemKind::File, "x1")).unwrap();

    for view in DriveView::ALL {
        assert!(visible_ids(&fixture.open(view)).is_empty(), "{view:?}");
    }
}
