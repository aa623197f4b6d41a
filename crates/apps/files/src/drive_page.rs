//! The drive page shared by Home, My Drive, Starred, and Trash.

use std::future::Future;

use drive_host::{DriveError, ItemKind};
use drive_host_web::read_browser_file;
use drive_runtime::{
    date_label, file_glyph, format_file_size, BatchOutcome, BatchReport, DriveController,
    DriveItem, DriveView, ItemOrder,
};
use leptos::*;
use leptos_router::{use_navigate, NavigateOptions, A};
use web_sys::HtmlInputElement;

use crate::context::use_drive_context;

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusLine {
    text: String,
    error: bool,
}

impl StatusLine {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: false,
        }
    }

    fn from_batch(report: &BatchReport, verb: &str) -> Self {
        let mut text = report.summary(verb);
        if !report.failed.is_empty() {
            text.push_str(&format!(" Failed: {}.", report.failed_ids().join(", ")));
        }
        Self {
            text,
            error: report.outcome() != BatchOutcome::Succeeded,
        }
    }
}

fn bump(revision: RwSignal<u64>) {
    // The page may already be gone when a task finishes.
    let _ = revision.try_update(|revision| *revision += 1);
}

#[derive(Clone, Copy)]
struct PageState {
    view: DriveView,
    controller: StoredValue<DriveController>,
    revision: RwSignal<u64>,
    status: RwSignal<Option<StatusLine>>,
    renaming: RwSignal<Option<String>>,
    rename_text: RwSignal<String>,
}

impl PageState {
    fn refresh(self) {
        bump(self.revision);
    }

    fn show(self, line: StatusLine) {
        if line.error {
            logging::warn!("{}: {}", self.view.title(), line.text);
        }
        let _ = self.status.try_set(Some(line));
    }

    fn fail(self, err: &DriveError) {
        logging::error!("{} action failed: {err}", self.view.title());
        let _ = self.status.try_set(Some(StatusLine {
            text: err.user_message(),
            error: true,
        }));
    }

    fn current_folder_id(self) -> Option<String> {
        self.controller
            .with_value(|controller| controller.current_folder().map(|folder| folder.id))
    }

    /// Runs an async controller operation, then shows its outcome and re-renders.
    fn run<F, Fut>(self, op: F)
    where
        F: FnOnce(DriveController) -> Fut + 'static,
        Fut: Future<Output = Result<Option<StatusLine>, DriveError>> + 'static,
    {
        let controller = self.controller.get_value();
        spawn_local(async move {
            match op(controller).await {
                Ok(Some(line)) => self.show(line),
                Ok(None) => {}
                Err(err) => self.fail(&err),
            }
            self.refresh();
        });
    }

    fn local(self, op: impl FnOnce(&DriveController), message: &str) {
        self.controller.with_value(op);
        self.show(StatusLine::info(message));
        self.refresh();
    }
}

#[component]
/// Sidebar with one link per drive view and a sign-out action.
pub fn DriveNav() -> impl IntoView {
    let context = use_drive_context();
    let navigate = use_navigate();
    let sign_out = move |_| {
        context.auth.sign_out();
        context.signed_in.set(false);
        navigate("/login", NavigateOptions::default());
    };

    view! {
        <nav class="drive-nav" aria-label="Drive sections">
            <div class="drive-brand">"CloudDrive"</div>
            <ul class="drive-nav-list">
                {DriveView::ALL
                    .into_iter()
                    .map(|view| view! { <li><A href=view.route()>{view.title()}</A></li> })
                    .collect_view()}
            </ul>
            <button type="button" class="drive-sign-out" on:click=sign_out>"Sign out"</button>
        </nav>
    }
}

#[component]
/// One drive screen: toolbar, breadcrumbs, item list, and status line.
pub fn DrivePage(view: DriveView) -> impl IntoView {
    let context = use_drive_context();
    let revision = create_rw_signal(0);
    let controller = DriveController::new(view, context.services.clone(), context.overlay.clone())
        .with_quiet_fetch_errors(context.quiet_fetch_errors)
        .with_change_hook(move || bump(revision));
    let unmount = controller.clone();
    on_cleanup(move || unmount.detach());

    let state = PageState {
        view,
        controller: store_value(controller),
        revision,
        status: create_rw_signal(None),
        renaming: create_rw_signal(None),
        rename_text: create_rw_signal(String::new()),
    };
    let query = create_rw_signal(String::new());
    let order = create_rw_signal(view.order());
    let new_folder_name = create_rw_signal(String::new());

    state.run(|controller| async move { controller.load().await.map(|()| None) });

    let items = move || {
        state.revision.get();
        let query = query.get();
        let order = order.get();
        state
            .controller
            .with_value(|controller| controller.items_ordered(order, Some(query.as_str())))
    };
    let crumbs = move || {
        state.revision.get();
        state.controller.with_value(DriveController::breadcrumbs)
    };

    let enter = move |folder_id: Option<String>| {
        state.run(move |controller| async move {
            controller.enter_folder(folder_id.as_deref()).await.map(|()| None)
        });
    };

    let create_folder = move |_| {
        let name = new_folder_name.get_untracked();
        let parent = state.current_folder_id();
        new_folder_name.set(String::new());
        state.run(move |controller| async move {
            let folder = controller.create_folder(&name, parent.as_deref()).await?;
            Ok::<_, DriveError>(Some(StatusLine::info(format!("Created folder {}.", folder.name))))
        });
    };

    let upload = move |ev: ev::Event| {
        let input: HtmlInputElement = event_target(&ev);
        let picked: Vec<web_sys::File> = input
            .files()
            .map(|list| (0..list.length()).filter_map(|index| list.get(index)).collect())
            .unwrap_or_default();
        input.set_value("");
        if picked.is_empty() {
            return;
        }
        let folder_id = state.current_folder_id();
        state.show(StatusLine::info(format!("Uploading {} file(s)...", picked.len())));
        state.run(move |controller| async move {
            let report = controller
                .upload_sources(&picked, folder_id.as_deref(), web_sys::File::name, |file| {
                    let file = file.clone();
                    async move { read_browser_file(&file).await }
                })
                .await;
            Ok::<_, DriveError>(Some(StatusLine::from_batch(&report, "Uploaded")))
        });
    };

    let restore_all = move |_| {
        let ids: Vec<String> = state
            .controller
            .with_value(|controller| controller.items(None))
            .into_iter()
            .map(|item| item.id)
            .collect();
        let report = state.controller.with_value(|controller| controller.restore_items(&ids));
        state.show(StatusLine::from_batch(&report, "Restored"));
        state.refresh();
    };

    let empty_trash = move |_| {
        if !window()
            .confirm_with_message("Permanently delete everything in Trash?")
            .unwrap_or(false)
        {
            return;
        }
        state.run(|controller| async move {
            let report = controller.empty_trash().await?;
            Ok::<_, DriveError>(Some(StatusLine::from_batch(&report, "Deleted")))
        });
    };

    let set_order = move |ev: ev::Event| {
        order.set(match event_target_value(&ev).as_str() {
            "recent" => ItemOrder::Recent,
            "name" => ItemOrder::Name,
            _ => ItemOrder::Auto,
        });
    };

    view! {
        <section class="drive-page">
            <header class="drive-toolbar">
                <h1>{view.title()}</h1>
                <input
                    type="search"
                    class="drive-search"
                    placeholder="Search"
                    prop:value=move || query.get()
                    on:input=move |ev| query.set(event_target_value(&ev))
                />
                <select class="drive-order" on:change=set_order>
                    <option value="auto" selected={view.order() == ItemOrder::Auto}>"Default order"</option>
                    <option value="recent" selected={view.order() == ItemOrder::Recent}>"Most recent"</option>
                    <option value="name">"Name"</option>
                </select>
                <Show when=move || view.allows_upload() fallback=|| ()>
                    <input
                        type="text"
                        class="drive-new-folder"
                        placeholder="New folder"
                        prop:value=move || new_folder_name.get()
                        on:input=move |ev| new_folder_name.set(event_target_value(&ev))
                    />
                    <button type="button" on:click=create_folder>"Create folder"</button>
                    <label class="drive-upload">
                        "Upload"
                        <input type="file" multiple=true on:change=upload />
                    </label>
                </Show>
                <Show when=move || view == DriveView::Trash fallback=|| ()>
                    <button type="button" on:click=restore_all>"Restore all"</button>
                    <button type="button" class="danger" on:click=empty_trash>"Empty trash"</button>
                </Show>
            </header>

            <Show when=move || view.browses_folders() fallback=|| ()>
                <nav class="drive-breadcrumbs" aria-label="Folder path">
                    <button type="button" on:click=move |_| enter(None)>{view.title()}</button>
                    {move || {
                        crumbs()
                            .into_iter()
                            .map(|folder| {
                                let id = folder.id.clone();
                                view! {
                                    <span class="crumb-sep">"/"</span>
                                    <button type="button" on:click=move |_| enter(Some(id.clone()))>
                                        {folder.name}
                                    </button>
                                }
                            })
                            .collect_view()
                    }}
                </nav>
            </Show>

            <table class="drive-list" role="grid">
                <thead>
                    <tr>
                        <th>"Name"</th>
                        <th>"Size"</th>
                        <th>{if view == DriveView::Trash { "Trashed item date" } else { "Modified" }}</th>
                        <th>"Actions"</th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=items
                        key=|item| {
                            (
                                item.kind,
                                item.id.clone(),
                                item.name.clone(),
                                item.starred,
                                item.pending,
                                item.modified_at_ms,
                            )
                        }
                        let:item
                    >
                        <DriveRow item=item state=state enter=enter />
                    </For>
                </tbody>
            </table>

            <footer class="drive-statusbar">
                <span>{move || format!("{} item(s)", items().len())}</span>
                {move || {
                    state.status.get().map(|line| {
                        let class = if line.error { "drive-status error" } else { "drive-status" };
                        view! { <span class=class>{line.text}</span> }
                    })
                }}
            </footer>
        </section>
    }
}

#[component]
fn DriveRow(
    item: DriveItem,
    state: PageState,
    enter: impl Fn(Option<String>) + Copy + 'static,
) -> impl IntoView {
    let view = state.view;
    let kind = item.kind;
    let id = item.id.clone();
    let glyph = file_glyph(kind, &item.name).token();
    let size = match kind {
        ItemKind::Folder => "-".to_string(),
        ItemKind::File => format_file_size(item.size_bytes),
    };
    let date = if view == DriveView::Trash {
        date_label(item.created_at_ms)
    } else {
        date_label(item.modified_at_ms.or(item.created_at_ms))
    };

    let editing = {
        let id = id.clone();
        move || state.renaming.get().as_deref() == Some(id.as_str())
    };

    let name_cell = {
        let id = id.clone();
        let name = item.name.clone();
        let opens = kind == ItemKind::Folder && view.browses_folders() && !item.pending;
        move || {
            if editing() {
                let id = id.clone();
                let save = move |_| {
                    let id = id.clone();
                    let new_name = state.rename_text.get_untracked();
                    state.renaming.set(None);
                    state.run(move |controller| async move {
                        controller.rename_item(kind, &id, &new_name).await?;
                        Ok::<_, DriveError>(Some(StatusLine::info("Renamed.")))
                    });
                };
                view! {
                    <input
                        type="text"
                        prop:value=move || state.rename_text.get()
                        on:input=move |ev| state.rename_text.set(event_target_value(&ev))
                    />
                    <button type="button" on:click=save>"Save"</button>
                    <button type="button" on:click=move |_| state.renaming.set(None)>"Cancel"</button>
                }
                .into_view()
            } else if opens {
                let id = id.clone();
                view! {
                    <button type="button" class="drive-open" on:click=move |_| enter(Some(id.clone()))>
                        {name.clone()}
                    </button>
                }
                .into_view()
            } else {
                view! { <span>{name.clone()}</span> }.into_view()
            }
        }
    };

    let actions = if item.pending {
        view! { <span class="drive-pending">"Uploading..."</span> }.into_view()
    } else if view == DriveView::Trash {
        let restore_id = id.clone();
        let delete_id = id.clone();
        view! {
            <button type="button" on:click=move |_| {
                let id = restore_id.clone();
                state.local(move |controller| controller.restore_item(&id), "Restored.");
            }>"Restore"</button>
            <button type="button" class="danger" on:click=move |_| {
                if !window().confirm_with_message("Delete forever?").unwrap_or(false) {
                    return;
                }
                let id = delete_id.clone();
                state.run(move |controller| async move {
                    controller.delete_item(kind, &id).await?;
                    Ok::<_, DriveError>(Some(StatusLine::info("Deleted forever.")))
                });
            }>"Delete forever"</button>
        }
        .into_view()
    } else {
        let star_id = id.clone();
        let download_id = id.clone();
        let trash_id = id.clone();
        let name = item.name.clone();
        let star_label = if item.starred { "Unstar" } else { "Star" };
        view! {
            <button type="button" on:click=move |_| {
                let id = star_id.clone();
                state.local(move |controller| { controller.toggle_star(&id); }, "Updated star.");
            }>{star_label}</button>
            <button type="button" on:click=move |_| {
                state.rename_text.set(name.clone());
                state.renaming.set(Some(id.clone()));
            }>"Rename"</button>
            <button type="button" on:click=move |_| {
                let id = download_id.clone();
                state.run(move |controller| async move {
                    match kind {
                        ItemKind::Folder => controller.download_folder(&id).await?,
                        ItemKind::File => controller.download_file(&id).await?,
                    }
                    Ok::<_, DriveError>(None)
                });
            }>"Download"</button>
            <button type="button" on:click=move |_| {
                let id = trash_id.clone();
                state.local(move |controller| controller.trash_item(&id), "Moved to Trash.");
            }>"Trash"</button>
        }
        .into_view()
    };

    view! {
        <tr class:pending=item.pending class:starred=item.starred>
            <td class="drive-name">
                <span class={format!("drive-glyph drive-glyph-{glyph}")} aria-hidden="true"></span>
                {name_cell}
            </td>
            <td>{size}</td>
            <td>{date}</td>
            <td class="drive-actions">{actions}</td>
        </tr>
    }
}
