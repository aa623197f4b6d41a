use drive_app_files::{
    use_drive_context, ActivatePage, DriveNav, DrivePage, DriveProvider, ForgotPasswordPage,
    LoginPage, RegisterPage, ResetPasswordPage,
};
use drive_host_web::{build_drive_host, host_strategy_name, DriveConfig};
use drive_runtime::DriveView;
use leptos::*;
use leptos_meta::*;
use leptos_router::*;

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();
    let host = build_drive_host(DriveConfig::from_build_env());
    logging::log!(
        "drive host `{}` (api {})",
        host_strategy_name(),
        if host.config.api_enabled() { "enabled" } else { "offline" }
    );

    view! {
        <Title text="CloudDrive" />
        <Meta name="description" content="Browse, upload, and share files in CloudDrive." />

        <DriveProvider host=host>
            <Router>
                <main class="site-root">
                    <Routes>
                        <Route path="" view=|| view! { <Redirect path="/home" /> } />
                        <Route path="/login" view=LoginPage />
                        <Route path="/register" view=RegisterPage />
                        <Route path="/activate" view=ActivatePage />
                        <Route path="/forgot-password" view=ForgotPasswordPage />
                        <Route path="/reset-password" view=ResetPasswordPage />
                        <Route path="/home" view=|| view! { <DriveEntry view=DriveView::Home /> } />
                        <Route path="/my-drive" view=|| view! { <DriveEntry view=DriveView::MyDrive /> } />
                        <Route path="/starred" view=|| view! { <DriveEntry view=DriveView::Starred /> } />
                        <Route path="/trash" view=|| view! { <DriveEntry view=DriveView::Trash /> } />
                    </Routes>
                </main>
            </Router>
        </DriveProvider>
    }
}

#[component]
/// Signed-in shell around one drive view; anonymous visitors go to the login form.
pub fn DriveEntry(view: DriveView) -> impl IntoView {
    let context = use_drive_context();
    let signed_in = context.signed_in;

    view! {
        <Show when=move || signed_in.get() fallback=|| view! { <Redirect path="/login" /> }>
            <div class="drive-shell">
                <DriveNav />
                <DrivePage view=view />
            </div>
        </Show>
    }
}
