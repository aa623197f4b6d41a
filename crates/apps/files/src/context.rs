//! Drive services shared through Leptos context.

use std::rc::Rc;

use drive_host::{IdentityProvider, SessionIdentity};
use drive_host_web::DriveHost;
use drive_runtime::{AuthFlow, DriveServices, OverlayStore};
use leptos::*;

#[derive(Clone)]
/// Services and session state every drive view reads.
pub struct DriveContext {
    /// Remote services injected into each page controller.
    pub services: DriveServices,
    /// The single starred/trashed overlay store.
    pub overlay: OverlayStore,
    /// Account flows.
    pub auth: AuthFlow,
    /// Offline mode: listing failures are logged, not shown.
    pub quiet_fetch_errors: bool,
    /// Reactive sign-in state.
    pub signed_in: RwSignal<bool>,
}

#[component]
/// Provides [`DriveContext`] built from the host bundle assembled by the entry layer.
pub fn DriveProvider(
    /// Browser or stub host bundle.
    host: DriveHost,
    children: Children,
) -> impl IntoView {
    let identity: Rc<dyn IdentityProvider> = Rc::new(SessionIdentity::new(host.session.clone()));
    let auth = AuthFlow::new(host.auth_api.clone(), host.session.clone(), host.prefs.clone());
    let context = DriveContext {
        services: DriveServices {
            api: host.api.clone(),
            transfer: host.transfer.clone(),
            downloads: host.downloads.clone(),
            identity,
        },
        overlay: OverlayStore::new(host.prefs.clone()),
        signed_in: create_rw_signal(auth.is_authenticated()),
        auth,
        quiet_fetch_errors: !host.config.api_enabled(),
    };
    provide_context(context);

    children().into_view()
}

/// Returns the current [`DriveContext`].
///
/// # Panics
///
/// Panics if called outside [`DriveProvider`].
pub fn use_drive_context() -> DriveContext {
    use_context::<DriveContext>().expect("DriveContext not provided")
}
