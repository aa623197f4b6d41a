use std::rc::Rc;

use drive_host::{
    AuthApi, AuthSession, DownloadSink, DriveApi, MemoryAuthApi, MemoryAuthSession,
    MemoryDownloadSink, MemoryDriveApi, MemoryObjectTransfer, MemoryPrefsStore, NoopAuthApi, NoopDriveApi,
    NoopObjectTransfer, ObjectTransfer, PrefsAuthSession, PrefsStore,
};

use crate::{
    BrowserDownloadSink, DriveConfig, HttpAuthApi, HttpDriveApi, HttpObjectTransfer,
    WebPrefsStore,
};

/// Acting user of the in-memory demo host.
pub const STUB_USER_ID: &str = "demo-user";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected host strategy for `drive_host_web` adapters.
pub enum HostStrategy {
    /// Browser-backed adapters talking to the configured backend.
    Browser,
    /// In-memory adapters for non-browser builds and demos.
    Stub,
}

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "host-stub")]
    {
        HostStrategy::Stub
    }

    #[cfg(not(feature = "host-stub"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    match selected_host_strategy() {
        HostStrategy::Browser => "browser",
        HostStrategy::Stub => "stub",
    }
}

/// Adapter enum that erases the concrete preferences backend behind [`PrefsStore`].
#[derive(Debug, Clone)]
pub enum PrefsStoreAdapter {
    /// `localStorage`.
    Browser(WebPrefsStore),
    /// Process-local map.
    Stub(MemoryPrefsStore),
}

impl PrefsStore for PrefsStoreAdapter {
    fn load_pref(&self, key: &str) -> Result<Option<String>, String> {
        match self {
            Self::Browser(store) => store.load_pref(key),
            Self::Stub(store) => store.load_pref(key),
        }
    }

    fn save_pref(&self, key: &str, raw_json: &str) -> Result<(), String> {
        match self {
            Self::Browser(store) => store.save_pref(key, raw_json),
            Self::Stub(store) => store.save_pref(key, raw_json),
        }
    }

    fn delete_pref(&self, key: &str) -> Result<(), String> {
        match self {
            Self::Browser(store) => store.delete_pref(key),
            Self::Stub(store) => store.delete_pref(key),
        }
    }
}

/// Builds the preferences adapter for the compile-time selected host strategy.
pub fn prefs_store() -> PrefsStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => PrefsStoreAdapter::Browser(WebPrefsStore),
        HostStrategy::Stub => PrefsStoreAdapter::Stub(MemoryPrefsStore::default()),
    }
}

/// Every host service the drive client needs, wired for one strategy and configuration.
#[derive(Clone)]
pub struct DriveHost {
    /// Resolved configuration.
    pub config: DriveConfig,
    /// Durable key-value storage (overlays, token).
    pub prefs: Rc<dyn PrefsStore>,
    /// Bearer-token session.
    pub session: Rc<dyn AuthSession>,
    /// Folder and file API.
    pub api: Rc<dyn DriveApi>,
    /// Account API.
    pub auth_api: Rc<dyn AuthApi>,
    /// Object-storage transfers.
    pub transfer: Rc<dyn ObjectTransfer>,
    /// Browser save.
    pub downloads: Rc<dyn DownloadSink>,
}

/// Builds the drive host for the compile-time selected strategy.
///
/// A browser build without a configured API gets no-op remote services; the stub strategy
/// runs entirely in memory.
pub fn build_drive_host(config: DriveConfig) -> DriveHost {
    let prefs: Rc<dyn PrefsStore> = Rc::new(prefs_store());
    match (selected_host_strategy(), config.api_base_url().map(str::to_string)) {
        (HostStrategy::Browser, Some(base_url)) => {
            let session: Rc<dyn AuthSession> = Rc::new(PrefsAuthSession::restore(prefs.clone()));
            DriveHost {
                api: Rc::new(HttpDriveApi::new(&base_url, session.clone())),
                auth_api: Rc::new(HttpAuthApi::new(&base_url)),
                transfer: Rc::new(HttpObjectTransfer::default()),
                downloads: Rc::new(BrowserDownloadSink),
                config,
                prefs,
                session,
            }
        }
        (HostStrategy::Browser, None) => DriveHost {
            session: Rc::new(PrefsAuthSession::restore(prefs.clone())),
            api: Rc::new(NoopDriveApi),
            auth_api: Rc::new(NoopAuthApi),
            transfer: Rc::new(NoopObjectTransfer),
            downloads: Rc::new(BrowserDownloadSink),
            config,
            prefs,
        },
        (HostStrategy::Stub, _) => stub_host(config, prefs),
    }
}

/// In-memory host that starts signed in as [`STUB_USER_ID`].
fn stub_host(config: DriveConfig, prefs: Rc<dyn PrefsStore>) -> DriveHost {
    let auth_api = MemoryAuthApi::new(STUB_USER_ID);
    DriveHost {
        session: Rc::new(MemoryAuthSession::signed_in(auth_api.token())),
        api: Rc::new(MemoryDriveApi::default()),
        auth_api: Rc::new(auth_api),
        transfer: Rc::new(MemoryObjectTransfer::default()),
        downloads: Rc::new(MemoryDownloadSink::default()),
        config,
        prefs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_host::{user_id_from_token, IdentityProvider, LoginRequest, SessionIdentity};

    #[test]
    fn strategy_name_matches_selection() {
        let expected = if cfg!(feature = "host-stub") {
            "stub"
        } else {
            "browser"
        };
        assert_eq!(host_strategy_name(), expected);
    }

    #[test]
    fn stub_host_starts_signed_in_as_the_demo_user() {
        let host = stub_host(DriveConfig::default(), Rc::new(MemoryPrefsStore::default()));
        assert!(host.session.is_authenticated());
        let identity = SessionIdentity::new(host.session.clone());
        assert_eq!(identity.acting_user_id(), Ok(STUB_USER_ID.to_string()));

        host.session.logout().expect("logout");
        let reply = futures::executor::block_on(host.auth_api.login(&LoginRequest {
            email: "demo@example.com".into(),
            password: "pw".into(),
        }))
        .expect("login");
        assert_eq!(user_id_from_token(&reply.token).as_deref(), Some(STUB_USER_ID));
    }

    #[test]
    fn host_without_api_lists_nothing() {
        let host = build_drive_host(DriveConfig::default());
        assert!(!host.config.api_enabled());
        let folders = futures::executor::block_on(host.api.list_folders());
        assert_eq!(folders.map(|folders| folders.len()), Ok(0));
    }
}
