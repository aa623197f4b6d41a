//! Build-time client configuration.

/// Environment variable read at build time for the REST API base URL.
pub const API_BASE_URL_ENV: &str = "CLOUDDRIVE_API_BASE_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Where the client talks to.
pub struct DriveConfig {
    api_base_url: Option<String>,
}

impl DriveConfig {
    /// Configuration baked in at build time from `CLOUDDRIVE_API_BASE_URL`.
    pub fn from_build_env() -> Self {
        Self::default().with_api_base_url(option_env!("CLOUDDRIVE_API_BASE_URL").unwrap_or(""))
    }

    /// Overrides the API base URL; a blank value disables the API.
    pub fn with_api_base_url(mut self, url: &str) -> Self {
        let url = url.trim().trim_end_matches('/');
        self.api_base_url = (!url.is_empty()).then(|| url.to_string());
        self
    }

    /// Base URL without a trailing slash.
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    /// Whether a backend is configured. Without one the client runs offline and swallows
    /// listing failures.
    pub fn api_enabled(&self) -> bool {
        self.api_base_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_trimmed_and_blank_disables() {
        let config = DriveConfig::default().with_api_base_url(" https://api.example.com/v1/ ");
        assert_eq!(config.api_base_url(), Some("https://api.example.com/v1"));
        assert!(config.api_enabled());

        let config = config.with_api_base_url("   ");
        assert_eq!(config.api_base_url(), None);
        assert!(!config.api_enabled());
    }
}
