// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Navigator configuration, passed explicitly into every constructor.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Settings shared by the navigator and its sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// User agent applied to every rendering surface. Servers look for
    /// "Waypost Native" to tailor their markup.
    pub user_agent: String,
    /// Name of the single inbound message channel.
    pub message_channel: String,
    /// How long a cold boot waits for the embedded runtime to report the
    /// page as loaded before failing with `PageLoadFailure`.
    pub page_load_timeout_ms: u64,
    /// Hosts served inside the app. Empty means every http(s) host is in-app.
    pub app_hosts: Vec<String>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            user_agent: "Waypost Native".into(),
            message_channel: "waypost".into(),
            page_load_timeout_ms: 10_000,
            app_hosts: Vec::new(),
        }
    }
}

impl NavigatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout_ms)
    }

    /// Whether `url` must leave the app instead of being routed.
    pub fn is_external(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return true;
        }
        if self.app_hosts.is_empty() {
            return false;
        }
        match url.host_str() {
            Some(host) => !self.app_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            NavigatorConfig::from_json_str(r#"{ "page_load_timeout_ms": 2500 }"#).unwrap();
        assert_eq!(config.page_load_timeout(), Duration::from_millis(2500));
        assert_eq!(config.message_channel, "waypost");
        assert_eq!(config.user_agent, "Waypost Native");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "app_hosts": ["app.test"] }}"#).unwrap();
        let config = NavigatorConfig::load(file.path()).unwrap();
        assert_eq!(config.app_hosts, vec!["app.test".to_string()]);
    }

    #[test]
    fn off_domain_urls_are_external() {
        let config = NavigatorConfig {
            app_hosts: vec!["app.test".into()],
            ..Default::default()
        };
        assert!(!config.is_external(&Url::parse("https://APP.test/one").unwrap()));
        assert!(config.is_external(&Url::parse("https://elsewhere.test/").unwrap()));
        assert!(config.is_external(&Url::parse("mailto:someone@app.test").unwrap()));
    }

    #[test]
    fn empty_host_list_keeps_http_in_app() {
        let config = NavigatorConfig::default();
        assert!(!config.is_external(&Url::parse("http://anything.test/").unwrap()));
        assert!(config.is_external(&Url::parse("tel:+15551234").unwrap()));
    }
}
