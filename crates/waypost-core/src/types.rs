// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Waypost navigation shell.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

/// Identity of a screen hosted by the native shell.
///
/// Screens are compared by this handle rather than by pointer, and it keys
/// the per-session restoration identifier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenId(pub Uuid);

impl ScreenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-local identity of a visit. Used to correlate listener slots on the
/// script bridge with the visit that registered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisitId(pub u64);

impl std::fmt::Display for VisitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "visit-{}", self.0)
    }
}

/// How a visit affects the embedded runtime's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitAction {
    #[default]
    Advance,
    Replace,
    Restore,
}

/// A response already fetched by the embedded runtime, typically the result
/// of a form submission that rendered instead of redirecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitResponse {
    pub status_code: i32,
    #[serde(
        default,
        rename = "responseHTML",
        skip_serializing_if = "Option::is_none"
    )]
    pub response_html: Option<String>,
    #[serde(default)]
    pub redirected: bool,
}

impl VisitResponse {
    pub fn new(status_code: i32, response_html: Option<String>) -> Self {
        Self {
            status_code,
            response_html,
            redirected: false,
        }
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_successful(&self) -> bool {
        (200..=299).contains(&self.status_code)
    }
}

/// Options for a single navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitOptions {
    #[serde(default)]
    pub action: VisitAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<VisitResponse>,
}

impl VisitOptions {
    pub fn new(action: VisitAction) -> Self {
        Self {
            action,
            response: None,
        }
    }

    pub fn with_response(action: VisitAction, response: VisitResponse) -> Self {
        Self {
            action,
            response: Some(response),
        }
    }

    /// The prepared HTML body, if the response carries a successful one.
    pub fn successful_body(&self) -> Option<&str> {
        self.response
            .as_ref()
            .filter(|r| r.is_successful())
            .and_then(|r| r.response_html.as_deref())
    }
}

/// Opaque routing properties attached to a URL by the rules engine.
pub type PathProperties = Map<String, Value>;

/// The rules engine collaborator: maps a URL to its routing properties.
///
/// Pattern matching and remote loading live outside this workspace.
pub trait PropertiesSource {
    fn properties(&self, url: &Url) -> PathProperties;
}

/// A properties source with no rules; every URL gets an empty map.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProperties;

impl PropertiesSource for NoProperties {
    fn properties(&self, _url: &Url) -> PathProperties {
        PathProperties::new()
    }
}

/// Which screen stack a proposal targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationContext {
    #[default]
    Default,
    Modal,
}

/// How a proposal mutates the targeted stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    #[default]
    Default,
    Pop,
    Replace,
    Refresh,
    ClearAll,
    ReplaceRoot,
    None,
}

/// A requested navigation awaiting a stack-mutation decision.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitProposal {
    pub url: Url,
    pub options: VisitOptions,
    pub properties: PathProperties,
}

impl VisitProposal {
    pub fn new(url: Url, options: VisitOptions, properties: PathProperties) -> Self {
        Self {
            url,
            options,
            properties,
        }
    }

    /// Unknown or missing values fall back to [`NavigationContext::Default`].
    pub fn context(&self) -> NavigationContext {
        self.property_enum("context").unwrap_or_default()
    }

    /// Unknown or missing values fall back to [`Presentation::Default`].
    pub fn presentation(&self) -> Presentation {
        self.property_enum("presentation").unwrap_or_default()
    }

    pub fn pull_to_refresh_enabled(&self) -> bool {
        self.properties
            .get("pull_to_refresh_enabled")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Identifier of a custom native screen configured for this URL, if any.
    pub fn screen(&self) -> Option<&str> {
        self.properties.get("view_controller").and_then(Value::as_str)
    }

    fn property_enum<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.properties.get(key)?.clone();
        serde_json::from_value(raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proposal(properties: Value) -> VisitProposal {
        let properties = match properties {
            Value::Object(map) => map,
            _ => PathProperties::new(),
        };
        VisitProposal::new(
            Url::parse("https://app.test/one").unwrap(),
            VisitOptions::default(),
            properties,
        )
    }

    #[test]
    fn response_success_range() {
        assert!(VisitResponse::new(200, None).is_successful());
        assert!(VisitResponse::new(299, None).is_successful());
        assert!(!VisitResponse::new(300, None).is_successful());
        assert!(!VisitResponse::new(422, None).is_successful());
    }

    #[test]
    fn options_decode_with_missing_action() {
        let options: VisitOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options.action, VisitAction::Advance);
        assert!(options.response.is_none());
    }

    #[test]
    fn options_decode_camel_case_response() {
        let options: VisitOptions = serde_json::from_value(json!({
            "action": "replace",
            "response": { "statusCode": 200, "responseHTML": "<p>ok</p>", "redirected": true }
        }))
        .unwrap();
        assert_eq!(options.action, VisitAction::Replace);
        let response = options.response.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.response_html.as_deref(), Some("<p>ok</p>"));
        assert!(response.redirected);
    }

    #[test]
    fn successful_body_requires_2xx() {
        let ok = VisitOptions::with_response(
            VisitAction::Advance,
            VisitResponse::new(200, Some("<html></html>".into())),
        );
        assert_eq!(ok.successful_body(), Some("<html></html>"));

        let failed = VisitOptions::with_response(
            VisitAction::Advance,
            VisitResponse::new(422, Some("<html></html>".into())),
        );
        assert_eq!(failed.successful_body(), None);
    }

    #[test]
    fn proposal_defaults_without_properties() {
        let p = proposal(json!({}));
        assert_eq!(p.context(), NavigationContext::Default);
        assert_eq!(p.presentation(), Presentation::Default);
        assert!(p.pull_to_refresh_enabled());
        assert_eq!(p.screen(), None);
    }

    #[test]
    fn proposal_reads_routing_properties() {
        let p = proposal(json!({
            "context": "modal",
            "presentation": "replace_root",
            "pull_to_refresh_enabled": false,
            "view_controller": "numbers"
        }));
        assert_eq!(p.context(), NavigationContext::Modal);
        assert_eq!(p.presentation(), Presentation::ReplaceRoot);
        assert!(!p.pull_to_refresh_enabled());
        assert_eq!(p.screen(), Some("numbers"));
    }

    #[test]
    fn unknown_presentation_falls_back_to_default() {
        let p = proposal(json!({ "presentation": "sideways", "context": 7 }));
        assert_eq!(p.presentation(), Presentation::Default);
        assert_eq!(p.context(), NavigationContext::Default);
    }
}
