// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// The shell provides two capabilities: a rendering surface that can load
// pages and evaluate script, and visitable screens that can host that
// surface and draw native chrome (snapshots, spinners) around it.

use serde_json::Value;
use url::Url;

use waypost_core::ScreenId;

/// Identifies one native page-load attempt on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavigationToken(pub u64);

/// Correlates an outbound script evaluation with its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvaluationId(pub u64);

/// Handle a screen uses to embed a surface in its view hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Health of the process backing a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessState {
    #[default]
    Active,
    Terminated,
}

/// When an injected script runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionTime {
    DocumentStart,
    DocumentEnd,
}

/// A script injected into every page the surface loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScript {
    pub source: String,
    pub injection_time: InjectionTime,
    pub main_frame_only: bool,
}

/// Completion of an evaluated script: the value it produced, or the
/// engine's description of why evaluation failed.
pub type EvaluationOutcome = std::result::Result<Value, String>;

/// Response headers of a native page load, as seen before the body arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResponse {
    /// An HTTP response with its status code.
    Http { status_code: i32 },
    /// A non-HTTP response (file, data, blob...) for the given URL.
    Other { url: Option<Url> },
}

impl LoadResponse {
    /// Whether this is an opaque in-memory binary stream.
    pub fn is_opaque_stream(&self) -> bool {
        matches!(self, Self::Other { url: Some(url) } if url.scheme() == "blob")
    }
}

/// Decision for a response or navigation the surface asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    Allow,
    Cancel,
}

/// Lifecycle signals for a native page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// The main document finished loading.
    Finished { token: NavigationToken },
    /// The load failed before or after the response arrived.
    Failed {
        token: NavigationToken,
        description: String,
    },
}

impl LoadEvent {
    pub fn token(&self) -> NavigationToken {
        match self {
            Self::Finished { token } | Self::Failed { token, .. } => *token,
        }
    }
}

/// What triggered a navigation inside the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    LinkActivated,
    FormSubmitted,
    BackForward,
    Reload,
    FormResubmitted,
    Other,
}

/// A navigation the surface wants to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationAction {
    pub url: Url,
    pub kind: NavigationKind,
    pub main_frame: bool,
}

/// An authentication challenge raised by the network layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    pub id: u64,
    pub host: String,
    pub realm: Option<String>,
    pub scheme: String,
}

/// How an authentication challenge should be answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthDisposition {
    #[default]
    PerformDefaultHandling,
    UseCredential { user: String, password: String },
    CancelChallenge,
    RejectProtectionSpace,
}

/// A platform web view.
///
/// Implementations wrap WKWebView, Android WebView, wry, etc. All methods are
/// called from the UI thread; completions (`evaluate_script`, load events)
/// are delivered back to the owner on that same thread.
pub trait RenderingSurface {
    /// Stable handle for embedding this surface in a screen.
    fn handle(&self) -> SurfaceHandle;

    fn set_user_agent(&mut self, user_agent: &str);

    /// Inject a script into every page loaded from now on.
    fn add_user_script(&mut self, script: UserScript);

    /// Start delivering messages posted to the named channel.
    fn register_message_channel(&mut self, name: &str);

    /// Stop delivering messages for the named channel.
    fn unregister_message_channel(&mut self, name: &str);

    /// Load `url` as a full page. Returns the token that tags every load
    /// event belonging to this attempt.
    fn load_request(&mut self, url: &Url) -> NavigationToken;

    /// Load a prepared HTML body as though it had been served from `base_url`.
    fn load_html(&mut self, html: &str, base_url: &Url) -> NavigationToken;

    fn stop_loading(&mut self);

    /// Evaluate `script`; the outcome is reported later under `id`.
    fn evaluate_script(&mut self, id: EvaluationId, script: &str);

    /// URL of the document currently shown.
    fn current_location(&self) -> Option<Url>;

    fn process_state(&self) -> ProcessState;

    /// Copy the surface's cookies for `url` into the shared HTTP cookie store.
    fn sync_cookies(&mut self, url: &Url);

    fn resolve_auth_challenge(&mut self, id: u64, disposition: AuthDisposition);
}

/// A screen capable of hosting a rendering surface.
///
/// Screens are shared between the navigation stacks and the session that
/// drives them, so every primitive takes `&self`.
pub trait Visitable {
    fn screen_id(&self) -> ScreenId;

    /// The location this screen shows. `None` is a programming error that
    /// `Session::visit` rejects.
    fn location(&self) -> Option<Url>;

    /// Embed the surface in this screen's view.
    fn activate_surface(&self, surface: SurfaceHandle);

    /// Remove the surface from this screen's view.
    fn deactivate_surface(&self);

    /// The visit for this screen rendered its content.
    fn did_render(&self);

    /// Capture the currently visible content as a placeholder image.
    fn update_snapshot(&self);

    fn show_snapshot(&self);

    fn hide_snapshot(&self);

    /// Discard the captured placeholder image.
    fn clear_snapshot(&self);

    fn show_spinner(&self);

    fn hide_spinner(&self);

    /// Pull-to-refresh started.
    fn will_refresh(&self) {}

    /// Pull-to-refresh finished.
    fn did_refresh(&self) {}
}
