// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless implementations for desktop/CI builds.
//
// Neither type renders anything. Both record what they were asked to do so
// the shell can be exercised (and inspected) without a platform web view.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;
use url::Url;

use waypost_core::ScreenId;

use crate::traits::{
    AuthDisposition, EvaluationId, NavigationToken, ProcessState, RenderingSurface,
    SurfaceHandle, UserScript, Visitable,
};

static NEXT_SURFACE: AtomicU64 = AtomicU64::new(1);

/// A page load issued to a headless surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Url(Url),
    Html { html: String, base_url: Url },
}

/// Everything a [`HeadlessSurface`] has been asked to do.
#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub user_agent: Option<String>,
    pub user_scripts: Vec<UserScript>,
    /// Currently registered channels.
    pub channels: Vec<String>,
    pub loads: Vec<(NavigationToken, LoadRequest)>,
    pub stops: usize,
    pub evaluations: Vec<(EvaluationId, String)>,
    pub cookie_syncs: Vec<Url>,
    pub auth_resolutions: Vec<(u64, AuthDisposition)>,
    pub location: Option<Url>,
    pub process_state: ProcessState,
}

/// A rendering surface that renders nothing.
///
/// Loads move `current_location` immediately. The log is shared so a caller
/// can keep inspecting it after the surface has been boxed and handed off.
#[derive(Debug)]
pub struct HeadlessSurface {
    handle: SurfaceHandle,
    next_token: u64,
    log: Rc<RefCell<SurfaceLog>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            handle: SurfaceHandle(NEXT_SURFACE.fetch_add(1, Ordering::Relaxed)),
            next_token: 0,
            log: Rc::new(RefCell::new(SurfaceLog::default())),
        }
    }

    pub fn log(&self) -> Rc<RefCell<SurfaceLog>> {
        Rc::clone(&self.log)
    }

    fn next_token(&mut self) -> NavigationToken {
        self.next_token += 1;
        NavigationToken(self.next_token)
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderingSurface for HeadlessSurface {
    fn handle(&self) -> SurfaceHandle {
        self.handle
    }

    fn set_user_agent(&mut self, user_agent: &str) {
        self.log.borrow_mut().user_agent = Some(user_agent.to_string());
    }

    fn add_user_script(&mut self, script: UserScript) {
        self.log.borrow_mut().user_scripts.push(script);
    }

    fn register_message_channel(&mut self, name: &str) {
        self.log.borrow_mut().channels.push(name.to_string());
    }

    fn unregister_message_channel(&mut self, name: &str) {
        self.log.borrow_mut().channels.retain(|c| c != name);
    }

    fn load_request(&mut self, url: &Url) -> NavigationToken {
        let token = self.next_token();
        trace!(%url, ?token, "headless load");
        let mut log = self.log.borrow_mut();
        log.location = Some(url.clone());
        log.loads.push((token, LoadRequest::Url(url.clone())));
        token
    }

    fn load_html(&mut self, html: &str, base_url: &Url) -> NavigationToken {
        let token = self.next_token();
        trace!(%base_url, ?token, "headless html load");
        let mut log = self.log.borrow_mut();
        log.location = Some(base_url.clone());
        log.loads.push((
            token,
            LoadRequest::Html {
                html: html.to_string(),
                base_url: base_url.clone(),
            },
        ));
        token
    }

    fn stop_loading(&mut self) {
        self.log.borrow_mut().stops += 1;
    }

    fn evaluate_script(&mut self, id: EvaluationId, script: &str) {
        self.log
            .borrow_mut()
            .evaluations
            .push((id, script.to_string()));
    }

    fn current_location(&self) -> Option<Url> {
        self.log.borrow().location.clone()
    }

    fn process_state(&self) -> ProcessState {
        self.log.borrow().process_state
    }

    fn sync_cookies(&mut self, url: &Url) {
        self.log.borrow_mut().cookie_syncs.push(url.clone());
    }

    fn resolve_auth_challenge(&mut self, id: u64, disposition: AuthDisposition) {
        self.log.borrow_mut().auth_resolutions.push((id, disposition));
    }
}

/// A primitive invoked on a [`HeadlessScreen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCall {
    Activate(SurfaceHandle),
    Deactivate,
    Render,
    UpdateSnapshot,
    ShowSnapshot,
    HideSnapshot,
    ClearSnapshot,
    ShowSpinner,
    HideSpinner,
    WillRefresh,
    DidRefresh,
}

/// A visitable screen with no view.
#[derive(Debug)]
pub struct HeadlessScreen {
    id: ScreenId,
    location: Option<Url>,
    calls: RefCell<Vec<ScreenCall>>,
    surface: RefCell<Option<SurfaceHandle>>,
}

impl HeadlessScreen {
    pub fn new(location: Url) -> Self {
        Self::with_location(Some(location))
    }

    /// A screen with no location, which sessions refuse to visit.
    pub fn without_location() -> Self {
        Self::with_location(None)
    }

    fn with_location(location: Option<Url>) -> Self {
        Self {
            id: ScreenId::new(),
            location,
            calls: RefCell::new(Vec::new()),
            surface: RefCell::new(None),
        }
    }

    pub fn calls(&self) -> Vec<ScreenCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, call: ScreenCall) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }

    /// The surface currently embedded in this screen.
    pub fn surface(&self) -> Option<SurfaceHandle> {
        *self.surface.borrow()
    }

    fn record(&self, call: ScreenCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Visitable for HeadlessScreen {
    fn screen_id(&self) -> ScreenId {
        self.id
    }

    fn location(&self) -> Option<Url> {
        self.location.clone()
    }

    fn activate_surface(&self, surface: SurfaceHandle) {
        *self.surface.borrow_mut() = Some(surface);
        self.record(ScreenCall::Activate(surface));
    }

    fn deactivate_surface(&self) {
        *self.surface.borrow_mut() = None;
        self.record(ScreenCall::Deactivate);
    }

    fn did_render(&self) {
        self.record(ScreenCall::Render);
    }

    fn update_snapshot(&self) {
        self.record(ScreenCall::UpdateSnapshot);
    }

    fn show_snapshot(&self) {
        self.record(ScreenCall::ShowSnapshot);
    }

    fn hide_snapshot(&self) {
        self.record(ScreenCall::HideSnapshot);
    }

    fn clear_snapshot(&self) {
        self.record(ScreenCall::ClearSnapshot);
    }

    fn show_spinner(&self) {
        self.record(ScreenCall::ShowSpinner);
    }

    fn hide_spinner(&self) {
        self.record(ScreenCall::HideSpinner);
    }

    fn will_refresh(&self) {
        self.record(ScreenCall::WillRefresh);
    }

    fn did_refresh(&self) {
        self.record(ScreenCall::DidRefresh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surfaces_get_distinct_handles() {
        assert_ne!(HeadlessSurface::new().handle(), HeadlessSurface::new().handle());
    }

    #[test]
    fn loads_move_location_and_issue_fresh_tokens() {
        let mut surface = HeadlessSurface::new();
        let one = Url::parse("https://app.test/one").unwrap();
        let two = Url::parse("https://app.test/two").unwrap();
        let first = surface.load_request(&one);
        let second = surface.load_html("<p></p>", &two);
        assert_ne!(first, second);
        assert_eq!(surface.current_location(), Some(two));
        assert_eq!(surface.log().borrow().loads.len(), 2);
    }

    #[test]
    fn screen_tracks_embedded_surface() {
        let screen = HeadlessScreen::new(Url::parse("https://app.test/").unwrap());
        screen.activate_surface(SurfaceHandle(7));
        assert_eq!(screen.surface(), Some(SurfaceHandle(7)));
        screen.deactivate_surface();
        assert_eq!(screen.surface(), None);
        assert_eq!(
            screen.calls(),
            vec![ScreenCall::Activate(SurfaceHandle(7)), ScreenCall::Deactivate]
        );
    }
}
