// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session: one rendering surface, one started visit at a time.
//
// The session chooses between cold boots and scripted visits, turns visit
// notifications into screen choreography (snapshots, spinners, surface
// ownership) and reacts to screens appearing and disappearing. Anything the
// owner must decide is queued as a `SessionEvent`.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, instrument, trace, warn};
use url::Url;

use waypost_bridge::{
    AuthChallenge, AuthDisposition, Dispatch, EvaluationId, EvaluationOutcome, LoadEvent,
    LoadPolicy, LoadResponse, NavigationAction, NavigationKind, NavigationToken, ProcessState,
    RenderingSurface, ScriptBridge, SurfaceHandle, Visitable, WebEvent,
};
use waypost_core::error::{Result, WaypostError};
use waypost_core::{
    NavigatorConfig, PropertiesSource, ScreenId, VisitAction, VisitError, VisitId, VisitOptions,
    VisitProposal,
};

use crate::visit::{Visit, VisitKind, VisitNotification, VisitState};

/// Something the session's owner has to act on.
pub enum SessionEvent {
    /// The embedded runtime proposed a navigation.
    ProposedVisit(VisitProposal),
    RequestStarted,
    RequestFinished,
    RequestFailed {
        visitable: Rc<dyn Visitable>,
        error: VisitError,
    },
    /// A cold boot completed and the embedded runtime is running.
    SurfaceLoaded,
    OpenExternalUrl(Url),
    AuthChallenge(AuthChallenge),
    FormSubmissionStarted(Url),
    FormSubmissionFinished(Url),
    /// The process backing the surface went away.
    ProcessTerminated,
}

impl std::fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProposedVisit(proposal) => f
                .debug_tuple("ProposedVisit")
                .field(&proposal.url.as_str())
                .finish(),
            Self::RequestStarted => f.write_str("RequestStarted"),
            Self::RequestFinished => f.write_str("RequestFinished"),
            Self::RequestFailed { visitable, error } => f
                .debug_struct("RequestFailed")
                .field("screen", &visitable.screen_id())
                .field("error", error)
                .finish(),
            Self::SurfaceLoaded => f.write_str("SurfaceLoaded"),
            Self::OpenExternalUrl(url) => f.debug_tuple("OpenExternalUrl").field(&url.as_str()).finish(),
            Self::AuthChallenge(challenge) => f.debug_tuple("AuthChallenge").field(challenge).finish(),
            Self::FormSubmissionStarted(url) => f
                .debug_tuple("FormSubmissionStarted")
                .field(&url.as_str())
                .finish(),
            Self::FormSubmissionFinished(url) => f
                .debug_tuple("FormSubmissionFinished")
                .field(&url.as_str())
                .finish(),
            Self::ProcessTerminated => f.write_str("ProcessTerminated"),
        }
    }
}

fn same(a: &dyn Visitable, b: &dyn Visitable) -> bool {
    a.screen_id() == b.screen_id()
}

pub struct Session {
    name: String,
    bridge: ScriptBridge,
    properties: Rc<dyn PropertiesSource>,
    page_load_timeout: Duration,

    initialized: bool,
    refreshing: bool,
    showing_stale_content: bool,
    snapshot_cache_stale: bool,

    next_visit: u64,
    visits: HashMap<VisitId, Visit>,
    /// The visit most recently started.
    current: Option<VisitId>,
    /// The visit whose screen is the one actually on screen.
    topmost: Option<VisitId>,
    /// Topmost visit at the time a screen began to disappear.
    previous: Option<VisitId>,

    activated: Option<Rc<dyn Visitable>>,
    restoration_identifiers: HashMap<ScreenId, String>,
    page_load_deadline: Option<(VisitId, Instant)>,
    events: VecDeque<SessionEvent>,
}

impl Session {
    pub fn new(
        name: impl Into<String>,
        surface: Box<dyn RenderingSurface>,
        config: &NavigatorConfig,
        properties: Rc<dyn PropertiesSource>,
    ) -> Self {
        let name = name.into();
        debug!(session = %name, "session created");
        Self {
            name,
            bridge: ScriptBridge::new(surface, config),
            properties,
            page_load_timeout: config.page_load_timeout(),
            initialized: false,
            refreshing: false,
            showing_stale_content: false,
            snapshot_cache_stale: false,
            next_visit: 0,
            visits: HashMap::new(),
            current: None,
            topmost: None,
            previous: None,
            activated: None,
            restoration_identifiers: HashMap::new(),
            page_load_deadline: None,
            events: VecDeque::new(),
        }
    }

    // -- Accessors --

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the embedded runtime is running on the surface, so visits
    /// can be scripted instead of cold-booted.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// The visitable that most recently completed navigation.
    pub fn topmost_visitable(&self) -> Option<Rc<dyn Visitable>> {
        self.visitable_of(self.topmost)
    }

    /// The visitable that currently owns the surface.
    pub fn active_visitable(&self) -> Option<Rc<dyn Visitable>> {
        self.activated.clone()
    }

    pub fn current_visit(&self) -> Option<&Visit> {
        self.current.and_then(|id| self.visits.get(&id))
    }

    pub fn topmost_visit(&self) -> Option<&Visit> {
        self.topmost.and_then(|id| self.visits.get(&id))
    }

    pub fn restoration_identifier(&self, screen: ScreenId) -> Option<&str> {
        self.restoration_identifiers.get(&screen).map(String::as_str)
    }

    pub fn surface_handle(&self) -> SurfaceHandle {
        self.bridge.surface().handle()
    }

    pub fn process_state(&self) -> ProcessState {
        self.bridge.surface().process_state()
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    // -- Visiting --

    pub fn visit_with_action(
        &mut self,
        visitable: Rc<dyn Visitable>,
        action: VisitAction,
    ) -> Result<VisitId> {
        self.visit(visitable, Some(VisitOptions::new(action)), false)
    }

    /// Start a visit for `visitable`, canceling whatever visit is in flight.
    ///
    /// Cold-boots when the session is not initialized (or `reload` is set),
    /// otherwise asks the embedded runtime to navigate.
    #[instrument(skip_all, fields(session = %self.name, screen = %visitable.screen_id()))]
    pub fn visit(
        &mut self,
        visitable: Rc<dyn Visitable>,
        options: Option<VisitOptions>,
        reload: bool,
    ) -> Result<VisitId> {
        let location = visitable
            .location()
            .ok_or(WaypostError::MissingLocation(visitable.screen_id()))?;

        if reload {
            self.initialized = false;
        }

        let options = options.unwrap_or_default();
        self.next_visit += 1;
        let id = VisitId(self.next_visit);
        let is_page_refresh = options.action == VisitAction::Replace
            && self.bridge.surface().current_location().as_ref() == Some(&location);

        let visit = if self.initialized {
            let restoration = self
                .restoration_identifiers
                .get(&visitable.screen_id())
                .cloned();
            Visit::scripted(id, visitable, location, options, is_page_refresh, restoration)
        } else {
            Visit::cold_boot(id, visitable, location, options, is_page_refresh)
        };
        let kind = visit.kind();

        if let Some(previous) = self.current {
            self.with_visit(previous, |v, bridge| v.cancel(bridge))
                .transpose()?;
        }

        info!(
            visit = %id,
            kind = ?kind,
            location = %visit.location(),
            action = ?visit.options().action,
            reload,
            "visit"
        );
        self.visits.insert(id, visit);
        self.current = Some(id);

        let started = self.with_visit(id, |v, bridge| v.start(bridge)).transpose();
        if kind == VisitKind::ColdBoot {
            self.page_load_deadline = Some((id, Instant::now() + self.page_load_timeout));
        }
        self.prune();
        started?;
        Ok(id)
    }

    /// Cold-boot the topmost visitable again and make that visit topmost.
    pub fn reload(&mut self) -> Result<()> {
        let Some(visitable) = self.topmost_visitable() else {
            return Ok(());
        };

        self.initialized = false;
        self.visit(visitable, None, false)?;
        self.topmost = self.current;
        Ok(())
    }

    pub fn clear_snapshot_cache(&mut self) -> Result<()> {
        self.bridge.clear_snapshot_cache().map(|_| ())
    }

    /// Clear the snapshot cache the next time a screen appears.
    pub fn mark_snapshot_cache_as_stale(&mut self) {
        self.snapshot_cache_stale = true;
    }

    /// Reload the next time a screen appears.
    pub fn mark_content_as_stale(&mut self) {
        self.showing_stale_content = true;
    }

    /// Drop the restoration identifier kept for a discarded screen.
    pub fn forget_screen(&mut self, screen: ScreenId) {
        if self.restoration_identifiers.remove(&screen).is_some() {
            trace!(session = %self.name, %screen, "restoration identifier forgotten");
        }
    }

    // -- Screen lifecycle --

    pub fn visitable_will_appear(
        &mut self,
        visitable: &Rc<dyn Visitable>,
        moving_to_parent: bool,
    ) -> Result<()> {
        let result = self.resolve_appearance(visitable, moving_to_parent);
        // Forgetting the previous visit here keeps web-to-web transitions
        // from snapshotting twice.
        self.previous = None;
        self.prune();
        result
    }

    fn resolve_appearance(
        &mut self,
        visitable: &Rc<dyn Visitable>,
        moving_to_parent: bool,
    ) -> Result<()> {
        let (Some(topmost), Some(current)) = (self.topmost, self.current) else {
            return Ok(());
        };
        let (Some(topmost_visitable), Some(current_visitable)) =
            (self.visitable_of(Some(topmost)), self.visitable_of(Some(current)))
        else {
            return Ok(());
        };
        let previous_visitable = self.visitable_of(self.previous);

        if self.snapshot_cache_stale {
            if let Err(e) = self.clear_snapshot_cache() {
                warn!(session = %self.name, error = %e, "failed to clear stale snapshot cache");
            }
            self.snapshot_cache_stale = false;
        }

        let is_topmost = same(visitable.as_ref(), topmost_visitable.as_ref());

        if self.showing_stale_content {
            self.reload()?;
            self.showing_stale_content = false;
        } else if is_topmost && moving_to_parent {
            // A back gesture was abandoned.
            if self.state_of(topmost) == Some(VisitState::Completed) {
                self.with_visit(current, |v, bridge| v.cancel(bridge))
                    .transpose()?;
            } else {
                self.visit_with_action(Rc::clone(visitable), VisitAction::Advance)?;
            }
        } else if same(visitable.as_ref(), current_visitable.as_ref())
            && self.state_of(current) == Some(VisitState::Started)
        {
            // Forward navigation: the screen appears before the visit completes.
            self.complete_navigation_for_current();
        } else if !is_topmost {
            // Back from one web screen to another.
            self.visit_with_action(Rc::clone(visitable), VisitAction::Restore)?;
        } else if previous_visitable.is_some_and(|p| same(visitable.as_ref(), p.as_ref())) {
            // Back from a native screen to a web screen.
            self.visit_with_action(Rc::clone(visitable), VisitAction::Restore)?;
        }
        Ok(())
    }

    pub fn visitable_did_appear(&mut self, visitable: &Rc<dyn Visitable>) -> Result<()> {
        let is_current = self.is_target(self.current, visitable);
        let is_completed_topmost = self.is_target(self.topmost, visitable)
            && self.topmost.and_then(|id| self.state_of(id)) == Some(VisitState::Completed);

        if is_current {
            self.complete_navigation_for_current();
            if self.current.and_then(|id| self.state_of(id)) != Some(VisitState::Failed) {
                self.activate(visitable);
            }
        } else if is_completed_topmost {
            // Reappearing after a canceled navigation.
            self.visit_with_action(Rc::clone(visitable), VisitAction::Restore)?;
        }
        Ok(())
    }

    pub fn visitable_will_disappear(&mut self, _visitable: &Rc<dyn Visitable>) {
        self.previous = self.topmost;
    }

    pub fn visitable_did_disappear(&mut self, visitable: &Rc<dyn Visitable>) -> Result<()> {
        let cached = match self.previous.and_then(|id| self.visits.get(&id)) {
            Some(previous) => previous.cache_snapshot(&mut self.bridge),
            None => Ok(()),
        };
        self.deactivate(visitable, false);
        cached
    }

    /// Reload on behalf of the topmost visitable; ignored for any other.
    pub fn visitable_did_request_reload(&mut self, visitable: &Rc<dyn Visitable>) -> Result<()> {
        if !self.is_target(self.topmost, visitable) {
            return Ok(());
        }
        self.reload()
    }

    /// Pull-to-refresh from the topmost visitable.
    pub fn visitable_did_request_refresh(&mut self, visitable: &Rc<dyn Visitable>) -> Result<()> {
        if !self.is_target(self.topmost, visitable) {
            return Ok(());
        }
        self.refreshing = true;
        visitable.will_refresh();
        self.reload()
    }

    // -- Surface input --

    /// Handle one message posted on the bridge channel.
    pub fn receive_script_message(&mut self, body: &Value) -> Result<()> {
        match self.bridge.receive(body) {
            None => Ok(()),
            Some(Dispatch::Web(event)) => self.handle_web_event(event),
            Some(Dispatch::PageLoaded {
                listener,
                restoration_identifier,
            }) => {
                self.with_visit(listener, |v, bridge| {
                    v.page_loaded(bridge, restoration_identifier)
                });
                Ok(())
            }
            Some(Dispatch::Visit { listener, event }) => {
                self.with_visit(listener, |v, bridge| v.handle_visit_event(bridge, &event));
                Ok(())
            }
        }
    }

    pub fn evaluation_finished(&mut self, id: EvaluationId, outcome: EvaluationOutcome) -> Result<()> {
        match self.bridge.evaluation_finished(id, outcome) {
            Some(event) => self.handle_web_event(event),
            None => Ok(()),
        }
    }

    /// Response-header policy for a native page load.
    pub fn decide_response_policy(
        &mut self,
        token: NavigationToken,
        response: &LoadResponse,
    ) -> LoadPolicy {
        let Some(current) = self.current else {
            return LoadPolicy::Allow;
        };
        self.with_visit(current, |v, bridge| {
            v.decide_response_policy(bridge, token, response)
        })
        .unwrap_or(LoadPolicy::Allow)
    }

    pub fn handle_load_event(&mut self, event: &LoadEvent) {
        if let Some(current) = self.current {
            self.with_visit(current, |v, bridge| v.handle_load_event(bridge, event));
        }
    }

    /// Policy for a navigation the surface wants to perform.
    ///
    /// While a cold boot owns the surface only link activations are stopped.
    /// Afterwards the embedded runtime handles navigation, so main-frame
    /// loads are canceled and link activations leave the app.
    pub fn decide_navigation_policy(&mut self, action: &NavigationAction) -> Result<LoadPolicy> {
        if self
            .current_visit()
            .is_some_and(|visit| visit.is_navigation_delegate())
        {
            if action.kind == NavigationKind::LinkActivated {
                self.open_external_url(action.url.clone());
                return Ok(LoadPolicy::Cancel);
            }
            return Ok(LoadPolicy::Allow);
        }

        let policy = if action.kind == NavigationKind::LinkActivated || action.main_frame {
            LoadPolicy::Cancel
        } else {
            LoadPolicy::Allow
        };

        if action.kind == NavigationKind::LinkActivated
            || (action.main_frame && action.kind == NavigationKind::Other)
        {
            self.open_external_url(action.url.clone());
        } else if action.main_frame && action.kind == NavigationKind::Reload {
            self.reload()?;
        }
        Ok(policy)
    }

    pub fn surface_process_did_terminate(&mut self) {
        warn!(session = %self.name, "rendering surface process terminated");
        self.events.push_back(SessionEvent::ProcessTerminated);
    }

    pub fn auth_challenge(&mut self, challenge: AuthChallenge) {
        debug!(session = %self.name, host = %challenge.host, "authentication challenge");
        self.events.push_back(SessionEvent::AuthChallenge(challenge));
    }

    pub fn resolve_auth_challenge(&mut self, id: u64, disposition: AuthDisposition) {
        self.bridge
            .surface_mut()
            .resolve_auth_challenge(id, disposition);
    }

    /// Copy the surface's cookies for the page it shows into the shared store.
    pub fn sync_cookies(&mut self) {
        if let Some(location) = self.bridge.surface().current_location() {
            self.bridge.surface_mut().sync_cookies(&location);
        }
    }

    /// When the in-flight cold boot gives up waiting for the embedded runtime.
    pub fn page_load_deadline(&self) -> Option<Instant> {
        let (id, at) = self.page_load_deadline?;
        (self.current == Some(id) && self.state_of(id) == Some(VisitState::Started)).then_some(at)
    }

    pub fn page_load_timed_out(&mut self, now: Instant) -> Result<()> {
        match self.page_load_deadline() {
            Some(at) if now >= at => {
                self.page_load_deadline = None;
                warn!(session = %self.name, "embedded runtime did not report the page as loaded");
                self.fail_initial_load(VisitError::PageLoadFailure)
            }
            _ => Ok(()),
        }
    }

    // -- Web events --

    fn handle_web_event(&mut self, event: WebEvent) -> Result<()> {
        match event {
            WebEvent::VisitProposed { location, options } => {
                let properties = self.properties.properties(&location);
                debug!(session = %self.name, %location, "visit proposed");
                self.events.push_back(SessionEvent::ProposedVisit(VisitProposal::new(
                    location, options, properties,
                )));
                Ok(())
            }
            WebEvent::PageInvalidated => {
                let Some(visitable) = self.topmost_visitable() else {
                    return Ok(());
                };
                visitable.update_snapshot();
                visitable.show_snapshot();
                visitable.show_spinner();
                self.reload()
            }
            WebEvent::EvaluationFailed(reason) => self.evaluation_failed(&reason),
            WebEvent::InitialLoadFailed(error) => self.fail_initial_load(error),
            WebEvent::FormSubmissionStarted(location) => {
                self.events
                    .push_back(SessionEvent::FormSubmissionStarted(location));
                Ok(())
            }
            WebEvent::FormSubmissionFinished(location) => {
                self.events
                    .push_back(SessionEvent::FormSubmissionFinished(location));
                Ok(())
            }
        }
    }

    /// In-page script state can no longer be trusted: cold-boot the current
    /// visitable again, whatever state its visit reached.
    fn evaluation_failed(&mut self, reason: &str) -> Result<()> {
        let Some(current) = self.current else {
            return Ok(());
        };
        if !self.initialized {
            return Ok(());
        }
        let Some(visitable) = self.visitable_of(Some(current)) else {
            return Ok(());
        };

        warn!(session = %self.name, %reason, "script evaluation failed; cold booting");
        self.initialized = false;
        self.with_visit(current, |v, bridge| v.cancel(bridge))
            .transpose()?;
        self.visit(visitable, None, false)?;
        Ok(())
    }

    fn fail_initial_load(&mut self, error: VisitError) -> Result<()> {
        let Some(current) = self.current else {
            return Ok(());
        };
        if self.initialized {
            return Ok(());
        }
        let Some(visitable) = self.visitable_of(Some(current)) else {
            return Ok(());
        };

        self.initialized = false;
        self.with_visit(current, |v, bridge| v.cancel(bridge))
            .transpose()?;
        self.show_failure(visitable.as_ref());
        self.events
            .push_back(SessionEvent::RequestFailed { visitable, error });
        Ok(())
    }

    fn open_external_url(&mut self, url: Url) {
        debug!(session = %self.name, %url, "open external URL");
        self.events.push_back(SessionEvent::OpenExternalUrl(url));
    }

    // -- Visit notifications --

    /// Run `f` against a visit, then apply the notifications it raised.
    fn with_visit<T>(
        &mut self,
        id: VisitId,
        f: impl FnOnce(&mut Visit, &mut ScriptBridge) -> T,
    ) -> Option<T> {
        let Some(visit) = self.visits.get_mut(&id) else {
            trace!(session = %self.name, visit = %id, "no such visit");
            return None;
        };
        let output = f(visit, &mut self.bridge);
        let notifications = visit.take_notifications();
        for notification in notifications {
            self.apply(id, notification);
        }
        Some(output)
    }

    fn apply(&mut self, id: VisitId, notification: VisitNotification) {
        let Some(visit) = self.visits.get(&id) else {
            return;
        };
        let visitable = Rc::clone(visit.visitable());
        let has_cached_snapshot = visit.has_cached_snapshot();
        let is_page_refresh = visit.is_page_refresh();
        let restoration_identifier = visit.restoration_identifier().map(str::to_string);
        trace!(session = %self.name, visit = %id, ?notification);

        match notification {
            VisitNotification::WillStart => {
                if !is_page_refresh {
                    visitable.show_snapshot();
                    self.activate(&visitable);
                }
            }
            VisitNotification::DidStart => {
                if !has_cached_snapshot && !is_page_refresh {
                    visitable.show_spinner();
                }
            }
            VisitNotification::RequestDidStart => {
                self.events.push_back(SessionEvent::RequestStarted);
            }
            VisitNotification::RequestDidFinish => {
                self.events.push_back(SessionEvent::RequestFinished);
            }
            VisitNotification::RequestDidFail(error) => {
                self.events
                    .push_back(SessionEvent::RequestFailed { visitable, error });
            }
            VisitNotification::WillLoadResponse => {
                visitable.update_snapshot();
                visitable.show_snapshot();
            }
            VisitNotification::DidRender => {
                visitable.hide_snapshot();
                visitable.hide_spinner();
                visitable.did_render();
            }
            VisitNotification::DidComplete => {
                if let Some(restoration_identifier) = restoration_identifier {
                    self.restoration_identifiers
                        .insert(visitable.screen_id(), restoration_identifier);
                }
            }
            VisitNotification::DidFail => self.show_failure(visitable.as_ref()),
            VisitNotification::DidFinish => {
                if self.refreshing {
                    self.refreshing = false;
                    visitable.did_refresh();
                }
            }
            VisitNotification::DidInitializeSurface => {
                self.initialized = true;
                info!(session = %self.name, "surface initialized");
                self.events.push_back(SessionEvent::SurfaceLoaded);
            }
        }
    }

    fn show_failure(&self, visitable: &dyn Visitable) {
        visitable.clear_snapshot();
        visitable.show_snapshot();
        visitable.hide_spinner();
    }

    fn complete_navigation_for_current(&mut self) {
        if let Some(current) = self.current {
            self.topmost = Some(current);
        }
    }

    // -- Surface ownership --

    fn activate(&mut self, visitable: &Rc<dyn Visitable>) {
        if self.is_activated(visitable.as_ref()) {
            return;
        }
        if let Some(active) = self.activated.clone() {
            self.deactivate(&active, true);
        }
        visitable.activate_surface(self.bridge.surface().handle());
        self.activated = Some(Rc::clone(visitable));
    }

    fn deactivate(&mut self, visitable: &Rc<dyn Visitable>, show_snapshot: bool) {
        if !self.is_activated(visitable.as_ref()) {
            return;
        }
        if show_snapshot {
            visitable.update_snapshot();
            visitable.show_snapshot();
        }
        visitable.deactivate_surface();
        self.activated = None;
    }

    fn is_activated(&self, visitable: &dyn Visitable) -> bool {
        self.activated
            .as_ref()
            .is_some_and(|active| same(active.as_ref(), visitable))
    }

    // -- Bookkeeping --

    fn visitable_of(&self, id: Option<VisitId>) -> Option<Rc<dyn Visitable>> {
        id.and_then(|id| self.visits.get(&id))
            .map(|visit| Rc::clone(visit.visitable()))
    }

    fn state_of(&self, id: VisitId) -> Option<VisitState> {
        self.visits.get(&id).map(Visit::state)
    }

    fn is_target(&self, id: Option<VisitId>, visitable: &Rc<dyn Visitable>) -> bool {
        self.visitable_of(id)
            .is_some_and(|target| same(target.as_ref(), visitable.as_ref()))
    }

    /// Drop visits nothing refers to any more.
    fn prune(&mut self) {
        let keep = [
            self.current,
            self.topmost,
            self.previous,
            self.bridge.visit_listener(),
            self.bridge.page_load_listener(),
        ];
        self.visits.retain(|id, _| keep.contains(&Some(*id)));
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("initialized", &self.initialized)
            .field("current", &self.current_visit())
            .field("topmost", &self.topmost_visit())
            .field("pending_events", &self.events.len())
            .finish()
    }
}
