// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The visit state machine.
//
// A visit is one navigation lifecycle on a session's surface. It comes in two
// forms: a cold boot (a real page load) and a scripted visit (an incremental
// navigation performed by the embedded runtime). Both share the transitions
// below; each supplies its own start/cancel/complete/fail hooks.
//
//   Initialized --start--> Started --cancel---> Canceled
//                                  --complete-> Completed
//                                  --fail-----> Failed
//
// Visits never call back into their session. They queue notifications that
// the session drains and applies after each call.

use std::rc::Rc;

use tracing::{debug, trace, warn};
use url::Url;

use waypost_bridge::{
    LoadEvent, LoadPolicy, LoadResponse, NavigationToken, ScriptBridge, VisitEvent, Visitable,
};
use waypost_core::error::Result;
use waypost_core::{VisitError, VisitId, VisitOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    Initialized,
    Started,
    Canceled,
    Failed,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitKind {
    ColdBoot,
    Scripted,
}

/// Lifecycle notifications a visit raises for its session, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitNotification {
    WillStart,
    DidStart,
    RequestDidStart,
    RequestDidFail(VisitError),
    RequestDidFinish,
    WillLoadResponse,
    DidRender,
    DidComplete,
    DidFail,
    DidFinish,
    /// A cold boot completed: the embedded runtime is now running.
    DidInitializeSurface,
}

#[derive(Debug)]
enum Strategy {
    ColdBoot {
        navigation: Option<NavigationToken>,
        /// Whether this visit still receives the surface's load events.
        owns_navigation: bool,
    },
    Scripted {
        /// Assigned by the embedded runtime in `visitStarted`.
        identifier: Option<String>,
    },
}

pub struct Visit {
    id: VisitId,
    visitable: Rc<dyn Visitable>,
    location: Url,
    options: VisitOptions,
    state: VisitState,
    has_cached_snapshot: bool,
    is_page_refresh: bool,
    restoration_identifier: Option<String>,
    request_started: bool,
    request_finished: bool,
    error: Option<VisitError>,
    strategy: Strategy,
    outbox: Vec<VisitNotification>,
}

impl Visit {
    pub fn cold_boot(
        id: VisitId,
        visitable: Rc<dyn Visitable>,
        location: Url,
        options: VisitOptions,
        is_page_refresh: bool,
    ) -> Self {
        Self::with_strategy(
            id,
            visitable,
            location,
            options,
            is_page_refresh,
            None,
            Strategy::ColdBoot {
                navigation: None,
                owns_navigation: false,
            },
        )
    }

    pub fn scripted(
        id: VisitId,
        visitable: Rc<dyn Visitable>,
        location: Url,
        options: VisitOptions,
        is_page_refresh: bool,
        restoration_identifier: Option<String>,
    ) -> Self {
        Self::with_strategy(
            id,
            visitable,
            location,
            options,
            is_page_refresh,
            restoration_identifier,
            Strategy::Scripted { identifier: None },
        )
    }

    fn with_strategy(
        id: VisitId,
        visitable: Rc<dyn Visitable>,
        location: Url,
        options: VisitOptions,
        is_page_refresh: bool,
        restoration_identifier: Option<String>,
        strategy: Strategy,
    ) -> Self {
        Self {
            id,
            visitable,
            location,
            options,
            state: VisitState::Initialized,
            has_cached_snapshot: false,
            is_page_refresh,
            restoration_identifier,
            request_started: false,
            request_finished: false,
            error: None,
            strategy,
            outbox: Vec::new(),
        }
    }

    // -- Accessors --

    pub fn id(&self) -> VisitId {
        self.id
    }

    pub fn visitable(&self) -> &Rc<dyn Visitable> {
        &self.visitable
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn options(&self) -> &VisitOptions {
        &self.options
    }

    pub fn state(&self) -> VisitState {
        self.state
    }

    pub fn kind(&self) -> VisitKind {
        match self.strategy {
            Strategy::ColdBoot { .. } => VisitKind::ColdBoot,
            Strategy::Scripted { .. } => VisitKind::Scripted,
        }
    }

    pub fn has_cached_snapshot(&self) -> bool {
        self.has_cached_snapshot
    }

    /// A `replace` visit to the location the surface already shows.
    pub fn is_page_refresh(&self) -> bool {
        self.is_page_refresh
    }

    pub fn restoration_identifier(&self) -> Option<&str> {
        self.restoration_identifier.as_deref()
    }

    /// The runtime-assigned identifier of a scripted visit.
    pub fn identifier(&self) -> Option<&str> {
        match &self.strategy {
            Strategy::Scripted { identifier } => identifier.as_deref(),
            Strategy::ColdBoot { .. } => None,
        }
    }

    pub fn error(&self) -> Option<VisitError> {
        self.error
    }

    pub fn request_started(&self) -> bool {
        self.request_started
    }

    pub fn request_finished(&self) -> bool {
        self.request_finished
    }

    /// Whether this cold boot still handles load events tagged `token`.
    pub fn owns_navigation(&self, token: NavigationToken) -> bool {
        matches!(
            self.strategy,
            Strategy::ColdBoot { navigation: Some(current), owns_navigation: true } if current == token
        )
    }

    /// Whether this cold boot is still the surface's navigation delegate.
    pub fn is_navigation_delegate(&self) -> bool {
        matches!(
            self.strategy,
            Strategy::ColdBoot {
                owns_navigation: true,
                ..
            }
        )
    }

    pub fn take_notifications(&mut self) -> Vec<VisitNotification> {
        std::mem::take(&mut self.outbox)
    }

    // -- Transitions --

    pub fn start(&mut self, bridge: &mut ScriptBridge) -> Result<()> {
        if self.state != VisitState::Initialized {
            return Ok(());
        }

        self.notify(VisitNotification::WillStart);
        self.state = VisitState::Started;

        match self.kind() {
            VisitKind::ColdBoot => {
                self.start_cold_boot(bridge);
                Ok(())
            }
            VisitKind::Scripted => self.start_scripted(bridge),
        }
    }

    pub fn cancel(&mut self, bridge: &mut ScriptBridge) -> Result<()> {
        if self.state != VisitState::Started {
            return Ok(());
        }

        self.state = VisitState::Canceled;
        debug!(visit = %self.id, location = %self.location, kind = ?self.kind(), "visit canceled");

        let result = match self.kind() {
            VisitKind::ColdBoot => {
                self.release_navigation(bridge);
                bridge.surface_mut().stop_loading();
                Ok(())
            }
            VisitKind::Scripted => match self.identifier().map(str::to_string) {
                Some(identifier) => bridge.cancel_visit(&identifier).map(|_| ()),
                // The runtime never started it; there is nothing to cancel there.
                None => Ok(()),
            },
        };
        self.finish_request();
        result
    }

    fn complete(&mut self, bridge: &mut ScriptBridge) {
        if self.state != VisitState::Started {
            return;
        }

        if !self.request_finished {
            self.finish_request();
        }

        self.state = VisitState::Completed;
        debug!(visit = %self.id, location = %self.location, "visit completed");

        if self.kind() == VisitKind::ColdBoot {
            self.release_navigation(bridge);
            self.notify(VisitNotification::DidInitializeSurface);
        }
        self.notify(VisitNotification::DidComplete);
        self.notify(VisitNotification::DidFinish);
    }

    pub fn fail(&mut self, bridge: &mut ScriptBridge, error: VisitError) {
        if self.state != VisitState::Started {
            return;
        }

        self.state = VisitState::Failed;
        self.error = Some(error);
        warn!(visit = %self.id, location = %self.location, %error, "visit failed");

        self.notify(VisitNotification::RequestDidFail(error));
        if self.kind() == VisitKind::ColdBoot {
            self.release_navigation(bridge);
        }
        self.finish_request();
        self.notify(VisitNotification::DidFail);
        self.notify(VisitNotification::DidFinish);
    }

    /// Ask the runtime to cache a snapshot of what this visit shows.
    pub fn cache_snapshot(&self, bridge: &mut ScriptBridge) -> Result<()> {
        bridge.cache_snapshot().map(|_| ())
    }

    // -- Request sub-state --

    fn start_request(&mut self) {
        if self.request_started {
            return;
        }
        self.request_started = true;
        self.notify(VisitNotification::RequestDidStart);
    }

    fn finish_request(&mut self) {
        if !self.request_started || self.request_finished {
            return;
        }
        self.request_finished = true;
        self.notify(VisitNotification::RequestDidFinish);
    }

    // -- Cold boot --

    fn start_cold_boot(&mut self, bridge: &mut ScriptBridge) {
        debug!(visit = %self.id, location = %self.location, "cold boot");
        bridge.set_page_load_listener(Some(self.id));

        let token = match self.options.successful_body() {
            Some(body) => bridge.surface_mut().load_html(body, &self.location),
            None => bridge.surface_mut().load_request(&self.location),
        };
        self.strategy = Strategy::ColdBoot {
            navigation: Some(token),
            owns_navigation: true,
        };

        self.notify(VisitNotification::DidStart);
        self.start_request();
    }

    fn release_navigation(&mut self, bridge: &mut ScriptBridge) {
        if let Strategy::ColdBoot {
            owns_navigation, ..
        } = &mut self.strategy
        {
            *owns_navigation = false;
        }
        bridge.release_page_load_listener(self.id);
    }

    /// Validate the response headers of this cold boot's page load.
    pub fn decide_response_policy(
        &mut self,
        bridge: &mut ScriptBridge,
        token: NavigationToken,
        response: &LoadResponse,
    ) -> LoadPolicy {
        if !self.owns_navigation(token) {
            return LoadPolicy::Allow;
        }

        match response {
            LoadResponse::Http { status_code } if (200..300).contains(status_code) => {
                LoadPolicy::Allow
            }
            LoadResponse::Http { status_code } => {
                self.fail(bridge, VisitError::Http(*status_code));
                LoadPolicy::Cancel
            }
            other if other.is_opaque_stream() => LoadPolicy::Allow,
            LoadResponse::Other { .. } => {
                self.fail(bridge, VisitError::from_status_code(0));
                LoadPolicy::Cancel
            }
        }
    }

    pub fn handle_load_event(&mut self, bridge: &mut ScriptBridge, event: &LoadEvent) {
        if !self.owns_navigation(event.token()) {
            trace!(visit = %self.id, token = ?event.token(), "ignoring stale load event");
            return;
        }

        match event {
            LoadEvent::Finished { .. } => self.finish_request(),
            LoadEvent::Failed { description, .. } => {
                debug!(visit = %self.id, %description, "page load failed");
                self.fail(bridge, VisitError::Network);
            }
        }
    }

    /// The embedded runtime registered itself on the cold-booted page.
    pub fn page_loaded(&mut self, bridge: &mut ScriptBridge, restoration_identifier: String) {
        if self.kind() != VisitKind::ColdBoot || self.state != VisitState::Started {
            return;
        }

        self.restoration_identifier = Some(restoration_identifier);
        self.notify(VisitNotification::DidRender);
        self.complete(bridge);
    }

    // -- Scripted --

    fn start_scripted(&mut self, bridge: &mut ScriptBridge) -> Result<()> {
        debug!(visit = %self.id, location = %self.location, action = ?self.options.action, "scripted visit");
        bridge.set_visit_listener(Some(self.id));
        bridge
            .visit_location(
                &self.location,
                &self.options,
                self.restoration_identifier.as_deref(),
            )
            .map(|_| ())
    }

    /// Apply one identifier-tagged event from the embedded runtime.
    pub fn handle_visit_event(&mut self, bridge: &mut ScriptBridge, event: &VisitEvent) {
        let tracked = match &self.strategy {
            Strategy::Scripted { identifier } => identifier.clone(),
            Strategy::ColdBoot { .. } => return,
        };

        if let VisitEvent::Started {
            identifier,
            has_cached_snapshot,
        } = event
        {
            if self.state != VisitState::Started {
                trace!(visit = %self.id, %identifier, "ignoring visitStarted for a finished visit");
                return;
            }
            // A late event from a canceled visit can arrive first; the
            // latest identifier wins.
            if let Some(previous) = &tracked {
                debug!(visit = %self.id, %previous, %identifier, "visit identifier replaced");
            }
            self.strategy = Strategy::Scripted {
                identifier: Some(identifier.clone()),
            };
            self.has_cached_snapshot = *has_cached_snapshot;
            if tracked.is_none() {
                self.notify(VisitNotification::DidStart);
            }
            return;
        }

        if tracked.as_deref() != Some(event.identifier()) {
            trace!(
                visit = %self.id,
                tracked = ?tracked,
                received = event.identifier(),
                "ignoring event for another visit"
            );
            return;
        }

        match event {
            VisitEvent::Started { .. } => {}
            VisitEvent::RequestStarted { .. } => self.start_request(),
            VisitEvent::RequestCompleted { .. } => {
                if self.has_cached_snapshot {
                    self.notify(VisitNotification::WillLoadResponse);
                }
            }
            VisitEvent::RequestFailed { status_code, .. } => {
                self.fail(bridge, VisitError::from_status_code(*status_code));
            }
            VisitEvent::RequestFinished { .. } => self.finish_request(),
            VisitEvent::Rendered { .. } => self.notify(VisitNotification::DidRender),
            VisitEvent::Completed {
                restoration_identifier,
                ..
            } => {
                self.restoration_identifier = Some(restoration_identifier.clone());
                self.complete(bridge);
            }
        }
    }

    fn notify(&mut self, notification: VisitNotification) {
        self.outbox.push(notification);
    }
}

impl std::fmt::Debug for Visit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visit")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("identifier", &self.identifier())
            .field("state", &self.state)
            .field("location", &self.location.as_str())
            .field("screen", &self.visitable.screen_id())
            .finish()
    }
}
