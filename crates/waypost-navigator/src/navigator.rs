// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Navigator — owns the main and modal sessions and the hierarchy.
//
// Every entry point forwards to the owning session or the hierarchy and then
// drains the events the sessions queued, so session decisions (proposals,
// failures, process loss) are handled before control returns.

use std::rc::Rc;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

use waypost_bridge::{
    AuthChallenge, EvaluationId, EvaluationOutcome, LoadEvent, LoadPolicy, LoadResponse,
    NavigationAction, NavigationToken, ProcessState, Visitable,
};
use waypost_core::{
    NavigatorConfig, PropertiesSource, Result, ScreenId, VisitAction, VisitOptions, VisitProposal,
};
use waypost_session::{Session, SessionEvent, VisitOptionsHandler};

use crate::delegate::{
    DefaultNavigatorDelegate, ExternalUrlAction, FailureResolution, NavigatorDelegate,
    ProposalResult, ScreenFactory, SurfaceFactory,
};
use crate::hierarchy::{HierarchyDelegate, NavigationHierarchy, NavigationHost, StackKind};
use crate::screen::Screen;

/// Appearance and gesture callbacks a visitable screen reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    WillAppear { moving_to_parent: bool },
    DidAppear,
    WillDisappear,
    DidDisappear,
    RequestReload,
    RequestRefresh,
}

/// The two sessions, addressed by the stack they serve.
pub struct Sessions {
    main: Session,
    modal: Session,
}

impl Sessions {
    pub fn get(&self, stack: StackKind) -> &Session {
        match stack {
            StackKind::Main => &self.main,
            StackKind::Modal => &self.modal,
        }
    }

    pub fn get_mut(&mut self, stack: StackKind) -> &mut Session {
        match stack {
            StackKind::Main => &mut self.main,
            StackKind::Modal => &mut self.modal,
        }
    }

    fn replace(&mut self, stack: StackKind, session: Session) {
        *self.get_mut(stack) = session;
    }
}

impl HierarchyDelegate for Sessions {
    fn visit(
        &mut self,
        visitable: Rc<dyn Visitable>,
        stack: StackKind,
        options: VisitOptions,
    ) -> Result<()> {
        self.get_mut(stack)
            .visit(visitable, Some(options), false)
            .map(|_| ())
    }

    fn refresh(&mut self, stack: StackKind) -> Result<()> {
        self.get_mut(stack).reload()
    }

    fn screens_discarded(&mut self, stack: StackKind, screens: Vec<ScreenId>) {
        let session = self.get_mut(stack);
        for screen in screens {
            session.forget_screen(screen);
        }
    }
}

pub struct Navigator {
    config: NavigatorConfig,
    sessions: Sessions,
    hierarchy: NavigationHierarchy,
    delegate: Box<dyn NavigatorDelegate>,
    screens: Box<dyn ScreenFactory>,
    surfaces: Box<dyn SurfaceFactory>,
    properties: Rc<dyn PropertiesSource>,
    options_handler: VisitOptionsHandler,
    in_background: bool,
    /// Sessions whose process died while the app was in the background.
    reload_on_active: Vec<StackKind>,
}

impl Navigator {
    pub fn new(
        config: NavigatorConfig,
        host: Box<dyn NavigationHost>,
        screens: Box<dyn ScreenFactory>,
        surfaces: Box<dyn SurfaceFactory>,
        properties: Rc<dyn PropertiesSource>,
    ) -> Self {
        let sessions = Sessions {
            main: Session::new(
                StackKind::Main.name(),
                surfaces.make_surface(),
                &config,
                Rc::clone(&properties),
            ),
            modal: Session::new(
                StackKind::Modal.name(),
                surfaces.make_surface(),
                &config,
                Rc::clone(&properties),
            ),
        };
        Self {
            config,
            sessions,
            hierarchy: NavigationHierarchy::new(host),
            delegate: Box::new(DefaultNavigatorDelegate),
            screens,
            surfaces,
            properties,
            options_handler: VisitOptionsHandler::new(),
            in_background: false,
            reload_on_active: Vec::new(),
        }
    }

    pub fn with_delegate(mut self, delegate: Box<dyn NavigatorDelegate>) -> Self {
        self.delegate = delegate;
        self
    }

    // -- Accessors --

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn session(&self, stack: StackKind) -> &Session {
        self.sessions.get(stack)
    }

    pub fn session_mut(&mut self, stack: StackKind) -> &mut Session {
        self.sessions.get_mut(stack)
    }

    pub fn hierarchy(&self) -> &NavigationHierarchy {
        &self.hierarchy
    }

    pub fn is_in_background(&self) -> bool {
        self.in_background
    }

    // -- Routing --

    /// Route `url` with an advance action and the rules engine's properties.
    pub fn route_url(&mut self, url: Url) -> Result<()> {
        let properties = self.properties.properties(&url);
        self.route(VisitProposal::new(
            url,
            VisitOptions::new(VisitAction::Advance),
            properties,
        ))
    }

    pub fn route(&mut self, proposal: VisitProposal) -> Result<()> {
        self.route_proposal(proposal)?;
        self.pump()
    }

    #[instrument(skip_all, fields(url = %proposal.url))]
    fn route_proposal(&mut self, proposal: VisitProposal) -> Result<()> {
        if self.config.is_external(&proposal.url) {
            self.open_external(&proposal.url);
            return Ok(());
        }

        let screen = match self.delegate.handle_proposal(&proposal) {
            ProposalResult::Accept => Screen::Web(self.screens.web_screen(&proposal)),
            ProposalResult::AcceptCustom(screen) => screen,
            ProposalResult::Reject => {
                debug!("proposal rejected");
                return Ok(());
            }
        };
        self.hierarchy.route(screen, &proposal, &mut self.sessions)
    }

    /// Hand an off-domain URL to the delegate's external policy.
    pub fn open_external(&mut self, url: &Url) {
        match self.delegate.handle_external_url(url) {
            ExternalUrlAction::OpenInAppBrowser => {
                if matches!(url.scheme(), "http" | "https") {
                    info!(%url, "opening in app browser");
                    self.hierarchy.host_mut().open_in_app_browser(url);
                } else {
                    warn!(%url, "in-app browser only supports http and https");
                }
            }
            ExternalUrlAction::OpenViaSystem => {
                info!(%url, "opening via system");
                self.hierarchy.host_mut().open_via_system(url);
            }
            ExternalUrlAction::Reject => debug!(%url, "external url rejected"),
        }
    }

    // -- App lifecycle --

    pub fn app_did_enter_background(&mut self) {
        self.in_background = true;
    }

    /// Reload sessions that lost their process while backgrounded and
    /// recreate any other session whose process is gone.
    pub fn app_did_become_active(&mut self) -> Result<()> {
        self.in_background = false;
        for stack in StackKind::ALL {
            self.inspect(stack)?;
        }
        self.pump()
    }

    fn inspect(&mut self, stack: StackKind) -> Result<()> {
        if let Some(index) = self.reload_on_active.iter().position(|s| *s == stack) {
            self.reload_on_active.remove(index);
            info!(stack = stack.name(), "reloading session queued while in background");
            return self.sessions.get_mut(stack).reload();
        }

        let session = self.sessions.get(stack);
        let has_location = session
            .topmost_visitable()
            .and_then(|visitable| visitable.location())
            .is_some();
        if has_location && session.process_state() == ProcessState::Terminated {
            self.recreate(stack)?;
        }
        Ok(())
    }

    /// Replace the session and its surface, then route to the active location.
    fn recreate(&mut self, stack: StackKind) -> Result<()> {
        let Some(url) = self
            .sessions
            .get(stack)
            .active_visitable()
            .and_then(|visitable| visitable.location())
        else {
            return Ok(());
        };

        warn!(stack = stack.name(), %url, "recreating session after process loss");
        let session = Session::new(
            stack.name(),
            self.surfaces.make_surface(),
            &self.config,
            Rc::clone(&self.properties),
        );
        self.sessions.replace(stack, session);

        let properties = self.properties.properties(&url);
        self.route_proposal(VisitProposal::new(
            url,
            VisitOptions::new(VisitAction::Replace),
            properties,
        ))
    }

    // -- Screen lifecycle --

    pub fn lifecycle(
        &mut self,
        stack: StackKind,
        visitable: &Rc<dyn Visitable>,
        phase: Lifecycle,
    ) -> Result<()> {
        let session = self.sessions.get_mut(stack);
        match phase {
            Lifecycle::WillAppear { moving_to_parent } => {
                session.visitable_will_appear(visitable, moving_to_parent)?
            }
            Lifecycle::DidAppear => session.visitable_did_appear(visitable)?,
            Lifecycle::WillDisappear => session.visitable_will_disappear(visitable),
            Lifecycle::DidDisappear => session.visitable_did_disappear(visitable)?,
            Lifecycle::RequestReload => session.visitable_did_request_reload(visitable)?,
            Lifecycle::RequestRefresh => session.visitable_did_request_refresh(visitable)?,
        }
        self.pump()
    }

    // -- Surface input --

    pub fn receive_script_message(&mut self, stack: StackKind, body: &Value) -> Result<()> {
        self.sessions.get_mut(stack).receive_script_message(body)?;
        self.pump()
    }

    pub fn evaluation_finished(
        &mut self,
        stack: StackKind,
        id: EvaluationId,
        outcome: EvaluationOutcome,
    ) -> Result<()> {
        self.sessions
            .get_mut(stack)
            .evaluation_finished(id, outcome)?;
        self.pump()
    }

    pub fn decide_response_policy(
        &mut self,
        stack: StackKind,
        token: NavigationToken,
        response: &LoadResponse,
    ) -> Result<LoadPolicy> {
        let policy = self
            .sessions
            .get_mut(stack)
            .decide_response_policy(token, response);
        self.pump()?;
        Ok(policy)
    }

    pub fn handle_load_event(&mut self, stack: StackKind, event: &LoadEvent) -> Result<()> {
        self.sessions.get_mut(stack).handle_load_event(event);
        self.pump()
    }

    pub fn decide_navigation_policy(
        &mut self,
        stack: StackKind,
        action: &NavigationAction,
    ) -> Result<LoadPolicy> {
        let policy = self
            .sessions
            .get_mut(stack)
            .decide_navigation_policy(action)?;
        self.pump()?;
        Ok(policy)
    }

    pub fn surface_process_did_terminate(&mut self, stack: StackKind) -> Result<()> {
        self.sessions.get_mut(stack).surface_process_did_terminate();
        self.pump()
    }

    pub fn auth_challenge(&mut self, stack: StackKind, challenge: AuthChallenge) -> Result<()> {
        self.sessions.get_mut(stack).auth_challenge(challenge);
        self.pump()
    }

    /// Earliest page-load deadline across both sessions.
    pub fn page_load_deadline(&self) -> Option<Instant> {
        StackKind::ALL
            .into_iter()
            .filter_map(|stack| self.sessions.get(stack).page_load_deadline())
            .min()
    }

    pub fn page_load_timed_out(&mut self, now: Instant) -> Result<()> {
        for stack in StackKind::ALL {
            self.sessions.get_mut(stack).page_load_timed_out(now)?;
        }
        self.pump()
    }

    // -- Session events --

    /// Handle queued session events until both sessions are quiet.
    fn pump(&mut self) -> Result<()> {
        loop {
            let mut handled = false;
            for stack in StackKind::ALL {
                let events = self.sessions.get_mut(stack).take_events();
                for event in events {
                    handled = true;
                    self.handle_session_event(stack, event)?;
                }
            }
            if !handled {
                return Ok(());
            }
        }
    }

    fn handle_session_event(&mut self, stack: StackKind, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::ProposedVisit(mut proposal) => {
                proposal.options = self
                    .options_handler
                    .process(&proposal.url, proposal.options);
                self.route_proposal(proposal)?
            }
            SessionEvent::RequestStarted => debug!(stack = stack.name(), "request started"),
            SessionEvent::RequestFinished => self.sessions.get_mut(stack).sync_cookies(),
            SessionEvent::RequestFailed { visitable, error } => {
                warn!(stack = stack.name(), %error, "visit failed");
                match self.delegate.visitable_did_fail_request(&visitable, &error) {
                    FailureResolution::Retry => self.sessions.get_mut(stack).reload()?,
                    FailureResolution::Ignore => {}
                }
            }
            SessionEvent::SurfaceLoaded => debug!(stack = stack.name(), "surface loaded"),
            SessionEvent::OpenExternalUrl(url) => self.open_external(&url),
            SessionEvent::AuthChallenge(challenge) => {
                let disposition = self.delegate.handle_auth_challenge(&challenge);
                self.sessions
                    .get_mut(stack)
                    .resolve_auth_challenge(challenge.id, disposition);
            }
            SessionEvent::FormSubmissionStarted(_) => {
                if let Some(url) = self.topmost_location(stack) {
                    self.delegate.form_submission_did_start(&url);
                }
            }
            SessionEvent::FormSubmissionFinished(_) => {
                if stack == StackKind::Modal {
                    self.sessions
                        .get_mut(StackKind::Main)
                        .mark_snapshot_cache_as_stale();
                }
                if let Some(url) = self.topmost_location(stack) {
                    self.delegate.form_submission_did_finish(&url);
                }
            }
            SessionEvent::ProcessTerminated => self.reload_if_permitted(stack)?,
        }
        Ok(())
    }

    fn topmost_location(&self, stack: StackKind) -> Option<Url> {
        self.sessions
            .get(stack)
            .topmost_visitable()
            .and_then(|visitable| visitable.location())
    }

    /// Reload a session whose process died, unless its screen has left the
    /// hierarchy. While backgrounded the reload waits for the app to return.
    fn reload_if_permitted(&mut self, stack: StackKind) -> Result<()> {
        let Some(active) = self.sessions.get(stack).active_visitable() else {
            return Ok(());
        };
        if self.hierarchy.stack_of(active.screen_id()).is_none() {
            return Ok(());
        }
        if self.in_background {
            if !self.reload_on_active.contains(&stack) {
                self.reload_on_active.push(stack);
            }
            return Ok(());
        }
        self.sessions.get_mut(stack).reload()
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("hierarchy", &self.hierarchy)
            .field("in_background", &self.in_background)
            .field("reload_on_active", &self.reload_on_active)
            .finish()
    }
}
