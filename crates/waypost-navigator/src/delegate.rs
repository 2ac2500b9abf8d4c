// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pluggable decisions and factories the navigator consults.

use std::rc::Rc;

use url::Url;

use waypost_bridge::{AuthChallenge, AuthDisposition, RenderingSurface, Visitable};
use waypost_core::{VisitError, VisitProposal};

use crate::screen::Screen;

/// How to place a proposed visit.
#[derive(Debug, Clone)]
pub enum ProposalResult {
    /// Build the default web screen for the proposal.
    Accept,
    AcceptCustom(Screen),
    Reject,
}

/// What to do with a URL outside the app's hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExternalUrlAction {
    /// Only http and https URLs can be shown in the in-app browser; others
    /// are dropped.
    #[default]
    OpenInAppBrowser,
    OpenViaSystem,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureResolution {
    /// Cold-boot the failed session again.
    Retry,
    #[default]
    Ignore,
}

/// Application hooks. Every method has a default.
pub trait NavigatorDelegate {
    fn handle_proposal(&mut self, _proposal: &VisitProposal) -> ProposalResult {
        ProposalResult::Accept
    }

    fn handle_external_url(&mut self, _url: &Url) -> ExternalUrlAction {
        ExternalUrlAction::default()
    }

    fn visitable_did_fail_request(
        &mut self,
        _visitable: &Rc<dyn Visitable>,
        _error: &VisitError,
    ) -> FailureResolution {
        FailureResolution::default()
    }

    fn handle_auth_challenge(&mut self, _challenge: &AuthChallenge) -> AuthDisposition {
        AuthDisposition::default()
    }

    /// `url` is the location of the topmost screen of the submitting session.
    fn form_submission_did_start(&mut self, _url: &Url) {}

    fn form_submission_did_finish(&mut self, _url: &Url) {}
}

/// Accepts every proposal and takes every default.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNavigatorDelegate;

impl NavigatorDelegate for DefaultNavigatorDelegate {}

/// Builds the web screen for an accepted proposal.
pub trait ScreenFactory {
    fn web_screen(&self, proposal: &VisitProposal) -> Rc<dyn Visitable>;
}

/// Builds rendering surfaces, used for the initial sessions and whenever a
/// session has to be recreated after its process died.
pub trait SurfaceFactory {
    fn make_surface(&self) -> Box<dyn RenderingSurface>;
}
