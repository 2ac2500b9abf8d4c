// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event loop that owns a navigator on a single task.
//
// Platform callbacks (script messages, evaluation results, native load
// events, screen lifecycle) arrive on an unbounded channel and are applied
// one at a time. The loop also sleeps until the earliest page-load deadline
// so a cold boot the embedded runtime never answers still fails.
//
// The navigator is not `Send`; run the loop on a current-thread runtime or a
// `LocalSet`.

use std::rc::Rc;

use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};
use url::Url;

use waypost_bridge::{
    AuthChallenge, EvaluationId, EvaluationOutcome, LoadEvent, LoadPolicy, LoadResponse,
    NavigationAction, NavigationToken, Visitable,
};
use waypost_core::{Result, VisitProposal};

use crate::hierarchy::StackKind;
use crate::navigator::{Lifecycle, Navigator};

pub enum NavigatorEvent {
    Route(Url),
    Propose(VisitProposal),
    ScriptMessage {
        stack: StackKind,
        body: Value,
    },
    EvaluationFinished {
        stack: StackKind,
        id: EvaluationId,
        outcome: EvaluationOutcome,
    },
    ResponsePolicy {
        stack: StackKind,
        token: NavigationToken,
        response: LoadResponse,
        reply: oneshot::Sender<LoadPolicy>,
    },
    NavigationPolicy {
        stack: StackKind,
        action: NavigationAction,
        reply: oneshot::Sender<LoadPolicy>,
    },
    Load {
        stack: StackKind,
        event: LoadEvent,
    },
    Lifecycle {
        stack: StackKind,
        visitable: Rc<dyn Visitable>,
        phase: Lifecycle,
    },
    ProcessTerminated {
        stack: StackKind,
    },
    AuthChallenge {
        stack: StackKind,
        challenge: AuthChallenge,
    },
    AppDidBecomeActive,
    AppDidEnterBackground,
}

impl NavigatorEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Route(_) => "route",
            Self::Propose(_) => "propose",
            Self::ScriptMessage { .. } => "script_message",
            Self::EvaluationFinished { .. } => "evaluation_finished",
            Self::ResponsePolicy { .. } => "response_policy",
            Self::NavigationPolicy { .. } => "navigation_policy",
            Self::Load { .. } => "load",
            Self::Lifecycle { .. } => "lifecycle",
            Self::ProcessTerminated { .. } => "process_terminated",
            Self::AuthChallenge { .. } => "auth_challenge",
            Self::AppDidBecomeActive => "app_did_become_active",
            Self::AppDidEnterBackground => "app_did_enter_background",
        }
    }
}

impl std::fmt::Debug for NavigatorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NavigatorEvent").field(&self.name()).finish()
    }
}

/// Apply events until every sender is dropped, then hand the navigator back.
pub async fn run(
    mut navigator: Navigator,
    mut events: UnboundedReceiver<NavigatorEvent>,
) -> Navigator {
    loop {
        let deadline = navigator.page_load_deadline();
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    debug!("navigator event channel closed");
                    break;
                };
                let name = event.name();
                if let Err(e) = dispatch(&mut navigator, event) {
                    warn!(event = name, error = %e, "navigator event failed");
                }
            }

            _ = wait_for(deadline) => {
                if let Err(e) = navigator.page_load_timed_out(Instant::now()) {
                    warn!(error = %e, "page load timeout handling failed");
                }
            }
        }
    }
    navigator
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Apply one event.
pub fn dispatch(navigator: &mut Navigator, event: NavigatorEvent) -> Result<()> {
    match event {
        NavigatorEvent::Route(url) => navigator.route_url(url),
        NavigatorEvent::Propose(proposal) => navigator.route(proposal),
        NavigatorEvent::ScriptMessage { stack, body } => {
            navigator.receive_script_message(stack, &body)
        }
        NavigatorEvent::EvaluationFinished { stack, id, outcome } => {
            navigator.evaluation_finished(stack, id, outcome)
        }
        NavigatorEvent::ResponsePolicy {
            stack,
            token,
            response,
            reply,
        } => {
            let policy = navigator.decide_response_policy(stack, token, &response)?;
            answer(reply, policy);
            Ok(())
        }
        NavigatorEvent::NavigationPolicy {
            stack,
            action,
            reply,
        } => {
            let policy = navigator.decide_navigation_policy(stack, &action)?;
            answer(reply, policy);
            Ok(())
        }
        NavigatorEvent::Load { stack, event } => navigator.handle_load_event(stack, &event),
        NavigatorEvent::Lifecycle {
            stack,
            visitable,
            phase,
        } => navigator.lifecycle(stack, &visitable, phase),
        NavigatorEvent::ProcessTerminated { stack } => {
            navigator.surface_process_did_terminate(stack)
        }
        NavigatorEvent::AuthChallenge { stack, challenge } => {
            navigator.auth_challenge(stack, challenge)
        }
        NavigatorEvent::AppDidBecomeActive => navigator.app_did_become_active(),
        NavigatorEvent::AppDidEnterBackground => {
            navigator.app_did_enter_background();
            Ok(())
        }
    }
}

fn answer(reply: oneshot::Sender<LoadPolicy>, policy: LoadPolicy) {
    if reply.send(policy).is_err() {
        debug!(?policy, "policy requester went away");
    }
}
