// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Replays scenario steps against a headless navigator.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio::time::{Instant, sleep_until};
use tracing::{info, warn};
use url::Url;

use waypost_bridge::stub::SurfaceLog;
use waypost_bridge::{
    EvaluationId, LoadEvent, LoadPolicy, LoadResponse, NavigationAction, NavigationKind,
    NavigationToken, ProcessState, Visitable,
};
use waypost_core::{NavigatorConfig, VisitOptions, VisitProposal};
use waypost_navigator::driver::dispatch;
use waypost_navigator::headless::{
    HeadlessHost, HeadlessScreenFactory, HeadlessSurfaceFactory, HostLog,
};
use waypost_navigator::{Lifecycle, Navigator, NavigatorEvent, StackKind};

use crate::report::Report;
use crate::scenario::{PrefixRule, PrefixRules, Stack, Step};

pub struct Simulator {
    navigator: Navigator,
    host: Rc<RefCell<HostLog>>,
    screens: HeadlessScreenFactory,
    surfaces: HeadlessSurfaceFactory,
    policies: Vec<String>,
}

impl Simulator {
    pub fn new(config: NavigatorConfig, rules: Vec<PrefixRule>) -> Self {
        let host = HeadlessHost::new();
        let host_log = host.log();
        let screens = HeadlessScreenFactory::new();
        let surfaces = HeadlessSurfaceFactory::new();
        let navigator = Navigator::new(
            config,
            Box::new(host),
            Box::new(screens.clone()),
            Box::new(surfaces.clone()),
            Rc::new(PrefixRules(rules)),
        );
        Self {
            navigator,
            host: host_log,
            screens,
            surfaces,
            policies: Vec::new(),
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Replay every step. A failing step is logged and the rest still run.
    pub async fn run(&mut self, steps: Vec<Step>) {
        for (index, step) in steps.into_iter().enumerate() {
            if let Step::Wait { ms } = step {
                self.wait(Duration::from_millis(ms)).await;
                continue;
            }
            for event in self.events(index, step) {
                if let Err(e) = dispatch(&mut self.navigator, event.event) {
                    warn!(step = index, error = %e, "step failed");
                }
                if let Some((label, reply)) = event.reply {
                    self.record_policy(label, reply);
                }
            }
        }
    }

    pub fn report(&self) -> Report {
        Report::capture(&self.navigator, &self.host.borrow(), &self.policies)
    }

    /// Let time pass, firing page-load deadlines that fall inside the window.
    async fn wait(&mut self, duration: Duration) {
        let until = Instant::now() + duration;
        while let Some(deadline) = self
            .navigator
            .page_load_deadline()
            .filter(|deadline| *deadline <= until)
        {
            sleep_until(deadline).await;
            if let Err(e) = self.navigator.page_load_timed_out(Instant::now()) {
                warn!(error = %e, "page load timeout handling failed");
            }
        }
        sleep_until(until).await;
    }

    fn events(&self, index: usize, step: Step) -> Vec<PendingEvent> {
        match step {
            Step::Route { url } => vec![NavigatorEvent::Route(url).into()],
            Step::Propose {
                url,
                action,
                properties,
            } => {
                let proposal = VisitProposal::new(url, VisitOptions::new(action), properties);
                vec![NavigatorEvent::Propose(proposal).into()]
            }
            Step::Message { stack, name, data } => vec![
                NavigatorEvent::ScriptMessage {
                    stack: stack.into(),
                    body: json!({ "name": name, "data": Value::Object(data) }),
                }
                .into(),
            ],
            Step::Evaluation { stack, error } => {
                let Some(id) = self.latest_evaluation(stack) else {
                    warn!(step = index, "no script evaluation to complete");
                    return Vec::new();
                };
                let outcome = match error {
                    Some(error) => Err(error),
                    None => Ok(json!({})),
                };
                vec![
                    NavigatorEvent::EvaluationFinished {
                        stack: stack.into(),
                        id,
                        outcome,
                    }
                    .into(),
                ]
            }
            Step::LoadFinished { stack } => self
                .latest_token(index, stack)
                .map(|token| {
                    PendingEvent::from(NavigatorEvent::Load {
                        stack: stack.into(),
                        event: LoadEvent::Finished { token },
                    })
                })
                .into_iter()
                .collect(),
            Step::LoadFailed { stack, description } => self
                .latest_token(index, stack)
                .map(|token| {
                    PendingEvent::from(NavigatorEvent::Load {
                        stack: stack.into(),
                        event: LoadEvent::Failed { token, description },
                    })
                })
                .into_iter()
                .collect(),
            Step::Response { stack, status } => {
                let Some(token) = self.latest_token(index, stack) else {
                    return Vec::new();
                };
                let (reply, answer) = oneshot::channel();
                vec![PendingEvent {
                    event: NavigatorEvent::ResponsePolicy {
                        stack: stack.into(),
                        token,
                        response: LoadResponse::Http {
                            status_code: status,
                        },
                        reply,
                    },
                    reply: Some((format!("response {status}"), answer)),
                }]
            }
            Step::Link { stack, url } => {
                let (reply, answer) = oneshot::channel();
                vec![PendingEvent {
                    reply: Some((format!("link {url}"), answer)),
                    event: NavigatorEvent::NavigationPolicy {
                        stack: stack.into(),
                        action: NavigationAction {
                            url,
                            kind: NavigationKind::LinkActivated,
                            main_frame: true,
                        },
                        reply,
                    },
                }]
            }
            Step::Appear { stack, url } => self.lifecycle(
                index,
                stack,
                &url,
                &[
                    Lifecycle::WillAppear {
                        moving_to_parent: false,
                    },
                    Lifecycle::DidAppear,
                ],
            ),
            Step::Disappear { stack, url } => self.lifecycle(
                index,
                stack,
                &url,
                &[Lifecycle::WillDisappear, Lifecycle::DidDisappear],
            ),
            Step::PullToRefresh { stack, url } => {
                self.lifecycle(index, stack, &url, &[Lifecycle::RequestRefresh])
            }
            Step::Terminate { stack } => {
                vec![NavigatorEvent::ProcessTerminated { stack: stack.into() }.into()]
            }
            Step::Kill { stack } => {
                if let Some(log) = self.surface_log(stack) {
                    log.borrow_mut().process_state = ProcessState::Terminated;
                }
                Vec::new()
            }
            Step::Background => vec![NavigatorEvent::AppDidEnterBackground.into()],
            Step::Foreground => vec![NavigatorEvent::AppDidBecomeActive.into()],
            Step::Wait { .. } => Vec::new(),
        }
    }

    fn lifecycle(
        &self,
        index: usize,
        stack: Stack,
        url: &Url,
        phases: &[Lifecycle],
    ) -> Vec<PendingEvent> {
        let Some(screen) = self.screens.latest(url) else {
            warn!(step = index, %url, "no screen for url");
            return Vec::new();
        };
        let visitable: Rc<dyn Visitable> = screen;
        phases
            .iter()
            .map(|phase| {
                PendingEvent::from(NavigatorEvent::Lifecycle {
                    stack: stack.into(),
                    visitable: Rc::clone(&visitable),
                    phase: *phase,
                })
            })
            .collect()
    }

    fn surface_log(&self, stack: Stack) -> Option<Rc<RefCell<SurfaceLog>>> {
        let handle = self.navigator.session(stack.into()).surface_handle();
        self.surfaces.log_for(handle)
    }

    fn latest_token(&self, index: usize, stack: Stack) -> Option<NavigationToken> {
        let token = self
            .surface_log(stack)
            .and_then(|log| log.borrow().loads.last().map(|(token, _)| *token));
        if token.is_none() {
            warn!(step = index, "no native load on this surface");
        }
        token
    }

    fn latest_evaluation(&self, stack: Stack) -> Option<EvaluationId> {
        self.surface_log(stack)
            .and_then(|log| log.borrow().evaluations.last().map(|(id, _)| *id))
    }

    fn record_policy(&mut self, label: String, mut answer: oneshot::Receiver<LoadPolicy>) {
        let entry = match answer.try_recv() {
            Ok(policy) => format!("{label}: {policy:?}"),
            Err(_) => format!("{label}: unanswered"),
        };
        info!(policy = %entry, "policy decided");
        self.policies.push(entry);
    }
}

struct PendingEvent {
    event: NavigatorEvent,
    reply: Option<(String, oneshot::Receiver<LoadPolicy>)>,
}

impl From<NavigatorEvent> for PendingEvent {
    fn from(event: NavigatorEvent) -> Self {
        Self { event, reply: None }
    }
}
