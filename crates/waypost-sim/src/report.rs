// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Final state of a simulation, printed as JSON.

use std::collections::BTreeMap;

use serde::Serialize;
use url::Url;

use waypost_core::VisitAction;
use waypost_navigator::headless::HostLog;
use waypost_navigator::{Navigator, Screen, StackCommand, StackKind};
use waypost_session::Visit;

#[derive(Debug, Serialize)]
pub struct Report {
    pub main: Vec<ScreenReport>,
    pub modal: Vec<ScreenReport>,
    pub modal_presented: bool,
    pub sessions: BTreeMap<&'static str, SessionReport>,
    pub commands: Vec<String>,
    pub policies: Vec<String>,
    pub opened_in_app_browser: Vec<Url>,
    pub opened_via_system: Vec<Url>,
}

#[derive(Debug, Serialize)]
pub struct ScreenReport {
    pub kind: String,
    pub url: Option<Url>,
}

#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub initialized: bool,
    pub visit: Option<VisitReport>,
}

#[derive(Debug, Serialize)]
pub struct VisitReport {
    pub id: String,
    pub kind: String,
    pub location: Url,
    pub action: VisitAction,
    pub state: String,
    pub error: Option<String>,
}

impl Report {
    pub fn capture(navigator: &Navigator, host: &HostLog, policies: &[String]) -> Self {
        let hierarchy = navigator.hierarchy();
        let screens = |stack: StackKind| -> Vec<ScreenReport> {
            hierarchy
                .screens(stack)
                .iter()
                .map(|screen| ScreenReport {
                    kind: screen.kind().to_string(),
                    url: screen.location(),
                })
                .collect()
        };
        let sessions = StackKind::ALL
            .into_iter()
            .map(|stack| {
                let session = navigator.session(stack);
                let report = SessionReport {
                    initialized: session.is_initialized(),
                    visit: session.current_visit().map(VisitReport::from),
                };
                (stack.name(), report)
            })
            .collect();

        Self {
            main: screens(StackKind::Main),
            modal: screens(StackKind::Modal),
            modal_presented: hierarchy.is_modal_presented(),
            sessions,
            commands: host.commands.iter().map(describe).collect(),
            policies: policies.to_vec(),
            opened_in_app_browser: host.in_app_browser.clone(),
            opened_via_system: host.system.clone(),
        }
    }
}

impl From<&Visit> for VisitReport {
    fn from(visit: &Visit) -> Self {
        Self {
            id: visit.id().to_string(),
            kind: format!("{:?}", visit.kind()),
            location: visit.location().clone(),
            action: visit.options().action,
            state: format!("{:?}", visit.state()),
            error: visit.error().map(|e| e.to_string()),
        }
    }
}

fn label(screen: &Screen) -> String {
    match screen.location() {
        Some(url) => url.path().to_string(),
        None => screen.kind().to_string(),
    }
}

/// One line per stack command, e.g. `push main /inbox`.
pub fn describe(command: &StackCommand) -> String {
    match command {
        StackCommand::Push { stack, screen } => format!("push {} {}", stack.name(), label(screen)),
        StackCommand::Pop { stack } => format!("pop {}", stack.name()),
        StackCommand::PopToRoot { stack } => format!("pop_to_root {}", stack.name()),
        StackCommand::ReplaceTop { stack, screen } => {
            format!("replace_top {} {}", stack.name(), label(screen))
        }
        StackCommand::SetScreens { stack, screens } => {
            let labels: Vec<String> = screens.iter().map(label).collect();
            format!("set {} [{}]", stack.name(), labels.join(", "))
        }
        StackCommand::PresentModal => "present_modal".to_string(),
        StackCommand::DismissModal => "dismiss_modal".to_string(),
        StackCommand::PresentAlert { over, alert } => {
            format!("alert over {}: {}", over.name(), alert.title)
        }
    }
}
