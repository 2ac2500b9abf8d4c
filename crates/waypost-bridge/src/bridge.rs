// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The script bridge: one rendering surface, one message channel.
//
// Outbound calls are wrapped function-call expressions. Inbound messages are
// decoded one at a time and routed to one of three listener roles: general
// web events go to the owning session, page-load and visit events go to
// whichever visit currently holds the matching listener slot.

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::{debug, instrument, warn};
use url::Url;

use waypost_core::error::Result;
use waypost_core::{NavigatorConfig, VisitError, VisitId, VisitOptions};

use crate::expression::ScriptExpression;
use crate::message::{InboundEvent, ScriptMessage, VisitEvent};
use crate::traits::{
    EvaluationId, EvaluationOutcome, InjectionTime, RenderingSurface, UserScript,
};

const BOOTSTRAP_SOURCE: &str = include_str!("bootstrap.js");
const CHANNEL_PLACEHOLDER: &str = "__WAYPOST_CHANNEL__";

const VISIT_FUNCTION: &str =
    "window.waypostNative.visitLocationWithOptionsAndRestorationIdentifier";
const CANCEL_VISIT_FUNCTION: &str = "window.waypostNative.cancelVisitWithIdentifier";
const CACHE_SNAPSHOT_FUNCTION: &str = "window.waypostNative.cacheSnapshot";
const CLEAR_SNAPSHOT_CACHE_FUNCTION: &str = "window.waypostNative.clearSnapshotCache";

/// Events for the session that owns the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum WebEvent {
    VisitProposed { location: Url, options: VisitOptions },
    PageInvalidated,
    /// An outbound evaluation failed inside the script engine.
    EvaluationFailed(String),
    /// The embedded runtime reported it could not start on this page.
    InitialLoadFailed(VisitError),
    FormSubmissionStarted(Url),
    FormSubmissionFinished(Url),
}

/// Where an inbound message should go.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Web(WebEvent),
    PageLoaded {
        listener: VisitId,
        restoration_identifier: String,
    },
    Visit {
        listener: VisitId,
        event: VisitEvent,
    },
}

/// Bootstrap script source with the channel name filled in.
pub fn bootstrap_source(channel: &str) -> String {
    BOOTSTRAP_SOURCE.replace(CHANNEL_PLACEHOLDER, channel)
}

pub struct ScriptBridge {
    surface: Box<dyn RenderingSurface>,
    channel: String,
    next_evaluation: u64,
    pending: HashMap<EvaluationId, String>,
    page_load_listener: Option<VisitId>,
    visit_listener: Option<VisitId>,
}

impl ScriptBridge {
    /// Take ownership of `surface`, inject the bootstrap script and register
    /// the inbound channel.
    pub fn new(mut surface: Box<dyn RenderingSurface>, config: &NavigatorConfig) -> Self {
        surface.set_user_agent(&config.user_agent);
        surface.add_user_script(UserScript {
            source: bootstrap_source(&config.message_channel),
            injection_time: InjectionTime::DocumentEnd,
            main_frame_only: true,
        });
        surface.register_message_channel(&config.message_channel);
        debug!(channel = %config.message_channel, "script bridge attached");

        Self {
            surface,
            channel: config.message_channel.clone(),
            next_evaluation: 0,
            pending: HashMap::new(),
            page_load_listener: None,
            visit_listener: None,
        }
    }

    pub fn surface(&self) -> &dyn RenderingSurface {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> &mut dyn RenderingSurface {
        self.surface.as_mut()
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    // -- Listener slots --

    pub fn page_load_listener(&self) -> Option<VisitId> {
        self.page_load_listener
    }

    pub fn set_page_load_listener(&mut self, listener: Option<VisitId>) {
        self.page_load_listener = listener;
    }

    pub fn visit_listener(&self) -> Option<VisitId> {
        self.visit_listener
    }

    pub fn set_visit_listener(&mut self, listener: Option<VisitId>) {
        self.visit_listener = listener;
    }

    /// Clear the visit slot only if `listener` still holds it.
    pub fn release_visit_listener(&mut self, listener: VisitId) {
        if self.visit_listener == Some(listener) {
            self.visit_listener = None;
        }
    }

    /// Clear the page-load slot only if `listener` still holds it.
    pub fn release_page_load_listener(&mut self, listener: VisitId) {
        if self.page_load_listener == Some(listener) {
            self.page_load_listener = None;
        }
    }

    // -- Outbound --

    pub fn visit_location(
        &mut self,
        location: &Url,
        options: &VisitOptions,
        restoration_identifier: Option<&str>,
    ) -> Result<EvaluationId> {
        let options = serde_json::to_value(options)?;
        self.call_function(
            VISIT_FUNCTION,
            vec![
                json!(location.as_str()),
                options,
                restoration_identifier.map_or(Value::Null, |id| json!(id)),
            ],
        )
    }

    pub fn cancel_visit(&mut self, identifier: &str) -> Result<EvaluationId> {
        self.call_function(CANCEL_VISIT_FUNCTION, vec![json!(identifier)])
    }

    /// Ask the runtime to snapshot the current page into its cache.
    pub fn cache_snapshot(&mut self) -> Result<EvaluationId> {
        self.call_function(CACHE_SNAPSHOT_FUNCTION, Vec::new())
    }

    pub fn clear_snapshot_cache(&mut self) -> Result<EvaluationId> {
        self.call_function(CLEAR_SNAPSHOT_CACHE_FUNCTION, Vec::new())
    }

    #[instrument(skip(self, arguments), fields(channel = %self.channel))]
    fn call_function(&mut self, function: &str, arguments: Vec<Value>) -> Result<EvaluationId> {
        let script = ScriptExpression::new(function, arguments).wrapped()?;
        self.next_evaluation += 1;
        let id = EvaluationId(self.next_evaluation);
        self.pending.insert(id, function.to_string());
        self.surface.evaluate_script(id, &script);
        Ok(id)
    }

    pub fn pending_evaluations(&self) -> usize {
        self.pending.len()
    }

    /// Handle the completion of an outbound evaluation.
    ///
    /// A thrown script error (captured by the wrapper) is only logged. An
    /// engine-level failure is reported to the session.
    pub fn evaluation_finished(
        &mut self,
        id: EvaluationId,
        outcome: EvaluationOutcome,
    ) -> Option<WebEvent> {
        let function = self.pending.remove(&id).unwrap_or_default();
        match outcome {
            Ok(Value::Object(result)) if result.contains_key("error") => {
                let error = result.get("error").unwrap_or(&serde_json::Value::Null);
                let stack = result.get("stack").unwrap_or(&serde_json::Value::Null);
                warn!(
                    function = %function,
                    %error,
                    %stack,
                    "script function raised an error"
                );
                None
            }
            Ok(_) => None,
            Err(reason) => {
                warn!(function = %function, %reason, "script evaluation failed");
                Some(WebEvent::EvaluationFailed(reason))
            }
        }
    }

    // -- Inbound --

    /// Decode one inbound message body and decide where it goes.
    ///
    /// Malformed messages, log output and events with no listener are
    /// consumed here and yield `None`.
    pub fn receive(&mut self, body: &Value) -> Option<Dispatch> {
        let event = match ScriptMessage::from_value(body).and_then(|m| m.event()) {
            Ok(event) => event,
            Err(e) => {
                debug!(error = %e, "dropping inbound message");
                return None;
            }
        };

        match event {
            InboundEvent::PageLoaded {
                restoration_identifier,
            } => match self.page_load_listener {
                Some(listener) => Some(Dispatch::PageLoaded {
                    listener,
                    restoration_identifier,
                }),
                None => {
                    debug!("pageLoaded with no page-load listener");
                    None
                }
            },
            InboundEvent::Visit(event) => match self.visit_listener {
                Some(listener) => Some(Dispatch::Visit { listener, event }),
                None => {
                    debug!(identifier = event.identifier(), "visit event with no visit listener");
                    None
                }
            },
            InboundEvent::PageLoadFailed => Some(Dispatch::Web(WebEvent::InitialLoadFailed(
                VisitError::PageLoadFailure,
            ))),
            InboundEvent::VisitProposed { location, options } => {
                Some(Dispatch::Web(WebEvent::VisitProposed { location, options }))
            }
            InboundEvent::PageInvalidated => Some(Dispatch::Web(WebEvent::PageInvalidated)),
            InboundEvent::FormSubmissionStarted { location } => {
                Some(Dispatch::Web(WebEvent::FormSubmissionStarted(location)))
            }
            InboundEvent::FormSubmissionFinished { location } => {
                Some(Dispatch::Web(WebEvent::FormSubmissionFinished(location)))
            }
            InboundEvent::ErrorRaised { error } => {
                warn!(%error, "embedded runtime raised an error");
                None
            }
            InboundEvent::Log { message } => {
                debug!(%message, "embedded runtime");
                None
            }
        }
    }
}

impl Drop for ScriptBridge {
    fn drop(&mut self) {
        self.surface.unregister_message_channel(&self.channel);
    }
}

impl std::fmt::Debug for ScriptBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptBridge")
            .field("channel", &self.channel)
            .field("surface", &self.surface.handle())
            .field("pending", &self.pending.len())
            .field("page_load_listener", &self.page_load_listener)
            .field("visit_listener", &self.visit_listener)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::HeadlessSurface;
    use waypost_core::VisitAction;

    fn bridge() -> (ScriptBridge, std::rc::Rc<std::cell::RefCell<crate::stub::SurfaceLog>>) {
        let surface = HeadlessSurface::new();
        let log = surface.log();
        (
            ScriptBridge::new(Box::new(surface), &NavigatorConfig::default()),
            log,
        )
    }

    #[test]
    fn construction_injects_bootstrap_and_registers_channel() {
        let (_bridge, log) = bridge();
        let log = log.borrow();
        assert_eq!(log.channels, vec!["waypost".to_string()]);
        assert_eq!(log.user_agent.as_deref(), Some("Waypost Native"));
        assert_eq!(log.user_scripts.len(), 1);
        let script = &log.user_scripts[0];
        assert_eq!(script.injection_time, InjectionTime::DocumentEnd);
        assert!(script.source.contains(r#"const CHANNEL = "waypost""#));
        assert!(!script.source.contains(CHANNEL_PLACEHOLDER));
    }

    #[test]
    fn drop_unregisters_channel() {
        let (bridge, log) = bridge();
        drop(bridge);
        assert!(log.borrow().channels.is_empty());
    }

    #[test]
    fn visit_location_evaluates_wrapped_call() {
        let (mut bridge, log) = bridge();
        let url = Url::parse("https://app.test/one").unwrap();
        bridge
            .visit_location(&url, &VisitOptions::new(VisitAction::Replace), Some("r1"))
            .unwrap();
        let log = log.borrow();
        let (_, script) = log.evaluations.last().unwrap();
        assert!(script.contains(
            r#"window.waypostNative.visitLocationWithOptionsAndRestorationIdentifier("https://app.test/one",{"action":"replace"},"r1")"#
        ));
        assert!(script.contains("result.error"));
    }

    #[test]
    fn cancel_visit_evaluates_wrapped_call() {
        let (mut bridge, log) = bridge();
        bridge.cancel_visit("v9").unwrap();
        let log = log.borrow();
        assert!(log.evaluations[0]
            .1
            .contains(r#"window.waypostNative.cancelVisitWithIdentifier("v9")"#));
    }

    #[test]
    fn thrown_script_error_is_logged_not_surfaced() {
        let (mut bridge, _log) = bridge();
        let id = bridge.cache_snapshot().unwrap();
        assert_eq!(bridge.pending_evaluations(), 1);
        let outcome = Ok(json!({ "error": "TypeError", "stack": "at f" }));
        assert_eq!(bridge.evaluation_finished(id, outcome), None);
        assert_eq!(bridge.pending_evaluations(), 0);
    }

    #[test]
    fn engine_failure_becomes_web_event() {
        let (mut bridge, _log) = bridge();
        let id = bridge.clear_snapshot_cache().unwrap();
        assert_eq!(
            bridge.evaluation_finished(id, Err("JavaScript exception".into())),
            Some(WebEvent::EvaluationFailed("JavaScript exception".into()))
        );
    }

    #[test]
    fn visit_events_route_to_the_visit_listener() {
        let (mut bridge, _log) = bridge();
        let body = json!({ "name": "visitRendered", "data": { "identifier": "v1" } });
        assert_eq!(bridge.receive(&body), None);

        bridge.set_visit_listener(Some(VisitId(3)));
        assert_eq!(
            bridge.receive(&body),
            Some(Dispatch::Visit {
                listener: VisitId(3),
                event: VisitEvent::Rendered {
                    identifier: "v1".into()
                }
            })
        );
    }

    #[test]
    fn page_loaded_routes_to_the_page_load_listener() {
        let (mut bridge, _log) = bridge();
        bridge.set_page_load_listener(Some(VisitId(1)));
        let body = json!({ "name": "pageLoaded", "data": { "restorationIdentifier": "r1" } });
        assert_eq!(
            bridge.receive(&body),
            Some(Dispatch::PageLoaded {
                listener: VisitId(1),
                restoration_identifier: "r1".into()
            })
        );
    }

    #[test]
    fn release_only_clears_matching_listener() {
        let (mut bridge, _log) = bridge();
        bridge.set_visit_listener(Some(VisitId(2)));
        bridge.release_visit_listener(VisitId(1));
        assert_eq!(bridge.visit_listener(), Some(VisitId(2)));
        bridge.release_visit_listener(VisitId(2));
        assert_eq!(bridge.visit_listener(), None);
    }

    #[test]
    fn page_load_failed_is_initial_load_failure() {
        let (mut bridge, _log) = bridge();
        let body = json!({ "name": "pageLoadFailed", "data": {} });
        assert_eq!(
            bridge.receive(&body),
            Some(Dispatch::Web(WebEvent::InitialLoadFailed(
                VisitError::PageLoadFailure
            )))
        );
    }

    #[test]
    fn malformed_and_log_messages_are_consumed() {
        let (mut bridge, _log) = bridge();
        assert_eq!(bridge.receive(&json!("not a message")), None);
        assert_eq!(
            bridge.receive(&json!({ "name": "log", "data": { "message": "hi" } })),
            None
        );
        assert_eq!(
            bridge.receive(&json!({ "name": "errorRaised", "data": { "error": "boom" } })),
            None
        );
    }
}
