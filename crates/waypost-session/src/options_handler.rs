// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Carries visit options across proposals.

use url::Url;

use waypost_core::VisitOptions;

/// Remembers options that carry a response body (a form submission the
/// server rendered instead of redirecting) and hands them to the next
/// proposal for the same location that arrives without one.
#[derive(Debug, Default)]
pub struct VisitOptionsHandler {
    unhandled: Option<(Url, VisitOptions)>,
}

impl VisitOptionsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a proposal to `url`. Remembered options for any other
    /// location are dropped.
    pub fn process(&mut self, url: &Url, options: VisitOptions) -> VisitOptions {
        if carries_body(&options) {
            self.unhandled = Some((url.clone(), options.clone()));
            return options;
        }
        match self.unhandled.take() {
            Some((location, unhandled)) if location == *url => unhandled,
            _ => options,
        }
    }
}

fn carries_body(options: &VisitOptions) -> bool {
    options
        .response
        .as_ref()
        .is_some_and(|response| response.response_html.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypost_core::{VisitAction, VisitResponse};

    fn with_body() -> VisitOptions {
        VisitOptions::with_response(
            VisitAction::Advance,
            VisitResponse::new(200, Some("<p>saved</p>".into())),
        )
    }

    fn url(path: &str) -> Url {
        Url::parse("https://app.test").unwrap().join(path).unwrap()
    }

    #[test]
    fn options_with_body_carry_to_the_same_location() {
        let mut handler = VisitOptionsHandler::new();
        assert_eq!(handler.process(&url("/result"), with_body()), with_body());
        assert_eq!(
            handler.process(&url("/result"), VisitOptions::new(VisitAction::Replace)),
            with_body()
        );
    }

    #[test]
    fn remembered_options_are_used_once() {
        let mut handler = VisitOptionsHandler::new();
        handler.process(&url("/result"), with_body());
        handler.process(&url("/result"), VisitOptions::default());
        assert_eq!(
            handler.process(&url("/result"), VisitOptions::default()),
            VisitOptions::default()
        );
    }

    #[test]
    fn another_location_drops_remembered_options() {
        let mut handler = VisitOptionsHandler::new();
        handler.process(&url("/result"), with_body());
        let replace = VisitOptions::new(VisitAction::Replace);
        assert_eq!(handler.process(&url("/next"), replace.clone()), replace);
        assert_eq!(
            handler.process(&url("/result"), VisitOptions::default()),
            VisitOptions::default()
        );
    }

    #[test]
    fn plain_options_pass_through() {
        let mut handler = VisitOptionsHandler::new();
        let replace = VisitOptions::new(VisitAction::Replace);
        assert_eq!(handler.process(&url("/one"), replace.clone()), replace);
    }
}
