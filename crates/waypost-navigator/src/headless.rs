// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless host and factories for tests and the simulator.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;
use url::Url;

use waypost_bridge::stub::{HeadlessScreen, HeadlessSurface, SurfaceLog};
use waypost_bridge::{RenderingSurface, SurfaceHandle, Visitable};
use waypost_core::VisitProposal;

use crate::delegate::{ScreenFactory, SurfaceFactory};
use crate::hierarchy::{NavigationHost, StackCommand};

/// Everything a [`HeadlessHost`] was asked to do.
#[derive(Debug, Default)]
pub struct HostLog {
    pub commands: Vec<StackCommand>,
    pub in_app_browser: Vec<Url>,
    pub system: Vec<Url>,
    /// Reported back through `modal_is_dismissing`.
    pub modal_dismissing: bool,
}

/// A navigation host that records commands instead of showing screens.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    log: Rc<RefCell<HostLog>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Rc<RefCell<HostLog>> {
        Rc::clone(&self.log)
    }
}

impl NavigationHost for HeadlessHost {
    fn apply(&mut self, command: &StackCommand) {
        trace!(?command, "headless stack command");
        self.log.borrow_mut().commands.push(command.clone());
    }

    fn modal_is_dismissing(&self) -> bool {
        self.log.borrow().modal_dismissing
    }

    fn open_in_app_browser(&mut self, url: &Url) {
        self.log.borrow_mut().in_app_browser.push(url.clone());
    }

    fn open_via_system(&mut self, url: &Url) {
        self.log.borrow_mut().system.push(url.clone());
    }
}

/// Builds [`HeadlessScreen`]s and keeps every one it built.
#[derive(Debug, Default, Clone)]
pub struct HeadlessScreenFactory {
    built: Rc<RefCell<Vec<Rc<HeadlessScreen>>>>,
}

impl HeadlessScreenFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn built(&self) -> Vec<Rc<HeadlessScreen>> {
        self.built.borrow().clone()
    }

    /// The most recently built screen for `url`.
    pub fn latest(&self, url: &Url) -> Option<Rc<HeadlessScreen>> {
        self.built
            .borrow()
            .iter()
            .rev()
            .find(|screen| screen.location().as_ref() == Some(url))
            .cloned()
    }
}

impl ScreenFactory for HeadlessScreenFactory {
    fn web_screen(&self, proposal: &VisitProposal) -> Rc<dyn Visitable> {
        let screen = Rc::new(HeadlessScreen::new(proposal.url.clone()));
        self.built.borrow_mut().push(Rc::clone(&screen));
        screen
    }
}

/// Builds [`HeadlessSurface`]s and keeps each one's log.
#[derive(Debug, Default, Clone)]
pub struct HeadlessSurfaceFactory {
    logs: Rc<RefCell<Vec<(SurfaceHandle, Rc<RefCell<SurfaceLog>>)>>>,
}

impl HeadlessSurfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs in creation order.
    pub fn logs(&self) -> Vec<Rc<RefCell<SurfaceLog>>> {
        self.logs
            .borrow()
            .iter()
            .map(|(_, log)| Rc::clone(log))
            .collect()
    }

    pub fn log_for(&self, handle: SurfaceHandle) -> Option<Rc<RefCell<SurfaceLog>>> {
        self.logs
            .borrow()
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, log)| Rc::clone(log))
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn make_surface(&self) -> Box<dyn RenderingSurface> {
        let surface = HeadlessSurface::new();
        self.logs
            .borrow_mut()
            .push((surface.handle(), surface.log()));
        Box::new(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypost_core::{VisitAction, VisitOptions};

    #[test]
    fn screen_factory_tracks_latest_per_url() {
        let factory = HeadlessScreenFactory::new();
        let url = Url::parse("https://app.test/one").unwrap();
        let proposal = VisitProposal::new(
            url.clone(),
            VisitOptions::new(VisitAction::Advance),
            Default::default(),
        );

        let first = factory.web_screen(&proposal);
        let second = factory.web_screen(&proposal);

        assert_eq!(factory.built().len(), 2);
        let latest = factory.latest(&url).unwrap();
        assert_eq!(latest.screen_id(), second.screen_id());
        assert_ne!(latest.screen_id(), first.screen_id());
    }

    #[test]
    fn surface_factory_finds_logs_by_handle() {
        let factory = HeadlessSurfaceFactory::new();
        let first = factory.make_surface();
        let second = factory.make_surface();

        assert_eq!(factory.logs().len(), 2);
        let log = factory.log_for(second.handle()).unwrap();
        assert!(Rc::ptr_eq(&log, &factory.logs()[1]));
        assert!(factory.log_for(first.handle()).is_some());
        assert!(factory.log_for(SurfaceHandle(u64::MAX)).is_none());
    }

    #[test]
    fn host_reports_dismissal_from_log() {
        let host = HeadlessHost::new();
        assert!(!host.modal_is_dismissing());
        host.log().borrow_mut().modal_dismissing = true;
        assert!(host.modal_is_dismissing());
    }
}
