// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Navigation hierarchy — diffs proposals against the main and modal stacks.
//
// The hierarchy keeps a logical copy of both stacks, mutates it for each
// proposal and mirrors every mutation to the host as a `StackCommand`.
// Screens that fall off a stack for good are reported to the delegate so
// their owning session can drop per-screen state.

use std::rc::Rc;

use tracing::{debug, instrument, trace};
use url::Url;

use waypost_bridge::Visitable;
use waypost_core::{
    NavigationContext, Presentation, Result, ScreenId, VisitAction, VisitOptions, VisitProposal,
};

use crate::screen::{AlertScreen, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackKind {
    Main,
    Modal,
}

impl StackKind {
    pub const ALL: [StackKind; 2] = [StackKind::Main, StackKind::Modal];

    pub fn name(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Modal => "modal",
        }
    }
}

/// A mutation of the visible hierarchy, applied by the host.
///
/// Every command except `ReplaceTop` is animated. `ReplaceTop` is applied
/// without animation so the visible stack never disagrees with the visit.
#[derive(Debug, Clone, PartialEq)]
pub enum StackCommand {
    Push { stack: StackKind, screen: Screen },
    Pop { stack: StackKind },
    PopToRoot { stack: StackKind },
    ReplaceTop { stack: StackKind, screen: Screen },
    SetScreens { stack: StackKind, screens: Vec<Screen> },
    PresentModal,
    DismissModal,
    PresentAlert { over: StackKind, alert: Rc<AlertScreen> },
}

/// The platform UI the hierarchy drives.
pub trait NavigationHost {
    fn apply(&mut self, command: &StackCommand);

    /// Whether a modal dismissal animation is still running.
    fn modal_is_dismissing(&self) -> bool {
        false
    }

    fn open_in_app_browser(&mut self, url: &Url);

    fn open_via_system(&mut self, url: &Url);
}

/// Receives the work a stack mutation implies.
pub trait HierarchyDelegate {
    /// Begin a visit for a screen now placed on `stack`.
    fn visit(
        &mut self,
        visitable: Rc<dyn Visitable>,
        stack: StackKind,
        options: VisitOptions,
    ) -> Result<()>;

    /// Reload whatever is now on top of `stack`.
    fn refresh(&mut self, stack: StackKind) -> Result<()>;

    /// Screens that left `stack` and will not come back.
    fn screens_discarded(&mut self, stack: StackKind, screens: Vec<ScreenId>);
}

pub struct NavigationHierarchy {
    host: Box<dyn NavigationHost>,
    main: Vec<Screen>,
    modal: Vec<Screen>,
    modal_presented: bool,
    discarded: Vec<(StackKind, ScreenId)>,
}

impl NavigationHierarchy {
    pub fn new(host: Box<dyn NavigationHost>) -> Self {
        Self {
            host,
            main: Vec::new(),
            modal: Vec::new(),
            modal_presented: false,
            discarded: Vec::new(),
        }
    }

    // -- Inspection --

    pub fn screens(&self, stack: StackKind) -> &[Screen] {
        match stack {
            StackKind::Main => &self.main,
            StackKind::Modal => &self.modal,
        }
    }

    pub fn top(&self, stack: StackKind) -> Option<&Screen> {
        self.screens(stack).last()
    }

    pub fn is_modal_presented(&self) -> bool {
        self.modal_presented
    }

    /// The stack the user is looking at.
    pub fn active_stack(&self) -> StackKind {
        if self.modal_presented {
            StackKind::Modal
        } else {
            StackKind::Main
        }
    }

    /// Which stack currently holds `screen`, if any.
    pub fn stack_of(&self, screen: ScreenId) -> Option<StackKind> {
        StackKind::ALL
            .into_iter()
            .find(|&stack| self.screens(stack).iter().any(|s| s.id() == screen))
    }

    pub fn host(&self) -> &dyn NavigationHost {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> &mut dyn NavigationHost {
        self.host.as_mut()
    }

    // -- Routing --

    /// Place `screen` according to `proposal` and start the implied visit.
    #[instrument(skip_all, fields(url = %proposal.url, screen = screen.kind()))]
    pub fn route(
        &mut self,
        screen: Screen,
        proposal: &VisitProposal,
        delegate: &mut dyn HierarchyDelegate,
    ) -> Result<()> {
        if let Screen::Alert(alert) = &screen {
            let over = self.active_stack();
            debug!(stack = over.name(), title = %alert.title, "present alert");
            self.host.apply(&StackCommand::PresentAlert {
                over,
                alert: Rc::clone(alert),
            });
            return Ok(());
        }

        let presentation = proposal.presentation();
        debug!(
            context = ?proposal.context(),
            ?presentation,
            action = ?proposal.options.action,
            "route"
        );
        let result = match presentation {
            Presentation::Default => self.navigate(screen, proposal, delegate),
            Presentation::Pop => {
                self.pop();
                Ok(())
            }
            Presentation::Replace => self.replace(screen, proposal, delegate),
            Presentation::Refresh => self.refresh(delegate),
            Presentation::ClearAll => self.clear_all(delegate),
            Presentation::ReplaceRoot => self.replace_root(screen, delegate),
            Presentation::None => Ok(()),
        };
        self.flush_discarded(delegate);
        result
    }

    fn navigate(
        &mut self,
        screen: Screen,
        proposal: &VisitProposal,
        delegate: &mut dyn HierarchyDelegate,
    ) -> Result<()> {
        match proposal.context() {
            NavigationContext::Default => {
                self.dismiss_modal();
                let target = self.push_or_replace(StackKind::Main, screen, proposal);
                visit(&target, StackKind::Main, &proposal.options, delegate)
            }
            NavigationContext::Modal => {
                let target = if self.modal_presented && !self.host.modal_is_dismissing() {
                    self.push_or_replace(StackKind::Modal, screen, proposal)
                } else {
                    self.present_fresh_modal(screen.clone());
                    screen
                };
                visit(&target, StackKind::Modal, &proposal.options, delegate)
            }
        }
    }

    fn replace(
        &mut self,
        screen: Screen,
        proposal: &VisitProposal,
        delegate: &mut dyn HierarchyDelegate,
    ) -> Result<()> {
        match proposal.context() {
            NavigationContext::Default => {
                self.dismiss_modal();
                self.replace_top(StackKind::Main, screen.clone());
                visit(&screen, StackKind::Main, &proposal.options, delegate)
            }
            NavigationContext::Modal => {
                if self.modal_presented {
                    self.replace_top(StackKind::Modal, screen.clone());
                } else {
                    self.present_fresh_modal(screen.clone());
                }
                visit(&screen, StackKind::Modal, &proposal.options, delegate)
            }
        }
    }

    /// Pop the active stack, dismissing a modal that holds a single screen.
    /// Returns the stack now in front.
    fn pop(&mut self) -> StackKind {
        if self.modal_presented {
            if self.modal.len() == 1 {
                self.dismiss_modal();
                return StackKind::Main;
            }
            self.pop_stack(StackKind::Modal);
            StackKind::Modal
        } else {
            self.pop_stack(StackKind::Main);
            StackKind::Main
        }
    }

    fn refresh(&mut self, delegate: &mut dyn HierarchyDelegate) -> Result<()> {
        let exposed = self.pop();
        delegate.refresh(exposed)
    }

    fn clear_all(&mut self, delegate: &mut dyn HierarchyDelegate) -> Result<()> {
        self.dismiss_modal();
        if self.main.len() > 1 {
            let removed = self.main.split_off(1);
            self.discard(StackKind::Main, removed);
            self.host
                .apply(&StackCommand::PopToRoot { stack: StackKind::Main });
        }
        delegate.refresh(StackKind::Main)
    }

    fn replace_root(&mut self, screen: Screen, delegate: &mut dyn HierarchyDelegate) -> Result<()> {
        self.dismiss_modal();
        let removed = std::mem::replace(&mut self.main, vec![screen.clone()]);
        self.discard(StackKind::Main, removed);
        self.host.apply(&StackCommand::SetScreens {
            stack: StackKind::Main,
            screens: vec![screen.clone()],
        });
        visit(&screen, StackKind::Main, &VisitOptions::default(), delegate)
    }

    /// Returns the screen the visit should target: the new one, or the
    /// existing screen exposed by popping back to it.
    fn push_or_replace(
        &mut self,
        stack: StackKind,
        screen: Screen,
        proposal: &VisitProposal,
    ) -> Screen {
        if self.visiting_same_page(stack, &screen, &proposal.url) {
            trace!(stack = stack.name(), "same page, replace in place");
            self.replace_top(stack, screen.clone());
            screen
        } else if self.visiting_previous_page(stack, &screen, &proposal.url) {
            trace!(stack = stack.name(), "previous page, pop back");
            self.pop_stack(stack);
            self.top(stack).cloned().unwrap_or(screen)
        } else if proposal.options.action == VisitAction::Advance {
            self.push(stack, screen.clone());
            screen
        } else {
            self.replace_top(stack, screen.clone());
            screen
        }
    }

    fn visiting_same_page(&self, stack: StackKind, screen: &Screen, url: &Url) -> bool {
        self.top(stack)
            .is_some_and(|top| same_page(top, screen, url))
    }

    fn visiting_previous_page(&self, stack: StackKind, screen: &Screen, url: &Url) -> bool {
        let screens = self.screens(stack);
        screens.len() >= 2 && same_page(&screens[screens.len() - 2], screen, url)
    }

    // -- Stack primitives --

    fn stack_mut(&mut self, stack: StackKind) -> &mut Vec<Screen> {
        match stack {
            StackKind::Main => &mut self.main,
            StackKind::Modal => &mut self.modal,
        }
    }

    fn push(&mut self, stack: StackKind, screen: Screen) {
        self.stack_mut(stack).push(screen.clone());
        self.host.apply(&StackCommand::Push { stack, screen });
    }

    fn pop_stack(&mut self, stack: StackKind) {
        if self.screens(stack).len() < 2 {
            return;
        }
        if let Some(popped) = self.stack_mut(stack).pop() {
            self.discard(stack, vec![popped]);
        }
        self.host.apply(&StackCommand::Pop { stack });
    }

    fn replace_top(&mut self, stack: StackKind, screen: Screen) {
        let screens = self.stack_mut(stack);
        let replaced = screens.pop();
        screens.push(screen.clone());
        if let Some(replaced) = replaced {
            self.discard(stack, vec![replaced]);
        }
        self.host.apply(&StackCommand::ReplaceTop { stack, screen });
    }

    fn present_fresh_modal(&mut self, screen: Screen) {
        let removed = std::mem::replace(&mut self.modal, vec![screen.clone()]);
        self.discard(StackKind::Modal, removed);
        self.host.apply(&StackCommand::SetScreens {
            stack: StackKind::Modal,
            screens: vec![screen],
        });
        self.modal_presented = true;
        self.host.apply(&StackCommand::PresentModal);
    }

    fn dismiss_modal(&mut self) {
        if !self.modal_presented {
            return;
        }
        self.modal_presented = false;
        let removed = std::mem::take(&mut self.modal);
        self.discard(StackKind::Modal, removed);
        self.host.apply(&StackCommand::DismissModal);
    }

    fn discard(&mut self, stack: StackKind, screens: Vec<Screen>) {
        self.discarded
            .extend(screens.iter().map(|screen| (stack, screen.id())));
    }

    fn flush_discarded(&mut self, delegate: &mut dyn HierarchyDelegate) {
        for stack in StackKind::ALL {
            let ids: Vec<ScreenId> = self
                .discarded
                .iter()
                .filter(|(s, _)| *s == stack)
                .map(|(_, id)| *id)
                .filter(|id| self.stack_of(*id).is_none())
                .collect();
            if !ids.is_empty() {
                delegate.screens_discarded(stack, ids);
            }
        }
        self.discarded.clear();
    }
}

impl std::fmt::Debug for NavigationHierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationHierarchy")
            .field("main", &self.main)
            .field("modal", &self.modal)
            .field("modal_presented", &self.modal_presented)
            .finish()
    }
}

/// Web screens match on URL; anything else matches on its type.
fn same_page(existing: &Screen, candidate: &Screen, url: &Url) -> bool {
    match existing {
        Screen::Web(visitable) => visitable.location().as_ref() == Some(url),
        other => other.same_kind(candidate),
    }
}

fn visit(
    screen: &Screen,
    stack: StackKind,
    options: &VisitOptions,
    delegate: &mut dyn HierarchyDelegate,
) -> Result<()> {
    match screen.visitable() {
        Some(visitable) => delegate.visit(Rc::clone(visitable), stack, options.clone()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use serde_json::json;
    use waypost_bridge::stub::HeadlessScreen;
    use waypost_core::PathProperties;

    use crate::headless::{HeadlessHost, HostLog};
    use crate::screen::NativeScreen;

    #[derive(Default)]
    struct Recorder {
        visits: Vec<(StackKind, Option<Url>, VisitAction)>,
        refreshes: Vec<StackKind>,
        discarded: Vec<(StackKind, ScreenId)>,
    }

    impl HierarchyDelegate for Recorder {
        fn visit(
            &mut self,
            visitable: Rc<dyn Visitable>,
            stack: StackKind,
            options: VisitOptions,
        ) -> Result<()> {
            self.visits.push((stack, visitable.location(), options.action));
            Ok(())
        }

        fn refresh(&mut self, stack: StackKind) -> Result<()> {
            self.refreshes.push(stack);
            Ok(())
        }

        fn screens_discarded(&mut self, stack: StackKind, screens: Vec<ScreenId>) {
            self.discarded
                .extend(screens.into_iter().map(|id| (stack, id)));
        }
    }

    struct Settings(ScreenId);

    impl NativeScreen for Settings {
        fn screen_id(&self) -> ScreenId {
            self.0
        }

        fn kind(&self) -> &str {
            "settings"
        }
    }

    fn url(path: &str) -> Url {
        Url::parse("https://app.test/").unwrap().join(path).unwrap()
    }

    fn web(path: &str) -> Screen {
        Screen::Web(Rc::new(HeadlessScreen::new(url(path))))
    }

    fn proposal(path: &str, action: VisitAction, properties: serde_json::Value) -> VisitProposal {
        let properties: PathProperties = serde_json::from_value(properties).unwrap();
        VisitProposal::new(url(path), VisitOptions::new(action), properties)
    }

    fn advance(path: &str) -> VisitProposal {
        proposal(path, VisitAction::Advance, json!({}))
    }

    fn modal(path: &str) -> VisitProposal {
        proposal(path, VisitAction::Advance, json!({ "context": "modal" }))
    }

    fn presenting(path: &str, presentation: &str) -> VisitProposal {
        proposal(
            path,
            VisitAction::Advance,
            json!({ "presentation": presentation }),
        )
    }

    fn hierarchy() -> (NavigationHierarchy, Rc<RefCell<HostLog>>) {
        let host = HeadlessHost::new();
        let log = host.log();
        (NavigationHierarchy::new(Box::new(host)), log)
    }

    fn locations(hierarchy: &NavigationHierarchy, stack: StackKind) -> Vec<String> {
        hierarchy
            .screens(stack)
            .iter()
            .map(|s| s.location().map(|u| u.path().to_string()).unwrap_or_default())
            .collect()
    }

    fn route(
        hierarchy: &mut NavigationHierarchy,
        delegate: &mut Recorder,
        path: &str,
        proposal: VisitProposal,
    ) {
        hierarchy.route(web(path), &proposal, delegate).unwrap();
    }

    #[test]
    fn first_proposal_pushes_and_visits_on_main() {
        let (mut hierarchy, log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));

        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/one"]);
        assert_eq!(
            delegate.visits,
            vec![(StackKind::Main, Some(url("/one")), VisitAction::Advance)]
        );
        assert!(matches!(
            log.borrow().commands.as_slice(),
            [StackCommand::Push { stack: StackKind::Main, .. }]
        ));
    }

    #[test]
    fn same_url_replaces_top_in_place() {
        let (mut hierarchy, log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));

        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/one"]);
        assert_eq!(delegate.visits.len(), 2);
        assert!(matches!(
            log.borrow().commands.last(),
            Some(StackCommand::ReplaceTop { stack: StackKind::Main, .. })
        ));
        assert_eq!(delegate.discarded.len(), 1);
    }

    #[test]
    fn previous_url_pops_instead_of_pushing() {
        let (mut hierarchy, log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        route(&mut hierarchy, &mut delegate, "/two", advance("/two"));
        let first = hierarchy.screens(StackKind::Main)[0].id();
        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));

        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/one"]);
        assert_eq!(hierarchy.screens(StackKind::Main)[0].id(), first);
        assert!(matches!(
            log.borrow().commands.last(),
            Some(StackCommand::Pop { stack: StackKind::Main })
        ));
        assert_eq!(
            delegate.visits.last(),
            Some(&(StackKind::Main, Some(url("/one")), VisitAction::Advance))
        );
    }

    #[test]
    fn non_advance_action_replaces_top() {
        let (mut hierarchy, _log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        route(
            &mut hierarchy,
            &mut delegate,
            "/two",
            proposal("/two", VisitAction::Replace, json!({})),
        );

        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/two"]);
    }

    #[test]
    fn modal_proposals_present_then_push() {
        let (mut hierarchy, log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", modal("/one"));
        assert!(hierarchy.is_modal_presented());
        assert_eq!(locations(&hierarchy, StackKind::Modal), vec!["/one"]);
        assert!(log
            .borrow()
            .commands
            .iter()
            .any(|c| matches!(c, StackCommand::PresentModal)));

        route(&mut hierarchy, &mut delegate, "/two", modal("/two"));
        assert_eq!(locations(&hierarchy, StackKind::Modal), vec!["/one", "/two"]);
        assert!(locations(&hierarchy, StackKind::Main).is_empty());
        assert!(delegate.visits.iter().all(|(s, _, _)| *s == StackKind::Modal));
    }

    #[test]
    fn modal_mid_dismissal_gets_a_fresh_stack() {
        let (mut hierarchy, log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", modal("/one"));
        log.borrow_mut().modal_dismissing = true;
        route(&mut hierarchy, &mut delegate, "/two", modal("/two"));

        assert_eq!(locations(&hierarchy, StackKind::Modal), vec!["/two"]);
        assert_eq!(
            delegate.discarded.iter().filter(|(s, _)| *s == StackKind::Modal).count(),
            1
        );
    }

    #[test]
    fn default_context_dismisses_modal() {
        let (mut hierarchy, log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        route(&mut hierarchy, &mut delegate, "/two", modal("/two"));
        route(&mut hierarchy, &mut delegate, "/three", advance("/three"));

        assert!(!hierarchy.is_modal_presented());
        assert!(hierarchy.screens(StackKind::Modal).is_empty());
        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/one", "/three"]);
        assert!(log
            .borrow()
            .commands
            .iter()
            .any(|c| matches!(c, StackCommand::DismissModal)));
    }

    #[test]
    fn presentation_none_changes_nothing() {
        let (mut hierarchy, log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        let commands = log.borrow().commands.len();
        let visits = delegate.visits.len();

        route(&mut hierarchy, &mut delegate, "/two", presenting("/two", "none"));

        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/one"]);
        assert_eq!(log.borrow().commands.len(), commands);
        assert_eq!(delegate.visits.len(), visits);
        assert!(delegate.refreshes.is_empty());
    }

    #[test]
    fn pop_dismisses_single_screen_modal() {
        let (mut hierarchy, _log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        route(&mut hierarchy, &mut delegate, "/two", modal("/two"));
        route(&mut hierarchy, &mut delegate, "/x", presenting("/x", "pop"));

        assert!(!hierarchy.is_modal_presented());
        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/one"]);
    }

    #[test]
    fn pop_never_removes_the_root() {
        let (mut hierarchy, log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        route(&mut hierarchy, &mut delegate, "/x", presenting("/x", "pop"));

        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/one"]);
        assert_eq!(log.borrow().commands.len(), 1);
    }

    #[test]
    fn refresh_pops_then_reloads_exposed_stack() {
        let (mut hierarchy, _log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        route(&mut hierarchy, &mut delegate, "/two", advance("/two"));
        route(&mut hierarchy, &mut delegate, "/x", presenting("/x", "refresh"));
        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/one"]);
        assert_eq!(delegate.refreshes, vec![StackKind::Main]);

        route(&mut hierarchy, &mut delegate, "/a", modal("/a"));
        route(&mut hierarchy, &mut delegate, "/b", modal("/b"));
        route(&mut hierarchy, &mut delegate, "/x", presenting("/x", "refresh"));
        assert_eq!(locations(&hierarchy, StackKind::Modal), vec!["/a"]);
        assert_eq!(delegate.refreshes, vec![StackKind::Main, StackKind::Modal]);
    }

    #[test]
    fn clear_all_returns_to_root_and_reloads_main() {
        let (mut hierarchy, log) = hierarchy();
        let mut delegate = Recorder::default();

        for path in ["/one", "/two", "/three"] {
            route(&mut hierarchy, &mut delegate, path, advance(path));
        }
        route(&mut hierarchy, &mut delegate, "/m", modal("/m"));
        route(&mut hierarchy, &mut delegate, "/x", presenting("/x", "clear_all"));

        assert!(!hierarchy.is_modal_presented());
        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/one"]);
        assert_eq!(delegate.refreshes, vec![StackKind::Main]);
        assert!(matches!(
            log.borrow().commands.last(),
            Some(StackCommand::PopToRoot { stack: StackKind::Main })
        ));
    }

    #[test]
    fn replace_root_swaps_whole_stack_and_advances() {
        let (mut hierarchy, _log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        route(&mut hierarchy, &mut delegate, "/two", advance("/two"));
        route(
            &mut hierarchy,
            &mut delegate,
            "/home",
            proposal("/home", VisitAction::Replace, json!({ "presentation": "replace_root" })),
        );

        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/home"]);
        assert_eq!(
            delegate.visits.last(),
            Some(&(StackKind::Main, Some(url("/home")), VisitAction::Advance))
        );
        assert_eq!(delegate.discarded.len(), 2);
    }

    #[test]
    fn replace_presentation_replaces_unconditionally() {
        let (mut hierarchy, _log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        route(&mut hierarchy, &mut delegate, "/two", advance("/two"));
        route(&mut hierarchy, &mut delegate, "/one", presenting("/one", "replace"));

        assert_eq!(locations(&hierarchy, StackKind::Main), vec!["/one", "/one"]);
    }

    #[test]
    fn native_screens_match_by_kind_and_are_not_visited() {
        let (mut hierarchy, _log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        let settings = || Screen::Native(Rc::new(Settings(ScreenId::new())));
        hierarchy
            .route(settings(), &advance("/settings"), &mut delegate)
            .unwrap();
        hierarchy
            .route(settings(), &advance("/settings/other"), &mut delegate)
            .unwrap();

        assert_eq!(hierarchy.screens(StackKind::Main).len(), 2);
        assert_eq!(hierarchy.top(StackKind::Main).unwrap().kind(), "settings");
        assert_eq!(delegate.visits.len(), 1);
    }

    #[test]
    fn alerts_bypass_the_stacks() {
        let (mut hierarchy, log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", modal("/one"));
        let alert = Rc::new(AlertScreen::new("Saved", None));
        hierarchy
            .route(Screen::Alert(Rc::clone(&alert)), &advance("/alert"), &mut delegate)
            .unwrap();

        assert_eq!(locations(&hierarchy, StackKind::Modal), vec!["/one"]);
        assert!(matches!(
            log.borrow().commands.last(),
            Some(StackCommand::PresentAlert { over: StackKind::Modal, .. })
        ));
        assert_eq!(delegate.visits.len(), 1);
    }

    #[test]
    fn stack_of_finds_screen() {
        let (mut hierarchy, _log) = hierarchy();
        let mut delegate = Recorder::default();

        route(&mut hierarchy, &mut delegate, "/one", advance("/one"));
        route(&mut hierarchy, &mut delegate, "/two", modal("/two"));

        let main = hierarchy.screens(StackKind::Main)[0].id();
        let modal = hierarchy.screens(StackKind::Modal)[0].id();
        assert_eq!(hierarchy.stack_of(main), Some(StackKind::Main));
        assert_eq!(hierarchy.stack_of(modal), Some(StackKind::Modal));
        assert_eq!(hierarchy.stack_of(ScreenId::new()), None);
        assert_eq!(hierarchy.active_stack(), StackKind::Modal);
    }
}
