// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Screens the router places on stacks.

use std::rc::Rc;

use url::Url;

use waypost_bridge::Visitable;
use waypost_core::ScreenId;

/// A screen implemented natively instead of by a web page.
pub trait NativeScreen {
    fn screen_id(&self) -> ScreenId;

    /// Identifies the screen's type. Two native screens of the same kind
    /// count as the same page when diffing stacks.
    fn kind(&self) -> &str;
}

/// A transient alert, presented over whichever stack is topmost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertScreen {
    pub id: ScreenId,
    pub title: String,
    pub message: Option<String>,
}

impl AlertScreen {
    pub fn new(title: impl Into<String>, message: Option<String>) -> Self {
        Self {
            id: ScreenId::new(),
            title: title.into(),
            message,
        }
    }
}

#[derive(Clone)]
pub enum Screen {
    Web(Rc<dyn Visitable>),
    Native(Rc<dyn NativeScreen>),
    Alert(Rc<AlertScreen>),
}

impl Screen {
    pub fn id(&self) -> ScreenId {
        match self {
            Self::Web(visitable) => visitable.screen_id(),
            Self::Native(native) => native.screen_id(),
            Self::Alert(alert) => alert.id,
        }
    }

    /// Location of a web screen.
    pub fn location(&self) -> Option<Url> {
        match self {
            Self::Web(visitable) => visitable.location(),
            _ => None,
        }
    }

    pub fn visitable(&self) -> Option<&Rc<dyn Visitable>> {
        match self {
            Self::Web(visitable) => Some(visitable),
            _ => None,
        }
    }

    /// "web", "alert" or the native screen's kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::Web(_) => "web",
            Self::Native(native) => native.kind(),
            Self::Alert(_) => "alert",
        }
    }

    /// Whether both screens are of the same concrete type.
    pub fn same_kind(&self, other: &Screen) -> bool {
        match (self, other) {
            (Self::Web(_), Self::Web(_)) | (Self::Alert(_), Self::Alert(_)) => true,
            (Self::Native(a), Self::Native(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Web(visitable) => f
                .debug_struct("Web")
                .field("id", &visitable.screen_id())
                .field("location", &visitable.location().map(String::from))
                .finish(),
            Self::Native(native) => f
                .debug_struct("Native")
                .field("id", &native.screen_id())
                .field("kind", &native.kind())
                .finish(),
            Self::Alert(alert) => f.debug_tuple("Alert").field(&alert.title).finish(),
        }
    }
}

impl PartialEq for Screen {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypost_bridge::stub::HeadlessScreen;

    struct Settings(ScreenId);

    impl NativeScreen for Settings {
        fn screen_id(&self) -> ScreenId {
            self.0
        }

        fn kind(&self) -> &str {
            "settings"
        }
    }

    #[test]
    fn web_screens_expose_location() {
        let url = Url::parse("https://app.test/one").unwrap();
        let screen = Screen::Web(Rc::new(HeadlessScreen::new(url.clone())));
        assert_eq!(screen.location(), Some(url));
        assert_eq!(screen.kind(), "web");
        assert!(screen.visitable().is_some());
    }

    #[test]
    fn native_screens_compare_by_kind() {
        let a = Screen::Native(Rc::new(Settings(ScreenId::new())));
        let b = Screen::Native(Rc::new(Settings(ScreenId::new())));
        let web = Screen::Web(Rc::new(HeadlessScreen::new(
            Url::parse("https://app.test/").unwrap(),
        )));
        assert!(a.same_kind(&b));
        assert_ne!(a, b);
        assert!(!a.same_kind(&web));
        assert_eq!(a.location(), None);
    }
}
