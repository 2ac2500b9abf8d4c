// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Waypost Navigator — routes proposals onto a main and a modal screen stack.
//
// The hierarchy diffs each proposal against the logical stacks and emits
// stack commands for the host UI; the navigator owns one session per stack
// and reacts to everything those sessions report.

pub mod delegate;
pub mod driver;
pub mod headless;
pub mod hierarchy;
pub mod navigator;
pub mod screen;

pub use delegate::{
    DefaultNavigatorDelegate, ExternalUrlAction, FailureResolution, NavigatorDelegate,
    ProposalResult, ScreenFactory, SurfaceFactory,
};
pub use driver::{NavigatorEvent, run};
pub use hierarchy::{HierarchyDelegate, NavigationHierarchy, NavigationHost, StackCommand, StackKind};
pub use navigator::{Lifecycle, Navigator, Sessions};
pub use screen::{AlertScreen, NativeScreen, Screen};
