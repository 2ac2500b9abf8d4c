// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Waypost Session — visits and the session that arbitrates them.
//
// A session owns exactly one rendering surface (through its script bridge)
// and runs at most one started visit on it at a time.

pub mod options_handler;
pub mod session;
pub mod visit;

pub use options_handler::VisitOptionsHandler;
pub use session::{Session, SessionEvent};
pub use visit::{Visit, VisitKind, VisitNotification, VisitState};
