// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Waypost Bridge — native capability traits and the script bridge.
//
// The rendering surface (a platform web view) and the screens that host it
// are opaque capabilities injected by the shell. This crate defines those
// traits, owns the one message channel between native code and the embedded
// script runtime, and ships a headless implementation for desktop/CI builds.

pub mod bridge;
pub mod expression;
pub mod message;
pub mod stub;
pub mod traits;

pub use bridge::{Dispatch, ScriptBridge, WebEvent};
pub use expression::ScriptExpression;
pub use message::{InboundEvent, MessageName, ScriptMessage, VisitEvent};
pub use traits::*;
