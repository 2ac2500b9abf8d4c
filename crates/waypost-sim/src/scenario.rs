// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scenario files: configuration, routing rules and the steps to replay.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use waypost_core::{NavigatorConfig, PathProperties, PropertiesSource, Result, VisitAction};
use waypost_navigator::StackKind;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: NavigatorConfig,
    #[serde(default)]
    pub rules: Vec<PrefixRule>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Attaches `properties` to every URL whose path starts with `prefix`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrefixRule {
    pub prefix: String,
    #[serde(default)]
    pub properties: PathProperties,
}

/// A minimal rules engine: later rules override earlier ones key by key.
#[derive(Debug, Clone, Default)]
pub struct PrefixRules(pub Vec<PrefixRule>);

impl PropertiesSource for PrefixRules {
    fn properties(&self, url: &Url) -> PathProperties {
        let mut properties = PathProperties::new();
        for rule in self.0.iter().filter(|r| url.path().starts_with(&r.prefix)) {
            properties.extend(rule.properties.clone());
        }
        properties
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stack {
    Main,
    Modal,
}

impl From<Stack> for StackKind {
    fn from(stack: Stack) -> Self {
        match stack {
            Stack::Main => StackKind::Main,
            Stack::Modal => StackKind::Modal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Route a URL with an advance action.
    Route { url: Url },
    /// Route a URL with explicit options and properties.
    Propose {
        url: Url,
        #[serde(default)]
        action: VisitAction,
        #[serde(default)]
        properties: Map<String, Value>,
    },
    /// Post a message from the embedded runtime.
    Message {
        stack: Stack,
        name: String,
        #[serde(default)]
        data: Map<String, Value>,
    },
    /// Complete the latest script evaluation, with an engine error if given.
    Evaluation {
        stack: Stack,
        #[serde(default)]
        error: Option<String>,
    },
    /// Finish the latest native load.
    LoadFinished { stack: Stack },
    /// Fail the latest native load.
    LoadFailed { stack: Stack, description: String },
    /// Answer the latest native load's response headers.
    Response { stack: Stack, status: i32 },
    /// A link activated inside the page.
    Link { stack: Stack, url: Url },
    /// The latest screen for `url` appears.
    Appear { stack: Stack, url: Url },
    /// The latest screen for `url` disappears.
    Disappear { stack: Stack, url: Url },
    PullToRefresh { stack: Stack, url: Url },
    /// The surface process dies while in use.
    Terminate { stack: Stack },
    /// The surface process dies unnoticed; found on the next foreground.
    Kill { stack: Stack },
    Background,
    Foreground,
    Wait { ms: u64 },
}
