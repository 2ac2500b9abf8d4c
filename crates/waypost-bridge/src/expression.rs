// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outbound function-call expressions evaluated in the embedded runtime.

use serde_json::Value;

use waypost_core::error::Result;

/// A call to a function in the embedded runtime with JSON-encoded arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptExpression {
    function: String,
    arguments: Vec<Value>,
}

impl ScriptExpression {
    pub fn new(function: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            function: function.into(),
            arguments,
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// The bare call, e.g. `f("a",1)`.
    pub fn string(&self) -> Result<String> {
        Ok(format!("{}({})", self.function, self.encoded_arguments()?))
    }

    /// The call wrapped so a thrown error becomes `{ error, stack }` on the
    /// returned object instead of failing the evaluation.
    pub fn wrapped(&self) -> Result<String> {
        Ok(format!(
            "(function(result) {{\n  try {{\n    result.value = {}\n  }} catch (error) {{\n    result.error = error.toString()\n    result.stack = error.stack\n  }}\n  return result\n}})({{}})",
            self.string()?
        ))
    }

    fn encoded_arguments(&self) -> Result<String> {
        let encoded = serde_json::to_string(&self.arguments)?;
        // Drop the enclosing brackets of the array.
        Ok(encoded[1..encoded.len() - 1].to_string())
    }
}
