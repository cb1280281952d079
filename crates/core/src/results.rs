//! Result types for reactor builds
//!
//! Per-module outcomes are collected into a [`ReactorContext`] while the build runs
//! and handed back to the host as a [`BuildResult`].

use std::sync::Mutex;
use std::time::Duration;

use crate::types::BuildFailure;

/// Outcome of one module across the whole build
#[derive(Debug, Clone)]
pub enum BuildSummary {
    Success { duration: Duration },
    Failure { duration: Duration, error: BuildFailure },
    Skipped { reason: String },
}

impl BuildSummary {
    pub fn is_failure(&self) -> bool {
        matches!(self, BuildSummary::Failure { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ModuleOutcome {
    pub module: String,
    pub summary: BuildSummary,
}

/// Per-build collector of module outcomes, shared by all builder workers
#[derive(Debug, Default)]
pub struct ReactorContext {
    outcomes: Mutex<Vec<ModuleOutcome>>,
}

impl ReactorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a module. A module that already failed or was skipped
    /// keeps that outcome; a success is replaced by the module's latest outcome.
    pub fn record(&self, module: &str, summary: BuildSummary) {
        let mut outcomes = self
            .outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match outcomes.iter_mut().find(|outcome| outcome.module == module) {
            Some(existing) => {
                if let BuildSummary::Success { duration } = existing.summary {
                    existing.summary = match summary {
                        BuildSummary::Success { duration: more } => BuildSummary::Success {
                            duration: duration + more,
                        },
                        BuildSummary::Failure { duration: more, error } => BuildSummary::Failure {
                            duration: duration + more,
                            error,
                        },
                        skipped @ BuildSummary::Skipped { .. } => skipped,
                    };
                }
            }
            None => outcomes.push(ModuleOutcome {
                module: module.to_string(),
                summary,
            }),
        }
    }

    pub fn summary(&self, module: &str) -> Option<BuildSummary> {
        self.outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .find(|outcome| outcome.module == module)
            .map(|outcome| outcome.summary.clone())
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .any(|outcome| outcome.summary.is_failure())
    }

    /// Outcomes in the order modules were first recorded
    pub fn outcomes(&self) -> Vec<ModuleOutcome> {
        self.outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// What the host sees once the reactor build has returned
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub outcomes: Vec<ModuleOutcome>,
    pub halted: bool,
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        !self.outcomes.iter().any(|outcome| outcome.summary.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ModuleOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.summary.is_failure())
    }
}
