//! Build lifecycles
//!
//! A lifecycle is an ordered list of phases. Requesting a phase runs every phase of
//! its lifecycle up to and including it. Goals are attached to phases through
//! [`LifecycleBindings`].

use std::collections::HashMap;

use crate::types::{ReactorError, ReactorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    pub id: &'static str,
    pub phases: &'static [&'static str],
}

pub const CLEAN_LIFECYCLE: Lifecycle = Lifecycle {
    id: "clean",
    phases: &["pre-clean", "clean", "post-clean"],
};

pub const DEFAULT_LIFECYCLE: Lifecycle = Lifecycle {
    id: "default",
    phases: &[
        "validate",
        "initialize",
        "generate-sources",
        "process-resources",
        "compile",
        "test-compile",
        "test",
        "package",
        "verify",
        "install",
        "deploy",
    ],
};

pub const SITE_LIFECYCLE: Lifecycle = Lifecycle {
    id: "site",
    phases: &["pre-site", "site", "post-site", "site-deploy"],
};

pub const LIFECYCLES: &[Lifecycle] = &[CLEAN_LIFECYCLE, DEFAULT_LIFECYCLE, SITE_LIFECYCLE];

impl Lifecycle {
    /// Find the lifecycle declaring `phase`
    pub fn for_phase(phase: &str) -> ReactorResult<&'static Lifecycle> {
        LIFECYCLES
            .iter()
            .find(|lifecycle| lifecycle.index_of(phase).is_some())
            .ok_or_else(|| ReactorError::LifecyclePhaseNotFound {
                phase: phase.to_string(),
                available: available_phases(),
            })
    }

    pub fn index_of(&self, phase: &str) -> Option<usize> {
        self.phases.iter().position(|candidate| *candidate == phase)
    }
}

fn available_phases() -> String {
    LIFECYCLES
        .iter()
        .flat_map(|lifecycle| lifecycle.phases.iter().copied())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Goals bound to lifecycle phases, in execution order per phase
#[derive(Debug, Clone, Default)]
pub struct LifecycleBindings {
    bindings: HashMap<String, Vec<String>>,
}

impl LifecycleBindings {
    /// Every bound phase must exist in one of the known lifecycles
    pub fn new(bindings: HashMap<String, Vec<String>>) -> ReactorResult<Self> {
        for phase in bindings.keys() {
            Lifecycle::for_phase(phase)?;
        }
        Ok(Self { bindings })
    }

    pub fn goals_for(&self, phase: &str) -> &[String] {
        self.bindings.get(phase).map(Vec::as_slice).unwrap_or_default()
    }
}
