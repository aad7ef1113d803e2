//! Stage registry
//!
//! Creates named stages through the media runtime for one graph. Names are
//! tracked so a duplicate is reported at build time instead of silently
//! shadowing an earlier stage.

use crate::config::StageSpec;
use crate::error::{Error, Result, StageFailure};
use crate::runtime::MediaRuntime;
use std::collections::HashSet;
use tracing::debug;

/// Issues stages for a single graph
pub struct StageRegistry<'a, R: MediaRuntime> {
    runtime: &'a R,
    names: HashSet<String>,
}

impl<'a, R: MediaRuntime> StageRegistry<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self {
            runtime,
            names: HashSet::new(),
        }
    }

    /// Create one stage; `role` only labels diagnostics
    pub fn create(&mut self, role: &str, spec: &StageSpec) -> Result<R::Stage> {
        if self.names.contains(&spec.name) {
            return Err(Error::DuplicateStageName(spec.name.clone()));
        }

        let stage = self.runtime.create_stage(&spec.kind, &spec.name)?;
        self.names.insert(spec.name.clone());
        debug!("Created {} '{}' ({})", role, spec.name, spec.kind);
        Ok(stage)
    }

    /// Create every requested stage.
    ///
    /// All creations are attempted; if any failed, the stages that were
    /// created are dropped and one aggregated `StageCreation` error lists
    /// every failure.
    pub fn create_all(&mut self, specs: &[(&str, &StageSpec)]) -> Result<Vec<R::Stage>> {
        let mut stages = Vec::with_capacity(specs.len());
        let mut failures = Vec::new();

        for (role, spec) in specs {
            match self.create(role, spec) {
                Ok(stage) => stages.push(stage),
                Err(e) => {
                    debug!("{} could not be created: {}", role, e);
                    failures.push(StageFailure {
                        role: role.to_string(),
                        kind: spec.kind.clone(),
                        name: spec.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(stages)
        } else {
            Err(Error::StageCreation { failures })
        }
    }

    /// Names issued so far
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
