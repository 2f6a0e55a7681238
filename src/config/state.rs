// Application state module
// Immutable per-process state shared by every request handler

use super::types::Config;
use crate::diag::{FailureSimulation, ProcessStart, SystemResolver};

/// Application state
///
/// Built once before the listener starts accepting and never mutated.
pub struct AppState {
    pub config: Config,
    pub started: ProcessStart,
    pub failure: FailureSimulation,
    pub resolver: SystemResolver,
}

impl AppState {
    pub fn new(config: Config, started: ProcessStart, resolver: SystemResolver) -> Self {
        let failure = config.failure_simulation();
        Self {
            config,
            started,
            failure,
            resolver,
        }
    }
}
