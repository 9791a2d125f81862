//! Worker lifecycle state machine.
//!
//! States are strictly ordered; the only terminal state is Redundant,
//! reached when install fails or a newer worker version supersedes this
//! one. Skip-waiting collapses the Installed waiting period so a fresh
//! version takes over without waiting for open pages to close.

use stratus_core::Error;

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Initial state, worker constructed but not yet installing.
    Parsed,
    /// Install phase running (core bundle being cached).
    Installing,
    /// Install complete, waiting to activate.
    Installed,
    /// Activate phase running (stale namespaces being purged).
    Activating,
    /// Active and intercepting requests from controlled clients.
    Activated,
    /// Failed or superseded; never serves again.
    Redundant,
}

impl WorkerState {
    /// Check if this state allows fetch interception.
    pub fn can_intercept(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }

    /// Check if the worker is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Redundant)
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Check if a state transition is valid.
fn is_valid_transition(from: WorkerState, to: WorkerState) -> bool {
    use WorkerState::*;

    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Installed)
            | (Installing, Redundant)  // install failed
            | (Installed, Activating)
            | (Activating, Activated)
            | (Activating, Redundant)  // activate failed
            | (Activated, Redundant)   // superseded by a newer version
    )
}

/// Tracks the current state of one worker and validates transitions.
#[derive(Debug)]
pub struct Lifecycle {
    state: WorkerState,
}

impl Lifecycle {
    /// New lifecycle in the Parsed state.
    pub fn new() -> Self {
        Self { state: WorkerState::Parsed }
    }

    /// Get the current state.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Transition to a new state.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` if the edge is not part of the
    /// lifecycle ordering.
    pub fn transition(&mut self, to: WorkerState) -> Result<(), Error> {
        if !is_valid_transition(self.state, to) {
            return Err(Error::InvalidTransition { from: self.state.to_string(), to: to.to_string() });
        }

        tracing::debug!("worker state {} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Skip the waiting period and begin activating immediately.
    ///
    /// Only valid from Installed; a worker that hasn't finished installing
    /// has nothing to activate.
    pub fn skip_waiting(&mut self) -> Result<(), Error> {
        if self.state != WorkerState::Installed {
            return Err(Error::InvalidTransition {
                from: self.state.to_string(),
                to: WorkerState::Activating.to_string(),
            });
        }

        self.transition(WorkerState::Activating)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), WorkerState::Parsed);
        assert!(!lifecycle.state().can_intercept());
        assert!(!lifecycle.state().is_terminal());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition(WorkerState::Installing).unwrap();
        lifecycle.transition(WorkerState::Installed).unwrap();
        lifecycle.transition(WorkerState::Activating).unwrap();
        lifecycle.transition(WorkerState::Activated).unwrap();
        assert!(lifecycle.state().can_intercept());
    }

    #[test]
    fn test_cannot_skip_phases() {
        let mut lifecycle = Lifecycle::new();
        let result = lifecycle.transition(WorkerState::Activated);
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));

        lifecycle.transition(WorkerState::Installing).unwrap();
        let result = lifecycle.transition(WorkerState::Activating);
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
    }

    #[test]
    fn test_install_failure_goes_redundant() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition(WorkerState::Installing).unwrap();
        lifecycle.transition(WorkerState::Redundant).unwrap();
        assert!(lifecycle.state().is_terminal());
    }

    #[test]
    fn test_superseded_goes_redundant() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition(WorkerState::Installing).unwrap();
        lifecycle.transition(WorkerState::Installed).unwrap();
        lifecycle.transition(WorkerState::Activating).unwrap();
        lifecycle.transition(WorkerState::Activated).unwrap();
        lifecycle.transition(WorkerState::Redundant).unwrap();
        assert!(!lifecycle.state().can_intercept());
    }

    #[test]
    fn test_skip_waiting_from_installed() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition(WorkerState::Installing).unwrap();
        lifecycle.transition(WorkerState::Installed).unwrap();
        lifecycle.skip_waiting().unwrap();
        assert_eq!(lifecycle.state(), WorkerState::Activating);
    }

    #[test]
    fn test_skip_waiting_wrong_state() {
        let mut lifecycle = Lifecycle::new();
        let result = lifecycle.skip_waiting();
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
    }

    #[test]
    fn test_no_resurrection_from_redundant() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition(WorkerState::Installing).unwrap();
        lifecycle.transition(WorkerState::Redundant).unwrap();
        let result = lifecycle.transition(WorkerState::Installing);
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
    }
}
