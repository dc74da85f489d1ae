use crate::github::DataFetchError;
use crate::stats::StatsResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading { username: String },
    Loaded { username: String, stats: StatsResult },
    Failed { message: String },
}

/// Identifies one submission. Only the newest ticket may update the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Session {
    generation: u64,
    state: ViewState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim a submitted username, rejecting blank input.
pub fn validate_username(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl Session {
    pub fn new() -> Self {
        Self {
            generation: 0,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Start a submission, superseding any in flight.
    pub fn begin(&mut self, username: &str) -> Ticket {
        self.generation += 1;
        self.state = ViewState::Loading {
            username: username.to_string(),
        };
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Apply a finished submission. Returns `false` and leaves the state
    /// untouched when `ticket` has been superseded.
    pub fn finish(
        &mut self,
        ticket: Ticket,
        username: &str,
        result: Result<StatsResult, DataFetchError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(username, ticket = ticket.0, "dropping stale result");
            return false;
        }

        self.state = match result {
            Ok(stats) => ViewState::Loaded {
                username: username.to_string(),
                stats,
            },
            Err(err) => {
                tracing::warn!(username, error = %err, "fetch failed");
                ViewState::Failed {
                    message: err.user_message(),
                }
            }
        };
        true
    }
}
