/// Lifecycle of one file conversion.
///
/// `Probed -> Executing -> Validating -> Succeeded`, with failed attempts
/// going through `RetryPending` back to `Executing` until the attempt budget
/// is spent. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttemptState {
    #[default]
    Probed,
    Executing { attempt: u32 },
    Validating { attempt: u32 },
    RetryPending { attempt: u32 },
    Succeeded { attempts: u32 },
    Failed { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptEvent {
    /// Start the first attempt, or the next one after a retry delay.
    Begin,
    ToolFinished,
    ToolFailed,
    ValidationPassed,
    ValidationFailed,
    /// A non-retryable error ends the conversion immediately.
    Abort,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AttemptState::Succeeded { .. } | AttemptState::Failed { .. }
        )
    }

    /// Attempts started so far.
    pub fn attempts(self) -> u32 {
        match self {
            AttemptState::Probed => 0,
            AttemptState::Executing { attempt }
            | AttemptState::Validating { attempt }
            | AttemptState::RetryPending { attempt } => attempt,
            AttemptState::Succeeded { attempts } | AttemptState::Failed { attempts } => attempts,
        }
    }
}

/// Pure transition function. Events that do not apply to a state leave it unchanged.
pub fn advance(state: AttemptState, event: AttemptEvent, max_attempts: u32) -> AttemptState {
    let max_attempts = max_attempts.max(1);
    if state.is_terminal() {
        return state;
    }
    match (state, event) {
        (_, AttemptEvent::Abort) => AttemptState::Failed {
            attempts: state.attempts(),
        },
        (AttemptState::Probed, AttemptEvent::Begin) => AttemptState::Executing { attempt: 1 },
        (AttemptState::RetryPending { attempt }, AttemptEvent::Begin) => {
            AttemptState::Executing {
                attempt: attempt + 1,
            }
        }
        (AttemptState::Executing { attempt }, AttemptEvent::ToolFinished) => {
            AttemptState::Validating { attempt }
        }
        (AttemptState::Executing { attempt }, AttemptEvent::ToolFailed)
        | (AttemptState::Validating { attempt }, AttemptEvent::ValidationFailed) => {
            if attempt < max_attempts {
                AttemptState::RetryPending { attempt }
            } else {
                AttemptState::Failed { attempts: attempt }
            }
        }
        (AttemptState::Validating { attempt }, AttemptEvent::ValidationPassed) => {
            AttemptState::Succeeded { attempts: attempt }
        }
        (unchanged, _) => unchanged,
    }
}
