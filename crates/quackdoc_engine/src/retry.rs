use std::thread;

use quackdoc_core::{advance, AttemptEvent, AttemptState, RetryPolicy};
use quackdoc_logging::quack_warn;

use crate::ConvertError;

/// Returned when every attempt failed, or a non-retryable error stopped the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Exhausted {
    pub attempts: u32,
    pub error: ConvertError,
}

/// Calls `attempt` until it succeeds or the policy's attempt budget is spent.
///
/// `attempt` receives the 1-based attempt number. `on_failure` sees every
/// failed attempt before the delay. Returns the value and the attempts used.
pub fn run_with_retry<T, F, R>(
    policy: &RetryPolicy,
    mut attempt: F,
    mut on_failure: R,
) -> Result<(T, u32), Exhausted>
where
    F: FnMut(u32) -> Result<T, ConvertError>,
    R: FnMut(u32, u32, &ConvertError),
{
    let max = policy.max_attempts();
    let delay = policy.delay();
    let mut state = advance(AttemptState::Probed, AttemptEvent::Begin, max);

    loop {
        let current = state.attempts();
        match attempt(current) {
            Ok(value) => {
                state = advance(state, AttemptEvent::ToolFinished, max);
                state = advance(state, AttemptEvent::ValidationPassed, max);
                return Ok((value, state.attempts()));
            }
            Err(error) => {
                state = match &error {
                    ConvertError::Validation(_) => {
                        let validating = advance(state, AttemptEvent::ToolFinished, max);
                        advance(validating, AttemptEvent::ValidationFailed, max)
                    }
                    e if e.is_retryable() => advance(state, AttemptEvent::ToolFailed, max),
                    _ => advance(state, AttemptEvent::Abort, max),
                };
                on_failure(current, max, &error);

                if !matches!(state, AttemptState::RetryPending { .. }) {
                    return Err(Exhausted {
                        attempts: state.attempts(),
                        error,
                    });
                }
                quack_warn!(
                    "attempt {}/{} failed: {}; retrying in {:?}",
                    current,
                    max,
                    error,
                    delay
                );
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                state = advance(state, AttemptEvent::Begin, max);
            }
        }
    }
}
