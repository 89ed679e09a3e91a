//! Launch gate shared by the worker pool.
//!
//! Identifiers live in an index-addressable queue. Each admission takes the
//! next index and its start slot under one lock, so admission order always
//! matches input order and slots never get closer than the policy spacing.

use std::sync::{Mutex, MutexGuard};

use log::{debug, warn};
use tokio::time::Instant;

use super::LaunchPolicy;
use crate::models::Identifier;

/// An identifier admitted for lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Admission {
    /// Position in the input sequence.
    pub position: usize,
    pub identifier: Identifier,
    /// Earliest instant the first request may be sent.
    pub start_at: Instant,
}

#[derive(Debug)]
struct LaunchState {
    next_position: usize,
    last_start: Option<Instant>,
}

/// Hands out identifiers in order, each with its start slot.
pub struct LaunchScheduler {
    identifiers: Vec<Identifier>,
    policy: LaunchPolicy,
    origin: Instant,
    state: Mutex<LaunchState>,
}

impl LaunchScheduler {
    /// Creates a scheduler whose clock starts now.
    pub fn new(identifiers: Vec<Identifier>, policy: LaunchPolicy) -> Self {
        Self {
            identifiers,
            policy,
            origin: Instant::now(),
            state: Mutex::new(LaunchState {
                next_position: 0,
                last_start: None,
            }),
        }
    }

    /// Lock the state mutex, recovering from poison if necessary.
    fn lock_state(&self) -> MutexGuard<'_, LaunchState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Launch scheduler mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Takes the next identifier and reserves its start slot.
    ///
    /// Returns `None` once every identifier has been admitted.
    pub fn admit(&self) -> Option<Admission> {
        let mut state = self.lock_state();

        let position = state.next_position;
        let identifier = self.identifiers.get(position)?.clone();

        let now = Instant::now();
        let floor = match self.policy.earliest_offset(position) {
            Some(offset) => (self.origin + offset).max(now),
            None => now,
        };
        let start_at = match state.last_start {
            Some(last) => floor.max(last + self.policy.spacing()),
            None => floor,
        };

        state.next_position += 1;
        state.last_start = Some(start_at);

        Some(Admission {
            position,
            identifier,
            start_at,
        })
    }

    /// Admits the next identifier and waits for its start slot.
    pub async fn next(&self) -> Option<Admission> {
        let admission = self.admit()?;

        let now = Instant::now();
        if admission.start_at > now {
            debug!(
                "Launch gate: '{}' (#{}) waits {:?}",
                admission.identifier,
                admission.position,
                admission.start_at - now
            );
            tokio::time::sleep_until(admission.start_at).await;
        }

        Some(admission)
    }
}
