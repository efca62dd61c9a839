//! Caller-side guard for overlapping fetches.
//!
//! The service and router answer each request independently and never hold a token. A
//! client that re-ranks while a previous rank or distribution call is in flight calls
//! [`LatestResult::begin`] per request and passes each response to
//! [`LatestResult::resolve`]; responses from superseded requests are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Ticket identifying one fetch; only the newest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic request counter used to drop responses superseded by a newer request.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: AtomicU64,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> GenerationToken {
        GenerationToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }
}

/// Holds the most recent result, ignoring late arrivals from stale requests.
#[derive(Debug)]
pub struct LatestResult<T> {
    generation: RequestGeneration,
    value: Mutex<Option<(GenerationToken, T)>>,
}

impl<T> Default for LatestResult<T> {
    fn default() -> Self {
        Self {
            generation: RequestGeneration::new(),
            value: Mutex::new(None),
        }
    }
}

impl<T: Clone> LatestResult<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> GenerationToken {
        self.generation.begin()
    }

    /// Store `value` if `token` is still the newest request. Returns whether it was applied.
    pub fn resolve(&self, token: GenerationToken, value: T) -> bool {
        let mut slot = match self.value.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if !self.generation.is_current(token) {
            return false;
        }

        *slot = Some((token, value));
        true
    }

    pub fn current(&self) -> Option<T> {
        let slot = match self.value.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.as_ref().map(|(_, value)| value.clone())
    }
}
