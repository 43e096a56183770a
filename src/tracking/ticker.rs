use std::ops::ControlFlow;
use std::time::Duration;

use anyhow::Result;

use crate::store::{KeyValueStorage, OrderStore, StatusChange};
use crate::utils::Clock;

/// Fixed-interval refresh loop.
///
/// Each tick recomputes every order's stage, then hands the store and the
/// changes of that tick to the callback. Runs on the calling thread until the
/// callback breaks or returns an error.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    interval: Duration,
    reload: bool,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            reload: false,
        }
    }

    /// Re-read persisted orders at the start of every tick, picking up
    /// writes made by other processes sharing the same database.
    pub fn with_reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until `on_tick` breaks. Returns the number of ticks executed.
    pub fn run<S, C, F>(&self, store: &mut OrderStore<S, C>, mut on_tick: F) -> Result<u64>
    where
        S: KeyValueStorage,
        C: Clock,
        F: FnMut(&OrderStore<S, C>, &[StatusChange]) -> Result<ControlFlow<()>>,
    {
        let mut ticks = 0;
        loop {
            if self.reload {
                store.load()?;
            }
            let changes = store.recompute_all();
            ticks += 1;
            if on_tick(store, &changes)?.is_break() {
                return Ok(ticks);
            }
            if !self.interval.is_zero() {
                std::thread::sleep(self.interval);
            }
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::from_millis(crate::config::DEFAULT_TICK_INTERVAL_MS)
    }
}
