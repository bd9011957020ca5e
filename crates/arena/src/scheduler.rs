//! Time-ordered one-shot event queue.
//!
//! Events are kept sorted by execution time. The owner advances the clock
//! once per frame and then drains due events with [`EventScheduler::pop_due`]
//! in a loop, so several events falling due in the same frame all fire, and
//! an event registered while draining with zero delay fires in the same pass.

/// Default clamp for a single clock step, in seconds.
pub const DEFAULT_MAX_STEP: f64 = 0.25;

/// A scheduled action.
#[derive(Debug, Clone)]
pub struct GameEvent<A, K> {
    /// Clock time at which the event becomes due.
    pub at: f64,
    pub action: A,
    /// At most one outstanding event exists per key.
    pub key: Option<K>,
}

/// One-shot scheduler driving timers.
#[derive(Debug, Clone)]
pub struct EventScheduler<A, K> {
    now: f64,
    max_step: f64,
    paused: bool,
    queue: Vec<GameEvent<A, K>>,
}

impl<A, K: PartialEq> EventScheduler<A, K> {
    pub fn new(max_step: f64) -> Self {
        Self {
            now: 0.0,
            max_step: if max_step > 0.0 { max_step } else { DEFAULT_MAX_STEP },
            paused: false,
            queue: Vec::with_capacity(32),
        }
    }

    /// Current clock time in seconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Advance the clock by `dt` clamped to the maximum step.
    /// Returns the time actually applied.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if self.paused {
            return 0.0;
        }
        let step = dt.clamp(0.0, self.max_step);
        self.now += step;
        step
    }

    /// Schedule `action` to run `delay` seconds from now.
    ///
    /// Returns false (and drops the action) when `key` is already scheduled.
    pub fn register(&mut self, delay: f64, action: A, key: Option<K>) -> bool {
        if let Some(k) = &key {
            if self.is_scheduled(k) {
                return false;
            }
        }
        let at = self.now + delay.max(0.0);
        let index = self.queue.partition_point(|e| e.at <= at);
        self.queue.insert(index, GameEvent { at, action, key });
        true
    }

    /// Remove and return the earliest event whose time has passed.
    pub fn pop_due(&mut self) -> Option<A> {
        if self.paused {
            return None;
        }
        match self.queue.first() {
            Some(event) if event.at <= self.now => Some(self.queue.remove(0).action),
            _ => None,
        }
    }

    pub fn is_scheduled(&self, key: &K) -> bool {
        self.queue.iter().any(|e| e.key.as_ref() == Some(key))
    }

    /// Seconds until the event with `key` fires.
    pub fn time_until(&self, key: &K) -> Option<f64> {
        self.queue
            .iter()
            .find(|e| e.key.as_ref() == Some(key))
            .map(|e| (e.at - self.now).max(0.0))
    }

    /// Drop the outstanding event with `key`. Returns true if one was removed.
    pub fn cancel(&mut self, key: &K) -> bool {
        let before = self.queue.len();
        self.queue.retain(|e| e.key.as_ref() != Some(key));
        self.queue.len() != before
    }

    /// Clear the queue and zero the clock.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.now = 0.0;
    }
}
