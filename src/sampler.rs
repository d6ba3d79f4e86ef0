use rand::Rng;
use std::sync::Mutex;

/// How per-event sampling decisions are made.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SampleMode {
    /// Catch-up sampling: track the emitted fraction over all observed
    /// events and emit whenever it trails the target rate. Bursts of
    /// non-sampling are compensated by bursts of sampling until the ratio
    /// realigns, so the long-run emitted fraction converges to the target.
    Adaptive,

    /// One independent uniform draw per event, compared against the target
    /// rate. Unbiased per event, but makes no attempt to correct for recent
    /// drift.
    Random,
}

#[derive(Default, Debug)]
struct SamplingState {
    observed: u64,
    sampled: u64,
    observed_rate: f64,
}

impl SamplingState {
    fn decide(&mut self, target_rate: f64) -> bool {
        self.observed += 1;
        let sampled = self.observed_rate < target_rate;
        if sampled {
            self.sampled += 1;
        }
        self.observed_rate = self.sampled as f64 / self.observed as f64;

        // Both counters reset together so the ratio re-converges from fresh
        // data instead of wrapping.
        if self.observed >= u64::max_value() || self.sampled >= u64::max_value() {
            self.observed = 0;
            self.sampled = 0;
        }

        sampled
    }
}

/// Decides, once per observed event, whether the event should be emitted.
///
/// Safe to share across request-handling threads; the counters are
/// mutex-serialized so concurrent decisions cannot corrupt the observed
/// ratio.
pub struct Sampler {
    target_rate: f64,
    mode: SampleMode,
    state: Mutex<SamplingState>,
}

impl Sampler {
    pub fn new(target_rate: f64, mode: SampleMode) -> Sampler {
        Sampler {
            target_rate,
            mode,
            state: Mutex::new(SamplingState::default()),
        }
    }

    /// Records one observed event and reports whether to emit it.
    pub fn should_sample(&self) -> bool {
        match self.mode {
            SampleMode::Random => rand::thread_rng().gen::<f64>() < self.target_rate,
            SampleMode::Adaptive => self.lock_state().decide(self.target_rate),
        }
    }

    /// The fraction of observed events emitted so far.
    ///
    /// Always `0.0` in random mode, which keeps no history.
    pub fn observed_rate(&self) -> f64 { self.lock_state().observed_rate }

    fn lock_state(&self) -> std::sync::MutexGuard<SamplingState> {
        // A poisoned lock still holds structurally valid counters, and a
        // metrics decision must never take the request pipeline down.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
