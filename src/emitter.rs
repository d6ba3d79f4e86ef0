use crate::{
    configuration::Configuration,
    event::RequestOutcome,
    name, packet,
    sampler::Sampler,
    transport::Transport,
};
use log::warn;

/// Per-request orchestration: sample, name, encode, send.
///
/// One emitter serves one configured collector for the life of the process.
/// It is safe to share across request-handling threads; the only mutable
/// state is the sampler's counters, which serialize internally.
pub struct Emitter<T: Transport> {
    config: Configuration,
    sampler: Sampler,
    transport: T,
}

impl<T: Transport> Emitter<T> {
    /// Creates an emitter over a caller-supplied transport.
    ///
    /// Most callers want `Configuration::build`, which wires up the UDP
    /// transport; this exists for tests and for embedding over a different
    /// packet sink.
    pub fn with_transport(config: Configuration, transport: T) -> Emitter<T> {
        let sampler = Sampler::new(config.sample_rate, config.sample_mode);
        Emitter {
            config,
            sampler,
            transport,
        }
    }

    /// Records one completed request.
    ///
    /// Called synchronously by the surrounding pipeline, exactly once per
    /// request. Unsampled events return immediately and cost nothing
    /// further; that early exit is the whole cost-control mechanism. Nothing
    /// in here reports failure back to the caller: a dropped metric is
    /// acceptable, a disrupted request is not.
    pub fn handle(&self, outcome: &RequestOutcome) {
        if !self.sampler.should_sample() {
            return;
        }

        let lines = name::build_lines(outcome, &self.config);
        let packets = packet::encode(
            lines,
            self.config.combined_events,
            &self.config.combine_delimiter,
        );

        for payload in packets {
            if let Err(e) = self.transport.send(payload.as_bytes()) {
                warn!("dropping statsd packet: {}", e);
            }
        }
    }

    /// The fraction of observed requests emitted so far.
    pub fn observed_rate(&self) -> f64 { self.sampler.observed_rate() }
}
