use crate::{
    emitter::Emitter,
    packet::unescape_delimiter,
    sampler::SampleMode,
    transport::UdpTransport,
};
use fnv::FnvBuildHasher;
use hashbrown::HashSet;
use std::io;

pub(crate) type NameSet = HashSet<String, FnvBuildHasher>;

const DEFAULT_VALID_METHODS: &str = "GET,HEAD,POST,PUT,DELETE,COPY";

/// A configuration builder for `Emitter`.
///
/// Option names mirror the configuration surface the surrounding gateway
/// exposes, so an external config loader can hand string values straight
/// through. Values are not re-validated at emission time; in particular the
/// sample rate must be in `(0, 1]` before `build` is called.
#[derive(Clone)]
pub struct Configuration {
    pub(crate) statsd_host: String,
    pub(crate) statsd_port: u16,
    pub(crate) sample_rate: f64,
    pub(crate) sample_mode: SampleMode,
    pub(crate) valid_methods: NameSet,
    pub(crate) combined_events: bool,
    pub(crate) combine_delimiter: String,
    pub(crate) metric_prefix: String,
    pub(crate) prefixed_accounts: NameSet,
    pub(crate) healthcheck_path: String,
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration {
            statsd_host: "127.0.0.1".to_owned(),
            statsd_port: 8125,
            sample_rate: 0.5,
            sample_mode: SampleMode::Adaptive,
            valid_methods: parse_list(DEFAULT_VALID_METHODS, true),
            combined_events: false,
            combine_delimiter: "\n".to_owned(),
            metric_prefix: String::new(),
            prefixed_accounts: NameSet::default(),
            healthcheck_path: "/healthcheck".to_owned(),
        }
    }
}

impl Configuration {
    /// Creates a new `Configuration` with default values.
    pub fn new() -> Configuration {
        Default::default()
    }

    /// Sets the collector host.
    ///
    /// Defaults to `127.0.0.1`.
    pub fn statsd_host<S: Into<String>>(mut self, host: S) -> Self {
        self.statsd_host = host.into();
        self
    }

    /// Sets the collector port.
    ///
    /// Defaults to `8125`.
    pub fn statsd_port(mut self, port: u16) -> Self {
        self.statsd_port = port;
        self
    }

    /// Sets the target sample rate, the fraction of observed requests that
    /// get measured at all.
    ///
    /// Defaults to `0.5`. Must be in `(0, 1]`; validating that is the
    /// caller's job.
    pub fn statsd_sample_rate(mut self, rate: f64) -> Self {
        self.sample_rate = rate;
        self
    }

    /// Sets how sampling decisions are made.
    ///
    /// Defaults to `SampleMode::Adaptive`, which converges the emitted
    /// fraction to the target rate. `SampleMode::Random` gives strictly
    /// independent per-event decisions instead.
    pub fn sample_mode(mut self, mode: SampleMode) -> Self {
        self.sample_mode = mode;
        self
    }

    /// Sets the methods that may appear in metric names, as a comma list.
    ///
    /// Defaults to `GET,HEAD,POST,PUT,DELETE,COPY`. Anything outside the
    /// list is reported as `BAD_METHOD`, which caps the cardinality damage a
    /// garbage method can do to the metrics namespace.
    pub fn valid_http_methods(mut self, methods: &str) -> Self {
        self.valid_methods = parse_list(methods, true);
        self
    }

    /// Enables or disables combining all of a request's metric lines into a
    /// single packet.
    ///
    /// Defaults to off. Combining cuts the packet count but requires
    /// collector-side support for multi-metric packets.
    pub fn combined_events(mut self, combined: bool) -> Self {
        self.combined_events = combined;
        self
    }

    /// Sets the delimiter used to join lines in a combined packet.
    ///
    /// Defaults to a newline; `#` is the other convention seen in collector
    /// implementations. The escaped form `\n` is unescaped to an actual
    /// newline here.
    pub fn combine_key(mut self, delimiter: &str) -> Self {
        self.combine_delimiter = unescape_delimiter(delimiter);
        self
    }

    /// Sets a string prepended to every metric name.
    ///
    /// Defaults to empty.
    pub fn metric_name_prepend<S: Into<String>>(mut self, prefix: S) -> Self {
        self.metric_prefix = prefix.into();
        self
    }

    /// Sets the accounts that get account-qualified lines, as a comma list.
    ///
    /// Requests against these accounts are reported twice: once under the
    /// global prefix and once under the account identifier.
    pub fn prefix_accounts(mut self, accounts: &str) -> Self {
        self.prefixed_accounts = parse_list(accounts, false);
        self
    }

    /// Sets the path reported as a health check.
    ///
    /// Defaults to `/healthcheck`.
    pub fn healthcheck_path<S: Into<String>>(mut self, path: S) -> Self {
        self.healthcheck_path = path.into();
        self
    }

    /// Creates an `Emitter` sending to the configured collector over UDP.
    ///
    /// Address resolution and socket creation are the only fallible steps in
    /// the emitter's life; after this, nothing fails past the emitter.
    pub fn build(self) -> io::Result<Emitter<UdpTransport>> {
        let transport = UdpTransport::connect((self.statsd_host.as_str(), self.statsd_port))?;
        Ok(Emitter::with_transport(self, transport))
    }
}

fn parse_list(raw: &str, uppercase: bool) -> NameSet {
    let mut set = NameSet::default();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        if uppercase {
            set.insert(entry.to_uppercase());
        } else {
            set.insert(entry.to_owned());
        }
    }
    set
}
