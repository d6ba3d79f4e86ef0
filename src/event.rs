use std::time::Instant;

/// The observable outcome of a single completed request.
///
/// The surrounding request pipeline builds one of these per request and hands
/// it to the emitter exactly once, including for requests that failed before
/// ever producing a response. All status and timing data travels in here
/// explicitly; the emitter holds no per-request state of its own.
#[derive(Clone, Debug)]
pub struct RequestOutcome {
    /// Request path as received, e.g. `/v1/acct/cont/obj`.
    pub path: String,

    /// Request method as received. Normalization happens during
    /// classification, so callers may pass it through untouched.
    pub method: String,

    /// Final response status, if the response layer recorded one. `None`
    /// means the completion hook fired without the response layer ever
    /// calling back.
    pub status: Option<u16>,

    /// Whether either side of the exchange observed the client disconnect.
    pub client_disconnected: bool,

    /// When the request entered the pipeline.
    pub start_time: Option<Instant>,

    /// Bytes transferred as counted on the request side. Upstream layers
    /// that report an unset marker should map it to `None`.
    pub request_bytes: Option<u64>,

    /// Bytes transferred as counted on the response side, used as a fallback
    /// when the request side recorded nothing.
    pub response_bytes: Option<u64>,

    /// Explicit resource override for requests generated by internal
    /// subsystems; used verbatim as the resource segment when present.
    pub source_tag: Option<String>,
}

impl RequestOutcome {
    /// Creates an outcome with everything but path and method unset.
    pub fn new<P, M>(path: P, method: M) -> RequestOutcome
    where
        P: Into<String>,
        M: Into<String>,
    {
        RequestOutcome {
            path: path.into(),
            method: method.into(),
            status: None,
            client_disconnected: false,
            start_time: None,
            request_bytes: None,
            response_bytes: None,
            source_tag: None,
        }
    }
}
