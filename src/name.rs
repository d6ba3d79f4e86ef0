use crate::{configuration::Configuration, event::RequestOutcome};
use std::fmt::{self, Display};

/// Coarse classification of a request's target resource.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ResourceType {
    Account,
    Container,
    Object,
    /// Anything that fails classification, including malformed paths.
    Invalid,
    Healthcheck,
    /// Caller-supplied override for requests generated by internal
    /// subsystems, reported verbatim.
    Custom(String),
}

impl ResourceType {
    /// True for the account/container/object storage hierarchy.
    pub(crate) fn is_storage(&self) -> bool {
        match *self {
            ResourceType::Account | ResourceType::Container | ResourceType::Object => true,
            _ => false,
        }
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ResourceType::Account => write!(f, "acct"),
            ResourceType::Container => write!(f, "cont"),
            ResourceType::Object => write!(f, "obj"),
            ResourceType::Invalid => write!(f, "invalid"),
            ResourceType::Healthcheck => write!(f, "healthcheck"),
            ResourceType::Custom(ref tag) => write!(f, "{}", tag),
        }
    }
}

/// Canonical metric identity for one request.
///
/// Displays as `<resource>.<METHOD>.<status>`, the name every line for the
/// request hangs off of.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MetricName {
    pub resource: ResourceType,
    pub method: String,
    pub status: u16,
}

impl Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.resource, self.method, self.status)
    }
}

/// Derives the metric identity for a request outcome.
///
/// Pure: reads the outcome and configuration, touches nothing else, and
/// cannot fail. Anything it does not recognize degrades to
/// `ResourceType::Invalid`.
pub fn classify(outcome: &RequestOutcome, config: &Configuration) -> MetricName {
    let resource = match outcome.source_tag {
        Some(ref tag) => ResourceType::Custom(tag.clone()),
        None => classify_path(&outcome.path, &config.healthcheck_path),
    };

    let mut method = outcome.method.to_uppercase();
    if !config.valid_methods.contains(method.as_str()) {
        method = "BAD_METHOD".to_owned();
    }

    // A client disconnect trumps whatever the response layer reported, and a
    // never-reported status gets the 599 sentinel.
    let status = if outcome.client_disconnected {
        499
    } else {
        outcome.status.unwrap_or(599)
    };

    MetricName {
        resource,
        method,
        status,
    }
}

/// Builds the full set of statsd lines for one sampled request: counter,
/// timer, and transfer, plus the account-qualified pair for accounts the
/// configuration singles out.
pub(crate) fn build_lines(outcome: &RequestOutcome, config: &Configuration) -> Vec<String> {
    let name = classify(outcome, config);
    let rate = config.sample_rate;
    let prefix = &config.metric_prefix;

    let duration_ms = match outcome.start_time {
        Some(start) => (start.elapsed().as_secs_f64() * 1000.0).round() as u64,
        None => 0,
    };

    let bytes = match outcome.request_bytes {
        Some(n) if n > 0 => n,
        _ => outcome.response_bytes.unwrap_or(0),
    };

    let mut lines = Vec::with_capacity(5);
    lines.push(format!("{}{}:1|c|@{}", prefix, name, rate));
    lines.push(format!("{}{}:{}|ms|@{}", prefix, name, duration_ms, rate));
    lines.push(format!("{}tfer.{}:{}|c|@{}", prefix, name, bytes, rate));

    if name.resource.is_storage() {
        if let Some(account) = account_segment(&outcome.path) {
            if config.prefixed_accounts.contains(account) {
                lines.push(format!("{}.{}:1|c|@{}", account, name, rate));
                lines.push(format!("{}.{}:{}|ms|@{}", account, name, duration_ms, rate));
            }
        }
    }

    lines
}

/// Classification is over non-empty segments, so trailing and repeated
/// slashes never change the result.
fn classify_path(path: &str, healthcheck_path: &str) -> ResourceType {
    if path == healthcheck_path {
        return ResourceType::Healthcheck;
    }

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match segments.next() {
        Some(first) if is_version_segment(first) => match segments.count() {
            1 => ResourceType::Account,
            2 => ResourceType::Container,
            n if n >= 3 => ResourceType::Object,
            _ => ResourceType::Invalid,
        },
        _ => ResourceType::Invalid,
    }
}

/// The account identifier: the first path segment after the API version.
fn account_segment(path: &str) -> Option<&str> {
    path.split('/').filter(|s| !s.is_empty()).nth(1)
}

/// Matches `v` followed by digits, with an optional dotted minor (`v1`,
/// `v1.0`).
fn is_version_segment(segment: &str) -> bool {
    if !segment.starts_with('v') {
        return false;
    }
    let rest = &segment[1..];
    !rest.is_empty()
        && rest.chars().all(|c| c.is_ascii_digit() || c == '.')
        && rest.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{account_segment, build_lines, classify, classify_path, ResourceType};
    use crate::{configuration::Configuration, event::RequestOutcome};
    use std::time::Instant;

    fn outcome(path: &str, method: &str, status: u16) -> RequestOutcome {
        let mut outcome = RequestOutcome::new(path, method);
        outcome.status = Some(status);
        outcome
    }

    #[test]
    fn test_classify_path_hierarchy() {
        let hc = "/healthcheck";
        assert_eq!(classify_path("/v1/acct", hc), ResourceType::Account);
        assert_eq!(classify_path("/v1/acct/cont", hc), ResourceType::Container);
        assert_eq!(classify_path("/v1/acct/cont/obj", hc), ResourceType::Object);
        assert_eq!(
            classify_path("/v1/acct/cont/obj/extra/extra2", hc),
            ResourceType::Object
        );
        assert_eq!(classify_path("/healthcheck", hc), ResourceType::Healthcheck);
        assert_eq!(classify_path("/randomgarbage", hc), ResourceType::Invalid);
        assert_eq!(classify_path("/v1", hc), ResourceType::Invalid);
        assert_eq!(classify_path("/", hc), ResourceType::Invalid);
        assert_eq!(classify_path("", hc), ResourceType::Invalid);
    }

    #[test]
    fn test_classify_path_slash_noise() {
        let hc = "/healthcheck";
        assert_eq!(classify_path("/v1/acct/", hc), ResourceType::Account);
        assert_eq!(classify_path("//v1//acct//cont/", hc), ResourceType::Container);
        assert_eq!(classify_path("/v1.0/acct", hc), ResourceType::Account);
        assert_eq!(classify_path("/version/acct", hc), ResourceType::Invalid);
        assert_eq!(classify_path("/v./acct", hc), ResourceType::Invalid);
    }

    #[test]
    fn test_classify_method_normalization() {
        let config = Configuration::new();

        let name = classify(&outcome("/v1/acct", "get", 200), &config);
        assert_eq!(name.method, "GET");

        let name = classify(&outcome("/randomgarbage", "WTFMONKEYS", 200), &config);
        assert_eq!(name.method, "BAD_METHOD");
        assert_eq!(name.resource, ResourceType::Invalid);
    }

    #[test]
    fn test_classify_disconnect_overrides_status() {
        let config = Configuration::new();
        let mut o = outcome("/v1/acct", "GET", 200);
        o.client_disconnected = true;

        let name = classify(&o, &config);
        assert_eq!(name.status, 499);
    }

    #[test]
    fn test_classify_missing_status_sentinel() {
        let config = Configuration::new();
        let o = RequestOutcome::new("/v1/acct", "GET");

        let name = classify(&o, &config);
        assert_eq!(name.status, 599);
    }

    #[test]
    fn test_classify_source_tag_override() {
        let config = Configuration::new();
        let mut o = outcome("/v1/acct", "GET", 200);
        o.source_tag = Some("replicator".to_owned());

        let name = classify(&o, &config);
        assert_eq!(name.resource, ResourceType::Custom("replicator".to_owned()));
        assert_eq!(format!("{}", name), "replicator.GET.200");
    }

    #[test]
    fn test_build_lines_basic_set() {
        let config = Configuration::new();
        let mut o = outcome("/v1/a/c/o", "GET", 200);
        o.start_time = Some(Instant::now());
        o.request_bytes = Some(500);

        let lines = build_lines(&o, &config);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "obj.GET.200:1|c|@0.5");
        assert!(lines[1].starts_with("obj.GET.200:"));
        assert!(lines[1].ends_with("|ms|@0.5"));
        assert_eq!(lines[2], "tfer.obj.GET.200:500|c|@0.5");
    }

    #[test]
    fn test_build_lines_prefix() {
        let config = Configuration::new().metric_name_prepend("proxy01.");
        let o = outcome("/v1/acct", "HEAD", 204);

        let lines = build_lines(&o, &config);
        assert!(lines[0].starts_with("proxy01.acct.HEAD.204:1|c"));
        assert!(lines[2].starts_with("proxy01.tfer.acct.HEAD.204:"));
    }

    #[test]
    fn test_build_lines_transfer_fallback() {
        let config = Configuration::new();

        // Request side unset, response side known.
        let mut o = outcome("/v1/acct", "GET", 200);
        o.response_bytes = Some(500);
        let lines = build_lines(&o, &config);
        assert_eq!(lines[2], "tfer.acct.GET.200:500|c|@0.5");

        // Request side zero also falls back.
        let mut o = outcome("/v1/acct", "GET", 200);
        o.request_bytes = Some(0);
        o.response_bytes = Some(123);
        let lines = build_lines(&o, &config);
        assert_eq!(lines[2], "tfer.acct.GET.200:123|c|@0.5");

        // Both unset clamps to zero.
        let o = outcome("/v1/acct", "GET", 200);
        let lines = build_lines(&o, &config);
        assert_eq!(lines[2], "tfer.acct.GET.200:0|c|@0.5");
    }

    #[test]
    fn test_build_lines_no_start_time() {
        let config = Configuration::new();
        let o = outcome("/v1/acct", "GET", 200);

        let lines = build_lines(&o, &config);
        assert_eq!(lines[1], "acct.GET.200:0|ms|@0.5");
    }

    #[test]
    fn test_build_lines_account_qualified() {
        let config = Configuration::new().prefix_accounts("AUTH_admin");
        let o = outcome("/v1/AUTH_admin/cont", "PUT", 201);

        let lines = build_lines(&o, &config);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "AUTH_admin.cont.PUT.201:1|c|@0.5");
        assert!(lines[4].starts_with("AUTH_admin.cont.PUT.201:"));
        assert!(lines[4].ends_with("|ms|@0.5"));
    }

    #[test]
    fn test_build_lines_unlisted_account_not_qualified() {
        let config = Configuration::new().prefix_accounts("AUTH_admin");
        let o = outcome("/v1/AUTH_other/cont", "PUT", 201);

        let lines = build_lines(&o, &config);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_account_segment() {
        assert_eq!(account_segment("/v1/AUTH_a/c/o"), Some("AUTH_a"));
        assert_eq!(account_segment("/v1//AUTH_a/"), Some("AUTH_a"));
        assert_eq!(account_segment("/v1"), None);
        assert_eq!(account_segment(""), None);
    }
}
