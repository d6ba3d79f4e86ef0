/// Turns a set of metric lines into transport payloads.
///
/// With `combine` unset, every line becomes its own packet, which keeps
/// compatibility with collectors that expect one metric per datagram. With
/// `combine` set, all lines are joined with `delimiter` into a single
/// payload; the whole batch then shares one delivery fate. No size-based
/// splitting happens here, so callers must keep combined batches under the
/// transport's MTU through configuration.
pub fn encode(lines: Vec<String>, combine: bool, delimiter: &str) -> Vec<String> {
    if !combine || lines.is_empty() {
        return lines;
    }

    vec![lines.join(delimiter)]
}

/// Unescapes the two-character `\n` sequence, as carried by configuration
/// files, into an actual newline. Other delimiters (`#` in particular) pass
/// through untouched.
pub(crate) fn unescape_delimiter(raw: &str) -> String { raw.replace("\\n", "\n") }
