//! Wavefront data format
//!
//! ```text
//! "<name>" <value> [<timestamp_secs>] source="<source>" "<k>"="<v>" ...
//! !M <timestamp_secs> #<weight> <mean> ... "<name>" source="<source>" "<k>"="<v>" ...
//! ```
//!
//! Names, sources and tags are double-quoted. Embedded quotes are escaped and
//! line breaks are written as `\n` / `\r`, so every point stays on one line.

use std::fmt::Write;

use telemeter_domain::{Centroid, Granularity, PointTags};

use super::{SenderError, SenderResult};

/// Distribution line prefix for a granularity.
pub const fn granularity_prefix(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Minute => "!M",
        Granularity::Hour => "!H",
        Granularity::Day => "!D",
    }
}

/// Render one metric point, newline-terminated.
///
/// # Errors
///
/// Returns [`SenderError::InvalidMetric`] if `name` is blank or `value` is
/// not finite.
pub fn metric_line(
    name: &str,
    value: f64,
    timestamp_millis: Option<u64>,
    source: &str,
    tags: &PointTags,
) -> SenderResult<String> {
    validate_name(name)?;
    if !value.is_finite() {
        return Err(SenderError::InvalidMetric(format!("'{name}' has non-finite value {value}")));
    }

    let mut line = format!("{} {value}", quote(name));
    if let Some(millis) = timestamp_millis {
        let _ = write!(line, " {}", millis / 1000);
    }
    push_source_and_tags(&mut line, source, tags);
    Ok(line)
}

/// Render one distribution line for a single granularity.
///
/// # Errors
///
/// Returns [`SenderError::InvalidMetric`] if `name` is blank or `centroids`
/// is empty.
pub fn distribution_line(
    name: &str,
    centroids: &[Centroid],
    granularity: Granularity,
    timestamp_secs: u64,
    source: &str,
    tags: &PointTags,
) -> SenderResult<String> {
    validate_name(name)?;
    if centroids.is_empty() {
        return Err(SenderError::InvalidMetric(format!("distribution '{name}' has no centroids")));
    }

    let mut line = format!("{} {timestamp_secs}", granularity_prefix(granularity));
    for centroid in centroids {
        let _ = write!(line, " #{} {}", centroid.weight, centroid.mean);
    }
    let _ = write!(line, " {}", quote(name));
    push_source_and_tags(&mut line, source, tags);
    Ok(line)
}

fn validate_name(name: &str) -> SenderResult<()> {
    if name.trim().is_empty() {
        return Err(SenderError::InvalidMetric("metric name must not be blank".into()));
    }
    Ok(())
}

fn push_source_and_tags(line: &mut String, source: &str, tags: &PointTags) {
    let _ = write!(line, " source={}", quote(source));
    for (key, value) in tags {
        let _ = write!(line, " {}={}", quote(key), quote(&value.to_string()));
    }
    line.push('\n');
}

fn quote(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for ch in raw.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_line_without_timestamp() {
        let tags = PointTags::new().with("env", "prod").with("app", "api");
        let line = metric_line("requests.count", 42.0, None, "web-1", &tags).expect("valid");
        assert_eq!(line, "\"requests.count\" 42 source=\"web-1\" \"app\"=\"api\" \"env\"=\"prod\"\n");
    }

    #[test]
    fn metric_line_truncates_timestamp_to_seconds() {
        let line = metric_line("temp.value", 21.5, Some(1_700_000_000_999), "h", &PointTags::new())
            .expect("valid");
        assert_eq!(line, "\"temp.value\" 21.5 1700000000 source=\"h\"\n");
    }

    #[test]
    fn quotes_are_escaped() {
        let tags = PointTags::new().with("q", "say \"hi\"");
        let line = metric_line("a\"b", 1.0, None, "s", &tags).expect("valid");
        assert_eq!(line, "\"a\\\"b\" 1 source=\"s\" \"q\"=\"say \\\"hi\\\"\"\n");
    }

    #[test]
    fn line_breaks_cannot_split_a_point() {
        let tags = PointTags::new().with("note", "a\n\"evil\" 1 source=\"x\"");
        let line = metric_line("ok\r\nsecond", 1.0, None, "web\n1", &tags).expect("valid");

        assert_eq!(line.lines().count(), 1);
        assert_eq!(
            line,
            "\"ok\\r\\nsecond\" 1 source=\"web\\n1\" \"note\"=\"a\\n\\\"evil\\\" 1 source=\\\"x\\\"\"\n"
        );

        let centroids = [Centroid::new(1.0, 1)];
        let dist = distribution_line("lat\nency", &centroids, Granularity::Minute, 0, "s", &tags)
            .expect("valid");
        assert_eq!(dist.lines().count(), 1);
    }

    #[test]
    fn distribution_line_lists_weighted_means() {
        let centroids = vec![Centroid::new(1.5, 3), Centroid::new(10.0, 1)];
        let line = distribution_line(
            "latency",
            &centroids,
            Granularity::Hour,
            1_700_000_000,
            "web-1",
            &PointTags::new().with("dc", "east"),
        )
        .expect("valid");
        assert_eq!(
            line,
            "!H 1700000000 #3 1.5 #1 10 \"latency\" source=\"web-1\" \"dc\"=\"east\"\n"
        );
    }

    #[test]
    fn rejects_unexpressible_points() {
        let tags = PointTags::new();
        assert!(matches!(
            metric_line(" ", 1.0, None, "s", &tags),
            Err(SenderError::InvalidMetric(_))
        ));
        assert!(metric_line("x", f64::NAN, None, "s", &tags).is_err());
        assert!(distribution_line("x", &[], Granularity::Minute, 0, "s", &tags).is_err());
    }
}
