//! Small string and timing helpers.

use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Measures elapsed wall-clock time between `start` and `stop`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopWatch {
    start: Option<Instant>,
    stop: Option<Instant>,
}

impl StopWatch {
    /// Create a stopped watch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: None,
            stop: None,
        }
    }

    /// Create a watch that is already running.
    #[must_use]
    pub fn started() -> Self {
        let mut watch = Self::new();
        watch.start();
        watch
    }

    /// Start (or restart) timing, clearing any previous stop.
    pub fn start(&mut self) {
        self.start = Some(Instant::now());
        self.stop = None;
    }

    /// Stop timing.
    pub fn stop(&mut self) {
        self.stop = Some(Instant::now());
    }

    /// Time elapsed since start, up to the stop if stopped.
    ///
    /// Zero when never started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        match (self.start, self.stop) {
            (None, _) => Duration::ZERO,
            (Some(start), None) => start.elapsed(),
            (Some(start), Some(stop)) => stop.saturating_duration_since(start),
        }
    }
}

/// Name of the host, from `HOSTNAME` or the kernel.
///
/// Empty when neither source is available.
#[must_use]
pub fn host_name() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.trim().is_empty() {
            return name.trim().to_string();
        }
    }
    match std::fs::read_to_string("/proc/sys/kernel/hostname") {
        Ok(name) => name.trim().to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Error retrieving host name");
            String::new()
        }
    }
}

/// Re-render a numeric string with exactly `decimals` fractional digits.
///
/// Blank or non-numeric input yields an empty string.
#[must_use]
pub fn to_decimal_string(input: &str, decimals: usize) -> String {
    input
        .trim()
        .parse::<f64>()
        .map(|number| format!("{number:.decimals$}"))
        .unwrap_or_default()
}

/// Subtract two numeric strings and render with `decimals` fractional digits.
///
/// Either side failing to parse yields zero.
#[must_use]
pub fn float_sub(a: &str, b: &str, decimals: usize) -> String {
    let result = match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a - b,
        _ => 0.0,
    };
    format!("{result:.decimals$}")
}

/// First `n` characters of `input`.
#[must_use]
pub fn first_n(input: &str, n: usize) -> String {
    input.chars().take(n).collect()
}

/// `fallback` when `actual` is empty, `actual` otherwise.
#[must_use]
pub fn default_if_blank<'a>(actual: &'a str, fallback: &'a str) -> &'a str {
    if actual.is_empty() { fallback } else { actual }
}

/// Remove duplicates, keeping the first occurrence of each value.
#[must_use]
pub fn distinct<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .map(AsRef::as_ref)
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

/// `"Y"` or `"N"`.
#[must_use]
pub const fn bool_to_yn(value: bool) -> &'static str {
    if value { "Y" } else { "N" }
}

/// Whether the list holds no non-empty string.
#[must_use]
pub fn is_list_empty<S: AsRef<str>>(values: &[S]) -> bool {
    values.iter().all(|value| value.as_ref().is_empty())
}

/// `"a - b"`, or empty when both sides are empty.
#[must_use]
pub fn hyphen_join(a: &str, b: &str) -> String {
    if a.is_empty() && b.is_empty() {
        String::new()
    } else {
        format!("{a} - {b}")
    }
}
