//! Uptime tracking for the health probes

use std::time::{Duration, Instant};

/// Instant the process started serving
///
/// Captured once in `main` before the listener is bound and handed to the
/// application state, so every handler observes the same value.
#[derive(Debug, Clone, Copy)]
pub struct ProcessStart(Instant);

impl ProcessStart {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub const fn at(instant: Instant) -> Self {
        Self(instant)
    }

    pub fn uptime(&self) -> Duration {
        self.0.elapsed()
    }
}

/// Render a duration like `1h2m3.456s`
///
/// Sub-second durations use the largest unit below a second that keeps the
/// integer part non-zero (`850ms`, `12.5µs`, `40ns`). Fractional trailing
/// zeros are dropped; zero is `0s`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", decimal(nanos, 1_000, 3));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", decimal(nanos, 1_000_000, 6));
    }

    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = u128::from(secs % 60) * 1_000_000_000 + u128::from(d.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&decimal(seconds, 1_000_000_000, 9));
    out.push('s');
    out
}

/// `value / unit` with up to `digits` fractional digits, trailing zeros trimmed
fn decimal(value: u128, unit: u128, digits: usize) -> String {
    let int = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return int.to_string();
    }
    let frac = format!("{frac:0digits$}");
    format!("{int}.{}", frac.trim_end_matches('0'))
}

/// Body for `/healthz`
pub fn render_healthz(uptime: Duration) -> String {
    format!("Uptime {}\nOK\n", format_duration(uptime))
}

/// Phase of the simulated failing service
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureState {
    /// Before the threshold, with seconds left until failure
    Healthy { remaining: f64 },
    /// At or past the threshold, with seconds spent failing
    Failed { since: f64 },
}

/// Service that is healthy for a fixed time after start and failed forever after
#[derive(Debug, Clone, Copy)]
pub struct FailureSimulation {
    threshold: Duration,
}

impl FailureSimulation {
    pub const DEFAULT_THRESHOLD: Duration = Duration::from_secs(10);

    pub const fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub const fn threshold(&self) -> Duration {
        self.threshold
    }

    /// State at the given uptime; depends on elapsed time only
    pub fn state(&self, uptime: Duration) -> FailureState {
        let threshold = self.threshold.as_secs_f64();
        let uptime = uptime.as_secs_f64();
        if uptime < threshold {
            FailureState::Healthy {
                remaining: threshold - uptime,
            }
        } else {
            FailureState::Failed {
                since: uptime - threshold,
            }
        }
    }

    /// State and body for `/healthz-fail`
    pub fn report(&self, uptime: Duration) -> (FailureState, String) {
        let state = self.state(uptime);
        let secs = uptime.as_secs_f64();
        let body = match state {
            FailureState::Healthy { remaining } => format!(
                "still OK, {remaining:.1} seconds before failing\nUptime {secs:.1} seconds\n"
            ),
            FailureState::Failed { since } => {
                format!("failed since {since:.1} seconds\nUptime {secs:.1} seconds\n")
            }
        };
        (state, body)
    }
}

impl Default for FailureSimulation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
