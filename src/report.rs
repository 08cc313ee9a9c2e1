//! Per-VC outcomes and the textual proof log.
use std::fmt::{self, Display, Formatter};

use instant::Duration;

/// Outcome of one proof attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofResult {
    /// `true` and `false` were merged.
    Proved,
    /// The deadline passed before a contradiction or exhaustion.
    TimedOut,
    /// A round made no progress, or the round limit was reached.
    Exhausted,
    /// Not attempted because the failure budget ran out.
    Skipped,
}

impl ProofResult {
    pub fn is_proved(self) -> bool {
        self == ProofResult::Proved
    }
}

impl Display for ProofResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProofResult::Proved => "proved",
            ProofResult::TimedOut => "timed out",
            ProofResult::Exhausted => "exhausted",
            ProofResult::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Human-readable trace of an attempt, kept only when enabled.
#[derive(Debug, Clone, Default)]
pub struct ProofLog {
    enabled: bool,
    lines: Vec<String>,
}

impl ProofLog {
    pub fn new(enabled: bool) -> Self {
        ProofLog {
            enabled,
            lines: vec![],
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records a line; `line` is not evaluated when the log is disabled.
    pub fn push(&mut self, line: impl FnOnce() -> String) {
        if self.enabled {
            self.lines.push(line());
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[derive(Debug, Clone)]
pub struct VcReport {
    pub name: String,
    pub result: ProofResult,
    pub elapsed: Duration,
    pub rounds: usize,
    /// Theorem instances introduced.
    pub instances: usize,
    pub merges: usize,
    pub log: Vec<String>,
}

impl VcReport {
    pub fn skipped(name: impl Into<String>) -> Self {
        VcReport {
            name: name.into(),
            result: ProofResult::Skipped,
            elapsed: Duration::ZERO,
            rounds: 0,
            instances: 0,
            merges: 0,
            log: vec![],
        }
    }
}

impl Display for VcReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} in {:.3}s ({} rounds, {} instances, {} merges)",
            self.name,
            self.result,
            self.elapsed.as_secs_f64(),
            self.rounds,
            self.instances,
            self.merges
        )
    }
}
