use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::PipelineError;

/// Default delay between task starts, per position.
pub const DEFAULT_DELAY_UNIT: Duration = Duration::from_secs(2);

/// Rate-limit policy for task launches.
///
/// Both policies space successive starts by at least their duration and
/// admit tasks in input order. Neither reacts to response outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchPolicy {
    /// Task at position `i` starts no earlier than `i × delay_unit` after the
    /// pipeline starts.
    Staggered { delay_unit: Duration },

    /// Tasks are admitted one at a time, at least `interval` apart,
    /// regardless of position.
    FixedInterval { interval: Duration },
}

impl LaunchPolicy {
    pub fn staggered(delay_unit: Duration) -> Self {
        Self::Staggered { delay_unit }
    }

    pub fn fixed_interval(interval: Duration) -> Self {
        Self::FixedInterval { interval }
    }

    /// Minimum gap between two successive starts.
    pub fn spacing(&self) -> Duration {
        match self {
            Self::Staggered { delay_unit } => *delay_unit,
            Self::FixedInterval { interval } => *interval,
        }
    }

    /// Earliest start for `position`, relative to pipeline start.
    ///
    /// Only staggered start is a function of position; fixed-interval
    /// admission depends on when the previous task was admitted.
    pub fn earliest_offset(&self, position: usize) -> Option<Duration> {
        match self {
            Self::Staggered { delay_unit } => {
                let factor = u32::try_from(position).unwrap_or(u32::MAX);
                Some(delay_unit.saturating_mul(factor))
            }
            Self::FixedInterval { .. } => None,
        }
    }

    /// Parses `staggered` / `interval` with a spacing in milliseconds.
    pub fn from_parts(kind: &str, spacing_ms: u64) -> Result<Self, PipelineError> {
        let spacing = Duration::from_millis(spacing_ms);
        kind.parse::<LaunchPolicyKind>().map(|kind| match kind {
            LaunchPolicyKind::Staggered => Self::staggered(spacing),
            LaunchPolicyKind::FixedInterval => Self::fixed_interval(spacing),
        })
    }
}

impl Default for LaunchPolicy {
    fn default() -> Self {
        Self::staggered(DEFAULT_DELAY_UNIT)
    }
}

impl fmt::Display for LaunchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staggered { delay_unit } => write!(f, "staggered every {:?}", delay_unit),
            Self::FixedInterval { interval } => write!(f, "one admission per {:?}", interval),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LaunchPolicyKind {
    Staggered,
    FixedInterval,
}

impl FromStr for LaunchPolicyKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staggered" | "stagger" => Ok(Self::Staggered),
            "interval" | "fixed_interval" | "fixed-interval" => Ok(Self::FixedInterval),
            other => Err(PipelineError::Config(format!(
                "unknown launch policy '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staggered_offset_grows_linearly() {
        let policy = LaunchPolicy::staggered(Duration::from_secs(2));
        assert_eq!(policy.earliest_offset(0), Some(Duration::ZERO));
        assert_eq!(policy.earliest_offset(3), Some(Duration::from_secs(6)));
        assert_eq!(policy.earliest_offset(10), Some(Duration::from_secs(20)));
    }

    #[test]
    fn test_fixed_interval_has_no_positional_offset() {
        let policy = LaunchPolicy::fixed_interval(Duration::from_millis(500));
        assert_eq!(policy.earliest_offset(7), None);
        assert_eq!(policy.spacing(), Duration::from_millis(500));
    }

    #[test]
    fn test_default_matches_two_second_stagger() {
        assert_eq!(
            LaunchPolicy::default(),
            LaunchPolicy::staggered(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(
            LaunchPolicy::from_parts("interval", 250).unwrap(),
            LaunchPolicy::fixed_interval(Duration::from_millis(250))
        );
        assert_eq!(
            LaunchPolicy::from_parts("Staggered", 2000).unwrap(),
            LaunchPolicy::staggered(Duration::from_secs(2))
        );
        assert!(LaunchPolicy::from_parts("burst", 10).is_err());
    }
}
