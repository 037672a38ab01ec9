//! Batch sizing and suspension bookkeeping

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Maximum number of node visits between two suspension points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchSize {
    /// Suspend after this many visits (values below 1 are treated as 1)
    Limited(usize),

    /// Never suspend; run to completion
    Unlimited,
}

impl BatchSize {
    /// Limited batch size, clamped to at least one visit
    #[inline]
    #[must_use]
    pub fn limited(visits: usize) -> Self {
        Self::Limited(visits.max(1))
    }

    /// Visit limit, `None` when unlimited
    #[inline]
    #[must_use]
    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Limited(n) => Some(n.max(1)),
            Self::Unlimited => None,
        }
    }
}

impl Display for BatchSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.limit() {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("unlimited"),
        }
    }
}

/// Named batch-size presets exposed through configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchingPriority {
    /// 10 visits per slice
    Low,

    /// 25 visits per slice
    #[default]
    Medium,

    /// 40 visits per slice
    High,

    /// 100 visits per slice
    VeryHigh,

    /// No suspension
    Absolute,
}

impl BatchingPriority {
    /// All presets, smallest slice first
    pub const ALL: [BatchingPriority; 5] = [
        Self::Low,
        Self::Medium,
        Self::High,
        Self::VeryHigh,
        Self::Absolute,
    ];

    /// Batch size of this preset
    #[must_use]
    pub fn batch_size(self) -> BatchSize {
        match self {
            Self::Low => BatchSize::Limited(10),
            Self::Medium => BatchSize::Limited(25),
            Self::High => BatchSize::Limited(40),
            Self::VeryHigh => BatchSize::Limited(100),
            Self::Absolute => BatchSize::Unlimited,
        }
    }
}

impl From<BatchingPriority> for BatchSize {
    fn from(p: BatchingPriority) -> Self {
        p.batch_size()
    }
}

/// Counts visits and decides when a walk must suspend
#[derive(Debug, Clone)]
pub struct BatchBudget {
    size: BatchSize,
    since_suspend: usize,
    visits: usize,
    suspensions: usize,
}

impl BatchBudget {
    /// Create budget for the given batch size
    #[inline]
    #[must_use]
    pub fn new(size: BatchSize) -> Self {
        Self {
            size,
            since_suspend: 0,
            visits: 0,
            suspensions: 0,
        }
    }

    /// Record one visit; returns `true` when the caller must suspend now
    ///
    /// The counter resets on suspension, so at most `limit` visits happen
    /// between two suspension points.
    pub fn record_visit(&mut self) -> bool {
        self.visits += 1;
        self.since_suspend += 1;
        match self.size.limit() {
            Some(limit) if self.since_suspend >= limit => {
                self.since_suspend = 0;
                self.suspensions += 1;
                true
            }
            _ => false,
        }
    }

    /// Configured batch size
    #[inline]
    #[must_use]
    pub fn size(&self) -> BatchSize {
        self.size
    }

    /// Total visits recorded
    #[inline]
    #[must_use]
    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Total suspensions requested
    #[inline]
    #[must_use]
    pub fn suspensions(&self) -> usize {
        self.suspensions
    }
}

/// Outcome of resuming a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Batch boundary reached; resume later to continue
    Suspended,

    /// Nothing left to visit
    Complete,
}

impl Step {
    /// Check if the walk finished
    #[inline]
    #[must_use]
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}
