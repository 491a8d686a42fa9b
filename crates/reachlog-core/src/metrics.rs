//! The fixed metric schema of a daily record.

use std::fmt;

/// A recognized account metric. Declaration order is column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Reach,
    TotalInteractions,
    AccountsEngaged,
    Likes,
    Comments,
    Saves,
    Shares,
    Replies,
    FollowerCount,
    ProfileLinksTaps,
}

impl Metric {
    pub const COUNT: usize = 10;

    /// Every metric, in the stable column order.
    pub const ALL: [Metric; Self::COUNT] = [
        Metric::Reach,
        Metric::TotalInteractions,
        Metric::AccountsEngaged,
        Metric::Likes,
        Metric::Comments,
        Metric::Saves,
        Metric::Shares,
        Metric::Replies,
        Metric::FollowerCount,
        Metric::ProfileLinksTaps,
    ];

    /// Wire and column name of the metric.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Metric::Reach => "reach",
            Metric::TotalInteractions => "total_interactions",
            Metric::AccountsEngaged => "accounts_engaged",
            Metric::Likes => "likes",
            Metric::Comments => "comments",
            Metric::Saves => "saves",
            Metric::Shares => "shares",
            Metric::Replies => "replies",
            Metric::FollowerCount => "follower_count",
            Metric::ProfileLinksTaps => "profile_links_taps",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// `true` for metrics requested as a `total_value` aggregate.
    ///
    /// `follower_count` only supports the time-series shape and is fetched on
    /// its own.
    #[must_use]
    pub const fn is_total_value(self) -> bool {
        !matches!(self, Metric::FollowerCount)
    }

    /// Comma-separated names of every `total_value` metric, in column order.
    #[must_use]
    pub fn total_value_query() -> String {
        Self::ALL
            .into_iter()
            .filter(|m| m.is_total_value())
            .map(Metric::name)
            .collect::<Vec<_>>()
            .join(",")
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A count for every [`Metric`]; unset metrics read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricSet {
    values: [u64; Metric::COUNT],
}

impl MetricSet {
    #[must_use]
    pub fn zeroed() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, metric: Metric) -> u64 {
        self.values[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, value: u64) {
        self.values[metric.index()] = value;
    }

    /// Builder-style [`MetricSet::set`].
    #[must_use]
    pub fn with(mut self, metric: Metric, value: u64) -> Self {
        self.set(metric, value);
        self
    }

    /// `(metric, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, u64)> + '_ {
        Metric::ALL.into_iter().map(|m| (m, self.get(m)))
    }

    #[must_use]
    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0)
    }
}
