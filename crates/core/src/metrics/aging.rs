//! A/R aging bucket columns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid aging bucket configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Aging bucket bounds must be positive and strictly increasing: {0:?}")]
pub struct AgingBoundsError(pub Vec<u32>);

/// One aging column, by days past due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBucket {
    /// Column label.
    pub label: String,
    /// Lowest days past due in the bucket (inclusive).
    pub min_days: i64,
    /// Highest days past due in the bucket (inclusive); `None` is open-ended.
    pub max_days: Option<i64>,
}

impl AgingBucket {
    /// Returns true if `days_past_due` falls in this bucket.
    #[must_use]
    pub fn contains(&self, days_past_due: i64) -> bool {
        days_past_due >= self.min_days && self.max_days.is_none_or(|max| days_past_due <= max)
    }
}

/// Builds aging columns from upper bounds, e.g. `[30, 60, 90]` gives
/// Current, 1 - 30, 31 - 60, 61 - 90 and 91+ days.
///
/// The `Current` column absorbs everything not yet due (negative days).
pub fn aging_buckets(bounds: &[u32]) -> Result<Vec<AgingBucket>, AgingBoundsError> {
    let increasing = bounds.windows(2).all(|pair| pair[0] < pair[1]);
    if bounds.first() == Some(&0) || !increasing {
        return Err(AgingBoundsError(bounds.to_vec()));
    }

    let mut buckets = Vec::with_capacity(bounds.len() + 2);
    buckets.push(AgingBucket {
        label: "Current".to_string(),
        min_days: i64::MIN,
        max_days: Some(0),
    });

    let mut lower = 1_i64;
    for bound in bounds {
        let upper = i64::from(*bound);
        buckets.push(AgingBucket {
            label: format!("{lower} - {upper} Days"),
            min_days: lower,
            max_days: Some(upper),
        });
        lower = upper + 1;
    }

    buckets.push(AgingBucket {
        label: format!("{lower}+ Days"),
        min_days: lower,
        max_days: None,
    });

    Ok(buckets)
}

/// Index of the bucket holding `days_past_due`.
#[must_use]
pub fn bucket_index(buckets: &[AgingBucket], days_past_due: i64) -> Option<usize> {
    buckets.iter().position(|b| b.contains(days_past_due))
}
