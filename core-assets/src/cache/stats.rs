//! Cache statistics and monitoring

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usage of one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub partition: String,
    pub entry_count: usize,
    /// Sum of entry sizes
    pub total_bytes: u64,
    /// Configured budget, 0 when the partition has none
    pub max_bytes: u64,
    pub oldest_access: Option<DateTime<Utc>>,
    pub newest_access: Option<DateTime<Utc>>,
}

impl CacheStats {
    /// Usage as a percentage of the budget.
    pub fn usage_percentage(&self) -> f64 {
        if self.max_bytes == 0 {
            return 0.0;
        }

        (self.total_bytes as f64 / self.max_bytes as f64) * 100.0
    }

    /// Returns true above 90% of the budget.
    pub fn is_near_capacity(&self) -> bool {
        self.usage_percentage() > 90.0
    }

    /// Returns true if the next trim would evict something.
    pub fn is_over_budget(&self) -> bool {
        self.max_bytes > 0 && self.total_bytes > self.max_bytes
    }

    /// Bytes above the budget.
    pub fn space_needed(&self) -> u64 {
        self.total_bytes.saturating_sub(self.max_bytes)
    }

    pub fn average_entry_size(&self) -> u64 {
        if self.entry_count == 0 {
            0
        } else {
            self.total_bytes / self.entry_count as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total_bytes: u64, max_bytes: u64, entry_count: usize) -> CacheStats {
        CacheStats {
            partition: "audio_cache".to_string(),
            entry_count,
            total_bytes,
            max_bytes,
            oldest_access: None,
            newest_access: None,
        }
    }

    #[test]
    fn test_usage() {
        let s = stats(95, 100, 5);
        assert!((s.usage_percentage() - 95.0).abs() < f64::EPSILON);
        assert!(s.is_near_capacity());
        assert!(!s.is_over_budget());
        assert_eq!(s.space_needed(), 0);
        assert_eq!(s.average_entry_size(), 19);
    }

    #[test]
    fn test_over_budget() {
        let s = stats(120, 100, 6);
        assert!(s.is_over_budget());
        assert_eq!(s.space_needed(), 20);
    }

    #[test]
    fn test_empty_and_unbudgeted() {
        let s = stats(0, 0, 0);
        assert_eq!(s.usage_percentage(), 0.0);
        assert_eq!(s.average_entry_size(), 0);
        assert!(!s.is_over_budget());
    }
}
