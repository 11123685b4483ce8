//! Response DTOs for the rolling cache proxy API
//!
//! Defines the structure of outgoing JSON response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, EntrySummary};

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Fraction of completed cycles that succeeded
    pub success_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from registry statistics
    pub fn new(stats: CacheStats) -> Self {
        let success_rate = stats.success_rate();
        Self {
            stats,
            success_rate,
        }
    }
}

/// Response body for the entries endpoint (GET /entries)
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    /// Number of live entries
    pub count: usize,
    pub entries: Vec<EntrySummary>,
}

impl EntriesResponse {
    pub fn new(entries: Vec<EntrySummary>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_flattens_counters() {
        let stats = CacheStats {
            cycles_succeeded: 3,
            cycles_failed: 1,
            live_entries: 2,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(stats);
        assert!((resp.success_rate - 0.75).abs() < 0.001);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["live_entries"], 2);
        assert_eq!(json["cycles_failed"], 1);
    }

    #[test]
    fn test_entries_response_count() {
        let resp = EntriesResponse::new(Vec::new());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"count\":0"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
