//! Aggregate statistics over the request history

use crate::history::record::RequestRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derived view over a history snapshot. Never stored; recomputed per query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStats {
    pub total_requests: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub avg_duration_us: i64,
    pub avg_upstream_latency_us: i64,
    pub avg_proxy_overhead_us: i64,
    pub total_request_size: u64,
    pub total_response_size: u64,
    pub status_codes: BTreeMap<u16, usize>,
    pub methods: BTreeMap<String, usize>,
}

impl RequestStats {
    /// Aggregate the given records in a single pass.
    ///
    /// Averages use truncating integer division and are zero for an empty input.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a RequestRecord>,
    {
        let mut stats = Self::default();
        let mut total_duration: i64 = 0;
        let mut total_upstream: i64 = 0;
        let mut total_overhead: i64 = 0;

        for record in records {
            stats.total_requests += 1;
            total_duration += record.total_duration_us;
            total_upstream += record.upstream_latency_us;
            total_overhead += record.proxy_overhead_us;
            stats.total_request_size += record.request_size;
            stats.total_response_size += record.response_size;

            if record.success {
                stats.success_count += 1;
            } else {
                stats.error_count += 1;
            }

            *stats
                .status_codes
                .entry(record.response_status)
                .or_insert(0) += 1;
            *stats.methods.entry(record.method.clone()).or_insert(0) += 1;
        }

        if stats.total_requests > 0 {
            let count = stats.total_requests as i64;
            stats.avg_duration_us = total_duration / count;
            stats.avg_upstream_latency_us = total_upstream / count;
            stats.avg_proxy_overhead_us = total_overhead / count;
        }

        stats
    }
}
