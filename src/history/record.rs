//! The captured form of one proxied HTTP exchange

use crate::proxy::types::RequestId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Single-valued header snapshot, keyed by lowercase header name
pub type HeaderSnapshot = BTreeMap<String, String>;

/// One proxied HTTP transaction.
///
/// A record is created when the request enters the proxy, filled in as the
/// request moves through the forwarding pipeline and handed to the
/// [`HistoryStore`](crate::history::HistoryStore) exactly once. The three
/// derived durations are computed by the store on insertion, from monotonic
/// readings taken alongside the wall-clock timestamps when they exist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: RequestId,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url: String,
    pub request_headers: HeaderSnapshot,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_body: String,
    pub response_status: u16,
    pub response_headers: HeaderSnapshot,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response_body: String,

    pub proxy_start_time: DateTime<Utc>,
    /// `None` when the pipeline failed before the upstream call was issued.
    pub upstream_start_time: Option<DateTime<Utc>>,
    pub upstream_end_time: Option<DateTime<Utc>>,
    pub proxy_end_time: DateTime<Utc>,

    pub proxy_overhead_us: i64,
    pub upstream_latency_us: i64,
    pub total_duration_us: i64,

    pub request_size: u64,
    pub response_size: u64,

    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip)]
    marks: MonotonicMarks,
}

/// Monotonic counterparts of the four timing points
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct MonotonicMarks {
    proxy_start: Option<Instant>,
    upstream_start: Option<Instant>,
    upstream_end: Option<Instant>,
    proxy_end: Option<Instant>,
}

impl RequestRecord {
    /// Start a record for a request received now.
    pub fn begin(method: impl Into<String>, url: impl Into<String>) -> Self {
        let now = Instant::now();
        let mut record = Self::started_at(method, url, Utc::now());
        record.marks.proxy_start = Some(now);
        record.marks.proxy_end = Some(now);
        record
    }

    /// Start a record from an explicit wall-clock time. Durations for such a
    /// record fall back to the wall-clock timestamps.
    pub fn started_at(
        method: impl Into<String>,
        url: impl Into<String>,
        proxy_start: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RequestId::generate(),
            timestamp: proxy_start,
            method: method.into(),
            url: url.into(),
            request_headers: HeaderSnapshot::new(),
            request_body: String::new(),
            response_status: 0,
            response_headers: HeaderSnapshot::new(),
            response_body: String::new(),
            proxy_start_time: proxy_start,
            upstream_start_time: None,
            upstream_end_time: None,
            proxy_end_time: proxy_start,
            proxy_overhead_us: 0,
            upstream_latency_us: 0,
            total_duration_us: 0,
            request_size: 0,
            response_size: 0,
            success: false,
            error: None,
            marks: MonotonicMarks::default(),
        }
    }

    /// Mark the exchange as failed. Clears `success`.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.success = false;
    }

    /// Mark the exchange as completed successfully.
    pub fn succeed(&mut self) {
        self.error = None;
        self.success = true;
    }

    pub fn stamp_upstream_start(&mut self) {
        self.upstream_start_time = Some(Utc::now());
        self.marks.upstream_start = Some(Instant::now());
    }

    pub fn stamp_upstream_end(&mut self) {
        self.upstream_end_time = Some(Utc::now());
        self.marks.upstream_end = Some(Instant::now());
    }

    pub fn stamp_proxy_end(&mut self) {
        self.proxy_end_time = Utc::now();
        self.marks.proxy_end = Some(Instant::now());
    }

    /// Recompute total, upstream and overhead durations.
    ///
    /// Each span uses the monotonic readings when both ends have one, so a
    /// wall-clock step mid-request cannot skew it.
    pub fn compute_durations(&mut self) {
        self.total_duration_us = span_micros(
            (self.marks.proxy_start, self.marks.proxy_end),
            (self.proxy_start_time, self.proxy_end_time),
        );
        self.upstream_latency_us = match (self.upstream_start_time, self.upstream_end_time) {
            (Some(start), Some(end)) => span_micros(
                (self.marks.upstream_start, self.marks.upstream_end),
                (start, end),
            ),
            _ => 0,
        };
        self.proxy_overhead_us = self.total_duration_us - self.upstream_latency_us;
    }
}

fn span_micros(
    monotonic: (Option<Instant>, Option<Instant>),
    wall: (DateTime<Utc>, DateTime<Utc>),
) -> i64 {
    match monotonic {
        (Some(start), Some(end)) => {
            i64::try_from(end.saturating_duration_since(start).as_micros()).unwrap_or(i64::MAX)
        }
        _ => (wall.1 - wall.0).num_microseconds().unwrap_or(i64::MAX),
    }
}
