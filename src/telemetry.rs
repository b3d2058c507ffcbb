//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus,
//! statsd); without a recorder installed, all metric calls are no-ops.
//!
//! All metrics are prefixed with `termsum_`. Counters end in `_total`,
//! histograms carry their unit (`_seconds`).
//!
//! # Common labels
//!
//! - `style`: resolved style identifier (e.g. "curto", "riscos")
//! - `status`: outcome: "ok", "cached", or an error kind
//! - `reason`: retry trigger: "connect", "read", or "status"

/// Total summarize calls.
///
/// Labels: `style`, `status`.
pub const REQUESTS_TOTAL: &str = "termsum_requests_total";

/// Duration of upstream calls in seconds (cache hits are not recorded).
///
/// Labels: `style`.
pub const REQUEST_DURATION_SECONDS: &str = "termsum_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `reason`.
pub const RETRIES_TOTAL: &str = "termsum_retries_total";

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "termsum_cache_hits_total";

/// Total response cache misses.
pub const CACHE_MISSES_TOTAL: &str = "termsum_cache_misses_total";

/// Total entries evicted from the response cache.
pub const CACHE_EVICTIONS_TOTAL: &str = "termsum_cache_evictions_total";
