//! API constants

use std::time::Duration;

/// Base path of every search and lookup route.
pub const API_PREFIX: &str = "/api";

/// Upper bound on the readiness probe's database round trip.
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warehouse=debug,tower_http=debug";

/// `sortField` reported by the random presentation sample.
pub const RANDOM_SORT_FIELD: &str = "random";

/// Requests served concurrently before new ones queue.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;
