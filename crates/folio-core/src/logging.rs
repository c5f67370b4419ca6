//! Structured logging schema and field name constants for folio.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue (failed partition isolated/skipped) |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, merge sizes, config choices |
//! | TRACE | Per-item iteration, high-volume data (candidates, group rows) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across a request's partition calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "search", "aggregate", "db", "lifecycle"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "coordinator", "fanout", "partition", "pool", "bookmarks"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "popular", "stats", "soft_delete"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Category partition being queried or mutated.
pub const PARTITION: &str = "partition";

/// Manuscript UUID being operated on.
pub const MANUSCRIPT_ID: &str = "manuscript_id";

/// Opaque user identifier (personalization paths only).
pub const USER_ID: &str = "user_id";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of partitions fanned out to.
pub const PARTITION_COUNT: &str = "partition_count";

/// Number of partitions that failed or timed out during a fan-out.
pub const FAILED_PARTITIONS: &str = "failed_partitions";

/// Number of candidates fetched per partition for ranking.
pub const CANDIDATE_BUDGET: &str = "candidate_budget";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
