/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Transport-assigned identifier for one live display connection.
///
/// Opaque to the core; the real-time transport mints these and reports
/// them through the connection lifecycle notifications.
pub type ConnectionId = String;
