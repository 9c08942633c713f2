/// Record identifiers are UUIDs, assigned by the store on first save.
pub type CodeId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
