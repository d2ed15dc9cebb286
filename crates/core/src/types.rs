/// Record primary keys are gateway-issued UUIDs.
pub type RecordId = uuid::Uuid;

/// The authenticated user's id. Every remote row is scoped by it.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates travel as `YYYY-MM-DD`.
pub type Date = chrono::NaiveDate;

/// Wire format for [`Date`] values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The authenticated user on whose behalf all reads and writes are scoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
}

impl Identity {
    pub fn new(user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}
