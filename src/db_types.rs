use serde::{Deserialize, Serialize};
use sqlx::types::time::OffsetDateTime;

/// One logged customer call, as stored.  Rows are immutable once written;
/// there are no update or delete paths.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Call {
    pub id: i32,
    pub user_id: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub duration_seconds: Option<i32>,
    pub rating: Option<f32>,
    pub appointment_booked: bool,
    pub notes: Option<String>,
    pub call_type: String,
}

/// Body of `POST /api/v1/calls`: a `Call` minus its id.
#[derive(Debug, Deserialize)]
pub struct NewCall {
    pub user_id: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub duration_seconds: Option<i32>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub appointment_booked: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_call_type")]
    pub call_type: String,
}

fn default_call_type() -> String {
    "inquiry".to_string()
}
