use crate::error::AppError;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// An Alto entity echoed back by the API.  Only the identifier is modeled;
/// the remaining fields ride along untouched.
#[derive(Debug, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceCheck {
    pub id: String,
    pub tenancy_id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Closed set of statuses Alto accepts for a reference check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceCheckStatus {
    Pending,
    Completed,
}

impl ReferenceCheckStatus {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            _ => Err(AppError::InvalidArgument(format!(
                "reference check status must be 'Pending' or 'Completed', got '{value}'"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }
}

/// Entity kinds a document can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkedType {
    Contact,
    Tenancy,
    Property,
}

impl LinkedType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "Contact",
            Self::Tenancy => "Tenancy",
            Self::Property => "Property",
        }
    }
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub address: String,
    pub city: String,
    pub postcode: String,
    /// Contact that owns the property, when known at creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Minutes.
    pub duration: u32,
    pub property_id: String,
    pub attendee_id: String,
}
