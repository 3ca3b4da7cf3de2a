use crate::alto_types::{
    Entity, LinkedType, NewAppointment, NewContact, NewProperty, ReferenceCheck,
    ReferenceCheckStatus,
};
use crate::error::AppError;

use reqwest::multipart;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, error};

const PRODUCTION_URL: &str = "https://api.alto.co.uk";
const SANDBOX_URL: &str = "https://sandbox.altotest.co.uk/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Alto API, fixed for the life of a client.
#[derive(Debug, Clone)]
pub struct AltoConfig {
    pub api_key: String,
    pub sandbox: bool,
}

/// Stateless facade over the Alto REST API.  Every operation is exactly one
/// HTTP round trip; there is no caching, batching, or retry.
pub struct AltoClient {
    api_key: String,
    base_url: &'static str,
    http_client: reqwest::Client,
}

impl AltoClient {
    pub fn new(config: AltoConfig) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AppError::Transport)?;
        let base_url = if config.sandbox {
            SANDBOX_URL
        } else {
            PRODUCTION_URL
        };

        Ok(Self {
            api_key: config.api_key,
            base_url,
            http_client,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, format!("{}{}", self.base_url, path))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
    }

    /// Issue the request and decode the body, or surface the non-2xx status
    /// and body for the caller to act on.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AppError> {
        let resp = request.send().await.map_err(|e| {
            error!(error=%e, "failed to reach the alto api");
            AppError::Transport(e)
        })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status=%status, body=%body, "alto api rejected the request");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<T>().await.map_err(|e| {
            error!(error=%e, "failed to deserialize alto response");
            AppError::Transport(e)
        })
    }

    /// Reference checks whose date falls within the given bounds.  Either
    /// side may be left open.
    pub async fn reference_checks(
        &self,
        start_date: Option<OffsetDateTime>,
        end_date: Option<OffsetDateTime>,
    ) -> Result<Vec<ReferenceCheck>, AppError> {
        let params = date_range_params(start_date, end_date)?;
        self.execute(self.request(Method::GET, "/referenceChecks").query(&params))
            .await
    }

    /// Move a reference check to `Pending` or `Completed`.  Any other status
    /// is rejected here, before a request is made.
    pub async fn update_reference_check_status(
        &self,
        reference_check_id: &str,
        status: &str,
    ) -> Result<Entity, AppError> {
        let status = ReferenceCheckStatus::parse(status)?;
        debug!(reference_check_id, status = status.as_str(), "updating reference check");
        self.execute(
            self.request(
                Method::PATCH,
                &format!("/referenceChecks/{reference_check_id}"),
            )
            .json(&json!({ "status": status.as_str() })),
        )
        .await
    }

    pub async fn create_contact(&self, contact: &NewContact) -> Result<Entity, AppError> {
        self.execute(self.request(Method::POST, "/contacts").json(contact))
            .await
    }

    pub async fn contact(&self, contact_id: &str) -> Result<Entity, AppError> {
        self.execute(self.request(Method::GET, &format!("/contacts/{contact_id}")))
            .await
    }

    pub async fn create_property(&self, property: &NewProperty) -> Result<Entity, AppError> {
        self.execute(self.request(Method::POST, "/inventory").json(property))
            .await
    }

    pub async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Entity, AppError> {
        self.execute(self.request(Method::POST, "/appointments").json(appointment))
            .await
    }

    /// Read the file fully into memory and submit it as multipart form data
    /// linked to the given entity.  A missing file fails before any request
    /// is made.
    pub async fn upload_document(
        &self,
        document_path: &Path,
        linked_type: LinkedType,
        linked_id: &str,
    ) -> Result<Entity, AppError> {
        let bytes = tokio::fs::read(document_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("document file {}", document_path.display()))
            } else {
                error!(error=%e, path=%document_path.display(), "failed to read document file");
                AppError::Io(e)
            }
        })?;
        let file_name = document_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let form = multipart::Form::new()
            .text("LinkedType", linked_type.as_str())
            .text("LinkedId", linked_id.to_string())
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));

        self.execute(self.request(Method::POST, "/documents").multipart(form))
            .await
    }

    pub async fn tenancy_tenant_ids(&self, tenancy_id: &str) -> Result<Vec<String>, AppError> {
        self.execute(self.request(Method::GET, &format!("/tenancies/{tenancy_id}/tenantIds")))
            .await
    }

    pub async fn guarantor_ids(&self, tenant_id: &str) -> Result<Vec<String>, AppError> {
        self.execute(
            self.request(Method::GET, "/guarantorIds")
                .query(&[("tenantId", tenant_id)]),
        )
        .await
    }
}

/// Serialize optional window bounds; an omitted bound contributes no
/// parameter, leaving the range open on that side.
fn date_range_params(
    start_date: Option<OffsetDateTime>,
    end_date: Option<OffsetDateTime>,
) -> Result<Vec<(&'static str, String)>, AppError> {
    let mut params = Vec::new();
    if let Some(start) = start_date {
        params.push(("startDate", start.format(&Rfc3339)?));
    }
    if let Some(end) = end_date {
        params.push(("endDate", end.format(&Rfc3339)?));
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sandbox_client() -> AltoClient {
        AltoClient::new(AltoConfig {
            api_key: "test-key".to_string(),
            sandbox: true,
        })
        .unwrap()
    }

    #[test]
    fn date_range_params_without_bounds_is_empty() {
        let params = date_range_params(None, None).unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn date_range_params_with_start_only() {
        let start = datetime!(2024-05-08 00:00 UTC);
        let params = date_range_params(Some(start), None).unwrap();
        assert_eq!(params, vec![("startDate", "2024-05-08T00:00:00Z".to_string())]);
    }

    #[test]
    fn date_range_params_with_both_bounds() {
        let start = datetime!(2024-05-08 00:00 UTC);
        let end = datetime!(2024-05-15 00:00 UTC);
        let params = date_range_params(Some(start), Some(end)).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].0, "startDate");
        assert_eq!(params[1].0, "endDate");
    }

    #[test]
    fn reference_check_status_rejects_unknown_values() {
        assert!(ReferenceCheckStatus::parse("Pending").is_ok());
        assert!(ReferenceCheckStatus::parse("Completed").is_ok());
        for bad in ["Cancelled", "pending", "completed", ""] {
            assert!(matches!(
                ReferenceCheckStatus::parse(bad),
                Err(AppError::InvalidArgument(_))
            ));
        }
    }

    #[tokio::test]
    async fn update_status_rejects_cancelled_before_any_request() {
        let client = sandbox_client();
        let res = client
            .update_reference_check_status("rc-1", "Cancelled")
            .await;
        assert!(matches!(res, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn upload_document_with_missing_file_is_not_found() {
        let client = sandbox_client();
        let res = client
            .upload_document(Path::new("/no/such/reference_check.pdf"), LinkedType::Contact, "c-1")
            .await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }
}
