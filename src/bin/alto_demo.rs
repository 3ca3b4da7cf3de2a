//! Walkthrough of the Alto gateway against the sandbox environment: create a
//! contact, property, and appointment, then work a batch of recent reference
//! checks end to end.

use propdash_rs::alto::{AltoClient, AltoConfig};
use propdash_rs::alto_types::{LinkedType, NewAppointment, NewContact, NewProperty};
use propdash_rs::error::AppError;

use std::env;
use std::path::Path;
use time::{Duration, OffsetDateTime};

fn display_name(fields: &serde_json::Map<String, serde_json::Value>) -> String {
    let first = fields.get("firstName").and_then(|v| v.as_str()).unwrap_or("");
    let last = fields.get("lastName").and_then(|v| v.as_str()).unwrap_or("");
    format!("{first} {last}")
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let api_key = env::var("ALTO_API_KEY").expect("ALTO_API_KEY not set!");
    let client = AltoClient::new(AltoConfig {
        api_key,
        sandbox: true,
    })?;

    println!("Creating contact, property, and appointment...");
    let contact = client
        .create_contact(&NewContact {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: Some("john.doe@example.com".to_string()),
            phone: Some("+44123456789".to_string()),
        })
        .await?;

    let property = client
        .create_property(&NewProperty {
            address: "123 Main St".to_string(),
            city: "London".to_string(),
            postcode: "SW1A 1AA".to_string(),
            owner_id: Some(contact.id.clone()),
        })
        .await?;

    let appointment = client
        .create_appointment(&NewAppointment {
            kind: "Market Appraisal".to_string(),
            date: OffsetDateTime::now_utc() + Duration::days(1),
            duration: 60,
            property_id: property.id.clone(),
            attendee_id: contact.id.clone(),
        })
        .await?;
    println!("Created appointment {}", appointment.id);

    println!("\nHandling reference checks...");
    let week_ago = OffsetDateTime::now_utc() - Duration::days(7);
    let reference_checks = client.reference_checks(Some(week_ago), None).await?;

    for check in &reference_checks {
        let tenant_ids = client.tenancy_tenant_ids(&check.tenancy_id).await?;
        for tenant_id in &tenant_ids {
            let tenant = client.contact(tenant_id).await?;
            println!(
                "Processing reference check for tenant: {}",
                display_name(&tenant.fields)
            );

            for guarantor_id in client.guarantor_ids(tenant_id).await? {
                let guarantor = client.contact(&guarantor_id).await?;
                println!("Found guarantor: {}", display_name(&guarantor.fields));
            }

            let document_path = Path::new("reference_check.pdf");
            if document_path.exists() {
                client
                    .upload_document(document_path, LinkedType::Contact, tenant_id)
                    .await?;
                println!("Uploaded reference check document for tenant {tenant_id}");
            }

            client
                .update_reference_check_status(&check.id, "Completed")
                .await?;
            println!("Updated reference check {} to Completed", check.id);
        }
    }

    Ok(())
}
