//! Alto CRM gateway and call-analytics backend for the property dashboard.

pub mod alto;
pub mod alto_types;
pub mod calls;
pub mod db_types;
pub mod error;
pub mod handlers;
pub mod types;
