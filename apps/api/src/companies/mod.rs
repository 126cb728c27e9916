pub mod handlers;
pub mod store;

pub use store::{CompanyStore, PgCompanyStore};

use tracing::info;

use crate::errors::AppError;
use crate::locale::Message;
use crate::models::company::{CompanyRow, NewCompany};

/// Trims and checks company input. Name, address and placeholder are
/// required; a missing logo is stored as an empty string.
pub fn validate_company(
    name: Option<&str>,
    address: Option<&str>,
    logo: Option<&str>,
    placeholder: Option<&str>,
) -> Result<NewCompany, AppError> {
    let required = |field: Option<&str>| {
        field
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .ok_or(AppError::Validation(Message::CompanyFieldsRequired))
    };

    Ok(NewCompany {
        name: required(name)?,
        address: required(address)?,
        placeholder: required(placeholder)?,
        logo: logo.map(str::trim).unwrap_or_default().to_string(),
    })
}

/// Persists a company. A taken placeholder is a `Conflict` and writes nothing.
pub async fn create_company(
    store: &dyn CompanyStore,
    company: NewCompany,
) -> Result<CompanyRow, AppError> {
    let row = store.insert(&company).await?;
    info!("Created company {} ({})", row.id, row.placeholder);
    Ok(row)
}
