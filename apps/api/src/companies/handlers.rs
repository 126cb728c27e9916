use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::companies::{create_company, validate_company};
use crate::errors::AppError;
use crate::locale::{Locale, Message};
use crate::models::company::CompanyRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub logo: Option<String>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCompanyResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: CompanyRow,
}

/// POST /companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    locale: Locale,
    payload: Result<Json<CreateCompanyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateCompanyResponse>), AppError> {
    let Json(req) = payload.map_err(|_| AppError::Validation(Message::MalformedBody))?;
    let company = validate_company(
        req.name.as_deref(),
        req.address.as_deref(),
        req.logo.as_deref(),
        req.placeholder.as_deref(),
    )?;
    let data = create_company(state.companies.as_ref(), company).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCompanyResponse {
            success: true,
            message: locale.text(Message::CompanyCreated),
            data,
        }),
    ))
}
