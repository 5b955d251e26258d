use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{csrf, session};
use crate::backend::{ApiClient, BackendError, ProtocolService};
use crate::errors::{AppError, redirect};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::protocol::DeployAction;

#[derive(Deserialize)]
pub struct DeployForm {
    pub action: String,
    pub csrf_token: String,
}

/// Report a mutation failure as a notice; an expired token still goes
/// back to the login page.
fn flash_failure(session: &Session, what: &str, e: BackendError) -> Result<(), AppError> {
    if matches!(e, BackendError::Unauthorized) {
        return Err(AppError::Backend(e));
    }
    log::warn!("{what} failed: {e}");
    session::flash_error(session, format!("{what} failed: {}", e.user_message()));
    Ok(())
}

/// Publish or unpublish a protocol.
pub async fn change_deploy(
    client: web::Data<ApiClient>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<DeployForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let action = DeployAction::parse(&form.action)
        .ok_or_else(|| AppError::Validation(format!("Unknown deploy action '{}'", form.action)))?;
    let id = path.into_inner();

    let service = ProtocolService::new(session::backend_for(&session, &client)?);
    match service.change_deploy(&id, action).await {
        Ok(()) => session::flash_success(&session, "Operation succeeded"),
        Err(e) => flash_failure(&session, "Operation", e)?,
    }
    Ok(redirect("/protocols"))
}

pub async fn delete(
    client: web::Data<ApiClient>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();

    let service = ProtocolService::new(session::backend_for(&session, &client)?);
    match service.remove(&id).await {
        Ok(()) => {
            log::info!("Deleted protocol {id}");
            session::flash_success(&session, "Deleted successfully");
        }
        Err(e) => flash_failure(&session, "Delete", e)?,
    }
    Ok(redirect("/protocols"))
}
