use actix_session::Session;
use actix_web::{web, HttpResponse};

use super::render_list;
use crate::auth::{csrf, session};
use crate::backend::{ApiClient, BackendError, ProtocolService};
use crate::config::Config;
use crate::errors::{AppError, redirect};
use crate::models::protocol::ProtocolForm;
use crate::templates_structs::ProtocolEditor;
use crate::tracker::RequestTracker;

/// Open the editor with an empty draft.
pub async fn new_form(
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
    tracker: web::Data<RequestTracker>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let editor = ProtocolEditor::create(ProtocolForm::default(), vec![]);
    render_list(&session, &client, &config, &tracker, Some(editor)).await
}

/// Open the editor on an existing record.
pub async fn edit_form(
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
    tracker: web::Data<RequestTracker>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let service = ProtocolService::new(session::backend_for(&session, &client)?);
    match service.get(&id).await {
        Ok(item) => {
            let editor = ProtocolEditor::update(ProtocolForm::from_item(&item), vec![]);
            render_list(&session, &client, &config, &tracker, Some(editor)).await
        }
        Err(BackendError::Unauthorized) => Err(AppError::Backend(BackendError::Unauthorized)),
        Err(e) => {
            log::warn!("Loading protocol {id} failed: {e}");
            session::flash_error(&session, format!("Could not load protocol: {}", e.user_message()));
            Ok(redirect("/protocols"))
        }
    }
}

/// Create-or-update from the editor. The editor closes (redirect) only when
/// the backend accepted the record.
pub async fn save(
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
    tracker: web::Data<RequestTracker>,
    session: Session,
    form: web::Form<ProtocolForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let form = form.into_inner();
    let reopen = |form: ProtocolForm, errors: Vec<String>| {
        if form.is_update() {
            ProtocolEditor::update(form, errors)
        } else {
            ProtocolEditor::create(form, errors)
        }
    };

    let item = match form.validate() {
        Ok(item) => item,
        Err(errors) => {
            return render_list(&session, &client, &config, &tracker, Some(reopen(form, errors))).await;
        }
    };

    let service = ProtocolService::new(session::backend_for(&session, &client)?);
    match service.save(&item).await {
        Ok(_) => {
            log::info!("Saved protocol '{}'", item.name);
            session::flash_success(&session, "Saved successfully");
            Ok(redirect("/protocols"))
        }
        Err(BackendError::Unauthorized) => Err(AppError::Backend(BackendError::Unauthorized)),
        Err(e) => {
            log::warn!("Saving protocol '{}' failed: {e}", item.name);
            let errors = vec![format!("Save failed: {}", e.user_message())];
            render_list(&session, &client, &config, &tracker, Some(reopen(form, errors))).await
        }
    }
}
