use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::{csrf, session};
use crate::backend::{AccountService, ApiClient, BackendError};
use crate::config::Config;
use crate::errors::{AppError, redirect, render};
use crate::models::account::{PasswordForm, ProfileForm, UserDetail};
use crate::templates_structs::{AccountSettingsTemplate, PageContext, ProfileView, SecurityTemplate};

fn profile_view(detail: UserDetail) -> ProfileView {
    ProfileView {
        name: detail.name.unwrap_or_default(),
        username: detail.username.unwrap_or_default(),
        email: detail.email.unwrap_or_default(),
        telephone: detail.telephone.unwrap_or_default(),
        description: detail.description.unwrap_or_default(),
    }
}

fn form_view(form: &ProfileForm, username: String) -> ProfileView {
    ProfileView {
        name: form.name.clone(),
        username,
        email: form.email.clone(),
        telephone: form.telephone.clone(),
        description: form.description.clone(),
    }
}

pub async fn settings(
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let service = AccountService::new(session::backend_for(&session, &client)?);
    let (profile, load_error) = match service.get().await {
        Ok(detail) => (Some(profile_view(detail)), None),
        Err(BackendError::Unauthorized) => return Err(AppError::Backend(BackendError::Unauthorized)),
        Err(e) => {
            log::warn!("Loading account details failed: {e}");
            (None, Some(e.user_message()))
        }
    };

    let ctx = PageContext::build(&session, &config, "/account/settings")?;
    render(AccountSettingsTemplate { ctx, profile, load_error, errors: vec![] })
}

pub async fn settings_submit(
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
    session: Session,
    form: web::Form<ProfileForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let errors = match form.validate() {
        Ok(partial) => {
            let service = AccountService::new(session::backend_for(&session, &client)?);
            match service.save(&partial).await {
                Ok(_) => {
                    if let Some(name) = &partial.name {
                        session::set_username(&session, name);
                    }
                    session::flash_success(&session, "Profile saved");
                    return Ok(redirect("/account/settings"));
                }
                Err(BackendError::Unauthorized) => return Err(AppError::Backend(BackendError::Unauthorized)),
                Err(e) => {
                    log::warn!("Saving account details failed: {e}");
                    vec![format!("Save failed: {}", e.user_message())]
                }
            }
        }
        Err(errors) => errors,
    };

    let ctx = PageContext::build(&session, &config, "/account/settings")?;
    let username = ctx.username.clone();
    let tmpl = AccountSettingsTemplate {
        ctx,
        profile: Some(form_view(&form, username)),
        load_error: None,
        errors,
    };
    render(tmpl)
}

pub async fn security(
    config: web::Data<Config>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &config, "/account/security")?;
    render(SecurityTemplate { ctx, errors: vec![] })
}

pub async fn change_password(
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
    session: Session,
    form: web::Form<PasswordForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let errors = match form.validate() {
        Ok(change) => {
            let service = AccountService::new(session::backend_for(&session, &client)?);
            match service.save_password(&change).await {
                Ok(()) => {
                    log::info!("Password changed");
                    session::flash_success(&session, "Password changed successfully");
                    return Ok(redirect("/account/security"));
                }
                Err(BackendError::Unauthorized) => return Err(AppError::Backend(BackendError::Unauthorized)),
                Err(e) => {
                    log::warn!("Password change failed: {e}");
                    vec![e.user_message()]
                }
            }
        }
        Err(errors) => errors,
    };

    let ctx = PageContext::build(&session, &config, "/account/security")?;
    render(SecurityTemplate { ctx, errors })
}
