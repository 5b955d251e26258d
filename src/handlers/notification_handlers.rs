use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{csrf, session};
use crate::backend::{AccountService, ApiClient, BackendError};
use crate::config::Config;
use crate::errors::{AppError, redirect, render};
use crate::models::account::SubscribeForm;
use crate::models::page::page_links;
use crate::models::query::DEFAULT_PAGE_SIZE;
use crate::models::{Page, QueryParam};
use crate::templates_structs::{NotificationsTemplate, PageContext};

#[derive(Deserialize)]
pub struct AlarmQuery {
    /// 1-based page of the alarm table.
    page: Option<u32>,
}

/// Subscription form values echoed back on validation errors.
#[derive(Default)]
struct SubscribeDraft {
    subscribe_name: String,
    topic_provider: String,
    topic_config: String,
    errors: Vec<String>,
}

async fn render_page(
    service: &AccountService,
    config: &Config,
    session: &Session,
    page: u32,
    draft: SubscribeDraft,
) -> Result<HttpResponse, AppError> {
    // Loaded concurrently; one failing call must not hide the other's result.
    let query = QueryParam { page_index: page.saturating_sub(1), ..QueryParam::default() };
    let (providers, alarms) = tokio::join!(service.notification_providers(), service.device_alarms(&query));

    let (providers, providers_error) = match providers {
        Ok(p) => (p, None),
        Err(BackendError::Unauthorized) => return Err(AppError::Backend(BackendError::Unauthorized)),
        Err(e) => {
            log::warn!("Loading notification providers failed: {e}");
            (vec![], Some(e.user_message()))
        }
    };

    let (alarms, alarms_error) = match alarms {
        Ok(a) => (a, None),
        Err(BackendError::Unauthorized) => return Err(AppError::Backend(BackendError::Unauthorized)),
        Err(e) => {
            log::warn!("Loading device alarms failed: {e}");
            (Page::empty(DEFAULT_PAGE_SIZE), Some(e.user_message()))
        }
    };

    let links = page_links(&alarms, |p, _| format!("/account/notifications?page={p}"));
    let ctx = PageContext::build(session, config, "/account/notifications")?;
    let tmpl = NotificationsTemplate {
        ctx,
        providers,
        providers_error,
        page_links: links,
        alarms,
        alarms_error,
        errors: draft.errors,
        subscribe_name: draft.subscribe_name,
        topic_provider: draft.topic_provider,
        topic_config: draft.topic_config,
    };
    render(tmpl)
}

pub async fn index(
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
    session: Session,
    query: web::Query<AlarmQuery>,
) -> Result<HttpResponse, AppError> {
    let service = AccountService::new(session::backend_for(&session, &client)?);
    let page = query.page.unwrap_or(1).max(1);
    render_page(&service, &config, &session, page, SubscribeDraft::default()).await
}

pub async fn subscribe(
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
    session: Session,
    form: web::Form<SubscribeForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let service = AccountService::new(session::backend_for(&session, &client)?);

    let errors = match form.validate() {
        Ok(subscription) => match service.save_subscribe(&subscription).await {
            Ok(_) => {
                log::info!("Subscribed '{}' to {}", subscription.subscribe_name, subscription.topic_provider);
                session::flash_success(&session, "Subscription saved");
                return Ok(redirect("/account/notifications"));
            }
            Err(BackendError::Unauthorized) => return Err(AppError::Backend(BackendError::Unauthorized)),
            Err(e) => {
                log::warn!("Saving subscription failed: {e}");
                vec![format!("Subscription failed: {}", e.user_message())]
            }
        },
        Err(errors) => errors,
    };

    let draft = SubscribeDraft {
        subscribe_name: form.subscribe_name.clone(),
        topic_provider: form.topic_provider.clone(),
        topic_config: form.topic_config.clone(),
        errors,
    };
    render_page(&service, &config, &session, 1, draft).await
}
