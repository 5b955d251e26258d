use actix_session::Session;
use actix_web::{web, HttpResponse};

use super::QUERY_STATE_KEY;
use crate::auth::{csrf, session};
use crate::backend::{ApiClient, BackendError, ProtocolService};
use crate::config::Config;
use crate::errors::{AppError, redirect, render};
use crate::models::page::{page_links, size_options};
use crate::models::protocol::ProtocolSearchForm;
use crate::models::query::{Sort, SortOrder, TableChange};
use crate::models::{Page, QueryParam};
use crate::templates_structs::{PageContext, ProtocolEditor, ProtocolListTemplate};
use crate::tracker::RequestTracker;

pub fn stored_query(session: &Session) -> QueryParam {
    session::get_state(session, QUERY_STATE_KEY)
}

/// Link to a list page, preserving the current sort.
fn list_href(page: u32, size: u32, sorts: &[Sort]) -> String {
    let mut params = vec![("page", page.to_string()), ("size", size.to_string())];
    if let Some(sort) = sorts.first() {
        params.push(("sort", sort.name.clone()));
        params.push(("order", sort.order.as_table_str().to_string()));
    }
    format!("/protocols?{}", serde_urlencoded::to_string(&params).unwrap_or_default())
}

/// Header link cycling the name column through ascend, descend, unsorted.
fn name_sort(query: &QueryParam) -> (String, String) {
    let current = query.sorts.first().filter(|s| s.name == "name").map(|s| s.order);
    let (params, indicator) = match current {
        None => (vec![("page", "1".to_string()), ("sort", "name".to_string()), ("order", "ascend".to_string())], ""),
        Some(SortOrder::Asc) => (
            vec![("page", "1".to_string()), ("sort", "name".to_string()), ("order", SortOrder::Asc.toggle().as_table_str().to_string())],
            " ▲",
        ),
        Some(SortOrder::Desc) => (vec![("page", "1".to_string()), ("sort", String::new())], " ▼"),
    };
    (
        format!("/protocols?{}", serde_urlencoded::to_string(&params).unwrap_or_default()),
        indicator.to_string(),
    )
}

/// Query the backend and render the list, optionally with the editor open.
///
/// Returns 204 when a newer list request from the same session was issued
/// while this one was waiting on the backend.
pub(crate) async fn render_list(
    session: &Session,
    client: &ApiClient,
    config: &Config,
    tracker: &RequestTracker,
    editor: Option<ProtocolEditor>,
) -> Result<HttpResponse, AppError> {
    let api = session::backend_for(session, client)?;
    let query = stored_query(session);
    let ticket = tracker.begin(&session::console_id(session));

    let result = ProtocolService::new(api).query(&query).await;

    if !tracker.is_current(&ticket) {
        log::debug!("Discarding superseded protocol list response (seq {})", ticket.seq());
        return Ok(HttpResponse::NoContent().finish());
    }

    let (page, load_error) = match result {
        Ok(page) => (page, None),
        Err(BackendError::Unauthorized) => return Err(AppError::Backend(BackendError::Unauthorized)),
        Err(e) => {
            log::warn!("Protocol query failed: {e}");
            (Page::empty(query.page_size), Some(e.user_message()))
        }
    };

    let href = |p: u32, s: u32| list_href(p, s, &query.sorts);
    let prev_href = page.has_prev().then(|| href(page.current() - 1, page.page_size));
    let next_href = page.has_next().then(|| href(page.current() + 1, page.page_size));
    let (name_sort_href, name_sort_indicator) = name_sort(&query);

    let ctx = PageContext::build(session, config, "/protocols")?;
    let tmpl = ProtocolListTemplate {
        ctx,
        page_links: page_links(&page, href),
        size_options: size_options(&page, href),
        prev_href,
        next_href,
        name_sort_href,
        name_sort_indicator,
        search_name: query.term("name$LIKE").to_string(),
        search_state: query.term("state").to_string(),
        page,
        load_error,
        editor,
    };
    render(tmpl)
}

/// Page load or table change (pagination, page size, sort).
pub async fn list(
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
    tracker: web::Data<RequestTracker>,
    session: Session,
    change: web::Query<TableChange>,
) -> Result<HttpResponse, AppError> {
    if !change.is_empty() {
        let query = stored_query(&session).with_table_change(&change);
        session::set_state(&session, QUERY_STATE_KEY, &query);
    }
    render_list(&session, &client, &config, &tracker, None).await
}

/// Replace the filter terms and start over at the first page.
pub async fn search(
    session: Session,
    form: web::Form<ProtocolSearchForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let query = QueryParam::search(form.to_terms());
    session::set_state(&session, QUERY_STATE_KEY, &query);
    Ok(redirect("/protocols"))
}
