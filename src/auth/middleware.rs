use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::Method,
    middleware::Next,
};

use super::session;

/// Let requests through only when the session holds a backend token.
/// Anonymous page loads are remembered so sign-in can return to them.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();

    if session::get_token(&session).is_none() {
        if req.method() == Method::GET {
            let target = req.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
            session::remember_return_to(&session, target);
        }
        log::debug!("Anonymous request to {}, redirecting to login", req.path());
        let response = HttpResponse::SeeOther()
            .insert_header(("Location", "/login"))
            .finish();
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
