//! Shared test infrastructure.
//!
//! - `FakeBackend::spawn()` serves an in-memory device-management backend
//!   (envelope responses, token auth) on an ephemeral port.
//! - `console!` builds the console app against a backend URL.
//! - `Browser` carries the session cookie between requests, the way a real
//!   browser would.
#![allow(dead_code, unused_macros)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};

use iotconsole::backend::TOKEN_HEADER;
use iotconsole::models::account::{DeviceAlarm, NotificationProvider, UserDetail};
use iotconsole::models::protocol::{ProtocolItem, ProtocolState};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin123";
pub const ADMIN_NAME: &str = "Administrator";

// ============================================================================
// FAKE BACKEND
// ============================================================================

pub struct FakeState {
    pub protocols: Vec<ProtocolItem>,
    pub next_id: u64,
    pub user: UserDetail,
    pub password: String,
    pub providers: Vec<NotificationProvider>,
    pub alarms: Vec<DeviceAlarm>,
    pub subscriptions: Vec<Value>,
    pub tokens: Vec<String>,
    /// Operations that answer with an error envelope.
    pub failing: Vec<&'static str>,
    /// Query strings of every protocol list request, in order.
    pub protocol_queries: Vec<HashMap<String, String>>,
    pub alarm_queries: Vec<HashMap<String, String>>,
}

impl FakeState {
    fn seeded() -> Self {
        let protocols = vec![
            protocol("mqtt", "MQTT", ProtocolState::Published),
            protocol("coap", "CoAP", ProtocolState::Unpublished),
            protocol("5", "Modbus", ProtocolState::Unpublished),
        ];
        FakeState {
            protocols,
            next_id: 1,
            user: UserDetail {
                id: Some("1".into()),
                name: Some(ADMIN_NAME.into()),
                username: Some(ADMIN_USER.into()),
                email: Some("admin@example.com".into()),
                telephone: None,
                avatar: None,
                description: None,
            },
            password: ADMIN_PASS.into(),
            providers: vec![
                NotificationProvider { id: "device_alarm".into(), name: "Device alarm".into() },
                NotificationProvider { id: "system_event".into(), name: "System event".into() },
            ],
            alarms: (0..12)
                .map(|i| DeviceAlarm {
                    id: format!("alarm-{i}"),
                    name: format!("Alarm {i}"),
                    target: Some("device".into()),
                    target_id: Some(format!("dev-{i}")),
                    state: Some("running".into()),
                    create_time: Some(1_700_000_000_000),
                })
                .collect(),
            subscriptions: vec![],
            tokens: vec![],
            failing: vec![],
            protocol_queries: vec![],
            alarm_queries: vec![],
        }
    }

    fn fails(&self, op: &str) -> bool {
        self.failing.contains(&op)
    }
}

pub fn protocol(id: &str, name: &str, state: ProtocolState) -> ProtocolItem {
    ProtocolItem {
        id: id.into(),
        name: name.into(),
        description: Some(format!("{name} protocol")),
        kind: Some("jar".into()),
        configuration: None,
        state,
    }
}

type Shared = Arc<Mutex<FakeState>>;

/// Handle to a running fake backend.
#[derive(Clone)]
pub struct FakeBackend {
    pub base_url: String,
    state: Shared,
}

impl FakeBackend {
    /// Start the backend on a random port in its own thread and runtime.
    pub fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::seeded()));
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend addr");

        let shared = state.clone();
        std::thread::spawn(move || {
            actix_rt::System::new().block_on(async move {
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(web::Data::new(shared.clone()))
                        .configure(fake_routes)
                })
                .workers(1)
                .listen(listener)
                .expect("listen fake backend")
                .run();
                let _ = server.await;
            });
        });

        FakeBackend { base_url: format!("http://{addr}"), state }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().expect("fake state");
        f(&mut state)
    }

    pub fn fail(&self, op: &'static str) {
        self.with(|s| s.failing.push(op));
    }

    pub fn protocol_query_count(&self) -> usize {
        self.with(|s| s.protocol_queries.len())
    }

    pub fn last_protocol_query(&self) -> HashMap<String, String> {
        self.with(|s| s.protocol_queries.last().cloned().unwrap_or_default())
    }

    pub fn find_protocol(&self, id: &str) -> Option<ProtocolItem> {
        self.with(|s| s.protocols.iter().find(|p| p.id == id).cloned())
    }

    /// Sign in directly and return a token, bypassing the console.
    pub fn issue_token(&self) -> String {
        self.with(|s| {
            let token = format!("token-{}", s.tokens.len() + 1);
            s.tokens.push(token.clone());
            token
        })
    }
}

fn ok(result: impl serde::Serialize) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": 200, "result": result }))
}

fn ok_empty() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": 200 }))
}

/// Error envelope carried in an HTTP 200 response.
fn failed(status: u16, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": status, "message": message }))
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "status": 401, "message": "Unauthorized" }))
}

fn authorized(req: &HttpRequest, state: &FakeState) -> bool {
    req.headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|t| state.tokens.iter().any(|k| k == t))
}

macro_rules! guard {
    ($req:expr, $state:expr) => {
        let state = $state.lock().expect("fake state");
        if !authorized(&$req, &state) {
            return unauthorized();
        }
        drop(state);
    };
}

fn fake_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/jetlinks/authorize/login", web::post().to(login))
        .route("/jetlinks/user-token/reset", web::get().to(logout))
        .route("/jetlinks/user/detail", web::get().to(get_detail))
        .route("/jetlinks/user/detail", web::put().to(put_detail))
        .route("/user/passwd", web::put().to(put_password))
        .route("/jetlinks/notifications/providers", web::get().to(providers))
        .route("/jetlinks/notifications/subscribe", web::patch().to(subscribe))
        .route("/jetlinks/device/alarm/_query", web::get().to(alarms))
        .route("/jetlinks/protocol/_query", web::get().to(query_protocols))
        .route("/jetlinks/protocol", web::patch().to(save_protocol))
        .route("/jetlinks/protocol/{id}", web::get().to(get_protocol))
        .route("/jetlinks/protocol/{id}", web::delete().to(remove_protocol))
        .route("/jetlinks/protocol/{id}/{action}", web::post().to(deploy_protocol));
}

async fn login(state: web::Data<Shared>, body: web::Json<Value>) -> HttpResponse {
    let body = body.into_inner();
    let mut s = state.lock().expect("fake state");
    let user = body["username"].as_str().unwrap_or_default();
    let pass = body["password"].as_str().unwrap_or_default();
    if user != ADMIN_USER || pass != s.password {
        return HttpResponse::BadRequest().json(json!({ "status": 400, "message": "Bad credentials" }));
    }
    let token = format!("token-{}", s.tokens.len() + 1);
    s.tokens.push(token.clone());
    ok(json!({ "token": token, "user": { "name": ADMIN_NAME, "username": ADMIN_USER } }))
}

async fn logout(req: HttpRequest, state: web::Data<Shared>) -> HttpResponse {
    let mut s = state.lock().expect("fake state");
    let token = req.headers().get(TOKEN_HEADER).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    s.tokens.retain(|t| *t != token);
    ok_empty()
}

async fn get_detail(req: HttpRequest, state: web::Data<Shared>) -> HttpResponse {
    guard!(req, state);
    let s = state.lock().expect("fake state");
    if s.fails("detail") {
        return failed(500, "user service unavailable");
    }
    ok(&s.user)
}

async fn put_detail(req: HttpRequest, state: web::Data<Shared>, body: web::Json<UserDetail>) -> HttpResponse {
    guard!(req, state);
    let mut s = state.lock().expect("fake state");
    if s.fails("save_detail") {
        return failed(500, "profile store is read-only");
    }
    let update = body.into_inner();
    if update.name.is_some() {
        s.user.name = update.name;
    }
    if update.email.is_some() {
        s.user.email = update.email;
    }
    if update.telephone.is_some() {
        s.user.telephone = update.telephone;
    }
    if update.description.is_some() {
        s.user.description = update.description;
    }
    ok_empty()
}

async fn put_password(req: HttpRequest, state: web::Data<Shared>, body: web::Json<Value>) -> HttpResponse {
    guard!(req, state);
    let body = body.into_inner();
    let mut s = state.lock().expect("fake state");
    if body["oldPassword"].as_str() != Some(s.password.as_str()) {
        return failed(400, "Old password is incorrect");
    }
    s.password = body["newPassword"].as_str().unwrap_or_default().to_string();
    ok_empty()
}

async fn providers(req: HttpRequest, state: web::Data<Shared>) -> HttpResponse {
    guard!(req, state);
    let s = state.lock().expect("fake state");
    if s.fails("providers") {
        return failed(503, "notification service down");
    }
    ok(&s.providers)
}

async fn subscribe(req: HttpRequest, state: web::Data<Shared>, body: web::Json<Value>) -> HttpResponse {
    guard!(req, state);
    let mut s = state.lock().expect("fake state");
    let sub = body.into_inner();
    s.subscriptions.push(sub.clone());
    ok(sub)
}

fn paginate<T: Clone>(items: &[T], params: &HashMap<String, String>) -> Value
where
    T: serde::Serialize,
{
    let page_index: usize = params.get("pageIndex").and_then(|v| v.parse().ok()).unwrap_or(0);
    let page_size: usize = params.get("pageSize").and_then(|v| v.parse().ok()).unwrap_or(10);
    let data: Vec<T> = items.iter().skip(page_index * page_size).take(page_size).cloned().collect();
    json!({ "data": data, "total": items.len(), "pageIndex": page_index, "pageSize": page_size })
}

async fn alarms(req: HttpRequest, state: web::Data<Shared>, params: web::Query<HashMap<String, String>>) -> HttpResponse {
    guard!(req, state);
    let params = params.into_inner();
    let mut s = state.lock().expect("fake state");
    s.alarm_queries.push(params.clone());
    if s.fails("alarms") {
        return failed(500, "alarm index rebuilding");
    }
    ok(paginate(&s.alarms, &params))
}

async fn query_protocols(req: HttpRequest, state: web::Data<Shared>, params: web::Query<HashMap<String, String>>) -> HttpResponse {
    guard!(req, state);
    let params = params.into_inner();
    let mut s = state.lock().expect("fake state");
    s.protocol_queries.push(params.clone());
    if s.fails("query") {
        return failed(500, "protocol index unavailable");
    }

    let mut items: Vec<ProtocolItem> = s.protocols.clone();
    let mut i = 0;
    while let Some(column) = params.get(&format!("terms[{i}].column")) {
        let value = params.get(&format!("terms[{i}].value")).cloned().unwrap_or_default();
        match column.as_str() {
            "name$LIKE" => {
                let needle = value.trim_matches('%').to_lowercase();
                items.retain(|p| p.name.to_lowercase().contains(&needle));
            }
            "state" => items.retain(|p| u8::from(p.state).to_string() == value),
            _ => {}
        }
        i += 1;
    }
    if params.get("sorts[0].name").map(String::as_str) == Some("name") {
        items.sort_by_key(|p| p.name.to_lowercase());
        if params.get("sorts[0].order").map(String::as_str) == Some("desc") {
            items.reverse();
        }
    }
    ok(paginate(&items, &params))
}

async fn get_protocol(req: HttpRequest, state: web::Data<Shared>, path: web::Path<String>) -> HttpResponse {
    guard!(req, state);
    let s = state.lock().expect("fake state");
    match s.protocols.iter().find(|p| p.id == *path) {
        Some(p) => ok(p),
        None => failed(404, "Protocol not found"),
    }
}

async fn save_protocol(req: HttpRequest, state: web::Data<Shared>, body: web::Json<ProtocolItem>) -> HttpResponse {
    guard!(req, state);
    let mut s = state.lock().expect("fake state");
    if s.fails("save") {
        return failed(500, "duplicate protocol name");
    }
    let mut item = body.into_inner();
    if item.id.is_empty() {
        item.id = format!("proto-{}", s.next_id);
        s.next_id += 1;
    }
    let added = match s.protocols.iter().position(|p| p.id == item.id) {
        Some(i) => {
            s.protocols[i] = item;
            0
        }
        None => {
            s.protocols.push(item);
            1
        }
    };
    ok(json!({ "added": added, "updated": 1 - added, "total": 1 }))
}

async fn remove_protocol(req: HttpRequest, state: web::Data<Shared>, path: web::Path<String>) -> HttpResponse {
    guard!(req, state);
    let mut s = state.lock().expect("fake state");
    if s.fails("remove") {
        return failed(500, "protocol is in use");
    }
    let before = s.protocols.len();
    s.protocols.retain(|p| p.id != *path);
    if s.protocols.len() == before {
        return failed(404, "Protocol not found");
    }
    ok(1)
}

async fn deploy_protocol(req: HttpRequest, state: web::Data<Shared>, path: web::Path<(String, String)>) -> HttpResponse {
    guard!(req, state);
    let mut s = state.lock().expect("fake state");
    if s.fails("deploy") {
        return failed(500, "protocol package could not be loaded");
    }
    let (id, action) = path.into_inner();
    let new_state = match action.as_str() {
        "_deploy" => ProtocolState::Published,
        "_un-deploy" => ProtocolState::Unpublished,
        _ => return failed(400, "unknown action"),
    };
    match s.protocols.iter_mut().find(|p| p.id == id) {
        Some(p) => {
            p.state = new_state;
            ok(true)
        }
        None => failed(404, "Protocol not found"),
    }
}

// ============================================================================
// CONSOLE UNDER TEST
// ============================================================================

/// Build the console service against `$backend_url`, optionally sharing a
/// list tracker the test can inspect.
macro_rules! console {
    ($backend_url:expr) => {
        console!($backend_url, iotconsole::tracker::RequestTracker::new())
    };
    ($backend_url:expr, $tracker:expr) => {{
        let config = iotconsole::config::Config::for_backend($backend_url);
        let client = iotconsole::backend::ApiClient::new(&config.backend_url, config.backend_timeout)
            .expect("backend client");
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::generate(),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .app_data(actix_web::web::Data::new(client))
                .app_data(actix_web::web::Data::new(config))
                .app_data(actix_web::web::Data::new($tracker.clone()))
                .app_data(actix_web::web::Data::new(iotconsole::auth::rate_limit::RateLimiter::default()))
                .configure(iotconsole::routes::configure),
        )
        .await
    }};
}

/// Send a GET through the browser, keeping the session cookie.
macro_rules! get {
    ($app:expr, $browser:expr, $uri:expr) => {{
        let req = $browser.get($uri).to_request();
        common::send(&$app, &mut $browser, req).await
    }};
}

/// Send a form POST through the browser, keeping the session cookie.
macro_rules! post {
    ($app:expr, $browser:expr, $uri:expr, $form:expr) => {{
        let req = $browser.post($uri, $form).to_request();
        common::send(&$app, &mut $browser, req).await
    }};
}

/// Sign in as the admin and return the session's CSRF token.
macro_rules! sign_in {
    ($app:expr, $browser:expr) => {{
        let page = get!($app, $browser, "/login");
        let token = common::csrf_token(&page.body);
        let reply = post!(
            $app,
            $browser,
            "/login",
            &[("username", common::ADMIN_USER), ("password", common::ADMIN_PASS), ("csrf_token", token.as_str())]
        );
        assert_eq!(reply.location.as_deref(), Some("/protocols"), "sign-in failed: {}", reply.body);
        token
    }};
}

#[derive(Default)]
pub struct Browser {
    cookie: Option<Cookie<'static>>,
}

impl Browser {
    pub fn keep<B>(&mut self, resp: &ServiceResponse<B>) {
        for c in resp.response().cookies() {
            if c.name() == "id" {
                self.cookie = Some(c.into_owned());
            }
        }
    }

    pub fn get(&self, uri: &str) -> TestRequest {
        self.with_cookie(TestRequest::get().uri(uri))
    }

    pub fn post(&self, uri: &str, form: &[(&str, &str)]) -> TestRequest {
        self.with_cookie(TestRequest::post().uri(uri).set_form(form))
    }

    fn with_cookie(&self, req: TestRequest) -> TestRequest {
        match &self.cookie {
            Some(c) => req.cookie(c.clone()),
            None => req,
        }
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub async fn send<S, R, B>(app: &S, browser: &mut Browser, req: R) -> Reply
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    browser.keep(&resp);
    let status = resp.status();
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap_or_default();
    Reply { status, location, body }
}

/// Scrape the CSRF token from a rendered form.
pub fn csrf_token(html: &str) -> String {
    let re = regex::Regex::new(r#"name="csrf_token" value="([0-9a-f]{64})""#).expect("regex");
    re.captures(html)
        .map(|c| c[1].to_string())
        .expect("page carries a CSRF token")
}
