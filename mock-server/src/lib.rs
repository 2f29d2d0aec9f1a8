//! Programmable HTTP mock server for exercising clients over real sockets.
//!
//! Rules are registered with `for_get(path).then_reply(status, body)` and the
//! returned `Endpoint` reports every request that matched it. A request that
//! matches no rule gets a 503 with an explanation.

use std::{
    io,
    net::SocketAddr,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    thread,
};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// A request the server received, as seen on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRequest {
    pub method: String,
    /// Absolute URL, e.g. `http://127.0.0.1:8080/widget?x=1`.
    pub url: String,
    /// Path without the query string.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl SeenRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A canned reply, also the on-disk format read by the binary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleSpec {
    /// `None` matches any method.
    #[serde(default)]
    pub method: Option<String>,
    pub path: String,
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: String,
}

impl RuleSpec {
    fn matches(&self, method: &Method, path: &str) -> bool {
        let method_ok = self
            .method
            .as_deref()
            .is_none_or(|m| m.eq_ignore_ascii_case(method.as_str()));
        method_ok && self.path == path
    }
}

struct Rule {
    id: usize,
    spec: RuleSpec,
    seen: Vec<SeenRequest>,
}

/// Registered rules in insertion order.
#[derive(Default)]
pub struct Rules {
    next_id: usize,
    rules: Vec<Rule>,
}

/// Shared rule table behind the router.
pub type Db = Arc<RwLock<Rules>>;

fn write(db: &Db) -> RwLockWriteGuard<'_, Rules> {
    db.write().unwrap_or_else(PoisonError::into_inner)
}

fn read(db: &Db) -> RwLockReadGuard<'_, Rules> {
    db.read().unwrap_or_else(PoisonError::into_inner)
}

/// Router that answers every request from the rule table in `db`.
pub fn app(db: Db) -> Router {
    Router::new().fallback(handle).with_state(db)
}

/// Serve `db` on `listener` until the process exits.
pub async fn run(listener: TcpListener, db: Db) -> Result<(), io::Error> {
    axum::serve(listener, app(db)).await
}

async fn handle(
    State(db): State<Db>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost")
        .to_string();
    let seen = SeenRequest {
        method: method.as_str().to_string(),
        url: format!("http://{host}{path}"),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let mut rules = write(&db);
    // Latest rule wins, like registering an override on top of a default.
    let Some(rule) = rules
        .rules
        .iter_mut()
        .rev()
        .find(|rule| rule.spec.matches(&method, uri.path()))
    else {
        log::warn!("no rule matches {} {}", seen.method, seen.path);
        let explanation = format!(
            "No rules were found matching this request: {} {}",
            seen.method, seen.path
        );
        return (StatusCode::SERVICE_UNAVAILABLE, explanation).into_response();
    };
    rule.seen.push(seen);

    let status = StatusCode::from_u16(rule.spec.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, rule.spec.body.clone()).into_response();
    for (name, value) in &rule.spec.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

/// A running mock server. Stops when the process exits.
#[derive(Clone)]
pub struct MockServer {
    addr: SocketAddr,
    db: Db,
}

impl MockServer {
    /// Start on a random free port.
    pub fn start() -> io::Result<Self> {
        Self::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    /// Start on a fixed port.
    pub fn start_on(port: u16) -> io::Result<Self> {
        Self::bind(SocketAddr::from(([127, 0, 0, 1], port)))
    }

    fn bind(addr: SocketAddr) -> io::Result<Self> {
        let std_listener = std::net::TcpListener::bind(addr)?;
        let addr = std_listener.local_addr()?;
        std_listener.set_nonblocking(true)?;

        let db = Db::default();
        let server_db = db.clone();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        thread::spawn(move || {
            rt.block_on(async {
                let listener = TcpListener::from_std(std_listener)?;
                run(listener, server_db).await
            })
        });

        Ok(Self { addr, db })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn db(&self) -> Db {
        self.db.clone()
    }

    pub fn for_get(&self, path: &str) -> RuleBuilder {
        self.rule(Some(Method::GET), path)
    }

    pub fn for_post(&self, path: &str) -> RuleBuilder {
        self.rule(Some(Method::POST), path)
    }

    pub fn for_any(&self, path: &str) -> RuleBuilder {
        self.rule(None, path)
    }

    fn rule(&self, method: Option<Method>, path: &str) -> RuleBuilder {
        RuleBuilder {
            db: self.db.clone(),
            method: method.map(|m| m.as_str().to_string()),
            path: path.to_string(),
        }
    }

    /// Drop every rule and everything recorded so far.
    pub fn reset(&self) {
        reset(&self.db);
    }
}

/// Drop every rule in `db`.
pub fn reset(db: &Db) {
    let mut rules = write(db);
    rules.rules.clear();
}

/// Register a rule directly in `db`.
pub fn add_rule(db: &Db, spec: RuleSpec) -> Endpoint {
    let mut rules = write(db);
    let id = rules.next_id;
    rules.next_id += 1;
    rules.rules.push(Rule {
        id,
        spec,
        seen: Vec::new(),
    });
    Endpoint { db: db.clone(), id }
}

/// Pending rule; registered by one of the `then_*` methods.
pub struct RuleBuilder {
    db: Db,
    method: Option<String>,
    path: String,
}

impl RuleBuilder {
    pub fn then_reply(self, status: u16, body: &str) -> Endpoint {
        self.then_reply_with_headers(status, &[], body)
    }

    pub fn then_json<T: Serialize>(self, status: u16, value: &T) -> Endpoint {
        let body = serde_json::to_string(value).unwrap_or_default();
        self.then_reply_with_headers(status, &[("content-type", "application/json")], &body)
    }

    pub fn then_reply_with_headers(
        self,
        status: u16,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Endpoint {
        let spec = RuleSpec {
            method: self.method,
            path: self.path,
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        };
        add_rule(&self.db, spec)
    }
}

/// Handle to a registered rule.
#[derive(Clone)]
pub struct Endpoint {
    db: Db,
    id: usize,
}

impl Endpoint {
    /// Requests that matched this rule, oldest first. Empty after a reset.
    pub fn seen_requests(&self) -> Vec<SeenRequest> {
        read(&self.db)
            .rules
            .iter()
            .find(|rule| rule.id == self.id)
            .map(|rule| rule.seen.clone())
            .unwrap_or_default()
    }
}
