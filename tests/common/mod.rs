//! In-process mock of the Blossom API used by the integration tests.
//!
//! Every request is recorded. Replies are scripted per `(method, path)`;
//! anything unscripted gets `200 {}`. When a CSRF token is configured, every
//! `GET` reply sets it as the `csrftoken` cookie, like Django does.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use url::form_urlencoded;

pub const EMAIL: &str = "bot@example.com";
pub const PASSWORD: &str = "hunter2";
pub const API_KEY: &str = "test-key";

/// One request as the server saw it.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub authorization: Option<String>,
}

impl Recorded {
    pub fn form_value(&self, key: &str) -> Option<&str> {
        lookup(&self.form, key)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        lookup(&self.query, key)
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

#[derive(Default)]
struct MockState {
    recorded: Vec<Recorded>,
    replies: HashMap<(String, String), (u16, String)>,
    csrf_token: Option<String>,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockBlossom {
    pub base_url: String,
    state: Shared,
}

impl MockBlossom {
    /// Starts the server on a random port in a background thread.
    pub fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                axum::serve(listener, app).await
            })
            .unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api/"),
            state,
        }
    }

    /// Scripts the reply for `method` on `path` (the full path, e.g. `/api/volunteer/`).
    pub fn reply(&self, method: &str, path: &str, status: u16, body: &Value) {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        self.state
            .lock()
            .unwrap()
            .replies
            .insert((method.to_owned(), path.to_owned()), (status, body));
    }

    /// Makes every `GET` reply set `csrftoken=<token>`.
    pub fn set_csrf_token(&self, token: &str) {
        self.state.lock().unwrap().csrf_token = Some(token.to_owned());
    }

    /// Stops setting the `csrftoken` cookie; the client keeps whatever it already has.
    pub fn clear_csrf_token(&self) {
        self.state.lock().unwrap().csrf_token = None;
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().recorded.clone()
    }
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_owned(),
        query: parse_pairs(uri.query().unwrap_or_default().as_bytes()),
        form: parse_pairs(&body),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
    };

    let mut state = state.lock().unwrap();
    let (status, payload) = state
        .replies
        .get(&(recorded.method.clone(), recorded.path.clone()))
        .cloned()
        .unwrap_or((200, "{}".to_owned()));

    let mut reply_headers = HeaderMap::new();
    reply_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if method == Method::GET {
        if let Some(token) = &state.csrf_token {
            let cookie = format!("csrftoken={token}; Path=/");
            reply_headers.insert(header::SET_COOKIE, HeaderValue::from_str(&cookie).unwrap());
        }
    }
    state.recorded.push(recorded);

    (
        StatusCode::from_u16(status).unwrap(),
        reply_headers,
        payload,
    )
        .into_response()
}

fn parse_pairs(raw: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(raw).into_owned().collect()
}
