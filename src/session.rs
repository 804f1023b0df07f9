use std::fmt;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;

use crate::ClientError;
use crate::form::FormBody;

/// Cookie set by Blossom's CSRF middleware.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Form field the CSRF middleware reads the token back from.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// Login credentials sent with every Blossom request.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
    api_key: String,
}

impl Credentials {
    /// Validates and stores the bot's credentials.
    ///
    /// Every value must be non-empty.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let credentials = Self {
            email: email.into(),
            password: password.into(),
            api_key: api_key.into(),
        };
        if credentials.email.is_empty() {
            return Err(ClientError::MissingCredential("email address"));
        }
        if credentials.password.is_empty() {
            return Err(ClientError::MissingCredential("password"));
        }
        if credentials.api_key.is_empty() {
            return Err(ClientError::MissingCredential("API key"));
        }
        Ok(credentials)
    }

    /// Writes `email` and `password` into `form`, replacing caller values.
    pub fn merge_into(&self, form: &mut FormBody) {
        form.set("email", self.email.as_str());
        form.set("password", self.password.as_str());
    }

    /// Default headers carrying `Authorization: Api-Key <key>`.
    pub fn default_headers(&self) -> Result<HeaderMap, ClientError> {
        let mut value = HeaderValue::from_str(&format!("Api-Key {}", self.api_key))
            .map_err(|_| ClientError::InvalidApiKey)?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Per-client channel state shared by the async and blocking transports.
///
/// Owns the base URL, the credentials, the cookie jar handed to reqwest, and
/// the CSRF token seen after the latest priming request.
#[derive(Debug)]
pub(crate) struct Session {
    base_url: Url,
    credentials: Credentials,
    cookies: Arc<Jar>,
    csrf_token: Option<String>,
}

impl Session {
    pub(crate) fn new(credentials: Credentials, base_url: &str) -> Result<Self, ClientError> {
        if base_url.is_empty() {
            return Err(ClientError::MissingCredential("API base URL"));
        }
        let parsed =
            Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            base_url: ensure_trailing_slash(parsed),
            credentials,
            cookies: Arc::new(Jar::default()),
            csrf_token: None,
        })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.cookies)
    }

    pub(crate) fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Joins a normalized `path` onto the base URL.
    pub(crate) fn build_url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(&normalize_path(path))
            .map_err(|_| ClientError::InvalidPath(path.to_owned()))
    }

    /// Copies the caller's body and merges in the credentials.
    pub(crate) fn outgoing_form(&self, body: &FormBody) -> FormBody {
        let mut form = body.clone();
        self.credentials.merge_into(&mut form);
        form
    }

    /// Re-reads the CSRF cookie for `url` after a priming request and, when
    /// one is present, adds it to `form`.
    pub(crate) fn apply_csrf(&mut self, url: &Url, form: &mut FormBody) {
        self.csrf_token = read_csrf_cookie(&self.cookies, url);
        match &self.csrf_token {
            Some(token) => {
                debug!(%url, "attaching CSRF token");
                form.set(CSRF_FIELD, token.as_str());
            }
            None => debug!(%url, "no CSRF cookie after priming request"),
        }
    }
}

/// Strips one leading `/` and guarantees a trailing `/`.
pub(crate) fn normalize_path(path: &str) -> String {
    let mut relative = path.strip_prefix('/').unwrap_or(path).to_owned();
    if !relative.ends_with('/') {
        relative.push('/');
    }
    relative
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_owned();
        path.push('/');
        url.set_path(&path);
    }
    url
}

fn read_csrf_cookie(jar: &Jar, url: &Url) -> Option<String> {
    let header = jar.cookies(url)?;
    parse_cookie_header(header.to_str().ok()?, CSRF_COOKIE)
}

fn parse_cookie_header(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}
