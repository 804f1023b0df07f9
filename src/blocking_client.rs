use reqwest::{Method, Url};
use tracing::debug;

use crate::form::FormBody;
use crate::session::Session;
use crate::{ClientError, Credentials, RawResponse};

/// Blocking transport for the Blossom API.
///
/// Holds one persistent reqwest channel with a cookie jar and the
/// `Authorization: Api-Key <key>` default header. Requests return the raw
/// status and body; status interpretation belongs to
/// [`crate::BlockingBlossomApi`].
///
/// Every method takes `&mut self`: a non-GET call is a priming `GET`
/// followed by the real request, and both must see the same cookie state.
/// Share a client across threads only behind a lock.
#[derive(Debug)]
pub struct BlockingApiClient {
    session: Session,
    http: reqwest::blocking::Client,
}

impl BlockingApiClient {
    /// Creates a new client with the given credentials and base URL.
    ///
    /// The URL is normalized to include a trailing slash, so relative endpoint
    /// paths join correctly.
    pub fn new(credentials: Credentials, base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        let session = Session::new(credentials, base_url.as_ref())?;
        let http = reqwest::blocking::Client::builder()
            .default_headers(session.credentials().default_headers()?)
            .cookie_provider(session.cookie_jar())
            .build()?;

        Ok(Self { session, http })
    }

    pub fn base_url(&self) -> &Url {
        self.session.base_url()
    }

    /// CSRF token picked up by the most recent priming request.
    pub fn csrf_token(&self) -> Option<&str> {
        self.session.csrf_token()
    }

    /// Sends a `GET` request.
    pub fn get(
        &mut self,
        path: &str,
        body: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        self.call(Method::GET, path, body, query)
    }

    /// Sends a `POST` request, primed for CSRF.
    pub fn post(
        &mut self,
        path: &str,
        body: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        self.call(Method::POST, path, body, query)
    }

    /// Sends a `PATCH` request, primed for CSRF.
    pub fn patch(
        &mut self,
        path: &str,
        body: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        self.call(Method::PATCH, path, body, query)
    }

    /// Sends a `DELETE` request, primed for CSRF.
    pub fn delete(
        &mut self,
        path: &str,
        body: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        self.call(Method::DELETE, path, body, query)
    }

    /// Sends a request and returns the uninterpreted response.
    ///
    /// `email` and `password` are merged into `body`. For any method other
    /// than `GET`, a `GET` with the same path, body and query goes out first;
    /// if the jar then holds a `csrftoken` cookie, its value is sent as
    /// `csrfmiddlewaretoken`. The priming response itself is discarded.
    pub fn call(
        &mut self,
        method: Method,
        path: &str,
        body: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        let url = self.session.build_url(path)?;
        let mut form = self.session.outgoing_form(body);

        if method != Method::GET {
            self.send(Method::GET, url.clone(), &form, query)?;
            self.session.apply_csrf(&url, &mut form);
        }

        self.send(method, url, &form, query)
    }

    fn send(
        &self,
        method: Method,
        url: Url,
        form: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        debug!(%method, %url, "sending Blossom request");
        let mut request = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }

        if !form.is_empty() {
            request = request.form(form);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        debug!(%status, "Blossom responded");

        Ok(RawResponse { status, body })
    }
}
