use reqwest::{Method, Url};
use tracing::debug;

use crate::form::FormBody;
use crate::session::Session;
use crate::{ClientError, Credentials, RawResponse};

/// Async transport for the Blossom API.
///
/// This is the async counterpart of [`crate::BlockingApiClient`] and follows
/// the same wire contract.
#[derive(Debug)]
pub struct ApiClient {
    session: Session,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a new client with the given credentials and base URL.
    ///
    /// The URL is normalized to include a trailing slash, so relative endpoint
    /// paths join correctly.
    pub fn new(credentials: Credentials, base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        let session = Session::new(credentials, base_url.as_ref())?;
        let http = reqwest::Client::builder()
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
    pub async fn get(
        &mut self,
        path: &str,
        body: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        self.call(Method::GET, path, body, query).await
    }

    /// Sends a `POST` request, primed for CSRF.
    pub async fn post(
        &mut self,
        path: &str,
        body: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        self.call(Method::POST, path, body, query).await
    }

    /// Sends a `PATCH` request, primed for CSRF.
    pub async fn patch(
        &mut self,
        path: &str,
        body: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        self.call(Method::PATCH, path, body, query).await
    }

    /// Sends a `DELETE` request, primed for CSRF.
    pub async fn delete(
        &mut self,
        path: &str,
        body: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        self.call(Method::DELETE, path, body, query).await
    }

    /// Sends a request and returns the uninterpreted response.
    ///
    /// See [`crate::BlockingApiClient::call`] for the priming and merge rules.
    pub async fn call(
        &mut self,
        method: Method,
        path: &str,
        body: &FormBody,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, ClientError> {
        let url = self.session.build_url(path)?;
        let mut form = self.session.outgoing_form(body);

        if method != Method::GET {
            self.send(Method::GET, url.clone(), &form, query).await?;
            self.session.apply_csrf(&url, &mut form);
        }

        self.send(method, url, &form, query).await
    }

    async fn send(
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

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, "Blossom responded");

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::ApiClient;
    use crate::Credentials;

    #[test]
    fn joins_paths_from_base_with_nested_prefix() {
        let credentials = Credentials::new("bot@example.com", "pw", "key").expect("valid");
        let client = ApiClient::new(credentials, "https://example.com/api").expect("valid url");
        assert_eq!(client.base_url().as_str(), "https://example.com/api/");
        assert_eq!(client.csrf_token(), None);
    }
}
