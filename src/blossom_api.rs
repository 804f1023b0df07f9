use crate::endpoints::{self, EndpointRequest, NewTranscription};
use crate::{ApiClient, BlockingApiClient, BlossomResponse, ClientError, Credentials};

/// Base URL of a local Blossom development server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";

/// Async Blossom API client with one method per endpoint.
///
/// Documented statuses come back as a [`BlossomResponse`]; anything else is
/// an `Err`. See [`BlockingBlossomApi`] for the per-endpoint tables.
#[derive(Debug)]
pub struct BlossomApi {
    inner: ApiClient,
}

impl BlossomApi {
    /// Creates a client. All four arguments must be non-empty.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        api_key: impl Into<String>,
        api_base_url: impl AsRef<str>,
    ) -> Result<Self, ClientError> {
        let credentials = Credentials::new(email, password, api_key)?;
        Ok(Self {
            inner: ApiClient::new(credentials, api_base_url)?,
        })
    }

    /// Gives access to the transport for endpoints not wrapped here.
    pub fn transport(&mut self) -> &mut ApiClient {
        &mut self.inner
    }

    async fn execute(&mut self, request: EndpointRequest) -> Result<BlossomResponse, ClientError> {
        let query = borrow_pairs(&request.query);
        let raw = self
            .inner
            .call(request.method.clone(), &request.path, &request.form, &query)
            .await?;
        request.interpret(raw)
    }

    pub async fn create_user(&mut self, username: &str) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::create_user(username)).await
    }

    pub async fn get_user(&mut self, username: &str) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::get_user(username)).await
    }

    pub async fn accept_coc(&mut self, username: &str) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::accept_coc(username)).await
    }

    pub async fn create_submission(
        &mut self,
        post_id: &str,
        post_url: &str,
        original_url: &str,
        content_url: &str,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::create_submission(
            post_id,
            post_url,
            original_url,
            content_url,
        ))
        .await
    }

    pub async fn get_submission(
        &mut self,
        filters: &[(&str, &str)],
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::get_submission(filters)).await
    }

    pub async fn delete_submission(
        &mut self,
        submission_id: &str,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::delete_submission(submission_id))
            .await
    }

    pub async fn create_transcription(
        &mut self,
        transcription: &NewTranscription<'_>,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::create_transcription(transcription))
            .await
    }

    pub async fn get_transcription(
        &mut self,
        filters: &[(&str, &str)],
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::get_transcription(filters)).await
    }

    pub async fn claim(
        &mut self,
        submission_id: &str,
        username: &str,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::claim(submission_id, username))
            .await
    }

    pub async fn unclaim(
        &mut self,
        submission_id: &str,
        username: &str,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::unclaim(submission_id, username))
            .await
    }

    pub async fn done(
        &mut self,
        submission_id: &str,
        username: &str,
        mod_override: bool,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::done(submission_id, username, mod_override))
            .await
    }

    pub async fn get_ocr_transcriptions(
        &mut self,
        source: Option<&str>,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::get_ocr_transcriptions(source))
            .await
    }
}

/// Blocking Blossom API client with one method per endpoint.
///
/// Each method maps the documented HTTP statuses to a
/// [`crate::BlossomStatus`]. Statuses outside that list, transport failures,
/// and malformed bodies surface as [`ClientError`].
#[derive(Debug)]
pub struct BlockingBlossomApi {
    inner: BlockingApiClient,
}

impl BlockingBlossomApi {
    /// Creates a client. All four arguments must be non-empty.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        api_key: impl Into<String>,
        api_base_url: impl AsRef<str>,
    ) -> Result<Self, ClientError> {
        let credentials = Credentials::new(email, password, api_key)?;
        Ok(Self {
            inner: BlockingApiClient::new(credentials, api_base_url)?,
        })
    }

    /// Gives access to the transport for endpoints not wrapped here.
    pub fn transport(&mut self) -> &mut BlockingApiClient {
        &mut self.inner
    }

    fn execute(&mut self, request: EndpointRequest) -> Result<BlossomResponse, ClientError> {
        let query = borrow_pairs(&request.query);
        let raw = self
            .inner
            .call(request.method.clone(), &request.path, &request.form, &query)?;
        request.interpret(raw)
    }

    /// `POST volunteer/`.
    ///
    /// `201` is `ok` with the new volunteer; `422` is `already_completed`.
    pub fn create_user(&mut self, username: &str) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::create_user(username))
    }

    /// `GET volunteer/?username=`.
    ///
    /// `ok` with the first match, or `not_found` when nothing matched.
    pub fn get_user(&mut self, username: &str) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::get_user(username))
    }

    /// `POST volunteer/accept_coc/?username=`.
    ///
    /// `201` is `ok`, `404` is `not_found`, `409` is `already_completed`.
    /// None of them carry data.
    pub fn accept_coc(&mut self, username: &str) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::accept_coc(username))
    }

    /// `POST submission/` for a Reddit post.
    ///
    /// Any non-error status is `ok` with the created submission.
    pub fn create_submission(
        &mut self,
        post_id: &str,
        post_url: &str,
        original_url: &str,
        content_url: &str,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::create_submission(
            post_id,
            post_url,
            original_url,
            content_url,
        ))
    }

    /// `GET submission/` with `filters` as query parameters.
    ///
    /// `ok` with every match, or `not_found`.
    pub fn get_submission(
        &mut self,
        filters: &[(&str, &str)],
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::get_submission(filters))
    }

    /// `DELETE submission/{id}/`. Only `204` is an outcome.
    pub fn delete_submission(&mut self, submission_id: &str) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::delete_submission(submission_id))
    }

    /// `POST transcription/`.
    ///
    /// `201` is `ok` with the transcription, `403` is `coc_not_accepted`,
    /// `404` is `not_found`.
    pub fn create_transcription(
        &mut self,
        transcription: &NewTranscription<'_>,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::create_transcription(transcription))
    }

    /// `GET transcription/` with `filters` as query parameters.
    pub fn get_transcription(
        &mut self,
        filters: &[(&str, &str)],
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::get_transcription(filters))
    }

    /// `PATCH submission/{id}/claim/`.
    ///
    /// | status | outcome |
    /// |---|---|
    /// | 201 | `ok` (with data) |
    /// | 403 | `coc_not_accepted` |
    /// | 404 | `not_found` |
    /// | 409 | `already_completed` |
    /// | 423 | `blacklisted` |
    pub fn claim(
        &mut self,
        submission_id: &str,
        username: &str,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::claim(submission_id, username))
    }

    /// `PATCH submission/{id}/unclaim/`.
    ///
    /// | status | outcome |
    /// |---|---|
    /// | 201 | `ok` (with data) |
    /// | 404 | `not_found` |
    /// | 406 | `other_user` |
    /// | 409 | `already_completed` |
    /// | 412 | `missing_prerequisite` |
    /// | 423 | `blacklisted` |
    pub fn unclaim(
        &mut self,
        submission_id: &str,
        username: &str,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::unclaim(submission_id, username))
    }

    /// `PATCH submission/{id}/done/`.
    ///
    /// | status | outcome |
    /// |---|---|
    /// | 201 | `ok` (with data) |
    /// | 403 | `coc_not_accepted` |
    /// | 404 | `not_found` |
    /// | 409 | `already_completed` |
    /// | 412 | `missing_prerequisite` |
    /// | 423 | `blacklisted` |
    /// | 428 | `data_missing` |
    pub fn done(
        &mut self,
        submission_id: &str,
        username: &str,
        mod_override: bool,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::done(submission_id, username, mod_override))
    }

    /// `GET submission/get_transcribot_queue/?source=`.
    ///
    /// `source` defaults to `reddit`. `200` is `ok` with the queue; `400` is
    /// `missing_prerequisite` with the error body as data.
    pub fn get_ocr_transcriptions(
        &mut self,
        source: Option<&str>,
    ) -> Result<BlossomResponse, ClientError> {
        self.execute(endpoints::get_ocr_transcriptions(source))
    }
}

fn borrow_pairs(pairs: &[(String, String)]) -> Vec<(&str, &str)> {
    pairs
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}
