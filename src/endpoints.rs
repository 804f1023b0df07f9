//! Request builders and status tables for every Blossom endpoint.
//!
//! Both [`crate::BlossomApi`] and [`crate::BlockingBlossomApi`] go through this
//! module, so each endpoint's contract is written down exactly once.

use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::warn;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::form::FormBody;
use crate::{BlossomResponse, BlossomStatus, ClientError, RawResponse};

use crate::BlossomStatus as S;

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Source used for submissions and transcriptions created through this client.
pub const DEFAULT_SOURCE: &str = "reddit";

/// One row of an endpoint status table.
#[derive(Clone, Copy, Debug)]
pub struct Outcome {
    pub code: u16,
    pub status: BlossomStatus,
    pub payload: bool,
}

impl Outcome {
    const fn data(code: u16, status: BlossomStatus) -> Self {
        Self {
            code,
            status,
            payload: true,
        }
    }

    const fn bare(code: u16, status: BlossomStatus) -> Self {
        Self {
            code,
            status,
            payload: false,
        }
    }
}

pub const CREATE_USER: &[Outcome] = &[
    Outcome::data(201, S::Ok),
    Outcome::bare(422, S::AlreadyCompleted),
];

pub const ACCEPT_COC: &[Outcome] = &[
    Outcome::bare(201, S::Ok),
    Outcome::bare(404, S::NotFound),
    Outcome::bare(409, S::AlreadyCompleted),
];

pub const DELETE_SUBMISSION: &[Outcome] = &[Outcome::bare(204, S::Ok)];

pub const CREATE_TRANSCRIPTION: &[Outcome] = &[
    Outcome::data(201, S::Ok),
    Outcome::bare(403, S::CocNotAccepted),
    Outcome::bare(404, S::NotFound),
];

pub const CLAIM: &[Outcome] = &[
    Outcome::data(201, S::Ok),
    Outcome::bare(403, S::CocNotAccepted),
    Outcome::bare(404, S::NotFound),
    Outcome::bare(409, S::AlreadyCompleted),
    Outcome::bare(423, S::Blacklisted),
];

pub const UNCLAIM: &[Outcome] = &[
    Outcome::data(201, S::Ok),
    Outcome::bare(404, S::NotFound),
    Outcome::bare(406, S::OtherUser),
    Outcome::bare(409, S::AlreadyCompleted),
    Outcome::bare(412, S::MissingPrerequisite),
    Outcome::bare(423, S::Blacklisted),
];

pub const DONE: &[Outcome] = &[
    Outcome::data(201, S::Ok),
    Outcome::bare(403, S::CocNotAccepted),
    Outcome::bare(404, S::NotFound),
    Outcome::bare(409, S::AlreadyCompleted),
    Outcome::bare(412, S::MissingPrerequisite),
    Outcome::bare(423, S::Blacklisted),
    Outcome::bare(428, S::DataMissing),
];

pub const OCR_QUEUE: &[Outcome] = &[
    Outcome::data(200, S::Ok),
    Outcome::data(400, S::MissingPrerequisite),
];

/// Looks up `status` in an endpoint table.
pub fn lookup(table: &[Outcome], status: StatusCode) -> Option<Outcome> {
    table
        .iter()
        .copied()
        .find(|outcome| outcome.code == status.as_u16())
}

/// How an endpoint turns a raw response into a [`BlossomResponse`].
#[derive(Clone, Copy, Debug)]
pub enum Interpretation {
    /// Only the listed statuses are outcomes; anything else is a hard failure.
    Table(&'static [Outcome]),
    /// Error statuses fail; otherwise the whole JSON body is the payload.
    Json,
    /// Error statuses fail; `results[0]` is the payload, empty means not found.
    FirstResult,
    /// Error statuses fail; the `results` array is the payload, empty means not found.
    AllResults,
}

impl Interpretation {
    pub fn apply(
        self,
        endpoint: &'static str,
        raw: RawResponse,
    ) -> Result<BlossomResponse, ClientError> {
        match self {
            Self::Table(table) => {
                let Some(outcome) = lookup(table, raw.status) else {
                    warn!(endpoint, status = %raw.status, "undocumented status from Blossom");
                    return Err(raw.into_http_error());
                };
                if outcome.payload {
                    Ok(BlossomResponse::with_data(outcome.status, raw.json()?))
                } else {
                    Ok(BlossomResponse::status(outcome.status))
                }
            }
            Self::Json => {
                let raw = checked(endpoint, raw)?;
                Ok(BlossomResponse::ok(raw.json()?))
            }
            Self::FirstResult => {
                let mut results = results(checked(endpoint, raw)?)?;
                if results.is_empty() {
                    Ok(BlossomResponse::status(S::NotFound))
                } else {
                    Ok(BlossomResponse::ok(results.swap_remove(0)))
                }
            }
            Self::AllResults => {
                let results = results(checked(endpoint, raw)?)?;
                if results.is_empty() {
                    Ok(BlossomResponse::status(S::NotFound))
                } else {
                    Ok(BlossomResponse::ok(Value::Array(results)))
                }
            }
        }
    }
}

fn checked(endpoint: &'static str, raw: RawResponse) -> Result<RawResponse, ClientError> {
    raw.error_for_status().inspect_err(|error| {
        warn!(endpoint, %error, "Blossom returned an error status");
    })
}

fn results(raw: RawResponse) -> Result<Vec<Value>, ClientError> {
    match raw.json()? {
        Value::Object(mut object) => match object.remove("results") {
            Some(Value::Array(results)) => Ok(results),
            Some(Value::Null) => Ok(Vec::new()),
            _ => Err(ClientError::MissingResults),
        },
        _ => Err(ClientError::MissingResults),
    }
}

/// Fully described endpoint call, ready to hand to a transport client.
#[derive(Clone, Debug)]
pub struct EndpointRequest {
    pub name: &'static str,
    pub method: Method,
    pub path: String,
    pub form: FormBody,
    pub query: Vec<(String, String)>,
    pub interpretation: Interpretation,
}

impl EndpointRequest {
    fn new(
        name: &'static str,
        method: Method,
        path: impl Into<String>,
        interpretation: Interpretation,
    ) -> Self {
        Self {
            name,
            method,
            path: path.into(),
            form: FormBody::new(),
            query: Vec::new(),
            interpretation,
        }
    }

    fn form(mut self, form: FormBody) -> Self {
        self.form = form;
        self
    }

    fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    pub fn interpret(&self, raw: RawResponse) -> Result<BlossomResponse, ClientError> {
        self.interpretation.apply(self.name, raw)
    }
}

pub fn create_user(username: &str) -> EndpointRequest {
    EndpointRequest::new(
        "create_user",
        Method::POST,
        "volunteer/",
        Interpretation::Table(CREATE_USER),
    )
    .form(FormBody::new().field("username", username))
}

pub fn get_user(username: &str) -> EndpointRequest {
    EndpointRequest::new(
        "get_user",
        Method::GET,
        "volunteer/",
        Interpretation::FirstResult,
    )
    .query([("username", username)])
}

pub fn accept_coc(username: &str) -> EndpointRequest {
    EndpointRequest::new(
        "accept_coc",
        Method::POST,
        "volunteer/accept_coc/",
        Interpretation::Table(ACCEPT_COC),
    )
    .query([("username", username)])
}

pub fn create_submission(
    post_id: &str,
    post_url: &str,
    original_url: &str,
    content_url: &str,
) -> EndpointRequest {
    EndpointRequest::new(
        "create_submission",
        Method::POST,
        "submission/",
        Interpretation::Json,
    )
    .form(
        FormBody::new()
            .field("original_id", post_id)
            .field("source", DEFAULT_SOURCE)
            .field("tor_url", post_url)
            .field("url", original_url)
            .field("content_url", content_url),
    )
}

pub fn get_submission(filters: &[(&str, &str)]) -> EndpointRequest {
    EndpointRequest::new(
        "get_submission",
        Method::GET,
        "submission/",
        Interpretation::AllResults,
    )
    .query(filters.iter().copied())
}

pub fn delete_submission(submission_id: &str) -> EndpointRequest {
    EndpointRequest::new(
        "delete_submission",
        Method::DELETE,
        format!("submission/{}/", encode_path_segment(submission_id)),
        Interpretation::Table(DELETE_SUBMISSION),
    )
}

/// Fields of a new transcription.
#[derive(Clone, Copy, Debug)]
pub struct NewTranscription<'a> {
    /// Reddit id of the transcription comment, sent as `original_id`.
    pub transcription_id: &'a str,
    pub text: &'a str,
    pub url: &'a str,
    pub username: &'a str,
    pub submission_id: &'a str,
    pub removed_from_reddit: bool,
}

pub fn create_transcription(transcription: &NewTranscription<'_>) -> EndpointRequest {
    EndpointRequest::new(
        "create_transcription",
        Method::POST,
        "transcription/",
        Interpretation::Table(CREATE_TRANSCRIPTION),
    )
    .form(
        FormBody::new()
            .field("original_id", transcription.transcription_id)
            .field("submission_id", transcription.submission_id)
            .field("source", DEFAULT_SOURCE)
            .field("text", transcription.text)
            .field("url", transcription.url)
            .field("username", transcription.username)
            .flag("removed_from_reddit", transcription.removed_from_reddit),
    )
}

pub fn get_transcription(filters: &[(&str, &str)]) -> EndpointRequest {
    EndpointRequest::new(
        "get_transcription",
        Method::GET,
        "transcription/",
        Interpretation::AllResults,
    )
    .query(filters.iter().copied())
}

pub fn claim(submission_id: &str, username: &str) -> EndpointRequest {
    submission_action("claim", submission_id, CLAIM)
        .form(FormBody::new().field("username", username))
}

pub fn unclaim(submission_id: &str, username: &str) -> EndpointRequest {
    submission_action("unclaim", submission_id, UNCLAIM)
        .form(FormBody::new().field("username", username))
}

pub fn done(submission_id: &str, username: &str, mod_override: bool) -> EndpointRequest {
    submission_action("done", submission_id, DONE).form(
        FormBody::new()
            .field("username", username)
            .flag("mod_override", mod_override),
    )
}

pub fn get_ocr_transcriptions(source: Option<&str>) -> EndpointRequest {
    let source = source
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_SOURCE);
    EndpointRequest::new(
        "get_ocr_transcriptions",
        Method::GET,
        "submission/get_transcribot_queue/",
        Interpretation::Table(OCR_QUEUE),
    )
    .query([("source", source)])
}

fn submission_action(
    action: &'static str,
    submission_id: &str,
    table: &'static [Outcome],
) -> EndpointRequest {
    EndpointRequest::new(
        action,
        Method::PATCH,
        format!("submission/{}/{action}/", encode_path_segment(submission_id)),
        Interpretation::Table(table),
    )
}

fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::{BlossomStatus, ClientError, RawResponse};

    fn raw(code: u16, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(code).expect("valid status"),
            body: body.to_owned(),
        }
    }

    #[test]
    fn claim_table_matches_documented_codes() {
        let expected = [
            (201, BlossomStatus::Ok),
            (403, BlossomStatus::CocNotAccepted),
            (404, BlossomStatus::NotFound),
            (409, BlossomStatus::AlreadyCompleted),
            (423, BlossomStatus::Blacklisted),
        ];
        for (code, status) in expected {
            let outcome = lookup(CLAIM, StatusCode::from_u16(code).unwrap()).expect("listed");
            assert_eq!(outcome.status, status, "code {code}");
        }
        assert!(lookup(CLAIM, StatusCode::PRECONDITION_FAILED).is_none());
    }

    #[test]
    fn unclaim_maps_not_acceptable_to_other_user() {
        let response = unclaim("42", "bob")
            .interpret(raw(406, "{\"detail\":\"nope\"}"))
            .expect("documented status");
        assert_eq!(response.status, BlossomStatus::OtherUser);
        assert_eq!(response.data, None);
    }

    #[test]
    fn done_maps_precondition_required_to_data_missing() {
        let response = done("42", "bob", false)
            .interpret(raw(428, ""))
            .expect("documented status");
        assert_eq!(response.status, BlossomStatus::DataMissing);
    }

    #[test]
    fn done_created_carries_payload() {
        let response = done("42", "bob", true)
            .interpret(raw(201, "{\"id\":42}"))
            .expect("documented status");
        assert_eq!(response, BlossomResponse::ok(json!({"id": 42})));
    }

    #[test]
    fn claim_blacklisted_has_no_payload() {
        let response = claim("42", "bob")
            .interpret(raw(423, "{\"detail\":\"banned\"}"))
            .expect("documented status");
        assert_eq!(response, BlossomResponse::status(BlossomStatus::Blacklisted));
    }

    #[test]
    fn create_user_fails_hard_on_server_error() {
        let error = create_user("carol")
            .interpret(raw(500, "boom"))
            .expect_err("undocumented status");
        match error {
            ClientError::HttpStatus { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn create_user_conflict_is_already_completed() {
        let response = create_user("carol")
            .interpret(raw(422, "{\"username\":[\"taken\"]}"))
            .expect("documented status");
        assert_eq!(response, BlossomResponse::status(BlossomStatus::AlreadyCompleted));
    }

    #[test]
    fn table_endpoints_reject_unlisted_success_codes() {
        let error = delete_submission("7")
            .interpret(raw(200, ""))
            .expect_err("only 204 is documented");
        assert!(matches!(error, ClientError::HttpStatus { .. }));
    }

    #[test]
    fn get_user_returns_first_result() {
        let body = json!({"results": [{"username": "alice"}, {"username": "other"}]});
        let response = get_user("alice")
            .interpret(raw(200, &body.to_string()))
            .expect("success");
        assert_eq!(response, BlossomResponse::ok(json!({"username": "alice"})));
    }

    #[test]
    fn get_user_with_empty_results_is_not_found() {
        let response = get_user("alice")
            .interpret(raw(200, "{\"results\": []}"))
            .expect("success");
        assert_eq!(response, BlossomResponse::status(BlossomStatus::NotFound));
    }

    #[test]
    fn list_endpoints_require_results_array() {
        let error = get_submission(&[])
            .interpret(raw(200, "{\"count\": 0}"))
            .expect_err("no results key");
        assert!(matches!(error, ClientError::MissingResults));
    }

    #[test]
    fn null_results_mean_not_found() {
        let response = get_submission(&[])
            .interpret(raw(200, "{\"results\": null}"))
            .expect("success");
        assert_eq!(response, BlossomResponse::status(BlossomStatus::NotFound));
    }

    #[test]
    fn payload_rows_require_a_json_body() {
        let error = claim("42", "bob")
            .interpret(raw(201, ""))
            .expect_err("empty body on a payload row");
        assert!(matches!(error, ClientError::Json(_)));
    }

    #[test]
    fn submission_ids_are_path_encoded() {
        assert_eq!(delete_submission("a b").path, "submission/a%20b/");
        assert_eq!(claim("x/y", "bob").path, "submission/x%2Fy/claim/");
        assert_eq!(done("a+b", "bob", false).path, "submission/a+b/done/");
    }

    #[test]
    fn get_transcription_returns_all_results() {
        let body = json!({"results": [{"id": 1}, {"id": 2}]});
        let response = get_transcription(&[("submission", "9")])
            .interpret(raw(200, &body.to_string()))
            .expect("success");
        assert_eq!(response.data, Some(json!([{"id": 1}, {"id": 2}])));
    }

    #[test]
    fn create_submission_accepts_any_non_error_status() {
        let response = create_submission("abc", "https://tor", "https://orig", "https://img")
            .interpret(raw(200, "{\"id\": 3}"))
            .expect("success");
        assert_eq!(response, BlossomResponse::ok(json!({"id": 3})));

        let error = create_submission("abc", "https://tor", "https://orig", "https://img")
            .interpret(raw(400, "bad"))
            .expect_err("client error");
        assert!(matches!(error, ClientError::HttpStatus { .. }));
    }

    #[test]
    fn ocr_queue_bad_request_carries_error_body() {
        let response = get_ocr_transcriptions(None)
            .interpret(raw(400, "{\"detail\":\"bad source\"}"))
            .expect("documented status");
        assert_eq!(response.status, BlossomStatus::MissingPrerequisite);
        assert_eq!(response.data, Some(json!({"detail": "bad source"})));
    }

    #[test]
    fn ocr_queue_defaults_source_to_reddit() {
        for source in [None, Some("")] {
            let request = get_ocr_transcriptions(source);
            assert_eq!(request.query, [("source".to_owned(), "reddit".to_owned())]);
        }
        let request = get_ocr_transcriptions(Some("blossom"));
        assert_eq!(request.query, [("source".to_owned(), "blossom".to_owned())]);
    }

    #[test]
    fn submission_actions_use_patch_on_nested_paths() {
        let request = done("42", "bob", true);
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.path, "submission/42/done/");
        assert_eq!(request.form.get("mod_override"), Some("True"));
        assert_eq!(unclaim("42", "bob").path, "submission/42/unclaim/");
    }

    #[test]
    fn transcription_form_uses_wire_field_names() {
        let request = create_transcription(&NewTranscription {
            transcription_id: "t1",
            text: "hello",
            url: "https://reddit.com/t1",
            username: "bob",
            submission_id: "42",
            removed_from_reddit: false,
        });
        let keys: Vec<&str> = request
            .form
            .pairs()
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(
            keys,
            [
                "original_id",
                "submission_id",
                "source",
                "text",
                "url",
                "username",
                "removed_from_reddit"
            ]
        );
    }

    #[test]
    fn accept_coc_sends_username_as_query() {
        let request = accept_coc("alice");
        assert_eq!(request.method, Method::POST);
        assert!(request.form.is_empty());
        assert_eq!(request.query, [("username".to_owned(), "alice".to_owned())]);
    }
}
