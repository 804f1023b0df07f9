use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ClientError;

/// Semantic outcome of a Blossom endpoint call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlossomStatus {
    AlreadyCompleted,
    Blacklisted,
    CocNotAccepted,
    DataMissing,
    MissingPrerequisite,
    NotFound,
    #[default]
    Ok,
    OtherUser,
}

impl BlossomStatus {
    /// Snake-case tag used on the wire and in the Python bindings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyCompleted => "already_completed",
            Self::Blacklisted => "blacklisted",
            Self::CocNotAccepted => "coc_not_accepted",
            Self::DataMissing => "data_missing",
            Self::MissingPrerequisite => "missing_prerequisite",
            Self::NotFound => "not_found",
            Self::Ok => "ok",
            Self::OtherUser => "other_user",
        }
    }
}

impl fmt::Display for BlossomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed result of an endpoint call: an outcome plus an optional JSON payload.
///
/// `data` is only populated where the endpoint documents a payload for
/// `status`; see the individual methods on [`crate::BlockingBlossomApi`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlossomResponse {
    pub status: BlossomStatus,
    pub data: Option<Value>,
}

impl BlossomResponse {
    /// Successful outcome carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self::with_data(BlossomStatus::Ok, data)
    }

    /// Outcome without a payload.
    pub fn status(status: BlossomStatus) -> Self {
        Self { status, data: None }
    }

    pub fn with_data(status: BlossomStatus, data: Value) -> Self {
        Self {
            status,
            data: Some(data),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == BlossomStatus::Ok
    }
}

/// Uninterpreted HTTP response returned by the `call` primitive.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    /// Parses the body as JSON.
    ///
    /// An empty body is a parse error: every payload Blossom documents is a
    /// JSON document.
    pub fn json(&self) -> Result<Value, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Fails on 4xx and 5xx statuses, passing anything else through.
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.status.is_client_error() || self.status.is_server_error() {
            Err(self.into_http_error())
        } else {
            Ok(self)
        }
    }

    /// Converts the response into a hard failure.
    pub fn into_http_error(self) -> ClientError {
        ClientError::HttpStatus {
            status: self.status,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use super::{BlossomResponse, BlossomStatus, RawResponse};
    use crate::ClientError;

    #[test]
    fn default_response_is_ok_without_data() {
        let response = BlossomResponse::default();
        assert!(response.is_ok());
        assert_eq!(response.data, None);
    }

    #[test]
    fn status_serializes_as_snake_case_tag() {
        let rendered = serde_json::to_value(BlossomStatus::CocNotAccepted).expect("serializes");
        assert_eq!(rendered, json!("coc_not_accepted"));
        assert_eq!(BlossomStatus::MissingPrerequisite.to_string(), "missing_prerequisite");
    }

    #[test]
    fn empty_body_is_not_json() {
        let raw = RawResponse {
            status: StatusCode::CREATED,
            body: "  ".to_owned(),
        };
        assert!(matches!(raw.json(), Err(ClientError::Json(_))));
    }

    #[test]
    fn error_for_status_only_rejects_4xx_and_5xx() {
        let created = RawResponse {
            status: StatusCode::CREATED,
            body: String::new(),
        };
        assert!(created.error_for_status().is_ok());

        let failed = RawResponse {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream".to_owned(),
        };
        match failed.error_for_status() {
            Err(ClientError::HttpStatus { status, body }) => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "upstream");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
