use std::sync::{Mutex, MutexGuard};

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use reqwest::Method;
use serde_json::Value;

use crate::{
    BlockingBlossomApi, BlossomResponse, ClientError, DEFAULT_BASE_URL, FormBody, NewTranscription,
};

#[pyclass(name = "BlossomResponse", get_all)]
pub struct PyBlossomResponse {
    /// Outcome tag such as `"ok"` or `"blacklisted"`.
    pub status: String,
    /// JSON-encoded payload, when the endpoint returned one.
    pub data: Option<String>,
}

impl From<BlossomResponse> for PyBlossomResponse {
    fn from(response: BlossomResponse) -> Self {
        Self {
            status: response.status.as_str().to_owned(),
            data: response.data.as_ref().map(Value::to_string),
        }
    }
}

#[pyclass(name = "BlossomAPI")]
pub struct PyBlossomApi {
    inner: Mutex<BlockingBlossomApi>,
}

#[pymethods]
impl PyBlossomApi {
    #[new]
    #[pyo3(signature = (email, password, api_key, api_base_url=DEFAULT_BASE_URL.to_owned()))]
    fn new(
        email: String,
        password: String,
        api_key: String,
        api_base_url: String,
    ) -> PyResult<Self> {
        let client = BlockingBlossomApi::new(email, password, api_key, api_base_url)
            .map_err(to_py_value_error)?;

        Ok(Self {
            inner: Mutex::new(client),
        })
    }

    fn create_user(&self, username: &str) -> PyResult<PyBlossomResponse> {
        respond(self.lock()?.create_user(username))
    }

    fn get_user(&self, username: &str) -> PyResult<PyBlossomResponse> {
        respond(self.lock()?.get_user(username))
    }

    fn accept_coc(&self, username: &str) -> PyResult<PyBlossomResponse> {
        respond(self.lock()?.accept_coc(username))
    }

    fn create_submission(
        &self,
        post_id: &str,
        post_url: &str,
        original_url: &str,
        content_url: &str,
    ) -> PyResult<PyBlossomResponse> {
        respond(
            self.lock()?
                .create_submission(post_id, post_url, original_url, content_url),
        )
    }

    #[pyo3(signature = (**filters))]
    fn get_submission(
        &self,
        filters: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<PyBlossomResponse> {
        let filters = kwargs_pairs(filters)?;
        respond(self.lock()?.get_submission(&borrow_pairs(&filters)))
    }

    fn delete_submission(&self, submission_id: &str) -> PyResult<PyBlossomResponse> {
        respond(self.lock()?.delete_submission(submission_id))
    }

    #[pyo3(signature = (transcription_id, text, url, username, submission_id, removed_from_reddit))]
    fn create_transcription(
        &self,
        transcription_id: &str,
        text: &str,
        url: &str,
        username: &str,
        submission_id: &str,
        removed_from_reddit: bool,
    ) -> PyResult<PyBlossomResponse> {
        let transcription = NewTranscription {
            transcription_id,
            text,
            url,
            username,
            submission_id,
            removed_from_reddit,
        };
        respond(self.lock()?.create_transcription(&transcription))
    }

    #[pyo3(signature = (**filters))]
    fn get_transcription(
        &self,
        filters: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<PyBlossomResponse> {
        let filters = kwargs_pairs(filters)?;
        respond(self.lock()?.get_transcription(&borrow_pairs(&filters)))
    }

    fn claim(&self, submission_id: &str, username: &str) -> PyResult<PyBlossomResponse> {
        respond(self.lock()?.claim(submission_id, username))
    }

    fn unclaim(&self, submission_id: &str, username: &str) -> PyResult<PyBlossomResponse> {
        respond(self.lock()?.unclaim(submission_id, username))
    }

    #[pyo3(signature = (submission_id, username, mod_override=false))]
    fn done(
        &self,
        submission_id: &str,
        username: &str,
        mod_override: bool,
    ) -> PyResult<PyBlossomResponse> {
        respond(self.lock()?.done(submission_id, username, mod_override))
    }

    #[pyo3(signature = (source=None))]
    fn get_ocr_transcriptions(&self, source: Option<&str>) -> PyResult<PyBlossomResponse> {
        respond(self.lock()?.get_ocr_transcriptions(source))
    }

    /// Sends a request to any endpoint and returns `(status, body)` unparsed.
    ///
    /// Non-`GET` methods go through the same CSRF priming as the typed methods.
    #[pyo3(signature = (method, path, data=None, params=None))]
    fn call(
        &self,
        method: &str,
        path: &str,
        data: Option<&Bound<'_, PyDict>>,
        params: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<(u16, String)> {
        let method =
            Method::from_bytes(method.to_uppercase().as_bytes()).map_err(to_py_value_error)?;
        let form: FormBody = kwargs_pairs(data)?.into_iter().collect();
        let query = kwargs_pairs(params)?;

        let raw = self
            .lock()?
            .transport()
            .call(method, path, &form, &borrow_pairs(&query))
            .map_err(to_py_runtime_error)?;
        Ok((raw.status.as_u16(), raw.body))
    }
}

impl PyBlossomApi {
    fn lock(&self) -> PyResult<MutexGuard<'_, BlockingBlossomApi>> {
        self.inner
            .lock()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}

#[pymodule]
fn blossom_client(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyBlossomResponse>()?;
    module.add_class::<PyBlossomApi>()?;
    module.add("DEFAULT_BASE_URL", DEFAULT_BASE_URL)?;
    Ok(())
}

fn respond(result: Result<BlossomResponse, ClientError>) -> PyResult<PyBlossomResponse> {
    result.map(PyBlossomResponse::from).map_err(to_py_runtime_error)
}

/// Renders keyword filters as query pairs, stringifying non-`str` values.
fn kwargs_pairs(kwargs: Option<&Bound<'_, PyDict>>) -> PyResult<Vec<(String, String)>> {
    let Some(kwargs) = kwargs else {
        return Ok(Vec::new());
    };

    kwargs
        .iter()
        .map(|(key, value)| Ok((key.extract::<String>()?, value.str()?.to_string())))
        .collect()
}

fn borrow_pairs(pairs: &[(String, String)]) -> Vec<(&str, &str)> {
    pairs
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}

fn to_py_value_error(error: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(error.to_string())
}

fn to_py_runtime_error(error: impl std::fmt::Display) -> PyErr {
    PyRuntimeError::new_err(error.to_string())
}
