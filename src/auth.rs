use http::header::{HeaderName, HeaderValue};
use http::Method;

use crate::config::{CSRF_HEADER, REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE};
use crate::core::errors::ViewError;
use crate::transport::ApiRequest;

/// Stamps outgoing requests with the script-origin marker and, for
/// mutating requests, the anti-forgery token from the page.
#[derive(Clone, Debug)]
pub struct RequestAuth {
    csrf_token: String,
}

impl RequestAuth {
    pub fn new(csrf_token: impl Into<String>) -> Self {
        Self {
            csrf_token: csrf_token.into(),
        }
    }

    pub fn stamp(&self, mut request: ApiRequest) -> Result<ApiRequest, ViewError> {
        request.headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static(REQUESTED_WITH_VALUE),
        );

        if request.method != Method::GET {
            if self.csrf_token.is_empty() {
                return Err(ViewError::MissingContext("csrf token".to_string()));
            }
            request.headers.insert(
                HeaderName::from_static("x-csrftoken"),
                HeaderValue::from_str(&self.csrf_token)?,
            );
        }

        Ok(request)
    }
}

pub fn csrf_header(request: &ApiRequest) -> Option<&str> {
    request.headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok())
}

pub fn is_script_request(request: &ApiRequest) -> bool {
    request
        .headers
        .get(REQUESTED_WITH_HEADER)
        .map(|v| v == REQUESTED_WITH_VALUE)
        .unwrap_or(false)
}
