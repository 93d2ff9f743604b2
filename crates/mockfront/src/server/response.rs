//! HTTP response construction for the mock listener.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use std::collections::HashMap;

/// Content type of every canned and error body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Body returned for requests no rule answers.
pub const NOT_MAPPED_BODY: &str = r#"{"Error":"uri not mapped"}"#;

/// Build a response with the given status, headers and body.
///
/// Falls back to a bare 500 if the builder rejects its input.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder.body(Full::new(body.into())).unwrap_or_else(|_| {
        let mut response = Response::new(Full::new(Bytes::from("Internal Server Error")));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

/// 200 with the JSON content type, then the rule's headers.
///
/// A rule header replaces a default header of the same name.
pub fn matched_response(headers: &HashMap<String, String>, body: Bytes) -> Response<Full<Bytes>> {
    let mut response =
        build_response_with_headers(StatusCode::OK, [(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE)], body);
    for (name, value) in headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

/// 400 with the structured "uri not mapped" error.
pub fn not_mapped_response() -> Response<Full<Bytes>> {
    build_response_with_headers(
        StatusCode::BAD_REQUEST,
        [(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE)],
        NOT_MAPPED_BODY,
    )
}
