//! Request handling: normalize, dispatch, respond.

use super::query::{decode_path, parse_query_string};
use super::response::{build_response_with_headers, matched_response, not_mapped_response};
use crate::metrics;
use crate::route::{Dispatcher, MatchResult};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;

/// Answer one request from the route table.
///
/// The body is never read; only method, path and query take part in matching.
pub async fn handle_mock_request<B>(
    req: Request<B>,
    dispatcher: Arc<Dispatcher>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, _) = req.into_parts();
    let method = parts.method.as_str();
    let path = decode_path(parts.uri.path());
    let params = parse_query_string(parts.uri.query());
    let method_label = metrics_method_label(&dispatcher, method);

    let response = match dispatcher.dispatch(method, &path, &params).await {
        MatchResult::Matched {
            headers,
            body,
            rule_index,
            delay,
        } => {
            info!(
                "{} {} -> rule #{} (delay {}ms)",
                method,
                parts.uri,
                rule_index,
                delay.as_millis()
            );
            metrics::record_request(method_label, "matched");
            metrics::record_simulated_delay(delay);
            matched_response(headers, body)
        }
        MatchResult::NotMatched(reason) => {
            info!("{} {} -> not mapped ({})", method, parts.uri, reason);
            metrics::record_request(method_label, reason.as_str());
            not_mapped_response()
        }
    };

    Ok(response)
}

/// Methods no route uses are counted as `other` so clients cannot grow the series set.
fn metrics_method_label<'a>(dispatcher: &Dispatcher, method: &'a str) -> &'a str {
    if dispatcher.table().has_method(method) {
        method
    } else {
        "other"
    }
}

/// Serve `GET /metrics` in Prometheus text format; 404 for anything else.
pub async fn handle_metrics_request<B>(req: Request<B>) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.method() == Method::GET && req.uri().path() == "/metrics" {
        Ok(build_response_with_headers(
            StatusCode::OK,
            [(CONTENT_TYPE.as_str(), "text/plain; version=0.0.4")],
            metrics::collect_metrics(),
        ))
    } else {
        Ok(build_response_with_headers(
            StatusCode::NOT_FOUND,
            std::iter::empty::<(&str, &str)>(),
            "Not Found",
        ))
    }
}
