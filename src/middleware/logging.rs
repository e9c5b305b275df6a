use std::{collections::BTreeMap, net::SocketAddr, time::Instant};

use axum::{
    extract::{ConnectInfo, OriginalUri, Query, RawPathParams, Request, State},
    http::{header::USER_AGENT, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::{
    logger::record::{duration_millis, non_empty, LogRecord},
    AppState,
};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Request logging middleware.
///
/// Starts a timer, lets the request through untouched and, once the
/// downstream response exists, hands one [`LogRecord`] to the configured
/// sink before returning that same response. If the request future is
/// dropped first, nothing is logged.
pub async fn api_logger(
    State(state): State<AppState>,
    path_params: Option<RawPathParams>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let pending = PendingRecord::capture(&request, path_params, state.config.logging.trust_proxy);

    let response = next.run(request).await;

    let record = pending.finish(response.status().as_u16(), start);
    state.sink.emit(&record);

    response
}

/// Request-side fields, captured before the request moves downstream.
struct PendingRecord {
    method: String,
    path: String,
    full_url: String,
    client_addr: Option<String>,
    user_agent: Option<String>,
    query: Option<BTreeMap<String, String>>,
    params: Option<BTreeMap<String, String>>,
}

impl PendingRecord {
    fn capture(request: &Request, path_params: Option<RawPathParams>, trust_proxy: bool) -> Self {
        let uri = request
            .extensions()
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| uri.clone())
            .unwrap_or_else(|| request.uri().clone());

        let connect_info = request.extensions().get::<ConnectInfo<SocketAddr>>();

        Self {
            method: request.method().to_string(),
            path: uri.path().to_string(),
            full_url: full_url(&uri),
            client_addr: client_address(request.headers(), connect_info, trust_proxy),
            user_agent: user_agent(request.headers()),
            query: query_params(&uri),
            params: path_params.and_then(|params| {
                non_empty(
                    params
                        .iter()
                        .map(|(key, value)| (key.to_string(), value.to_string()))
                        .collect(),
                )
            }),
        }
    }

    fn finish(self, status: u16, start: Instant) -> LogRecord {
        LogRecord {
            timestamp: Utc::now(),
            method: self.method,
            path: self.path,
            full_url: self.full_url,
            status,
            duration_ms: duration_millis(start.elapsed()),
            client_addr: self.client_addr,
            user_agent: self.user_agent,
            query: self.query,
            params: self.params,
        }
    }
}

fn full_url(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

fn query_params(uri: &Uri) -> Option<BTreeMap<String, String>> {
    Query::<BTreeMap<String, String>>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| non_empty(query))
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// With `trust_proxy` the first `X-Forwarded-For` hop wins; otherwise the
/// peer address of the connection, when the server recorded one.
fn client_address(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy: bool,
) -> Option<String> {
    let forwarded = if trust_proxy {
        forwarded_for(headers)
    } else {
        None
    };

    forwarded.or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()))
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .find(|hop| !hop.is_empty())
        .map(str::to_string)
}
