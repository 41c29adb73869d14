// ────────────────────────────────
// src/proxy/forward.rs
// Single-host reverse proxying: URI rewrite, header hygiene, streaming relay.
// ────────────────────────────────
use super::ProxyError;
use hyper::client::HttpConnector;
use hyper::header::{HeaderMap, HeaderValue, CONNECTION, HOST, TE};
use hyper::{Body, Client, Request, Response, Uri, Version};
use hyper_tls::HttpsConnector;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use url::{Position, Url};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Peer address of the inbound connection, stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub SocketAddr);

/// Shared outbound HTTP(S) client. Cloning is cheap and shares the
/// connection pool.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpsConnector<HttpConnector>, Body>,
}

impl Forwarder {
    pub fn new() -> Self {
        let client = Client::builder().build(HttpsConnector::new());
        Self { client }
    }

    pub async fn forward(
        &self,
        target: &Url,
        mut req: Request<Body>,
    ) -> Result<Response<Body>, ProxyError> {
        let uri = target_uri(target, req.uri())?;
        let client_ip = req.extensions().get::<ClientAddr>().map(|addr| addr.0.ip());

        *req.uri_mut() = uri;
        // The outbound client speaks HTTP/1.1 regardless of how the caller connected.
        *req.version_mut() = Version::HTTP_11;
        prepare_request_headers(req.headers_mut(), client_ip);

        let mut res = self.client.request(req).await?;
        strip_hop_by_hop(res.headers_mut());
        Ok(res)
    }
}

impl Default for Forwarder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forwarder").finish_non_exhaustive()
    }
}

/// Point `incoming` at `target`: scheme and authority come from the target,
/// paths are joined with exactly one slash and both query strings are kept.
/// The incoming path and query are copied byte for byte, never normalized.
fn target_uri(target: &Url, incoming: &Uri) -> Result<Uri, ProxyError> {
    let path = join_paths(target.path(), incoming.path());

    let path_and_query = match (target.query().unwrap_or(""), incoming.query().unwrap_or("")) {
        ("", "") => path,
        (t, "") => format!("{path}?{t}"),
        ("", r) => format!("{path}?{r}"),
        (t, r) => format!("{path}?{t}&{r}"),
    };

    let uri = Uri::builder()
        .scheme(target.scheme())
        .authority(&target[Position::BeforeHost..Position::AfterPort])
        .path_and_query(path_and_query)
        .build()?;
    Ok(uri)
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<String> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    for name in &listed {
        headers.remove(name.as_str());
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Header rewrite for the outbound request. `TE: trailers` survives the
/// hop-by-hop strip.
fn prepare_request_headers(headers: &mut HeaderMap, client_ip: Option<IpAddr>) {
    let wants_trailers = headers
        .get_all(TE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("trailers"));

    strip_hop_by_hop(headers);
    headers.remove(HOST);

    if wants_trailers {
        headers.insert(TE, HeaderValue::from_static("trailers"));
    }
    if let Some(ip) = client_ip {
        append_forwarded_for(headers, ip);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, ip: IpAddr) {
    let prior: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        ip.to_string()
    } else {
        format!("{}, {}", prior.join(", "), ip)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
