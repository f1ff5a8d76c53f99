//! Fetch-style HTTP client bound to a base path.

use super::{
    error::HttpError,
    method::Method,
    request::{Body, PreparedRequest, Request, set_header},
    response::Response,
    transport::Transport,
};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Whether `url` starts with `http://` or `https://`, ignoring case.
pub fn is_absolute(url: &str) -> bool {
    let starts_with = |scheme: &str| {
        url.get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    };
    starts_with("http://") || starts_with("https://")
}

/// Prefix a relative `url` with `base`, adding a `/` only when neither side has one.
pub fn join_base(base: &str, url: &str) -> String {
    if is_absolute(url) || base.is_empty() {
        return url.to_string();
    }
    let separator = if !base.ends_with('/') && !url.starts_with('/') {
        "/"
    } else {
        ""
    };
    format!("{base}{separator}{url}")
}

/// Client for the fetch-based HTTP convenience layer.
///
/// Cheap to clone; clones share the transport and the loaded-script index.
#[derive(Clone)]
pub struct HttpClient {
    base_path: String,
    transport: Arc<dyn Transport>,
    loaded_scripts: Arc<Mutex<HashSet<String>>>,
}

impl HttpClient {
    /// Create a client resolving relative URLs against `base_path`.
    pub fn new(transport: Arc<dyn Transport>, base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            transport,
            loaded_scripts: Arc::default(),
        }
    }

    /// The base path relative URLs are resolved against.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Replace the base path.
    pub fn set_base_path(&mut self, base_path: impl Into<String>) {
        self.base_path = base_path.into();
    }

    /// Resolve `url` against the base path and append `params` as a query string.
    pub fn build_url(&self, url: &str, params: &[(String, String)]) -> String {
        let resolved = join_base(&self.base_path, url);
        if params.is_empty() {
            return resolved;
        }
        let query = params
            .iter()
            .map(|(key, value)| {
                let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
                format!("{key}={encoded}")
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{resolved}?{query}")
    }

    /// Turn a request into what the transport receives.
    pub fn prepare(&self, request: Request) -> Result<PreparedRequest, HttpError> {
        let url = self.build_url(&request.url, &request.params);
        let mut headers = request.headers;
        let body = match request.body {
            None => None,
            Some(Body::Text(text)) => Some(text),
            Some(Body::Json(value)) => {
                let encoded =
                    serde_json::to_string(&value).map_err(|err| HttpError::Encode(err.to_string()))?;
                set_header(
                    &mut headers,
                    "Content-Type".to_string(),
                    "application/json".to_string(),
                );
                Some(encoded)
            }
        };
        Ok(PreparedRequest {
            method: request.method,
            url,
            headers,
            body,
        })
    }

    /// Send a request.
    ///
    /// A non-2xx response is logged and still returned. A transport failure
    /// is logged and returned as [`HttpError::Transport`].
    pub async fn request(&self, request: Request) -> Result<Response, HttpError> {
        let prepared = self.prepare(request)?;
        tracing::trace!(
            target: "xorb::http",
            method = %prepared.method,
            url = %prepared.url,
            with_body = prepared.body.is_some(),
            "sending request"
        );
        match self.transport.send(prepared).await {
            Ok(response) => {
                if !response.ok() {
                    tracing::error!(
                        target: "xorb::http",
                        status = response.status,
                        "The server responded with a status {}: {}",
                        response.status,
                        response.status_text
                    );
                }
                Ok(response)
            }
            Err(err) => {
                tracing::error!(target: "xorb::http", error = %err, "request failed");
                Err(HttpError::Transport(err))
            }
        }
    }

    /// Send a request with a verb given by name, rejecting unknown verbs.
    pub async fn verb(
        &self,
        method: &str,
        request: impl Into<Request>,
    ) -> Result<Response, HttpError> {
        let method = method.parse::<Method>().inspect_err(|err| {
            tracing::error!(target: "xorb::http", "{err}");
        })?;
        let request: Request = request.into();
        self.request(request.method(method)).await
    }

    /// `GET` a resource.
    pub async fn get(&self, request: impl Into<Request>) -> Result<Response, HttpError> {
        let request: Request = request.into();
        self.request(request.method(Method::Get)).await
    }

    /// `HEAD` a resource.
    pub async fn head(&self, request: impl Into<Request>) -> Result<Response, HttpError> {
        let request: Request = request.into();
        self.request(request.method(Method::Head)).await
    }

    /// `DELETE` a resource.
    pub async fn delete(&self, request: impl Into<Request>) -> Result<Response, HttpError> {
        let request: Request = request.into();
        self.request(request.method(Method::Delete)).await
    }

    /// `POST` a body.
    pub async fn post(&self, request: impl Into<Request>, body: Body) -> Result<Response, HttpError> {
        let request: Request = request.into();
        self.request(request.method(Method::Post).body(body)).await
    }

    /// `PUT` a body.
    pub async fn put(&self, request: impl Into<Request>, body: Body) -> Result<Response, HttpError> {
        let request: Request = request.into();
        self.request(request.method(Method::Put).body(body)).await
    }

    /// `PATCH` a body.
    pub async fn patch(&self, request: impl Into<Request>, body: Body) -> Result<Response, HttpError> {
        let request: Request = request.into();
        self.request(request.method(Method::Patch).body(body)).await
    }

    /// `GET` a JSON resource and parse it.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        self.get(url).await?.json()
    }

    /// `GET` a binary resource.
    pub async fn get_blob(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        Ok(self.get(url).await?.body)
    }

    /// Load an external script, resolved against the base path.
    ///
    /// A script that was loaded before is fetched again with a
    /// cache-busting `d=<unix millis>` query parameter. Returns the URL that
    /// was actually loaded.
    pub async fn get_script(&self, path: &str) -> Result<String, HttpError> {
        let resolved = join_base(&self.base_path, path);
        let key = resolved
            .split('?')
            .next()
            .unwrap_or(resolved.as_str())
            .to_string();

        let reload = self
            .loaded_scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key);
        let url = if reload {
            let separator = if resolved.contains('?') { '&' } else { '?' };
            format!("{resolved}{separator}d={}", unix_millis())
        } else {
            resolved
        };

        match self.transport.load_script(&url).await {
            Ok(()) => {
                self.loaded_scripts
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key);
                tracing::debug!(target: "xorb::http", %url, reload, "script loaded");
                Ok(url)
            }
            Err(source) => {
                tracing::error!(target: "xorb::http", %url, "Script could not be fetched: {url}");
                Err(HttpError::ScriptLoad { url, source })
            }
        }
    }

    /// Whether a script with this (resolved, query-less) URL was loaded.
    pub fn is_script_loaded(&self, url: &str) -> bool {
        self.loaded_scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
