//! Request description and its prepared, transport-ready form.

use super::method::Method;
use xorb_core::Data;

/// A request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Sent verbatim.
    Text(String),
    /// Serialized to JSON; sets `Content-Type: application/json`.
    Json(Data),
}

/// A request as the caller describes it.
///
/// URLs may be relative to the client's base path. Query parameters are
/// appended when the request is prepared.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub(crate) url: String,
    pub(crate) method: Method,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) body: Option<Body>,
}

impl Request {
    /// A `GET` request for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
        }
    }

    /// Set the method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header. A later header of the same name replaces the earlier one.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Append a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    /// Attach a body.
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a JSON body.
    pub fn json(self, value: Data) -> Self {
        self.body(Body::Json(value))
    }

    /// Attach a text body.
    pub fn text(self, value: impl Into<String>) -> Self {
        self.body(Body::Text(value.into()))
    }

    /// The URL as given.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The method.
    pub fn verb(&self) -> Method {
        self.method
    }

    /// Whether the request carries a body.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

impl From<&str> for Request {
    fn from(url: &str) -> Self {
        Request::new(url)
    }
}

impl From<String> for Request {
    fn from(url: String) -> Self {
        Request::new(url)
    }
}

pub(crate) fn set_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
    {
        Some(header) => header.1 = value,
        None => headers.push((name, value)),
    }
}

/// What a [`Transport`](super::Transport) receives: absolute URL, final
/// headers and an encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// The method.
    pub method: Method,
    /// The full URL including the query string.
    pub url: String,
    /// Final headers.
    pub headers: Vec<(String, String)>,
    /// Encoded body.
    pub body: Option<String>,
}

impl PreparedRequest {
    /// Value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
