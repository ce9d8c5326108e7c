//! Request line of an HTTP request.

use http::Method;

/// `METHOD SP resource[?query] SP HTTP/x.y`
///
/// The resource and query string are kept apart; the query string never includes the
/// leading `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    resource: String,
    query_string: String,
}

impl Default for RequestLine {
    fn default() -> Self {
        Self { method: Method::GET, resource: String::from("/"), query_string: String::new() }
    }
}

impl RequestLine {
    pub fn new<R: Into<String>>(method: Method, resource: R) -> Self {
        Self { method, resource: resource.into(), query_string: String::new() }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn set_resource<R: Into<String>>(&mut self, resource: R) {
        self.resource = resource.into();
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn set_query_string<Q: Into<String>>(&mut self, query_string: Q) {
        self.query_string = query_string.into();
    }

    /// Resource and query string joined back into a request target.
    pub fn target(&self) -> String {
        if self.query_string.is_empty() {
            self.resource.clone()
        } else {
            format!("{}?{}", self.resource, self.query_string)
        }
    }

    /// Methods whose requests never carry a body the parser should wait for.
    pub fn is_bodyless_method(&self) -> bool {
        matches!(self.method, Method::GET | Method::HEAD | Method::OPTIONS | Method::CONNECT | Method::TRACE)
    }
}
