//! Status line of an HTTP response.

use http::StatusCode;

/// `HTTP/x.y SP status-code SP reason-phrase`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    status_code: u16,
    status_message: String,
    /// set when this response answers a HEAD request and therefore has no body
    head_request: bool,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

impl StatusLine {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status_code: status.as_u16(),
            status_message: status.canonical_reason().unwrap_or_default().to_string(),
            head_request: false,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Sets the code and, when the code is known, its canonical reason phrase.
    pub fn set_status_code(&mut self, status_code: u16) {
        self.status_code = status_code;
        if let Some(reason) = StatusCode::from_u16(status_code).ok().and_then(|s| s.canonical_reason()) {
            reason.clone_into(&mut self.status_message);
        }
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn set_status_message<M: Into<String>>(&mut self, status_message: M) {
        self.status_message = status_message.into();
    }

    pub fn is_head_request(&self) -> bool {
        self.head_request
    }

    pub fn set_head_request(&mut self, head_request: bool) {
        self.head_request = head_request;
    }

    /// 1xx, 204, 205 and 304 responses never have a body.
    pub fn is_bodyless_status(&self) -> bool {
        (100..200).contains(&self.status_code) || matches!(self.status_code, 204 | 205 | 304)
    }
}
