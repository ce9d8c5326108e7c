//! IMF-fixdate values for the `Date`, `Expires` and `Last-Modified` headers.

use std::time::SystemTime;

use http::HeaderValue;
use http::header::DATE;
use httpdate::{fmt_http_date, parse_http_date};

use crate::protocol::HttpMessage;

/// Formats `time` as `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(time: SystemTime) -> String {
    fmt_http_date(time)
}

/// Parses any of the three date formats allowed by HTTP/1.1.
pub fn parse_date(value: &str) -> Option<SystemTime> {
    parse_http_date(value).ok()
}

/// Sets the `Date` header of `message` to the current time.
pub fn set_date_header(message: &mut HttpMessage) {
    set_date_header_at(message, SystemTime::now());
}

pub fn set_date_header_at(message: &mut HttpMessage, time: SystemTime) {
    // an IMF-fixdate is always a valid header value
    if let Ok(value) = HeaderValue::from_str(&fmt_http_date(time)) {
        message.set_header(DATE, value);
    }
}
