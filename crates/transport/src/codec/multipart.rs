//! `multipart/form-data` field extraction.
//!
//! Only plain text fields are extracted: parts without a content type, or with a
//! `text/*` one. File uploads and other binary parts are skipped.

use httparse::Status;
use mime::Mime;
use tracing::trace;

use crate::protocol::{FieldError, ParamMap};

/// Maximum number of header fields in a single part.
const MAX_PART_HEADERS: usize = 16;

/// Adds the text fields of a multipart body to `params`.
///
/// `content_type` is the value of the message's `Content-Type` header and must carry a
/// `boundary` parameter.
pub fn parse_multipart_form_data(params: &mut ParamMap, content_type: &str, body: &[u8]) -> Result<(), FieldError> {
    let mime: Mime = content_type.parse().map_err(FieldError::invalid_content_type)?;
    let boundary = mime.get_param(mime::BOUNDARY).ok_or(FieldError::MissingBoundary)?;
    let delimiter = format!("--{}", boundary.as_str());
    let part_end = format!("\r\n{delimiter}");

    let Some(start) = find(body, delimiter.as_bytes()) else {
        return Err(FieldError::MissingBoundary);
    };
    let mut rest = &body[start + delimiter.len()..];

    loop {
        // closing delimiter
        if rest.starts_with(b"--") {
            return Ok(());
        }
        rest = rest.strip_prefix(b"\r\n").or_else(|| rest.strip_prefix(b"\n")).unwrap_or(rest);

        let mut headers = [httparse::EMPTY_HEADER; MAX_PART_HEADERS];
        let (header_len, field_name, is_text) = match httparse::parse_headers(rest, &mut headers) {
            Ok(Status::Complete((header_len, parsed))) => {
                let (field_name, is_text) = describe_part(parsed);
                (header_len, field_name, is_text)
            }
            Ok(Status::Partial) => return Err(FieldError::malformed_part("unterminated part headers")),
            Err(e) => return Err(FieldError::malformed_part(e)),
        };
        rest = &rest[header_len..];

        let Some(end) = find(rest, part_end.as_bytes()) else {
            return Err(FieldError::malformed_part("missing closing boundary"));
        };

        match field_name {
            Some(name) if is_text => {
                params.insert(name, String::from_utf8_lossy(&rest[..end]));
            }
            name => trace!(field = ?name, "skip multipart part"),
        }
        rest = &rest[end + part_end.len()..];
    }
}

/// Field name from `Content-Disposition`, and whether the part holds text.
fn describe_part(headers: &[httparse::Header<'_>]) -> (Option<String>, bool) {
    let mut field_name = None;
    let mut is_text = true;

    for header in headers {
        let value = String::from_utf8_lossy(header.value);
        if header.name.eq_ignore_ascii_case("content-disposition") {
            field_name = disposition_name(&value);
        } else if header.name.eq_ignore_ascii_case("content-type") {
            is_text = value.parse::<Mime>().is_ok_and(|m| m.type_() == mime::TEXT);
        }
    }
    (field_name, is_text)
}

/// The `name` parameter of a `form-data; name="..."` disposition.
fn disposition_name(value: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (key, val) = param.trim().split_once('=')?;
        key.trim().eq_ignore_ascii_case("name").then(|| val.trim().trim_matches('"').to_string())
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
