//! `Cookie` and `Set-Cookie` header tokenizing.

use crate::ensure;
use crate::protocol::{FieldError, ParamMap};

/// Maximum size of a cookie name.
pub const COOKIE_NAME_MAX: usize = 1024;

/// Maximum size of a cookie value.
pub const COOKIE_VALUE_MAX: usize = 1024 * 1024;

/// Attributes of a `Set-Cookie` header that are not cookies themselves.
const SET_COOKIE_ATTRIBUTES: [&str; 7] = ["Comment", "Domain", "Max-Age", "Path", "Secure", "Version", "Expires"];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CookieState {
    Name,
    Value,
    /// after a quoted value, up to the next separator
    Ignore,
}

/// Splits a cookie header into `cookies`.
///
/// Both `;` and `,` separate cookies, so an unquoted value never contains a comma.
/// Names starting with `$` are attributes and skipped; with `set_cookie_header` the
/// `Set-Cookie` attributes (`Path`, `Max-Age`, ...) are skipped too. Unquoted values
/// lose their leading spaces, quoted values are kept verbatim.
pub fn parse_cookie_header(cookies: &mut ParamMap, header: &str, set_cookie_header: bool) -> Result<(), FieldError> {
    let mut state = CookieState::Name;
    let mut name = String::new();
    let mut value = String::new();
    let mut quote = None;

    for c in header.chars() {
        match state {
            CookieState::Name => match c {
                '=' => {
                    quote = None;
                    state = CookieState::Value;
                }
                ';' | ',' => {
                    if !name.is_empty() {
                        add_cookie(cookies, &mut name, &mut value, set_cookie_header);
                    }
                }
                ' ' => {}
                c => {
                    ensure!(!c.is_control(), FieldError::control_char("cookie name"));
                    ensure!(name.len() < COOKIE_NAME_MAX, FieldError::too_large("cookie name", COOKIE_NAME_MAX));
                    name.push(c);
                }
            },
            CookieState::Value => match quote {
                None => match c {
                    ';' | ',' => {
                        add_cookie(cookies, &mut name, &mut value, set_cookie_header);
                        state = CookieState::Name;
                    }
                    '\'' | '"' if value.is_empty() => quote = Some(c),
                    ' ' if value.is_empty() => {}
                    c => {
                        ensure!(!c.is_control(), FieldError::control_char("cookie value"));
                        ensure!(value.len() < COOKIE_VALUE_MAX, FieldError::too_large("cookie value", COOKIE_VALUE_MAX));
                        value.push(c);
                    }
                },
                Some(q) if c == q => {
                    add_cookie(cookies, &mut name, &mut value, set_cookie_header);
                    state = CookieState::Ignore;
                }
                Some(_) => {
                    ensure!(value.len() < COOKIE_VALUE_MAX, FieldError::too_large("cookie value", COOKIE_VALUE_MAX));
                    value.push(c);
                }
            },
            CookieState::Ignore => {
                if c == ';' || c == ',' {
                    state = CookieState::Name;
                }
            }
        }
    }

    add_cookie(cookies, &mut name, &mut value, set_cookie_header);
    Ok(())
}

fn add_cookie(cookies: &mut ParamMap, name: &mut String, value: &mut String, set_cookie_header: bool) {
    if !is_cookie_attribute(name, set_cookie_header) {
        cookies.insert(std::mem::take(name), std::mem::take(value));
    }
    name.clear();
    value.clear();
}

fn is_cookie_attribute(name: &str, set_cookie_header: bool) -> bool {
    name.is_empty()
        || name.starts_with('$')
        || (set_cookie_header && SET_COOKIE_ATTRIBUTES.iter().any(|attribute| attribute.eq_ignore_ascii_case(name)))
}

/// Renders a `Set-Cookie` header value: `name="value"; Version="1"; Path="..."; Max-Age="..."`.
pub fn make_set_cookie_header(name: &str, value: &str, path: &str, max_age: Option<u64>) -> String {
    let mut header = format!("{name}=\"{value}\"; Version=\"1\"");
    if !path.is_empty() {
        header.push_str(&format!("; Path=\"{path}\""));
    }
    if let Some(max_age) = max_age {
        header.push_str(&format!("; Max-Age=\"{max_age}\""));
    }
    header
}
