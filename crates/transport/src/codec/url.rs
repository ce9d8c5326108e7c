//! URL percent-encoding and `application/x-www-form-urlencoded` field handling.

use crate::ensure;
use crate::protocol::{FieldError, ParamMap};

/// Maximum size of a decoded query or form field name.
pub const QUERY_NAME_MAX: usize = 1024;

/// Maximum size of a decoded query or form field value.
pub const QUERY_VALUE_MAX: usize = 1024 * 1024;

/// Decodes `%XY` escapes and `+` as space.
///
/// An escape that is not followed by two hex digits is kept literally.
pub fn url_decode(str: &str) -> String {
    let bytes = str.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                result.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => match (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    result.push((hi << 4) | lo);
                    i += 3;
                }
                _ => {
                    result.push(b'%');
                    i += 1;
                }
            },
            b => {
                result.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&result).into_owned()
}

/// Escapes reserved characters and every byte outside printable ASCII as `%XY`.
pub fn url_encode(str: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut result = String::with_capacity(str.len());
    for &b in str.as_bytes() {
        let reserved = matches!(
            b,
            b' ' | b'<' | b'>' | b'#' | b'%' | b'{' | b'}' | b'|' | b'\\' | b'^' | b'~' | b'[' | b']' | b'`' | b';' | b'/'
                | b'?' | b'@' | b'=' | b'&' | b'$' | b'+'
        );
        if reserved || !(33..127).contains(&b) {
            result.push('%');
            result.push(HEX[usize::from(b >> 4)] as char);
            result.push(HEX[usize::from(b & 0x0f)] as char);
        } else {
            result.push(b as char);
        }
    }
    result
}

/// Splits `name=value&name=value` pairs into `params`, decoding both sides.
///
/// Pairs with an empty name are dropped; a name without `=` gets an empty value.
/// Control characters (tabs included) are skipped.
pub fn parse_url_encoded(params: &mut ParamMap, str: &str) -> Result<(), FieldError> {
    for pair in str.split('&') {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = strip_control(name);
        let value = strip_control(value);

        ensure!(name.len() <= QUERY_NAME_MAX, FieldError::too_large("query name", QUERY_NAME_MAX));
        ensure!(value.len() <= QUERY_VALUE_MAX, FieldError::too_large("query value", QUERY_VALUE_MAX));

        if !name.is_empty() {
            params.insert(url_decode(&name), url_decode(&value));
        }
    }
    Ok(())
}

/// Builds a query string from `params`, escaping names and values.
pub fn make_query_string(params: &ParamMap) -> String {
    params.iter().map(|(name, value)| format!("{}={}", url_encode(name), url_encode(value))).collect::<Vec<_>>().join("&")
}

fn strip_control(str: &str) -> String {
    str.chars().filter(|c| !c.is_ascii_control()).collect()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_escapes() {
        assert_eq!(url_decode("sixty+two"), "sixty two");
        assert_eq!(url_decode("%20four%20with%20spaces"), " four with spaces");
        assert_eq!(url_decode("caf%C3%A9"), "café");
    }

    #[test]
    fn unterminated_escape_is_literal() {
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("a%2"), "a%2");
        assert_eq!(url_decode("%zz!"), "%zz!");
    }

    #[test]
    fn encode_reserved() {
        assert_eq!(url_encode("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(url_encode("plain-text_1.0"), "plain-text_1.0");
        assert_eq!(url_encode("é"), "%C3%A9");
        assert_eq!(url_decode(&url_encode("1+1 = 2?")), "1+1 = 2?");
    }

    #[test]
    fn simple_query() {
        let mut params = ParamMap::new();
        parse_url_encoded(&mut params, "a=b").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("a"), Some("b"));
    }

    #[test]
    fn multiple_values() {
        let mut params = ParamMap::new();
        parse_url_encoded(&mut params, "test=2&three=%20four%20with%20spaces&five=sixty+two").unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("test"), Some("2"));
        assert_eq!(params.get("three"), Some(" four with spaces"));
        assert_eq!(params.get("five"), Some("sixty two"));
    }

    #[test]
    fn double_ampersand_and_empty_names() {
        let mut params = ParamMap::new();
        parse_url_encoded(&mut params, "a=b&&c=d&e").unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("e"), Some(""));

        let mut params = ParamMap::new();
        parse_url_encoded(&mut params, "a=b&=bob&=&c=d&e").unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("a"), Some("b"));
        assert_eq!(params.get("c"), Some("d"));
    }

    #[test]
    fn empty_values() {
        let mut params = ParamMap::new();
        parse_url_encoded(&mut params, "a=&b&c=").unwrap();
        assert_eq!(params.len(), 3);
        assert!(params.iter().all(|(_, value)| value.is_empty()));
    }

    #[test]
    fn tabs_are_skipped() {
        let mut params = ParamMap::new();
        parse_url_encoded(&mut params, "promoCode=BOB\t").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("promoCode"), Some("BOB"));
    }

    #[test]
    fn name_too_large() {
        let mut params = ParamMap::new();
        let query = format!("{}=1", "n".repeat(QUERY_NAME_MAX + 1));
        assert_eq!(parse_url_encoded(&mut params, &query), Err(FieldError::too_large("query name", QUERY_NAME_MAX)));
    }

    #[test]
    fn query_string_from_params() {
        let params: ParamMap = [("q", "rust lang"), ("page", "2")].into_iter().collect();
        assert_eq!(make_query_string(&params), "q=rust%20lang&page=2");
    }
}
