//! Standard base64 alphabet with `=` padding, as used by `Authorization: Basic`.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

pub fn base64_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let b0 = u32::from(chunk[0]);
        let b1 = chunk.get(1).copied().map_or(0, u32::from);
        let b2 = chunk.get(2).copied().map_or(0, u32::from);
        let word = (b0 << 16) | (b1 << 8) | b2;

        out.push(sextet(word >> 18));
        out.push(sextet(word >> 12));
        out.push(if chunk.len() > 1 { sextet(word >> 6) } else { '=' });
        out.push(if chunk.len() > 2 { sextet(word) } else { '=' });
    }
    out
}

/// Decodes padded base64, returning `None` on a character outside the alphabet,
/// a length that is not a multiple of four or misplaced padding.
pub fn base64_decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.trim().as_bytes();
    if bytes.len() % 4 != 0 {
        return None;
    }

    let mut out = Vec::with_capacity(bytes.len() / 4 * 3);
    let quads = bytes.len() / 4;

    for (i, quad) in bytes.chunks(4).enumerate() {
        let padding = quad.iter().rev().take_while(|&&b| b == b'=').count();
        if padding > 2 || (padding > 0 && i + 1 != quads) {
            return None;
        }

        let mut word = 0u32;
        for &b in &quad[..4 - padding] {
            word = (word << 6) | u32::from(decode_char(b)?);
        }
        word <<= 6 * padding as u32;

        out.push((word >> 16) as u8);
        if padding < 2 {
            out.push((word >> 8) as u8);
        }
        if padding < 1 {
            out.push(word as u8);
        }
    }
    Some(out)
}

#[inline]
fn sextet(bits: u32) -> char {
    ALPHABET[(bits & 0x3f) as usize] as char
}

fn decode_char(b: u8) -> Option<u8> {
    match b {
        b'A'..=b'Z' => Some(b - b'A'),
        b'a'..=b'z' => Some(b - b'a' + 26),
        b'0'..=b'9' => Some(b - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}
