//! Pixelflut wire format
//!
//! ```text
//! client → server   PX <x> <y> <rrggbbaa>\n
//! client → server   SIZE\n
//! server → client   SIZE <w> <h>\n
//! client → server   \n                       (keep-alive)
//! ```

use crate::canvas::{Dimensions, Rgba};

/// Size query command
pub const SIZE_QUERY: &[u8] = b"SIZE\n";

/// Keep-alive payload
pub const KEEP_ALIVE: &[u8] = b"\n";

/// Longest command [`encode_pixel`] can produce: `PX ` + two `u32` + two
/// spaces + 8 hex digits + newline
pub const MAX_COMMAND_LEN: usize = 3 + 10 + 1 + 10 + 1 + 8 + 1;

/// Largest canvas, in pixels, the client agrees to mirror (8192 x 8192)
pub const MAX_CANVAS_AREA: u64 = 1 << 26;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Append `n` in decimal
fn push_decimal(out: &mut Vec<u8>, mut n: u32) {
    let mut digits = [0u8; 10];
    let mut len = 0;
    loop {
        digits[len] = b'0' + (n % 10) as u8;
        len += 1;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    out.extend(digits[..len].iter().rev());
}

fn push_hex(out: &mut Vec<u8>, byte: u8) {
    out.push(HEX[usize::from(byte >> 4)]);
    out.push(HEX[usize::from(byte & 0xf)]);
}

/// Append one `PX` command; returns the number of bytes written
pub fn encode_pixel(out: &mut Vec<u8>, x: u32, y: u32, color: Rgba) -> usize {
    let start = out.len();
    out.extend_from_slice(b"PX ");
    push_decimal(out, x);
    out.push(b' ');
    push_decimal(out, y);
    out.push(b' ');
    for channel in [color.r, color.g, color.b, color.a] {
        push_hex(out, channel);
    }
    out.push(b'\n');
    out.len() - start
}

/// Parse a `SIZE <w> <h>` response
///
/// Only the first line is considered; anything but exactly two positive
/// integers after the `SIZE` keyword is rejected, as is a canvas larger
/// than [`MAX_CANVAS_AREA`].
pub fn parse_size(response: &[u8]) -> Option<Dimensions> {
    let text = std::str::from_utf8(response).ok()?;
    let line = text.lines().next()?;
    let mut fields = line.strip_prefix("SIZE ")?.split_whitespace();
    let width: u32 = fields.next()?.parse().ok()?;
    let height: u32 = fields.next()?.parse().ok()?;
    if fields.next().is_some() || width == 0 || height == 0 {
        return None;
    }
    if u64::from(width) * u64::from(height) > MAX_CANVAS_AREA {
        return None;
    }
    Some(Dimensions::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn encoded(x: u32, y: u32, color: Rgba) -> String {
        let mut out = Vec::new();
        encode_pixel(&mut out, x, y, color);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_encode_red_pixel() {
        assert_eq!(encoded(10, 10, Rgba::RED), "PX 10 10 ff0000ff\n");
    }

    #[rstest]
    #[case(0, "PX 0 0 00000000\n")]
    #[case(7, "PX 7 7 00000000\n")]
    #[case(100, "PX 100 100 00000000\n")]
    #[case(1280, "PX 1280 1280 00000000\n")]
    fn test_decimal_digit_order(#[case] n: u32, #[case] expected: &str) {
        assert_eq!(encoded(n, n, Rgba::TRANSPARENT), expected);
    }

    #[test]
    fn test_longest_command_fits() {
        let mut out = Vec::new();
        let len = encode_pixel(&mut out, u32::MAX, u32::MAX, Rgba::WHITE);
        assert_eq!(len, MAX_COMMAND_LEN);
        assert_eq!(out, b"PX 4294967295 4294967295 ffffffff\n");
    }

    #[rstest]
    #[case(b"SIZE 100 50\n", Some((100, 50)))]
    #[case(b"SIZE 1920 1080\r\n", Some((1920, 1080)))]
    #[case(b"SIZE 800 600", Some((800, 600)))]
    #[case(b"SIZE 800 600\nPX 1 1 000000\n", Some((800, 600)))]
    #[case(b"SIZE 100\n", None)]
    #[case(b"SIZE 100 50 3\n", None)]
    #[case(b"SIZE -1 50\n", None)]
    #[case(b"SIZE 0 50\n", None)]
    #[case(b"SIZE 8192 8192\n", Some((8192, 8192)))]
    #[case(b"SIZE 8193 8192\n", None)]
    #[case(b"SIZE 4294967295 4294967295\n", None)]
    #[case(b"SIZE 4294967295 1\n", None)]
    #[case(b"size 100 50\n", None)]
    #[case(b"ERROR\n", None)]
    #[case(b"", None)]
    #[case(b"\xff\xfe", None)]
    fn test_parse_size(#[case] input: &[u8], #[case] expected: Option<(u32, u32)>) {
        let expected = expected.map(|(w, h)| Dimensions::new(w, h));
        assert_eq!(parse_size(input), expected);
    }

    proptest! {
        #[test]
        fn prop_pixel_command_shape(x: u32, y: u32, r: u8, g: u8, b: u8, a: u8) {
            let line = encoded(x, y, Rgba::new(r, g, b, a));
            prop_assert_eq!(&line, &format!("PX {x} {y} {r:02x}{g:02x}{b:02x}{a:02x}\n"));
            prop_assert!(line.len() <= MAX_COMMAND_LEN);
        }
    }
}
