use std::str::FromStr;

use thiserror::Error;

use crate::style::color::Color;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color `{raw}`")]
pub struct InvalidHexColor {
    pub raw: String,
}

pub fn parse_hex_color(raw: &str) -> Result<Color, InvalidHexColor> {
    let bytes = raw.as_bytes();
    if !validate(bytes) {
        return Err(InvalidHexColor { raw: raw.to_string() });
    }

    let [r, g, b, a] = match bytes.len() {
        4 => [
            hex_1_to_u8(bytes[1]) * 17,
            hex_1_to_u8(bytes[2]) * 17,
            hex_1_to_u8(bytes[3]) * 17,
            255,
        ],
        5 => [
            hex_1_to_u8(bytes[1]) * 17,
            hex_1_to_u8(bytes[2]) * 17,
            hex_1_to_u8(bytes[3]) * 17,
            hex_1_to_u8(bytes[4]) * 17,
        ],
        7 => [
            hex_2_to_u8(bytes[1], bytes[2]),
            hex_2_to_u8(bytes[3], bytes[4]),
            hex_2_to_u8(bytes[5], bytes[6]),
            255,
        ],
        _ => [
            hex_2_to_u8(bytes[1], bytes[2]),
            hex_2_to_u8(bytes[3], bytes[4]),
            hex_2_to_u8(bytes[5], bytes[6]),
            hex_2_to_u8(bytes[7], bytes[8]),
        ],
    };
    Ok(Color::rgba(r, g, b, a))
}

impl FromStr for Color {
    type Err = InvalidHexColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_color(s)
    }
}

fn validate(bytes: &[u8]) -> bool {
    let length = bytes.len();

    if length == 0 || bytes[0] != b'#' {
        return false;
    }

    if length != 4 && length != 5 && length != 7 && length != 9 {
        return false;
    }

    bytes[1..].iter().all(u8::is_ascii_hexdigit)
}

fn hex_1_to_u8(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

fn hex_2_to_u8(c1: u8, c2: u8) -> u8 {
    (hex_1_to_u8(c1) << 4) | hex_1_to_u8(c2)
}

#[cfg(test)]
mod tests {
    use super::parse_hex_color;
    use crate::Color;

    #[test]
    fn short_forms_expand_each_nibble() {
        assert_eq!(parse_hex_color("#f80"), Ok(Color::rgb(255, 136, 0)));
        assert_eq!(parse_hex_color("#f808"), Ok(Color::rgba(255, 136, 0, 136)));
    }

    #[test]
    fn long_forms_parse_pairs() {
        assert_eq!("#1a2B3c".parse::<Color>(), Ok(Color::rgb(0x1a, 0x2b, 0x3c)));
        assert_eq!(Color::hex("#00000080"), Color::rgba(0, 0, 0, 128));
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(parse_hex_color("123456").is_err());
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
        assert_eq!(Color::hex("nope"), Color::transparent());
    }
}
