use serde::Deserialize;

pub const DEFAULT_BAND_HEIGHT: i32 = 80;
pub const DEFAULT_FONT_SIZE: i32 = 32;
pub const DEFAULT_STROKE_WIDTH: i32 = 0;
pub const DEFAULT_LINE_GAP: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rgb` or `#rrggbb`, case-insensitive, leading `#` optional.
    pub fn parse_hex(raw: &str) -> Option<Self> {
        let digits = raw.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        match digits.len() {
            3 => {
                let mut channels = [0_u8; 3];
                for (slot, ch) in channels.iter_mut().zip(digits.chars()) {
                    let nibble = u8::from_str_radix(&ch.to_string(), 16).ok()?;
                    *slot = nibble * 16 + nibble;
                }
                Some(Self::opaque(channels[0], channels[1], channels[2]))
            }
            6 => {
                let mut channels = [0_u8; 3];
                for (index, slot) in channels.iter_mut().enumerate() {
                    *slot = u8::from_str_radix(&digits[index * 2..index * 2 + 2], 16).ok()?;
                }
                Some(Self::opaque(channels[0], channels[1], channels[2]))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl RawValue {
    fn as_px_int(&self, default: i32) -> i32 {
        match self {
            Self::Int(value) => i32::try_from(*value).unwrap_or(default),
            Self::Float(value) => {
                if value.is_finite() {
                    *value as i32
                } else {
                    default
                }
            }
            Self::Text(raw) => parse_leading_int(raw).unwrap_or(default),
            Self::Bool(_) => default,
        }
    }

    fn as_color(&self, default: Color) -> Color {
        match self {
            Self::Text(raw) => Color::parse_hex(raw).unwrap_or(default),
            _ => default,
        }
    }

    fn as_text(&self) -> String {
        match self {
            Self::Text(raw) => raw.clone(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
        }
    }
}

/// Leading-integer parse: optional sign, then digits, trailing junk
/// ignored ("32px" is 32). Empty or non-numeric input is None.
fn parse_leading_int(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = bytes[start..]
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    trimmed[..start + digits].parse::<i32>().ok()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawStyle {
    #[serde(default)]
    pub band_height: Option<RawValue>,
    #[serde(default)]
    pub font_size: Option<RawValue>,
    #[serde(default)]
    pub font_color: Option<RawValue>,
    #[serde(default)]
    pub stroke_color: Option<RawValue>,
    #[serde(default)]
    pub stroke_width: Option<RawValue>,
    #[serde(default)]
    pub line_gap: Option<RawValue>,
    #[serde(default)]
    pub text: Option<RawValue>,
}

impl RawStyle {
    pub fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        let slot = match key {
            "band_height" => &mut self.band_height,
            "font_size" => &mut self.font_size,
            "font_color" => &mut self.font_color,
            "stroke_color" => &mut self.stroke_color,
            "stroke_width" => &mut self.stroke_width,
            "line_gap" => &mut self.line_gap,
            "text" => &mut self.text,
            other => anyhow::bail!(
                "unknown style key '{other}'. Recognized keys: band_height, font_size, \
                 font_color, stroke_color, stroke_width, line_gap, text"
            ),
        };
        *slot = Some(RawValue::Text(value));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawParameters {
    pub band_height: i32,
    pub font_size: i32,
    pub font_color: Color,
    pub stroke_color: Color,
    pub stroke_width: i32,
    pub line_gap: i32,
    pub text: String,
}

impl Default for DrawParameters {
    fn default() -> Self {
        Self {
            band_height: DEFAULT_BAND_HEIGHT,
            font_size: DEFAULT_FONT_SIZE,
            font_color: Color::WHITE,
            stroke_color: Color::BLACK,
            stroke_width: DEFAULT_STROKE_WIDTH,
            line_gap: DEFAULT_LINE_GAP,
            text: String::new(),
        }
    }
}

impl DrawParameters {
    /// Normalizes raw styling inputs. A missing value, an unparsable
    /// string, or a non-finite number substitutes the documented default;
    /// normalization never fails. Zero and negative integers pass through
    /// untouched.
    pub fn from_raw(raw: &RawStyle) -> Self {
        Self {
            band_height: resolve_px(&raw.band_height, DEFAULT_BAND_HEIGHT),
            font_size: resolve_px(&raw.font_size, DEFAULT_FONT_SIZE),
            font_color: resolve_color(&raw.font_color, Color::WHITE),
            stroke_color: resolve_color(&raw.stroke_color, Color::BLACK),
            stroke_width: resolve_px(&raw.stroke_width, DEFAULT_STROKE_WIDTH),
            line_gap: resolve_px(&raw.line_gap, DEFAULT_LINE_GAP),
            text: raw
                .text
                .as_ref()
                .map(RawValue::as_text)
                .unwrap_or_default(),
        }
    }

    pub fn lines(&self) -> Vec<&str> {
        split_lines(&self.text)
    }
}

fn resolve_px(raw: &Option<RawValue>, default: i32) -> i32 {
    raw.as_ref()
        .map(|value| value.as_px_int(default))
        .unwrap_or(default)
}

fn resolve_color(raw: &Option<RawValue>, default: Color) -> Color {
    raw.as_ref()
        .map(|value| value.as_color(default))
        .unwrap_or(default)
}

/// Splits on `'\n'` without filtering; empty text yields one empty line.
/// A trailing `'\r'` is stripped from each line so CRLF input behaves.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: RawValue) -> Option<RawValue> {
        Some(value)
    }

    #[test]
    fn missing_fields_resolve_to_defaults() {
        let params = DrawParameters::from_raw(&RawStyle::default());
        assert_eq!(params, DrawParameters::default());
        assert_eq!(params.band_height, 80);
        assert_eq!(params.font_size, 32);
        assert_eq!(params.stroke_width, 0);
        assert_eq!(params.line_gap, 0);
    }

    #[test]
    fn numeric_strings_parse_with_trailing_units() {
        let style = RawStyle {
            band_height: raw(RawValue::Text("96".to_owned())),
            font_size: raw(RawValue::Text("48px".to_owned())),
            line_gap: raw(RawValue::Text("  -6  ".to_owned())),
            ..RawStyle::default()
        };
        let params = DrawParameters::from_raw(&style);
        assert_eq!(params.band_height, 96);
        assert_eq!(params.font_size, 48);
        assert_eq!(params.line_gap, -6);
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let style = RawStyle {
            band_height: raw(RawValue::Text("tall".to_owned())),
            font_size: raw(RawValue::Float(f64::NAN)),
            stroke_width: raw(RawValue::Bool(true)),
            line_gap: raw(RawValue::Float(f64::INFINITY)),
            ..RawStyle::default()
        };
        let params = DrawParameters::from_raw(&style);
        assert_eq!(params.band_height, DEFAULT_BAND_HEIGHT);
        assert_eq!(params.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(params.stroke_width, DEFAULT_STROKE_WIDTH);
        assert_eq!(params.line_gap, DEFAULT_LINE_GAP);
    }

    #[test]
    fn zero_and_negative_integers_pass_through() {
        let style = RawStyle {
            band_height: raw(RawValue::Int(0)),
            line_gap: raw(RawValue::Int(-12)),
            ..RawStyle::default()
        };
        let params = DrawParameters::from_raw(&style);
        assert_eq!(params.band_height, 0);
        assert_eq!(params.line_gap, -12);
    }

    #[test]
    fn colors_parse_short_and_long_hex() {
        assert_eq!(Color::parse_hex("#4FE1B8"), Some(Color::opaque(0x4f, 0xe1, 0xb8)));
        assert_eq!(Color::parse_hex("fff"), Some(Color::WHITE));
        assert_eq!(Color::parse_hex("#000000"), Some(Color::BLACK));
        assert_eq!(Color::parse_hex("#12345"), None);
        assert_eq!(Color::parse_hex("ghijkl"), None);
    }

    #[test]
    fn malformed_colors_fall_back_to_field_default() {
        let style = RawStyle {
            font_color: raw(RawValue::Text("not-a-color".to_owned())),
            stroke_color: raw(RawValue::Int(7)),
            ..RawStyle::default()
        };
        let params = DrawParameters::from_raw(&style);
        assert_eq!(params.font_color, Color::WHITE);
        assert_eq!(params.stroke_color, Color::BLACK);
    }

    #[test]
    fn split_lines_keeps_empty_lines_and_order() {
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("Hello\nWorld"), vec!["Hello", "World"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("tail\n"), vec!["tail", ""]);
    }

    #[test]
    fn style_set_rejects_unknown_keys() {
        let mut style = RawStyle::default();
        style.set("band_height", "120".to_owned()).expect("known key");
        assert!(style.set("bandheight", "120".to_owned()).is_err());
        let params = DrawParameters::from_raw(&style);
        assert_eq!(params.band_height, 120);
    }
}
