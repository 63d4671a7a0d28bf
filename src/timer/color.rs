use std::fmt;

use serde::{Deserialize, Serialize};

/// A fixed color anchoring one end of a ramp.
///
/// Serialized as a `[r, g, b]` array so phase feeds stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parse `#HHH`, `#HHHHHH` or `rgb(R, G, B)`.
    ///
    /// Spaces are ignored and the match is case-insensitive. The short hex
    /// form doubles each digit (`#F80` is `#FF8800`). Returns None for
    /// anything else, including decimal channels above 255.
    pub fn parse(value: &str) -> Option<Self> {
        let value: String = value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        if let Some(inner) = value
            .strip_prefix("RGB(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let channels: Vec<u8> = inner
                .split(',')
                .map(|c| c.parse::<u8>().ok())
                .collect::<Option<Vec<_>>>()?;
            return match channels.as_slice() {
                [r, g, b] => Some(Self::new(*r, *g, *b)),
                _ => None,
            };
        }

        let hex = value.strip_prefix('#').unwrap_or(&value);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
                Some(Self::new(digit(0)?, digit(1)?, digit(2)?))
            }
            6 => {
                let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Self::new(pair(0)?, pair(2)?, pair(4)?))
            }
            _ => None,
        }
    }

    /// Hex notation, for listings and the config file.
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self { red, green, blue }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(rgb: Rgb) -> Self {
        [rgb.red, rgb.green, rgb.blue]
    }
}

/// A displayed color: either a knot or a point on a ramp.
///
/// Channels are kept as plain integers because the interpolation never
/// clamps. With well-formed phases they stay within 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shade {
    pub red: i64,
    pub green: i64,
    pub blue: i64,
}

impl Shade {
    /// Channels clamped into the 8-bit range, for surfaces that need bytes.
    pub fn to_bytes(self) -> [u8; 3] {
        let clamp = |c: i64| c.clamp(0, 255) as u8;
        [clamp(self.red), clamp(self.green), clamp(self.blue)]
    }
}

impl From<Rgb> for Shade {
    fn from(rgb: Rgb) -> Self {
        Self {
            red: rgb.red.into(),
            green: rgb.green.into(),
            blue: rgb.blue.into(),
        }
    }
}

/// CSS notation, `rgb(r,g,b)` with no spaces.
impl fmt::Display for Shade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.red, self.green, self.blue)
    }
}

/// Interpolate between two knots over a ramp of `delay_minutes`.
///
/// Each channel is `floor(start + elapsed / (delay * 60) * (end - start))`.
/// `elapsed` is seconds since the ramp started. Nothing is clamped: the
/// resolver only calls this while the current time is inside the ramp.
/// A zero-length ramp yields the end knot.
pub fn interpolate(start: Rgb, end: Rgb, elapsed_secs: i64, delay_minutes: u32) -> Shade {
    let span = f64::from(delay_minutes) * 60.0;
    if span == 0.0 {
        return end.into();
    }
    let ratio = elapsed_secs as f64 / span;
    let channel = |s: u8, e: u8| {
        let s = f64::from(s);
        let e = f64::from(e);
        (s + ratio * (e - s)).floor() as i64
    };
    Shade {
        red: channel(start.red, end.red),
        green: channel(start.green, end.green),
        blue: channel(start.blue, end.blue),
    }
}
