//! CSS-style color strings as produced by the caption color picker.

use crate::foundation::error::{ReelError, ReelResult};

/// Parse a caption color into straight RGBA8.
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)` and a handful of
/// named colors.
pub fn parse_css_color(s: &str) -> ReelResult<[u8; 4]> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).map_err(|e| ReelError::validation(format!("color \"{s}\": {e}")));
    }
    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_fn(args).map_err(|e| ReelError::validation(format!("color \"{s}\": {e}")));
    }
    named(&lower).ok_or_else(|| ReelError::validation(format!("unsupported color \"{s}\"")))
}

fn parse_hex(s: &str) -> Result<[u8; 4], String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }

    match s.len() {
        3 => {
            let mut out = [255u8; 4];
            for (i, ch) in s.chars().enumerate() {
                let v = ch
                    .to_digit(16)
                    .ok_or_else(|| format!("invalid hex digit '{ch}'"))? as u8;
                out[i] = v * 17;
            }
            Ok(out)
        }
        6 => Ok([
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ]),
        8 => Ok([
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ]),
        _ => Err("hex color must be #RGB, #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

fn parse_rgb_fn(args: &str) -> Result<[u8; 4], String> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if !(parts.len() == 3 || parts.len() == 4) {
        return Err("expected 3 or 4 components".to_owned());
    }
    let mut out = [255u8; 4];
    for (i, p) in parts[..3].iter().enumerate() {
        let v: f64 = p.parse().map_err(|_| format!("invalid component \"{p}\""))?;
        out[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    if let Some(a) = parts.get(3) {
        let v: f64 = a.parse().map_err(|_| format!("invalid alpha \"{a}\""))?;
        out[3] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    Ok(out)
}

fn named(s: &str) -> Option<[u8; 4]> {
    Some(match s {
        "white" => [255, 255, 255, 255],
        "black" => [0, 0, 0, 255],
        "red" => [255, 0, 0, 255],
        "green" => [0, 128, 0, 255],
        "lime" => [0, 255, 0, 255],
        "blue" => [0, 0, 255, 255],
        "yellow" => [255, 255, 0, 255],
        "cyan" => [0, 255, 255, 255],
        "magenta" => [255, 0, 255, 255],
        "transparent" => [0, 0, 0, 0],
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
