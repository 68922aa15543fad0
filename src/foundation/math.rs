pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Store a channel value the way a clamped byte array does: clamp to `[0, 255]`, round to nearest.
pub(crate) fn clamp_channel(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0).round() as u8
}

/// Undo premultiplication for a single RGBA8 pixel.
pub(crate) fn unpremultiply_px(px: [u8; 4]) -> [u8; 4] {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    if a == 255 {
        return px;
    }
    let un = |c: u8| -> u8 { ((u32::from(c) * 255 + a / 2) / a).min(255) as u8 };
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

/// Premultiply a single straight-alpha RGBA8 pixel.
pub(crate) fn premultiply_px(px: [u8; 4]) -> [u8; 4] {
    let a = u16::from(px[3]);
    if a == 255 {
        return px;
    }
    [
        mul_div255_u8(u16::from(px[0]), a),
        mul_div255_u8(u16::from(px[1]), a),
        mul_div255_u8(u16::from(px[2]), a),
        px[3],
    ]
}

/// Run a straight-alpha color transform on a premultiplied pixel.
///
/// Opaque pixels skip the round trip.
pub(crate) fn map_straight(px: &mut [u8], f: impl Fn([f32; 3]) -> [f32; 3]) {
    let a = px[3];
    if a == 0 {
        return;
    }
    let straight = if a == 255 {
        [px[0], px[1], px[2], a]
    } else {
        unpremultiply_px([px[0], px[1], px[2], a])
    };
    let [r, g, b] = f([
        f32::from(straight[0]),
        f32::from(straight[1]),
        f32::from(straight[2]),
    ]);
    let out = premultiply_px([clamp_channel(r), clamp_channel(g), clamp_channel(b), a]);
    px[..4].copy_from_slice(&out);
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
