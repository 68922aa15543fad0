use super::*;

#[test]
fn mul_div255_is_exact_at_bounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
}

#[test]
fn clamp_channel_clamps_and_rounds() {
    assert_eq!(clamp_channel(-12.0), 0);
    assert_eq!(clamp_channel(300.7), 255);
    assert_eq!(clamp_channel(127.6), 128);
    assert_eq!(clamp_channel(f32::NAN), 0);
}

#[test]
fn unpremultiply_restores_straight_color() {
    assert_eq!(unpremultiply_px([0, 0, 0, 0]), [0, 0, 0, 0]);
    assert_eq!(unpremultiply_px([10, 20, 30, 255]), [10, 20, 30, 255]);
    assert_eq!(unpremultiply_px([64, 0, 128, 128]), [128, 0, 255, 128]);
}

#[test]
fn map_straight_keeps_alpha_and_skips_transparent() {
    let mut px = [10u8, 20, 30, 255];
    map_straight(&mut px, |[r, g, b]| [r * 2.0, g * 2.0, b * 2.0]);
    assert_eq!(px, [20, 40, 60, 255]);

    let mut clear = [0u8, 0, 0, 0];
    map_straight(&mut clear, |_| [255.0, 255.0, 255.0]);
    assert_eq!(clear, [0, 0, 0, 0]);

    let mut half = [64u8, 0, 0, 128];
    map_straight(&mut half, |[r, g, b]| [r, g, b]);
    assert_eq!(half[3], 128);
    assert!(half[0] <= half[3]);
}
