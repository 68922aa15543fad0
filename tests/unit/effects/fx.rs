use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::foundation::core::Canvas;

fn uniform(w: u32, h: u32, v: u8) -> Surface {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for _ in 0..w * h {
        data.extend_from_slice(&[v, v, v, 255]);
    }
    Surface::from_premul(w, h, data).unwrap()
}

fn gradient(w: u32, h: u32) -> Surface {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[x as u8, y as u8, 7, 255]);
        }
    }
    Surface::from_premul(w, h, data).unwrap()
}

#[test]
fn empty_or_none_is_identity() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut s = gradient(16, 16);
    let before = s.pixels().to_vec();
    apply_effects(&mut s, &[], &mut rng).unwrap();
    apply_effects(&mut s, &[Effect::Blur, Effect::None], &mut rng).unwrap();
    assert_eq!(s.pixels(), &before[..]);
}

#[test]
fn blur_keeps_uniform_frames() {
    let mut s = uniform(40, 40, 90);
    apply_effect(&mut s, Effect::Blur, &mut StdRng::seed_from_u64(0)).unwrap();
    for px in s.pixels().chunks_exact(4) {
        assert!((i32::from(px[0]) - 90).abs() <= 1);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn blur_spreads_a_point() {
    let mut s = Surface::new(Canvas {
        width: 31,
        height: 31,
    })
    .unwrap();
    let i = (15 * 31 + 15) * 4;
    s.pixels_mut()[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
    apply_effect(&mut s, Effect::Blur, &mut StdRng::seed_from_u64(0)).unwrap();
    assert!(s.pixel(15, 15)[3] < 255);
    assert!(s.pixel(19, 15)[3] > 0);
    assert_eq!(s.pixel(0, 0)[3], 0);
}

#[test]
fn vignette_darkens_edges_not_center() {
    let mut s = uniform(30, 30, 255);
    apply_effect(&mut s, Effect::Vignette, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(s.pixel(0, 0), [102, 102, 102, 255]);
    assert!(s.pixel(15, 15)[0] >= 245);
    assert!(s.pixel(0, 15)[0] < s.pixel(10, 15)[0]);
}

#[test]
fn glitch_touches_about_two_percent_deterministically() {
    let run = |seed| {
        let mut s = uniform(100, 100, 128);
        apply_effect(&mut s, Effect::Glitch, &mut StdRng::seed_from_u64(seed)).unwrap();
        s
    };
    let a = run(42);
    let changed = a
        .pixels()
        .chunks_exact(4)
        .filter(|px| px[..3] != [128, 128, 128])
        .count();
    assert!((100..=320).contains(&changed), "changed = {changed}");
    assert!(a.pixels().chunks_exact(4).all(|px| px[3] == 255));
    assert_eq!(a.pixels(), run(42).pixels());
}

#[test]
fn pixelate_uses_block_center_samples() {
    let src = gradient(20, 20);
    let mut s = src.clone();
    apply_effect(&mut s, Effect::Pixelate, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(s.pixel(0, 0), src.pixel(5, 5));
    assert_eq!(s.pixel(9, 9), src.pixel(5, 5));
    assert_eq!(s.pixel(10, 3), src.pixel(15, 5));
    assert_eq!(s.pixel(19, 19), src.pixel(15, 15));
}

#[test]
fn pixelate_handles_tiny_surfaces() {
    let src = gradient(3, 2);
    let mut s = src.clone();
    apply_effect(&mut s, Effect::Pixelate, &mut StdRng::seed_from_u64(0)).unwrap();
    assert!(s.pixels().chunks_exact(4).all(|px| px == src.pixel(1, 1)));
}

#[test]
fn sharpen_applies_contrast_then_brightness() {
    let mut s = Surface::from_premul(
        3,
        1,
        vec![200, 50, 255, 255, 128, 128, 128, 255, 0, 0, 0, 255],
    )
    .unwrap();
    apply_effect(&mut s, Effect::Sharpen, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(s.pixel(0, 0), [225, 36, 255, 255]);
    assert_eq!(s.pixel(1, 0), [135, 135, 135, 255]);
    assert_eq!(s.pixel(2, 0), [0, 0, 0, 255]);
}
