use super::*;

#[test]
fn opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    assert_eq!(over(dst, [200, 200, 200, 200], 0.0), dst);
}

#[test]
fn transparent_src_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 0], 1.0), dst);
}

#[test]
fn opaque_src_replaces_dst() {
    assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255], 1.0), [255, 0, 0, 255]);
}

#[test]
fn transparent_dst_returns_src() {
    let src = [100, 110, 120, 200];
    assert_eq!(over([0, 0, 0, 0], src, 1.0), src);
}

#[test]
fn half_black_darkens_opaque_dst() {
    let out = over([200, 100, 50, 255], [0, 0, 0, 128], 1.0);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 100);
}

#[test]
fn in_place_composites_every_pixel() {
    let mut dst = vec![0, 0, 0, 255, 0, 0, 0, 255];
    let src = vec![255, 255, 255, 255, 0, 0, 0, 0];
    over_in_place(&mut dst, &src, 1.0).unwrap();
    assert_eq!(dst, vec![255, 255, 255, 255, 0, 0, 0, 255]);
    assert!(over_in_place(&mut dst, &src[..4], 1.0).is_err());
}
