use super::*;

#[test]
fn png_round_trips_straight_colors() {
    let s = Surface::from_premul(2, 1, vec![255, 0, 0, 255, 64, 0, 0, 128]).unwrap();
    let media = encode_png(&s).unwrap();
    assert_eq!(media.mime, PNG_MIME);
    assert_eq!(&media.bytes[..8], b"\x89PNG\r\n\x1a\n");

    let decoded = image::load_from_memory(&media.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 1));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(1, 0).0, [128, 0, 0, 128]);
}
