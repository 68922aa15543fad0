use super::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn black_surface(w: u32, h: u32) -> Surface {
    let mut s = Surface::new(Canvas {
        width: w,
        height: h,
    })
    .unwrap();
    s.clear(Rgba8Premul::black());
    s
}

fn red_image(w: u32, h: u32) -> PaintImage {
    PaintImage::from_prepared(&PreparedImage::solid(w, h, RED).unwrap()).unwrap()
}

#[test]
fn new_surface_is_transparent_and_clear_fills() {
    let mut s = Surface::new(Canvas {
        width: 3,
        height: 2,
    })
    .unwrap();
    assert!(s.pixels().iter().all(|b| *b == 0));
    s.clear(Rgba8Premul::black());
    assert_eq!(s.pixel(2, 1), BLACK);
    assert_eq!(s.pixel(3, 0), [0; 4]);
}

#[test]
fn degenerate_canvas_is_unavailable() {
    let err = Surface::new(Canvas {
        width: 0,
        height: 10,
    })
    .unwrap_err();
    assert!(matches!(err, ReelError::CanvasUnavailable(_)));
}

#[test]
fn from_premul_checks_length() {
    assert!(Surface::from_premul(2, 2, vec![0; 15]).is_err());
    let s = Surface::from_premul(2, 2, vec![7; 16]).unwrap();
    assert_eq!(s.pixel(1, 1), [7; 4]);
    assert_eq!(s.to_frame().data.len(), 16);
}

#[test]
fn image_fills_destination_rect_only() {
    let mut s = black_surface(8, 8);
    s.draw_image(&red_image(2, 2), Rect::new(0.0, 0.0, 4.0, 8.0), None)
        .unwrap();
    assert_eq!(s.pixel(1, 1), RED);
    assert_eq!(s.pixel(3, 7), RED);
    assert_eq!(s.pixel(5, 1), BLACK);
}

#[test]
fn clip_restricts_image_draw() {
    let mut s = black_surface(8, 8);
    s.draw_image(
        &red_image(4, 4),
        Rect::new(0.0, 0.0, 8.0, 8.0),
        Some(Rect::new(4.0, 0.0, 8.0, 8.0)),
    )
    .unwrap();
    assert_eq!(s.pixel(1, 3), BLACK);
    assert_eq!(s.pixel(6, 3), RED);
}

#[test]
fn translucent_fill_blends_over() {
    let mut s = black_surface(4, 4);
    s.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), [255, 255, 255, 128])
        .unwrap();
    let px = s.pixel(2, 2);
    assert_eq!(px[3], 255);
    assert!((i32::from(px[0]) - 128).abs() <= 2, "{px:?}");
}

#[test]
fn fit_modes() {
    let dst = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert_eq!(fit_rect(200, 100, dst, SourceFit::Fill), dst);
    assert_eq!(
        fit_rect(200, 100, dst, SourceFit::Contain),
        Rect::new(0.0, 25.0, 100.0, 75.0)
    );
    assert_eq!(
        fit_rect(200, 100, dst, SourceFit::Cover),
        Rect::new(-50.0, 0.0, 150.0, 100.0)
    );
}
