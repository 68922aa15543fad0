use super::*;

const FONT_CANDIDATES: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
];

fn system_font() -> Option<std::path::PathBuf> {
    FONT_CANDIDATES
        .iter()
        .map(std::path::PathBuf::from)
        .find(|p| p.exists())
}

fn mono() -> FixedAdvance {
    FixedAdvance { em_ratio: 0.5 }
}

#[test]
fn wrap_is_greedy() {
    // 10 px per char at size 20.
    let lines = wrap_words("aa bb cc dddd e", 50.0, 20.0, &mut mono()).unwrap();
    assert_eq!(lines, vec!["aa bb", "cc", "dddd", "e"]);
}

#[test]
fn long_words_keep_their_own_line_and_newlines_break() {
    let lines = wrap_words("x averyveryverylongword y\nz", 50.0, 20.0, &mut mono()).unwrap();
    assert_eq!(lines, vec!["x", "averyveryverylongword", "y", "z"]);
}

#[test]
fn blank_text_has_no_lines() {
    assert!(wrap_words("   \n ", 50.0, 20.0, &mut mono()).unwrap().is_empty());
}

#[test]
fn text_card_lines_are_vertically_centered() {
    let cfg = RenderConfig::default();
    // 64 px font at 0.5 em: 32 px per char; 980 px fits 30 chars.
    let text = "word ".repeat(20);
    let lines = text_card_layout(&text, cfg.canvas, &cfg, &mut mono()).unwrap();
    assert_eq!(lines.len(), 4);
    let start = (1920.0 - 4.0 * 80.0) / 2.0;
    for (i, l) in lines.iter().enumerate() {
        assert_eq!(l.center_y, start + i as f32 * 80.0);
        assert!(l.text.chars().count() <= 30);
    }
}

#[test]
fn text_card_without_font_path_uses_a_system_font() {
    let cfg = RenderConfig {
        canvas: Canvas {
            width: 200,
            height: 120,
        },
        ..RenderConfig::default()
    };
    assert!(cfg.font_path.is_none());
    match TextLayoutEngine::system_default() {
        Some(engine) => {
            assert!(!engine.family_name().is_empty());
            let surface = render_text_card("HI", &cfg).unwrap();
            assert!(surface.pixels().chunks_exact(4).any(|px| px[0] > 200));
        }
        None => assert!(matches!(
            render_text_card("hello", &cfg).unwrap_err(),
            ReelError::Validation(_)
        )),
    }
}

#[test]
fn configured_font_path_wins_over_system_fonts() {
    let cfg = RenderConfig {
        font_path: Some("/nonexistent/font.ttf".into()),
        ..RenderConfig::default()
    };
    assert!(matches!(
        TextLayoutEngine::from_config(&cfg).unwrap_err(),
        ReelError::Validation(_)
    ));
}

#[test]
fn invalid_font_bytes_are_rejected() {
    assert!(TextLayoutEngine::from_font_bytes(vec![0, 1, 2, 3]).is_err());
}

#[test]
fn text_card_draws_white_text_on_black() {
    let Some(font) = system_font() else {
        eprintln!("skipping: no system font");
        return;
    };
    let cfg = RenderConfig {
        canvas: Canvas {
            width: 200,
            height: 120,
        },
        font_path: Some(font),
        text_card: crate::config::TextCardStyle {
            font_size_px: 32.0,
            line_height_px: 40.0,
            margin_px: 20.0,
            ..Default::default()
        },
        ..RenderConfig::default()
    };
    let surface = render_text_card("HI", &cfg).unwrap();
    assert_eq!(surface.pixel(0, 0), [0, 0, 0, 255]);
    let lit = surface
        .pixels()
        .chunks_exact(4)
        .filter(|px| px[0] > 200)
        .count();
    assert!(lit > 20, "lit = {lit}");
    assert!(surface.pixels().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn caption_draws_near_its_position() {
    let Some(font) = system_font() else {
        eprintln!("skipping: no system font");
        return;
    };
    let mut engine = TextLayoutEngine::from_font_file(&font).unwrap();
    assert!(!engine.family_name().is_empty());
    assert!(engine.measure("WWW", 32.0).unwrap() > engine.measure("W", 32.0).unwrap());

    let mut s = Surface::new(Canvas {
        width: 200,
        height: 200,
    })
    .unwrap();
    s.clear(Rgba8Premul::black());
    let mut caption = Caption::new("II");
    caption.color = "#ff0000".into();
    caption.position = crate::editor::state::Position { x: 25.0, y: 25.0 };
    draw_caption(&mut s, &mut engine, &caption, &CaptionStyle::default()).unwrap();

    let red_at = |x0: u32, x1: u32, y0: u32, y1: u32| {
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                let px = s.pixel(x, y);
                px[0] > 150 && px[1] < 60
            })
            .count()
    };
    assert!(red_at(25, 75, 25, 75) > 0);
    assert_eq!(red_at(100, 200, 100, 200), 0);
}
