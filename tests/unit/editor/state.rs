use super::*;

#[test]
fn new_session_has_empty_trim_and_unit_speed() {
    let s = EditorState::new();
    assert_eq!(s.trim, TrimWindow { start: 0.0, end: 0.0 });
    assert_eq!(s.speed, 1.0);
    assert!(s.filters.is_empty() && s.captions.is_empty() && s.music.is_none());
    assert!(s.validate_for_render(CreationMode::Video).is_err());
}

#[test]
fn source_duration_corrects_trim_end() {
    let s = EditorState::new().with_source_duration(12.5);
    assert_eq!(s.trim, TrimWindow { start: 0.0, end: 12.5 });
    s.validate_for_render(CreationMode::Video).unwrap();
}

#[test]
fn trim_is_clamped_to_source() {
    let s = EditorState::new().with_trim(-3.0, 50.0, 10.0);
    assert_eq!(s.trim, TrimWindow { start: 0.0, end: 10.0 });
    let s = s.with_trim(8.0, 4.0, 10.0);
    assert_eq!(s.trim, TrimWindow { start: 8.0, end: 8.0 });
}

#[test]
fn speed_must_be_positive() {
    assert!(EditorState::new().with_speed(0.0).is_err());
    assert!(EditorState::new().with_speed(f64::NAN).is_err());
    for p in SPEED_PRESETS {
        assert_eq!(EditorState::new().with_speed(p).unwrap().speed, p);
    }
    assert_eq!(EditorState::new().with_speed(1.25).unwrap().speed, 1.25);
}

#[test]
fn filter_toggle_is_single_select() {
    let s = EditorState::new().with_filter(Filter::Bw);
    assert_eq!(s.filters, vec![Filter::Bw]);
    let s = s.with_filter(Filter::Sepia);
    assert_eq!(s.filters, vec![Filter::Sepia]);
    assert_eq!(s.active_filter(), Some(Filter::Sepia));
    let s = s.with_filter(Filter::Sepia);
    assert!(s.filters.is_empty());
    assert_eq!(s.active_filter(), None);
    let s = s.with_filter(Filter::None);
    assert_eq!(s.active_filter(), None);
}

#[test]
fn effect_toggle_is_independent_of_filters() {
    let s = EditorState::new()
        .with_filter(Filter::Cool)
        .with_effect(Effect::Glitch)
        .with_effect(Effect::Blur);
    assert_eq!(s.filters, vec![Filter::Cool]);
    assert_eq!(s.effects, vec![Effect::Blur]);
    assert_eq!(s.active_effect(), Some(Effect::Blur));
}

#[test]
fn captions_and_stickers_keep_insertion_order() {
    let s = EditorState::new()
        .with_caption(Caption::new("A"))
        .with_caption(Caption::new("   "))
        .with_caption(Caption::new("B"))
        .with_sticker(Sticker::new("one.png"))
        .with_sticker(Sticker::new("two.png"));
    let texts: Vec<_> = s.captions.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["A", "B"]);
    let s = s.without_caption(0).without_sticker(5).without_sticker(0);
    assert_eq!(s.captions[0].text, "B");
    assert_eq!(s.stickers[0].url, "two.png");
}

#[test]
fn audio_mix_needed_only_with_music_or_voiceover() {
    let s = EditorState::new();
    assert!(!s.needs_audio_mix());
    assert!(s.clone().with_music(Some(MusicSettings::new("m.mp3"))).needs_audio_mix());
    let s = s.with_voiceover(Some(VoiceoverSettings {
        url: "v.wav".into(),
        effect: VoiceEffect::None,
    }));
    assert!(s.needs_audio_mix());
    let s = s.with_voice_effect(VoiceEffect::Robotic);
    assert_eq!(s.voiceover.unwrap().effect, VoiceEffect::Robotic);
}

#[test]
fn deserializes_ui_state_json() {
    let json = r##"{
        "trim": {"start": 2, "end": 6},
        "speed": 1.5,
        "filters": ["sepia"],
        "effects": ["none"],
        "greenScreen": {"backgroundUrl": "/bg.png", "threshold": 0.4},
        "captions": [{"text": "hi", "position": {"x": 50, "y": 80}, "size": 32, "color": "#ffcc00"}],
        "stickers": [{"url": "/s.png", "position": {"x": 10, "y": 10}, "scale": 2}],
        "autoCutSegments": [{"start": 0, "end": 1.5}],
        "music": {"url": "/m.mp3", "startOffset": 1, "originalVolume": 0, "musicVolume": 0.5},
        "voiceover": null,
        "duetLayout": {"sourceVideoId": "v1", "position": "right"}
    }"##;
    let s: EditorState = serde_json::from_str(json).unwrap();
    assert_eq!(s.trim.duration(), 4.0);
    assert_eq!(s.active_filter(), Some(Filter::Sepia));
    assert_eq!(s.active_effect(), None);
    assert_eq!(s.captions[0].position.to_pixels(1080, 1920), (540.0, 1536.0));
    assert_eq!(s.duet_layout.as_ref().unwrap().position, DuetPosition::Right);
    assert_eq!(s.music.as_ref().unwrap().original_volume, 0.0);
    s.validate_for_render(CreationMode::Video).unwrap();
}

#[test]
fn still_modes_ignore_trim() {
    let s = EditorState::new().with_filter(Filter::Bw);
    s.validate_for_render(CreationMode::Photo).unwrap();
    s.validate_for_render(CreationMode::Text).unwrap();
    assert!(CreationMode::Photo.is_still());
    assert!(!CreationMode::Video.is_still());
}

#[test]
fn validate_rejects_out_of_range_values() {
    let base = EditorState::new().with_source_duration(10.0);
    let mut music = MusicSettings::new("m.mp3");
    music.music_volume = 1.5;
    assert!(base.clone().with_music(Some(music)).validate_for_render(CreationMode::Video).is_err());

    let mut gs = GreenScreen::new("bg.png");
    gs.threshold = -0.1;
    assert!(base.clone().with_green_screen(Some(gs)).validate_for_render(CreationMode::Video).is_err());

    let mut sticker = Sticker::new("s.png");
    sticker.scale = 0.0;
    assert!(base.clone().with_sticker(sticker).validate_for_render(CreationMode::Photo).is_err());

    let bad_seg = base.with_auto_cut_segments(vec![Segment { start: 3.0, end: 3.0 }]);
    assert!(bad_seg.validate_for_render(CreationMode::Video).is_err());
}
