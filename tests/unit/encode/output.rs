use super::*;

#[test]
fn names_follow_mode_and_timestamp() {
    let f = OutputFile::named(CreationMode::Video, EncodedMedia::webm(vec![1, 2]), 1_700);
    assert_eq!(f.name, "edited-1700.webm");
    assert_eq!(f.mime, WEBM_MIME);
    assert_eq!(f.bytes, vec![1, 2]);

    let f = OutputFile::named(CreationMode::Text, EncodedMedia::new(vec![], PNG_MIME), 5);
    assert_eq!(f.name, "text-5.png");
    let f = OutputFile::named(CreationMode::Photo, EncodedMedia::new(vec![], PNG_MIME), 5);
    assert_eq!(f.name, "photo-5.png");
}

#[test]
fn wall_clock_names_are_well_formed() {
    let f = OutputFile::for_mode(CreationMode::Video, EncodedMedia::webm(vec![]));
    let ms = f
        .name
        .strip_prefix("edited-")
        .and_then(|s| s.strip_suffix(".webm"))
        .unwrap();
    assert!(ms.parse::<u128>().unwrap() > 0);
}
