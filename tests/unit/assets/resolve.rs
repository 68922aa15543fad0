use super::*;

#[test]
fn root_relative_and_plain_paths_join_root() {
    let r = FsResolver::new("/srv/web");
    assert_eq!(
        r.local_path("/assets/generated/sticker-pack-1.dim_512x512.png").unwrap(),
        PathBuf::from("/srv/web/assets/generated/sticker-pack-1.dim_512x512.png")
    );
    assert_eq!(
        r.local_path("music/./a.mp3").unwrap(),
        PathBuf::from("/srv/web/music/a.mp3")
    );
}

#[test]
fn file_urls_are_absolute() {
    let r = FsResolver::new("/srv/web");
    assert_eq!(
        r.local_path("file:///tmp/bg.png").unwrap(),
        PathBuf::from("/tmp/bg.png")
    );
    assert!(r.local_path("file://relative.png").is_err());
    assert!(r.local_path("file:///tmp/../etc/passwd").is_err());
}

#[test]
fn traversal_and_foreign_schemes_are_rejected() {
    let r = FsResolver::new("/srv/web");
    for bad in [
        "../secret.png",
        "/a/../../b.png",
        "blob:http://localhost/1234",
        "https://cdn.example.com/a.png",
        "data:image/png;base64,AAAA",
        "",
        "/",
    ] {
        assert!(
            matches!(r.local_path(bad), Err(ReelError::Validation(_))),
            "{bad}"
        );
    }
}

#[test]
fn read_missing_file_is_media_decode() {
    let dir = tempfile::tempdir().unwrap();
    let r = FsResolver::new(dir.path());
    assert!(matches!(
        r.read("missing.png").unwrap_err(),
        ReelError::MediaDecode(_)
    ));

    std::fs::write(dir.path().join("a.bin"), b"xyz").unwrap();
    assert_eq!(r.read("/a.bin").unwrap(), b"xyz");
    assert_eq!(r.root(), dir.path());
}
