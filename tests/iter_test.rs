mod common;

use common::{EpubBuilder, OPF_PATH, opf, quiet};
use libepub::{Epub, Error, IterMode};

fn book() -> Epub {
    Epub::from_bytes_with(EpubBuilder::three_chapters().build(), "book", quiet()).unwrap()
}

/// Drain an iterator, collecting (spine position, payload) pairs.
fn collect(epub: &Epub, mode: IterMode) -> Vec<(usize, String)> {
    let mut iter = epub.iter(mode);
    let mut out = Vec::new();
    let mut payload = iter.current().map(|b| String::from_utf8_lossy(b).into_owned());
    while let Some(text) = payload {
        out.push((iter.position().unwrap(), text));
        payload = iter.advance().map(|b| String::from_utf8_lossy(b).into_owned());
    }
    assert!(iter.is_exhausted());
    out
}

#[test]
fn test_linear_count() {
    let epub = book();
    assert_eq!(epub.package().spine().len(), 3);
    assert_eq!(epub.package().spine().linear_count(), 2);
}

#[test]
fn test_spine_mode_visits_everything_in_order() {
    let epub = book();
    let visited = collect(&epub, IterMode::Spine);
    let positions: Vec<_> = visited.iter().map(|(i, _)| *i).collect();
    assert_eq!(positions, [0, 1, 2]);
    assert!(visited[1].1.contains("aside"));
}

#[test]
fn test_linear_mode_skips_non_linear() {
    let epub = book();
    let visited = collect(&epub, IterMode::Linear);
    let positions: Vec<_> = visited.iter().map(|(i, _)| *i).collect();
    assert_eq!(positions, [0, 2]);
    assert!(visited[0].1.contains("one"));
    assert!(visited[1].1.contains("two"));
}

#[test]
fn test_non_linear_mode() {
    let epub = book();
    let visited = collect(&epub, IterMode::NonLinear);
    assert_eq!(visited.len(), 1);
    assert_eq!(visited[0].0, 1);
}

#[test]
fn test_current_is_cached_until_advance() {
    let epub = book();
    let mut iter = epub.iter(IterMode::Linear);
    let first = iter.current().unwrap().to_vec();
    assert_eq!(iter.current().unwrap(), &first[..]);
    assert_eq!(iter.item().unwrap().idref, "ch1");
    assert_eq!(iter.entry().unwrap().href, "ch1.xhtml");
    assert_eq!(iter.path().as_deref(), Some("OEBPS/ch1.xhtml"));
}

#[test]
fn test_empty_spine_is_exhausted_at_creation() {
    let bytes = EpubBuilder::standard().entry(OPF_PATH, opf("<spine/>")).build();
    let epub = Epub::from_bytes_with(bytes, "empty", quiet()).unwrap();
    let mut iter = epub.iter(IterMode::Spine);

    assert!(iter.is_exhausted());
    assert_eq!(iter.current(), None);
    assert_eq!(iter.advance(), None);
    assert!(iter.item().is_none());
    assert_eq!(epub.last_error(), None);
}

#[test]
fn test_unknown_idref_latches_error_and_can_be_skipped() {
    let package = opf(
        r#"<manifest>
  <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
</manifest>
<spine>
  <itemref idref="ghost"/>
  <itemref idref="ch1"/>
</spine>"#,
    );
    let bytes = EpubBuilder::standard()
        .entry(OPF_PATH, package)
        .entry("OEBPS/ch1.xhtml", "<p>real</p>")
        .build();
    let epub = Epub::from_bytes_with(bytes, "ghost", quiet()).unwrap();
    assert_eq!(epub.last_error(), None);

    let mut iter = epub.iter(IterMode::Spine);
    assert_eq!(iter.current(), None);
    assert_eq!(iter.position(), Some(0));
    assert!(!iter.is_exhausted());
    assert!(iter.entry().is_none());

    let message = epub.last_error().unwrap();
    assert_eq!(message, Error::MissingResource("ghost".into()).to_string());

    assert_eq!(iter.advance(), Some(&b"<p>real</p>"[..]));
    assert_eq!(iter.position(), Some(1));
    // The latch keeps the last error until another one replaces it.
    assert_eq!(epub.last_error(), Some(message));
}

#[test]
fn test_missing_archive_entry_latches_error() {
    let bytes = EpubBuilder::three_chapters()
        .without("OEBPS/ch1.xhtml")
        .build();
    let epub = Epub::from_bytes_with(bytes, "hole", quiet()).unwrap();
    let mut iter = epub.iter(IterMode::Linear);

    assert_eq!(iter.current(), None);
    let message = epub.last_error().unwrap();
    assert!(message.contains("OEBPS/ch1.xhtml"), "{message}");
    assert!(iter.advance().unwrap().starts_with(b"<html>"));
}

#[test]
fn test_raw_entry() {
    let epub = book();
    assert_eq!(epub.raw_entry("mimetype").unwrap(), b"application/epub+zip");
    assert!(
        String::from_utf8(epub.raw_entry("META-INF/container.xml").unwrap())
            .unwrap()
            .contains("rootfile")
    );

    let err = epub.raw_entry("OEBPS/missing.css").unwrap_err();
    assert!(matches!(err, Error::ResourceRead { ref path, .. } if path == "OEBPS/missing.css"));
    assert!(epub.last_error().unwrap().contains("OEBPS/missing.css"));
}

#[test]
fn test_percent_encoded_href() {
    let package = opf(
        r#"<manifest><item id="a" href="chapter%20one.xhtml" media-type="application/xhtml+xml"/></manifest>
<spine><itemref idref="a"/></spine>"#,
    );
    let bytes = EpubBuilder::standard()
        .entry(OPF_PATH, package)
        .entry("OEBPS/chapter one.xhtml", "<p>spaced</p>")
        .build();
    let epub = Epub::from_bytes_with(bytes, "spaces", quiet()).unwrap();
    assert_eq!(epub.iter(IterMode::Spine).current(), Some(&b"<p>spaced</p>"[..]));
}
