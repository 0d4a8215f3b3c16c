mod common;

use common::{EpubBuilder, OPF_PATH, captured, opf};
use libepub::{DebugLevel, Epub, IterMode};

fn noisy_book() -> Vec<u8> {
    // Duplicate id (warning), unknown metadata (info), unresolvable spine entry (error on read).
    let package = opf(
        r#"<metadata><x:shelf>7</x:shelf></metadata>
<manifest>
  <item id="a" href="a.xhtml" media-type="application/xhtml+xml"/>
  <item id="a" href="b.xhtml" media-type="application/xhtml+xml"/>
</manifest>
<spine toc="ncx"><itemref idref="a"/></spine>"#,
    );
    EpubBuilder::standard().entry(OPF_PATH, package).build()
}

#[test]
fn test_error_threshold_hides_warnings() {
    let (options, capture) = captured(DebugLevel::Error);
    let epub = Epub::from_bytes_with(noisy_book(), "noisy", options).unwrap();
    assert!(capture.text().is_empty(), "{}", capture.text());

    assert_eq!(epub.iter(IterMode::Spine).current(), None);
    let text = capture.text();
    assert!(text.starts_with("libepub (EE): \t"), "{text}");
    assert!(text.contains("OEBPS/a.xhtml"));
}

#[test]
fn test_warning_threshold_shows_warnings_only() {
    let (options, capture) = captured(DebugLevel::Warning);
    Epub::from_bytes_with(noisy_book(), "noisy", options).unwrap();

    let text = capture.text();
    assert!(text.contains("libepub (WW): \tduplicate manifest id a ignored (b.xhtml)"));
    assert!(text.contains("libepub (WW): \ttoc not found (ncx is not in the manifest)"));
    assert!(!text.contains("(II)"));
    assert!(!text.contains("(VV)"));
}

#[test]
fn test_info_threshold_shows_unknown_metadata() {
    let (options, capture) = captured(DebugLevel::Info);
    Epub::from_bytes_with(noisy_book(), "noisy", options).unwrap();

    let text = capture.text();
    assert!(text.contains("libepub (II): \tunsupported metadata element shelf: 7"));
    assert!(!text.contains("(VV)"));
}

#[test]
fn test_verbose_threshold_shows_everything() {
    let (options, capture) = captured(DebugLevel::Verbose);
    Epub::from_bytes_with(noisy_book(), "noisy", options).unwrap();

    let text = capture.text();
    assert!(text.contains("(WW)"));
    assert!(text.contains("(II)"));
    assert!(text.contains("libepub (VV): \tmanifest item a -> a.xhtml"));
}

#[test]
fn test_none_threshold_is_silent_but_latches() {
    let (options, capture) = captured(DebugLevel::None);
    let epub = Epub::from_bytes_with(noisy_book(), "noisy", options).unwrap();
    assert_eq!(epub.iter(IterMode::Spine).current(), None);

    assert!(capture.text().is_empty());
    assert!(epub.last_error().is_some());
}

#[test]
fn test_set_debug_after_open() {
    let (options, capture) = captured(DebugLevel::None);
    let epub = Epub::from_bytes_with(noisy_book(), "noisy", options).unwrap();
    assert_eq!(epub.debug_level(), DebugLevel::None);

    epub.set_debug(DebugLevel::Error);
    assert!(epub.raw_entry("nowhere").is_err());
    assert!(capture.text().contains("libepub (EE): \tcannot read nowhere"));
}

#[test]
fn test_last_error_copy_is_independent() {
    let (options, _capture) = captured(DebugLevel::None);
    let epub = Epub::from_bytes_with(noisy_book(), "noisy", options).unwrap();
    assert!(epub.raw_entry("first").is_err());

    let mut copy = epub.last_error().unwrap();
    copy.clear();
    assert!(epub.last_error().unwrap().contains("first"));

    assert!(epub.raw_entry("second").is_err());
    let latest = epub.last_error().unwrap();
    assert!(latest.contains("second") && !latest.contains("first"));
}
