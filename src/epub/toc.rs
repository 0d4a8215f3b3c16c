//! Minimal NCX navigation reader.
//!
//! Produces a flat, depth-annotated list of navigation points. Nothing
//! beyond id, play order, depth, label and target is interpreted.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::xml::{self, Child};
use crate::error::Result;

/// One `<navPoint>` of the navigation map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavPoint {
    pub id: Option<String>,
    pub play_order: Option<usize>,
    /// Nesting level, 0 for top-level points.
    pub depth: usize,
    pub label: String,
    /// `content@src`, relative to the NCX document.
    pub src: Option<String>,
}

/// Read the `navMap` of an NCX document.
///
/// Points come out in document (pre-)order, then are stably sorted by
/// `play_order` when every point carries one.
pub fn parse_ncx(text: &str) -> Result<Vec<NavPoint>> {
    let mut reader = xml::reader(text);
    let mut points = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if xml::local_name(e.name().as_ref()).eq_ignore_ascii_case(b"navMap") => {
                xml::each_child(&mut reader, |r, child| {
                    if child.local == "navpoint" {
                        nav_point(r, &child, 0, &mut points)
                    } else {
                        child.skip(r)
                    }
                })?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if points.iter().all(|p| p.play_order.is_some()) {
        points.sort_by_key(|p| p.play_order);
    }
    Ok(points)
}

fn nav_point(
    reader: &mut Reader<&[u8]>,
    point: &Child,
    depth: usize,
    out: &mut Vec<NavPoint>,
) -> Result<()> {
    // Reserve the slot first so parents precede their children.
    let slot = out.len();
    out.push(NavPoint {
        id: point.attrs.owned("id"),
        play_order: point
            .attrs
            .get("playOrder")
            .and_then(|v| v.trim().parse().ok()),
        depth,
        ..Default::default()
    });

    if !point.has_body {
        return Ok(());
    }
    xml::each_child(reader, |r, part| match part.local.as_str() {
        "navlabel" => {
            let label = part.text(r)?;
            if out[slot].label.is_empty() {
                out[slot].label = label;
            }
            Ok(())
        }
        "content" => {
            part.skip(r)?;
            out[slot].src = part.attrs.owned("src");
            Ok(())
        }
        "navpoint" => nav_point(r, &part, depth + 1, out),
        _ => part.skip(r),
    })
}
