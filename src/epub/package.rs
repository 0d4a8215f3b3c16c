//! OPF package document parsing.
//!
//! A single forward pass over the document: the top loop dispatches each
//! child of `<package>` by local name and every section reader consumes
//! exactly its own subtree before returning.

use std::fmt;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::guide::{GuideRef, Site, Tour};
use super::manifest::{Manifest, ManifestEntry};
use super::metadata::{Creator, Date, Identifier, Meta, Metadata, MetadataField};
use super::spine::{Spine, SpineItem};
use super::xml::{self, Attrs, Child, OPF_NS};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::util::resolve_href;

/// The parsed package document.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub(crate) metadata: Metadata,
    pub(crate) manifest: Manifest,
    pub(crate) spine: Spine,
    pub(crate) toc_id: Option<String>,
    pub(crate) guide: Option<Vec<GuideRef>>,
    pub(crate) tours: Option<Vec<Tour>>,
    pub(crate) base: String,
    pub(crate) version: Option<String>,
    pub(crate) unique_identifier: Option<String>,
}

/// State shared by the section readers.
struct Context<'d> {
    diag: &'d Diagnostics,
    /// Prefix bound to the OPF namespace, `opf` unless declared otherwise.
    opf: String,
}

impl Package {
    /// Parse a package document whose directory inside the archive is
    /// `base` (empty or ending in `/`).
    pub fn parse(text: &str, base: &str, diag: &Diagnostics) -> Result<Self> {
        let mut reader = xml::reader(text);
        parse_package(&mut reader, base, diag).map_err(|e| match e {
            Error::Xml(e) => Error::PackageParse(e.to_string()),
            other => other,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn spine(&self) -> &Spine {
        &self.spine
    }

    /// Manifest id of the navigation document, when `spine@toc` resolved.
    pub fn toc_id(&self) -> Option<&str> {
        self.toc_id.as_deref()
    }

    /// Manifest entry of the navigation document.
    pub fn toc_entry(&self) -> Option<&ManifestEntry> {
        self.toc_id.as_deref().and_then(|id| self.manifest.get(id))
    }

    /// `None` when the document has no `<guide>` section.
    pub fn guide(&self) -> Option<&[GuideRef]> {
        self.guide.as_deref()
    }

    /// `None` when the document has no `<tours>` section.
    pub fn tours(&self) -> Option<&[Tour]> {
        self.tours.as_deref()
    }

    /// Directory of the package document inside the archive.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Value of `package@unique-identifier` (an identifier's element id).
    pub fn unique_identifier(&self) -> Option<&str> {
        self.unique_identifier.as_deref()
    }

    /// Archive path of an href relative to the package document.
    pub fn resolve(&self, href: &str) -> String {
        resolve_href(&self.base, href)
    }

    /// Write a human-readable summary of every section.
    pub fn dump(&self, out: &mut impl fmt::Write) -> fmt::Result {
        if let Some(version) = &self.version {
            writeln!(out, "version:\t {version}")?;
        }
        for field in MetadataField::ALL {
            let values = self.metadata.field(field);
            if values.is_empty() {
                continue;
            }
            writeln!(out, "{}(s):", field.label())?;
            for value in values {
                writeln!(out, "   {value}")?;
            }
        }

        writeln!(out, "manifest ({} items):", self.manifest.len())?;
        for entry in &self.manifest {
            writeln!(out, "   {}: {} ({})", entry.id, entry.href, entry.media_type)?;
        }

        write!(
            out,
            "spine ({} items, {} linear):",
            self.spine.len(),
            self.spine.linear_count()
        )?;
        for item in &self.spine {
            let mark = if item.linear { "(L)" } else { "" };
            write!(out, " {}{mark}", item.idref)?;
        }
        writeln!(out)?;

        match self.toc_entry() {
            Some(entry) => writeln!(out, "toc:\t {} -> {}", entry.id, entry.href)?,
            None => writeln!(out, "toc:\t none")?,
        }

        if let Some(guide) = &self.guide {
            writeln!(out, "guide:")?;
            for reference in guide {
                writeln!(
                    out,
                    "   {} -> {}({})",
                    reference.href,
                    reference.title.as_deref().unwrap_or_default(),
                    reference.ref_type
                )?;
            }
        }

        if let Some(tours) = &self.tours {
            for tour in tours {
                writeln!(
                    out,
                    "tour {}({}):",
                    tour.title.as_deref().unwrap_or_default(),
                    tour.id
                )?;
                for site in &tour.sites {
                    writeln!(
                        out,
                        "   site: {}({})",
                        site.title.as_deref().unwrap_or_default(),
                        site.href
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn package_error(e: quick_xml::Error) -> Error {
    Error::PackageParse(e.to_string())
}

fn parse_package(reader: &mut Reader<&[u8]>, base: &str, diag: &Diagnostics) -> Result<Package> {
    let mut package = Package {
        base: base.to_string(),
        ..Default::default()
    };

    let (attrs, has_body) = loop {
        match reader.read_event().map_err(package_error)? {
            Event::Start(e) => break (root_attrs(&e)?, true),
            Event::Empty(e) => break (root_attrs(&e)?, false),
            Event::Eof => return Err(Error::PackageParse("no package element".to_string())),
            _ => {}
        }
    };

    package.version = attrs.owned("version");
    package.unique_identifier = attrs.owned("unique-identifier");
    let mut ctx = Context {
        diag,
        opf: attrs.prefix_for(OPF_NS).unwrap_or("opf").to_string(),
    };

    if has_body {
        xml::each_child(reader, |r, child| {
            match child.local.as_str() {
                "metadata" => {
                    let outer = std::mem::take(&mut ctx.opf);
                    ctx.opf = child.attrs.prefix_for(OPF_NS).unwrap_or(&outer).to_string();
                    if child.has_body {
                        parse_metadata(r, &ctx, &mut package.metadata)?;
                    }
                    ctx.opf = outer;
                }
                "manifest" => {
                    if child.has_body {
                        parse_manifest(r, &ctx, &mut package.manifest)?;
                    }
                }
                "spine" => parse_spine(r, &child, &ctx, &mut package)?,
                "guide" => {
                    let guide = package.guide.get_or_insert_with(Vec::new);
                    if child.has_body {
                        parse_guide(r, guide)?;
                    }
                }
                "tours" => {
                    let tours = package.tours.get_or_insert_with(Vec::new);
                    if child.has_body {
                        parse_tours(r, tours)?;
                    }
                }
                other => {
                    ctx.diag.verbose(format_args!("skipping <{other}> in package"));
                    child.skip(r)?;
                }
            }
            Ok(())
        })?;
    }
    expect_document_end(reader)?;

    for item in &package.spine {
        if !package.manifest.contains(&item.idref) {
            diag.warn(format_args!(
                "spine item {} has no manifest entry",
                item.idref
            ));
        }
    }

    diag.info(format_args!(
        "package parsed: {} manifest items, {} spine items ({} linear)",
        package.manifest.len(),
        package.spine.len(),
        package.spine.linear_count()
    ));
    Ok(package)
}

/// Only comments, processing instructions and whitespace may follow the
/// root element.
fn expect_document_end(reader: &mut Reader<&[u8]>) -> Result<()> {
    loop {
        match reader.read_event().map_err(package_error)? {
            Event::Eof => return Ok(()),
            Event::Start(e) | Event::Empty(e) => {
                return Err(Error::PackageParse(format!(
                    "element <{}> after the package element",
                    String::from_utf8_lossy(e.name().as_ref())
                )));
            }
            Event::Text(t) if !t.iter().all(u8::is_ascii_whitespace) => {
                return Err(Error::PackageParse(
                    "text after the package element".to_string(),
                ));
            }
            Event::CData(_) | Event::GeneralRef(_) => {
                return Err(Error::PackageParse(
                    "text after the package element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

fn root_attrs(e: &BytesStart<'_>) -> Result<Attrs> {
    let name = e.name();
    if xml::local_name(name.as_ref()).eq_ignore_ascii_case(b"package") {
        Ok(Attrs::of(e))
    } else {
        Err(Error::PackageParse(format!(
            "root element is <{}>, expected <package>",
            String::from_utf8_lossy(name.as_ref())
        )))
    }
}

fn parse_metadata(reader: &mut Reader<&[u8]>, ctx: &Context<'_>, meta: &mut Metadata) -> Result<()> {
    let opf = ctx.opf.as_str();

    xml::each_child(reader, |r, child| {
        let attrs = &child.attrs;
        match child.local.as_str() {
            // OEBPS 1.x wrappers
            "dc-metadata" | "x-metadata" => {
                if child.has_body {
                    parse_metadata(r, ctx, meta)?;
                }
            }
            "identifier" => meta.identifiers.push(Identifier {
                value: child.text(r)?,
                scheme: attrs.get_ns(opf, "scheme").map(str::to_owned),
                id: attrs.owned("id"),
            }),
            "title" => meta.titles.push(child.text(r)?),
            "creator" => meta.creators.push(creator(r, &child, opf)?),
            "contributor" => meta.contributors.push(creator(r, &child, opf)?),
            "subject" => meta.subjects.push(child.text(r)?),
            "publisher" => meta.publishers.push(child.text(r)?),
            "description" => meta.descriptions.push(child.text(r)?),
            "date" => meta.dates.push(Date {
                value: child.text(r)?,
                event: attrs.get_ns(opf, "event").map(str::to_owned),
            }),
            "type" => meta.types.push(child.text(r)?),
            "format" => meta.formats.push(child.text(r)?),
            "source" => meta.sources.push(child.text(r)?),
            "language" => meta.languages.push(child.text(r)?),
            "relation" => meta.relations.push(child.text(r)?),
            "coverage" => meta.coverages.push(child.text(r)?),
            "rights" => meta.rights.push(child.text(r)?),
            "meta" => {
                if let Some(name) = attrs.owned("name") {
                    child.skip(r)?;
                    meta.metas.push(Meta {
                        name,
                        content: attrs.owned("content").unwrap_or_default(),
                    });
                } else if let Some(name) = attrs.owned("property") {
                    meta.metas.push(Meta {
                        name,
                        content: child.text(r)?,
                    });
                } else {
                    child.skip(r)?;
                    ctx.diag.info("meta without name or property ignored");
                }
            }
            other => {
                let text = child.text(r)?;
                if !text.is_empty() {
                    ctx.diag
                        .info(format_args!("unsupported metadata element {other}: {text}"));
                }
            }
        }
        Ok(())
    })
}

fn creator(reader: &mut Reader<&[u8]>, child: &Child, opf: &str) -> Result<Creator> {
    Ok(Creator {
        name: child.text(reader)?,
        file_as: child.attrs.get_ns(opf, "file-as").map(str::to_owned),
        role: child.attrs.get_ns(opf, "role").map(str::to_owned),
    })
}

fn parse_manifest(
    reader: &mut Reader<&[u8]>,
    ctx: &Context<'_>,
    manifest: &mut Manifest,
) -> Result<()> {
    xml::each_child(reader, |r, child| {
        child.skip(r)?;
        if child.local != "item" {
            return Ok(());
        }

        let attrs = &child.attrs;
        let Some(id) = attrs.owned("id") else {
            ctx.diag.warn(format_args!(
                "manifest item without id skipped ({})",
                attrs.get("href").unwrap_or("-")
            ));
            return Ok(());
        };
        let entry = ManifestEntry {
            id,
            href: attrs.owned("href").unwrap_or_default(),
            media_type: attrs.owned("media-type").unwrap_or_default(),
            fallback: attrs.owned("fallback"),
            fallback_style: attrs.owned("fallback-style"),
            required_namespace: attrs.owned("required-namespace"),
            required_modules: attrs.owned("required-modules"),
        };
        ctx.diag
            .verbose(format_args!("manifest item {} -> {}", entry.id, entry.href));
        if let Err(duplicate) = manifest.insert(entry) {
            ctx.diag.warn(format_args!(
                "duplicate manifest id {} ignored ({})",
                duplicate.id, duplicate.href
            ));
        }
        Ok(())
    })
}

fn parse_spine(
    reader: &mut Reader<&[u8]>,
    spine: &Child,
    ctx: &Context<'_>,
    package: &mut Package,
) -> Result<()> {
    match spine.attrs.get("toc") {
        None => ctx.diag.warn("toc not found (-)"),
        Some(toc) if package.manifest.contains(toc) => {
            ctx.diag.verbose(format_args!("toc is {toc}"));
            package.toc_id = Some(toc.to_string());
        }
        Some(toc) => {
            ctx.diag
                .warn(format_args!("toc not found ({toc} is not in the manifest)"));
        }
    }

    if !spine.has_body {
        return Ok(());
    }
    xml::each_child(reader, |r, child| {
        child.skip(r)?;
        if child.local != "itemref" {
            return Ok(());
        }
        match child.attrs.owned("idref") {
            Some(idref) => {
                let linear = SpineItem::parse_linear(child.attrs.get("linear"));
                package.spine.push(SpineItem::new(idref, linear));
            }
            None => ctx.diag.warn("spine itemref without idref skipped"),
        }
        Ok(())
    })
}

fn parse_guide(reader: &mut Reader<&[u8]>, guide: &mut Vec<GuideRef>) -> Result<()> {
    xml::each_child(reader, |r, child| {
        child.skip(r)?;
        if child.local == "reference" {
            guide.push(GuideRef {
                ref_type: child.attrs.owned("type").unwrap_or_default(),
                title: child.attrs.owned("title"),
                href: child.attrs.owned("href").unwrap_or_default(),
            });
        }
        Ok(())
    })
}

fn parse_tours(reader: &mut Reader<&[u8]>, tours: &mut Vec<Tour>) -> Result<()> {
    xml::each_child(reader, |r, child| {
        if child.local != "tour" {
            return child.skip(r);
        }

        let mut tour = Tour {
            id: child.attrs.owned("id").unwrap_or_default(),
            title: child.attrs.owned("title"),
            sites: Vec::new(),
        };
        if child.has_body {
            xml::each_child(r, |r, site| {
                site.skip(r)?;
                if site.local == "site" {
                    tour.sites.push(Site {
                        title: site.attrs.owned("title"),
                        href: site.attrs.owned("href").unwrap_or_default(),
                    });
                }
                Ok(())
            })?;
        }
        tours.push(tour);
        Ok(())
    })
}
