//! Page-level drawing on top of a lopdf object graph.
//!
//! Coordinates passed in are measured from the top-left corner of the page;
//! conversion to PDF user space happens here.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::font::{Font, win_ansi};
use super::text::Line;
use crate::error::Result;
use crate::layout::Color;
use crate::util::{MediaFormat, detect_media_format, jpeg_frame};

/// A4 in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 72.0;

pub struct Canvas {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    operations: Vec<Operation>,
    annotations: Vec<Dictionary>,
    images: HashMap<PathBuf, Option<(String, ObjectId)>>,
    background: Color,
    /// Distance of the cursor from the top of the page.
    pub y: f32,
    page_open: bool,
}

impl Canvas {
    pub fn new(background: Color) -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();
        Self {
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            operations: Vec::new(),
            annotations: Vec::new(),
            images: HashMap::new(),
            background,
            y: MARGIN,
            page_open: false,
        }
    }

    pub fn top(&self) -> f32 {
        MARGIN
    }

    pub fn bottom(&self) -> f32 {
        PAGE_HEIGHT - MARGIN
    }

    /// Height available on an empty page.
    pub fn page_capacity(&self) -> f32 {
        self.bottom() - self.top()
    }

    pub fn remaining(&self) -> f32 {
        self.bottom() - self.y
    }

    /// Whether nothing has been drawn below the top margin yet.
    pub fn at_page_top(&self) -> bool {
        self.y <= self.top() + f32::EPSILON
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.page_open)
    }

    fn open_page(&mut self) {
        if self.page_open {
            return;
        }
        self.page_open = true;
        self.y = self.top();
        let background = self.background;
        self.fill_rect(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT, background);
    }

    /// Start a new page unless the current one is still empty.
    pub fn page_break(&mut self) -> Result<()> {
        if self.page_open && !self.at_page_top() {
            self.close_page()?;
        }
        self.open_page();
        Ok(())
    }

    /// Break the page when fewer than `height` points remain. A block taller
    /// than a whole page is started on the current page if it is still empty.
    pub fn ensure_space(&mut self, height: f32) -> Result<()> {
        self.open_page();
        if height > self.remaining() && !self.at_page_top() {
            self.close_page()?;
            self.open_page();
        }
        Ok(())
    }

    fn close_page(&mut self) -> Result<()> {
        let content = Content {
            operations: std::mem::take(&mut self.operations),
        };
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&content.encode()?)?;
        let compressed = encoder.finish()?;
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! { "Filter" => "FlateDecode" }, compressed));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        let annotations: Vec<Object> = std::mem::take(&mut self.annotations)
            .into_iter()
            .map(|annot| Object::Reference(self.document.add_object(annot)))
            .collect();
        if !annotations.is_empty() {
            page.set("Annots", annotations);
        }
        self.page_ids.push(self.document.add_object(page));
        self.page_open = false;
        Ok(())
    }

    fn set_fill(&mut self, color: Color) {
        let [r, g, b] = color.components();
        self.operations
            .push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
    }

    fn set_stroke(&mut self, color: Color) {
        let [r, g, b] = color.components();
        self.operations
            .push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
    }

    pub fn fill_rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: Color) {
        self.set_fill(color);
        self.operations.push(Operation::new(
            "re",
            vec![x.into(), (PAGE_HEIGHT - top - height).into(), width.into(), height.into()],
        ));
        self.operations.push(Operation::new("f", vec![]));
    }

    pub fn stroke_rect(&mut self, x: f32, top: f32, width: f32, height: f32, line_width: f32, color: Color) {
        self.operations.push(Operation::new("w", vec![line_width.into()]));
        self.set_stroke(color);
        self.operations.push(Operation::new(
            "re",
            vec![x.into(), (PAGE_HEIGHT - top - height).into(), width.into(), height.into()],
        ));
        self.operations.push(Operation::new("S", vec![]));
    }

    /// Draw a single run of text with its baseline `baseline` points below
    /// the top of the page.
    pub fn text(&mut self, x: f32, baseline: f32, text: &str, font: Font, size: f32, color: Color) {
        if text.is_empty() {
            return;
        }
        self.operations.push(Operation::new("BT", vec![]));
        self.operations.push(Operation::new(
            "Tf",
            vec![Object::Name(font.resource_name().as_bytes().to_vec()), size.into()],
        ));
        self.set_fill(color);
        self.operations.push(Operation::new(
            "Td",
            vec![x.into(), (PAGE_HEIGHT - baseline).into()],
        ));
        self.operations.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        ));
        self.operations.push(Operation::new("ET", vec![]));
    }

    /// Draw a broken line, adding a URI annotation over every linked run.
    pub fn line(&mut self, x: f32, baseline: f32, line: &Line, size: f32, default_color: Color) {
        let mut cursor = x;
        for run in &line.runs {
            let width = run.font.width(&run.text, size);
            self.text(cursor, baseline, &run.text, run.font, size, run.color.unwrap_or(default_color));
            if let Some(href) = &run.link {
                self.link(cursor, baseline - size * 0.8, width, size, href);
            }
            cursor += width;
        }
    }

    pub fn link(&mut self, x: f32, top: f32, width: f32, height: f32, href: &str) {
        let rect: Vec<Object> = vec![
            x.into(),
            (PAGE_HEIGHT - top - height).into(),
            (x + width).into(),
            (PAGE_HEIGHT - top).into(),
        ];
        let action = dictionary! {
            "S" => "URI",
            "URI" => Object::String(href.as_bytes().to_vec(), StringFormat::Literal),
        };
        self.annotations.push(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => rect,
            "Border" => vec![0.into(), 0.into(), 0.into()],
            "A" => action,
        });
    }

    /// Place the image at `path`. Returns false when the file cannot be
    /// embedded.
    pub fn image(&mut self, path: &Path, x: f32, top: f32, width: f32, height: f32) -> bool {
        let entry = match self.images.get(path) {
            Some(entry) => entry.clone(),
            None => {
                let embedded = match self.embed_image(path) {
                    Ok(id) => {
                        let name = format!("Im{}", self.images.len() + 1);
                        Some((name, id))
                    }
                    Err(e) => {
                        log::warn!("cannot embed image {}: {e}", path.display());
                        None
                    }
                };
                self.images.insert(path.to_path_buf(), embedded.clone());
                embedded
            }
        };
        let Some((name, _)) = entry else {
            return false;
        };
        self.operations.push(Operation::new("q", vec![]));
        self.operations.push(Operation::new(
            "cm",
            vec![
                width.into(),
                0.into(),
                0.into(),
                height.into(),
                x.into(),
                (PAGE_HEIGHT - top - height).into(),
            ],
        ));
        self.operations
            .push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        self.operations.push(Operation::new("Q", vec![]));
        true
    }

    fn embed_image(&mut self, path: &Path) -> Result<ObjectId> {
        let data = std::fs::read(path)?;
        let format = detect_media_format(&path.to_string_lossy(), &data);
        if !format.is_raster() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{format:?} is not a raster image: {}", path.display()),
            )
            .into());
        }

        if format == MediaFormat::Jpeg
            && let Some(frame) = jpeg_frame(&data)
            && frame.components != 4
        {
            let color_space = if frame.components == 1 {
                "DeviceGray"
            } else {
                "DeviceRGB"
            };
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(frame.width),
                    "Height" => i64::from(frame.height),
                    "ColorSpace" => color_space,
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                data,
            );
            return Ok(self.document.add_object(stream));
        }

        let rgb = image::load_from_memory(&data)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(rgb.as_raw())?;
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            encoder.finish()?,
        );
        Ok(self.document.add_object(stream))
    }

    /// Close the last page, wire up the page tree and write the document.
    pub fn finish<W: Write>(mut self, title: &str, writer: &mut W) -> Result<()> {
        if !self.page_open && self.page_ids.is_empty() {
            self.open_page();
        }
        if self.page_open {
            self.close_page()?;
        }

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let id = self.document.add_object(font.dictionary());
            fonts.set(font.resource_name(), id);
        }
        let mut resources = dictionary! { "Font" => fonts };
        let mut xobjects = Dictionary::new();
        for (name, id) in self.images.values().flatten() {
            xobjects.set(name.as_str(), *id);
        }
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }
        self.document
            .objects
            .insert(self.resources_id, Object::Dictionary(resources));

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);
        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::String(win_ansi(title), StringFormat::Literal),
            "Producer" => Object::string_literal(concat!("coursedown ", env!("CARGO_PKG_VERSION"))),
        });
        self.document.trailer.set("Info", info_id);

        self.document.save_to(writer)?;
        Ok(())
    }
}
