//! Flowable layout: measuring, pagination and drawing.

use std::io::Write;
use std::path::Path;

use super::DocumentBuilder;
use super::canvas::{Canvas, MARGIN, PAGE_WIDTH};
use super::font::Font;
use super::text::{Line, break_lines};
use crate::error::Result;
use crate::layout::{
    CODE_BACKGROUND, CODE_BORDER, CodeLine, Color, Flowable, ListItem, MAX_CONTENT_WIDTH, RichText,
    SpanStyle, TABLE_GRID, TABLE_ROW_ALT, Theme, line_text,
};

const INCH: f32 = 72.0;

/// Width between the side margins.
pub const FRAME_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const BODY_TEXT: Color = Color::BLACK;

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    leading: f32,
    space_after: f32,
}

const TITLE: TextStyle = TextStyle {
    size: 22.0,
    leading: 26.0,
    space_after: 0.08 * INCH,
};
const HEADING: TextStyle = TextStyle {
    size: 16.0,
    leading: 20.0,
    space_after: 0.06 * INCH,
};
const SUBHEADING: TextStyle = TextStyle {
    size: 13.0,
    leading: 17.0,
    space_after: 0.04 * INCH,
};
const BODY: TextStyle = TextStyle {
    size: 11.0,
    leading: 15.0,
    space_after: 4.0,
};
const TABLE_TEXT: TextStyle = TextStyle {
    size: 10.0,
    leading: 13.0,
    space_after: 0.3 * INCH,
};

const LIST_INDENT: f32 = 20.0;
const LIST_ITEM_GAP: f32 = 2.0;
const LIST_SPACE: f32 = 0.1 * INCH;
const CELL_PADDING: f32 = 4.0;
const IMAGE_SPACE: f32 = 0.2 * INCH;

const CODE_SIZE: f32 = 9.0;
const CODE_LEADING: f32 = 11.0;
const CODE_MIN_SIZE: f32 = 6.0;
const CODE_BAR: f32 = 12.0;
const CODE_PAD_X: f32 = 8.0;
const CODE_PAD_Y: f32 = 6.0;
const CODE_CHUNK_LINES: usize = 50;
const CODE_SPACE: f32 = 0.1 * INCH;

const CALLOUT_BAR: f32 = 12.0;
const CALLOUT_PAD_X: f32 = 8.0;
const CALLOUT_PAD_Y: f32 = 6.0;
const CALLOUT_SPACE: f32 = 0.1 * INCH;

/// Lopdf-backed document builder.
///
/// A renderer holds no per-document state and can build any number of
/// documents with its theme.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    theme: Theme,
}

impl PdfRenderer {
    pub fn init(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Lay `flowables` out and write the PDF. Returns the page count.
    pub fn render<W: Write>(&self, title: &str, flowables: &[Flowable], writer: &mut W) -> Result<usize> {
        let mut canvas = Canvas::new(self.theme.page_background);
        self.draw(&mut canvas, flowables, MARGIN, FRAME_WIDTH)?;
        let pages = canvas.page_count().max(1);
        canvas.finish(title, writer)?;
        log::debug!("wrote {pages} PDF pages for {title:?}");
        Ok(pages)
    }

    fn draw(&self, canvas: &mut Canvas, flows: &[Flowable], x: f32, width: f32) -> Result<()> {
        for flow in flows {
            self.draw_one(canvas, flow, x, width)?;
        }
        Ok(())
    }

    fn draw_one(&self, canvas: &mut Canvas, flow: &Flowable, x: f32, width: f32) -> Result<()> {
        match flow {
            Flowable::Title(text) => self.draw_heading(canvas, text, TITLE, self.theme.title, x, width),
            Flowable::Heading(text) => self.draw_heading(canvas, text, HEADING, self.theme.heading, x, width),
            Flowable::Subheading(text) => {
                self.draw_heading(canvas, text, SUBHEADING, self.theme.heading, x, width)
            }
            Flowable::Paragraph(rich) => {
                let lines = break_lines(rich, BODY.size, width, None);
                draw_lines(canvas, &lines, x, BODY, BODY_TEXT)?;
                canvas.y += BODY.space_after;
                Ok(())
            }
            Flowable::BulletList(items) => self.draw_list(canvas, items, false, x, width),
            Flowable::NumberedList(items) => self.draw_list(canvas, items, true, x, width),
            Flowable::Table(rows) => self.draw_table(canvas, rows, x, width),
            Flowable::Image { path, width: w, height: h } => {
                self.draw_image(canvas, path, (*w, *h), x, width)
            }
            Flowable::CodeBlock(lines) => draw_code(canvas, lines, x, width),
            Flowable::Callout(body) => self.draw_callout(canvas, body, x, width),
            Flowable::Spacer(height) => {
                canvas.y = (canvas.y + height).min(canvas.bottom());
                Ok(())
            }
            Flowable::PageBreak => canvas.page_break(),
        }
    }

    fn draw_heading(
        &self,
        canvas: &mut Canvas,
        text: &str,
        style: TextStyle,
        color: Color,
        x: f32,
        width: f32,
    ) -> Result<()> {
        let lines = break_lines(&RichText::bold(text), style.size, width, None);
        // Keep the heading with the first lines of what follows.
        canvas.ensure_space(lines.len() as f32 * style.leading + 2.0 * BODY.leading)?;
        draw_lines(canvas, &lines, x, style, color)?;
        canvas.y += style.space_after;
        Ok(())
    }

    fn draw_list(&self, canvas: &mut Canvas, items: &[ListItem], numbered: bool, x: f32, width: f32) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            let lead = item
                .content
                .first()
                .map_or(BODY.leading, |first| self.lead_height(first, width - LIST_INDENT));
            canvas.ensure_space(lead.min(canvas.page_capacity()))?;

            let baseline = canvas.y + BODY.size;
            if numbered {
                let marker = match &item.marker {
                    Some(marker) => format!("{marker}."),
                    None => format!("{}.", i + 1),
                };
                canvas.text(x, baseline, &marker, Font::Regular, BODY.size, BODY_TEXT);
            } else {
                canvas.text(x + 4.0, baseline, "\u{2022}", Font::Regular, BODY.size, self.theme.heading);
            }

            if item.content.is_empty() {
                canvas.y += BODY.leading;
            } else {
                self.draw(canvas, &item.content, x + LIST_INDENT, width - LIST_INDENT)?;
            }
            canvas.y += LIST_ITEM_GAP;
        }
        canvas.y += LIST_SPACE;
        Ok(())
    }

    fn table_layout(&self, rows: &[Vec<RichText>], width: f32) -> Option<TableLayout> {
        let columns = rows.iter().map(Vec::len).max().filter(|&n| n > 0)?;
        let table_width = width.min(MAX_CONTENT_WIDTH);
        let column_width = table_width / columns as f32;
        let header_color = self.theme.table_header_text();

        let rows = rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let cells: Vec<Vec<Line>> = (0..columns)
                    .map(|c| {
                        let cell = row.get(c).cloned().unwrap_or_default();
                        if r == 0 {
                            break_lines(&emboldened(&cell), TABLE_TEXT.size, column_width - 2.0 * CELL_PADDING, Some(header_color))
                        } else {
                            break_lines(&cell, TABLE_TEXT.size, column_width - 2.0 * CELL_PADDING, None)
                        }
                    })
                    .collect();
                let tallest = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
                let height = tallest as f32 * TABLE_TEXT.leading + 2.0 * CELL_PADDING;
                (cells, height)
            })
            .collect();
        Some(TableLayout {
            column_width,
            table_width,
            rows,
        })
    }

    fn draw_table(&self, canvas: &mut Canvas, rows: &[Vec<RichText>], x: f32, width: f32) -> Result<()> {
        let Some(table) = self.table_layout(rows, width) else {
            return Ok(());
        };
        for (r, (cells, height)) in table.rows.iter().enumerate() {
            let pages_before = canvas.page_count();
            canvas.ensure_space(*height)?;
            if r > 0 && canvas.page_count() != pages_before {
                let (header, header_height) = &table.rows[0];
                self.draw_row(canvas, &table, header, *header_height, 0, x);
            }
            self.draw_row(canvas, &table, cells, *height, r, x);
        }
        canvas.y += TABLE_TEXT.space_after;
        Ok(())
    }

    fn draw_row(&self, canvas: &mut Canvas, table: &TableLayout, cells: &[Vec<Line>], height: f32, r: usize, x: f32) {
        let top = canvas.y;
        let background = match r {
            0 => self.theme.table_header_background,
            r if r % 2 == 0 => TABLE_ROW_ALT,
            _ => Color::WHITE,
        };
        canvas.fill_rect(x, top, table.table_width, height, background);
        for (c, lines) in cells.iter().enumerate() {
            let cell_x = x + c as f32 * table.column_width;
            canvas.stroke_rect(cell_x, top, table.column_width, height, 0.5, TABLE_GRID);
            for (k, line) in lines.iter().enumerate() {
                let baseline = top + CELL_PADDING + k as f32 * TABLE_TEXT.leading + TABLE_TEXT.size;
                canvas.line(cell_x + CELL_PADDING, baseline, line, TABLE_TEXT.size, BODY_TEXT);
            }
        }
        canvas.y = top + height;
    }

    fn draw_image(&self, canvas: &mut Canvas, path: &Path, natural: (u32, u32), x: f32, width: f32) -> Result<()> {
        let (w, h) = image_size(natural, width, canvas.page_capacity());
        canvas.ensure_space(h)?;
        let left = x + (width - w) / 2.0;
        if canvas.image(path, left, canvas.y, w, h) {
            canvas.y += h + IMAGE_SPACE;
            Ok(())
        } else {
            let name = path.file_name().map_or_else(String::new, |n| n.to_string_lossy().into_owned());
            let note = RichText::styled(format!("Image unavailable: {name}"), SpanStyle::ITALIC);
            let lines = break_lines(&note, BODY.size, width, None);
            draw_lines(canvas, &lines, x, BODY, BODY_TEXT)?;
            canvas.y += IMAGE_SPACE;
            Ok(())
        }
    }

    fn draw_callout(&self, canvas: &mut Canvas, body: &[Flowable], x: f32, width: f32) -> Result<()> {
        let box_width = width.min(MAX_CONTENT_WIDTH);
        let inner_x = x + CALLOUT_BAR + CALLOUT_PAD_X;
        let inner_width = box_width - CALLOUT_BAR - 2.0 * CALLOUT_PAD_X;
        let height = self.measure(body, inner_width) + 2.0 * CALLOUT_PAD_Y;

        canvas.y += CALLOUT_SPACE;
        if height <= canvas.page_capacity() {
            canvas.ensure_space(height)?;
            let top = canvas.y;
            canvas.fill_rect(x, top, box_width, height, self.theme.callout_background);
            canvas.fill_rect(x, top, CALLOUT_BAR, height, self.theme.callout_border);
            canvas.y += CALLOUT_PAD_Y;
            self.draw(canvas, body, inner_x, inner_width)?;
            canvas.y = top + height;
        } else {
            // Too tall for one page: flow the body unboxed at the same indent.
            self.draw(canvas, body, inner_x, inner_width)?;
        }
        canvas.y += CALLOUT_SPACE;
        Ok(())
    }

    /// Height `flows` take up when drawn at `width` without a page break.
    fn measure(&self, flows: &[Flowable], width: f32) -> f32 {
        flows.iter().map(|flow| self.measure_one(flow, width)).sum()
    }

    fn measure_one(&self, flow: &Flowable, width: f32) -> f32 {
        let heading = |text: &str, style: TextStyle| {
            break_lines(&RichText::bold(text), style.size, width, None).len() as f32 * style.leading
                + style.space_after
        };
        match flow {
            Flowable::Title(text) => heading(text, TITLE),
            Flowable::Heading(text) => heading(text, HEADING),
            Flowable::Subheading(text) => heading(text, SUBHEADING),
            Flowable::Paragraph(rich) => {
                break_lines(rich, BODY.size, width, None).len() as f32 * BODY.leading + BODY.space_after
            }
            Flowable::BulletList(items) | Flowable::NumberedList(items) => {
                let items: f32 = items
                    .iter()
                    .map(|item| {
                        let content = if item.content.is_empty() {
                            BODY.leading
                        } else {
                            self.measure(&item.content, width - LIST_INDENT)
                        };
                        content + LIST_ITEM_GAP
                    })
                    .sum();
                items + LIST_SPACE
            }
            Flowable::Table(rows) => self.table_layout(rows, width).map_or(0.0, |table| {
                table.rows.iter().map(|(_, h)| h).sum::<f32>() + TABLE_TEXT.space_after
            }),
            Flowable::Image { width: w, height: h, .. } => {
                image_size((*w, *h), width, f32::INFINITY).1 + IMAGE_SPACE
            }
            Flowable::CodeBlock(lines) => {
                let (_, leading) = code_metrics(lines, width);
                let chunks = lines.len().div_ceil(CODE_CHUNK_LINES);
                lines.len() as f32 * leading + chunks as f32 * 2.0 * CODE_PAD_Y + CODE_SPACE
            }
            Flowable::Callout(body) => {
                let inner_width = width.min(MAX_CONTENT_WIDTH) - CALLOUT_BAR - 2.0 * CALLOUT_PAD_X;
                self.measure(body, inner_width) + 2.0 * CALLOUT_PAD_Y + 2.0 * CALLOUT_SPACE
            }
            Flowable::Spacer(height) => *height,
            Flowable::PageBreak => 0.0,
        }
    }

    /// Height of the part of `flow` that cannot be split across pages.
    fn lead_height(&self, flow: &Flowable, width: f32) -> f32 {
        match flow {
            Flowable::Title(_) => TITLE.leading,
            Flowable::Heading(_) => HEADING.leading,
            Flowable::Subheading(_) => SUBHEADING.leading,
            Flowable::Image { .. } | Flowable::Callout(_) => self.measure_one(flow, width),
            Flowable::CodeBlock(_) => CODE_LEADING + 2.0 * CODE_PAD_Y,
            _ => BODY.leading,
        }
    }
}

impl DocumentBuilder for PdfRenderer {
    fn build<W: Write>(&self, title: &str, flowables: &[Flowable], writer: &mut W) -> Result<()> {
        self.render(title, flowables, writer).map(|_| ())
    }
}

struct TableLayout {
    column_width: f32,
    table_width: f32,
    rows: Vec<(Vec<Vec<Line>>, f32)>,
}

fn emboldened(cell: &RichText) -> RichText {
    let mut bold = RichText::new();
    for span in &cell.spans {
        bold.push(
            span.text.clone(),
            SpanStyle {
                bold: true,
                ..span.style
            },
            span.link.clone(),
        );
    }
    bold
}

fn draw_lines(canvas: &mut Canvas, lines: &[Line], x: f32, style: TextStyle, color: Color) -> Result<()> {
    for line in lines {
        canvas.ensure_space(style.leading)?;
        let baseline = canvas.y + style.size;
        canvas.line(x, baseline, line, style.size, color);
        canvas.y += style.leading;
    }
    Ok(())
}

/// Natural size in points, narrowed to the content width and shrunk to fit
/// `max_height`.
fn image_size((w, h): (u32, u32), width: f32, max_height: f32) -> (f32, f32) {
    let natural_w = w.max(1) as f32;
    let natural_h = h.max(1) as f32;
    let mut out_w = natural_w.min(width.min(MAX_CONTENT_WIDTH));
    let mut out_h = out_w * natural_h / natural_w;
    if out_h > max_height {
        out_w *= max_height / out_h;
        out_h = max_height;
    }
    (out_w, out_h)
}

/// Font size and leading for a code box: shrunk below 9pt when the longest
/// line would not fit the box.
fn code_metrics(lines: &[CodeLine], width: f32) -> (f32, f32) {
    let inner = width.min(MAX_CONTENT_WIDTH) - CODE_BAR - 2.0 * CODE_PAD_X;
    let longest = lines.iter().map(|l| line_text(l).chars().count()).max().unwrap_or(0);
    if longest == 0 {
        return (CODE_SIZE, CODE_LEADING);
    }
    let size = (inner / (longest as f32 * 0.6)).clamp(CODE_MIN_SIZE, CODE_SIZE);
    (size, size * CODE_LEADING / CODE_SIZE)
}

fn draw_code(canvas: &mut Canvas, lines: &[CodeLine], x: f32, width: f32) -> Result<()> {
    let box_width = width.min(MAX_CONTENT_WIDTH);
    let (size, leading) = code_metrics(lines, width);
    let mut rest = lines;

    while !rest.is_empty() {
        canvas.ensure_space(leading + 2.0 * CODE_PAD_Y)?;
        let fit = ((canvas.remaining() - 2.0 * CODE_PAD_Y) / leading).floor().max(1.0) as usize;
        let count = fit.min(CODE_CHUNK_LINES).min(rest.len());
        let (chunk, tail) = rest.split_at(count);

        let top = canvas.y;
        let height = count as f32 * leading + 2.0 * CODE_PAD_Y;
        canvas.fill_rect(x, top, box_width, height, CODE_BACKGROUND);
        canvas.fill_rect(x, top, CODE_BAR, height, CODE_BORDER);
        for (k, line) in chunk.iter().enumerate() {
            let baseline = top + CODE_PAD_Y + k as f32 * leading + size;
            let mut cursor = x + CODE_BAR + CODE_PAD_X;
            for token in line {
                let color = token.kind.color().unwrap_or(BODY_TEXT);
                canvas.text(cursor, baseline, &token.text, Font::Mono, size, color);
                cursor += Font::Mono.width(&token.text, size);
            }
        }
        canvas.y = top + height;
        rest = tail;
    }
    canvas.y += CODE_SPACE;
    Ok(())
}
