use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use super::layout::{Align, Block, Cell, FontStyle, ReportLayout, Row, Tone, CONTENT_WIDTH_MM};
use crate::error::{Result, SysReportError};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const BANNER_HEIGHT_MM: f32 = 10.0;
const SECTION_HEIGHT_MM: f32 = 10.0;
const PT_TO_MM: f32 = 0.3528;
/// Rough average glyph width of Helvetica as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;
const CELL_PAD_MM: f32 = 1.5;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let load = |font: BuiltinFont| doc.add_builtin_font(font).map_err(|e| SysReportError::Render(e.to_string()));
        Ok(Self {
            regular: load(BuiltinFont::Helvetica)?,
            bold: load(BuiltinFont::HelveticaBold)?,
            italic: load(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

/// Paints a layout top to bottom, starting a new page when the next block
/// would cross the bottom margin.
struct Painter<'a> {
    doc: &'a PdfDocumentReference,
    fonts: Fonts,
    layer: PdfLayerReference,
    /// Distance of the cursor from the top edge of the page.
    cursor: f32,
    pages: usize,
}

impl<'a> Painter<'a> {
    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = MARGIN_MM;
    }

    fn fits(&self, height: f32) -> bool {
        self.cursor + height <= PAGE_HEIGHT_MM - MARGIN_MM
    }

    fn text(&self, text: &str, size: f32, style: FontStyle, x: f32, baseline_from_top: f32) {
        self.layer.use_text(
            text,
            size,
            Mm(x),
            Mm(PAGE_HEIGHT_MM - baseline_from_top),
            self.fonts.get(style),
        );
    }

    fn rect(&self, x: f32, width: f32, height: f32) {
        let top = PAGE_HEIGHT_MM - self.cursor;
        let bottom = top - height;
        let corners = [(x, top), (x + width, top), (x + width, bottom), (x, bottom)];
        self.layer.add_line(Line {
            points: corners
                .iter()
                .map(|(px, py)| (Point::new(Mm(*px), Mm(*py)), false))
                .collect(),
            is_closed: true,
        });
    }

    fn set_tone(&self, tone: Tone) {
        let color = match tone {
            Tone::Normal => Rgb::new(0.0, 0.0, 0.0, None),
            Tone::Alert => Rgb::new(1.0, 0.0, 0.0, None),
        };
        self.layer.set_fill_color(Color::Rgb(color));
    }

    fn banner(&mut self, text: &str, style: FontStyle, size: f32) {
        let x = (PAGE_WIDTH_MM - text_width(text, size)) / 2.0;
        self.text(text, size, style, x.max(MARGIN_MM), self.cursor + BANNER_HEIGHT_MM * 0.65);
        self.cursor += BANNER_HEIGHT_MM;
    }

    fn section(&mut self, title: &str) {
        if !self.fits(SECTION_HEIGHT_MM) {
            self.new_page();
        }
        self.rect(MARGIN_MM, CONTENT_WIDTH_MM, SECTION_HEIGHT_MM);
        self.text(
            title,
            12.0,
            FontStyle::Bold,
            MARGIN_MM + CELL_PAD_MM,
            self.cursor + SECTION_HEIGHT_MM * 0.65,
        );
        self.cursor += SECTION_HEIGHT_MM;
    }

    fn row(&mut self, row: &Row) {
        let mut x = MARGIN_MM;
        for cell in &row.cells {
            self.cell(cell, row, x);
            x += cell.width;
        }
        self.cursor += row.height;
    }

    fn cell(&self, cell: &Cell, row: &Row, x: f32) {
        if cell.bordered {
            self.rect(x, cell.width, row.height);
        }
        if cell.text.is_empty() {
            return;
        }
        let text_x = match cell.align {
            Align::Left => x + CELL_PAD_MM,
            Align::Center => x + ((cell.width - text_width(&cell.text, row.size)) / 2.0).max(0.0),
        };
        // Colour is set and cleared around every cell.
        self.set_tone(cell.tone);
        self.text(&cell.text, row.size, row.style, text_x, self.cursor + row.height * 0.65);
        self.set_tone(Tone::Normal);
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_EM * PT_TO_MM
}

/// Renders the layout as an A4 PDF and returns the encoded bytes.
pub fn render(layout: &ReportLayout) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Page 1",
    );
    let fonts = Fonts::load(&doc)?;
    let layer = doc.get_page(page).get_layer(layer);

    {
        let mut painter = Painter {
            doc: &doc,
            fonts,
            layer,
            cursor: MARGIN_MM,
            pages: 1,
        };

        let mut table_header: Option<&Row> = None;
        for block in &layout.blocks {
            match block {
                Block::Banner { text, style, size } => painter.banner(text, *style, *size),
                Block::Section(title) => painter.section(title),
                Block::Gap(height) => painter.cursor += *height,
                Block::TableHeader(row) => {
                    if !painter.fits(row.height * 2.0) {
                        painter.new_page();
                    }
                    painter.row(row);
                    table_header = Some(row);
                }
                Block::Row(row) => {
                    if !painter.fits(row.height) {
                        painter.new_page();
                        if let Some(header) = table_header {
                            painter.row(header);
                        }
                    }
                    painter.row(row);
                }
            }
        }
    }

    doc.save_to_bytes()
        .map_err(|e| SysReportError::Render(e.to_string()))
}

/// Renders the layout straight to `path`.
pub fn write_pdf(layout: &ReportLayout, path: &Path) -> Result<()> {
    let bytes = render(layout)?;
    let file = File::create(path).map_err(|source| SysReportError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    out.write_all(&bytes)
        .and_then(|_| out.flush())
        .map_err(|source| SysReportError::ReportWrite {
            path: path.to_path_buf(),
            source,
        })
}
