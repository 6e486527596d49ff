//! Minimal multi-page table renderer on top of `pdf-writer`.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A4 in points.
const A4_SHORT: f32 = 595.0;
const A4_LONG: f32 = 842.0;

pub struct PdfManager {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    bold_font_id: Ref,
    next_id: i32,
    page_refs: Vec<Ref>,

    page_w: f32,
    page_h: f32,
    margin: f32,
    row_h: f32,

    font_size: f32,
    header_font_size: f32,
    title_font_size: f32,
}

impl PdfManager {
    /// Landscape A4, wide enough for a payroll table.
    pub fn landscape() -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        let bold_font_id = Ref::new(4);

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));
        pdf.type1_font(bold_font_id).base_font(Name(b"Helvetica-Bold"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            bold_font_id,
            next_id: 5,
            page_refs: Vec::new(),

            page_w: A4_LONG,
            page_h: A4_SHORT,
            margin: 40.0,
            row_h: 18.0,

            font_size: 9.0,
            header_font_size: 10.0,
            title_font_size: 14.0,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    /// Register a page and write its content stream.
    fn push_page(&mut self, content: Content) {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        self.page_refs.push(page_id);

        {
            let mut page = self.pdf.page(page_id);
            page.parent(self.pages_id)
                .media_box(Rect::new(0.0, 0.0, self.page_w, self.page_h))
                .contents(content_id);

            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(Name(b"F1"), self.font_id);
            fonts.pair(Name(b"F2"), self.bold_font_id);
        }

        self.pdf.stream(content_id, &content.finish());
    }

    fn text(content: &mut Content, font: &[u8], x: f32, y: f32, size: f32, text: &str) {
        // Type1 standard fonts only cover Latin-1; replace the rest.
        let bytes: Vec<u8> = text
            .chars()
            .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
            .collect();

        content.begin_text();
        content.set_font(Name(font), size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(&bytes));
        content.end_text();
    }

    fn fill_band(&self, content: &mut Content, y: f32, width: f32, gray: f32) {
        content.save_state();
        content.set_fill_rgb(gray, gray, gray);
        content.rect(self.margin, y, width, self.row_h);
        content.fill_nonzero();
        content.restore_state();
    }

    fn draw_row(&self, content: &mut Content, y: f32, widths: &[f32], row: &[String], bold: bool) {
        let (font, size): (&[u8], f32) = if bold {
            (b"F2", self.header_font_size)
        } else {
            (b"F1", self.font_size)
        };

        let mut x = self.margin;
        for (i, w) in widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            Self::text(content, font, x + 3.0, y + 5.0, size, cell);

            content.save_state();
            content.set_stroke_rgb(0.7, 0.7, 0.7);
            content.rect(x, y, *w, self.row_h);
            content.stroke();
            content.restore_state();

            x += w;
        }
    }

    /// Column widths proportional to the longest cell, scaled to the page.
    fn col_widths(&self, headers: &[&str], rows: &[Vec<String>]) -> Vec<f32> {
        let mut widths: Vec<f32> = headers.iter().map(|h| h.len() as f32 * 6.0 + 8.0).collect();

        for row in rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.chars().count() as f32 * 5.2 + 8.0);
            }
        }

        let total: f32 = widths.iter().sum();
        let max = self.page_w - 2.0 * self.margin;
        if total > max {
            let scale = max / total;
            widths.iter_mut().for_each(|w| *w *= scale);
        }
        widths
    }

    /// Paginated table: title and header on every page, page numbers in the
    /// footer, an optional summary line after the last row.
    pub fn write_table(
        &mut self,
        title: &str,
        headers: &[&str],
        rows: &[Vec<String>],
        summary: Option<&str>,
    ) {
        let widths = self.col_widths(headers, rows);
        let table_w: f32 = widths.iter().sum();
        let header_row: Vec<String> = headers.iter().map(|s| s.to_string()).collect();

        let top = self.page_h - self.margin - 30.0;
        let per_page = (((top - self.margin - self.row_h) / self.row_h).floor() as usize).max(1);

        let chunks: Vec<&[Vec<String>]> = if rows.is_empty() {
            vec![rows]
        } else {
            rows.chunks(per_page).collect()
        };
        let page_count = chunks.len();

        for (page_idx, chunk) in chunks.into_iter().enumerate() {
            let mut content = Content::new();

            Self::text(
                &mut content,
                b"F2",
                self.margin,
                self.page_h - self.margin,
                self.title_font_size,
                title,
            );
            Self::text(
                &mut content,
                b"F1",
                self.page_w - self.margin - 70.0,
                self.margin - 25.0,
                self.font_size,
                &format!("Page {} of {}", page_idx + 1, page_count),
            );

            let mut y = top;
            self.fill_band(&mut content, y, table_w, 0.85);
            self.draw_row(&mut content, y, &widths, &header_row, true);
            y -= self.row_h;

            for (i, row) in chunk.iter().enumerate() {
                if i % 2 == 0 {
                    self.fill_band(&mut content, y, table_w, 0.96);
                }
                self.draw_row(&mut content, y, &widths, row, false);
                y -= self.row_h;
            }

            if page_idx + 1 == page_count {
                if let Some(line) = summary {
                    Self::text(&mut content, b"F2", self.margin, y - 6.0, self.font_size, line);
                }
            }

            self.push_page(content);
        }
    }

    pub fn save(mut self, path: &Path) -> std::io::Result<()> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .count(self.page_refs.len() as i32)
            .kids(self.page_refs.iter().copied());

        let bytes = self.pdf.finish();
        let mut f = File::create(path)?;
        f.write_all(&bytes)?;
        Ok(())
    }
}
