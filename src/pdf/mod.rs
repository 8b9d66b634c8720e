// Minimal PDF 1.4 writer: pages, standard fonts, bordered text cells.
// Coordinates are inches from the top-left corner, like a flowing cursor.

mod fonts;

pub use fonts::FontStyle;

/// Points per inch.
const K: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const LETTER: PageSize = PageSize {
        width: 8.5,
        height: 11.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Page-start / page-end hooks, invoked by `add_page` and `finish`.
pub trait PageDecorator {
    fn page_start(&self, doc: &mut PdfDocument);
    fn page_end(&self, doc: &mut PdfDocument);
}

pub struct PdfDocument {
    size: PageSize,
    left_margin: f64,
    top_margin: f64,
    right_margin: f64,
    bottom_margin: f64,
    /// Horizontal padding for left/right aligned text.
    cell_margin: f64,
    pages: Vec<String>,
    /// Per closed page, where the page_end output starts in its content.
    page_end_starts: Vec<usize>,
    x: f64,
    y: f64,
    font: FontStyle,
    font_size: f64,
    page_count_alias: Option<String>,
    title: Option<String>,
    producer: Option<String>,
}

impl PdfDocument {
    pub fn new(size: PageSize) -> Self {
        let margin = 1.0 / 2.54; // 1 cm
        Self {
            size,
            left_margin: margin,
            top_margin: margin,
            right_margin: margin,
            bottom_margin: 2.0 * margin,
            cell_margin: margin / 10.0,
            pages: Vec::new(),
            page_end_starts: Vec::new(),
            x: margin,
            y: margin,
            font: FontStyle::Regular,
            font_size: 12.0,
            page_count_alias: None,
            title: None,
            producer: None,
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    pub fn set_producer(&mut self, producer: &str) {
        self.producer = Some(producer.to_string());
    }

    /// Text written as `alias` by `page_end` is replaced with the total page count
    /// in `finish`. Body text and `page_start` output are left as written.
    pub fn alias_page_count(&mut self, alias: &str) {
        self.page_count_alias = Some(alias.to_string());
    }

    /// 1-based number of the current page (0 before the first `add_page`).
    pub fn page_no(&self) -> usize {
        self.pages.len()
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Moves to `y` (negative counts from the bottom edge) and back to the left margin.
    pub fn set_y(&mut self, y: f64) {
        self.x = self.left_margin;
        self.y = if y < 0.0 { self.size.height + y } else { y };
    }

    pub fn set_font(&mut self, style: FontStyle, size_pt: f64) {
        self.font = style;
        self.font_size = size_pt;
    }

    /// Line break: left margin, down by `h`.
    pub fn ln(&mut self, h: f64) {
        self.x = self.left_margin;
        self.y += h;
    }

    /// True when a cell of height `h` at the cursor would cross the bottom margin.
    pub fn would_overflow(&self, h: f64) -> bool {
        self.y + h > self.size.height - self.bottom_margin
    }

    /// Closes the current page (page_end), opens a new one (page_start).
    pub fn add_page(&mut self, decorator: &dyn PageDecorator) {
        if !self.pages.is_empty() {
            self.close_page(decorator);
        }
        self.pages.push(String::new());
        self.x = self.left_margin;
        self.y = self.top_margin;
        let (font, size) = (self.font, self.font_size);
        decorator.page_start(self);
        self.font = font;
        self.font_size = size;
    }

    fn close_page(&mut self, decorator: &dyn PageDecorator) {
        let (font, size) = (self.font, self.font_size);
        let start = self.pages.last().map_or(0, String::len);
        decorator.page_end(self);
        self.page_end_starts.push(start);
        self.font = font;
        self.font_size = size;
    }

    /// Rectangular cell at the cursor. `w == 0` extends to the right margin.
    /// With `ln` the cursor moves to the next line, otherwise to the right of the cell.
    pub fn cell(&mut self, w: f64, h: f64, text: &str, border: bool, align: Align, ln: bool) {
        let w = if w == 0.0 {
            self.size.width - self.right_margin - self.x
        } else {
            w
        };
        let mut ops = String::new();
        if border {
            ops.push_str(&format!(
                "{:.2} {:.2} {:.2} {:.2} re S\n",
                self.x * K,
                (self.size.height - self.y) * K,
                w * K,
                -h * K
            ));
        }
        if !text.is_empty() {
            let text_w = self.font.text_width(text, self.font_size) / K;
            let dx = match align {
                Align::Left => self.cell_margin,
                Align::Center => (w - text_w) / 2.0,
                Align::Right => w - self.cell_margin - text_w,
            };
            let baseline = self.y + 0.5 * h + 0.3 * self.font_size / K;
            ops.push_str(&format!(
                "BT /{} {:.2} Tf {:.2} {:.2} Td ({}) Tj ET\n",
                self.font.resource(),
                self.font_size,
                (self.x + dx) * K,
                (self.size.height - baseline) * K,
                escape_text(text)
            ));
        }
        if let Some(page) = self.pages.last_mut() {
            page.push_str(&ops);
        }
        if ln {
            self.ln(h);
        } else {
            self.x += w;
        }
    }

    /// Runs the last page_end, resolves the page-count alias and serializes.
    pub fn finish(mut self, decorator: &dyn PageDecorator) -> Vec<u8> {
        if self.pages.is_empty() {
            self.add_page(decorator);
        }
        self.close_page(decorator);
        if let Some(alias) = self.page_count_alias.take() {
            let total = self.pages.len().to_string();
            for (page, &start) in self.pages.iter_mut().zip(&self.page_end_starts) {
                let footer = page.split_off(start);
                page.push_str(&footer.replace(&alias, &total));
            }
        }
        self.serialize()
    }

    fn serialize(&self) -> Vec<u8> {
        let mut w = ObjectWriter::new();
        w.raw(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        const CATALOG: usize = 1;
        const PAGES: usize = 2;
        const FIRST_FONT: usize = 3;
        let resources = FIRST_FONT + FontStyle::ALL.len();
        let info = resources + 1;
        let first_page = info + 1;
        let page_ids: Vec<usize> = (0..self.pages.len()).map(|i| first_page + 2 * i).collect();

        w.object(CATALOG, &format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES));

        let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
        w.object(
            PAGES,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 {:.2} {:.2}] >>",
                kids.join(" "),
                self.pages.len(),
                self.size.width * K,
                self.size.height * K
            ),
        );

        let mut font_refs = Vec::new();
        for (i, style) in FontStyle::ALL.iter().enumerate() {
            let id = FIRST_FONT + i;
            w.object(
                id,
                &format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    style.base_font()
                ),
            );
            font_refs.push(format!("/{} {} 0 R", style.resource(), id));
        }
        w.object(
            resources,
            &format!(
                "<< /ProcSet [/PDF /Text] /Font << {} >> >>",
                font_refs.join(" ")
            ),
        );

        let mut info_dict = String::from("<<");
        if let Some(title) = &self.title {
            info_dict.push_str(&format!(" /Title ({})", escape_text(title)));
        }
        if let Some(producer) = &self.producer {
            info_dict.push_str(&format!(" /Producer ({})", escape_text(producer)));
        }
        info_dict.push_str(" >>");
        w.object(info, &info_dict);

        for (content, &page_id) in self.pages.iter().zip(&page_ids) {
            w.object(
                page_id,
                &format!(
                    "<< /Type /Page /Parent {} 0 R /Resources {} 0 R /Contents {} 0 R >>",
                    PAGES,
                    resources,
                    page_id + 1
                ),
            );
            w.stream(page_id + 1, content);
        }

        w.finish(CATALOG, info)
    }
}

/// Appends numbered objects and remembers their offsets for the xref table.
struct ObjectWriter {
    buf: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl ObjectWriter {
    fn new() -> Self {
        Self {
            buf: Vec::new(),
            offsets: Vec::new(),
        }
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn object(&mut self, id: usize, body: &str) {
        self.offsets.push((id, self.buf.len()));
        self.raw(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    fn stream(&mut self, id: usize, content: &str) {
        self.offsets.push((id, self.buf.len()));
        self.raw(
            format!(
                "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
                id,
                content.len(),
                content
            )
            .as_bytes(),
        );
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        self.offsets.sort_by_key(|(id, _)| *id);
        let xref_at = self.buf.len();
        let size = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", size);
        for (_, offset) in &self.offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, root, info, xref_at
        ));
        self.raw(xref.as_bytes());
        self.buf
    }
}

/// PDF literal string body. Latin-1 goes out as octal escapes (WinAnsi), anything else as '?'.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", ch as u32)),
            _ => out.push('?'),
        }
    }
    out
}
