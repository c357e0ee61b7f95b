//! Invoice PDF rendering

use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};
use shared::format_money;

use crate::error::{AppError, AppResult};
use crate::services::invoice::{InvoiceDetail, InvoiceLine};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 7.0;
/// Lowest baseline before a new page is started
const BOTTOM: f32 = 25.0;

/// Item table columns and their x positions in mm
const COLUMNS: [(&str, f32); 6] = [
    ("Item ID", MARGIN),
    ("Description", 35.0),
    ("Vendor", 90.0),
    ("Quantity", 130.0),
    ("Unit Price", 152.0),
    ("Total Price", 177.0),
];

const EMPTY_MESSAGE: &str = "No items found for this invoice.";

/// File name used for downloads and the archive
pub fn invoice_file_name(invoice_id: i64, customer_id: i64) -> String {
    format!("Invoice_{}_{}.pdf", invoice_id, customer_id)
}

/// Number of table rows that fit on a page whose table header sits at `header_y`
pub(crate) fn rows_fitting(header_y: f32) -> usize {
    let first_row = header_y - ROW_HEIGHT;
    if first_row < BOTTOM {
        return 0;
    }
    ((first_row - BOTTOM) / ROW_HEIGHT) as usize + 1
}

/// Split `count` rows into page-sized chunks: the first page has room for
/// `first` rows, later pages for `rest`
pub(crate) fn paginate(count: usize, first: usize, rest: usize) -> Vec<usize> {
    let mut pages = vec![count.min(first)];
    let mut remaining = count.saturating_sub(first);
    while remaining > 0 && rest > 0 {
        let take = remaining.min(rest);
        pages.push(take);
        remaining -= take;
    }
    pages
}

fn pdf_error(e: printpdf::Error) -> AppError {
    AppError::Document(e.to_string())
}

struct Writer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Writer {
    fn text(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.regular);
    }

    fn bold(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.bold);
    }

    fn rule(&self, y: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
    }

    fn table_header(&self, y: f32) {
        for (title, x) in COLUMNS {
            self.bold(title, 10.0, x, y);
        }
        self.rule(y - 2.0);
    }

    fn table_row(&self, line: &InvoiceLine, y: f32) {
        let cells = [
            line.item_id.to_string(),
            truncate(&line.description, 30),
            truncate(&line.vendor_name, 22),
            line.quantity.to_string(),
            format_money(line.unit_price),
            format_money(line.line_total),
        ];
        for ((_, x), cell) in COLUMNS.iter().zip(cells.iter()) {
            self.text(cell, 9.0, *x, y);
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

/// Render an invoice as a PDF document
pub fn render_invoice_pdf(detail: &InvoiceDetail) -> AppResult<Vec<u8>> {
    let invoice = &detail.invoice;
    let title = format!("Invoice #{}", invoice.invoice_number);

    let (doc, page, layer) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut w = Writer {
        doc,
        layer,
        regular,
        bold,
    };

    let mut y = PAGE_HEIGHT - 25.0;
    w.bold(&title, 20.0, MARGIN, y);
    y -= 10.0;
    w.text(&format!("Date: {}", invoice.invoice_date.format("%Y-%m-%d")), 11.0, MARGIN, y);
    y -= 6.0;
    w.text(&format!("Status: {}", invoice.status.as_str().to_uppercase()), 11.0, MARGIN, y);

    y -= 12.0;
    w.bold("Customer Information", 13.0, MARGIN, y);
    y -= 7.0;
    w.text(&format!("Name: {}", detail.customer.name), 11.0, MARGIN, y);
    y -= 6.0;
    w.text(&format!("Email: {}", detail.customer.email), 11.0, MARGIN, y);
    y -= 6.0;
    w.text(
        &format!("Phone: {}", detail.customer.phone.as_deref().unwrap_or("-")),
        11.0,
        MARGIN,
        y,
    );

    y -= 12.0;
    w.bold("Invoice Items", 13.0, MARGIN, y);
    y -= 9.0;

    if detail.items.is_empty() {
        w.text(EMPTY_MESSAGE, 11.0, MARGIN, y);
        y -= ROW_HEIGHT;
    } else {
        let top_of_page = PAGE_HEIGHT - 20.0;
        let pages = paginate(
            detail.items.len(),
            rows_fitting(y),
            rows_fitting(top_of_page),
        );

        let mut lines = detail.items.iter();
        for (index, rows) in pages.into_iter().enumerate() {
            if index > 0 {
                w.new_page();
                y = top_of_page;
            }
            if rows == 0 {
                continue;
            }
            w.table_header(y);
            y -= ROW_HEIGHT;
            for line in lines.by_ref().take(rows) {
                w.table_row(line, y);
                y -= ROW_HEIGHT;
            }
        }
    }

    if y - 6.0 < BOTTOM {
        w.new_page();
        y = PAGE_HEIGHT - 20.0;
    }
    w.rule(y + 3.0);
    w.bold(
        &format!("Total Amount: {}", format_money(invoice.total_amount)),
        12.0,
        COLUMNS[4].1 - 20.0,
        y - 3.0,
    );

    w.doc.save_to_bytes().map_err(pdf_error)
}

/// Write a rendered invoice into the archive directory
pub async fn archive_pdf(dir: &str, file_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    let dir = Path::new(dir);
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Document(format!("Cannot create {}: {}", dir.display(), e)))?;

    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Document(format!("Cannot write {}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), "Invoice PDF archived");

    Ok(path)
}
