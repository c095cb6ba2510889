//! Page-break arithmetic and the drawing cursor for the A4 report.

use printpdf::{Mm, PdfDocumentReference, PdfLayerReference};

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
pub const MARGIN_MM: f64 = 20.0;

/// Walks down the page, opening a new page whenever a block would not fit
/// above the bottom margin.
pub struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y_mm: f64,
    pages: usize,
}

impl<'a> PageCursor<'a> {
    pub fn new(doc: &'a PdfDocumentReference, layer: PdfLayerReference) -> Self {
        Self {
            doc,
            layer,
            y_mm: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        }
    }

    /// Current drawing layer (changes when a page break occurs).
    pub fn layer(&self) -> &PdfLayerReference {
        &self.layer
    }

    /// Current baseline height from the page bottom, in mm.
    pub fn y(&self) -> f64 {
        self.y_mm
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Move the cursor down by `mm`.
    pub fn advance(&mut self, mm: f64) {
        self.y_mm -= mm;
    }

    /// Guarantee `needed_mm` of vertical space, breaking the page if the
    /// remaining room is short.
    pub fn ensure_space(&mut self, needed_mm: f64) {
        if needs_break(self.y_mm, needed_mm) {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y_mm = PAGE_HEIGHT_MM - MARGIN_MM;
            self.pages += 1;
        }
    }
}

fn needs_break(y_mm: f64, needed_mm: f64) -> bool {
    y_mm - needed_mm < MARGIN_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_triggers_only_below_bottom_margin() {
        let top = PAGE_HEIGHT_MM - MARGIN_MM;
        assert!(!needs_break(top, 50.0));
        assert!(!needs_break(MARGIN_MM + 30.0, 30.0));
        assert!(needs_break(MARGIN_MM + 30.0, 30.1));
        assert!(needs_break(25.0, 20.0));
    }
}
