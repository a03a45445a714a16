use chrono::{DateTime, Utc};

use crate::models::document::{
    DrawOp, ImageAsset, Page, PageSize, Rect, RenderedDocument, Rgb, TextStyle,
};

/// Drawing capability consumed by the section renderers.
///
/// Coordinates are in points from the top-left corner of the selected page.
pub trait DocumentSurface {
    fn page_size(&self) -> PageSize;

    fn page_count(&self) -> usize;

    /// Appends a page and selects it.
    fn add_page(&mut self);

    fn select_page(&mut self, index: usize);

    fn current_page(&self) -> usize;

    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb);

    fn text(&mut self, text: &str, x: f32, y: f32, style: TextStyle);

    fn image(&mut self, asset: &ImageAsset, rect: Rect);
}

/// Display-list implementation of [`DocumentSurface`].
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    page_size: PageSize,
    pages: Vec<Page>,
    current: usize,
}

impl RecordingSurface {
    /// Starts with one empty page selected.
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            pages: vec![Page::default()],
            current: 0,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn finish(self, file_name: String, generated_at: DateTime<Utc>) -> RenderedDocument {
        RenderedDocument {
            file_name,
            page_size: self.page_size,
            generated_at,
            pages: self.pages,
        }
    }

    fn push(&mut self, op: DrawOp) {
        self.pages[self.current].ops.push(op);
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(PageSize::A4)
    }
}

impl DocumentSurface for RecordingSurface {
    fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.current = self.pages.len() - 1;
    }

    fn select_page(&mut self, index: usize) {
        self.current = index.min(self.pages.len() - 1);
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.push(DrawOp::FillRect { rect, color });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb) {
        self.push(DrawOp::Line {
            x1: from.0,
            y1: from.1,
            x2: to.0,
            y2: to.1,
            color,
        });
    }

    fn text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
    }

    fn image(&mut self, asset: &ImageAsset, rect: Rect) {
        self.push(DrawOp::Image {
            asset: asset.clone(),
            rect,
        });
    }
}
