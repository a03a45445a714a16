use crate::models::document::PageSize;
use crate::services::canvas::DocumentSurface;

pub const TOP_MARGIN: f32 = 50.0;
pub const SIDE_MARGIN: f32 = 40.0;
/// Reserve used for every block, including each detail-table row.
pub const ROW_RESERVE: f32 = 40.0;
/// Coarse reserve checked before the detail table starts.
pub const SECTION_RESERVE: f32 = 80.0;

/// Render-session cursor, threaded by value through every section routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageState {
    pub cursor: f32,
    pub page_index: usize,
}

impl PageState {
    pub fn at(cursor: f32, page_index: usize) -> Self {
        Self { cursor, page_index }
    }

    pub fn advance(self, height: f32) -> Self {
        Self {
            cursor: self.cursor + height,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    WithinPage,
    OverflowForItem,
}

/// Forward-only page breaking. Before a block of height `h` is emitted,
/// `cursor + h` is checked against the page height minus a reserve; on
/// overflow a new page starts at the top margin. Nothing is ever moved back.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: PageSize,
    top_margin: f32,
}

impl Paginator {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            top_margin: TOP_MARGIN,
        }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn content_width(&self) -> f32 {
        self.page_size.width - 2.0 * SIDE_MARGIN
    }

    pub fn first_page(&self) -> PageState {
        PageState::at(self.top_margin, 0)
    }

    pub fn classify(&self, state: PageState, height: f32, reserve: f32) -> LayoutState {
        if state.cursor + height > self.page_size.height - reserve {
            LayoutState::OverflowForItem
        } else {
            LayoutState::WithinPage
        }
    }

    pub fn new_page<S: DocumentSurface + ?Sized>(&self, surface: &mut S, state: PageState) -> PageState {
        surface.add_page();
        tracing::debug!(
            target: "report::render",
            from_page = state.page_index,
            cursor = state.cursor,
            "page break"
        );
        PageState::at(self.top_margin, state.page_index + 1)
    }

    /// Breaks the page when a block of `height` would cross the reserve.
    pub fn ensure_room<S: DocumentSurface + ?Sized>(
        &self,
        surface: &mut S,
        state: PageState,
        height: f32,
        reserve: f32,
    ) -> PageState {
        match self.classify(state, height, reserve) {
            LayoutState::WithinPage => state,
            LayoutState::OverflowForItem => self.new_page(surface, state),
        }
    }

    /// Emits rows one by one, re-running `header` at the top of every page the
    /// table spills onto. The header for the first page is the caller's job.
    pub fn emit_rows<S, T, H, R>(
        &self,
        surface: &mut S,
        mut state: PageState,
        rows: &[T],
        row_height: f32,
        mut header: H,
        mut row: R,
    ) -> PageState
    where
        S: DocumentSurface + ?Sized,
        H: FnMut(&mut S, PageState) -> PageState,
        R: FnMut(&mut S, PageState, usize, &T),
    {
        for (index, item) in rows.iter().enumerate() {
            if self.classify(state, row_height, ROW_RESERVE) == LayoutState::OverflowForItem {
                state = self.new_page(surface, state);
                state = header(surface, state);
            }
            row(surface, state, index, item);
            state = state.advance(row_height);
        }
        state
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PageSize::A4)
    }
}
