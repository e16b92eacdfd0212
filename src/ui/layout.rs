use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const STATUS_HEIGHT: u16 = 1;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    /// One-row strip for the transient notice at the bottom.
    pub status: Rect,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect)
    }

    pub fn update(&mut self, area: Rect) {
        *self = Self::from_rect(area);
    }

    fn from_rect(area: Rect) -> Self {
        let [tab, main, status] = Layout::vertical([
            Constraint::Length(TAB_BAR_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .areas(area);

        LayoutAreas {
            tab_bar: Self::split_tab_bar(tab),
            main,
            status,
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}
