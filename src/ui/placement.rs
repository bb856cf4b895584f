use serde::{Deserialize, Serialize};

/// Extra width added to the popup so its border lines up with the anchor.
pub const BORDER_COMPENSATION: i32 = 2;

/// Where the popup goes relative to its anchor. Discriminants match the
/// numeric option indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Variable = 0,
    Above = 1,
    Below = 2,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::Variable, Position::Above, Position::Below];

    pub fn from_index(index: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(index).ok()?).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "variable" => Some(Self::Variable),
            "above" => Some(Self::Above),
            "below" => Some(Self::Below),
            _ => None,
        }
    }
}

/// Anchor control box in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnchorRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub height: i32,
    pub scroll_top: i32,
}

/// Geometry snapshot the host reports for one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub anchor: AnchorRect,
    pub viewport: Viewport,
    /// Height of one rendered popup row.
    pub item_height: i32,
    /// Fixed popup height on top of its rows (borders, padding).
    pub chrome: i32,
    /// Space between the anchor and the popup.
    pub gap: i32,
}

impl Layout {
    pub fn new(anchor: AnchorRect, viewport: Viewport) -> Self {
        Self {
            anchor,
            viewport,
            item_height: 1,
            chrome: 0,
            gap: 0,
        }
    }

    pub fn with_item_height(mut self, item_height: i32) -> Self {
        self.item_height = item_height.max(0);
        self
    }

    pub fn with_chrome(mut self, chrome: i32) -> Self {
        self.chrome = chrome.max(0);
        self
    }

    pub fn with_gap(mut self, gap: i32) -> Self {
        self.gap = gap;
        self
    }

    pub fn popup_height(&self, rows: usize) -> i32 {
        let rows = i32::try_from(rows).unwrap_or(i32::MAX);
        rows.saturating_mul(self.item_height)
            .saturating_add(self.chrome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupPlacement {
    pub side: Side,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

pub fn choose_side(position: Position, layout: &Layout, popup_height: i32) -> Side {
    match position {
        Position::Above => Side::Above,
        Position::Below => Side::Below,
        Position::Variable => {
            let anchor = layout.anchor;
            let scroll = layout.viewport.scroll_top;
            let below_top = anchor.top + anchor.height + layout.gap;
            let overflows_below = (below_top - scroll) + popup_height > layout.viewport.height;
            let fits_above = (anchor.top - scroll) - popup_height > 0;
            if overflows_below && fits_above {
                Side::Above
            } else {
                Side::Below
            }
        }
    }
}

/// Places a popup showing `rows` items next to the anchor.
pub fn resolve(position: Position, layout: &Layout, rows: usize) -> PopupPlacement {
    let height = layout.popup_height(rows);
    let side = choose_side(position, layout, height);
    let anchor = layout.anchor;
    let top = match side {
        Side::Below => anchor.top + anchor.height + layout.gap,
        Side::Above => anchor.top - layout.gap - height,
    };

    PopupPlacement {
        side,
        left: anchor.left,
        top,
        width: anchor.width + BORDER_COMPENSATION,
        height,
    }
}
