pub mod placement;
pub mod popup_view;
pub mod span;
pub mod style;
