use crate::state::navigation::Direction;
use crate::ui::placement::{Layout, Viewport};

/// Everything that can happen to one instance, from the host or from its
/// own timers.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// The input's raw value changed because of typing.
    Input(String),
    Navigate(Direction),
    Confirm,
    Cancel,
    Blur,
    /// Pointer click on the visible item at this zero-based position.
    Click(usize),
    Layout(Layout),
    Resize(Viewport),
    /// The filter timer fired.
    RunFilter,
    /// The blur grace period elapsed.
    BlurElapsed,
}
