use crate::core::candidate::RenderId;
use crate::runtime::event::FilterEvent;
use crate::runtime::scheduler::SchedulerCommand;
use crate::ui::placement::PopupPlacement;

/// Instructions produced by the reducer. The host applies them in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowPopup,
    /// Hides the popup together with every item in it and clears the
    /// active marking.
    HidePopup,
    /// Items to show, in display order.
    ShowItems(Vec<RenderId>),
    HideItems(Vec<RenderId>),
    SetActive(Option<RenderId>),
    Reposition(PopupPlacement),
    SetInputValue(String),
    FocusInput,
    /// Suppress the host's default action for the key (form submit on Enter).
    PreventDefault,
    Emit(FilterEvent),
    Schedule(SchedulerCommand),
}
