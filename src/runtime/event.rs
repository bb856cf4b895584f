/// Notifications the host forwards to its listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    /// A suggestion was chosen by keyboard or pointer.
    Selected { selected: String },
    /// The input changed without a selection.
    InputChanged { value: String },
}

impl FilterEvent {
    pub fn selected_text(&self) -> Option<&str> {
        match self {
            Self::Selected { selected } => Some(selected.as_str()),
            Self::InputChanged { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FilterEvent;

    #[test]
    fn only_selection_carries_selected_text() {
        let selected = FilterEvent::Selected {
            selected: "apricot".to_string(),
        };
        assert_eq!(selected.selected_text(), Some("apricot"));

        let changed = FilterEvent::InputChanged {
            value: "apr".to_string(),
        };
        assert_eq!(changed.selected_text(), None);
    }
}
