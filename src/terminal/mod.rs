pub mod backend;

pub use backend::{
    CursorPos, KeyCode, KeyEvent, KeyModifiers, PlacedLine, RenderFrame, Terminal, TerminalEvent,
    TerminalSize,
};
