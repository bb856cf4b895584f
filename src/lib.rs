pub mod core;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod ui;

pub use core::InstanceId;
pub use core::options::{ConfigError, FilterOptions, RawOptions};
pub use runtime::effect::Effect;
pub use runtime::event::FilterEvent;
pub use runtime::instance::FilterInstance;
pub use runtime::intent::Intent;
pub use runtime::registry::Registry;
pub use state::session::FilterSession;
