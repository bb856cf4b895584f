pub mod effect;
pub mod event;
pub mod instance;
pub mod intent;
pub mod reducer;
pub mod registry;
pub mod scheduler;
