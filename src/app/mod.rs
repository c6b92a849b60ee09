pub mod filter;
pub mod keys;
mod state;
pub mod tree;

pub use state::{
    App, Derived, DirEntry, Effect, GatewayEvent, InputMode, OverlayData, ViewMode,
};
