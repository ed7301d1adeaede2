// Library exports for testing and potential library use
//
// The input layer is single-threaded: the registry, the MRU stack and the
// sessions are owned by `InputSession` and never locked. The only shared
// state is the log bridge (`parking_lot::Mutex`) and the background thread
// that writes keybinding overrides.

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod catalog;
pub mod cli;
pub mod cycle;
pub mod debug;
pub mod dispatcher;
pub mod mru;
pub mod palette;
pub mod session;
pub mod signal;
pub mod tabs;

pub use quill_config as config;
pub use quill_keybindings as keybindings;

pub use session::{InputSession, KeyDisposition, KeyState};
pub use signal::Signal;
pub use tabs::{TabId, TabInfo, TabProvider};
