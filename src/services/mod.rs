pub mod debouncer;
pub mod history;
pub mod persistence;
pub mod switcher;
pub mod trigger;
pub mod validity;
pub mod watcher;
pub mod wm;

pub use debouncer::FocusDebouncer;
pub use switcher::CycleSwitcher;
pub use trigger::TriggerListener;
pub use watcher::create_focus_watcher;
pub use wm::create_sway_client;
