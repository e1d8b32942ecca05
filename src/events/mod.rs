pub mod focus;

pub use focus::{EntityId, FocusEvent};
