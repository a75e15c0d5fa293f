pub mod display;
pub mod layout;
pub mod store;

pub use display::{DisplayConfiguration, ScreenInfo};
pub use layout::{Layout, Rect, WindowRecord};
pub use store::LayoutStore;
