pub mod inline_window;
pub mod popover;

pub use inline_window::InlineWindowController;
pub use popover::PopoverController;
