// Export modules for use in tests
pub mod app;
pub mod config;
pub mod notification;
pub mod panic_handler;
pub mod ui;
pub mod viewer;

pub mod test_utils;

// Re-export the viewer surface
pub use viewer::{
    Command, Effect, LoadError, LoadedDocument, RenderService, Rotation, UrlLoader, ViewerState,
    load_file,
};
