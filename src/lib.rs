// src/lib.rs
//! Vitrine
//!
//! A staged 3D model viewer built on wgpu and winit: environment-preset
//! lighting, a reflective showcase mesh, and orbit camera navigation.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ViewerApp;
pub use config::ViewerConfig;
pub use error::ViewerError;

/// Creates a viewer with the default showcase configuration
pub fn default() -> Result<ViewerApp, ViewerError> {
    ViewerApp::new(ViewerConfig::default())
}
