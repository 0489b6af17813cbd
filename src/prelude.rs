//! # Vitrine Prelude
//!
//! Convenient imports for typical viewer applications:
//!
//! ```rust
//! use vitrine::prelude::*;
//! ```

// Re-export core application types
pub use crate::app::{FrameScheduler, ViewerApp};
pub use crate::config::{ReflectorConfig, Rgb, ViewerConfig};
pub use crate::default;
pub use crate::error::{ConfigIssue, ViewerError};

// Re-export graphics and scene types
pub use crate::gfx::camera::{CameraRig, DragState, OrbitCamera, PointerInput};
pub use crate::gfx::geometry::{generate_sphere, placeholder_sphere, GeometryData};
pub use crate::gfx::resources::reflector::ReflectorParams;
pub use crate::gfx::scene::{DrawStep, ModelAsset, Scene, SceneNode};
pub use crate::gfx::stage::{lookup_preset, LightingStage};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};
