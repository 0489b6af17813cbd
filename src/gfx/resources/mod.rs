//! GPU resource management
//!
//! Global uniforms, texture targets, and the reflective surface material.

pub mod global_bindings;
pub mod reflector;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalUBO};
pub use reflector::{ReflectorParams, ReflectorUniform};
pub use texture_resource::TextureResource;
