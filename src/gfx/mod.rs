//! # Graphics Module
//!
//! All graphics-related functionality for the viewer: the orbit camera and
//! its input state machine, the lighting stage, scene management, geometry
//! generation, the rendering pipelines and GPU resource handling.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with pointer-driven controls
//! - **Lighting Stage** ([`stage`]) - Environment presets and ambient intensity
//! - **Scene Management** ([`scene`]) - Typed node tree walked in fixed order
//! - **Rendering Pipeline** ([`rendering`]) - Environment, reflection and composite passes
//! - **Resource Management** ([`resources`]) - Uniforms, textures, reflective material

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod stage;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
pub use scene::Scene;
pub use stage::LightingStage;
