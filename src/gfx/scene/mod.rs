//! # Scene Management Module
//!
//! The scene root and its typed node tree: lighting stage, key light and
//! the reflective mesh, walked once per frame in fixed order. Everything
//! here is plain data so composition and the walk are testable without a
//! display.

pub mod node;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use node::{DrawStep, LightNode, MeshNode, SceneNode};
pub use object::{DrawMesh, Mesh, ModelAsset};
pub use scene::Scene;
pub use vertex::Vertex3D;
