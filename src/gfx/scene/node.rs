//! Typed scene-graph nodes
//!
//! The scene is an explicit tree of typed records rather than a retained
//! declarative structure: built once at mount, walked in fixed order every
//! frame. Nodes are polymorphic over two capabilities - Renderable (the
//! node produces pixels) and Lightable (the node receives the stage's
//! lighting contribution).

use crate::config::Rgb;
use crate::gfx::resources::reflector::ReflectorParams;
use crate::gfx::stage::LightingStage;

use super::object::Mesh;

/// A mesh with its material descriptor
///
/// Ownership is 1:1 and exclusive: this node owns exactly one geometry and
/// exactly one material, and no material state is shared across meshes.
pub struct MeshNode {
    pub name: String,
    pub mesh: Mesh,
    pub material: ReflectorParams,
}

/// A directional key light contributed by the stage
pub struct LightNode {
    pub direction: [f32; 3],
    pub color: Rgb,
}

/// Scene-graph node variants
pub enum SceneNode {
    EnvironmentStage(LightingStage),
    Mesh(MeshNode),
    Light(LightNode),
}

impl SceneNode {
    /// Whether walking this node emits draw work.
    pub fn is_renderable(&self) -> bool {
        matches!(self, SceneNode::EnvironmentStage(_) | SceneNode::Mesh(_))
    }

    /// Whether the stage's ambient and image-based lighting applies here.
    pub fn is_lightable(&self) -> bool {
        matches!(self, SceneNode::Mesh(_))
    }
}

/// One step of the per-frame draw sequence
///
/// The walk always yields these in the same order: background, environment,
/// then the mesh with its reflection. The reflection pass samples the
/// environment, so reordering would change visible results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStep {
    Background,
    Environment,
    MeshWithReflector,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::placeholder_sphere;

    #[test]
    fn test_capabilities() {
        let (stage, _) = LightingStage::new("city", 0.5, Rgb::new(0.0, 0.0, 0.0));
        let stage_node = SceneNode::EnvironmentStage(stage);
        assert!(stage_node.is_renderable());
        assert!(!stage_node.is_lightable());

        let mesh_node = SceneNode::Mesh(MeshNode {
            name: "placeholder".to_string(),
            mesh: Mesh::from_geometry(&placeholder_sphere()),
            material: ReflectorParams::default(),
        });
        assert!(mesh_node.is_renderable());
        assert!(mesh_node.is_lightable());

        let light_node = SceneNode::Light(LightNode {
            direction: [0.0, 1.0, 0.0],
            color: Rgb::new(1.0, 1.0, 1.0),
        });
        assert!(!light_node.is_renderable());
        assert!(!light_node.is_lightable());
    }
}
