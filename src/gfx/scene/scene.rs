use wgpu::Device;

use crate::config::{Rgb, SceneSettings};
use crate::gfx::{
    camera::{
        camera_controller::CameraController, camera_utils::CameraRig, orbit_camera::OrbitCamera,
    },
    geometry::placeholder_sphere,
    stage::LightingStage,
};
use crate::error::ConfigIssue;

use super::node::{DrawStep, LightNode, MeshNode, SceneNode};
use super::object::{Mesh, ModelAsset};

/// Scene root: camera, node tree and background
///
/// Composed once from resolved settings and torn down as a unit on unmount.
/// Each frame the node tree is walked in fixed order to produce the draw
/// sequence the render engine executes.
pub struct Scene {
    pub camera_rig: CameraRig,
    nodes: Vec<SceneNode>,
    pub background: Rgb,
}

impl Scene {
    /// Builds the staged scene from resolved settings.
    ///
    /// Construction order mirrors draw order: lighting stage, its key
    /// light, then the reflective mesh (placeholder sphere until the host
    /// provides a model). Unknown presets surface as a returned issue; the
    /// scene is still fully composed around the fallback environment.
    pub fn compose(settings: &SceneSettings) -> (Self, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        let mut camera = OrbitCamera::new(
            5.0,
            0.4,
            0.2,
            cgmath::Vector3::new(0.0, 0.0, 0.0),
            1.0,
        );
        camera.bounds.min_distance = Some(1.1);
        camera.set_fov_degrees(settings.field_of_view);

        let controller = CameraController::new(0.005, 0.1)
            .with_auto_rotate(settings.auto_rotate, settings.auto_rotate_speed)
            .with_zoom_enabled(settings.zoom_enabled);
        let camera_rig = CameraRig::new(camera, controller);

        let (stage, stage_issue) = LightingStage::new(
            &settings.environment_preset,
            settings.environment_intensity,
            settings.background,
        );
        if let Some(issue) = stage_issue {
            issues.push(issue);
        }

        let key_light = LightNode {
            direction: stage.colors().key_direction,
            color: stage.key_light(),
        };

        let mesh_node = MeshNode {
            name: "placeholder-sphere".to_string(),
            mesh: Mesh::from_geometry(&placeholder_sphere()),
            material: settings.reflector,
        };

        let scene = Self {
            camera_rig,
            nodes: vec![
                SceneNode::EnvironmentStage(stage),
                SceneNode::Light(key_light),
                SceneNode::Mesh(mesh_node),
            ],
            background: settings.background,
        };

        (scene, issues)
    }

    /// Per-frame update: idle auto-rotation and refreshed camera uniforms.
    pub fn update(&mut self) {
        self.camera_rig.advance_frame();
    }

    /// Walks the node tree and returns this frame's draw sequence.
    ///
    /// The order is canonical regardless of node insertion order:
    /// background first, every environment stage next, meshes last. A
    /// temporarily-missing mesh (host model still decoding) simply drops
    /// its step; the rest of the composition still renders.
    pub fn draw_sequence(&self) -> Vec<DrawStep> {
        let mut sequence = vec![DrawStep::Background];
        for node in &self.nodes {
            if let SceneNode::EnvironmentStage(_) = node {
                sequence.push(DrawStep::Environment);
            }
        }
        for node in &self.nodes {
            if let SceneNode::Mesh(_) = node {
                sequence.push(DrawStep::MeshWithReflector);
            }
        }
        sequence
    }

    /// The lighting stage, if the tree contains one.
    pub fn stage(&self) -> Option<&LightingStage> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::EnvironmentStage(stage) => Some(stage),
            _ => None,
        })
    }

    /// The key light contributed by the stage, if present.
    pub fn key_light(&self) -> Option<&LightNode> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::Light(light) => Some(light),
            _ => None,
        })
    }

    /// The reflective mesh node, if present.
    pub fn mesh(&self) -> Option<&MeshNode> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::Mesh(mesh_node) => Some(mesh_node),
            _ => None,
        })
    }

    pub fn mesh_mut(&mut self) -> Option<&mut MeshNode> {
        self.nodes.iter_mut().find_map(|node| match node {
            SceneNode::Mesh(mesh_node) => Some(mesh_node),
            _ => None,
        })
    }

    /// Swaps the placeholder geometry for the host's loaded model.
    ///
    /// Called from the same thread as the frame callback once the host has
    /// finished decoding; the next frame re-uploads buffers and draws the
    /// new geometry.
    pub fn set_model(&mut self, model: ModelAsset) {
        if let Some(mesh_node) = self.mesh_mut() {
            mesh_node.name = model.name;
            mesh_node.mesh.replace_geometry(&model.geometry);
        }
    }

    /// Number of lightable nodes the stage contribution applies to.
    pub fn lightable_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_lightable()).count()
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Uploads GPU buffers for every mesh in the tree. Idempotent.
    pub fn init_gpu_resources(&mut self, device: &Device) {
        for node in &mut self.nodes {
            if let SceneNode::Mesh(mesh_node) = node {
                mesh_node.mesh.init_gpu_resources(device);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::gfx::geometry::generate_sphere;

    fn compose_default() -> (Scene, Vec<ConfigIssue>) {
        let (settings, _) = ViewerConfig::default().resolve();
        Scene::compose(&settings)
    }

    #[test]
    fn test_compose_builds_full_tree() {
        let (scene, issues) = compose_default();
        assert!(issues.is_empty());
        assert_eq!(scene.nodes().len(), 3);
        assert!(scene.stage().is_some());
        assert!(scene.mesh().is_some());
        assert_eq!(scene.lightable_count(), 1);
    }

    #[test]
    fn test_draw_sequence_is_fixed_order() {
        let (scene, _) = compose_default();
        assert_eq!(
            scene.draw_sequence(),
            vec![
                DrawStep::Background,
                DrawStep::Environment,
                DrawStep::MeshWithReflector
            ]
        );
    }

    #[test]
    fn test_draw_sequence_order_independent_of_node_order() {
        let (mut scene, _) = compose_default();
        scene.nodes.reverse();
        assert_eq!(
            scene.draw_sequence(),
            vec![
                DrawStep::Background,
                DrawStep::Environment,
                DrawStep::MeshWithReflector
            ]
        );
    }

    #[test]
    fn test_draw_sequence_stable_across_frames() {
        let (mut scene, _) = compose_default();
        let first = scene.draw_sequence();
        for _ in 0..10 {
            scene.update();
            assert_eq!(scene.draw_sequence(), first);
        }
    }

    #[test]
    fn test_missing_mesh_tolerated() {
        let (mut scene, _) = compose_default();
        scene.nodes.retain(|node| !matches!(node, SceneNode::Mesh(_)));
        assert_eq!(
            scene.draw_sequence(),
            vec![DrawStep::Background, DrawStep::Environment]
        );
    }

    #[test]
    fn test_unknown_preset_scene_still_has_reflective_mesh() {
        let config = ViewerConfig {
            environment_preset: "nonexistent-preset".to_string(),
            ..Default::default()
        };
        let (settings, _) = config.resolve();
        let (scene, issues) = Scene::compose(&settings);

        assert!(issues
            .iter()
            .any(|issue| matches!(issue, ConfigIssue::UnknownPreset { .. })));
        let stage = scene.stage().unwrap();
        assert!(stage.is_fallback());
        assert_eq!(stage.colors().zenith, Rgb::new(0.5, 0.5, 0.5));
        // Mesh still renders with the reflective material applied
        let mesh = scene.mesh().unwrap();
        assert_eq!(mesh.material, settings.reflector);
        assert_eq!(scene.draw_sequence().len(), 3);
    }

    #[test]
    fn test_set_model_swaps_geometry() {
        let (mut scene, _) = compose_default();
        let model = ModelAsset::new("friend-model", generate_sphere(4, 4));
        scene.set_model(model);

        let mesh_node = scene.mesh().unwrap();
        assert_eq!(mesh_node.name, "friend-model");
        assert!(!mesh_node.mesh.is_uploaded());
        assert_eq!(mesh_node.mesh.vertex_count(), 5 * 5);
    }

    #[test]
    fn test_camera_settings_flow_into_rig() {
        let config = ViewerConfig {
            zoom_enabled: false,
            auto_rotate: true,
            ..Default::default()
        };
        let (settings, _) = config.resolve();
        let (scene, _) = Scene::compose(&settings);
        assert!(!scene.camera_rig.controller.zoom_enabled());
        assert!(scene.camera_rig.controller.auto_rotate);
    }
}
