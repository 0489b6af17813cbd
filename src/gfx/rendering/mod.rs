//! Rendering pipeline infrastructure
//!
//! The render engine, pipeline registry and the offscreen reflection pass.

pub mod pipeline_manager;
pub mod reflection_pass;
pub mod render_engine;

pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use reflection_pass::{BufferLedger, ReflectionTargets};
pub use render_engine::RenderEngine;
