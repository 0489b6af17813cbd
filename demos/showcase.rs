//! # Vitrine Showcase
//!
//! The staged reflective sphere: city environment lighting at half
//! intensity over a near-black background, a heavily blurred planar
//! reflection, and an auto-rotating orbit camera with zoom disabled.
//!
//! ## Usage:
//! ```bash
//! cargo run --example showcase
//! ```
//!
//! Drag to orbit, Escape or close the window to exit. To display a real
//! model instead of the placeholder sphere, decode it on your side and
//! hand the geometry over with `app.set_model(...)` before `run()`.

use vitrine::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig {
        pixel_ratio_range: [1.0, 2.0],
        field_of_view: 45.0,
        background: "#050505".to_string(),
        environment_preset: "city".to_string(),
        environment_intensity: 0.5,
        auto_rotate: true,
        auto_rotate_speed: 2.0,
        zoom_enabled: false,
        reflector: ReflectorConfig {
            blur: (300, 100),
            resolution: 2048,
            mix_blur: 1.0,
            opacity: 0.5,
            base_color: "#101010".to_string(),
        },
    };

    let app = ViewerApp::new(config)?;
    app.run()?;

    Ok(())
}
