//! # Primitive Shape Generation
//!
//! UV sphere generation for the stage's placeholder mesh.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
///
/// Returns a sphere of radius 1.0 centered at the origin.
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    // Generate vertices
    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32; // 0 to PI
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32; // 0 to 2*PI
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();

            // Spherical to Cartesian coordinates
            let x = sin_theta * cos_phi;
            let y = cos_theta; // Y-up
            let z = sin_theta * sin_phi;

            data.vertices.push([x, y, z]);
            data.normals.push([x, y, z]); // Normal is same as position for unit sphere
        }
    }

    // Generate indices
    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            // First triangle
            data.indices.push(first);
            data.indices.push(second);
            data.indices.push(first + 1);

            // Second triangle
            data.indices.push(second);
            data.indices.push(second + 1);
            data.indices.push(first + 1);
        }
    }

    data
}

/// The stand-in mesh used until the host hands over a model: a unit sphere
/// at the resolution the showcase scene uses.
pub fn placeholder_sphere() -> GeometryData {
    generate_sphere(32, 32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert!(sphere.vertices.len() > 0);
        assert!(sphere.indices.len() > 0);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
    }

    #[test]
    fn test_sphere_vertices_on_unit_radius() {
        let sphere = generate_sphere(16, 12);
        for v in &sphere.vertices {
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_placeholder_sphere_resolution() {
        let sphere = placeholder_sphere();
        // 32x32 segment UV sphere: (lat+1) * (long+1) vertices
        assert_eq!(sphere.vertex_count(), 33 * 33);
        assert_eq!(sphere.triangle_count(), 32 * 32 * 2);
    }
}
