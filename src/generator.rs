//! Per-instance transform generation.
//!
//! Two layouts are available:
//!
//! - [`InstanceLayout::Mobile`]: the hanging mobile, with thirteen bobs on three
//!   levels, two cross bars and five strings, [`MOBILE_INSTANCE_COUNT`] cubes in
//!   total. Its size never depends on the grid size.
//! - [`InstanceLayout::Grid`]: a jittered `grid_size³` block of randomly
//!   rotated cubes, filling the instance buffer up to its capacity.
//!
//! Every transform is rebuilt from scratch each frame. All instances share the
//! current animation angle as a rotation about the world Y axis, applied after
//! the instance's own scale and translation.

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::f32::consts::PI;

use crate::instance::InstanceRaw;

/// Number of cubes in the mobile layout.
pub const MOBILE_INSTANCE_COUNT: usize = MOBILE_PARTS.len();

/// Half-size of the grid layout in world units.
pub const GRID_EXTENT: f32 = 8.0;

const GRID_SEED: u64 = 5489;

/// Which arrangement of cubes to generate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceLayout {
    #[default]
    Mobile,
    Grid,
}

impl InstanceLayout {
    pub fn toggled(self) -> Self {
        match self {
            InstanceLayout::Mobile => InstanceLayout::Grid,
            InstanceLayout::Grid => InstanceLayout::Mobile,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InstanceLayout::Mobile => "Mobile",
            InstanceLayout::Grid => "Grid",
        }
    }

    /// Number of transforms [`generate`] emits for this layout.
    pub fn instance_count(self, grid_size: u32) -> usize {
        match self {
            InstanceLayout::Mobile => MOBILE_INSTANCE_COUNT,
            InstanceLayout::Grid => (grid_size.max(1) as usize).pow(3),
        }
    }
}

/// Scale and translation of one piece of the mobile.
struct Part {
    scale: [f32; 3],
    offset: [f32; 3],
}

const fn bob(size: f32, x: f32, y: f32, z: f32) -> Part {
    Part {
        scale: [size, size, size],
        offset: [x, y, z],
    }
}

const fn rod(scale: [f32; 3], x: f32, y: f32, z: f32) -> Part {
    Part {
        scale,
        offset: [x, y, z],
    }
}

const BAR: f32 = 0.08;

#[rustfmt::skip]
const MOBILE_PARTS: [Part; 20] = [
    // Level 1
    bob(0.7,  0.0, 4.0,  0.0),
    bob(0.6,  6.0, 6.0,  0.0),
    bob(0.6, -6.0, 6.0,  0.0),
    bob(0.6,  0.0, 6.0,  6.0),
    bob(0.6,  0.0, 6.0, -6.0),
    // Level 2
    bob(0.5,  6.0, 3.0,  0.0),
    bob(0.5, -6.0, 3.0,  0.0),
    bob(0.5,  0.0, 3.0,  6.0),
    bob(0.5,  0.0, 3.0, -6.0),
    // Level 3
    bob(0.5,  6.0, 0.0,  0.0),
    bob(0.5, -6.0, 0.0,  0.0),
    bob(0.5,  0.0, 0.0,  6.0),
    bob(0.5,  0.0, 0.0, -6.0),
    // Cross bars
    rod([6.0, BAR, BAR], 0.0, 8.0, 0.0),
    rod([BAR, BAR, 6.0], 0.0, 8.0, 0.0),
    // Strings
    rod([BAR, 2.0, BAR],  0.0, 6.0,  0.0),
    rod([BAR, 4.0, BAR],  6.0, 4.0,  0.0),
    rod([BAR, 4.0, BAR],  0.0, 4.0,  6.0),
    rod([BAR, 4.0, BAR], -6.0, 4.0,  0.0),
    rod([BAR, 4.0, BAR],  0.0, 4.0, -6.0),
];

/// Scale, then translate, then rotate about Y by `angle`.
fn spun(scale: Vec3, offset: Vec3, angle: f32) -> Mat4 {
    Mat4::from_rotation_y(angle) * Mat4::from_translation(offset) * Mat4::from_scale(scale)
}

/// Generate the transforms for `layout` at the given animation angle.
///
/// `grid_size` only affects [`InstanceLayout::Grid`].
pub fn generate(layout: InstanceLayout, angle: f32, grid_size: u32) -> Vec<InstanceRaw> {
    match layout {
        InstanceLayout::Mobile => mobile(angle),
        InstanceLayout::Grid => grid(angle, grid_size),
    }
}

/// The mobile layout at `angle`.
pub fn mobile(angle: f32) -> Vec<InstanceRaw> {
    MOBILE_PARTS
        .iter()
        .map(|part| {
            let matrix = spun(part.scale.into(), part.offset.into(), angle);
            InstanceRaw::from_matrix(matrix)
        })
        .collect()
}

/// A `grid_size³` block of jittered, randomly rotated cubes spun by `angle`.
///
/// The random stream is reseeded on every call so the block is identical from
/// frame to frame; only the shared spin changes.
pub fn grid(angle: f32, grid_size: u32) -> Vec<InstanceRaw> {
    let size = grid_size.max(1);
    let fsize = size as f32;
    let base_scale = 0.6 / fsize;

    let mut rng = StdRng::seed_from_u64(GRID_SEED);
    let mut instances = Vec::with_capacity((size as usize).pow(3));

    for x in 0..size {
        for y in 0..size {
            for z in 0..size {
                let mut axis = |i: u32| {
                    let jitter: f32 = rng.random_range(-0.15..0.15);
                    2.0 * (i as f32 + 0.5 + jitter) / fsize - 1.0
                };
                let offset = Vec3::new(axis(x), axis(y), axis(z)) * GRID_EXTENT;
                let scale = base_scale * rng.random_range(0.3f32..1.0) * GRID_EXTENT;

                let tumble = Mat4::from_rotation_z(rng.random_range(-PI..PI))
                    * Mat4::from_rotation_y(rng.random_range(-PI..PI))
                    * Mat4::from_rotation_x(rng.random_range(-PI..PI));

                let matrix = spun(Vec3::splat(scale), offset, angle) * tumble;
                instances.push(InstanceRaw::from_matrix(matrix));
            }
        }
    }

    instances
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn matrix(instance: &InstanceRaw) -> Mat4 {
        Mat4::from_cols_array_2d(&instance.model)
    }

    #[test]
    fn mobile_is_deterministic() {
        for angle in [0.0, 0.01, 0.785, 12.5] {
            assert_eq!(mobile(angle), mobile(angle));
        }
    }

    #[test]
    fn mobile_count_ignores_grid_size() {
        for grid_size in [1, 3, 16, 32] {
            let instances = generate(InstanceLayout::Mobile, 0.3, grid_size);
            assert_eq!(instances.len(), MOBILE_INSTANCE_COUNT);
        }
        assert_eq!(MOBILE_INSTANCE_COUNT, 20);
    }

    #[test]
    fn center_bob_at_rest() {
        let center = matrix(&mobile(0.0)[0]);
        let expected = Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0))
            * Mat4::from_scale(Vec3::splat(0.7));
        assert!(center.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn scale_applies_before_translation() {
        // Right level-2 bob: a unit corner should land at 6 + 0.5 * 0.5.
        let right = matrix(&mobile(0.0)[5]);
        let corner = right.transform_point3(Vec3::splat(0.5));
        assert!(corner.abs_diff_eq(Vec3::new(6.25, 3.25, 0.25), 1e-5));
    }

    #[test]
    fn angle_rotates_about_world_y() {
        // Quarter turn carries the right bob (+X) onto -Z.
        let right = matrix(&mobile(FRAC_PI_2)[1]);
        let center = right.transform_point3(Vec3::ZERO);
        assert!(center.abs_diff_eq(Vec3::new(0.0, 6.0, -6.0), 1e-5));
    }

    #[test]
    fn grid_emits_cube_of_instances() {
        assert_eq!(grid(0.0, 4).len(), 64);
        assert_eq!(grid(0.0, 0).len(), 1);
        assert_eq!(InstanceLayout::Grid.instance_count(4), 64);
    }

    #[test]
    fn grid_is_stable_across_frames() {
        assert_eq!(grid(0.5, 5), grid(0.5, 5));
    }

    #[test]
    fn grid_stays_within_extent() {
        for instance in grid(0.0, 6) {
            let center = matrix(&instance).transform_point3(Vec3::ZERO);
            assert!(center.abs().max_element() <= GRID_EXTENT);
        }
    }

    #[test]
    fn layout_toggles() {
        assert_eq!(InstanceLayout::Mobile.toggled(), InstanceLayout::Grid);
        assert_eq!(InstanceLayout::Grid.toggled(), InstanceLayout::Mobile);
    }
}
