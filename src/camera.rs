//! Fixed camera views and projection for the mobile scene.
//!
//! The scene sits 40 units in front of a camera at the origin looking down +Z,
//! with a left-handed perspective projection (depth 0..1). Each [`CameraMode`]
//! orbits the scene to one of five fixed viewpoints by rotating it in place
//! before pushing it away from the camera.

use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

/// Distance from the camera to the scene origin.
pub const VIEW_DISTANCE: f32 = 40.0;
/// Vertical field of view in radians.
pub const FOV_Y: f32 = FRAC_PI_4;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;

const DEFAULT_TILT: f32 = -0.3;

/// One of the five fixed viewpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraMode {
    /// Slightly tilted front view.
    #[default]
    Default,
    Front,
    Top,
    Side,
    Bottom,
}

impl CameraMode {
    pub const ALL: [CameraMode; 5] = [
        CameraMode::Default,
        CameraMode::Front,
        CameraMode::Top,
        CameraMode::Side,
        CameraMode::Bottom,
    ];

    /// Map a selector index to a mode. Anything outside 0–4 is [`CameraMode::Default`].
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => CameraMode::Front,
            2 => CameraMode::Top,
            3 => CameraMode::Side,
            4 => CameraMode::Bottom,
            _ => CameraMode::Default,
        }
    }

    pub fn index(self) -> usize {
        match self {
            CameraMode::Default => 0,
            CameraMode::Front => 1,
            CameraMode::Top => 2,
            CameraMode::Side => 3,
            CameraMode::Bottom => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CameraMode::Default => "Default",
            CameraMode::Front => "Front",
            CameraMode::Top => "Top",
            CameraMode::Side => "Side",
            CameraMode::Bottom => "Bottom",
        }
    }

    /// World-to-view matrix: rotate the scene, then move it out to [`VIEW_DISTANCE`].
    pub fn view_matrix(self) -> Mat4 {
        let rotation = match self {
            CameraMode::Default => Mat4::from_rotation_x(DEFAULT_TILT),
            CameraMode::Front => Mat4::IDENTITY,
            CameraMode::Top => Mat4::from_rotation_x(-FRAC_PI_2),
            CameraMode::Side => Mat4::from_rotation_y(FRAC_PI_2),
            CameraMode::Bottom => Mat4::from_rotation_x(FRAC_PI_2),
        };
        Mat4::from_translation(Vec3::new(0.0, 0.0, VIEW_DISTANCE)) * rotation
    }
}

/// Rotation the presentation surface applies relative to the display.
///
/// Desktop surfaces are never rotated; rotated variants exist for displays that
/// present in a different orientation than they render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SurfaceRotation {
    #[default]
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl SurfaceRotation {
    /// Pre-transform that counter-rotates view space about the view axis.
    pub fn pretransform(self) -> Mat4 {
        let angle = match self {
            SurfaceRotation::Identity => return Mat4::IDENTITY,
            SurfaceRotation::Rotate90 => FRAC_PI_2,
            SurfaceRotation::Rotate180 => 2.0 * FRAC_PI_2,
            SurfaceRotation::Rotate270 => 3.0 * FRAC_PI_2,
        };
        Mat4::from_rotation_z(-angle)
    }

    /// Whether width and height trade places on the rotated surface.
    pub fn swaps_axes(self) -> bool {
        matches!(self, SurfaceRotation::Rotate90 | SurfaceRotation::Rotate270)
    }
}

/// Perspective projection for a surface of the given aspect ratio.
///
/// A rotated surface renders with its axes swapped, so the aspect is inverted.
pub fn projection_matrix(aspect: f32, rotation: SurfaceRotation) -> Mat4 {
    let aspect = if rotation.swaps_axes() {
        1.0 / aspect
    } else {
        aspect
    };
    Mat4::perspective_lh(FOV_Y, aspect, NEAR, FAR)
}

/// Combined view-projection: view, then surface pre-transform, then projection.
pub fn view_projection(mode: CameraMode, aspect: f32, rotation: SurfaceRotation) -> Mat4 {
    projection_matrix(aspect, rotation) * rotation.pretransform() * mode.view_matrix()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn back() -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, 40.0))
    }

    #[test]
    fn documented_views() {
        let cases = [
            (0, back() * Mat4::from_rotation_x(-0.3)),
            (1, back()),
            (2, back() * Mat4::from_rotation_x(-FRAC_PI_2)),
            (3, back() * Mat4::from_rotation_y(FRAC_PI_2)),
            (4, back() * Mat4::from_rotation_x(FRAC_PI_2)),
        ];

        for (index, expected) in cases {
            let view = CameraMode::from_index(index).view_matrix();
            assert!(view.abs_diff_eq(expected, 1e-6), "mode {index}");
        }
    }

    #[test]
    fn views_are_distinct() {
        for a in CameraMode::ALL {
            for b in CameraMode::ALL {
                if a != b {
                    assert!(!a.view_matrix().abs_diff_eq(b.view_matrix(), 1e-4));
                }
            }
        }
    }

    #[test]
    fn unknown_index_falls_back_to_default() {
        for index in [-1, 5, 42, i64::MIN, i64::MAX] {
            let mode = CameraMode::from_index(index);
            assert_eq!(mode, CameraMode::Default);
            assert_eq!(mode.view_matrix(), CameraMode::from_index(0).view_matrix());
        }
    }

    #[test]
    fn index_round_trips() {
        for mode in CameraMode::ALL {
            assert_eq!(CameraMode::from_index(mode.index() as i64), mode);
        }
    }

    #[test]
    fn top_view_looks_down_on_the_mobile() {
        // The top of the cross bars sits closer to the camera than the lowest bobs.
        let view = CameraMode::Top.view_matrix();
        let bar = view.transform_point3(Vec3::new(0.0, 8.0, 0.0));
        let bob = view.transform_point3(Vec3::new(0.0, 0.0, 0.0));
        assert!(bar.z < bob.z);
    }

    #[test]
    fn scene_lands_inside_depth_range() {
        let view_proj = view_projection(CameraMode::Front, 16.0 / 9.0, SurfaceRotation::Identity);
        let clip = view_proj * Vec3::new(0.0, 4.0, 0.0).extend(1.0);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn identity_surface_has_no_pretransform() {
        assert_eq!(SurfaceRotation::Identity.pretransform(), Mat4::IDENTITY);
        assert!(!SurfaceRotation::Rotate180.swaps_axes());
        assert!(SurfaceRotation::Rotate90.swaps_axes());
    }
}
