//! Side classification and light-coupling coordinates
//!
//! Sides number the six axis directions `0..6` as -Y, +Y, -Z, +Z, -X, +X.
//! A vertex normal classifies to the side whose axis dominates it, and the
//! light-coupling coordinate bilinearly weights the four cell corners around
//! a vertex's position on that side's tangential plane.

use glam::Vec3;

/// Unit axis for each side, indexed by side number.
pub const SIDE_AXES: [Vec3; 6] = [
    Vec3::NEG_Y,
    Vec3::Y,
    Vec3::NEG_Z,
    Vec3::Z,
    Vec3::NEG_X,
    Vec3::X,
];

/// Classify a normal to the side whose axis component dominates.
pub fn find_side(normal: Vec3) -> u8 {
    let abs = normal.abs();
    if abs.y >= abs.z && abs.y >= abs.x {
        if normal.y >= 0.0 {
            1
        } else {
            0
        }
    } else if abs.z >= abs.x {
        if normal.z >= 0.0 {
            3
        } else {
            2
        }
    } else if normal.x >= 0.0 {
        5
    } else {
        4
    }
}

/// Reference frame for derived light coordinates: positions are taken
/// relative to this origin before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightTransform {
    pub origin: Vec3,
}

impl LightTransform {
    pub fn at(origin: Vec3) -> Self {
        Self { origin }
    }
}

/// Bilinear corner weights for one vertex on one side.
///
/// The four weights cover the cell corners around the vertex's fractional
/// position on the side's tangential plane and always sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightCoord {
    pub side: u8,
    pub fa: f32,
    pub fb: f32,
    pub fc: f32,
    pub fd: f32,
}

impl LightCoord {
    /// Weights for a position local to the light transform's origin.
    pub fn compute(local: Vec3, side: u8) -> Self {
        let (u, v) = match side {
            0 | 1 => (local.x, local.z),
            2 | 3 => (local.x, local.y),
            _ => (local.y, local.z),
        };
        let u = u - u.floor();
        let v = v - v.floor();
        Self {
            side,
            fa: (1.0 - u) * (1.0 - v),
            fb: u * (1.0 - v),
            fc: (1.0 - u) * v,
            fd: u * v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_axes_roundtrip() {
        for (side, axis) in SIDE_AXES.iter().enumerate() {
            assert_eq!(find_side(*axis), side as u8);
        }
    }

    #[test]
    fn dominant_axis_wins() {
        assert_eq!(find_side(Vec3::new(0.1, 0.9, 0.2)), 1);
        assert_eq!(find_side(Vec3::new(-0.8, 0.1, 0.3)), 4);
        assert_eq!(find_side(Vec3::new(0.2, 0.1, -0.7)), 2);
    }

    #[test]
    fn weights_sum_to_one() {
        let coord = LightCoord::compute(Vec3::new(0.3, 1.7, 5.4), 1);
        let sum = coord.fa + coord.fb + coord.fc + coord.fd;
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn a_corner_position_couples_to_one_cell() {
        let coord = LightCoord::compute(Vec3::new(2.0, 0.0, 3.0), 1);
        assert_eq!(coord.fa, 1.0);
        assert_eq!(coord.fb + coord.fc + coord.fd, 0.0);
    }
}
