//! Node transforms and incremental rotations
use nalgebra::{Matrix4, Translation3, UnitQuaternion, Vector3};

/// Local transform of a scene node: scale, then rotate, then translate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: f32,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: 1.0,
        }
    }

    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vector3::new(x, y, z),
            ..Self::identity()
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Translation3::from(self.translation).to_homogeneous()
            * self.rotation.to_homogeneous()
            * Matrix4::new_scaling(self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Incremental screen-driven rotation: yaw about world Y, then pitch about world X.
///
/// Left-multiplying the result onto an orientation applies both in world space,
/// so repeated drags never accumulate gimbal lock.
pub fn yaw_pitch_delta(yaw: f32, pitch: f32) -> UnitQuaternion<f32> {
    let delta_yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw);
    let delta_pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch);
    delta_pitch * delta_yaw
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_identity_transform() {
        let transform = Transform::identity();
        assert!(transform.is_identity());
        assert!((transform.matrix() - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_transform_order() {
        let transform = Transform {
            translation: Vector3::new(1.0, 0.0, 0.0),
            rotation: UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2),
            scale: 2.0,
        };
        let p = transform.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_yaw_only_delta() {
        let delta = yaw_pitch_delta(0.25, 0.0);
        let (axis, angle) = delta.axis_angle().unwrap();
        assert_relative_eq!(angle, 0.25, epsilon = 1e-5);
        assert_relative_eq!(axis.into_inner(), Vector3::y(), epsilon = 1e-5);
    }

    #[test]
    fn test_pitch_applied_after_yaw() {
        let delta = yaw_pitch_delta(0.3, 0.2);
        let expected = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.2)
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.3);
        assert_relative_eq!(delta, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_delta_is_identity() {
        assert_eq!(yaw_pitch_delta(0.0, 0.0), UnitQuaternion::identity());
    }
}
