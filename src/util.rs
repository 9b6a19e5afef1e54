//! A module of utility functions
use nalgebra_glm as glm;

/// Transforms a 3D position using a 4x4 matrix and return as a `glm::Vec3`.
/// The result is divided by the homogeneous `w` only when `w > 1`. A blended
/// skinning matrix can have a `w` below one and is then left as is.
#[must_use]
pub fn transform(position: &glm::Vec3, matrix: &glm::Mat4) -> glm::Vec3 {
    let ws = glm::vec4(position.x, position.y, position.z, 1.0f32);
    let vs = matrix * ws;
    if vs.w > 1.0 {
        glm::vec3(vs.x / vs.w, vs.y / vs.w, vs.z / vs.w)
    } else {
        glm::vec3(vs.x, vs.y, vs.z)
    }
}

/// Splits a 4x4 matrix into its upper 3x3 part and its translation
#[must_use]
pub fn rotation_translation(matrix: &glm::Mat4) -> (glm::Mat3, glm::Vec3) {
    (
        glm::mat4_to_mat3(matrix),
        glm::vec3(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]),
    )
}

/// Returns the rotation about Z in radians from the Euler decomposition of a
/// rotation matrix
#[must_use]
pub fn z_angle(rotation: &glm::Mat3) -> f32 {
    rotation[(1, 0)].atan2(rotation[(0, 0)])
}

/// Checks that the upper 3x3 part of a matrix is orthonormal, meaning the
/// transform has no scale or shear
#[must_use]
pub fn is_rigid(matrix: &glm::Mat4, epsilon: f32) -> bool {
    let m = glm::mat4_to_mat3(matrix);
    let c0 = m.column(0);
    let c1 = m.column(1);
    let c2 = m.column(2);
    (c0.norm() - 1.0).abs() < epsilon
        && (c1.norm() - 1.0).abs() < epsilon
        && (c2.norm() - 1.0).abs() < epsilon
        && c0.dot(&c1).abs() < epsilon
        && c1.dot(&c2).abs() < epsilon
        && c2.dot(&c0).abs() < epsilon
}

#[cfg(test)]
mod tests {
    use nalgebra_glm as glm;

    const EPSILON: f32 = 0.0001_f32;

    #[test]
    fn transform_w() {
        let p = glm::vec3(1.0, 2.0, 3.0);
        let m = glm::translation(&glm::vec3(1.0, 0.0, 0.0));
        assert_eq!(super::transform(&p, &m), glm::vec3(2.0, 2.0, 3.0));

        // w of 2 is divided out
        let m = glm::Mat4::identity() * 2.0;
        let res = super::transform(&p, &m);
        let c = glm::equal_eps(&res, &p, EPSILON);
        assert!(c.x && c.y && c.z);

        // w of 0.5 is left alone
        let m = glm::Mat4::identity() * 0.5;
        let res = super::transform(&p, &m);
        let c = glm::equal_eps(&res, &(p * 0.5), EPSILON);
        assert!(c.x && c.y && c.z);
    }

    #[test]
    fn z_angle() {
        let m = glm::rotation(0.7_f32, &glm::vec3(0.0, 0.0, 1.0));
        let (r, t) = super::rotation_translation(
            &(glm::translation(&glm::vec3(4.0, 5.0, 6.0)) * m),
        );
        assert!((super::z_angle(&r) - 0.7).abs() < EPSILON);
        assert_eq!(t, glm::vec3(4.0, 5.0, 6.0));
    }

    #[test]
    fn is_rigid() {
        let m = glm::translation(&glm::vec3(4.0, 5.0, 6.0))
            * glm::rotation(1.2_f32, &glm::vec3(0.0, 0.6, 0.8));
        assert!(super::is_rigid(&m, 0.001));
        let m = m * glm::scaling(&glm::vec3(1.0, 1.5, 1.0));
        assert!(!super::is_rigid(&m, 0.001));
    }
}
