use nalgebra::UnitQuaternion;
use nalgebra_glm as glm;

/// Tolerance used by `is_unit`
pub const UNIT_EPSILON: f32 = 0.0001;

/// Dual quaternion
///
/// The real part holds the rotation. The dual part holds the translation but
/// is also affected by the rotation: for a rotation `r` followed by a
/// translation `t` the dual part is `0.5 * t * r` where `t` is used as a pure
/// quaternion (scalar part zero). Translate-then-rotate is never used.
///
/// Only rigid transforms can be represented. Converting a matrix containing
/// scale will silently lose it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DualQuat {
    pub real: glm::Quat,
    pub dual: glm::Quat,
}

impl Default for DualQuat {
    fn default() -> Self {
        Self {
            real: glm::quat(0.0, 0.0, 0.0, 1.0),
            dual: glm::quat(0.0, 0.0, 0.0, 0.0),
        }
    }
}

impl DualQuat {
    /// Creates a unit dual quaternion that rotates then translates
    #[must_use]
    pub fn new(rotation: &glm::Quat, translation: &glm::Vec3) -> Self {
        let pure = glm::quat(translation.x, translation.y, translation.z, 0.0);
        Self {
            real: *rotation,
            dual: pure * *rotation * 0.5,
        }
    }

    /// Dual quaternion with every component zero. This is the starting value
    /// for a weighted sum. Starting from the identity instead would add an
    /// extra unweighted transform into the result.
    #[must_use]
    pub fn null() -> Self {
        Self {
            real: glm::quat(0.0, 0.0, 0.0, 0.0),
            dual: glm::quat(0.0, 0.0, 0.0, 0.0),
        }
    }

    /// Converts to a unit dual quaternion in place. A zero length real part
    /// is left untouched.
    pub fn normalize(&mut self) {
        let mag = magnitude(self);
        if mag > 0.0 {
            let inv = 1.0 / mag;
            let real = self.real * inv;
            let dual = self.dual * inv;
            self.dual = dual - real * real.dot(&dual);
            self.real = real;
        }
    }
}

/// Conversion from a column major 4x4 array
impl From<[[f32; 4]; 4]> for DualQuat {
    fn from(arr: [[f32; 4]; 4]) -> Self {
        from_mat4(&arr.into())
    }
}

/// Conversion to GLSL shader ready mat2x4
impl From<DualQuat> for [[f32; 4]; 2] {
    fn from(dq: DualQuat) -> [[f32; 4]; 2] {
        [
            [
                dq.real.coords.x,
                dq.real.coords.y,
                dq.real.coords.z,
                dq.real.coords.w,
            ],
            [
                dq.dual.coords.x,
                dq.dual.coords.y,
                dq.dual.coords.z,
                dq.dual.coords.w,
            ],
        ]
    }
}

#[must_use]
pub fn add(q1: &DualQuat, q2: &DualQuat) -> DualQuat {
    DualQuat {
        real: q1.real + q2.real,
        dual: q1.dual + q2.dual,
    }
}

#[must_use]
pub fn sub(q1: &DualQuat, q2: &DualQuat) -> DualQuat {
    DualQuat {
        real: q1.real - q2.real,
        dual: q1.dual - q2.dual,
    }
}

/// Multiplication. The order matters: `mul(a, b)` applies `b` first.
#[must_use]
pub fn mul(q1: &DualQuat, q2: &DualQuat) -> DualQuat {
    DualQuat {
        real: q1.real * q2.real,
        dual: q1.real * q2.dual + q1.dual * q2.real,
    }
}

#[must_use]
pub fn scale(q: &DualQuat, s: f32) -> DualQuat {
    DualQuat {
        real: q.real * s,
        dual: q.dual * s,
    }
}

#[must_use]
pub fn negate(q: &DualQuat) -> DualQuat {
    DualQuat {
        real: -q.real,
        dual: -q.dual,
    }
}

/// Conjugate that combines the quaternion and dual number conjugates:
/// `r* - d*ϵ`. This is the one needed for the sandwich product in
/// `transform_point`.
#[must_use]
pub fn conjugate(q: &DualQuat) -> DualQuat {
    DualQuat {
        real: q.real.conjugate(),
        dual: -q.dual.conjugate(),
    }
}

/// Length of the real part
#[must_use]
pub fn magnitude(q: &DualQuat) -> f32 {
    q.real.dot(&q.real).sqrt()
}

/// Returns a unit copy. See `DualQuat::normalize`.
#[must_use]
pub fn normalize(q: &DualQuat) -> DualQuat {
    let mut n = *q;
    n.normalize();
    n
}

/// Checks `r* d + d* r == 0` and `|r| == 1` within `UNIT_EPSILON`
#[must_use]
pub fn is_unit(q: &DualQuat) -> bool {
    let c = q.real.conjugate() * q.dual + q.dual.conjugate() * q.real;
    c.coords.amax() < UNIT_EPSILON && (magnitude(q) - 1.0).abs() < UNIT_EPSILON
}

/// Translation of a unit dual quaternion: `2 * d * r*`
#[must_use]
pub fn translation(q: &DualQuat) -> glm::Vec3 {
    let t = q.dual * 2.0 * q.real.conjugate();
    glm::vec3(t.i, t.j, t.k)
}

/// Splits a unit dual quaternion into rotation and translation
#[must_use]
pub fn decompose(q: &DualQuat) -> (glm::Quat, glm::Vec3) {
    (q.real, translation(q))
}

/// Dual quaternion representing a point, for use in `transform_point`
#[must_use]
pub fn point(p: &glm::Vec3) -> DualQuat {
    DualQuat {
        real: glm::quat(0.0, 0.0, 0.0, 1.0),
        dual: glm::quat(p.x, p.y, p.z, 0.0),
    }
}

/// Transforms a point with the sandwich product `q p q⋄`. Not valid for
/// transforms containing scale.
#[must_use]
pub fn transform_point(q: &DualQuat, p: &glm::Vec3) -> glm::Vec3 {
    let n = normalize(q);
    let r = mul(&mul(&n, &point(p)), &conjugate(&n));
    translation(&r) * 0.5
}

/// Converts a unit dual quaternion to a 4x4 matrix
#[must_use]
pub fn to_mat4(q: &DualQuat) -> glm::Mat4 {
    let mut m = glm::quat_to_mat4(&q.real);
    let t = translation(q);
    m[(0, 3)] = t.x;
    m[(1, 3)] = t.y;
    m[(2, 3)] = t.z;
    m
}

/// Converts a rigid 4x4 matrix to a unit dual quaternion
#[must_use]
pub fn from_mat4(m: &glm::Mat4) -> DualQuat {
    let real = glm::to_quat(m);
    let pure = glm::quat(m[(0, 3)], m[(1, 3)], m[(2, 3)], 0.0);
    let mut dq = DualQuat {
        real,
        dual: pure * real * 0.5,
    };
    dq.normalize();
    dq
}

/// Dual quaternion linear blending of two transforms. `t` is the weight of
/// `q2`. The sign of `q2` is chosen so the blend takes the short way round.
#[must_use]
pub fn dlb(q1: &DualQuat, q2: &DualQuat, t: f32) -> DualQuat {
    let w2 = if q1.real.dot(&q2.real) < 0.0 { -t } else { t };
    normalize(&add(&scale(q1, 1.0 - t), &scale(q2, w2)))
}

/// Rotates a vector by a quaternion, which is normalized first
#[must_use]
pub fn rotate_vector(q: &glm::Quat, v: &glm::Vec3) -> glm::Vec3 {
    glm::quat_rotate_vec3(&glm::quat_normalize(q), v)
}

/// Shortest path spherical interpolation followed by renormalization.
/// Nearly identical inputs use a normalized lerp instead.
#[must_use]
pub fn slerp(q1: &glm::Quat, q2: &glm::Quat, t: f32) -> glm::Quat {
    let u1 = UnitQuaternion::from_quaternion(*q1);
    let u2 = UnitQuaternion::from_quaternion(*q2);
    u1.try_slerp(&u2, t, f32::EPSILON).map_or_else(
        || {
            let end = if q1.dot(q2) < 0.0 { -*q2 } else { *q2 };
            glm::quat_normalize(&(*q1 * (1.0 - t) + end * t))
        },
        |q| glm::quat_normalize(&q.into_inner()),
    )
}
