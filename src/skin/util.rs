use super::types::{Algorithm, BoneRest, TwistPose, VertexBinding};
use crate::{
    dualquat::{self, DualQuat},
    util,
};
use log::trace;
use nalgebra_glm as glm;

/// Bone data for one update. `matrices` is always filled. `dual_quats` and
/// `twists` are only filled for the algorithm that needs them.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub matrices: &'a [glm::Mat4],
    pub dual_quats: &'a [DualQuat],
    pub twists: &'a [TwistPose],
    pub bones: &'a [BoneRest],
}

/// Converts a bone transform for stretch/twist use
#[must_use]
pub fn twist_pose(matrix: &glm::Mat4) -> TwistPose {
    let (rotation, translation) = util::rotation_translation(matrix);
    TwistPose {
        translation,
        angle: util::z_angle(&rotation),
    }
}

/// Linear blend skinning. The bone matrices are summed by weight starting
/// from zero and the result applied to the rest position.
#[must_use]
pub fn linear_blend(
    rest: &glm::Vec3,
    binding: &VertexBinding,
    matrices: &[glm::Mat4],
) -> glm::Vec3 {
    let total = binding
        .influences()
        .iter()
        .fold(glm::Mat4::zeros(), |acc, i| acc + matrices[i.bone] * i.weight);
    util::transform(rest, &total)
}

/// Dual quaternion skinning. Returns `None` if the blended dual quaternion
/// has no length, which happens when the weights cancel out.
#[must_use]
pub fn dual_quaternion(
    rest: &glm::Vec3,
    binding: &VertexBinding,
    dual_quats: &[DualQuat],
) -> Option<glm::Vec3> {
    let influences = binding.influences();
    let first = dual_quats[influences.first()?.bone].real;
    let total = influences.iter().fold(DualQuat::null(), |acc, i| {
        let dq = &dual_quats[i.bone];
        // q and -q are the same rotation. Flip the weight of any bone on the
        // other side of the first one so the sum does not cancel.
        let weight = if dq.real.dot(&first) < 0.0 {
            -i.weight
        } else {
            i.weight
        };
        dualquat::add(&acc, &dualquat::scale(dq, weight))
    });
    let mag = dualquat::magnitude(&total);
    if mag.is_nan() || mag <= 0.0 {
        return None;
    }
    let total = dualquat::scale(&total, 1.0 / mag);
    Some(util::transform(rest, &dualquat::to_mat4(&total)))
}

/// Stretch/twist skinning. Translation and the twist angle about Z are
/// blended separately. For a bone with a parent the twist is interpolated
/// between parent and bone by how far along the bone the vertex sits,
/// assuming the chain runs along +Z.
#[must_use]
pub fn stretch_twist(
    rest: &glm::Vec3,
    binding: &VertexBinding,
    twists: &[TwistPose],
    bones: &[BoneRest],
) -> glm::Vec3 {
    let mut position = glm::Vec3::zeros();
    let mut angle = 0.0_f32;
    for i in binding.influences() {
        let pose = &twists[i.bone];
        let bone = &bones[i.bone];
        let mut twist = pose.angle;
        if let Some(parent) = bone.parent {
            let parent_pose = &twists[parent];
            let rest_length =
                glm::distance(&bone.rest_position, &bones[parent].rest_position);
            // Coincident joints give no direction to interpolate along
            if rest_length > f32::EPSILON {
                let current_length =
                    glm::distance(&pose.translation, &parent_pose.translation);
                trace!(
                    "bone={} stretch={}",
                    i.bone,
                    current_length / rest_length
                );
                let t = (rest.z - bone.rest_position.z) / rest_length;
                // Angles rather than matrices are interpolated to avoid
                // shrinking
                twist = t * parent_pose.angle + (1.0 - t) * pose.angle;
            }
        }
        position += pose.translation * i.weight;
        angle += twist * i.weight;
    }
    position + glm::rotate_z_vec3(rest, angle)
}

/// Deforms one vertex. Returns `None` for a binding without influences or
/// with weights summing to zero, in which case the caller keeps the rest
/// position.
#[must_use]
pub fn deform(
    algorithm: Algorithm,
    rest: &glm::Vec3,
    binding: &VertexBinding,
    frame: &Frame,
) -> Option<glm::Vec3> {
    if binding.is_empty() || binding.weight_sum().abs() < f32::EPSILON {
        return None;
    }
    match algorithm {
        Algorithm::LinearBlend => {
            Some(linear_blend(rest, binding, frame.matrices))
        }
        Algorithm::DualQuaternion => {
            dual_quaternion(rest, binding, frame.dual_quats)
        }
        Algorithm::StretchTwist => {
            Some(stretch_twist(rest, binding, frame.twists, frame.bones))
        }
    }
}
