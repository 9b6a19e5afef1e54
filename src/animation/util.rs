use super::types::{Keyframe, NodeChannel, QuatKey, VectorKey};
use crate::{dualquat, sn_error::SnError};
use nalgebra_glm as glm;

/// Helper to calculate the parameter used for interpolation. Keys with no
/// time between them would divide by zero so they are rejected.
fn weight(start: f32, end: f32, current: f32) -> Result<f32, SnError> {
    let delta = end - start;
    if delta.is_nan() || delta <= 0.0 {
        return Err(SnError::DegenerateKeyframes { start, end });
    }
    Ok(((current - start) / delta).clamp(0.0_f32, 1.0_f32))
}

/// Finds the pair of keys surrounding `time` and returns the index of the
/// first one with the interpolation parameter. Times past the last key use
/// the final pair. Needs at least two keys.
fn segment<K: Keyframe>(keys: &[K], time: f32) -> Result<(usize, f32), SnError> {
    let last = keys.len() - 1;
    let index = (0..last)
        .find(|&i| time < keys[i + 1].time())
        .unwrap_or(last - 1);
    Ok((index, weight(keys[index].time(), keys[index + 1].time(), time)?))
}

/// Helper shared by the three key types
fn sample<K, F>(keys: &[K], time: f32, blend: F) -> Result<K::Value, SnError>
where
    K: Keyframe,
    F: Fn(&K::Value, &K::Value, f32) -> K::Value,
{
    match keys {
        [] => Err(SnError::NoKeyframes),
        // A single key holds for all time
        [only] => Ok(only.value()),
        _ => {
            let (index, t) = segment(keys, time)?;
            Ok(blend(&keys[index].value(), &keys[index + 1].value(), t))
        }
    }
}

/// Linear interpolation of scale keys
///
/// # Errors
/// May return `SnError`
pub fn interpolate_scaling(
    keys: &[VectorKey],
    time: f32,
) -> Result<glm::Vec3, SnError> {
    sample(keys, time, |a, b, t| glm::lerp(a, b, t))
}

/// Linear interpolation of position keys
///
/// # Errors
/// May return `SnError`
pub fn interpolate_position(
    keys: &[VectorKey],
    time: f32,
) -> Result<glm::Vec3, SnError> {
    sample(keys, time, |a, b, t| glm::lerp(a, b, t))
}

/// Spherical interpolation of rotation keys
///
/// # Errors
/// May return `SnError`
pub fn interpolate_rotation(
    keys: &[QuatKey],
    time: f32,
) -> Result<glm::Quat, SnError> {
    sample(keys, time, |a, b, t| dualquat::slerp(a, b, t))
}

/// Calculates the local node transform from a channel at a time in ticks.
/// Scale is applied first, then rotation, then translation.
///
/// # Errors
/// May return `SnError`
pub fn local_transform(
    channel: &NodeChannel,
    time: f32,
) -> Result<glm::Mat4, SnError> {
    let scale = interpolate_scaling(&channel.scaling, time)?;
    let rotation = interpolate_rotation(&channel.rotation, time)?;
    let position = interpolate_position(&channel.position, time)?;
    Ok(glm::translation(&position)
        * glm::quat_to_mat4(&rotation)
        * glm::scaling(&scale))
}
