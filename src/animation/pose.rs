use super::{
    types::{AnimationTrack, NodeTree, Skeleton},
    util,
};
use crate::{sn_error::SnError, types::DEFAULT_TICKS_PER_SECOND};
use log::{debug, trace};
use nalgebra_glm as glm;

/// Converts a time in seconds to ticks within the track. The result is
/// wrapped into `[0, duration)` for any input, including negative times.
/// A track reporting no ticks per second uses `default_tps`.
///
/// # Errors
/// May return `SnError`
pub fn ticks(
    track: &AnimationTrack,
    seconds: f32,
    default_tps: f32,
) -> Result<f32, SnError> {
    let duration = track.duration;
    if duration.is_nan() || duration <= 0.0 {
        return Err(SnError::InvalidDuration(duration));
    }
    let tps = if track.ticks_per_second > 0.0 {
        track.ticks_per_second
    } else {
        default_tps
    };
    let time = (seconds * tps).rem_euclid(duration);
    // `rem_euclid` can round up to exactly `duration` for tiny negatives
    Ok(if time < duration { time } else { 0.0 })
}

// Call with the root node to recursively calculate node transforms. Bone
// nodes also get their final transform written to `output`, keyed by bone
// index.
fn traverse(
    skeleton: &Skeleton,
    nodes: &NodeTree,
    track: Option<&AnimationTrack>,
    node_index: usize,
    time: f32,
    parent: &glm::Mat4,
    output: &mut [glm::Mat4],
) -> Result<(), SnError> {
    let Some(node) = nodes.get(node_index) else {
        debug!("node_index={} not in tree", node_index);
        return Err(SnError::NodeNotFound(node_index));
    };

    // Nodes without keys use their static transform
    let local = match track.and_then(|t| t.channel(&node.name)) {
        Some(channel) => util::local_transform(channel, time)?,
        None => node.transform,
    };
    let global = parent * local;

    if let Some(bone_index) = skeleton.bone_index(&node.name) {
        if let (Some(bone), Some(out)) =
            (skeleton.bones.get(bone_index), output.get_mut(bone_index))
        {
            *out = skeleton.global_inverse * global * bone.bind;
        }
    }

    for child_index in &node.children {
        traverse(
            skeleton,
            nodes,
            track,
            *child_index,
            time,
            &global,
            output,
        )?;
    }
    Ok(())
}

/// Calculates final bone transforms for a track at an arbitrary time in
/// seconds. Each transform takes a rest pose mesh space point to its
/// animated position. Data is written to the provided mutable slice, which
/// is first reset to identity, and stops at the end of the skeleton or the
/// end of the slice. With no track the bind pose is evaluated.
///
/// # Errors
/// May return `SnError`
pub fn bone_transforms_into(
    skeleton: &Skeleton,
    nodes: &NodeTree,
    track: Option<&AnimationTrack>,
    seconds: f32,
    default_tps: f32,
    output: &mut [glm::Mat4],
) -> Result<(), SnError> {
    output.fill(glm::Mat4::identity());
    if skeleton.is_empty() {
        return Ok(());
    }
    let time = match track {
        Some(t) => ticks(t, seconds, default_tps)?,
        None => 0.0,
    };
    trace!("seconds={} ticks={}", seconds, time);
    traverse(
        skeleton,
        nodes,
        track,
        nodes.root,
        time,
        &glm::Mat4::identity(),
        output,
    )
}

/// Returns the final bone transforms for a track at an arbitrary time in
/// seconds. One transform per bone, in bone index order.
///
/// # Errors
/// May return `SnError`
pub fn bone_transforms(
    skeleton: &Skeleton,
    nodes: &NodeTree,
    track: Option<&AnimationTrack>,
    seconds: f32,
) -> Result<Vec<glm::Mat4>, SnError> {
    let mut output = vec![glm::Mat4::identity(); skeleton.len()];
    bone_transforms_into(
        skeleton,
        nodes,
        track,
        seconds,
        DEFAULT_TICKS_PER_SECOND,
        &mut output,
    )?;
    Ok(output)
}
