pub mod pose;
mod types;
pub mod util;

// Re-exports
pub use {
    pose::{bone_transforms, bone_transforms_into, ticks},
    types::{
        AnimationTrack, Bone, Keyframe, NodeChannel, NodeInfo, NodeTree,
        QuatKey, Skeleton, VectorKey,
    },
};
