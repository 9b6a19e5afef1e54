/// Number of bone influences stored inline per vertex. This matches the usual
/// limit for skinned meshes. Bindings with more influences are still accepted
/// but spill to the heap.
pub const MAX_INFLUENCES: usize = 4;

/// Used when an animation track reports zero ticks per second
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Tolerance for detecting scale in a bone transform
pub const RIGID_EPSILON: f32 = 0.001;
