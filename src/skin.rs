mod deformer;
mod types;
pub mod util;
pub use deformer::SkinDeformer;
pub use types::{Algorithm, BoneRest, Influence, TwistPose, VertexBinding};
