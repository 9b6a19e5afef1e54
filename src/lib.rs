//! Skeletal animation and CPU skinning.
//!
//! Poses are evaluated from keyframed node channels and then used to deform
//! a rest mesh with linear blend, dual quaternion or stretch/twist skinning.
pub mod animation;
pub mod animator;
pub mod dualquat;
pub mod options;
pub mod skin;
pub mod sn_error;
pub mod types;
pub mod util;
pub mod vertex;
