use std::{error, fmt};

/// Unified error type
///
/// Errors are reported for data that is structurally broken, such as keyframes
/// that would cause a division by zero or bindings that point past the end of
/// the skeleton. Numeric corner cases that have a defined fallback (a zero
/// length dual quaternion, a vertex without weights) are not errors.
#[derive(Debug)]
pub enum SnError {
    InvalidAlgorithm(u32),
    InvalidDuration(f32),
    EmptyChannel(String),
    NoKeyframes,
    UnsortedKeyframes(String),
    DegenerateKeyframes { start: f32, end: f32 },
    NodeNotFound(usize),
    BoneOutOfRange { vertex: usize, bone: usize },
    ParentOutOfRange { bone: usize, parent: usize },
    BindingCountMismatch { vertices: usize, bindings: usize },
    AttributeCountMismatch { vertices: usize, attributes: usize },
    NoTriangles,
    IndexOutOfRange(u32),
    TransformCount { expected: usize, found: usize },
    ScaledBone(usize),
    TrackNotFound(usize),
    SerdeYamlError(Box<serde_yaml::Error>),
    StdIoError(std::io::Error),
}

impl error::Error for SnError {}

impl fmt::Display for SnError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidAlgorithm(a) => {
                write!(f, "skinning algorithm {a} is not valid")
            }
            Self::InvalidDuration(d) => {
                write!(f, "animation duration {d} must be greater than zero")
            }
            Self::EmptyChannel(name) => {
                write!(f, "channel for node {name:?} has an empty key sequence")
            }
            Self::NoKeyframes => write!(f, "no keyframes to interpolate"),
            Self::UnsortedKeyframes(name) => {
                write!(f, "channel for node {name:?} has keys out of order")
            }
            Self::DegenerateKeyframes { start, end } => {
                write!(f, "keyframes at {start} and {end} have no time between")
            }
            Self::NodeNotFound(a) => write!(f, "node {a} is not in the tree"),
            Self::BoneOutOfRange { vertex, bone } => {
                write!(f, "vertex {vertex} is bound to missing bone {bone}")
            }
            Self::ParentOutOfRange { bone, parent } => {
                write!(f, "bone {bone} has missing parent {parent}")
            }
            Self::BindingCountMismatch { vertices, bindings } => {
                write!(
                    f,
                    "mesh has {vertices} vertices but {bindings} bindings"
                )
            }
            Self::AttributeCountMismatch {
                vertices,
                attributes,
            } => {
                write!(
                    f,
                    "mesh has {vertices} positions but {attributes} attributes"
                )
            }
            Self::NoTriangles => {
                write!(f, "index count is not a multiple of three")
            }
            Self::IndexOutOfRange(a) => {
                write!(f, "index {a} does not refer to a vertex")
            }
            Self::TransformCount { expected, found } => {
                write!(
                    f,
                    "expected {expected} bone transforms but found {found}"
                )
            }
            Self::ScaledBone(a) => {
                write!(f, "bone {a} has a scaled transform")
            }
            Self::TrackNotFound(a) => {
                write!(f, "animation track {a} does not exist")
            }
            Self::SerdeYamlError(e) => {
                write!(f, "serde_yaml::Error: {e}")
            }
            Self::StdIoError(e) => write!(f, "std::io::Error: {}", e.kind()),
        }
    }
}

impl From<serde_yaml::Error> for SnError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::SerdeYamlError(Box::new(e))
    }
}

impl From<std::io::Error> for SnError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}
