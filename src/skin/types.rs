use crate::{sn_error::SnError, types::MAX_INFLUENCES};
use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Skinning algorithm. Selectors from a UI or config file map to these as
/// 0, 1 and 2.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Weighted sum of matrices. Handles scaled bones but loses volume under
    /// large rotations.
    #[default]
    LinearBlend,
    /// Weighted sum of dual quaternions. Rigid bones only.
    DualQuaternion,
    /// Blends translation and a twist angle about Z separately. Rigid bones
    /// only, and assumes bone chains lie along +Z.
    StretchTwist,
}

impl TryFrom<u32> for Algorithm {
    type Error = SnError;

    fn try_from(value: u32) -> Result<Self, SnError> {
        match value {
            0 => Ok(Self::LinearBlend),
            1 => Ok(Self::DualQuaternion),
            2 => Ok(Self::StretchTwist),
            _ => Err(SnError::InvalidAlgorithm(value)),
        }
    }
}

impl From<Algorithm> for u32 {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::LinearBlend => 0,
            Algorithm::DualQuaternion => 1,
            Algorithm::StretchTwist => 2,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::LinearBlend => write!(f, "linear blend"),
            Self::DualQuaternion => write!(f, "dual quaternion"),
            Self::StretchTwist => write!(f, "stretch/twist"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Influence {
    pub bone: usize,
    pub weight: f32,
}

/// Bones affecting one vertex. Weights are used as given and are not
/// expected to sum to one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexBinding(pub SmallVec<[Influence; MAX_INFLUENCES]>);

impl VertexBinding {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, bone: usize, weight: f32) {
        self.0.push(Influence { bone, weight });
    }

    #[must_use]
    pub fn influences(&self) -> &[Influence] {
        &self.0
    }

    #[must_use]
    pub fn weight_sum(&self) -> f32 {
        self.0.iter().map(|i| i.weight).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<const N: usize> From<[(usize, f32); N]> for VertexBinding {
    fn from(pairs: [(usize, f32); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(bone, weight)| Influence { bone, weight })
                .collect(),
        )
    }
}

/// The parts of a bone the deformer needs, copied from the skeleton so the
/// deformer does not hold on to loader data
#[derive(Clone, Copy, Debug)]
pub struct BoneRest {
    pub parent: Option<usize>,
    pub rest_position: glm::Vec3,
}

/// Per bone data for stretch/twist skinning, calculated once per update
#[derive(Clone, Copy, Debug, Default)]
pub struct TwistPose {
    pub translation: glm::Vec3,
    pub angle: f32,
}

#[cfg(test)]
mod tests {
    use super::{Algorithm, VertexBinding};
    use crate::sn_error::SnError;

    #[test]
    fn algorithm_selector() {
        for a in [
            Algorithm::LinearBlend,
            Algorithm::DualQuaternion,
            Algorithm::StretchTwist,
        ] {
            assert_eq!(Algorithm::try_from(u32::from(a)).unwrap(), a);
        }
        assert!(matches!(
            Algorithm::try_from(3),
            Err(SnError::InvalidAlgorithm(3))
        ));
    }

    #[test]
    fn binding() {
        let mut b = VertexBinding::from([(0, 0.25), (3, 0.25)]);
        b.add(1, 0.5);
        assert_eq!(b.len(), 3);
        assert!((b.weight_sum() - 1.0).abs() < f32::EPSILON);
        assert_eq!(b.influences()[1].bone, 3);
        // More than the inline capacity still works
        b.add(2, 0.1);
        b.add(4, 0.1);
        assert_eq!(b.len(), 5);
        assert!(VertexBinding::new().is_empty());
    }
}
