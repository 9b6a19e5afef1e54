use super::{
    types::{Algorithm, BoneRest, TwistPose, VertexBinding},
    util::{self, Frame},
};
use crate::{
    animation::Skeleton,
    dualquat::{self, DualQuat},
    options::SkinOptions,
    sn_error::SnError,
    types::RIGID_EPSILON,
    util as math,
    vertex::{DeformedMesh, Interleaved, Position, RestMesh},
};
use log::{debug, info};
use nalgebra_glm as glm;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Deforms a rest mesh to follow the bones. The rest mesh and bindings are
/// owned and never change. The deformed positions are fully rewritten by
/// every `update`.
#[derive(Clone, Debug)]
pub struct SkinDeformer {
    algorithm: Algorithm,
    mesh: RestMesh,
    bindings: Vec<VertexBinding>,
    bones: Vec<BoneRest>,
    positions: Vec<Position>,
    dual_quats: Vec<DualQuat>,
    twists: Vec<TwistPose>,
    validate_rigid: bool,
    rigid_epsilon: f32,
}

impl SkinDeformer {
    /// Creates a deformer for a mesh. There must be one binding per vertex
    /// and every binding must refer to a bone of `skeleton`. The deformed
    /// positions start out as the rest positions.
    ///
    /// # Errors
    /// May return `SnError`
    pub fn new(
        mesh: RestMesh,
        bindings: Vec<VertexBinding>,
        skeleton: &Skeleton,
    ) -> Result<Self, SnError> {
        mesh.validate()?;
        if bindings.len() != mesh.vertex_count() {
            return Err(SnError::BindingCountMismatch {
                vertices: mesh.vertex_count(),
                bindings: bindings.len(),
            });
        }
        for (vertex, binding) in bindings.iter().enumerate() {
            if let Some(i) =
                binding.influences().iter().find(|i| i.bone >= skeleton.len())
            {
                return Err(SnError::BoneOutOfRange {
                    vertex,
                    bone: i.bone,
                });
            }
        }
        if let Some((bone, parent)) = skeleton
            .bones
            .iter()
            .enumerate()
            .find_map(|(i, b)| {
                b.parent.filter(|&p| p >= skeleton.len()).map(|p| (i, p))
            })
        {
            return Err(SnError::ParentOutOfRange { bone, parent });
        }
        let bones = skeleton
            .bones
            .iter()
            .map(|b| BoneRest {
                parent: b.parent,
                rest_position: b.rest_position,
            })
            .collect();
        info!(
            "Skin deformer vertices={}, bones={}",
            mesh.vertex_count(),
            skeleton.len()
        );
        Ok(Self {
            algorithm: Algorithm::default(),
            positions: mesh.positions.clone(),
            mesh,
            bindings,
            bones,
            dual_quats: Vec::new(),
            twists: Vec::new(),
            validate_rigid: false,
            rigid_epsilon: RIGID_EPSILON,
        })
    }

    /// Applies the algorithm and validation settings from `options`
    #[must_use]
    pub fn with_options(mut self, options: &SkinOptions) -> Self {
        self.algorithm = options.algorithm;
        self.validate_rigid = options.validate_rigid;
        self.rigid_epsilon = options.rigid_epsilon;
        self
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        debug!("skinning algorithm={}", algorithm);
        self.algorithm = algorithm;
    }

    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub const fn rest_mesh(&self) -> &RestMesh {
        &self.mesh
    }

    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Normals and texture coordinates, unchanged from the rest mesh
    #[must_use]
    pub fn attributes(&self) -> &[Interleaved] {
        &self.mesh.attributes
    }

    #[must_use]
    pub fn deformed(&self) -> DeformedMesh<'_> {
        DeformedMesh {
            positions: &self.positions,
            attributes: &self.mesh.attributes,
            indices: &self.mesh.indices,
        }
    }

    /// Recalculates every deformed position from final bone transforms in
    /// bone index order. Extra transforms are ignored. Vertices without
    /// usable weights keep their rest position.
    ///
    /// # Errors
    /// May return `SnError`
    pub fn update(&mut self, transforms: &[glm::Mat4]) -> Result<(), SnError> {
        let expected = self.bones.len();
        if transforms.len() < expected {
            return Err(SnError::TransformCount {
                expected,
                found: transforms.len(),
            });
        }
        let transforms = &transforms[..expected];

        if self.validate_rigid && self.algorithm != Algorithm::LinearBlend {
            if let Some(index) = transforms
                .iter()
                .position(|m| !math::is_rigid(m, self.rigid_epsilon))
            {
                return Err(SnError::ScaledBone(index));
            }
        }

        // Per bone conversions happen once here rather than per vertex
        self.dual_quats.clear();
        self.twists.clear();
        match self.algorithm {
            Algorithm::LinearBlend => {}
            Algorithm::DualQuaternion => {
                self.dual_quats
                    .extend(transforms.iter().map(dualquat::from_mat4));
            }
            Algorithm::StretchTwist => {
                self.twists.extend(transforms.iter().map(util::twist_pose));
            }
        }

        let frame = Frame {
            matrices: transforms,
            dual_quats: &self.dual_quats,
            twists: &self.twists,
            bones: &self.bones,
        };
        let algorithm = self.algorithm;

        // Each vertex only writes its own output slot
        #[cfg(feature = "rayon")]
        let it = self
            .positions
            .par_iter_mut()
            .zip(self.mesh.positions.par_iter())
            .zip(self.bindings.par_iter());
        #[cfg(not(feature = "rayon"))]
        let it = self
            .positions
            .iter_mut()
            .zip(self.mesh.positions.iter())
            .zip(self.bindings.iter());
        let kept: usize = it
            .map(|((out, rest), binding)| {
                let p = glm::Vec3::from(*rest);
                match util::deform(algorithm, &p, binding, &frame) {
                    Some(d) => {
                        *out = d.into();
                        0
                    }
                    None => {
                        *out = *rest;
                        1
                    }
                }
            })
            .sum();
        if kept > 0 {
            debug!("{} vertices kept their rest position", kept);
        }
        Ok(())
    }
}
