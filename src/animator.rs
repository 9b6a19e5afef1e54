use crate::{
    animation::{pose, AnimationTrack, NodeTree, Skeleton},
    dualquat::{self, DualQuat},
    options::SkinOptions,
    skin::{Algorithm, SkinDeformer},
    sn_error::SnError,
    vertex::DeformedMesh,
};
use log::{debug, info};
use nalgebra_glm as glm;

/// Drives one skinned mesh. Each `update` evaluates the active track at a
/// time in seconds and deforms the mesh to match. With no active track the
/// bind pose is used.
pub struct Animator {
    skeleton: Skeleton,
    nodes: NodeTree,
    tracks: Vec<AnimationTrack>,
    active: Option<usize>,
    deformer: SkinDeformer,
    options: SkinOptions,
    transforms: Vec<glm::Mat4>,
}

impl Animator {
    /// Creates an animator. Every track is validated up front so that
    /// malformed keys are reported here and not in the middle of playback.
    ///
    /// # Errors
    /// May return `SnError`
    pub fn new(
        skeleton: Skeleton,
        nodes: NodeTree,
        tracks: Vec<AnimationTrack>,
        deformer: SkinDeformer,
        options: SkinOptions,
    ) -> Result<Self, SnError> {
        for track in &tracks {
            track.validate()?;
        }
        info!(
            "Animator bones={}, nodes={}, tracks={}",
            skeleton.len(),
            nodes.nodes.len(),
            tracks.len()
        );
        let transforms = vec![glm::Mat4::identity(); skeleton.len()];
        Ok(Self {
            skeleton,
            nodes,
            tracks,
            active: None,
            deformer: deformer.with_options(&options),
            options,
            transforms,
        })
    }

    /// Selects the track to play by index, or the bind pose with `None`
    ///
    /// # Errors
    /// May return `SnError`
    pub fn set_track(&mut self, index: Option<usize>) -> Result<(), SnError> {
        if let Some(i) = index {
            let track = self.tracks.get(i).ok_or(SnError::TrackNotFound(i))?;
            debug!("track={} name={:?}", i, track.name);
        }
        self.active = index;
        Ok(())
    }

    #[must_use]
    pub const fn track(&self) -> Option<usize> {
        self.active
    }

    #[must_use]
    pub fn tracks(&self) -> &[AnimationTrack] {
        &self.tracks
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.options.algorithm = algorithm;
        self.deformer.set_algorithm(algorithm);
    }

    #[must_use]
    pub const fn options(&self) -> &SkinOptions {
        &self.options
    }

    #[must_use]
    pub const fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Evaluates the pose at `seconds` and deforms the mesh
    ///
    /// # Errors
    /// May return `SnError`
    pub fn update(&mut self, seconds: f32) -> Result<(), SnError> {
        let track = self.active.and_then(|i| self.tracks.get(i));
        pose::bone_transforms_into(
            &self.skeleton,
            &self.nodes,
            track,
            seconds,
            self.options.default_ticks_per_second,
            &mut self.transforms,
        )?;
        self.deformer.update(&self.transforms)
    }

    /// Bone transforms from the last `update`, in bone index order
    #[must_use]
    pub fn bone_transforms(&self) -> &[glm::Mat4] {
        &self.transforms
    }

    /// Bone transforms from the last `update` as dual quaternions for a
    /// renderer that skins on the GPU
    #[must_use]
    pub fn joint_dual_quats(&self) -> Vec<DualQuat> {
        self.transforms.iter().map(dualquat::from_mat4).collect()
    }

    #[must_use]
    pub fn deformed(&self) -> DeformedMesh<'_> {
        self.deformer.deformed()
    }

    #[must_use]
    pub const fn deformer(&self) -> &SkinDeformer {
        &self.deformer
    }
}

#[cfg(test)]
mod tests {
    use super::Animator;
    use crate::{
        animation::{
            AnimationTrack, NodeChannel, NodeTree, QuatKey, Skeleton, VectorKey,
        },
        dualquat,
        options::SkinOptions,
        skin::{Algorithm, SkinDeformer, VertexBinding},
        sn_error::SnError,
        vertex::RestMesh,
    };
    use nalgebra_glm as glm;

    const EPSILON: f32 = 0.0005_f32;

    // A single bone at the origin spinning a quarter turn about Z
    fn granary() -> Animator {
        let nodes = NodeTree::new("spin", glm::Mat4::identity());
        let mut skeleton = Skeleton::default();
        skeleton.add_bone("spin", glm::Mat4::identity());
        let mut track = AnimationTrack::new("quarter", 10.0, 10.0);
        track.add_channel(
            "spin",
            NodeChannel {
                scaling: vec![VectorKey {
                    time: 0.0,
                    value: glm::vec3(1.0, 1.0, 1.0),
                }],
                rotation: vec![
                    QuatKey {
                        time: 0.0,
                        value: glm::Quat::identity(),
                    },
                    QuatKey {
                        time: 10.0,
                        value: glm::quat_angle_axis(
                            std::f32::consts::FRAC_PI_2,
                            &glm::vec3(0.0, 0.0, 1.0),
                        ),
                    },
                ],
                position: vec![VectorKey {
                    time: 0.0,
                    value: glm::vec3(0.0, 0.0, 0.0),
                }],
            },
        );
        let mesh = RestMesh {
            positions: vec![glm::vec3(1.0, 0.0, 0.0).into()],
            attributes: Vec::new(),
            indices: Vec::new(),
        };
        let deformer = SkinDeformer::new(
            mesh,
            vec![VertexBinding::from([(0, 1.0)])],
            &skeleton,
        )
        .unwrap();
        Animator::new(
            skeleton,
            nodes,
            vec![track],
            deformer,
            SkinOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn set_track() {
        let mut animator = granary();
        assert!(matches!(
            animator.set_track(Some(1)),
            Err(SnError::TrackNotFound(1))
        ));
        assert_eq!(animator.track(), None);
        animator.set_track(Some(0)).unwrap();
        assert_eq!(animator.track(), Some(0));
    }

    #[test]
    fn update() {
        let mut animator = granary();
        animator.update(0.5).unwrap();
        // Bind pose without a track
        let p: glm::Vec3 = animator.deformed().positions[0].into();
        assert_eq!(p, glm::vec3(1.0, 0.0, 0.0));

        animator.set_track(Some(0)).unwrap();
        for algorithm in [
            Algorithm::LinearBlend,
            Algorithm::DualQuaternion,
            Algorithm::StretchTwist,
        ] {
            animator.set_algorithm(algorithm);
            animator.update(0.5).unwrap();
            let p: glm::Vec3 = animator.deformed().positions[0].into();
            let h = std::f32::consts::FRAC_1_SQRT_2;
            let c = glm::equal_eps(&p, &glm::vec3(h, h, 0.0), EPSILON);
            assert!(c.x && c.y && c.z, "{algorithm} {p:?}");
        }
        assert_eq!(animator.options().algorithm, Algorithm::StretchTwist);
    }

    #[test]
    fn joint_dual_quats() {
        let mut animator = granary();
        animator.set_track(Some(0)).unwrap();
        animator.update(1.0 - 1.0e-6).unwrap();
        let dqs = animator.joint_dual_quats();
        assert_eq!(dqs.len(), 1);
        assert!(dualquat::is_unit(&dqs[0]));
        let p = dualquat::transform_point(&dqs[0], &glm::vec3(1.0, 0.0, 0.0));
        let c = glm::equal_eps(&p, &glm::vec3(0.0, 1.0, 0.0), 0.001);
        assert!(c.x && c.y && c.z, "{p:?}");
    }

    #[test]
    fn bad_track() {
        let mut animator = granary();
        let mut tracks = animator.tracks().to_vec();
        tracks[0].duration = -1.0;
        let deformer = animator.deformer().clone();
        let skeleton = animator.skeleton().clone();
        let res = Animator::new(
            skeleton,
            NodeTree::new("spin", glm::Mat4::identity()),
            tracks,
            deformer,
            SkinOptions::default(),
        );
        assert!(matches!(res, Err(SnError::InvalidDuration(_))));
        // Unchanged animator still works
        assert!(animator.update(0.0).is_ok());
    }
}
