use crate::sn_error::SnError;
use ahash::{HashMap, HashMapExt};
use itertools::Itertools;
use log::debug;
use nalgebra_glm as glm;

/// A bone of a skinned mesh. `bind` is the offset matrix, which takes a mesh
/// space point into bone space in the bind pose. Since it is already the
/// inverse of the bone's placement the rest position is just its negated
/// translation.
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub bind: glm::Mat4,
    pub rest_position: glm::Vec3,
    pub parent: Option<usize>,
}

/// Bones in index order plus a name lookup. Indices are assigned by
/// `add_bone` and never change afterwards.
#[derive(Clone, Debug)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
    pub bone_map: HashMap<String, usize>,
    pub global_inverse: glm::Mat4,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new(glm::Mat4::identity())
    }
}

impl Skeleton {
    #[must_use]
    pub fn new(global_inverse: glm::Mat4) -> Self {
        Self {
            bones: Vec::new(),
            bone_map: HashMap::new(),
            global_inverse,
        }
    }

    /// Adds a bone and returns its index. A name that is already present
    /// returns the existing index and leaves that bone unchanged.
    pub fn add_bone(&mut self, name: &str, bind: glm::Mat4) -> usize {
        if let Some(index) = self.bone_map.get(name) {
            return *index;
        }
        let index = self.bones.len();
        self.bones.push(Bone {
            name: name.to_owned(),
            bind,
            rest_position: -glm::vec3(bind[(0, 3)], bind[(1, 3)], bind[(2, 3)]),
            parent: None,
        });
        self.bone_map.insert(name.to_owned(), index);
        index
    }

    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone_map.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Sets each bone's parent to the nearest ancestor node that is also a
    /// bone. Bones without such an ancestor, or without a node, are roots.
    pub fn resolve_parents(&mut self, nodes: &NodeTree) {
        for index in 0..self.bones.len() {
            let Some(node_index) = nodes.find(&self.bones[index].name) else {
                debug!("bone {:?} has no node", self.bones[index].name);
                self.bones[index].parent = None;
                continue;
            };
            let mut parent = None;
            let mut ancestor = nodes.nodes[node_index].parent;
            while let Some(a) = ancestor {
                if let Some(bone) = self.bone_map.get(&nodes.nodes[a].name) {
                    parent = Some(*bone);
                    break;
                }
                ancestor = nodes.nodes[a].parent;
            }
            self.bones[index].parent = parent;
        }
    }
}

/// Node of the scene hierarchy. Not every node is a bone.
#[derive(Clone, Debug)]
pub struct NodeInfo {
    pub name: String,
    pub transform: glm::Mat4,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Scene hierarchy stored as an arena. The root is created with the tree so
/// there is always at least one node.
#[derive(Clone, Debug)]
pub struct NodeTree {
    pub root: usize,
    pub nodes: Vec<NodeInfo>,
}

impl NodeTree {
    #[must_use]
    pub fn new(name: &str, transform: glm::Mat4) -> Self {
        Self {
            root: 0,
            nodes: vec![NodeInfo {
                name: name.to_owned(),
                transform,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Adds a node below `parent` and returns its index
    ///
    /// # Errors
    /// May return `SnError`
    pub fn add_child(
        &mut self,
        parent: usize,
        name: &str,
        transform: glm::Mat4,
    ) -> Result<usize, SnError> {
        let index = self.nodes.len();
        self.nodes
            .get_mut(parent)
            .ok_or(SnError::NodeNotFound(parent))?
            .children
            .push(index);
        self.nodes.push(NodeInfo {
            name: name.to_owned(),
            transform,
            parent: Some(parent),
            children: Vec::new(),
        });
        Ok(index)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&NodeInfo> {
        self.nodes.get(index)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }
}

/// Something with a timestamp that can be interpolated
pub trait Keyframe {
    type Value: Copy;
    fn time(&self) -> f32;
    fn value(&self) -> Self::Value;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VectorKey {
    pub time: f32,
    pub value: glm::Vec3,
}

impl Keyframe for VectorKey {
    type Value = glm::Vec3;
    fn time(&self) -> f32 {
        self.time
    }
    fn value(&self) -> glm::Vec3 {
        self.value
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuatKey {
    pub time: f32,
    pub value: glm::Quat,
}

impl Keyframe for QuatKey {
    type Value = glm::Quat;
    fn time(&self) -> f32 {
        self.time
    }
    fn value(&self) -> glm::Quat {
        self.value
    }
}

/// Keys for one node. The three sequences are timed independently. Times are
/// in ticks.
#[derive(Clone, Debug, Default)]
pub struct NodeChannel {
    pub scaling: Vec<VectorKey>,
    pub rotation: Vec<QuatKey>,
    pub position: Vec<VectorKey>,
}

fn is_sorted<K: Keyframe>(keys: &[K]) -> bool {
    keys.iter().tuple_windows().all(|(a, b)| a.time() <= b.time())
}

impl NodeChannel {
    /// True when there are no keys at all. Such a channel is ignored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scaling.is_empty()
            && self.rotation.is_empty()
            && self.position.is_empty()
    }

    /// # Errors
    /// May return `SnError`
    pub fn validate(&self, name: &str) -> Result<(), SnError> {
        if self.is_empty() {
            return Ok(());
        }
        if self.scaling.is_empty()
            || self.rotation.is_empty()
            || self.position.is_empty()
        {
            return Err(SnError::EmptyChannel(name.to_owned()));
        }
        if !(is_sorted(&self.scaling)
            && is_sorted(&self.rotation)
            && is_sorted(&self.position))
        {
            return Err(SnError::UnsortedKeyframes(name.to_owned()));
        }
        Ok(())
    }
}

/// One animation. Channels are matched to nodes by name.
#[derive(Clone, Debug)]
pub struct AnimationTrack {
    pub name: String,
    pub duration: f32,
    pub ticks_per_second: f32,
    pub channels: HashMap<String, NodeChannel>,
}

impl AnimationTrack {
    #[must_use]
    pub fn new(name: &str, duration: f32, ticks_per_second: f32) -> Self {
        Self {
            name: name.to_owned(),
            duration,
            ticks_per_second,
            channels: HashMap::new(),
        }
    }

    pub fn add_channel(&mut self, node_name: &str, channel: NodeChannel) {
        self.channels.insert(node_name.to_owned(), channel);
    }

    /// Returns the channel for a node, ignoring channels without keys
    #[must_use]
    pub fn channel(&self, node_name: &str) -> Option<&NodeChannel> {
        self.channels.get(node_name).filter(|c| !c.is_empty())
    }

    /// # Errors
    /// May return `SnError`
    pub fn validate(&self) -> Result<(), SnError> {
        if self.duration.is_nan() || self.duration <= 0.0 {
            return Err(SnError::InvalidDuration(self.duration));
        }
        for (name, channel) in &self.channels {
            channel.validate(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AnimationTrack, NodeChannel, NodeTree, QuatKey, Skeleton, VectorKey,
    };
    use crate::sn_error::SnError;
    use nalgebra_glm as glm;

    fn key(time: f32) -> VectorKey {
        VectorKey {
            time,
            value: glm::vec3(1.0, 1.0, 1.0),
        }
    }

    #[test]
    fn add_bone() {
        let bind = glm::translation(&glm::vec3(-1.0, -2.0, -3.0));
        let mut skeleton = Skeleton::default();
        assert_eq!(skeleton.add_bone("hip", bind), 0);
        assert_eq!(skeleton.add_bone("knee", glm::Mat4::identity()), 1);
        // Duplicate names keep the first index
        assert_eq!(skeleton.add_bone("hip", glm::Mat4::identity()), 0);
        assert_eq!(skeleton.len(), 2);
        assert_eq!(skeleton.bones[0].rest_position, glm::vec3(1.0, 2.0, 3.0));
        assert_eq!(skeleton.bone_index("knee"), Some(1));
        assert_eq!(skeleton.bone_index("ankle"), None);
    }

    #[test]
    fn resolve_parents() {
        // armature -> hip -> offset (not a bone) -> knee
        // The knee skips the helper node and chains to the hip, so a rig
        // exported with helper nodes between joints still forms one chain
        // for stretch/twist. Looking only at the direct parent node would
        // leave the knee as a root here.
        let mut nodes = NodeTree::new("armature", glm::Mat4::identity());
        let hip = nodes.add_child(0, "hip", glm::Mat4::identity()).unwrap();
        let offset =
            nodes.add_child(hip, "offset", glm::Mat4::identity()).unwrap();
        nodes
            .add_child(offset, "knee", glm::Mat4::identity())
            .unwrap();

        let mut skeleton = Skeleton::default();
        skeleton.add_bone("knee", glm::Mat4::identity());
        skeleton.add_bone("hip", glm::Mat4::identity());
        skeleton.add_bone("loose", glm::Mat4::identity());
        skeleton.resolve_parents(&nodes);

        assert_eq!(skeleton.bones[0].parent, Some(1));
        assert_eq!(skeleton.bones[1].parent, None);
        assert_eq!(skeleton.bones[2].parent, None);
    }

    #[test]
    fn add_child_bad_parent() {
        let mut nodes = NodeTree::new("root", glm::Mat4::identity());
        let res = nodes.add_child(4, "lost", glm::Mat4::identity());
        assert!(matches!(res, Err(SnError::NodeNotFound(4))));
    }

    #[test]
    fn validate_channel() {
        let mut channel = NodeChannel::default();
        assert!(channel.validate("a").is_ok());

        channel.scaling = vec![key(0.0), key(2.0)];
        assert!(matches!(
            channel.validate("a"),
            Err(SnError::EmptyChannel(_))
        ));

        channel.position = vec![key(3.0), key(1.0)];
        channel.rotation = vec![QuatKey {
            time: 0.0,
            value: glm::Quat::identity(),
        }];
        assert!(matches!(
            channel.validate("a"),
            Err(SnError::UnsortedKeyframes(_))
        ));

        channel.position = vec![key(1.0), key(1.0), key(3.0)];
        assert!(channel.validate("a").is_ok());
    }

    #[test]
    fn validate_track() {
        let mut track = AnimationTrack::new("walk", 0.0, 24.0);
        assert!(matches!(
            track.validate(),
            Err(SnError::InvalidDuration(_))
        ));
        track.duration = 10.0;
        track.add_channel("empty", NodeChannel::default());
        assert!(track.validate().is_ok());
        assert!(track.channel("empty").is_none());
    }
}
