//! Demo of the skinning algorithms on a twisting tube
//!
//! A tube along +Z is bound to a two bone chain. The upper bone twists half a
//! turn about Z and the radius of the ring half way up is printed for each
//! algorithm. Linear blend skinning pinches the tube as the twist approaches
//! half a turn while the other two keep its volume.
//!
//! An optional argument names a YAML file of `SkinOptions`.
use log::info;
use nalgebra_glm as glm;
use sinew::{
    animation::{
        AnimationTrack, NodeChannel, NodeTree, QuatKey, Skeleton, VectorKey,
    },
    animator::Animator,
    options::SkinOptions,
    skin::{Algorithm, SkinDeformer, VertexBinding},
    sn_error::SnError,
    vertex::RestMesh,
};

const RINGS: usize = 21;
const SEGMENTS: usize = 16;
const RADIUS: f32 = 0.5;
const HEIGHT: f32 = 2.0;
const DURATION: f32 = 20.0; // Ticks
const STEPS: usize = 8;

fn tube() -> (RestMesh, Vec<VertexBinding>) {
    let mut mesh = RestMesh::new();
    let mut bindings = Vec::new();
    for ring in 0..RINGS {
        let z = HEIGHT * ring as f32 / (RINGS - 1) as f32;
        // Fully on the lower bone below 0.5 and the upper bone above 1.5
        let w = (z - 0.5).clamp(0.0, 1.0);
        for segment in 0..SEGMENTS {
            let a = std::f32::consts::TAU * segment as f32 / SEGMENTS as f32;
            mesh.positions
                .push(glm::vec3(RADIUS * a.cos(), RADIUS * a.sin(), z).into());
            bindings.push(VertexBinding::from([(0, 1.0 - w), (1, w)]));
        }
    }
    for ring in 0..RINGS - 1 {
        for segment in 0..SEGMENTS {
            let a = (ring * SEGMENTS + segment) as u32;
            let b = (ring * SEGMENTS + (segment + 1) % SEGMENTS) as u32;
            let c = a + SEGMENTS as u32;
            let d = b + SEGMENTS as u32;
            mesh.indices.extend_from_slice(&[a, b, d, a, d, c]);
        }
    }
    (mesh, bindings)
}

fn twist_track() -> AnimationTrack {
    let z = glm::vec3(0.0, 0.0, 1.0);
    let mut track = AnimationTrack::new("twist", DURATION, 10.0);
    track.add_channel(
        "upper",
        NodeChannel {
            scaling: vec![VectorKey {
                time: 0.0,
                value: glm::vec3(1.0, 1.0, 1.0),
            }],
            // Just short of half a turn so the slerp goes the intended way
            rotation: vec![
                QuatKey {
                    time: 0.0,
                    value: glm::Quat::identity(),
                },
                QuatKey {
                    time: DURATION,
                    value: glm::quat_angle_axis(
                        std::f32::consts::PI * 0.95,
                        &z,
                    ),
                },
            ],
            position: vec![VectorKey {
                time: 0.0,
                value: z,
            }],
        },
    );
    track
}

fn build(options: SkinOptions) -> Result<Animator, SnError> {
    let mut nodes = NodeTree::new("lower", glm::Mat4::identity());
    let up = glm::translation(&glm::vec3(0.0, 0.0, 1.0));
    nodes.add_child(0, "upper", up)?;
    let mut skeleton = Skeleton::default();
    skeleton.add_bone("lower", glm::Mat4::identity());
    skeleton.add_bone("upper", glm::translation(&glm::vec3(0.0, 0.0, -1.0)));
    skeleton.resolve_parents(&nodes);

    let (mesh, bindings) = tube();
    let deformer = SkinDeformer::new(mesh, bindings, &skeleton)?;
    let tracks = vec![twist_track()];
    let mut animator =
        Animator::new(skeleton, nodes, tracks, deformer, options)?;
    animator.set_track(Some(0))?;
    Ok(animator)
}

// Mean distance from the Z axis of the ring half way up the tube
fn mid_radius(animator: &Animator) -> f32 {
    let start = (RINGS / 2) * SEGMENTS;
    let mesh = animator.deformed();
    let ring = &mesh.positions[start..start + SEGMENTS];
    ring.iter()
        .map(|p| glm::length(&glm::vec2(p.position[0], p.position[1])))
        .sum::<f32>()
        / SEGMENTS as f32
}

fn main() -> Result<(), SnError> {
    env_logger::init();

    let options = match std::env::args().nth(1) {
        Some(path) => SkinOptions::load(path)?,
        None => SkinOptions::default(),
    };
    info!("options={:?}", options);

    let mut animator = build(options)?;
    let seconds_per_step = DURATION / 10.0 / STEPS as f32;
    println!("seconds  linear   dualquat stretch/twist");
    for step in 0..STEPS {
        // Stop just short of the end so the time does not wrap to zero
        let seconds = (step + 1) as f32 * seconds_per_step - 0.001;
        let mut radii = Vec::new();
        for algorithm in [
            Algorithm::LinearBlend,
            Algorithm::DualQuaternion,
            Algorithm::StretchTwist,
        ] {
            animator.set_algorithm(algorithm);
            animator.update(seconds)?;
            radii.push(mid_radius(&animator));
        }
        println!(
            "{seconds:7.3}  {:7.4}  {:7.4}  {:7.4}",
            radii[0], radii[1], radii[2]
        );
    }
    Ok(())
}
