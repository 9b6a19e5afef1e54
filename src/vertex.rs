// Standard vertex format is to have two streams:
// Position = positions only, rewritten by the deformer every update
// Interleaved = all other data, interleaved and passed through unchanged
use crate::sn_error::SnError;
use bytemuck::{Pod, Zeroable};
use itertools::Itertools;
use nalgebra_glm as glm;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Zeroable, Pod)]
pub struct Interleaved {
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Zeroable, Pod)]
pub struct Position {
    pub position: [f32; 3],
}

impl From<glm::Vec3> for Position {
    fn from(v: glm::Vec3) -> Self {
        Self {
            position: [v.x, v.y, v.z],
        }
    }
}

impl From<Position> for glm::Vec3 {
    fn from(p: Position) -> Self {
        glm::vec3(p.position[0], p.position[1], p.position[2])
    }
}

/// Undeformed mesh as produced by a loader. Positions and attributes are
/// parallel arrays. Indices form a triangle list.
#[derive(Clone, Debug, Default)]
pub struct RestMesh {
    pub positions: Vec<Position>,
    pub attributes: Vec<Interleaved>,
    pub indices: Vec<u32>,
}

impl RestMesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Checks the attribute count and that the indices describe triangles
    /// referring to existing vertices. An empty attribute list is allowed for
    /// meshes that only carry positions.
    ///
    /// # Errors
    /// May return `SnError`
    pub fn validate(&self) -> Result<(), SnError> {
        let vertices = self.vertex_count();
        if !self.attributes.is_empty() && self.attributes.len() != vertices {
            return Err(SnError::AttributeCountMismatch {
                vertices,
                attributes: self.attributes.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(SnError::NoTriangles);
        }
        for (i0, i1, i2) in self.indices.iter().tuples() {
            for i in [*i0, *i1, *i2] {
                if i as usize >= vertices {
                    return Err(SnError::IndexOutOfRange(i));
                }
            }
        }
        Ok(())
    }
}

/// Borrowed view of a deformed mesh for handing to a renderer. Positions are
/// in the same order and count as the rest mesh, everything else is the rest
/// mesh data unchanged.
#[derive(Clone, Copy, Debug)]
pub struct DeformedMesh<'a> {
    pub positions: &'a [Position],
    pub attributes: &'a [Interleaved],
    pub indices: &'a [u32],
}

impl DeformedMesh<'_> {
    /// Position data ready for a vertex buffer upload
    #[must_use]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.positions)
    }
}

#[cfg(test)]
mod tests {
    use super::{Interleaved, Position, RestMesh};
    use crate::sn_error::SnError;
    use nalgebra_glm as glm;

    fn triangle() -> RestMesh {
        RestMesh {
            positions: vec![
                glm::vec3(0.0, 0.0, 0.0).into(),
                glm::vec3(1.0, 0.0, 0.0).into(),
                glm::vec3(0.0, 1.0, 0.0).into(),
            ],
            attributes: vec![Interleaved::default(); 3],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn validate() {
        let mut mesh = triangle();
        assert!(mesh.validate().is_ok());

        mesh.indices.push(1);
        assert!(matches!(mesh.validate(), Err(SnError::NoTriangles)));

        mesh.indices.extend([2, 3]);
        assert!(matches!(mesh.validate(), Err(SnError::IndexOutOfRange(3))));

        let mut mesh = triangle();
        mesh.attributes.pop();
        assert!(matches!(
            mesh.validate(),
            Err(SnError::AttributeCountMismatch { .. })
        ));
    }

    #[test]
    fn position_round_trip() {
        let p: Position = glm::vec3(1.5, -2.0, 3.25).into();
        let v: glm::Vec3 = p.into();
        assert_eq!(v, glm::vec3(1.5, -2.0, 3.25));
    }
}
