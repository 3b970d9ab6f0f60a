//! CPU-side mesh data
//!
//! A [`MeshAsset`] stores triangulated geometry as flat attribute streams,
//! one entry per (triangle, corner): indexed face data is expanded at load
//! time, so shared corners are duplicated and no index buffer exists. All
//! populated streams have length `3 * triangle_count`.

use glam::{Vec2, Vec3};

use crate::error::{ViewerError, ViewerResult};

/// An immutable triangle mesh with flat, per-corner vertex attributes.
///
/// Texture coordinates and normals are optional per mesh, not per vertex:
/// either every vertex has the attribute or the stream is absent entirely.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    name: String,
    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    texcoords: Option<Vec<Vec2>>,
}

impl MeshAsset {
    /// Create a mesh from flat attribute streams.
    ///
    /// Fails if the position stream is empty or not a multiple of three, or
    /// if an optional stream disagrees with the position stream's length.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        texcoords: Option<Vec<Vec2>>,
    ) -> ViewerResult<Self> {
        let name = name.into();

        if positions.is_empty() || positions.len() % 3 != 0 {
            return Err(ViewerError::asset(
                name.clone(),
                format!(
                    "mesh must contain a positive whole number of triangles, got {} vertices",
                    positions.len()
                ),
            ));
        }
        if let Some(ref n) = normals {
            if n.len() != positions.len() {
                return Err(ViewerError::asset(
                    name.clone(),
                    format!(
                        "normal stream length {} does not match position stream length {}",
                        n.len(),
                        positions.len()
                    ),
                ));
            }
        }
        if let Some(ref t) = texcoords {
            if t.len() != positions.len() {
                return Err(ViewerError::asset(
                    name.clone(),
                    format!(
                        "texcoord stream length {} does not match position stream length {}",
                        t.len(),
                        positions.len()
                    ),
                ));
            }
        }

        Ok(Self {
            name,
            positions,
            normals,
            texcoords,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of vertices (3 per triangle, corners duplicated).
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    pub fn texcoords(&self) -> Option<&[Vec2]> {
        self.texcoords.as_deref()
    }

    /// Whether this mesh carries texture coordinates (mesh-wide flag).
    pub fn has_texcoords(&self) -> bool {
        self.texcoords.is_some()
    }

    /// Whether this mesh carries normals (mesh-wide flag).
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }
}

/// Indexed mesh description as produced by an OBJ-style loader: attribute
/// pools addressed by face-corner indices. [`expand`] flattens this into
/// the duplicated-per-corner form [`MeshAsset`] stores.
#[derive(Debug, Clone, Default)]
pub struct IndexedMeshData {
    /// Flat xyz position pool.
    pub positions: Vec<f32>,
    /// Flat xyz normal pool (may be empty).
    pub normals: Vec<f32>,
    /// Flat uv texcoord pool (may be empty).
    pub texcoords: Vec<f32>,
    /// Face-corner indices into the pools, three per triangle.
    pub indices: Vec<u32>,
}

/// Expand indexed face data into flat per-corner streams.
///
/// Normals and texcoords are carried over only when the pool is populated;
/// a mesh-wide absence stays absent rather than being zero-filled here.
pub fn expand(name: impl Into<String>, data: &IndexedMeshData) -> ViewerResult<MeshAsset> {
    let name = name.into();
    let corner_count = data.indices.len();

    if corner_count % 3 != 0 {
        return Err(ViewerError::asset(
            name.clone(),
            format!("index count {} is not a multiple of three", corner_count),
        ));
    }

    let has_normals = !data.normals.is_empty();
    let has_texcoords = !data.texcoords.is_empty();

    let mut positions = Vec::with_capacity(corner_count);
    let mut normals = has_normals.then(|| Vec::with_capacity(corner_count));
    let mut texcoords = has_texcoords.then(|| Vec::with_capacity(corner_count));

    for &index in &data.indices {
        let i = index as usize;

        let p = data
            .positions
            .get(i * 3..i * 3 + 3)
            .ok_or_else(|| {
                ViewerError::asset(name.clone(), format!("position index {} out of range", i))
            })?;
        positions.push(Vec3::new(p[0], p[1], p[2]));

        if let Some(ref mut out) = normals {
            let n = data.normals.get(i * 3..i * 3 + 3).ok_or_else(|| {
                ViewerError::asset(name.clone(), format!("normal index {} out of range", i))
            })?;
            out.push(Vec3::new(n[0], n[1], n[2]));
        }
        if let Some(ref mut out) = texcoords {
            let t = data.texcoords.get(i * 2..i * 2 + 2).ok_or_else(|| {
                ViewerError::asset(name.clone(), format!("texcoord index {} out of range", i))
            })?;
            out.push(Vec2::new(t[0], t[1]));
        }
    }

    MeshAsset::new(name, positions, normals, texcoords)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_data() -> IndexedMeshData {
        // Two triangles sharing an edge: 4 unique corners, 6 indices.
        IndexedMeshData {
            positions: vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
            normals: vec![
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0,
            ],
            texcoords: vec![
                0.0, 0.0, //
                1.0, 0.0, //
                1.0, 1.0, //
                0.0, 1.0,
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn test_expand_duplicates_shared_corners() {
        let mesh = expand("quad", &quad_data()).unwrap();

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        // Corner 0 and corner 2 each appear in both triangles.
        assert_eq!(mesh.positions()[0], mesh.positions()[3]);
        assert_eq!(mesh.positions()[2], mesh.positions()[4]);
        assert!(mesh.has_normals());
        assert!(mesh.has_texcoords());
        assert_eq!(mesh.texcoords().unwrap()[4], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_expand_without_optional_streams() {
        let mut data = quad_data();
        data.normals.clear();
        data.texcoords.clear();

        let mesh = expand("quad", &data).unwrap();
        assert!(!mesh.has_normals());
        assert!(!mesh.has_texcoords());
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn test_expand_rejects_bad_index() {
        let mut data = quad_data();
        data.indices[3] = 99;
        assert!(expand("quad", &data).is_err());
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let err = MeshAsset::new("empty", Vec::new(), None, None);
        assert!(err.is_err());
    }

    #[test]
    fn test_mismatched_stream_rejected() {
        let positions = vec![Vec3::ZERO; 3];
        let texcoords = Some(vec![Vec2::ZERO; 2]);
        assert!(MeshAsset::new("bad", positions, None, texcoords).is_err());
    }
}
