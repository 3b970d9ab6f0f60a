//! Asset loading: OBJ meshes and textures
//!
//! OBJ parsing is delegated to `tobj`; this module flattens the indexed
//! face data into the per-corner streams [`MeshAsset`](crate::mesh::MeshAsset)
//! stores, applies the mesh-wide attribute rule (texcoords and normals are
//! kept only if every sub-shape carries them), and decodes textures to
//! RGBA8 with `image`. Load failures surface as
//! [`ViewerError::AssetLoad`](crate::error::ViewerError) instead of
//! terminating the process, so the shell decides what to do.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error::{ViewerError, ViewerResult};
use crate::mesh::{self, IndexedMeshData, MeshAsset};

/// A named morph target and the resource it loads from. The order of
/// descriptors fixes the weight-vector order, by index.
#[derive(Debug, Clone)]
pub struct BlendshapeDesc {
    pub name: String,
    pub path: PathBuf,
}

impl BlendshapeDesc {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

const LOAD_OPTIONS: tobj::LoadOptions = tobj::LoadOptions {
    single_index: true,
    triangulate: true,
    ignore_points: true,
    ignore_lines: true,
};

/// Load a triangulated OBJ file into a flat [`MeshAsset`].
pub fn load_obj(name: &str, path: &Path) -> ViewerResult<MeshAsset> {
    log::info!("Loading mesh '{}' from {}", name, path.display());

    let (models, _materials) =
        tobj::load_obj(path, &LOAD_OPTIONS).map_err(|e| ViewerError::asset(path, e))?;

    mesh_from_models(name, path, &models)
}

/// Load an OBJ from an in-memory reader. Materials are not resolved.
pub fn load_obj_from_reader<R: BufRead>(name: &str, reader: &mut R) -> ViewerResult<MeshAsset> {
    let (models, _materials) =
        tobj::load_obj_buf(reader, &LOAD_OPTIONS, |_| Ok((Vec::new(), Default::default())))
            .map_err(|e| ViewerError::asset(name, e))?;

    mesh_from_models(name, Path::new(name), &models)
}

/// Flatten tobj models into one per-corner mesh.
///
/// Sub-shapes are concatenated in file order, exactly as the reference
/// expansion walks them. Optional attributes follow a mesh-wide rule: if
/// any sub-shape lacks texcoords (or normals), the whole stream is
/// dropped rather than partially populated.
fn mesh_from_models(
    name: &str,
    path: &Path,
    models: &[tobj::Model],
) -> ViewerResult<MeshAsset> {
    if models.is_empty() {
        return Err(ViewerError::asset(path, "OBJ file contains no shapes"));
    }

    let all_texcoords = models.iter().all(|m| !m.mesh.texcoords.is_empty());
    let all_normals = models.iter().all(|m| !m.mesh.normals.is_empty());
    if !all_texcoords {
        log::debug!("'{}': at least one shape lacks texcoords, skipping them", name);
    }

    let mut parts = Vec::with_capacity(models.len());
    for model in models {
        let data = IndexedMeshData {
            positions: model.mesh.positions.clone(),
            normals: if all_normals {
                model.mesh.normals.clone()
            } else {
                Vec::new()
            },
            texcoords: if all_texcoords {
                model.mesh.texcoords.clone()
            } else {
                Vec::new()
            },
            indices: model.mesh.indices.clone(),
        };
        parts.push(mesh::expand(name, &data)?);
    }

    // Single-shape files (the common case) avoid the concatenation copy.
    let mesh = if parts.len() == 1 {
        parts.swap_remove(0)
    } else {
        concat_meshes(name, parts)?
    };

    log::info!(
        "Loaded '{}': {} triangles, texcoords: {}, normals: {}",
        name,
        mesh.triangle_count(),
        mesh.has_texcoords(),
        mesh.has_normals()
    );

    Ok(mesh)
}

fn concat_meshes(name: &str, parts: Vec<MeshAsset>) -> ViewerResult<MeshAsset> {
    let total: usize = parts.iter().map(|p| p.vertex_count()).sum();
    let has_normals = parts.iter().all(|p| p.has_normals());
    let has_texcoords = parts.iter().all(|p| p.has_texcoords());

    let mut positions = Vec::with_capacity(total);
    let mut normals = has_normals.then(|| Vec::with_capacity(total));
    let mut texcoords = has_texcoords.then(|| Vec::with_capacity(total));

    for part in &parts {
        positions.extend_from_slice(part.positions());
        if let (Some(out), Some(src)) = (normals.as_mut(), part.normals()) {
            out.extend_from_slice(src);
        }
        if let (Some(out), Some(src)) = (texcoords.as_mut(), part.texcoords()) {
            out.extend_from_slice(src);
        }
    }

    MeshAsset::new(name, positions, normals, texcoords)
}

/// Load all morph targets in descriptor order.
pub fn load_blendshapes(descs: &[BlendshapeDesc]) -> ViewerResult<Vec<MeshAsset>> {
    descs
        .iter()
        .map(|d| load_obj(&d.name, &d.path))
        .collect()
}

/// Decoded RGBA8 texture data, ready for GPU upload.
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Load and decode a texture from file.
    pub fn from_file(path: &Path) -> ViewerResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path).map_err(|e| ViewerError::asset(path, e))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        log::info!("Loaded texture '{}': {}x{}", name, width, height);

        Ok(Self {
            width,
            height,
            data: rgba.into_raw(),
            name,
        })
    }

    /// A 1x1 white fallback for untextured meshes.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            data: vec![255, 255, 255, 255],
            name: "white".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use std::io::Cursor;

    const TRIANGLE_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
f 1/1 2/2 3/3
";

    const TRIANGLE_WITH_MTL_OBJ: &str = "\
mtllib missing.mtl
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
usemtl skin
f 1 2 3
";

    const QUAD_NO_UV_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3 4
";

    #[test]
    fn test_load_triangle_with_texcoords() {
        let mut reader = Cursor::new(TRIANGLE_OBJ.as_bytes());
        let mesh = load_obj_from_reader("tri", &mut reader).unwrap();

        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.has_texcoords());
        assert!(!mesh.has_normals());
        assert_eq!(mesh.positions()[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.texcoords().unwrap()[2], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_material_references_do_not_break_reader_loads() {
        // The reader path resolves no materials; mtllib/usemtl lines must
        // still parse through the stub material loader.
        let mut reader = Cursor::new(TRIANGLE_WITH_MTL_OBJ.as_bytes());
        let mesh = load_obj_from_reader("tri_mtl", &mut reader).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_quad_is_triangulated_and_untextured() {
        let mut reader = Cursor::new(QUAD_NO_UV_OBJ.as_bytes());
        let mesh = load_obj_from_reader("quad", &mut reader).unwrap();

        // One quad face becomes two triangles of duplicated corners.
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert!(!mesh.has_texcoords());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_obj("missing", Path::new("/nonexistent/mesh.obj"));
        match err {
            Err(ViewerError::AssetLoad { path, .. }) => {
                assert!(path.to_string_lossy().contains("mesh.obj"));
            }
            other => panic!("expected AssetLoad, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_white_fallback_texture() {
        let tex = TextureData::white();
        assert_eq!((tex.width, tex.height), (1, 1));
        assert_eq!(tex.data, vec![255; 4]);
    }
}
