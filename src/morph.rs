//! Blendshape deltas and the morph engine
//!
//! A [`DeltaBuffer`] holds a morph target's per-vertex displacement from the
//! base mesh. The [`MorphEngine`] owns the base mesh, the full delta set and
//! the per-frame weight vector. Blending itself happens in the vertex shader
//! (`base + Σ weight_k · delta_k`, ascending target index); the engine only
//! provides the streams and weights for the renderer to upload. The
//! CPU-side [`MorphEngine::blended_positions`] implements the identical
//! formula for tests and software consumers.

use glam::Vec3;

use crate::error::{ViewerError, ViewerResult};
use crate::mesh::MeshAsset;

/// Precomputed per-vertex difference between one morph target and the base
/// mesh. Built once after loading, immutable afterwards.
#[derive(Debug, Clone)]
pub struct DeltaBuffer {
    name: String,
    positions: Vec<Vec3>,
    /// Normal deltas; zero-filled when either mesh lacks normals so the
    /// GPU stream layout stays uniform across targets.
    normals: Vec<Vec3>,
}

impl DeltaBuffer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Compute the delta buffer for one target against the base mesh.
///
/// The target must have been exported from the same topology: identical
/// vertex count and per-index correspondence. Count is validated here;
/// ordering is the exporter's contract.
pub fn build_delta(base: &MeshAsset, target: &MeshAsset) -> ViewerResult<DeltaBuffer> {
    if target.vertex_count() != base.vertex_count() {
        return Err(ViewerError::TopologyMismatch {
            target: target.name().to_string(),
            expected: base.vertex_count(),
            actual: target.vertex_count(),
        });
    }

    let positions = base
        .positions()
        .iter()
        .zip(target.positions())
        .map(|(b, t)| *t - *b)
        .collect();

    let normals = match (base.normals(), target.normals()) {
        (Some(b), Some(t)) => b.iter().zip(t).map(|(b, t)| *t - *b).collect(),
        _ => vec![Vec3::ZERO; base.vertex_count()],
    };

    Ok(DeltaBuffer {
        name: target.name().to_string(),
        positions,
        normals,
    })
}

/// Compute delta buffers for an ordered target sequence. Output order
/// matches input order, which fixes the weight-vector order by index.
pub fn build_delta_set(
    base: &MeshAsset,
    targets: &[MeshAsset],
) -> ViewerResult<Vec<DeltaBuffer>> {
    targets.iter().map(|t| build_delta(base, t)).collect()
}

/// Read-only views of everything the renderer binds for one mesh.
pub struct RenderBuffers<'a> {
    pub positions: &'a [Vec3],
    pub normals: Option<&'a [Vec3]>,
    pub texcoords: Option<&'a [glam::Vec2]>,
    pub deltas: &'a [DeltaBuffer],
    pub weights: &'a [f32],
}

/// Owns the base mesh, its delta set and the current weight vector.
pub struct MorphEngine {
    base: MeshAsset,
    deltas: Vec<DeltaBuffer>,
    weights: Vec<f32>,
}

impl MorphEngine {
    /// Build the engine from a base mesh and its morph targets, computing
    /// all delta buffers up front. Weights start at zero.
    pub fn new(base: MeshAsset, targets: &[MeshAsset]) -> ViewerResult<Self> {
        let deltas = build_delta_set(&base, targets)?;
        let weights = vec![0.0; deltas.len()];

        log::info!(
            "Morph engine ready: {} vertices, {} targets",
            base.vertex_count(),
            deltas.len()
        );

        Ok(Self {
            base,
            deltas,
            weights,
        })
    }

    pub fn base(&self) -> &MeshAsset {
        &self.base
    }

    pub fn deltas(&self) -> &[DeltaBuffer] {
        &self.deltas
    }

    /// Number of morph targets (= weight vector length).
    pub fn target_count(&self) -> usize {
        self.deltas.len()
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Mutable slider access for the UI layer. Length stays fixed.
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    /// Replace the whole weight vector. The length must equal the target
    /// count. Values are not clamped: weights outside [0, 1] extrapolate,
    /// which is intentional — blending is a signed linear combination.
    pub fn set_weights(&mut self, weights: &[f32]) -> ViewerResult<()> {
        if weights.len() != self.deltas.len() {
            return Err(ViewerError::WeightCountMismatch {
                expected: self.deltas.len(),
                actual: weights.len(),
            });
        }
        self.weights.copy_from_slice(weights);
        Ok(())
    }

    /// Everything the renderer needs to bind, as read-only views.
    pub fn render_buffers(&self) -> RenderBuffers<'_> {
        RenderBuffers {
            positions: self.base.positions(),
            normals: self.base.normals(),
            texcoords: self.base.texcoords(),
            deltas: &self.deltas,
            weights: &self.weights,
        }
    }

    /// CPU reference blend: `base + Σ_k weights[k] · delta_k`, summed in
    /// ascending target order. The render path performs the same
    /// computation per vertex in the shader.
    pub fn blended_positions(&self) -> Vec<Vec3> {
        let mut out = self.base.positions().to_vec();
        for (delta, &w) in self.deltas.iter().zip(&self.weights) {
            for (p, d) in out.iter_mut().zip(delta.positions()) {
                *p += w * *d;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn flat_mesh(name: &str, offset: Vec3) -> MeshAsset {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0) + offset,
            Vec3::new(1.0, 0.0, 0.0) + offset,
            Vec3::new(0.0, 1.0, 0.0) + offset,
        ];
        MeshAsset::new(name, positions, None, None).unwrap()
    }

    #[test]
    fn test_delta_is_target_minus_base() {
        let base = flat_mesh("base", Vec3::ZERO);
        let target = flat_mesh("smile", Vec3::new(0.5, -0.25, 2.0));

        let delta = build_delta(&base, &target).unwrap();
        assert_eq!(delta.vertex_count(), 3);
        for d in delta.positions() {
            assert!(d.abs_diff_eq(Vec3::new(0.5, -0.25, 2.0), 1e-6));
        }
    }

    #[test]
    fn test_zero_weights_reproduce_base() {
        let base = flat_mesh("base", Vec3::ZERO);
        let target = flat_mesh("smile", Vec3::X);

        let engine = MorphEngine::new(base.clone(), &[target]).unwrap();
        let blended = engine.blended_positions();
        for (b, p) in base.positions().iter().zip(&blended) {
            assert!(p.abs_diff_eq(*b, 1e-6));
        }
    }

    #[test]
    fn test_unit_weight_reproduces_target() {
        let base = flat_mesh("base", Vec3::ZERO);
        let targets = [
            flat_mesh("a", Vec3::new(1.0, 2.0, 3.0)),
            flat_mesh("b", Vec3::new(-4.0, 0.5, 0.0)),
        ];

        let mut engine = MorphEngine::new(base, &targets).unwrap();
        engine.set_weights(&[0.0, 1.0]).unwrap();

        let blended = engine.blended_positions();
        for (t, p) in targets[1].positions().iter().zip(&blended) {
            assert!(p.abs_diff_eq(*t, 1e-6));
        }
    }

    #[test]
    fn test_out_of_range_weight_extrapolates() {
        let base = flat_mesh("base", Vec3::ZERO);
        let target = flat_mesh("puff", Vec3::X);

        let mut engine = MorphEngine::new(base, &[target]).unwrap();
        engine.set_weights(&[2.0]).unwrap();

        // Weight 2.0 doubles the displacement, it is not clamped.
        for (p, b) in engine
            .blended_positions()
            .iter()
            .zip(engine.base().positions())
        {
            assert!(p.abs_diff_eq(*b + Vec3::new(2.0, 0.0, 0.0), 1e-6));
        }
    }

    #[test]
    fn test_half_weight_scenario() {
        // Base mesh with 3 vertices at the origin, one target offset by
        // (1,0,0); weight 0.5 must land every vertex at (0.5,0,0).
        let base =
            MeshAsset::new("base", vec![Vec3::ZERO; 3], None, None).unwrap();
        let target =
            MeshAsset::new("t", vec![Vec3::X; 3], None, None).unwrap();

        let mut engine = MorphEngine::new(base, &[target]).unwrap();
        engine.set_weights(&[0.5]).unwrap();

        for p in engine.blended_positions() {
            assert!(p.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
        }
    }

    #[test]
    fn test_topology_mismatch_rejected() {
        let base = flat_mesh("base", Vec3::ZERO);
        let bad = MeshAsset::new("bad", vec![Vec3::ZERO; 6], None, None).unwrap();

        match build_delta(&base, &bad) {
            Err(ViewerError::TopologyMismatch {
                target,
                expected,
                actual,
            }) => {
                assert_eq!(target, "bad");
                assert_eq!(expected, 3);
                assert_eq!(actual, 6);
            }
            other => panic!("expected TopologyMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_weight_count_mismatch_rejected() {
        let base = flat_mesh("base", Vec3::ZERO);
        let target = flat_mesh("t", Vec3::X);

        let mut engine = MorphEngine::new(base, &[target]).unwrap();
        assert!(matches!(
            engine.set_weights(&[0.5, 0.5]),
            Err(ViewerError::WeightCountMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_normal_deltas_zero_filled_without_normals() {
        let base = flat_mesh("base", Vec3::ZERO);
        let target = flat_mesh("t", Vec3::X);

        let delta = build_delta(&base, &target).unwrap();
        assert_eq!(delta.normals().len(), 3);
        assert!(delta.normals().iter().all(|n| *n == Vec3::ZERO));
    }

    #[test]
    fn test_normal_deltas_computed_when_present() {
        let positions = vec![Vec3::ZERO; 3];
        let base = MeshAsset::new(
            "base",
            positions.clone(),
            Some(vec![Vec3::Z; 3]),
            Some(vec![Vec2::ZERO; 3]),
        )
        .unwrap();
        let target = MeshAsset::new(
            "t",
            positions,
            Some(vec![Vec3::Y; 3]),
            Some(vec![Vec2::ZERO; 3]),
        )
        .unwrap();

        let delta = build_delta(&base, &target).unwrap();
        for n in delta.normals() {
            assert!(n.abs_diff_eq(Vec3::new(0.0, 1.0, -1.0), 1e-6));
        }
    }
}
