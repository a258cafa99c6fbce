// Orthogonal Procrustes alignment of per-era embedding spaces.
//
// Each era's model is trained independently, so its axes are arbitrary. To
// compare a character across eras we rotate every space into the reference
// era's frame: over the common vocabulary, find the orthogonal R minimizing
// ‖X·R − Y‖_F, where X is the era matrix and Y the reference matrix. The
// closed form is R = U·Vᵀ with U·Σ·Vᵀ = svd(Xᵀ·Y).

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use nalgebra::DMatrix;
use tracing::{info, warn};

use super::vectors::EmbeddingSpace;
use crate::era::Era;
use crate::error::PipelineError;
use crate::stats::vocabulary::intersect_vocabularies;

/// Characters present in every space and in `reference_list`, sorted by
/// Unicode scalar value. This order is the row order of every matrix.
pub fn common_vocabulary(
    spaces: &BTreeMap<Era, EmbeddingSpace>,
    reference_list: &[char],
) -> Result<Vec<char>, PipelineError> {
    let sets = spaces
        .values()
        .map(|s| s.characters().to_vec())
        .chain(std::iter::once(reference_list.to_vec()));
    let common: Vec<char> = intersect_vocabularies(sets).into_iter().collect();
    if common.is_empty() {
        let eras: Vec<String> = spaces.keys().map(Era::to_string).collect();
        return Err(PipelineError::EmptyVocabulary {
            context: format!("the {} embedding spaces and the reference list", eras.join("/")),
        });
    }
    Ok(common)
}

/// Stack the vectors of `vocabulary` into a row-major matrix.
pub fn build_matrix(
    space: &EmbeddingSpace,
    era: Era,
    vocabulary: &[char],
) -> Result<DMatrix<f64>, PipelineError> {
    let dim = space.dim();
    let mut data = Vec::with_capacity(vocabulary.len() * dim);
    for &c in vocabulary {
        let v = space
            .vector(c)
            .ok_or(PipelineError::MissingVector { character: c, era })?;
        data.extend_from_slice(v);
    }
    Ok(DMatrix::from_row_slice(vocabulary.len(), dim, &data))
}

/// Orthogonal matrix R minimizing ‖source·R − target‖_F.
pub fn procrustes(source: &DMatrix<f64>, target: &DMatrix<f64>) -> Result<DMatrix<f64>, PipelineError> {
    let m = source.transpose() * target;
    let svd = m.svd(true, true);
    match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => Ok(u * v_t),
        _ => Err(PipelineError::NumericDegeneracy {
            what: "singular value decomposition did not converge".to_string(),
        }),
    }
}

/// Every era's space rotated into the reference frame, restricted to the
/// common vocabulary.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub reference: Era,
    pub vocabulary: Vec<char>,
    pub spaces: BTreeMap<Era, EmbeddingSpace>,
}

impl Alignment {
    /// Write each aligned space to `path_for(era)`.
    pub fn save(&self, path_for: impl Fn(Era) -> PathBuf) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.spaces.len());
        for (&era, space) in &self.spaces {
            let path = path_for(era);
            space.save(&path)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn matrix_to_space(matrix: &DMatrix<f64>, vocabulary: &[char]) -> EmbeddingSpace {
    let mut space = EmbeddingSpace::new(matrix.ncols());
    for (i, &c) in vocabulary.iter().enumerate() {
        let row: Vec<f64> = matrix.row(i).iter().copied().collect();
        // Row length is the matrix width by construction
        let _ = space.insert(c, row);
    }
    space
}

/// Align all `spaces` to the `reference` era.
///
/// The reference space must be present. Its matrix is kept unchanged; every
/// other era is rotated by its own Procrustes solution.
pub fn align_spaces(
    spaces: &BTreeMap<Era, EmbeddingSpace>,
    reference: Era,
    reference_list: &[char],
) -> Result<Alignment> {
    let target_space = spaces
        .get(&reference)
        .with_context(|| format!("No embedding space for reference era {reference}"))?;
    let dim = target_space.dim();
    for (&era, space) in spaces {
        if space.dim() != dim {
            return Err(PipelineError::DimensionMismatch {
                era,
                expected: dim,
                found: space.dim(),
            }
            .into());
        }
    }
    for era in Era::ALL {
        if !spaces.contains_key(&era) {
            warn!(era = %era, "No embedding space for era, leaving it out of the alignment");
        }
    }

    let vocabulary = common_vocabulary(spaces, reference_list)?;
    let target = build_matrix(target_space, reference, &vocabulary)?;

    let mut aligned = BTreeMap::new();
    for (&era, space) in spaces {
        let matrix = if era == reference {
            target.clone()
        } else {
            let source = build_matrix(space, era, &vocabulary)?;
            let rotation = procrustes(&source, &target)?;
            let rotated = &source * rotation;
            let residual = (&rotated - &target).norm();
            info!(era = %era, residual, "Aligned era to reference");
            rotated
        };
        aligned.insert(era, matrix_to_space(&matrix, &vocabulary));
    }

    info!(
        reference = %reference,
        eras = aligned.len(),
        vocabulary = vocabulary.len(),
        dim,
        "Procrustes alignment complete"
    );
    Ok(Alignment {
        reference,
        vocabulary,
        spaces: aligned,
    })
}
