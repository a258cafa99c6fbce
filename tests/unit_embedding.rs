// Unit tests for embedding spaces, training, alignment and similarity.
//
// Alignment tests use small exact rotations so the expected result is known
// in closed form; training tests only check shape and determinism.

use std::collections::BTreeMap;

use nalgebra::DMatrix;

use diachron::config::TrainingParams;
use diachron::embedding::align::{align_spaces, build_matrix, common_vocabulary, procrustes};
use diachron::embedding::similarity::{cosine_similarity, SimilarityTable};
use diachron::embedding::{EmbeddingSpace, EmbeddingTrainer, SkipGramTrainer, TrainOutcome};
use diachron::era::Era;
use diachron::error::PipelineError;

fn space(dim: usize, entries: &[(char, Vec<f64>)]) -> EmbeddingSpace {
    let mut s = EmbeddingSpace::new(dim);
    for (c, v) in entries {
        s.insert(*c, v.clone()).unwrap();
    }
    s
}

/// Rotate every vector of a 2-d space by `theta` radians.
fn rotated(s: &EmbeddingSpace, theta: f64) -> EmbeddingSpace {
    let (sin, cos) = theta.sin_cos();
    let mut out = EmbeddingSpace::new(2);
    for (c, v) in s.iter() {
        out.insert(c, vec![v[0] * cos - v[1] * sin, v[0] * sin + v[1] * cos])
            .unwrap();
    }
    out
}

fn tang() -> EmbeddingSpace {
    space(
        2,
        &[
            ('山', vec![1.0, 0.2]),
            ('水', vec![-0.3, 1.5]),
            ('月', vec![0.7, -0.9]),
            ('風', vec![2.0, 1.0]),
        ],
    )
}

// ============================================================
// Procrustes
// ============================================================

#[test]
fn aligning_a_matrix_to_itself_gives_identity() {
    let x = DMatrix::from_row_slice(
        5,
        3,
        &[
            0.9, -0.1, 0.4, 0.2, 1.3, -0.6, -0.8, 0.5, 0.3, 1.1, 0.0, -1.2, 0.4, 0.7, 0.9,
        ],
    );
    let r = procrustes(&x, &x).unwrap();
    let identity = DMatrix::<f64>::identity(3, 3);
    assert!((r - identity).amax() < 1e-6);
}

#[test]
fn procrustes_result_is_orthogonal() {
    let x = DMatrix::from_row_slice(4, 2, &[1.0, 2.0, -0.5, 0.3, 0.8, -1.1, 0.0, 0.4]);
    let y = DMatrix::from_row_slice(4, 2, &[0.2, 1.0, 1.5, -0.2, -0.7, 0.1, 0.3, 0.3]);
    let r = procrustes(&x, &y).unwrap();
    let rtr = r.transpose() * &r;
    assert!((rtr - DMatrix::<f64>::identity(2, 2)).amax() < 1e-9);
}

#[test]
fn alignment_undoes_a_rotation() {
    let tang = tang();
    let song = rotated(&tang, 0.8);
    let spaces = BTreeMap::from([(Era::Tang, tang.clone()), (Era::Song, song)]);
    let alignment = align_spaces(&spaces, Era::Tang, &['山', '水', '月', '風']).unwrap();

    for c in ['山', '水', '月', '風'] {
        let a = alignment.spaces[&Era::Song].vector(c).unwrap();
        let b = tang.vector(c).unwrap();
        assert!((a[0] - b[0]).abs() < 1e-9, "{c}");
        assert!((a[1] - b[1]).abs() < 1e-9, "{c}");
    }
}

#[test]
fn aligned_rows_follow_sorted_common_vocabulary() {
    let tang = tang();
    let song = space(
        2,
        &[('月', vec![1.0, 0.0]), ('山', vec![0.0, 1.0]), ('水', vec![1.0, 1.0])],
    );
    let spaces = BTreeMap::from([(Era::Tang, tang), (Era::Song, song)]);

    // 風 is missing from Song, 雪 from everything
    let alignment = align_spaces(&spaces, Era::Tang, &['風', '雪', '月', '水', '山']).unwrap();
    assert_eq!(alignment.vocabulary, vec!['山', '月', '水']);
    for aligned in alignment.spaces.values() {
        assert_eq!(aligned.characters(), &['山', '月', '水']);
    }
}

#[test]
fn empty_common_vocabulary_is_fatal() {
    let spaces = BTreeMap::from([
        (Era::Tang, space(1, &[('山', vec![1.0])])),
        (Era::Song, space(1, &[('水', vec![1.0])])),
    ]);
    let err = common_vocabulary(&spaces, &['山', '水']).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyVocabulary { .. }));
}

#[test]
fn missing_vector_names_the_era() {
    let err = build_matrix(&tang(), Era::Yuan, &['山', '雪']).unwrap_err();
    assert!(err.to_string().contains('雪'));
    assert!(err.to_string().contains("Yuan"));
}

// ============================================================
// Cosine similarity
// ============================================================

#[test]
fn cosine_of_vector_with_itself_is_one() {
    let v = [0.25, -3.0, 1.5, 0.0];
    assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
}

#[test]
fn cosine_is_symmetric_and_bounded() {
    let pairs = [
        (vec![1.0, 0.0], vec![0.0, 1.0]),
        (vec![1.0, 2.0, 3.0], vec![-1.0, 0.5, 2.0]),
        (vec![-2.0, 4.0], vec![1.0, -2.0]),
    ];
    for (u, v) in &pairs {
        let a = cosine_similarity(u, v);
        let b = cosine_similarity(v, u);
        assert_eq!(a, b);
        assert!(a >= -1.0 - 1e-12 && a <= 1.0 + 1e-12);
    }
}

#[test]
fn cosine_with_zero_vector_is_zero() {
    assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]), 0.0);
}

#[test]
fn similarity_after_alignment_is_one_for_pure_rotation() {
    let tang = tang();
    let spaces = BTreeMap::from([
        (Era::Tang, tang.clone()),
        (Era::Ming, rotated(&tang, -1.3)),
    ]);
    let alignment = align_spaces(&spaces, Era::Tang, tang.characters()).unwrap();
    let table = SimilarityTable::build(&alignment.spaces, Era::Tang, &alignment.vocabulary).unwrap();
    assert_eq!(table.eras, vec![Era::Ming]);
    for row in &table.rows {
        assert!((row.values[0] - 1.0).abs() < 1e-9);
    }
}

// ============================================================
// Word-vector files
// ============================================================

#[test]
fn saved_space_loads_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aligned").join("Tang_word2vec.txt");
    let original = tang();
    original.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("4 2\n山 1 0.2\n"));
    assert_eq!(EmbeddingSpace::load(&path).unwrap(), original);
}

#[test]
fn malformed_vector_file_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.txt");
    std::fs::write(&path, "1 2\n山 1.0 oops\n").unwrap();
    let err = EmbeddingSpace::load(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::Malformed { line: 2, .. })
    ));
}

// ============================================================
// Training
// ============================================================

fn tiny_params() -> TrainingParams {
    TrainingParams {
        vector_size: 6,
        window: 2,
        min_count: 2,
        epochs: 2,
        ..TrainingParams::default()
    }
}

#[test]
fn empty_corpus_reports_skipped() {
    let trainer = SkipGramTrainer::new(tiny_params()).quiet();
    let outcome = trainer.train(&[Vec::new(), Vec::new()]).unwrap();
    assert!(matches!(outcome, TrainOutcome::Skipped { .. }));
}

#[test]
fn training_respects_min_count_and_dimension() {
    let sentences: Vec<Vec<char>> = ["白日依山尽", "黄河入海流", "白日山河"]
        .iter()
        .map(|s| s.chars().collect())
        .collect();
    let outcome = SkipGramTrainer::new(tiny_params()).quiet().train(&sentences).unwrap();
    let TrainOutcome::Trained(space) = outcome else {
        panic!("expected a trained model");
    };
    assert_eq!(space.dim(), 6);
    // Characters seen at least twice: 白 日 山 河
    let mut chars = space.characters().to_vec();
    chars.sort();
    let mut expected = vec!['白', '日', '山', '河'];
    expected.sort();
    assert_eq!(chars, expected);
}

#[test]
fn training_is_deterministic_for_a_seed() {
    let sentences: Vec<Vec<char>> = ["春眠不觉晓", "处处闻啼鸟", "春风不度"]
        .iter()
        .map(|s| s.chars().collect())
        .collect();
    let params = TrainingParams {
        min_count: 1,
        ..tiny_params()
    };
    let a = SkipGramTrainer::new(params.clone()).quiet().train(&sentences).unwrap();
    let b = SkipGramTrainer::new(params).quiet().train(&sentences).unwrap();
    match (a, b) {
        (TrainOutcome::Trained(a), TrainOutcome::Trained(b)) => assert_eq!(a, b),
        _ => panic!("expected two trained models"),
    }
}
