// Unit tests for the statistics engine.
//
// Tests the corpus measures on small hand-built corpora: per-million
// normalization, frequency diversity, neighbor entropy, contextual
// diversity, vocabulary intersection and the cross-era frequency table.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use diachron::era::Era;
use diachron::error::PipelineError;
use diachron::reference::gloss::GlossDictionary;
use diachron::stats::diversity::{contextual_diversity, diversity_counts};
use diachron::stats::entropy::{neighbor_entropy, NeighborTable};
use diachron::stats::frequency::FrequencyTable;
use diachron::stats::frequency_diversity::{
    frequency_diversity, frequency_diversity_rows, log_frequency_diversity,
    write_frequency_diversity_csv,
};
use diachron::stats::vocabulary::{build_vocabulary, intersect_vocabularies, per_million, CharVocabulary};

fn vocab(entries: &[(char, u64)]) -> CharVocabulary {
    CharVocabulary::from_counts(entries.iter().copied().collect::<HashMap<_, _>>())
}

/// Five eras where 人 has counts [10, 20, 5, 1, 2] over totals
/// [1000, 2000, 500, 100, 100].
fn five_eras() -> BTreeMap<Era, CharVocabulary> {
    BTreeMap::from([
        (Era::Tang, vocab(&[('人', 10), ('天', 990)])),
        (Era::Song, vocab(&[('人', 20), ('天', 1980)])),
        (Era::Yuan, vocab(&[('人', 5), ('天', 495)])),
        (Era::Ming, vocab(&[('人', 1), ('天', 98), ('山', 1)])),
        (Era::Qing, vocab(&[('人', 2), ('天', 98)])),
    ])
}

// ============================================================
// Per-million frequency and frequency diversity
// ============================================================

#[test]
fn same_relative_frequency_gives_equal_per_million() {
    let pm: Vec<f64> = [(10, 1000), (20, 2000), (5, 500)]
        .iter()
        .map(|&(n, total)| per_million(n, total).unwrap())
        .collect();
    assert_eq!(pm, vec![10_000.0, 10_000.0, 10_000.0]);

    assert_eq!(frequency_diversity(pm[1], pm[0]).unwrap(), 1.0);
    assert_eq!(log_frequency_diversity(pm[1], pm[0]).unwrap(), 0.0);
}

#[test]
fn per_million_over_empty_corpus_is_an_error() {
    assert!(matches!(
        per_million(0, 0),
        Err(PipelineError::NumericDegeneracy { .. })
    ));
}

#[test]
fn vocabulary_per_million_uses_its_own_total() {
    let v = vocab(&[('人', 10), ('天', 990)]);
    assert_eq!(v.total(), 1000);
    assert_eq!(v.per_million('人').unwrap(), 10_000.0);
    assert_eq!(v.per_million('月').unwrap(), 0.0);
}

#[test]
fn frequency_diversity_of_zero_reference_is_undefined() {
    assert!(frequency_diversity(12.0, 0.0).is_err());
    assert!(log_frequency_diversity(12.0, 0.0).is_err());
    assert!(log_frequency_diversity(0.0, 12.0).is_err());
}

// ============================================================
// Neighbor entropy
// ============================================================

#[test]
fn entropy_of_empty_mapping_is_zero() {
    assert_eq!(neighbor_entropy(&HashMap::<char, u64>::new()), 0.0);
}

#[test]
fn entropy_of_single_neighbor_is_zero() {
    assert_eq!(neighbor_entropy(&HashMap::from([('a', 10)])), 0.0);
}

#[test]
fn entropy_of_two_equal_neighbors_is_one_bit() {
    let h = neighbor_entropy(&HashMap::from([('a', 1), ('b', 1)]));
    assert!((h - 1.0).abs() < 1e-12);
}

#[test]
fn entropy_of_four_equal_neighbors_is_two_bits() {
    let h = neighbor_entropy(&HashMap::from([('a', 3), ('b', 3), ('c', 3), ('d', 3)]));
    assert!((h - 2.0).abs() < 1e-12);
}

#[test]
fn neighbor_table_counts_both_sides() {
    let targets = HashSet::from(['月']);
    let table = NeighborTable::build(&["明月照", "新月照", "月"], &targets);
    let left = table.left_of('月').unwrap();
    assert_eq!(left[&'明'], 1);
    assert_eq!(left[&'新'], 1);
    assert_eq!(table.right_of('月').unwrap()[&'照'], 2);
    assert!((table.left_entropy('月') - 1.0).abs() < 1e-12);
    assert_eq!(table.right_entropy('月'), 0.0);
}

// ============================================================
// Contextual diversity
// ============================================================

#[test]
fn diversity_counts_records_not_occurrences() {
    let records = ["山山山山", "山水", "水"];
    assert_eq!(contextual_diversity(&records, '山'), 2);
    assert_eq!(contextual_diversity(&records, '月'), 0);

    let counts = diversity_counts(&records, &['山', '水', '月']);
    assert_eq!(counts[&'山'], 2);
    assert_eq!(counts[&'水'], 2);
    assert_eq!(counts[&'月'], 0);
}

// ============================================================
// Vocabulary and intersection
// ============================================================

#[test]
fn vocabulary_ignores_punctuation_and_latin() {
    let v = build_vocabulary(&["床前明月光，疑是地上霜。", "Moon 月!"]);
    assert_eq!(v.count('月'), 2);
    assert_eq!(v.total(), 11);
    assert!(!v.contains('M'));
}

#[test]
fn intersection_is_order_independent() {
    let sets = [vec!['A', 'B', 'C'], vec!['B', 'C', 'D'], vec!['C', 'D', 'E']];
    let forward = intersect_vocabularies(sets.iter().cloned());
    let backward = intersect_vocabularies(sets.iter().rev().cloned());
    assert_eq!(forward, BTreeSet::from(['C']));
    assert_eq!(forward, backward);
}

// ============================================================
// Cross-era frequency table
// ============================================================

#[test]
fn frequency_table_keeps_only_shared_characters() {
    let table = FrequencyTable::build(&five_eras(), Era::Tang, &GlossDictionary::default()).unwrap();
    // 山 only occurs in Ming
    assert_eq!(table.characters(), vec!['天', '人']);

    let ren = table.rows.iter().find(|r| r.character == '人').unwrap();
    assert_eq!(ren.raw, [10, 20, 5, 1, 2]);
    assert_eq!(ren.per_million_in(Era::Song), 10_000.0);
    assert_eq!(ren.gloss, "-");
}

#[test]
fn frequency_table_without_shared_characters_fails() {
    let mut eras = five_eras();
    eras.insert(Era::Qing, vocab(&[('山', 3)]));
    let err = FrequencyTable::build(&eras, Era::Tang, &GlossDictionary::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::EmptyVocabulary { .. })
    ));
}

#[test]
fn frequency_table_survives_a_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("freq.csv");
    let table = FrequencyTable::build(&five_eras(), Era::Tang, &GlossDictionary::default()).unwrap();
    table.write_csv(&path).unwrap();
    let back = FrequencyTable::read_csv(&path).unwrap();
    assert_eq!(back.characters(), table.characters());
    assert_eq!(back.rows[1].raw, table.rows[1].raw);
}

#[test]
fn frequency_diversity_table_against_reference() {
    let table = FrequencyTable::build(&five_eras(), Era::Tang, &GlossDictionary::default()).unwrap();
    let rows = frequency_diversity_rows(&table, Era::Tang);
    let ren = rows.iter().find(|r| r.character == '人').unwrap();

    // Song, Yuan, Ming, Qing against Tang
    assert_eq!(ren.fd.len(), 4);
    assert_eq!(*ren.fd[0].as_ref().unwrap(), 1.0);
    assert_eq!(*ren.log_fd[0].as_ref().unwrap(), 0.0);
    // Qing: 2/100 vs 10/1000 is twice as frequent
    assert!((ren.fd[3].as_ref().unwrap() - 2.0).abs() < 1e-12);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fd.csv");
    let undefined = write_frequency_diversity_csv(&rows, Era::Tang, &path).unwrap();
    assert_eq!(undefined, 0);
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(
        "Character,Song_fd,Yuan_fd,Ming_fd,Qing_fd,Song_log_fd,Yuan_log_fd,Ming_log_fd,Qing_log_fd\n"
    ));
}
