// Phonology table — Pingshui and Guangyun annotation of the common
// characters.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use super::guangyun::GuangyunTable;
use super::pingshui::RhymeDictionary;
use crate::output;
use crate::stats::frequency::FrequencyTable;

#[derive(Debug, Clone, PartialEq)]
pub struct PhonologyRow {
    pub character: char,
    pub pinyin: String,
    pub psy_tone: String,
    pub psy_rhyme: String,
    pub gy_tone: String,
    pub gy_rhyme: String,
    pub gy_id: String,
    pub gloss: String,
}

/// One row per frequency-table character, in table order. A simplified
/// character missing from Guangyun is retried in its traditional form.
/// Misses in either rhyme book leave the corresponding columns blank.
pub fn build_phonology(
    frequencies: &FrequencyTable,
    rhymes: &RhymeDictionary,
    guangyun: &GuangyunTable,
) -> Vec<PhonologyRow> {
    let rows: Vec<PhonologyRow> = frequencies
        .rows
        .iter()
        .map(|row| {
            let c = row.character;
            let psy = rhymes.entry(c);
            let (gy_tone, gy_rhyme, gy_id) = match guangyun.lookup_any_form(c) {
                Some(gy) => (
                    gy.tone().to_string(),
                    gy.rhyme_id.clone(),
                    gy.character_id.clone(),
                ),
                None => Default::default(),
            };
            PhonologyRow {
                character: c,
                pinyin: row.pinyin.clone(),
                psy_tone: psy.tone_label(),
                psy_rhyme: psy.rhyme_label(),
                gy_tone,
                gy_rhyme,
                gy_id,
                gloss: row.gloss.clone(),
            }
        })
        .collect();

    let annotated = rows
        .iter()
        .filter(|r| !r.psy_tone.is_empty() || !r.gy_id.is_empty())
        .count();
    info!(characters = rows.len(), annotated, "Built phonology table");
    rows
}

pub fn write_phonology_csv(rows: &[PhonologyRow], path: &Path) -> Result<()> {
    let mut writer = output::csv_writer(path)?;
    writer.write_record([
        "Character",
        "Pinyin",
        "PSY_Tone",
        "PSY_Rhyme",
        "GY_Tone",
        "GY_Rhyme",
        "GY_ID",
        "Gloss",
    ])?;
    for r in rows {
        writer.write_record([
            r.character.to_string().as_str(),
            r.pinyin.as_str(),
            r.psy_tone.as_str(),
            r.psy_rhyme.as_str(),
            r.gy_tone.as_str(),
            r.gy_rhyme.as_str(),
            r.gy_id.as_str(),
            r.gloss.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::frequency::FrequencyRow;

    fn table(chars: &[char]) -> FrequencyTable {
        FrequencyTable {
            rows: chars
                .iter()
                .map(|&c| FrequencyRow {
                    character: c,
                    pinyin: String::new(),
                    raw: [1; 5],
                    per_million: [1.0; 5],
                    gloss: "-".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_misses_are_blank() {
        let rows = build_phonology(
            &table(&['月']),
            &RhymeDictionary::default(),
            &GuangyunTable::default(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].psy_tone, "");
        assert_eq!(rows[0].gy_tone, "");
        assert_eq!(rows[0].gy_id, "");
        assert_eq!(rows[0].gloss, "-");
    }

    #[test]
    fn test_simplified_character_uses_traditional_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guangyun_new.tsv");
        std::fs::write(&path, "CHARACTER_ID\tCHARACTER\tRHYME_ID\n17\t東\tsp01\n").unwrap();
        let guangyun = GuangyunTable::load(&path).unwrap();
        let rhymes = RhymeDictionary::parse("平聲部\n上平聲一東\n東同\n");

        let rows = build_phonology(&table(&['东']), &rhymes, &guangyun);
        assert_eq!(rows[0].psy_tone, "level");
        assert_eq!(rows[0].psy_rhyme, "sp01");
        assert_eq!(rows[0].gy_rhyme, "sp01");
        assert_eq!(rows[0].gy_id, "17");
    }

    #[test]
    fn test_guangyun_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guangyun_new.tsv");
        std::fs::write(&path, "CHARACTER_ID\tCHARACTER\tRHYME_ID\n17\t東\tsp01\n").unwrap();
        let guangyun = GuangyunTable::load(&path).unwrap();

        let rows = build_phonology(&table(&['東']), &RhymeDictionary::default(), &guangyun);
        assert_eq!(rows[0].gy_tone, "level");
        assert_eq!(rows[0].gy_rhyme, "sp01");
        assert_eq!(rows[0].gy_id, "17");
    }
}
