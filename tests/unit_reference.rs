// Unit tests for the reference dictionaries.
//
// Every dictionary is loaded from a small fixture file written to a temp
// directory. Misses must come back as sentinels, never as errors.

use std::fs;

use diachron::reference::gloss::{GlossDictionary, NO_GLOSS};
use diachron::reference::guangyun::GuangyunTable;
use diachron::reference::numeral::{format_rhyme_number, parse_chinese_numeral};
use diachron::reference::pingshui::{rhyme_to_id, RhymeDictionary, Tone};
use diachron::reference::pronunciation::pinyin_of;
use diachron::reference::strokes::{StrokeDictionary, NO_STROKES};
use diachron::reference::CharLookup;

// ============================================================
// Chinese numerals and rhyme ids
// ============================================================

#[test]
fn numerals_in_every_shape() {
    assert_eq!(parse_chinese_numeral("三"), Some(3));
    assert_eq!(parse_chinese_numeral("十"), Some(10));
    assert_eq!(parse_chinese_numeral("十五"), Some(15));
    assert_eq!(parse_chinese_numeral("二十"), Some(20));
    assert_eq!(parse_chinese_numeral("二十九"), Some(29));
}

#[test]
fn malformed_numerals_are_rejected() {
    assert_eq!(parse_chinese_numeral(""), None);
    assert_eq!(parse_chinese_numeral("百"), None);
    assert_eq!(parse_chinese_numeral("十十"), None);
    assert_eq!(parse_chinese_numeral("一二三四"), None);
}

#[test]
fn rhyme_numbers_are_two_digits() {
    assert_eq!(format_rhyme_number(1), "01");
    assert_eq!(format_rhyme_number(10), "10");
    assert_eq!(format_rhyme_number(29), "29");
}

#[test]
fn rhyme_ids_for_each_tone_volume() {
    assert_eq!(rhyme_to_id("上平聲一東").as_deref(), Some("sp01"));
    assert_eq!(rhyme_to_id("下平聲十五咸").as_deref(), Some("xp15"));
    assert_eq!(rhyme_to_id("上聲二十九豏").as_deref(), Some("s29"));
    assert_eq!(rhyme_to_id("去聲十送").as_deref(), Some("q10"));
    assert_eq!(rhyme_to_id("入聲二沃").as_deref(), Some("r02"));
}

// ============================================================
// Pingshui rhyme book
// ============================================================

const PINGSHUI: &str = "\
平水韻目錄
上平聲部
上平聲一東
東同銅
上平聲二冬
冬農【辭】宗
下平聲部
下平聲一先
先前千
仄聲部
入聲一屋
屋木竹
";

#[test]
fn pingshui_loads_tones_and_rhymes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("平水韻.txt");
    fs::write(&path, PINGSHUI).unwrap();

    let dict = RhymeDictionary::load(&path).unwrap();
    assert_eq!(dict.entry('銅').rhyme_label(), "sp01");
    assert_eq!(dict.entry('宗').rhyme_label(), "sp02");
    assert_eq!(dict.entry('千').rhyme_label(), "xp01");
    assert_eq!(dict.entry('竹').tone_label(), "oblique");
    assert!(dict.entry('竹').tones.contains(&Tone::Oblique));
    assert!(dict.lookup('辭').is_none());
    assert!(dict.lookup('錄').is_none());
}

#[test]
fn simplified_characters_rhyme_through_their_traditional_form() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("平水韻.txt");
    fs::write(&path, PINGSHUI).unwrap();

    let dict = RhymeDictionary::load(&path).unwrap();
    assert_eq!(dict.entry('东').rhyme_label(), "sp01");
    assert_eq!(dict.entry('铜').rhyme_label(), "sp01");
    assert_eq!(dict.entry('农').rhyme_label(), "sp02");
    assert_eq!(dict.entry('东').tone_label(), dict.entry('東').tone_label());
}

#[test]
fn absent_pingshui_is_an_empty_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    let dict = RhymeDictionary::load_optional(&dir.path().join("平水韻.txt")).unwrap();
    assert!(dict.is_empty());
    assert_eq!(dict.entry('東').tone_label(), "");
}

// ============================================================
// Glosses
// ============================================================

#[test]
fn unihan_keeps_first_definition_and_writes_cache() {
    let dir = tempfile::tempdir().unwrap();
    let unihan = dir.path().join("Unihan_Readings.txt");
    let cache = dir.path().join("unihan_def.json");
    fs::write(
        &unihan,
        "# comment\n\
         U+6708\tkDefinition\tmoon; month; monthly\n\
         U+6708\tkMandarin\tyuè\n\
         U+5C71\tkDefinition\tmountain, hill, peak\n",
    )
    .unwrap();

    let dict = GlossDictionary::load(&unihan, &cache).unwrap();
    assert_eq!(dict.gloss('月'), "moon");
    assert_eq!(dict.gloss('山'), "mountain, hill, peak");
    assert_eq!(dict.gloss('水'), NO_GLOSS);
    assert!(cache.exists());

    // The cache alone is enough on the next run
    fs::remove_file(&unihan).unwrap();
    let cached = GlossDictionary::load(&unihan, &cache).unwrap();
    assert_eq!(cached.gloss('月'), "moon");
    assert_eq!(cached.len(), 2);
}

#[test]
fn no_unihan_means_placeholder_glosses() {
    let dir = tempfile::tempdir().unwrap();
    let dict = GlossDictionary::load_optional(
        &dir.path().join("Unihan_Readings.txt"),
        &dir.path().join("unihan_def.json"),
    )
    .unwrap();
    assert_eq!(dict.gloss('月'), "-");
}

// ============================================================
// Stroke counts
// ============================================================

#[test]
fn strokes_from_code_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("全部汉字码表.TXT");
    fs::write(
        &path,
        "汉字码表\n版本\n\n说明\n\n字 码 a b c d 笔画\n\
         山 5C71 shan a b c 3\n\
         水 6C34 shui a b c 4\n",
    )
    .unwrap();

    let dict = StrokeDictionary::load(&path).unwrap();
    assert_eq!(dict.strokes('山'), 3);
    assert_eq!(dict.strokes('水'), 4);
    assert_eq!(dict.strokes('月'), NO_STROKES);
}

#[test]
fn strokes_from_gb18030_code_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("全部汉字码表.TXT");
    let text = "汉字码表\n版本\n\n说明\n\n字 码 a b c d 笔画\n\
                山 5C71 shan a b c 3\n";
    let (bytes, _, _) = encoding_rs::GB18030.encode(text);
    fs::write(&path, &bytes).unwrap();

    let dict = StrokeDictionary::load(&path).unwrap();
    assert_eq!(dict.strokes('山'), 3);
}

#[test]
fn lookup_default_is_caller_chosen() {
    let dict = StrokeDictionary::default();
    assert_eq!(dict.get('山', 0), 0);
    assert_eq!(dict.get('山', -7), -7);
}

// ============================================================
// Guangyun
// ============================================================

#[test]
fn guangyun_tone_from_rhyme_volume() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guangyun_new.tsv");
    fs::write(
        &path,
        "CHARACTER_ID\tCHARACTER\tRHYME_ID\tNOTE\n\
         1\t先\txp01\tx\n\
         2\t屋\tr01\ty\n",
    )
    .unwrap();

    let table = GuangyunTable::load(&path).unwrap();
    assert_eq!(table.lookup('先').unwrap().tone(), Tone::Level);
    assert_eq!(table.lookup('屋').unwrap().tone(), Tone::Oblique);
    assert_eq!(table.lookup('屋').unwrap().rhyme_id, "r01");
    assert!(table.lookup('山').is_none());
}

#[test]
fn guangyun_simplified_lookup_uses_traditional_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guangyun_new.tsv");
    fs::write(&path, "CHARACTER_ID\tCHARACTER\tRHYME_ID\tNOTE\n17\t東\tsp01\tx\n").unwrap();

    let table = GuangyunTable::load(&path).unwrap();
    assert!(table.lookup('东').is_none());
    assert_eq!(table.lookup_any_form('东').unwrap().rhyme_id, "sp01");
}

// ============================================================
// Pinyin
// ============================================================

#[test]
fn pinyin_carries_tone_marks() {
    assert_eq!(pinyin_of('明'), "míng");
    assert_eq!(pinyin_of('水'), "shuǐ");
    assert_eq!(pinyin_of('。'), "");
}
