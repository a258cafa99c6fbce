// Pingshui rhyme categories (平水韻) parsed from the Wikisource plain text.
//
// The text is a sequence of sections, each introduced by a line ending in
// 部. Inside a section, a heading such as "上平聲一東" opens a rhyme and the
// following lines list its characters until the next heading. A character may
// belong to several rhymes, and so to both tones. Every character is also
// indexed under its simplified form so simplified corpus text finds it.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex_lite::Regex;
use tracing::{info, warn};

use super::numeral::{format_rhyme_number, parse_chinese_numeral};
use super::script::to_simplified;
use super::CharLookup;
use crate::corpus::text::is_cjk_ideograph;
use crate::error::require_file;

/// Tonal class of a rhyme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tone {
    /// 平
    Level,
    /// 上, 去, 入
    Oblique,
    Unknown,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Level => "level",
            Tone::Oblique => "oblique",
            Tone::Unknown => "Unknown",
        }
    }

    /// Classify a rhyme heading by the tone marker it contains.
    pub fn from_heading(heading: &str) -> Self {
        if heading.contains('平') {
            Tone::Level
        } else if heading.contains(['上', '去', '入']) {
            Tone::Oblique
        } else {
            Tone::Unknown
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the rhyme book says about one character.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RhymeEntry {
    pub tones: BTreeSet<Tone>,
    /// Rhyme ids such as `sp01` (upper level tone, rhyme one)
    pub rhymes: BTreeSet<String>,
}

impl RhymeEntry {
    /// Tones joined with `|`, e.g. `level|oblique`.
    pub fn tone_label(&self) -> String {
        self.tones
            .iter()
            .map(Tone::as_str)
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn rhyme_label(&self) -> String {
        self.rhymes.iter().cloned().collect::<Vec<_>>().join("|")
    }
}

/// Character → Pingshui tones and rhymes.
#[derive(Debug, Clone, Default)]
pub struct RhymeDictionary {
    entries: HashMap<char, RhymeEntry>,
}

impl CharLookup for RhymeDictionary {
    type Value = RhymeEntry;

    fn lookup(&self, c: char) -> Option<&RhymeEntry> {
        self.entries.get(&c)
    }
}

/// Matches the start of a rhyme heading line.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([上下]平|上聲|去聲|入聲)").expect("static regex"));

static RHYME_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(上平聲|下平聲|上聲|去聲|入聲)\s*([〇一二三四五六七八九十]+)").expect("static regex")
});

/// Convert a heading like `下平聲 十二 侵` into the rhyme id `xp12`.
///
/// Returns `None` when the heading has no recognizable tone and number.
pub fn rhyme_to_id(heading: &str) -> Option<String> {
    let caps = RHYME_ID.captures(heading.trim())?;
    let code = match &caps[1] {
        "上平聲" => "sp",
        "下平聲" => "xp",
        "上聲" => "s",
        "去聲" => "q",
        "入聲" => "r",
        _ => return None,
    };
    let number = parse_chinese_numeral(&caps[2])?;
    Some(format!("{code}{}", format_rhyme_number(number)))
}

impl RhymeDictionary {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `c`, or an empty entry (blank tone and rhyme columns).
    pub fn entry(&self, c: char) -> RhymeEntry {
        self.get(c, RhymeEntry::default())
    }

    pub fn load(path: &Path) -> Result<Self> {
        require_file(path)?;
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let dict = Self::parse(&text);
        info!(characters = dict.len(), "Parsed Pingshui rhyme book");
        Ok(dict)
    }

    /// Load if present, otherwise an empty dictionary.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Pingshui rhyme text not found, tone/rhyme columns will be blank");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(text: &str) -> Self {
        let mut entries: HashMap<char, RhymeEntry> = HashMap::new();

        for section in sections(text) {
            let lines: Vec<&str> = section
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .collect();

            let mut i = 0;
            while i < lines.len() {
                let title = lines[i];
                i += 1;
                let tone = Tone::from_heading(title);
                let rhyme_id = rhyme_to_id(title);

                let mut body = String::new();
                while i < lines.len() && !HEADING.is_match(lines[i]) {
                    body.push_str(lines[i]);
                    i += 1;
                }
                let body = body.replace("【詞】", "").replace("【辭】", "");

                for c in body.chars().filter(|&c| is_cjk_ideograph(c)) {
                    for key in std::iter::once(c).chain(to_simplified(c)) {
                        let entry = entries.entry(key).or_default();
                        entry.tones.insert(tone);
                        if let Some(id) = &rhyme_id {
                            entry.rhymes.insert(id.clone());
                        }
                    }
                }
            }
        }

        Self { entries }
    }
}

/// Split the text into sections at lines ending in 部; anything before the
/// first such line is preamble and dropped.
fn sections(text: &str) -> Vec<Vec<&str>> {
    let mut sections: Vec<Vec<&str>> = Vec::new();
    for line in text.lines() {
        if line.trim_end().ends_with('部') {
            sections.push(Vec::new());
        } else if let Some(current) = sections.last_mut() {
            current.push(line);
        }
    }
    sections
}
