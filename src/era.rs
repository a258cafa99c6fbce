// Eras (dynasties) that partition the poetry corpus.
//
// The order of `Era::ALL` is chronological and is the column order of every
// cross-era table the pipeline writes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// One of the five historical periods used to partition the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Era {
    Tang,
    Song,
    Yuan,
    Ming,
    Qing,
}

impl Era {
    /// All eras in chronological order.
    pub const ALL: [Era; 5] = [Era::Tang, Era::Song, Era::Yuan, Era::Ming, Era::Qing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Era::Tang => "Tang",
            Era::Song => "Song",
            Era::Yuan => "Yuan",
            Era::Ming => "Ming",
            Era::Qing => "Qing",
        }
    }

    /// Position in `Era::ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map the first character of a raw corpus file name to its era.
    ///
    /// Liao (辽) and Jin (金) sources are folded into Song. Anything else is
    /// not part of the corpus.
    pub fn from_source_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '唐' => Some(Era::Tang),
            '宋' | '辽' | '金' => Some(Era::Song),
            '元' => Some(Era::Yuan),
            '明' => Some(Era::Ming),
            '清' => Some(Era::Qing),
            _ => None,
        }
    }

    /// Every era except `reference`, in chronological order.
    pub fn others(reference: Era) -> Vec<Era> {
        Era::ALL.into_iter().filter(|&e| e != reference).collect()
    }
}

impl std::fmt::Display for Era {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Era {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Era::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PipelineError::UnknownEra(s.to_string()))
    }
}
