// Reference dictionaries — external character lookups merged into tables.
//
// Every dictionary answers the same question: "what do you know about this
// character?" A miss is never an error; callers pass the sentinel they want
// written in its place.

pub mod gloss;
pub mod guangyun;
pub mod numeral;
pub mod phonology;
pub mod pingshui;
pub mod pronunciation;
pub mod script;
pub mod strokes;

/// Key lookup over a character-keyed reference table.
pub trait CharLookup {
    type Value: Clone;

    /// The stored value for `c`, if any.
    fn lookup(&self, c: char) -> Option<&Self::Value>;

    /// The stored value for `c`, or `default` on a miss.
    fn get(&self, c: char, default: Self::Value) -> Self::Value {
        self.lookup(c).cloned().unwrap_or(default)
    }
}
