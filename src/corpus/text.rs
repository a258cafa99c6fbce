// Character classes and text cleaning shared by every stage.

/// True for characters in the CJK Unified Ideographs block (U+4E00..=U+9FFF).
pub fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Strip everything that isn't a CJK ideograph.
pub fn clean_text(text: &str) -> String {
    text.chars().filter(|&c| is_cjk_ideograph(c)).collect()
}

/// Full-width punctuation that appears in the poetry corpora.
const CJK_PUNCTUATION: &str = "，。！？；：（）【】《》“”‘’—…、·「」『』";

/// Punctuation and whitespace never count as a neighbor in adjacency scans.
pub fn is_punctuation_or_space(c: char) -> bool {
    c.is_ascii_punctuation() || c.is_whitespace() || CJK_PUNCTUATION.contains(c)
}

/// Characters that end a clause for sentence tokenization.
fn is_clause_break(c: char) -> bool {
    matches!(c, '。' | '？' | '！' | '，' | '；' | '?' | '!' | ',' | ';')
}

/// Tokenize a record into clauses of single characters for embedding
/// training. Clauses are split at sentence and comma punctuation, then
/// cleaned to CJK ideographs; empty clauses are dropped.
pub fn tokenize_sentences(text: &str) -> Vec<Vec<char>> {
    text.split(is_clause_break)
        .map(|clause| clause.chars().filter(|&c| is_cjk_ideograph(c)).collect::<Vec<_>>())
        .filter(|tokens| !tokens.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_keeps_only_ideographs() {
        assert_eq!(clean_text("床前明月光，疑是地上霜。abc 123"), "床前明月光疑是地上霜");
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text("，。！"), "");
    }

    #[test]
    fn test_punctuation_detection() {
        assert!(is_punctuation_or_space('，'));
        assert!(is_punctuation_or_space(' '));
        assert!(is_punctuation_or_space('.'));
        assert!(!is_punctuation_or_space('月'));
    }

    #[test]
    fn test_tokenize_sentences_splits_clauses() {
        let sentences = tokenize_sentences("白日依山尽，黄河入海流。欲穷千里目？");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0], vec!['白', '日', '依', '山', '尽']);
        assert_eq!(sentences[2].len(), 5);
    }

    #[test]
    fn test_tokenize_sentences_drops_empty() {
        assert!(tokenize_sentences("，。（abc）").is_empty());
    }
}
