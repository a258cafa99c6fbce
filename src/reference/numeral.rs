// Chinese numerals as they appear in rhyme headings (一, 十二, 二十, 二十九).

const DIGITS: &str = "〇一二三四五六七八九";

fn digit(c: char) -> Option<u32> {
    DIGITS.chars().position(|d| d == c).map(|i| i as u32)
}

/// Parse a Chinese numeral in the range 0-99.
///
/// Accepts a single digit, 十, 十X, X十 and X十Y. Anything else is `None`.
pub fn parse_chinese_numeral(s: &str) -> Option<u32> {
    let chars: Vec<char> = s.chars().collect();
    match chars.as_slice() {
        ['十'] => Some(10),
        ['十', ones] => Some(10 + digit(*ones)?),
        [tens, '十'] => Some(digit(*tens)? * 10),
        [tens, '十', ones] => Some(digit(*tens)? * 10 + digit(*ones)?),
        [single] => digit(*single),
        _ => None,
    }
}

/// Two-digit form used in rhyme ids (`sp01`, `q27`).
pub fn format_rhyme_number(n: u32) -> String {
    format!("{n:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_digits() {
        assert_eq!(parse_chinese_numeral("〇"), Some(0));
        assert_eq!(parse_chinese_numeral("一"), Some(1));
        assert_eq!(parse_chinese_numeral("九"), Some(9));
    }

    #[test]
    fn test_tens() {
        assert_eq!(parse_chinese_numeral("十"), Some(10));
        assert_eq!(parse_chinese_numeral("十五"), Some(15));
        assert_eq!(parse_chinese_numeral("二十"), Some(20));
        assert_eq!(parse_chinese_numeral("二十九"), Some(29));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_chinese_numeral(""), None);
        assert_eq!(parse_chinese_numeral("百"), None);
        assert_eq!(parse_chinese_numeral("一二"), None);
        assert_eq!(parse_chinese_numeral("十十"), None);
    }

    #[test]
    fn test_format_is_zero_padded() {
        assert_eq!(format_rhyme_number(1), "01");
        assert_eq!(format_rhyme_number(15), "15");
    }
}
