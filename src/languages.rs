/// Script-based language sniffing. Han characters win over kana because the
/// text we see mixes kanji-heavy product copy with the occasional particle,
/// and a single kanji is a stronger signal than none.
pub fn detect_language(text: &str) -> &'static str {
    if text.chars().any(is_han) {
        "zh"
    } else if text.chars().any(is_kana) {
        "ja"
    } else if text.chars().any(is_hangul) {
        "ko"
    } else if text.chars().any(|c| c.is_ascii_alphabetic()) {
        "en"
    } else {
        "unknown"
    }
}

pub fn has_cjk(text: &str) -> bool {
    text.chars().any(|c| is_han(c) || is_kana(c) || is_hangul(c))
}

fn is_han(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

fn is_kana(c: char) -> bool {
    ('\u{3040}'..='\u{309f}').contains(&c) || ('\u{30a0}'..='\u{30ff}').contains(&c)
}

fn is_hangul(c: char) -> bool {
    ('\u{ac00}'..='\u{d7af}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_detected() {
        assert_eq!(detect_language("早割価格"), "zh");
        assert_eq!(detect_language("スマートグラス"), "ja");
        assert_eq!(detect_language("안경"), "ko");
        assert_eq!(detect_language("Smart Glasses"), "en");
        assert_eq!(detect_language("¥64,800"), "unknown");
    }

    #[test]
    fn han_wins_over_kana() {
        assert_eq!(detect_language("価格は¥64,800です"), "zh");
    }

    #[test]
    fn cjk_presence() {
        assert!(has_cjk("早割 48% OFF"));
        assert!(!has_cjk("Early bird 48% OFF"));
    }
}
