//! Query language detection.
//!
//! Ranking picks language-specific index fields for Korean and Vietnamese;
//! everything else falls through to the universal fields. Detection is
//! advisory and must never fail a request, so the fallback is always `en`.

/// Language code the ranking branches on: `ko`, `vi`, or `en`.
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`. Always returns a usable code.
    fn detect(&self, text: &str) -> String;
}

/// [`whatlang`]-backed detector.
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> String {
        // Too little signal for trigram detection.
        if text.chars().count() < 3 {
            return "en".to_string();
        }
        let code = match whatlang::detect(text).map(|info| info.lang()) {
            Some(whatlang::Lang::Kor) => "ko",
            Some(whatlang::Lang::Vie) => "vi",
            Some(_) | None => "en",
        };
        log::debug!("Detected language '{code}' for query: '{text}'");
        code.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_korean_detected() {
        let detector = WhatlangDetector;
        assert_eq!(detector.detect("데이터베이스 시스템 개론 강의 자료"), "ko");
    }

    #[test]
    fn test_vietnamese_detected() {
        let detector = WhatlangDetector;
        assert_eq!(
            detector.detect("cơ sở dữ liệu và hệ thống thông tin quản lý"),
            "vi"
        );
    }

    #[test]
    fn test_english_and_others_fall_back() {
        let detector = WhatlangDetector;
        assert_eq!(detector.detect("database systems introduction"), "en");
    }

    #[test]
    fn test_short_text_defaults_to_en() {
        let detector = WhatlangDetector;
        assert_eq!(detector.detect("db"), "en");
        assert_eq!(detector.detect(""), "en");
    }
}
