/// A target language offered by the language picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub display_name: &'static str,
    pub native_name: &'static str,
}

const fn language(
    code: &'static str,
    display_name: &'static str,
    native_name: &'static str,
) -> Language {
    Language {
        code,
        display_name,
        native_name,
    }
}

pub const LANGUAGES: &[Language] = &[
    language("af", "Afrikaans", "Afrikaans"),
    language("sq", "Albanian", "Shqip"),
    language("am", "Amharic", "አማርኛ"),
    language("ar", "Arabic", "العربية"),
    language("hy", "Armenian", "Հայերեն"),
    language("az", "Azerbaijani", "Azərbaycan"),
    language("bn", "Bengali", "বাংলা"),
    language("en", "English", "English"),
    language("hi", "Hindi", "हिन्दी"),
    language("ta", "Tamil", "தமிழ்"),
    language("te", "Telugu", "తెలుగు"),
    language("kn", "Kannada", "ಕನ್ನಡ"),
    language("ml", "Malayalam", "മലയാളം"),
    language("mr", "Marathi", "मराठी"),
    language("gu", "Gujarati", "ગુજરાતી"),
    language("ur", "Urdu", "اردو"),
    language("zh", "Chinese (Simplified)", "中文 (简体)"),
    language("zh-TW", "Chinese (Traditional)", "中文 (繁體)"),
    language("fr", "French", "Français"),
    language("de", "German", "Deutsch"),
    language("es", "Spanish", "Español"),
    language("ru", "Russian", "Русский"),
    language("ja", "Japanese", "日本語"),
    language("ko", "Korean", "한국어"),
];

/// Look up a language by code, ignoring ASCII case
pub fn find(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find() {
        assert_eq!(find("en").map(|l| l.display_name), Some("English"));
        assert_eq!(find("ZH-tw").map(|l| l.code), Some("zh-TW"));
        assert!(find("xx").is_none());
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, lang) in LANGUAGES.iter().enumerate() {
            assert!(LANGUAGES[i + 1..].iter().all(|other| other.code != lang.code));
        }
    }
}
