use thiserror::Error;

pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid language code: {0:?}")]
pub struct InvalidLanguage(pub String);

/// Case-fold and validate a language code such as `en`, `pt-br` or `es-419x`.
///
/// Accepts 2-8 characters of `[a-z-]` after lowercasing and trimming.
pub fn normalize_lang(raw: &str) -> Result<String, InvalidLanguage> {
    let lang = raw.trim().to_ascii_lowercase();
    let valid = (2..=8).contains(&lang.len())
        && lang.chars().all(|c| c.is_ascii_lowercase() || c == '-')
        && !lang.starts_with('-')
        && !lang.ends_with('-');
    if valid {
        Ok(lang)
    } else {
        Err(InvalidLanguage(raw.to_string()))
    }
}

/// Resolve an optional `?lang=` parameter, falling back to [`DEFAULT_LANG`].
pub fn lang_or_default(raw: Option<&str>) -> Result<String, InvalidLanguage> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => normalize_lang(raw),
        _ => Ok(DEFAULT_LANG.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lang() {
        assert_eq!(normalize_lang("EN").unwrap(), "en");
        assert_eq!(normalize_lang(" pt-BR ").unwrap(), "pt-br");
        assert!(normalize_lang("e").is_err());
        assert!(normalize_lang("english-uk").is_err());
        assert!(normalize_lang("en_us").is_err());
        assert!(normalize_lang("-en").is_err());
    }

    #[test]
    fn test_lang_or_default() {
        assert_eq!(lang_or_default(None).unwrap(), "en");
        assert_eq!(lang_or_default(Some("")).unwrap(), "en");
        assert_eq!(lang_or_default(Some("De")).unwrap(), "de");
    }
}
