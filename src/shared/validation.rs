use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Report category slugs: lowercase words joined by underscores or hyphens
    /// - Valid: "road", "street_light", "water-supply", "garbage2"
    /// - Invalid: "Road", "_road", "road_", "street light", ""
    pub static ref CATEGORY_REGEX: Regex =
        Regex::new(r"^[a-z0-9]+(?:[_-][a-z0-9]+)*$").expect("valid category regex");

    /// Photo references are absolute http(s) URLs produced by media ingestion
    pub static ref PHOTO_URL_REGEX: Regex =
        Regex::new(r"^https?://[^\s/]+(?:/\S*)?$").expect("valid photo url regex");
}

/// Maximum photos attached to one report
pub const MAX_PHOTOS: usize = 10;

pub fn validate_photo_urls(photos: &[String]) -> Result<(), validator::ValidationError> {
    if photos.len() > MAX_PHOTOS {
        let mut err = validator::ValidationError::new("too_many_photos");
        err.message = Some(format!("At most {} photos are allowed", MAX_PHOTOS).into());
        return Err(err);
    }
    if let Some(bad) = photos.iter().find(|p| !PHOTO_URL_REGEX.is_match(p)) {
        let mut err = validator::ValidationError::new("invalid_photo_url");
        err.message = Some(format!("Invalid photo URL: {}", bad).into());
        return Err(err);
    }
    Ok(())
}

/// Lowercase, trim and join whitespace-separated words with underscores, so
/// "Street Light " becomes "street_light".
pub fn normalize_category(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Supported interface languages
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "hi", "mr", "ta", "te", "bn", "gu", "kn"];

pub fn validate_language(code: &str) -> Result<(), validator::ValidationError> {
    if SUPPORTED_LANGUAGES.contains(&code) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("unsupported_language");
        err.message = Some(format!("Language must be one of: {}", SUPPORTED_LANGUAGES.join(", ")).into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_regex_valid() {
        assert!(CATEGORY_REGEX.is_match("road"));
        assert!(CATEGORY_REGEX.is_match("street_light"));
        assert!(CATEGORY_REGEX.is_match("water-supply"));
        assert!(CATEGORY_REGEX.is_match("garbage2"));
    }

    #[test]
    fn test_category_regex_invalid() {
        assert!(!CATEGORY_REGEX.is_match("Road"));
        assert!(!CATEGORY_REGEX.is_match("_road"));
        assert!(!CATEGORY_REGEX.is_match("road_"));
        assert!(!CATEGORY_REGEX.is_match("street light"));
        assert!(!CATEGORY_REGEX.is_match(""));
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(" Street  Light "), "street_light");
        assert_eq!(normalize_category("road"), "road");
        assert_eq!(normalize_category("   "), "");
        assert!(CATEGORY_REGEX.is_match(&normalize_category("Water-Supply")));
    }

    #[test]
    fn test_photo_urls() {
        let ok = vec!["https://cdn.example.in/r/1.jpg".to_string()];
        assert!(validate_photo_urls(&ok).is_ok());

        let bad = vec!["file:///etc/passwd".to_string()];
        assert!(validate_photo_urls(&bad).is_err());

        let many = vec!["http://x.in/a.png".to_string(); MAX_PHOTOS + 1];
        assert!(validate_photo_urls(&many).is_err());
    }

    #[test]
    fn test_language_codes() {
        assert!(validate_language("hi").is_ok());
        assert!(validate_language("fr").is_err());
    }
}
