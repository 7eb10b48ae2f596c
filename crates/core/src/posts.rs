//! Post and category validation.

/// Maximum length of a post title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum length of the banner and hook fields.
pub const MAX_BANNER_LENGTH: usize = 100;
pub const MAX_HOOK_LENGTH: usize = 100;

/// Maximum length of a category name or slug.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// Validate a post title: non-empty after trimming, within the length limit.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Post title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Post title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate post body content.
pub fn validate_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Post content cannot be empty".to_string());
    }
    Ok(())
}

/// Validate the short banner and hook fields shown on post cards.
pub fn validate_teaser(banner: &str, hook: &str) -> Result<(), String> {
    if banner.chars().count() > MAX_BANNER_LENGTH {
        return Err(format!(
            "Banner exceeds maximum length of {MAX_BANNER_LENGTH} characters"
        ));
    }
    if hook.chars().count() > MAX_HOOK_LENGTH {
        return Err(format!(
            "Hook exceeds maximum length of {MAX_HOOK_LENGTH} characters"
        ));
    }
    Ok(())
}

/// A post is publicly visible only when published by its author and allowed
/// by a moderator.
pub fn is_publicly_visible(published: bool, allowed: bool) -> bool {
    published && allowed
}

/// Validate a category slug: lowercase ASCII letters, digits, `-` and `_`.
pub fn validate_category_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() || slug.len() > MAX_CATEGORY_NAME_LENGTH {
        return Err(format!(
            "Category slug must be 1-{MAX_CATEGORY_NAME_LENGTH} characters"
        ));
    }
    let ok = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !ok {
        return Err(format!(
            "Invalid category slug '{slug}'. Use lowercase letters, digits, '-' or '_'"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_rejected() {
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn long_title_rejected() {
        let title = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert!(validate_title(&title).is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        // Cyrillic letters are two bytes each in UTF-8.
        let title = "я".repeat(MAX_TITLE_LENGTH);
        assert!(validate_title(&title).is_ok());
    }

    #[test]
    fn content_required() {
        assert!(validate_content("").is_err());
        assert!(validate_content("hello").is_ok());
    }

    #[test]
    fn teaser_limits() {
        assert!(validate_teaser("b", "h").is_ok());
        assert!(validate_teaser(&"b".repeat(101), "h").is_err());
        assert!(validate_teaser("b", &"h".repeat(101)).is_err());
    }

    #[test]
    fn visibility_needs_both_flags() {
        assert!(is_publicly_visible(true, true));
        assert!(!is_publicly_visible(true, false));
        assert!(!is_publicly_visible(false, true));
    }

    #[test]
    fn slug_rules() {
        assert!(validate_category_slug("school-news").is_ok());
        assert!(validate_category_slug("News").is_err());
        assert!(validate_category_slug("").is_err());
        assert!(validate_category_slug("a b").is_err());
    }
}
