//! Rules for user-submitted media: bell song suggestions and memes.

use std::sync::LazyLock;

use regex::Regex;

/// YouTube watch, short, embed, and `/v/` links carrying an 11-char video id.
static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.)?(?:m\.)?(?:youtube\.com|youtu\.be)/(?:watch\?v=|embed/|v/|)([\w-]{11})(?:\S+)?",
    )
    .expect("valid regex")
});

/// Spotify track or episode links carrying a 22-char id.
static SPOTIFY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?open\.spotify\.com/(?:track|episode)/([a-zA-Z0-9]{22})(?:\S+)?")
        .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Song suggestions
// ---------------------------------------------------------------------------

/// Bell slots a song can be suggested for.
pub const SLOT_FIRST_BELL: &str = "first_bell";
pub const SLOT_SHORT_BREAK: &str = "short_break";
pub const SLOT_LONG_BREAK: &str = "long_break";
pub const SLOT_LAST_BELL: &str = "last_bell";

pub const VALID_SLOTS: &[&str] = &[
    SLOT_FIRST_BELL,
    SLOT_SHORT_BREAK,
    SLOT_LONG_BREAK,
    SLOT_LAST_BELL,
];

/// Moderation statuses for song suggestions.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

/// Maximum length of a song title.
pub const MAX_SONG_TITLE_LENGTH: usize = 200;

/// Maximum length of the optional note attached to a suggestion.
pub const MAX_NOTE_LENGTH: usize = 500;

/// Streaming service a song link points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    YouTube,
    Spotify,
}

/// Classify a song link, rejecting anything that is not YouTube or Spotify.
pub fn classify_link(link: &str) -> Result<LinkKind, String> {
    let link = link.trim();
    if YOUTUBE_RE.is_match(link) {
        Ok(LinkKind::YouTube)
    } else if SPOTIFY_RE.is_match(link) {
        Ok(LinkKind::Spotify)
    } else {
        Err("Invalid YouTube or Spotify link".to_string())
    }
}

pub fn validate_slot(slot: &str) -> Result<(), String> {
    if VALID_SLOTS.contains(&slot) {
        Ok(())
    } else {
        Err(format!(
            "Invalid slot '{slot}'. Must be one of: {}",
            VALID_SLOTS.join(", ")
        ))
    }
}

pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

/// Validate the free-text fields of a suggestion.
pub fn validate_suggestion_text(title: &str, note: Option<&str>) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Song title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_SONG_TITLE_LENGTH {
        return Err(format!(
            "Song title exceeds maximum length of {MAX_SONG_TITLE_LENGTH} characters"
        ));
    }
    if note.is_some_and(|n| n.chars().count() > MAX_NOTE_LENGTH) {
        return Err(format!(
            "Note exceeds maximum length of {MAX_NOTE_LENGTH} characters"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Memes
// ---------------------------------------------------------------------------

/// Accepted image extensions for meme uploads (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Default upload size cap: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Maximum length of a meme title.
pub const MAX_MEME_TITLE_LENGTH: usize = 200;

/// Extract and validate the lowercase extension of an uploaded image name.
pub fn image_extension(filename: &str) -> Result<String, String> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(format!(
            "Unsupported image format '{filename}'. Supported: {}",
            IMAGE_EXTENSIONS.join(", ")
        ))
    }
}

/// Validate upload size and title for a meme.
pub fn validate_meme(title: &str, size_bytes: usize, max_bytes: usize) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Meme title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_MEME_TITLE_LENGTH {
        return Err(format!(
            "Meme title exceeds maximum length of {MAX_MEME_TITLE_LENGTH} characters"
        ));
    }
    if size_bytes == 0 {
        return Err("Uploaded image is empty".to_string());
    }
    if size_bytes > max_bytes {
        return Err(format!("Uploaded image exceeds {max_bytes} bytes"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_links_accepted() {
        for link in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ&t=42",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://m.youtube.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(classify_link(link), Ok(LinkKind::YouTube), "{link}");
        }
    }

    #[test]
    fn spotify_links_accepted() {
        assert_eq!(
            classify_link("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC"),
            Ok(LinkKind::Spotify)
        );
        assert_eq!(
            classify_link("open.spotify.com/episode/4uLU6hMCjMI75M1A2tKUQC?si=abc"),
            Ok(LinkKind::Spotify)
        );
    }

    #[test]
    fn other_links_rejected() {
        assert!(classify_link("https://vimeo.com/123456").is_err());
        assert!(classify_link("https://youtube.com/watch?v=short").is_err());
        assert!(classify_link("https://open.spotify.com/album/4uLU6hMCjMI75M1A2tKUQC").is_err());
        assert!(classify_link("see https://youtu.be/dQw4w9WgXcQ").is_err());
    }

    #[test]
    fn slot_and_status_sets() {
        assert!(validate_slot(SLOT_LONG_BREAK).is_ok());
        assert!(validate_slot("lunch").is_err());
        assert!(validate_status(STATUS_REJECTED).is_ok());
        assert!(validate_status("maybe").is_err());
    }

    #[test]
    fn suggestion_text_rules() {
        assert!(validate_suggestion_text("Song", None).is_ok());
        assert!(validate_suggestion_text("", None).is_err());
        assert!(validate_suggestion_text("Song", Some(&"n".repeat(501))).is_err());
    }

    #[test]
    fn image_extension_is_case_insensitive() {
        assert_eq!(image_extension("Funny.PNG"), Ok("png".to_string()));
        assert!(image_extension("virus.exe").is_err());
        assert!(image_extension("noext").is_err());
    }

    #[test]
    fn meme_size_limits() {
        assert!(validate_meme("lol", 10, 100).is_ok());
        assert!(validate_meme("lol", 0, 100).is_err());
        assert!(validate_meme("lol", 101, 100).is_err());
        assert!(validate_meme(" ", 10, 100).is_err());
    }
}
