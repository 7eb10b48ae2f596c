//! Site-wide feature toggles.

use crate::error::CoreError;

/// A feature that can be switched off from the site settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    BellSuggestions,
    WeeklyPoll,
    MemeOfTheWeek,
    UserRegistration,
    ProgramPage,
}

impl Feature {
    /// Human-readable name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Feature::BellSuggestions => "bell song suggestions",
            Feature::WeeklyPoll => "weekly poll",
            Feature::MemeOfTheWeek => "meme of the week",
            Feature::UserRegistration => "user registration",
            Feature::ProgramPage => "program page",
        }
    }
}

/// Snapshot of the feature columns of the site settings row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub maintenance_mode: bool,
    pub bell_suggestions: bool,
    pub weekly_poll: bool,
    pub meme_of_the_week: bool,
    pub user_registration: bool,
    pub program_page: bool,
}

impl Default for FeatureFlags {
    /// Everything on, maintenance off. Matches the column defaults.
    fn default() -> Self {
        Self {
            maintenance_mode: false,
            bell_suggestions: true,
            weekly_poll: true,
            meme_of_the_week: true,
            user_registration: true,
            program_page: true,
        }
    }
}

impl FeatureFlags {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::BellSuggestions => self.bell_suggestions,
            Feature::WeeklyPoll => self.weekly_poll,
            Feature::MemeOfTheWeek => self.meme_of_the_week,
            Feature::UserRegistration => self.user_registration,
            Feature::ProgramPage => self.program_page,
        }
    }

    /// Fail with [`CoreError::FeatureDisabled`] when `feature` is off.
    pub fn require(&self, feature: Feature) -> Result<(), CoreError> {
        if self.is_enabled(feature) {
            Ok(())
        } else {
            Err(CoreError::FeatureDisabled(feature.label()))
        }
    }
}

/// Path prefixes (relative to `/api/v1`) that stay reachable in maintenance mode.
pub const MAINTENANCE_EXEMPT_PREFIXES: &[&str] = &["/auth", "/settings", "/admin"];

/// Whether a request path bypasses maintenance mode.
pub fn is_maintenance_exempt(path: &str) -> bool {
    MAINTENANCE_EXEMPT_PREFIXES
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let flags = FeatureFlags::default();
        assert!(!flags.maintenance_mode);
        assert!(flags.require(Feature::WeeklyPoll).is_ok());
        assert!(flags.require(Feature::MemeOfTheWeek).is_ok());
    }

    #[test]
    fn disabled_feature_is_reported() {
        let flags = FeatureFlags {
            bell_suggestions: false,
            ..FeatureFlags::default()
        };
        assert_matches!(
            flags.require(Feature::BellSuggestions),
            Err(CoreError::FeatureDisabled("bell song suggestions"))
        );
        assert!(flags.require(Feature::UserRegistration).is_ok());
    }

    #[test]
    fn maintenance_exemptions() {
        assert!(is_maintenance_exempt("/auth/token"));
        assert!(is_maintenance_exempt("/settings"));
        assert!(is_maintenance_exempt("/admin/posts/3"));
        assert!(!is_maintenance_exempt("/posts"));
        assert!(!is_maintenance_exempt("/administrators"));
    }
}
