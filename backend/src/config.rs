//! Community settings loaded via OrthoConfig.
//!
//! Values come from `COMMUNITY_*` environment variables, configuration files
//! and command-line flags, in OrthoConfig's usual precedence.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    CommunityServiceOptions, DEFAULT_PAGE_LIMIT, LastMemberPolicy, MAX_PAGE_LIMIT,
};

/// Configuration values controlling community lifecycle behaviour.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COMMUNITY")]
pub struct CommunitySettings {
    /// Fate of a community once its last member leaves.
    pub last_member_policy: Option<LastMemberPolicy>,
    /// Page size used when a listing omits `limit`.
    pub default_page_limit: Option<u32>,
}

impl CommunitySettings {
    /// Return the configured policy, falling back to `retain`.
    pub fn last_member_policy(&self) -> LastMemberPolicy {
        self.last_member_policy.unwrap_or_default()
    }

    /// Return the configured page size, clamped into the accepted range.
    pub fn default_page_limit(&self) -> u32 {
        self.default_page_limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    /// Resolve the settings into service options.
    pub fn service_options(&self) -> CommunityServiceOptions {
        CommunityServiceOptions {
            last_member_policy: self.last_member_policy(),
            default_page_limit: self.default_page_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for community configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> CommunitySettings {
        CommunitySettings::load_from_iter([OsString::from("mealflow")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env([
            ("COMMUNITY_LAST_MEMBER_POLICY", None::<String>),
            ("COMMUNITY_DEFAULT_PAGE_LIMIT", None::<String>),
        ]);

        let options = load_from_empty_args().service_options();
        assert_eq!(options, CommunityServiceOptions::default());
        assert_eq!(options.last_member_policy, LastMemberPolicy::Retain);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("COMMUNITY_LAST_MEMBER_POLICY", Some("archive".to_owned())),
            ("COMMUNITY_DEFAULT_PAGE_LIMIT", Some("25".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.last_member_policy(), LastMemberPolicy::Archive);
        assert_eq!(settings.default_page_limit(), 25);
    }

    #[rstest]
    #[case::zero(0, 1)]
    #[case::too_large(5_000, MAX_PAGE_LIMIT)]
    fn page_limit_is_clamped(#[case] configured: u32, #[case] expected: u32) {
        let settings = CommunitySettings {
            last_member_policy: None,
            default_page_limit: Some(configured),
        };
        assert_eq!(settings.default_page_limit(), expected);
    }
}
