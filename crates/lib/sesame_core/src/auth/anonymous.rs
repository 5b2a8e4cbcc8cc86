//! Anonymous access policy.

use crate::config::AuthConfig;
use crate::models::sign_in::SignInOption;

/// Whether an anonymous session may be created.
///
/// Requires anonymous auth to be switched on locally and reported by the
/// backend. An automatic attempt is only accepted when anonymous is the sole
/// reported option; otherwise the login page is shown instead of looping
/// on silent re-authentication. Evaluated per attempt, never cached.
pub fn is_anonymous_allowed(
    config: &AuthConfig,
    reported_options: &[SignInOption],
    is_auto_login_attempt: bool,
) -> bool {
    if !config.anonymous_auth_enabled {
        return false;
    }
    let anonymous_reported = reported_options.contains(&SignInOption::Anonymous);
    let only_option = reported_options.len() == 1;
    (anonymous_reported && !is_auto_login_attempt) || (anonymous_reported && only_option)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> AuthConfig {
        AuthConfig {
            anonymous_auth_enabled: true,
            ..AuthConfig::default()
        }
    }

    #[test]
    fn requires_anonymous_in_reported_options() {
        let options = [SignInOption::Basic, SignInOption::OpenId];
        assert!(!is_anonymous_allowed(&enabled(), &options, false));
        assert!(!is_anonymous_allowed(&enabled(), &options, true));
        assert!(!is_anonymous_allowed(&enabled(), &[], false));
    }

    #[test]
    fn explicit_attempt_allowed_alongside_other_options() {
        let options = [SignInOption::Basic, SignInOption::Anonymous];
        assert!(is_anonymous_allowed(&enabled(), &options, false));
    }

    #[test]
    fn auto_login_only_when_anonymous_is_the_sole_option() {
        assert!(is_anonymous_allowed(
            &enabled(),
            &[SignInOption::Anonymous],
            true
        ));
        assert!(!is_anonymous_allowed(
            &enabled(),
            &[SignInOption::Anonymous, SignInOption::Saml],
            true
        ));
    }

    #[test]
    fn local_switch_off_denies_everything() {
        let config = AuthConfig::default();
        assert!(!is_anonymous_allowed(
            &config,
            &[SignInOption::Anonymous],
            false
        ));
    }
}
