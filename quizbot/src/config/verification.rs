use quizbot_handlers::VerificationConfig;
use std::time::Duration;

use super::env_or;

/// OTP_LENGTH, OTP_VALIDITY_MINUTES, OTP_BLOCK_ON_EMAIL_FAILURE, OTP_ENFORCE_EXPIRY.
/// The login domain is filled in from [`super::EmailConfig`].
pub fn verification_from_env() -> VerificationConfig {
    let defaults = VerificationConfig::default();
    VerificationConfig {
        code_length: env_or("OTP_LENGTH", defaults.code_length),
        code_validity: Duration::from_secs(
            60 * env_or("OTP_VALIDITY_MINUTES", defaults.code_validity.as_secs() / 60),
        ),
        block_on_email_failure: env_or(
            "OTP_BLOCK_ON_EMAIL_FAILURE",
            defaults.block_on_email_failure,
        ),
        enforce_code_expiry: env_or("OTP_ENFORCE_EXPIRY", defaults.enforce_code_expiry),
        login_domain: defaults.login_domain,
    }
}
