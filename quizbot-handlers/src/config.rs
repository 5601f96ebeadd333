use std::time::Duration;

/// Verification policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationConfig {
    /// Number of digits in a one-time code.
    pub code_length: usize,
    /// Validity window shown in the email (and enforced when `enforce_code_expiry`).
    pub code_validity: Duration,
    /// Keep the conversation in `awaiting_login` when the email could not be sent.
    pub block_on_email_failure: bool,
    /// Reject codes entered after `code_validity` has elapsed.
    pub enforce_code_expiry: bool,
    /// Appended as `@domain` to logins without an `@` to form the recipient address.
    pub login_domain: Option<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            code_validity: Duration::from_secs(30 * 60),
            block_on_email_failure: false,
            enforce_code_expiry: false,
            login_domain: None,
        }
    }
}
