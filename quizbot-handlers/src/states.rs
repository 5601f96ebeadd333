//! Verification states and the scratch fields they use.

use quizbot_core::State;

pub const DEFAULT: State = State::DEFAULT;
pub const AWAITING_LOGIN: State = State::from_static("awaiting_login");
pub const AWAITING_OTP: State = State::from_static("awaiting_otp");
pub const REGISTERED: State = State::from_static("registered");

pub const FIELD_LOGIN: &str = "login";
pub const FIELD_CODE: &str = "code";
/// RFC 3339; only written when code expiry is enforced.
pub const FIELD_EXPIRES_AT: &str = "expires_at";
