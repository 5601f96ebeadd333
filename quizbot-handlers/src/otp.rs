//! One-time code generation.

use quizbot_core::{BotError, Result};
use rand::rngs::OsRng;
use rand::RngCore;

pub trait OtpGenerator: Send + Sync {
    /// Returns a fresh numeric code of fixed length.
    fn generate(&self) -> Result<String>;
}

/// Digits drawn from the OS CSPRNG, one random byte per digit.
///
/// Bytes of 250 and above are redrawn so `byte % 10` is uniform over `0..=9`.
#[derive(Debug, Clone)]
pub struct RandomOtpGenerator {
    length: usize,
}

impl RandomOtpGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomOtpGenerator {
    fn default() -> Self {
        Self::new(6)
    }
}

impl OtpGenerator for RandomOtpGenerator {
    fn generate(&self) -> Result<String> {
        if self.length == 0 {
            return Err(BotError::Otp("code length must be positive".to_string()));
        }
        let mut code = String::with_capacity(self.length);
        let mut buf = [0u8; 16];
        while code.len() < self.length {
            OsRng
                .try_fill_bytes(&mut buf)
                .map_err(|e| BotError::Otp(e.to_string()))?;
            for byte in buf.iter().copied().filter(|b| *b < 250) {
                if code.len() == self.length {
                    break;
                }
                code.push(char::from(b'0' + byte % 10));
            }
        }
        Ok(code)
    }
}
