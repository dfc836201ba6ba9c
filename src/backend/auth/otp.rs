//! One-time passwords for step-up verification
//!
//! Only the bcrypt hash of an OTP is stored; the plain code goes out by mail.

use rand::Rng;

/// Uniform random code of exactly `len` digits, leading zeros kept
pub fn generate_otp(len: usize) -> String {
    let upper = 10u64.pow(len as u32);
    let value = rand::thread_rng().gen_range(0..upper);
    format!("{:0width$}", value, width = len)
}

pub fn hash_otp(otp: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(otp, cost)
}

pub fn verify_otp(otp: &str, hash: &str) -> bool {
    bcrypt::verify(otp, hash).unwrap_or(false)
}
