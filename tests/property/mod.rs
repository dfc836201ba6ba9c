//! Property-based tests

mod order_proptest;
mod validation_proptest;
#[cfg(feature = "ssr")]
mod otp_proptest;
#[cfg(feature = "ssr")]
mod token_proptest;
#[cfg(feature = "ssr")]
mod ratelimit_proptest;
