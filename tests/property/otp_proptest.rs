//! Properties of one-time passwords

use proptest::prelude::*;

use nordaun::backend::auth::otp::{generate_otp, hash_otp, verify_otp};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_generated_otp_is_digits_of_requested_length(len in 4usize..12) {
        let otp = generate_otp(len);
        prop_assert_eq!(otp.len(), len);
        prop_assert!(otp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_only_the_hashed_code_verifies(len in 4usize..8) {
        let otp = generate_otp(len);
        let hash = hash_otp(&otp, 4).unwrap();
        prop_assert!(verify_otp(&otp, &hash));

        let other: String = otp
            .chars()
            .map(|c| if c == '9' { '0' } else { char::from(c as u8 + 1) })
            .collect();
        prop_assert!(!verify_otp(&other, &hash));
    }
}
