//! Properties of the form validation rules

use proptest::prelude::*;

use nordaun::shared::validation;

proptest! {
    #[test]
    fn test_usernames_of_allowed_chars_pass(username in "[a-z0-9_]{3,30}") {
        prop_assert!(validation::username(&username).is_ok());
    }

    #[test]
    fn test_uppercase_usernames_fail(prefix in "[a-z]{2,10}", upper in "[A-Z]") {
        let username = format!("{prefix}{upper}");
        prop_assert!(validation::username(&username).is_err());
    }

    #[test]
    fn test_passwords_need_letter_and_digit(letters in "[a-zA-Z]{4,20}", digits in "[0-9]{4,20}") {
        let mixed = format!("{letters}{digits}");
        prop_assert!(validation::password(&mixed).is_ok());
        prop_assert!(validation::password(&format!("{letters}{letters}")).is_err());
        prop_assert!(validation::password(&format!("{digits}{digits}")).is_err());
    }

    #[test]
    fn test_chat_names_respect_length(name in "[A-Za-z0-9 ]{1,50}", extra in "[a-z]{51,80}") {
        prop_assert!(validation::chat_name(&name).is_ok());
        prop_assert!(validation::chat_name(&extra).is_err());
    }

    #[test]
    fn test_phone_normalization_is_stable(digits in "[1-9][0-9]{7,14}") {
        let spaced = format!("+{} {}", &digits[..3], &digits[3..]);
        let normalized = validation::normalize_phone(&spaced);
        prop_assert_eq!(normalized.as_deref(), Some(format!("+{digits}").as_str()));
        prop_assert_eq!(validation::normalize_phone(&format!("+{digits}")), normalized);
    }
}
