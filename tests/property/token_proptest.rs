//! Properties of signed credentials

use proptest::prelude::*;
use uuid::Uuid;

use nordaun::backend::auth::licenses::LicenseClaims;
use nordaun::backend::auth::sessions::SessionClaims;
use nordaun::backend::auth::tokens::{decrypt, encrypt, now_secs};
use nordaun::shared::LicensedRoute;

const SECRET: &str = "property-secret-that-is-long-enough";

fn arb_route() -> impl Strategy<Value = LicensedRoute> {
    prop::sample::select(LicensedRoute::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_session_claims_survive_signing(id in any::<u128>(), ttl in 60u64..86_400) {
        let iat = now_secs();
        let claims = SessionClaims { sub: Uuid::from_u128(id), iat, exp: iat + ttl };
        let token = encrypt(SECRET, &claims).unwrap();

        let decoded: SessionClaims = decrypt(SECRET, &token).unwrap();
        prop_assert_eq!(decoded.sub, claims.sub);
        prop_assert_eq!(decoded.exp, claims.exp);
        prop_assert!(decrypt::<SessionClaims>("another-secret-that-is-long-enough", &token).is_none());
    }

    #[test]
    fn test_tampered_license_is_rejected(id in any::<u128>(), route in arb_route(), signed in any::<bool>(), at in 0usize..64) {
        let iat = now_secs();
        let claims = LicenseClaims { sub: Uuid::from_u128(id), target: route, signed, iat, exp: iat + 600 };
        let token = encrypt(SECRET, &claims).unwrap();

        let decoded: LicenseClaims = decrypt(SECRET, &token).unwrap();
        prop_assert_eq!(decoded.target, route);
        prop_assert_eq!(decoded.signed, signed);

        let mut bytes = token.into_bytes();
        let index = bytes.len() - 2 - (at % 8);
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        prop_assert!(decrypt::<LicenseClaims>(SECRET, &tampered).is_none());
    }

    #[test]
    fn test_expired_tokens_are_rejected(id in any::<u128>(), age in 3_600u64..100_000) {
        let now = now_secs();
        let claims = SessionClaims { sub: Uuid::from_u128(id), iat: now - age - 60, exp: now - age };
        let token = encrypt(SECRET, &claims).unwrap();
        prop_assert!(decrypt::<SessionClaims>(SECRET, &token).is_none());
    }
}
