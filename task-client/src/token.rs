//! Чтение срока действия bearer-токена.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// Читает `exp` (секунды эпохи) из payload-сегмента токена.
///
/// Подпись не проверяется: ключ есть только у сервера, клиенту нужен лишь
/// срок действия.
pub fn expires_at(token: &str) -> Result<i64, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims.exp)
}

/// `true`, если срок действия токена ещё не истёк к моменту `now`.
///
/// Любая ошибка разбора означает «не аутентифицирован».
pub fn is_unexpired(token: &str, now: DateTime<Utc>) -> bool {
    match expires_at(token) {
        Ok(exp) => exp > now.timestamp(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to parse bearer token");
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        exp: i64,
    }

    pub(crate) fn token_expiring_at(exp: i64) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &Claims { sub: "alice", exp },
            &EncodingKey::from_secret(b"server-side-secret-the-client-never-sees"),
        )
        .expect("token must encode")
    }

    pub(crate) fn valid_token() -> String {
        token_expiring_at((Utc::now() + Duration::hours(1)).timestamp())
    }

    #[test]
    fn reads_exp_without_knowing_the_secret() {
        let token = token_expiring_at(1_900_000_000);
        assert_eq!(expires_at(&token).expect("exp must decode"), 1_900_000_000);
    }

    #[test]
    fn future_exp_is_valid() {
        let now = Utc::now();
        let token = token_expiring_at((now + Duration::minutes(5)).timestamp());
        assert!(is_unexpired(&token, now));
    }

    #[test]
    fn exp_equal_to_now_is_expired() {
        let now = Utc::now();
        let token = token_expiring_at(now.timestamp());
        assert!(!is_unexpired(&token, now));
    }

    #[test]
    fn past_exp_is_expired() {
        let now = Utc::now();
        let token = token_expiring_at((now - Duration::seconds(1)).timestamp());
        assert!(!is_unexpired(&token, now));
    }

    #[test]
    fn garbage_fails_closed() {
        let now = Utc::now();
        assert!(!is_unexpired("not-a-token", now));
        assert!(!is_unexpired("a.b.c", now));
        assert!(!is_unexpired("", now));
    }
}
