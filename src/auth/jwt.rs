use std::time::Duration;

use anyhow::Context;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::storage::{App, User};

/// Identity token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub uid: i64,       // user ID
    pub email: String,  // user email
    pub app_id: i32,    // issuing application
    pub exp: i64,       // expires at (unix timestamp)
}

/// Signs identity tokens. Verification belongs to whoever holds the app secret.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User, app: &App, ttl: Duration) -> anyhow::Result<String>;
}

/// HS256 JWTs keyed by the application's secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtIssuer;

impl JwtIssuer {
    pub fn issue_at(
        &self,
        user: &User,
        app: &App,
        ttl: Duration,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        if app.secret.is_empty() {
            anyhow::bail!("app {} has an empty signing secret", app.id);
        }
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(TimeDuration::seconds(secs)))
            .with_context(|| format!("token ttl of {}s is out of range", ttl.as_secs()))?;
        let claims = Claims {
            uid: user.id,
            email: user.email.clone(),
            app_id: app.id,
            exp: exp.unix_timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(app.secret.as_bytes()),
        )?;
        debug!(user_id = user.id, app_id = app.id, exp = claims.exp, "jwt signed");
        Ok(token)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, user: &User, app: &App, ttl: Duration) -> anyhow::Result<String> {
        self.issue_at(user, app, ttl, OffsetDateTime::now_utc())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    use super::Claims;

    pub(crate) fn decode_claims(
        token: &str,
        secret: &str,
    ) -> jsonwebtoken::errors::Result<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::{test_support::decode_claims, *};

    fn user() -> User {
        User {
            id: 7,
            email: "alice@example.com".into(),
            pass_hash: "unused".into(),
        }
    }

    fn app(secret: &str) -> App {
        App {
            id: 1,
            name: "test".into(),
            secret: secret.into(),
        }
    }

    #[test]
    fn claims_carry_user_app_and_expiry() {
        let ttl = Duration::from_secs(3600);
        let now = OffsetDateTime::now_utc();
        let token = JwtIssuer
            .issue_at(&user(), &app("test-secret"), ttl, now)
            .expect("sign");

        let claims = decode_claims(&token, "test-secret").expect("decode");
        assert_eq!(
            claims,
            Claims {
                uid: 7,
                email: "alice@example.com".into(),
                app_id: 1,
                exp: now.unix_timestamp() + 3600,
            }
        );
    }

    #[test]
    fn signing_is_deterministic_for_fixed_time() {
        let now = OffsetDateTime::now_utc();
        let ttl = Duration::from_secs(60);
        let a = JwtIssuer.issue_at(&user(), &app("s"), ttl, now).unwrap();
        let b = JwtIssuer.issue_at(&user(), &app("s"), ttl, now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_secret_fails_to_decode() {
        let token = JwtIssuer
            .issue(&user(), &app("right"), Duration::from_secs(60))
            .unwrap();
        assert!(decode_claims(&token, "wrong").is_err());
    }

    #[test]
    fn oversized_ttl_is_an_error() {
        let now = OffsetDateTime::now_utc();
        let ttl = Duration::from_secs(100_000_000_000 * 60);
        let err = JwtIssuer.issue_at(&user(), &app("s"), ttl, now).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let err = JwtIssuer
            .issue_at(&user(), &app("s"), Duration::from_secs(u64::MAX), now)
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = JwtIssuer
            .issue(&user(), &app(""), Duration::from_secs(60))
            .unwrap_err();
        assert!(err.to_string().contains("empty signing secret"));
    }
}
