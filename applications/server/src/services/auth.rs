/// Authentication service - JWT and password handling
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use heights_core::{CoreError, NewUser, RegisterRequest, UserId, UserProfile, UserStore};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    token_expiration: Option<Duration>,
    hash_cost: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub iat: i64,    // Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>, // Expiration time, absent for non-expiring tokens
}

impl AuthService {
    /// `expiration_hours = None` issues tokens without an `exp` claim
    pub fn new(secret: String, expiration_hours: Option<u64>) -> Self {
        Self {
            secret,
            token_expiration: expiration_hours.map(|h| Duration::hours(h as i64)),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt cost (tests use the minimum)
    #[must_use]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.hash_cost).map_err(ServerError::from)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(ServerError::from)
    }

    /// Issue a bearer token for a user
    pub fn issue_token(&self, user_id: &UserId) -> Result<String> {
        let now = Utc::now();

        let claims = Claims {
            sub: user_id.as_str().to_string(),
            iat: now.timestamp(),
            exp: self.token_expiration.map(|d| (now + d).timestamp()),
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());

        // `exp` is checked when present but not required
        let mut validation = Validation::default();
        validation.required_spec_claims.clear();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify a bearer token and return its user
    pub fn verify_bearer(&self, token: &str) -> Result<UserId> {
        let claims = self.verify_token(token)?;
        Ok(UserId::new(claims.sub))
    }

    /// Create an account after checking required fields and email uniqueness.
    ///
    /// Shared by `POST /api/auth/register` and the `add-user` command.
    pub async fn register(&self, users: &dyn UserStore, req: RegisterRequest) -> Result<UserProfile> {
        if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
            return Err(ServerError::BadRequest(
                "Name, email, and password are required".to_string(),
            ));
        }

        let new_user = NewUser::new(req.name.trim(), &req.email);
        if users.find_user_by_email(&new_user.email).await?.is_some() {
            return Err(ServerError::Conflict("User already exists".to_string()));
        }

        let password_hash = self.hash_password(&req.password)?;

        // A concurrent registration can still lose the race on the unique index
        users
            .create_user(new_user, &password_hash)
            .await
            .map_err(|e| match e {
                CoreError::Duplicate(_) => ServerError::Conflict("User already exists".to_string()),
                other => other.into(),
            })
    }
}
