use actix_web::{Error, HttpMessage, HttpRequest, dev::ServiceRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, Validation, decode};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::error::CustomError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub exp: usize,
}

/// Checks bearer tokens issued by the identity service.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        TokenVerifier {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, CustomError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| CustomError::Unauthorized("Invalid token".to_string()))
    }
}

/// Verify the bearer token and stash its claims for the handlers.
pub async fn verify_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let verified = match req.app_data::<web::Data<TokenVerifier>>() {
        Some(verifier) => verifier.verify(credentials.token()),
        None => Err(CustomError::Unexpected(
            "token verifier is not registered".to_string(),
        )),
    };

    match verified {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(e) => Err((e.into(), req)),
    }
}

/// The authenticated caller's id (use after auth middleware).
pub fn viewer_id(req: &HttpRequest) -> Result<ObjectId, CustomError> {
    let id = req
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.id.clone())
        .ok_or_else(|| CustomError::Unauthorized("Not authenticated".to_string()))?;
    // A signed token naming no valid user is still a bad credential.
    ObjectId::parse_str(id.trim())
        .map_err(|_| CustomError::Unauthorized("Invalid token subject".to_string()))
}

#[cfg(test)]
pub fn issue_test_token(user_id: &ObjectId, secret: &str) -> String {
    let claims = Claims {
        id: user_id.to_hex(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encodes")
}
