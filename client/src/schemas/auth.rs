//! Login schemas.

use serde::{Deserialize, Serialize};
use storefront_remote::{JsonSchema, Shape};

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// User id
    pub id: u64,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Gender
    pub gender: String,
    /// Avatar URL
    pub image: String,
    /// Bearer token (a JWT)
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
}

impl LoginResponse {
    /// Schema of the login response.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        JsonSchema::new(
            Shape::object()
                .field("id", Shape::number().integer())
                .field("username", Shape::string())
                .field("email", Shape::string())
                .field("firstName", Shape::string())
                .field("lastName", Shape::string())
                .field("gender", Shape::string())
                .field("image", Shape::string())
                .field("accessToken", Shape::string())
                .field("refreshToken", Shape::string()),
        )
    }
}
