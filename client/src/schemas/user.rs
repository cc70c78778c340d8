//! User profile schemas.

use serde::{Deserialize, Serialize};
use storefront_remote::{JsonSchema, ObjectShape, Shape};

/// Hair description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hair {
    /// Color
    pub color: String,
    /// Style
    #[serde(rename = "type")]
    pub kind: String,
}

/// Geographic coordinates; either side may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude
    pub lat: Option<f64>,
    /// Longitude
    pub lng: Option<f64>,
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street line
    pub address: String,
    /// City
    pub city: String,
    /// Coordinates
    pub coordinates: Coordinates,
    /// Postal code
    pub postal_code: String,
    /// State
    pub state: String,
}

impl Address {
    fn shape() -> ObjectShape {
        Shape::object()
            .field("address", Shape::string())
            .field("city", Shape::string())
            .field(
                "coordinates",
                Shape::object()
                    .nullable("lat", Shape::number())
                    .nullable("lng", Shape::number()),
            )
            .field("postalCode", Shape::string())
            .field("state", Shape::string())
    }
}

/// Bank card details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    /// Expiry (MM/YY)
    pub card_expire: String,
    /// Card number
    pub card_number: String,
    /// Card network
    pub card_type: String,
    /// Currency code
    pub currency: String,
    /// IBAN
    pub iban: String,
}

/// Employer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Office address
    pub address: Address,
    /// Department
    pub department: String,
    /// Company name
    pub name: String,
    /// Job title
    pub title: String,
}

/// Full user record from `/users/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct UserDetail {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub maiden_name: String,
    pub age: Option<u32>,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub password: String,
    pub birth_date: String,
    pub image: String,
    pub blood_group: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub eye_color: String,
    pub hair: Hair,
    #[serde(default)]
    pub domain: Option<String>,
    pub ip: String,
    pub address: Address,
    pub mac_address: String,
    pub university: String,
    pub bank: Bank,
    pub company: Company,
    pub ein: String,
    pub ssn: String,
    pub user_agent: String,
}

impl UserDetail {
    /// Schema of a full user record.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        let bank = Shape::object()
            .field("cardExpire", Shape::string())
            .field("cardNumber", Shape::string())
            .field("cardType", Shape::string())
            .field("currency", Shape::string())
            .field("iban", Shape::string());

        let company = Shape::object()
            .field("address", Address::shape())
            .field("department", Shape::string())
            .field("name", Shape::string())
            .field("title", Shape::string());

        JsonSchema::new(
            Shape::object()
                .field("id", Shape::number().integer())
                .field("firstName", Shape::string())
                .field("lastName", Shape::string())
                .field("maidenName", Shape::string())
                .nullable("age", Shape::number().integer())
                .field("gender", Shape::string())
                .field("email", Shape::string())
                .field("phone", Shape::string())
                .field("username", Shape::string())
                .field("password", Shape::string())
                .field("birthDate", Shape::string())
                .field("image", Shape::string())
                .field("bloodGroup", Shape::string())
                .nullable("height", Shape::number())
                .nullable("weight", Shape::number())
                .field("eyeColor", Shape::string())
                .field(
                    "hair",
                    Shape::object()
                        .field("color", Shape::string())
                        .field("type", Shape::string()),
                )
                .optional("domain", Shape::string())
                .field("ip", Shape::string())
                .field("address", Address::shape())
                .field("macAddress", Shape::string())
                .field("university", Shape::string())
                .field("bank", bank)
                .field("company", company)
                .field("ein", Shape::string())
                .field("ssn", Shape::string())
                .field("userAgent", Shape::string()),
        )
    }
}

/// Account summary echoed by `POST /users/add` and `PUT /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User id
    pub id: u64,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// First name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,
}

impl UserSummary {
    /// Schema of an account write response.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        JsonSchema::new(
            Shape::object()
                .field("id", Shape::number().integer())
                .field("username", Shape::string())
                .field("email", Shape::string())
                .optional("firstName", Shape::string())
                .optional("lastName", Shape::string()),
        )
    }
}
