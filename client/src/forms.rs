//! Form validation for login, registration and profile editing.
//!
//! Forms are checked with the same [`Shape`] machinery as server documents.
//! Every violated rule is reported, keyed by the form field name, so a UI can
//! show the first message per field with [`Violations::for_field`].

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use storefront_remote::{FieldPath, ObjectShape, Shape, Violations};

const SPECIAL_CHARACTERS: &str = r"[$&+,:;=?@#|'<>.^*()%!-]";
const PHONE_NUMBER: &str = r"^([+]?[\s0-9]+)?(\d{3}|[(]?[0-9]+[)])?([-]?[\s]?[0-9])+$";

static LOGIN_SHAPE: LazyLock<Shape> = LazyLock::new(|| {
    Shape::object()
        .field("username", Shape::string().min_len(1, "Username is required."))
        .field("password", Shape::string().min_len(1, "Password is required"))
        .into()
});

static REGISTER_SHAPE: LazyLock<Shape> = LazyLock::new(|| register_shape().into());

static PROFILE_SHAPE: LazyLock<Shape> = LazyLock::new(|| {
    Shape::object()
        .field(
            "username",
            Shape::string().min_len(3, "Username must be at least 3 characters"),
        )
        .field("email", Shape::string().email("Invalid email"))
        .field(
            "password",
            Shape::string()
                .min_len(8, "Password is too short")
                .max_len(20, "Password is too long")
                .pattern("[A-Z]", "Must contain uppercase")
                .pattern("[a-z]", "Must contain lowercase")
                .pattern("[0-9]", "Must contain number")
                .pattern(SPECIAL_CHARACTERS, "Must contain special character"),
        )
        .field(
            "phone_number",
            Shape::string().pattern(PHONE_NUMBER, "Invalid phone number"),
        )
        .field("address", Shape::string().max_len(255, "Address is too long"))
        .field("bio", Shape::string().max_len(255, "Bio is too long"))
        .into()
});

fn name_rules(label: &str) -> storefront_remote::StringShape {
    Shape::string()
        .min_len(1, format!("{label} is required"))
        .max_len(20, format!("{label} maximum length is 20 characters"))
}

fn register_shape() -> ObjectShape {
    Shape::object()
        .field(
            "username",
            Shape::string()
                .min_len(3, "Username must be at least 3 characters")
                .refine("Username cannot contain spaces", |username| !username.contains(' ')),
        )
        .field("firstName", name_rules("First name"))
        .field("lastName", name_rules("Last name"))
        .field(
            "email",
            Shape::string()
                .email("Invalid email format")
                .min_len(1, "Email is required"),
        )
        .field(
            "password",
            Shape::string()
                .min_len(8, "Password minimum length is 8 characters")
                .max_len(20, "Password maximum length is 20 characters")
                .pattern("[A-Z]", "Password must contain uppercase letter")
                .pattern("[a-z]", "Password must contain lowercase letter")
                .pattern("[0-9]", "Password contain number")
                .pattern(SPECIAL_CHARACTERS, "Password must contain special character"),
        )
        .field(
            "confirmPassword",
            Shape::string().min_len(1, "Confirm password is required"),
        )
        .field(
            "agree",
            Shape::boolean().must_be_true("You must agree to the rules and policy"),
        )
        .refine(&["confirmPassword"], "Passwords don't match", |form| {
            form.get("password") == form.get("confirmPassword")
        })
}

fn check<T: Serialize>(form: &T, shape: &Shape) -> Result<(), Violations> {
    let mut document = serde_json::to_value(form)
        .map_err(|e| Violations::single(FieldPath::root(), e.to_string()))?;
    shape.check(&mut document)
}

/// Login form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl LoginForm {
    /// Create a filled-in form.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-empty.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn validate(&self) -> Result<(), Violations> {
        check(self, &LOGIN_SHAPE)
    }
}

/// Registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Rules and policy accepted
    pub agree: bool,
}

/// What is sent to `POST /users/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    /// Username
    pub username: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email
    pub email: String,
    /// Password
    pub password: String,
}

impl RegisterForm {
    /// Check every field, then that both passwords match.
    ///
    /// # Errors
    ///
    /// Returns every violated rule. The mismatch is reported at
    /// `confirmPassword`, and only once the fields themselves are valid.
    pub fn validate(&self) -> Result<(), Violations> {
        check(self, &REGISTER_SHAPE)
    }

    /// The submitted fields without the confirmation and consent.
    #[must_use]
    pub fn payload(&self) -> RegisterPayload {
        RegisterPayload {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Profile editing form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub address: String,
    pub bio: String,
}

/// What is sent to `PUT /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// Password
    pub password: String,
    /// Phone number
    pub phone: String,
}

impl ProfileForm {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn validate(&self) -> Result<(), Violations> {
        check(self, &PROFILE_SHAPE)
    }

    /// The account fields the API stores.
    ///
    /// Address and bio are free text on the form while the API keeps a
    /// structured address, so neither is sent.
    #[must_use]
    pub fn payload(&self) -> ProfileUpdate {
        ProfileUpdate {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            phone: self.phone_number.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message<'a>(violations: &'a Violations, field: &str) -> Option<&'a str> {
        violations.for_field(field).map(|v| v.message.as_str())
    }

    fn valid_registration() -> RegisterForm {
        RegisterForm {
            username: "nabila".to_string(),
            first_name: "Nabila".to_string(),
            last_name: "Putri".to_string(),
            email: "nabila@example.com".to_string(),
            password: "Secret#123".to_string(),
            confirm_password: "Secret#123".to_string(),
            agree: true,
        }
    }

    fn valid_profile() -> ProfileForm {
        ProfileForm {
            username: "emilys".to_string(),
            email: "emily.johnson@x.dummyjson.com".to_string(),
            password: "Emily#2024".to_string(),
            phone_number: "+81 965-431-3024".to_string(),
            address: "626 Main Street".to_string(),
            bio: String::new(),
        }
    }

    #[test]
    fn test_empty_login_form() {
        let violations = LoginForm::default().validate().unwrap_err();
        assert_eq!(message(&violations, "username"), Some("Username is required."));
        assert_eq!(message(&violations, "password"), Some("Password is required"));
        assert!(LoginForm::new("emilys", "emilyspass").validate().is_ok());
    }

    #[test]
    fn test_valid_registration() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn test_registration_field_rules() {
        let form = RegisterForm {
            username: "ab".to_string(),
            first_name: "A".repeat(21),
            email: "nabila".to_string(),
            password: "short".to_string(),
            ..valid_registration()
        };
        let violations = form.validate().unwrap_err();

        assert_eq!(
            message(&violations, "username"),
            Some("Username must be at least 3 characters")
        );
        assert_eq!(
            message(&violations, "firstName"),
            Some("First name maximum length is 20 characters")
        );
        assert_eq!(message(&violations, "email"), Some("Invalid email format"));
        assert_eq!(
            message(&violations, "password"),
            Some("Password minimum length is 8 characters")
        );
        assert!(message(&violations, "lastName").is_none());
    }

    #[test]
    fn test_username_with_space() {
        let form = RegisterForm {
            username: "nabila putri".to_string(),
            ..valid_registration()
        };
        let violations = form.validate().unwrap_err();
        assert_eq!(message(&violations, "username"), Some("Username cannot contain spaces"));
    }

    #[test]
    fn test_password_character_classes() {
        let form = RegisterForm {
            password: "alllowercase".to_string(),
            confirm_password: "alllowercase".to_string(),
            ..valid_registration()
        };
        let violations = form.validate().unwrap_err();
        let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Password must contain uppercase letter",
                "Password contain number",
                "Password must contain special character",
            ]
        );
    }

    #[test]
    fn test_password_mismatch_reported_on_confirmation() {
        let form = RegisterForm {
            confirm_password: "Secret#124".to_string(),
            ..valid_registration()
        };
        let violations = form.validate().unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.first().unwrap().path.to_string(), "confirmPassword");
        assert_eq!(message(&violations, "confirmPassword"), Some("Passwords don't match"));
    }

    #[test]
    fn test_agreement_required() {
        let form = RegisterForm {
            agree: false,
            ..valid_registration()
        };
        let violations = form.validate().unwrap_err();
        assert_eq!(
            message(&violations, "agree"),
            Some("You must agree to the rules and policy")
        );
    }

    #[test]
    fn test_payload_omits_confirmation_and_consent() {
        let payload = serde_json::to_value(valid_registration().payload()).unwrap();
        let keys: Vec<&str> = payload.as_object().unwrap().keys().map(String::as_str).collect();
        assert!(keys.contains(&"firstName"));
        assert!(!keys.contains(&"confirmPassword"));
        assert!(!keys.contains(&"agree"));
    }

    #[test]
    fn test_profile_rules() {
        assert!(valid_profile().validate().is_ok());

        let form = ProfileForm {
            email: "emily".to_string(),
            phone_number: "call me".to_string(),
            bio: "x".repeat(256),
            ..valid_profile()
        };
        let violations = form.validate().unwrap_err();
        assert_eq!(message(&violations, "email"), Some("Invalid email"));
        assert_eq!(message(&violations, "phone_number"), Some("Invalid phone number"));
        assert_eq!(message(&violations, "bio"), Some("Bio is too long"));
        assert!(message(&violations, "address").is_none());
    }

    #[test]
    fn test_profile_phone_formats() {
        for phone in ["+62 812 3456 7890", "(021) 555-0199", "08123456789"] {
            let form = ProfileForm {
                phone_number: phone.to_string(),
                ..valid_profile()
            };
            assert!(form.validate().is_ok(), "{phone} should be accepted");
        }
    }
}
