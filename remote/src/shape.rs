//! Declarative shape combinators for JSON documents.
//!
//! A [`Shape`] describes what a document must look like: primitive types,
//! string and number constraints, arrays, and objects with required,
//! optional, nullable or defaulted fields plus cross-field refinements.
//! Checking collects every violation in document order.
//!
//! ```
//! use serde_json::json;
//! use storefront_remote::shape::Shape;
//!
//! let shape: Shape = Shape::object()
//!     .field("username", Shape::string().min_len(3, "Username must be at least 3 characters"))
//!     .optional("bio", Shape::string().max_len(255, "Bio is too long"))
//!     .into();
//!
//! let mut doc = json!({ "username": "al" });
//! let violations = shape.check(&mut doc).unwrap_err();
//! assert_eq!(violations.first().unwrap().path.to_string(), "username");
//! ```

use crate::schema::{FieldPath, Violation, Violations};
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

type StrCheck = Arc<dyn Fn(&str) -> bool + Send + Sync>;
type ObjectCheck = Arc<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>;

/// Declarative description of an expected JSON value
#[derive(Clone, Debug)]
pub enum Shape {
    /// Any value, including null
    Any,
    /// A string with optional constraints
    String(StringShape),
    /// A number with optional constraints
    Number(NumberShape),
    /// A boolean
    Boolean(BooleanShape),
    /// An array whose items all match one shape
    Array(ArrayShape),
    /// An object with named fields
    Object(ObjectShape),
}

impl Shape {
    /// Accept any value
    #[must_use]
    pub const fn any() -> Self {
        Self::Any
    }

    /// A string
    #[must_use]
    pub const fn string() -> StringShape {
        StringShape { rules: Vec::new() }
    }

    /// A number
    #[must_use]
    pub const fn number() -> NumberShape {
        NumberShape {
            integer: false,
            min: None,
            max: None,
        }
    }

    /// A boolean
    #[must_use]
    pub const fn boolean() -> BooleanShape {
        BooleanShape { must_be_true: None }
    }

    /// An array of `item`
    #[must_use]
    pub fn array(item: impl Into<Self>) -> ArrayShape {
        ArrayShape {
            item: Box::new(item.into()),
        }
    }

    /// An object with no fields yet
    #[must_use]
    pub const fn object() -> ObjectShape {
        ObjectShape {
            fields: Vec::new(),
            refinements: Vec::new(),
        }
    }

    /// Check `value` against this shape, filling in field defaults
    ///
    /// # Errors
    ///
    /// Returns every violated constraint, in document order.
    pub fn check(&self, value: &mut Value) -> Result<(), Violations> {
        let mut path = FieldPath::root();
        let mut out = Vec::new();
        self.check_at(value, &mut path, &mut out);
        if out.is_empty() {
            Ok(())
        } else {
            Err(Violations::new(out))
        }
    }

    fn check_at(&self, value: &mut Value, path: &mut FieldPath, out: &mut Vec<Violation>) {
        match self {
            Self::Any => {},
            Self::String(shape) => match value {
                Value::String(s) => shape.check_str(s, path, out),
                other => out.push(type_mismatch(path, "string", other)),
            },
            Self::Number(shape) => match value.as_f64() {
                Some(n) => shape.check_number(n, path, out),
                None => out.push(type_mismatch(path, "number", value)),
            },
            Self::Boolean(shape) => match value {
                Value::Bool(b) => {
                    if let Some(message) = &shape.must_be_true {
                        if !*b {
                            out.push(Violation::new(path.clone(), message.clone()));
                        }
                    }
                },
                other => out.push(type_mismatch(path, "boolean", other)),
            },
            Self::Array(shape) => match value {
                Value::Array(items) => {
                    for (idx, item) in items.iter_mut().enumerate() {
                        path.push_index(idx);
                        shape.item.check_at(item, path, out);
                        path.pop();
                    }
                },
                other => out.push(type_mismatch(path, "array", other)),
            },
            Self::Object(shape) => match value {
                Value::Object(map) => shape.check_object(map, path, out),
                other => out.push(type_mismatch(path, "object", other)),
            },
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_mismatch(path: &FieldPath, expected: &str, received: &Value) -> Violation {
    Violation::new(
        path.clone(),
        format!("Expected {expected}, received {}", kind_of(received)),
    )
}

#[derive(Clone)]
enum StringRule {
    MinLen { len: usize, message: String },
    MaxLen { len: usize, message: String },
    Pattern { regex: Regex, message: String },
    InvalidPattern { pattern: String, error: String },
    Email { message: String },
    Url { message: String },
    DateTime { message: String },
    Refine { check: StrCheck, message: String },
}

impl fmt::Debug for StringRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinLen { len, .. } => write!(f, "MinLen({len})"),
            Self::MaxLen { len, .. } => write!(f, "MaxLen({len})"),
            Self::Pattern { regex, .. } => write!(f, "Pattern({})", regex.as_str()),
            Self::InvalidPattern { pattern, .. } => write!(f, "InvalidPattern({pattern})"),
            Self::Email { .. } => write!(f, "Email"),
            Self::Url { .. } => write!(f, "Url"),
            Self::DateTime { .. } => write!(f, "DateTime"),
            Self::Refine { .. } => write!(f, "Refine(<fn>)"),
        }
    }
}

/// String constraints
#[derive(Clone, Debug)]
pub struct StringShape {
    rules: Vec<StringRule>,
}

impl StringShape {
    /// At least `len` characters
    #[must_use]
    pub fn min_len(mut self, len: usize, message: impl Into<String>) -> Self {
        self.rules.push(StringRule::MinLen {
            len,
            message: message.into(),
        });
        self
    }

    /// At most `len` characters
    #[must_use]
    pub fn max_len(mut self, len: usize, message: impl Into<String>) -> Self {
        self.rules.push(StringRule::MaxLen {
            len,
            message: message.into(),
        });
        self
    }

    /// Must match the regular expression `pattern` somewhere in the string
    ///
    /// An invalid pattern makes every value fail with a violation naming it.
    #[must_use]
    pub fn pattern(mut self, pattern: &str, message: impl Into<String>) -> Self {
        let rule = match Regex::new(pattern) {
            Ok(regex) => StringRule::Pattern {
                regex,
                message: message.into(),
            },
            Err(e) => StringRule::InvalidPattern {
                pattern: pattern.to_string(),
                error: e.to_string(),
            },
        };
        self.rules.push(rule);
        self
    }

    /// Must look like an email address
    #[must_use]
    pub fn email(mut self, message: impl Into<String>) -> Self {
        self.rules.push(StringRule::Email {
            message: message.into(),
        });
        self
    }

    /// Must parse as an absolute URL
    #[must_use]
    pub fn url(mut self, message: impl Into<String>) -> Self {
        self.rules.push(StringRule::Url {
            message: message.into(),
        });
        self
    }

    /// Must be an RFC 3339 timestamp
    #[must_use]
    pub fn datetime(mut self, message: impl Into<String>) -> Self {
        self.rules.push(StringRule::DateTime {
            message: message.into(),
        });
        self
    }

    /// Must satisfy an arbitrary predicate
    #[must_use]
    pub fn refine<F>(mut self, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.rules.push(StringRule::Refine {
            check: Arc::new(check),
            message: message.into(),
        });
        self
    }

    fn check_str(&self, value: &str, path: &FieldPath, out: &mut Vec<Violation>) {
        for rule in &self.rules {
            let failure = match rule {
                StringRule::MinLen { len, message } => {
                    (value.chars().count() < *len).then_some(message.clone())
                },
                StringRule::MaxLen { len, message } => {
                    (value.chars().count() > *len).then_some(message.clone())
                },
                StringRule::Pattern { regex, message } => {
                    (!regex.is_match(value)).then_some(message.clone())
                },
                StringRule::InvalidPattern { pattern, error } => {
                    Some(format!("Invalid pattern {pattern}: {error}"))
                },
                StringRule::Email { message } => {
                    (!looks_like_email(value)).then_some(message.clone())
                },
                StringRule::Url { message } => {
                    reqwest::Url::parse(value).is_err().then_some(message.clone())
                },
                StringRule::DateTime { message } => chrono::DateTime::parse_from_rfc3339(value)
                    .is_err()
                    .then_some(message.clone()),
                StringRule::Refine { check, message } => {
                    (!check(value)).then_some(message.clone())
                },
            };
            if let Some(message) = failure {
                out.push(Violation::new(path.clone(), message));
            }
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let well_formed = |part: &str| !part.is_empty() && !part.contains(char::is_whitespace);
    well_formed(local)
        && well_formed(domain)
        && !domain.contains('@')
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Number constraints
#[derive(Clone, Debug)]
pub struct NumberShape {
    integer: bool,
    min: Option<(f64, String)>,
    max: Option<(f64, String)>,
}

impl NumberShape {
    /// Must have no fractional part
    #[must_use]
    pub const fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Must be `>= bound`
    #[must_use]
    pub fn min(mut self, bound: f64, message: impl Into<String>) -> Self {
        self.min = Some((bound, message.into()));
        self
    }

    /// Must be `<= bound`
    #[must_use]
    pub fn max(mut self, bound: f64, message: impl Into<String>) -> Self {
        self.max = Some((bound, message.into()));
        self
    }

    fn check_number(&self, value: f64, path: &FieldPath, out: &mut Vec<Violation>) {
        if self.integer && value.fract() != 0.0 {
            out.push(Violation::new(path.clone(), "Expected integer, received float"));
        }
        if let Some((bound, message)) = &self.min {
            if value < *bound {
                out.push(Violation::new(path.clone(), message.clone()));
            }
        }
        if let Some((bound, message)) = &self.max {
            if value > *bound {
                out.push(Violation::new(path.clone(), message.clone()));
            }
        }
    }
}

/// Boolean constraints
#[derive(Clone, Debug)]
pub struct BooleanShape {
    must_be_true: Option<String>,
}

impl BooleanShape {
    /// Must be `true` (consent checkboxes)
    #[must_use]
    pub fn must_be_true(mut self, message: impl Into<String>) -> Self {
        self.must_be_true = Some(message.into());
        self
    }
}

/// Array item shape
#[derive(Clone, Debug)]
pub struct ArrayShape {
    item: Box<Shape>,
}

#[derive(Clone, Debug)]
enum Presence {
    Required,
    Optional,
    Default(Value),
}

#[derive(Clone, Debug)]
struct Field {
    name: String,
    shape: Shape,
    presence: Presence,
    nullable: bool,
}

#[derive(Clone)]
struct Refinement {
    path: FieldPath,
    message: String,
    check: ObjectCheck,
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("path", &self.path.to_string())
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Object fields and cross-field refinements
#[derive(Clone, Debug)]
pub struct ObjectShape {
    fields: Vec<Field>,
    refinements: Vec<Refinement>,
}

impl ObjectShape {
    fn push(mut self, name: &str, shape: Shape, presence: Presence, nullable: bool) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            shape,
            presence,
            nullable,
        });
        self
    }

    /// A required field
    #[must_use]
    pub fn field(self, name: &str, shape: impl Into<Shape>) -> Self {
        self.push(name, shape.into(), Presence::Required, false)
    }

    /// A field that may be absent (but not null)
    #[must_use]
    pub fn optional(self, name: &str, shape: impl Into<Shape>) -> Self {
        self.push(name, shape.into(), Presence::Optional, false)
    }

    /// A required field that may be null
    #[must_use]
    pub fn nullable(self, name: &str, shape: impl Into<Shape>) -> Self {
        self.push(name, shape.into(), Presence::Required, true)
    }

    /// A field that is filled with `default` when absent
    #[must_use]
    pub fn with_default(self, name: &str, shape: impl Into<Shape>, default: Value) -> Self {
        self.push(name, shape.into(), Presence::Default(default), false)
    }

    /// Drop a field from the shape
    #[must_use]
    pub fn omit(mut self, name: &str) -> Self {
        self.fields.retain(|field| field.name != name);
        self
    }

    /// Cross-field check, reported at `path`
    ///
    /// Refinements only run when every field of the object is valid.
    #[must_use]
    pub fn refine<F>(mut self, path: &[&str], message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement {
            path: FieldPath::from_keys(path.iter().copied()),
            message: message.into(),
            check: Arc::new(check),
        });
        self
    }

    fn check_object(
        &self,
        map: &mut Map<String, Value>,
        path: &mut FieldPath,
        out: &mut Vec<Violation>,
    ) {
        let before = out.len();

        for field in &self.fields {
            path.push_key(&field.name);
            match map.get_mut(&field.name) {
                None => match &field.presence {
                    Presence::Required => out.push(Violation::new(path.clone(), "Required")),
                    Presence::Optional => {},
                    Presence::Default(default) => {
                        map.insert(field.name.clone(), default.clone());
                    },
                },
                Some(Value::Null) if field.nullable => {},
                Some(value) => field.shape.check_at(value, path, out),
            }
            path.pop();
        }

        if out.len() == before {
            for refinement in &self.refinements {
                if !(refinement.check)(map) {
                    out.push(Violation::new(
                        path.joined(&refinement.path),
                        refinement.message.clone(),
                    ));
                }
            }
        }
    }
}

impl From<StringShape> for Shape {
    fn from(shape: StringShape) -> Self {
        Self::String(shape)
    }
}

impl From<NumberShape> for Shape {
    fn from(shape: NumberShape) -> Self {
        Self::Number(shape)
    }
}

impl From<BooleanShape> for Shape {
    fn from(shape: BooleanShape) -> Self {
        Self::Boolean(shape)
    }
}

impl From<ArrayShape> for Shape {
    fn from(shape: ArrayShape) -> Self {
        Self::Array(shape)
    }
}

impl From<ObjectShape> for Shape {
    fn from(shape: ObjectShape) -> Self {
        Self::Object(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(result: Result<(), Violations>) -> Vec<String> {
        result
            .err()
            .map(|v| v.into_iter().map(|v| v.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_type_mismatch_messages() {
        let shape: Shape = Shape::object()
            .field("id", Shape::number())
            .field("title", Shape::string())
            .field("tags", Shape::array(Shape::string()))
            .into();

        let mut doc = json!({"id": "1", "title": null, "tags": ["a", 2]});
        assert_eq!(
            messages(shape.check(&mut doc)),
            vec![
                "id: Expected number, received string",
                "title: Expected string, received null",
                "tags[1]: Expected string, received number",
            ]
        );
    }

    #[test]
    fn test_optional_nullable_and_default_fields() {
        let shape: Shape = Shape::object()
            .optional("brand", Shape::string())
            .nullable("age", Shape::number())
            .with_default("likes", Shape::number(), json!(0))
            .into();

        let mut doc = json!({"age": null});
        assert!(shape.check(&mut doc).is_ok());
        assert_eq!(doc["likes"], json!(0));
        assert!(doc.get("brand").is_none());

        // Optional does not admit null
        let mut doc = json!({"brand": null, "age": 3});
        assert_eq!(
            messages(shape.check(&mut doc)),
            vec!["brand: Expected string, received null"]
        );

        // Nullable is still required
        let mut doc = json!({});
        assert_eq!(messages(shape.check(&mut doc)), vec!["age: Required"]);
    }

    #[test]
    fn test_string_rules_report_every_failure() {
        let shape: Shape = Shape::string()
            .min_len(8, "too short")
            .refine("needs uppercase", |s| s.chars().any(char::is_uppercase))
            .refine("needs digit", |s| s.chars().any(|c| c.is_ascii_digit()))
            .into();

        let mut doc = json!("abc");
        assert_eq!(
            messages(shape.check(&mut doc)),
            vec!["(root): too short", "(root): needs uppercase", "(root): needs digit"]
        );

        let mut doc = json!("Abcdefg1");
        assert!(shape.check(&mut doc).is_ok());
    }

    #[test]
    fn test_email_url_and_datetime_formats() {
        let email: Shape = Shape::string().email("Invalid email").into();
        assert!(email.check(&mut json!("emily.johnson@x.dummyjson.com")).is_ok());
        assert!(email.check(&mut json!("emily@localhost")).is_err());
        assert!(email.check(&mut json!("not an email")).is_err());

        let url: Shape = Shape::string().url("Invalid url").into();
        assert!(url.check(&mut json!("https://cdn.dummyjson.com/p/1.webp")).is_ok());
        assert!(url.check(&mut json!("cdn.dummyjson.com")).is_err());

        let when: Shape = Shape::string().datetime("Invalid datetime").into();
        assert!(when.check(&mut json!("2024-05-23T08:56:21.618Z")).is_ok());
        assert!(when.check(&mut json!("23/05/2024")).is_err());
    }

    #[test]
    fn test_pattern_and_invalid_pattern() {
        let phone: Shape = Shape::string().pattern(r"^\+?[0-9 ]+$", "Invalid phone number").into();
        assert!(phone.check(&mut json!("+81 965-431-3024")).is_err());
        assert!(phone.check(&mut json!("+81 965 431 3024")).is_ok());

        let broken: Shape = Shape::string().pattern("(", "never").into();
        let found = messages(broken.check(&mut json!("anything")));
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("Invalid pattern"));
    }

    #[test]
    fn test_number_constraints() {
        let shape: Shape = Shape::number()
            .integer()
            .min(1.0, "at least one")
            .max(100.0, "at most one hundred")
            .into();

        assert!(shape.check(&mut json!(50)).is_ok());
        assert_eq!(
            messages(shape.check(&mut json!(0.5))),
            vec!["(root): Expected integer, received float", "(root): at least one"]
        );
        assert_eq!(
            messages(shape.check(&mut json!(101))),
            vec!["(root): at most one hundred"]
        );
    }

    #[test]
    fn test_refinement_runs_only_on_valid_objects() {
        let shape: Shape = Shape::object()
            .field("password", Shape::string().min_len(1, "Password is required"))
            .field("confirmPassword", Shape::string())
            .refine(&["confirmPassword"], "Passwords don't match", |obj| {
                obj.get("password") == obj.get("confirmPassword")
            })
            .into();

        let mut mismatch = json!({"password": "a", "confirmPassword": "b"});
        assert_eq!(
            messages(shape.check(&mut mismatch)),
            vec!["confirmPassword: Passwords don't match"]
        );

        let mut invalid = json!({"password": "", "confirmPassword": "b"});
        assert_eq!(
            messages(shape.check(&mut invalid)),
            vec!["password: Password is required"]
        );
    }

    #[test]
    fn test_nested_paths_and_omit() {
        let shape: Shape = Shape::object()
            .field(
                "meta",
                Shape::object().field("qrCode", Shape::string().url("Invalid url")),
            )
            .field("secret", Shape::string())
            .omit("secret")
            .into();

        let mut doc = json!({"meta": {"qrCode": "nope"}});
        assert_eq!(messages(shape.check(&mut doc)), vec!["meta.qrCode: Invalid url"]);
    }

    #[test]
    fn test_boolean_must_be_true() {
        let shape: Shape = Shape::boolean()
            .must_be_true("You must agree to the rules and policy")
            .into();
        assert!(shape.check(&mut json!(true)).is_ok());
        assert_eq!(
            messages(shape.check(&mut json!(false))),
            vec!["(root): You must agree to the rules and policy"]
        );
    }
}
