//! Schema contract used by both accessors.
//!
//! A [`Schema`] turns an untrusted JSON document into a typed value or a
//! list of [`Violation`]s. Accessors depend only on this trait; the
//! declarative [`Shape`](crate::shape::Shape) combinators and [`JsonSchema`]
//! are the stock implementation.

use crate::shape::Shape;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// One segment of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

/// Location of a value inside a JSON document
///
/// Renders as `products[3].meta.qrCode`; the document root renders as `(root)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The document root
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from object keys
    #[must_use]
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self(keys.into_iter().map(|k| PathSegment::Key(k.into())).collect())
    }

    /// Whether this is the document root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path segments from the root down
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Last object key in the path, if any
    #[must_use]
    pub fn leaf_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|segment| match segment {
            PathSegment::Key(key) => Some(key.as_str()),
            PathSegment::Index(_) => None,
        })
    }

    pub(crate) fn push_key(&mut self, key: &str) {
        self.0.push(PathSegment::Key(key.to_string()));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    pub(crate) fn joined(&self, other: &Self) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for (idx, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if idx == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Where in the document the constraint failed
    pub path: FieldPath,
    /// Human readable description
    pub message: String,
}

impl Violation {
    /// Create a violation
    #[must_use]
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every violation found in one document, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// Wrap a list of violations
    #[must_use]
    pub const fn new(violations: Vec<Violation>) -> Self {
        Self(violations)
    }

    /// A list holding one violation
    #[must_use]
    pub fn single(path: FieldPath, message: impl Into<String>) -> Self {
        Self(vec![Violation::new(path, message)])
    }

    /// The first violated constraint
    #[must_use]
    pub fn first(&self) -> Option<&Violation> {
        self.0.first()
    }

    /// All violations
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Number of violations
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First violation whose leaf key is `field`
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&Violation> {
        self.0.iter().find(|v| v.path.leaf_key() == Some(field))
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

impl std::error::Error for Violations {}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Validates an untrusted document into a typed value
///
/// Validation is pure: the same document and schema always give the same outcome.
pub trait Schema<T>: Send + Sync {
    /// Validate `raw`, returning the typed value or every violated constraint
    ///
    /// # Errors
    ///
    /// Returns [`Violations`] (never empty) when the document does not match.
    fn validate(&self, raw: &Value) -> Result<T, Violations>;
}

/// Schema built from a declarative [`Shape`] and a serde target type
///
/// Validation applies field defaults, checks every shape constraint, then
/// deserializes into `T`.
pub struct JsonSchema<T> {
    shape: Shape,
    _target: PhantomData<fn() -> T>,
}

impl<T> JsonSchema<T> {
    /// Create a schema for `T` from its shape
    #[must_use]
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: shape.into(),
            _target: PhantomData,
        }
    }

    /// The shape this schema checks
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl<T> Clone for JsonSchema<T> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape.clone(),
            _target: PhantomData,
        }
    }
}

impl<T> fmt::Debug for JsonSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("target", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned> Schema<T> for JsonSchema<T> {
    fn validate(&self, raw: &Value) -> Result<T, Violations> {
        let mut document = raw.clone();
        self.shape.check(&mut document)?;
        serde_json::from_value(document)
            .map_err(|e| Violations::single(FieldPath::root(), e.to_string()))
    }
}

/// Schema that accepts any JSON document as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyDocument;

impl Schema<Value> for AnyDocument {
    fn validate(&self, raw: &Value) -> Result<Value, Violations> {
        Ok(raw.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Tag {
        id: u32,
        label: String,
    }

    fn tag_schema() -> JsonSchema<Tag> {
        JsonSchema::new(
            Shape::object()
                .field("id", Shape::number().integer())
                .field("label", Shape::string().min_len(1, "Label is required")),
        )
    }

    #[test]
    fn test_field_path_rendering() {
        let mut path = FieldPath::root();
        assert_eq!(path.to_string(), "(root)");

        path.push_key("products");
        path.push_index(3);
        path.push_key("meta");
        path.push_key("qrCode");
        assert_eq!(path.to_string(), "products[3].meta.qrCode");
        assert_eq!(path.leaf_key(), Some("qrCode"));
    }

    #[test]
    fn test_json_schema_accepts_matching_document() {
        let tag = tag_schema()
            .validate(&json!({"id": 4, "label": "sale"}))
            .unwrap();
        assert_eq!(
            tag,
            Tag {
                id: 4,
                label: "sale".to_string()
            }
        );
    }

    #[test]
    fn test_json_schema_names_missing_field() {
        let violations = tag_schema().validate(&json!({"id": 4})).unwrap_err();
        let first = violations.first().unwrap();
        assert_eq!(first.path.to_string(), "label");
        assert_eq!(first.message, "Required");
    }

    #[test]
    fn test_json_schema_is_deterministic() {
        let doc = json!({"id": "four", "label": ""});
        let a = tag_schema().validate(&doc).unwrap_err();
        let b = tag_schema().validate(&doc).unwrap_err();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_violations_lookup_by_field() {
        let violations = Violations::new(vec![
            Violation::new(FieldPath::from_keys(["user", "email"]), "Invalid email"),
            Violation::new(FieldPath::from_keys(["password"]), "Password is too short"),
        ]);
        assert_eq!(
            violations.for_field("password").map(|v| v.message.as_str()),
            Some("Password is too short")
        );
        assert!(violations.for_field("phone").is_none());
    }
}
