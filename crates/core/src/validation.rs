//! Declarative validation chains for JSON request bodies.
//!
//! A [`RuleSet`] is an ordered list of [`FieldRule`]s, one per body field.
//! Each rule holds a chain of checks, each paired with the message reported
//! when it fails. Every check of every rule runs, so a client gets the full
//! list of problems in one round trip:
//!
//! ```
//! use recipe_finder_core::{FieldRule, RuleSet};
//! use serde_json::json;
//!
//! let rules = RuleSet::new(vec![
//!     FieldRule::body("title")
//!         .is_string("Title must be a string")
//!         .not_empty("Title is required"),
//!     FieldRule::body("servings").is_int(1, "Servings must be a positive integer"),
//! ]);
//!
//! let errors = rules.check(&json!({ "servings": 0 })).unwrap_err();
//! assert_eq!(errors.len(), 3);
//! ```
//!
//! A rule may also carry sanitizers ([`FieldRule::trim`], [`FieldRule::to_int`])
//! that rewrite the field before its checks run. The rewritten value is what
//! the checks see and what gets deserialized.
//!
//! Types that can be built from a request body implement [`Validate`], which
//! runs the rules before handing the body to serde.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{Email, NewRecipe, RecipeUpdate};

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Why a request body was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more field rules failed.
    #[error("validation failed: {}", join_messages(.0))]
    Fields(Vec<FieldError>),
    /// The body passed the rules but is not the expected shape.
    #[error("malformed request body: {0}")]
    Malformed(String),
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy)]
enum Check {
    String,
    NotEmpty,
    MinLength(usize),
    Int { min: i64 },
    Array { min: usize },
    StringItems,
    Url,
    Email,
    NonNegativeFields(&'static [&'static str]),
}

impl Check {
    fn passes(self, value: Option<&Value>) -> bool {
        match self {
            Self::String => matches!(value, Some(Value::String(_))),
            Self::NotEmpty => match value {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(Value::Array(items)) => !items.is_empty(),
                Some(_) => true,
            },
            Self::MinLength(min) => {
                matches!(value, Some(Value::String(s)) if s.chars().count() >= min)
            }
            Self::Int { min } => value
                .and_then(Value::as_i64)
                .is_some_and(|n| n >= min && n <= i64::from(i32::MAX)),
            Self::Array { min } => matches!(value, Some(Value::Array(items)) if items.len() >= min),
            Self::StringItems => match value {
                Some(Value::Array(items)) => items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|s| !s.trim().is_empty())),
                _ => false,
            },
            Self::Url => value.and_then(Value::as_str).is_some_and(is_absolute_url),
            Self::Email => value
                .and_then(Value::as_str)
                .is_some_and(|s| Email::parse(s).is_ok()),
            Self::NonNegativeFields(keys) => match value {
                Some(Value::Object(map)) => keys.iter().all(|key| match map.get(*key) {
                    None | Some(Value::Null) => true,
                    Some(v) => v.as_f64().is_some_and(|n| n >= 0.0),
                }),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Sanitizer {
    Trim,
    ToInt,
}

impl Sanitizer {
    /// The rewritten value, or `None` when this sanitizer leaves it alone.
    fn apply(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Trim, Value::String(s)) => Some(Value::String(s.trim().to_owned())),
            (Self::ToInt, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            _ => None,
        }
    }
}

/// Absolute `http`/`https` URL with a host.
fn is_absolute_url(s: &str) -> bool {
    url::Url::parse(s).is_ok_and(|u| {
        matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty())
    })
}

/// The check chain for one body field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    field: &'static str,
    optional: bool,
    sanitizers: Vec<Sanitizer>,
    checks: Vec<(Check, &'static str)>,
}

impl FieldRule {
    /// Start a chain for the body field `field`.
    #[must_use]
    pub const fn body(field: &'static str) -> Self {
        Self {
            field,
            optional: false,
            sanitizers: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Skip the whole chain when the field is absent or `null`.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Strip surrounding whitespace from a string value.
    #[must_use]
    pub fn trim(mut self) -> Self {
        self.sanitizers.push(Sanitizer::Trim);
        self
    }

    /// Turn an integer string such as `"25"` into the number `25`.
    #[must_use]
    pub fn to_int(mut self) -> Self {
        self.sanitizers.push(Sanitizer::ToInt);
        self
    }

    #[must_use]
    pub fn is_string(self, message: &'static str) -> Self {
        self.check(Check::String, message)
    }

    /// Present, not `null`, and not a blank string or empty array.
    #[must_use]
    pub fn not_empty(self, message: &'static str) -> Self {
        self.check(Check::NotEmpty, message)
    }

    /// A string of at least `min` characters.
    #[must_use]
    pub fn min_length(self, min: usize, message: &'static str) -> Self {
        self.check(Check::MinLength(min), message)
    }

    /// A JSON integer in `min..=i32::MAX`.
    #[must_use]
    pub fn is_int(self, min: i64, message: &'static str) -> Self {
        self.check(Check::Int { min }, message)
    }

    /// An array with at least `min` elements.
    #[must_use]
    pub fn is_array(self, min: usize, message: &'static str) -> Self {
        self.check(Check::Array { min }, message)
    }

    /// An array whose elements are all non-blank strings.
    #[must_use]
    pub fn string_items(self, message: &'static str) -> Self {
        self.check(Check::StringItems, message)
    }

    /// An absolute http(s) URL.
    #[must_use]
    pub fn is_url(self, message: &'static str) -> Self {
        self.check(Check::Url, message)
    }

    #[must_use]
    pub fn is_email(self, message: &'static str) -> Self {
        self.check(Check::Email, message)
    }

    /// An object whose listed keys, when present, hold non-negative numbers.
    #[must_use]
    pub fn non_negative_fields(self, keys: &'static [&'static str], message: &'static str) -> Self {
        self.check(Check::NonNegativeFields(keys), message)
    }

    fn check(mut self, check: Check, message: &'static str) -> Self {
        self.checks.push((check, message));
        self
    }

    fn sanitize(&self, value: &Value) -> Value {
        self.sanitizers
            .iter()
            .fold(value.clone(), |v, s| s.apply(&v).unwrap_or(v))
    }

    fn evaluate(&self, body: &Map<String, Value>, errors: &mut Vec<FieldError>) {
        let value = body.get(self.field);
        if self.optional && matches!(value, None | Some(Value::Null)) {
            return;
        }

        for (check, message) in &self.checks {
            if !check.passes(value) {
                errors.push(FieldError {
                    field: self.field.to_owned(),
                    message: (*message).to_owned(),
                });
            }
        }
    }
}

/// An ordered collection of field rules for one route.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
}

impl RuleSet {
    #[must_use]
    pub const fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Run every rule against `body`, after its sanitizers.
    ///
    /// # Errors
    ///
    /// Returns every failed check, in rule order. A body that is not a JSON
    /// object is treated as having no fields.
    pub fn check(&self, body: &Value) -> Result<(), Vec<FieldError>> {
        let mut fields = body.as_object().cloned().unwrap_or_default();
        self.sanitize(&mut fields);
        self.check_fields(&fields)
    }

    /// Sanitize, run the rules and then deserialize the body.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Malformed` for a non-object body or one serde
    /// cannot map onto `T`, and `ValidationError::Fields` when any rule failed.
    pub fn parse<T: DeserializeOwned>(&self, body: Value) -> Result<T, ValidationError> {
        let Value::Object(mut fields) = body else {
            return Err(ValidationError::Malformed(
                "request body must be a JSON object".to_owned(),
            ));
        };
        self.sanitize(&mut fields);
        self.check_fields(&fields).map_err(ValidationError::Fields)?;
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    fn sanitize(&self, fields: &mut Map<String, Value>) {
        for rule in self.rules.iter().filter(|r| !r.sanitizers.is_empty()) {
            if let Some(value) = fields.get_mut(rule.field) {
                *value = rule.sanitize(value);
            }
        }
    }

    fn check_fields(&self, fields: &Map<String, Value>) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        for rule in &self.rules {
            rule.evaluate(fields, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A request payload guarded by a rule set.
pub trait Validate: DeserializeOwned {
    /// The rules a body must pass before deserialization.
    fn rules() -> RuleSet;

    /// Validate and deserialize a request body.
    ///
    /// # Errors
    ///
    /// See [`RuleSet::parse`].
    fn from_body(body: Value) -> Result<Self, ValidationError> {
        Self::rules().parse(body)
    }
}

const NUTRITION_FIELDS: &[&str] = &["calories", "protein", "carbs", "fat"];

impl Validate for NewRecipe {
    fn rules() -> RuleSet {
        RuleSet::new(vec![
            FieldRule::body("title")
                .is_string("Title must be a string")
                .not_empty("Title is required"),
            FieldRule::body("cuisine")
                .is_string("Cuisine must be a string")
                .not_empty("Cuisine is required"),
            FieldRule::body("ingredients")
                .is_array(1, "Ingredients must be a non-empty array")
                .string_items("Each ingredient must be a non-empty string"),
            FieldRule::body("cookTime")
                .to_int()
                .is_int(1, "Cook time must be a positive number")
                .not_empty("Cook time is required"),
            FieldRule::body("servings")
                .to_int()
                .is_int(1, "Servings must be a positive integer")
                .not_empty("Servings is required"),
            FieldRule::body("instructions")
                .optional()
                .is_string("Instructions must be a string"),
            FieldRule::body("imageUrl")
                .optional()
                .is_url("Image URL must be a valid URL"),
            FieldRule::body("nutrition").optional().non_negative_fields(
                NUTRITION_FIELDS,
                "Nutrition values must be non-negative numbers",
            ),
        ])
    }
}

impl Validate for RecipeUpdate {
    fn rules() -> RuleSet {
        RuleSet::new(vec![
            FieldRule::body("title")
                .optional()
                .is_string("Title must be a string")
                .not_empty("Title cannot be empty"),
            FieldRule::body("cuisine")
                .optional()
                .is_string("Cuisine must be a string")
                .not_empty("Cuisine cannot be empty"),
            FieldRule::body("ingredients")
                .optional()
                .is_array(1, "Ingredients must be a non-empty array")
                .string_items("Each ingredient must be a non-empty string"),
            FieldRule::body("cookTime")
                .optional()
                .to_int()
                .is_int(1, "Cook time must be a positive number"),
            FieldRule::body("servings")
                .optional()
                .to_int()
                .is_int(1, "Servings must be a positive integer"),
            FieldRule::body("instructions")
                .optional()
                .is_string("Instructions must be a string"),
            FieldRule::body("imageUrl")
                .optional()
                .is_url("Image URL must be a valid URL"),
            FieldRule::body("nutrition").optional().non_negative_fields(
                NUTRITION_FIELDS,
                "Nutrition values must be non-negative numbers",
            ),
        ])
    }
}
