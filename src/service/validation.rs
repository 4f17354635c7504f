//! Product schema validation for create and update bodies.

use crate::config::ValidationRules;
use crate::error::{AppError, ConfigError, FieldError};
use crate::model::Product;
use regex::Regex;
use serde_json::{Map, Number, Value};

#[derive(Clone, Copy, Debug)]
enum Kind {
    Text,
    Number,
    Integer,
    /// name → number, or a textual unit
    Measurements,
    Object,
    /// source → price
    PriceMap,
    TextList,
}

struct Field {
    name: &'static str,
    kind: Kind,
    required: bool,
}

const fn required(name: &'static str, kind: Kind) -> Field {
    Field { name, kind, required: true }
}

const fn optional(name: &'static str, kind: Kind) -> Field {
    Field { name, kind, required: false }
}

const PRODUCT_FIELDS: &[Field] = &[
    required("title", Kind::Text),
    required("description", Kind::Text),
    required("ean_code", Kind::Text),
    optional("asin", Kind::Text),
    required("price", Kind::Number),
    required("dimensions", Kind::Measurements),
    required("weight", Kind::Measurements),
    optional("images", Kind::TextList),
    required("status", Kind::Text),
    optional("browse_nodes", Kind::TextList),
    optional("sales_rank", Kind::Integer),
    optional("buy_box", Kind::Object),
    optional("amazon_price", Kind::Number),
    optional("lowest_prices", Kind::PriceMap),
    optional("list_price", Kind::Number),
    optional("product_group", Kind::Text),
    optional("product_type", Kind::Text),
];

const PRICE_FIELDS: &[&str] = &["price", "amazon_price", "list_price"];

/// Turns an untyped request body into a [`Product`], or reports every field
/// that is wrong. Pure: no I/O, nothing partially built on failure.
#[derive(Debug, Default)]
pub struct ProductValidator {
    ean_pattern: Option<Regex>,
    allowed_statuses: Option<Vec<String>>,
    non_negative_prices: bool,
}

impl ProductValidator {
    pub fn new(rules: &ValidationRules) -> Result<Self, ConfigError> {
        let ean_pattern = rules
            .ean_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| ConfigError::Invalid {
                key: "EAN_PATTERN",
                reason: e.to_string(),
            })?;
        Ok(Self {
            ean_pattern,
            allowed_statuses: rules.allowed_statuses.clone(),
            non_negative_prices: rules.non_negative_prices,
        })
    }

    /// Validate a full product document. Unknown keys are dropped; numeric
    /// strings are accepted for numeric fields and normalized to numbers.
    pub fn validate(&self, body: &Value) -> Result<Product, AppError> {
        let Value::Object(obj) = body else {
            return Err(AppError::Validation(vec![FieldError::new(
                "body",
                "must be a JSON object",
            )]));
        };

        let mut errors = Vec::new();
        let mut normalized = Map::new();
        for field in PRODUCT_FIELDS {
            match obj.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    errors.push(FieldError::new(field.name, "is required"));
                }
                None | Some(Value::Null) => {
                    normalized.insert(field.name.to_string(), Value::Null);
                }
                Some(value) => match check(field.kind, value) {
                    Ok(v) => {
                        if let Some(msg) = self.check_rules(field.name, &v) {
                            errors.push(FieldError::new(field.name, msg));
                        }
                        normalized.insert(field.name.to_string(), v);
                    }
                    Err(msg) => errors.push(FieldError::new(field.name, msg)),
                },
            }
        }

        let ignored: Vec<&str> = obj
            .keys()
            .map(String::as_str)
            .filter(|k| !PRODUCT_FIELDS.iter().any(|f| f.name == *k))
            .collect();
        if !ignored.is_empty() {
            tracing::debug!(?ignored, "ignoring unknown product fields");
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| AppError::Validation(vec![FieldError::new("body", e.to_string())]))
    }

    fn check_rules(&self, name: &str, value: &Value) -> Option<String> {
        match name {
            "ean_code" => {
                let re = self.ean_pattern.as_ref()?;
                let s = value.as_str()?;
                (!re.is_match(s)).then(|| format!("does not match pattern {}", re.as_str()))
            }
            "status" => {
                let allowed = self.allowed_statuses.as_ref()?;
                let s = value.as_str()?;
                (!allowed.iter().any(|a| a == s))
                    .then(|| format!("must be one of: {}", allowed.join(", ")))
            }
            _ if self.non_negative_prices && PRICE_FIELDS.contains(&name) => {
                let n = value.as_f64()?;
                (n < 0.0).then(|| "must not be negative".to_string())
            }
            _ => None,
        }
    }
}

fn check(kind: Kind, value: &Value) -> Result<Value, String> {
    match kind {
        Kind::Text => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err("must be a string".into()),
        },
        Kind::Number => number(value).ok_or_else(|| "must be a number".into()),
        Kind::Integer => integer(value).ok_or_else(|| "must be an integer".into()),
        Kind::Object => match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err("must be an object".into()),
        },
        Kind::Measurements => {
            let Value::Object(entries) = value else {
                return Err("must be an object of measurements".into());
            };
            let mut out = Map::new();
            for (key, v) in entries {
                let normalized = match v {
                    Value::String(_) => v.clone(),
                    _ => number(v)
                        .ok_or_else(|| format!("entry '{key}' must be a number or unit text"))?,
                };
                out.insert(key.clone(), normalized);
            }
            Ok(Value::Object(out))
        }
        Kind::PriceMap => {
            let Value::Object(entries) = value else {
                return Err("must be an object of prices".into());
            };
            let mut out = Map::new();
            for (key, v) in entries {
                let n = number(v).ok_or_else(|| format!("entry '{key}' must be a number"))?;
                out.insert(key.clone(), n);
            }
            Ok(Value::Object(out))
        }
        Kind::TextList => {
            let Value::Array(items) = value else {
                return Err("must be a list of strings".into());
            };
            if let Some(i) = items.iter().position(|item| !item.is_string()) {
                return Err(format!("item {i} must be a string"));
            }
            Ok(value.clone())
        }
    }
}

fn number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Value::from(i));
            }
            let f: f64 = s.parse().ok()?;
            Number::from_f64(f).map(Value::Number)
        }
        _ => None,
    }
}

fn integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => n.as_i64().map(Value::from),
        Value::Number(n) => {
            let f = n.as_f64()?;
            // whole floats such as 3.0 within the exactly representable range
            (f.fract() == 0.0 && f.abs() < 9.0e15).then(|| Value::from(f as i64))
        }
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}
