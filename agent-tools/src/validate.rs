//! Argument validation and coercion against capability descriptors.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ToolError, ToolResult};
use crate::schema::{CapabilityDescriptor, ParamType};

/// Validated, coerced arguments ready to be handed to a capability.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    /// Creates an empty argument bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Removes and decodes the value bound to `name`.
    ///
    /// Missing values decode from `null`, which suits `Option<T>` parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::TypeMismatch`] when the value cannot be decoded
    /// into `T`, for instance a negative number for an unsigned parameter.
    pub fn take<T: DeserializeOwned>(&mut self, name: &str) -> ToolResult<T> {
        let value = self.values.remove(name).unwrap_or(Value::Null);
        let received = json_kind(&value);
        serde_json::from_value(value).map_err(|err| {
            ToolError::type_mismatch(
                name,
                std::any::type_name::<T>(),
                format!("{received} ({err})"),
            )
        })
    }

    /// Number of bound arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no arguments are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over bound arguments.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Consumes the bundle, returning the underlying map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// Validates raw arguments against a descriptor.
///
/// Supplied values are coerced to their declared types, omitted optional
/// parameters receive their defaults. The function never touches the
/// capability itself.
///
/// # Errors
///
/// Returns [`ToolError::UnexpectedArgument`] for keys the descriptor does not
/// declare, [`ToolError::MissingArgument`] for omitted required parameters and
/// [`ToolError::TypeMismatch`] when a value cannot be coerced.
pub fn validate(descriptor: &CapabilityDescriptor, raw: &Map<String, Value>) -> ToolResult<Arguments> {
    if let Some(unexpected) = raw
        .keys()
        .filter(|key| descriptor.parameter(key).is_none())
        .min()
    {
        return Err(ToolError::UnexpectedArgument {
            parameter: unexpected.clone(),
        });
    }

    let mut values = Map::new();
    for param in descriptor.parameters() {
        let value = match raw.get(param.name()) {
            Some(value) => coerce(param.ty(), value, param.name())?,
            None => match param.default() {
                Some(default) => default.clone(),
                None if param.required() => {
                    return Err(ToolError::MissingArgument {
                        parameter: param.name().to_owned(),
                    });
                }
                None => Value::Null,
            },
        };
        values.insert(param.name().to_owned(), value);
    }

    Ok(Arguments { values })
}

/// Coerces a single value to `ty`. `path` names the value in error messages.
pub(crate) fn coerce(ty: &ParamType, value: &Value, path: &str) -> ToolResult<Value> {
    let mismatch = || ToolError::type_mismatch(path, ty.to_string(), json_kind(value));

    match ty {
        ParamType::Opaque => Ok(value.clone()),
        ParamType::Optional(inner) => {
            if value.is_null() {
                Ok(Value::Null)
            } else {
                coerce(inner, value, path)
            }
        }
        ParamType::String => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        ParamType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        ParamType::Integer => match value {
            Value::Number(number) if number.is_i64() || number.is_u64() => Ok(value.clone()),
            Value::Number(number) => number
                .as_f64()
                .and_then(integral)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        ParamType::Float => match value {
            Value::Number(number) if number.is_f64() => Ok(value.clone()),
            Value::Number(number) => number.as_f64().map(Value::from).ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        ParamType::Enum(variants) => match value {
            Value::String(raw) => variants
                .iter()
                .find(|variant| variant.eq_ignore_ascii_case(raw))
                .map(|variant| Value::String(variant.clone()))
                .ok_or_else(|| {
                    ToolError::type_mismatch(
                        path,
                        format!("one of {}", variants.join(", ")),
                        format!("string `{raw}`"),
                    )
                }),
            _ => Err(mismatch()),
        },
        ParamType::Sequence(inner) => match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| coerce(inner, item, &format!("{path}[{idx}]")))
                .collect::<ToolResult<Vec<_>>>()
                .map(Value::Array),
            _ => Err(mismatch()),
        },
        ParamType::Mapping(inner) => match value {
            Value::Object(entries) => entries
                .iter()
                .map(|(key, item)| {
                    coerce(inner, item, &format!("{path}.{key}")).map(|item| (key.clone(), item))
                })
                .collect::<ToolResult<Map<_, _>>>()
                .map(Value::Object),
            _ => Err(mismatch()),
        },
    }
}

/// Converts a float with no fractional part into an integer value.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn integral(float: f64) -> Option<Value> {
    if !float.is_finite() || float.fract() != 0.0 {
        return None;
    }
    if float >= 0.0 && float < u64::MAX as f64 {
        Some(Value::from(float as u64))
    } else if float < 0.0 && float >= i64::MIN as f64 {
        Some(Value::from(float as i64))
    } else {
        None
    }
}

/// Names the JSON kind of a value for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
