//! Capability descriptors and the parameter type model.

use std::fmt::{self, Display, Formatter};

use agent_primitives::{CapabilityName, ToolsetId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Closed set of parameter types a capability may declare.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// UTF-8 string.
    String,
    /// Whole number.
    Integer,
    /// Floating point number.
    Float,
    /// `true` or `false`.
    Boolean,
    /// String restricted to the listed variants.
    Enum(Vec<String>),
    /// Homogeneous list.
    Sequence(Box<ParamType>),
    /// String-keyed map with homogeneous values.
    Mapping(Box<ParamType>),
    /// Value that may be `null`.
    Optional(Box<ParamType>),
    /// Any JSON value.
    Opaque,
}

impl ParamType {
    /// Wraps the type in [`ParamType::Sequence`].
    #[must_use]
    pub fn sequence_of(inner: ParamType) -> Self {
        Self::Sequence(Box::new(inner))
    }

    /// Wraps the type in [`ParamType::Mapping`].
    #[must_use]
    pub fn mapping_of(inner: ParamType) -> Self {
        Self::Mapping(Box::new(inner))
    }

    /// Wraps the type in [`ParamType::Optional`].
    #[must_use]
    pub fn optional_of(inner: ParamType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Builds an enum type from the supplied variants.
    #[must_use]
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(variants.into_iter().map(Into::into).collect())
    }

    /// Returns `true` when `null` is an acceptable value.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Renders the type as a JSON Schema fragment.
    #[must_use]
    pub fn json_schema(&self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Float => json!({ "type": "number" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Enum(variants) => json!({ "type": "string", "enum": variants }),
            Self::Sequence(inner) => json!({ "type": "array", "items": inner.json_schema() }),
            Self::Mapping(inner) => match inner.as_ref() {
                Self::Opaque => json!({ "type": "object" }),
                other => json!({ "type": "object", "additionalProperties": other.json_schema() }),
            },
            Self::Optional(inner) => json!({ "anyOf": [inner.json_schema(), { "type": "null" }] }),
            Self::Opaque => json!({}),
        }
    }
}

impl Display for ParamType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("number"),
            Self::Boolean => f.write_str("boolean"),
            Self::Enum(variants) => write!(f, "enum({})", variants.join("|")),
            Self::Sequence(inner) => write!(f, "array<{inner}>"),
            Self::Mapping(inner) => write!(f, "object<{inner}>"),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::Opaque => f.write_str("any"),
        }
    }
}

/// Describes one parameter of a capability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    name: String,
    #[serde(rename = "type")]
    ty: ParamType,
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl ParameterSpec {
    /// Creates a parameter specification.
    ///
    /// A parameter is required exactly when it carries no default. Optional
    /// types receive an explicit `null` default during inference.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        ty: ParamType,
        default: Option<Value>,
        description: Option<String>,
    ) -> Self {
        let required = default.is_none();
        Self {
            name: name.into(),
            ty,
            required,
            default,
            description,
        }
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    /// Returns `true` if callers must supply this parameter.
    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    /// Returns the declared default, if any.
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the documented description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Opaque description of what a capability returns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl ReturnHint {
    /// Creates a return hint.
    #[must_use]
    pub fn new(type_name: Option<String>, description: Option<String>) -> Self {
        Self {
            type_name,
            description,
        }
    }

    /// Declared return type as written in the signature.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Documented description of the return value.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Immutable metadata describing one registered capability.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CapabilityDescriptor {
    name: CapabilityName,
    parameters: Vec<ParameterSpec>,
    return_hint: ReturnHint,
    documentation: String,
    owner: ToolsetId,
    toolset: String,
    is_async: bool,
}

impl CapabilityDescriptor {
    pub(crate) fn new(
        name: CapabilityName,
        parameters: Vec<ParameterSpec>,
        return_hint: ReturnHint,
        documentation: String,
        owner: ToolsetId,
        toolset: String,
        is_async: bool,
    ) -> Self {
        Self {
            name,
            parameters,
            return_hint,
            documentation,
            owner,
            toolset,
            is_async,
        }
    }

    /// Returns the capability name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the ordered parameter list.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|param| param.name == name)
    }

    /// Returns the return-shape hint.
    #[must_use]
    pub fn return_hint(&self) -> &ReturnHint {
        &self.return_hint
    }

    /// Returns the summary documentation. Empty when the method is undocumented.
    #[must_use]
    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// Identifier of the toolset registration that owns this capability.
    #[must_use]
    pub const fn owner(&self) -> ToolsetId {
        self.owner
    }

    /// Display name of the owning toolset.
    #[must_use]
    pub fn toolset(&self) -> &str {
        &self.toolset
    }

    /// Returns `true` if the capability suspends while executing.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        self.is_async
    }

    /// Builds the discovery view presented to external decision makers.
    #[must_use]
    pub fn schema(&self) -> CapabilitySchema {
        CapabilitySchema {
            name: self.name().to_owned(),
            description: self.documentation.clone(),
            parameters: self
                .parameters
                .iter()
                .map(|param| ParameterSchema {
                    name: param.name.clone(),
                    ty: param.ty.to_string(),
                    required: param.required,
                    description: param.description.clone(),
                    default: param.default.clone(),
                })
                .collect(),
            return_hint: self.return_hint.clone(),
            is_async: self.is_async,
        }
    }

    /// Renders the capability as a function-calling definition whose
    /// `parameters` member is a JSON Schema object.
    #[must_use]
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut property = param.ty.json_schema();
            if let Value::Object(fields) = &mut property {
                if let Some(description) = &param.description {
                    fields.insert("description".into(), Value::from(description.clone()));
                }
                if let Some(default) = &param.default {
                    fields.insert("default".into(), default.clone());
                }
            }
            properties.insert(param.name.clone(), property);
            if param.required {
                required.push(Value::from(param.name.clone()));
            }
        }

        json!({
            "name": self.name(),
            "description": self.documentation,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": false,
            }
        })
    }
}

/// Serializable discovery view of a capability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySchema {
    /// Capability name.
    pub name: String,
    /// Summary documentation.
    pub description: String,
    /// Ordered parameters.
    pub parameters: Vec<ParameterSchema>,
    /// Return-shape hint.
    pub return_hint: ReturnHint,
    /// Whether the capability is asynchronous.
    pub is_async: bool,
}

/// Serializable discovery view of a parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name.
    pub name: String,
    /// Rendered type, e.g. `array<integer>`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Whether the caller must supply the parameter.
    pub required: bool,
    /// Documented description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default substituted when the parameter is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new(
            CapabilityName::new("repeat").unwrap(),
            vec![
                ParameterSpec::new(
                    "text",
                    ParamType::String,
                    None,
                    Some("Text to repeat.".into()),
                ),
                ParameterSpec::new("times", ParamType::Integer, Some(json!(1)), None),
                ParameterSpec::new(
                    "separator",
                    ParamType::optional_of(ParamType::String),
                    Some(Value::Null),
                    None,
                ),
            ],
            ReturnHint::new(Some("String".into()), None),
            "Repeats text.".into(),
            ToolsetId::random(),
            "Echo".into(),
            false,
        )
    }

    #[test]
    fn required_follows_default_and_nullability() {
        let descriptor = descriptor();
        let required: Vec<_> = descriptor
            .parameters()
            .iter()
            .map(ParameterSpec::required)
            .collect();
        assert_eq!(required, vec![true, false, false]);
    }

    #[test]
    fn display_renders_nested_types() {
        let ty = ParamType::mapping_of(ParamType::sequence_of(ParamType::optional_of(
            ParamType::Integer,
        )));
        assert_eq!(ty.to_string(), "object<array<optional<integer>>>");
        assert_eq!(
            ParamType::enumeration(["celsius", "fahrenheit"]).to_string(),
            "enum(celsius|fahrenheit)"
        );
    }

    #[test]
    fn schema_view_lists_parameters_in_order() {
        let schema = descriptor().schema();
        assert_eq!(schema.name, "repeat");
        assert_eq!(schema.description, "Repeats text.");
        let names: Vec<_> = schema.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["text", "times", "separator"]);
        assert_eq!(schema.parameters[1].ty, "integer");
        assert_eq!(schema.parameters[1].default, Some(json!(1)));

        let encoded = serde_json::to_value(&schema).unwrap();
        assert_eq!(encoded["parameters"][0]["type"], "string");
        assert_eq!(encoded["return_hint"]["type_name"], "String");
    }

    #[test]
    fn json_schema_marks_required_parameters() {
        let schema = descriptor().json_schema();
        assert_eq!(schema["parameters"]["required"], json!(["text"]));
        assert_eq!(
            schema["parameters"]["properties"]["text"],
            json!({ "type": "string", "description": "Text to repeat." })
        );
        assert_eq!(
            schema["parameters"]["properties"]["times"],
            json!({ "type": "integer", "default": 1 })
        );
        assert_eq!(schema["parameters"]["additionalProperties"], json!(false));
    }
}
