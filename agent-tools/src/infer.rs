//! Schema inference from method signatures and documentation.
//!
//! The `#[toolset]` macro records each exposed method as a [`MethodSignature`]:
//! declared parameter types as written in source, defaults, the return type and
//! the doc comment. Inference turns that raw record into a
//! [`CapabilityDescriptor`] at registration time.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};

use agent_primitives::{CapabilityName, ToolsetId};
use serde_json::Value;

use crate::doc;
use crate::error::{ToolError, ToolResult};
use crate::schema::{CapabilityDescriptor, ParamType, ParameterSpec, ReturnHint};
use crate::validate::coerce;

/// Parameter exactly as declared on a toolset method.
#[derive(Clone, Debug, PartialEq)]
pub struct RawParam {
    name: String,
    type_text: String,
    default: Option<Value>,
}

impl RawParam {
    /// Creates a parameter with the declared type text, e.g. `Option<Vec<u32>>`.
    #[must_use]
    pub fn new(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
            default: None,
        }
    }

    /// Creates a parameter without a type annotation.
    #[must_use]
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// Attaches a default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type text.
    #[must_use]
    pub fn type_text(&self) -> &str {
        &self.type_text
    }
}

/// Raw description of one exposable toolset method.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodSignature {
    name: String,
    doc: String,
    params: Vec<RawParam>,
    return_type: Option<String>,
    is_async: bool,
}

impl MethodSignature {
    /// Starts a signature for the named method.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            params: Vec::new(),
            return_type: None,
            is_async: false,
        }
    }

    /// Sets the documentation text.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: RawParam) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the declared return type text.
    #[must_use]
    pub fn returns(mut self, type_text: impl Into<String>) -> Self {
        self.return_type = Some(type_text.into());
        self
    }

    /// Marks the method as asynchronous.
    #[must_use]
    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared parameters.
    #[must_use]
    pub fn params(&self) -> &[RawParam] {
        &self.params
    }

    /// Returns `true` if the method is asynchronous.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        self.is_async
    }
}

/// Non-fatal findings reported while inferring a schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferenceWarning {
    /// The method has no summary documentation.
    MissingDocumentation {
        /// Affected capability.
        capability: String,
    },
    /// A signature parameter has no documentation entry.
    UndocumentedParameter {
        /// Affected capability.
        capability: String,
        /// Parameter lacking documentation.
        parameter: String,
    },
    /// The documentation describes a parameter the signature does not have.
    UnknownDocumentedParameter {
        /// Affected capability.
        capability: String,
        /// Documented name with no matching parameter.
        parameter: String,
    },
    /// A parameter carries no type annotation and accepts any value.
    UntypedParameter {
        /// Affected capability.
        capability: String,
        /// Untyped parameter.
        parameter: String,
    },
}

impl Display for InferenceWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDocumentation { capability } => {
                write!(f, "`{capability}` has no documentation")
            }
            Self::UndocumentedParameter {
                capability,
                parameter,
            } => write!(f, "`{capability}` does not document parameter `{parameter}`"),
            Self::UnknownDocumentedParameter {
                capability,
                parameter,
            } => write!(
                f,
                "`{capability}` documents `{parameter}` which is not in its signature"
            ),
            Self::UntypedParameter {
                capability,
                parameter,
            } => write!(f, "`{capability}` parameter `{parameter}` is untyped"),
        }
    }
}

/// Descriptor produced by inference together with its warnings.
#[derive(Clone, Debug)]
pub struct Inferred {
    /// Finished capability descriptor.
    pub descriptor: CapabilityDescriptor,
    /// Warnings gathered while building it.
    pub warnings: Vec<InferenceWarning>,
}

/// Resolves declared type text into [`ParamType`]s.
///
/// Built-in Rust types, `serde_json` values and schema keywords resolve out of
/// the box. Domain types need an alias.
#[derive(Clone, Debug, Default)]
pub struct TypeResolver {
    aliases: HashMap<String, ParamType>,
}

impl TypeResolver {
    /// Creates a resolver with no aliases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a type name (last path segment, e.g. `Location`) to a schema type.
    #[must_use]
    pub fn alias(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.aliases.insert(name.into(), ty);
        self
    }

    /// Resolves declared type text.
    ///
    /// Returns `Ok(None)` when the text is empty or `_`, meaning the parameter
    /// is untyped.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the type cannot be resolved.
    pub fn resolve(&self, type_text: &str) -> Result<Option<ParamType>, String> {
        let trimmed = type_text.trim();
        if trimmed.is_empty() || trimmed == "_" {
            return Ok(None);
        }

        let tokens = tokenize(trimmed)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
        };
        let expr = parser.parse_type()?;
        if parser.pos != tokens.len() {
            return Err(format!("unexpected trailing tokens in `{trimmed}`"));
        }
        self.lower(&expr).map(Some)
    }

    fn lower(&self, expr: &TypeExpr) -> Result<ParamType, String> {
        match expr {
            TypeExpr::Enum(variants) => Ok(ParamType::Enum(variants.clone())),
            TypeExpr::Slice(inner) => Ok(ParamType::sequence_of(self.lower(inner)?)),
            TypeExpr::Path { name, args } => {
                if let Some(alias) = self.aliases.get(name) {
                    return Ok(alias.clone());
                }
                self.lower_path(name, args)
            }
        }
    }

    fn lower_path(&self, name: &str, args: &[TypeExpr]) -> Result<ParamType, String> {
        let arity = |expected: usize| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(format!(
                    "`{name}` expects {expected} type argument(s), found {}",
                    args.len()
                ))
            }
        };

        let ty = match name {
            "String" | "str" | "char" | "string" | "PathBuf" | "Path" | "OsString" => {
                arity(0)?;
                ParamType::String
            }
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" | "integer" => {
                arity(0)?;
                ParamType::Integer
            }
            _ if name.starts_with("NonZero") => {
                arity(0)?;
                ParamType::Integer
            }
            "f32" | "f64" | "float" | "number" => {
                arity(0)?;
                ParamType::Float
            }
            "bool" | "boolean" => {
                arity(0)?;
                ParamType::Boolean
            }
            "Value" | "any" | "opaque" => {
                arity(0)?;
                ParamType::Opaque
            }
            "Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "IndexSet" | "LinkedList" | "array" => {
                arity(1)?;
                ParamType::sequence_of(self.lower(&args[0])?)
            }
            "Option" | "optional" => {
                arity(1)?;
                ParamType::optional_of(self.lower(&args[0])?)
            }
            "Box" | "Arc" | "Rc" | "Cow" => {
                arity(1)?;
                self.lower(&args[0])?
            }
            "HashMap" | "BTreeMap" | "IndexMap" | "Map" => {
                arity(2)?;
                if self.lower(&args[0])? != ParamType::String {
                    return Err(format!("`{name}` keys must be strings"));
                }
                ParamType::mapping_of(self.lower(&args[1])?)
            }
            "object" => match args {
                [] => ParamType::mapping_of(ParamType::Opaque),
                [inner] => ParamType::mapping_of(self.lower(inner)?),
                _ => return Err("`object` expects at most one type argument".into()),
            },
            other => return Err(format!("unresolvable type `{other}`")),
        };
        Ok(ty)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Lt,
    Gt,
    Comma,
    LBracket,
    RBracket,
    Semi,
    Amp,
    PathSep,
    Enum(Vec<String>),
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '<' => tokens.push(Token::Lt),
            '>' => tokens.push(Token::Gt),
            ',' => tokens.push(Token::Comma),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            ';' => tokens.push(Token::Semi),
            '&' => tokens.push(Token::Amp),
            ':' => {
                if chars.next_if(|&(_, next)| next == ':').is_none() {
                    return Err(format!("unexpected `:` in `{text}`"));
                }
                tokens.push(Token::PathSep);
            }
            '\'' => {
                // Lifetimes carry no schema information.
                while chars
                    .next_if(|&(_, next)| next.is_alphanumeric() || next == '_')
                    .is_some()
                {}
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some((idx, next)) =
                    chars.next_if(|&(_, next)| next.is_alphanumeric() || next == '_')
                {
                    end = idx + next.len_utf8();
                }
                let word = &text[start..end];
                if word == "enum" && chars.peek().is_some_and(|&(_, next)| next == '(') {
                    chars.next();
                    let mut body = String::new();
                    loop {
                        match chars.next() {
                            Some((_, ')')) => break,
                            Some((_, ch)) => body.push(ch),
                            None => return Err(format!("unterminated enum in `{text}`")),
                        }
                    }
                    let variants: Vec<String> = body
                        .split('|')
                        .map(|variant| variant.trim().trim_matches('"').to_owned())
                        .filter(|variant| !variant.is_empty())
                        .collect();
                    if variants.is_empty() {
                        return Err("enum must declare at least one variant".into());
                    }
                    tokens.push(Token::Enum(variants));
                } else {
                    tokens.push(Token::Ident(word.to_owned()));
                }
            }
            other => return Err(format!("unexpected `{other}` in `{text}`")),
        }
    }

    Ok(tokens)
}

#[derive(Clone, Debug, PartialEq)]
enum TypeExpr {
    Path { name: String, args: Vec<TypeExpr> },
    Slice(Box<TypeExpr>),
    Enum(Vec<String>),
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, String> {
        while self.eat(&Token::Amp) {
            if matches!(self.peek(), Some(Token::Ident(word)) if word == "mut") {
                self.pos += 1;
            }
        }

        match self.bump().cloned() {
            Some(Token::Enum(variants)) => Ok(TypeExpr::Enum(variants)),
            Some(Token::LBracket) => {
                let inner = self.parse_type()?;
                if self.eat(&Token::Semi) {
                    // Fixed-size arrays: the length is irrelevant to the schema.
                    while !matches!(self.peek(), Some(Token::RBracket) | None) {
                        self.pos += 1;
                    }
                }
                if !self.eat(&Token::RBracket) {
                    return Err("unterminated slice type".into());
                }
                Ok(TypeExpr::Slice(Box::new(inner)))
            }
            Some(Token::Ident(first)) => {
                let mut name = first;
                while self.eat(&Token::PathSep) {
                    match self.bump() {
                        Some(Token::Ident(segment)) => name.clone_from(segment),
                        _ => return Err("expected path segment after `::`".into()),
                    }
                }
                let args = if self.eat(&Token::Lt) {
                    self.parse_args()?
                } else {
                    Vec::new()
                };
                Ok(TypeExpr::Path { name, args })
            }
            Some(token) => Err(format!("unexpected token {token:?}")),
            None => Err("unexpected end of type".into()),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<TypeExpr>, String> {
        let mut args = Vec::new();
        loop {
            // Lifetime arguments vanish during tokenization and leave bare commas.
            while self.eat(&Token::Comma) {}
            if self.eat(&Token::Gt) {
                return Ok(args);
            }
            args.push(self.parse_type()?);
            if self.eat(&Token::Gt) {
                return Ok(args);
            }
            if !self.eat(&Token::Comma) {
                return Err("expected `,` or `>` in type arguments".into());
            }
        }
    }
}

/// Collapses token-stream spacing (`Vec < u8 >`) into source spelling (`Vec<u8>`).
pub(crate) fn compact_type_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        let word_char = |ch: char| ch.is_alphanumeric() || ch == '_' || ch == '\'';
        if pending_space && out.chars().last().is_some_and(word_char) && word_char(c) {
            out.push(' ');
        }
        if c == ',' {
            out.push_str(", ");
            pending_space = false;
            continue;
        }
        pending_space = false;
        out.push(c);
    }
    out.replace(",  ", ", ").trim_end().to_owned()
}

/// Infers a capability descriptor from a raw method signature.
///
/// # Errors
///
/// Returns [`ToolError::SchemaInference`] when the name is invalid, a parameter
/// type cannot be resolved, a parameter name repeats, or a default does not
/// fit its declared type.
pub fn infer(
    signature: &MethodSignature,
    owner: ToolsetId,
    toolset: &str,
    resolver: &TypeResolver,
) -> ToolResult<Inferred> {
    let capability = signature.name.as_str();
    let name = CapabilityName::new(capability)
        .map_err(|err| ToolError::schema(capability, err.to_string()))?;

    let docs = doc::parse(&signature.doc);
    let mut warnings = Vec::new();
    if docs.summary.is_none() {
        warnings.push(InferenceWarning::MissingDocumentation {
            capability: capability.to_owned(),
        });
    }

    let mut seen = HashSet::new();
    let mut parameters = Vec::with_capacity(signature.params.len());
    for raw in &signature.params {
        if !seen.insert(raw.name.as_str()) {
            return Err(ToolError::schema(
                capability,
                format!("parameter `{}` is declared twice", raw.name),
            ));
        }

        let ty = match resolver.resolve(&raw.type_text) {
            Ok(Some(ty)) => ty,
            Ok(None) => {
                warnings.push(InferenceWarning::UntypedParameter {
                    capability: capability.to_owned(),
                    parameter: raw.name.clone(),
                });
                ParamType::Opaque
            }
            Err(reason) => {
                return Err(ToolError::schema(
                    capability,
                    format!("parameter `{}`: {reason}", raw.name),
                ));
            }
        };

        let default = match &raw.default {
            Some(value) => Some(coerce(&ty, value, &raw.name).map_err(|err| {
                ToolError::schema(
                    capability,
                    format!("default for `{}` does not match {ty}: {err}", raw.name),
                )
            })?),
            None if ty.is_optional() => Some(Value::Null),
            None => None,
        };

        let description = docs.param(&raw.name).map(str::to_owned);
        if description.is_none() {
            warnings.push(InferenceWarning::UndocumentedParameter {
                capability: capability.to_owned(),
                parameter: raw.name.clone(),
            });
        }

        parameters.push(ParameterSpec::new(raw.name.clone(), ty, default, description));
    }

    for (documented, _) in &docs.params {
        if !seen.contains(documented.as_str()) {
            warnings.push(InferenceWarning::UnknownDocumentedParameter {
                capability: capability.to_owned(),
                parameter: documented.clone(),
            });
        }
    }

    let return_hint = ReturnHint::new(
        signature
            .return_type
            .as_deref()
            .map(compact_type_text)
            .filter(|text| !text.is_empty()),
        docs.returns,
    );

    let descriptor = CapabilityDescriptor::new(
        name,
        parameters,
        return_hint,
        docs.summary.unwrap_or_default(),
        owner,
        toolset.to_owned(),
        signature.is_async,
    );

    Ok(Inferred {
        descriptor,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn resolve(text: &str) -> ParamType {
        TypeResolver::new()
            .resolve(text)
            .expect("resolves")
            .expect("typed")
    }

    #[test]
    fn resolves_scalars_and_references() {
        assert_eq!(resolve("String"), ParamType::String);
        assert_eq!(resolve("& 'a str"), ParamType::String);
        assert_eq!(resolve("u32"), ParamType::Integer);
        assert_eq!(resolve("std::num::NonZeroUsize"), ParamType::Integer);
        assert_eq!(resolve("f64"), ParamType::Float);
        assert_eq!(resolve("bool"), ParamType::Boolean);
        assert_eq!(resolve("serde_json::Value"), ParamType::Opaque);
    }

    #[test]
    fn resolves_containers_from_token_spacing() {
        assert_eq!(
            resolve("Option < Vec < i64 > >"),
            ParamType::optional_of(ParamType::sequence_of(ParamType::Integer))
        );
        assert_eq!(
            resolve("& [f32]"),
            ParamType::sequence_of(ParamType::Float)
        );
        assert_eq!(resolve("[u8; 4]"), ParamType::sequence_of(ParamType::Integer));
        assert_eq!(
            resolve("std::collections::HashMap<String, Vec<bool>>"),
            ParamType::mapping_of(ParamType::sequence_of(ParamType::Boolean))
        );
        assert_eq!(resolve("Cow<'_, str>"), ParamType::String);
        assert_eq!(
            resolve("serde_json::Map<String, serde_json::Value>"),
            ParamType::mapping_of(ParamType::Opaque)
        );
    }

    #[test]
    fn resolves_schema_keywords() {
        assert_eq!(
            resolve("array<enum(celsius | \"fahrenheit\")>"),
            ParamType::sequence_of(ParamType::enumeration(["celsius", "fahrenheit"]))
        );
        assert_eq!(resolve("object"), ParamType::mapping_of(ParamType::Opaque));
        assert_eq!(resolve("number"), ParamType::Float);
    }

    #[test]
    fn display_round_trips_through_resolver() {
        let ty = ParamType::mapping_of(ParamType::optional_of(ParamType::sequence_of(
            ParamType::enumeration(["a", "b"]),
        )));
        assert_eq!(resolve(&ty.to_string()), ty);
    }

    #[test]
    fn untyped_and_unresolvable() {
        let resolver = TypeResolver::new();
        assert_eq!(resolver.resolve("").unwrap(), None);
        assert_eq!(resolver.resolve("_").unwrap(), None);
        assert!(resolver.resolve("Location").is_err());
        assert!(resolver.resolve("HashMap<u32, String>").is_err());
        assert!(resolver.resolve("Vec<String, String>").is_err());
        assert!(resolver.resolve("Vec<").is_err());

        let resolver = resolver.alias("Location", ParamType::mapping_of(ParamType::Float));
        assert_eq!(
            resolver.resolve("crate::geo::Location").unwrap(),
            Some(ParamType::mapping_of(ParamType::Float))
        );
    }

    #[test]
    fn compacts_token_spacing() {
        assert_eq!(compact_type_text("Vec < u8 >"), "Vec<u8>");
        assert_eq!(
            compact_type_text("Result < HashMap < String , f64 > , String >"),
            "Result<HashMap<String, f64>, String>"
        );
        assert_eq!(compact_type_text("& 'static str"), "&'static str");
    }

    fn repeat_signature() -> MethodSignature {
        MethodSignature::new("repeat")
            .with_doc("Repeats text.\n\n# Arguments\n\n* `text` - Text to repeat.\n* `count` - Stale name.")
            .param(RawParam::new("text", "String"))
            .param(RawParam::new("times", "u32").with_default(json!(1)))
            .returns("String")
    }

    #[test]
    fn infers_descriptor_with_warnings() {
        let owner = ToolsetId::random();
        let inferred = infer(&repeat_signature(), owner, "Echo", &TypeResolver::new()).unwrap();
        let descriptor = inferred.descriptor;

        assert_eq!(descriptor.name(), "repeat");
        assert_eq!(descriptor.documentation(), "Repeats text.");
        assert_eq!(descriptor.owner(), owner);
        assert_eq!(descriptor.toolset(), "Echo");
        assert!(!descriptor.is_async());
        assert_eq!(descriptor.return_hint().type_name(), Some("String"));

        let text = descriptor.parameter("text").unwrap();
        assert!(text.required());
        assert_eq!(text.description(), Some("Text to repeat."));

        let times = descriptor.parameter("times").unwrap();
        assert!(!times.required());
        assert_eq!(times.default(), Some(&json!(1)));

        assert_eq!(
            inferred.warnings,
            vec![
                InferenceWarning::UndocumentedParameter {
                    capability: "repeat".into(),
                    parameter: "times".into(),
                },
                InferenceWarning::UnknownDocumentedParameter {
                    capability: "repeat".into(),
                    parameter: "count".into(),
                },
            ]
        );
    }

    #[test]
    fn optional_parameters_default_to_null() {
        let signature = MethodSignature::new("search")
            .with_doc("Searches.")
            .param(RawParam::new("limit", "Option<u32>"))
            .asynchronous(true);
        let inferred = infer(&signature, ToolsetId::random(), "Search", &TypeResolver::new())
            .unwrap();
        let limit = inferred.descriptor.parameter("limit").unwrap();
        assert!(!limit.required());
        assert_eq!(limit.default(), Some(&Value::Null));
        assert!(inferred.descriptor.is_async());
    }

    #[test]
    fn untyped_parameter_is_opaque_with_warning() {
        let signature = MethodSignature::new("store")
            .with_doc("Stores.\n\n# Arguments\n\n* `blob` - Anything.")
            .param(RawParam::untyped("blob"));
        let inferred =
            infer(&signature, ToolsetId::random(), "Store", &TypeResolver::new()).unwrap();
        assert_eq!(
            inferred.descriptor.parameter("blob").unwrap().ty(),
            &ParamType::Opaque
        );
        assert!(matches!(
            inferred.warnings.as_slice(),
            [InferenceWarning::UntypedParameter { parameter, .. }] if parameter == "blob"
        ));
    }

    #[test]
    fn missing_documentation_warns() {
        let signature = MethodSignature::new("ping");
        let inferred = infer(&signature, ToolsetId::random(), "Net", &TypeResolver::new()).unwrap();
        assert_eq!(inferred.descriptor.documentation(), "");
        assert_eq!(
            inferred.warnings,
            vec![InferenceWarning::MissingDocumentation {
                capability: "ping".into()
            }]
        );
    }

    #[test]
    fn rejects_unresolvable_types_and_bad_defaults() {
        let resolver = TypeResolver::new();

        let unresolved = MethodSignature::new("locate").param(RawParam::new("at", "Location"));
        let err = infer(&unresolved, ToolsetId::random(), "Geo", &resolver).unwrap_err();
        assert!(matches!(err, ToolError::SchemaInference { capability, .. } if capability == "locate"));

        let bad_default = MethodSignature::new("repeat")
            .param(RawParam::new("times", "u32").with_default(json!("often")));
        let err = infer(&bad_default, ToolsetId::random(), "Echo", &resolver).unwrap_err();
        assert!(matches!(err, ToolError::SchemaInference { .. }));

        let duplicate = MethodSignature::new("dup")
            .param(RawParam::new("a", "u8"))
            .param(RawParam::new("a", "u8"));
        assert!(infer(&duplicate, ToolsetId::random(), "Dup", &resolver).is_err());

    }

    #[test]
    fn invalid_capability_names_are_inference_errors() {
        let resolver = TypeResolver::new();
        for name in ["Bad Name", "", "UPPER", "emoji\u{1f600}"] {
            let err = infer(&MethodSignature::new(name), ToolsetId::random(), "Dup", &resolver)
                .unwrap_err();
            assert!(
                matches!(&err, ToolError::SchemaInference { capability, .. } if capability == name),
                "{name:?}: {err:?}"
            );
        }
        let too_long = MethodSignature::new("a".repeat(65));
        assert!(infer(&too_long, ToolsetId::random(), "Dup", &resolver).is_err());
    }

    #[test]
    fn defaults_are_coerced_to_declared_type() {
        let signature = MethodSignature::new("scale")
            .param(RawParam::new("factor", "f64").with_default(json!(2)));
        let inferred =
            infer(&signature, ToolsetId::random(), "Math", &TypeResolver::new()).unwrap();
        assert_eq!(
            inferred.descriptor.parameter("factor").unwrap().default(),
            Some(&json!(2.0))
        );
    }
}
