//! Tool catalog — typed descriptors, JSON-schema rendering, argument validation.
//!
//! Descriptors are declared once with `ParamDef` builders, rendered to the
//! JSON-schema shape MCP clients expect in `tools/list`, and compiled into a
//! `jsonschema` validator so a bad call reports every violation at once.

use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Int,
    Float,
    Bool,
    StringList,
    Enum(Vec<String>),
    /// Nested object with its own members; unknown members are rejected.
    Object(Vec<ParamDef>),
}

/// Numeric and string bounds for a parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub constraints: Constraints,
}

impl ParamDef {
    pub fn new(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: false,
            default: None,
            constraints: Constraints::default(),
        }
    }

    pub fn string(name: &str, description: &str) -> Self {
        Self::new(name, ParamType::String, description)
    }

    pub fn int(name: &str, description: &str) -> Self {
        Self::new(name, ParamType::Int, description)
    }

    pub fn string_list(name: &str, description: &str) -> Self {
        Self::new(name, ParamType::StringList, description)
    }

    pub fn object(name: &str, description: &str, members: Vec<ParamDef>) -> Self {
        Self::new(name, ParamType::Object(members), description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn range(mut self, minimum: Option<i64>, maximum: Option<i64>) -> Self {
        self.constraints.minimum = minimum;
        self.constraints.maximum = maximum;
        self
    }

    pub fn length(mut self, min_length: Option<u64>, max_length: Option<u64>) -> Self {
        self.constraints.min_length = min_length;
        self.constraints.max_length = max_length;
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.constraints.pattern = Some(pattern.to_string());
        self
    }

    pub fn is_required(&self) -> bool {
        self.required && self.default.is_none()
    }

    /// JSON-schema fragment for this parameter.
    pub fn to_schema(&self) -> Value {
        let mut schema = Map::new();
        match &self.param_type {
            ParamType::String => {
                schema.insert("type".into(), json!("string"));
            }
            ParamType::Int => {
                schema.insert("type".into(), json!("integer"));
            }
            ParamType::Float => {
                schema.insert("type".into(), json!("number"));
            }
            ParamType::Bool => {
                schema.insert("type".into(), json!("boolean"));
            }
            ParamType::StringList => {
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), json!({ "type": "string" }));
            }
            ParamType::Enum(variants) => {
                schema.insert("type".into(), json!("string"));
                schema.insert("enum".into(), json!(variants));
            }
            ParamType::Object(members) => {
                schema.extend(object_schema(members));
            }
        }
        schema.insert("description".into(), json!(self.description));

        let c = &self.constraints;
        if let Some(v) = c.minimum {
            schema.insert("minimum".into(), json!(v));
        }
        if let Some(v) = c.maximum {
            schema.insert("maximum".into(), json!(v));
        }
        if let Some(v) = c.min_length {
            schema.insert("minLength".into(), json!(v));
        }
        if let Some(v) = c.max_length {
            schema.insert("maxLength".into(), json!(v));
        }
        if let Some(p) = &c.pattern {
            schema.insert("pattern".into(), json!(p));
        }
        if let Some(d) = &self.default {
            schema.insert("default".into(), d.clone());
        }
        Value::Object(schema)
    }
}

fn object_schema(members: &[ParamDef]) -> Map<String, Value> {
    let properties: Map<String, Value> = members
        .iter()
        .map(|p| (p.name.clone(), p.to_schema()))
        .collect();
    let required: Vec<&str> = members
        .iter()
        .filter(|p| p.is_required())
        .map(|p| p.name.as_str())
        .collect();

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    schema.insert("additionalProperties".into(), json!(false));
    schema
}

// =============================================================================
// Tool descriptor
// =============================================================================

/// Complete, immutable tool metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamDef>,
    /// One valid argument object, shown back to callers after a validation failure.
    pub example: Value,
}

impl ToolDescriptor {
    /// JSON-schema `inputSchema` for `tools/list`.
    pub fn input_schema(&self) -> Value {
        Value::Object(object_schema(&self.parameters))
    }

    /// The `tools/list` entry for this tool.
    pub fn to_listing(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }
}

// =============================================================================
// Tool registry
// =============================================================================

struct RegisteredTool {
    descriptor: ToolDescriptor,
    validator: jsonschema::Validator,
}

/// Read-only registry of descriptors with compiled validators.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.iter().map(|t| &t.descriptor.name).collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    /// Build the registry, compiling one validator per descriptor.
    pub fn new(descriptors: impl IntoIterator<Item = ToolDescriptor>) -> Result<Self> {
        let mut tools = Vec::new();
        let mut index = HashMap::new();

        for descriptor in descriptors {
            if descriptor.name.is_empty() {
                return Err(Error::schema("Tool name cannot be empty"));
            }
            if index.contains_key(&descriptor.name) {
                return Err(Error::schema(format!("Duplicate tool name: {}", descriptor.name)));
            }
            let validator = jsonschema::validator_for(&descriptor.input_schema())
                .map_err(|e| Error::schema(format!("{}: {}", descriptor.name, e)))?;

            index.insert(descriptor.name.clone(), tools.len());
            tools.push(RegisteredTool {
                descriptor,
                validator,
            });
        }

        Ok(Self { tools, index })
    }

    /// All descriptors in registration order.
    pub fn describe_all(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i].descriptor)
    }

    /// Validate arguments, then fill defaults for absent optional parameters.
    ///
    /// `None` and `null` are treated as an empty object. Every violation is
    /// reported, not just the first.
    pub fn validate(&self, name: &str, arguments: Option<Value>) -> Result<Value> {
        let tool = self
            .index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| Error::unknown_tool(name))?;

        let mut arguments = match arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(v) => v,
        };

        let violations: Vec<String> = tool
            .validator
            .iter_errors(&arguments)
            .map(|e| {
                let path = e.instance_path.to_string();
                let field = path.trim_start_matches('/').replace('/', ".");
                if field.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", field, e)
                }
            })
            .collect();

        if !violations.is_empty() {
            return Err(Error::invalid_arguments(name, violations));
        }

        fill_defaults(&tool.descriptor, &mut arguments);
        Ok(arguments)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn fill_defaults(descriptor: &ToolDescriptor, arguments: &mut Value) {
    if let Some(map) = arguments.as_object_mut() {
        for param in &descriptor.parameters {
            if !map.contains_key(&param.name) {
                if let Some(default) = &param.default {
                    map.insert(param.name.clone(), default.clone());
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
