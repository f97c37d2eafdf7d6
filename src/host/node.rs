use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

pub type NodeInputs = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    Choice { options: Vec<String> },
    String { multiline: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: InputKind,
}

impl InputSpec {
    pub fn choice(name: &str, options: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: InputKind::Choice {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: InputKind::String { multiline: false },
        }
    }
}

/// What the host advertises about a node type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub name: String,
    pub display_name: String,
    pub category: String,
    pub required: Vec<InputSpec>,
    pub return_types: Vec<String>,
    pub return_names: Vec<String>,
}

/// A pipeline node type. `execute` runs on the host's worker thread and may block.
pub trait Node: Send + Sync {
    fn info(&self) -> NodeInfo;

    fn execute(&self, inputs: &NodeInputs) -> Result<Vec<Value>>;
}

pub fn input_str<'a>(inputs: &'a NodeInputs, name: &str) -> Result<&'a str> {
    inputs
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidInput(format!("Missing string input '{}'", name)))
}
