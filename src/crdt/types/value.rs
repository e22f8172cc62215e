//! Payload values carried by sequence elements.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The payload stored in a sequence element.
///
/// Text sequences store one character per element; block-ordering
/// sequences store the id of the referenced block. The two cases share
/// the same tree, so both live behind one enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    Character(char),
    Reference(String),
}

impl Value {
    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Character(character) => Some(*character),
            Value::Reference(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Value::Character(_) => None,
            Value::Reference(reference) => Some(reference),
        }
    }
}

impl From<char> for Value {
    fn from(character: char) -> Self {
        Value::Character(character)
    }
}

impl From<&str> for Value {
    fn from(reference: &str) -> Self {
        Value::Reference(reference.to_string())
    }
}

impl From<String> for Value {
    fn from(reference: String) -> Self {
        Value::Reference(reference)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Character(character) => write!(f, "{character}"),
            Value::Reference(reference) => write!(f, "{reference}"),
        }
    }
}
