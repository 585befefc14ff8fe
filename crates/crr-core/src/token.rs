//! Deployment-time values and their CloudFormation intrinsic encoding
//!
//! A [`Token`] is a value that may only be known once the provisioning engine
//! deploys the template: a resource `Ref`, an attribute read via `Fn::GetAtt`,
//! a pseudo parameter, or a `Fn::Join` of any of these. Literal strings are
//! tokens too, so every property that may carry a deployment-time value takes
//! a `Token`.
//!
//! References between resources are never tracked out of band: the dependency
//! graph is recovered from the rendered JSON with [`collect_references`], so a
//! property computed from another resource's output always becomes an edge.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fmt;

/// CloudFormation pseudo parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoParameter {
    Partition,
    AccountId,
}

impl PseudoParameter {
    /// The `Ref` target name
    pub fn as_str(&self) -> &'static str {
        match self {
            PseudoParameter::Partition => "AWS::Partition",
            PseudoParameter::AccountId => "AWS::AccountId",
        }
    }
}

/// A string value that may be resolved at deployment time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// A value known at synthesis time
    Literal(String),
    /// `{"Ref": logical_id}`
    Ref(String),
    /// `{"Fn::GetAtt": [logical_id, attribute]}`
    GetAtt {
        logical_id: String,
        attribute: String,
    },
    /// `{"Ref": "AWS::..."}`
    Pseudo(PseudoParameter),
    /// `{"Fn::Join": [delimiter, parts]}`
    Join { delimiter: String, parts: Vec<Token> },
}

impl Token {
    /// Create a literal token
    pub fn literal(value: impl Into<String>) -> Self {
        Token::Literal(value.into())
    }

    /// Create a `Ref` token
    pub fn reference(logical_id: impl Into<String>) -> Self {
        Token::Ref(logical_id.into())
    }

    /// Create a `Fn::GetAtt` token
    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Token::GetAtt {
            logical_id: logical_id.into(),
            attribute: attribute.into(),
        }
    }

    /// Concatenate parts with an empty delimiter
    ///
    /// Nested empty-delimiter joins are flattened and adjacent literals are
    /// merged; if every part is a literal the result is a single literal
    /// rather than a `Fn::Join`. A single part is returned unwrapped.
    pub fn concat(parts: Vec<Token>) -> Self {
        let mut flat: Vec<Token> = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Token::Join { delimiter, parts } if delimiter.is_empty() => flat.extend(parts),
                other => flat.push(other),
            }
        }

        let mut merged: Vec<Token> = Vec::with_capacity(flat.len());
        for part in flat {
            if let Token::Literal(next) = &part {
                if next.is_empty() {
                    continue;
                }
                if let Some(Token::Literal(prev)) = merged.last_mut() {
                    prev.push_str(next);
                    continue;
                }
            }
            merged.push(part);
        }

        match merged.len() {
            0 => Token::Literal(String::new()),
            1 => merged.remove(0),
            _ => Token::Join {
                delimiter: String::new(),
                parts: merged,
            },
        }
    }

    /// Whether the value is fully known at synthesis time
    pub fn is_literal(&self) -> bool {
        matches!(self, Token::Literal(_))
    }

    /// The literal value, if the token is a literal
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Token::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Logical ids of the resources this token reads from
    pub fn references(&self) -> BTreeSet<String> {
        collect_references(&self.to_json())
    }

    /// Render the CloudFormation JSON encoding
    pub fn to_json(&self) -> Value {
        match self {
            Token::Literal(s) => Value::String(s.clone()),
            Token::Ref(id) => json!({ "Ref": id }),
            Token::GetAtt {
                logical_id,
                attribute,
            } => json!({ "Fn::GetAtt": [logical_id, attribute] }),
            Token::Pseudo(p) => json!({ "Ref": p.as_str() }),
            Token::Join { delimiter, parts } => {
                let parts: Vec<Value> = parts.iter().map(Token::to_json).collect();
                json!({ "Fn::Join": [delimiter, parts] })
            }
        }
    }
}

impl Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl From<Token> for Value {
    fn from(token: Token) -> Self {
        token.to_json()
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::Literal(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::Literal(value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(s) => write!(f, "{}", s),
            Token::Ref(id) => write!(f, "${{Token[Ref.{}]}}", id),
            Token::GetAtt {
                logical_id,
                attribute,
            } => write!(f, "${{Token[{}.{}]}}", logical_id, attribute),
            Token::Pseudo(p) => write!(f, "${{Token[{}]}}", p.as_str()),
            Token::Join { delimiter, parts } => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", delimiter)?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
        }
    }
}

/// Collect the logical ids referenced by `Ref` and `Fn::GetAtt` anywhere in a
/// rendered JSON value. Pseudo parameters are not resources and are skipped.
pub fn collect_references(value: &Value) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    walk(value, &mut refs);
    refs
}

fn walk(value: &Value, refs: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(target)) = map.get("Ref") {
                    if !target.starts_with("AWS::") {
                        refs.insert(target.clone());
                    }
                    return;
                }
                if let Some(Value::Array(args)) = map.get("Fn::GetAtt") {
                    if let Some(Value::String(target)) = args.first() {
                        refs.insert(target.clone());
                    }
                    return;
                }
            }
            for v in map.values() {
                walk(v, refs);
            }
        }
        Value::Array(items) => {
            for v in items {
                walk(v, refs);
            }
        }
        _ => {}
    }
}
