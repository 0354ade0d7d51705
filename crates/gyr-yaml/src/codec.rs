//! Codec between YAML byte streams and document forests.

use std::io::{Read, Write};

use serde::Deserialize;
use serde_yaml::Value;

use gyr_tree::{Document, Node, Scalar};

use crate::error::{YamlError, YamlResult};

/// Decodes multi-document YAML streams into forests and encodes forests
/// back into streams.
///
/// Decoding keeps document order and mapping key order. Encoding writes a
/// `---` separator line before every document, so output is always a valid
/// multi-document stream regardless of how many documents the forest holds.
/// Presentation details of untouched nodes (quoting style, indentation)
/// follow the emitter, not the input bytes; the structure and the values
/// round-trip exactly.
pub struct YamlCodec;

impl YamlCodec {
    /// Decode a complete stream into a forest.
    ///
    /// An empty or whitespace-only stream decodes to an empty forest.
    pub fn decode_str(input: &str) -> YamlResult<Vec<Document>> {
        if input.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut forest = Vec::new();
        for document in serde_yaml::Deserializer::from_str(input) {
            let value = Value::deserialize(document).map_err(YamlError::Parse)?;
            forest.push(Document::new(node_from_value(value)?));
        }
        Ok(forest)
    }

    /// Read `reader` to the end and decode it.
    pub fn decode_reader(mut reader: impl Read) -> YamlResult<Vec<Document>> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        Self::decode_str(&input)
    }

    /// Encode a forest as one multi-document stream.
    ///
    /// A mapping whose entries encode to the same key is refused with
    /// [`YamlError::DuplicateKey`] rather than dropping an entry.
    pub fn encode_string(forest: &[Document]) -> YamlResult<String> {
        let mut out = String::new();
        for document in forest {
            let value = value_from_node(document.root())?;
            out.push_str("---\n");
            out.push_str(&serde_yaml::to_string(&value).map_err(YamlError::Emit)?);
        }
        Ok(out)
    }

    /// Encode a forest and write it to `writer`.
    pub fn encode_writer(mut writer: impl Write, forest: &[Document]) -> YamlResult<()> {
        let out = Self::encode_string(forest)?;
        writer.write_all(out.as_bytes())?;
        Ok(())
    }
}

fn node_from_value(value: Value) -> YamlResult<Node> {
    Ok(match value {
        Value::Null => Node::Scalar(Scalar::Null),
        Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
        Value::Number(n) => Node::Scalar(Scalar::Number(n.to_string())),
        Value::String(s) => Node::Scalar(Scalar::String(s)),
        Value::Sequence(items) => Node::Sequence(
            items
                .into_iter()
                .map(node_from_value)
                .collect::<YamlResult<_>>()?,
        ),
        Value::Mapping(mapping) => {
            let mut entries = Vec::with_capacity(mapping.len());
            for (key, val) in mapping {
                entries.push((node_from_value(key)?, node_from_value(val)?));
            }
            Node::Mapping(entries)
        }
        Value::Tagged(tagged) => {
            return Err(YamlError::UnsupportedTag {
                tag: tagged.tag.to_string(),
            })
        }
    })
}

fn value_from_node(node: &Node) -> YamlResult<Value> {
    Ok(match node {
        Node::Scalar(scalar) => value_from_scalar(scalar),
        Node::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(value_from_node)
                .collect::<YamlResult<_>>()?,
        ),
        Node::Mapping(entries) => {
            let mut mapping = serde_yaml::Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                let encoded_key = value_from_node(key)?;
                if mapping.insert(encoded_key, value_from_node(value)?).is_some() {
                    return Err(YamlError::DuplicateKey {
                        key: describe_key(key),
                    });
                }
            }
            Value::Mapping(mapping)
        }
    })
}

/// Compact rendering of a mapping key for error messages.
fn describe_key(key: &Node) -> String {
    match key {
        Node::Scalar(Scalar::String(s)) => s.clone(),
        Node::Scalar(Scalar::Number(n)) => n.clone(),
        Node::Scalar(Scalar::Bool(b)) => b.to_string(),
        Node::Scalar(Scalar::Null) => "null".to_string(),
        Node::Sequence(_) | Node::Mapping(_) => "<structured key>".to_string(),
    }
}

fn value_from_scalar(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Number(text) => number_value(text),
        Scalar::String(s) => Value::String(s.clone()),
    }
}

/// Re-type a number from the literal rendering captured at decode time.
/// A rendering that no longer parses falls back to a string scalar.
fn number_value(text: &str) -> Value {
    // f64::from_str does not accept YAML's dotted float spellings.
    match text {
        ".inf" | "+.inf" => return Value::Number(f64::INFINITY.into()),
        "-.inf" => return Value::Number(f64::NEG_INFINITY.into()),
        ".nan" => return Value::Number(f64::NAN.into()),
        _ => {}
    }
    if let Ok(n) = text.parse::<u64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = text.parse::<f64>() {
        return Value::Number(n.into());
    }
    Value::String(text.to_string())
}
