//! Document schema description consumed by the lookup compiler.
//!
//! A schema is an ordered list of fields. Each field is one of:
//! - a scalar [`Caster`]
//! - a plain nested object (more fields)
//! - a reference to a named schema in a [`SchemaRegistry`], possibly the
//!   schema being described (self-reference)
//! - an array wrapper around any of the above, or an empty array
//!
//! Schemas can be written in code or read from JSON text:
//!
//! ```text
//! {
//!   "Comments": { "title": "String", "comments": [{ "$ref": "Comments" }] },
//!   "BlogPost": {
//!     "title": "String",
//!     "meta": { "visitors": "Number" },
//!     "numbers": ["Number"],
//!     "comments": [{ "$ref": "Comments" }]
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

use crate::cast::Caster;

/// Key marking a map as a schema reference rather than a nested object.
pub const REF_KEY: &str = "$ref";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaId {
    fn from(s: &str) -> Self {
        SchemaId(s.to_string())
    }
}

impl From<String> for SchemaId {
    fn from(s: String) -> Self {
        SchemaId(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Scalar(Caster),
    Object(Fields),
    SchemaRef(SchemaId),
    /// `None` is an empty array: the element type is unknown.
    Array(Option<Box<SchemaNode>>),
}

impl SchemaNode {
    pub fn array(inner: impl Into<SchemaNode>) -> Self {
        SchemaNode::Array(Some(Box::new(inner.into())))
    }

    pub fn empty_array() -> Self {
        SchemaNode::Array(None)
    }

    pub fn schema(id: impl Into<SchemaId>) -> Self {
        SchemaNode::SchemaRef(id.into())
    }
}

impl From<Caster> for SchemaNode {
    fn from(caster: Caster) -> Self {
        SchemaNode::Scalar(caster)
    }
}

impl From<Fields> for SchemaNode {
    fn from(fields: Fields) -> Self {
        SchemaNode::Object(fields)
    }
}

/// Ordered field list. Declaration order is traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, SchemaNode)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Fields::push`].
    pub fn with(mut self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.push(name, node);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, node: impl Into<SchemaNode>) {
        self.0.push((name.into(), node.into()));
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    id: SchemaId,
    fields: Fields,
}

impl Schema {
    pub fn new(id: impl Into<SchemaId>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
        }
    }

    pub fn with_fields(id: impl Into<SchemaId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn field(mut self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.fields.push(name, node);
        self
    }

    pub fn id(&self) -> &SchemaId {
        &self.id
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// Named schemas, used to resolve [`SchemaNode::SchemaRef`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    schemas: HashMap<SchemaId, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema, returning the one it replaced under the same id.
    pub fn insert(&mut self, schema: Schema) -> Option<Schema> {
        self.schemas.insert(schema.id.clone(), schema)
    }

    pub fn with(mut self, schema: Schema) -> Self {
        self.insert(schema);
        self
    }

    pub fn get(&self, id: &SchemaId) -> Option<&Schema> {
        self.schemas.get(id)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl<'de> Deserialize<'de> for SchemaRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, Fields>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(id, fields)| Schema::with_fields(id, fields))
            .fold(SchemaRegistry::new(), SchemaRegistry::with))
    }
}

// ── Deserialization ─────────────────────────────────────────────

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field names to schema nodes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Fields, A::Error> {
                collect_fields(Fields::new(), &mut map)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = SchemaNode;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a caster name, an array of at most one node, a `$ref` map or a nested object")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SchemaNode, E> {
        v.parse::<Caster>()
            .map(SchemaNode::Scalar)
            .map_err(E::custom)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SchemaNode, A::Error> {
        let Some(inner) = seq.next_element::<SchemaNode>()? else {
            return Ok(SchemaNode::empty_array());
        };
        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(2, &"an array of at most one node"));
        }
        Ok(SchemaNode::array(inner))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SchemaNode, A::Error> {
        let Some(first) = map.next_key::<String>()? else {
            return Ok(SchemaNode::Object(Fields::new()));
        };

        if first == REF_KEY {
            let id: String = map.next_value()?;
            if map.next_key::<IgnoredAny>()?.is_some() {
                return Err(de::Error::custom(
                    "`$ref` must be the only key of a schema reference",
                ));
            }
            return Ok(SchemaNode::SchemaRef(id.into()));
        }

        let node = map.next_value::<SchemaNode>()?;
        let fields = collect_fields(Fields::new().with(first, node), &mut map)?;
        Ok(SchemaNode::Object(fields))
    }
}

fn collect_fields<'de, A: MapAccess<'de>>(
    mut fields: Fields,
    map: &mut A,
) -> Result<Fields, A::Error> {
    while let Some((name, node)) = map.next_entry::<String, SchemaNode>()? {
        if fields.get(&name).is_some() {
            return Err(de::Error::custom(format!("duplicate field `{name}`")));
        }
        fields.push(name, node);
    }
    Ok(fields)
}
