use crate::{ContentType, ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tessera_types::{ContentTypeId, ItemId, ItemRef};

/// One record of a content type.
///
/// `data` maps field names to typed values. Relation fields hold `Ref` or
/// `RefSet`; which fields are relations is decided by the content type's
/// widget tags, never by the shape of the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub content_type: ContentTypeId,
    pub id: ItemId,
    #[serde(default)]
    pub data: BTreeMap<String, FieldValue>,
}

impl Item {
    pub fn new(content_type: ContentTypeId, id: ItemId) -> Self {
        Self {
            content_type,
            id,
            data: BTreeMap::new(),
        }
    }

    /// The reference other items use to point at this one.
    pub fn item_ref(&self) -> ItemRef {
        ItemRef::new(self.content_type.clone(), self.id.clone())
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.data.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.data.insert(field.into(), value);
    }

    /// Builder-style `set`, for fixtures.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    /// References held by a field. Empty when the field is unset or scalar.
    pub fn relation_refs(&self, field: &str) -> &[ItemRef] {
        self.get(field).map(FieldValue::refs).unwrap_or(&[])
    }

    /// Imports an item from the flat JSON shape used by editor forms and
    /// exports (`{"name": "...", "author": "authors 12"}`), using
    /// `content_type` to tell relation fields apart.
    ///
    /// This is an import/export format only. Record stores persist the tagged
    /// serde form of [`Item`], which does not need the schema to decode.
    /// Keys unknown to the schema are kept as scalars.
    pub fn from_json(content_type: &ContentType, id: ItemId, data: &Value) -> ModelResult<Self> {
        let obj = data.as_object().ok_or_else(|| {
            ModelError::InvalidItemData(format!("expected a JSON object, got {data}"))
        })?;

        let mut item = Self::new(content_type.id.clone(), id);
        for (name, raw) in obj {
            let is_relation = content_type.field(name).is_some_and(|f| f.is_relation());
            let value = if is_relation {
                decode_relation(name, raw)?
            } else if raw.is_null() {
                FieldValue::Empty
            } else {
                FieldValue::Scalar(raw.clone())
            };
            item.data.insert(name.clone(), value);
        }
        Ok(item)
    }

    /// Exports to the flat JSON item shape read by [`Item::from_json`].
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .data
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

fn decode_relation(field: &str, raw: &Value) -> ModelResult<FieldValue> {
    let parse = |s: &str| {
        ItemRef::parse(s).map_err(|source| ModelError::InvalidReference {
            field: field.to_string(),
            source,
        })
    };

    match raw {
        Value::Null => Ok(FieldValue::Empty),
        Value::String(s) if s.is_empty() => Ok(FieldValue::Empty),
        Value::String(s) => Ok(FieldValue::Ref(parse(s)?)),
        Value::Array(values) => {
            let mut refs = Vec::with_capacity(values.len());
            for v in values {
                let s = v.as_str().ok_or_else(|| {
                    ModelError::InvalidItemData(format!(
                        "relation field `{field}` contains a non-string value: {v}"
                    ))
                })?;
                let r = parse(s)?;
                if !refs.contains(&r) {
                    refs.push(r);
                }
            }
            Ok(FieldValue::RefSet(refs))
        }
        other => Err(ModelError::InvalidItemData(format!(
            "relation field `{field}` has unexpected value: {other}"
        ))),
    }
}

/// The value of one item field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    #[default]
    Empty,
    Scalar(Value),
    Ref(ItemRef),
    /// Ordered, duplicate-free set of references.
    RefSet(Vec<ItemRef>),
}

impl FieldValue {
    /// Builds a `RefSet`, dropping duplicates while keeping first-seen order.
    pub fn ref_set(refs: impl IntoIterator<Item = ItemRef>) -> Self {
        let mut out: Vec<ItemRef> = Vec::new();
        for r in refs {
            if !out.contains(&r) {
                out.push(r);
            }
        }
        Self::RefSet(out)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Scalar(v) => v.is_null(),
            Self::Ref(_) => false,
            Self::RefSet(refs) => refs.is_empty(),
        }
    }

    /// The references this value holds, in order.
    pub fn refs(&self) -> &[ItemRef] {
        match self {
            Self::Ref(r) => std::slice::from_ref(r),
            Self::RefSet(refs) => refs,
            Self::Empty | Self::Scalar(_) => &[],
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Scalar(v) => v.clone(),
            Self::Ref(r) => Value::String(r.to_string()),
            Self::RefSet(refs) => {
                Value::Array(refs.iter().map(|r| Value::String(r.to_string())).collect())
            }
        }
    }
}
