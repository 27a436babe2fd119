use crate::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use tessera_types::ContentTypeId;

/// A content type: the schema shared by every item of one category.
///
/// Fields are ordered as the form builder lays them out. Reverse relation
/// fields created by the sync engine are appended at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentType {
    pub id: ContentTypeId,
    /// Display name. Also the default label of reverse fields pointing back here.
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl ContentType {
    pub fn new(id: ContentTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field append, for fixtures and seeding.
    #[must_use]
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDefinition> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fields whose widget is `relation`, in declaration order.
    pub fn relation_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.is_relation())
    }

    /// Appends a field, refusing duplicate names.
    pub fn push_field(&mut self, field: FieldDefinition) -> ModelResult<()> {
        if self.has_field(&field.name) {
            return Err(ModelError::DuplicateField {
                content_type: self.id.clone(),
                field: field.name,
            });
        }
        self.fields.push(field);
        Ok(())
    }
}

/// One field of a content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Unique within the owning content type.
    pub name: String,
    pub label: String,
    pub widget: WidgetKind,
    /// Only present when `widget` is `Relation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationMeta>,
}

impl FieldDefinition {
    fn simple(name: &str, widget: WidgetKind) -> Self {
        Self {
            name: name.into(),
            label: name.into(),
            widget,
            relation: None,
        }
    }

    /// Shorthand for a single-line text field.
    pub fn text(name: &str) -> Self {
        Self::simple(name, WidgetKind::Textfield)
    }

    /// Shorthand for a field of any non-relation widget.
    pub fn scalar(name: &str, widget: WidgetKind) -> Self {
        Self::simple(name, widget)
    }

    /// Shorthand for a multi-valued relation into `target`.
    pub fn relation(name: &str, target: ContentTypeId) -> Self {
        Self {
            relation: Some(RelationMeta {
                content_type_id: Some(target),
                is_single: false,
                reverse_name: None,
            }),
            ..Self::simple(name, WidgetKind::Relation)
        }
    }

    /// Shorthand for a single-valued relation into `target`.
    pub fn single_relation(name: &str, target: ContentTypeId) -> Self {
        Self {
            relation: Some(RelationMeta {
                content_type_id: Some(target),
                is_single: true,
                reverse_name: None,
            }),
            ..Self::simple(name, WidgetKind::Relation)
        }
    }

    /// A multi-valued relation that points back at `source_field` on `source`.
    /// Name and label are both `label`.
    pub fn reverse_relation(label: &str, source: ContentTypeId, source_field: &str) -> Self {
        Self {
            relation: Some(RelationMeta {
                content_type_id: Some(source),
                is_single: false,
                reverse_name: Some(source_field.to_string()),
            }),
            ..Self::simple(label, WidgetKind::Relation)
        }
    }

    pub fn is_relation(&self) -> bool {
        self.widget == WidgetKind::Relation
    }

    /// Whether a relation field holds at most one reference.
    /// Non-relation fields and relations without metadata report `false`.
    pub fn is_single_valued(&self) -> bool {
        self.relation.as_ref().is_some_and(|r| r.is_single)
    }

    /// Name of the paired field on the target content type, once known.
    pub fn reverse_field_name(&self) -> Option<&str> {
        self.relation.as_ref().and_then(|r| r.reverse_name.as_deref())
    }

    /// Records the paired field name, creating relation metadata if absent.
    pub fn set_reverse_field_name(&mut self, name: impl Into<String>) {
        self.relation
            .get_or_insert_with(RelationMeta::default)
            .reverse_name = Some(name.into());
    }
}

/// Relation-only metadata.
///
/// Kept beside [`WidgetKind`] rather than inside it so stored JSON reads
/// `{"widget": "relation", "relation": {...}}` for every field shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMeta {
    /// The content type this field's values point into, when restricted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type_id: Option<ContentTypeId>,
    #[serde(default)]
    pub is_single: bool,
    /// Paired field on the target content type. Filled in lazily by the sync
    /// engine the first time a reference through this field is exercised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_name: Option<String>,
}

/// The form widget backing a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Textfield,
    Textarea,
    Wysiwyg,
    Markdown,
    Datetime,
    Checkbox,
    Radio,
    Select,
    Tabular,
    Image,
    File,
    Relation,
}
