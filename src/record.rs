//! Student record model.
//!
//! The record schema is declared statically: [`Field::ALL`] lists every
//! editable field in form order, and each [`Field`] knows its wire key (the
//! document field name in the store), its display label and its input kind.
//! Forms, tables and store codecs all iterate this list instead of inspecting
//! field names at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque record identifier assigned by the store on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Input hint for a field. Never used for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Date,
}

impl FieldKind {
    /// Placeholder shown in an empty form input.
    pub fn placeholder(self) -> &'static str {
        match self {
            FieldKind::Text => "",
            FieldKind::Email => "name@example.com",
            FieldKind::Phone => "+1 555 0100",
            FieldKind::Date => "YYYY-MM-DD",
        }
    }
}

/// One editable field of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Phone,
    Address,
    DateOfBirth,
    Gender,
    ParentName,
    ParentContact,
    Class,
    Section,
    RollNumber,
    AdmissionDate,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Field; 12] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Address,
        Field::DateOfBirth,
        Field::Gender,
        Field::ParentName,
        Field::ParentContact,
        Field::Class,
        Field::Section,
        Field::RollNumber,
        Field::AdmissionDate,
    ];

    /// Document field name used by the store.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Address => "address",
            Field::DateOfBirth => "dateOfBirth",
            Field::Gender => "gender",
            Field::ParentName => "parentName",
            Field::ParentContact => "parentContact",
            Field::Class => "class",
            Field::Section => "section",
            Field::RollNumber => "rollNumber",
            Field::AdmissionDate => "admissionDate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Address => "Address",
            Field::DateOfBirth => "Date of Birth",
            Field::Gender => "Gender",
            Field::ParentName => "Parent Name",
            Field::ParentContact => "Parent Contact",
            Field::Class => "Class",
            Field::Section => "Section",
            Field::RollNumber => "Roll Number",
            Field::AdmissionDate => "Admission Date",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Email => FieldKind::Email,
            Field::Phone | Field::ParentContact => FieldKind::Phone,
            Field::DateOfBirth | Field::AdmissionDate => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }

    /// Look a field up by its wire key.
    pub fn from_key(key: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Position of this field in [`Field::ALL`].
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|f| *f == self)
            .unwrap_or_default()
    }
}

/// The editable part of a record. Also used as the form buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: String,
    pub parent_name: String,
    pub parent_contact: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: String,
    pub roll_number: String,
    pub admission_date: String,
}

impl RecordFields {
    /// Empty template with every field blank.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Address => &self.address,
            Field::DateOfBirth => &self.date_of_birth,
            Field::Gender => &self.gender,
            Field::ParentName => &self.parent_name,
            Field::ParentContact => &self.parent_contact,
            Field::Class => &self.class_name,
            Field::Section => &self.section,
            Field::RollNumber => &self.roll_number,
            Field::AdmissionDate => &self.admission_date,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Address => &mut self.address,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::Gender => &mut self.gender,
            Field::ParentName => &mut self.parent_name,
            Field::ParentContact => &mut self.parent_contact,
            Field::Class => &mut self.class_name,
            Field::Section => &mut self.section,
            Field::RollNumber => &mut self.roll_number,
            Field::AdmissionDate => &mut self.admission_date,
        }
    }

    /// Replace one field's value. Any string is accepted.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// Builder-style variant of [`RecordFields::set`].
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Fields whose value is blank (whitespace counts as blank).
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Iterate `(field, value)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

/// A stored student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: RecordFields,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, fields: RecordFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: Field) -> &str {
        self.fields.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_conversions_agree() {
        let owned = RecordId::from("abc123".to_string());
        assert_eq!(owned, RecordId::from("abc123"));
        assert_eq!(owned.as_str(), "abc123");
        assert_eq!(owned.to_string(), "abc123");
    }

    #[test]
    fn test_keys_are_unique_and_round_trip() {
        let mut keys: Vec<_> = Field::ALL.iter().map(|f| f.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Field::ALL.len());

        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key("id"), None);
    }

    #[test]
    fn test_index_matches_form_order() {
        for (i, field) in Field::ALL.into_iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn test_set_and_get_every_field() {
        let mut fields = RecordFields::empty();
        for field in Field::ALL {
            fields.set(field, field.label());
        }
        for field in Field::ALL {
            assert_eq!(fields.get(field), field.label());
        }
        assert!(fields.is_complete());
    }

    #[test]
    fn test_missing_treats_whitespace_as_blank() {
        let fields = RecordFields::empty()
            .with(Field::Name, "Ann")
            .with(Field::Email, "   ");
        let missing = fields.missing();
        assert!(!missing.contains(&Field::Name));
        assert!(missing.contains(&Field::Email));
        assert_eq!(missing.len(), 11);
    }

    #[test]
    fn test_serde_uses_wire_keys() {
        let fields = RecordFields::empty()
            .with(Field::Class, "5")
            .with(Field::RollNumber, "12");
        let record = Record::new("r1", fields);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "r1");
        assert_eq!(json["class"], "5");
        assert_eq!(json["rollNumber"], "12");
        assert_eq!(json["dateOfBirth"], "");
    }
}
