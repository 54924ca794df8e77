use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::columns::{is_core_column, ATTRIBUTE_SEPARATOR};
use crate::ModelError;

/// User-defined record attributes, grouped as section → field → value.
///
/// On disk each entry becomes one dynamic column named `"<Section> - <Field>"`. The flat name is
/// only produced at the storage boundary (see [`Attributes::columns`] and
/// [`Attributes::from_columns`]); callers work with the structured form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

/// Split a dynamic column name into `(section, field)`.
///
/// The name is split on the first `" - "`; both halves are trimmed and must be non-empty.
pub fn parse_column_name(name: &str) -> Option<(&str, &str)> {
    let (section, field) = name.split_once(ATTRIBUTE_SEPARATOR)?;
    let (section, field) = (section.trim(), field.trim());
    if section.is_empty() || field.is_empty() {
        return None;
    }
    Some((section, field))
}

fn validate_section(section: &str) -> Result<(), ModelError> {
    let invalid = |reason| ModelError::InvalidSection {
        section: section.to_string(),
        reason,
    };
    if section.is_empty() {
        return Err(invalid("section cannot be empty"));
    }
    // The flat column name is split on the first separator, so it can't appear in the section.
    if section.contains(ATTRIBUTE_SEPARATOR) {
        return Err(invalid("section cannot contain \" - \""));
    }
    Ok(())
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(|fields| fields.is_empty())
    }

    /// Number of `(section, field)` entries.
    pub fn len(&self) -> usize {
        self.sections.values().map(|fields| fields.len()).sum()
    }

    /// Insert or overwrite a value. Section and field are trimmed.
    pub fn insert(
        &mut self,
        section: &str,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), ModelError> {
        let section = section.trim();
        let field = field.trim();
        validate_section(section)?;
        if field.is_empty() {
            return Err(ModelError::EmptyAttributeField {
                section: section.to_string(),
            });
        }
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
        Ok(())
    }

    /// Builder-style [`Attributes::insert`].
    pub fn with(
        mut self,
        section: &str,
        field: &str,
        value: impl Into<String>,
    ) -> Result<Self, ModelError> {
        self.insert(section, field, value)?;
        Ok(self)
    }

    /// Re-check names of attributes that bypassed [`Attributes::insert`] (e.g. deserialized).
    pub fn validate(&self) -> Result<(), ModelError> {
        for (section, fields) in &self.sections {
            validate_section(section)?;
            if section.trim() != section {
                return Err(ModelError::InvalidSection {
                    section: section.clone(),
                    reason: "leading or trailing whitespace",
                });
            }
            if fields.keys().any(|f| f.trim().is_empty() || f.trim() != f) {
                return Err(ModelError::EmptyAttributeField {
                    section: section.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, section: &str, field: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    pub fn remove(&mut self, section: &str, field: &str) -> Option<String> {
        let fields = self.sections.get_mut(section)?;
        let removed = fields.remove(field);
        if fields.is_empty() {
            self.sections.remove(section);
        }
        removed
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, String>)> {
        self.sections.iter().map(|(s, fields)| (s.as_str(), fields))
    }

    /// Iterate `(flat column name, value)` pairs in section/field order.
    pub fn columns(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.sections.iter().flat_map(|(section, fields)| {
            fields.iter().map(move |(field, value)| {
                (
                    format!("{section}{ATTRIBUTE_SEPARATOR}{field}"),
                    value.as_str(),
                )
            })
        })
    }

    /// Flat column names this record declares, in section/field order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns().map(|(name, _)| name).collect()
    }

    /// Rebuild attributes from `(column name, value)` pairs read from a sheet.
    ///
    /// Core columns, names without a valid `"<Section> - <Field>"` shape and empty values are
    /// skipped.
    pub fn from_columns<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut out = Attributes::new();
        for (name, value) in pairs {
            if is_core_column(name) || value.trim().is_empty() {
                continue;
            }
            let Some((section, field)) = parse_column_name(name) else {
                continue;
            };
            if out.insert(section, field, value).is_err() {
                continue;
            }
        }
        out
    }
}
