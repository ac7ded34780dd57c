// src/schema/resolve.rs

use anyhow::Result;
use std::collections::BTreeMap;
use tracing::debug;

use super::types::Schema;
use crate::config::CategorySchema;
use crate::error::PipelineError;
use crate::process::RawRecord;

/// Picks the layout for each category group.
///
/// Known identifiers map to their configured fixed schema; anything else gets a
/// generic schema as wide as the widest row in the group.
pub struct SchemaResolver<'a> {
    categories: &'a BTreeMap<String, CategorySchema>,
    delimiter: &'a str,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(categories: &'a BTreeMap<String, CategorySchema>, delimiter: &'a str) -> Self {
        Self {
            categories,
            delimiter,
        }
    }

    pub fn resolve(&self, category: &str, group: &[RawRecord]) -> Result<Schema> {
        if let Some(known) = self.categories.get(category) {
            debug!(category, label = %known.label, "fixed schema");
            return Ok(Schema::Fixed {
                label: known.label.clone(),
                fields: known.fields.clone(),
            });
        }

        // width of an empty group is meaningless; the grouper never hands one over
        let width = group
            .iter()
            .map(|r| r.text.split(self.delimiter).count())
            .max()
            .ok_or_else(|| PipelineError::EmptyGroup(category.to_string()))?;

        debug!(category, width, "generic schema");
        Ok(Schema::Generic {
            label: category.to_string(),
            width,
        })
    }
}
