use crate::schema::{EntityType, Path, Schema};

use super::error::ValidationError;
use super::filter_path::FilterPath;
use super::group::OrFilter;

impl OrFilter {
    /// Build the catalog for `entity`: every field as an inactive, unsorted
    /// entry, following foreign references up to `depth` hops deep.
    ///
    /// Labels of nested fields join the hop labels with " / ".
    pub fn catalog(
        schema: &Schema,
        entity: &EntityType,
        depth: usize,
    ) -> Result<Self, ValidationError> {
        let mut entries = Vec::new();
        collect(schema, entity, depth, &mut entries)?;
        Ok(Self {
            filter_paths: entries,
            ..Self::new(0)
        })
    }
}

fn collect(
    schema: &Schema,
    entity: &EntityType,
    depth: usize,
    out: &mut Vec<FilterPath>,
) -> Result<(), ValidationError> {
    let def = schema
        .entity(entity)
        .ok_or_else(|| ValidationError::UnknownEntity {
            entity: entity.clone(),
        })?;

    for field in &def.fields {
        out.push(FilterPath::new(
            field.display_label(),
            Path::field(&field.name),
            field.field_type.clone(),
        ));

        let Some(target) = field.field_type.target() else {
            continue;
        };
        if depth == 0 || schema.entity(target).is_none() {
            continue;
        }
        let mut nested = Vec::new();
        collect(schema, target, depth - 1, &mut nested)?;
        out.extend(nested.into_iter().map(|mut entry| {
            entry.label = format!("{} / {}", field.display_label(), entry.label);
            entry.path = entry.path.behind(&field.name);
            entry
        }));
    }
    Ok(())
}
