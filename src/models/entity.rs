//! Todo Entity Module
//!
//! The persisted todo and its mapping onto table rows.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::TableEntity;

// == Todo Entity ==
/// A task as stored in the todo table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoEntity {
    pub partition_key: String,
    /// Random UUID assigned at creation
    pub row_key: String,
    /// Last write time, set by the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Version marker, set by the store
    #[serde(rename = "eTag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub create_time: DateTime<Utc>,
    pub task_description: String,
    pub is_completed: bool,
}

impl TodoEntity {
    // Table property names. The cleanup filter uses IS_COMPLETED too.
    pub const CREATE_TIME: &'static str = "createTime";
    pub const TASK_DESCRIPTION: &'static str = "taskDescription";
    pub const IS_COMPLETED: &'static str = "isCompleted";

    // == Constructor ==
    /// Creates an unsaved, incomplete todo with a fresh row key.
    pub fn new(partition_key: impl Into<String>, task_description: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: Uuid::new_v4().to_string(),
            timestamp: None,
            etag: None,
            create_time: Utc::now(),
            task_description: task_description.into(),
            is_completed: false,
        }
    }

    /// Maps this todo onto a table row.
    pub fn to_table_entity(&self) -> TableEntity {
        let mut row = TableEntity::new(self.partition_key.clone(), self.row_key.clone())
            .with_property(Self::CREATE_TIME, self.create_time.to_rfc3339())
            .with_property(Self::TASK_DESCRIPTION, self.task_description.clone())
            .with_property(Self::IS_COMPLETED, self.is_completed);
        row.etag = self.etag.clone();
        row.timestamp = self.timestamp;
        row
    }
}

impl TryFrom<TableEntity> for TodoEntity {
    type Error = StoreError;

    fn try_from(row: TableEntity) -> Result<Self, Self::Error> {
        let mut properties = row.properties;
        Ok(Self {
            create_time: take_property(&mut properties, Self::CREATE_TIME)?,
            task_description: take_property(&mut properties, Self::TASK_DESCRIPTION)?,
            // Rows written without the flag read as incomplete
            is_completed: properties
                .remove(Self::IS_COMPLETED)
                .map(serde_json::from_value)
                .transpose()?
                .unwrap_or(false),
            partition_key: row.partition_key,
            row_key: row.row_key,
            timestamp: row.timestamp,
            etag: row.etag,
        })
    }
}

fn take_property<T: DeserializeOwned>(
    properties: &mut Map<String, Value>,
    name: &str,
) -> Result<T, StoreError> {
    let value = properties
        .remove(name)
        .ok_or_else(|| StoreError::Serialization(format!("missing property '{}'", name)))?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_todo_defaults() {
        let before = Utc::now();
        let todo = TodoEntity::new("TODO", "buy milk");

        assert_eq!(todo.partition_key, "TODO");
        assert_eq!(todo.task_description, "buy milk");
        assert!(!todo.is_completed);
        assert!(todo.etag.is_none());
        assert!(Uuid::parse_str(&todo.row_key).is_ok());
        assert!(todo.create_time >= before);
        assert!(todo.create_time - before < Duration::seconds(5));
    }

    #[test]
    fn test_row_keys_differ() {
        let a = TodoEntity::new("TODO", "a");
        let b = TodoEntity::new("TODO", "b");
        assert_ne!(a.row_key, b.row_key);
    }

    #[test]
    fn test_table_mapping_uses_canonical_property_names() {
        let row = TodoEntity::new("TODO", "walk dog").to_table_entity();

        assert_eq!(
            row.property(TodoEntity::IS_COMPLETED),
            Some(&Value::Bool(false))
        );
        assert_eq!(
            row.property(TodoEntity::TASK_DESCRIPTION),
            Some(&Value::String("walk dog".to_string()))
        );
        assert!(row.property(TodoEntity::CREATE_TIME).is_some());
    }

    #[test]
    fn test_json_field_matches_table_property() {
        let todo = TodoEntity::new("TODO", "walk dog");
        let json = serde_json::to_value(&todo).unwrap();
        assert!(json.get(TodoEntity::IS_COMPLETED).is_some());
        assert!(json.get(TodoEntity::TASK_DESCRIPTION).is_some());
        assert!(json.get(TodoEntity::CREATE_TIME).is_some());
        assert!(json.get("eTag").is_none());
    }

    #[test]
    fn test_table_mapping_back() {
        let mut todo = TodoEntity::new("TODO", "walk dog");
        todo.is_completed = true;

        let mut row = todo.to_table_entity();
        row.etag = Some("W/\"7\"".to_string());

        let back = TodoEntity::try_from(row).unwrap();
        assert_eq!(back.row_key, todo.row_key);
        assert_eq!(back.create_time, todo.create_time);
        assert!(back.is_completed);
        assert_eq!(back.etag.as_deref(), Some("W/\"7\""));
    }

    #[test]
    fn test_table_mapping_missing_description_fails() {
        let row = TableEntity::new("TODO", "x")
            .with_property(TodoEntity::CREATE_TIME, Utc::now().to_rfc3339());
        let result = TodoEntity::try_from(row);
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_table_mapping_missing_flag_reads_incomplete() {
        let row = TableEntity::new("TODO", "x")
            .with_property(TodoEntity::CREATE_TIME, Utc::now().to_rfc3339())
            .with_property(TodoEntity::TASK_DESCRIPTION, "legacy");
        let todo = TodoEntity::try_from(row).unwrap();
        assert!(!todo.is_completed);
    }
}
