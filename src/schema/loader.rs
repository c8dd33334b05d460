//! Filter loader - parses filter definition files

use anyhow::{Context, Result};
use std::path::Path;

use super::FilterSpec;

/// Load and validate a filter definition (YAML or JSON)
pub fn load_filter(path: &Path) -> Result<FilterSpec> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read filter file: {}", path.display()))?;

    let spec: FilterSpec = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse filter file: {}", path.display()))?;

    spec.validate()
        .with_context(|| format!("Invalid filter file: {}", path.display()))?;

    Ok(spec)
}

/// Write a commented example filter
pub fn create_example_filter(path: &Path) -> Result<()> {
    let example = r#"# qfilter filter definition
#
# Each field carries a query tag: type:<op>;column:<name>;table:<name>
# Operators: eq gt gte lt lte in like left right ilike ileft iright
#            isnull isnotnull order join

table: users
fields:
  - name: userName
    query: "type:like"
    value: bob

  - name: status
    query: "type:in"
    value: [1, 2]

  - name: sort
    query: "type:order;column:id"
    value: "order[createdAt]=desc"

  # Joined table, filtered by its own fields
  - name: orders
    query: "type:join;join:orders;on:user_id,id"
    filter:
      fields:
        - name: total
          query: "type:gte"
          value: 10
"#;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, example)
        .with_context(|| format!("Failed to write filter file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Filter;
    use tempfile::tempdir;

    #[test]
    fn test_load_example_filter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filters").join("users.yaml");
        create_example_filter(&path).unwrap();

        let spec = load_filter(&path).unwrap();
        assert_eq!(spec.table, "users");
        assert_eq!(spec.fields.len(), 4);
        assert!(!spec.is_empty());
    }

    #[test]
    fn test_load_json_filter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"{"table": "users", "fields": [{"name": "id", "query": "type:eq", "value": 7}]}"#,
        )
        .unwrap();

        let spec = load_filter(&path).unwrap();
        assert_eq!(spec.fields[0].name, "id");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_filter(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read filter file"));
    }

    #[test]
    fn test_load_rejects_invalid_structure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(
            &path,
            "table: t\nfields:\n  - name: x\n    value: 1\n    filter:\n      fields: []\n",
        )
        .unwrap();

        let err = load_filter(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid filter file"));
    }
}
