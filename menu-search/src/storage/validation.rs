//! Catalogue-wide validation

use std::collections::{HashMap, HashSet};

use crate::models::MenuEntry;

use super::errors::{StorageError, StorageResult};

/// Check every entry and the relations between entries.
///
/// Rules: each entry is valid on its own, ids are unique, every parent
/// exists, and following parent links never loops.
pub fn validate_catalogue(entries: &[MenuEntry]) -> StorageResult<()> {
    let mut by_id: HashMap<&str, &MenuEntry> = HashMap::with_capacity(entries.len());

    for entry in entries {
        entry.validate().map_err(StorageError::Validation)?;
        if by_id.insert(entry.id.as_str(), entry).is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "duplicate entry id '{}'",
                entry.id
            )));
        }
    }

    for entry in entries {
        if let Some(parent) = entry.parent_id.as_deref()
            && !by_id.contains_key(parent)
        {
            return Err(StorageError::Validation(format!(
                "entry '{}' references missing parent '{}'",
                entry.id, parent
            )));
        }
    }

    for entry in entries {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(entry.id.as_str());
        let mut current = entry.parent_id.as_deref();
        while let Some(id) = current {
            if !seen.insert(id) {
                return Err(StorageError::Validation(format!(
                    "parent cycle through entry '{}'",
                    entry.id
                )));
            }
            current = by_id.get(id).and_then(|e| e.parent_id.as_deref());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, parent: Option<&str>) -> MenuEntry {
        let builder = MenuEntry::builder(id, format!("Entry {id}")).keyword("k");
        match parent {
            Some(p) => builder.parent(p).build(),
            None => builder.build(),
        }
    }

    #[test]
    fn test_valid_tree() {
        let entries = vec![entry("root", None), entry("a", Some("root")), entry("b", Some("a"))];
        assert!(validate_catalogue(&entries).is_ok());
    }

    #[test]
    fn test_duplicate_id() {
        let entries = vec![entry("a", None), entry("a", None)];
        assert!(matches!(
            validate_catalogue(&entries),
            Err(StorageError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_missing_parent() {
        let entries = vec![entry("a", Some("ghost"))];
        assert!(matches!(
            validate_catalogue(&entries),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_multi_hop_cycle() {
        let entries = vec![
            entry("a", Some("c")),
            entry("b", Some("a")),
            entry("c", Some("b")),
        ];
        let err = validate_catalogue(&entries).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_invalid_entry() {
        let mut bad = entry("a", None);
        bad.keywords.clear();
        assert!(validate_catalogue(&[bad]).is_err());
    }
}
