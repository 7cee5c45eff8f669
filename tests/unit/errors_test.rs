use markshelf::types::errors::*;

// === StoreError Tests ===

#[test]
fn store_error_not_found_display() {
    let err = StoreError::not_found("Bookmark", 42);
    assert_eq!(err.to_string(), "Bookmark not found: 42");
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn store_error_validation_display() {
    let err = StoreError::validation("title must not be empty");
    assert_eq!(err.to_string(), "Validation failed: title must not be empty");
    assert_eq!(err.kind(), "validation");
}

#[test]
fn store_error_cycle_display() {
    let err = StoreError::Cycle {
        folder_id: 1,
        parent_id: 3,
    };
    assert_eq!(
        err.to_string(),
        "Moving folder 1 under folder 3 would create a cycle"
    );
    assert_eq!(err.kind(), "cycle");
}

#[test]
fn store_error_has_children_display() {
    let err = StoreError::HasChildren {
        folder_id: 7,
        children: 2,
    };
    assert_eq!(err.to_string(), "Folder 7 still has 2 subfolder(s)");
    assert_eq!(err.kind(), "has_children");
}

#[test]
fn store_error_unavailable_display() {
    let err = StoreError::Unavailable("connection refused".to_string());
    assert_eq!(err.to_string(), "Storage unavailable: connection refused");
    assert_eq!(err.kind(), "unavailable");
}

#[test]
fn store_error_from_rusqlite_is_unavailable() {
    let err: StoreError = rusqlite::Error::InvalidQuery.into();
    assert!(matches!(err, StoreError::Unavailable(_)));
}

#[test]
fn store_error_from_serde_json_is_unavailable() {
    let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: StoreError = parse.into();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(err.to_string().contains("malformed stored data"));
}

#[test]
fn store_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(StoreError::not_found("Folder", 1));
    assert!(err.source().is_none());
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::Io("disk full".to_string()).to_string(),
        "Settings I/O error: disk full"
    );
    assert_eq!(
        SettingsError::Serialization("bad json".to_string()).to_string(),
        "Settings serialization error: bad json"
    );
    assert_eq!(
        SettingsError::InvalidKey("nope".to_string()).to_string(),
        "Invalid settings key: nope"
    );
    assert_eq!(
        SettingsError::InvalidValue("wrong type".to_string()).to_string(),
        "Invalid settings value: wrong type"
    );
}
