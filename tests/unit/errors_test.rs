use extra_bars::types::errors::*;

// === BarError Tests ===

#[test]
fn bar_error_not_found_display() {
    assert_eq!(BarError::BarNotFound("7".to_string()).to_string(), "Bar not found: 7");
    assert_eq!(
        BarError::BookmarkNotFound("b-1".to_string()).to_string(),
        "Bookmark not found: b-1"
    );
}

#[test]
fn bar_error_last_bar_message_is_user_facing() {
    assert_eq!(BarError::LastBar.to_string(), "You must have at least one bookmark bar");
}

#[test]
fn bar_error_invalid_url_names_the_input() {
    let msg = BarError::InvalidUrl("ftp://x".to_string()).to_string();
    assert!(msg.starts_with("Please enter a valid URL"));
    assert!(msg.ends_with("ftp://x"));
}

#[test]
fn bar_error_stale_classification() {
    assert!(BarError::BarNotFound("1".into()).is_stale());
    assert!(BarError::BookmarkNotFound("1".into()).is_stale());
    assert!(!BarError::LastBar.is_stale());
    assert!(!BarError::InvalidUrl("x".into()).is_stale());
}

#[test]
fn bar_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(BarError::LastBar);
    assert!(err.source().is_none());
}

// === StorageError Tests ===

#[test]
fn storage_error_display_variants() {
    assert_eq!(
        StorageError::Unavailable("offline".to_string()).to_string(),
        "Storage unavailable: offline"
    );
    assert_eq!(
        StorageError::Serialization("bad json".to_string()).to_string(),
        "Storage serialization error: bad json"
    );
    assert_eq!(
        StorageError::Database("locked".to_string()).to_string(),
        "Storage database error: locked"
    );
}

#[test]
fn storage_error_from_serde_json() {
    let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
    let err: StorageError = json_err.into();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[test]
fn storage_error_from_rusqlite() {
    let err: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, StorageError::Database(_)));
}

// === ConfigError Tests ===

#[test]
fn config_error_display_variants() {
    assert_eq!(
        ConfigError::IoError("denied".to_string()).to_string(),
        "Config I/O error: denied"
    );
    assert_eq!(
        ConfigError::SerializationError("eof".to_string()).to_string(),
        "Config serialization error: eof"
    );
    assert_eq!(
        ConfigError::InvalidKey("a.b".to_string()).to_string(),
        "Invalid config key: a.b"
    );
    assert_eq!(
        ConfigError::InvalidValue("not a number".to_string()).to_string(),
        "Invalid config value: not a number"
    );
}

// === MessageError Tests ===

#[test]
fn message_error_display_variants() {
    assert_eq!(
        MessageError::UnknownAction("fly".to_string()).to_string(),
        "Unknown action: fly"
    );
    assert_eq!(
        MessageError::Malformed("missing action".to_string()).to_string(),
        "Malformed message: missing action"
    );
    assert_eq!(MessageError::NoBarSelected.to_string(), "Choose a bar for this link");
}

#[test]
fn message_error_wraps_domain_errors_verbatim() {
    let err: MessageError = BarError::LastBar.into();
    assert_eq!(err, MessageError::Rejected("You must have at least one bookmark bar".to_string()));

    let err: MessageError = StorageError::Unavailable("offline".to_string()).into();
    assert_eq!(err.to_string(), "Storage unavailable: offline");
}
