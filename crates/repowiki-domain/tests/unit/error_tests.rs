//! Unit tests for domain error types

use repowiki_domain::{DiagramParseError, Error};

#[test]
fn test_not_found_error() {
    let error = Error::not_found("version 2");
    match error {
        Error::NotFound { resource } => assert_eq!(resource, "version 2"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_conflict_error() {
    let error = Error::conflict("abc", 3, 3);
    match &error {
        Error::Conflict {
            repository,
            expected,
            found,
        } => {
            assert_eq!(repository, "abc");
            assert_eq!(*expected, 3);
            assert_eq!(*found, 3);
        }
        _ => panic!("Expected Conflict error"),
    }
    assert!(error.is_retryable());
    assert!(error.is_conflict());
    assert!(error.to_string().contains("expected next version 3"));
}

#[test]
fn test_capture_error_with_source() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error = Error::capture_with_source("cannot read src/lib.rs", io);
    match &error {
        Error::Capture { message, source } => {
            assert_eq!(message, "cannot read src/lib.rs");
            assert!(source.is_some());
        }
        _ => panic!("Expected Capture error"),
    }
    assert!(!error.is_retryable());
}

#[test]
fn test_generation_error() {
    let error = Error::generation("stream closed");
    match error {
        Error::Generation { message, source } => {
            assert_eq!(message, "stream closed");
            assert!(source.is_none());
        }
        _ => panic!("Expected Generation error"),
    }
}

#[test]
fn test_io_error_from_std() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let error: Error = io.into();
    assert!(matches!(error, Error::IoSimple { .. }));
}

#[test]
fn test_json_error_from_serde() {
    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = parse.into();
    assert!(matches!(error, Error::Json { .. }));
}

#[test]
fn test_diagram_parse_error_display() {
    let with_line = DiagramParseError::at_line(4, "unbalanced bracket");
    assert_eq!(with_line.to_string(), "line 4: unbalanced bracket");

    let without_line = DiagramParseError::new("empty diagram");
    assert_eq!(without_line.to_string(), "empty diagram");
}
