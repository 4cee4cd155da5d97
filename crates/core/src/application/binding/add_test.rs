//! Unit tests for add validation

use super::*;
use crate::error::AppError;

#[test]
fn test_validate_path_empty() {
    let req = AddRequest::new("", Moment::UserLogon, false);

    let result = validate_request(&req);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("empty"));
}

#[test]
fn test_validate_path_relative() {
    let req = AddRequest::new("scripts/backup.ps1", Moment::UserLogon, false);

    let result = validate_request(&req);
    assert!(result.unwrap_err().to_string().contains("absolute"));
}

#[test]
fn test_validate_blank_name() {
    let mut req = AddRequest::new("/s/backup.ps1", Moment::UserLogon, false);
    req.name = Some("   ".to_string());

    assert!(validate_request(&req).is_err());
}

#[test]
fn test_execute_derives_name() {
    let mut registry = Registry::new();
    let req = AddRequest::new("/s/nightly-backup.ps1", Moment::BeforeShutdown, true);

    let binding = execute(&mut registry, req).unwrap();

    assert_eq!(binding.name, "nightly-backup");
    assert!(binding.elevated);
    assert!(binding.enabled);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_execute_explicit_name() {
    let mut registry = Registry::new();
    let mut req = AddRequest::new("/s/run.bat", Moment::UserLogon, false);
    req.name = Some("mount-shares".to_string());

    let binding = execute(&mut registry, req).unwrap();

    assert_eq!(binding.job_name(), "Script_mount-shares_user-logon");
}

#[test]
fn test_execute_duplicate_rejected() {
    let mut registry = Registry::new();
    execute(
        &mut registry,
        AddRequest::new("/s/backup.ps1", Moment::UserLogon, false),
    )
    .unwrap();

    let err = execute(
        &mut registry,
        AddRequest::new("/other/backup.bat", Moment::UserLogon, false),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        AppError::Domain(DomainError::DuplicateBinding(_))
    ));
    assert_eq!(registry.len(), 1);
}
