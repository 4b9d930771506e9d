// file: tests/records_test.rs
// version: 1.0.0
// guid: f29d7c14-3b85-4e6a-9c01-d8a4e7b25f63

//! Validated record writer behaviour at the filesystem boundary

mod common;

use common::is_root;
use deploylib::config::{RECORD_FILE_MODE, SUPERUSER_GID, SUPERUSER_UID};
use deploylib::writeexts::{
    write_from_dict, AcceptAll, DigitsOnly, OwnershipPolicy, RecordWriter,
};
use deploylib::DeployError;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use tempfile::TempDir;

fn fruit() -> HashMap<&'static str, &'static str> {
    HashMap::from([("x", "banana"), ("y", "apple")])
}

#[test]
fn test_write_from_dict_applies_superuser_policy() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hosts.list");

    // Act
    let result = write_from_dict(&path, fruit(), &AcceptAll);

    // Assert
    if is_root() {
        result.unwrap();
        let metadata = fs::metadata(&path).unwrap();
        assert_eq!(metadata.uid(), SUPERUSER_UID);
        assert_eq!(metadata.gid(), SUPERUSER_GID);
        assert_eq!(metadata.permissions().mode() & 0o7777, RECORD_FILE_MODE);
        assert_eq!(fs::read_to_string(&path).unwrap(), "apple\nbanana\n");
    } else {
        let err = result.unwrap_err();
        assert!(err.is_permission(), "unexpected error: {}", err);
        assert!(!path.exists());
    }
}

#[test]
fn test_permission_failure_leaves_existing_file_unmodified() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hosts.list");
    fs::write(&path, "old\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

    // Act
    let result = write_from_dict(&path, [("k", "new")], &AcceptAll);

    // Assert
    if is_root() {
        result.unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    } else {
        assert!(result.unwrap_err().is_permission());
        assert_eq!(fs::read(&path).unwrap(), b"old\n".to_vec());
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o600);
    }
}

#[test]
fn test_foreign_owner_policy_is_refused_up_front() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records");
    if is_root() {
        return;
    }
    let policy = OwnershipPolicy {
        uid: SUPERUSER_UID,
        ..OwnershipPolicy::current_user(RECORD_FILE_MODE)
    };

    let err = RecordWriter::new(policy)
        .write(&path, [("k", "v")], &AcceptAll)
        .unwrap_err();

    assert!(err.to_string().contains("requires superuser privilege"));
    assert!(!path.exists());
}

#[test]
fn test_repeated_writes_are_deterministic() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    let writer = RecordWriter::new(OwnershipPolicy::current_user(RECORD_FILE_MODE));
    let records: BTreeMap<String, String> = (0..50)
        .map(|i| (format!("key{}", i), format!("value{:03}", (i * 37) % 50)))
        .collect();

    writer.write(&first, &records, &AcceptAll).unwrap();
    writer.write(&second, &records, &AcceptAll).unwrap();

    let content = fs::read_to_string(&first).unwrap();
    assert_eq!(content, fs::read_to_string(&second).unwrap());
    let lines: Vec<&str> = content.lines().collect();
    let mut sorted = lines.clone();
    sorted.sort();
    assert_eq!(lines, sorted);
    assert_eq!(lines.len(), 50);
}

#[test]
fn test_failed_validation_leaves_existing_file_unchanged() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ports");
    fs::write(&path, "22\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
    let records = HashMap::from([("http", "80"), ("https", "443"), ("bogus", "80a")]);

    // Act
    let err = write_from_dict(&path, &records, &DigitsOnly).unwrap_err();

    // Assert
    match err {
        DeployError::Validation { key, value, .. } => {
            assert_eq!(key, "bogus");
            assert_eq!(value, "80a");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(fs::read(&path).unwrap(), b"22\n".to_vec());
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o600);
}

#[test]
fn test_failing_closure_stops_before_file_creation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("never");
    let reject_all = |key: &str, _value: &str| Err::<(), String>(format!("{} is not allowed", key));

    let err = write_from_dict(&path, fruit(), &reject_all).unwrap_err();

    // "apple" sorts first, so its key is the one reported
    assert!(matches!(err, DeployError::Validation { ref key, .. } if key == "y"));
    assert!(!path.exists());
}

#[test]
fn test_values_written_keys_omitted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records");
    let writer = RecordWriter::new(OwnershipPolicy::current_user(0o640));

    writer
        .write(&path, [("secret-key", "visible value")], &AcceptAll)
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "visible value\n");
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o640);
}
