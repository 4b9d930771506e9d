// file: src/writeexts/records.rs
// version: 1.0.0
// guid: e15d63f9-c764-4c12-9ee8-8cc86b436cdd

//! Append validated records to a file with fixed ownership and mode

use crate::config::{RecordConfig, RECORD_FILE_MODE, SUPERUSER_GID, SUPERUSER_UID};
use crate::error::{DeployError, Result};
use crate::writeexts::validators::{AcceptAll, RecordValidator};
use std::fs::{OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{fchown, MetadataExt, PermissionsExt};
use std::path::Path;
use tracing::{debug, info, warn};

/// Owner and mode applied to a record file after every successful append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipPolicy {
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
}

impl OwnershipPolicy {
    /// root:root, 0644
    pub const SUPERUSER: Self = Self {
        uid: SUPERUSER_UID,
        gid: SUPERUSER_GID,
        mode: RECORD_FILE_MODE,
    };

    /// Owned by the effective user and group of this process, keeping `mode`
    pub fn current_user(mode: u32) -> Self {
        // SAFETY: geteuid and getegid cannot fail and touch no memory.
        let (uid, gid) = unsafe { (libc::geteuid(), libc::getegid()) };
        Self { uid, gid, mode }
    }
}

/// Fail before any mutation if this process could not apply `policy` to
/// `filepath` afterwards.
///
/// The superuser may always chown. Anyone else may only keep a file they
/// already own and move it to one of their own groups.
pub fn check_ownership_privilege(filepath: &Path, policy: &OwnershipPolicy) -> Result<()> {
    // SAFETY: geteuid and getegid cannot fail and touch no memory.
    let (euid, egid) = unsafe { (libc::geteuid(), libc::getegid()) };
    if euid == SUPERUSER_UID {
        return Ok(());
    }

    let denied = |why: String| {
        warn!("Refusing to write {}: {}", filepath.display(), why);
        Err(DeployError::Permission {
            path: filepath.to_path_buf(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, why),
        })
    };

    if policy.uid != euid {
        return denied(format!(
            "changing owner to {} requires superuser privilege",
            policy.uid
        ));
    }
    if policy.gid != egid && !in_supplementary_groups(policy.gid) {
        return denied(format!("uid {} is not a member of group {}", euid, policy.gid));
    }
    match std::fs::metadata(filepath) {
        Ok(metadata) if metadata.uid() != euid => denied(format!(
            "file is owned by uid {}, not {}",
            metadata.uid(),
            euid
        )),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DeployError::from_fs(filepath, e)),
    }
}

fn in_supplementary_groups(gid: u32) -> bool {
    // SAFETY: a zero-length call only reports the group count; the second
    // call writes at most `count` entries into a buffer of that size.
    unsafe {
        let count = libc::getgroups(0, std::ptr::null_mut());
        if count <= 0 {
            return false;
        }
        let mut groups: Vec<libc::gid_t> = vec![0; count as usize];
        let filled = libc::getgroups(count, groups.as_mut_ptr());
        if filled < 0 {
            return false;
        }
        groups.truncate(filled as usize);
        groups.contains(&gid)
    }
}

impl Default for OwnershipPolicy {
    fn default() -> Self {
        Self::SUPERUSER
    }
}

impl From<&RecordConfig> for OwnershipPolicy {
    fn from(config: &RecordConfig) -> Self {
        Self {
            uid: config.owner_uid,
            gid: config.owner_gid,
            mode: config.mode,
        }
    }
}

/// Collect records ordered by the code points of their values.
///
/// The sort is stable, so equal values keep their iteration order.
pub fn sorted_records<I, K, V>(records: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut items: Vec<(String, String)> = records
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect();
    // str ordering is bytewise over UTF-8, which matches code point order
    items.sort_by(|(_, a), (_, b)| a.cmp(b));
    items
}

/// Appends record values to a file, one per line
#[derive(Debug, Clone, Default)]
pub struct RecordWriter {
    policy: OwnershipPolicy,
}

impl RecordWriter {
    pub fn new(policy: OwnershipPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> OwnershipPolicy {
        self.policy
    }

    /// Validate every record, then append the values in sorted order.
    ///
    /// Nothing is opened until all records pass and the ownership policy is
    /// known to be applicable, so either failure leaves the target
    /// untouched. Keys are only passed to `validator`.
    pub fn write<I, K, V, R>(&self, filepath: &Path, records: I, validator: &R) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
        R: RecordValidator + ?Sized,
    {
        let items = sorted_records(records);

        for (key, value) in &items {
            validator
                .validate(key, value)
                .map_err(|reason| DeployError::validation(key.as_str(), value.as_str(), reason))?;
        }
        debug!("Validated {} records for {}", items.len(), filepath.display());

        check_ownership_privilege(filepath, &self.policy)?;

        let mut buffer = String::new();
        for (_, value) in &items {
            buffer.push_str(value);
            buffer.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(filepath)
            .map_err(|e| DeployError::from_fs(filepath, e))?;

        file.write_all(buffer.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| DeployError::from_fs(filepath, e))?;

        if let Err(e) = fchown(&file, Some(self.policy.uid), Some(self.policy.gid)) {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                warn!(
                    "Cannot change owner of {} to {}:{} without privilege",
                    filepath.display(),
                    self.policy.uid,
                    self.policy.gid
                );
            }
            return Err(DeployError::from_fs(filepath, e));
        }

        file.set_permissions(Permissions::from_mode(self.policy.mode))
            .map_err(|e| DeployError::from_fs(filepath, e))?;

        info!(
            "Appended {} records to {} ({}:{} {:o})",
            items.len(),
            filepath.display(),
            self.policy.uid,
            self.policy.gid,
            self.policy.mode
        );
        Ok(())
    }
}

/// Append the values of `records` to `filepath`, sorted by value.
///
/// Every pair is checked with `validate` before the file is opened. After
/// writing, the file is owned by root:root with mode 0644.
pub fn write_from_dict<P, I, K, V, R>(filepath: P, records: I, validate: &R) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
    R: RecordValidator + ?Sized,
{
    RecordWriter::default().write(filepath.as_ref(), records, validate)
}

/// [`write_from_dict`] without validation
pub fn write_unvalidated<P, I, K, V>(filepath: P, records: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    write_from_dict(filepath, records, &AcceptAll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writeexts::validators::DigitsOnly;
    use std::collections::HashMap;
    use std::fs;

    fn is_root() -> bool {
        // SAFETY: geteuid cannot fail and touches no memory.
        unsafe { libc::geteuid() == 0 }
    }

    fn user_writer() -> RecordWriter {
        RecordWriter::new(OwnershipPolicy::current_user(RECORD_FILE_MODE))
    }

    #[test]
    fn test_sorted_records_orders_by_value() {
        let records = vec![("x", "banana"), ("y", "apple"), ("z", "Cherry")];

        let sorted = sorted_records(records);

        let values: Vec<&str> = sorted.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, vec!["Cherry", "apple", "banana"]);
    }

    #[test]
    fn test_sorted_records_uses_code_points() {
        let records = vec![("a", "\u{e9}"), ("b", "z"), ("c", "Z"), ("d", "\u{1F600}")];

        let sorted = sorted_records(records);

        let values: Vec<&str> = sorted.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, vec!["Z", "z", "\u{e9}", "\u{1F600}"]);
    }

    #[test]
    fn test_sorted_records_is_stable_for_equal_values() {
        let records = vec![("second", "same"), ("first", "same"), ("third", "a")];

        let sorted = sorted_records(records);

        assert_eq!(sorted[0].0, "third");
        assert_eq!(sorted[1].0, "second");
        assert_eq!(sorted[2].0, "first");
    }

    #[test]
    fn test_write_appends_sorted_values() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");
        fs::write(&path, "existing\n").unwrap();
        let mut records = HashMap::new();
        records.insert("x".to_string(), "banana".to_string());
        records.insert("y".to_string(), "apple".to_string());

        // Act
        user_writer().write(&path, &records, &AcceptAll).unwrap();

        // Assert
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing\napple\nbanana\n");
    }

    #[test]
    fn test_write_sets_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");

        user_writer().write(&path, [("k", "v")], &AcceptAll).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o644);
    }

    #[test]
    fn test_failed_validation_leaves_missing_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");

        let err = user_writer()
            .write(&path, [("a", "1"), ("b", "two")], &DigitsOnly)
            .unwrap_err();

        assert!(matches!(err, DeployError::Validation { ref key, .. } if key == "b"));
        assert!(!path.exists());
    }

    #[test]
    fn test_validation_runs_in_value_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");
        let seen = std::cell::RefCell::new(Vec::new());
        let validator = |key: &str, _value: &str| {
            seen.borrow_mut().push(key.to_string());
            Ok::<(), String>(())
        };

        user_writer()
            .write(&path, [("k1", "c"), ("k2", "a"), ("k3", "b")], &validator)
            .unwrap();

        assert_eq!(*seen.borrow(), vec!["k2", "k3", "k1"]);
    }

    #[test]
    fn test_empty_records_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");

        user_writer()
            .write(&path, Vec::<(String, String)>::new(), &AcceptAll)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_unprivileged_superuser_write_leaves_file_unchanged() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");
        fs::write(&path, "old\n").unwrap();

        // Act
        let result = RecordWriter::default().write(&path, [("k", "new")], &AcceptAll);

        // Assert
        if is_root() {
            result.unwrap();
            assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
        } else {
            assert!(result.unwrap_err().is_permission());
            assert_eq!(fs::read_to_string(&path).unwrap(), "old\n");
        }
    }

    #[test]
    fn test_unprivileged_superuser_write_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");
        if is_root() {
            return;
        }

        let err = write_from_dict(&path, [("k", "v")], &AcceptAll).unwrap_err();

        assert!(err.is_permission());
        assert!(!path.exists());
    }

    #[test]
    fn test_privilege_check_allows_own_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");
        let policy = OwnershipPolicy::current_user(RECORD_FILE_MODE);

        assert!(check_ownership_privilege(&path, &policy).is_ok());
        fs::write(&path, "").unwrap();
        assert!(check_ownership_privilege(&path, &policy).is_ok());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("records");

        let err = user_writer().write(&path, [("k", "v")], &AcceptAll).unwrap_err();

        assert!(matches!(err, DeployError::Io { .. }));
    }

    #[test]
    fn test_policy_from_config() {
        let config = RecordConfig::default();
        assert_eq!(OwnershipPolicy::from(&config), OwnershipPolicy::SUPERUSER);
        assert_eq!(OwnershipPolicy::default().mode, RECORD_FILE_MODE);
    }
}
