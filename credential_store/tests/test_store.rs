use credential_store::{CredentialStore, ImportSummary, RegisterOutcome, VerifyOutcome};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;
use std::thread;

#[test]
fn test_register_then_login() {
    let store = CredentialStore::open_in_memory().unwrap();

    assert_eq!(
        store.register("alice", "correct horse").unwrap(),
        RegisterOutcome::Registered
    );
    assert_eq!(
        store.verify("alice", "correct horse").unwrap(),
        VerifyOutcome::Authenticated
    );
    assert_eq!(store.user_count().unwrap(), 1);
    assert!(store.contains("alice").unwrap());
}

#[test]
fn test_wrong_password_and_unknown_user_rejected() {
    let store = CredentialStore::open_in_memory().unwrap();
    store.register("alice", "correct horse").unwrap();

    assert_eq!(
        store.verify("alice", "battery staple").unwrap(),
        VerifyOutcome::Rejected
    );
    assert_eq!(
        store.verify("bob", "correct horse").unwrap(),
        VerifyOutcome::Rejected
    );
}

#[test]
fn test_duplicate_username_does_not_overwrite() {
    let store = CredentialStore::open_in_memory().unwrap();

    store.register("alice", "first").unwrap();
    assert_eq!(
        store.register("alice", "second").unwrap(),
        RegisterOutcome::UsernameTaken
    );

    assert_eq!(store.user_count().unwrap(), 1);
    assert_eq!(store.verify("alice", "first").unwrap(), VerifyOutcome::Authenticated);
    assert_eq!(store.verify("alice", "second").unwrap(), VerifyOutcome::Rejected);
}

#[test]
fn test_empty_fields_are_invalid() {
    let store = CredentialStore::open_in_memory().unwrap();

    assert_eq!(store.register("", "pw").unwrap(), RegisterOutcome::InvalidInput);
    assert_eq!(store.register("   ", "pw").unwrap(), RegisterOutcome::InvalidInput);
    assert_eq!(store.register("carol", "").unwrap(), RegisterOutcome::InvalidInput);
    assert_eq!(store.user_count().unwrap(), 0);
}

#[test]
fn test_usernames_are_trimmed() {
    let store = CredentialStore::open_in_memory().unwrap();

    store.register("  dave ", "pw").unwrap();
    assert!(store.contains("dave").unwrap());
    assert_eq!(store.verify("dave", "pw").unwrap(), VerifyOutcome::Authenticated);
}

#[test]
fn test_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.db");

    {
        let store = CredentialStore::open(&path).unwrap();
        store.register("erin", "hunter2").unwrap();
    }

    let store = CredentialStore::open(&path).unwrap();
    assert_eq!(store.user_count().unwrap(), 1);
    assert_eq!(store.verify("erin", "hunter2").unwrap(), VerifyOutcome::Authenticated);

    // Only the hash is on disk
    let raw = std::fs::read(&path).unwrap();
    assert!(!raw.windows(7).any(|w| w == b"hunter2"));
}

#[test]
fn test_concurrent_registration_keeps_one_winner() {
    let store = Arc::new(CredentialStore::open_in_memory().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.register("frank", &format!("pw{}", i)).unwrap())
        })
        .collect();

    let outcomes: Vec<RegisterOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = outcomes
        .iter()
        .filter(|o| **o == RegisterOutcome::Registered)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(store.user_count().unwrap(), 1);
}

#[test]
fn test_import_legacy_csv() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "username,password").unwrap();
    writeln!(file, "alice,pw1").unwrap();
    writeln!(file, "bob,1234").unwrap();
    writeln!(file, "alice,other").unwrap();
    writeln!(file, ",nopass").unwrap();
    file.flush().unwrap();

    let store = CredentialStore::open_in_memory().unwrap();
    let summary = store.import_legacy_csv(file.path()).unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            imported: 2,
            skipped: 2
        }
    );
    assert_eq!(store.verify("bob", "1234").unwrap(), VerifyOutcome::Authenticated);
    assert_eq!(store.verify("alice", "pw1").unwrap(), VerifyOutcome::Authenticated);
}
