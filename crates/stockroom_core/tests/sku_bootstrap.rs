use stockroom_core::db::{open_db, open_db_in_memory};
use stockroom_core::{
    bootstrap_allocator, AllocError, BootstrapError, NewPart, OverflowPolicy, PartRepository,
    PartService, RepoError, RepoResult, SkuCounterStore, SkuFormat, SkuParseError,
    SqlitePartRepository,
};
use rusqlite::Connection;
use std::sync::Arc;

struct FixedStore(Option<&'static str>);

impl SkuCounterStore for FixedStore {
    fn max_issued_sku(&self) -> RepoResult<Option<String>> {
        Ok(self.0.map(str::to_string))
    }
}

struct UnreachableStore;

impl SkuCounterStore for UnreachableStore {
    fn max_issued_sku(&self) -> RepoResult<Option<String>> {
        Err(RepoError::InvalidData("connection refused".to_string()))
    }
}

fn insert_raw_sku(conn: &Connection, uuid: &str, sku: &str) {
    conn.execute(
        "INSERT INTO parts (uuid, sku, name) VALUES (?1, ?2, 'seeded');",
        [uuid, sku],
    )
    .unwrap();
}

#[test]
fn empty_store_starts_at_one() {
    let allocator = bootstrap_allocator(&FixedStore(None), SkuFormat::default()).unwrap();
    assert_eq!(allocator.next_counter(), 1);
    assert_eq!(allocator.allocate().unwrap().as_str(), "PC-000001");
}

#[test]
fn existing_maximum_is_continued() {
    let allocator =
        bootstrap_allocator(&FixedStore(Some("PC-000042")), SkuFormat::default()).unwrap();
    assert_eq!(allocator.allocate().unwrap().as_str(), "PC-000043");
}

#[test]
fn non_numeric_suffix_fails_bootstrap() {
    let result = bootstrap_allocator(&FixedStore(Some("PC-XYZYZ")), SkuFormat::default());

    match result {
        Err(BootstrapError::Parse { value, reason }) => {
            assert_eq!(value, "PC-XYZYZ");
            assert_eq!(reason, SkuParseError::NonNumericSuffix);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("malformed stored sku must not produce an allocator"),
    }
}

#[test]
fn wrong_prefix_fails_bootstrap() {
    let result = bootstrap_allocator(&FixedStore(Some("AB-000042")), SkuFormat::default());
    assert!(matches!(
        result,
        Err(BootstrapError::Parse {
            reason: SkuParseError::WrongPrefix { .. },
            ..
        })
    ));
}

#[test]
fn store_failure_fails_bootstrap() {
    let result = bootstrap_allocator(&UnreachableStore, SkuFormat::default());
    assert!(matches!(result, Err(BootstrapError::StoreUnavailable(_))));
}

#[test]
fn sqlite_store_reports_maximum_sku() {
    let conn = open_db_in_memory().unwrap();
    insert_raw_sku(&conn, "00000000-0000-4000-8000-000000000001", "PC-000007");
    insert_raw_sku(&conn, "00000000-0000-4000-8000-000000000002", "PC-000042");
    insert_raw_sku(&conn, "00000000-0000-4000-8000-000000000003", "PC-000013");

    let repo = SqlitePartRepository::try_new(&conn).unwrap();
    assert_eq!(repo.max_issued_sku().unwrap().as_deref(), Some("PC-000042"));

    let allocator = bootstrap_allocator(&repo, SkuFormat::default()).unwrap();
    assert_eq!(allocator.allocate().unwrap().as_str(), "PC-000043");
}

#[test]
fn sqlite_store_with_malformed_row_fails_bootstrap() {
    let conn = open_db_in_memory().unwrap();
    insert_raw_sku(&conn, "00000000-0000-4000-8000-000000000001", "PC-XYZYZ");

    let repo = SqlitePartRepository::try_new(&conn).unwrap();
    assert!(matches!(
        bootstrap_allocator(&repo, SkuFormat::default()),
        Err(BootstrapError::Parse { .. })
    ));
}

#[test]
fn soft_deleted_parts_still_count_as_issued() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::try_new(&conn).unwrap();
    let allocator = Arc::new(bootstrap_allocator(&repo, SkuFormat::default()).unwrap());
    let service = PartService::new(repo, Arc::clone(&allocator));

    service.create_part(NewPart::named("first")).unwrap();
    let last = service.create_part(NewPart::named("second")).unwrap();
    service.soft_delete_part(last.id).unwrap();

    let repo = SqlitePartRepository::try_new(&conn).unwrap();
    let restarted = bootstrap_allocator(&repo, SkuFormat::default()).unwrap();
    assert_eq!(restarted.allocate().unwrap().as_str(), "PC-000003");
}

#[test]
fn restart_continues_after_persisted_parts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parts.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let repo = SqlitePartRepository::try_new(&conn).unwrap();
        let allocator = Arc::new(bootstrap_allocator(&repo, SkuFormat::default()).unwrap());
        let service = PartService::new(repo, allocator);
        for name in ["gear", "spring", "axle"] {
            service.create_part(NewPart::named(name)).unwrap();
        }
        // Allocated but never persisted, so the next bootstrap cannot see it.
        service.allocator().allocate().unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqlitePartRepository::try_new(&conn).unwrap();
    let allocator = bootstrap_allocator(&repo, SkuFormat::default()).unwrap();
    assert_eq!(allocator.allocate().unwrap().as_str(), "PC-000004");

    let stored = repo.list_parts(&Default::default()).unwrap();
    assert_eq!(stored.len(), 3);
}

#[test]
fn widened_skus_are_continued_numerically() {
    let conn = open_db_in_memory().unwrap();
    insert_raw_sku(&conn, "00000000-0000-4000-8000-000000000001", "PC-999999");
    insert_raw_sku(&conn, "00000000-0000-4000-8000-000000000002", "PC-1000000");

    let repo = SqlitePartRepository::try_new(&conn).unwrap();
    let allocator = bootstrap_allocator(&repo, SkuFormat::default()).unwrap();
    assert_eq!(allocator.allocate().unwrap().as_str(), "PC-1000001");
}

#[test]
fn reject_policy_refuses_widened_history() {
    let format = SkuFormat::new("PC-", 6, OverflowPolicy::Reject).unwrap();
    let result = bootstrap_allocator(&FixedStore(Some("PC-1000000")), format);
    assert!(matches!(
        result,
        Err(BootstrapError::Parse {
            reason: SkuParseError::WrongWidth {
                expected: 6,
                actual: 7
            },
            ..
        })
    ));
}

#[test]
fn reject_policy_exhausts_after_last_fixed_width_value() {
    let format = SkuFormat::new("PC-", 6, OverflowPolicy::Reject).unwrap();
    let allocator = bootstrap_allocator(&FixedStore(Some("PC-999998")), format).unwrap();

    assert_eq!(allocator.allocate().unwrap().as_str(), "PC-999999");
    assert_eq!(
        allocator.allocate().unwrap_err(),
        AllocError::Exhausted {
            last_issuable: 999_999
        }
    );
}
