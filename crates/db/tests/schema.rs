use assert_matches::assert_matches;
use campus_core::catalog::CollegeTable;
use campus_db::provision::{self, AdminError};
use campus_db::repositories::college_repo::SEQUENCES;
use campus_db::repositories::CollegeRepo;
use sqlx::PgPool;

/// Connect, migrate, and find all eight college tables empty.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bootstrap(pool: PgPool) {
    campus_db::health_check(&pool).await.unwrap();

    let tables = CollegeRepo::list_tables(&pool, "public").await.unwrap();
    let mut expected: Vec<&str> = CollegeTable::ALL.iter().map(|t| t.as_str()).collect();
    expected.sort_unstable();
    assert_eq!(tables, expected);

    for count in CollegeRepo::count_all(&pool).await.unwrap() {
        assert_eq!(count.rows, 0, "{} should start empty", count.table);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sequences_start_values(pool: PgPool) {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT sequencename::text, start_value
         FROM pg_sequences
         WHERE schemaname = 'public'
         ORDER BY sequencename",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), SEQUENCES.len());
    let start = |name: &str| {
        rows.iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
            .unwrap_or_else(|| panic!("sequence {name} missing"))
    };
    assert_eq!(start("seq_student_id"), 10101);
    assert_eq!(start("seq_enroll_id"), 5001);
    assert_eq!(start("seq_attendance_id"), 8001);
    assert_eq!(start("seq_result_id"), 9001);
    assert_eq!(start("seq_receipt_id"), 7001);
    assert_eq!(start("seq_activity_id"), 6001);
}

/// Every foreign key column gets an index, plus the two date lookups.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_indexes_present(pool: PgPool) {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT indexname::text
         FROM pg_indexes
         WHERE schemaname = 'public' AND indexname LIKE 'idx\\_%'
         ORDER BY indexname",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    let names: Vec<&str> = rows.iter().map(|(n,)| n.as_str()).collect();
    assert_eq!(names.len(), 12, "got {names:?}");
    assert!(names.contains(&"idx_attend_date"));
    assert!(names.contains(&"idx_fees_date"));
}

/// Child tables cascade on delete of their parent.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_child_foreign_keys_cascade(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT tc.table_name::text, rc.delete_rule::text
         FROM information_schema.table_constraints tc
         JOIN information_schema.referential_constraints rc
           ON rc.constraint_name = tc.constraint_name
         WHERE tc.constraint_type = 'FOREIGN KEY'
           AND tc.table_schema = 'public'
           AND tc.table_name IN ('enrollments', 'attendance', 'results', 'fees', 'activities')",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, rule) in &rows {
        assert_eq!(rule, "CASCADE", "{table} foreign key should cascade");
    }
}

/// Dropping and re-running migrations leaves the same eight tables.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rebuild_schema_is_repeatable(pool: PgPool) {
    let first = provision::rebuild_schema(&pool, "public")
        .await
        .unwrap();
    let second = provision::rebuild_schema(&pool, "public")
        .await
        .unwrap();
    assert_eq!(first.len(), 8);
    assert_eq!(first, second);
}

/// Rebuilding into another schema puts the tables, sequences and migration
/// history there and leaves `public` alone.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rebuild_schema_in_named_schema(pool: PgPool) {
    sqlx::query("CREATE SCHEMA college").execute(&pool).await.unwrap();

    let tables = provision::rebuild_schema(&pool, "college").await.unwrap();
    assert_eq!(tables.len(), 8);
    assert_eq!(CollegeRepo::list_tables(&pool, "public").await.unwrap().len(), 8);

    let (sequences,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM pg_sequences WHERE schemaname = 'college'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(sequences as usize, SEQUENCES.len());

    let (history,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM pg_tables
                        WHERE schemaname = 'college' AND tablename = '_sqlx_migrations')",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(history);

    // The pinned search_path stays on the rebuild connection.
    let (path,): (String,) = sqlx::query_as("SHOW search_path")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!path.starts_with("college"), "{path}");
}

/// College tables owned by someone else block the rebuild instead of
/// failing halfway through the drops.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rebuild_schema_refuses_foreign_tables(pool: PgPool) {
    let owner = "campus_it_owner";
    for statement in [
        format!("CREATE ROLE {owner} NOLOGIN"),
        "CREATE SCHEMA shared_campus".to_string(),
        "CREATE TABLE shared_campus.students (student_id BIGINT)".to_string(),
        format!("ALTER TABLE shared_campus.students OWNER TO {owner}"),
    ] {
        sqlx::query(&statement).execute(&pool).await.unwrap();
    }

    let err = provision::rebuild_schema(&pool, "shared_campus")
        .await
        .unwrap_err();
    assert_matches!(
        &err,
        AdminError::ForeignTables { owner: o, tables, .. }
            if o == owner && tables == &["students".to_string()]
    );
    assert!(err.to_string().contains("fix-access"));

    let (still_there,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shared_campus.students")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(still_there, 0);

    sqlx::query("DROP SCHEMA shared_campus CASCADE")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(&format!("DROP ROLE {owner}"))
        .execute(&pool)
        .await
        .unwrap();
}

/// Truncation also restarts the standalone id sequences.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_truncate_restarts_sequences(pool: PgPool) {
    for _ in 0..3 {
        sqlx::query("SELECT nextval('seq_student_id')")
            .execute(&pool)
            .await
            .unwrap();
    }

    CollegeRepo::truncate_all(&pool).await.unwrap();

    let (next,): (i64,) = sqlx::query_as("SELECT nextval('seq_student_id')")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(next, 10101);
}
