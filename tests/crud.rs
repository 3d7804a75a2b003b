mod common;

use common::{MockExecutor, User};
use mantle::{Entity, Schema, Value, execute_cud, field_binding};

#[tokio::test]
async fn insert_generates_sql_and_captures_key() {
    common::init_logs();
    let mut executor = MockExecutor::new("MySQL");
    executor.last_affected_id = Some(42);
    let mut user = User {
        id: None,
        name: Some("Ann".to_owned()),
        age: 30,
    };
    let affected = User::insert_one(&mut executor, &mut user).await.unwrap();
    assert_eq!(affected, 1);
    let statement = &executor.executed[0];
    assert_eq!(
        statement.sql,
        "INSERT INTO user (name, age) VALUES (:name, :age)"
    );
    assert_eq!(statement.params[0].name, "name");
    assert_eq!(statement.params[0].value, Value::Varchar(Some("Ann".into())));
    assert_eq!(statement.params[1].name, "age");
    assert_eq!(statement.params[1].value, Value::Int32(Some(30)));
    assert_eq!(user.id, Some(42));
}

#[tokio::test]
async fn insert_never_lists_the_id_column() {
    let mut executor = MockExecutor::new("MySQL");
    executor.last_affected_id = Some(99);
    let mut user = User {
        id: Some(7),
        name: Some("Bob".to_owned()),
        age: 41,
    };
    User::insert_one(&mut executor, &mut user).await.unwrap();
    let statement = &executor.executed[0];
    assert!(!statement.sql.contains("id"));
    // The id was already set by the caller, the reported key is ignored.
    assert_eq!(user.id, Some(7));
}

#[tokio::test]
async fn insert_many_builds_one_multi_row_statement() {
    let mut executor = MockExecutor::new("MySQL");
    executor.rows_affected = 2;
    let users = vec![
        User {
            id: None,
            name: Some("Ann".to_owned()),
            age: 30,
        },
        User {
            id: None,
            name: None,
            age: 25,
        },
    ];
    let affected = User::insert_many(&mut executor, &users).await.unwrap();
    assert_eq!(affected, 2);
    let statement = &executor.executed[0];
    assert_eq!(
        statement.sql,
        "INSERT INTO user (name, age) VALUES (:e0_name, :e0_age), (:e1_name, :e1_age)"
    );
    assert_eq!(statement.params.len(), 4);
    assert_eq!(statement.params[2].name, "e1_name");
    assert_eq!(statement.params[2].value, Value::Varchar(None));
}

#[tokio::test]
async fn insert_many_of_nothing_is_a_noop() {
    let mut executor = MockExecutor::new("MySQL");
    let affected = User::insert_many(&mut executor, &[]).await.unwrap();
    assert_eq!(affected, 0);
    assert!(executor.executed.is_empty());
}

#[tokio::test]
async fn delete_keys_on_the_id() {
    let mut executor = MockExecutor::new("MySQL");
    let user = User {
        id: Some(5),
        name: None,
        age: 0,
    };
    User::delete_one(&mut executor, &user).await.unwrap();
    let statement = &executor.executed[0];
    assert_eq!(statement.sql, "DELETE FROM user WHERE id = :id");
    assert_eq!(statement.params[0].value, Value::Int64(Some(5)));
}

#[tokio::test]
async fn update_skips_null_and_empty_columns_by_default() {
    let mut executor = MockExecutor::new("MySQL");
    let user = User {
        id: Some(5),
        name: None,
        age: 30,
    };
    User::update(&mut executor, &user).await.unwrap();
    let statement = &executor.executed[0];
    assert_eq!(statement.sql, "UPDATE user SET age = :age WHERE id = :id");

    let user = User {
        id: Some(5),
        name: Some(String::new()),
        age: 30,
    };
    User::update(&mut executor, &user).await.unwrap();
    let statement = &executor.executed[1];
    assert_eq!(statement.sql, "UPDATE user SET age = :age WHERE id = :id");
}

#[tokio::test]
async fn update_can_write_nulls_when_asked() {
    let mut executor = MockExecutor::new("MySQL");
    let user = User {
        id: Some(5),
        name: None,
        age: 30,
    };
    User::update_one(&mut executor, &user, false, false)
        .await
        .unwrap();
    let statement = &executor.executed[0];
    assert_eq!(
        statement.sql,
        "UPDATE user SET name = :name, age = :age WHERE id = :id"
    );
    assert_eq!(statement.params[0].value, Value::Varchar(None));
}

#[derive(Debug, Default, Clone)]
struct Tag {
    id: Option<i64>,
    label: Option<String>,
}

impl Entity for Tag {
    fn schema() -> Schema<Self> {
        Schema::new(Tag::default)
            .table("tag")
            .field(field_binding!(Tag, id: Option<i64>).id())
            .field(field_binding!(Tag, label: Option<String>))
    }
}

#[tokio::test]
async fn update_with_every_column_skipped_is_an_error() {
    let mut executor = MockExecutor::new("MySQL");
    let tag = Tag {
        id: Some(1),
        label: None,
    };
    let result = Tag::update(&mut executor, &tag).await;
    assert!(result.is_err());
    assert!(executor.executed.is_empty());
}

#[tokio::test]
async fn update_many_sums_affected_counts() {
    let mut executor = MockExecutor::new("MySQL");
    let users = vec![
        User {
            id: Some(1),
            name: Some("Ann".to_owned()),
            age: 30,
        },
        User {
            id: Some(2),
            name: Some("Bob".to_owned()),
            age: 41,
        },
    ];
    let affected = User::update_many(&mut executor, &users, true, true)
        .await
        .unwrap();
    assert_eq!(affected, 2);
    assert_eq!(executor.executed.len(), 2);
}

#[tokio::test]
async fn find_by_id_builds_a_keyed_select() {
    let mut executor = MockExecutor::new("MySQL");
    executor.queue_rows(
        &["id", "name", "age"],
        vec![vec![
            Value::Int64(Some(5)),
            Value::Varchar(Some("Ann".to_owned())),
            Value::Int32(Some(30)),
        ]],
    );
    let user = User::find_by_id(&mut executor, Value::Int64(Some(5)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        executor.fetched[0].sql,
        "SELECT * FROM user WHERE id = :id"
    );
    assert_eq!(user.id, Some(5));
    assert_eq!(user.name.as_deref(), Some("Ann"));
    assert_eq!(user.age, 30);
}

#[tokio::test]
async fn find_by_null_id_short_circuits() {
    let mut executor = MockExecutor::new("MySQL");
    let found = User::find_by_id(&mut executor, Value::Int64(None))
        .await
        .unwrap();
    assert!(found.is_none());
    assert!(executor.fetched.is_empty());
}

#[tokio::test]
async fn find_all_reorders_trailing_clauses() {
    let mut executor = MockExecutor::new("MySQL");
    executor.queue_rows(&["id", "name", "age"], vec![]);
    User::find_all(
        &mut executor,
        "age > ?  ORDER BY name   LIMIT 5",
        &[Value::Int32(Some(18))],
    )
    .await
    .unwrap();
    let statement = &executor.fetched[0];
    assert_eq!(
        statement.sql,
        "SELECT * FROM user WHERE age > :p0 ORDER BY name LIMIT 5"
    );
    assert_eq!(statement.params[0].name, "p0");
    assert_eq!(statement.params[0].value, Value::Int32(Some(18)));
}

#[tokio::test]
async fn materialization_zeroes_null_numerics_and_renders_strings() {
    let mut executor = MockExecutor::new("MySQL");
    executor.queue_rows(
        &["id", "name", "age"],
        vec![vec![
            Value::Int64(Some(1)),
            // Non text cell under a string typed field renders to text.
            Value::Int32(Some(7)),
            Value::Int32(None),
        ]],
    );
    let user = User::find_one(&mut executor, "", &[]).await.unwrap().unwrap();
    assert_eq!(user.name.as_deref(), Some("7"));
    assert_eq!(user.age, 0);
}

#[tokio::test]
async fn raw_statements_rewrite_positional_markers() {
    let mut executor = MockExecutor::new("MySQL");
    let affected = execute_cud(
        &mut executor,
        "UPDATE user SET age = ? WHERE id = ?",
        &[Value::Int32(Some(31)), Value::Int64(Some(5))],
    )
    .await
    .unwrap();
    assert_eq!(affected, 1);
    let statement = &executor.executed[0];
    assert_eq!(statement.sql, "UPDATE user SET age = :p0 WHERE id = :p1");
    assert_eq!(statement.params[1].value, Value::Int64(Some(5)));
}

#[tokio::test]
async fn raw_statements_reject_queries() {
    let mut executor = MockExecutor::new("MySQL");
    let result = execute_cud(&mut executor, "SELECT * FROM user", &[]).await;
    assert!(result.is_err());
    assert!(executor.executed.is_empty());
}

#[tokio::test]
async fn hand_shaped_queries_return_labeled_rows() {
    let mut executor = MockExecutor::new("MySQL");
    executor.queue_rows(
        &["cnt", "oldest"],
        vec![vec![Value::Int64(Some(12)), Value::Int32(Some(77))]],
    );
    let mut statement = mantle::Statement::new(
        mantle::StatementKind::Select,
        "SELECT COUNT(*) AS cnt, MAX(age) AS oldest FROM user",
    );
    statement.shape = mantle::ResultShape::Manual;
    let rows = mantle::materialize::fetch_rows(&mut executor, statement)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_column("cnt"), Some(&Value::Int64(Some(12))));
    assert_eq!(rows[0].get_column("oldest"), Some(&Value::Int32(Some(77))));
}

#[tokio::test]
async fn quoted_markers_are_left_alone() {
    let mut executor = MockExecutor::new("MySQL");
    executor.queue_rows(&["id", "name", "age"], vec![]);
    User::find_all(
        &mut executor,
        "name = '?' AND age > ?",
        &[Value::Int32(Some(18))],
    )
    .await
    .unwrap();
    assert_eq!(
        executor.fetched[0].sql,
        "SELECT * FROM user WHERE name = '?' AND age > :p0"
    );
}
