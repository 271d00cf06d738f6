//! Resource integration tests.
//!
//! These drive the public API end to end over a [`RecordingClient`] and
//! check the exact statements sent and the entities mapped back.

use std::sync::Arc;

use snowflake_sdk::resources::{
    masking_policy, role, schema, table, user, Databases, MaskingPolicies, Roles, Schemas, Tables,
    Users,
};
use snowflake_sdk::{BaseOptions, Column, RecordingClient, Row, SchemaScope, Snowflake, Tristate};
use tokio_util::sync::CancellationToken;

fn connect() -> (Arc<RecordingClient>, Snowflake) {
    let client = Arc::new(RecordingClient::new());
    (client.clone(), Snowflake::new(client))
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_table_lifecycle() {
    let (client, sf) = connect();
    client.respond(
        "SHOW TABLES",
        vec![Row::new()
            .with("name", "EVENTS")
            .with("database_name", "ANALYTICS")
            .with("schema_name", "RAW")
            .with("retention_time", "1")],
    );
    let tables = sf.tables();
    let base = BaseOptions::new("EVENTS").in_schema("ANALYTICS", "RAW");

    let created = tables
        .create(&table::CreateOptions {
            base: base.clone(),
            columns: vec![Column::new("ID", "NUMBER").not_null()],
            comment: Some("raw events".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.schema, "RAW");

    tables
        .update(&table::UpdateOptions {
            base: base.clone(),
            comment: Tristate::Clear,
            ..Default::default()
        })
        .await
        .unwrap();
    tables.drop(&base).await.unwrap();

    assert_eq!(
        client.statements(),
        vec![
            r#"CREATE TABLE "ANALYTICS"."RAW"."EVENTS" ("ID" NUMBER NOT NULL) COMMENT = 'raw events'"#,
            r#"SHOW TABLES LIKE 'EVENTS' IN SCHEMA "ANALYTICS"."RAW""#,
            r#"ALTER TABLE "ANALYTICS"."RAW"."EVENTS" UNSET COMMENT"#,
            r#"SHOW TABLES LIKE 'EVENTS' IN SCHEMA "ANALYTICS"."RAW""#,
            r#"DROP TABLE "ANALYTICS"."RAW"."EVENTS""#,
        ]
    );
}

#[tokio::test]
async fn test_schema_update_reads_back_by_name() {
    let (client, sf) = connect();
    client.respond("SHOW SCHEMAS", vec![Row::new().with("name", "RAW")]);
    sf.schemas()
        .update(
            "RAW",
            &schema::UpdateOptions {
                data_retention_time: Some(7),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        client.statements(),
        vec![
            r#"ALTER SCHEMA "RAW" SET DATA_RETENTION_TIME_IN_DAYS = 7"#,
            "SHOW SCHEMAS LIKE 'RAW'",
        ]
    );
}

#[tokio::test]
async fn test_masking_policy_create_without_comment() {
    let (client, sf) = connect();
    client.respond("SHOW MASKING POLICIES", vec![Row::new().with("name", "T1")]);
    sf.masking_policies()
        .create(&masking_policy::CreateOptions {
            base: BaseOptions::new("T1").in_schema("D1", "S1"),
            value_data_type: "VARCHAR".into(),
            return_data_type: "VARCHAR".into(),
            masking_expression: "CASE WHEN CURRENT_ROLE() IN ('ANALYST') THEN VAL ELSE '*' END"
                .into(),
            comment: None,
        })
        .await
        .unwrap();
    let statements = client.statements();
    assert_eq!(
        statements[0],
        r#"CREATE MASKING POLICY "D1"."S1"."T1" AS (VAL VARCHAR) RETURNS VARCHAR -> CASE WHEN CURRENT_ROLE() IN ('ANALYST') THEN VAL ELSE '*' END"#
    );
    assert!(!statements[0].contains("COMMENT"));
}

// =============================================================================
// Validation Tests
// =============================================================================

#[tokio::test]
async fn test_validation_failures_send_nothing() {
    let (client, sf) = connect();

    let err = sf
        .users()
        .list(&user::ListOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = sf
        .roles()
        .list(&role::ListOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = sf
        .tables()
        .list(&SchemaScope::new("ANALYTICS", ""))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = sf
        .tables()
        .read(&BaseOptions::new("EVENTS").in_database("ANALYTICS"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert!(client.statements().is_empty());
}

// =============================================================================
// Not Found and Error Tests
// =============================================================================

#[tokio::test]
async fn test_read_missing_vs_empty_list() {
    let (client, sf) = connect();
    let listed = sf
        .databases()
        .list(&Default::default())
        .await
        .unwrap();
    assert!(listed.is_empty());

    let err = sf.databases().read("MISSING").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        client.statements(),
        vec!["SHOW DATABASES", "SHOW DATABASES LIKE 'MISSING'"]
    );
}

#[tokio::test]
async fn test_repeated_read_and_list_are_stable() {
    let (client, sf) = connect();
    client.respond(
        "SHOW ROLES",
        vec![
            Row::new().with("name", "ANALYSTS").with("comment", "decoy"),
            Row::new().with("name", "ANALYST_").with("comment", "team"),
        ],
    );
    let roles = sf.roles();
    let opts = role::ListOptions {
        pattern: "ANALYST%".into(),
    };

    let first_read = roles.read("ANALYST_").await.unwrap();
    let second_read = roles.read("ANALYST_").await.unwrap();
    assert_eq!(first_read, second_read);
    assert_eq!(first_read.name, "ANALYST_");
    assert_eq!(first_read.comment, "team");

    let first_list = roles.list(&opts).await.unwrap();
    let second_list = roles.list(&opts).await.unwrap();
    assert_eq!(first_list, second_list);
    assert_eq!(first_list.len(), 2);

    let statements = client.statements();
    assert_eq!(statements.len(), 4);
    assert!(statements.iter().all(|sql| sql.starts_with("SHOW ROLES LIKE")));
}

#[tokio::test]
async fn test_server_error_carries_phase_context() {
    let (client, sf) = connect();
    client.fail("CREATE ROLE", "SQL access control error");
    let err = sf
        .roles()
        .create(&role::CreateOptions {
            name: "R1".into(),
            comment: None,
        })
        .await
        .unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("db exec: "), "{}", text);
    assert!(text.contains("SQL access control error"));
}

#[tokio::test]
async fn test_user_describe_over_public_api() {
    let (client, sf) = connect();
    client.respond(
        "DESCRIBE USER",
        vec![
            Row::new().with("property", "NAME").with("value", "JDOE"),
            Row::new().with("property", "LOGIN_NAME").with("value", "jdoe"),
            Row::new().with("property", "RSA_PUBLIC_KEY_FP").with("value", "null"),
        ],
    );
    let described = sf.users().describe("JDOE").await.unwrap();
    assert_eq!(described.login_name, "jdoe");
    assert!(!described.has_rsa_public_key);
}

// =============================================================================
// Cancellation Tests
// =============================================================================

#[tokio::test]
async fn test_cancelled_facade_refuses_calls() {
    let client = Arc::new(RecordingClient::new());
    let token = CancellationToken::new();
    let sf = Snowflake::new(client.clone()).with_cancellation(token.clone());
    token.cancel();
    let err = sf.roles().read("R1").await.unwrap_err();
    assert!(err.is_cancelled());
}
