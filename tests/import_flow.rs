use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn finflow_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("finflow"))
}

fn run_ok(home: &tempfile::TempDir, args: &[&str]) {
    let mut cmd = finflow_cmd();
    cmd.env("FINFLOW_HOME", home.path());
    cmd.args(args);
    cmd.assert().success();
}

fn run_ok_out(home: &tempfile::TempDir, args: &[&str]) -> String {
    let mut cmd = finflow_cmd();
    cmd.env("FINFLOW_HOME", home.path());
    cmd.args(args);
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).expect("utf8 stdout")
}

fn write_import(home: &tempfile::TempDir, name: &str, body: &str) -> String {
    let path = home.path().join(name);
    std::fs::write(&path, body).expect("write import file");
    path.to_str().expect("utf8 path").to_string()
}

fn entries_slot(home: &tempfile::TempDir) -> String {
    let db_path = home.path().join("data").join("finflow.sqlite3");
    let conn = rusqlite::Connection::open(db_path).expect("open sqlite");
    conn.query_row(
        "SELECT value FROM kv WHERE key = 'finflow.entries.v1'",
        [],
        |row| row.get(0),
    )
    .expect("read entries slot")
}

#[test]
fn export_then_import_round_trips_into_a_fresh_home() {
    let source = tempfile::tempdir().expect("tempdir");
    run_ok(&source, &["add", "100", "Salary", "--date", "2024-01-05"]);
    run_ok(
        &source,
        &["add", "40", "Groceries", "--kind", "outflow", "--date", "2024-01-06"],
    );

    let export_path = source.path().join("export.json");
    run_ok(&source, &["export", "--out", export_path.to_str().expect("utf8 path")]);

    let payload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export_path).expect("read export"))
            .expect("export json");
    assert_eq!(payload["app"], "finflow");
    assert_eq!(payload["version"], 1);
    assert!(payload["exportedAt"].is_string());
    assert_eq!(payload["entries"].as_array().expect("entries").len(), 2);

    let target = tempfile::tempdir().expect("tempdir");
    let out = run_ok_out(&target, &["import", export_path.to_str().expect("utf8 path")]);
    assert!(out.contains("Imported 2 entries (0 replaced, 2 added, 0 rejected)"));

    let out = run_ok_out(&target, &["totals", "--period", "all"]);
    assert!(out.contains("income\t100"));
    assert!(out.contains("outflow\t40"));
    assert!(out.contains("net\t60"));
    assert!(out.contains("count\t2"));
}

#[test]
fn import_overrides_by_id_and_unions_id_sets() {
    let home = tempfile::tempdir().expect("tempdir");

    let seed = write_import(
        &home,
        "seed.json",
        r#"[{"id":"e1","type":"income","date":"2024-01-05","amount":100,"description":"Old"},
            {"id":"e2","type":"outflow","date":"2024-01-06","amount":40,"description":"Rent"}]"#,
    );
    run_ok(&home, &["import", &seed]);

    // Object-with-entries shape, colliding on e1.
    let update = write_import(
        &home,
        "update.json",
        r#"{"entries":[{"id":"e1","type":"income","date":"2024-01-05","amount":250,"description":"New"},
                       {"id":"e3","type":"outflow","date":"2024-01-07","amount":7,"description":"Coffee"}]}"#,
    );
    let out = run_ok_out(&home, &["import", &update]);
    assert!(out.contains("Imported 2 entries (1 replaced, 1 added, 0 rejected)"));
    assert!(out.contains("Collection now holds 3."));

    let out = run_ok_out(&home, &["list", "--period", "all"]);
    assert!(out.contains("New"));
    assert!(!out.contains("Old"));
    assert!(out.contains("Rent"));
    assert!(out.contains("Coffee"));
    assert!(out.contains("count\t3"));
    assert!(out.contains("income\t250"));
    assert!(out.contains("outflow\t47"));
}

#[test]
fn importing_the_same_file_twice_is_idempotent() {
    let home = tempfile::tempdir().expect("tempdir");

    let file = write_import(
        &home,
        "batch.json",
        r#"[{"id":"e1","type":"income","date":"2024-01-05","amount":100},
            {"id":"e2","type":"outflow","date":"2024-01-06","amount":40}]"#,
    );

    run_ok(&home, &["import", &file]);
    let out = run_ok_out(&home, &["import", &file]);
    assert!(out.contains("Imported 2 entries (2 replaced, 0 added, 0 rejected)"));
    assert!(out.contains("Collection now holds 2."));
}

#[test]
fn legacy_records_are_normalized_and_persisted_canonically() {
    let home = tempfile::tempdir().expect("tempdir");

    let file = write_import(
        &home,
        "legacy.json",
        r#"[{"id":"L1","type":"expense","date":"2023-11-02","amount":12,"desc":"Legacy groceries","createdAt":1700000000000}]"#,
    );
    run_ok(&home, &["import", &file]);

    let out = run_ok_out(&home, &["list", "--period", "all"]);
    assert!(out.contains("outflow"));
    assert!(out.contains("Legacy groceries"));

    // The legacy label never survives ingestion; the stored record is canonical.
    let slot = entries_slot(&home);
    assert!(slot.contains("\"type\":\"outflow\""));
    assert!(!slot.contains("expense"));
    assert!(slot.contains("1700000000000"));
    assert!(slot.contains("\"description\":\"Legacy groceries\""));
}

#[test]
fn import_rejects_invalid_files_without_touching_state() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(&home, &["add", "10", "Existing", "--date", "2024-01-05"]);

    let not_json = write_import(&home, "bad.json", "definitely not json");
    let mut cmd = finflow_cmd();
    cmd.env("FINFLOW_HOME", home.path());
    cmd.args(["import", &not_json]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Import failed"));

    let wrong_shape = write_import(&home, "shape.json", r#"{"foo": 1}"#);
    let mut cmd = finflow_cmd();
    cmd.env("FINFLOW_HOME", home.path());
    cmd.args(["import", &wrong_shape]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must be an array of entries"));

    let out = run_ok_out(&home, &["list", "--period", "all"]);
    assert!(out.contains("Existing"));
    assert!(out.contains("count\t1"));
}

#[test]
fn malformed_records_are_dropped_but_the_batch_continues() {
    let home = tempfile::tempdir().expect("tempdir");

    let file = write_import(
        &home,
        "mixed.json",
        r#"[{"id":"good","type":"income","date":"2024-01-05","amount":10},
            {"type":"weird","date":"2024-01-05"},
            {"type":"income"}]"#,
    );
    let out = run_ok_out(&home, &["import", &file]);
    assert!(out.contains("Imported 1 entries (0 replaced, 1 added, 2 rejected)"));

    let out = run_ok_out(&home, &["list", "--period", "all"]);
    assert!(out.contains("count\t1"));
}
