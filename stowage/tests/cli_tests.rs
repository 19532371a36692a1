use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::JoinHandle;
use tempfile::TempDir;

/// A scratch working directory with the customer CSV in place.
struct StowageTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl StowageTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();
        std::fs::create_dir_all(root.join("data"))?;
        std::fs::write(
            root.join("data/customers.csv"),
            "id,name,country\n1,Ada,UK\n2,Grace,US\n3,Linus,FI\n",
        )?;
        std::fs::write(
            root.join("stowage.yaml"),
            "ingest:\n  target: local\n  records_table: api_users\n",
        )?;
        Ok(Self { _tmp: tmp, root })
    }

    fn stowage(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stowage"));
        cmd.current_dir(&self.root);
        cmd
    }

    fn ingest(&self, api_url: &str) -> Command {
        let mut cmd = self.stowage();
        cmd.arg("ingest")
            .env("GCP_PROJECT_ID", "acme")
            .env("GCS_BUCKET_NAME", "landing")
            .env("BIGQUERY_DATASET", "raw")
            .env("API_URL", api_url)
            .env_remove("STOWAGE_TARGET")
            .env_remove("STOWAGE_WRITE_DISPOSITION");
        cmd
    }

    fn warehouse_count(&self, table: &str) -> Result<i64> {
        let conn = duckdb::Connection::open(self.root.join("target/warehouse.duckdb"))?;
        let count = conn.query_row(&format!("SELECT count(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }
}

/// Serves a single HTTP response on a random local port.
fn serve_once(status: &'static str, body: &'static str) -> Result<(String, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let url = format!("http://{}/users", listener.local_addr()?);
    let handle = std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while let Ok(n) = stream.read(&mut buf) {
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    Ok((url, handle))
}

fn seed_customers(path: &Path) -> Result<()> {
    let conn = duckdb::Connection::open(path)?;
    conn.execute_batch(
        "CREATE SCHEMA customers;
         CREATE TABLE customers.customer_data (id INTEGER, email VARCHAR);
         INSERT INTO customers.customer_data VALUES (1, 'a@x.io'), (2, 'b@x.io'), (3, 'c@x.io');",
    )?;
    Ok(())
}

#[test]
fn test_help_lists_commands() -> Result<()> {
    let env = StowageTestEnv::new()?;
    env.stowage()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ingest").and(predicate::str::contains("count")));
    Ok(())
}

#[test]
fn test_count_prints_row_count() -> Result<()> {
    let env = StowageTestEnv::new()?;
    let db_path = env.root.join("customers.duckdb");
    seed_customers(&db_path)?;

    env.stowage()
        .args(["count", "--backend", "duckdb", "--db-path"])
        .arg(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of records in the table: 3"));
    Ok(())
}

#[test]
fn test_count_unreachable_server_exits_non_zero() -> Result<()> {
    let env = StowageTestEnv::new()?;
    env.stowage()
        .args(["count", "--backend", "postgres", "--host", "127.0.0.1", "--port", "1"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Number of records").not())
        .stderr(predicate::str::contains("Count failed"));
    Ok(())
}

#[test]
fn test_ingest_local_target_end_to_end() -> Result<()> {
    let env = StowageTestEnv::new()?;
    let (url, server) = serve_once(
        "200 OK",
        r#"[{"id": 1, "email": "ada@example.com"}, {"id": 2, "email": "grace@example.com"}]"#,
    )?;

    env.ingest(&url)
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS"));
    let _ = server.join();

    assert_eq!(env.warehouse_count("raw.customers")?, 3);
    assert_eq!(env.warehouse_count("raw.api_users")?, 2);

    let jsonl = std::fs::read_to_string(env.root.join("data/data.jsonl"))?;
    assert_eq!(jsonl.lines().count(), 2);

    let blob = std::fs::read_to_string(env.root.join("target/lake/landing/data.json"))?;
    let parsed: serde_json::Value = serde_json::from_str(&blob)?;
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn test_ingest_api_failure_names_the_step() -> Result<()> {
    let env = StowageTestEnv::new()?;
    let (url, server) = serve_once("500 Internal Server Error", r#"{"error": "boom"}"#)?;

    env.ingest(&url)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("fetch_remote"));
    let _ = server.join();

    // Earlier steps stay applied, later ones never ran
    assert_eq!(env.warehouse_count("raw.customers")?, 3);
    assert!(!env.root.join("data/data.jsonl").exists());
    assert!(!env.root.join("target/lake/landing/data.json").exists());
    Ok(())
}

#[test]
fn test_ingest_missing_settings_fails_before_any_step() -> Result<()> {
    let env = StowageTestEnv::new()?;
    env.stowage()
        .arg("ingest")
        .env("GCP_PROJECT_ID", "")
        .env("GCS_BUCKET_NAME", "")
        .env("BIGQUERY_DATASET", "")
        .env("API_URL", "")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid ingestion configuration"));

    assert!(!env.root.join("target/lake").exists());
    Ok(())
}
