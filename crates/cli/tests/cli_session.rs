use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{Value, json};
use tempfile::TempDir;

fn session_file(dir: &TempDir) -> PathBuf {
	dir.path().join("state").join("session.json")
}

fn run_hearth(session_file: &Path, args: &[&str]) -> (bool, Value, String) {
	let output = Command::new(env!("CARGO_BIN_EXE_hearth"))
		.env_remove("HEARTH_SESSION_FILE")
		.env_remove("RUST_LOG")
		.arg("--session-file")
		.arg(session_file)
		.args(["-f", "json"])
		.args(args)
		.output()
		.expect("failed to execute hearth");

	let stdout = String::from_utf8_lossy(&output.stdout).to_string();
	let stderr = String::from_utf8_lossy(&output.stderr).to_string();
	let parsed = serde_json::from_str::<Value>(&stdout).unwrap_or_else(|_| json!({ "raw": stdout }));
	(output.status.success(), parsed, stderr)
}

fn login(session_file: &Path) {
	let (ok, json, stderr) = run_hearth(
		session_file,
		&["login", "--identity", "did:plc:alice", "--credential", "tok", "--handle", "alice.test", "--service", "https://pds.example"],
	);
	assert!(ok, "login failed: {stderr}");
	assert_eq!(json["data"]["identity"], "did:plc:alice");
}

#[test]
fn status_without_session_file_is_unauthenticated() {
	let dir = TempDir::new().unwrap();
	let file = session_file(&dir);

	let (ok, json, stderr) = run_hearth(&file, &["status"]);
	assert!(ok, "status failed: {stderr}");
	assert_eq!(json["ok"], true);
	assert_eq!(json["command"], "status");
	assert_eq!(json["data"]["authenticated"], false);
	assert_eq!(json["data"]["subStores"], json!(["session", "shell"]));
	assert!(json.get("diagnostics").is_none());
}

#[test]
fn login_persists_session_for_next_status() {
	let dir = TempDir::new().unwrap();
	let file = session_file(&dir);
	login(&file);
	assert!(file.exists());

	let (ok, json, _) = run_hearth(&file, &["status"]);
	assert!(ok);
	assert_eq!(json["data"]["authenticated"], true);
	assert_eq!(json["data"]["identity"], "did:plc:alice");
	assert_eq!(json["data"]["handle"], "alice.test");
	assert_eq!(json["data"]["service"], "https://pds.example");
}

#[test]
fn concurrent_expiry_delivers_one_drop_and_clears_storage() {
	let dir = TempDir::new().unwrap();
	let file = session_file(&dir);
	login(&file);

	let (ok, json, stderr) = run_hearth(&file, &["expire", "--reporters", "8"]);
	assert!(ok, "expire failed: {stderr}");
	let data = &json["data"];
	assert_eq!(data["reporters"], 8);
	assert_eq!(data["dropped"], 1);
	assert_eq!(data["redundant"], 7);
	assert_eq!(data["dropEventsDelivered"], 1);
	assert_eq!(data["authenticatedAfter"], false);
	assert_eq!(data["notices"], json!(["Sorry! Your session expired. Please log in again."]));
	assert_eq!(data["analyticsEvents"], json!(["identify:did:plc:alice", "session_dropped:did:plc:alice"]));
	assert!(!file.exists());

	let (_, status, _) = run_hearth(&file, &["status"]);
	assert_eq!(status["data"]["authenticated"], false);
}

#[test]
fn expire_without_session_delivers_nothing() {
	let dir = TempDir::new().unwrap();
	let file = session_file(&dir);

	let (ok, json, _) = run_hearth(&file, &["expire", "--reporters", "4"]);
	assert!(ok);
	assert_eq!(json["data"]["dropped"], 0);
	assert_eq!(json["data"]["redundant"], 4);
	assert_eq!(json["data"]["dropEventsDelivered"], 0);
}

#[test]
fn corrupt_session_file_hydrates_unauthenticated_with_warning() {
	let dir = TempDir::new().unwrap();
	let file = session_file(&dir);
	std::fs::create_dir_all(file.parent().unwrap()).unwrap();
	std::fs::write(&file, b"{not json").unwrap();

	let (ok, json, stderr) = run_hearth(&file, &["status"]);
	assert!(ok, "status failed: {stderr}");
	assert_eq!(json["data"]["authenticated"], false);
	let diagnostics = json["diagnostics"].as_array().expect("diagnostics present");
	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0]["kind"], "bootstrapWarning");
}

#[test]
fn logout_clears_persisted_session() {
	let dir = TempDir::new().unwrap();
	let file = session_file(&dir);
	login(&file);

	let (ok, json, _) = run_hearth(&file, &["logout"]);
	assert!(ok);
	assert_eq!(json["data"]["wasAuthenticated"], true);
	assert!(!file.exists());
}

#[test]
fn soft_reset_reports_every_emission() {
	let dir = TempDir::new().unwrap();
	let file = session_file(&dir);

	let (ok, json, _) = run_hearth(&file, &["soft-reset", "--times", "3"]);
	assert!(ok);
	assert_eq!(json["data"]["emitted"], 3);
	assert_eq!(json["data"]["listeners"], 1);
	assert_eq!(json["data"]["resetsObserved"], 3);
}

#[test]
fn empty_identity_is_rejected() {
	let dir = TempDir::new().unwrap();
	let file = session_file(&dir);

	let (ok, json, _) = run_hearth(&file, &["login", "--identity", " ", "--credential", "tok"]);
	assert!(!ok);
	assert_eq!(json["ok"], false);
	assert_eq!(json["error"]["code"], "INVALID_INPUT");
}
