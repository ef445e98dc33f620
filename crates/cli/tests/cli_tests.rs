//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the binary with an isolated config location and no token in the environment
fn aqi(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_aqi"))
        .args(["--config", &config_dir.join("config.json").to_string_lossy()])
        .args(args)
        .env_remove("AQI_TOKEN")
        .env_remove("AQI_API_URL")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = aqi(dir.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Air Quality Index"), "Should show app description");
    for command in ["fetch", "probe", "train", "predict", "sweep", "estimate", "categories", "config"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    let output = aqi(dir.path(), &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("aqi"), "Should show binary name");
}

/// Test predict subcommand help
#[test]
fn test_predict_help() {
    let dir = TempDir::new().unwrap();
    let output = aqi(dir.path(), &["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--temperature"));
    assert!(stdout.contains("--traffic-level"));
    assert!(stdout.contains("--industrial-activity"));
    assert!(stdout.contains("--data"), "Should show training options");
}

/// Test invalid command handling
#[test]
fn test_invalid_command() {
    let dir = TempDir::new().unwrap();
    let output = aqi(dir.path(), &["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
}

#[test]
fn test_train_synthetic_json() {
    let dir = TempDir::new().unwrap();
    let output = aqi(
        dir.path(),
        &["train", "--samples", "200", "--seed", "7", "--format", "json"],
    );
    assert!(output.status.success());

    let state = json_stdout(&output);
    assert_eq!(state["state"], "trained");
    assert_eq!(state["train_samples"], 160);
    assert_eq!(state["held_out_samples"], 40);
    assert_eq!(state["model"]["version"], "ols-160");

    let r_squared = state["evaluation"]["r_squared"].as_f64().unwrap();
    assert!(r_squared > 0.8, "synthetic data is close to linear: {}", r_squared);
}

#[test]
fn test_train_with_too_few_samples_degrades() {
    let dir = TempDir::new().unwrap();
    let output = aqi(dir.path(), &["train", "--samples", "1", "--format", "json"]);
    assert!(output.status.success(), "Untrained state is not a failure");

    let state = json_stdout(&output);
    assert_eq!(state["state"], "untrained");
    assert_eq!(state["reason"]["code"], "insufficient_data");
}

#[test]
fn test_predict_json() {
    let dir = TempDir::new().unwrap();
    let output = aqi(
        dir.path(),
        &[
            "predict",
            "--temperature",
            "30",
            "--traffic-level",
            "5",
            "--industrial-activity",
            "5",
            "--format",
            "json",
        ],
    );
    assert!(output.status.success());

    let prediction = json_stdout(&output);
    let aqi = prediction["predicted_aqi"].as_f64().unwrap();
    // 20 + 2*30 + 10*5 + 8*5 on the default synthetic profile
    assert!((aqi - 170.0).abs() < 10.0, "predicted {}", aqi);
    assert_eq!(prediction["category"], "moderate");
}

#[test]
fn test_train_from_csv() {
    let dir = TempDir::new().unwrap();
    let header = "temperature,traffic_level,industrial_activity,aqi\n";
    let mut a = String::from(header);
    let mut b = String::from(header);
    for i in 0..20 {
        let t = 15.0 + i as f64;
        let traffic = (i % 7) as f64;
        let industrial = (i % 5) as f64;
        let target = 20.0 + 2.0 * t + 10.0 * traffic + 8.0 * industrial;
        let row = format!("{},{},{},{}\n", t, traffic, industrial, target);
        if i % 2 == 0 {
            a.push_str(&row);
        } else {
            b.push_str(&row);
        }
    }
    let path_a = dir.path().join("a.csv");
    let path_b = dir.path().join("b.csv");
    std::fs::write(&path_a, a).unwrap();
    std::fs::write(&path_b, b).unwrap();

    let output = aqi(
        dir.path(),
        &[
            "train",
            "--data",
            &path_a.to_string_lossy(),
            &path_b.to_string_lossy(),
            "--format",
            "json",
        ],
    );
    assert!(output.status.success());

    let state = json_stdout(&output);
    assert_eq!(state["state"], "trained");
    let intercept = state["model"]["intercept"].as_f64().unwrap();
    assert!((intercept - 20.0).abs() < 1e-6, "intercept {}", intercept);
}

#[test]
fn test_sweep_rejects_bad_step() {
    let dir = TempDir::new().unwrap();
    let output = aqi(
        dir.path(),
        &[
            "sweep",
            "--feature",
            "traffic-level",
            "--from",
            "0",
            "--to",
            "10",
            "--step",
            "0",
        ],
    );
    assert!(!output.status.success(), "Zero step should fail");
}

#[test]
fn test_fetch_requires_token() {
    let dir = TempDir::new().unwrap();
    let output = aqi(dir.path(), &["fetch", "Dubai"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("No API token"), "stderr: {}", stderr);
}

#[test]
fn test_config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let init = aqi(dir.path(), &["config", "init"]);
    assert!(init.status.success());
    assert!(dir.path().join("config.json").exists());

    let again = aqi(dir.path(), &["config", "init"]);
    assert!(!again.status.success(), "Existing file needs --force");

    let show = aqi(dir.path(), &["config", "show"]);
    assert!(show.status.success());
    assert_eq!(json_stdout(&show)["target_column"], "aqi");
}

#[test]
fn test_estimate_without_token_is_model_only() {
    let dir = TempDir::new().unwrap();
    let output = aqi(
        dir.path(),
        &["estimate", "Delhi", "--samples", "200", "--format", "json"],
    );
    assert!(output.status.success(), "Missing token degrades, it does not fail");

    let report = json_stdout(&output);
    assert!(report["reading"].is_null());
    assert!(report["reading_error"].as_str().unwrap().contains("token"));
    assert_eq!(report["model"]["state"], "trained");
    assert!(report["estimate"].is_null());
}

#[test]
fn test_estimate_against_feed() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/feed/Delhi/")
        .match_query(mockito::Matcher::UrlEncoded("token".into(), "tok-81d3".into()))
        .with_status(200)
        .with_body(r#"{"status":"ok","data":{"aqi":152,"iaqi":{"pm25":{"v":152},"t":{"v":34}}}}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let output = aqi(
        dir.path(),
        &[
            "--api-url",
            &server.url(),
            "--token",
            "tok-81d3",
            "estimate",
            "Delhi",
            "--traffic-level",
            "8",
            "--format",
            "json",
        ],
    );
    assert!(output.status.success());

    let report = json_stdout(&output);
    assert_eq!(report["reading"]["aqi"], 152.0);
    assert_eq!(report["estimate"]["features"]["temperature"], 34.0);
    assert_eq!(report["estimate"]["features"]["traffic_level"], 8.0);
    assert_eq!(report["defaulted"]["temperature"], false);
    assert_eq!(report["defaulted"]["traffic_level"], true);
}

#[test]
fn test_estimate_provider_error_still_trains() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/feed/Delhi/")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"error","data":"Unknown station"}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let output = aqi(
        dir.path(),
        &[
            "--api-url",
            &server.url(),
            "--token",
            "tok-81d3",
            "estimate",
            "Delhi",
            "--format",
            "json",
        ],
    );
    assert!(output.status.success());

    let report = json_stdout(&output);
    assert!(report["reading_error"].as_str().unwrap().contains("Unknown station"));
    assert_eq!(report["model"]["state"], "trained");
    assert!(report["estimate"].is_null());
}

#[test]
fn test_unreachable_feed_keeps_token_private() {
    let dir = TempDir::new().unwrap();
    let output = aqi(
        dir.path(),
        &[
            "--api-url",
            "http://127.0.0.1:9/",
            "--token",
            "tok-81d3",
            "estimate",
            "Delhi",
            "--samples",
            "100",
            "--format",
            "json",
        ],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stdout.contains("tok-81d3"), "stdout: {}", stdout);
    assert!(!stderr.contains("tok-81d3"), "stderr: {}", stderr);
    assert!(json_stdout(&output)["reading_error"].is_string());
}

#[test]
fn test_connectivity_check_reports_working_feed() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/feed/Dubai/")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"ok","data":{"aqi":42}}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let output = aqi(
        dir.path(),
        &["--api-url", &server.url(), "--token", "t", "probe", "Dubai"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("API is working for Dubai"));
    assert!(stdout.contains("\"aqi\": 42"));
}

#[test]
fn test_categories_json() {
    let dir = TempDir::new().unwrap();
    let output = aqi(dir.path(), &["categories", "--format", "json"]);
    assert!(output.status.success());

    let bands = json_stdout(&output);
    let bands = bands.as_array().unwrap();
    assert_eq!(bands.len(), 6);
    assert_eq!(bands[0]["category"], "good");
    assert!(bands[0]["above"].is_null());
    assert_eq!(bands[0]["up_to"], 50.0);
    assert_eq!(bands[5]["above"], 400.0);
    assert!(bands[5]["up_to"].is_null());
}
