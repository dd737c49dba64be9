use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::{json, Value};

fn run(stdin: &str, args: &[&str]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_topokrig"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn response(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1, "stdout: {stdout}");
    serde_json::from_str(&stdout).unwrap()
}

fn scenario() -> Value {
    json!({
        "action": "CalculateTopo",
        "args": {
            "obb": {
                "domainX": 5.0,
                "domainY": 5.0,
                "centroid": {"x": 0.0, "y": 0.0},
                "xAxis": {"x": 1.0, "y": 0.0}
            },
            "points": [
                {"x": -2.0, "y": -2.0, "z": 1.0},
                {"x": 2.0, "y": -2.0, "z": 2.0},
                {"x": 0.0, "y": 0.0, "z": 1.5},
                {"x": -2.0, "y": 2.0, "z": 3.0},
                {"x": 2.0, "y": 2.0, "z": 2.5}
            ],
            "resolution": 5.0
        }
    })
}

#[test]
fn test_action_acknowledges() {
    let output = run("{\"action\": \"TEST\", \"args\": {}}\n", &[]);
    assert_eq!(output.status.code(), Some(0));
    let response = response(&output);
    assert_eq!(response["result"], json!(true));
    assert_eq!(response["jobResult"], json!({"print": "Test"}));
}

#[test]
fn blank_lines_before_the_request_are_skipped() {
    let output = run("\n\n   \n{\"action\": \"TEST\"}\n", &[]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(response(&output)["result"], json!(true));
}

#[test]
fn malformed_json_fails_with_exit_code() {
    let output = run("{bad\n", &[]);
    assert_eq!(output.status.code(), Some(1));
    let response = response(&output);
    assert_eq!(response["result"], json!(false));
    assert!(response["message"]
        .as_str()
        .unwrap()
        .starts_with("JSON Decode Error: "));
}

#[test]
fn empty_input_is_reported() {
    let output = run("", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(response(&output)["errorKind"], json!("EmptyInputError"));
}

#[test]
fn calculate_topo_over_stdin() {
    let output = run(&format!("{}\n", scenario()), &[]);
    assert_eq!(output.status.code(), Some(0));
    let response = response(&output);
    assert_eq!(response["result"], json!(true));
    assert_eq!(response["data"], scenario());

    let job = &response["jobResult"];
    assert_eq!(job["count"], json!(4));
    let points = job["points"].as_array().unwrap();
    let indices = points
        .iter()
        .map(|p| (p["i"].as_u64().unwrap(), p["j"].as_u64().unwrap()))
        .collect::<Vec<_>>();
    assert_eq!(indices, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    assert!(points.iter().all(|p| p["z"].as_f64().unwrap().is_finite()));
}

#[test]
fn calculate_topo_points_output_in_global_coordinates() {
    let mut request = scenario();
    request["args"]["output"] = json!("points");
    request["args"]["variogramModel"] = json!("exponential");
    let output = run(&request.to_string(), &[]);
    assert_eq!(output.status.code(), Some(0));

    let points = response(&output)["jobResult"]["points"].clone();
    let xy = points
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["x"].as_f64().unwrap(), p["y"].as_f64().unwrap()))
        .collect::<Vec<_>>();
    let expected = [(-2.5, -2.5), (-2.5, 2.5), (2.5, -2.5), (2.5, 2.5)];
    for ((x, y), (ex, ey)) in xy.iter().zip(expected) {
        assert!((x - ex).abs() < 1e-9 && (y - ey).abs() < 1e-9, "({x}, {y})");
    }
}

#[test]
fn runtime_path_writes_result_file() {
    let runtime = tempfile::tempdir().unwrap();
    let mut request = scenario();
    request["runtimePath"] = json!(runtime.path());
    let output = run(&request.to_string(), &[]);
    assert_eq!(output.status.code(), Some(0));

    let job = response(&output)["jobResult"].clone();
    let path = job["pointFilePath"].as_str().unwrap().to_string();
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["max_i"], json!(1));
    assert_eq!(written["max_j"], json!(1));
    assert_eq!(written["resolution"], json!(5.0));
    assert_eq!(written["points"].as_array().unwrap().len(), 4);
}

#[test]
fn request_file_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("request.json");
    std::fs::write(&path, serde_json::to_string_pretty(&scenario()).unwrap()).unwrap();

    let output = run("", &[path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(response(&output)["jobResult"]["count"], json!(4));
}

#[test]
fn missing_request_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run("", &[dir.path().join("missing.json").to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn grid_limit_from_the_command_line() {
    let output = run(&scenario().to_string(), &["--max-grid-points", "3"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(response(&output)["errorKind"], json!("GridTooLargeError"));
}
