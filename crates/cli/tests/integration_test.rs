use std::path::PathBuf;
use std::process::Command;

use serde_json::{json, Value};

fn write_temp(name: &str, body: &Value) -> PathBuf {
    let path = std::env::temp_dir().join(format!("hedgebot-{}-{name}", std::process::id()));
    std::fs::write(&path, body.to_string()).unwrap();
    path
}

fn run_plan(args: &[&str]) -> Value {
    let output = Command::new(env!("CARGO_BIN_EXE_hedgebot"))
        .arg("plan")
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run hedgebot");
    assert!(
        output.status.success(),
        "plan failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn spike_request() -> Value {
    json!({
        "exposures": [{"symbol": "EURUSD", "direction": "LONG", "quantity": 100000}],
        "volatility": [{"symbol": "EURUSD", "atr": 0.0131, "price": 1.0, "medianRatio": 0.01}]
    })
}

#[test]
fn test_plan_prints_open_decision() {
    let request = write_temp("plan-request.json", &spike_request());
    let plan = run_plan(&["--request", request.to_str().unwrap()]);

    assert_eq!(plan["opens"].as_array().unwrap().len(), 1);
    assert_eq!(plan["opens"][0]["reason"], "ATR_SPIKE");
    assert_eq!(plan["opens"][0]["side"], "SHORT_HEDGE");
    assert!(plan["closes"].as_array().unwrap().is_empty());
}

#[test]
fn test_plan_respects_active_hedges() {
    let request = write_temp("active-request.json", &spike_request());
    let active = write_temp(
        "active-rows.json",
        &json!([{
            "id": 3,
            "symbol": "EURUSD",
            "hedgeSymbol": "EURUSD",
            "side": "SHORT_HEDGE",
            "qty": 131000,
            "reason": "ATR_SPIKE",
            "status": "OPEN",
            "score": 1.31,
            "metadata": {},
            "closePrice": null,
            "openedAt": "2026-01-05T09:30:00Z",
            "closedAt": null
        }]),
    );

    let plan = run_plan(&[
        "--request",
        request.to_str().unwrap(),
        "--active",
        active.to_str().unwrap(),
    ]);
    assert!(plan["opens"].as_array().unwrap().is_empty());
    assert!(plan["closes"].as_array().unwrap().is_empty());
}

#[test]
fn test_plan_rejects_invalid_request() {
    let request = write_temp(
        "invalid-request.json",
        &json!({"exposures": [], "drawdownRiskCapital": -5}),
    );
    let output = Command::new(env!("CARGO_BIN_EXE_hedgebot"))
        .args(["plan", "--request", request.to_str().unwrap()])
        .output()
        .expect("failed to run hedgebot");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("drawdownRiskCapital"));
}
