mod common;

use std::fs;

use flyq_framework::{Error, Loader, Logger, LoggerSetup};
use serde_json::{json, Value};

use crate::common::{captured_framework, folder_to_use, CapturedOutput};

fn json_lines(contents: &str) -> Vec<Value> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("log line is not json"))
        .collect()
}

fn messages(lines: &[Value]) -> Vec<&str> {
    lines
        .iter()
        .filter_map(|line| line["fields"]["message"].as_str())
        .collect()
}

#[test]
fn test_logs_to_stdout_without_file() {
    let (framework, output) = captured_framework();
    framework.configure(json!({})).unwrap();

    framework.logger().unwrap().info("log-to-stdout");

    assert!(output.contents().contains("log-to-stdout"));
}

#[test]
fn test_logs_to_file_and_stdout() {
    let dir = folder_to_use();
    let log_file = dir.path().join("log").join("flyq.log");

    let (framework, output) = captured_framework();
    framework
        .configure(json!({ "logger": { "file": log_file.to_str().unwrap() } }))
        .unwrap();

    framework.logger().unwrap().info("log-to-file");

    let contents = fs::read_to_string(&log_file).unwrap();
    let lines = json_lines(&contents);
    assert_eq!(messages(&lines), ["log-to-file"]);
    assert_eq!(lines[0]["level"], json!("INFO"));
    assert_eq!(lines[0]["fields"]["logger"], json!("flyq_framework"));
    assert!(output.contents().contains("log-to-file"));

    framework.reset();
    fs::remove_file(&log_file).unwrap();
}

#[test]
fn test_file_is_appended_across_reconfigurations() {
    let dir = folder_to_use();
    let log_file = dir.path().join("flyq.log");
    let settings = json!({ "logger": { "file": log_file.to_str().unwrap() } });

    let (framework, _) = captured_framework();
    framework.configure(settings.clone()).unwrap();
    framework.logger().unwrap().info("first");
    framework.configure(settings).unwrap();
    framework.logger().unwrap().info("second");

    let contents = fs::read_to_string(&log_file).unwrap();
    assert_eq!(messages(&json_lines(&contents)), ["first", "second"]);
}

#[test]
fn test_level_filters_events() {
    let (framework, output) = captured_framework();
    framework
        .configure(json!({ "logger": { "level": "warn" } }))
        .unwrap();

    let logger = framework.logger().unwrap();
    logger.info("below-threshold");
    logger.warn("at-threshold");

    let contents = output.contents();
    assert!(!contents.contains("below-threshold"));
    assert!(contents.contains("at-threshold"));
}

#[test]
fn test_fatal_is_accepted_as_error() {
    let (framework, output) = captured_framework();
    framework
        .configure(json!({ "logger": { "level": "fatal" } }))
        .unwrap();

    let logger = framework.logger().unwrap();
    logger.warn("dropped");
    logger.error("kept");

    let contents = output.contents();
    assert!(!contents.contains("dropped"));
    assert!(contents.contains("kept"));
}

#[test]
fn test_silence_suppresses_stdout_only() {
    let dir = folder_to_use();
    let log_file = dir.path().join("flyq.log");

    let (framework, output) = captured_framework();
    framework.set_silence_log(true);
    framework
        .configure(json!({ "logger": { "file": log_file.to_str().unwrap() } }))
        .unwrap();

    framework.logger().unwrap().info("silenced");

    assert!(output.contents().is_empty());
    let contents = fs::read_to_string(&log_file).unwrap();
    assert_eq!(messages(&json_lines(&contents)), ["silenced"]);
}

#[test]
fn test_silence_applies_on_next_configure_logger() {
    let (framework, output) = captured_framework();
    framework.configure(json!({})).unwrap();

    framework.set_silence_log(true);
    framework.logger().unwrap().info("still-loud");
    framework.configure_logger().unwrap();
    framework.logger().unwrap().info("now-quiet");

    let contents = output.contents();
    assert!(contents.contains("still-loud"));
    assert!(!contents.contains("now-quiet"));
}

#[test]
fn test_stdout_json() {
    let (framework, output) = captured_framework();
    framework
        .configure(json!({ "logger": { "stdout_json": true } }))
        .unwrap();

    framework.logger().unwrap().info("structured");

    let lines = json_lines(&output.contents());
    assert_eq!(messages(&lines), ["structured"]);
}

#[test]
fn test_custom_logger_replaces_configured_sinks() {
    let custom_output = CapturedOutput::default();
    let custom = Logger::from_subscriber(
        "custom",
        tracing_subscriber::fmt()
            .with_writer(custom_output.console())
            .finish(),
    );

    let (framework, output) = captured_framework();
    let config = Loader::new(json!({})).custom_logger(custom).load().unwrap();
    framework.install(config, LoggerSetup::Configure).unwrap();

    let logger = framework.logger().unwrap();
    assert_eq!(logger.name(), "custom");
    logger.info("custom-sink");

    assert!(custom_output.contents().contains("custom-sink"));
    assert!(!output.contents().contains("custom-sink"));
}

#[test]
fn test_kafka_client_logger_shares_the_file() {
    let dir = folder_to_use();
    let log_file = dir.path().join("flyq.log");

    let (framework, _) = captured_framework();
    framework
        .configure(json!({
            "logger": {
                "file": log_file.to_str().unwrap(),
                "level": "info",
                "kafka_client": { "level": "debug" }
            }
        }))
        .unwrap();

    framework.logger().unwrap().debug("framework-debug");
    framework.logger().unwrap().info("framework-info");
    framework.kafka_logger().unwrap().debug("client-debug");

    let contents = fs::read_to_string(&log_file).unwrap();
    let lines = json_lines(&contents);
    assert_eq!(messages(&lines), ["framework-info", "client-debug"]);
    assert_eq!(lines[1]["fields"]["logger"], json!("flyq_client"));
}

#[test]
fn test_legacy_kafka_logger_key() {
    let (framework, _) = captured_framework();
    framework
        .configure(json!({ "logger": { "ruby_kafka": { "level": "info" } } }))
        .unwrap();
    assert!(framework.kafka_logger().is_some());
}

#[test]
fn test_invalid_kafka_client_level_is_rejected() {
    let (framework, _) = captured_framework();
    let err = framework
        .configure(json!({ "logger": { "kafka_client": { "level": "noisy" } } }))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidLogLevel(level) if level == "noisy"));
}

#[test]
fn test_unwritable_log_file_is_reported() {
    let dir = folder_to_use();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();
    let log_file = blocker.join("flyq.log");

    let (framework, _) = captured_framework();
    let err = framework
        .configure(json!({ "logger": { "file": log_file.to_str().unwrap() } }))
        .unwrap_err();

    match err {
        Error::LoggerIo { path, .. } => assert_eq!(path, log_file),
        other => panic!("expected a logger io error, got {other:?}"),
    }
}

#[test]
fn test_bootstrap_events_reach_the_built_logger() {
    let dir = folder_to_use();
    let log_file = dir.path().join("flyq.log");

    let (framework, output) = captured_framework();
    framework
        .configure(json!({
            "logger": { "file": log_file.to_str().unwrap(), "level": "debug" }
        }))
        .unwrap();

    let contents = fs::read_to_string(&log_file).unwrap();
    let lines = json_lines(&contents);
    assert_eq!(messages(&lines), ["loggers configured", "configuration installed"]);
    assert_eq!(lines[0]["fields"]["kafka_logger"], json!(false));
    assert!(output.contents().contains("configuration installed"));
}
