#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use metricsd_server::{app_state::AppState, config, router};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "127.0.0.1:2112"
collect:
  jobs_total:
    type: counter
    lables: ["queue"] # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "127.0.0.1:2112");
    assert_eq!(cfg.server.metrics_path, "/metrics");
    assert!(cfg.collect.is_empty());
}

#[test]
fn wrong_version_rejected() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn listen_must_be_socket_addr() {
    let bad = "version: 1\nserver:\n  listen: \"localhost\"\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn metrics_path_cannot_shadow_rpc() {
    let bad = "version: 1\nserver:\n  metrics_path: \"/v1/metrics/add\"\n";
    assert!(config::load_from_str(bad).is_err());
    let bad = "version: 1\nserver:\n  metrics_path: \"metrics\"\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn metrics_path_must_be_literal() {
    for path in ["/*", "/*rest", "/:name", "/{id}", "/metrics}"] {
        let bad = format!("version: 1\nserver:\n  metrics_path: \"{path}\"\n");
        let err = config::load_from_str(&bad).expect_err(path);
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    }

    let cfg = config::load_from_str("version: 1\nserver:\n  metrics_path: \"/internal/metrics\"\n")
        .expect("literal nested path is fine");
    let state = AppState::new(cfg).expect("startup");
    let _router = router::build_router(state);
}

#[test]
fn collect_entries_declared_at_startup() {
    let ok = r#"
version: 1
collect:
  jobs_total:
    type: counter
    labels: ["queue"]
  job_latency:
    type: histogram
    buckets: [0.1, 1, 10]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    let descs = cfg.descriptors();
    assert_eq!(descs[0].name, "job_latency");
    assert_eq!(descs[1].labels, vec!["queue".to_string()]);

    let state = AppState::new(cfg).expect("startup");
    assert_eq!(
        state.service().registry().names(),
        vec!["job_latency".to_string(), "jobs_total".to_string()]
    );
}

#[test]
fn startup_fails_on_bad_collector() {
    let bad = r#"
version: 1
collect:
  jobs_total:
    type: meter
"#;
    let cfg = config::load_from_str(bad).expect("schema is fine");
    let err = AppState::new(cfg).err().expect("declare must fail");
    assert_eq!(err.client_code().as_str(), "UNKNOWN_KIND");
    assert_eq!(err.collector(), Some("jobs_total"));
}
