//! End-to-end runs of the supply pipeline with the host filesystem.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use anyhow::Result;
use spire_supply::application::services::supply::{SupplyPorts, run_supply};
use spire_supply::domain::{InstallOutcome, Stage, SupplyError, SupplyReport};
use spire_supply::infra::env::{EnvSnapshot, default_resolver};
use spire_supply::infra::fs::HostFs;
use spire_supply::infra::random::ThreadRngBaseIds;
use spire_supply::infra::template::HandlebarsRenderer;

use crate::common::{self, AGENT_BYTES, BINDING, Fixture};
use crate::mocks::{FixedIds, RecordingReporter};

fn env(vars: &[(&str, &str)]) -> EnvSnapshot {
    vars.iter().copied().collect()
}

fn supply_with(
    fixture: &Fixture,
    snapshot: &EnvSnapshot,
    ids: &FixedIds,
    reporter: &RecordingReporter,
) -> Result<SupplyReport> {
    let resolver = default_resolver(snapshot);
    let renderer = HandlebarsRenderer::new();
    let ports = SupplyPorts {
        installer: &HostFs,
        renderer: &renderer,
        fs: &HostFs,
        base_ids: ids,
    };
    run_supply(&resolver, &ports, &fixture.paths, reporter)
}

fn supply(fixture: &Fixture, snapshot: &EnvSnapshot) -> Result<SupplyReport> {
    supply_with(fixture, snapshot, &FixedIds::new(4242), &RecordingReporter::default())
}

#[test]
fn test_binding_only_supply_installs_agent_without_proxy() {
    let fixture = Fixture::new();
    let snapshot = env(&[("VCAP_SERVICES", BINDING), ("SPIRE_PROXY_ENABLED", "false")]);
    let report = supply(&fixture, &snapshot).unwrap();

    assert_eq!(report.certificates_installed, common::CERTIFICATES.len());
    assert_eq!(report.plugins_installed, common::PLUGINS.len());
    assert_eq!(report.agent_binary, InstallOutcome::Installed);
    assert!(!report.proxy_enabled);
    assert_eq!(report.proxy_base_id, None);

    let paths = &fixture.paths;
    let agent = std::fs::read(paths.agent_binary().destination).unwrap();
    assert_eq!(agent, AGENT_BYTES);
    assert!(paths.dep_dir().join("certificates/bundle.crt").is_file());
    assert!(paths.dep_dir().join("certificates/intermediate/ca.crt").is_file());
    assert!(paths.bin_dir().join("plugins/workloadattestor/docker").is_file());

    let conf = fixture.read(&paths.agent_conf());
    assert!(conf.contains(r#"server_address = "10.0.0.5""#));
    assert!(conf.contains(r#"server_port = "8081""#));
    assert!(conf.contains(r#"trust_domain = "example.org""#));
    assert!(conf.contains(r#"log_level = "INFO""#));
    assert!(!conf.contains("SVIDStore"));

    let launch = fixture.read(&paths.launch_descriptor());
    assert!(launch.starts_with("processes:"));
    assert_eq!(common::process_types(&launch), vec!["spire-agent"]);
    assert!(!paths.proxy_conf().exists());
    assert!(paths.logs_dir().is_dir());
}

#[test]
fn test_binding_supply_with_proxy_uses_random_base_id() {
    let fixture = Fixture::new();
    let binding = r#"{"user_provided":[{"name":"spire","credentials":{
        "SPIRE_SERVER_ADDRESS":"10.0.0.5","SPIRE_SERVER_PORT":8081,
        "SPIRE_TRUST_DOMAIN":"example.org","SPIRE_PROXY_ENABLED":"TRUE",
        "SPIRE_APP_SPIFFE_ID":"spiffe://example.org/app"}}]}"#;
    let snapshot = env(&[("VCAP_SERVICES", binding)]);
    let resolver = default_resolver(&snapshot);
    let renderer = HandlebarsRenderer::new();
    let ports = SupplyPorts {
        installer: &HostFs,
        renderer: &renderer,
        fs: &HostFs,
        base_ids: &ThreadRngBaseIds,
    };
    let report =
        run_supply(&resolver, &ports, &fixture.paths, &RecordingReporter::default()).unwrap();

    assert!(report.proxy_enabled);
    let base_id = report.proxy_base_id.expect("proxy base id");
    assert!(base_id > 0 && base_id < 65_000, "base id {base_id} out of range");

    let paths = &fixture.paths;
    let launch = fixture.read(&paths.launch_descriptor());
    assert_eq!(common::process_types(&launch), vec!["spire-agent", "spire-proxy"]);
    assert_eq!(common::proxy_base_id(&launch), Some(base_id));

    let proxy = fixture.read(&paths.proxy_conf());
    assert!(proxy.contains(r#"id: "spiffe://example.org/app""#));
    assert!(proxy.contains(r#"name: "spiffe://example.org""#));
    assert!(fixture.read(&paths.agent_conf()).contains(r#"server_port = "8081""#));
}

#[test]
fn test_binding_wins_over_environment() {
    let fixture = Fixture::new();
    let snapshot = env(&[
        ("VCAP_SERVICES", BINDING),
        ("SPIRE_SERVER_ADDRESS", "from-env"),
        ("SPIRE_AGENT_LOG_LEVEL", "DEBUG"),
    ]);
    supply(&fixture, &snapshot).unwrap();

    let conf = fixture.read(&fixture.paths.agent_conf());
    assert!(conf.contains(r#"server_address = "10.0.0.5""#));
    assert!(conf.contains(r#"log_level = "DEBUG""#));
}

#[test]
fn test_malformed_binding_falls_back_to_environment() {
    let fixture = Fixture::new();
    let snapshot = env(&[
        ("VCAP_SERVICES", "{not json"),
        ("SPIRE_SERVER_ADDRESS", "fallback"),
        ("SPIRE_SERVER_PORT", "8081"),
        ("SPIRE_TRUST_DOMAIN", "example.org"),
    ]);
    supply(&fixture, &snapshot).unwrap();

    let conf = fixture.read(&fixture.paths.agent_conf());
    assert!(conf.contains(r#"server_address = "fallback""#));
}

#[test]
fn test_missing_trust_domain_stops_before_binary_install() {
    let fixture = Fixture::new();
    let snapshot = env(&[
        ("SPIRE_SERVER_ADDRESS", "10.0.0.5"),
        ("SPIRE_SERVER_PORT", "8081"),
    ]);
    let err = supply(&fixture, &snapshot).unwrap_err();

    assert!(matches!(
        SupplyError::find(&err),
        Some(SupplyError::MissingParameter { key }) if key == "SPIRE_TRUST_DOMAIN"
    ));
    let message = format!("{err:#}");
    assert!(message.starts_with("render agent configuration"), "got: {message}");

    let paths = &fixture.paths;
    assert!(paths.dep_dir().join("certificates/bundle.crt").is_file());
    assert!(!paths.agent_binary().destination.exists());
    assert!(!paths.launch_descriptor().exists());
}

#[test]
fn test_proxy_without_app_id_fails_in_launch_stage() {
    let fixture = Fixture::new();
    let snapshot = env(&[
        ("VCAP_SERVICES", BINDING),
        ("SPIRE_PROXY_ENABLED", "true"),
    ]);
    let ids = FixedIds::new(7);
    let err = supply_with(&fixture, &snapshot, &ids, &RecordingReporter::default()).unwrap_err();

    assert!(matches!(
        SupplyError::find(&err),
        Some(SupplyError::MissingParameter { key }) if key == "SPIRE_APP_SPIFFE_ID"
    ));
    assert!(format!("{err:#}").starts_with("assemble launch descriptor"));
    assert!(fixture.paths.agent_binary().destination.is_file());
    assert!(!fixture.paths.launch_descriptor().exists());
    assert_eq!(ids.draws.get(), 0);
}

#[test]
fn test_proxy_flag_other_than_true_disables_proxy() {
    for flag in ["yes", "1", "", "false"] {
        let fixture = Fixture::new();
        let snapshot = env(&[("VCAP_SERVICES", BINDING), ("SPIRE_PROXY_ENABLED", flag)]);
        let ids = FixedIds::new(9);
        let report =
            supply_with(&fixture, &snapshot, &ids, &RecordingReporter::default()).unwrap();

        assert!(!report.proxy_enabled, "flag {flag:?} enabled the proxy");
        assert_eq!(ids.draws.get(), 0);
    }
}

#[test]
fn test_fixed_base_id_lands_in_launch_descriptor() {
    let fixture = Fixture::new();
    let snapshot = env(&[
        ("VCAP_SERVICES", BINDING),
        ("SPIRE_PROXY_ENABLED", "TRUE"),
        ("SPIRE_APP_SPIFFE_ID", "spiffe://example.org/web"),
    ]);
    let ids = FixedIds::new(31_337);
    let report = supply_with(&fixture, &snapshot, &ids, &RecordingReporter::default()).unwrap();

    assert_eq!(report.proxy_base_id, Some(31_337));
    assert_eq!(ids.draws.get(), 1);
    let launch = fixture.read(&fixture.paths.launch_descriptor());
    assert_eq!(common::proxy_base_id(&launch), Some(31_337));
}

#[test]
fn test_rerun_keeps_binary_and_rerenders_config() {
    let fixture = Fixture::new();
    supply(&fixture, &env(&[("VCAP_SERVICES", BINDING)])).unwrap();

    let snapshot = env(&[
        ("SPIRE_SERVER_ADDRESS", "10.9.9.9"),
        ("SPIRE_SERVER_PORT", "9090"),
        ("SPIRE_TRUST_DOMAIN", "other.org"),
    ]);
    let report = supply(&fixture, &snapshot).unwrap();

    assert_eq!(report.agent_binary, InstallOutcome::AlreadyPresent);
    assert!(!report.setup.logs_dir_created);
    let conf = fixture.read(&fixture.paths.agent_conf());
    assert!(conf.contains(r#"server_address = "10.9.9.9""#));
    assert!(!conf.contains("10.0.0.5"));
    let launch = fixture.read(&fixture.paths.launch_descriptor());
    assert_eq!(common::process_types(&launch), vec!["spire-agent"]);
}

#[test]
fn test_existing_agent_binary_is_not_overwritten() {
    let fixture = Fixture::new();
    let destination = fixture.paths.agent_binary().destination;
    common::write(&destination, b"pinned");

    let report = supply(&fixture, &env(&[("VCAP_SERVICES", BINDING)])).unwrap();

    assert_eq!(report.agent_binary, InstallOutcome::AlreadyPresent);
    assert_eq!(std::fs::read(destination).unwrap(), b"pinned");
}

#[test]
fn test_svid_store_flag_adds_store_plugin() {
    let fixture = Fixture::new();
    let snapshot = env(&[
        ("VCAP_SERVICES", BINDING),
        ("SPIRE_SVID_STORE_ENABLED", "true"),
    ]);
    supply(&fixture, &snapshot).unwrap();

    let conf = fixture.read(&fixture.paths.agent_conf());
    assert!(conf.contains(r#"SVIDStore "disk""#));
    assert!(conf.contains("/home/vcap/deps/0/bin/plugins/svidstore-disk"));
}

#[test]
fn test_missing_certificates_warn_and_continue() {
    let fixture = Fixture::new();
    std::fs::remove_dir_all(fixture.paths.buildpack_dir.join("certificates")).unwrap();
    let reporter = RecordingReporter::default();

    let report = supply_with(
        &fixture,
        &env(&[("VCAP_SERVICES", BINDING)]),
        &FixedIds::new(1),
        &reporter,
    )
    .unwrap();

    assert_eq!(report.certificates_installed, 0);
    assert_eq!(reporter.warnings(), vec!["no trust bundles found in the buildpack"]);
}

#[test]
fn test_missing_agent_binary_is_install_failure() {
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.paths.agent_binary().source).unwrap();

    let err = supply(&fixture, &env(&[("VCAP_SERVICES", BINDING)])).unwrap_err();

    assert!(matches!(
        SupplyError::find(&err),
        Some(SupplyError::InstallFailed { .. })
    ));
    assert!(format!("{err:#}").starts_with("install agent binary"));
}

#[test]
fn test_missing_template_is_template_error() {
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.paths.template("spire-agent-conf.tmpl")).unwrap();

    let err = supply(&fixture, &env(&[("VCAP_SERVICES", BINDING)])).unwrap_err();

    assert!(matches!(
        SupplyError::find(&err),
        Some(SupplyError::TemplateError { .. })
    ));
}

#[test]
fn test_reporter_sees_stages_in_order() {
    let fixture = Fixture::new();
    let reporter = RecordingReporter::default();
    supply_with(
        &fixture,
        &env(&[("VCAP_SERVICES", BINDING)]),
        &FixedIds::new(1),
        &reporter,
    )
    .unwrap();

    let expected: Vec<String> = Stage::ORDER.iter().map(|s| format!("{s}...")).collect();
    assert_eq!(reporter.steps(), expected);
}

#[test]
fn test_failed_stage_is_last_step_reported() {
    let fixture = Fixture::new();
    let reporter = RecordingReporter::default();
    let _ = supply_with(&fixture, &env(&[]), &FixedIds::new(1), &reporter);

    assert_eq!(
        reporter.steps(),
        vec!["install trust material...", "render agent configuration..."]
    );
}
