use std::io::Write;

use sso::{open_store, NodeConfig, NodeError, SsoNode};
use sso::core::{Filter, UserRecord};
use sso::store::{SaveOptions, UserStore};
use sso_testkit::fixtures::user;

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("sso.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn test_loads_full_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "webserverModuleName": "http",
            "sync": [
                {"name": "eu", "link": "https://eu.example.com/", "auth": "k-eu",
                 "paths": ["username", "email"]},
                {"name": "us", "link": "https://us.example.com", "auth": "k-us"}
            ],
            "listen": "0.0.0.0:9000",
            "requestTimeoutMs": 1500
        }"#,
    );

    let config = NodeConfig::load(&path).unwrap();
    assert_eq!(config.webserver_module_name, "http");
    assert_eq!(config.auth_module_name, "auth");
    assert_eq!(config.sync.len(), 2);
    assert_eq!(config.sync.peers()[0].endpoint("/sso/sync"), "https://eu.example.com/sso/sync");
    assert_eq!(config.listen, "0.0.0.0:9000");
    assert_eq!(config.request_timeout_ms, 1500);
}

#[test]
fn test_missing_file_is_config_io() {
    let dir = tempfile::tempdir().unwrap();
    let err = NodeConfig::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, NodeError::ConfigIo { .. }));
}

#[test]
fn test_duplicate_auth_is_accepted() {
    let config = NodeConfig::from_json_str(
        r#"{"sync": [
            {"name": "a", "link": "http://a", "auth": "same"},
            {"name": "b", "link": "http://b", "auth": "same"}
        ]}"#,
    )
    .unwrap();
    assert_eq!(config.sync.shadowed_peers(), vec!["b"]);
}

#[tokio::test]
async fn test_sqlite_store_survives_node_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = NodeConfig::default().with_database(dir.path().join("users.db"));

    {
        let node = SsoNode::with_http(config.clone(), open_store(&config).unwrap()).unwrap();
        let mut record = UserRecord::from_fields(user("alice", "alice@example.com"));
        node.store().save(&mut record, SaveOptions::default()).await.unwrap();
    }

    let node = SsoNode::with_http(config.clone(), open_store(&config).unwrap()).unwrap();
    let found = node
        .store()
        .find_one(&Filter::by("email", "alice@example.com"))
        .await
        .unwrap();
    assert!(found.is_some());
}
