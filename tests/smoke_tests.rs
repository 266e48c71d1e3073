mod common;

use common::{MockRunner, Reply};
use outlook_calendar::bridge::Action;
use outlook_calendar::components::outlook_calendar::OutlookCalendar;
use outlook_calendar::components::ComponentManager;
use outlook_calendar::config::Config;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.interpreter, "powershell.exe");
    assert_eq!(config.timeout_secs, 120);
    assert!(config.script_path.ends_with("scripts/outlook-calendar.ps1"));
    assert!(config.bridge_config().timeout.is_some());
}

#[test]
fn test_load_from_file_with_environment_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bridge.toml");
    std::fs::write(&path, "interpreter = \"pwsh\"\ntimeout_secs = 45\n").unwrap();

    std::env::set_var("OUTLOOK_SCRIPT_PATH", "/srv/outlook/outlook-calendar.ps1");
    let config = Config::load_from(&path).unwrap();
    std::env::remove_var("OUTLOOK_SCRIPT_PATH");

    assert_eq!(config.interpreter, "pwsh");
    assert_eq!(config.timeout_secs, 45);
    assert_eq!(
        config.script_path,
        std::path::PathBuf::from("/srv/outlook/outlook-calendar.ps1")
    );
}

#[tokio::test]
async fn test_component_manager_lifecycle() {
    let runner = Arc::new(MockRunner::new().reply(Action::List, Reply::Payload(json!([]))));
    let mut manager = ComponentManager::new(Arc::new(RwLock::new(Config::default())));
    manager.register(OutlookCalendar::with_runner(runner.clone()));

    assert!(manager.outlook_calendar().await.is_none());
    manager.init_all().await.unwrap();

    let handle = manager
        .outlook_calendar()
        .await
        .expect("calendar handle after init");
    let events = handle.list_events(None, None).await.unwrap();
    assert!(events.is_empty());
    assert_eq!(runner.calls().len(), 1);

    manager.shutdown_all().await.unwrap();
    assert!(manager.get_component_by_name("outlook_calendar").is_some());
    assert!(manager.get_component_by_name("google_calendar").is_none());
}
