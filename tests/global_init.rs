//! The process-wide facility is installed once per process, so each test
//! binary under tests/ gets exactly one scenario.

use std::fs;
use std::sync::Arc;

use applog::config::LogSettings;
use applog::{Destination, LogLevel};

#[test]
fn test_second_init_has_no_effect() {
    let tmp = tempfile::tempdir().unwrap();
    let first_path = tmp.path().join("first").join("app.log");
    let second_path = tmp.path().join("second").join("app.log");

    assert!(applog::try_global().is_none());

    let first = applog::init(&LogSettings {
        screen_level: "warn".to_string(),
        file_path: first_path.display().to_string(),
        file_level: "error".to_string(),
        ..LogSettings::default()
    });
    let second = applog::init(&LogSettings {
        screen_level: "debug".to_string(),
        file_path: second_path.display().to_string(),
        file_level: "debug".to_string(),
        ..LogSettings::default()
    });

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &applog::global()));
    assert_eq!(second.screen_level(), LogLevel::Warn);
    assert_eq!(second.effective_level(), LogLevel::Warn);
    assert_eq!(
        second.destinations(),
        vec![Destination::Console, Destination::File(first_path.clone())]
    );
    assert!(!tmp.path().join("second").exists());

    second.debug("dropped");
    second.warn("kept");
    let contents = fs::read_to_string(&first_path).unwrap();
    assert!(contents.contains("kept"));
    assert!(!contents.contains("dropped"));
}
