//! Integration tests for alc-config.
//!
//! Drive a [`Session`] with file-backed observers attached, then reopen the
//! storage the way a fresh process would.

use alc_config::{
    AnalyticsEvent, AnalyticsObserver, AnalyticsSink, CHAIN_KEY, ChainStore, ConsentStatus,
    FileStorage, Settings, SourceMap, Storage, USER_ID_KEY, set_consent,
};
use alc_core::{BranchRef, Catalog, DeviceDescriptor, ObserverError, Session};
use tempfile::TempDir;

fn catalog() -> Catalog {
    Catalog::new(vec![
        DeviceDescriptor::new(1, "Rio3224-D2", 0.3)
            .with_brand("Yamaha")
            .with_input("Analog", None)
            .with_output("Dante", Some("48kHz"))
            .with_source("yamaha-rio"),
        DeviceDescriptor::new(2, "CL5", 1.1)
            .with_brand("Yamaha")
            .with_input("Dante", Some("48kHz"))
            .with_output("Analog", None),
        DeviceDescriptor::new(3, "Recorder", 0.2).with_input("Dante", Some("48kHz")),
    ])
}

fn open(dir: &TempDir) -> Session {
    let store = ChainStore::new(FileStorage::new(dir.path()));
    let mut session = Session::with_chain(catalog(), store.load_or_empty());
    session.add_observer(Box::new(store));
    session
}

/// Every mutation is written through, so a reopened session sees the same tree.
#[test]
fn test_session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let (chain, split) = {
        let mut session = open(&dir);
        let stagebox = session.catalog().get(1).cloned().unwrap();
        let console = session.catalog().get(2).cloned().unwrap();
        let recorder = session.catalog().get(3).cloned().unwrap();
        let first = session.append_device(&stagebox, None).unwrap().unwrap();
        let split = session.split_at(first).unwrap();
        session.append_device(&console, Some(BranchRef::new(split, 0))).unwrap();
        session.append_device(&recorder, Some(BranchRef::new(split, 1))).unwrap();
        assert!(session.rename_branch(split, 1, "Broadcast"));
        (session.chain().clone(), split)
    };

    let mut session = open(&dir);
    assert_eq!(session.chain(), &chain);
    let labels: Vec<String> = session.all_path_totals().into_iter().map(|p| p.label).collect();
    assert_eq!(labels, vec!["Path A".to_string(), "Broadcast".to_string()]);

    // ids continue above the restored maximum
    let stagebox = session.catalog().get(1).cloned().unwrap();
    let id = session
        .append_device(&stagebox, Some(BranchRef::new(split, 0)))
        .unwrap()
        .unwrap();
    assert!(Some(id) > chain.max_id());
}

/// Clearing the session writes an empty document, not a missing one.
#[test]
fn test_clear_persists_empty_chain() {
    let dir = TempDir::new().unwrap();
    {
        let mut session = open(&dir);
        let stagebox = session.catalog().get(1).cloned().unwrap();
        session.append_device(&stagebox, None).unwrap();
        session.clear();
    }
    let storage = FileStorage::new(dir.path());
    assert_eq!(storage.get(CHAIN_KEY).unwrap().as_deref(), Some("[]"));
    assert!(open(&dir).chain().is_empty());
}

/// A legacy document on disk is migrated on load and rewritten on the next change.
#[test]
fn test_legacy_document_migrates() {
    let dir = TempDir::new().unwrap();
    let legacy = r#"[
        {"id": 1, "name": "Rio3224-D2", "brand": "Yamaha", "latency": 0.3,
         "input_protocol": "Analog", "output_protocol": "Dante", "output_sample_rate": "48kHz",
         "uniqueId": 1718000000000.5, "nickname": "Stage left"}
    ]"#;
    std::fs::write(dir.path().join(CHAIN_KEY), legacy).unwrap();

    let mut session = open(&dir);
    assert_eq!(session.chain().nodes().len(), 1);
    let node = session.chain().nodes()[0].as_device().unwrap();
    assert_eq!(node.display_name(), "Stage left");

    let console = session.catalog().get(2).cloned().unwrap();
    session.append_device(&console, None).unwrap();
    let stored = std::fs::read_to_string(dir.path().join(CHAIN_KEY)).unwrap();
    assert!(stored.contains("\"type\":\"device\""));
    assert!(!stored.contains("uniqueId"));
}

/// A corrupt document is ignored rather than aborting startup.
#[test]
fn test_corrupt_document_starts_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CHAIN_KEY), "{not json").unwrap();
    assert!(open(&dir).chain().is_empty());
}

struct CountingSink(std::rc::Rc<std::cell::Cell<usize>>);

impl AnalyticsSink for CountingSink {
    fn send(&mut self, _event: &AnalyticsEvent) -> Result<(), ObserverError> {
        self.0.set(self.0.get() + 1);
        Ok(())
    }
}

/// Analytics follows the consent stored on disk and mints the user id there.
#[test]
fn test_analytics_uses_file_consent() {
    let dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(dir.path());
    set_consent(&mut storage, ConsentStatus::Accepted).unwrap();

    let sent = std::rc::Rc::new(std::cell::Cell::new(0));
    let mut session = open(&dir);
    session.add_observer(Box::new(AnalyticsObserver::new(
        storage.clone(),
        CountingSink(sent.clone()),
    )));
    let stagebox = session.catalog().get(1).cloned().unwrap();
    let id = session.append_device(&stagebox, None).unwrap().unwrap();
    let split = session.split_at(id).unwrap();
    assert_eq!(sent.get(), 1);
    assert!(storage.get(USER_ID_KEY).unwrap().is_some());

    set_consent(&mut storage, ConsentStatus::Declined).unwrap();
    let console = session.catalog().get(2).cloned().unwrap();
    session.append_device(&console, Some(BranchRef::new(split, 0))).unwrap();
    assert_eq!(sent.get(), 1);
}

/// Settings point the catalog, sources and storage at custom locations.
#[test]
fn test_settings_drive_locations() {
    let dir = TempDir::new().unwrap();
    let catalog_path = dir.path().join("devices.json");
    let sources_path = dir.path().join("sources.json");
    std::fs::write(
        &catalog_path,
        r#"[{"id": 1, "name": "Rio3224-D2", "latency": 0.3, "source": "yamaha-rio"}]"#,
    )
    .unwrap();
    std::fs::write(&sources_path, r#"{"yamaha-rio": "https://example.com/rio"}"#).unwrap();

    let settings_path = dir.path().join("config/settings.toml");
    Settings {
        catalog_path: Some(catalog_path),
        sources_path: Some(sources_path),
        storage_dir: Some(dir.path().join("storage")),
        ..Settings::default()
    }
    .save(&settings_path)
    .unwrap();

    let settings = Settings::load_or_default(&settings_path);
    let catalog = Catalog::load(settings.catalog_path()).unwrap();
    let sources = SourceMap::load_or_empty(settings.sources_path());
    let device = catalog.get(1).unwrap();
    assert_eq!(sources.url_for(device.source.as_deref()), Some("https://example.com/rio"));
    assert!(settings.storage_dir().ends_with("storage"));
}
