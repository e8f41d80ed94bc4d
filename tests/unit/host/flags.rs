use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("unit_flags")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn memory_store_defaults_to_unset_and_shares_state() {
    let mut a = MemoryFlagStore::new();
    let b = a.clone();
    assert!(!b.get(ONBOARDING_FLAG).unwrap());
    a.set(ONBOARDING_FLAG, true).unwrap();
    assert!(b.get(ONBOARDING_FLAG).unwrap());
}

#[test]
fn json_store_persists_across_instances() {
    let path = scratch("persist").join("flags.json");
    let mut store = JsonFlagStore::new(&path);
    assert!(!store.get(ONBOARDING_FLAG).unwrap());
    store.set(ONBOARDING_FLAG, true).unwrap();
    store.set("other", false).unwrap();

    let reopened = JsonFlagStore::new(&path);
    assert!(reopened.get(ONBOARDING_FLAG).unwrap());
    assert!(!reopened.get("other").unwrap());
    assert!(!reopened.get("missing").unwrap());
}

#[test]
fn json_store_reports_corrupt_file() {
    let dir = scratch("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("flags.json");
    std::fs::write(&path, "not json").unwrap();
    let err = JsonFlagStore::new(&path).get(ONBOARDING_FLAG).unwrap_err();
    assert!(matches!(err, MirrorError::Serde(_)));
}
