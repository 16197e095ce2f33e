use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use sp_model::ModelSnapshot;
use sp_results::{DumpStore, ResultsError, SequenceFailure, drain_or_dump};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn snapshot(ec: f64, r_ratio: f64) -> ModelSnapshot {
    ModelSnapshot {
        mass: 1.8,
        rest_mass: 1.98,
        r_ratio,
        radius: 12.5,
        omega: 4000.0,
        omega_k: 9000.0,
        angular_momentum: 0.9,
        kinetic_energy: 1800.0,
        proper_mass: 1.9,
        ec,
    }
}

#[test]
fn dump_then_load() {
    let dir = unique_temp_dir("sp_results_dump");
    let store = DumpStore::new(dir.clone()).expect("create store");

    let records = [snapshot(1.0, 0.9), snapshot(1.01, 0.88)];
    let info = store.dump("spin-down", records.iter()).expect("dump");
    assert_eq!(info.records, 2);
    assert_eq!(info.label, "spin-down");
    assert!(info.path.starts_with(&dir));

    let loaded = store.load(&info.path).expect("load");
    assert_eq!(loaded, records.to_vec());

    let raw = fs::read_to_string(&info.path).expect("read dump");
    assert!(raw.contains("\"M0\""));
    assert!(raw.contains("\"Omega_K\""));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn repeated_dumps_never_overwrite() {
    let dir = unique_temp_dir("sp_results_list");
    let store = DumpStore::new(dir.clone()).expect("create store");

    let a = store.dump("sweep", [snapshot(1.0, 0.9)].iter()).expect("dump a");
    let b = store.dump("sweep", [snapshot(1.1, 0.8)].iter()).expect("dump b");
    assert_ne!(a.path, b.path);

    let listed = store.list().expect("list");
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&a.path));
    assert!(listed.contains(&b.path));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_dump_is_not_found() {
    let dir = unique_temp_dir("sp_results_missing");
    let store = DumpStore::new(dir.clone()).expect("create store");
    let err = store.load(&dir.join("nope.json")).unwrap_err();
    assert!(matches!(err, ResultsError::NotFound { .. }));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn successful_sequence_is_collected() {
    let dir = unique_temp_dir("sp_results_ok");
    let store = DumpStore::new(dir.clone()).expect("create store");

    let sequence = (0..3).map(|i| Ok::<_, io::Error>(Arc::new(snapshot(1.0 + i as f64, 0.9))));
    let collected = drain_or_dump(sequence, &store, "ok").expect("drain");
    assert_eq!(collected.len(), 3);
    assert_eq!(collected[2].ec, 3.0);
    assert!(store.list().expect("list").is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn failed_sequence_dumps_partial_result() {
    let dir = unique_temp_dir("sp_results_fail");
    let store = DumpStore::new(dir.clone()).expect("create store");

    let sequence = vec![
        Ok(Arc::new(snapshot(1.0, 0.9))),
        Ok(Arc::new(snapshot(1.01, 0.89))),
        Err(io::Error::other("relaxation diverged")),
        Ok(Arc::new(snapshot(1.02, 0.88))),
    ];
    let failure = drain_or_dump(sequence, &store, "spin down").unwrap_err();
    assert_eq!(failure.cause().to_string(), "relaxation diverged");

    match failure {
        SequenceFailure::Dumped { path, records, .. } => {
            assert_eq!(records, 2);
            let loaded = store.load(&path).expect("load partial");
            assert_eq!(loaded.len(), 2);
            assert_eq!(loaded[1].r_ratio, 0.89);
        }
        other => panic!("expected a dump, got {other}"),
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn failed_dump_is_reported() {
    let dir = unique_temp_dir("sp_results_unwritable");
    let store = DumpStore::new(dir.clone()).expect("create store");
    fs::remove_dir_all(&dir).expect("remove store dir");

    let sequence = vec![
        Ok(Arc::new(snapshot(1.0, 0.9))),
        Err(io::Error::other("boom")),
    ];
    let failure = drain_or_dump(sequence, &store, "lost").unwrap_err();
    assert!(matches!(
        failure,
        SequenceFailure::DumpFailed { records: 1, .. }
    ));
}
