// crates/sync-engine/examples/sync_demo.rs
//! Demonstration of the offline-first sync engine

use livepatch_core::Document;
use livepatch_storage::MemoryStore;
use livepatch_sync_engine::{
    InMemoryRemoteStore, NullObserver, RemoteDocumentStore, SyncConfig, SyncEngine, SyncObserver,
};
use std::sync::Arc;

struct ConsoleObserver;

impl SyncObserver for ConsoleObserver {
    fn connectivity_changed(&self, connected: bool) {
        println!("  [{}]", if connected { "connected" } else { "offline" });
    }

    fn queue_length_changed(&self, pending: usize) {
        if pending > 0 {
            println!("  [{pending} change(s) pending]");
        }
    }

    fn sync_finished(&self, success: bool) {
        println!(
            "  [{}]",
            if success { "sync complete" } else { "sync failed" }
        );
    }
}

fn main() {
    env_logger::init();

    println!("Livepatch Sync Engine Demo");
    println!("==========================\n");

    demo_basic_editing();
    println!();
    demo_offline_queueing();
    println!();
    demo_collaboration();
}

fn demo_basic_editing() {
    println!("1. Basic Editing");
    println!("----------------");

    let remote = Arc::new(InMemoryRemoteStore::new());
    let engine = SyncEngine::new(
        SyncConfig::default(),
        remote.clone(),
        Arc::new(MemoryStore::new()),
        Arc::new(NullObserver),
    );

    let id = engine.create_resource("Festival Lineup").unwrap();
    println!("Created resource: {id}");

    engine.bind(&id).unwrap();
    println!("Bound, state: {:?}", engine.state());

    let mut doc = engine.document().unwrap();
    doc.set_column_header(0, "Time");
    doc.set_column_header(1, "Main Stage");
    doc.set_cell(0, 0, "20:00", None);
    doc.set_cell(0, 1, "Opening Act", None);
    engine.apply_edit(doc).unwrap();

    let synced = remote.document(&id).unwrap();
    println!(
        "Remote now has '{}' at 20:00",
        synced.cell(0, 1).map(|c| c.value.as_str()).unwrap_or("")
    );
}

fn demo_offline_queueing() {
    println!("2. Offline Queueing");
    println!("-------------------");

    let remote = Arc::new(InMemoryRemoteStore::new());
    let local = Arc::new(MemoryStore::new());
    let engine = SyncEngine::new(
        SyncConfig::default(),
        remote.clone(),
        local,
        Arc::new(ConsoleObserver),
    );

    let id = engine.create_resource("Road Trip Plan").unwrap();
    engine.bind(&id).unwrap();

    println!("\nDevice goes offline:");
    engine.set_device_online(false).unwrap();

    for stop in ["Lyon", "Marseille", "Nice"] {
        let mut doc = engine.document().unwrap();
        doc.set_cell(0, 0, stop, None);
        engine.apply_edit(doc).unwrap();
    }
    println!("Queued edits while offline: {}", engine.queue_len());

    println!("\nDevice comes back online:");
    engine.set_device_online(true).unwrap();

    println!(
        "Remote ended up with the final edit: '{}'",
        remote
            .document(&id)
            .and_then(|d| d.cell(0, 0).map(|c| c.value.clone()))
            .unwrap_or_default()
    );
}

fn demo_collaboration() {
    println!("3. Collaboration");
    println!("----------------");

    let remote = Arc::new(InMemoryRemoteStore::new());
    let laptop = SyncEngine::new(
        SyncConfig::default(),
        remote.clone(),
        Arc::new(MemoryStore::new()),
        Arc::new(NullObserver),
    );
    let phone = SyncEngine::new(
        SyncConfig::default(),
        remote.clone(),
        Arc::new(MemoryStore::new()),
        Arc::new(NullObserver),
    );

    remote
        .write_whole("shared-sheet", &Document::titled("Shared Sheet"))
        .unwrap();
    laptop.bind("shared-sheet").unwrap();
    phone.bind("shared-sheet").unwrap();

    println!("Laptop renames the sheet");
    let mut doc = laptop.document().unwrap();
    doc.set_title("Saturday Plan");
    laptop.apply_edit(doc).unwrap();

    println!(
        "Phone sees: '{}'",
        phone.document().unwrap().metadata.title
    );
}
