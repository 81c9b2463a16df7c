//! Marks and configuration against the real filesystem.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use chartnav_audio::ManualScheduler;
use chartnav_core::Position;
use chartnav_modality::{BufferedNarration, TextMode};
use chartnav_runtime::{
    EngineConfig, Engine, Figure, Intent, JsonFileStorage, LineModel, SharedStorage, Storage, Trace,
};

fn figure() -> Figure {
    let model = LineModel::single(vec![(0.0, 2.0), (1.0, 4.0), (2.0, 3.0), (3.0, 8.0)]).unwrap();
    Figure::single("temps", Trace::new("line", model).unwrap()).unwrap()
}

fn engine(storage: SharedStorage, config: EngineConfig) -> (Engine, Rc<RefCell<BufferedNarration>>) {
    let narration = BufferedNarration::shared();
    let engine = Engine::builder(figure())
        .config(config)
        .storage(storage)
        .narration(narration.clone())
        .scheduler(Arc::new(ManualScheduler::new()))
        .build()
        .unwrap();
    (engine, narration)
}

#[test]
fn marks_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let storage: SharedStorage = Rc::new(RefCell::new(JsonFileStorage::open(dir.path()).unwrap()));

    let (mut first, _) = engine(storage.clone(), EngineConfig::default());
    assert!(first.handle(Intent::MoveToIndex { row: 0, col: 2 }));
    assert!(first.handle(Intent::MarkSet(3)));
    drop(first);

    let path = dir.path().join("chartnav.marks.temps.json");
    assert!(path.exists());
    assert!(!dir.path().join("chartnav.marks.temps.json.tmp").exists());

    let (mut second, narration) = engine(storage, EngineConfig::default());
    let (slot, mark) = second.marks().marks().next().unwrap();
    assert_eq!((slot, mark.col), (3, 2));
    assert!(second.handle(Intent::MarkJump(3)));
    assert_eq!(second.state().position, Position::new(0, 2));
    assert_eq!(narration.borrow().last(), Some("Jumped to mark 3"));
}

#[test]
fn document_layout_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Rc::new(RefCell::new(JsonFileStorage::open(dir.path()).unwrap()));
    let (mut engine, _) = engine(storage.clone(), EngineConfig::default());
    engine.handle(Intent::MoveToIndex { row: 0, col: 1 });
    engine.handle(Intent::MarkSet(0));

    let doc = storage.borrow().load("chartnav.marks.temps").unwrap().unwrap();
    assert_eq!(doc["figureId"], "temps");
    assert_eq!(doc["marks"]["0"]["traceId"], "line");
    assert_eq!(doc["marks"]["0"]["col"], 1);
    assert!(doc["marks"]["0"]["verboseText"].as_str().unwrap().contains("is 4"));
    assert!(doc["marks"]["0"]["terseText"].is_string());
    assert!(doc["marks"]["0"].get("trace_id").is_none());
}

#[test]
fn toml_file_configures_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chartnav.toml");
    std::fs::write(
        &path,
        "[text]\nmode = \"terse\"\n\n[marks]\npersist = false\n\n[autoplay]\ntotal_duration_ms = 1000\n",
    )
    .unwrap();
    let config = EngineConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.text.mode, TextMode::Terse);

    let storage = Rc::new(RefCell::new(JsonFileStorage::open(dir.path().join("state")).unwrap()));
    let (mut engine, narration) = engine(storage.clone(), config);
    assert_eq!(engine.text_mode(), TextMode::Terse);
    engine.handle(Intent::Move(chartnav_core::NavDirection::Right));
    assert_eq!(narration.borrow().last(), Some("0, 2"));

    engine.handle(Intent::MarkSet(1));
    assert!(storage.borrow().load("chartnav.marks.temps").unwrap().is_none());
}
