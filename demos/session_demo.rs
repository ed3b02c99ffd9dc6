use widget_sync::component::ComponentId;
use widget_sync::input::ClientInput;
use widget_sync::peer;
use widget_sync::session::SessionId;
use widget_sync::widgets::{self, props};
use widget_sync::{EngineConfig, SyncEngine, SyncError};

use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), SyncError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    // Configure the engine through the config builder. Limits cannot be changed once the engine
    // is created.
    let engine_cfg = EngineConfig::builder()
        .max_sessions(16)
        .max_style_depth(8)
        .build()?;

    // Peers are registered once for the whole process. Every session shares the same registry.
    let peers = peer::install_global(widgets::standard_peers())?;
    let engine = SyncEngine::new(Some(engine_cfg), widgets::standard_types(), Arc::clone(&peers))?;

    // Subscribe before creating sessions, events sent earlier are not replayed.
    let mut event_rx = engine.subscribe_events();
    let printer = tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            println!("[event] {event}");
        }
    });

    // One session per connected client. Its tree starts out with a single window.
    let session = engine.create_session(widgets::WINDOW)?;

    // Build the screen: a split pane with a column of labels on the left and a text area on the
    // right.
    let mut area = None;
    let mut status = None;
    engine.process_cycle(session, vec![], |tree| {
        let root = tree.root();
        tree.set_property(root, props::TITLE, "Demo")?;

        let pane = tree.create(widgets::CONTENT_PANE)?;
        let split = tree.create(widgets::SPLIT_PANE)?;
        let column = tree.create(widgets::COLUMN)?;
        let text = tree.create(widgets::TEXT_AREA_EX)?;
        tree.add_child(root, pane, None)?;
        tree.add_child(pane, split, None)?;
        tree.add_child(split, column, None)?;
        tree.add_child(split, text, None)?;

        let label = tree.create(widgets::LABEL)?;
        tree.set_property(label, props::TEXT, "Type something")?;
        tree.add_child(column, label, None)?;

        area = Some(text);
        status = Some(label);
        Ok(())
    })?;
    let (area, status) = match (area, status) {
        (Some(a), Some(s)) => (a, s),
        _ => return Ok(()),
    };

    // A freshly connected client gets the full tree.
    let initial = engine.render_initial(session)?;
    print_operations("initial", &initial.to_json());

    // The client typed into the text area and sent a stale field an older version knew about.
    let inputs = vec![
        ClientInput::new(area, props::TEXT, "hello"),
        ClientInput::new(area, "legacyField", "x"),
    ];
    let output = engine.process_cycle(session, inputs, |tree| {
        tree.set_property(status, props::TEXT, "Thanks!")?;
        Ok(())
    })?;
    println!("inputs: {} applied, {} ignored", output.inputs.applied.len(), output.inputs.ignored.len());
    print_operations("cycle", &output.operations.to_json());

    // A failing cycle leaves the tree as it was.
    let err = engine
        .process_cycle(session, vec![], |tree| {
            let root = tree.root();
            let extra = tree.create(widgets::LABEL)?;
            tree.add_child(root, extra, None)?;
            Ok(())
        })
        .err();
    if let Some(err) = err {
        println!("rejected: {err}");
    }

    show_text(&engine, session, area)?;

    engine.remove_session(session)?;
    drop(engine);
    let _ = printer.await;
    Ok(())
}

fn print_operations(label: &str, json: &serde_json::Result<String>) {
    match json {
        Ok(json) => println!("{label}: {json}"),
        Err(e) => eprintln!("{label}: cannot serialize: {e}"),
    }
}

fn show_text(engine: &SyncEngine, session: SessionId, area: ComponentId) -> Result<(), SyncError> {
    engine.with_session(session, |s| {
        if let Some(text) = s.tree().property(area, props::TEXT)? {
            println!("text area now holds: {text}");
        }
        Ok(())
    })
}
