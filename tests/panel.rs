use std::fs;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use notetoc::host::{
    Document, DocumentSource, NavigationMessage, PanelView, RenderTarget, TocEvent, TocPanel,
};
use notetoc::read::FileSource;
use notetoc::{Toc, TocError};

#[derive(Default)]
struct Recorder(Mutex<Vec<PanelView>>);

impl RenderTarget for Recorder {
    fn render(&self, view: &PanelView) {
        self.0.lock().unwrap().push(view.clone());
    }
}

impl Recorder {
    fn tocs(&self) -> Vec<Toc> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter_map(|v| match v {
                PanelView::Toc(t) => Some(t.clone()),
                PanelView::Loading => None,
            })
            .collect()
    }
}

/// First read blocks until released; later reads return immediately.
struct GatedSource {
    entered: Mutex<Option<Sender<()>>>,
    gate: Mutex<Receiver<()>>,
    bodies: Mutex<Vec<&'static str>>,
}

impl DocumentSource for GatedSource {
    fn selected(&self) -> Result<Option<Document>, TocError> {
        if let Some(entered) = self.entered.lock().unwrap().take() {
            entered.send(()).unwrap();
            self.gate.lock().unwrap().recv().unwrap();
        }
        let body = self.bodies.lock().unwrap().remove(0);
        Ok(Some(Document {
            id: "note".into(),
            body: body.into(),
        }))
    }
}

#[test]
fn newer_event_discards_in_flight_pass() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel();
    let source = GatedSource {
        entered: Mutex::new(Some(entered_tx)),
        gate: Mutex::new(gate_rx),
        bodies: Mutex::new(vec!["# Stale", "# Fresh"]),
    };
    let panel = Arc::new(TocPanel::new(source, Recorder::default()));

    let first = {
        let panel = Arc::clone(&panel);
        thread::spawn(move || panel.handle(TocEvent::SelectionChanged))
    };
    entered_rx.recv().unwrap();

    let second = {
        let panel = Arc::clone(&panel);
        thread::spawn(move || panel.handle(TocEvent::ContentChanged))
    };
    while panel.generation() < 2 {
        thread::sleep(Duration::from_millis(1));
    }
    gate_tx.send(()).unwrap();

    assert!(first.join().unwrap().is_none());
    let fresh = second.join().unwrap().unwrap();
    assert_eq!(fresh.entries()[0].slug, "fresh");

    let rendered = panel.target().tocs();
    assert_eq!(rendered, vec![fresh]);
}

#[test]
fn file_backed_panel_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.md");
    let b = dir.path().join("b.md");
    fs::write(&a, "# Notes\n## Todo\n## Todo\n").unwrap();
    fs::write(&b, "# Notes\n").unwrap();

    let panel = TocPanel::new(FileSource::default(), Recorder::default());
    panel.start();
    assert_eq!(panel.current(), Some(Toc::NoDocument));

    panel.source().select(a.clone());
    let toc = panel.handle(TocEvent::SelectionChanged).unwrap();
    let slugs: Vec<&str> = toc.entries().iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, ["notes", "todo", "todo-2"]);

    let target = panel.navigate(&NavigationMessage::scroll_to("todo-2")).unwrap();
    assert_eq!(target.line, 3);

    // Switching notes starts numbering over
    panel.source().select(b);
    let toc = panel.handle(TocEvent::SelectionChanged).unwrap();
    assert_eq!(toc.entries().len(), 1);
    assert_eq!(toc.entries()[0].slug, "notes");
    assert!(panel.navigate(&NavigationMessage::scroll_to("todo-2")).is_none());

    // A selected note that vanished reads as nothing selected
    panel.source().select(a.clone());
    fs::remove_file(&a).unwrap();
    let toc = panel.handle(TocEvent::ContentChanged).unwrap();
    assert_eq!(toc, Toc::NoDocument);
}
