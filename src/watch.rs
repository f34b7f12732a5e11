//! Filesystem change notifications for the watched document.
//!
//! The parent directory is watched rather than the file itself: editors that
//! save by rename would otherwise drop the watch after the first write.

use std::ffi::OsString;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::error::TocError;
use crate::host::{DocumentSource, RenderTarget, TocEvent, TocPanel};

/// Run the panel against `path`, recomputing on every change burst.
/// Blocks until the watcher shuts down.
pub fn watch<S, R>(path: &Path, panel: &TocPanel<S, R>, debounce: Duration) -> Result<(), TocError>
where
    S: DocumentSource,
    R: RenderTarget,
{
    let file_name = path
        .file_name()
        .map(OsString::from)
        .ok_or_else(|| TocError::InvalidArgs(format!("{} is not a file path", path.display())))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    info!(path = %path.display(), "watching for changes");

    panel.start();
    debounce_loop(&rx, &file_name, debounce, || {
        panel.handle(TocEvent::ContentChanged);
    });
    Ok(())
}

/// Collapse bursts of events for `file_name` into single callbacks. Returns
/// when the sending side is dropped.
pub(crate) fn debounce_loop(
    rx: &Receiver<notify::Result<Event>>,
    file_name: &OsString,
    debounce: Duration,
    mut on_change: impl FnMut(),
) {
    while let Ok(first) = rx.recv() {
        if !is_relevant(&first, file_name) {
            continue;
        }
        loop {
            match rx.recv_timeout(debounce) {
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    on_change();
                    return;
                }
            }
        }
        debug!("change burst settled");
        on_change();
    }
}

fn is_relevant(event: &notify::Result<Event>, file_name: &OsString) -> bool {
    match event {
        Ok(ev) => {
            !matches!(ev.kind, EventKind::Access(_))
                && ev
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(file_name.as_os_str()))
        }
        Err(e) => {
            warn!(error = %e, "watch error");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, ModifyKind};
    use std::path::PathBuf;

    fn modify(path: &str) -> notify::Result<Event> {
        Ok(Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from(path)))
    }

    #[test]
    fn burst_collapses_to_one_change() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..5 {
            tx.send(modify("/notes/a.md")).unwrap();
        }
        drop(tx);

        let mut changes = 0;
        debounce_loop(&rx, &OsString::from("a.md"), Duration::from_millis(10), || {
            changes += 1;
        });
        assert_eq!(changes, 1);
    }

    #[test]
    fn other_files_and_reads_are_ignored() {
        let (tx, rx) = mpsc::channel();
        tx.send(modify("/notes/b.md")).unwrap();
        tx.send(Ok(
            Event::new(EventKind::Access(AccessKind::Any)).add_path(PathBuf::from("/notes/a.md"))
        ))
        .unwrap();
        tx.send(Err(notify::Error::generic("boom"))).unwrap();
        drop(tx);

        let mut changes = 0;
        debounce_loop(&rx, &OsString::from("a.md"), Duration::from_millis(10), || {
            changes += 1;
        });
        assert_eq!(changes, 0);
    }

    #[test]
    fn separated_bursts_each_trigger() {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            tx.send(modify("a.md")).unwrap();
            std::thread::sleep(Duration::from_millis(100));
            tx.send(modify("a.md")).unwrap();
        });

        let mut changes = 0;
        debounce_loop(&rx, &OsString::from("a.md"), Duration::from_millis(20), || {
            changes += 1;
        });
        handle.join().unwrap();
        assert_eq!(changes, 2);
    }
}
