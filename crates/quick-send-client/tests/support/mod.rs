// SPDX-License-Identifier: AGPL-3.0
// Quick Send Client - Test doubles for the engine and frontend services

#![allow(dead_code)]

use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use quick_send_client::{
    AppSettings, Clipboard, EngineBridge, EngineEvent, FileDialog, FileSelection, Notification,
    NotificationId, NotificationLevel, Notifier, QueueSnapshot, QuickSendApp, RawEvent, ShareCode,
    TransferEngine,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TICKET: &str = "docaaacb4k2quicksend";
pub const SHARE_TICKET: &str = "docaaashare";
pub const DOWNLOAD_DIR: &str = "/downloads/quick_send";

const WAIT: Duration = Duration::from_secs(2);

/// In-memory engine that emits the same push events a real one would
pub struct FakeEngine {
    events: Sender<RawEvent>,
    sizes: HashMap<PathBuf, u64>,
    stalled: HashSet<PathBuf>,
    downloads: Vec<(String, u64)>,
    sessions: Mutex<VecDeque<Vec<(String, u64)>>>,
    send_set: Mutex<Vec<PathBuf>>,
    removed: Mutex<Vec<PathBuf>>,
    share_requests: AtomicUsize,
    fetch_gate: Option<Receiver<()>>,
}

impl FakeEngine {
    pub fn new() -> (Self, Receiver<RawEvent>) {
        let (events, events_rx) = async_channel::unbounded();
        let engine = Self {
            events,
            sizes: HashMap::new(),
            stalled: HashSet::new(),
            downloads: Vec::new(),
            sessions: Mutex::new(VecDeque::new()),
            send_set: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            share_requests: AtomicUsize::new(0),
            fetch_gate: None,
        };
        (engine, events_rx)
    }

    pub fn with_file(mut self, path: &str, size: u64) -> Self {
        self.sizes.insert(PathBuf::from(path), size);
        self
    }

    /// A file whose import reports some progress and then never finishes
    pub fn with_stalled_file(mut self, path: &str, size: u64) -> Self {
        self.sizes.insert(PathBuf::from(path), size);
        self.stalled.insert(PathBuf::from(path));
        self
    }

    pub fn with_download(mut self, name: &str, size: u64) -> Self {
        self.downloads.push((name.to_string(), size));
        self
    }

    /// Files for one fetch; fetches use queued sessions in order, then
    /// fall back to the files added with `with_download`
    pub fn with_session(self, files: &[(&str, u64)]) -> Self {
        self.sessions.lock().unwrap().push_back(
            files
                .iter()
                .map(|(name, size)| (name.to_string(), *size))
                .collect(),
        );
        self
    }

    /// Fetches wait for a message on the returned sender before finishing
    pub fn holding_fetches(mut self) -> (Self, Sender<()>) {
        let (release, gate) = async_channel::unbounded();
        self.fetch_gate = Some(gate);
        (self, release)
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed.lock().unwrap().clone()
    }

    pub fn share_requests(&self) -> usize {
        self.share_requests.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Sender<RawEvent> {
        self.events.clone()
    }

    async fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event.to_raw()).await;
    }
}

#[async_trait]
impl TransferEngine for FakeEngine {
    async fn fetch_by_ticket(&self, ticket: &str) -> Result<String, String> {
        if ticket != TICKET {
            return Err("invalid ticket".to_string());
        }

        let files = self
            .sessions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.downloads.clone());

        for (name, size) in &files {
            let id = format!("{}/{}", DOWNLOAD_DIR, name);
            self.emit(EngineEvent::DownloadAppend {
                id: id.clone().into(),
                name: id.clone(),
                size: *size,
            })
            .await;
            self.emit(EngineEvent::DownloadProgress {
                id: id.clone().into(),
                offset: size / 2,
            })
            .await;
            self.emit(EngineEvent::DownloadDone { id: id.into() }).await;
        }

        if let Some(gate) = &self.fetch_gate {
            let _ = gate.recv().await;
        }

        Ok(format!("Files downloaded at {}", DOWNLOAD_DIR))
    }

    async fn request_share_code(&self) -> Result<ShareCode, String> {
        self.share_requests.fetch_add(1, Ordering::SeqCst);
        Ok(ShareCode {
            share_ticket: SHARE_TICKET.to_string(),
        })
    }

    async fn add_file(&self, path: &Path) -> Result<(), String> {
        let name = path
            .file_name()
            .ok_or_else(|| "File does not have a name".to_string())?
            .to_string_lossy()
            .to_string();
        let size = *self
            .sizes
            .get(path)
            .ok_or_else(|| format!("File not found: {}", path.display()))?;

        {
            let mut send_set = self.send_set.lock().unwrap();
            if send_set.iter().any(|p| p.file_name() == path.file_name()) {
                return Err(format!("Duplicated file name '{}' is not allowed", name));
            }
            send_set.push(path.to_path_buf());
        }

        let id = path.display().to_string();
        self.emit(EngineEvent::UploadAppend {
            id: id.clone().into(),
            title: name,
            size,
        })
        .await;
        self.emit(EngineEvent::UploadProgress {
            id: id.clone().into(),
            offset: size / 2,
        })
        .await;
        if !self.stalled.contains(path) {
            self.emit(EngineEvent::UploadAllDone { id: id.into() }).await;
        }
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> Result<(), String> {
        self.send_set.lock().unwrap().retain(|p| p != path);
        self.removed.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// File picker that replays queued selections, then cancels
#[derive(Default)]
pub struct FakeDialog {
    selections: Mutex<VecDeque<FileSelection>>,
}

impl FakeDialog {
    pub fn select(&self, paths: &[&str]) {
        self.selections.lock().unwrap().push_back(FileSelection::Selected(
            paths.iter().map(PathBuf::from).collect(),
        ));
    }
}

#[async_trait]
impl FileDialog for FakeDialog {
    async fn pick_files(&self, _title: &str) -> FileSelection {
        self.selections
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FileSelection::Cancelled)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    next_id: AtomicUsize,
    shown: Mutex<Vec<(NotificationId, Notification)>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<(NotificationId, Notification)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|(_, n)| n.level == NotificationLevel::Error)
            .map(|(_, n)| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, notification: Notification) -> NotificationId {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::SeqCst) as u64);
        self.shown.lock().unwrap().push((id, notification));
        id
    }

    fn update(&self, id: NotificationId, notification: Notification) {
        self.shown.lock().unwrap().push((id, notification));
    }
}

#[derive(Default)]
pub struct MemoryClipboard {
    pub text: Mutex<Option<String>>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        *self.text.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub app: QuickSendApp,
    pub bridge: EngineBridge,
    pub engine: Arc<FakeEngine>,
    pub dialog: Arc<FakeDialog>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness(engine: FakeEngine, events: Receiver<RawEvent>) -> Harness {
    let settings = AppSettings::default();
    let engine = Arc::new(engine);
    let dialog = Arc::new(FakeDialog::default());
    let notifier = Arc::new(RecordingNotifier::default());

    let bridge = EngineBridge::new(engine.clone(), events, &settings);
    let app = QuickSendApp::new(&bridge, dialog.clone(), notifier.clone(), settings)
        .expect("app should start");

    Harness {
        app,
        bridge,
        engine,
        dialog,
        notifier,
    }
}

/// Wait until the published queues satisfy `check`
pub async fn wait_for(
    app: &QuickSendApp,
    check: impl FnMut(&QueueSnapshot) -> bool,
) -> QueueSnapshot {
    let mut rx = app.watch();
    let snapshot = tokio::time::timeout(WAIT, rx.wait_for(check))
        .await
        .expect("timed out waiting for queue state")
        .expect("queue task stopped")
        .clone();
    snapshot
}

/// Poll until `check` holds
pub async fn eventually(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
