//! Watcher Actor - plays the editor for watch mode
//!
//! Every save of the song becomes an edit event; every change of the config
//! file is hot-reloaded and turned into settings/pane events. Changes to the
//! renderer's own config and task files (`[render] configs`/`task`) refresh
//! the current song. Debouncing is left to the scheduler.
//!
//! Watches parent directories rather than the files themselves: editors that
//! save by rename would otherwise detach the watch after the first save.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::SceneEvent;
use crate::cli::Cli;
use crate::config::{ConfigError, ProjectConfig, RenderSettings, cfg, reload_config};
use crate::core::{DocumentSnapshot, SourceId};
use crate::diagnostic::LogEntry;
use crate::utils::path::normalize_path;

/// Which watched files an event touched.
#[derive(Debug, Default, PartialEq, Eq)]
struct Touched {
    song: bool,
    config: bool,
    resource: bool,
}

pub struct WatcherActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Directories registered with `watcher`
    watched: BTreeSet<PathBuf>,
    feeder: Feeder,
}

/// Turns file changes into scene events.
struct Feeder {
    song: PathBuf,
    config_path: PathBuf,
    /// Normalized `[render]` config and task files
    resources: Vec<PathBuf>,
    scene_tx: mpsc::Sender<SceneEvent>,
    cli: Arc<Cli>,
    /// Config the current settings came from
    config: Arc<ProjectConfig>,
    settings: Arc<RenderSettings>,
    latest: Option<DocumentSnapshot>,
}

impl WatcherActor {
    /// Create the watcher before the first read so no save is missed.
    pub fn new(
        song: &Path,
        scene_tx: mpsc::Sender<SceneEvent>,
        cli: Arc<Cli>,
    ) -> notify::Result<Self> {
        let config = cfg();
        let song = normalize_path(song);
        let config_path = config.config_path.clone();

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let resources = resource_paths(&config.render);
        let mut watched = BTreeSet::new();
        let files = [song.as_path(), config_path.as_path()]
            .into_iter()
            .chain(resources.iter().map(PathBuf::as_path));
        watch_parents(&mut watcher, &mut watched, files)?;

        Ok(Self {
            notify_rx,
            watcher,
            watched,
            feeder: Feeder {
                song,
                config_path,
                resources,
                scene_tx,
                cli,
                settings: Arc::new(config.render.clone()),
                config,
                latest: None,
            },
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        // Extract fields before consuming self
        let notify_rx = self.notify_rx;
        let mut watcher = self.watcher;
        let mut watched = self.watched;
        let mut feeder = self.feeder;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        crate::log!("watch"; "watching {}", feeder.song.display());
        if feeder.on_song_changed().await.is_err() {
            return;
        }

        while let Some(event) = async_rx.recv().await {
            let touched = touched(&event, &feeder.song, &feeder.config_path, &feeder.resources);
            if touched.config {
                if feeder.on_config_changed().await.is_err() {
                    break;
                }
                let files = feeder.resources.iter().map(PathBuf::as_path);
                if let Err(e) = watch_parents(&mut watcher, &mut watched, files) {
                    crate::log!("watch"; "cannot watch renderer config: {}", e);
                }
            }
            if touched.resource {
                crate::debug!("watch"; "renderer config changed");
                if feeder.send(SceneEvent::Refresh).await.is_err() {
                    break;
                }
            }
            if touched.song && feeder.on_song_changed().await.is_err() {
                break;
            }
        }
    }
}

impl Feeder {
    /// Read the song and send it as an edit.
    ///
    /// Returns `Err(())` if the scene shut down
    async fn on_song_changed(&mut self) -> Result<(), ()> {
        let text = match std::fs::read_to_string(&self.song) {
            Ok(text) => text,
            // Mid-save (removed before rename); the next event carries the content
            Err(e) => {
                crate::debug!("watch"; "cannot read {}: {}", self.song.display(), e);
                return Ok(());
            }
        };

        let snapshot = DocumentSnapshot::new(
            text,
            Arc::clone(&self.settings),
            SourceId::Path(self.song.clone()),
        );
        self.latest = Some(snapshot.clone());
        self.send(SceneEvent::Edit(snapshot)).await
    }

    /// Hot-reload the config and forward what changed.
    async fn on_config_changed(&mut self) -> Result<(), ()> {
        match reload_config(&self.cli) {
            Ok(false) => Ok(()),
            Ok(true) => {
                let old = std::mem::replace(&mut self.config, cfg());
                self.resources = resource_paths(&self.config.render);
                crate::log!("watch"; "config reloaded");
                for event in config_events(&old, &self.config, self.latest.as_ref()) {
                    if let SceneEvent::Edit(snapshot) = &event {
                        self.settings = Arc::clone(&snapshot.settings);
                        self.latest = Some(snapshot.clone());
                    }
                    self.send(event).await?;
                }
                Ok(())
            }
            Err(e) => {
                crate::log!("warning"; "config reload failed, keeping previous settings");
                for entry in reload_failure_entries(&e) {
                    self.send(SceneEvent::AppendNotice(entry)).await?;
                }
                Ok(())
            }
        }
    }

    async fn send(&self, event: SceneEvent) -> Result<(), ()> {
        self.scene_tx.send(event).await.map_err(|_| ())
    }
}

/// Log entries for a failed reload: one per config problem when known.
fn reload_failure_entries(err: &anyhow::Error) -> Vec<LogEntry> {
    match err.downcast_ref::<ConfigError>() {
        Some(config_err) => config_err.log_entries(),
        None => vec![LogEntry::warning(format!("config reload failed: {err}"))],
    }
}

/// Watch the parent directory of each file, skipping ones already watched.
fn watch_parents<'a>(
    watcher: &mut impl Watcher,
    watched: &mut BTreeSet<PathBuf>,
    files: impl IntoIterator<Item = &'a Path>,
) -> notify::Result<()> {
    for dir in files.into_iter().filter_map(Path::parent) {
        if !dir.is_dir() || watched.contains(dir) {
            continue;
        }
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        crate::debug!("watch"; "watching {}", dir.display());
        watched.insert(dir.to_path_buf());
    }
    Ok(())
}

fn resource_paths(render: &RenderSettings) -> Vec<PathBuf> {
    render.resource_files().map(normalize_path).collect()
}

/// Classify a notify event against the watched files.
fn touched(event: &notify::Event, song: &Path, config: &Path, resources: &[PathBuf]) -> Touched {
    let mut touched = Touched::default();
    match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => {}
        // Ignore metadata-only changes (mtime/atime/chmod noise)
        EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => return touched,
        EventKind::Modify(_) => {}
        _ => return touched,
    }

    for path in &event.paths {
        let path = normalize_path(path);
        touched.song |= path == song;
        touched.config |= path == config;
        touched.resource |= resources.contains(&path);
    }
    touched
}

/// Scene events for a config change from `old` to `new`.
fn config_events(
    old: &ProjectConfig,
    new: &ProjectConfig,
    latest: Option<&DocumentSnapshot>,
) -> Vec<SceneEvent> {
    let mut events = Vec::new();

    if new.render != old.render
        && let Some(snapshot) = latest
    {
        events.push(SceneEvent::Edit(
            snapshot.with_settings(Arc::new(new.render.clone())),
        ));
    }
    if new.preview.pane != old.preview.pane {
        events.push(SceneEvent::SetPane(new.preview.pane));
    }
    if new.renderer != old.renderer || new.pipeline != old.pipeline {
        events.push(SceneEvent::AppendNotice(LogEntry::notice(
            "[renderer] and [pipeline] changes take effect after restarting watch",
        )));
    }
    events
}

#[cfg(test)]
mod tests {
    use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind};

    use super::*;
    use crate::core::PaneMode;

    fn event(kind: EventKind, path: &Path) -> notify::Event {
        notify::Event::new(kind).add_path(path.to_path_buf())
    }

    #[test]
    fn test_touched() {
        let temp = tempfile::TempDir::new().unwrap();
        let song = normalize_path(temp.path()).join("song.cho");
        let config = normalize_path(temp.path()).join("preview.toml");
        std::fs::write(&song, "x").unwrap();

        let modify = || EventKind::Modify(ModifyKind::Data(DataChange::Content));
        assert_eq!(
            touched(&event(modify(), &song), &song, &config, &[]),
            Touched { song: true, ..Touched::default() }
        );
        assert_eq!(
            touched(&event(EventKind::Create(CreateKind::File), &config), &song, &config, &[]),
            Touched { config: true, ..Touched::default() }
        );

        let metadata = EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime));
        assert_eq!(touched(&event(metadata, &song), &song, &config, &[]), Touched::default());

        let other = normalize_path(temp.path()).join("other.cho");
        assert_eq!(touched(&event(modify(), &other), &song, &config, &[]), Touched::default());
    }

    #[test]
    fn test_touched_renderer_config() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = normalize_path(temp.path());
        let song = root.join("song.cho");
        let config = root.join("preview.toml");
        std::fs::write(root.join("band.json"), "{}").unwrap();

        let render = RenderSettings {
            configs: vec![root.join("band.json")],
            task: Some(root.join("tasks").join("print.json")),
            ..RenderSettings::default()
        };
        let resources = resource_paths(&render);
        assert_eq!(resources.len(), 2);

        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        assert_eq!(
            touched(&event(modify, &root.join("band.json")), &song, &config, &resources),
            Touched { resource: true, ..Touched::default() }
        );
        let create = EventKind::Create(CreateKind::File);
        assert_eq!(
            touched(&event(create, &resources[1]), &song, &config, &resources),
            Touched { resource: true, ..Touched::default() }
        );
    }

    #[test]
    fn test_watch_parents_skips_known_and_missing() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = normalize_path(temp.path());
        let mut watcher = notify::recommended_watcher(|_: notify::Result<notify::Event>| {}).unwrap();
        let mut watched = BTreeSet::new();

        let files = [root.join("song.cho"), root.join("preview.toml"), root.join("gone/t.json")];
        watch_parents(&mut watcher, &mut watched, files.iter().map(PathBuf::as_path)).unwrap();
        assert_eq!(watched, BTreeSet::from([root.clone()]));

        std::fs::create_dir(root.join("tasks")).unwrap();
        let task = root.join("tasks").join("t.json");
        watch_parents(&mut watcher, &mut watched, [task.as_path()]).unwrap();
        assert_eq!(watched, BTreeSet::from([root.clone(), root.join("tasks")]));
    }

    fn snapshot() -> DocumentSnapshot {
        DocumentSnapshot::new(
            "{title: x}",
            Arc::new(RenderSettings::default()),
            SourceId::Synthetic("s".into()),
        )
    }

    #[test]
    fn test_config_events_render_change() {
        let old = ProjectConfig::default();
        let mut new = ProjectConfig::default();
        new.render.transpose = 2;

        let events = config_events(&old, &new, Some(&snapshot()));
        assert_eq!(events.len(), 1);
        match &events[0] {
            SceneEvent::Edit(snapshot) => assert_eq!(snapshot.settings.transpose, 2),
            other => panic!("unexpected event: {other:?}"),
        }

        // nothing to re-render before the first read
        assert!(config_events(&old, &new, None).is_empty());
    }

    #[test]
    fn test_config_events_pane_and_renderer() {
        let old = ProjectConfig::default();
        let mut new = ProjectConfig::default();
        new.preview.pane = PaneMode::EditorOnly;
        new.renderer.timeout_ms = 1_000;

        let events = config_events(&old, &new, Some(&snapshot()));
        assert!(matches!(events[0], SceneEvent::SetPane(PaneMode::EditorOnly)));
        assert!(matches!(events[1], SceneEvent::AppendNotice(_)));
    }

    #[test]
    fn test_config_events_unchanged() {
        let config = ProjectConfig::default();
        assert!(config_events(&config, &config, Some(&snapshot())).is_empty());
    }

    #[test]
    fn test_reload_failure_entries() {
        let toml_err = toml::from_str::<toml::Table>("[render").unwrap_err();
        let entries = reload_failure_entries(&ConfigError::from(toml_err).into());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].message.starts_with("invalid TOML"));

        let entries = reload_failure_entries(&anyhow::anyhow!("no cwd"));
        assert_eq!(entries[0].message, "config reload failed: no cwd");
    }
}
