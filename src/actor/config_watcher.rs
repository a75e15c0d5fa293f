use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::actor::reactor;
use crate::common::config::{self, Config};

/// Watches the config file and pushes updated settings to the reactor.
pub struct ConfigWatcher {
    file: PathBuf,
    events_tx: reactor::Sender,
}

impl ConfigWatcher {
    pub fn spawn(events_tx: reactor::Sender) {
        thread::Builder::new()
            .name("config-watcher".to_string())
            .spawn(move || {
                let actor = ConfigWatcher {
                    file: config::config_file(),
                    events_tx,
                };
                let rt = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .expect("failed to build config-watcher runtime");
                rt.block_on(async move {
                    if let Err(e) = actor.run().await {
                        warn!("config-watcher: error: {e:?}");
                    }
                })
            })
            .expect("failed to spawn config-watcher thread");
    }

    async fn run(self) -> notify::Result<()> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = PollWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            NotifyConfig::default()
                .with_poll_interval(Duration::from_secs(1))
                .with_compare_contents(true),
        )?;

        // Watch the parent so the file can appear after startup.
        let target = self.file.parent().map(PathBuf::from).unwrap_or_else(|| self.file.clone());
        watcher.watch(&target, RecursiveMode::NonRecursive)?;

        info!("watching {:?}", self.file);

        loop {
            match rx.recv().await {
                Some(Ok(event)) => {
                    if self.is_relevant(&event) {
                        debug!("change detected: {:?}", event.kind);
                        self.push_settings();
                    }
                }
                Some(Err(e)) => {
                    warn!("watch error: {e:?}");
                }
                None => {
                    warn!("channel closed, exiting");
                    break;
                }
            }
        }

        Ok(())
    }

    fn is_relevant(&self, event: &Event) -> bool {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => event
                .paths
                .iter()
                .any(|p| p == &self.file || p.file_name() == self.file.file_name()),
            _ => false,
        }
    }

    fn push_settings(&self) {
        let config = if self.file.exists() {
            match Config::read(&self.file) {
                Ok(config) => config,
                Err(e) => {
                    warn!("keeping previous settings, config reload failed: {e:#}");
                    return;
                }
            }
        } else {
            Config::default()
        };
        info!("config reloaded");
        self.events_tx.send(reactor::Event::SettingsUpdated(config.settings));
    }
}
