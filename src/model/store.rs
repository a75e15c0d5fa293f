use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use crate::model::display::DisplayConfiguration;
use crate::model::layout::Layout;

/// Durable store of layouts, at most one per distinct display configuration.
///
/// The in-memory list is authoritative for the session; every mutation is
/// persisted synchronously. A failed write is logged and retried on the next
/// mutation rather than surfaced as an error.
pub struct LayoutStore {
    path: PathBuf,
    layouts: Vec<Layout>,
}

impl LayoutStore {
    /// Loads the store from `path`. A missing or unreadable file yields an
    /// empty store, never a startup failure.
    pub fn load(path: impl Into<PathBuf>) -> LayoutStore {
        let path = path.into();
        let layouts = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(layouts) => layouts,
                Err(e) => {
                    warn!("ignoring malformed layout store at {:?}: {e}", path);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("could not read layout store at {:?}: {e}", path);
                Vec::new()
            }
        };
        debug!("loaded {} layouts from {:?}", layouts.len(), path);
        LayoutStore { path, layouts }
    }

    /// Saves a layout, replacing any existing layout whose configuration
    /// matches. Last write wins; no history is kept.
    pub fn save(&mut self, layout: Layout) {
        if let Some(existing) =
            self.layouts.iter_mut().find(|l| l.configuration.matches(&layout.configuration))
        {
            *existing = layout;
        } else {
            self.layouts.push(layout);
        }
        self.persist();
    }

    pub fn find(&self, configuration: &DisplayConfiguration) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.configuration.matches(configuration))
    }

    /// Removes a layout by its save time and configuration identity.
    pub fn delete(&mut self, layout: &Layout) {
        self.layouts.retain(|l| {
            l.saved_at != layout.saved_at || !l.configuration.matches(&layout.configuration)
        });
        self.persist();
    }

    pub fn clear(&mut self) {
        self.layouts.clear();
        self.persist();
    }

    /// All stored layouts, most recently saved first.
    pub fn layouts(&self) -> Vec<&Layout> {
        let mut layouts: Vec<&Layout> = self.layouts.iter().collect();
        layouts.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        layouts
    }

    pub fn len(&self) -> usize { self.layouts.len() }

    pub fn is_empty(&self) -> bool { self.layouts.is_empty() }

    fn persist(&self) {
        if let Err(e) = self.write_atomically() {
            warn!("layout store write failed, will retry on next save: {e:#}");
        }
    }

    /// Write-to-temp-then-rename so a crash mid-write cannot corrupt the
    /// previously stored layouts.
    fn write_atomically(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {:?}", parent))?;
            }
        }
        let json = serde_json::to_vec_pretty(&self.layouts)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).with_context(|| format!("writing {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("renaming {:?} into place", tmp))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::display::ScreenInfo;
    use crate::model::layout::{Rect, WindowRecord};

    fn config(count: usize) -> DisplayConfiguration {
        let screens: Vec<ScreenInfo> = (0..=count)
            .map(|i| {
                let frame = Rect::new(1920.0 * i as f64, 0.0, 1920.0, 1080.0);
                ScreenInfo { frame, visible_frame: frame }
            })
            .collect();
        DisplayConfiguration::from_screens(&screens)
    }

    fn layout(configuration: DisplayConfiguration, name: &str) -> Layout {
        Layout {
            configuration,
            windows: vec![WindowRecord {
                app_name: "Notes".into(),
                bundle_id: Some("com.apple.Notes".into()),
                title: "Untitled".into(),
                frame: Rect::new(10.0, 20.0, 800.0, 600.0),
                is_minimized: false,
                screen_index: 0,
            }],
            name: name.into(),
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn save_replaces_layout_for_matching_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LayoutStore::load(dir.path().join("layouts.json"));

        store.save(layout(config(1), "first"));
        store.save(layout(config(1), "second"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.find(&config(1)).unwrap().name, "second");
    }

    #[test]
    fn layouts_for_different_configurations_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LayoutStore::load(dir.path().join("layouts.json"));

        store.save(layout(config(0), "laptop"));
        store.save(layout(config(1), "desk"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.find(&config(0)).unwrap().name, "laptop");
        assert_eq!(store.find(&config(1)).unwrap().name, "desk");
        assert!(store.find(&config(2)).is_none());
    }

    #[test]
    fn store_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layouts.json");

        let mut store = LayoutStore::load(&path);
        store.save(layout(config(1), "desk"));
        drop(store);

        let reloaded = LayoutStore::load(&path);
        assert_eq!(reloaded.len(), 1);
        let found = reloaded.find(&config(1)).unwrap();
        assert_eq!(found.name, "desk");
        assert_eq!(found.windows.len(), 1);
        assert_eq!(found.windows[0].frame, Rect::new(10.0, 20.0, 800.0, 600.0));
    }

    #[test]
    fn malformed_file_loads_as_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layouts.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = LayoutStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn failed_persist_keeps_memory_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        // The store path's parent is a regular file, so every write fails.
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"").unwrap();

        let mut store = LayoutStore::load(blocker.join("layouts.json"));
        store.save(layout(config(1), "desk"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.find(&config(1)).unwrap().name, "desk");
        assert!(!blocker.join("layouts.json").exists());
    }

    #[test]
    fn delete_is_keyed_by_save_time_and_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LayoutStore::load(dir.path().join("layouts.json"));

        let keep = layout(config(0), "laptop");
        let mut remove = layout(config(1), "desk");
        remove.saved_at = keep.saved_at + Duration::seconds(1);
        store.save(keep.clone());
        store.save(remove.clone());

        store.delete(&remove);
        assert_eq!(store.len(), 1);
        assert_eq!(store.find(&config(0)).unwrap().name, "laptop");
        assert!(store.find(&config(1)).is_none());
    }

    #[test]
    fn layouts_are_listed_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LayoutStore::load(dir.path().join("layouts.json"));

        let mut older = layout(config(0), "older");
        older.saved_at = Utc::now() - Duration::hours(1);
        let newer = layout(config(1), "newer");
        store.save(older);
        store.save(newer);

        let names: Vec<&str> = store.layouts().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["newer", "older"]);
    }
}
