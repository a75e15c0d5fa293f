//! The reactor owns every window-mutating operation. It observes display
//! configuration transitions, classifies them, and triggers capture,
//! restore, or zoom according to the user's policy. All events are
//! processed strictly sequentially on one task so no two operations ever
//! interleave on the same window set.

use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::actor;
use crate::common::config::Settings;
use crate::engine::capture::capture_layout;
use crate::engine::port::WindowInspector;
use crate::engine::restore::restore_layout;
use crate::engine::zoom::zoom_all;
use crate::model::{DisplayConfiguration, LayoutStore, ScreenInfo};

pub type Sender = actor::Sender<Event>;
type Receiver = actor::Receiver<Event>;

#[derive(Debug)]
pub enum Event {
    /// The set of attached displays changed. This is also the first event
    /// sent on startup. The main screen is first in the list.
    DisplaysChanged(Vec<ScreenInfo>),
    Command(Command),
    SettingsUpdated(Settings),
    QueryStatus(oneshot::Sender<Status>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SaveLayout { name: Option<String> },
    RestoreLayout,
    ZoomAll,
    /// Delete the stored layout for the current configuration.
    DeleteLayout,
    ClearLayouts,
    SetEnabled(bool),
}

/// What a presentation layer (menu bar, CLI) can surface about the reactor.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub enabled: bool,
    pub docked: bool,
    pub layout_count: usize,
    pub has_layout_for_current: bool,
    pub last_action: Option<String>,
    pub last_error: Option<String>,
    pub last_affected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// No prior configuration observed.
    Initial,
    Connected,
    Disconnected,
    /// Same display count; identifiers may or may not differ. Recorded but
    /// triggers no policy.
    ChangedOrUnchanged,
}

/// Seam for Dock autohide control, so the reactor stays OS-independent.
pub trait DockController {
    fn set_autohide(&self, hidden: bool);
}

pub struct Reactor<I: WindowInspector> {
    settings: Settings,
    inspector: I,
    store: LayoutStore,
    dock: Option<Box<dyn DockController + Send>>,
    receiver: Receiver,
    previous_configuration: Option<DisplayConfiguration>,
    current_configuration: Option<DisplayConfiguration>,
    current_screens: Vec<ScreenInfo>,
    last_action: Option<String>,
    last_error: Option<String>,
    last_affected: usize,
}

impl<I: WindowInspector + Send + 'static> Reactor<I> {
    pub fn spawn(
        settings: Settings,
        inspector: I,
        store: LayoutStore,
        dock: Option<Box<dyn DockController + Send>>,
    ) -> Sender {
        let (sender, receiver) = actor::channel();
        std::thread::Builder::new()
            .name("reactor".to_string())
            .spawn(move || {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .expect("failed to build reactor runtime");
                rt.block_on(Reactor::new(settings, inspector, store, dock, receiver).run());
            })
            .expect("failed to spawn reactor thread");
        sender
    }
}

impl<I: WindowInspector> Reactor<I> {
    pub fn new(
        settings: Settings,
        inspector: I,
        store: LayoutStore,
        dock: Option<Box<dyn DockController + Send>>,
        receiver: Receiver,
    ) -> Self {
        Reactor {
            settings,
            inspector,
            store,
            dock,
            receiver,
            previous_configuration: None,
            current_configuration: None,
            current_screens: Vec::new(),
            last_action: None,
            last_error: None,
            last_affected: 0,
        }
    }

    pub async fn run(mut self) {
        while let Some((span, event)) = self.receiver.recv().await {
            match event {
                Event::DisplaysChanged(screens) => {
                    let screens = {
                        let _guard = span.enter();
                        debug!("display change signal, waiting for the list to settle");
                        drop(_guard);
                        self.settle(screens).await
                    };
                    self.handle_displays_changed(screens);
                }
                other => {
                    let _guard = span.enter();
                    self.handle_event(other);
                }
            }
        }
    }

    /// Coalesces bursts of display signals: the OS emits several while it
    /// finishes reconfiguring, and only the settled state matters. Other
    /// events arriving meanwhile are handled in order, but only a fresh
    /// display signal pushes the deadline out; a steady stream of commands
    /// or queries cannot postpone the pending transition.
    async fn settle(&mut self, mut screens: Vec<ScreenInfo>) -> Vec<ScreenInfo> {
        let window = Duration::from_millis(self.settings.settle_ms);
        let mut deadline = tokio::time::Instant::now() + window;
        loop {
            match tokio::time::timeout_at(deadline, self.receiver.recv()).await {
                Ok(Some((span, Event::DisplaysChanged(next)))) => {
                    let _guard = span.enter();
                    debug!("coalescing display change burst");
                    screens = next;
                    deadline = tokio::time::Instant::now() + window;
                }
                Ok(Some((span, other))) => {
                    let _guard = span.enter();
                    self.handle_event(other);
                }
                Ok(None) | Err(_) => break,
            }
        }
        screens
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::DisplaysChanged(screens) => self.handle_displays_changed(screens),
            Event::Command(command) => self.handle_command(command),
            Event::SettingsUpdated(settings) => {
                info!("settings updated");
                self.settings = settings;
            }
            Event::QueryStatus(reply) => {
                _ = reply.send(self.status());
            }
        }
    }

    fn handle_displays_changed(&mut self, screens: Vec<ScreenInfo>) {
        let new_configuration = DisplayConfiguration::from_screens(&screens);
        let transition = match &self.current_configuration {
            None => Transition::Initial,
            Some(current)
                if new_configuration.external_display_count
                    > current.external_display_count =>
            {
                Transition::Connected
            }
            Some(current)
                if new_configuration.external_display_count
                    < current.external_display_count =>
            {
                Transition::Disconnected
            }
            Some(_) => Transition::ChangedOrUnchanged,
        };
        info!(
            ?transition,
            external_displays = new_configuration.external_display_count,
            "display configuration changed"
        );

        // Bookkeeping happens unconditionally, on every signal.
        self.current_screens = screens;
        self.previous_configuration = self.current_configuration.take();
        self.current_configuration = Some(new_configuration);

        if !self.settings.enabled {
            debug!("automatic mode is off, recording only");
            return;
        }

        match transition {
            Transition::Connected => {
                if self.settings.auto_dock_control {
                    if let Some(dock) = &self.dock {
                        dock.set_autohide(false);
                    }
                }
                if self.settings.auto_restore {
                    self.restore_current();
                }
                if self.settings.auto_capture {
                    self.capture_current(None);
                }
            }
            Transition::Disconnected => {
                if self.settings.auto_dock_control {
                    if let Some(dock) = &self.dock {
                        dock.set_autohide(true);
                    }
                }
                if self.settings.auto_zoom {
                    self.zoom_current();
                }
            }
            Transition::Initial | Transition::ChangedOrUnchanged => {}
        }
    }

    fn handle_command(&mut self, command: Command) {
        debug!(?command, "command");
        match command {
            Command::SaveLayout { name } => self.capture_current(name),
            Command::RestoreLayout => self.restore_current(),
            Command::ZoomAll => self.zoom_current(),
            Command::DeleteLayout => self.delete_current(),
            Command::ClearLayouts => {
                self.store.clear();
                self.finish("cleared all stored layouts".to_string(), 0);
            }
            Command::SetEnabled(enabled) => {
                self.settings.enabled = enabled;
                let state = if enabled { "enabled" } else { "disabled" };
                self.finish(format!("automatic mode {state}"), 0);
            }
        }
    }

    fn capture_current(&mut self, name: Option<String>) {
        let Some(configuration) = self.current_configuration.clone() else {
            self.fail("no display configuration observed yet");
            return;
        };
        let name = name.unwrap_or_else(|| "Auto-saved".to_string());
        match capture_layout(
            &self.inspector,
            &self.current_screens,
            configuration,
            &self.settings.excluded_set(),
            &name,
        ) {
            Ok(layout) => {
                let count = layout.windows.len();
                self.store.save(layout);
                self.finish(format!("saved {count} windows"), count);
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn restore_current(&mut self) {
        let Some(configuration) = self.current_configuration.clone() else {
            self.fail("no display configuration observed yet");
            return;
        };
        let Some(layout) = self.store.find(&configuration).cloned() else {
            self.finish("no stored layout for this configuration".to_string(), 0);
            return;
        };
        match restore_layout(&self.inspector, &layout) {
            Ok(0) => self.fail("no windows could be restored"),
            Ok(count) => self.finish(format!("restored {count} windows"), count),
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn zoom_current(&mut self) {
        let Some(primary) = self.current_screens.first() else {
            self.fail("no screens to zoom to");
            return;
        };
        match zoom_all(
            &self.inspector,
            primary.visible_frame,
            &self.settings.excluded_set(),
            self.settings.zoom_strategy,
        ) {
            Ok(count) => self.finish(format!("zoomed {count} windows"), count),
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn delete_current(&mut self) {
        let layout = self
            .current_configuration
            .as_ref()
            .and_then(|c| self.store.find(c))
            .cloned();
        match layout {
            Some(layout) => {
                self.store.delete(&layout);
                self.finish(format!("deleted layout '{}'", layout.name), 0);
            }
            None => self.finish("no stored layout for this configuration".to_string(), 0),
        }
    }

    fn status(&self) -> Status {
        let has_layout_for_current = self
            .current_configuration
            .as_ref()
            .is_some_and(|c| self.store.find(c).is_some());
        Status {
            enabled: self.settings.enabled,
            docked: self.current_configuration.as_ref().is_some_and(|c| c.is_docked()),
            layout_count: self.store.len(),
            has_layout_for_current,
            last_action: self.last_action.clone(),
            last_error: self.last_error.clone(),
            last_affected: self.last_affected,
        }
    }

    fn finish(&mut self, action: String, affected: usize) {
        info!("{action}");
        self.last_action = Some(action);
        self.last_affected = affected;
        self.last_error = None;
    }

    fn fail(&mut self, error: impl Into<String>) {
        let error = error.into();
        warn!("{error}");
        self.last_error = Some(error);
        self.last_affected = 0;
    }
}
