use clap::{Parser, Subcommand};

/// Saves, restores, and zooms window layouts per display configuration.
#[derive(Parser)]
#[command(name = "redock", version)]
struct Cli {
    /// One-shot command; without one, redock runs as a daemon and reacts
    /// to display changes.
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Capture the current windows as the layout for the current display
    /// configuration, replacing any previous one.
    Save {
        /// Human label for the layout.
        #[arg(long)]
        name: Option<String>,
    },
    /// Re-apply the stored layout for the current display configuration.
    Restore,
    /// Zoom all eligible windows to the primary screen.
    Zoom,
    /// List stored layouts, most recent first.
    List,
    /// Delete all stored layouts.
    Clear,
    /// Write the default configuration to ~/.redock.toml.
    Init,
}

#[cfg(target_os = "macos")]
fn main() {
    use objc2_foundation::MainThreadMarker;
    use redock::common::config::{Config, config_file, store_file};
    use redock::common::log;
    use redock::model::LayoutStore;
    use redock::sys::accessibility::ensure_accessibility_permission;

    let cli = Cli::parse();
    log::init_logging();

    let config = if config_file().exists() {
        match Config::read(&config_file()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("could not read {:?}: {e:#}", config_file());
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let mtm = MainThreadMarker::new().unwrap();

    match cli.command {
        Some(command) => {
            if matches!(command, Cmd::Save { .. } | Cmd::Restore | Cmd::Zoom) {
                ensure_accessibility_permission();
            }
            let store = LayoutStore::load(store_file());
            run_once(command, &config, store, mtm);
        }
        None => run_daemon(config, mtm),
    }
}

#[cfg(target_os = "macos")]
fn run_once(
    command: Cmd,
    config: &redock::common::config::Config,
    mut store: redock::model::LayoutStore,
    mtm: objc2_foundation::MainThreadMarker,
) {
    use redock::engine::capture::capture_layout;
    use redock::engine::restore::restore_layout;
    use redock::engine::zoom::zoom_all;
    use redock::model::DisplayConfiguration;
    use redock::sys::accessibility::AxInspector;
    use redock::sys::screen;

    let inspector = AxInspector::new();
    let screens = screen::screens(mtm);
    let configuration = DisplayConfiguration::from_screens(&screens);
    let excluded = config.settings.excluded_set();

    match command {
        Cmd::Save { name } => {
            let name = name.unwrap_or_else(|| "Manual".to_string());
            match capture_layout(&inspector, &screens, configuration, &excluded, &name) {
                Ok(layout) => {
                    let count = layout.windows.len();
                    store.save(layout);
                    println!("saved {count} windows as '{name}'");
                }
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Cmd::Restore => match store.find(&configuration) {
            Some(layout) => match restore_layout(&inspector, layout) {
                Ok(count) => {
                    println!("restored {count} of {} windows", layout.windows.len())
                }
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            },
            None => println!("no stored layout for this configuration"),
        },
        Cmd::Zoom => {
            let Some(primary) = screens.first() else {
                eprintln!("no screens attached");
                std::process::exit(1);
            };
            match zoom_all(&inspector, primary.visible_frame, &excluded, config.settings.zoom_strategy)
            {
                Ok(count) => println!("zoomed {count} windows"),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Cmd::List => {
            if store.is_empty() {
                println!("no stored layouts");
            }
            for layout in store.layouts() {
                println!(
                    "{}  {:<20} {:>3} windows  [{}]",
                    layout.saved_at.format("%Y-%m-%d %H:%M:%S"),
                    layout.name,
                    layout.windows.len(),
                    layout.configuration.display_ids.join(" + "),
                );
            }
        }
        Cmd::Clear => {
            store.clear();
            println!("cleared stored layouts");
        }
        Cmd::Init => {
            let path = redock::common::config::config_file();
            if path.exists() {
                println!("{} already exists, leaving it alone", path.display());
                return;
            }
            match redock::common::config::Config::default().save(&path) {
                Ok(()) => println!("wrote {}", path.display()),
                Err(e) => {
                    eprintln!("could not write {}: {e:#}", path.display());
                    std::process::exit(1);
                }
            }
        }
    }
}

#[cfg(target_os = "macos")]
fn run_daemon(config: redock::common::config::Config, mtm: objc2_foundation::MainThreadMarker) {
    use redock::actor::config_watcher::ConfigWatcher;
    use redock::actor::reactor::{DockController, Event, Reactor};
    use redock::common::config::store_file;
    use redock::model::LayoutStore;
    use redock::sys::accessibility::{AxInspector, ensure_accessibility_permission};
    use redock::sys::dock::Dock;
    use redock::sys::{display_notify, screen};
    use tracing::info;

    ensure_accessibility_permission();

    let store = LayoutStore::load(store_file());
    let dock: Option<Box<dyn DockController + Send>> = Some(Box::new(Dock));
    let events_tx = Reactor::spawn(config.settings.clone(), AxInspector::new(), store, dock);

    ConfigWatcher::spawn(events_tx.clone());
    display_notify::init(events_tx.clone());

    // Seed the reactor with the startup configuration.
    events_tx.send(Event::DisplaysChanged(screen::screens(mtm)));

    info!("watching for display configuration changes");
    display_notify::run_main_loop(mtm);
}

#[cfg(not(target_os = "macos"))]
fn main() {
    let _ = Cli::parse();
    eprintln!("redock drives the macOS accessibility and display APIs and only runs on macOS");
    std::process::exit(1);
}
