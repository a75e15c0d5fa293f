//! Fake window-inspection port used by the engine and reactor tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::port::{Application, Pid, WindowError, WindowHandle, WindowInspector};
use crate::model::Rect;

struct State {
    title: String,
    frame: Rect,
    is_minimized: bool,
    /// Simulates a window that closed mid-operation: every read and write
    /// fails.
    broken: bool,
    zoom_count: u32,
}

#[derive(Clone)]
pub struct FakeWindow(Rc<RefCell<State>>);

impl FakeWindow {
    pub fn current_frame(&self) -> Rect { self.0.borrow().frame }

    pub fn zoom_count(&self) -> u32 { self.0.borrow().zoom_count }

    pub fn break_window(&self) { self.0.borrow_mut().broken = true; }
}

impl WindowHandle for FakeWindow {
    fn title(&self) -> Result<String, WindowError> {
        let state = self.0.borrow();
        if state.broken {
            return Err(WindowError::Gone);
        }
        Ok(state.title.clone())
    }

    fn frame(&self) -> Result<Rect, WindowError> {
        let state = self.0.borrow();
        if state.broken {
            return Err(WindowError::Gone);
        }
        Ok(state.frame)
    }

    fn set_frame(&self, frame: Rect) -> Result<(), WindowError> {
        let mut state = self.0.borrow_mut();
        if state.broken {
            return Err(WindowError::Gone);
        }
        state.frame = frame;
        Ok(())
    }

    fn is_minimized(&self) -> Result<bool, WindowError> {
        let state = self.0.borrow();
        if state.broken {
            return Err(WindowError::Gone);
        }
        Ok(state.is_minimized)
    }

    fn perform_zoom(&self) -> Result<(), WindowError> {
        let mut state = self.0.borrow_mut();
        if state.broken {
            return Err(WindowError::Unsupported);
        }
        state.zoom_count += 1;
        Ok(())
    }
}

struct FakeApp {
    info: Application,
    windows: Vec<FakeWindow>,
}

pub struct FakeInspector {
    pub trusted: bool,
    apps: Vec<FakeApp>,
    next_pid: Pid,
}

impl FakeInspector {
    pub fn new() -> FakeInspector {
        FakeInspector { trusted: true, apps: Vec::new(), next_pid: 100 }
    }

    pub fn untrusted() -> FakeInspector {
        FakeInspector { trusted: false, ..FakeInspector::new() }
    }

    pub fn add_app(&mut self, name: &str, bundle_id: Option<&str>) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;
        self.apps.push(FakeApp {
            info: Application {
                name: name.to_string(),
                bundle_id: bundle_id.map(str::to_string),
                pid,
            },
            windows: Vec::new(),
        });
        pid
    }

    pub fn add_window(&mut self, pid: Pid, title: &str, frame: Rect) -> FakeWindow {
        let window = FakeWindow(Rc::new(RefCell::new(State {
            title: title.to_string(),
            frame,
            is_minimized: false,
            broken: false,
            zoom_count: 0,
        })));
        let app = self
            .apps
            .iter_mut()
            .find(|a| a.info.pid == pid)
            .expect("add_window: unknown pid");
        app.windows.push(window.clone());
        window
    }
}

impl WindowInspector for FakeInspector {
    type Window = FakeWindow;

    fn is_trusted(&self) -> bool { self.trusted }

    fn applications(&self) -> Vec<Application> {
        self.apps.iter().map(|a| a.info.clone()).collect()
    }

    fn windows(&self, app: &Application) -> Vec<FakeWindow> {
        self.apps
            .iter()
            .find(|a| a.info.pid == app.pid)
            .map(|a| a.windows.clone())
            .unwrap_or_default()
    }
}

/// Sendable inspector with no applications, for driving the async reactor
/// loop in tests.
pub struct NullInspector;

pub struct NullWindow;

impl WindowHandle for NullWindow {
    fn title(&self) -> Result<String, WindowError> { Err(WindowError::Gone) }

    fn frame(&self) -> Result<Rect, WindowError> { Err(WindowError::Gone) }

    fn set_frame(&self, _frame: Rect) -> Result<(), WindowError> { Err(WindowError::Gone) }

    fn is_minimized(&self) -> Result<bool, WindowError> { Err(WindowError::Gone) }

    fn perform_zoom(&self) -> Result<(), WindowError> { Err(WindowError::Gone) }
}

impl WindowInspector for NullInspector {
    type Window = NullWindow;

    fn is_trusted(&self) -> bool { true }

    fn applications(&self) -> Vec<Application> { Vec::new() }

    fn windows(&self, _app: &Application) -> Vec<NullWindow> { Vec::new() }
}
