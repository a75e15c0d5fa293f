//! AXUIElement adapter implementing the window-inspection port.

use std::ffi::c_void;
use std::ptr;
use std::thread;
use std::time::{Duration, Instant};

use objc2::rc::autoreleasepool;
use objc2::runtime::AnyObject;
use objc2::{class, msg_send};
use objc2_core_foundation::{CFRetained, CFString, CGPoint, CGSize};
use tracing::info;

use crate::engine::port::{Application, WindowError, WindowHandle, WindowInspector};
use crate::model::Rect;
use crate::sys::app::running_applications;

type CFTypeRef = *const c_void;
type CFIndex = isize;
type AXUIElementRef = *const c_void;
type AXError = i32;

const AX_ERROR_SUCCESS: AXError = 0;
const AX_VALUE_TYPE_CGPOINT: u32 = 1;
const AX_VALUE_TYPE_CGSIZE: u32 = 2;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrustedWithOptions(options: *const c_void) -> bool;

    static kAXTrustedCheckOptionPrompt: *const c_void;

    fn AXUIElementCreateApplication(pid: i32) -> AXUIElementRef;
    fn AXUIElementCopyAttributeValue(
        element: AXUIElementRef,
        attribute: *const c_void,
        value: *mut CFTypeRef,
    ) -> AXError;
    fn AXUIElementSetAttributeValue(
        element: AXUIElementRef,
        attribute: *const c_void,
        value: CFTypeRef,
    ) -> AXError;
    fn AXUIElementPerformAction(element: AXUIElementRef, action: *const c_void) -> AXError;
    fn AXValueCreate(value_type: u32, value_ptr: *const c_void) -> CFTypeRef;
    fn AXValueGetValue(value: CFTypeRef, value_type: u32, value_ptr: *mut c_void) -> bool;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    static kCFBooleanTrue: *const c_void;

    fn CFRetain(cf: CFTypeRef) -> CFTypeRef;
    fn CFRelease(cf: CFTypeRef);
    fn CFArrayGetCount(array: CFTypeRef) -> CFIndex;
    fn CFArrayGetValueAtIndex(array: CFTypeRef, index: CFIndex) -> CFTypeRef;
    fn CFBooleanGetValue(boolean: CFTypeRef) -> bool;
}

const AX_POLL_INTERVAL: Duration = Duration::from_millis(250);
const AX_POLL_TIMEOUT: Duration = Duration::from_secs(30);

#[inline]
fn ax_is_trusted() -> bool { unsafe { AXIsProcessTrustedWithOptions(ptr::null()) } }

fn prompt_ax_trust_dialog() {
    autoreleasepool(|_| unsafe {
        let keys: [*mut AnyObject; 1] = [kAXTrustedCheckOptionPrompt as *mut AnyObject];
        let vals: [*mut AnyObject; 1] = [kCFBooleanTrue as *mut AnyObject];

        let dict: *mut AnyObject = msg_send![
            class!(NSDictionary),
            dictionaryWithObjects: vals.as_ptr(),
            forKeys:              keys.as_ptr(),
            count:                1usize
        ];

        let _ = AXIsProcessTrustedWithOptions(dict.cast());
    });
}

/// Prompt for the accessibility grant once and poll until it is given or
/// the timeout expires. Exits the process if it never arrives; the grant
/// requires user action and nothing works without it.
pub fn ensure_accessibility_permission() {
    if ax_is_trusted() {
        return;
    }

    info!("accessibility permission is not granted; prompting the user now");

    prompt_ax_trust_dialog();

    let start = Instant::now();
    loop {
        if ax_is_trusted() {
            info!("accessibility permission granted");
            return;
        }

        if start.elapsed() >= AX_POLL_TIMEOUT {
            break;
        }

        thread::sleep(AX_POLL_INTERVAL);
    }

    println!(
        "redock still does not have accessibility permission. Enable it in System Settings > Privacy & Security > Accessibility, then restart redock."
    );

    std::process::exit(1);
}

fn attr(name: &'static str) -> CFRetained<CFString> { CFString::from_static_str(name) }

fn raw(s: &CFRetained<CFString>) -> *const c_void {
    CFRetained::<CFString>::as_ptr(s).as_ptr() as *const c_void
}

/// Copies an attribute value. The caller owns the returned ref.
fn copy_attribute(element: AXUIElementRef, name: &'static str) -> Option<CFTypeRef> {
    let attribute = attr(name);
    let mut value: CFTypeRef = ptr::null();
    let err = unsafe { AXUIElementCopyAttributeValue(element, raw(&attribute), &mut value) };
    if err == AX_ERROR_SUCCESS && !value.is_null() {
        Some(value)
    } else {
        None
    }
}

pub struct AxInspector;

impl AxInspector {
    pub fn new() -> AxInspector { AxInspector }
}

impl WindowInspector for AxInspector {
    type Window = AxWindow;

    fn is_trusted(&self) -> bool { ax_is_trusted() }

    fn applications(&self) -> Vec<Application> { running_applications() }

    fn windows(&self, app: &Application) -> Vec<AxWindow> {
        let ax_app = unsafe { AXUIElementCreateApplication(app.pid) };
        if ax_app.is_null() {
            return Vec::new();
        }

        let mut windows = Vec::new();
        if let Some(array) = copy_attribute(ax_app, "AXWindows") {
            unsafe {
                for i in 0..CFArrayGetCount(array) {
                    let element = CFArrayGetValueAtIndex(array, i);
                    if !element.is_null() {
                        CFRetain(element);
                        windows.push(AxWindow(element));
                    }
                }
                CFRelease(array);
            }
        }
        unsafe { CFRelease(ax_app) };
        windows
    }
}

pub struct AxWindow(AXUIElementRef);

impl Drop for AxWindow {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0) };
    }
}

impl WindowHandle for AxWindow {
    fn title(&self) -> Result<String, WindowError> {
        let value = copy_attribute(self.0, "AXTitle").ok_or(WindowError::ReadFailed)?;
        let title = unsafe {
            let s = &*(value as *const CFString);
            let title = s.to_string();
            CFRelease(value);
            title
        };
        Ok(title)
    }

    fn frame(&self) -> Result<Rect, WindowError> {
        let position = copy_attribute(self.0, "AXPosition").ok_or(WindowError::ReadFailed)?;
        let mut point = CGPoint::ZERO;
        let got_point = unsafe {
            let ok = AXValueGetValue(
                position,
                AX_VALUE_TYPE_CGPOINT,
                &mut point as *mut CGPoint as *mut c_void,
            );
            CFRelease(position);
            ok
        };

        let size = copy_attribute(self.0, "AXSize").ok_or(WindowError::ReadFailed)?;
        let mut dimensions = CGSize::ZERO;
        let got_size = unsafe {
            let ok = AXValueGetValue(
                size,
                AX_VALUE_TYPE_CGSIZE,
                &mut dimensions as *mut CGSize as *mut c_void,
            );
            CFRelease(size);
            ok
        };

        if !got_point || !got_size {
            return Err(WindowError::ReadFailed);
        }
        Ok(Rect::new(point.x, point.y, dimensions.width, dimensions.height))
    }

    fn set_frame(&self, frame: Rect) -> Result<(), WindowError> {
        let position_attr = attr("AXPosition");
        let size_attr = attr("AXSize");
        let point = CGPoint::new(frame.x, frame.y);
        let dimensions = CGSize::new(frame.width, frame.height);

        unsafe {
            let position =
                AXValueCreate(AX_VALUE_TYPE_CGPOINT, &point as *const CGPoint as *const c_void);
            if position.is_null() {
                return Err(WindowError::WriteFailed);
            }
            let err = AXUIElementSetAttributeValue(self.0, raw(&position_attr), position);
            CFRelease(position);
            if err != AX_ERROR_SUCCESS {
                return Err(WindowError::WriteFailed);
            }

            let size =
                AXValueCreate(AX_VALUE_TYPE_CGSIZE, &dimensions as *const CGSize as *const c_void);
            if size.is_null() {
                return Err(WindowError::WriteFailed);
            }
            let err = AXUIElementSetAttributeValue(self.0, raw(&size_attr), size);
            CFRelease(size);
            if err != AX_ERROR_SUCCESS {
                return Err(WindowError::WriteFailed);
            }
        }
        Ok(())
    }

    fn is_minimized(&self) -> Result<bool, WindowError> {
        let value = copy_attribute(self.0, "AXMinimized").ok_or(WindowError::ReadFailed)?;
        let minimized = unsafe {
            let minimized = CFBooleanGetValue(value);
            CFRelease(value);
            minimized
        };
        Ok(minimized)
    }

    fn perform_zoom(&self) -> Result<(), WindowError> {
        let button = copy_attribute(self.0, "AXZoomButton").ok_or(WindowError::Unsupported)?;
        let action = attr("AXPress");
        let err = unsafe {
            let err = AXUIElementPerformAction(button, raw(&action));
            CFRelease(button);
            err
        };
        if err == AX_ERROR_SUCCESS { Ok(()) } else { Err(WindowError::WriteFailed) }
    }
}
