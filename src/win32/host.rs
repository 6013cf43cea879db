//! 호스트 윈도우 탐색과 윈도우 프로시저 교체

use std::sync::atomic::{AtomicIsize, Ordering};

use winapi::shared::minwindef::{BOOL, DWORD, FALSE, LPARAM, TRUE};
use winapi::shared::windef::HWND;
use winapi::um::errhandlingapi::{GetLastError, SetLastError};
use winapi::um::processthreadsapi::GetCurrentProcessId;
use winapi::um::winuser::{
    EnumWindows, GetMenu, GetWindowLongPtrW, GetWindowThreadProcessId, IsWindow, IsWindowVisible,
    PostMessageW, SetWindowLongPtrW, GWLP_WNDPROC,
};

use crate::updater::{HostError, HostPlatform};

use super::wndproc::{intercept_proc, WM_CATALOG_REFRESH};

/// 교체 전 윈도우 프로시저 (0 = 가로채지 않음)
static ORIGINAL_PROC: AtomicIsize = AtomicIsize::new(0);

pub(crate) fn original_proc() -> isize {
    ORIGINAL_PROC.load(Ordering::SeqCst)
}

/// 스레드 간에 주고받을 수 있는 HWND
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostWindow(isize);

impl HostWindow {
    pub fn from_hwnd(hwnd: HWND) -> Self {
        Self(hwnd as isize)
    }

    pub fn hwnd(self) -> HWND {
        self.0 as HWND
    }
}

/// 복원에 필요한 정보
#[derive(Debug)]
pub struct Interposition {
    window: HostWindow,
    original: isize,
}

/// 현재 프로세스의 Win32 호스트
pub struct Win32Host;

unsafe extern "system" fn find_menu_window_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let found = &mut *(lparam as *mut Option<HostWindow>);
    let mut pid: DWORD = 0;
    GetWindowThreadProcessId(hwnd, &mut pid);
    if pid == GetCurrentProcessId() && IsWindowVisible(hwnd) != 0 && !GetMenu(hwnd).is_null() {
        *found = Some(HostWindow::from_hwnd(hwnd));
        return FALSE;
    }
    TRUE
}

impl HostPlatform for Win32Host {
    type Window = HostWindow;
    type Handle = Interposition;

    fn find_menu_window(&self) -> Option<HostWindow> {
        let mut found: Option<HostWindow> = None;
        unsafe {
            EnumWindows(
                Some(find_menu_window_proc),
                &mut found as *mut Option<HostWindow> as LPARAM,
            );
        }
        found
    }

    fn attach(&self, window: HostWindow) -> Result<Interposition, HostError> {
        if original_proc() != 0 {
            return Err(HostError::AlreadyAttached);
        }
        let hwnd = window.hwnd();

        unsafe {
            // 교체 직후 들어오는 메시지도 넘길 수 있도록 먼저 기록
            let current = GetWindowLongPtrW(hwnd, GWLP_WNDPROC);
            if current == 0 {
                return Err(HostError::AttachFailed(format!(
                    "GetWindowLongPtrW failed (error {})",
                    GetLastError()
                )));
            }
            ORIGINAL_PROC.store(current, Ordering::SeqCst);

            SetLastError(0);
            let previous = SetWindowLongPtrW(hwnd, GWLP_WNDPROC, replacement_proc());
            if previous == 0 {
                let code = GetLastError();
                if code != 0 {
                    ORIGINAL_PROC.store(0, Ordering::SeqCst);
                    return Err(HostError::AttachFailed(format!(
                        "SetWindowLongPtrW failed (error {})",
                        code
                    )));
                }
            } else if previous != current {
                ORIGINAL_PROC.store(previous, Ordering::SeqCst);
            }
        }

        Ok(Interposition {
            window,
            original: original_proc(),
        })
    }

    fn detach(&self, handle: Interposition) {
        // 원래 프로시저가 없으면 복원하지 않음
        if handle.original == 0 {
            return;
        }
        let hwnd = handle.window.hwnd();
        unsafe {
            if IsWindow(hwnd) != 0 {
                SetWindowLongPtrW(hwnd, GWLP_WNDPROC, handle.original);
            }
        }
        ORIGINAL_PROC.store(0, Ordering::SeqCst);
    }

    fn post_refresh(&self, window: HostWindow) -> bool {
        unsafe { PostMessageW(window.hwnd(), WM_CATALOG_REFRESH, 0, 0) != 0 }
    }
}

/// 교체해 넣을 윈도우 프로시저 주소
fn replacement_proc() -> isize {
    intercept_proc as *const () as isize
}
