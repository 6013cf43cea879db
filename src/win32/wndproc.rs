//! 가로채기 윈도우 프로시저

use std::panic::{catch_unwind, AssertUnwindSafe};

use winapi::shared::minwindef::{LOWORD, LPARAM, LRESULT, UINT, WPARAM};
use winapi::shared::windef::HWND;
use winapi::um::winuser::{
    CallWindowProcW, DefWindowProcW, WM_APP, WM_COMMAND, WM_DPICHANGED, WM_ENTERMENULOOP,
    WM_INITMENU, WNDPROC,
};

use crate::updater::host::{intercept, HostEvent, Reaction};

use super::{dialog, host, menu};

/// 백그라운드 작업이 보내는 메뉴 갱신 요청
pub const WM_CATALOG_REFRESH: UINT = WM_APP + 100;

fn classify(msg: UINT, wparam: WPARAM) -> HostEvent {
    match msg {
        WM_INITMENU => HostEvent::MenuInit,
        WM_ENTERMENULOOP => HostEvent::MenuLoopEntered,
        WM_COMMAND => HostEvent::Command(LOWORD(wparam as u32)),
        WM_DPICHANGED => HostEvent::DensityChanged,
        WM_CATALOG_REFRESH => HostEvent::RefreshRequested,
        _ => HostEvent::Other,
    }
}

pub(crate) unsafe extern "system" fn intercept_proc(
    hwnd: HWND,
    msg: UINT,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let decision = intercept(classify(msg, wparam));

    if let Some(reaction) = decision.reaction {
        // 호스트로 패닉이 넘어가지 않게 함
        let result = catch_unwind(AssertUnwindSafe(|| match reaction {
            Reaction::RefreshMenu => menu::refresh(hwnd),
            Reaction::OpenDialog => dialog::show_updates(hwnd),
        }));
        if result.is_err() {
            tracing::error!("[Host] {:?} handler panicked", reaction);
        }
    }

    if decision.forward {
        forward(hwnd, msg, wparam, lparam)
    } else {
        0
    }
}

unsafe fn forward(hwnd: HWND, msg: UINT, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let original = host::original_proc();
    if original == 0 {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }
    let proc: WNDPROC = std::mem::transmute(original);
    CallWindowProcW(proc, hwnd, msg, wparam, lparam)
}
