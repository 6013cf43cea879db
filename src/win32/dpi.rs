//! 윈도우 DPI 조회
//!
//! `GetDpiForWindow`/`GetSystemMetricsForDpi`는 Windows 10 1607 이후에만 있으므로
//! user32에서 동적으로 찾습니다.

use std::sync::OnceLock;

use winapi::ctypes::c_int;
use winapi::shared::minwindef::UINT;
use winapi::shared::windef::HWND;
use winapi::um::libloaderapi::{GetModuleHandleW, GetProcAddress};
use winapi::um::wingdi::{GetDeviceCaps, LOGPIXELSX};
use winapi::um::winuser::{GetDC, ReleaseDC, SM_CXMENUCHECK, SM_CYMENUCHECK};

use crate::updater::scale::{scale_for_dpi, ui_scale, BASE_DPI};

use super::wide;

type GetDpiForWindowFn = unsafe extern "system" fn(HWND) -> UINT;
type GetSystemMetricsForDpiFn = unsafe extern "system" fn(c_int, UINT) -> c_int;

struct DpiApi {
    dpi_for_window: Option<GetDpiForWindowFn>,
    metrics_for_dpi: Option<GetSystemMetricsForDpiFn>,
}

fn api() -> &'static DpiApi {
    static API: OnceLock<DpiApi> = OnceLock::new();
    API.get_or_init(|| unsafe {
        let user32 = GetModuleHandleW(wide("user32.dll").as_ptr());
        if user32.is_null() {
            return DpiApi {
                dpi_for_window: None,
                metrics_for_dpi: None,
            };
        }
        let dpi = GetProcAddress(user32, b"GetDpiForWindow\0".as_ptr() as *const _);
        let metrics = GetProcAddress(user32, b"GetSystemMetricsForDpi\0".as_ptr() as *const _);
        DpiApi {
            dpi_for_window: (!dpi.is_null())
                .then(|| std::mem::transmute::<_, GetDpiForWindowFn>(dpi)),
            metrics_for_dpi: (!metrics.is_null())
                .then(|| std::mem::transmute::<_, GetSystemMetricsForDpiFn>(metrics)),
        }
    })
}

/// 윈도우의 DPI. 조회할 수 없으면 화면 DC 값, 그것도 없으면 96.
pub fn window_dpi(hwnd: HWND) -> u32 {
    unsafe {
        if let Some(dpi_for_window) = api().dpi_for_window {
            if !hwnd.is_null() {
                let dpi = dpi_for_window(hwnd);
                if dpi > 0 {
                    return dpi;
                }
            }
        }
        let dc = GetDC(hwnd);
        if dc.is_null() {
            return BASE_DPI;
        }
        let dpi = GetDeviceCaps(dc, LOGPIXELSX);
        ReleaseDC(hwnd, dc);
        if dpi > 0 {
            dpi as u32
        } else {
            BASE_DPI
        }
    }
}

/// 완화하지 않은 배율
pub fn raw_scale(hwnd: HWND) -> f32 {
    scale_for_dpi(window_dpi(hwnd))
}

/// UI 배율 (200% → 180%)
pub fn ui_scale_for(hwnd: HWND) -> f32 {
    ui_scale(raw_scale(hwnd))
}

/// 윈도우 DPI 기준 메뉴 체크 표시 크기 (가로/세로 중 작은 값)
pub fn menu_check_size(hwnd: HWND) -> Option<i32> {
    let api = api();
    let (dpi_for_window, metrics_for_dpi) = (api.dpi_for_window?, api.metrics_for_dpi?);
    if hwnd.is_null() {
        return None;
    }
    unsafe {
        let dpi = dpi_for_window(hwnd);
        let w = metrics_for_dpi(SM_CXMENUCHECK, dpi);
        let h = metrics_for_dpi(SM_CYMENUCHECK, dpi);
        (w > 0 && h > 0).then(|| w.min(h))
    }
}
