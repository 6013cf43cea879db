//! 호스트 메뉴 항목 갱신

use winapi::shared::minwindef::{FALSE, UINT};
use winapi::shared::windef::{HMENU, HWND};
use winapi::um::winuser::{
    AppendMenuW, DrawMenuBar, GetMenu, GetMenuState, SetMenuItemInfoW, MENUITEMINFOW,
    MF_BYCOMMAND, MF_STRING, MIIM_BITMAP, MIIM_STRING,
};

use crate::updater::host::{render_menu, HostMenu};
use crate::updater::icon::menu_icon_size;
use crate::updater::MenuError;

use super::icons::{self, Bitmap};
use super::{current_snapshot, dpi, wide};

/// 호스트 윈도우의 메뉴 바
struct Win32Menu {
    hwnd: HWND,
    hmenu: HMENU,
}

impl HostMenu for Win32Menu {
    type Icon = Bitmap;

    fn contains(&self, id: u16) -> bool {
        unsafe { GetMenuState(self.hmenu, id as UINT, MF_BYCOMMAND) != UINT::MAX }
    }

    fn append(&mut self, id: u16, label: &str) -> bool {
        let text = wide(label);
        unsafe { AppendMenuW(self.hmenu, MF_STRING, id as usize, text.as_ptr()) != 0 }
    }

    fn update(&mut self, id: u16, label: &str, icon: Option<Bitmap>) -> bool {
        let mut text = wide(label);
        unsafe {
            let mut item: MENUITEMINFOW = std::mem::zeroed();
            item.cbSize = std::mem::size_of::<MENUITEMINFOW>() as UINT;
            item.fMask = MIIM_STRING | MIIM_BITMAP;
            item.dwTypeData = text.as_mut_ptr();
            item.cch = (text.len() - 1) as UINT;
            item.hbmpItem = icon.map_or(std::ptr::null_mut(), Bitmap::handle);
            SetMenuItemInfoW(self.hmenu, id as UINT, FALSE, &item) != 0
        }
    }

    fn redraw(&mut self) {
        unsafe {
            DrawMenuBar(self.hwnd);
        }
    }
}

/// 현재 스냅샷으로 업데이트 메뉴 항목을 다시 그립니다.
pub(crate) fn refresh(hwnd: HWND) {
    let hmenu = unsafe { GetMenu(hwnd) };
    if hmenu.is_null() {
        tracing::debug!("[Menu] {}", MenuError::NoMenu);
        return;
    }

    let snapshot = current_snapshot();
    let size = menu_icon_size(dpi::ui_scale_for(hwnd), dpi::menu_check_size(hwnd));
    let mut menu = Win32Menu { hwnd, hmenu };

    icons::with_cache(|cache| {
        cache.ensure(size);
        match render_menu(&mut menu, &snapshot, cache) {
            Ok(status) => tracing::debug!("[Menu] Rendered {:?} (generation {})", status, snapshot.generation),
            Err(e) => tracing::warn!("[Menu] {}", e),
        }
    });
}
