//! GDI 비트맵 상태 아이콘

use std::sync::{Mutex, PoisonError};

use winapi::ctypes::c_void;
use winapi::shared::minwindef::DWORD;
use winapi::shared::windef::{HBITMAP, HGDIOBJ};
use winapi::um::wingdi::{
    CreateDIBSection, DeleteObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS,
};
use winapi::um::winuser::{GetDC, ReleaseDC};

use crate::updater::{IconCache, IconFactory};

/// 스레드 간에 보관할 수 있는 HBITMAP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap(isize);

impl Bitmap {
    pub fn handle(self) -> HBITMAP {
        self.0 as HBITMAP
    }
}

/// 32bpp top-down DIB 섹션을 만드는 팩토리
pub struct GdiFactory;

impl IconFactory for GdiFactory {
    type Icon = Bitmap;

    fn create(&self, pixels: &[u32], size: i32) -> Option<Bitmap> {
        let count = (size.max(0) as usize).pow(2);
        if pixels.len() < count {
            return None;
        }

        unsafe {
            let mut info: BITMAPINFO = std::mem::zeroed();
            info.bmiHeader.biSize = std::mem::size_of::<BITMAPINFOHEADER>() as DWORD;
            info.bmiHeader.biWidth = size;
            info.bmiHeader.biHeight = -size; // top-down
            info.bmiHeader.biPlanes = 1;
            info.bmiHeader.biBitCount = 32;
            info.bmiHeader.biCompression = BI_RGB;

            let mut bits: *mut c_void = std::ptr::null_mut();
            let screen = GetDC(std::ptr::null_mut());
            let bitmap = CreateDIBSection(
                screen,
                &info,
                DIB_RGB_COLORS,
                &mut bits,
                std::ptr::null_mut(),
                0,
            );
            if !screen.is_null() {
                ReleaseDC(std::ptr::null_mut(), screen);
            }

            if bitmap.is_null() {
                return None;
            }
            if bits.is_null() {
                DeleteObject(bitmap as HGDIOBJ);
                return None;
            }
            std::ptr::copy_nonoverlapping(pixels.as_ptr(), bits as *mut u32, count);
            Some(Bitmap(bitmap as isize))
        }
    }

    fn destroy(&self, icon: Bitmap) {
        unsafe {
            DeleteObject(icon.handle() as HGDIOBJ);
        }
    }
}

static CACHE: Mutex<Option<IconCache<GdiFactory>>> = Mutex::new(None);

/// 아이콘 캐시를 빌려 씁니다 (없으면 생성).
pub(crate) fn with_cache<R>(f: impl FnOnce(&mut IconCache<GdiFactory>) -> R) -> R {
    let mut guard = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    let cache = guard.get_or_insert_with(|| IconCache::new(GdiFactory));
    f(cache)
}

/// 두 비트맵을 해제합니다.
pub(crate) fn release() {
    let cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner).take();
    drop(cache);
}
