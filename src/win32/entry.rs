//! DLL 진입점
//!
//! 로더 잠금 안에서는 스레드 하나만 띄우고 바로 돌아갑니다.

use std::sync::atomic::{AtomicIsize, Ordering};

use winapi::shared::minwindef::{BOOL, DWORD, HINSTANCE, LPVOID, TRUE};
use winapi::um::libloaderapi::{DisableThreadLibraryCalls, GetModuleHandleW};
use winapi::um::winnt::{DLL_PROCESS_ATTACH, DLL_PROCESS_DETACH};

static MODULE: AtomicIsize = AtomicIsize::new(0);

/// 이 DLL의 모듈 핸들
pub(crate) fn module_instance() -> HINSTANCE {
    let module = MODULE.load(Ordering::SeqCst);
    if module != 0 {
        module as HINSTANCE
    } else {
        unsafe { GetModuleHandleW(std::ptr::null()) }
    }
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn DllMain(module: HINSTANCE, reason: DWORD, reserved: LPVOID) -> BOOL {
    match reason {
        DLL_PROCESS_ATTACH => {
            MODULE.store(module as isize, Ordering::SeqCst);
            unsafe {
                DisableThreadLibraryCalls(module);
            }
            let _ = std::thread::Builder::new()
                .name("catalog-update-boot".into())
                .spawn(super::start);
        }
        // 프로세스 종료 중(reserved != NULL)에는 다른 스레드가 이미 사라졌으므로 정리하지 않음
        DLL_PROCESS_DETACH if reserved.is_null() => super::shutdown(),
        _ => {}
    }
    TRUE
}
