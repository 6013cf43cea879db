//! 업데이트 목록 대화상자 (Win32)
//!
//! 템플릿은 제목만 가진 빈 대화상자이고, 목록과 버튼은 WM_INITDIALOG에서 만듭니다.
//! 컨텍스트는 lParam으로 넘겨 GWLP_USERDATA에 보관합니다.

use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use winapi::shared::basetsd::INT_PTR;
use winapi::shared::minwindef::{DWORD, FALSE, LOWORD, LPARAM, TRUE, UINT, WPARAM};
use winapi::shared::windef::{HFONT, HGDIOBJ, HWND, RECT};
use winapi::um::commctrl::{
    InitCommonControlsEx, ICC_LISTVIEW_CLASSES, INITCOMMONCONTROLSEX, LVCF_SUBITEM, LVCF_TEXT,
    LVCF_WIDTH, LVCOLUMNW, LVIF_TEXT, LVITEMW, LVM_INSERTCOLUMNW, LVM_INSERTITEMW,
    LVM_SETCOLUMNWIDTH, LVM_SETEXTENDEDLISTVIEWSTYLE, LVM_SETITEMTEXTW, LVS_EX_DOUBLEBUFFER,
    LVS_EX_FULLROWSELECT, LVS_EX_GRIDLINES, LVS_REPORT, LVS_SHOWSELALWAYS, LVS_SINGLESEL,
};
use winapi::um::wingdi::{CreateFontIndirectW, DeleteObject, GetStockObject, DEFAULT_GUI_FONT};
use winapi::um::winuser::{
    AdjustWindowRectEx, CreateWindowExW, DialogBoxIndirectParamW, EndDialog, GetClientRect,
    GetDlgItem, GetWindowLongPtrW, GetWindowRect, MessageBoxW, MoveWindow, SendMessageW,
    SetWindowLongPtrW, SetWindowPos, SystemParametersInfoW, BS_DEFPUSHBUTTON, DLGTEMPLATE,
    GWLP_USERDATA, GWL_EXSTYLE, GWL_STYLE, IDCANCEL, IDOK, MB_ICONERROR, MB_ICONINFORMATION,
    MB_OK, MB_SETFOREGROUND, MB_TOPMOST, NONCLIENTMETRICSW, SPI_GETNONCLIENTMETRICS,
    SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, WM_CLOSE, WM_COMMAND, WM_DPICHANGED,
    WM_GETFONT, WM_INITDIALOG, WM_SETFONT, WM_SIZE, WS_CHILD, WS_EX_CLIENTEDGE, WS_TABSTOP,
    WS_VISIBLE,
};

use crate::updater::dialog::{
    column_widths, initial_column_widths, layout, row_cells, DialogMetrics, DialogTemplate, Rect,
    CLOSE_LABEL, COLUMN_TITLES, DIALOG_TITLE, IDC_BTN_LAUNCH, IDC_LISTVIEW, LAUNCH_LABEL,
    NOTICE_TITLE, NO_UPDATES_MESSAGE,
};
use crate::updater::launcher;
use crate::updater::scale::scale_px;
use crate::updater::UpdateSnapshot;

use super::entry::module_instance;
use super::{current_snapshot, dpi, shared, wide};

/// 직접 만든 대화상자 글꼴 (0 = 없음)
static DIALOG_FONT: AtomicIsize = AtomicIsize::new(0);

struct DialogContext {
    owner: HWND,
    snapshot: Arc<UpdateSnapshot>,
    list: HWND,
}

/// 업데이트 목록을 모달로 보여줍니다. 업데이트가 없으면 안내 메시지만 띄웁니다.
pub(crate) fn show_updates(owner: HWND) {
    let snapshot = current_snapshot();
    if snapshot.updates.is_empty() {
        message_box(
            owner,
            NO_UPDATES_MESSAGE,
            NOTICE_TITLE,
            MB_OK | MB_ICONINFORMATION | MB_SETFOREGROUND,
        );
        return;
    }

    // DLGTEMPLATE은 DWORD 정렬이 필요
    let template = dword_aligned(&DialogTemplate::new(DIALOG_TITLE).encode());
    let mut ctx = DialogContext {
        owner,
        snapshot,
        list: std::ptr::null_mut(),
    };

    let result = unsafe {
        DialogBoxIndirectParamW(
            module_instance(),
            template.as_ptr() as *const DLGTEMPLATE,
            owner,
            Some(dialog_proc),
            &mut ctx as *mut DialogContext as LPARAM,
        )
    };
    if result == -1 {
        tracing::warn!("[Dialog] Could not create the update list dialog");
    }
}

fn dword_aligned(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word)
        })
        .collect()
}

fn message_box(owner: HWND, text: &str, title: &str, flags: UINT) {
    let text = wide(text);
    let title = wide(title);
    unsafe {
        MessageBoxW(owner, text.as_ptr(), title.as_ptr(), flags);
    }
}

unsafe extern "system" fn dialog_proc(hwnd: HWND, msg: UINT, wparam: WPARAM, lparam: LPARAM) -> INT_PTR {
    if msg == WM_INITDIALOG {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, lparam);
        let ctx = lparam as *mut DialogContext;
        if let Some(ctx) = ctx.as_mut() {
            on_init(hwnd, ctx);
        }
        return TRUE as INT_PTR;
    }

    let ctx = match (GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut DialogContext).as_mut() {
        Some(ctx) => ctx,
        None => return FALSE as INT_PTR,
    };

    match msg {
        WM_SIZE => {
            on_size(hwnd, ctx);
            TRUE as INT_PTR
        }
        WM_DPICHANGED => {
            on_dpi_changed(hwnd, ctx, lparam as *const RECT);
            TRUE as INT_PTR
        }
        WM_COMMAND => match LOWORD(wparam as DWORD) as i32 {
            id if id == IDC_BTN_LAUNCH as i32 => {
                on_launch(hwnd);
                TRUE as INT_PTR
            }
            IDCANCEL => {
                EndDialog(hwnd, IDOK as INT_PTR);
                TRUE as INT_PTR
            }
            _ => FALSE as INT_PTR,
        },
        WM_CLOSE => {
            EndDialog(hwnd, IDOK as INT_PTR);
            TRUE as INT_PTR
        }
        _ => FALSE as INT_PTR,
    }
}

unsafe fn client_size(hwnd: HWND) -> (i32, i32) {
    let mut rc: RECT = std::mem::zeroed();
    GetClientRect(hwnd, &mut rc);
    (rc.right - rc.left, rc.bottom - rc.top)
}

unsafe fn create_child(
    parent: HWND,
    ex_style: DWORD,
    class: &str,
    text: &str,
    style: DWORD,
    rect: Rect,
    id: i32,
) -> HWND {
    let class = wide(class);
    let text = wide(text);
    CreateWindowExW(
        ex_style,
        class.as_ptr(),
        text.as_ptr(),
        style,
        rect.x,
        rect.y,
        rect.w,
        rect.h,
        parent,
        id as isize as _,
        module_instance(),
        std::ptr::null_mut(),
    )
}

unsafe fn on_init(hwnd: HWND, ctx: &mut DialogContext) {
    let (cx, cy) = client_size(hwnd);
    let scale = dpi::ui_scale_for(hwnd);
    let metrics = DialogMetrics::for_scale(scale);

    let controls = INITCOMMONCONTROLSEX {
        dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as DWORD,
        dwICC: ICC_LISTVIEW_CLASSES,
    };
    InitCommonControlsEx(&controls);

    let placed = layout(cx, cy, &metrics);
    ctx.list = create_child(
        hwnd,
        WS_EX_CLIENTEDGE,
        "SysListView32",
        "",
        WS_CHILD | WS_VISIBLE | LVS_REPORT | LVS_SINGLESEL | LVS_SHOWSELALWAYS,
        placed.list,
        IDC_LISTVIEW as i32,
    );
    if ctx.list.is_null() {
        tracing::warn!("[Dialog] List control could not be created");
    } else {
        SendMessageW(
            ctx.list,
            LVM_SETEXTENDEDLISTVIEWSTYLE,
            0,
            (LVS_EX_FULLROWSELECT | LVS_EX_GRIDLINES | LVS_EX_DOUBLEBUFFER) as LPARAM,
        );
        insert_columns(ctx.list, scale);
        populate(ctx.list, &ctx.snapshot);
    }

    create_child(
        hwnd,
        0,
        "BUTTON",
        LAUNCH_LABEL,
        WS_CHILD | WS_VISIBLE | WS_TABSTOP | BS_DEFPUSHBUTTON,
        placed.launch,
        IDC_BTN_LAUNCH as i32,
    );
    create_child(
        hwnd,
        0,
        "BUTTON",
        CLOSE_LABEL,
        WS_CHILD | WS_VISIBLE | WS_TABSTOP,
        placed.close,
        IDCANCEL,
    );

    apply_font(hwnd, ctx.list);
    set_column_widths(ctx.list, placed.columns);

    // 너무 작거나 넓으면 범위 안으로
    let (w, h) = metrics.clamp_client(cx, cy);
    if (w, h) != (cx, cy) {
        resize_client(hwnd, w, h);
        let (cx, _) = client_size(hwnd);
        set_column_widths(ctx.list, column_widths(cx, metrics.margin));
    }

    center_on(hwnd, ctx.owner);
    tracing::debug!("[Dialog] Opened with {} row(s)", ctx.snapshot.updates.len());
}

unsafe fn on_size(hwnd: HWND, ctx: &DialogContext) {
    let (cx, cy) = client_size(hwnd);
    let metrics = DialogMetrics::for_scale(dpi::ui_scale_for(hwnd));
    let placed = layout(cx, cy, &metrics);

    if !ctx.list.is_null() {
        move_to(ctx.list, placed.list);
        set_column_widths(ctx.list, placed.columns);
    }
    move_to(GetDlgItem(hwnd, IDC_BTN_LAUNCH as i32), placed.launch);
    move_to(GetDlgItem(hwnd, IDCANCEL), placed.close);
}

unsafe fn on_dpi_changed(hwnd: HWND, ctx: &DialogContext, suggested: *const RECT) {
    if let Some(suggested) = suggested.as_ref() {
        // 권장 크기를 쓰되 최대 폭은 넘지 않게
        let max_client_w = scale_px(380, dpi::raw_scale(hwnd));
        let mut frame = RECT {
            left: 0,
            top: 0,
            right: max_client_w,
            bottom: 100,
        };
        AdjustWindowRectEx(&mut frame, window_style(hwnd), FALSE, window_ex_style(hwnd));
        let max_window_w = frame.right - frame.left;
        let width = (suggested.right - suggested.left).min(max_window_w);
        SetWindowPos(
            hwnd,
            std::ptr::null_mut(),
            suggested.left,
            suggested.top,
            width,
            suggested.bottom - suggested.top,
            SWP_NOZORDER | SWP_NOACTIVATE,
        );
    }

    apply_font(hwnd, ctx.list);
    let metrics = DialogMetrics::for_scale(dpi::ui_scale_for(hwnd));
    let (cx, _) = client_size(hwnd);
    set_column_widths(ctx.list, column_widths(cx, metrics.margin));
}

fn on_launch(hwnd: HWND) {
    let Some(shared) = shared() else {
        return;
    };
    if let Err(e) = launcher::launch_catalog(&shared.store) {
        tracing::warn!("[Launch] {} (code {})", e, e.code());
        message_box(hwnd, &e.user_message(), e.title(), MB_OK | MB_ICONERROR | MB_TOPMOST);
    }
}

unsafe fn insert_columns(list: HWND, scale: f32) {
    let widths = initial_column_widths(scale);
    for (i, (title, width)) in COLUMN_TITLES.iter().zip(widths).enumerate() {
        let mut text = wide(title);
        let mut column: LVCOLUMNW = std::mem::zeroed();
        column.mask = LVCF_TEXT | LVCF_WIDTH | LVCF_SUBITEM;
        column.pszText = text.as_mut_ptr();
        column.cx = width;
        column.iSubItem = i as i32;
        SendMessageW(list, LVM_INSERTCOLUMNW, i as WPARAM, &column as *const LVCOLUMNW as LPARAM);
    }
}

unsafe fn populate(list: HWND, snapshot: &UpdateSnapshot) {
    for (i, entry) in snapshot.updates.iter().enumerate() {
        let cells = row_cells(entry);

        let mut first = wide(cells[0]);
        let mut item: LVITEMW = std::mem::zeroed();
        item.mask = LVIF_TEXT;
        item.iItem = i as i32;
        item.pszText = first.as_mut_ptr();
        let row = SendMessageW(list, LVM_INSERTITEMW, 0, &item as *const LVITEMW as LPARAM);
        if row < 0 {
            continue;
        }

        for (sub, cell) in cells.iter().enumerate().skip(1) {
            let mut text = wide(cell);
            let mut item: LVITEMW = std::mem::zeroed();
            item.iSubItem = sub as i32;
            item.pszText = text.as_mut_ptr();
            SendMessageW(list, LVM_SETITEMTEXTW, row as WPARAM, &item as *const LVITEMW as LPARAM);
        }
    }
}

unsafe fn set_column_widths(list: HWND, widths: [i32; 3]) {
    if list.is_null() {
        return;
    }
    for (i, width) in widths.iter().enumerate() {
        SendMessageW(list, LVM_SETCOLUMNWIDTH, i as WPARAM, *width as LPARAM);
    }
}

unsafe fn move_to(control: HWND, rect: Rect) {
    if !control.is_null() {
        MoveWindow(control, rect.x, rect.y, rect.w, rect.h, TRUE);
    }
}

unsafe fn window_style(hwnd: HWND) -> DWORD {
    GetWindowLongPtrW(hwnd, GWL_STYLE) as DWORD
}

unsafe fn window_ex_style(hwnd: HWND) -> DWORD {
    GetWindowLongPtrW(hwnd, GWL_EXSTYLE) as DWORD
}

/// 클라이언트 영역이 `w`×`h`가 되도록 창 크기를 바꿉니다.
unsafe fn resize_client(hwnd: HWND, w: i32, h: i32) {
    let mut frame = RECT {
        left: 0,
        top: 0,
        right: w,
        bottom: h,
    };
    AdjustWindowRectEx(&mut frame, window_style(hwnd), FALSE, window_ex_style(hwnd));
    SetWindowPos(
        hwnd,
        std::ptr::null_mut(),
        0,
        0,
        frame.right - frame.left,
        frame.bottom - frame.top,
        SWP_NOMOVE | SWP_NOZORDER,
    );
}

unsafe fn center_on(hwnd: HWND, owner: HWND) {
    if owner.is_null() {
        return;
    }
    let mut rc: RECT = std::mem::zeroed();
    let mut pr: RECT = std::mem::zeroed();
    GetWindowRect(hwnd, &mut rc);
    if GetWindowRect(owner, &mut pr) == 0 {
        return;
    }
    let (w, h) = (rc.right - rc.left, rc.bottom - rc.top);
    let x = pr.left + ((pr.right - pr.left) - w) / 2;
    let y = pr.top + ((pr.bottom - pr.top) - h) / 2;
    SetWindowPos(
        hwnd,
        std::ptr::null_mut(),
        x,
        y,
        0,
        0,
        SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
    );
}

/// 대화상자 글꼴. 없으면 시스템 메시지 글꼴(실패 시 기본 GUI 글꼴).
unsafe fn dialog_font(hwnd: HWND) -> HFONT {
    let current = SendMessageW(hwnd, WM_GETFONT, 0, 0) as HFONT;
    if !current.is_null() {
        return current;
    }
    let owned = DIALOG_FONT.load(Ordering::SeqCst);
    if owned != 0 {
        return owned as HFONT;
    }

    let mut metrics: NONCLIENTMETRICSW = std::mem::zeroed();
    metrics.cbSize = std::mem::size_of::<NONCLIENTMETRICSW>() as UINT;
    if SystemParametersInfoW(
        SPI_GETNONCLIENTMETRICS,
        metrics.cbSize,
        &mut metrics as *mut NONCLIENTMETRICSW as *mut _,
        0,
    ) != 0
    {
        let font = CreateFontIndirectW(&metrics.lfMessageFont);
        if !font.is_null() {
            DIALOG_FONT.store(font as isize, Ordering::SeqCst);
            return font;
        }
    }
    GetStockObject(DEFAULT_GUI_FONT as i32) as HFONT
}

unsafe fn apply_font(hwnd: HWND, list: HWND) {
    let font = dialog_font(hwnd);
    if font.is_null() {
        return;
    }
    for control in [list, GetDlgItem(hwnd, IDC_BTN_LAUNCH as i32), GetDlgItem(hwnd, IDCANCEL)] {
        if !control.is_null() {
            SendMessageW(control, WM_SETFONT, font as WPARAM, TRUE as LPARAM);
        }
    }
}

/// 직접 만든 글꼴을 해제합니다.
pub(crate) fn release_font() {
    let font = DIALOG_FONT.swap(0, Ordering::SeqCst);
    if font != 0 {
        unsafe {
            DeleteObject(font as HGDIOBJ);
        }
    }
}
