//! 업데이트 목록 대화상자 정의
//!
//! 리소스 파일 없이 런타임에 대화상자를 만듭니다.
//! - `DialogTemplate`: 메모리 대화상자 템플릿(DLGTEMPLATE) 바이트 인코딩
//! - `DialogMetrics`/`layout`: 배율과 클라이언트 크기로 컨트롤 배치 계산
//!
//! 자식 컨트롤은 템플릿에 넣지 않고 초기화 시점에 직접 생성합니다.

use crate::compare::UpdateEntry;
use crate::scale::scale_px;

pub const DIALOG_TITLE: &str = "Packages with updates";
pub const LAUNCH_LABEL: &str = "Open catalog";
pub const CLOSE_LABEL: &str = "Close";
pub const COLUMN_TITLES: [&str; 3] = ["Package ID", "Installed version", "Latest version"];

pub const NOTICE_TITLE: &str = "Catalog";
pub const NO_UPDATES_MESSAGE: &str = "There are no updates right now.";

/// 목록 컨트롤 id
pub const IDC_LISTVIEW: u16 = 2001;
/// 카탈로그 실행 버튼 id
pub const IDC_BTN_LAUNCH: u16 = 2002;

// 윈도우 스타일 비트
pub const WS_CAPTION: u32 = 0x00C0_0000;
pub const WS_SYSMENU: u32 = 0x0008_0000;
pub const DS_MODALFRAME: u32 = 0x0000_0080;

/// 메모리 대화상자 템플릿
///
/// 레이아웃 (리틀 엔디언):
/// ```text
/// u32 style | u32 ex_style | u16 cdit | i16 x | i16 y | i16 cx | i16 cy
/// u16 menu (0) | u16 class (0) | UTF-16 title + NUL | 4바이트 정렬 패딩
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogTemplate {
    pub style: u32,
    pub ex_style: u32,
    pub x: i16,
    pub y: i16,
    pub cx: i16,
    pub cy: i16,
    pub title: String,
}

impl DialogTemplate {
    /// 캡션/시스템 메뉴/모달 프레임, 320×100 DLU
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            style: WS_CAPTION | WS_SYSMENU | DS_MODALFRAME,
            ex_style: 0,
            x: 0,
            y: 0,
            cx: 320,
            cy: 100,
            title: title.into(),
        }
    }

    pub fn with_extent(mut self, cx: i16, cy: i16) -> Self {
        self.cx = cx;
        self.cy = cy;
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + self.title.len() * 2);
        buf.extend_from_slice(&self.style.to_le_bytes());
        buf.extend_from_slice(&self.ex_style.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes()); // 컨트롤 개수
        for v in [self.x, self.y, self.cx, self.cy] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        push_word(&mut buf, 0); // 메뉴 없음
        push_word(&mut buf, 0); // 기본 대화상자 클래스
        push_wide(&mut buf, &self.title);
        align_dword(&mut buf);
        buf
    }
}

fn push_word(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn push_wide(buf: &mut Vec<u8>, s: &str) {
    for unit in s.encode_utf16() {
        push_word(buf, unit);
    }
    push_word(buf, 0);
}

fn align_dword(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// 배율이 반영된 배치 상수 (px)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogMetrics {
    pub margin: i32,
    pub spacing: i32,
    pub button_h: i32,
    pub close_w: i32,
    pub min_launch_w: i32,
    pub max_client_w: i32,
    pub min_list_h: i32,
}

impl DialogMetrics {
    pub fn for_scale(s: f32) -> Self {
        Self {
            margin: scale_px(8, s),
            spacing: scale_px(8, s),
            button_h: scale_px(32, s),
            close_w: scale_px(96, s),
            min_launch_w: scale_px(120, s),
            max_client_w: scale_px(380, s),
            min_list_h: scale_px(180, s),
        }
    }

    pub fn min_client_w(&self) -> i32 {
        self.margin + self.min_launch_w + self.spacing + self.close_w + self.margin
    }

    pub fn min_client_h(&self) -> i32 {
        self.margin + self.min_list_h + self.margin + self.button_h + self.margin
    }

    /// 초기 클라이언트 크기를 최소/최대 범위로 맞춥니다.
    pub fn clamp_client(&self, w: i32, h: i32) -> (i32, i32) {
        let w = w.max(self.min_client_w()).min(self.max_client_w);
        let h = h.max(self.min_client_h());
        (w, h)
    }
}

/// 컨트롤 배치 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogLayout {
    pub list: Rect,
    pub launch: Rect,
    pub close: Rect,
    pub columns: [i32; 3],
}

/// 클라이언트 크기에서 목록/버튼 위치를 계산합니다.
pub fn layout(client_w: i32, client_h: i32, m: &DialogMetrics) -> DialogLayout {
    let button_y = client_h - m.margin - m.button_h;
    let launch_w = (client_w - m.margin - m.spacing - m.close_w - m.margin).max(m.min_launch_w);
    DialogLayout {
        list: Rect {
            x: m.margin,
            y: m.margin,
            w: client_w - m.margin * 2,
            h: client_h - m.margin * 3 - m.button_h,
        },
        launch: Rect {
            x: m.margin,
            y: button_y,
            w: launch_w,
            h: m.button_h,
        },
        close: Rect {
            x: client_w - m.margin - m.close_w,
            y: button_y,
            w: m.close_w,
            h: m.button_h,
        },
        columns: column_widths(client_w, m.margin),
    }
}

/// 목록 열 너비. ID 55%, 설치 22.5%, 최신 22.5%.
///
/// 합계는 항상 `client_w - 2*margin - 4`(테두리 여백)이고 나머지 픽셀은 마지막 열에 붙습니다.
pub fn column_widths(client_w: i32, margin: i32) -> [i32; 3] {
    let content = client_w - margin * 2 - 4;
    let id = content * 55 / 100;
    let installed = (content - id) / 2;
    let latest = content - id - installed;
    [id, installed, latest]
}

/// 열을 처음 만들 때의 너비
pub fn initial_column_widths(s: f32) -> [i32; 3] {
    [scale_px(300, s), scale_px(165, s), scale_px(165, s)]
}

/// 목록 한 행의 셀 텍스트
pub fn row_cells(entry: &UpdateEntry) -> [&str; 3] {
    [
        entry.id.as_str(),
        entry.installed_version.as_str(),
        entry.latest_version.as_str(),
    ]
}
