//! 호스트 연동 계약
//!
//! 호스트 애플리케이션의 윈도우/메뉴는 우리가 소유하지 않습니다.
//! 여기서는 플랫폼 독립적인 부분만 정의합니다:
//! - `HostPlatform`: 윈도우 탐색, 가로채기 설치/해제, 갱신 신호 게시
//! - `intercept`: 어떤 이벤트를 가로채고 어떤 것을 그대로 넘길지
//! - `HostMenu` + `render_menu`: 메뉴 항목 라벨/아이콘 적용
//!
//! Win32 구현은 플러그인 크레이트에 있습니다.

use std::fmt;

use crate::error::{HostError, MenuError};
use crate::icon::{IconCache, IconFactory, StatusIcon};
use crate::state::UpdateSnapshot;

/// 이 모듈 전용으로 예약된 메뉴 항목 id
pub const UPDATE_MENU_ID: u16 = 0xE711;

/// 메뉴 항목 라벨 (상태는 아이콘으로만 구분)
pub const MENU_LABEL: &str = "Updates";

/// 호스트 프로세스 쪽 연동 지점
pub trait HostPlatform: Send + Sync + 'static {
    /// 호스트 윈도우 참조
    type Window: Copy + Send + Sync + fmt::Debug + 'static;
    /// 가로채기 해제에 필요한 정보 (원래 핸들러 포함)
    type Handle: Send + 'static;

    /// 현재 프로세스에서 보이고 메뉴를 가진 윈도우를 찾습니다.
    fn find_menu_window(&self) -> Option<Self::Window>;

    /// 윈도우 이벤트 핸들러를 가로채기 핸들러로 교체합니다.
    fn attach(&self, window: Self::Window) -> Result<Self::Handle, HostError>;

    /// 원래 핸들러를 복원합니다.
    fn detach(&self, handle: Self::Handle);

    /// 호스트 이벤트 큐에 갱신 요청을 게시합니다. 여러 번 보내도 결과는 같습니다.
    fn post_refresh(&self, window: Self::Window) -> bool;
}

/// 가로채기 핸들러가 구분하는 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// 메뉴가 열리기 직전
    MenuInit,
    /// 메뉴 조작 진입
    MenuLoopEntered,
    /// 메뉴/커맨드 실행
    Command(u16),
    /// 화면 배율 변경
    DensityChanged,
    /// 내부 갱신 신호
    RefreshRequested,
    Other,
}

/// 이벤트에 대해 할 일
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    RefreshMenu,
    OpenDialog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interception {
    pub reaction: Option<Reaction>,
    /// 원래 핸들러로도 넘길지
    pub forward: bool,
}

impl Interception {
    const PASS: Self = Self { reaction: None, forward: true };

    fn observe(reaction: Reaction) -> Self {
        Self { reaction: Some(reaction), forward: true }
    }

    fn consume(reaction: Reaction) -> Self {
        Self { reaction: Some(reaction), forward: false }
    }
}

/// 이벤트 라우팅 규칙
///
/// 메뉴 열림/배율 변경은 갱신 후 호스트에도 전달하고,
/// 내부 갱신 신호와 업데이트 커맨드는 여기서 소비합니다.
pub fn intercept(event: HostEvent) -> Interception {
    match event {
        HostEvent::MenuInit | HostEvent::MenuLoopEntered | HostEvent::DensityChanged => {
            Interception::observe(Reaction::RefreshMenu)
        }
        HostEvent::RefreshRequested => Interception::consume(Reaction::RefreshMenu),
        HostEvent::Command(id) if id == UPDATE_MENU_ID => Interception::consume(Reaction::OpenDialog),
        HostEvent::Command(_) | HostEvent::Other => Interception::PASS,
    }
}

/// 메뉴 항목에 표시할 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStatus {
    /// 첫 비교 전: 아이콘 없음
    Pending,
    UpdatesAvailable,
    UpToDate,
}

impl MenuStatus {
    pub fn from_snapshot(snapshot: &UpdateSnapshot) -> Self {
        if !snapshot.ready {
            MenuStatus::Pending
        } else if snapshot.updates.is_empty() {
            MenuStatus::UpToDate
        } else {
            MenuStatus::UpdatesAvailable
        }
    }

    pub fn icon(self) -> Option<StatusIcon> {
        match self {
            MenuStatus::Pending => None,
            MenuStatus::UpdatesAvailable => Some(StatusIcon::Available),
            MenuStatus::UpToDate => Some(StatusIcon::UpToDate),
        }
    }
}

/// 호스트 메뉴 조작
pub trait HostMenu {
    type Icon: Copy;

    fn contains(&self, id: u16) -> bool;

    fn append(&mut self, id: u16, label: &str) -> bool;

    fn update(&mut self, id: u16, label: &str, icon: Option<Self::Icon>) -> bool;

    /// 메뉴 바 다시 그리기
    fn redraw(&mut self);
}

/// 항목이 없으면 한 번만 추가하고, 라벨/아이콘을 적용합니다.
///
/// 추가가 실패하면 다시 시도하지 않고 에러를 돌려줍니다.
pub fn apply_menu_item<M: HostMenu>(
    menu: &mut M,
    id: u16,
    label: &str,
    icon: Option<M::Icon>,
) -> Result<(), MenuError> {
    if !menu.contains(id) && (!menu.append(id, label) || !menu.contains(id)) {
        return Err(MenuError::AppendFailed(id));
    }
    if !menu.update(id, label, icon) {
        return Err(MenuError::UpdateFailed(id));
    }
    menu.redraw();
    Ok(())
}

/// 스냅샷 상태로 업데이트 메뉴 항목을 갱신합니다.
pub fn render_menu<M, F>(
    menu: &mut M,
    snapshot: &UpdateSnapshot,
    icons: &IconCache<F>,
) -> Result<MenuStatus, MenuError>
where
    F: IconFactory,
    M: HostMenu<Icon = F::Icon>,
{
    let status = MenuStatus::from_snapshot(snapshot);
    let icon = status.icon().and_then(|kind| icons.get(kind));
    apply_menu_item(menu, UPDATE_MENU_ID, MENU_LABEL, icon)?;
    Ok(status)
}
