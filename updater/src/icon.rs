//! 메뉴 상태 아이콘
//!
//! 정적 리소스 없이 안티앨리어싱된 원을 직접 그립니다.
//! 픽셀은 위→아래 행 순서, premultiplied ARGB(`0xAARRGGBB`)입니다.
//! 실제 비트맵 핸들 생성/해제는 `IconFactory` 구현(플랫폼 쪽)이 맡습니다.

use crate::scale::scale_px;

/// 아이콘 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusIcon {
    /// 업데이트 있음
    Available,
    /// 업데이트 없음
    UpToDate,
}

impl StatusIcon {
    pub fn color(self) -> Rgb {
        match self {
            StatusIcon::Available => Rgb(76, 175, 80),
            StatusIcon::UpToDate => Rgb(153, 153, 153),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// 아이콘 크기를 못 구했을 때 쓰는 값
pub const FALLBACK_ICON_PX: i32 = 16;

const ICON_BASE_DIP: i32 = 10;
const ICON_MIN_DIP: i32 = 7;

/// 메뉴 아이콘 한 변 크기(px)
///
/// 10dip를 배율에 맞추고, 시스템 메뉴 체크 크기를 알면 그것을 상한으로,
/// 7dip를 하한으로 씁니다.
pub fn menu_icon_size(ui_scale: f32, system_check: Option<i32>) -> i32 {
    let dip_px = scale_px(ICON_BASE_DIP, ui_scale);
    let min_px = scale_px(ICON_MIN_DIP, ui_scale);
    let size = match system_check.filter(|&s| s > 0) {
        Some(sys) => dip_px.min(sys),
        None => dip_px,
    };
    let size = size.max(min_px);
    if size <= 0 {
        FALLBACK_ICON_PX
    } else {
        size
    }
}

/// `size`×`size` 원을 그립니다. 가장자리 1px은 알파를 선형으로 낮춥니다.
pub fn render_circle(color: Rgb, size: i32) -> Vec<u32> {
    let size = size.max(0) as usize;
    let mut pixels = vec![0u32; size * size];
    let center = size as f32 / 2.0;
    let radius = (size as f32 - 2.0) / 2.0;
    let Rgb(r, g, b) = color;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let distance = (dx * dx + dy * dy).sqrt();
            let alpha: u32 = if distance > radius {
                0
            } else if distance >= radius - 1.0 {
                ((radius - distance) * 255.0) as u32
            } else {
                255
            };
            let pr = r as u32 * alpha / 255;
            let pg = g as u32 * alpha / 255;
            let pb = b as u32 * alpha / 255;
            pixels[y * size + x] = (alpha << 24) | (pr << 16) | (pg << 8) | pb;
        }
    }
    pixels
}

/// 픽셀 버퍼로 플랫폼 아이콘을 만드는 팩토리
pub trait IconFactory {
    type Icon: Copy;

    /// 실패하면 None (아이콘 없이 표시)
    fn create(&self, pixels: &[u32], size: i32) -> Option<Self::Icon>;

    fn destroy(&self, icon: Self::Icon);
}

/// 두 상태 아이콘 캐시. 요구 크기가 바뀔 때만 다시 만듭니다.
pub struct IconCache<F: IconFactory> {
    factory: F,
    size: i32,
    available: Option<F::Icon>,
    up_to_date: Option<F::Icon>,
}

impl<F: IconFactory> IconCache<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            size: 0,
            available: None,
            up_to_date: None,
        }
    }

    /// 현재 아이콘 크기 (없으면 0)
    pub fn size(&self) -> i32 {
        self.size
    }

    /// 요구 크기의 아이콘을 준비합니다. 다시 만들었으면 `true`.
    pub fn ensure(&mut self, desired: i32) -> bool {
        let desired = if desired <= 0 { FALLBACK_ICON_PX } else { desired };
        if desired == self.size && self.available.is_some() && self.up_to_date.is_some() {
            return false;
        }

        self.clear();
        self.available = self.build(StatusIcon::Available, desired);
        self.up_to_date = self.build(StatusIcon::UpToDate, desired);
        self.size = desired;
        tracing::debug!("[Menu] Status icons rebuilt at {}px", desired);
        true
    }

    pub fn get(&self, kind: StatusIcon) -> Option<F::Icon> {
        match kind {
            StatusIcon::Available => self.available,
            StatusIcon::UpToDate => self.up_to_date,
        }
    }

    /// 만든 아이콘을 모두 해제합니다.
    pub fn clear(&mut self) {
        if let Some(icon) = self.available.take() {
            self.factory.destroy(icon);
        }
        if let Some(icon) = self.up_to_date.take() {
            self.factory.destroy(icon);
        }
        self.size = 0;
    }

    fn build(&self, kind: StatusIcon, size: i32) -> Option<F::Icon> {
        let icon = self.factory.create(&render_circle(kind.color(), size), size);
        if icon.is_none() {
            tracing::warn!("[Menu] Could not allocate {:?} icon ({}px)", kind, size);
        }
        icon
    }
}

impl<F: IconFactory> Drop for IconCache<F> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        created: Vec<i32>,
        destroyed: Vec<u32>,
        next: u32,
    }

    struct CountingFactory(Rc<RefCell<Log>>);

    impl IconFactory for CountingFactory {
        type Icon = u32;

        fn create(&self, pixels: &[u32], size: i32) -> Option<u32> {
            assert_eq!(pixels.len(), (size * size) as usize);
            let mut log = self.0.borrow_mut();
            log.created.push(size);
            log.next += 1;
            Some(log.next)
        }

        fn destroy(&self, icon: u32) {
            self.0.borrow_mut().destroyed.push(icon);
        }
    }

    #[test]
    fn circle_is_opaque_in_center_and_clear_in_corners() {
        let px = render_circle(Rgb(76, 175, 80), 16);
        assert_eq!(px.len(), 256);
        assert_eq!(px[8 * 16 + 8], 0xFF4C_AF50);
        assert_eq!(px[0], 0);
        assert_eq!(px[15], 0);
        assert_eq!(px[15 * 16 + 15], 0);
    }

    #[test]
    fn edge_pixels_are_premultiplied() {
        let px = render_circle(Rgb(255, 255, 255), 16);
        for &p in &px {
            let a = p >> 24;
            let r = (p >> 16) & 0xFF;
            let g = (p >> 8) & 0xFF;
            let b = p & 0xFF;
            assert!(r <= a && g <= a && b <= a, "channel exceeds alpha in {:#010x}", p);
        }
        // 반쯤 덮인 가장자리 픽셀이 하나 이상 있어야 한다
        assert!(px.iter().any(|&p| {
            let a = p >> 24;
            a > 0 && a < 255
        }));
    }

    #[test]
    fn icon_size_rules() {
        // 100%: 10px, 시스템 체크 크기가 더 작으면 그 값 (단, 7px 이상)
        assert_eq!(menu_icon_size(1.0, None), 10);
        assert_eq!(menu_icon_size(1.0, Some(15)), 10);
        assert_eq!(menu_icon_size(1.0, Some(8)), 8);
        assert_eq!(menu_icon_size(1.0, Some(4)), 7);
        assert_eq!(menu_icon_size(1.0, Some(0)), 10);
        // 180% (200% 완화): 18px
        assert_eq!(menu_icon_size(1.8, Some(30)), 18);
    }

    #[test]
    fn cache_rebuilds_only_on_size_change() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut cache = IconCache::new(CountingFactory(log.clone()));

        assert!(cache.ensure(10));
        assert!(!cache.ensure(10));
        assert_eq!(log.borrow().created, vec![10, 10]);

        assert!(cache.ensure(14));
        assert_eq!(log.borrow().created, vec![10, 10, 14, 14]);
        assert_eq!(log.borrow().destroyed, vec![1, 2]);
        assert_eq!(cache.get(StatusIcon::Available), Some(3));
        assert_eq!(cache.get(StatusIcon::UpToDate), Some(4));
    }

    #[test]
    fn non_positive_size_falls_back() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut cache = IconCache::new(CountingFactory(log.clone()));
        cache.ensure(0);
        assert_eq!(cache.size(), FALLBACK_ICON_PX);
    }

    #[test]
    fn drop_releases_icons() {
        let log = Rc::new(RefCell::new(Log::default()));
        {
            let mut cache = IconCache::new(CountingFactory(log.clone()));
            cache.ensure(12);
        }
        assert_eq!(log.borrow().destroyed.len(), 2);
    }
}
