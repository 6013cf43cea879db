//! 화면 배율(DPI) 계산

/// 100% 배율 기준 DPI
pub const BASE_DPI: u32 = 96;

/// DPI → 배율. 96 미만은 100%로 취급합니다.
pub fn scale_for_dpi(dpi: u32) -> f32 {
    dpi.max(BASE_DPI) as f32 / BASE_DPI as f32
}

/// UI용으로 완화한 배율. 고배율에서 너무 커지지 않도록 초과분의 80%만 반영합니다.
/// (200% → 180%)
pub fn ui_scale(raw: f32) -> f32 {
    if raw <= 1.0 {
        1.0
    } else {
        1.0 + (raw - 1.0) * 0.8
    }
}

/// 96DPI 기준 픽셀 값을 배율에 맞춰 반올림
pub fn scale_px(value: i32, scale: f32) -> i32 {
    (value as f32 * scale + 0.5) as i32
}
