//! RGB24 颜色插值
//!
//! 颜色以 `0xRRGGBB` 打包在 `u32` 里，与精灵 tint 相同的表示。

/// 白色
pub const WHITE: u32 = 0xff_ff_ff;

/// 拆分为 (r, g, b)
#[inline]
pub fn unpack_rgb(color: u32) -> (u8, u8, u8) {
    (
        ((color >> 16) & 0xff) as u8,
        ((color >> 8) & 0xff) as u8,
        (color & 0xff) as u8,
    )
}

/// 合并 (r, g, b)
#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// 按通道线性插值两个 RGB24 颜色
///
/// `t` 先截断到 `[0, 1]`，每个通道四舍五入，结果不会溢出 8 位。
/// 高 8 位被忽略。
pub fn lerp_color(start: u32, end: u32, t: f32) -> u32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    let (r1, g1, b1) = unpack_rgb(start);
    let (r2, g2, b2) = unpack_rgb(end);

    let channel = |a: u8, b: u8| -> u8 {
        let a = a as f32;
        (a + (b as f32 - a) * t).round() as u8
    };

    pack_rgb(channel(r1, r2), channel(g1, g2), channel(b1, b2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(lerp_color(0xff4500, 0xffff00, 0.0), 0xff4500);
        assert_eq!(lerp_color(0xff4500, 0xffff00, 1.0), 0xffff00);
    }

    #[test]
    fn test_midpoint_rounds_per_channel() {
        // 0x45 -> 0xff 的中点 = 162 (0xa2)
        assert_eq!(lerp_color(0xff4500, 0xffff00, 0.5), 0xffa200);
        assert_eq!(lerp_color(0x000000, 0x0000ff, 0.5), 0x000080);
    }

    #[test]
    fn test_out_of_range_t_is_clamped() {
        assert_eq!(lerp_color(0x102030, 0xffffff, 7.0), 0xffffff);
        assert_eq!(lerp_color(0x102030, 0xffffff, -3.0), 0x102030);
        assert_eq!(lerp_color(0x102030, 0xffffff, f32::NAN), 0x102030);
    }

    #[test]
    fn test_pack_unpack() {
        assert_eq!(unpack_rgb(0x123456), (0x12, 0x34, 0x56));
        assert_eq!(pack_rgb(0x12, 0x34, 0x56), 0x123456);
        assert_eq!(unpack_rgb(0xff123456), (0x12, 0x34, 0x56));
    }
}
