//! 全局配色

use ratatui::style::Color;

/// 粉色（链接标签）
pub const PINK: Color = Color::Rgb(245, 169, 184);
/// 蓝色（候选包名、链接地址）
pub const BLUE: Color = Color::Rgb(91, 206, 250);
/// 选中行背景色
pub const SEL_BG: Color = Color::Rgb(45, 35, 55);
/// 亮白色
pub const BRIGHT_WHITE: Color = Color::Rgb(255, 255, 255);
/// 暗灰色（次要信息）
pub const DIM: Color = Color::Rgb(130, 130, 140);
/// 版本徽章背景
pub const BADGE_BG: Color = Color::Rgb(116, 143, 252);
/// 关键词标签背景
pub const CHIP_BG: Color = Color::Rgb(55, 58, 84);
