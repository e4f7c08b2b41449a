//! 评分归一化与分级着色

use ratatui::style::Color;

/// 将 0..1 的原始评分转换为 0..100 的百分比，保留 `precision` 位小数。
/// NaN 原样传播。
pub fn normalize(score: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (score * 100.0 * factor).round() / factor
}

/// 标签显示用的整数百分比
pub fn display_percent(score: f64) -> String {
    format!("{}%", normalize(score, 1).round())
}

/// 评分色带
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Success,
    Warning,
    Danger,
}

impl ScoreTier {
    /// 边界值归入较低一档：80 为 Warning，50 为 Danger
    pub fn for_percentage(p: f64) -> Self {
        if p > 80.0 {
            ScoreTier::Success
        } else if p > 50.0 {
            ScoreTier::Warning
        } else {
            ScoreTier::Danger
        }
    }

    pub fn color(self) -> Color {
        match self {
            ScoreTier::Success => Color::Green,
            ScoreTier::Warning => Color::Rgb(253, 126, 20),
            ScoreTier::Danger => Color::Red,
        }
    }
}
