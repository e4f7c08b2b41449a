//! 评分环：四个按分级着色的进度指示

use crate::registry::types::Score;
use crate::score::{display_percent, normalize, ScoreTier};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

/// 评分行高度（含边框）
pub const RING_HEIGHT: u16 = 3;

/// 有值的评分项，按 Quality / Popularity / Maintenance / Overall 顺序
pub fn score_entries(score: &Score) -> Vec<(&'static str, f64)> {
    let detail = score.detail.clone().unwrap_or_default();
    [
        ("Quality", detail.quality),
        ("Popularity", detail.popularity),
        ("Maintenance", detail.maintenance),
        ("Overall Score", score.overall),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| (label, v)))
    .collect()
}

/// Gauge 的填充比例，非有限值按 0 处理
fn ratio(percent: f64) -> f64 {
    if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn render_score_row(f: &mut Frame, score: &Score, area: Rect) {
    let entries = score_entries(score);
    if entries.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = entries
        .iter()
        .map(|_| Constraint::Ratio(1, entries.len() as u32))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for ((label, raw), cell) in entries.iter().zip(cells.iter()) {
        render_ring(f, label, *raw, *cell);
    }
}

fn render_ring(f: &mut Frame, label: &str, raw: f64, area: Rect) {
    let percent = normalize(raw, 1);
    let color = ScoreTier::for_percentage(percent).color();

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(format!(" {label} "))
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .gauge_style(Style::default().fg(color).bg(Color::Rgb(40, 40, 48)))
        .label(display_percent(raw))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(ratio(percent));
    f.render_widget(gauge, area);
}
