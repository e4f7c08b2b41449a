//! 搜索框：输入、防抖、候选下拉与排除弃用包开关

use super::input;
use super::state::{App, AppEvent, Focus};
use super::theme::{BLUE, BRIGHT_WHITE, SEL_BG};
use crate::config::Config;
use crate::registry::RegistryClient;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// 下拉框最多可见行数
pub const DROPDOWN_MAX_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFilters {
    pub exclude_deprecated: bool,
}

/// 待发出的搜索请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub exclude_deprecated: bool,
    pub seq: u64,
}

pub struct SearchState {
    pub input: String,
    pub cursor: usize,
    /// 防抖后的查询词，只有它变化才会触发搜索
    pub debounced: String,
    pub suggestions: Vec<String>,
    pub filters: SearchFilters,
    pub highlighted: usize,
    pub dropdown_open: bool,
    pub searching: bool,
    search_scheduled: Option<Instant>,
    search_seq: u64,
    debounce: Duration,
    limit: usize,
}

impl SearchState {
    pub fn new(config: &Config) -> Self {
        Self {
            input: String::new(),
            cursor: 0,
            debounced: String::new(),
            suggestions: Vec::new(),
            filters: SearchFilters {
                exclude_deprecated: config.exclude_deprecated,
            },
            highlighted: 0,
            dropdown_open: false,
            searching: false,
            search_scheduled: None,
            search_seq: 0,
            debounce: Duration::from_millis(config.debounce_ms),
            limit: config.suggestion_limit,
        }
    }

    // ===== 文本编辑 =====

    pub fn insert_char(&mut self, c: char, now: Instant) {
        input::str_insert_char(&mut self.input, &mut self.cursor, c);
        self.on_input_changed(now);
    }

    pub fn delete_back(&mut self, now: Instant) {
        if input::str_delete_back(&mut self.input, &mut self.cursor) {
            self.on_input_changed(now);
        }
    }

    pub fn delete_forward(&mut self, now: Instant) {
        if input::str_delete_forward(&mut self.input, &mut self.cursor) {
            self.on_input_changed(now);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// 文本变化：立即回显，重置防抖计时，不发请求
    fn on_input_changed(&mut self, now: Instant) {
        self.search_scheduled = Some(now);
        self.dropdown_open = true;
        self.highlighted = 0;
    }

    // ===== 防抖与请求 =====

    /// 下一次需要检查防抖的时间点
    pub fn next_deadline(&self) -> Option<Instant> {
        self.search_scheduled.map(|t| t + self.debounce)
    }

    /// 输入稳定超过防抖窗口后更新 debounced；值有变化时返回需要发出的请求
    pub fn poll_debounce(&mut self, now: Instant) -> Option<SearchRequest> {
        let scheduled = self.search_scheduled?;
        if now.duration_since(scheduled) < self.debounce {
            return None;
        }
        self.search_scheduled = None;

        if self.input == self.debounced {
            return None;
        }
        self.debounced = self.input.clone();
        self.issue()
    }

    /// 切换排除弃用开关；已有查询词时立即重新搜索
    pub fn toggle_exclude_deprecated(&mut self) -> Option<SearchRequest> {
        self.filters.exclude_deprecated = !self.filters.exclude_deprecated;
        self.issue()
    }

    fn issue(&mut self) -> Option<SearchRequest> {
        // 递增序号，使之前发出的请求全部失效
        self.search_seq += 1;

        if self.debounced.is_empty() {
            self.suggestions.clear();
            self.highlighted = 0;
            self.searching = false;
            return None;
        }

        self.searching = true;
        Some(SearchRequest {
            query: self.debounced.clone(),
            exclude_deprecated: self.filters.exclude_deprecated,
            seq: self.search_seq,
        })
    }

    /// 应用搜索结果，序号过期则丢弃
    pub fn apply_results(&mut self, seq: u64, names: Vec<String>) -> bool {
        if seq != self.search_seq {
            log::debug!("丢弃过期搜索结果 seq={} (当前 {})", seq, self.search_seq);
            return false;
        }
        self.suggestions = names;
        self.highlighted = 0;
        // 最新请求已返回；防抖中的新输入会在发出时重新置位
        self.searching = false;
        true
    }

    /// 搜索失败：保留原候选，只结束 searching 状态
    pub fn apply_failure(&mut self, seq: u64) -> bool {
        if seq != self.search_seq {
            return false;
        }
        self.searching = false;
        true
    }

    // ===== 下拉候选 =====

    /// 与输入匹配（忽略大小写）的候选，最多 `limit` 条
    pub fn visible_suggestions(&self) -> Vec<&str> {
        let needle = self.input.trim().to_lowercase();
        self.suggestions
            .iter()
            .filter(|name| name.to_lowercase().trim().contains(&needle))
            .take(self.limit)
            .map(|s| s.as_str())
            .collect()
    }

    pub fn dropdown_visible(&self) -> bool {
        self.dropdown_open && !self.visible_suggestions().is_empty()
    }

    pub fn highlight_next(&mut self) {
        self.dropdown_open = true;
        let count = self.visible_suggestions().len();
        if self.highlighted + 1 < count {
            self.highlighted += 1;
        }
    }

    pub fn highlight_prev(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    /// 提交高亮候选：输入框填入包名并关闭下拉
    pub fn submit_highlighted(&mut self, now: Instant) -> Option<String> {
        if !self.dropdown_visible() {
            return None;
        }
        let name = self
            .visible_suggestions()
            .get(self.highlighted)
            .map(|s| s.to_string())?;

        self.input = name.clone();
        self.cursor = self.input.chars().count();
        self.on_input_changed(now);
        self.dropdown_open = false;
        Some(name)
    }
}

// ===== 按键处理 =====

/// 处理搜索框按键
pub fn handle_search_key(
    key: KeyEvent,
    app: &mut App,
    client: &RegistryClient,
    tx: &mpsc::Sender<AppEvent>,
) {
    let now = Instant::now();
    match key.code {
        KeyCode::Esc => {
            app.search.dropdown_open = false;
        }
        KeyCode::Up => app.search.highlight_prev(),
        KeyCode::Down => app.search.highlight_next(),
        KeyCode::Enter => {
            if let Some(name) = app.search.submit_highlighted(now) {
                super::detail::load_package_detail(app, name, client, tx);
            }
        }
        KeyCode::Char(c) => {
            // 忽略带 Ctrl/Alt 修饰的字符
            if key.modifiers.contains(KeyModifiers::CONTROL)
                || key.modifiers.contains(KeyModifiers::ALT)
            {
                return;
            }
            app.search.insert_char(c, now);
        }
        KeyCode::Backspace => app.search.delete_back(now),
        KeyCode::Delete => app.search.delete_forward(now),
        KeyCode::Left => app.search.move_left(),
        KeyCode::Right => app.search.move_right(),
        KeyCode::Home => app.search.move_home(),
        KeyCode::End => app.search.move_end(),
        _ => {}
    }
}

/// 处理过滤开关按键
pub fn handle_filter_key(
    key: KeyEvent,
    app: &mut App,
    client: &RegistryClient,
    tx: &mpsc::Sender<AppEvent>,
) {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => toggle_filter(app, client, tx),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => app.focus = Focus::Search,
        _ => {}
    }
}

/// 切换排除弃用开关，必要时重新搜索
pub fn toggle_filter(app: &mut App, client: &RegistryClient, tx: &mpsc::Sender<AppEvent>) {
    if let Some(request) = app.search.toggle_exclude_deprecated() {
        spawn_search(client, request, tx);
    }
}

/// 主循环中调用：防抖到期后发出搜索
pub fn execute_pending_search(
    app: &mut App,
    client: &RegistryClient,
    tx: &mpsc::Sender<AppEvent>,
    now: Instant,
) {
    if let Some(request) = app.search.poll_debounce(now) {
        spawn_search(client, request, tx);
    }
}

fn spawn_search(client: &RegistryClient, request: SearchRequest, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let seq = request.seq;
        let event = match client
            .search(&request.query, request.exclude_deprecated)
            .await
        {
            Ok(names) => AppEvent::SearchResults { seq, names },
            Err(error) => AppEvent::SearchFailed { seq, error },
        };
        let _ = tx.send(event).await;
    });
}

// ===== 渲染 =====

/// 渲染排除弃用复选框
pub fn render_filter(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Filter;
    let checked = app.search.filters.exclude_deprecated;
    let checkbox = if checked { "[✓]" } else { "[ ]" };
    let checkbox_color = if checked { BLUE } else { Color::DarkGray };

    let base = if focused {
        Style::default().bg(SEL_BG)
    } else {
        Style::default()
    };
    let label_style = if focused {
        base.fg(BRIGHT_WHITE).add_modifier(Modifier::BOLD)
    } else {
        base.fg(Color::White)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {checkbox} "), base.fg(checkbox_color).add_modifier(Modifier::BOLD)),
        Span::styled(" Exclude deprecated packages from search results", label_style),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// 渲染候选下拉框，覆盖在 `anchor`（输入框）下方
pub fn render_dropdown(f: &mut Frame, app: &App, anchor: Rect) {
    let items = app.search.visible_suggestions();
    if !app.search.dropdown_open || items.is_empty() || app.focus != Focus::Search {
        return;
    }

    let frame = f.area();
    let top = anchor.y + anchor.height;
    let max_height = frame.height.saturating_sub(top);
    let rows = items.len().min(DROPDOWN_MAX_ROWS) as u16;
    let height = (rows + 2).min(max_height);
    if height < 3 {
        return;
    }
    let area = Rect::new(anchor.x, top, anchor.width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let visible = inner.height as usize;
    let selected = app.search.highlighted;
    // 保证高亮项可见
    let scroll = if selected >= visible {
        selected - visible + 1
    } else {
        0
    };

    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible)
        .map(|(i, name)| {
            if i == selected {
                let bg = Style::default().bg(SEL_BG);
                Line::from(vec![
                    Span::styled("► ", bg.fg(BRIGHT_WHITE).add_modifier(Modifier::BOLD)),
                    Span::styled(name.to_string(), bg.fg(BRIGHT_WHITE).add_modifier(Modifier::BOLD)),
                ])
            } else {
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(name.to_string(), Style::default().fg(BLUE)),
                ])
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);

    if items.len() > visible {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(items.len()).position(scroll);
        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                horizontal: 0,
                vertical: 1,
            }),
            &mut scrollbar_state,
        );
    }
}
