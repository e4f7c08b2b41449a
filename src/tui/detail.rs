//! 包详情：选中包的加载、替换与详情面板渲染

use super::layout;
use super::rings::{self, RING_HEIGHT};
use super::state::{App, AppEvent, Focus};
use super::theme::{BADGE_BG, BLUE, BRIGHT_WHITE, CHIP_BG, DIM, PINK};
use crate::registry::{browsable_url, ApiError, PackageDetail, RegistryClient};
use crate::registry::types::{GithubStats, Metadata, Score};
use crate::timefmt::{self, TimeFormat};
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc;

/// 已加载的包：名称与详情总是一起替换
#[derive(Debug, Clone)]
pub struct LoadedPackage {
    pub name: String,
    pub detail: PackageDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub name: String,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct DetailState {
    pub current: Option<LoadedPackage>,
    /// 正在加载的包名
    pub loading: Option<String>,
    pub scroll: u16,
    seq: u64,
}

impl DetailState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 选中候选：分配新序号，旧请求作废；当前详情保持显示直到响应到达
    pub fn submit(&mut self, name: String) -> DetailRequest {
        self.seq += 1;
        self.loading = Some(name.clone());
        DetailRequest { name, seq: self.seq }
    }

    pub fn apply_loaded(&mut self, seq: u64, name: String, mut detail: PackageDetail) -> bool {
        if seq != self.seq {
            log::debug!("丢弃过期详情 {} seq={} (当前 {})", name, seq, self.seq);
            return false;
        }
        // 标题始终用选中的包名；元数据缺名时补齐
        let meta = &mut detail.collected.metadata;
        if meta.name.is_empty() {
            meta.name = name.clone();
        } else if meta.name != name {
            log::warn!("详情包名不一致: 请求 {}，返回 {}", name, meta.name);
        }
        self.current = Some(LoadedPackage { name, detail });
        self.loading = None;
        self.scroll = 0;
        true
    }

    /// 网络类错误保留当前详情；格式异常时清空面板
    pub fn apply_failure(&mut self, seq: u64, error: &ApiError) -> bool {
        if seq != self.seq {
            return false;
        }
        self.loading = None;
        if error.is_malformed() {
            self.current = None;
            self.scroll = 0;
        }
        true
    }

    /// 关闭详情面板，同时作废进行中的请求
    pub fn dismiss(&mut self) {
        self.seq += 1;
        self.current = None;
        self.loading = None;
        self.scroll = 0;
    }

    pub fn scroll_up(&mut self, step: u16) {
        self.scroll = self.scroll.saturating_sub(step);
    }

    pub fn scroll_down(&mut self, step: u16, max: u16) {
        self.scroll = self.scroll.saturating_add(step).min(max);
    }
}

// ===== 外部链接 =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Npm,
    Repository,
    Homepage,
}

impl LinkKind {
    pub const ALL: [LinkKind; 3] = [LinkKind::Npm, LinkKind::Repository, LinkKind::Homepage];

    pub fn label(self) -> &'static str {
        match self {
            LinkKind::Npm => "npm page",
            LinkKind::Repository => "GitHub Repository",
            LinkKind::Homepage => "Website/Homepage",
        }
    }

    pub fn key(self) -> char {
        match self {
            LinkKind::Npm => 'n',
            LinkKind::Repository => 'g',
            LinkKind::Homepage => 'h',
        }
    }

    /// 每个链接只看自身字段是否存在
    pub fn url(self, meta: &Metadata) -> Option<String> {
        match self {
            LinkKind::Npm => meta.links.npm.clone(),
            LinkKind::Repository => meta.repository_url().map(browsable_url),
            LinkKind::Homepage => meta.links.homepage.clone(),
        }
    }
}

// ===== 请求与按键 =====

/// 加载包详情
pub fn load_package_detail(
    app: &mut App,
    name: String,
    client: &RegistryClient,
    tx: &mpsc::Sender<AppEvent>,
) {
    let request = app.detail.submit(name);
    let client = client.clone();
    let tx = tx.clone();

    tokio::spawn(async move {
        let DetailRequest { name, seq } = request;
        let event = match client.get_detail(&name).await {
            Ok(detail) => AppEvent::DetailLoaded {
                seq,
                name,
                detail: Box::new(detail),
            },
            Err(error) => AppEvent::DetailFailed { seq, name, error },
        };
        let _ = tx.send(event).await;
    });
}

/// 详情面板按键处理，`panel` 为详情面板所在区域
pub fn handle_detail_key(key: KeyEvent, app: &mut App, panel: Rect) {
    let max_scroll = max_scroll(app, panel);
    match key.code {
        KeyCode::Esc => {
            app.detail.dismiss();
            app.focus = Focus::Search;
        }
        KeyCode::Up => app.detail.scroll_up(1),
        KeyCode::Down => app.detail.scroll_down(1, max_scroll),
        KeyCode::PageUp => app.detail.scroll_up(10),
        KeyCode::PageDown => app.detail.scroll_down(10, max_scroll),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char(c) => {
            if let Some(kind) = LinkKind::ALL.into_iter().find(|k| k.key() == c) {
                open_link(app, kind);
            }
        }
        _ => {}
    }
}

fn open_link(app: &mut App, kind: LinkKind) {
    open_link_with(app, kind, layout::open_in_browser, layout::copy_to_clipboard);
}

/// 先交给浏览器，失败再复制到剪贴板
fn open_link_with(
    app: &mut App,
    kind: LinkKind,
    open: impl Fn(&str) -> bool,
    copy: impl Fn(&str) -> bool,
) {
    let url = match app
        .detail
        .current
        .as_ref()
        .and_then(|pkg| kind.url(&pkg.detail.collected.metadata))
    {
        Some(url) => url,
        None => return,
    };

    if open(&url) {
        log::info!("打开 {}: {}", kind.label(), url);
        app.notify(format!("Opened {url}"));
    } else if copy(&url) {
        app.notify(format!("Copied {url} to clipboard"));
    } else {
        log::warn!("没有可用的浏览器或剪贴板工具: {}", url);
        app.notify_error(format!("No browser or clipboard tool for {url}"));
    }
}

// ===== 渲染 =====

/// 详情正文（标题、链接、关键词、更新时间、描述）
pub fn detail_lines(
    pkg: &LoadedPackage,
    time_format: TimeFormat,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    let meta = &pkg.detail.collected.metadata;
    let mut lines: Vec<Line> = Vec::new();

    // 包名 + 版本徽章
    lines.push(Line::from(vec![
        Span::styled(
            pkg.name.clone(),
            Style::default().fg(BRIGHT_WHITE).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", meta.version),
            Style::default()
                .fg(Color::Black)
                .bg(BADGE_BG)
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    let links: Vec<(LinkKind, String)> = LinkKind::ALL
        .into_iter()
        .filter_map(|kind| kind.url(meta).map(|url| (kind, url)))
        .collect();
    if !links.is_empty() {
        lines.push(Line::from(""));
        for (kind, url) in links {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("[{}] ", kind.key()),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{:<18}", kind.label()), Style::default().fg(PINK)),
                Span::styled(url, Style::default().fg(BLUE).add_modifier(Modifier::UNDERLINED)),
            ]));
        }
    }

    let keywords = meta.keyword_list();
    if !keywords.is_empty() {
        lines.push(Line::from(""));
        let mut chips: Vec<Span> = Vec::new();
        for keyword in keywords {
            chips.push(Span::styled(
                format!(" {keyword} "),
                Style::default().fg(BRIGHT_WHITE).bg(CHIP_BG),
            ));
            chips.push(Span::raw(" "));
        }
        lines.push(Line::from(chips));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Last Updated: ", Style::default().fg(Color::White)),
        Span::styled(
            timefmt::format_date(meta.date.as_deref(), time_format, now),
            Style::default().fg(DIM),
        ),
    ]));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Description",
        Style::default().fg(DIM).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        meta.description.clone().unwrap_or_default(),
        Style::default().fg(Color::White),
    )));

    lines
}

fn render_github(f: &mut Frame, github: &GithubStats, area: Rect) {
    let block = Block::default()
        .title(" GitHub Data ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let value = Style::default().fg(BRIGHT_WHITE).add_modifier(Modifier::BOLD);
    let label = Style::default().fg(DIM);

    let mut spans = vec![
        Span::styled(github.stars_count.to_string(), value),
        Span::styled(" Stars    ", label),
        Span::styled(github.forks_count.to_string(), value),
        Span::styled(" Forks    ", label),
    ];
    if let Some(issues) = &github.issues {
        spans.push(Span::styled(issues.open_count.to_string(), value));
        spans.push(Span::styled(" Open Issues", label));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// 有任一评分项时才显示评分行
fn visible_score(pkg: &LoadedPackage) -> Option<&Score> {
    pkg.detail
        .score
        .as_ref()
        .filter(|s| !rings::score_entries(s).is_empty())
}

/// 面板内部划分：正文 / GitHub 块 / 评分行
fn panel_chunks(pkg: &LoadedPackage, area: Rect) -> Vec<Rect> {
    let padded = Block::default()
        .borders(Borders::ALL)
        .inner(area)
        .inner(Margin {
            horizontal: 1,
            vertical: 0,
        });

    let github_height = if pkg.detail.collected.github.is_some() { 3 } else { 0 };
    let score_height = if visible_score(pkg).is_some() { RING_HEIGHT } else { 0 };

    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(github_height),
            Constraint::Length(score_height),
        ])
        .split(padded)
        .to_vec()
}

fn body_paragraph(pkg: &LoadedPackage, time_format: TimeFormat) -> Paragraph<'static> {
    Paragraph::new(detail_lines(pkg, time_format, Utc::now())).wrap(Wrap { trim: false })
}

/// 按折行后的实际行数计算滚动上限
fn wrapped_max_scroll(paragraph: &Paragraph, text_area: Rect) -> u16 {
    if text_area.width == 0 {
        return 0;
    }
    let total = paragraph.line_count(text_area.width);
    total
        .saturating_sub(text_area.height as usize)
        .min(u16::MAX as usize) as u16
}

/// 当前详情在 `panel` 中的滚动上限
pub fn max_scroll(app: &App, panel: Rect) -> u16 {
    match &app.detail.current {
        Some(pkg) => {
            let chunks = panel_chunks(pkg, panel);
            wrapped_max_scroll(&body_paragraph(pkg, app.config.time_format), chunks[0])
        }
        None => 0,
    }
}

/// 渲染详情面板；未选中任何包时显示提示
pub fn render_detail(f: &mut Frame, app: &App, area: Rect) {
    let pkg = match &app.detail.current {
        Some(pkg) => pkg,
        None => {
            let hint = if let Some(name) = &app.detail.loading {
                format!("Loading {name}...")
            } else {
                "Pick a suggestion to see package details".to_string()
            };
            let paragraph = Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            )))
            .alignment(ratatui::layout::Alignment::Center);
            f.render_widget(paragraph, area.inner(Margin { horizontal: 1, vertical: 1 }));
            return;
        }
    };

    let border_color = if app.focus == Focus::Detail {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(format!(" 📦 {} ", pkg.name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    f.render_widget(block, area);

    let github = pkg.detail.collected.github.as_ref();
    let score = visible_score(pkg);
    let chunks = panel_chunks(pkg, area);

    let paragraph = body_paragraph(pkg, app.config.time_format);
    let max_scroll = wrapped_max_scroll(&paragraph, chunks[0]);
    let paragraph = paragraph.scroll((app.detail.scroll.min(max_scroll), 0));
    f.render_widget(paragraph, chunks[0]);

    if let Some(github) = github {
        render_github(f, github, chunks[1]);
    }
    if let Some(score) = score {
        rings::render_score_row(f, score, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tui::state::NoticeKind;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    const REACT: &str = r#"{
        "collected": {
            "metadata": {
                "name": "react",
                "version": "18.2.0",
                "description": "React is a JavaScript library for building user interfaces.",
                "date": "2022-06-14T19:46:38.369Z",
                "keywords": ["react", "ui"],
                "links": {"npm": "https://www.npmjs.com/package/react", "homepage": "https://reactjs.org/"},
                "repository": {"type": "git", "url": "git+https://github.com/facebook/react.git"}
            },
            "github": {"starsCount": 210000, "forksCount": 44000, "issues": {"openCount": 900}}
        },
        "score": {"final": 0.88, "detail": {"quality": 0.82, "popularity": 0.95, "maintenance": 0.33}}
    }"#;

    fn parse(json: &str) -> PackageDetail {
        serde_json::from_str(json).unwrap()
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render_detail(f, app, area);
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn app_with(name: &str, json: &str) -> App {
        let mut app = App::new(Config::default());
        let request = app.detail.submit(name.to_string());
        assert!(app.detail.apply_loaded(request.seq, request.name, parse(json)));
        app
    }

    #[test]
    fn selected_package_shows_name_and_version() {
        let text = render(&app_with("react", REACT));
        assert!(text.contains("react"));
        assert!(text.contains(" 18.2.0 "));
        assert!(text.contains("GitHub Data"));
        assert!(text.contains("210000 Stars"));
        assert!(text.contains("900 Open Issues"));
        assert!(text.contains("Quality"));
        assert!(text.contains("Overall Score"));
        assert!(text.contains("88%"));
        assert!(text.contains("https://github.com/facebook/react"));
    }

    #[test]
    fn missing_score_renders_without_rings() {
        let json = r#"{"collected": {"metadata": {"name": "tiny", "version": "0.0.1"}}}"#;
        let text = render(&app_with("tiny", json));
        assert!(text.contains("tiny"));
        assert!(text.contains("0.0.1"));
        assert!(!text.contains("Quality"));
        assert!(!text.contains("Overall Score"));
        assert!(!text.contains("GitHub Data"));
        assert!(text.contains("Last Updated: unknown"));
    }

    #[test]
    fn github_without_issues_omits_issue_count() {
        let json = r#"{"collected": {
            "metadata": {"name": "x", "version": "1.0.0"},
            "github": {"starsCount": 5, "forksCount": 1}
        }}"#;
        let text = render(&app_with("x", json));
        assert!(text.contains("5 Stars"));
        assert!(!text.contains("Open Issues"));
    }

    #[test]
    fn nothing_selected_shows_hint() {
        let app = App::new(Config::default());
        let text = render(&app);
        assert!(text.contains("Pick a suggestion"));
    }

    #[test]
    fn links_are_gated_individually() {
        let json = r#"{"collected": {"metadata": {
            "name": "solo", "version": "1.0.0",
            "links": {"npm": "https://www.npmjs.com/package/solo"}
        }}}"#;
        let detail = parse(json);
        let meta = &detail.collected.metadata;
        assert_eq!(
            LinkKind::Npm.url(meta).as_deref(),
            Some("https://www.npmjs.com/package/solo")
        );
        assert_eq!(LinkKind::Repository.url(meta), None);
        assert_eq!(LinkKind::Homepage.url(meta), None);
    }

    #[test]
    fn keywords_keep_order() {
        let app = app_with("react", REACT);
        let pkg = app.detail.current.as_ref().unwrap();
        let lines = detail_lines(pkg, TimeFormat::Absolute, Utc::now());
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|l| l == " react   ui  "));
        assert!(text.iter().any(|l| l == "Last Updated: 2022-06-14 19:46 UTC"));
    }

    #[test]
    fn latest_submission_wins() {
        let mut state = DetailState::new();
        let first = state.submit("react".into());
        let second = state.submit("vue".into());

        assert!(state.apply_loaded(second.seq, second.name, parse(REACT)));
        assert!(!state.apply_loaded(first.seq, first.name, parse(REACT)));
        assert_eq!(state.current.as_ref().unwrap().name, "vue");
        assert!(state.loading.is_none());
    }

    #[test]
    fn network_failure_keeps_current_detail() {
        let mut state = DetailState::new();
        let first = state.submit("react".into());
        state.apply_loaded(first.seq, first.name, parse(REACT));

        let second = state.submit("vue".into());
        assert_eq!(state.loading.as_deref(), Some("vue"));
        assert!(state.apply_failure(second.seq, &ApiError::Timeout));
        assert_eq!(state.current.as_ref().unwrap().name, "react");
        assert!(state.loading.is_none());
    }

    #[test]
    fn malformed_response_clears_panel() {
        let mut state = DetailState::new();
        let first = state.submit("react".into());
        state.apply_loaded(first.seq, first.name, parse(REACT));

        let second = state.submit("broken".into());
        let error = ApiError::MalformedResponse("missing field `metadata`".into());
        assert!(state.apply_failure(second.seq, &error));
        assert!(state.current.is_none());
    }

    #[test]
    fn dismiss_invalidates_in_flight_request() {
        let mut state = DetailState::new();
        let request = state.submit("react".into());
        state.dismiss();
        assert!(!state.apply_loaded(request.seq, request.name, parse(REACT)));
        assert!(state.current.is_none());
    }

    #[test]
    fn missing_metadata_name_takes_submitted_name() {
        let json = r#"{"collected": {"metadata": {"version": "2.0.0"}}}"#;
        let app = app_with("left-pad", json);
        let current = app.detail.current.as_ref().unwrap();
        assert_eq!(current.detail.collected.metadata.name, "left-pad");
        assert_eq!(current.name, "left-pad");
    }

    #[test]
    fn link_opening_falls_back_to_clipboard() {
        let mut app = app_with("react", REACT);

        open_link_with(&mut app, LinkKind::Npm, |_| true, |_| panic!("clipboard not needed"));
        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.message, "Opened https://www.npmjs.com/package/react");

        open_link_with(&mut app, LinkKind::Repository, |_| false, |url| {
            url == "https://github.com/facebook/react"
        });
        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.message, "Copied https://github.com/facebook/react to clipboard");

        open_link_with(&mut app, LinkKind::Homepage, |_| false, |_| false);
        assert_eq!(app.notice.as_ref().unwrap().kind, NoticeKind::Error);
    }

    #[test]
    fn absent_link_does_nothing() {
        let json = r#"{"collected": {"metadata": {"name": "tiny", "version": "0.0.1"}}}"#;
        let mut app = app_with("tiny", json);
        open_link_with(&mut app, LinkKind::Homepage, |_| panic!("no url"), |_| panic!("no url"));
        assert!(app.notice.is_none());
    }

    #[test]
    fn scrolling_reaches_end_of_wrapped_description() {
        let description = format!("{}THE-END", "lorem ".repeat(50));
        let json = format!(
            r#"{{"collected": {{"metadata": {{"name": "tiny", "version": "0.0.1", "description": "{description}"}}}}}}"#
        );
        let mut app = app_with("tiny", &json);
        let panel = Rect::new(0, 0, 30, 12);

        let logical = detail_lines(app.detail.current.as_ref().unwrap(), TimeFormat::Relative, Utc::now()).len();
        let max = max_scroll(&app, panel);
        assert!(max as usize >= logical, "wrapped height not counted: max={max}");

        let render_small = |app: &App| {
            let mut terminal = Terminal::new(TestBackend::new(30, 12)).unwrap();
            terminal.draw(|f| render_detail(f, app, panel)).unwrap();
            buffer_text(terminal.backend().buffer())
        };
        assert!(!render_small(&app).contains("THE-END"));

        let page_down = KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE);
        handle_detail_key(page_down, &mut app, panel);
        handle_detail_key(page_down, &mut app, panel);
        assert_eq!(app.detail.scroll, max);
        assert!(render_small(&app).contains("THE-END"));
    }
}
