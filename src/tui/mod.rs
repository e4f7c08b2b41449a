mod detail;
mod input;
mod layout;
mod rings;
mod search;
pub mod state;
mod theme;

use crate::config::Config;
use crate::registry::RegistryClient;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use state::{App, AppEvent, Focus, NoticeKind};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// 输入轮询的最长等待
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub async fn run(config: Config) -> Result<()> {
    let client = RegistryClient::new(&config)?;

    // 终端初始化
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = event_loop(&mut terminal, &mut app, &client).await;

    // 恢复终端（无论主循环是否出错）
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &RegistryClient,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(32);

    loop {
        let now = Instant::now();
        // 防抖到期则发出搜索
        search::execute_pending_search(app, client, &tx, now);
        app.expire_notice(now);

        terminal.draw(|f| ui(f, app))?;

        // 处理按键
        if event::poll(poll_timeout(app, Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let size = terminal.size()?;
                    let screen = Rect::new(0, 0, size.width, size.height);
                    handle_key(key, app, client, &tx, layout::main_layout(screen)[3]);
                }
            }
        }

        // 处理异步事件
        while let Ok(event) = rx.try_recv() {
            app.apply_event(event);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// 等待时间不超过下一次防抖到期
fn poll_timeout(app: &App, now: Instant) -> Duration {
    match app.search.next_deadline() {
        Some(deadline) => deadline.saturating_duration_since(now).min(POLL_INTERVAL),
        None => POLL_INTERVAL,
    }
}

fn handle_key(
    key: KeyEvent,
    app: &mut App,
    client: &RegistryClient,
    tx: &mpsc::Sender<AppEvent>,
    detail_panel: Rect,
) {
    // 全局按键
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            search::toggle_filter(app, client, tx);
        }
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),
        // 委托给当前焦点处理
        _ => match app.focus {
            Focus::Search => search::handle_search_key(key, app, client, tx),
            Focus::Filter => search::handle_filter_key(key, app, client, tx),
            Focus::Detail => detail::handle_detail_key(key, app, detail_panel),
        },
    }
}

fn footer_hint(focus: Focus) -> &'static str {
    match focus {
        Focus::Search => "↑↓ 选择 | Enter 查看详情 | Tab 切换 | Ctrl+D 排除弃用 | Ctrl+C 退出",
        Focus::Filter => "Space 切换 | Tab 切换 | Esc 返回搜索 | q 退出",
        Focus::Detail => "↑↓ 滚动 | n/g/h 打开链接 | Esc 关闭详情 | Tab 切换 | q 退出",
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());

    layout::render_header(f, "📦 NPM Package Scanner", chunks[0]);

    input::render_input_box(
        f,
        &app.search.input,
        app.search.cursor,
        "📦",
        "Enter a package name",
        app.focus == Focus::Search,
        chunks[1],
    );

    // 示例提示 + 过滤开关
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(chunks[2]);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "  e.g. - react, bootstrap, sass, @mui/material",
            Style::default().fg(Color::DarkGray),
        ))),
        rows[0],
    );
    search::render_filter(f, app, rows[1]);

    detail::render_detail(f, app, chunks[3]);

    let loading;
    let status = if let Some(notice) = &app.notice {
        let color = match notice.kind {
            NoticeKind::Info => Color::Cyan,
            NoticeKind::Error => Color::Red,
        };
        Some((notice.message.as_str(), color))
    } else if app.search.searching {
        Some(("Searching...", Color::Yellow))
    } else if let Some(name) = &app.detail.loading {
        loading = format!("Loading {name}...");
        Some((loading.as_str(), Color::Yellow))
    } else {
        None
    };
    layout::render_footer(f, footer_hint(app.focus), status, chunks[4]);

    // 下拉框最后绘制，覆盖在详情之上
    search::render_dropdown(f, app, chunks[1]);
}
