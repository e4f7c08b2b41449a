use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// 渲染单行输入框，内容为空时显示占位文字，支持 UTF-8 (中英文)
pub fn render_input_box(
    f: &mut Frame,
    content: &str,
    cursor_pos: usize,
    label: &str,
    placeholder: &str,
    focused: bool,
    area: Rect,
) {
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let mut spans = vec![Span::styled(
        format!("{label} "),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    let cursor_style = if focused {
        Style::default().fg(Color::Black).bg(Color::White)
    } else {
        Style::default().fg(Color::White)
    };

    if content.is_empty() {
        // 光标停在占位文字首字符上
        let mut chars = placeholder.chars();
        let first = chars.next().map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
        spans.push(Span::styled(first, cursor_style.fg(Color::DarkGray)));
        spans.push(Span::styled(
            chars.as_str().to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        // label + 光标前文本 + 光标字符 + 光标后文本
        let chars: Vec<char> = content.chars().collect();
        let cursor_pos = cursor_pos.min(chars.len());
        let before: String = chars[..cursor_pos].iter().collect();
        let (cursor_char, after): (String, String) = if cursor_pos < chars.len() {
            (chars[cursor_pos].to_string(), chars[cursor_pos + 1..].iter().collect())
        } else {
            (" ".to_string(), String::new())
        };

        spans.push(Span::styled(before, Style::default().fg(Color::White)));
        spans.push(Span::styled(cursor_char, cursor_style));
        spans.push(Span::styled(after, Style::default().fg(Color::White)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    f.render_widget(paragraph, area);
}

// ===== 共享文本编辑工具函数 =====

/// UTF-8 安全的字符位置转字节位置
pub fn char_to_byte(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// 在光标处插入字符并右移光标
pub fn str_insert_char(s: &mut String, cursor: &mut usize, c: char) {
    let byte_pos = char_to_byte(s, *cursor);
    s.insert(byte_pos, c);
    *cursor += 1;
}

/// Backspace: 删除光标前的字符，返回是否有改动
pub fn str_delete_back(s: &mut String, cursor: &mut usize) -> bool {
    if *cursor == 0 {
        return false;
    }
    *cursor -= 1;
    let byte_pos = char_to_byte(s, *cursor);
    let next_byte_pos = char_to_byte(s, *cursor + 1);
    s.drain(byte_pos..next_byte_pos);
    true
}

/// Delete: 删除光标后的字符，返回是否有改动
pub fn str_delete_forward(s: &mut String, cursor: &mut usize) -> bool {
    if *cursor >= s.chars().count() {
        return false;
    }
    let byte_pos = char_to_byte(s, *cursor);
    let next_byte_pos = char_to_byte(s, *cursor + 1);
    s.drain(byte_pos..next_byte_pos);
    true
}
