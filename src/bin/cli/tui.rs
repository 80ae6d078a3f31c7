use super::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use reportgen_lib::workflow::{TextSource, HINT_INITIAL};

// ============================================================================
// Report Form
// ============================================================================

/// Which pane receives navigation keys
#[derive(Clone, Copy, PartialEq)]
enum Focus {
    Abstract,
    Report,
}

/// Multi-line abstract editor
#[derive(Default)]
struct AbstractEditor {
    buffer: String,
    cursor_line: usize,
    cursor_col: usize,
    scroll_offset: usize,
}

impl TextSource for AbstractEditor {
    fn abstract_text(&self) -> String {
        self.buffer.clone()
    }
}

impl AbstractEditor {
    fn lines(&self) -> Vec<&str> {
        self.buffer.split('\n').collect()
    }

    fn line_count(&self) -> usize {
        self.buffer.split('\n').count()
    }

    fn current_line(&self) -> &str {
        self.buffer.split('\n').nth(self.cursor_line).unwrap_or("")
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    /// Insert a character at cursor position
    fn insert_char(&mut self, c: char) {
        let byte_pos = self.cursor_byte_position();
        self.buffer.insert(byte_pos, c);
        if c == '\n' {
            self.cursor_line += 1;
            self.cursor_col = 0;
        } else {
            self.cursor_col += 1;
        }
    }

    /// Delete character before cursor, joining lines at column 0
    fn backspace(&mut self) {
        let byte_pos = self.cursor_byte_position();
        if byte_pos == 0 {
            return;
        }
        let prev_char_start = self.buffer[..byte_pos]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        let removed = self.buffer.remove(prev_char_start);

        if removed == '\n' {
            self.cursor_line -= 1;
            // Cursor lands where the removed newline was
            self.cursor_col = self.buffer[..prev_char_start]
                .rsplit('\n')
                .next()
                .map(|l| l.chars().count())
                .unwrap_or(0);
        } else {
            self.cursor_col = self.cursor_col.saturating_sub(1);
        }
    }

    /// Delete character at cursor
    fn delete(&mut self) {
        let byte_pos = self.cursor_byte_position();
        if byte_pos < self.buffer.len() {
            self.buffer.remove(byte_pos);
        }
    }

    fn cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line().chars().count();
        }
    }

    fn cursor_right(&mut self) {
        let line_len = self.current_line().chars().count();
        if self.cursor_col < line_len {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.line_count() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    fn cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.cursor_col.min(self.current_line().chars().count());
        }
    }

    fn cursor_down(&mut self) {
        if self.cursor_line + 1 < self.line_count() {
            self.cursor_line += 1;
            self.cursor_col = self.cursor_col.min(self.current_line().chars().count());
        }
    }

    fn cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    fn cursor_end(&mut self) {
        self.cursor_col = self.current_line().chars().count();
    }

    /// Byte offset of the cursor in the buffer
    fn cursor_byte_position(&self) -> usize {
        let mut byte_pos = 0;
        for (line_idx, line) in self.buffer.split('\n').enumerate() {
            if line_idx == self.cursor_line {
                return byte_pos
                    + line
                        .chars()
                        .take(self.cursor_col)
                        .map(char::len_utf8)
                        .sum::<usize>();
            }
            byte_pos += line.len() + 1;
        }
        self.buffer.len()
    }

    /// Update scroll offset to keep cursor visible
    fn ensure_cursor_visible(&mut self, visible_lines: usize) {
        if self.cursor_line < self.scroll_offset {
            self.scroll_offset = self.cursor_line;
        } else if visible_lines > 0 && self.cursor_line >= self.scroll_offset + visible_lines {
            self.scroll_offset = self.cursor_line + 1 - visible_lines;
        }
    }
}

/// Form state: abstract editor, report display, and the two action sinks
struct FormApp {
    focus: Focus,
    editor: AbstractEditor,
    view: ReportView,
    report_scroll: u16,
    status_message: String,
    clipboard: SystemClipboard,
    sink: DirectorySink,
    filename: String,
}

impl FormApp {
    fn new() -> Self {
        Self {
            focus: Focus::Abstract,
            editor: AbstractEditor::default(),
            view: ReportView::new(settings::copy_status_duration()),
            report_scroll: 0,
            status_message: String::new(),
            clipboard: SystemClipboard::new(),
            sink: DirectorySink::new(settings::output_dir()),
            filename: settings::download_filename(),
        }
    }

    fn generate(&mut self) {
        self.report_scroll = 0;
        self.status_message.clear();
        // EmptyInput is already reflected in the view's hint
        let _ = workflow::generate(&self.editor, &mut self.view);
    }

    fn clear(&mut self) {
        self.editor.clear();
        self.view.clear();
        self.report_scroll = 0;
        self.focus = Focus::Abstract;
        self.status_message.clear();
    }

    fn copy(&mut self) {
        if let Err(e) = workflow::copy(&mut self.view, &mut self.clipboard, Instant::now()) {
            self.status_message = e.to_string();
        }
    }

    fn download(&mut self) {
        match workflow::download(&self.view, &mut self.sink, &self.filename) {
            Ok(Some(path)) => self.status_message = format!("Saved to {}", path.display()),
            Ok(None) => {}
            Err(e) => self.status_message = e.to_string(),
        }
    }

    /// Apply one key press; returns false when the form should close
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('g') => self.generate(),
                KeyCode::Char('l') => self.clear(),
                KeyCode::Char('y') => self.copy(),
                KeyCode::Char('s') => self.download(),
                KeyCode::Char('c') => return false,
                _ => {}
            }
            return true;
        }

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Abstract => Focus::Report,
                    Focus::Report => Focus::Abstract,
                };
            }
            _ => match self.focus {
                Focus::Abstract => self.handle_editor_key(key.code),
                Focus::Report => self.handle_report_key(key.code),
            },
        }
        true
    }

    fn handle_editor_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.editor.cursor_left(),
            KeyCode::Right => self.editor.cursor_right(),
            KeyCode::Up => self.editor.cursor_up(),
            KeyCode::Down => self.editor.cursor_down(),
            KeyCode::Home => self.editor.cursor_home(),
            KeyCode::End => self.editor.cursor_end(),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Enter => self.editor.insert_char('\n'),
            KeyCode::Char(c) => self.editor.insert_char(c),
            _ => {}
        }
    }

    fn handle_report_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.report_scroll = self.report_scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.report_scroll = self.report_scroll.saturating_add(1),
            KeyCode::PageUp => self.report_scroll = self.report_scroll.saturating_sub(10),
            KeyCode::PageDown => self.report_scroll = self.report_scroll.saturating_add(10),
            KeyCode::Home => self.report_scroll = 0,
            _ => {}
        }
    }
}

pub(crate) fn run_tui() -> Result<(), String> {
    // Setup terminal
    enable_raw_mode().map_err(|e| e.to_string())?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| e.to_string())?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| e.to_string())?;

    let mut app = FormApp::new();
    let result = run_tui_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().map_err(|e| e.to_string())?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).map_err(|e| e.to_string())?;
    terminal.show_cursor().map_err(|e| e.to_string())?;

    result
}

fn run_tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut FormApp,
) -> Result<(), String> {
    loop {
        // Redraw on every tick so the copy label reverts on time
        terminal.draw(|f| draw_ui(f, app)).map_err(|e| e.to_string())?;

        if event::poll(std::time::Duration::from_millis(100)).map_err(|e| e.to_string())? {
            if let Event::Key(key) = event::read().map_err(|e| e.to_string())? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if !app.handle_key(key) {
                    return Ok(());
                }
            }
        }
    }
}

fn draw_ui(f: &mut Frame, app: &mut FormApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Panes
            Constraint::Length(1), // Hint
            Constraint::Length(1), // Buttons
        ])
        .split(f.size());

    let header = Paragraph::new(Line::from(vec![Span::styled(
        " 要旨からレポート作成",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::Rgb(30, 30, 50)));
    f.render_widget(header, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    draw_editor(f, app, panes[0]);
    draw_report(f, app, panes[1]);

    let hint = if app.status_message.is_empty() {
        app.view.hint().to_string()
    } else {
        app.status_message.clone()
    };
    let hint_style = if app.view.hint() == HINT_INITIAL || app.view.actions_enabled() {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else {
        Style::default().bg(Color::DarkGray).fg(Color::LightRed)
    };
    f.render_widget(Paragraph::new(hint).style(hint_style), chunks[2]);

    draw_buttons(f, app, chunks[3]);
}

fn draw_editor(f: &mut Frame, app: &mut FormApp, area: Rect) {
    let inner_height = area.height.saturating_sub(2) as usize;
    app.editor.ensure_cursor_visible(inner_height);

    let focused = app.focus == Focus::Abstract;
    let cursor_style = Style::default().bg(Color::White).fg(Color::Black);
    let editor = &app.editor;

    let mut styled_lines: Vec<Line> = Vec::new();
    for (line_idx, line_content) in editor.lines().into_iter().enumerate().skip(editor.scroll_offset) {
        if styled_lines.len() >= inner_height {
            break;
        }

        if focused && line_idx == editor.cursor_line {
            let chars: Vec<char> = line_content.chars().collect();
            let col = editor.cursor_col.min(chars.len());
            let before: String = chars[..col].iter().collect();
            let cursor_char = chars.get(col).map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
            let after: String = chars.get(col + 1..).map(|rest| rest.iter().collect()).unwrap_or_default();
            styled_lines.push(Line::from(vec![
                Span::raw(before),
                Span::styled(cursor_char, cursor_style),
                Span::raw(after),
            ]));
        } else {
            styled_lines.push(Line::from(line_content.to_string()));
        }
    }

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = format!(" 要旨 - Ln {}, Col {} ", editor.cursor_line + 1, editor.cursor_col + 1);

    let paragraph = Paragraph::new(styled_lines)
        .block(Block::default().borders(Borders::ALL).border_style(border_style).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_report(f: &mut Frame, app: &FormApp, area: Rect) {
    let border_style = if app.focus == Focus::Report {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let lines: Vec<Line> = app
        .view
        .report()
        .unwrap_or("")
        .lines()
        .map(|line| {
            if line.starts_with('#') {
                Line::from(Span::styled(line.to_string(), Style::default().add_modifier(Modifier::BOLD)))
            } else {
                Line::from(line.to_string())
            }
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(border_style).title(" レポート "))
        .wrap(Wrap { trim: false })
        .scroll((app.report_scroll, 0));
    f.render_widget(paragraph, area);
}

fn draw_buttons(f: &mut Frame, app: &FormApp, area: Rect) {
    let enabled = Style::default().fg(Color::Black).bg(Color::Cyan);
    let disabled = Style::default().fg(Color::DarkGray).bg(Color::Black);
    let action_style = if app.view.actions_enabled() { enabled } else { disabled };

    let copy_label = format!(" ^Y {} ", app.view.copy_label(Instant::now()));
    let buttons = Line::from(vec![
        Span::styled(" ^G レポートを生成 ", enabled),
        Span::raw(" "),
        Span::styled(" ^L クリア ", enabled),
        Span::raw(" "),
        Span::styled(copy_label, action_style),
        Span::raw(" "),
        Span::styled(" ^S ダウンロード ", action_style),
        Span::raw("   Tab:pane  Esc:quit"),
    ]);
    f.render_widget(Paragraph::new(buttons), area);
}

#[cfg(test)]
mod tui_tests {
    use super::*;

    fn type_text(editor: &mut AbstractEditor, text: &str) {
        for c in text.chars() {
            editor.insert_char(c);
        }
    }

    #[test]
    fn test_editor_insert_multibyte() {
        let mut editor = AbstractEditor::default();
        type_text(&mut editor, "課題。\n解決");
        assert_eq!(editor.abstract_text(), "課題。\n解決");
        assert_eq!(editor.cursor_line, 1);
        assert_eq!(editor.cursor_col, 2);
        assert_eq!(editor.cursor_byte_position(), editor.buffer.len());
    }

    #[test]
    fn test_editor_insert_in_middle() {
        let mut editor = AbstractEditor::default();
        type_text(&mut editor, "課題。");
        editor.cursor_home();
        editor.cursor_right();
        editor.insert_char('の');
        assert_eq!(editor.buffer, "課の題。");
    }

    #[test]
    fn test_editor_backspace_joins_lines() {
        let mut editor = AbstractEditor::default();
        type_text(&mut editor, "一。\n二。");
        editor.cursor_home();
        editor.backspace();
        assert_eq!(editor.buffer, "一。二。");
        assert_eq!(editor.cursor_line, 0);
        assert_eq!(editor.cursor_col, 2);
    }

    #[test]
    fn test_editor_backspace_at_start_is_noop() {
        let mut editor = AbstractEditor::default();
        editor.backspace();
        assert!(editor.buffer.is_empty());
    }

    #[test]
    fn test_editor_trailing_newline_cursor() {
        let mut editor = AbstractEditor::default();
        type_text(&mut editor, "一。\n");
        assert_eq!(editor.line_count(), 2);
        editor.insert_char('二');
        assert_eq!(editor.buffer, "一。\n二");
    }

    #[test]
    fn test_editor_vertical_moves_clamp_column() {
        let mut editor = AbstractEditor::default();
        type_text(&mut editor, "長い一行目です。\n短");
        editor.cursor_up();
        editor.cursor_end();
        editor.cursor_down();
        assert_eq!(editor.cursor_line, 1);
        assert_eq!(editor.cursor_col, 1);
    }

    #[test]
    fn test_editor_scroll_follows_cursor() {
        let mut editor = AbstractEditor::default();
        type_text(&mut editor, "1\n2\n3\n4\n5");
        editor.ensure_cursor_visible(3);
        assert_eq!(editor.scroll_offset, 2);
        for _ in 0..4 {
            editor.cursor_up();
        }
        editor.ensure_cursor_visible(3);
        assert_eq!(editor.scroll_offset, 0);
    }

    #[test]
    fn test_editor_as_text_source_for_generate() {
        let mut editor = AbstractEditor::default();
        let mut view = ReportView::default();
        assert!(matches!(
            workflow::generate(&editor, &mut view),
            Err(ReportError::EmptyInput)
        ));

        type_text(&mut editor, "課題がある。解決する。");
        let report = workflow::generate(&editor, &mut view).unwrap();
        assert!(report.contains("## 目的\n解決する。"));
    }
}
