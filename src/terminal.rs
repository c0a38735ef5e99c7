// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front end
//!
//! [`TerminalSurface`] shows the result dialog full-screen and waits for it to
//! be dismissed. [`run`] is the interactive mode: a screen with a camera and a
//! gallery option where each key press starts one acquisition cycle.

use crate::app::presenter::{Dialog, DialogSurface, NotificationSurface, PlainSurface};
use crate::app::{ImageSource, ResultPresenter, ScanSession};
use crate::backends::DialogPicker;
use crate::config::Config;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use std::io::{self, stdout};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Full-screen modal dialog for one-shot commands; notices go to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalSurface;

impl NotificationSurface for TerminalSurface {
    fn notify(&self, message: &str) {
        PlainSurface.notify(message);
    }
}

impl DialogSurface for TerminalSurface {
    fn show_dialog(&self, dialog: &Dialog) {
        if let Err(e) = show_modal(dialog) {
            warn!(error = %e, "Terminal dialog unavailable, printing result");
            PlainSurface.show_dialog(dialog);
        }
    }
}

fn show_modal(dialog: &Dialog) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = modal_loop(&mut terminal, dialog);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn modal_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    dialog: &Dialog,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_dialog(f, dialog))?;

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && (is_dismiss_key(key.code) || is_interrupt(key.code, key.modifiers))
        {
            return Ok(());
        }
    }
}

/// Keys that trigger the dialog's single action
fn is_dismiss_key(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('o') | KeyCode::Char(' ')
    )
}

fn is_interrupt(code: KeyCode, modifiers: KeyModifiers) -> bool {
    code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL)
}

/// Centered rectangle taking the given percentage of `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y.min(100)) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_dialog(f: &mut Frame, dialog: &Dialog) {
    let area = centered_rect(70, 50, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(dialog.title.as_str())
        .style(Style::default().fg(Color::White));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let body_area = Rect {
        height: inner.height.saturating_sub(1),
        ..inner
    };
    f.render_widget(
        Paragraph::new(dialog.body.as_str()).wrap(Wrap { trim: false }),
        body_area,
    );

    let button = format!("[ {} ]", dialog.dismiss_label);
    let button_width = (button.len() as u16).min(inner.width);
    let button_area = Rect {
        x: inner.x + inner.width.saturating_sub(button_width),
        y: inner.y + inner.height.saturating_sub(1),
        width: button_width,
        height: inner.height.min(1),
    };
    f.render_widget(
        Paragraph::new(button).style(Style::default().fg(Color::Black).bg(Color::Cyan)),
        button_area,
    );
}

/// State of the interactive screen, shared with running cycles
#[derive(Debug, Default)]
struct Screen {
    status: Option<String>,
    dialog: Option<Dialog>,
    pending: usize,
}

/// What a key press asks the loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    None,
    Start(ImageSource),
    Quit,
}

impl Screen {
    /// A visible dialog takes all input until it is dismissed
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        if is_interrupt(code, modifiers) {
            return KeyAction::Quit;
        }
        if self.dialog.is_some() {
            if is_dismiss_key(code) {
                self.dialog = None;
            }
            return KeyAction::None;
        }

        match code {
            KeyCode::Char('c') => KeyAction::Start(ImageSource::Camera),
            KeyCode::Char('g') => KeyAction::Start(ImageSource::Gallery),
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            _ => KeyAction::None,
        }
    }

    fn status_line(&self) -> String {
        let mut msg = match &self.status {
            Some(status) => format!("{} | ", status),
            None => String::new(),
        };
        if self.pending > 0 {
            msg.push_str("working... | ");
        }
        msg.push_str("'c' camera | 'g' gallery | 'q' quit");
        msg
    }
}

/// Surface that feeds results into the interactive screen
#[derive(Clone)]
struct ScreenSurface(Arc<Mutex<Screen>>);

impl ScreenSurface {
    fn lock(&self) -> MutexGuard<'_, Screen> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl NotificationSurface for ScreenSurface {
    fn notify(&self, message: &str) {
        self.lock().status = Some(message.to_string());
    }
}

impl DialogSurface for ScreenSurface {
    fn show_dialog(&self, dialog: &Dialog) {
        let mut screen = self.lock();
        screen.status = None;
        screen.dialog = Some(dialog.clone());
    }
}

/// Run the interactive scanner
pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    let surface = ScreenSurface(Arc::new(Mutex::new(Screen::default())));
    let presenter = ResultPresenter::new(Arc::new(surface.clone()), Arc::new(surface.clone()));
    let session = Arc::new(crate::app::session_from_config(
        config,
        Arc::new(DialogPicker::with_title("Select an image")),
        presenter,
    ));

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &rt, session, surface);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    rt: &tokio::runtime::Runtime,
    session: Arc<ScanSession>,
    surface: ScreenSurface,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| {
            let screen = surface.lock();
            let area = f.area();

            let menu_area = Rect {
                height: area.height.saturating_sub(1),
                ..area
            };
            f.render_widget(
                Paragraph::new("\n  [c] Camera image\n\n  [g] Gallery image")
                    .block(Block::default().borders(Borders::ALL).title("QR scanner")),
                menu_area,
            );

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: area.height.min(1),
            };
            let status = screen.status_line();
            f.render_widget(StatusBar { message: &status }, status_area);

            if let Some(dialog) = &screen.dialog {
                render_dialog(f, dialog);
            }
        })?;

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let action = surface.lock().handle_key(key.code, key.modifiers);
            match action {
                KeyAction::Quit => break,
                KeyAction::Start(source) => {
                    info!(%source, "Starting cycle from terminal");
                    surface.lock().pending += 1;
                    let session = Arc::clone(&session);
                    let surface = surface.clone();
                    rt.spawn(async move {
                        session.run_cycle(source).await;
                        let mut screen = surface.lock();
                        screen.pending = screen.pending.saturating_sub(1);
                    });
                }
                KeyAction::None => {}
            }
        }
    }

    Ok(())
}

struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(50, 50, area);
        assert_eq!(rect, Rect::new(25, 10, 50, 20));
    }

    #[test]
    fn test_centered_rect_on_wide_terminal() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 2000,
            height: 600,
        };
        let rect = centered_rect(70, 50, area);
        assert_eq!((rect.x, rect.y), (300, 150));
        assert_eq!((rect.width, rect.height), (1400, 300));
    }

    #[test]
    fn test_dialog_blocks_other_keys() {
        let mut screen = Screen {
            dialog: Some(Dialog::result("HELLO")),
            ..Screen::default()
        };
        assert_eq!(
            screen.handle_key(KeyCode::Char('c'), KeyModifiers::NONE),
            KeyAction::None
        );
        assert!(screen.dialog.is_some());

        assert_eq!(
            screen.handle_key(KeyCode::Enter, KeyModifiers::NONE),
            KeyAction::None
        );
        assert!(screen.dialog.is_none());

        assert_eq!(
            screen.handle_key(KeyCode::Char('g'), KeyModifiers::NONE),
            KeyAction::Start(ImageSource::Gallery)
        );
    }

    #[test]
    fn test_quit_keys() {
        let mut screen = Screen::default();
        assert_eq!(
            screen.handle_key(KeyCode::Char('q'), KeyModifiers::NONE),
            KeyAction::Quit
        );
        assert_eq!(
            screen.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            KeyAction::Quit
        );
    }

    #[test]
    fn test_surface_updates_screen() {
        let surface = ScreenSurface(Arc::new(Mutex::new(Screen::default())));
        surface.notify("No QR code found in the Image");
        assert!(surface.lock().status_line().starts_with("No QR code found"));

        surface.show_dialog(&Dialog::result("HELLO-QR"));
        let screen = surface.lock();
        assert_eq!(screen.dialog.as_ref().unwrap().body, "HELLO-QR");
        assert!(screen.status.is_none());
    }
}
