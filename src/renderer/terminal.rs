//! Terminal Host - Drive a page interactively with crossterm
//!
//! The terminal stands in for a browser window: keys become user scrolls,
//! clicks and submissions; wall-clock time drives the [`VirtualScheduler`]
//! one frame at a time; the preview is redrawn whenever the page revision or
//! scroll offset moves.
//!
//! # Keys
//!
//! - `↑`/`↓`/`PgUp`/`PgDn`/`Home`/`End` - scroll (blocked while the menu is open)
//! - `m` - click the menu toggle
//! - `1`..`9` - click the nth nav link
//! - `s` - submit the contact form
//! - `q`/`Esc`/`Ctrl-C` - quit

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use spark_signals::derived;

use crate::config::PageConfig;
use crate::engine::{Page, Scheduler, VirtualScheduler};
use crate::error::Result;
use crate::types::ClassSet;

use super::{COLUMN_PX, render_viewport, top_section, truncate};

/// Page pixels per terminal row.
pub const PX_PER_ROW: f32 = 24.0;

/// Pixels per arrow-key scroll.
const LINE_SCROLL: f32 = 3.0 * PX_PER_ROW;

// =============================================================================
// COMMANDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// User scroll by this many pixels.
    Scroll(f32),
    ToggleMenu,
    /// Click the nth (0-based) nav link.
    NavLink(usize),
    Submit,
    Quit,
}

/// Map a key press to a command. `page_px` is one viewport height.
pub fn map_key(key: KeyEvent, page_px: f32) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(Command::Scroll(-LINE_SCROLL)),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::Scroll(LINE_SCROLL)),
        KeyCode::PageUp => Some(Command::Scroll(-page_px)),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(Command::Scroll(page_px)),
        KeyCode::Home => Some(Command::Scroll(f32::NEG_INFINITY)),
        KeyCode::End => Some(Command::Scroll(f32::INFINITY)),
        KeyCode::Char('m') => Some(Command::ToggleMenu),
        KeyCode::Char('s') => Some(Command::Submit),
        KeyCode::Char(c @ '1'..='9') => Some(Command::NavLink(c as usize - '1' as usize)),
        _ => None,
    }
}

/// Apply `command` to the page. Returns `false` once the host should exit.
pub fn apply(page: &Page, config: &PageConfig, command: Command) -> bool {
    match command {
        Command::Quit => return false,
        Command::Scroll(dy) => {
            let dy = dy.clamp(-page.max_scroll() - 1.0, page.max_scroll() + 1.0);
            page.scroll_by(dy);
        }
        Command::ToggleMenu => {
            if let Some(toggle) = page.get_element_by_id(&config.menu.toggle_id) {
                page.click(toggle);
            }
        }
        Command::NavLink(n) => {
            let link = page.document().query_class(ClassSet::NAV_LINK).get(n).copied();
            if let Some(link) = link {
                page.click(link);
            }
        }
        Command::Submit => {
            if let Some(form) = page.get_element_by_id(&config.contact.form_id) {
                page.submit(form);
            }
        }
    }
    true
}

// =============================================================================
// TERMINAL SESSION
// =============================================================================

/// Raw mode plus alternate screen, restored on drop.
struct Session {
    out: io::Stdout,
}

impl Session {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All)) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(Self { out })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Fit the page viewport to a terminal of `cols` x `rows` (one status row).
fn fit_viewport(page: &Page, cols: u16, rows: u16) -> usize {
    let body_rows = rows.saturating_sub(1).max(1) as usize;
    page.resize(cols as f32 * COLUMN_PX, body_rows as f32 * PX_PER_ROW);
    body_rows
}

fn status_line(page: &Page, config: &PageConfig) -> String {
    let y = page.scroll_y();
    let section = page
        .measure(|doc| top_section(doc, y))
        .unwrap_or_else(|| "-".into());
    let menu = page
        .get_element_by_id(&config.menu.menu_id)
        .is_some_and(|menu| page.document().has_class(menu, ClassSet::OPEN));
    format!(
        " y {:>5.0}/{:<5.0} {:<9} menu {:<6} ↑↓ PgUp PgDn scroll  m menu  1-9 nav  s send  q quit",
        y,
        page.max_scroll(),
        section,
        if menu { "open" } else { "closed" },
    )
}

fn draw(out: &mut impl Write, page: &Page, config: &PageConfig, cols: u16, rows: usize) -> io::Result<()> {
    let lines = render_viewport(page, rows, PX_PER_ROW);
    for (row, line) in lines.iter().enumerate() {
        queue!(out, MoveTo(0, row as u16), Clear(ClearType::CurrentLine), Print(&line.text))?;
    }
    let status = truncate(&status_line(page, config), cols as usize);
    queue!(
        out,
        MoveTo(0, rows as u16),
        Clear(ClearType::CurrentLine),
        SetAttribute(Attribute::Reverse),
        Print(status),
        SetAttribute(Attribute::Reset),
    )?;
    out.flush()
}

// =============================================================================
// MAIN LOOP
// =============================================================================

/// Run the page in the terminal until the user quits.
///
/// `scheduler` must be the scheduler `page` was created with.
pub fn run(page: &Page, scheduler: &VirtualScheduler, config: &PageConfig) -> Result<()> {
    let mut session = Session::enter()?;
    let (mut cols, term_rows) = terminal::size()?;
    let mut rows = fit_viewport(page, cols, term_rows);
    tracing::info!(cols, rows, "terminal host started");

    let revision = page.revision_signal();
    let scroll = page.scroll_signal();
    let redraw_key = derived(move || (revision.get(), scroll.get().to_bits()));
    let mut drawn: Option<(u64, u32)> = None;

    let frame = scheduler.frame_interval();
    let mut last_tick = Instant::now();
    let mut lag = Duration::ZERO;

    loop {
        let key = redraw_key.get();
        if drawn != Some(key) {
            draw(&mut session.out, page, config, cols, rows)?;
            drawn = Some(key);
        }

        let wait = frame.saturating_sub(lag);
        if event::poll(wait)? {
            match event::read()? {
                TermEvent::Key(key) => {
                    let viewport_px = page.viewport().height;
                    if let Some(command) = map_key(key, viewport_px) {
                        tracing::debug!(?command, "key command");
                        if !apply(page, config, command) {
                            break;
                        }
                    }
                }
                TermEvent::Resize(new_cols, new_rows) => {
                    cols = new_cols;
                    rows = fit_viewport(page, new_cols, new_rows);
                    execute!(session.out, Clear(ClearType::All))?;
                    drawn = None;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        lag += now - last_tick;
        last_tick = now;
        while lag >= frame {
            scheduler.run_frame();
            lag -= frame;
        }
    }

    tracing::info!(elapsed = ?scheduler.now(), "terminal host stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::attach_all;
    use crate::template::portfolio_document;
    use crate::types::Viewport;
    use std::rc::Rc;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (Page, PageConfig) {
        let config = PageConfig::default();
        let page = Page::new(
            portfolio_document(&config),
            Rc::new(VirtualScheduler::new()),
            Viewport::new(800.0, 600.0),
        );
        (page, config)
    }

    #[test]
    fn test_map_key() {
        assert_eq!(map_key(press(KeyCode::Char('q')), 600.0), Some(Command::Quit));
        assert_eq!(map_key(press(KeyCode::PageDown), 600.0), Some(Command::Scroll(600.0)));
        assert_eq!(map_key(press(KeyCode::Char('3')), 600.0), Some(Command::NavLink(2)));
        assert_eq!(map_key(press(KeyCode::Char('0')), 600.0), None);
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), 600.0),
            Some(Command::Quit)
        );
    }

    #[test]
    fn test_apply_commands() {
        let (page, config) = setup();
        let interactions = attach_all(&page, &config);
        assert!(interactions.skipped().is_empty());

        assert!(apply(&page, &config, Command::Scroll(f32::INFINITY)));
        assert_eq!(page.scroll_y(), page.max_scroll());

        apply(&page, &config, Command::ToggleMenu);
        assert!(page.document().is_scroll_locked());
        apply(&page, &config, Command::ToggleMenu);

        apply(&page, &config, Command::Submit);
        let form = page.get_element_by_id("contact-form").unwrap();
        let button = page.document().first_class_within(form, ClassSet::BTN).unwrap();
        assert!(page.document().background(button).is_some());

        assert!(!apply(&page, &config, Command::Quit));
        interactions.detach();
    }

    #[test]
    fn test_status_line_reports_menu() {
        let (page, config) = setup();
        assert!(status_line(&page, &config).contains("menu closed"));
    }
}
