//! Teleprinter demo: type at a prompt, Enter for a new one.
//!
//! Run with: `cargo run --example teleprinter`
//! Logs go to stderr; try `RUST_LOG=teletype=debug ... 2>teletype.log`.
//!
//! Esc or Ctrl+C quits.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use teletype::{EventMask, RendererConfig, Screen, ScreenConfig, TerminalRenderer, Typewriter};
use tracing_subscriber::EnvFilter;

/// Restores the terminal on drop, including on early return.
struct TerminalGuard;

impl TerminalGuard {
    fn enter(stdout: &mut Stdout) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let (width, height) = terminal::size()?;
    let config = ScreenConfig::new(usize::from(width), usize::from(height));

    let mut screen = Screen::builder(config).module(Typewriter).build()?;
    let events = screen.subscribe(EventMask::ALL);

    let mut stdout = io::stdout();
    let _guard = TerminalGuard::enter(&mut stdout)?;
    let mut renderer = TerminalRenderer::new(stdout, RendererConfig::default());

    screen.invoke("type", "TELETYPE READY")?;
    screen.writeln("");
    screen.prompt();
    renderer.sync(&events, &screen)?;

    loop {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Enter => {
                        screen.writeln("");
                        screen.prompt();
                    }
                    KeyCode::Backspace => screen.del()?,
                    KeyCode::Char(c) => screen.write_char(c.encode_utf8(&mut [0; 4]))?,
                    _ => {}
                }
            }
        }
        renderer.sync(&events, &screen)?;
    }

    tracing::info!(lines = screen.lines().len(), "teleprinter exiting");
    Ok(())
}
