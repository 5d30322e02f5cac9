#![forbid(unsafe_code)]

//! Terminal spinner demo.
//!
//! Draws one numeric spinner and drives it from crossterm input on a real
//! clock.
//!
//! # Running
//!
//! ```sh
//! cargo run -p tspin-demo
//! TSPIN_LOG=spin.log cargo run -p tspin-demo
//! ```
//!
//! # Controls
//!
//! - Click and hold `[-]` / `[+]`: spin (release to stop)
//! - Up/Down: one step
//! - Mouse wheel: one step while focused
//! - Digits, `-`, `.`, Backspace: edit the value
//! - Enter: commit the typed value
//! - Tab: toggle focus (blur resolves the typed value)
//! - Esc or `q`: quit
//!
//! # Environment
//!
//! - `TSPIN_LOG`: write tracing output to this file
//! - `TSPIN_LOG_FILTER`: `tracing` filter directives (default `debug`)
//! - `TSPIN_OPTIONS`: instance overrides, as `key=value` pairs separated by
//!   commas (for example `max=50,decimals=1,verticalButtons=true`)

use std::fs::File;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use crossterm::{cursor, event as cte, execute, queue, style, terminal};
use tspin::core::info;
use tspin::prelude::*;
use tspin::{CrosstermEventSource, KeyEventKind, Modifiers, MonotonicScheduler, SpinTimer};

const ROW: u16 = 2;
const DOWN_BUTTON: (u16, u16) = (2, 4);
const VALUE_COLUMN: u16 = 7;
const UP_BUTTON: (u16, u16) = (22, 24);
/// Poll interval while no timer is armed.
const IDLE_POLL: Duration = Duration::from_millis(250);

type DemoSpin = TouchSpin<MonotonicScheduler<SpinTimer>, MemoryBinding>;

fn hit_test(column: u16, row: u16) -> Option<SpinButton> {
    if row != ROW {
        return None;
    }
    if (DOWN_BUTTON.0..=DOWN_BUTTON.1).contains(&column) {
        Some(SpinButton::Down)
    } else if (UP_BUTTON.0..=UP_BUTTON.1).contains(&column) {
        Some(SpinButton::Up)
    } else {
        None
    }
}

fn init_logging() -> io::Result<()> {
    let Ok(path) = std::env::var("TSPIN_LOG") else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = tracing_subscriber::EnvFilter::try_from_env("TSPIN_LOG_FILTER")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| io::Error::other(err.to_string()))
}

/// Parse `TSPIN_OPTIONS` into instance overrides.
fn options_from_env() -> io::Result<SpinOptions> {
    let Ok(raw) = std::env::var("TSPIN_OPTIONS") else {
        return Ok(SpinOptions::new());
    };
    let invalid = |pair: &str| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("TSPIN_OPTIONS: cannot parse `{pair}`"),
        )
    };
    let mut options = SpinOptions::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').ok_or_else(|| invalid(pair))?;
        let number = || value.trim().parse::<f64>().map_err(|_| invalid(pair));
        let flag = || value.trim().parse::<bool>().map_err(|_| invalid(pair));
        options = match key.trim() {
            "min" => options.min(number()?),
            "max" => options.max(number()?),
            "step" => options.step(number()?),
            "decimals" => options.decimals(value.trim().parse().map_err(|_| invalid(pair))?),
            "stepInterval" => options.step_interval(number()?),
            "stepIntervalDelay" => options.step_interval_delay(number()?),
            "verticalButtons" => options.vertical_buttons(flag()?),
            "mousewheel" => options.mousewheel(flag()?),
            _ => return Err(invalid(pair)),
        };
    }
    Ok(options)
}

fn draw(out: &mut impl Write, spin: &DemoSpin, binding: &MemoryBinding) -> io::Result<()> {
    let field = format!("{:^13}", spin.text());
    let focus = if spin.is_focused() { ">" } else { " " };
    queue!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(2, 0),
        style::Print("tspin demo (Esc or q to quit)"),
        cursor::MoveTo(DOWN_BUTTON.0, ROW),
        style::Print("[-]"),
        cursor::MoveTo(VALUE_COLUMN - 2, ROW),
        style::Print(focus),
        cursor::MoveTo(VALUE_COLUMN, ROW),
        style::Print(&field),
        cursor::MoveTo(UP_BUTTON.0, ROW),
        style::Print("[+]"),
        cursor::MoveTo(2, ROW + 2),
        style::Print(format!(
            "range {}..={}  step {}  {}",
            spin.config().min(),
            spin.config().max(),
            spin.config().step(),
            if spin.is_spinning() { "spinning" } else { "idle" },
        )),
        cursor::MoveTo(2, ROW + 3),
        style::Print(format!(
            "host value {:?}  changes {}",
            binding.value(),
            binding.log().changes.len()
        )),
    )?;
    out.flush()
}

/// Apply editing keys the control itself does not interpret.
fn edit_text(spin: &DemoSpin, event: &Event) -> Option<Event> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let mut text = spin.text().to_string();
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' || c == '.' => text.push(c),
        KeyCode::Backspace => {
            text.pop();
        }
        KeyCode::Tab => return Some(Event::Focus(!spin.is_focused())),
        _ => return None,
    }
    Some(Event::Input(text))
}

fn is_quit(event: &Event) -> bool {
    match event {
        Event::Key(key) => match key.code {
            KeyCode::Escape | KeyCode::Char('q') => true,
            KeyCode::Char('c') => key.modifiers.contains(Modifiers::CTRL),
            _ => false,
        },
        _ => false,
    }
}

fn run(out: &mut impl Write) -> tspin::Result<()> {
    let binding = MemoryBinding::new();
    let mut spin = TouchSpin::new(
        SpinOptions::standard(),
        options_from_env()?,
        MonotonicScheduler::new(),
        binding.clone(),
    )?;
    spin.focus();
    let mut source = CrosstermEventSource::new(hit_test);

    loop {
        draw(out, &spin, &binding)?;
        let timeout = spin
            .scheduler()
            .time_until_next()
            .map_or(IDLE_POLL, |wait| wait.min(IDLE_POLL));
        if let Some(event) = source.next_event(timeout)? {
            if is_quit(&event) {
                break;
            }
            let event = edit_text(&spin, &event).unwrap_or(event);
            spin.handle_event(&event)?;
        }
        spin.pump()?;
    }

    info!(value = spin.value(), "demo finished");
    Ok(())
}

fn main() -> tspin::Result<()> {
    init_logging()?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cte::EnableMouseCapture,
        cte::EnableFocusChange,
        cursor::Hide
    )?;

    let result = run(&mut stdout);

    // Restore the terminal even when the loop failed.
    execute!(
        stdout,
        cursor::Show,
        cte::DisableFocusChange,
        cte::DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )?;
    terminal::disable_raw_mode()?;
    result
}
