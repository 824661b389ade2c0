//! Interactive deal review
//!
//! A single ratatui screen driven by a plain poll/draw loop. While deals are
//! still being enriched the loop polls without waiting and enriches one entry
//! per iteration, so the screen redraws between entries.

pub mod app;
pub mod views;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;

use crate::api::{CachedGateway, CrmGateway};
use crate::context::AppContext;
pub use app::App;

const TICK_RATE: Duration = Duration::from_millis(250);

pub async fn run<G: CrmGateway>(ctx: &AppContext, gateway: &CachedGateway<G>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let result = run_app(&mut terminal, ctx, gateway).await;

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    result
}

async fn run_app<G: CrmGateway>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ctx: &AppContext,
    gateway: &CachedGateway<G>,
) -> Result<()> {
    let mut app = App::new(ctx, gateway);
    terminal.draw(|frame| app.draw(frame))?;
    app.start_loading().await;

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        let timeout = if app.is_loading() {
            Duration::ZERO
        } else {
            TICK_RATE
        };
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key).await;
                }
            }
        }
        if app.should_quit {
            break;
        }

        if app.is_loading() {
            app.load_step().await;
        }
    }

    Ok(())
}
