//! Terminal front end for the "add investment" form.
//!
//! [`run_add_form`] takes over the terminal, feeds key presses to a
//! [`FormState`], validates the submission and hands back the draft. A
//! rejected submission reopens the form with the entered text kept and the
//! offending field focused.

mod keys;
mod render;

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use finfolio_core::NewInvestment;
use finfolio_core::form::{FormEvent, FormOutcome, FormState, ValidationError, parse_form_data};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use tracing::{debug, info};

pub use keys::map_event;
pub use render::{field_style, field_text, progress_text, render_form};

use crate::logging;

/// How an interactive form session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSession {
    Submitted(NewInvestment),
    Cancelled,
}

/// Runs the form on the real terminal and restores it afterwards, whether or
/// not the session succeeded.
pub fn run_add_form() -> Result<FormSession> {
    let _paused = logging::pause_stdout();
    let mut terminal = setup_terminal()?;

    let result = drive(&mut terminal, event::read);

    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Event loop: draw, read one event, apply it, repeat.
///
/// After a valid submission the form stays on screen until the next event
/// acknowledges it.
pub fn drive<B, F>(
    terminal: &mut Terminal<B>,
    mut next_event: F,
) -> Result<FormSession>
where
    B: Backend,
    F: FnMut() -> io::Result<Event>,
{
    let mut form = FormState::new();
    let mut error: Option<ValidationError> = None;
    let mut draft: Option<NewInvestment> = None;

    loop {
        let message = error.as_ref().map(ToString::to_string);
        terminal
            .draw(|f| render_form(f, &form, message.as_deref()))
            .context("failed to draw form")?;

        let event = next_event().context("failed to read terminal event")?;
        let Some(event) = map_event(&event) else {
            continue;
        };
        // A resize only needs a redraw; it must not acknowledge a submission.
        if matches!(event, FormEvent::Resize { .. }) {
            continue;
        }

        match form.handle(event) {
            FormOutcome::Continue => {}
            FormOutcome::Cancelled => {
                info!("investment form cancelled");
                return Ok(FormSession::Cancelled);
            }
            FormOutcome::Submitted => match parse_form_data(&form.field_values()) {
                Ok(parsed) => {
                    debug!(?parsed, "investment form accepted");
                    error = None;
                    draft = Some(parsed);
                }
                Err(rejected) => {
                    info!(field = rejected.field(), %rejected, "investment form rejected");
                    form = FormState::with_values(&form.field_values(), Some(rejected.field()));
                    error = Some(rejected);
                }
            },
            FormOutcome::Closed => {
                if let Some(draft) = draft.take() {
                    return Ok(FormSession::Submitted(draft));
                }
            }
        }
    }
}
