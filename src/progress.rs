use std::io::{IsTerminal, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

const BAR_WIDTH: usize = 30;

/// Draws a progress bar on stderr until the run publishes its final value.
/// Nothing is drawn when stderr is not a terminal.
pub(crate) fn setup_progress_indicator(
    mut progress: watch::Receiver<f64>,
    no_color: bool,
) -> tokio::task::JoinHandle<()> {
    let style = ProgressStyle::new(BAR_WIDTH);

    tokio::spawn(async move {
        if !std::io::stderr().is_terminal() {
            return;
        }

        let started = Instant::now();
        loop {
            let fraction = *progress.borrow_and_update();
            let line = build_progress_line(&style, fraction, started.elapsed().as_millis(), no_color);
            if let Err(err) = render_progress_line(&line, no_color) {
                debug!("Progress rendering stopped: {}", err);
                return;
            }
            if fraction >= 1.0 || progress.changed().await.is_err() {
                break;
            }
        }

        if let Err(err) = finish_progress_line() {
            debug!("Progress rendering stopped: {}", err);
        }
    })
}

fn render_progress_line(line: &[ProgressSegment], no_color: bool) -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for segment in line {
        match segment.color {
            Some(color) if !no_color => queue!(
                out,
                SetForegroundColor(color),
                Print(&segment.text),
                ResetColor
            )?,
            Some(_) | None => queue!(out, Print(&segment.text))?,
        }
    }
    out.flush()?;
    Ok(())
}

fn finish_progress_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn build_progress_line(
    style: &ProgressStyle,
    fraction: f64,
    elapsed_ms: u128,
    no_color: bool,
) -> Vec<ProgressSegment> {
    let size = style.size.max(1);
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let per_mille = (fraction * 1_000.0).round() as u64;
    let filled = u128::from(per_mille)
        .saturating_mul(u128::try_from(size).unwrap_or(u128::MAX))
        .checked_div(1_000)
        .unwrap_or(0);
    let complete_size = usize::try_from(filled).unwrap_or(size).min(size);
    let incomplete_size = size.saturating_sub(complete_size);

    let percent_text = format!(" {:.2}%", fraction * 100.0);

    let elapsed_tenths = elapsed_ms.checked_div(100).unwrap_or(0);
    let secs = elapsed_tenths.checked_div(10).unwrap_or(0);
    let tenths = elapsed_tenths.checked_rem(10).unwrap_or(0);
    let time_text = format!(" | {}.{}s", secs, tenths);

    let progress_bar = format!(
        "{}{}{}{}",
        style.begin,
        style.fill.repeat(complete_size),
        style.empty.repeat(incomplete_size),
        style.end
    );

    if no_color {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::plain(percent_text),
            ProgressSegment::plain(time_text),
        ]
    } else {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::colored(percent_text, Color::Cyan),
            ProgressSegment::colored(time_text, Color::Yellow),
        ]
    }
}

struct ProgressStyle {
    size: usize,
    begin: &'static str,
    end: &'static str,
    fill: &'static str,
    empty: &'static str,
}

impl ProgressStyle {
    const fn new(size: usize) -> Self {
        Self {
            size,
            begin: "[",
            end: "]",
            fill: "#",
            empty: "-",
        }
    }
}

struct ProgressSegment {
    text: String,
    color: Option<Color>,
}

impl ProgressSegment {
    const fn plain(text: String) -> Self {
        Self { text, color: None }
    }

    const fn colored(text: String, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}
