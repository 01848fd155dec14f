use std::{
    collections::HashSet,
    io::{self, Stdout},
    time::{Duration, Instant},
};

use anyhow::Result;
use qlearn_path_core::{LocationKey, Tile, environment::Environment};
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};

/// Playback state for a learned path.
struct Playback<'a> {
    environment: &'a Environment,
    path: &'a [LocationKey],
    /// Index into `path` of the agent's current cell.
    step: usize,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl<'a> Playback<'a> {
    fn new(environment: &'a Environment, path: &'a [LocationKey]) -> Self {
        Playback {
            environment,
            path,
            step: 0,
            should_quit: false,
        }
    }

    /// Advances the agent one cell along the path.
    fn tick(&mut self) {
        if self.step + 1 < self.path.len() {
            self.step += 1;
        }
    }

    fn finished(&self) -> bool {
        self.step + 1 >= self.path.len()
    }

    fn quit(&mut self) {
        self.should_quit = true;
    }
}

/// Animates the agent walking `path` until the user presses 'q' or Esc.
pub fn watch(environment: &Environment, path: &[LocationKey], tick_rate: Duration) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut playback = Playback::new(environment, path);
    let result = run_playback(&mut terminal, &mut playback, tick_rate);
    restore_terminal(&mut terminal)?;
    result
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_playback(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    playback: &mut Playback<'_>,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, playback))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => playback.quit(),
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            playback.tick();
            last_tick = Instant::now();
        }

        if playback.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(frame: &mut Frame, playback: &Playback<'_>) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(80), // Area for the map
            Constraint::Percentage(10), // Area for progress
            Constraint::Percentage(10), // Area for help
        ])
        .split(frame.area());

    render_map(frame, main_layout[0], playback);
    render_progress(frame, main_layout[1], playback);

    let help_text = Paragraph::new("Press 'q' or 'Esc' to quit.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

fn render_progress(frame: &mut Frame, area: Rect, playback: &Playback<'_>) {
    let codec = playback.environment.codec();
    let here = codec.coords(playback.path[playback.step]);
    let status = if playback.finished() {
        Span::styled("goal reached", Style::default().fg(Color::Green).bold())
    } else {
        Span::raw("walking")
    };
    let line = Line::from(vec![
        Span::raw(format!(
            "Step {}/{} at {} - ",
            playback.step,
            playback.path.len().saturating_sub(1),
            here
        )),
        status,
    ]);
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Progress")),
        area,
    );
}

/// Renders the tile grid with the walked part of the path and the agent.
fn render_map(frame: &mut Frame, area: Rect, playback: &Playback<'_>) {
    let tiles = playback.environment.tiles();
    let codec = playback.environment.codec();
    let current = playback.path[playback.step];
    let visited: HashSet<LocationKey> = playback.path[..playback.step].iter().copied().collect();

    let mut lines: Vec<Line> = Vec::with_capacity(tiles.rows());
    for row in 0..tiles.rows() {
        let mut spans: Vec<Span> = Vec::with_capacity(tiles.cols());
        for col in 0..tiles.cols() {
            let key = codec.key(row as isize, col as isize);
            let span = if key == current {
                Span::styled("@", Style::default().fg(Color::Red).bold())
            } else {
                match tiles[key] {
                    Tile::Goal => Span::styled("g", Style::default().fg(Color::Green)),
                    Tile::Impassable => Span::styled("#", Style::default().fg(Color::DarkGray)),
                    Tile::Passable if visited.contains(&key) => {
                        Span::styled(".", Style::default().fg(Color::Yellow))
                    }
                    Tile::Passable => Span::raw(" "),
                }
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Learned Path").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}
