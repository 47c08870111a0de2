use action::Action;
use crossterm::event::{KeyCode, KeyEvent};
use keymap::{Config as KeyConfig, KeyMapConfig};
use lsys::{
    decode, discover, types::RULE_SEPARATOR, Animation, Config, Frame, PresetManager, RuleSet,
    SystemLoader, Tick, ViewBox,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, BorderType, Borders, Padding, Paragraph, Wrap,
    },
    Frame as TermFrame,
};
use std::time::Duration;
use tracing::{info, warn};

const BLOCK_PADDING: Padding = Padding::new(1, 1, 0, 0);
/// Program text beyond this many symbols is elided in the program panel.
const PROGRAM_PREVIEW: usize = 4096;

pub struct App {
    config: Config,
    animation: Animation,
    frame: Option<Frame>,
    system_name: String,
    // `None` when the rules did not come from the preset gallery
    current_preset_index: Option<usize>,
    auto_play: bool,
    message: String,
    show_help: bool,
    // `Some` while the rules are being edited as text
    editor: Option<String>,
    pub(crate) keymap: KeyConfig<Action>,
}

impl App {
    fn new(
        config: Config,
        rules: RuleSet,
        seed: String,
        system_name: String,
        message: String,
    ) -> Self {
        Self {
            animation: Animation::with_seed(config.clone(), rules, seed),
            config,
            frame: None,
            system_name,
            current_preset_index: None,
            auto_play: true,
            message,
            show_help: false,
            editor: None,
            keymap: Action::keymap_config(),
        }
    }

    /// Starts with a rule set found by the acceptance search.
    pub fn new_search(config: Config) -> Result<Self, String> {
        let discovery = discover(&config).map_err(|e| e.to_string())?;
        let seed = config.seed.clone();

        Ok(Self::new(
            config,
            discovery.rules,
            seed,
            "Random".to_string(),
            format!(
                "Found live rules after {} attempts. Press 'h' for help.",
                discovery.attempts
            ),
        ))
    }

    /// Starts from a system document or, failing that, from plain rule notation.
    pub fn new_from_source(config: Config, content: &str) -> Result<Self, String> {
        match SystemLoader::load_system_from_string(content) {
            Ok(system) => {
                let seed = system.seed_or(&config.seed).to_string();
                Ok(Self::new(
                    config,
                    system.rules,
                    seed,
                    system.name,
                    "System loaded from source. Press 'h' for help.".to_string(),
                ))
            }
            Err(e) => {
                let rules = decode(content);
                if rules.is_empty() {
                    return Err(format!("Failed to load rules: {}", e));
                }

                let seed = config.seed.clone();
                Ok(Self::new(
                    config,
                    rules,
                    seed,
                    "Custom".to_string(),
                    "Rules loaded from source. Press 'h' for help.".to_string(),
                ))
            }
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.tick_interval_ms.max(1))
    }

    pub fn render(&mut self, f: &mut TermFrame) {
        let inner_area = f.area().inner(Margin::new(1, 0));

        // Info, middle (path + side panels), status
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(inner_area);

        self.render_system_info(f, main_chunks[0]);

        let middle_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(65),
                Constraint::Length(1),
                Constraint::Percentage(35),
            ])
            .split(main_chunks[1]);

        self.render_path(f, middle_chunks[0]);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Min(0)])
            .split(middle_chunks[2]);

        if self.show_help {
            self.render_help(f, right_chunks[0]);
        } else {
            self.render_rules(f, right_chunks[0]);
        }
        self.render_program(f, right_chunks[1]);

        self.render_status(f, main_chunks[2]);
    }

    fn render_system_info(&self, f: &mut TermFrame, area: Rect) {
        let name = match self.current_preset_index {
            Some(index) => format!(
                "{} ({}/{})",
                self.system_name,
                index + 1,
                PresetManager::count()
            ),
            None => self.system_name.clone(),
        };

        let (status_text, status_color) = if self.animation.is_halted() {
            ("HALTED", Color::Red)
        } else if self.animation.depth() == 0 {
            ("READY", Color::Blue)
        } else {
            ("RUNNING", Color::Green)
        };

        let segments = self.frame.as_ref().map_or(0, |frame| frame.segments.len());

        let text = vec![
            Line::from(vec![
                Span::styled("System: ", Style::default().fg(Color::Yellow)),
                Span::raw(name),
                Span::styled(" | Seed: ", Style::default().fg(Color::Yellow)),
                Span::raw(self.animation.seed().to_string()),
            ]),
            Line::from(vec![
                Span::styled("Depth: ", Style::default().fg(Color::Yellow)),
                Span::raw(self.animation.depth().to_string()),
                Span::styled(" | Symbols: ", Style::default().fg(Color::Yellow)),
                Span::raw(self.animation.program().len().to_string()),
                Span::styled(" | Segments: ", Style::default().fg(Color::Yellow)),
                Span::raw(segments.to_string()),
                Span::styled(" | Status: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    status_text,
                    Style::default()
                        .fg(status_color)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        let paragraph = Paragraph::new(text)
            .block(block("lsys - Random L-Systems (TUI)").title_alignment(Alignment::Center));

        f.render_widget(paragraph, area);
    }

    fn render_path(&self, f: &mut TermFrame, area: Rect) {
        let outer = block("Path");
        let inner = outer.inner(area);

        let Some(frame) = &self.frame else {
            let waiting = section("Path", vec![Line::from("Waiting for the first tick...")]);
            f.render_widget(waiting, area);
            return;
        };

        let Some(view_box) = frame.bounds else {
            let empty = section("Path", vec![Line::from("Nothing drawn at this depth.")]);
            f.render_widget(empty, area);
            return;
        };

        let (x_bounds, y_bounds) = fit_bounds(&view_box, inner);

        // The turtle's y axis points down, like SVG; the canvas' points up.
        let canvas = Canvas::default()
            .block(outer)
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                for segment in &frame.segments {
                    ctx.draw(&CanvasLine::new(
                        segment.start.x,
                        -segment.start.y,
                        segment.end.x,
                        -segment.end.y,
                        Color::White,
                    ));
                }
            });

        f.render_widget(canvas, area);
    }

    fn render_rules(&self, f: &mut TermFrame, area: Rect) {
        let (title, content) = match &self.editor {
            Some(buffer) => ("Rules (editing)", format!("{buffer}▏")),
            None => ("Rules", self.animation.rules_notation()),
        };

        let lines: Vec<Line> = content.lines().map(|l| Line::from(l.to_string())).collect();
        let paragraph = section(title, lines).wrap(Wrap { trim: false });

        f.render_widget(paragraph, area);
    }

    fn render_program(&self, f: &mut TermFrame, area: Rect) {
        let program = self.animation.program();
        let mut text = program.chars().take(PROGRAM_PREVIEW).collect::<String>();
        if program.len() > PROGRAM_PREVIEW {
            text.push('…');
        }

        let paragraph = section("Program", vec![Line::from(text)]).wrap(Wrap { trim: false });

        f.render_widget(paragraph, area);
    }

    fn render_help(&self, f: &mut TermFrame, area: Rect) {
        let help_text = vec![
            Line::from("Controls:"),
            Line::from("  Space - Next depth"),
            Line::from("  r - Restart from the seed"),
            Line::from("  p - Toggle auto-play"),
            Line::from("  n - Search for new random rules"),
            Line::from("  e - Edit rules (Esc applies, Tab inserts →)"),
            Line::from("  ← → - Switch presets"),
            Line::from("  h - Toggle this help"),
            Line::from("  q - Quit"),
            Line::from(""),
            Line::from("Symbols: f draw, g move, + left, - right, x y inert"),
        ];

        f.render_widget(section("Help", help_text), area);
    }

    fn render_status(&self, f: &mut TermFrame, area: Rect) {
        let outer = block("Status");
        let inner = outer.inner(area);
        let angle = format!("{}°", self.config.turn_angle_degrees);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(angle.len() as u16)])
            .split(inner);

        let auto_play_status = if self.auto_play { "ON" } else { "OFF" };
        let status = Line::from(vec![
            Span::raw("Auto-play: "),
            Span::styled(auto_play_status, Style::default().fg(Color::Yellow)),
            Span::raw(format!(" | {}", self.message)),
        ]);

        let angle = Text::from(
            Line::from(Span::styled(angle, Style::default().fg(Color::Yellow))).right_aligned(),
        );

        f.render_widget(outer, area);
        f.render_widget(status, chunks[0]);
        f.render_widget(angle, chunks[1]);
    }

    pub fn tick(&mut self) {
        match self.animation.tick() {
            Tick::Frame(frame) => {
                self.message = format!(
                    "Depth {} rendered ({} segments)",
                    frame.depth,
                    frame.segments.len()
                );
                self.frame = Some(frame);
            }
            Tick::Halt(halt) => {
                info!(system = %self.system_name, reason = %halt, "Auto-play stopped");
                self.message = format!(
                    "Halted at depth {}: {}. Press 'r' to restart or 'n' for new rules.",
                    self.animation.depth(),
                    halt
                );
                self.auto_play = false;
            }
        }
    }

    pub fn restart(&mut self) {
        self.animation.restart();
        self.frame = None;
        self.message = "Restarted from the seed".to_string();
    }

    pub fn toggle_auto_play(&mut self) {
        self.auto_play = !self.auto_play;
        self.message = format!(
            "Auto-play {}",
            if self.auto_play {
                "enabled"
            } else {
                "disabled"
            }
        );
    }

    pub fn is_auto_playing(&self) -> bool {
        self.auto_play && !self.animation.is_halted() && self.editor.is_none()
    }

    pub fn search_new_rules(&mut self) {
        match discover(&self.config) {
            Ok(discovery) => {
                self.system_name = "Random".to_string();
                self.current_preset_index = None;
                self.replace_rules(discovery.rules);
                self.message = format!("Found live rules after {} attempts", discovery.attempts);
            }
            Err(e) => {
                warn!(error = %e, "Random search failed");
                self.message = e.to_string();
            }
        }
    }

    fn replace_rules(&mut self, rules: RuleSet) {
        self.animation.replace_rules(rules);
        self.frame = None;
        self.auto_play = true;
    }

    pub fn next_preset(&mut self) {
        let count = PresetManager::count();
        if count == 0 {
            return;
        }
        let index = self.current_preset_index.map_or(0, |i| (i + 1) % count);
        self.load_preset(index);
    }

    pub fn previous_preset(&mut self) {
        let count = PresetManager::count();
        if count == 0 {
            return;
        }
        let index = match self.current_preset_index {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        };
        self.load_preset(index);
    }

    fn load_preset(&mut self, index: usize) {
        match PresetManager::get_by_index(index) {
            Ok(system) => {
                let seed = system.seed_or(&self.config.seed).to_string();
                self.animation = Animation::with_seed(self.config.clone(), system.rules, seed);
                self.frame = None;
                self.auto_play = true;
                self.current_preset_index = Some(index);
                self.message = format!("Loaded preset: {}", system.name);
                self.system_name = system.name;
            }
            Err(e) => {
                warn!(index, error = %e, "Failed to load preset");
                self.message = e.to_string();
            }
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    pub fn start_editing(&mut self) {
        self.editor = Some(self.animation.rules_notation());
        self.show_help = false;
        self.message = "Editing rules. Esc applies, Tab inserts the → separator.".to_string();
    }

    pub fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some(buffer) = self.editor.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.apply_edit(),
            KeyCode::Enter => buffer.push('\n'),
            KeyCode::Tab => buffer.push_str(&format!(" {RULE_SEPARATOR} ")),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            _ => {}
        }
    }

    /// Replaces the rules with whatever lines of the editor parse; the rest is dropped.
    fn apply_edit(&mut self) {
        let Some(buffer) = self.editor.take() else {
            return;
        };

        let rules = decode(&buffer);
        let count = rules.len();
        info!(rules = count, "Applied edited rules");
        self.system_name = "Custom".to_string();
        self.current_preset_index = None;
        self.replace_rules(rules);
        self.message = format!("Applied {} rule(s)", count);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

/// Widens the view box so one turtle unit covers the same distance on both axes.
///
/// A braille cell holds 2x4 dots and terminal cells are about twice as tall as wide,
/// so dots are roughly square.
fn fit_bounds(view_box: &ViewBox, area: Rect) -> ([f64; 2], [f64; 2]) {
    let dots_x = f64::from(area.width.max(1)) * 2.0;
    let dots_y = f64::from(area.height.max(1)) * 4.0;
    let scale = (view_box.width / dots_x).max(view_box.height / dots_y);

    let half_width = scale * dots_x / 2.0;
    let half_height = scale * dots_y / 2.0;
    let center_x = (view_box.min_x + view_box.max_x()) / 2.0;
    let center_y = -(view_box.min_y + view_box.max_y()) / 2.0;

    (
        [center_x - half_width, center_x + half_width],
        [center_y - half_height, center_y + half_height],
    )
}

fn section<'a>(title: &'a str, content: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(content).block(block(title))
}

fn block(title: &str) -> Block {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {title} "))
        .padding(BLOCK_PADDING)
}
