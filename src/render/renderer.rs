use std::collections::{HashMap, HashSet};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{
    CollectibleType, FoodType, GameState, GameStatus, InventoryItem, Position, SessionContext,
};
use crate::metrics::GameMetrics;
use crate::scores::LeaderboardEntry;

use super::replay::{FrameMark, TraceReplay};

/// Everything one frame needs, borrowed from the session and the front end
pub struct View<'a> {
    pub state: &'a GameState,
    pub ctx: &'a SessionContext,
    /// Weight threshold of the current level
    pub threshold: u32,
    pub hint_route: &'a [Position],
    pub metrics: &'a GameMetrics,
    pub selected: Option<usize>,
    pub replay: Option<&'a TraceReplay>,
    pub notice: Option<&'a str>,
    pub leaderboard: &'a [LeaderboardEntry],
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, view: &View) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(view);
        frame.render_widget(stats, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);

        // Render game grid or end screen
        let state = view.state;
        if state.status.is_finished() {
            frame.render_widget(self.render_game_over(state), body[0]);
        } else {
            frame.render_widget(self.render_grid(view), body[0]);
        }

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(8)])
            .split(body[1]);
        frame.render_widget(self.render_inventory(view), side[0]);
        frame.render_widget(self.render_leaderboard(view.leaderboard), side[1]);

        frame.render_widget(self.render_footer(view), chunks[2]);
    }

    fn render_grid(&self, view: &View) -> Paragraph<'_> {
        let state = view.state;
        let body: HashSet<Position> = state.snake.positions().skip(1).collect();
        let food: HashMap<Position, FoodType> =
            state.food.iter().map(|f| (f.position, f.kind)).collect();
        let collectibles: HashMap<Position, CollectibleType> =
            state.collectibles.iter().map(|c| (c.position, c.kind)).collect();
        let hint: HashSet<Position> = view.hint_route.iter().copied().collect();

        let mut lines = Vec::new();
        for y in 0..state.grid_height {
            let mut spans = Vec::new();

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == state.snake.head() {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if body.contains(&pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if let Some(kind) = food.get(&pos) {
                    Span::styled(
                        "● ",
                        Style::default()
                            .fg(food_color(*kind))
                            .add_modifier(Modifier::BOLD),
                    )
                } else if let Some(kind) = collectibles.get(&pos) {
                    Span::styled(
                        "◆ ",
                        Style::default()
                            .fg(collectible_color(*kind))
                            .add_modifier(Modifier::BOLD),
                    )
                } else if hint.contains(&pos) {
                    Span::styled("· ", Style::default().fg(Color::Yellow))
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let title = match state.status {
            GameStatus::Paused => " Snake (paused) ".to_string(),
            _ => format!(" Snake - Level {} ", state.stats.level),
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, view: &View) -> Paragraph<'_> {
        let stats = &view.state.stats;
        let over = stats.current_inventory_weight > view.threshold;
        let weight_style = if over {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let text = vec![
            Line::from(vec![
                label("Score: "),
                Span::styled(
                    stats.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                label("High: "),
                value(stats.high_score.to_string()),
                Span::raw("    "),
                label("Level: "),
                value(stats.level.to_string()),
                Span::raw("    "),
                label("Length: "),
                value(view.state.snake.len().to_string()),
                Span::raw("    "),
                label("Time: "),
                value(view.metrics.format_time()),
            ]),
            Line::from(vec![
                label("Weight: "),
                Span::styled(
                    format!("{}/{}", stats.current_inventory_weight, view.threshold),
                    weight_style,
                ),
                Span::raw("    "),
                label("Capacity: "),
                value(format!("{}/{}", view.state.inventory.weight(), view.ctx.inventory_capacity)),
                Span::raw("    "),
                label("Coins: "),
                value(view.ctx.coins.to_string()),
                Span::raw("    "),
                label("Value: "),
                value(stats.total_value.to_string()),
                Span::raw("    "),
                label("Games: "),
                value(view.metrics.games_played.to_string()),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_inventory(&self, view: &View) -> Paragraph<'_> {
        let (items, mark): (&[InventoryItem], Option<FrameMark>) = match view.replay {
            Some(replay) => {
                let frame = replay.frame();
                (frame.items, Some(frame.mark))
            }
            None => (view.state.inventory.items(), None),
        };

        let mut lines = Vec::new();
        if let Some(replay) = view.replay {
            let (step, total) = replay.progress();
            lines.push(Line::from(Span::styled(
                format!("{} [{}/{}]", replay.label(), step, total),
                Style::default().fg(Color::Yellow),
            )));
        }

        if items.is_empty() {
            lines.push(Line::from(Span::styled(
                "(empty)",
                Style::default().fg(Color::DarkGray),
            )));
        }

        for (i, item) in items.iter().enumerate() {
            let mut style = Style::default().fg(collectible_color(item.kind));
            match mark {
                Some(FrameMark::Compare { pair, swapped }) if i == pair.0 || i == pair.1 => {
                    style = style.bg(if swapped { Color::Red } else { Color::DarkGray });
                }
                Some(FrameMark::Scan { current, found }) => {
                    if found.contains(&i) {
                        style = style.bg(Color::Green).fg(Color::Black);
                    } else if i == current {
                        style = style.bg(Color::DarkGray);
                    }
                }
                _ => {}
            }
            if view.replay.is_none() && view.selected == Some(i) {
                style = style.add_modifier(Modifier::REVERSED);
            }

            lines.push(Line::from(Span::styled(
                format!(
                    "{:<9} v{:>3} w{:>3} ${:>3}",
                    item.kind.name(),
                    item.value,
                    item.weight,
                    item.sell_value
                ),
                style,
            )));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(format!(" Inventory ({}) ", view.state.inventory.len())),
        )
    }

    fn render_leaderboard(&self, entries: &[LeaderboardEntry]) -> Paragraph<'_> {
        let lines: Vec<Line> = if entries.is_empty() {
            vec![Line::from(Span::styled(
                "no scores yet",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            entries
                .iter()
                .map(|entry| {
                    Line::from(vec![
                        Span::styled(format!("{:>2}. ", entry.rank), Style::default().fg(Color::Yellow)),
                        Span::raw(format!("{:<20} ", entry.username)),
                        Span::styled(
                            format!("{:>5} L{}", entry.score, entry.level),
                            Style::default().fg(Color::White),
                        ),
                    ])
                })
                .collect()
        };

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Leaderboard "),
        )
    }

    fn render_game_over(&self, state: &GameState) -> Paragraph<'_> {
        let (title, color) = match state.status {
            GameStatus::Win => ("YOU WIN", Color::Green),
            _ => ("GAME OVER", Color::Red),
        };

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                label("Final Score: "),
                Span::styled(
                    state.stats.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                label("Level: "),
                value(state.stats.level.to_string()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
    }

    fn render_footer(&self, view: &View) -> Paragraph<'_> {
        let mut text = Vec::new();
        if let Some(notice) = view.notice {
            text.push(Line::from(Span::styled(
                notice.to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
        } else if view.state.status == GameStatus::Ready {
            text.push(Line::from(Span::styled(
                "Press Space to start",
                Style::default().fg(Color::Green),
            )));
        }

        text.push(Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw("/"),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" move | "),
            key("P"),
            Span::raw(" pause | "),
            key("H"),
            Span::raw(" hint | "),
            key("U"),
            Span::raw(" upgrade | "),
            key("Tab"),
            Span::raw("/"),
            key("E"),
            Span::raw(" sell | "),
            key("VGTY"),
            Span::raw(" sort | "),
            key("1-4"),
            Span::raw(" search | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ]));

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn label(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::Yellow))
}

fn value(text: String) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::White))
}

fn key(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::Cyan))
}

fn food_color(kind: FoodType) -> Color {
    match kind {
        FoodType::Apple => Color::Red,
        FoodType::Cherry => Color::LightRed,
        FoodType::Banana => Color::Yellow,
        FoodType::Berry => Color::Magenta,
    }
}

fn collectible_color(kind: CollectibleType) -> Color {
    match kind {
        CollectibleType::Crystal => Color::LightCyan,
        CollectibleType::Gem => Color::LightMagenta,
        CollectibleType::Potion => Color::LightBlue,
        CollectibleType::Artifact => Color::LightYellow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, GameSession};
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(view: &View) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal
            .draw(|frame| Renderer::new().render(frame, view))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn view<'a>(
        session: &'a GameSession,
        metrics: &'a GameMetrics,
        leaderboard: &'a [LeaderboardEntry],
    ) -> View<'a> {
        View {
            state: session.state(),
            ctx: session.context(),
            threshold: session.capacity_threshold(),
            hint_route: session.hint_route(),
            metrics,
            selected: None,
            replay: None,
            notice: None,
            leaderboard,
        }
    }

    #[test]
    fn test_ready_screen_prompts_to_start() {
        let session = GameSession::seeded(GameConfig::small(), 3, 0).unwrap();
        let metrics = GameMetrics::new();
        let screen = draw(&view(&session, &metrics, &[]));

        assert!(screen.contains("Press Space to start"));
        assert!(screen.contains("Inventory (0)"));
        assert!(screen.contains("no scores yet"));
    }

    #[test]
    fn test_leaderboard_rows_are_listed() {
        let session = GameSession::seeded(GameConfig::small(), 3, 0).unwrap();
        let metrics = GameMetrics::new();
        let entries = vec![LeaderboardEntry {
            id: 0,
            username: "ada".to_string(),
            score: 42,
            level: 3,
            rank: 1,
        }];

        let screen = draw(&view(&session, &metrics, &entries));
        assert!(screen.contains("ada"));
        assert!(screen.contains("42 L3"));
    }
}
