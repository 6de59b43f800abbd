//! ratatui/crossterm renderer
//!
//! Three panes: the map viewport, a villager status column and the
//! event history. Camera focus, zoom and the legend overlay live
//! entirely in here; only Stop/Save/Descend/Ascend reach the engine.

use std::io::{self, Stdout};
use std::time::Duration;

use ahash::AHashMap;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Terminal;

use crate::agents::{Entity, EntityKind};
use crate::core::error::Result;
use crate::core::types::EntityId;
use crate::engine::{EngineCommand, FrameView, RenderObserver};
use crate::render::camera::Camera;
use crate::render::colors;
use crate::world::{Layer, WorldMap};

pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    camera: Camera,
    show_legend: bool,
    focus: Option<EntityId>,
}

impl TerminalRenderer {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            camera: Camera::new(),
            show_legend: false,
            focus: None,
        })
    }

    fn handle_input(&mut self, view: &FrameView<'_>) -> Result<Vec<EngineCommand>> {
        let mut commands = Vec::new();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => commands.push(EngineCommand::Stop),
                KeyCode::Char('s') => commands.push(EngineCommand::Save),
                KeyCode::Char('n') => self.cycle_focus(view),
                KeyCode::Char('l') => self.show_legend = !self.show_legend,
                KeyCode::Char('+') | KeyCode::Char('=') => self.camera.zoom_in(),
                KeyCode::Char('-') => self.camera.zoom_out(),
                KeyCode::Left => self.camera.pan(-2.0, 0.0),
                KeyCode::Right => self.camera.pan(2.0, 0.0),
                KeyCode::Up => self.camera.pan(0.0, -2.0),
                KeyCode::Down => self.camera.pan(0.0, 2.0),
                KeyCode::Char('>') => {
                    // Descending only works from a portal tile
                    if let Some(pos) = self.focused_pos(view) {
                        if view.map.portal_at(pos.cell()) {
                            commands.push(EngineCommand::Descend);
                        }
                    }
                }
                KeyCode::Char('<') => {
                    if view.map.layer() == Layer::Underworld {
                        commands.push(EngineCommand::Ascend);
                    }
                }
                _ => {}
            }
        }
        Ok(commands)
    }

    fn villager_ids(view: &FrameView<'_>) -> Vec<EntityId> {
        view.registry
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Villager(_)))
            .map(|e| e.id)
            .collect()
    }

    fn cycle_focus(&mut self, view: &FrameView<'_>) {
        let ids = Self::villager_ids(view);
        if ids.is_empty() {
            return;
        }
        let next = match self.focus.and_then(|f| ids.iter().position(|&id| id == f)) {
            Some(i) => ids[(i + 1) % ids.len()],
            None => ids[0],
        };
        self.focus = Some(next);
        if let Some(entity) = view.registry.get(next) {
            self.camera.follow(entity.pos);
        }
    }

    fn focused_pos(&self, view: &FrameView<'_>) -> Option<crate::core::types::Vec2> {
        self.focus
            .and_then(|id| view.registry.get(id))
            .map(|e| e.pos)
    }

    fn update_camera(&mut self, view: &FrameView<'_>) {
        if self.focus.is_none() {
            self.focus = Self::villager_ids(view).first().copied();
        }
        if !self.camera.manual {
            if let Some(pos) = self.focused_pos(view) {
                self.camera.follow(pos);
            }
        }
    }
}

impl RenderObserver for TerminalRenderer {
    fn frame(&mut self, view: FrameView<'_>) -> Result<Vec<EngineCommand>> {
        let commands = self.handle_input(&view)?;
        self.update_camera(&view);

        let camera = &self.camera;
        let show_legend = self.show_legend;
        let focus = self.focus;
        self.terminal
            .draw(|frame| draw_ui(frame, &view, camera, show_legend, focus))?;
        Ok(commands)
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        // Restore the terminal even on unwinding; failures here are
        // not actionable
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

// ---------------------------------------------------------------------------
// Drawing

fn draw_ui(
    frame: &mut ratatui::Frame,
    view: &FrameView<'_>,
    camera: &Camera,
    show_legend: bool,
    focus: Option<EntityId>,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(12), Constraint::Length(9)])
        .split(frame.size());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(rows[0]);

    draw_map(frame, columns[0], view, camera);
    draw_status(frame, columns[1], view, focus);
    draw_history(frame, rows[1], view);

    if show_legend {
        draw_legend(frame, view);
    }
}

fn draw_map(frame: &mut ratatui::Frame, area: Rect, view: &FrameView<'_>, camera: &Camera) {
    let title = format!(
        " {} {:02}:00{} ",
        view.map.terrain_name(),
        view.clock.hour(),
        if view.clock.is_night() { " (night)" } else { "" }
    );
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let night = view.clock.is_night();

    // Entities drawn over terrain; later kinds win the cell
    let mut sprites: AHashMap<(u16, u16), (char, Style)> = AHashMap::new();
    for entity in view.registry.iter() {
        if let Some(at) = camera.project(entity.pos, inner.width, inner.height) {
            sprites.insert(at, (entity.glyph(), entity_style(entity)));
        }
    }

    let mut lines = Vec::with_capacity(inner.height as usize);
    for row in 0..inner.height {
        let mut spans = Vec::with_capacity(inner.width as usize);
        for col in 0..inner.width {
            if let Some(&(glyph, style)) = sprites.get(&(col, row)) {
                spans.push(Span::styled(glyph.to_string(), style));
                continue;
            }
            let cell = camera.cell_at(col, row, inner.width, inner.height);
            spans.push(terrain_span(view.map, cell, night));
        }
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn terrain_span(map: &WorldMap, cell: crate::core::types::Cell, night: bool) -> Span<'static> {
    let glyph = map.glyph_at(cell);
    let style = if map.portal_at(cell) {
        colors::portal_style()
    } else if let Some(tile) = map.building_tile(cell) {
        if tile == crate::world::building::FootprintTile::Door {
            colors::door_style()
        } else {
            colors::building_style()
        }
    } else if map.structure_at(cell).is_some() {
        colors::structure_style(night)
    } else if map.door_at(cell) {
        colors::door_style()
    } else {
        colors::biome_style(map.biome_at(cell.0 as f32 + 0.5, cell.1 as f32 + 0.5), night)
    };
    Span::styled(glyph.to_string(), style)
}

fn entity_style(entity: &Entity) -> Style {
    match entity.kind {
        EntityKind::Home { .. } => colors::home_style(),
        EntityKind::Villager(_) => colors::villager_style(),
        EntityKind::Prowler(_) => colors::prowler_style(),
        EntityKind::Vendor(_) => colors::vendor_style(),
    }
}

fn draw_status(frame: &mut ratatui::Frame, area: Rect, view: &FrameView<'_>, focus: Option<EntityId>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" STATUS (tick {}) ", view.tick));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for entity in view.registry.iter() {
        let Some(v) = entity.as_villager() else {
            continue;
        };
        if lines.len() + 4 > inner.height as usize {
            break;
        }
        let marker = if focus == Some(entity.id) { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}", entity.name),
            colors::villager_style(),
        )));
        lines.push(Line::from(format!(
            "   {:?}{}",
            v.state,
            if v.ailment.is_some() { " (ill)" } else { "" }
        )));
        lines.push(Line::from(format!(
            "   Wealth: {}G  Stress: {:.0}",
            v.wealth, v.stress
        )));
        let bars = (v.energy / 20.0).round() as usize;
        lines.push(Line::from(format!(
            "   Energy: [{}{}]",
            "#".repeat(bars.min(5)),
            " ".repeat(5 - bars.min(5))
        )));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn draw_history(frame: &mut ratatui::Frame, area: Rect, view: &FrameView<'_>) {
    let block = Block::default().borders(Borders::ALL).title(" HISTORY ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = inner.height as usize;
    let entries: Vec<&str> = view.log.iter().collect();
    let start = entries.len().saturating_sub(visible);
    let lines: Vec<Line> = entries[start..]
        .iter()
        .map(|entry| Line::from(entry.to_string()))
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn draw_legend(frame: &mut ratatui::Frame, view: &FrameView<'_>) {
    let area = frame.size();
    let width = 44.min(area.width);
    let height = 18.min(area.height);
    let modal = Rect {
        x: (area.width - width) / 2,
        y: (area.height - height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, modal);

    let mut lines = vec![
        Line::from(Span::styled(" Terrain ", Style::default().add_modifier(Modifier::BOLD))),
    ];
    for (glyph, description) in view.map.legend() {
        lines.push(Line::from(format!("  {glyph:<4} {description}")));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Inhabitants ",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from("  H    Town hall"));
    lines.push(Line::from("  A-Z  Villagers (initial)"));
    lines.push(Line::from("  W    Prowler"));
    lines.push(Line::from("  $    Vendor stall"));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" LEGEND (l to close) ");
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), modal);
}
