//! Terminal color mapping

use ratatui::style::{Color, Modifier, Style};

use crate::world::biome::Biome;

/// Style for a terrain cell; dimmed after dark
pub fn biome_style(biome: Biome, night: bool) -> Style {
    let style = match biome {
        Biome::Meadow => Style::default().fg(Color::Black).bg(Color::Green),
        Biome::Forest => Style::default().fg(Color::White).bg(Color::Green),
        Biome::Swamp => Style::default().fg(Color::White).bg(Color::Blue),
        Biome::Desert => Style::default().fg(Color::Black).bg(Color::Yellow),
        Biome::Water => Style::default().fg(Color::Cyan).bg(Color::Blue),
        Biome::Street => Style::default().fg(Color::White).bg(Color::Black),
        Biome::Sidewalk => Style::default().fg(Color::Black).bg(Color::White),
        Biome::Wall => Style::default().fg(Color::White).bg(Color::DarkGray),
        Biome::Interior => Style::default().fg(Color::White).bg(Color::Black),
        Biome::Park => Style::default().fg(Color::Black).bg(Color::Green),
        Biome::CaveFloor => Style::default().fg(Color::Gray).bg(Color::Black),
        Biome::CaveWall => Style::default().fg(Color::DarkGray).bg(Color::Black),
        Biome::Crystal => Style::default().fg(Color::Cyan).bg(Color::Black),
        Biome::Lava => Style::default().fg(Color::Red).bg(Color::Black),
        Biome::GoldVein => Style::default().fg(Color::Yellow).bg(Color::Black),
    };
    if night {
        style.add_modifier(Modifier::DIM)
    } else {
        style
    }
}

pub fn structure_style(night: bool) -> Style {
    let style = Style::default().fg(Color::Gray);
    if night {
        style.add_modifier(Modifier::DIM)
    } else {
        style
    }
}

pub fn building_style() -> Style {
    Style::default().fg(Color::White).bg(Color::DarkGray)
}

pub fn door_style() -> Style {
    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
}

pub fn portal_style() -> Style {
    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
}

pub fn villager_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub fn prowler_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

pub fn home_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

pub fn vendor_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}
