//! Plain-text presenter for terminals.
//!
//! Terminals cannot place a sprite between two cells, so agents are drawn
//! on the cell they occupy. Glyphs are single ASCII characters to keep the
//! columns aligned; emoji are double-width in most terminals.

use living_grid_types::ResourceKind;

use crate::layout::{CellContent, EMPTY_LOG_PLACEHOLDER, LogLine, SceneLayout};
use crate::logs::{FontWeight, LogCategory};
use crate::scroll::LogViewport;

/// Frame title.
pub const TITLE: &str = "The Living Grid";

const fn cell_char(content: &CellContent) -> char {
    match content {
        CellContent::Empty => '.',
        CellContent::Exit => 'E',
        CellContent::Resource(ResourceKind::Wheat) => 'w',
        CellContent::Resource(_) => 's',
    }
}

/// Render a scene and the visible part of its log panel as text.
pub fn render_text(scene: &SceneLayout, viewport: &LogViewport) -> String {
    let size = usize::from(scene.geometry.size);
    let mut rows: Vec<Vec<char>> = scene
        .cells
        .chunks(size.max(1))
        .map(|row| row.iter().map(cell_char).collect())
        .collect();

    for sprite in &scene.agents {
        let (x, y) = sprite.cell;
        let (Ok(col), Ok(row)) = (usize::try_from(x), usize::try_from(y)) else {
            continue;
        };
        if let Some(slot) = rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = if sprite.armed { 'X' } else { 'A' };
        }
    }

    let mut out = format!(
        "{TITLE}\nAgents: {}  Resources: {}  Exits: {}\n",
        scene.stats.agents, scene.stats.resources, scene.stats.exits
    );
    for row in &rows {
        out.extend(row.iter());
        out.push('\n');
    }

    out.push_str("--- System Logs ---\n");
    if scene.logs.is_empty() {
        out.push_str(EMPTY_LOG_PLACEHOLDER);
        out.push('\n');
    }
    for line in viewport.visible(&scene.logs) {
        out.push_str(&log_row(line));
        out.push('\n');
    }
    out
}

/// One log panel row: a bold marker column, the category tag, the text.
fn log_row(line: &LogLine) -> String {
    let marker = if line.style.weight == FontWeight::Bold {
        '!'
    } else {
        ' '
    };
    if line.category == LogCategory::Default {
        format!("{marker}{}", line.text)
    } else {
        format!("{marker}[{}] {}", line.category.tag(), line.text)
    }
}
