//! Spatial renderer: projects a [`DisplayState`] into a layout description.
//!
//! The layout has two layers. The occupancy layer is the discrete
//! `size x size` grid where each cell shows at most one exit or resource.
//! The agent overlay is separate: every living agent gets a sprite with a
//! continuous pixel position keyed by its identity, so a front end can
//! animate it between cells instead of teleporting it.
//!
//! Rendering is a pure function of the published state. It performs no
//! I/O and never mutates the state it reads.

use std::collections::HashMap;

use living_grid_types::{Agent, AgentId, ResourceKind, Snapshot, items};
use serde::Deserialize;

use crate::logs::{LogCategory, LogPalette, LogStyle, classify};
use crate::reconcile::DisplayState;

/// Glyph for an exit cell.
pub const EXIT_GLYPH: &str = "\u{1f6aa}";
/// Glyph for a wheat cell.
pub const WHEAT_GLYPH: &str = "\u{1f33e}";
/// Glyph for any other resource cell.
pub const ROCK_GLYPH: &str = "\u{1faa8}";
/// Glyph for an unarmed agent.
pub const AGENT_GLYPH: &str = "\u{1f916}";
/// Glyph for an armed agent.
pub const ARMED_AGENT_GLYPH: &str = "\u{1fa93}";
/// Shown in the log panel before the first line arrives.
pub const EMPTY_LOG_PLACEHOLDER: &str = "Waiting for server logs...";

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Grid dimensions and the pixel metrics of the overlay coordinate space.
///
/// The overlay origin sits at `origin_offset`, which must match the grid's
/// padding so sprites line up with cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GridGeometry {
    /// Cells per side.
    pub size: u16,
    /// Cell edge length in pixels.
    pub cell_size: u16,
    /// Gap between adjacent cells in pixels.
    pub cell_gap: u16,
    /// Padding between the grid edge and the first cell in pixels.
    pub origin_offset: u16,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            size: 20,
            cell_size: 25,
            cell_gap: 2,
            origin_offset: 10,
        }
    }
}

impl GridGeometry {
    /// Distance in pixels between the origins of two adjacent cells.
    pub fn pitch(&self) -> i64 {
        i64::from(self.cell_size).saturating_add(i64::from(self.cell_gap))
    }

    /// Pixel offset of a grid coordinate along one axis.
    pub fn project(&self, coordinate: i32) -> i64 {
        i64::from(self.origin_offset)
            .saturating_add(i64::from(coordinate).saturating_mul(self.pitch()))
    }

    /// Pixel position of a grid cell's top-left corner.
    pub fn project_point(&self, x: i32, y: i32) -> PixelPoint {
        PixelPoint {
            left: self.project(x),
            top: self.project(y),
        }
    }

    /// Whether `(x, y)` lies on the grid.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let side = i32::from(self.size);
        (0..side).contains(&x) && (0..side).contains(&y)
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        usize::from(self.size).saturating_mul(usize::from(self.size))
    }
}

/// Absolute position in the overlay coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    /// Pixels from the overlay's left edge.
    pub left: i64,
    /// Pixels from the overlay's top edge.
    pub top: i64,
}

// ---------------------------------------------------------------------------
// Occupancy layer
// ---------------------------------------------------------------------------

/// What a grid cell shows in the occupancy layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellContent {
    /// Nothing.
    #[default]
    Empty,
    /// An exit. Wins over a resource on the same cell.
    Exit,
    /// A resource of the given kind.
    Resource(ResourceKind),
}

impl CellContent {
    /// Glyph drawn in the cell.
    pub const fn glyph(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Exit => Some(EXIT_GLYPH),
            Self::Resource(ResourceKind::Wheat) => Some(WHEAT_GLYPH),
            Self::Resource(_) => Some(ROCK_GLYPH),
        }
    }

    /// Hover title for the cell.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Exit => Some("EXIT"),
            Self::Resource(kind) => Some(kind.as_str()),
        }
    }
}

static EMPTY_CELL: CellContent = CellContent::Empty;

/// Coordinate to cell content index over one snapshot.
///
/// Built once per published [`DisplayState`] so a render pass costs one
/// hash lookup per cell instead of a scan over every entity.
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    cells: HashMap<(i32, i32), CellContent>,
}

impl GridIndex {
    /// Index the exits and resources of a snapshot.
    ///
    /// When several resources share a cell the first one listed is shown.
    /// An exit always replaces a resource.
    pub fn build(snapshot: &Snapshot) -> Self {
        let resources = snapshot.resources.len();
        let mut cells = HashMap::with_capacity(resources.saturating_add(snapshot.exits.len()));
        for resource in &snapshot.resources {
            cells
                .entry((resource.x, resource.y))
                .or_insert_with(|| CellContent::Resource(resource.kind.clone()));
        }
        for exit in &snapshot.exits {
            cells.insert((exit.x, exit.y), CellContent::Exit);
        }
        Self { cells }
    }

    /// Content at `(x, y)`.
    pub fn get(&self, x: i32, y: i32) -> &CellContent {
        self.cells.get(&(x, y)).unwrap_or(&EMPTY_CELL)
    }

    /// Number of occupied cells, including any outside the grid.
    pub fn occupied(&self) -> usize {
        self.cells.len()
    }
}

// ---------------------------------------------------------------------------
// Agent overlay
// ---------------------------------------------------------------------------

/// Whether an agent carries the weapon.
pub fn is_armed(agent: &Agent) -> bool {
    agent.holds(items::AXE)
}

/// A living agent placed on the overlay layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSprite {
    /// Stable key for the sprite across renders.
    pub id: AgentId,
    /// Display label.
    pub name: String,
    /// Grid coordinate the sprite sits on.
    pub cell: (i32, i32),
    /// Overlay pixel position.
    pub position: PixelPoint,
    /// Whether to draw the armed variant.
    pub armed: bool,
    /// Remaining health, shown as a badge.
    pub lifespan: i32,
}

impl AgentSprite {
    /// Place an agent on the overlay.
    pub fn place(agent: &Agent, geometry: &GridGeometry) -> Self {
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            cell: (agent.x, agent.y),
            position: geometry.project_point(agent.x, agent.y),
            armed: is_armed(agent),
            lifespan: agent.lifespan,
        }
    }

    /// Glyph for the sprite.
    pub const fn glyph(&self) -> &'static str {
        if self.armed {
            ARMED_AGENT_GLYPH
        } else {
            AGENT_GLYPH
        }
    }

    /// Hover text: name and health.
    pub fn tooltip(&self) -> String {
        format!("Agent: {}\nHP: {}", self.name, self.lifespan)
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Population counters shown above the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsBar {
    /// Living agents.
    pub agents: usize,
    /// Resources on the grid.
    pub resources: usize,
    /// Exits on the grid.
    pub exits: usize,
}

/// A classified log line ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// The line as received.
    pub text: String,
    /// Its category.
    pub category: LogCategory,
    /// How to draw it.
    pub style: LogStyle,
}

/// Complete layout for one published state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneLayout {
    /// Geometry the layout was computed with.
    pub geometry: GridGeometry,
    /// Occupancy layer, row-major, `size * size` entries.
    pub cells: Vec<CellContent>,
    /// Overlay sprites for living agents, in snapshot order.
    pub agents: Vec<AgentSprite>,
    /// Counters.
    pub stats: StatsBar,
    /// Log panel lines, oldest first.
    pub logs: Vec<LogLine>,
}

impl SceneLayout {
    /// Occupancy layer content at `(x, y)`, `None` off the grid.
    pub fn cell(&self, x: u16, y: u16) -> Option<&CellContent> {
        if x >= self.geometry.size || y >= self.geometry.size {
            return None;
        }
        let offset = usize::from(y)
            .saturating_mul(usize::from(self.geometry.size))
            .saturating_add(usize::from(x));
        self.cells.get(offset)
    }

    /// Overlay sprite for an agent.
    pub fn sprite(&self, id: &AgentId) -> Option<&AgentSprite> {
        self.agents.iter().find(|sprite| &sprite.id == id)
    }
}

/// Project a published state into a layout.
pub fn render(state: &DisplayState, geometry: &GridGeometry, palette: &LogPalette) -> SceneLayout {
    let snapshot = state.snapshot();
    let index = state.grid_index();
    let side = i32::from(geometry.size);

    let mut cells = Vec::with_capacity(geometry.cell_count());
    for y in 0..side {
        for x in 0..side {
            cells.push(index.get(x, y).clone());
        }
    }

    let agents = snapshot
        .live_agents()
        .map(|agent| AgentSprite::place(agent, geometry))
        .collect::<Vec<_>>();

    let logs = snapshot
        .logs
        .iter()
        .map(|text| {
            let category = classify(text);
            LogLine {
                text: text.clone(),
                category,
                style: palette.style(category).clone(),
            }
        })
        .collect();

    SceneLayout {
        geometry: *geometry,
        cells,
        stats: StatsBar {
            agents: agents.len(),
            resources: snapshot.resources.len(),
            exits: snapshot.exits.len(),
        },
        agents,
        logs,
    }
}
