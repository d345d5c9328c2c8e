//! Grid Geometry - Key rectangles for the rendered key grid.
//!
//! The grid is a flexbox column of centered rows, one taffy leaf per key:
//!
//! ```text
//! root (column, align center)
//! ├── row (row, gap)  [1][2][3]...[⌫]
//! ├── row             [q][w][e]...
//! └── row             [◀][  Espacio  ][Enter][▶]
//! ```
//!
//! Key width comes from the label's display width plus padding, so the
//! labels drive the geometry the same way text content sizes a box.

use taffy::{
    AlignItems, AvailableSpace, Dimension, FlexDirection, JustifyContent, LengthPercentage, NodeId,
    Size, Style, TaffyError, TaffyTree,
};

use crate::state::KeyGrid;
use crate::types::Key;

use super::text_measure::string_width;

// =============================================================================
// Metrics
// =============================================================================

/// Cell metrics for laying out keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMetrics {
    /// Horizontal gap between keys.
    pub gap: u16,
    /// Vertical gap between rows.
    pub row_gap: u16,
    /// Padding on each side of a label.
    pub padding: u16,
    pub key_height: u16,
    pub space_min_width: u16,
}

impl GridMetrics {
    pub fn new(compact: bool) -> Self {
        if compact {
            Self { gap: 1, row_gap: 0, padding: 1, key_height: 1, space_min_width: 9 }
        } else {
            Self { gap: 2, row_gap: 1, padding: 1, key_height: 3, space_min_width: 15 }
        }
    }

    /// Width of the cap for `key` labelled `label`.
    pub fn key_width(&self, key: Key, label: &str) -> u16 {
        let width = string_width(label) + self.padding * 2;
        if key == Key::Space {
            width.max(self.space_min_width)
        } else {
            width
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// A positioned key cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRect {
    pub key: Key,
    pub label: String,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl KeyRect {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Computed positions for every key of a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLayout {
    pub keys: Vec<KeyRect>,
    /// Rendered row count, for callers that walk rows.
    pub rows: usize,
    pub width: u16,
    pub height: u16,
    /// True when the grid was built with shift active.
    pub shift: bool,
}

impl GridLayout {
    /// The key under a pointer position.
    pub fn key_at(&self, x: u16, y: u16) -> Option<&KeyRect> {
        self.keys.iter().find(|k| k.contains(x, y))
    }

    pub fn rect(&self, key: Key) -> Option<&KeyRect> {
        self.keys.iter().find(|k| k.key == key)
    }
}

// =============================================================================
// Computation
// =============================================================================

fn cells(n: u16) -> LengthPercentage {
    LengthPercentage::Length(n as f32)
}

fn round_cells(v: f32) -> u16 {
    v.round().max(0.0) as u16
}

/// Lay out `grid` centered within `available_width` columns.
pub fn compute_grid_layout(
    grid: &KeyGrid,
    metrics: GridMetrics,
    available_width: u16,
) -> Result<GridLayout, TaffyError> {
    let mut tree: TaffyTree<()> = TaffyTree::new();

    let key_style = |width: u16| Style {
        size: Size {
            width: Dimension::Length(width as f32),
            height: Dimension::Length(metrics.key_height as f32),
        },
        flex_shrink: 0.0,
        ..Default::default()
    };
    let row_style = Style {
        flex_direction: FlexDirection::Row,
        gap: Size { width: cells(metrics.gap), height: cells(0) },
        ..Default::default()
    };
    let root_style = Style {
        flex_direction: FlexDirection::Column,
        align_items: Some(AlignItems::Center),
        justify_content: Some(JustifyContent::FlexStart),
        gap: Size { width: cells(0), height: cells(metrics.row_gap) },
        size: Size {
            width: Dimension::Length(available_width as f32),
            height: Dimension::Auto,
        },
        ..Default::default()
    };

    // Rows of (node, key, label), kept to map results back
    let mut rows: Vec<(NodeId, Vec<(NodeId, Key, String)>)> = Vec::with_capacity(grid.rows.len());
    for row in &grid.rows {
        let mut leaves = Vec::with_capacity(row.len());
        for cap in row {
            let node = tree.new_leaf(key_style(metrics.key_width(cap.key, &cap.label)))?;
            leaves.push((node, cap.key, cap.label.clone()));
        }
        let children: Vec<NodeId> = leaves.iter().map(|(n, _, _)| *n).collect();
        let row_node = tree.new_with_children(row_style.clone(), &children)?;
        rows.push((row_node, leaves));
    }

    let row_nodes: Vec<NodeId> = rows.iter().map(|(n, _)| *n).collect();
    let root = tree.new_with_children(root_style, &row_nodes)?;
    tree.compute_layout(root, Size {
        width: AvailableSpace::Definite(available_width as f32),
        height: AvailableSpace::MaxContent,
    })?;

    let root_layout = tree.layout(root)?;
    let mut result = GridLayout {
        keys: Vec::new(),
        rows: rows.len(),
        width: round_cells(root_layout.size.width),
        height: round_cells(root_layout.size.height),
        shift: grid.shift,
    };

    for (row_node, leaves) in rows {
        let row_layout = tree.layout(row_node)?;
        let (row_x, row_y) = (row_layout.location.x, row_layout.location.y);
        for (node, key, label) in leaves {
            let layout = tree.layout(node)?;
            result.keys.push(KeyRect {
                key,
                label,
                x: round_cells(row_x + layout.location.x),
                y: round_cells(row_y + layout.location.y),
                width: round_cells(layout.size.width),
                height: round_cells(layout.size.height),
            });
        }
    }

    Ok(result)
}
