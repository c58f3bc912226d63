//! Taffy Bridge - Integration with Taffy layout engine
//!
//! Converts document elements to Taffy styles, runs layout computation,
//! and extracts results back to a [`ComputedLayout`].

use taffy::{
    AvailableSpace, Dimension as TaffyDimension, Display, FlexDirection, NodeId, Size, Style,
    TaffyTree,
};

use crate::engine::{Document, Element};
use crate::types::ElementId;

use super::types::{ComputedLayout, LINE_HEIGHT};

// =============================================================================
// STYLE BUILDING
// =============================================================================

/// Build a Taffy Style from an element box.
fn build_style(element: &Element) -> Style {
    Style {
        display: Display::Flex,
        flex_direction: if element.row {
            FlexDirection::Row
        } else {
            FlexDirection::Column
        },
        // Page content never shrinks to fit; the document scrolls instead.
        flex_shrink: 0.0,
        size: Size {
            width: TaffyDimension::Auto,
            height: match element.height {
                Some(px) => TaffyDimension::Length(px),
                None => TaffyDimension::Auto,
            },
        },
        ..Default::default()
    }
}

// =============================================================================
// TEXT MEASUREMENT
// =============================================================================

/// Measure function for leaves: one `LINE_HEIGHT` per line of text.
fn measure_text(
    lines: usize,
    known_dimensions: Size<Option<f32>>,
    available_space: Size<AvailableSpace>,
) -> Size<f32> {
    if lines == 0 {
        return Size::ZERO;
    }

    let width = match available_space.width {
        AvailableSpace::Definite(w) => w,
        AvailableSpace::MinContent | AvailableSpace::MaxContent => 0.0,
    };

    Size {
        width: known_dimensions.width.unwrap_or(width),
        height: known_dimensions.height.unwrap_or(lines as f32 * LINE_HEIGHT),
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Compute layout for every element of `doc` at the given viewport width.
pub fn compute_layout(doc: &Document, viewport_width: f32) -> ComputedLayout {
    let elements = doc.elements();
    let mut result = ComputedLayout::with_capacity(elements.len());

    // Context: (arena index, line count) so the measure fn never touches `doc`.
    let mut tree: TaffyTree<(usize, usize)> = TaffyTree::new();
    let mut nodes: Vec<Option<NodeId>> = Vec::with_capacity(elements.len());

    // First pass: create all nodes (without children)
    for (idx, element) in elements.iter().enumerate() {
        let context = (idx, element.line_count());
        nodes.push(tree.new_leaf_with_context(build_style(element), context).ok());
    }

    // Second pass: parent-child relationships, in child order
    for (idx, element) in elements.iter().enumerate() {
        let Some(parent_node) = nodes[idx] else {
            continue;
        };
        for child in &element.children {
            if let Some(Some(child_node)) = nodes.get(child.0) {
                let _ = tree.add_child(parent_node, *child_node);
            }
        }
    }

    let Some(Some(root)) = nodes.get(doc.body().0).copied() else {
        return result;
    };

    let available = Size {
        width: AvailableSpace::Definite(viewport_width),
        height: AvailableSpace::MaxContent,
    };

    let mut measure_fn = |known_dimensions: Size<Option<f32>>,
                          available_space: Size<AvailableSpace>,
                          _node_id: NodeId,
                          context: Option<&mut (usize, usize)>,
                          _style: &Style| {
        match context {
            // Only leaves are measured; containers size from children.
            Some(&mut (idx, lines)) if elements[idx].children.is_empty() => {
                measure_text(lines, known_dimensions, available_space)
            }
            _ => Size::ZERO,
        }
    };

    if tree
        .compute_layout_with_measure(root, available, &mut measure_fn)
        .is_err()
    {
        return result;
    }

    // Extract results: taffy locations are parent-relative, accumulate in
    // document order so parents are always resolved first.
    for el in doc.descendants(doc.body()) {
        let Some(Some(node)) = nodes.get(el.0).copied() else {
            continue;
        };
        let Ok(layout) = tree.layout(node) else {
            continue;
        };
        let parent_top = elements[el.0]
            .parent
            .map(|ElementId(p)| result.top[p])
            .unwrap_or(0.0);
        result.top[el.0] = parent_top + layout.location.y;
        result.height[el.0] = layout.size.height;
    }

    result.content_height = result.height[doc.body().0];
    result
}
