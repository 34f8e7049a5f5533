//! TITAN Layout Engine
//!
//! Flexbox layout over integer cells using parallel working arrays.
//!
//! # Algorithm
//!
//! 1. **Pass 1**: Flatten the node tree breadth-first. A node's children
//!    end up contiguous, so a child list is just a range.
//! 2. **Pass 2**: Estimate each node's available content width (top-down),
//!    so wrapped text can report a sensible height.
//! 3. **Pass 3**: Measure intrinsic sizes (bottom-up, leaf → root).
//! 4. **Pass 4**: Distribute (top-down, root → leaf): flex lines, grow/shrink
//!    with min/max freezing, largest-remainder rounding, justify, align.
//! 5. **Pass 5**: Assemble the [`LayoutNode`] tree.
//!
//! All sizes are `u16` cells. Bad inputs (negative, NaN, oversized) clamp;
//! nothing here fails.

use std::cell::RefCell;
use std::ops::Range;

use crate::primitives::{Node, NodeKind, Props};
use crate::types::{AlignItems, Dimension, FlexDirection, FlexWrap, JustifyContent, Rect, TextWrap};

use super::text_measure::{max_line_width, string_width, strip_ansi, wrap_text};
use super::types::LayoutNode;

// =============================================================================
// WORKING ARRAYS (thread-local for reuse)
// =============================================================================

#[derive(Default)]
struct Working {
    parent: Vec<i32>,
    child_start: Vec<usize>,
    child_count: Vec<usize>,

    // Estimated content width, for wrapping text during measure
    avail_w: Vec<u16>,

    // Intrinsic border-box sizes
    intrinsic_w: Vec<u16>,
    intrinsic_h: Vec<u16>,

    // Output
    out_x: Vec<u16>,
    out_y: Vec<u16>,
    out_w: Vec<u16>,
    out_h: Vec<u16>,
}

impl Working {
    fn clear(&mut self) {
        self.parent.clear();
        self.child_start.clear();
        self.child_count.clear();
        self.avail_w.clear();
        self.intrinsic_w.clear();
        self.intrinsic_h.clear();
        self.out_x.clear();
        self.out_y.clear();
        self.out_w.clear();
        self.out_h.clear();
    }

    fn push(&mut self, parent: i32) {
        self.parent.push(parent);
        self.child_start.push(0);
        self.child_count.push(0);
        self.avail_w.push(0);
        self.intrinsic_w.push(0);
        self.intrinsic_h.push(0);
        self.out_x.push(0);
        self.out_y.push(0);
        self.out_w.push(0);
        self.out_h.push(0);
    }

    fn children(&self, i: usize) -> Range<usize> {
        self.child_start[i]..self.child_start[i] + self.child_count[i]
    }
}

thread_local! {
    static WORKING: RefCell<Working> = RefCell::new(Working::default());
}

/// Free the working arrays.
///
/// They are kept between calls to avoid reallocating every frame.
pub fn reset_titan_arrays() {
    WORKING.with(|w| *w.borrow_mut() = Working::default());
}

// =============================================================================
// DIMENSION RESOLUTION
// =============================================================================

fn percent_of(percent: f32, size: u16) -> u16 {
    if !percent.is_finite() || percent <= 0.0 {
        return 0;
    }
    (size as f64 * percent as f64 / 100.0).floor().min(u16::MAX as f64) as u16
}

/// Resolve against a definite parent size. Unset and `Auto` yield None.
fn resolve_dimension(dim: Option<Dimension>, parent_size: u16) -> Option<u16> {
    match dim? {
        Dimension::Auto => None,
        Dimension::Cells(n) => Some(n),
        Dimension::Percent(p) => Some(percent_of(p, parent_size)),
    }
}

/// Measure-time resolution: only absolute sizes are known yet.
fn cells_only(dim: Option<Dimension>) -> Option<u16> {
    match dim {
        Some(Dimension::Cells(n)) => Some(n),
        _ => None,
    }
}

fn is_percent(dim: Option<Dimension>) -> bool {
    matches!(dim, Some(Dimension::Percent(_)))
}

/// Apply min/max constraints. Min wins over a smaller max.
fn clamp_dimension(value: u16, min: Option<u16>, max: Option<u16>) -> u16 {
    let mut result = value;
    if let Some(max) = max {
        result = result.min(max);
    }
    if let Some(min) = min {
        result = result.max(min);
    }
    result
}

fn to_cells(n: usize) -> u16 {
    n.min(u16::MAX as usize) as u16
}

fn to_coord(n: i64) -> u16 {
    n.clamp(0, u16::MAX as i64) as u16
}

/// Round so the parts sum to the rounded total, giving leftover cells to the
/// largest fractional parts first (lower index wins ties).
fn round_largest_remainder(values: &[f64]) -> Vec<u16> {
    let total = values.iter().sum::<f64>().round();
    let mut floors: Vec<f64> = values.iter().map(|v| v.floor()).collect();
    let mut shortfall = (total - floors.iter().sum::<f64>()) as i64;

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| (values[b] - floors[b]).total_cmp(&(values[a] - floors[a])));

    for &k in &order {
        if shortfall <= 0 {
            break;
        }
        floors[k] += 1.0;
        shortfall -= 1;
    }

    floors.into_iter().map(|v| v.clamp(0.0, u16::MAX as f64) as u16).collect()
}

/// Text size in cells: (width, height) of the content box.
fn measure_text(text: &str, props: &Props, avail: u16) -> (u16, u16) {
    let text = strip_ansi(text);
    let text = text.as_ref();
    match props.text_wrap.unwrap_or_default() {
        TextWrap::Wrap => {
            let lines = wrap_text(text, avail as usize);
            let w = lines.iter().map(|l| string_width(l)).max().unwrap_or(0);
            (to_cells(w), to_cells(lines.len()))
        }
        TextWrap::NoWrap => {
            let lines = if text.is_empty() { 0 } else { text.split('\n').count() };
            (to_cells(max_line_width(text)), to_cells(lines))
        }
        // Only the first line is ever drawn.
        TextWrap::Truncate => {
            let first = text.lines().next().unwrap_or("");
            (to_cells(string_width(first)), u16::from(!text.is_empty()))
        }
    }
}

// =============================================================================
// FLEX ITEMS
// =============================================================================

#[derive(Debug, Clone)]
struct Item {
    index: usize,
    /// Flex base size, before min/max.
    base: f64,
    /// Base clamped to min/max.
    hypothetical: u16,
    min_main: u16,
    max_main: u16,
    grow: f32,
    shrink: f32,
    /// (leading, trailing) in flow order.
    margin_main: (u16, u16),
    margin_cross: (u16, u16),
    align: AlignItems,
    explicit_cross: Option<u16>,
    min_cross: Option<u16>,
    max_cross: Option<u16>,
    main: u16,
    cross: u16,
}

impl Item {
    fn outer_hypothetical(&self) -> u32 {
        self.hypothetical as u32 + self.margin_main.0 as u32 + self.margin_main.1 as u32
    }

    fn outer_main(&self) -> u32 {
        self.main as u32 + self.margin_main.0 as u32 + self.margin_main.1 as u32
    }

    fn cross_margins(&self) -> u16 {
        self.margin_cross.0.saturating_add(self.margin_cross.1)
    }
}

/// Greedy line breaking. Without wrapping everything is one line.
fn collect_lines(items: &[Item], wrap: FlexWrap, main_size: u16, gap: u16) -> Vec<Range<usize>> {
    if wrap == FlexWrap::NoWrap || items.is_empty() {
        return vec![0..items.len()];
    }

    let mut lines = Vec::new();
    let mut start = 0;
    let mut used: u32 = 0;
    for (k, item) in items.iter().enumerate() {
        let outer = item.outer_hypothetical();
        if k == start {
            used = outer;
        } else if used + gap as u32 + outer > main_size as u32 {
            lines.push(start..k);
            start = k;
            used = outer;
        } else {
            used += gap as u32 + outer;
        }
    }
    lines.push(start..items.len());
    lines
}

/// Share a line's free space by grow (or shrink × base), freezing items that
/// hit min/max and redistributing until nothing violates.
fn resolve_flexible_lengths(items: &mut [Item], main_size: u16, gap: u16) {
    let n = items.len();
    if n == 0 {
        return;
    }

    let margins: f64 = items.iter().map(|it| it.margin_main.0 as f64 + it.margin_main.1 as f64).sum();
    let gaps = gap as f64 * (n - 1) as f64;
    let avail = main_size as f64 - margins - gaps;
    let used: f64 = items.iter().map(|it| it.hypothetical as f64).sum();
    let free = avail - used;
    let growing = free > 0.0;

    let flexible = |it: &Item| if growing { it.grow > 0.0 } else { it.shrink > 0.0 };
    if free == 0.0 || !items.iter().any(flexible) {
        for it in items.iter_mut() {
            it.main = it.hypothetical;
        }
        return;
    }

    let mut target: Vec<f64> = items.iter().map(|it| it.hypothetical as f64).collect();
    let mut frozen: Vec<bool> = items.iter().map(|it| !flexible(it)).collect();
    let weights: Vec<f64> = items
        .iter()
        .map(|it| if growing { it.grow as f64 } else { it.shrink as f64 * it.base })
        .collect();

    loop {
        let frozen_used: f64 = (0..n).filter(|&k| frozen[k]).map(|k| target[k]).sum();
        let base_used: f64 = (0..n).filter(|&k| !frozen[k]).map(|k| items[k].base).sum();
        let total_weight: f64 = (0..n).filter(|&k| !frozen[k]).map(|k| weights[k]).sum();
        let remaining = avail - frozen_used - base_used;

        let mut violation = 0.0;
        let mut clamped = target.clone();
        for k in (0..n).filter(|&k| !frozen[k]) {
            let t = if total_weight > 0.0 {
                items[k].base + remaining * weights[k] / total_weight
            } else {
                items[k].base
            };
            target[k] = t;
            clamped[k] = t.clamp(items[k].min_main as f64, items[k].max_main as f64);
            violation += clamped[k] - t;
        }

        if violation.abs() < 1e-9 {
            target = clamped;
            break;
        }

        for k in 0..n {
            if frozen[k] {
                continue;
            }
            let over = clamped[k] - target[k];
            if (violation > 0.0 && over > 0.0) || (violation < 0.0 && over < 0.0) {
                frozen[k] = true;
                target[k] = clamped[k];
            }
        }
        if frozen.iter().all(|f| *f) {
            target = clamped;
            break;
        }
    }

    for (it, size) in items.iter_mut().zip(round_largest_remainder(&target)) {
        it.main = size;
    }
}

/// Offset added to item `k` of `n` for a line with `remaining` free cells.
fn justify_offset(justify: JustifyContent, remaining: u32, k: usize, n: usize) -> u32 {
    let remaining = remaining as u64;
    let (k, n) = (k as u64, n as u64);
    let offset = match justify {
        JustifyContent::FlexStart => 0,
        JustifyContent::Center => remaining / 2,
        JustifyContent::FlexEnd => remaining,
        JustifyContent::SpaceBetween if n > 1 => remaining * k / (n - 1),
        JustifyContent::SpaceBetween => 0,
        JustifyContent::SpaceAround => remaining * (2 * k + 1) / (2 * n),
        JustifyContent::SpaceEvenly => remaining * (k + 1) / (n + 1),
    };
    offset as u32
}

// =============================================================================
// TITAN
// =============================================================================

struct Titan<'a> {
    nodes: Vec<&'a Node>,
    w: Working,
}

impl<'a> Titan<'a> {
    fn props(&self, i: usize) -> &'a Props {
        &self.nodes[i].props
    }

    fn text(&self, i: usize) -> Option<&'a str> {
        match &self.nodes[i].kind {
            NodeKind::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    // =========================================================================
    // PASS 1: Flatten
    // =========================================================================

    fn flatten(&mut self, root: &'a Node) {
        self.nodes.push(root);
        self.w.push(-1);

        let mut head = 0;
        while head < self.nodes.len() {
            let i = head;
            head += 1;

            let node = self.nodes[i];
            if matches!(node.kind, NodeKind::Text(_)) {
                continue;
            }
            self.w.child_start[i] = self.nodes.len();
            self.w.child_count[i] = node.children.len();
            for child in &node.children {
                self.nodes.push(child);
                self.w.push(i as i32);
            }
        }
    }

    // =========================================================================
    // PASS 2: Available width estimate (top-down)
    // =========================================================================

    fn estimate_widths(&mut self, terminal_width: u16) {
        for i in 0..self.nodes.len() {
            let props = self.props(i);
            let (outer, margins) = match self.w.parent[i] {
                p if p < 0 => (terminal_width, 0),
                p => {
                    let (_, mr, _, ml) = props.margins();
                    (self.w.avail_w[p as usize], ml.saturating_add(mr))
                }
            };
            let own = resolve_dimension(props.width, outer).unwrap_or(outer.saturating_sub(margins));
            let own = clamp_dimension(
                own,
                resolve_dimension(props.min_width, outer),
                resolve_dimension(props.max_width, outer),
            );
            let (_, r, _, l) = props.inset();
            self.w.avail_w[i] = own.saturating_sub(l.saturating_add(r));
        }
    }

    // =========================================================================
    // PASS 3: Measure intrinsic sizes (bottom-up)
    // =========================================================================

    fn measure(&mut self) {
        for i in (0..self.nodes.len()).rev() {
            let props = self.props(i);
            let (t, r, b, l) = props.inset();

            let (content_w, content_h) = match self.text(i) {
                Some(text) => measure_text(text, props, self.w.avail_w[i]),
                None => self.measure_children(i),
            };

            let w = cells_only(props.width)
                .unwrap_or(content_w.saturating_add(l).saturating_add(r));
            let h = cells_only(props.height)
                .unwrap_or(content_h.saturating_add(t).saturating_add(b));

            self.w.intrinsic_w[i] =
                clamp_dimension(w, cells_only(props.min_width), cells_only(props.max_width));
            self.w.intrinsic_h[i] =
                clamp_dimension(h, cells_only(props.min_height), cells_only(props.max_height));
        }
    }

    /// Content size of a box from its children's intrinsic sizes.
    fn measure_children(&self, i: usize) -> (u16, u16) {
        let range = self.w.children(i);
        if range.is_empty() {
            return (0, 0);
        }

        let props = self.props(i);
        let is_row = props.flex_direction.unwrap_or_default().is_row();
        let gap = props.gap.unwrap_or(0) as u32;
        let wraps = props.flex_wrap.unwrap_or_default() != FlexWrap::NoWrap;
        let limit = match (wraps, is_row) {
            (false, _) => None,
            (true, true) => Some(self.w.avail_w[i] as u32),
            (true, false) => cells_only(props.height).map(|h| {
                let (t, _, b, _) = props.inset();
                h.saturating_sub(t.saturating_add(b)) as u32
            }),
        };

        let mut main_max: u32 = 0;
        let mut cross_total: u32 = 0;
        let mut line_main: u32 = 0;
        let mut line_cross: u32 = 0;
        let mut line_len = 0usize;
        let mut line_count = 0u32;

        for c in range {
            let cp = self.props(c);
            let (mt, mr, mb, ml) = cp.margins();
            let w = if is_percent(cp.width) { 0 } else { self.w.intrinsic_w[c] as u32 };
            let h = if is_percent(cp.height) { 0 } else { self.w.intrinsic_h[c] as u32 };
            let w = w + ml as u32 + mr as u32;
            let h = h + mt as u32 + mb as u32;
            let (m, x) = if is_row { (w, h) } else { (h, w) };

            if let Some(limit) = limit {
                if line_len > 0 && line_main + gap + m > limit {
                    main_max = main_max.max(line_main);
                    cross_total += line_cross + if line_count > 0 { gap } else { 0 };
                    line_count += 1;
                    line_main = 0;
                    line_cross = 0;
                    line_len = 0;
                }
            }

            line_main = if line_len == 0 { m } else { line_main + gap + m };
            line_cross = line_cross.max(x);
            line_len += 1;
        }
        main_max = main_max.max(line_main);
        cross_total += line_cross + if line_count > 0 { gap } else { 0 };

        let main = main_max.min(u16::MAX as u32) as u16;
        let cross = cross_total.min(u16::MAX as u32) as u16;
        if is_row { (main, cross) } else { (cross, main) }
    }

    /// Border-box height of a text node laid out `outer_w` cells wide.
    fn text_outer_height(&self, i: usize, outer_w: u16) -> u16 {
        let props = self.props(i);
        let (t, r, b, l) = props.inset();
        let inner = outer_w.saturating_sub(l.saturating_add(r));
        let content = self.text(i).map(|s| measure_text(s, props, inner).1).unwrap_or(0);
        let h = cells_only(props.height).unwrap_or(content.saturating_add(t).saturating_add(b));
        clamp_dimension(h, cells_only(props.min_height), cells_only(props.max_height))
    }

    // =========================================================================
    // PASS 4: Distribute (top-down)
    // =========================================================================

    fn layout_root(&mut self, terminal_width: u16, terminal_height: u16, constrain_height: bool) {
        let props = self.props(0);

        let w = resolve_dimension(props.width, terminal_width).unwrap_or(terminal_width);
        let w = clamp_dimension(
            w,
            resolve_dimension(props.min_width, terminal_width),
            resolve_dimension(props.max_width, terminal_width),
        );

        let h = match resolve_dimension(props.height, terminal_height) {
            Some(h) => h,
            None if constrain_height => terminal_height,
            None => self.w.intrinsic_h[0],
        };
        let h = clamp_dimension(
            h,
            resolve_dimension(props.min_height, terminal_height),
            resolve_dimension(props.max_height, terminal_height),
        );

        self.w.out_x[0] = 0;
        self.w.out_y[0] = 0;
        self.w.out_w[0] = w;
        self.w.out_h[0] = h;
    }

    fn flex_item(
        &self,
        c: usize,
        dir: FlexDirection,
        main_size: u16,
        cross_size: u16,
        align: AlignItems,
    ) -> Item {
        let cp = self.props(c);
        let is_row = dir.is_row();
        let (mt, mr, mb, ml) = cp.margins();

        let margin_main = match (is_row, dir.is_reverse()) {
            (true, false) => (ml, mr),
            (true, true) => (mr, ml),
            (false, false) => (mt, mb),
            (false, true) => (mb, mt),
        };
        let margin_cross = if is_row { (mt, mb) } else { (ml, mr) };

        let (main_dim, min_main_dim, max_main_dim) = if is_row {
            (cp.width, cp.min_width, cp.max_width)
        } else {
            (cp.height, cp.min_height, cp.max_height)
        };
        let (cross_dim, min_cross_dim, max_cross_dim) = if is_row {
            (cp.height, cp.min_height, cp.max_height)
        } else {
            (cp.width, cp.min_width, cp.max_width)
        };

        let item_align = cp.align_self.unwrap_or_default().resolve(align);
        let explicit_cross = resolve_dimension(cross_dim, cross_size);
        let min_cross = resolve_dimension(min_cross_dim, cross_size);
        let max_cross = resolve_dimension(max_cross_dim, cross_size);
        let min_main = resolve_dimension(min_main_dim, main_size).unwrap_or(0);
        let max_main = resolve_dimension(max_main_dim, main_size).unwrap_or(u16::MAX).max(min_main);
        let grow = cp.grow();
        let cross_room = cross_size.saturating_sub(margin_cross.0.saturating_add(margin_cross.1));

        let base = match cp.flex_basis {
            Some(Dimension::Cells(n)) => n,
            Some(Dimension::Percent(p)) => percent_of(p, main_size),
            _ => match resolve_dimension(main_dim, main_size) {
                Some(v) => v,
                None if grow > 0.0 => 0,
                None if is_row => self.w.intrinsic_w[c],
                None if self.text(c).is_some() => {
                    // Column text: height depends on the width it will get.
                    let width = explicit_cross.unwrap_or(if item_align == AlignItems::Stretch {
                        cross_room
                    } else {
                        self.w.intrinsic_w[c].min(cross_room)
                    });
                    self.text_outer_height(c, clamp_dimension(width, min_cross, max_cross))
                }
                None => self.w.intrinsic_h[c],
            },
        };

        Item {
            index: c,
            base: base as f64,
            hypothetical: base.clamp(min_main, max_main),
            min_main,
            max_main,
            grow,
            shrink: cp.shrink(),
            margin_main,
            margin_cross,
            align: item_align,
            explicit_cross,
            min_cross,
            max_cross,
            main: 0,
            cross: 0,
        }
    }

    /// Cross size an item wants before stretching.
    fn hypothetical_cross(&self, item: &Item, is_row: bool, cross_size: u16) -> u16 {
        let content = if let Some(v) = item.explicit_cross {
            v
        } else if is_row {
            match self.text(item.index) {
                Some(_) => self.text_outer_height(item.index, item.main),
                None => self.w.intrinsic_h[item.index],
            }
        } else {
            match self.text(item.index) {
                Some(_) => self.w.intrinsic_w[item.index]
                    .min(cross_size.saturating_sub(item.cross_margins())),
                None => self.w.intrinsic_w[item.index],
            }
        };
        clamp_dimension(content, item.min_cross, item.max_cross)
    }

    /// Layout children of a single parent.
    fn layout_children(&mut self, parent: usize) {
        let range = self.w.children(parent);
        if range.is_empty() {
            return;
        }

        let props = self.props(parent);
        let (t, r, b, l) = props.inset();
        let content = Rect::new(
            self.w.out_x[parent].saturating_add(l),
            self.w.out_y[parent].saturating_add(t),
            self.w.out_w[parent].saturating_sub(l.saturating_add(r)),
            self.w.out_h[parent].saturating_sub(t.saturating_add(b)),
        );

        let dir = props.flex_direction.unwrap_or_default();
        let wrap = props.flex_wrap.unwrap_or_default();
        let justify = props.justify_content.unwrap_or_default();
        let align = props.align_items.unwrap_or_default();
        let gap = props.gap.unwrap_or(0);

        let is_row = dir.is_row();
        let (main_size, cross_size) = if is_row {
            (content.width, content.height)
        } else {
            (content.height, content.width)
        };

        // =====================================================================
        // Step 1: Items and flex lines
        // =====================================================================

        let mut items: Vec<Item> = range
            .map(|c| self.flex_item(c, dir, main_size, cross_size, align))
            .collect();
        let lines = collect_lines(&items, wrap, main_size, gap);

        // =====================================================================
        // Step 2: Main sizes per line
        // =====================================================================

        for line in &lines {
            resolve_flexible_lengths(&mut items[line.clone()], main_size, gap);
        }

        // =====================================================================
        // Step 3: Cross sizes
        // =====================================================================

        let hypothetical: Vec<u16> = items
            .iter()
            .map(|item| self.hypothetical_cross(item, is_row, cross_size))
            .collect();

        let line_cross: Vec<u16> = if wrap == FlexWrap::NoWrap {
            vec![cross_size]
        } else {
            lines
                .iter()
                .map(|line| {
                    line.clone()
                        .map(|k| hypothetical[k].saturating_add(items[k].cross_margins()))
                        .max()
                        .unwrap_or(0)
                })
                .collect()
        };

        for line_index in 0..lines.len() {
            for k in lines[line_index].clone() {
                let item = &mut items[k];
                item.cross = if item.explicit_cross.is_none() && item.align == AlignItems::Stretch {
                    let room = line_cross[line_index].saturating_sub(item.cross_margins());
                    clamp_dimension(room, item.min_cross, item.max_cross)
                } else {
                    hypothetical[k]
                };
            }
        }

        // =====================================================================
        // Step 4: Position items
        // =====================================================================

        let reverse = dir.is_reverse();
        let mut line_offset: i64 = 0;

        for (line_index, line) in lines.iter().enumerate() {
            let this_cross = line_cross[line_index];
            let n = line.len();
            let used: u32 = items[line.clone()].iter().map(Item::outer_main).sum::<u32>()
                + gap as u32 * n.saturating_sub(1) as u32;
            let remaining = (main_size as u32).saturating_sub(used);

            let line_start = if wrap == FlexWrap::WrapReverse {
                cross_size as i64 - (line_offset + this_cross as i64)
            } else {
                line_offset
            };

            let mut cursor: i64 = 0;
            for (k, item) in items[line.clone()].iter().enumerate() {
                let shift = justify_offset(justify, remaining, k, n) as i64;
                let main_start = cursor + shift + item.margin_main.0 as i64;
                cursor += item.outer_main() as i64 + gap as i64;

                let outer_cross = item.cross.saturating_add(item.cross_margins());
                let align_shift = match item.align {
                    AlignItems::Center => this_cross.saturating_sub(outer_cross) / 2,
                    AlignItems::FlexEnd => this_cross.saturating_sub(outer_cross),
                    AlignItems::Stretch | AlignItems::FlexStart => 0,
                } as i64;

                let main_pos = if reverse {
                    main_size as i64 - (main_start + item.main as i64)
                } else {
                    main_start
                };
                let cross_pos = line_start + align_shift + item.margin_cross.0 as i64;

                let c = item.index;
                if is_row {
                    self.w.out_x[c] = to_coord(content.x as i64 + main_pos);
                    self.w.out_y[c] = to_coord(content.y as i64 + cross_pos);
                    self.w.out_w[c] = item.main;
                    self.w.out_h[c] = item.cross;
                } else {
                    self.w.out_x[c] = to_coord(content.x as i64 + cross_pos);
                    self.w.out_y[c] = to_coord(content.y as i64 + main_pos);
                    self.w.out_w[c] = item.cross;
                    self.w.out_h[c] = item.main;
                }
            }

            line_offset += this_cross as i64 + gap as i64;
        }
    }

    // =========================================================================
    // PASS 5: Assemble output tree
    // =========================================================================

    fn build(&self, i: usize) -> LayoutNode {
        let (t, r, b, l) = self.props(i).inset();
        let (x, y, width, height) = (self.w.out_x[i], self.w.out_y[i], self.w.out_w[i], self.w.out_h[i]);
        LayoutNode {
            x,
            y,
            width,
            height,
            content: Rect::new(
                x.saturating_add(l),
                y.saturating_add(t),
                width.saturating_sub(l.saturating_add(r)),
                height.saturating_sub(t.saturating_add(b)),
            ),
            children: self.w.children(i).map(|c| self.build(c)).collect(),
        }
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Compute layout for a node tree.
///
/// # Arguments
///
/// * `root` - Tree to lay out; the root is placed at (0, 0)
/// * `terminal_width` - Available width in terminal columns
/// * `terminal_height` - Available height in terminal rows
/// * `constrain_height` - If true, an auto-height root fills the terminal
///   height (fullscreen); otherwise it takes its content height
pub fn compute_layout(
    root: &Node,
    terminal_width: u16,
    terminal_height: u16,
    constrain_height: bool,
) -> LayoutNode {
    let mut work = WORKING.with(|w| std::mem::take(&mut *w.borrow_mut()));
    work.clear();

    let mut titan = Titan { nodes: Vec::new(), w: work };
    titan.flatten(root);
    titan.estimate_widths(terminal_width);
    titan.measure();
    titan.layout_root(terminal_width, terminal_height, constrain_height);
    for parent in 0..titan.nodes.len() {
        titan.layout_children(parent);
    }
    let layout = titan.build(0);

    tracing::trace!(
        nodes = titan.nodes.len(),
        width = layout.width,
        height = layout.height,
        "layout computed"
    );

    let work = titan.w;
    WORKING.with(|w| *w.borrow_mut() = work);
    layout
}
