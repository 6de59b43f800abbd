//! Grid A* pathfinding
//!
//! Four orthogonal directions only, uniform edge cost, Manhattan
//! heuristic. Walkability comes from the composed world model, so the
//! search always agrees with the movement step about what is passable.
//!
//! An empty result is not an error: callers treat the goal as
//! temporarily unreachable and retry after a cooldown.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::core::types::Cell;
use crate::world::WorldMap;

const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Node in the A* open set
#[derive(Debug, Clone, Copy)]
struct PathNode {
    cell: Cell,
    /// g_cost + heuristic
    f_cost: u32,
    /// Monotone insertion counter; keeps equal-cost pops in insertion
    /// order so paths are reproducible across runs
    seq: u64,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.seq == other.seq
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for a min-heap; earlier insertion wins ties
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn manhattan(a: Cell, b: Cell) -> u32 {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Relocate a solid goal to the nearest walkable cell: four cardinal
/// probes per ring, radius 1..=5. Returns None when nothing in range is
/// walkable.
fn snap_goal(map: &WorldMap, goal: Cell) -> Option<Cell> {
    if cell_walkable(map, goal) {
        return Some(goal);
    }
    for r in 1..=5i32 {
        for (dx, dy) in [(-r, 0), (r, 0), (0, -r), (0, r)] {
            let candidate = (goal.0 + dx, goal.1 + dy);
            if cell_walkable(map, candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

#[inline]
fn cell_walkable(map: &WorldMap, cell: Cell) -> bool {
    map.is_walkable(cell.0 as f32 + 0.5, cell.1 as f32 + 0.5)
}

/// Find a path from `start` to `goal`.
///
/// The returned sequence excludes the start cell and ends at the
/// (possibly snapped) goal. Empty means unreachable, either because the
/// goal could not be snapped to a walkable cell or because the search
/// exhausted `max_expansions` pops without reaching it.
pub fn find_path(map: &WorldMap, start: Cell, goal: Cell, max_expansions: usize) -> Vec<Cell> {
    let Some(goal) = snap_goal(map, goal) else {
        return Vec::new();
    };
    if start == goal {
        return Vec::new();
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<Cell, Cell> = AHashMap::new();
    let mut g_scores: AHashMap<Cell, u32> = AHashMap::new();
    let mut seq: u64 = 0;

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        cell: start,
        f_cost: manhattan(start, goal),
        seq,
    });

    let mut expansions = 0;
    while let Some(current) = open_set.pop() {
        if current.cell == goal {
            return reconstruct_path(&came_from, current.cell, start);
        }
        expansions += 1;
        if expansions > max_expansions {
            break;
        }

        let current_g = *g_scores.get(&current.cell).unwrap_or(&u32::MAX);

        for (dx, dy) in DIRECTIONS {
            let neighbor = (current.cell.0 + dx, current.cell.1 + dy);
            if !cell_walkable(map, neighbor) {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.cell);
                g_scores.insert(neighbor, tentative_g);
                seq += 1;
                open_set.push(PathNode {
                    cell: neighbor,
                    f_cost: tentative_g + manhattan(neighbor, goal),
                    seq,
                });
            }
        }
    }

    Vec::new()
}

/// Walk the came-from chain back to the start, which is not included in
/// the returned path
fn reconstruct_path(came_from: &AHashMap<Cell, Cell>, mut current: Cell, start: Cell) -> Vec<Cell> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
