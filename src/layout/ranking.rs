use std::collections::{HashMap, HashSet};

use super::adjacency::Adjacency;

/// Level of every reached node, plus each level's nodes in discovery order.
#[derive(Debug, Default)]
pub(crate) struct Levels<'a> {
    pub(crate) level_of: HashMap<&'a str, usize>,
    pub(crate) buckets: Vec<Vec<&'a str>>,
}

impl Levels<'_> {
    pub(crate) fn get(&self, id: &str) -> Option<usize> {
        self.level_of.get(id).copied()
    }
}

/// Breadth-first waves from `roots`. A node keeps the level of the first
/// wave that reaches it; later arrivals through cycles or re-convergent
/// paths are dropped by the visited check.
pub(crate) fn assign_levels<'a>(adjacency: &Adjacency<'a>, roots: Vec<&'a str>) -> Levels<'a> {
    let mut levels = Levels::default();
    let mut visited: HashSet<&'a str> = HashSet::new();
    let mut wave = roots;
    let mut level = 0usize;

    while !wave.is_empty() {
        let mut bucket = Vec::new();
        let mut next = Vec::new();
        for id in wave {
            if !visited.insert(id) {
                continue;
            }
            levels.level_of.insert(id, level);
            bucket.push(id);
            next.extend_from_slice(adjacency.successors(id));
        }
        // A wave with no new nodes has no successors queued either, so the
        // loop ends here and bucket indices stay equal to levels.
        if !bucket.is_empty() {
            levels.buckets.push(bucket);
        }
        wave = next;
        level += 1;
    }

    levels
}
