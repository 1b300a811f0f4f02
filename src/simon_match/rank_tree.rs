use std::collections::HashMap;

use crate::Interval;
use crate::shortlex::ShortlexResult;

use super::rank_table::RankTable;

pub type NodeId = usize;

/// A node of a rank tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankNode {
  /// the position reached after seeing every pattern symbol once more, in the tree's direction
  pub key: usize,
  /// the position reached after additionally projecting the residual stack form from `key`
  pub register: usize,
  /// the positions owned by this node, i.e. whose key is `key`
  pub children: Interval,
  /// the node owning `key` (None if that is the root)
  pub parent: Option<NodeId>,
}

/// Index over one fragment, mapping every position to the node of the arch starting (*forward*) or
/// ending (backward) there. Positions from which the pattern alphabet is not fully visible belong
/// to the root, which is implicit.
pub struct RankTree {
  forward: bool,
  /// positions owned by the root
  root_children: Interval,
  /// arena in creation order
  nodes: Vec<RankNode>,
  by_key: HashMap<usize, NodeId>,
  owner: Vec<Option<NodeId>>,
}

// the characters of the pattern's normal form left after removing its first `universality` arches,
// from the left (*forward*) or from the right
// returns the blocks in the order they are consumed
pub fn residual_stack_form(pattern: &ShortlexResult, universality: usize, forward: bool) -> Vec<Vec<usize>> {
  let len = pattern.symbols.len();
  let cut = match universality.checked_sub(1) {
    None => if forward { 0 } else { len },
    Some(last) if forward => pattern.arch_ends.get(last).copied().unwrap_or(len),
    Some(last) => {
      let reversed: Vec<usize> = pattern.symbols.iter().rev().copied().collect();
      let ends = crate::common::arch_ends(&reversed, pattern.alphabet_used.len());
      len - ends.get(last).copied().unwrap_or(len)
    }
  };

  let mut res = vec![];
  let mut start = 0;
  for block in pattern.blocks() {
    let kept: Vec<usize> = block.iter().enumerate()
      .filter(|(j, _)| if forward { start + j >= cut } else { start + j < cut })
      .map(|(_, &a)| a)
      .collect();
    start += block.len();
    if !kept.is_empty() {
      res.push(kept);
    }
  }
  if !forward {
    res.reverse();
  }
  res
}

impl RankTree {
  // runtime O(n * sigma + nodes * |pattern| * sigma)
  pub fn build(table: &RankTable, pattern: &ShortlexResult, universality: usize, forward: bool) -> Self {
    let len = table.len();
    let residual = residual_stack_form(pattern, universality, forward);
    let edge = if forward { len } else { 0 };
    let mut tree = RankTree {
      forward,
      root_children: Interval::new(edge, edge),
      nodes: vec![],
      by_key: HashMap::new(),
      owner: vec![None; len + 1],
    };

    let positions: Vec<usize> = if forward { (0..=len).collect() } else { (0..=len).rev().collect() };
    for i in positions {
      let key = if forward { table.forward_key(i) } else { table.backward_key(i) };
      let Some(key) = key else {
        tree.root_children = extend(tree.root_children, i);
        continue;
      };
      let id = match tree.by_key.get(&key) {
        Some(&id) => id,
        None => {
          let register = resolve_register(table, key, &residual, forward);
          tree.nodes.push(RankNode { key, register, children: Interval::new(i, i), parent: None });
          tree.by_key.insert(key, tree.nodes.len() - 1);
          tree.nodes.len() - 1
        }
      };
      tree.nodes[id].children = extend(tree.nodes[id].children, i);
      tree.owner[i] = Some(id);
    }

    // a node hangs below the owner of its key, nodes whose key is owned by the root are top level
    for id in 0..tree.nodes.len() {
      let key = tree.nodes[id].key;
      tree.nodes[id].parent = tree.owner[key];
    }
    tree
  }

  pub fn is_forward(&self) -> bool {
    self.forward
  }

  pub fn node(&self, id: NodeId) -> &RankNode {
    &self.nodes[id]
  }

  // all nodes except the root, in creation order
  pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &RankNode)> {
    self.nodes.iter().enumerate()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn root_children(&self) -> Interval {
    self.root_children
  }

  // the node owning position i, None for the root
  pub fn owner(&self, i: usize) -> Option<NodeId> {
    self.owner[i]
  }

  // `from` followed by its next `hops` ancestors
  // None if the root is reached on the way
  pub fn ancestors(&self, from: NodeId, hops: usize) -> Option<Vec<NodeId>> {
    let mut res = Vec::with_capacity(hops + 1);
    res.push(from);
    let mut current = from;
    for _ in 0..hops {
      current = self.nodes[current].parent?;
      res.push(current);
    }
    Some(res)
  }

  /// Pre-order traversal with an explicit stack. `visit` gets the depth and the node, None for the root.
  pub fn render(&self, mut visit: impl FnMut(usize, Option<&RankNode>)) {
    let mut children: Vec<Vec<NodeId>> = vec![vec![]; self.nodes.len()];
    let mut top = vec![];
    for (id, node) in self.nodes() {
      match node.parent {
        Some(parent) => children[parent].push(id),
        None => top.push(id),
      }
    }

    visit(0, None);
    let mut stack: Vec<(usize, NodeId)> = top.iter().rev().map(|&id| (1, id)).collect();
    while let Some((depth, id)) = stack.pop() {
      visit(depth, Some(&self.nodes[id]));
      stack.extend(children[id].iter().rev().map(|&child| (depth + 1, child)));
    }
  }

  pub fn to_text(&self) -> String {
    let mut res = String::new();
    self.render(|depth, node| {
      let line = match node {
        None => format!("root {}", self.root_children()),
        Some(node) => format!("key {} r {} {}", node.key, node.register, node.children),
      };
      res.push_str(&"  ".repeat(depth));
      res.push_str(&line);
      res.push('\n');
    });
    res
  }
}

fn extend(interval: Interval, i: usize) -> Interval {
  Interval::new(interval.start.min(i), interval.end.max(i))
}

// projects the residual stack form from `key`, always taking the nearest symbol of the current block
// stops with the register frozen at its last valid value once a symbol cannot be found
fn resolve_register(table: &RankTable, key: usize, residual: &[Vec<usize>], forward: bool) -> usize {
  let mut register = key;
  for block in residual {
    let mut rest = block.clone();
    while !rest.is_empty() {
      let ranks = rest.iter().map(|&c| if forward { table.forward_rank(register, c) } else { table.backward_rank(register, c) });
      let nearest = if forward {
        ranks.enumerate().min_by_key(|(_, r)| r.unwrap_or(usize::MAX))
      } else {
        ranks.enumerate().max_by_key(|(_, r)| *r)
      };
      match nearest {
        Some((j, Some(next))) => {
          register = next;
          rest.swap_remove(j);
        }
        _ => return register,
      }
    }
  }
  register
}
