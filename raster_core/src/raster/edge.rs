// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: polygon edges and the active edge list

use crate::types::Vec2;

/// Non-horizontal polygon edge normalized so `y0 < y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    /// The edge pointed upwards before normalization.
    pub invert: bool,
}

impl Edge {
    /// Edge from `a` to `b`, or `None` for a horizontal edge.
    pub fn new(a: Vec2, b: Vec2) -> Option<Edge> {
        if a.y == b.y {
            return None;
        }
        Some(if a.y < b.y {
            Edge {
                x0: a.x,
                y0: a.y,
                x1: b.x,
                y1: b.y,
                invert: false,
            }
        } else {
            Edge {
                x0: b.x,
                y0: b.y,
                x1: a.x,
                y1: a.y,
                invert: true,
            }
        })
    }

    /// Signed winding contribution.
    pub fn winding(&self) -> i32 {
        if self.invert {
            -1
        } else {
            1
        }
    }

    pub fn dxdy(&self) -> f32 {
        (self.x1 - self.x0) / (self.y1 - self.y0)
    }

    /// X at height `y`; exact at both end points.
    pub fn x_at(&self, y: f32) -> f32 {
        if y >= self.y1 {
            self.x1
        } else {
            self.x0 + (y - self.y0) * self.dxdy()
        }
    }
}

/// Append the edges of the closed polygon `poly`.
pub(crate) fn build_edges(poly: &[Vec2], edges: &mut Vec<Edge>) {
    let n = poly.len();
    for i in 0..n {
        if let Some(e) = Edge::new(poly[i], poly[(i + 1) % n]) {
            edges.push(e);
        }
    }
}

fn less(a: &Edge, b: &Edge) -> bool {
    a.y0 < b.y0
}

fn ins_sort(p: &mut [Edge]) {
    for i in 1..p.len() {
        let t = p[i];
        let mut j = i;
        while j > 0 && less(&t, &p[j - 1]) {
            p[j] = p[j - 1];
            j -= 1;
        }
        p[j] = t;
    }
}

fn quicksort(mut p: &mut [Edge]) {
    while p.len() > 12 {
        let n = p.len();
        let m = n >> 1;
        // median of three into p[m], then pivot to p[0]
        let c01 = less(&p[0], &p[m]);
        let c12 = less(&p[m], &p[n - 1]);
        if c01 != c12 {
            let c = less(&p[0], &p[n - 1]);
            let z = if c == c12 { 0 } else { n - 1 };
            p.swap(z, m);
        }
        p.swap(0, m);

        let mut i = 1;
        let mut j = n - 1;
        loop {
            while less(&p[i], &p[0]) {
                i += 1;
            }
            while less(&p[0], &p[j]) {
                j -= 1;
            }
            if i >= j {
                break;
            }
            p.swap(i, j);
            i += 1;
            j -= 1;
        }

        let rest = std::mem::take(&mut p);
        if j < n - i {
            quicksort(&mut rest[..j]);
            p = &mut rest[i..];
        } else {
            quicksort(&mut rest[i..]);
            p = &mut rest[..j];
        }
    }
}

/// Sort edges by top y. Quicksort down to short runs, then one insertion
/// sort pass over the nearly ordered result.
pub fn sort_edges(edges: &mut [Edge]) {
    quicksort(edges);
    ins_sort(edges);
}

pub(crate) const NIL: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ActiveEdge {
    pub edge: Edge,
    pub dxdy: f32,
    next: u32,
}

/// Singly linked list of active edges stored in an arena. Removed nodes
/// go onto a free stack and are reused by later inserts.
#[derive(Debug)]
pub(crate) struct ActiveList {
    nodes: Vec<ActiveEdge>,
    free: Vec<u32>,
    head: u32,
    len: usize,
}

impl Default for ActiveList {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            len: 0,
        }
    }
}

impl ActiveList {
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn insert(&mut self, edge: Edge) {
        let node = ActiveEdge {
            edge,
            dxdy: edge.dxdy(),
            next: self.head,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx as usize] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                (self.nodes.len() - 1) as u32
            }
        };
        self.head = idx;
        self.len += 1;
    }

    /// Unlink every node for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&ActiveEdge) -> bool) {
        let mut prev = NIL;
        let mut cur = self.head;
        while cur != NIL {
            let next = self.nodes[cur as usize].next;
            if keep(&self.nodes[cur as usize]) {
                prev = cur;
            } else {
                if prev == NIL {
                    self.head = next;
                } else {
                    self.nodes[prev as usize].next = next;
                }
                self.free.push(cur);
                self.len -= 1;
            }
            cur = next;
        }
    }

    pub fn iter(&self) -> ActiveIter<'_> {
        ActiveIter {
            list: self,
            cur: self.head,
        }
    }
}

pub(crate) struct ActiveIter<'a> {
    list: &'a ActiveList,
    cur: u32,
}

impl<'a> Iterator for ActiveIter<'a> {
    type Item = &'a ActiveEdge;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == NIL {
            return None;
        }
        let node = &self.list.nodes[self.cur as usize];
        self.cur = node.next;
        Some(node)
    }
}
