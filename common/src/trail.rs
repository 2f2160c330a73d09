//! Bounded history of recent positions, for painting motion trails

use std::collections::VecDeque;

use crate::vector::Vec2;

#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<Vec2>,
    max_length: usize,
}

impl Trail {
    pub fn new(max_length: usize) -> Self {
        Self {
            points: VecDeque::new(),
            max_length,
        }
    }

    /// Append a position, dropping the oldest ones beyond the cap
    pub fn push(&mut self, position: Vec2) {
        if self.max_length == 0 {
            return;
        }
        self.points.push_back(position);
        while self.points.len() > self.max_length {
            self.points.pop_front();
        }
    }

    pub fn set_max_length(&mut self, max_length: usize) {
        self.max_length = max_length;
        while self.points.len() > max_length {
            self.points.pop_front();
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest first
    pub fn points(&self) -> impl Iterator<Item = &Vec2> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<Vec2> {
        self.points.back().copied()
    }
}
