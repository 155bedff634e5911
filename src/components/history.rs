use std::collections::VecDeque;

use crate::canvas::{LayerId, LayerStack, PixelBuffer};

// ============================================================================
// LAYER SNAPSHOT - full pixel copy of one layer
// ============================================================================

/// Pre-mutation copy of a single layer. Undo swaps it with the live pixels,
/// so the same entry then holds the state redo needs.
#[derive(Clone, Debug)]
pub struct LayerSnapshot {
    layer: LayerId,
    pixels: PixelBuffer,
    description: String,
}

impl LayerSnapshot {
    pub fn capture(layers: &LayerStack, description: impl Into<String>) -> Self {
        let active = layers.active();
        Self {
            layer: active.id,
            pixels: active.pixels.clone(),
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn memory_size(&self) -> usize {
        self.pixels.byte_size()
    }

    /// Exchange stored and live pixels. Fails when the layer no longer exists.
    fn swap_into(&mut self, layers: &mut LayerStack) -> bool {
        match layers.layer_mut(self.layer) {
            Some(layer) => {
                std::mem::swap(&mut layer.pixels, &mut self.pixels);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// HISTORY MANAGER - undo/redo stacks of layer snapshots
// ============================================================================

pub struct HistoryManager {
    undo_stack: VecDeque<LayerSnapshot>,
    redo_stack: VecDeque<LayerSnapshot>,
    max_history_size: usize,
    /// Running memory total across both stacks.
    total_memory: usize,
    /// Snapshots ever recorded; unaffected by pruning.
    recorded: u64,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(50)
    }
}

impl HistoryManager {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: max_history_size.max(1),
            total_memory: 0,
            recorded: 0,
        }
    }

    /// Record the active layer's current pixels before a mutation.
    /// Invalidates everything on the redo stack.
    pub fn snapshot(&mut self, layers: &LayerStack, description: impl Into<String>) {
        for entry in self.redo_stack.drain(..) {
            self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        }

        let entry = LayerSnapshot::capture(layers, description);
        self.total_memory += entry.memory_size();
        self.undo_stack.push_back(entry);
        self.recorded += 1;

        self.prune();
    }

    /// Restore the most recent snapshot. Entries whose layer has since been
    /// removed or merged away are discarded and the next one is tried.
    pub fn undo(&mut self, layers: &mut LayerStack) -> Option<String> {
        while let Some(mut entry) = self.undo_stack.pop_back() {
            if entry.swap_into(layers) {
                let description = entry.description.clone();
                self.redo_stack.push_back(entry);
                return Some(description);
            }
            log::warn!("Dropping undo step '{}' for a deleted layer", entry.description);
            self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        }
        None
    }

    pub fn redo(&mut self, layers: &mut LayerStack) -> Option<String> {
        while let Some(mut entry) = self.redo_stack.pop_back() {
            if entry.swap_into(layers) {
                let description = entry.description.clone();
                self.undo_stack.push_back(entry);
                return Some(description);
            }
            log::warn!("Dropping redo step '{}' for a deleted layer", entry.description);
            self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        }
        None
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.description())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.description())
    }

    /// Get all undo descriptions (most recent first)
    pub fn undo_history(&self) -> Vec<String> {
        self.undo_stack.iter().rev().map(|e| e.description.clone()).collect()
    }

    /// Total snapshots taken so far. Goes up even once the undo stack is
    /// full, so callers can tell whether an action recorded anything.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }

    /// Drop the oldest undo steps beyond the configured depth.
    fn prune(&mut self) {
        while self.undo_stack.len() > self.max_history_size {
            if let Some(removed) = self.undo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            }
        }
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
