use std::collections::{BTreeMap, BTreeSet, HashMap};

use blake3::Hash;

use crate::error::{GridError, Result};
use crate::geometry::Rect;
use crate::zone::Zone;

/// Last known rendered state of one zone surface.
#[derive(Debug, Clone)]
pub struct SurfaceState {
    pub rect: Rect,
    pub content: String,
    hash: Option<Hash>,
    pub is_dirty: bool,
}

impl SurfaceState {
    fn new(rect: Rect) -> Self {
        Self {
            rect,
            content: String::new(),
            hash: None,
            is_dirty: true,
        }
    }

    fn update_content(&mut self, content: String) {
        let new_hash = blake3::hash(content.as_bytes());
        if self.hash.map(|h| h != new_hash).unwrap_or(true) {
            self.content = content;
            self.hash = Some(new_hash);
            self.is_dirty = true;
        }
    }
}

/// Registry mapping the zone surfaces to their last rendered states.
///
/// A zone with no leaf columns has no entry at all; its surface is omitted
/// rather than drawn empty. Iteration order follows [`Zone`]'s left-to-right
/// ordering so flushes paint surfaces in visual order.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    entries: BTreeMap<Zone, SurfaceState>,
    dirty: BTreeSet<Zone>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the registry against freshly solved zone rects.
    ///
    /// New zones and zones whose placement moved are flagged dirty; zones no
    /// longer present (all their columns pinned away) are dropped.
    pub fn sync_layout(&mut self, solved: &HashMap<Zone, Rect>) {
        for zone in Zone::ALL {
            match solved.get(&zone) {
                Some(rect) => match self.entries.get_mut(&zone) {
                    Some(state) => {
                        if state.rect != *rect {
                            state.rect = *rect;
                            state.is_dirty = true;
                            self.dirty.insert(zone);
                        }
                    }
                    None => {
                        self.entries.insert(zone, SurfaceState::new(*rect));
                        self.dirty.insert(zone);
                    }
                },
                None => {
                    self.entries.remove(&zone);
                    self.dirty.remove(&zone);
                }
            }
        }
    }

    /// Store newly composed content for a zone; dirty only on actual change.
    pub fn apply_content(&mut self, zone: Zone, content: String) -> Result<()> {
        let state = self
            .entries
            .get_mut(&zone)
            .ok_or(GridError::ZoneNotFound(zone))?;
        state.update_content(content);
        if state.is_dirty {
            self.dirty.insert(zone);
        }
        Ok(())
    }

    /// Drain the dirty set, returning surfaces in visual order.
    pub fn take_dirty(&mut self) -> Vec<(Zone, SurfaceState)> {
        let zones: Vec<_> = std::mem::take(&mut self.dirty).into_iter().collect();
        zones
            .into_iter()
            .filter_map(|zone| {
                self.entries.get_mut(&zone).map(|state| {
                    state.is_dirty = false;
                    (zone, state.clone())
                })
            })
            .collect()
    }

    pub fn rect_of(&self, zone: Zone) -> Option<Rect> {
        self.entries.get(&zone).map(|state| state.rect)
    }

    pub fn contains(&self, zone: Zone) -> bool {
        self.entries.contains_key(&zone)
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}
