use std::collections::{BTreeMap, HashMap};

use crate::geometry::{Rect, Size};
use crate::zone::Zone;

/// Narrowest a column may be squeezed before the layout stops shrinking it.
pub const MIN_TRACK_WIDTH: u16 = 3;

/// Sizing input for one leaf column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSize {
    /// Fixed width in terminal cells; never grows or shrinks.
    Fixed(u16),
    /// Content-sized with the measured natural width.
    Auto { natural: u16 },
}

impl TrackSize {
    fn base(self) -> u16 {
        match self {
            TrackSize::Fixed(width) => width,
            TrackSize::Auto { natural } => natural.max(MIN_TRACK_WIDTH),
        }
    }

    fn is_auto(self) -> bool {
        matches!(self, TrackSize::Auto { .. })
    }
}

/// Widths with no distribution applied: fixed stays fixed, auto takes its
/// measured natural width. Used for the pinned zones, which never flex.
pub fn natural_widths(tracks: &[TrackSize]) -> Vec<u16> {
    tracks.iter().map(|track| track.base()).collect()
}

/// Distribute `available` cells across `tracks`.
///
/// Starts from natural widths, then grows auto tracks evenly into leftover
/// space or shrinks them round-robin down to [`MIN_TRACK_WIDTH`] when the
/// naturals overflow. Fixed tracks are locked either way; if everything is
/// fixed the result may exceed `available` and the renderer truncates.
pub fn distribute(tracks: &[TrackSize], available: u16) -> Vec<u16> {
    let mut widths = natural_widths(tracks);
    if tracks.is_empty() {
        return widths;
    }

    let total: u32 = widths.iter().map(|w| *w as u32).sum();
    let available = available as u32;

    if total > available {
        shrink_autos(tracks, &mut widths, total - available);
    } else if total < available {
        grow_autos(tracks, &mut widths, (available - total) as u16);
    }

    widths
}

fn shrink_autos(tracks: &[TrackSize], widths: &mut [u16], mut over: u32) {
    while over > 0 {
        let mut changed = false;
        for (idx, track) in tracks.iter().enumerate() {
            if track.is_auto() && widths[idx] > MIN_TRACK_WIDTH {
                widths[idx] -= 1;
                over -= 1;
                changed = true;
                if over == 0 {
                    break;
                }
            }
        }
        if !changed {
            break;
        }
    }
}

fn grow_autos(tracks: &[TrackSize], widths: &mut [u16], remaining: u16) {
    let auto_count = tracks.iter().filter(|track| track.is_auto()).count() as u16;
    if auto_count == 0 {
        return;
    }

    let share = remaining / auto_count;
    let mut leftover = remaining % auto_count;
    for (idx, track) in tracks.iter().enumerate() {
        if track.is_auto() {
            let extra = if leftover > 0 {
                leftover -= 1;
                1
            } else {
                0
            };
            widths[idx] = widths[idx].saturating_add(share + extra);
        }
    }
}

/// Place the non-empty zone surfaces inside the container.
///
/// Left anchors at the container's left edge, right at its right edge, and
/// the regular surface takes the span between them. Zones absent from
/// `zone_widths` (no leaf columns) get no rect and are omitted from
/// rendering entirely.
pub fn solve_zone_rects(container: Size, zone_widths: &BTreeMap<Zone, u16>) -> HashMap<Zone, Rect> {
    let mut rects = HashMap::new();
    if container.is_empty() {
        return rects;
    }

    let left = zone_widths.get(&Zone::Left).copied().unwrap_or(0);
    let right = zone_widths.get(&Zone::Right).copied().unwrap_or(0);

    if zone_widths.contains_key(&Zone::Left) {
        rects.insert(
            Zone::Left,
            Rect::new(0, 0, left.min(container.width), container.height),
        );
    }

    if zone_widths.contains_key(&Zone::Regular) {
        let x = left.min(container.width);
        let span = container.width.saturating_sub(left).saturating_sub(right);
        rects.insert(Zone::Regular, Rect::new(x, 0, span, container.height));
    }

    if zone_widths.contains_key(&Zone::Right) {
        let x = container.width.saturating_sub(right);
        rects.insert(
            Zone::Right,
            Rect::new(x, 0, right.min(container.width), container.height),
        );
    }

    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_tracks_are_never_resized() {
        let tracks = [TrackSize::Fixed(10), TrackSize::Auto { natural: 6 }];
        let widths = distribute(&tracks, 30);
        assert_eq!(widths[0], 10);
        assert_eq!(widths[1], 20);
    }

    #[test]
    fn autos_share_leftover_evenly() {
        let tracks = [
            TrackSize::Auto { natural: 5 },
            TrackSize::Auto { natural: 5 },
            TrackSize::Auto { natural: 5 },
        ];
        let widths = distribute(&tracks, 20);
        assert_eq!(widths.iter().sum::<u16>(), 20);
        assert!(widths.iter().all(|w| *w == 6 || *w == 7));
    }

    #[test]
    fn autos_shrink_to_the_floor_but_not_below() {
        let tracks = [TrackSize::Auto { natural: 20 }, TrackSize::Fixed(8)];
        assert_eq!(distribute(&tracks, 12), vec![4, 8]);
        // Squeezing further bottoms out at the floor instead of vanishing.
        assert_eq!(distribute(&tracks, 5), vec![MIN_TRACK_WIDTH, 8]);
    }

    #[test]
    fn all_fixed_overflow_is_left_alone() {
        let tracks = [TrackSize::Fixed(30), TrackSize::Fixed(30)];
        assert_eq!(distribute(&tracks, 40), vec![30, 30]);
    }

    #[test]
    fn zone_rects_anchor_left_and_right() {
        let mut widths = BTreeMap::new();
        widths.insert(Zone::Left, 10);
        widths.insert(Zone::Regular, 0);
        widths.insert(Zone::Right, 8);

        let rects = solve_zone_rects(Size::new(60, 20), &widths);
        assert_eq!(rects[&Zone::Left], Rect::new(0, 0, 10, 20));
        assert_eq!(rects[&Zone::Regular], Rect::new(10, 0, 42, 20));
        assert_eq!(rects[&Zone::Right], Rect::new(52, 0, 8, 20));
    }

    #[test]
    fn omitted_zones_get_no_rect() {
        let mut widths = BTreeMap::new();
        widths.insert(Zone::Regular, 0);

        let rects = solve_zone_rects(Size::new(40, 10), &widths);
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[&Zone::Regular], Rect::new(0, 0, 40, 10));
    }
}
