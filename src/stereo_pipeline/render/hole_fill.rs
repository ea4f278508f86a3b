//! Disocclusion (hole) detection and filling
//!
//! Holes are detected with a luma threshold: warping leaves near-black gaps where the
//! source had no content, so any pixel darker than the threshold is treated as missing.
//! Genuinely black scene content is therefore also "filled", which is accepted.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::{debug, warn};

use crate::stereo_pipeline::common::error::Result;
use crate::stereo_pipeline::frame::{CHANNELS, Frame, StereoPair};
use crate::stereo_pipeline::render::types::{HoleFillMethod, HoleFillSettings};

/// Above this many (hole x valid) comparisons the nearest-fill search gets slow.
const NEAREST_FILL_WORK_WARNING: usize = 50_000_000;

/// Per-pixel hole classification for one view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoleMask {
    width: usize,
    height: usize,
    mask: Vec<bool>,
    count: usize,
}

impl HoleMask {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_hole(&self, x: usize, y: usize) -> bool {
        self.mask[y * self.width + x]
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

fn luma(px: &[u8]) -> f32 {
    0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32
}

pub fn detect_holes(frame: &Frame, darkness_threshold: u8) -> HoleMask {
    let threshold = darkness_threshold as f32;
    let mask: Vec<bool> = frame
        .data()
        .chunks_exact(CHANNELS)
        .map(|px| luma(px).round() < threshold)
        .collect();
    let count = mask.iter().filter(|&&h| h).count();
    HoleMask {
        width: frame.width(),
        height: frame.height(),
        mask,
        count,
    }
}

/// Copies the color of the nearest non-hole pixel (Manhattan distance) into each hole.
///
/// This is a brute-force search costing O(holes x valid pixels). It is meant as a
/// correctness fallback for small hole counts; large frames with many holes should use
/// the inpainting strategy or a distance transform instead.
pub fn fill_nearest(frame: &Frame, mask: &HoleMask) -> Result<Frame> {
    if mask.is_empty() {
        return Ok(frame.clone());
    }

    let width = frame.width();
    let valid: Vec<(usize, usize)> = mask
        .mask
        .iter()
        .enumerate()
        .filter(|(_, hole)| !**hole)
        .map(|(i, _)| (i % width, i / width))
        .collect();
    if valid.is_empty() {
        return Ok(frame.clone());
    }

    let work = mask.count.saturating_mul(valid.len());
    if work > NEAREST_FILL_WORK_WARNING {
        warn!(
            holes = mask.count,
            valid = valid.len(),
            "Nearest hole fill is quadratic; consider the inpaint method for this frame size"
        );
    }

    let src = frame.data();
    let mut out = src.to_vec();
    for (i, _) in mask.mask.iter().enumerate().filter(|(_, hole)| **hole) {
        let (x, y) = (i % width, i / width);
        let mut best = valid[0];
        let mut best_dist = usize::MAX;
        for &(vx, vy) in &valid {
            let dist = vx.abs_diff(x) + vy.abs_diff(y);
            if dist < best_dist {
                best_dist = dist;
                best = (vx, vy);
            }
        }
        let s = (best.1 * width + best.0) * CHANNELS;
        out[i * CHANNELS..(i + 1) * CHANNELS].copy_from_slice(&src[s..s + CHANNELS]);
    }

    Frame::new(frame.width(), frame.height(), frame.index(), out)
}

const KNOWN: u8 = 0;
const BAND: u8 = 1;
const INSIDE: u8 = 2;
const UNREACHED: f32 = 1.0e6;

#[derive(Debug, Clone, Copy)]
struct Front {
    t: f32,
    idx: usize,
}

impl PartialEq for Front {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Front {}

impl PartialOrd for Front {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Front {
    // Reversed so BinaryHeap pops the smallest arrival time first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .t
            .total_cmp(&self.t)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

/// Fast-marching inpainting (Telea).
///
/// Holes are filled from their border inward in order of arrival time. Each pixel takes
/// a weighted average of already-known pixels within `radius`; weights favour close
/// pixels, pixels on the same level set, and pixels along the marching direction, which
/// keeps edges from bleeding across the hole.
struct FastMarching<'a> {
    width: usize,
    height: usize,
    radius: usize,
    flags: Vec<u8>,
    t: Vec<f32>,
    pixels: &'a mut [u8],
}

impl FastMarching<'_> {
    fn neighbor(&self, idx: usize, dx: i64, dy: i64) -> Option<usize> {
        let x = (idx % self.width) as i64 + dx;
        let y = (idx / self.width) as i64 + dy;
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    fn known_time(&self, idx: Option<usize>) -> Option<f32> {
        idx.filter(|&i| self.flags[i] == KNOWN).map(|i| self.t[i])
    }

    fn solve(&self, a: Option<usize>, b: Option<usize>) -> f32 {
        match (self.known_time(a), self.known_time(b)) {
            (Some(t1), Some(t2)) => {
                let disc = 2.0 - (t1 - t2) * (t1 - t2);
                if disc >= 0.0 {
                    let r = disc.sqrt();
                    let s = (t1 + t2 - r) * 0.5;
                    if s >= t1 && s >= t2 {
                        return s;
                    }
                    let s = s + r;
                    if s >= t1 && s >= t2 {
                        return s;
                    }
                }
                1.0 + t1.min(t2)
            }
            (Some(t1), None) => 1.0 + t1,
            (None, Some(t2)) => 1.0 + t2,
            (None, None) => UNREACHED,
        }
    }

    fn arrival_time(&self, idx: usize) -> f32 {
        let up = self.neighbor(idx, 0, -1);
        let down = self.neighbor(idx, 0, 1);
        let left = self.neighbor(idx, -1, 0);
        let right = self.neighbor(idx, 1, 0);
        self.solve(up, left)
            .min(self.solve(down, left))
            .min(self.solve(up, right))
            .min(self.solve(down, right))
    }

    fn gradient_axis(&self, idx: usize, dx: i64, dy: i64) -> f32 {
        let usable = |i: Option<usize>| i.filter(|&i| self.flags[i] != INSIDE);
        let next = usable(self.neighbor(idx, dx, dy));
        let prev = usable(self.neighbor(idx, -dx, -dy));
        match (prev, next) {
            (Some(p), Some(n)) => (self.t[n] - self.t[p]) * 0.5,
            (None, Some(n)) => self.t[n] - self.t[idx],
            (Some(p), None) => self.t[idx] - self.t[p],
            (None, None) => 0.0,
        }
    }

    fn inpaint(&mut self, idx: usize) {
        let grad_x = self.gradient_axis(idx, 1, 0);
        let grad_y = self.gradient_axis(idx, 0, 1);
        let (px, py) = ((idx % self.width) as i64, (idx / self.width) as i64);
        let r = self.radius as i64;

        let mut acc = [0.0f32; CHANNELS];
        let mut total = 0.0f32;
        for dy in -r..=r {
            for dx in -r..=r {
                let len_sq = (dx * dx + dy * dy) as f32;
                if len_sq == 0.0 || len_sq > (r * r) as f32 {
                    continue;
                }
                let Some(q) = self.neighbor(idx, dx, dy) else {
                    continue;
                };
                if self.flags[q] == INSIDE {
                    continue;
                }
                // Vector from the contributing pixel to the one being filled.
                let (rx, ry) = (px - (q % self.width) as i64, py - (q / self.width) as i64);
                let dst = 1.0 / (len_sq * len_sq.sqrt());
                let lev = 1.0 / (1.0 + (self.t[q] - self.t[idx]).abs());
                let mut dir = rx as f32 * grad_x + ry as f32 * grad_y;
                if dir.abs() <= 0.01 {
                    dir = 1.0e-6;
                }
                let w = (dst * lev * dir).abs();
                for (c, slot) in acc.iter_mut().enumerate() {
                    *slot += w * self.pixels[q * CHANNELS + c] as f32;
                }
                total += w;
            }
        }

        if total > 0.0 {
            for (c, value) in acc.iter().enumerate() {
                self.pixels[idx * CHANNELS + c] = (value / total).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    fn run(&mut self, mask: &HoleMask) {
        let mut heap = BinaryHeap::new();
        for (idx, &hole) in mask.mask.iter().enumerate() {
            if hole {
                self.flags[idx] = INSIDE;
                self.t[idx] = UNREACHED;
            }
        }
        for idx in 0..self.flags.len() {
            if self.flags[idx] != KNOWN {
                continue;
            }
            let touches_hole = [(0, -1), (0, 1), (-1, 0), (1, 0)]
                .iter()
                .filter_map(|&(dx, dy)| self.neighbor(idx, dx, dy))
                .any(|n| self.flags[n] == INSIDE);
            if touches_hole {
                self.flags[idx] = BAND;
                heap.push(Front { t: 0.0, idx });
            }
        }

        while let Some(Front { idx, .. }) = heap.pop() {
            self.flags[idx] = KNOWN;
            for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
                let Some(n) = self.neighbor(idx, dx, dy) else {
                    continue;
                };
                if self.flags[n] != INSIDE {
                    continue;
                }
                self.t[n] = self.arrival_time(n);
                self.flags[n] = BAND;
                self.inpaint(n);
                heap.push(Front { t: self.t[n], idx: n });
            }
        }
    }
}

pub fn fill_inpaint(frame: &Frame, mask: &HoleMask, radius: usize) -> Result<Frame> {
    if mask.is_empty() || mask.count == frame.width() * frame.height() {
        return Ok(frame.clone());
    }

    let mut pixels = frame.data().to_vec();
    let mut marcher = FastMarching {
        width: frame.width(),
        height: frame.height(),
        radius: radius.max(1),
        flags: vec![KNOWN; mask.mask.len()],
        t: vec![0.0; mask.mask.len()],
        pixels: &mut pixels,
    };
    marcher.run(mask);

    Frame::new(frame.width(), frame.height(), frame.index(), pixels)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HoleFiller {
    settings: HoleFillSettings,
}

impl HoleFiller {
    pub fn new(settings: HoleFillSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &HoleFillSettings {
        &self.settings
    }

    /// Fills one view; returns it untouched when no hole is detected.
    pub fn fill_view(&self, view: Frame) -> Result<Frame> {
        let mask = detect_holes(&view, self.settings.darkness_threshold);
        if mask.is_empty() {
            return Ok(view);
        }
        debug!(
            holes = mask.count(),
            method = ?self.settings.method,
            "Filling disocclusions"
        );
        match self.settings.method {
            HoleFillMethod::Inpaint => fill_inpaint(&view, &mask, self.settings.inpaint_radius),
            HoleFillMethod::Nearest => fill_nearest(&view, &mask),
        }
    }

    pub fn fill(&self, pair: StereoPair) -> Result<StereoPair> {
        let (left, right) = pair.into_views();
        StereoPair::new(self.fill_view(left)?, self.fill_view(right)?)
    }
}
