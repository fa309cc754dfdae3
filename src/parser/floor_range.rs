//! Floor descriptors from price tables ("5~9층", "10층 이상", "최상층").

use serde::Serialize;
use tracing::warn;

/// Stand-in for "the highest floor"; the real top floor is rarely known when
/// the price table is read.
pub const TOP_FLOOR: u32 = 99;

/// Inclusive floor interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FloorRange {
    pub min: u32,
    pub max: u32,
}

impl FloorRange {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn single(floor: u32) -> Self {
        Self::new(floor, floor)
    }

    /// Every floor in the interval; empty when `min > max`.
    pub fn floors(self) -> impl Iterator<Item = u32> {
        self.min..=self.max
    }

    #[must_use]
    pub const fn contains(self, floor: u32) -> bool {
        self.min <= floor && floor <= self.max
    }
}

/// Result of parsing one descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFloors {
    pub ranges: Vec<FloorRange>,
    /// Segments that could not be read and were dropped.
    pub skipped: usize,
}

impl ParsedFloors {
    fn one(range: FloorRange) -> Self {
        Self {
            ranges: vec![range],
            skipped: 0,
        }
    }

    fn failed(text: &str) -> Self {
        warn!(descriptor = text, "unreadable floor descriptor, skipping");
        Self {
            ranges: Vec::new(),
            skipped: 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Parse a floor descriptor into inclusive ranges.
///
/// Never fails: unreadable segments are dropped and counted in
/// [`ParsedFloors::skipped`]. An empty result means the tier carries no usable
/// floors.
#[must_use]
pub fn parse_floor_ranges(descriptor: &str) -> ParsedFloors {
    let text = descriptor.replace('층', "");
    let text = text.trim();

    if text.contains("최상") || text.contains("최고") {
        return ParsedFloors::one(FloorRange::single(TOP_FLOOR));
    }
    if text.contains("최하") || text.contains("최저") {
        return ParsedFloors::one(FloorRange::single(1));
    }

    if text.contains('~') || text.contains('-') {
        let separator = if text.contains('~') { '~' } else { '-' };
        let parts: Vec<&str> = text.split(separator).collect();
        return match parts.as_slice() {
            [start, end] => match (parse_floor(start), parse_floor(end)) {
                (Some(start), Some(end)) => ParsedFloors::one(FloorRange::new(start, end)),
                _ => ParsedFloors::failed(descriptor),
            },
            _ => ParsedFloors::failed(descriptor),
        };
    }

    if text.contains("이상") {
        return match parse_floor(&text.replace("이상", "")) {
            Some(start) => ParsedFloors::one(FloorRange::new(start, TOP_FLOOR)),
            None => ParsedFloors::failed(descriptor),
        };
    }

    if text.contains("이하") {
        return match parse_floor(&text.replace("이하", "")) {
            Some(end) => ParsedFloors::one(FloorRange::new(1, end)),
            None => ParsedFloors::failed(descriptor),
        };
    }

    if text.contains(',') {
        let mut parsed = ParsedFloors::default();
        for part in text.split(',') {
            match parse_floor(part) {
                Some(floor) => parsed.ranges.push(FloorRange::single(floor)),
                None => {
                    warn!(descriptor, segment = part, "unreadable floor segment, skipping");
                    parsed.skipped += 1;
                }
            }
        }
        return parsed;
    }

    match parse_floor(text) {
        Some(floor) => ParsedFloors::one(FloorRange::single(floor)),
        None => ParsedFloors::failed(descriptor),
    }
}

fn parse_floor(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}
