//! Completed turn records and the bounded history that keeps them.

use std::collections::VecDeque;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::chain::ArcType;
use crate::analysis::quality::PhaseScores;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CarveStyle {
    Aggressive,
    Technical,
    #[default]
    Smooth,
}

impl CarveStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Technical => "technical",
            Self::Smooth => "smooth",
        }
    }
}

/// One point along the turn's path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PathSample {
    pub x: f32,
    pub z: f32,
    /// Seconds since the turn opened
    pub time: f32,
    /// Signed edge angle (rad)
    pub edge_angle: f32,
    pub speed: f32,
}

/// Immutable once pushed into [`TurnHistory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Lifetime turn number, starting at 1
    pub index: u64,
    /// +1 right, -1 left
    pub direction: i8,
    pub duration: f32,
    pub peak_edge: f32,
    pub peak_g: f32,
    pub path: Vec<PathSample>,
    pub phase_scores: PhaseScores,
    pub symmetry: f32,
    pub perfection: f32,
    pub style: CarveStyle,
    pub style_intensity: f32,
    /// Heading change over the turn (degrees, unsigned)
    pub heading_change_deg: f32,
    pub arc_type: ArcType,
    /// Transition timing multiplier of the reversal that opened this turn
    pub timing_multiplier: f32,
    /// Time spent at or above the clean-edge threshold (s)
    pub hold_time: f32,
    pub is_clean: bool,
    pub is_perfect: bool,
}

/// Per-style turn counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StyleCounts {
    pub aggressive: u32,
    pub technical: u32,
    pub smooth: u32,
}

impl StyleCounts {
    fn add(&mut self, style: CarveStyle) {
        match style {
            CarveStyle::Aggressive => self.aggressive += 1,
            CarveStyle::Technical => self.technical += 1,
            CarveStyle::Smooth => self.smooth += 1,
        }
    }

    pub fn dominant(&self) -> Option<CarveStyle> {
        let all = [
            (CarveStyle::Aggressive, self.aggressive),
            (CarveStyle::Technical, self.technical),
            (CarveStyle::Smooth, self.smooth),
        ];
        all.into_iter().filter(|(_, n)| *n > 0).max_by_key(|(_, n)| *n).map(|(s, _)| s)
    }
}

/// Most recent N turns plus lifetime stats. The best turn survives eviction.
#[derive(Debug, Clone)]
pub struct TurnHistory {
    records: VecDeque<TurnRecord>,
    capacity: usize,
    best: Option<TurnRecord>,
    total_turns: u64,
    perfect_count: u32,
    styles: StyleCounts,
}

impl TurnHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
            best: None,
            total_turns: 0,
            perfect_count: 0,
            styles: StyleCounts::default(),
        }
    }

    pub fn push(&mut self, record: TurnRecord) {
        self.total_turns += 1;
        if record.is_perfect {
            self.perfect_count += 1;
        }
        self.styles.add(record.style);

        let is_best = self.best.as_ref().map_or(true, |b| record.perfection > b.perfection);
        if is_best {
            self.best = Some(record.clone());
        }

        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn best(&self) -> Option<&TurnRecord> {
        self.best.as_ref()
    }

    pub fn latest(&self) -> Option<&TurnRecord> {
        self.records.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TurnRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean perfection of the retained turns.
    pub fn average_perfection(&self) -> f32 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.records.iter().map(|r| r.perfection).sum::<f32>() / self.records.len() as f32
    }

    /// Lifetime, including evicted turns.
    pub fn total_turns(&self) -> u64 {
        self.total_turns
    }

    pub fn perfect_count(&self) -> u32 {
        self.perfect_count
    }

    pub fn style_counts(&self) -> StyleCounts {
        self.styles
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.capacity);
    }
}
