//! Hand-off between the reconciled reserve series and the presentation layer.
//!
//! Every point of the series carries a [`SeriesLabel`] that encodes its
//! position on the x-axis: a synthetic start point, one point per awarded draw
//! and a synthetic "now" point. Renderers only format what is already computed,
//! [`SeriesLabel::axis_tick`] and [`SeriesLabel::tooltip_label`] cover the
//! formatting the chart needs.

use std::{fmt, str::FromStr};

use chrono::DateTime;
use serde::{Serialize, Serializer};

use crate::{
    reserve::ReserveDataPoint,
    types::{DrawId, TokenInfo},
};

const START: &str = "Start";
const NOW: &str = "Now";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChartError {
    #[error("invalid series label: {0:?}")]
    InvalidLabel(String),
}

/// X-axis label of a reserve series point, rendered as `{kind}-{timestamp}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeriesLabel {
    /// Origin of the series, at the time the first draw opened.
    Start { timestamp: u64 },
    /// Awarded draw.
    Draw { draw_id: DrawId, timestamp: u64 },
    /// Live reserve at the host clock reading.
    Now { timestamp: u64 },
}

impl SeriesLabel {
    /// Unix timestamp (seconds) embedded in the label.
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::Start { timestamp } | Self::Draw { timestamp, .. } | Self::Now { timestamp } => {
                *timestamp
            }
        }
    }

    pub fn draw_id(&self) -> Option<DrawId> {
        match self {
            Self::Draw { draw_id, .. } => Some(*draw_id),
            _ => None,
        }
    }

    /// Short date for the x-axis tick, e.g. `Mar 7`.
    pub fn axis_tick(&self) -> String {
        match utc(self.timestamp()) {
            Some(date) => date.format("%b %-d").to_string(),
            None => String::new(),
        }
    }

    /// Tooltip heading, e.g. `Mar 7, 2024 (Draw #42)` for draws and
    /// `Start`/`Now` for the synthetic points.
    pub fn tooltip_label(&self) -> String {
        match self {
            Self::Start { .. } => START.to_string(),
            Self::Now { .. } => NOW.to_string(),
            Self::Draw { draw_id, timestamp } => match utc(*timestamp) {
                Some(date) => format!("{} (Draw #{draw_id})", date.format("%b %-d, %Y")),
                None => format!("Draw #{draw_id}"),
            },
        }
    }
}

fn utc(timestamp: u64) -> Option<DateTime<chrono::Utc>> {
    DateTime::from_timestamp(i64::try_from(timestamp).ok()?, 0)
}

impl fmt::Display for SeriesLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start { timestamp } => write!(f, "{START}-{timestamp}"),
            Self::Draw { draw_id, timestamp } => write!(f, "{draw_id}-{timestamp}"),
            Self::Now { timestamp } => write!(f, "{NOW}-{timestamp}"),
        }
    }
}

impl FromStr for SeriesLabel {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChartError::InvalidLabel(s.to_string());
        let (kind, timestamp) = s.split_once('-').ok_or_else(invalid)?;
        let timestamp = timestamp.parse().map_err(|_| invalid())?;
        match kind {
            START => Ok(Self::Start { timestamp }),
            NOW => Ok(Self::Now { timestamp }),
            draw_id => Ok(Self::Draw {
                draw_id: draw_id.parse().map_err(|_| invalid())?,
                timestamp,
            }),
        }
    }
}

impl Serialize for SeriesLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Everything a renderer needs to draw the reserve chart.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// Ordered series: start point, one point per awarded draw, now point.
    pub points: Vec<ReserveDataPoint>,

    /// Token all amounts are denominated in.
    pub prize_token: TokenInfo,

    /// Token bought back with the remaining reserve, shown as-is.
    pub burn_token: Option<TokenInfo>,
}

impl ChartData {
    /// Point under the cursor, looked up by its x-axis label.
    pub fn point(&self, label: &SeriesLabel) -> Option<&ReserveDataPoint> {
        self.points.iter().find(|p| &p.label == label)
    }
}
