//! Turns segments into drawable output: a bounding viewport, SVG path data and a
//! standalone SVG document.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::encoder::encode;
use crate::types::{Point, Rule, Segment};

/// The region a render target should show, in turtle units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn max_x(&self) -> f64 {
        self.min_x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.min_y + self.height
    }
}

/// Computes the extent of every segment endpoint, widened by `margin` on every side.
///
/// Returns `None` for an empty path.
pub fn bounds(segments: &[Segment], margin: f64) -> Option<ViewBox> {
    let mut points = segments.iter().flat_map(|s| [s.start, s.end]);
    let first = points.next()?;

    let (min, max) = points.fold((first, first), |(min, max), p| {
        (
            Point::new(min.x.min(p.x), min.y.min(p.y)),
            Point::new(max.x.max(p.x), max.y.max(p.y)),
        )
    });

    Some(ViewBox {
        min_x: min.x - margin,
        min_y: min.y - margin,
        width: max.x - min.x + 2.0 * margin,
        height: max.y - min.y + 2.0 * margin,
    })
}

/// Formats segments as SVG path data.
///
/// Contiguous segments share a sub-path; a `M` command starts a new one whenever a
/// segment does not begin where the previous one ended.
pub fn to_path_data(segments: &[Segment]) -> String {
    let mut data = String::new();
    let mut previous: Option<Point> = None;

    for segment in segments {
        if previous != Some(segment.start) {
            let _ = write!(data, "M{} {}", segment.start.x, segment.start.y);
        }
        let _ = write!(data, "L{} {}", segment.end.x, segment.end.y);
        previous = Some(segment.end);
    }

    data
}

/// Renders a standalone SVG document for a frame.
///
/// The rules and seed that produced the path are kept in `data-` attributes so a saved
/// image records where it came from.
pub fn to_svg(segments: &[Segment], margin: f64, rules: &[Rule], seed: &str) -> String {
    let view_box = bounds(segments, margin)
        .map(|b| format!("{} {} {} {}", b.min_x, b.min_y, b.width, b.height))
        .unwrap_or_else(|| "-320 -240 640 480".to_string());

    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{}\" ",
            "data-rules=\"{}\" data-seed=\"{}\">\n",
            "  <path d=\"{}\" stroke=\"black\" fill=\"none\"/>\n",
            "</svg>\n"
        ),
        view_box,
        escape_attribute(&encode(rules)),
        escape_attribute(seed),
        to_path_data(segments),
    )
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "&#10;")
}
