//! Phantom nodes: coordinates snapped onto the graph

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{ComponentId, Coordinate, EdgeDistance, EdgeDuration, EdgeWeight, SegmentId};

/// Which side of the road a snapped point may be approached from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approach {
    #[default]
    Unrestricted,
    /// Arrive with the point on the driving side
    Curb,
    /// Arrive with the point on the far side
    Opposite,
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Approach::Unrestricted => write!(f, "unrestricted"),
            Approach::Curb => write!(f, "curb"),
            Approach::Opposite => write!(f, "opposite"),
        }
    }
}

impl FromStr for Approach {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unrestricted" => Ok(Approach::Unrestricted),
            "curb" => Ok(Approach::Curb),
            "opposite" => Ok(Approach::Opposite),
            other => Err(format!("unknown approach '{other}'")),
        }
    }
}

/// Accepted travel direction: `bearing` +/- `range` degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bearing {
    pub bearing: i16,
    pub range: i16,
}

impl Bearing {
    pub fn new(bearing: i16, range: i16) -> Self {
        Self { bearing, range }
    }

    /// True if `value` (degrees, `[0, 360]`) lies inside the window, which may wrap north
    pub fn contains(&self, value: f64) -> bool {
        let bearing = self.bearing as f64;
        let range = self.range as f64;
        if range >= 180.0 {
            return true;
        }
        if bearing < range {
            value >= bearing - range + 360.0 || value <= bearing + range
        } else if bearing + range > 360.0 {
            value >= bearing - range || value <= bearing + range - 360.0
        } else {
            value >= bearing - range && value <= bearing + range
        }
    }
}

impl FromStr for Bearing {
    type Err = String;

    /// Parses `bearing,range`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (bearing, range) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'bearing,range', got '{s}'"))?;
        let bearing: i16 = bearing.trim().parse().map_err(|e| format!("bad bearing: {e}"))?;
        let range: i16 = range.trim().parse().map_err(|e| format!("bad range: {e}"))?;
        if !(0..=360).contains(&bearing) || !(0..=180).contains(&range) {
            return Err(format!("bearing {bearing} or range {range} out of bounds"));
        }
        Ok(Bearing::new(bearing, range))
    }
}

/// A point on a road segment, with the cost of reaching it along the segment
/// in either direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhantomNode {
    pub forward_segment_id: SegmentId,
    pub reverse_segment_id: SegmentId,
    pub forward_weight: EdgeWeight,
    pub reverse_weight: EdgeWeight,
    pub forward_weight_offset: EdgeWeight,
    pub reverse_weight_offset: EdgeWeight,
    pub forward_duration: EdgeDuration,
    pub reverse_duration: EdgeDuration,
    pub forward_duration_offset: EdgeDuration,
    pub reverse_duration_offset: EdgeDuration,
    pub forward_distance: EdgeDistance,
    pub reverse_distance: EdgeDistance,
    pub forward_distance_offset: EdgeDistance,
    pub reverse_distance_offset: EdgeDistance,
    pub component: ComponentId,
    pub location: Coordinate,
    pub input_location: Coordinate,
    pub fwd_segment_position: u16,
    pub is_valid_forward_source: bool,
    pub is_valid_forward_target: bool,
    pub is_valid_reverse_source: bool,
    pub is_valid_reverse_target: bool,
    /// Bearing of the segment in forward direction, whole degrees
    pub bearing: u16,
    /// Bearing of the segment in reverse direction, whole degrees
    pub reverse_bearing: u16,
}

impl PhantomNode {
    pub fn is_valid(&self) -> bool {
        self.forward_segment_id.enabled || self.reverse_segment_id.enabled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhantomNodeWithDistance {
    pub phantom_node: PhantomNode,
    /// Meters from the input coordinate to the snapped location
    pub distance: f64,
}

/// Nearest candidates, plus the nearest ones on the dominant component
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhantomCandidateAlternatives {
    pub nearest: Vec<PhantomNodeWithDistance>,
    pub big_component: Vec<PhantomNodeWithDistance>,
}

impl PhantomCandidateAlternatives {
    pub fn is_empty(&self) -> bool {
        self.nearest.is_empty() && self.big_component.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearing_window() {
        let north = Bearing::new(0, 20);
        assert!(north.contains(350.0));
        assert!(north.contains(10.0));
        assert!(!north.contains(90.0));

        let west = Bearing::new(350, 20);
        assert!(west.contains(5.0));
        assert!(west.contains(335.0));
        assert!(!west.contains(320.0));

        let east = Bearing::new(90, 10);
        assert!(east.contains(95.0));
        assert!(!east.contains(101.0));
        assert!(Bearing::new(0, 180).contains(180.0));
    }

    #[test]
    fn test_parse() {
        assert_eq!("90,10".parse::<Bearing>().unwrap(), Bearing::new(90, 10));
        assert!("90".parse::<Bearing>().is_err());
        assert!("400,10".parse::<Bearing>().is_err());
        assert_eq!("CURB".parse::<Approach>().unwrap(), Approach::Curb);
        assert_eq!(Approach::Opposite.to_string(), "opposite");
    }
}
