use super::ids::{RoadId, SectionId, SegmentId, StructureId};
use serde::{Deserialize, Serialize};

/// Cohort used to rank roads separately: paved versus everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceGroup {
    Paved,
    Unpaved,
}

impl SurfaceGroup {
    pub fn from_surface_type(surface_type: &str) -> Self {
        if surface_type.trim().eq_ignore_ascii_case("paved") {
            Self::Paved
        } else {
            Self::Unpaved
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Paved => "paved",
            Self::Unpaved => "unpaved",
        }
    }
}

/// Road-level inventory attributes consumed by benefit scoring and ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Road {
    pub id: RoadId,
    /// Human-readable road number, also the ranking tie-breaker.
    pub identifier: String,
    pub surface_type: String,
    pub population_served: Option<u64>,
    /// Link-type code (e.g. "A" for trunk roads) from the road classification.
    pub link_type_code: Option<String>,
    pub total_length_km: Option<f64>,
}

impl Road {
    pub fn surface_group(&self) -> SurfaceGroup {
        SurfaceGroup::from_surface_type(&self.surface_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadSection {
    pub id: SectionId,
    pub road_id: RoadId,
    pub section_number: u32,
    pub start_chainage_km: Option<f64>,
    pub end_chainage_km: Option<f64>,
    pub length_km: Option<f64>,
}

/// Smallest rated unit of carriageway; belongs to exactly one section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadSegment {
    pub id: SegmentId,
    pub section_id: SectionId,
    pub length_km: Option<f64>,
    pub station_from_km: Option<f64>,
    pub station_to_km: Option<f64>,
    /// Length derived from the stored geometry, maintained by the GIS side.
    pub geometry_length_km: Option<f64>,
}

impl RoadSegment {
    /// Chainage length in kilometres, used as the costing quantity.
    ///
    /// Preference order: stored length, station difference, geometry length.
    pub fn chainage_length_km(&self) -> f64 {
        if let Some(length) = self.length_km {
            if length > 0.0 {
                return length;
            }
        }
        if let (Some(from), Some(to)) = (self.station_from_km, self.station_to_km) {
            return to - from;
        }
        self.geometry_length_km.unwrap_or(0.0)
    }
}

/// Cross-drainage or retaining structure on a road.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub id: StructureId,
    pub road_id: RoadId,
    pub section_id: Option<SectionId>,
    /// Free-form category from the inventory ("bridge", "gabion wall", ...).
    pub category: String,
    pub bridge_length_m: Option<f64>,
    pub culvert_span_m: Option<f64>,
    pub start_chainage_km: Option<f64>,
    pub end_chainage_km: Option<f64>,
    pub line_length_km: Option<f64>,
}

impl Structure {
    /// Physical extent in metres, when any source can resolve one.
    ///
    /// Explicit bridge/culvert dimensions win over chainage, which wins over
    /// the line geometry.
    pub fn length_m(&self) -> Option<f64> {
        if let Some(length) = self.bridge_length_m {
            if length > 0.0 {
                return Some(length);
            }
        }
        if let Some(span) = self.culvert_span_m {
            if span > 0.0 {
                return Some(span);
            }
        }
        if let (Some(start), Some(end)) = (self.start_chainage_km, self.end_chainage_km) {
            return Some((end - start) * 1000.0);
        }
        self.line_length_km.map(|km| km * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_group_is_case_insensitive() {
        assert_eq!(SurfaceGroup::from_surface_type("PAVED"), SurfaceGroup::Paved);
        assert_eq!(SurfaceGroup::from_surface_type(" Paved "), SurfaceGroup::Paved);
        assert_eq!(SurfaceGroup::from_surface_type("Earth"), SurfaceGroup::Unpaved);
        assert_eq!(SurfaceGroup::from_surface_type(""), SurfaceGroup::Unpaved);
    }

    #[test]
    fn segment_length_prefers_stored_value() {
        let segment = RoadSegment {
            id: SegmentId(1),
            section_id: SectionId(1),
            length_km: Some(2.5),
            station_from_km: Some(0.0),
            station_to_km: Some(5.0),
            geometry_length_km: Some(9.0),
        };
        assert_eq!(segment.chainage_length_km(), 2.5);
    }

    #[test]
    fn segment_length_falls_back_to_stations_then_geometry() {
        let mut segment = RoadSegment {
            id: SegmentId(1),
            section_id: SectionId(1),
            length_km: None,
            station_from_km: Some(1.0),
            station_to_km: Some(4.0),
            geometry_length_km: Some(9.0),
        };
        assert_eq!(segment.chainage_length_km(), 3.0);

        segment.station_from_km = None;
        assert_eq!(segment.chainage_length_km(), 9.0);

        segment.geometry_length_km = None;
        assert_eq!(segment.chainage_length_km(), 0.0);
    }

    #[test]
    fn structure_length_priority_order() {
        let mut structure = Structure {
            id: StructureId(1),
            road_id: RoadId(1),
            section_id: None,
            category: "bridge".to_string(),
            bridge_length_m: Some(40.0),
            culvert_span_m: Some(6.0),
            start_chainage_km: Some(1.0),
            end_chainage_km: Some(1.1),
            line_length_km: Some(0.2),
        };
        assert_eq!(structure.length_m(), Some(40.0));

        structure.bridge_length_m = None;
        assert_eq!(structure.length_m(), Some(6.0));

        structure.culvert_span_m = None;
        assert!((structure.length_m().unwrap() - 100.0).abs() < 1e-9);

        structure.start_chainage_km = None;
        assert!((structure.length_m().unwrap() - 200.0).abs() < 1e-9);

        structure.line_length_km = None;
        assert_eq!(structure.length_m(), None);
    }
}
