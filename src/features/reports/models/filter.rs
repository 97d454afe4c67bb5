use serde::Deserialize;
use utoipa::ToSchema;

use crate::features::reports::models::{Report, ReportPriority, ReportStatus};
use crate::shared::types::PaginationQuery;

/// Kilometres per degree of latitude
const KM_PER_DEGREE: f64 = 111.32;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportSortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    ViewCount,
    Priority,
}

impl ReportSortBy {
    pub fn column(&self) -> &'static str {
        match self {
            ReportSortBy::CreatedAt => "created_at",
            ReportSortBy::UpdatedAt => "updated_at",
            ReportSortBy::ViewCount => "view_count",
            ReportSortBy::Priority => "priority",
        }
    }
}

/// Rectangular approximation of a search radius around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn around(lat: f64, lng: f64, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE;
        // Longitude degrees shrink towards the poles; clamp to avoid dividing by ~0
        let lng_delta = radius_km / (KM_PER_DEGREE * lat.to_radians().cos().max(0.01));

        Self {
            min_lat: (lat - lat_delta).max(-90.0),
            max_lat: (lat + lat_delta).min(90.0),
            min_lng: lng - lng_delta,
            max_lng: lng + lng_delta,
        }
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

/// Criteria for listing reports
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<ReportStatus>,
    pub priority: Option<ReportPriority>,
    pub is_emergency: Option<bool>,
    pub bounds: Option<BoundingBox>,
    pub sort_by: ReportSortBy,
    pub sort_order: SortOrder,
    pub pagination: PaginationQuery,
}

impl ReportFilter {
    /// Search term wrapped for `ILIKE`, with wildcard characters escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                let escaped = s
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{}%", escaped)
            })
    }

    /// In-process equivalent of the SQL `WHERE` clause.
    pub fn matches(&self, report: &Report) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let term = term.to_lowercase();
            let in_description = report
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term));
            if !in_description && !report.category.to_lowercase().contains(&term) {
                return false;
            }
        }
        if self.category.as_deref().is_some_and(|c| c != report.category) {
            return false;
        }
        if self.status.is_some_and(|s| s != report.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != report.priority) {
            return false;
        }
        if self.is_emergency.is_some_and(|e| e != report.is_emergency) {
            return false;
        }
        if self.bounds.is_some_and(|b| !b.contains(report.lat, report.lng)) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_contains_center_and_excludes_far_points() {
        // Connaught Place, New Delhi
        let bounds = BoundingBox::around(28.6315, 77.2167, 5.0);
        assert!(bounds.contains(28.6315, 77.2167));
        // India Gate is ~2.5km away
        assert!(bounds.contains(28.6129, 77.2295));
        // Gurugram is ~25km away
        assert!(!bounds.contains(28.4595, 77.0266));
    }

    #[test]
    fn test_bounding_box_widens_longitude_away_from_equator() {
        let equator = BoundingBox::around(0.0, 0.0, 10.0);
        let north = BoundingBox::around(60.0, 0.0, 10.0);
        assert!((north.max_lng - north.min_lng) > (equator.max_lng - equator.min_lng));
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let filter = ReportFilter {
            search: Some(" 50%_off ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.search_pattern().as_deref(), Some("%50\\%\\_off%"));

        let blank = ReportFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank.search_pattern().is_none());
    }
}
