use crate::shared::constants::BADGE_POINTS;

/// Counters a badge predicate is evaluated against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeStats {
    pub total_reports: i32,
    pub total_likes_received: i32,
    pub total_comments_received: i32,
    pub emergency_reports: i32,
    /// Not tracked yet; always zero
    pub false_reports_caught: i32,
}

#[derive(Debug, Clone)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub points: i32,
    pub predicate: fn(&BadgeStats) -> bool,
}

/// Ordered set of badges. Evaluation order is declaration order.
#[derive(Debug, Clone)]
pub struct BadgeCatalog {
    badges: Vec<BadgeDefinition>,
}

impl BadgeCatalog {
    pub fn new(badges: Vec<BadgeDefinition>) -> Self {
        Self { badges }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            BadgeDefinition {
                id: "first_report",
                name: "First Report",
                description: "Submitted your first complaint",
                icon: "🎯",
                points: BADGE_POINTS,
                predicate: |s| s.total_reports >= 1,
            },
            BadgeDefinition {
                id: "top_contributor",
                name: "Top Contributor",
                description: "Submitted 10+ complaints",
                icon: "⭐",
                points: BADGE_POINTS,
                predicate: |s| s.total_reports >= 10,
            },
            BadgeDefinition {
                id: "neighborhood_hero",
                name: "Neighborhood Hero",
                description: "Submitted 50+ complaints",
                icon: "🦸",
                points: BADGE_POINTS,
                predicate: |s| s.total_reports >= 50,
            },
            BadgeDefinition {
                id: "helpful",
                name: "Helpful",
                description: "Received 50+ likes on your reports",
                icon: "👍",
                points: BADGE_POINTS,
                predicate: |s| s.total_likes_received >= 50,
            },
            BadgeDefinition {
                id: "eagle_eye",
                name: "Eagle Eye",
                description: "Identified 5+ false reports",
                icon: "🦅",
                points: BADGE_POINTS,
                predicate: |s| s.false_reports_caught >= 5,
            },
            BadgeDefinition {
                id: "community_star",
                name: "Community Star",
                description: "100+ total engagement (likes + comments)",
                icon: "🌟",
                points: BADGE_POINTS,
                predicate: |s| s.total_likes_received + s.total_comments_received >= 100,
            },
            BadgeDefinition {
                id: "emergency_reporter",
                name: "Emergency Reporter",
                description: "Reported 5+ emergency issues",
                icon: "🚨",
                points: BADGE_POINTS,
                predicate: |s| s.emergency_reports >= 5,
            },
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.badges.iter()
    }

    pub fn get(&self, id: &str) -> Option<&BadgeDefinition> {
        self.badges.iter().find(|b| b.id == id)
    }

    /// Badges whose predicate holds and that are not in `held`, in catalog order.
    pub fn newly_earned(&self, held: &[String], stats: &BadgeStats) -> Vec<&BadgeDefinition> {
        self.badges
            .iter()
            .filter(|b| !held.iter().any(|h| h == b.id))
            .filter(|b| (b.predicate)(stats))
            .collect()
    }
}

impl Default for BadgeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
