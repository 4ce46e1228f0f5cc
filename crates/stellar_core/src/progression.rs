//! Reputation curve and user progression.
//!
//! Level grows logarithmically with points:
//!
//! ```text
//! level(p) = floor(ln(p / BASE + 1) / ln(GROWTH))     p > 0
//! ```

use serde::{Deserialize, Serialize};

use crate::planet::{PlanetId, UserId};

/// Points scale of the curve.
pub const REPUTATION_BASE: f64 = 100.0;

/// Growth factor between consecutive levels.
pub const REPUTATION_GROWTH: f64 = 1.5;

/// Reputation level for a point total. Non-positive totals are level 0.
#[must_use]
pub fn calculate_reputation_level(points: i64) -> u32 {
    if points <= 0 {
        return 0;
    }
    let level = ((points as f64 / REPUTATION_BASE + 1.0).ln() / REPUTATION_GROWTH.ln()).floor();
    level as u32
}

/// Smallest point total that reaches `level`.
///
/// Starts from `floor(BASE * (GROWTH^level - 1))` and steps to the exact
/// boundary of the floored curve, so
/// `calculate_reputation_level(required_points_for_level(l)) == l` holds
/// for every level whose point total fits in `i64`.
#[must_use]
pub fn required_points_for_level(level: u32) -> u64 {
    if level == 0 {
        return 0;
    }
    let estimate = (REPUTATION_BASE * (REPUTATION_GROWTH.powf(f64::from(level)) - 1.0)).floor();
    if !estimate.is_finite() || estimate >= i64::MAX as f64 {
        return i64::MAX as u64;
    }

    let mut points = estimate.max(0.0) as i64;
    while points < i64::MAX && calculate_reputation_level(points) < level {
        points += 1;
    }
    while points > 0 && calculate_reputation_level(points - 1) >= level {
        points -= 1;
    }
    points as u64
}

/// A player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique id.
    pub id: UserId,
    /// Season the user plays in.
    #[serde(default)]
    pub season: u32,
    /// Tutorial progress.
    #[serde(default)]
    pub onboarding_step: u32,
    /// Home planet, once chosen.
    #[serde(default)]
    pub home_planet: Option<PlanetId>,
    /// Leaderboard score.
    #[serde(default)]
    pub score: u64,
    /// Reputation level, always derived from `reputation_points`.
    #[serde(default)]
    pub level: u32,
    /// Experience points.
    #[serde(default)]
    pub xp: u64,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Accumulated reputation.
    #[serde(default)]
    pub reputation_points: i64,
}

impl User {
    /// A new user with no progress.
    #[must_use]
    pub fn new(id: impl Into<UserId>, season: u32) -> Self {
        Self {
            id: id.into(),
            season,
            onboarding_step: 0,
            home_planet: None,
            score: 0,
            level: 0,
            xp: 0,
            title: String::new(),
            reputation_points: 0,
        }
    }

    /// Recompute `level` from `reputation_points`.
    pub fn refresh_level(&mut self) {
        self.level = calculate_reputation_level(self.reputation_points);
    }

    /// Add (or remove) reputation. Returns the number of levels gained.
    pub fn award_reputation(&mut self, points: i64) -> u32 {
        let before = self.level;
        self.reputation_points = self.reputation_points.saturating_add(points);
        self.refresh_level();
        if self.level > before {
            tracing::info!(
                user = %self.id,
                from = before,
                to = self.level,
                points = self.reputation_points,
                "Reputation level up"
            );
        }
        self.level.saturating_sub(before)
    }

    /// Points still needed for the next level.
    #[must_use]
    pub fn points_to_next_level(&self) -> u64 {
        let next = required_points_for_level(self.level + 1);
        next.saturating_sub(self.reputation_points.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_points_are_level_zero() {
        assert_eq!(calculate_reputation_level(0), 0);
        assert_eq!(calculate_reputation_level(-500), 0);
        assert_eq!(calculate_reputation_level(i64::MIN), 0);
    }

    #[test]
    fn test_known_levels() {
        // 100 * (1.5 - 1) = 50
        assert_eq!(calculate_reputation_level(49), 0);
        assert_eq!(calculate_reputation_level(50), 1);
        // 100 * (2.25 - 1) = 125
        assert_eq!(calculate_reputation_level(125), 2);
        assert_eq!(required_points_for_level(1), 50);
        assert_eq!(required_points_for_level(2), 125);
    }

    #[test]
    fn test_inverse_lands_on_boundary() {
        for level in 0..=40 {
            let points = required_points_for_level(level);
            assert_eq!(calculate_reputation_level(points as i64), level, "level {level}");
            if points > 0 {
                assert!(calculate_reputation_level(points as i64 - 1) < level);
            }
        }
    }

    #[test]
    fn test_award_reputation() {
        let mut user = User::new("u1", 1);
        assert_eq!(user.award_reputation(49), 0);
        assert_eq!(user.points_to_next_level(), 1);
        assert_eq!(user.award_reputation(80), 2);
        assert_eq!(user.level, 2);

        // Penalties can drop the level again
        user.award_reputation(-200);
        assert_eq!(user.level, 0);
    }

    #[test]
    fn test_user_document_defaults() {
        let user: User = serde_json::from_str(r#"{"id": "u9"}"#).unwrap();
        assert_eq!(user.level, 0);
        assert!(user.home_planet.is_none());
    }
}
