//! Level curve derived from cumulative net XP.
use serde::{Deserialize, Serialize};

use crate::constants::LEVEL_BASE_XP;

/// Advancing from level `n` to `n + 1` costs `base_xp * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCurve {
    pub base_xp: i64,
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            base_xp: LEVEL_BASE_XP,
        }
    }
}

/// Snapshot of where a total sits on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u32,
    pub xp_into_level: i64,
    pub xp_for_next: i64,
    /// Whole percent toward the next level, 0-100.
    pub progress_pct: u8,
}

impl LevelCurve {
    /// Cumulative XP needed to reach `level`, saturating at `i64::MAX`.
    /// Level 1 starts at zero.
    #[must_use]
    pub fn threshold(&self, level: u32) -> i64 {
        let n = i128::from(level.max(1));
        i128::from(self.base_xp.max(1))
            .checked_mul(n * (n - 1) / 2)
            .and_then(|xp| i64::try_from(xp).ok())
            .unwrap_or(i64::MAX)
    }

    /// Level reached with `net_xp`; never below 1, non-decreasing in `net_xp`.
    #[must_use]
    pub fn level_for(&self, net_xp: i64) -> u32 {
        // Largest level whose threshold is within reach; thresholds are monotonic.
        let (mut low, mut high) = (1_u32, u32::MAX);
        while low < high {
            let mid = low + (high - low).div_ceil(2);
            if self.threshold(mid) <= net_xp {
                low = mid;
            } else {
                high = mid - 1;
            }
        }
        low
    }

    #[must_use]
    pub fn info(&self, net_xp: i64) -> LevelInfo {
        let level = self.level_for(net_xp);
        let floor = self.threshold(level);
        let span = self.threshold(level.saturating_add(1)) - floor;
        let into = (net_xp - floor).max(0);
        let pct = if span > 0 {
            u8::try_from((into.saturating_mul(100) / span).clamp(0, 100)).unwrap_or(100)
        } else {
            100
        };
        LevelInfo {
            level,
            xp_into_level: into,
            xp_for_next: (span - into).max(0),
            progress_pct: pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_follow_triangular_curve() {
        let curve = LevelCurve::default();
        assert_eq!(curve.threshold(1), 0);
        assert_eq!(curve.threshold(2), 500);
        assert_eq!(curve.threshold(3), 1_500);
        assert_eq!(curve.threshold(4), 3_000);
    }

    #[test]
    fn negative_and_zero_xp_stay_level_one() {
        let curve = LevelCurve::default();
        assert_eq!(curve.level_for(-5_000), 1);
        assert_eq!(curve.level_for(0), 1);
        assert_eq!(curve.level_for(499), 1);
        assert_eq!(curve.level_for(500), 2);
    }

    #[test]
    fn level_is_monotonic() {
        let curve = LevelCurve::default();
        let mut last = 0;
        for xp in (-1_000..20_000).step_by(37) {
            let level = curve.level_for(xp);
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn info_reports_progress() {
        let info = LevelCurve::default().info(1_000);
        assert_eq!(info.level, 2);
        assert_eq!(info.xp_into_level, 500);
        assert_eq!(info.xp_for_next, 500);
        assert_eq!(info.progress_pct, 50);
    }

    #[test]
    fn huge_totals_resolve_without_scanning() {
        let curve = LevelCurve::default();
        let top = curve.level_for(i64::MAX);
        assert_eq!(top, u32::MAX);

        let near = curve.level_for(i64::MAX / 2);
        assert!(curve.threshold(near) <= i64::MAX / 2);
        assert!(curve.threshold(near + 1) > i64::MAX / 2);

        let info = curve.info(i64::MAX);
        assert_eq!(info.level, u32::MAX);
        assert!(info.xp_for_next >= 0);
        assert_eq!(info.progress_pct, 100);
    }

    #[test]
    fn search_matches_thresholds_on_small_totals() {
        let curve = LevelCurve { base_xp: 7 };
        for xp in 0..2_000 {
            let level = curve.level_for(xp);
            assert!(curve.threshold(level) <= xp);
            assert!(curve.threshold(level + 1) > xp);
        }
    }
}
