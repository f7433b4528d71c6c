//! XP calculator.
//!
//! Pure pricing of classified activities. Zero, negative, or non-finite
//! magnitudes price at zero; nothing in here panics.
use crate::activity::{ActivityKind, Category, Classification};
use crate::constants::{
    LEARNING_BLOCK_MINUTES, LEARNING_BLOCK_XP, LEARNING_QUALITY_OFFSET, LEARNING_QUALITY_SLOPE,
    LOG_XP, QUALITY_MAX, QUALITY_MIN, SOCIAL_BLOCK_MINUTES, SOCIAL_BLOCK_XP,
    SOCIAL_QUALITY_OFFSET, SOCIAL_QUALITY_SLOPE, WORKOUT_BLOCK_MINUTES, WORKOUT_BLOCK_XP,
};
use crate::numbers::{floor_f64_to_i64, i64_to_f64, positive_magnitude, trunc_f64_to_i64};
use crate::rules::RuleBook;

/// Price an activity.
///
/// `modifier` is the workout intensity multiplier or the 1-5 quality
/// rating for learning and social entries; other kinds ignore it. A
/// `kind` that does not match `category` prices at zero.
#[must_use]
pub fn compute_xp(
    kind: ActivityKind,
    category: Category,
    magnitude: f64,
    modifier: f64,
    rules: &RuleBook,
) -> i64 {
    if category.kind() != kind {
        log::debug!(target: LOG_XP, "kind {kind:?} does not match category {category:?}");
        return 0;
    }
    let Some(magnitude) = positive_magnitude(magnitude) else {
        return 0;
    };

    let xp = match category {
        Category::Workout(workout) => {
            let multiplier = if modifier.is_finite() && modifier > 0.0 {
                modifier
            } else {
                1.0
            };
            let base = floor_f64_to_i64(i64_to_f64(rules.workout_base(workout)) * multiplier);
            base.saturating_add(
                blocks(magnitude, WORKOUT_BLOCK_MINUTES).saturating_mul(WORKOUT_BLOCK_XP),
            )
        }
        Category::Income(income) => floor_f64_to_i64(magnitude * rules.income_multiplier(income)),
        Category::Expense(expense) => {
            floor_f64_to_i64(magnitude * rules.expense_penalty_rate(expense)).saturating_neg()
        }
        Category::Learning(learning) => {
            let factor = quality(modifier) * LEARNING_QUALITY_SLOPE + LEARNING_QUALITY_OFFSET;
            floor_f64_to_i64(i64_to_f64(rules.learning_base(learning)) * factor).saturating_add(
                blocks(magnitude, LEARNING_BLOCK_MINUTES).saturating_mul(LEARNING_BLOCK_XP),
            )
        }
        Category::Social(social) => {
            let factor = quality(modifier) * SOCIAL_QUALITY_SLOPE + SOCIAL_QUALITY_OFFSET;
            let bonus = i64_to_f64(blocks(magnitude, SOCIAL_BLOCK_MINUTES)) * SOCIAL_BLOCK_XP;
            floor_f64_to_i64(i64_to_f64(rules.social_base(social)) * factor + bonus)
        }
        Category::TimeWaster(waster) => {
            let lost = trunc_f64_to_i64(i64_to_f64(rules.penalty_per_hour(waster)) * magnitude);
            lost.saturating_abs().saturating_neg()
        }
    };
    log::debug!(target: LOG_XP, "{} x{magnitude} -> {xp} XP", category.label());
    xp
}

/// Price the output of [`crate::activity::classify`].
#[must_use]
pub fn price(classification: &Classification, rules: &RuleBook) -> i64 {
    compute_xp(
        classification.kind,
        classification.category,
        classification.magnitude,
        classification.modifier,
        rules,
    )
}

fn blocks(magnitude: f64, block: f64) -> i64 {
    floor_f64_to_i64(magnitude / block)
}

fn quality(modifier: f64) -> f64 {
    if modifier.is_finite() {
        modifier.clamp(QUALITY_MIN, QUALITY_MAX)
    } else {
        QUALITY_MIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{
        ExpenseCategory, IncomeCategory, LearningCategory, SocialCategory, TimeWaster, WorkoutType,
    };

    fn rules() -> RuleBook {
        RuleBook::load_from_static().unwrap()
    }

    #[test]
    fn gym_workout_moderate_45_minutes() {
        let xp = compute_xp(
            ActivityKind::Workout,
            Category::Workout(WorkoutType::GymWorkout),
            45.0,
            1.5,
            &rules(),
        );
        assert_eq!(xp, 180);
    }

    #[test]
    fn reels_for_two_hours_costs_100() {
        let xp = compute_xp(
            ActivityKind::Punishment,
            Category::TimeWaster(TimeWaster::SocialMediaReels),
            2.0,
            1.0,
            &rules(),
        );
        assert_eq!(xp, -100);
    }

    #[test]
    fn income_uses_category_multiplier() {
        let xp = compute_xp(
            ActivityKind::Transaction,
            Category::Income(IncomeCategory::Freelance),
            1_234.0,
            1.0,
            &rules(),
        );
        assert_eq!(xp, 61);
    }

    #[test]
    fn essential_expense_is_free_and_shopping_costs() {
        let r = rules();
        let food = compute_xp(
            ActivityKind::Transaction,
            Category::Expense(ExpenseCategory::Food),
            500.0,
            1.0,
            &r,
        );
        let shopping = compute_xp(
            ActivityKind::Transaction,
            Category::Expense(ExpenseCategory::Shopping),
            500.0,
            1.0,
            &r,
        );
        assert_eq!(food, 0);
        assert_eq!(shopping, -15);
    }

    #[test]
    fn social_quality_scales_base() {
        // floor(50 * (4 * 0.3 + 0.7) + floor(60 / 30) * 10) = floor(95 + 20)
        let xp = compute_xp(
            ActivityKind::SocialInteraction,
            Category::Social(SocialCategory::Family),
            60.0,
            4.0,
            &rules(),
        );
        assert_eq!(xp, 115);
    }

    #[test]
    fn learning_quality_is_clamped() {
        let r = rules();
        let wild = compute_xp(
            ActivityKind::LearningSession,
            Category::Learning(LearningCategory::Coding),
            90.0,
            42.0,
            &r,
        );
        let five = compute_xp(
            ActivityKind::LearningSession,
            Category::Learning(LearningCategory::Coding),
            90.0,
            5.0,
            &r,
        );
        // floor(90 * 1.6) + 3 * 15
        assert_eq!(five, 189);
        assert_eq!(wild, five);
    }

    #[test]
    fn pricing_saturates_on_huge_magnitudes() {
        let r = rules();
        let income = |amount| {
            compute_xp(
                ActivityKind::Transaction,
                Category::Income(IncomeCategory::Business),
                amount,
                1.0,
                &r,
            )
        };
        assert!(income(1e20) <= income(1.2e20));
        assert_eq!(income(1.2e20), i64::MAX);

        let reels = compute_xp(
            ActivityKind::Punishment,
            Category::TimeWaster(TimeWaster::SocialMediaReels),
            2e17,
            1.0,
            &r,
        );
        assert_eq!(reels, -i64::MAX);

        let marathon = compute_xp(
            ActivityKind::Workout,
            Category::Workout(WorkoutType::GymWorkout),
            1e30,
            1.0,
            &r,
        );
        assert_eq!(marathon, i64::MAX);
    }

    #[test]
    fn non_positive_magnitude_yields_zero() {
        let r = rules();
        for magnitude in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            let xp = compute_xp(
                ActivityKind::Punishment,
                Category::TimeWaster(TimeWaster::Gaming),
                magnitude,
                1.0,
                &r,
            );
            assert_eq!(xp, 0, "magnitude {magnitude}");
        }
    }

    #[test]
    fn mismatched_kind_yields_zero() {
        let xp = compute_xp(
            ActivityKind::Workout,
            Category::Income(IncomeCategory::Salary),
            1_000.0,
            1.0,
            &rules(),
        );
        assert_eq!(xp, 0);
    }
}
