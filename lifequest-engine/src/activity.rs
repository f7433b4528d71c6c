//! Activity inputs and the classifier that prices them.
//!
//! Every loggable action is an [`Activity`]. Classification resolves it to
//! an [`ActivityKind`], a typed [`Category`], a display label, and the
//! magnitude/modifier pair the XP calculator consumes.
use serde::{Deserialize, Serialize};

use crate::rules::RuleBook;

macro_rules! category_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($key:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable key used in rule tables and storage.
            #[must_use]
            pub const fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

category_enum! {
    /// Kind of workout session.
    WorkoutType {
        GymWorkout => ("gym_workout", "Gym Workout"),
        Running => ("running", "Running"),
        Cycling => ("cycling", "Cycling"),
        Swimming => ("swimming", "Swimming"),
        Yoga => ("yoga", "Yoga"),
        Hiit => ("hiit", "HIIT"),
        Sports => ("sports", "Sports"),
        Walking => ("walking", "Walking"),
    }
}

category_enum! {
    /// Perceived workout intensity.
    Intensity {
        Light => ("light", "Light"),
        Moderate => ("moderate", "Moderate"),
        Intense => ("intense", "Intense"),
        Extreme => ("extreme", "Extreme"),
    }
}

category_enum! {
    IncomeCategory {
        Salary => ("salary", "Salary"),
        Freelance => ("freelance", "Freelance"),
        Business => ("business", "Business"),
        Investment => ("investment", "Investment"),
        SideHustle => ("side_hustle", "Side Hustle"),
        Gift => ("gift", "Gift"),
    }
}

category_enum! {
    ExpenseCategory {
        Housing => ("housing", "Housing"),
        Food => ("food", "Food"),
        Transport => ("transport", "Transport"),
        Health => ("health", "Health"),
        Education => ("education", "Education"),
        Entertainment => ("entertainment", "Entertainment"),
        Shopping => ("shopping", "Shopping"),
        Other => ("other", "Other"),
    }
}

category_enum! {
    LearningCategory {
        Reading => ("reading", "Reading"),
        OnlineCourse => ("online_course", "Online Course"),
        Coding => ("coding", "Coding"),
        Language => ("language", "Language"),
        Practice => ("practice", "Deliberate Practice"),
        Podcast => ("podcast", "Podcast"),
    }
}

category_enum! {
    SocialCategory {
        Family => ("family", "Family"),
        Friends => ("friends", "Friends"),
        Romantic => ("romantic", "Romantic"),
        Networking => ("networking", "Networking"),
        Community => ("community", "Community"),
        Mentorship => ("mentorship", "Mentorship"),
    }
}

category_enum! {
    /// Habits that cost XP per hour spent.
    TimeWaster {
        SocialMediaReels => ("social_media_reels", "Social Media / Reels"),
        BingeWatching => ("binge_watching", "Binge Watching"),
        Gaming => ("gaming", "Excessive Gaming"),
        Procrastination => ("procrastination", "Procrastination"),
        Oversleeping => ("oversleeping", "Oversleeping"),
        Gossip => ("gossip", "Gossip"),
    }
}

/// Broad kind of a ledger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityKind {
    Workout,
    Transaction,
    LearningSession,
    SocialInteraction,
    Punishment,
    MissionCompletion,
    GoalContribution,
    ZoneUnlock,
    ApplicationUpdate,
}

/// Direction of a money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlow {
    Income(IncomeCategory),
    Expense(ExpenseCategory),
}

/// Typed category, one variant per rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", content = "key", rename_all = "snake_case")]
pub enum Category {
    Workout(WorkoutType),
    Income(IncomeCategory),
    Expense(ExpenseCategory),
    Learning(LearningCategory),
    Social(SocialCategory),
    TimeWaster(TimeWaster),
}

impl Category {
    /// Ledger kind this category is logged under.
    #[must_use]
    pub const fn kind(self) -> ActivityKind {
        match self {
            Self::Workout(_) => ActivityKind::Workout,
            Self::Income(_) | Self::Expense(_) => ActivityKind::Transaction,
            Self::Learning(_) => ActivityKind::LearningSession,
            Self::Social(_) => ActivityKind::SocialInteraction,
            Self::TimeWaster(_) => ActivityKind::Punishment,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Workout(c) => c.label(),
            Self::Income(c) => c.label(),
            Self::Expense(c) => c.label(),
            Self::Learning(c) => c.label(),
            Self::Social(c) => c.label(),
            Self::TimeWaster(c) => c.label(),
        }
    }
}

/// A user-logged action before pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activity {
    Workout {
        workout: WorkoutType,
        intensity: Intensity,
        minutes: f64,
    },
    Transaction {
        flow: CashFlow,
        amount: f64,
        #[serde(default)]
        note: String,
    },
    Learning {
        category: LearningCategory,
        minutes: f64,
        quality: u8,
        #[serde(default)]
        topic: String,
    },
    Social {
        category: SocialCategory,
        minutes: f64,
        quality: u8,
        #[serde(default)]
        with: String,
    },
    TimeWasted {
        category: TimeWaster,
        hours: f64,
    },
}

/// Output of the event classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub kind: ActivityKind,
    pub category: Category,
    pub magnitude: f64,
    /// Intensity multiplier for workouts, 1-5 star quality for learning
    /// and social, 1.0 elsewhere.
    pub modifier: f64,
}

impl Classification {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.category.label()
    }
}

/// Map an activity to its kind, category, and pricing inputs.
#[must_use]
pub fn classify(activity: &Activity, rules: &RuleBook) -> Classification {
    match *activity {
        Activity::Workout {
            workout,
            intensity,
            minutes,
        } => Classification {
            kind: ActivityKind::Workout,
            category: Category::Workout(workout),
            magnitude: minutes,
            modifier: rules.intensity_multiplier(intensity),
        },
        Activity::Transaction { flow, amount, .. } => {
            let category = match flow {
                CashFlow::Income(c) => Category::Income(c),
                CashFlow::Expense(c) => Category::Expense(c),
            };
            Classification {
                kind: ActivityKind::Transaction,
                category,
                magnitude: amount,
                modifier: 1.0,
            }
        }
        Activity::Learning {
            category,
            minutes,
            quality,
            ..
        } => Classification {
            kind: ActivityKind::LearningSession,
            category: Category::Learning(category),
            magnitude: minutes,
            modifier: f64::from(quality),
        },
        Activity::Social {
            category,
            minutes,
            quality,
            ..
        } => Classification {
            kind: ActivityKind::SocialInteraction,
            category: Category::Social(category),
            magnitude: minutes,
            modifier: f64::from(quality),
        },
        Activity::TimeWasted { category, hours } => Classification {
            kind: ActivityKind::Punishment,
            category: Category::TimeWaster(category),
            magnitude: hours,
            modifier: 1.0,
        },
    }
}
