use super::{TestScenario, goals, ledger, lifemap, persistence, smoke};

const CATALOG: &[TestScenario] = &[
    TestScenario {
        name: "smoke",
        description: "Worked XP examples: gym workout, reels penalty, savings goal",
        run: smoke::run,
    },
    TestScenario {
        name: "ledger",
        description: "Random record/remove sequences keep sum(xp) == net",
        run: ledger::run,
    },
    TestScenario {
        name: "goals",
        description: "Random contributions stay clamped and pay the bonus once",
        run: goals::run,
    },
    TestScenario {
        name: "lifemap",
        description: "Random unlock/complete/tick keeps gauges bounded, missions one-time",
        run: lifemap::run,
    },
    TestScenario {
        name: "persistence",
        description: "Debounced saves into the JSON file store reload intact",
        run: persistence::run,
    },
];

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    CATALOG.iter().map(|s| (s.name, s.description))
}

pub fn get_scenario(name: &str) -> Option<&'static TestScenario> {
    CATALOG.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

pub fn all_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|s| s.name)
}
