//! Plan detail resolution
//!
//! Fixed lookup from an offered 529 plan name to its short description.

use serde::{Deserialize, Serialize};

/// A selectable plan and the bullets shown once it is picked
pub struct PlanOption {
    pub name: &'static str,
    pub bullets: &'static [&'static str],
}

pub const PLAN_OPTIONS: &[PlanOption] = &[
    PlanOption {
        name: "New York's 529 College Savings Program",
        bullets: &[
            "Offers tax advantages for residents.",
            "Wide range of investment options.",
            "Low fees and flexible contributions.",
        ],
    },
    PlanOption {
        name: "Utah's my529 Plan",
        bullets: &[
            "Known for low fees and flexibility.",
            "Variety of investment choices.",
            "Highly rated by financial experts.",
        ],
    },
];

/// Description attached to an exchange after a plan is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDetail {
    pub plan: String,
    pub bullets: Vec<String>,
}

/// Look up a plan by exact option name. Unknown names resolve to nothing.
pub fn resolve_plan(option: &str) -> Option<PlanDetail> {
    PLAN_OPTIONS
        .iter()
        .find(|p| p.name == option)
        .map(|p| PlanDetail {
            plan: p.name.to_string(),
            bullets: p.bullets.iter().map(|b| (*b).to_string()).collect(),
        })
}
