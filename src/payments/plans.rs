use serde::Serialize;

use crate::error::AppError;

/// A purchasable credit bundle. `price` is in whole currency units.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Plan {
    pub id: &'static str,
    pub price: i64,
    pub credits: i64,
    pub desc: &'static str,
}

pub static PLANS: [Plan; 3] = [
    Plan {
        id: "Basic",
        price: 10,
        credits: 100,
        desc: "Best for personal use.",
    },
    Plan {
        id: "Advanced",
        price: 50,
        credits: 500,
        desc: "Best for business use.",
    },
    Plan {
        id: "Business",
        price: 250,
        credits: 5000,
        desc: "Best for enterprise use.",
    },
];

pub fn find_plan(id: &str) -> Result<&'static Plan, AppError> {
    PLANS
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::UnknownPlan(id.to_string()))
}
