//! Repair material and cost estimation.
//!
//! A static pricing table maps each severity band to a repair material, a
//! cost per bag (INR), and the area one bag repairs. Bag count always rounds
//! up and is never below one, so even a zero-area report gets a usable quote.

use serde::Serialize;

use crate::severity::Severity;

/// Pricing entry for one severity band.
#[derive(Debug, Clone, Copy)]
pub struct MaterialPricing {
    pub material: &'static str,
    pub cost_per_bag: f64,
    /// Area in m^2 that one bag repairs.
    pub coverage_m2: f64,
}

/// Repair estimate derived from severity and total area.
#[derive(Debug, Clone, Serialize)]
pub struct RepairEstimate {
    pub material: &'static str,
    pub bags_required: u32,
    pub estimated_cost: f64,
}

/// Look up the pricing entry for a severity band.
pub fn pricing_for(severity: Severity) -> MaterialPricing {
    match severity {
        Severity::Minor => MaterialPricing {
            material: "Cold Patch Asphalt",
            cost_per_bag: 350.0,
            coverage_m2: 0.15,
        },
        Severity::Moderate => MaterialPricing {
            material: "Cold Mix Asphalt",
            cost_per_bag: 480.0,
            coverage_m2: 0.12,
        },
        Severity::Severe => MaterialPricing {
            material: "Hot Mix Asphalt",
            cost_per_bag: 650.0,
            coverage_m2: 0.10,
        },
        Severity::Critical => MaterialPricing {
            material: "Premium Hot Mix Asphalt",
            cost_per_bag: 850.0,
            coverage_m2: 0.08,
        },
    }
}

/// Estimate the repair material, bag count, and cost for a report.
///
/// `bags = max(1, ceil(area / coverage))` and `cost = bags * cost_per_bag`
/// exactly -- no rounding beyond the bag-count ceiling.
pub fn estimate_repair(severity: Severity, total_area_m2: f64) -> RepairEstimate {
    let pricing = pricing_for(severity);
    let bags_required = ((total_area_m2 / pricing.coverage_m2).ceil() as u32).max(1);
    RepairEstimate {
        material: pricing.material,
        bags_required,
        estimated_cost: bags_required as f64 * pricing.cost_per_bag,
    }
}
