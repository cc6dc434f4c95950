#[path = "property/risk_invariants.rs"]
mod risk_invariants;
