#[path = "e2e/full_lifecycle.rs"]
mod full_lifecycle;

#[path = "e2e/consultation_learning.rs"]
mod consultation_learning;

#[path = "e2e/rollback_flows.rs"]
mod rollback_flows;

#[path = "e2e/audit_export.rs"]
mod audit_export;
