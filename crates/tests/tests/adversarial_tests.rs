#[path = "adversarial/bypass_guard.rs"]
mod bypass_guard;

#[path = "adversarial/invalid_promotions.rs"]
mod invalid_promotions;

#[path = "adversarial/cross_repo_escape.rs"]
mod cross_repo_escape;
