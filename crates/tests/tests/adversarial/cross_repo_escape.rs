//! Adversarial test: paths cannot escape their repository.
//!
//! Separation checks must reject home-repository paths under any spelling,
//! paths under no registered root, and paths owned by a repository other
//! than the one the operation is scoped to.

use aegis_isolation::{IsolationError, RepositoryIsolationGuard};
use aegis_types::RepositoryContext;

fn guard() -> RepositoryIsolationGuard {
    let guard = RepositoryIsolationGuard::new("agent-home", "/srv/agent");
    guard.register_repository("workspace", "/srv/workspace");
    guard.register_repository("sandbox", "/srv/sandbox");
    guard
}

#[test]
fn home_paths_are_rejected_under_any_spelling() {
    let guard = guard();
    for spelling in [
        "/srv/agent/src/main.rs",
        "/SRV/AGENT/src/main.rs",
        "\\srv\\agent\\src\\main.rs",
        "/srv/Agent/",
        "/srv/agent",
    ] {
        assert!(
            matches!(
                guard.verify_separation(spelling, None),
                Err(IsolationError::HomeRepositoryWrite { .. })
            ),
            "spelling not rejected: {}",
            spelling
        );
    }
}

#[test]
fn prefix_lookalikes_are_not_the_home_repository() {
    let guard = guard();
    // "/srv/agent-data" shares a prefix with "/srv/agent" but is a
    // different directory; it is merely unregistered.
    assert!(matches!(
        guard.verify_separation("/srv/agent-data/file.rs", None),
        Err(IsolationError::UnregisteredPath(_))
    ));
}

#[test]
fn unregistered_roots_are_rejected() {
    let guard = guard();
    for path in ["/tmp/evil/file.rs", "/srv/other/file.rs", "relative/path.rs"] {
        assert!(
            guard.verify_separation(path, None).is_err(),
            "path not rejected: {}",
            path
        );
    }
}

#[test]
fn scoped_operations_cannot_reach_a_sibling_repository() {
    let guard = guard();
    let _scope = guard.enter(RepositoryContext::new("workspace", "/srv/workspace"));

    // In bounds.
    assert!(guard
        .verify_separation("/srv/workspace/src/lib.rs", None)
        .is_ok());
    // The sibling is registered but out of scope.
    assert!(matches!(
        guard.verify_separation("/srv/sandbox/src/lib.rs", None),
        Err(IsolationError::BoundaryCrossed { .. })
    ));
}

#[test]
fn explicit_expectation_overrides_the_current_context() {
    let guard = guard();
    let _scope = guard.enter(RepositoryContext::new("workspace", "/srv/workspace"));

    // Explicitly scoped to the sandbox, sandbox paths pass.
    assert!(guard
        .verify_separation("/srv/sandbox/src/lib.rs", Some("sandbox"))
        .is_ok());
    // But naming the home repository does not open it up.
    assert!(guard
        .verify_separation("/srv/agent/src/lib.rs", Some("agent-home"))
        .is_err());
}

#[test]
fn nested_scopes_keep_boundaries_straight() {
    let guard = guard();
    let _outer = guard.enter(RepositoryContext::new("workspace", "/srv/workspace"));
    {
        let _inner = guard.enter(RepositoryContext::new("sandbox", "/srv/sandbox"));
        assert!(guard
            .verify_separation("/srv/sandbox/src/lib.rs", None)
            .is_ok());
        assert!(guard
            .verify_separation("/srv/workspace/src/lib.rs", None)
            .is_err());
    }
    // Back in the outer scope, the workspace is in bounds again.
    assert!(guard
        .verify_separation("/srv/workspace/src/lib.rs", None)
        .is_ok());
}
