//! Trigger evaluation.
//!
//! Decides whether an inbound event fires a workflow definition. Evaluation
//! is fail-closed: a missing or unrecognized trigger never matches, so a
//! malformed definition cannot start a build by accident.
//!
//! Two modes exist for `Detailed` triggers:
//! - `KeyMembership` (default): the event type must be a key of the mapping.
//! - `BranchFilters` (opt-in): additionally, the constraint mapping's
//!   `branches` / `branches-ignore` glob lists are applied to the event branch.

use serde_json::Value;

use gantry_types::config::TriggerMode;
use gantry_types::event::InboundEvent;
use gantry_types::workflow::TriggerSpec;

/// Constraint key listing branches that may fire the trigger.
pub const BRANCHES_KEY: &str = "branches";
/// Constraint key listing branches that must not fire the trigger.
pub const BRANCHES_IGNORE_KEY: &str = "branches-ignore";

/// Baseline match contract: event type against trigger shape only.
pub fn matches(event_type: &str, trigger: Option<&TriggerSpec>) -> bool {
    match trigger {
        None => false,
        Some(TriggerSpec::Single(t)) => t == event_type,
        Some(TriggerSpec::Set(list)) => list.iter().any(|t| t == event_type),
        Some(TriggerSpec::Detailed(map)) => map.contains_key(event_type),
        Some(TriggerSpec::Unrecognized(value)) => {
            tracing::debug!(%value, "ambiguous trigger spec treated as non-matching");
            false
        }
    }
}

/// Stateless evaluator configured with a `TriggerMode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerEvaluator {
    mode: TriggerMode,
}

impl TriggerEvaluator {
    pub fn new(mode: TriggerMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    /// Whether `event` fires a definition with the given trigger.
    pub fn matches(&self, event: &InboundEvent, trigger: Option<&TriggerSpec>) -> bool {
        if !matches(&event.event_type, trigger) {
            return false;
        }
        match (self.mode, trigger) {
            (TriggerMode::BranchFilters, Some(TriggerSpec::Detailed(map))) => map
                .get(&event.event_type)
                .is_none_or(|constraints| branch_filters_allow(constraints, &event.git_ref)),
            _ => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Branch filters
// ---------------------------------------------------------------------------

/// Apply `branches` / `branches-ignore` constraints to `branch`.
///
/// A constraint payload that is not a mapping (e.g. `push:` with no body)
/// imposes no filter. A filter list of the wrong shape fails closed.
fn branch_filters_allow(constraints: &Value, branch: &str) -> bool {
    let Some(map) = constraints.as_object() else {
        return true;
    };

    if let Some(include) = map.get(BRANCHES_KEY) {
        match pattern_list(include) {
            Some(patterns) if patterns.iter().any(|p| glob_match(p, branch)) => {}
            _ => return false,
        }
    }

    if let Some(exclude) = map.get(BRANCHES_IGNORE_KEY) {
        match pattern_list(exclude) {
            Some(patterns) if !patterns.iter().any(|p| glob_match(p, branch)) => {}
            _ => return false,
        }
    }

    true
}

/// Accept a single pattern string or a list of pattern strings.
fn pattern_list(value: &Value) -> Option<Vec<&str>> {
    match value {
        Value::String(s) => Some(vec![s.as_str()]),
        Value::Array(items) => items.iter().map(Value::as_str).collect(),
        _ => None,
    }
}

/// Glob matching for branch names: `*`, `?`, and `[...]` classes
/// (with `!` negation and `a-z` ranges).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    // Greedy single-star backtracking: only the most recent `*` is ever
    // revisited, so matching stays O(pattern * text).
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if pattern.get(p) == Some(&'*') {
            star = Some((p + 1, t));
            p += 1;
            continue;
        }
        if let Some(width) = match_token(&pattern[p..], text[t]) {
            p += width;
            t += 1;
            continue;
        }
        match star {
            Some((after_star, star_t)) => {
                p = after_star;
                t = star_t + 1;
                star = Some((after_star, star_t + 1));
            }
            None => return false,
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

/// Match one non-`*` pattern token against `c`, returning how many pattern
/// chars it spans.
fn match_token(pattern: &[char], c: char) -> Option<usize> {
    let (&head, rest) = pattern.split_first()?;
    match head {
        '*' => None,
        '?' => Some(1),
        '[' => match class_end(rest) {
            Some(end) => class_contains(&rest[..end], c).then_some(end + 2),
            None => (c == '[').then_some(1),
        },
        literal => (literal == c).then_some(1),
    }
}

/// Index of the closing `]` of a character class body.
fn class_end(body: &[char]) -> Option<usize> {
    body.iter().position(|&c| c == ']')
}

fn class_contains(body: &[char], c: char) -> bool {
    let (negated, body) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };
    let mut found = false;
    let mut i = 0;
    while i < body.len() {
        if i + 2 < body.len() && body[i + 1] == '-' {
            found |= body[i] <= c && c <= body[i + 2];
            i += 3;
        } else {
            found |= body[i] == c;
            i += 1;
        }
    }
    found != negated
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_types::event::RepositoryInfo;
    use serde_json::json;

    const EVENT_TYPES: &[&str] = &["push", "pull_request", "release", "issues", ""];

    fn event(event_type: &str, branch: &str) -> InboundEvent {
        InboundEvent::new(
            event_type,
            RepositoryInfo {
                name: "r".to_string(),
                clone_url: "u".to_string(),
            },
            branch,
            "abc123",
        )
    }

    fn spec(value: serde_json::Value) -> TriggerSpec {
        TriggerSpec::from_value(&value)
    }

    #[test]
    fn test_single_matches_only_equal_event() {
        let t = spec(json!("push"));
        assert!(matches("push", Some(&t)));
        assert!(!matches("pull_request", Some(&t)));
        assert!(!matches("Push", Some(&t)));
    }

    #[test]
    fn test_set_matches_members_only() {
        let t = spec(json!(["push", "release"]));
        for ev in EVENT_TYPES {
            assert_eq!(matches(ev, Some(&t)), *ev == "push" || *ev == "release");
        }
    }

    #[test]
    fn test_detailed_checks_key_membership_only() {
        let t = spec(json!({"push": {"branches": ["release/*"]}, "pull_request": null}));
        assert!(matches("push", Some(&t)));
        assert!(matches("pull_request", Some(&t)));
        assert!(!matches("release", Some(&t)));
    }

    #[test]
    fn test_missing_trigger_never_matches() {
        for ev in EVENT_TYPES {
            assert!(!matches(ev, None));
        }
    }

    #[test]
    fn test_unrecognized_trigger_never_matches() {
        for value in [json!(1), json!(true), json!(null), json!(2.5)] {
            let t = spec(value);
            for ev in EVENT_TYPES {
                assert!(!matches(ev, Some(&t)));
            }
        }
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let evaluator = TriggerEvaluator::default();
        let ev = event("push", "main");
        let t = spec(json!(["push"]));
        assert_eq!(
            evaluator.matches(&ev, Some(&t)),
            evaluator.matches(&ev, Some(&t))
        );
    }

    #[test]
    fn test_key_membership_mode_ignores_branch_constraints() {
        let evaluator = TriggerEvaluator::new(TriggerMode::KeyMembership);
        let t = spec(json!({"push": {"branches": ["release/*"]}}));
        assert!(evaluator.matches(&event("push", "main"), Some(&t)));
    }

    #[test]
    fn test_branch_filters_mode_applies_include_list() {
        let evaluator = TriggerEvaluator::new(TriggerMode::BranchFilters);
        let t = spec(json!({"push": {"branches": ["main", "release/*"]}}));
        assert!(evaluator.matches(&event("push", "main"), Some(&t)));
        assert!(evaluator.matches(&event("push", "release/1.2"), Some(&t)));
        assert!(!evaluator.matches(&event("push", "feature/x"), Some(&t)));
    }

    #[test]
    fn test_branch_filters_mode_applies_ignore_list() {
        let evaluator = TriggerEvaluator::new(TriggerMode::BranchFilters);
        let t = spec(json!({"push": {"branches-ignore": "wip-*"}}));
        assert!(evaluator.matches(&event("push", "main"), Some(&t)));
        assert!(!evaluator.matches(&event("push", "wip-123"), Some(&t)));
    }

    #[test]
    fn test_branch_filters_mode_fails_closed_on_bad_shape() {
        let evaluator = TriggerEvaluator::new(TriggerMode::BranchFilters);
        let t = spec(json!({"push": {"branches": 7}}));
        assert!(!evaluator.matches(&event("push", "main"), Some(&t)));
        let t = spec(json!({"push": {"branches": ["main", 7]}}));
        assert!(!evaluator.matches(&event("push", "main"), Some(&t)));
    }

    #[test]
    fn test_branch_filters_mode_without_constraints_matches() {
        let evaluator = TriggerEvaluator::new(TriggerMode::BranchFilters);
        let t = spec(json!({"push": null}));
        assert!(evaluator.matches(&event("push", "anything"), Some(&t)));
        let t = spec(json!("push"));
        assert!(evaluator.matches(&event("push", "anything"), Some(&t)));
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("main", "main"));
        assert!(!glob_match("main", "mainline"));
        assert!(glob_match("release/*", "release/1.0"));
        assert!(glob_match("*", ""));
        assert!(glob_match("v?", "v1"));
        assert!(!glob_match("v?", "v10"));
        assert!(glob_match("hotfix-[0-9]", "hotfix-7"));
        assert!(!glob_match("hotfix-[!0-9]", "hotfix-7"));
        assert!(glob_match("hotfix-[!0-9]", "hotfix-x"));
        assert!(glob_match("*-rc", "2.0-rc"));
        assert!(glob_match("release/*/hotfix", "release/1.0/hotfix"));
        assert!(!glob_match("release/*/hotfix", "release/1.0/hotfixes"));
        assert!(glob_match("a*b*c", "axxbyyc"));
        assert!(glob_match("**", "anything"));
        assert!(glob_match("[", "["));
        assert!(!glob_match("?", ""));
    }

    #[test]
    fn test_glob_match_many_stars_is_linear() {
        let pattern = format!("{}*b", "*a".repeat(20));
        let text = "a".repeat(200);
        let started = std::time::Instant::now();
        assert!(!glob_match(&pattern, &text));
        assert!(glob_match(&pattern, &format!("{text}b")));
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }
}
