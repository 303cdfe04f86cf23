use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use crate::models::{StaleEntry, SummaryEntry, Verdict};

/// Accepted restricted dependencies: coordinate → optional annotation.
///
/// Keeps the order the keys had in the baseline file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineMap {
    entries: Map<String, Value>,
}

impl BaselineMap {
    /// Resolve either accepted baseline shape into a map.
    ///
    /// - `["a", "b"]` → `{a: null, b: null}`
    /// - `{"a": <annotation>}` → as is
    ///
    /// Any other root is rejected.
    pub fn from_json(value: Value) -> Result<Self> {
        let entries = match value {
            Value::Array(items) => {
                let mut entries = Map::new();
                for item in items {
                    match item {
                        Value::String(key) => {
                            entries.insert(key, Value::Null);
                        }
                        other => bail!(
                            "Baseline array entries must be strings, found {}",
                            other
                        ),
                    }
                }
                entries
            }
            Value::Object(entries) => entries,
            other => bail!(
                "Baseline must be a JSON array or object, found {}",
                json_kind(&other)
            ),
        };
        Ok(Self { entries })
    }

    pub fn contains(&self, dependency: &str) -> bool {
        self.entries.contains_key(dependency)
    }

    pub fn annotation(&self, dependency: &str) -> Option<&Value> {
        self.entries.get(dependency)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Load the baseline file, or `None` when it does not exist.
pub fn load_baseline(path: &Path) -> Result<Option<BaselineMap>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read baseline {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse baseline {}", path.display()))?;
    let baseline = BaselineMap::from_json(value)
        .with_context(|| format!("Invalid baseline {}", path.display()))?;
    Ok(Some(baseline))
}

/// Split restricted findings against a baseline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconciliation {
    /// Restricted findings the baseline does not accept, in input order.
    pub unhandled: Vec<SummaryEntry>,
    /// Baseline keys no finding matched, in baseline order.
    pub unmatched: Vec<StaleEntry>,
}

pub fn reconcile(restricted: &[SummaryEntry], baseline: &BaselineMap) -> Reconciliation {
    let mut matched: HashSet<&str> = HashSet::new();
    let mut unhandled = Vec::new();

    for entry in restricted {
        if baseline.contains(&entry.dependency) {
            matched.insert(&entry.dependency);
        } else {
            unhandled.push(entry.clone());
        }
    }

    let unmatched = baseline
        .entries
        .iter()
        .filter(|(key, _)| !matched.contains(key.as_str()))
        .map(|(dependency, annotation)| StaleEntry {
            dependency: dependency.clone(),
            annotation: annotation.clone(),
        })
        .collect();

    Reconciliation {
        unhandled,
        unmatched,
    }
}

/// Gate decision for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub baseline_found: bool,
    pub reconciliation: Reconciliation,
}

/// Decide pass/fail. With nothing restricted the run passes and the baseline
/// is not consulted at all; without a baseline every restricted finding is
/// unhandled.
pub fn evaluate(restricted: &[SummaryEntry], baseline: Option<&BaselineMap>) -> Evaluation {
    if restricted.is_empty() {
        return Evaluation {
            verdict: Verdict::Pass,
            baseline_found: baseline.is_some(),
            reconciliation: Reconciliation::default(),
        };
    }

    let reconciliation = match baseline {
        Some(baseline) => reconcile(restricted, baseline),
        None => Reconciliation {
            unhandled: restricted.to_vec(),
            unmatched: Vec::new(),
        },
    };

    let verdict = if reconciliation.unhandled.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Fail
    };

    Evaluation {
        verdict,
        baseline_found: baseline.is_some(),
        reconciliation,
    }
}

/// Load the baseline only when something is restricted, then evaluate.
///
/// A run with no restricted findings passes without reading the baseline,
/// so even a malformed file cannot fail it.
pub fn gate(restricted: &[SummaryEntry], baseline_path: &Path) -> Result<Evaluation> {
    let baseline = if restricted.is_empty() {
        None
    } else {
        load_baseline(baseline_path)?
    };
    Ok(evaluate(restricted, baseline.as_ref()))
}

/// Build a baseline accepting exactly `restricted`, keeping annotations from
/// `previous` for dependencies it already listed.
pub fn rebuild(restricted: &[SummaryEntry], previous: Option<&BaselineMap>) -> BaselineMap {
    let mut entries = Map::new();
    for entry in restricted {
        let annotation = previous
            .and_then(|b| b.annotation(&entry.dependency))
            .cloned()
            .unwrap_or(Value::Null);
        entries.insert(entry.dependency.clone(), annotation);
    }
    BaselineMap { entries }
}

pub fn write_baseline(path: &Path, baseline: &BaselineMap) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut content = serde_json::to_string_pretty(&baseline.to_json())?;
    content.push('\n');
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write baseline {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn restricted(names: &[&str]) -> Vec<SummaryEntry> {
        names
            .iter()
            .map(|n| SummaryEntry {
                dependency: n.to_string(),
                license: Some("EPL-2.0".to_string()),
                status: Some("restricted".to_string()),
                source: Some("clearlydefined".to_string()),
            })
            .collect()
    }

    fn baseline(value: Value) -> BaselineMap {
        BaselineMap::from_json(value).unwrap()
    }

    fn stale_keys(r: &Reconciliation) -> Vec<&str> {
        r.unmatched.iter().map(|s| s.dependency.as_str()).collect()
    }

    fn unhandled_keys(r: &Reconciliation) -> Vec<&str> {
        r.unhandled.iter().map(|e| e.dependency.as_str()).collect()
    }

    #[test]
    fn test_array_baseline() {
        let b = baseline(json!(["A", "B"]));
        assert_eq!(b.len(), 2);
        assert_eq!(b.annotation("A"), Some(&Value::Null));
        assert_eq!(b.annotation("B"), Some(&Value::Null));
    }

    #[test]
    fn test_object_baseline() {
        let b = baseline(json!({"A": {"note": 1}}));
        assert_eq!(b.annotation("A"), Some(&json!({"note": 1})));
    }

    #[test]
    fn test_other_roots_rejected() {
        assert!(BaselineMap::from_json(json!(3)).is_err());
        assert!(BaselineMap::from_json(json!("A")).is_err());
        assert!(BaselineMap::from_json(Value::Null).is_err());
        assert!(BaselineMap::from_json(json!(true)).is_err());
        assert!(BaselineMap::from_json(json!(["A", 1])).is_err());
    }

    #[test]
    fn test_load_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline.json");
        assert_eq!(load_baseline(&path).unwrap(), None);

        std::fs::write(&path, r#"{"Z": "note", "A": null}"#).unwrap();
        let loaded = load_baseline(&path).unwrap().unwrap();
        let json = loaded.to_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Z", "A"]);

        std::fs::write(&path, "null").unwrap();
        let err = load_baseline(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("must be a JSON array or object"));

        std::fs::write(&path, "{not json").unwrap();
        assert!(load_baseline(&path).is_err());
    }

    #[test]
    fn test_partial_baseline_fails() {
        let b = baseline(json!({"A": null, "Z": "note"}));
        let eval = evaluate(&restricted(&["A", "B"]), Some(&b));
        assert_eq!(eval.verdict, Verdict::Fail);
        assert_eq!(unhandled_keys(&eval.reconciliation), vec!["B"]);
        assert_eq!(stale_keys(&eval.reconciliation), vec!["Z"]);
        assert_eq!(eval.reconciliation.unmatched[0].annotation, json!("note"));
    }

    #[test]
    fn test_full_baseline_passes() {
        let b = baseline(json!({"A": null, "B": null}));
        let eval = evaluate(&restricted(&["A", "B"]), Some(&b));
        assert_eq!(eval.verdict, Verdict::Pass);
        assert!(eval.reconciliation.unhandled.is_empty());
        assert!(eval.reconciliation.unmatched.is_empty());
    }

    #[test]
    fn test_stale_entries_alone_do_not_fail() {
        let b = baseline(json!(["A", "Old"]));
        let eval = evaluate(&restricted(&["A"]), Some(&b));
        assert_eq!(eval.verdict, Verdict::Pass);
        assert_eq!(stale_keys(&eval.reconciliation), vec!["Old"]);
    }

    #[test]
    fn test_no_baseline_fails() {
        let eval = evaluate(&restricted(&["A"]), None);
        assert_eq!(eval.verdict, Verdict::Fail);
        assert!(!eval.baseline_found);
        assert_eq!(unhandled_keys(&eval.reconciliation), vec!["A"]);
    }

    #[test]
    fn test_nothing_restricted_passes() {
        assert_eq!(evaluate(&[], None).verdict, Verdict::Pass);

        let b = baseline(json!(["A"]));
        let eval = evaluate(&[], Some(&b));
        assert_eq!(eval.verdict, Verdict::Pass);
        assert!(eval.reconciliation.unmatched.is_empty());
    }

    #[test]
    fn test_gate_ignores_malformed_baseline_when_nothing_restricted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline.json");
        std::fs::write(&path, "42").unwrap();

        let eval = gate(&[], &path).unwrap();
        assert_eq!(eval.verdict, Verdict::Pass);
        assert!(eval.reconciliation.unhandled.is_empty());

        assert!(gate(&restricted(&["A"]), &path).is_err());
    }

    #[test]
    fn test_gate_without_baseline_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let eval = gate(&restricted(&["A"]), &dir.path().join("missing.json")).unwrap();
        assert_eq!(eval.verdict, Verdict::Fail);
        assert!(!eval.baseline_found);
        assert_eq!(unhandled_keys(&eval.reconciliation), vec!["A"]);
    }

    #[test]
    fn test_gate_with_baseline_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline.json");
        std::fs::write(&path, r#"{"A": null, "Z": "note"}"#).unwrap();

        let eval = gate(&restricted(&["A", "B"]), &path).unwrap();
        assert_eq!(eval.verdict, Verdict::Fail);
        assert!(eval.baseline_found);
        assert_eq!(unhandled_keys(&eval.reconciliation), vec!["B"]);
        assert_eq!(stale_keys(&eval.reconciliation), vec!["Z"]);
    }

    #[test]
    fn test_reconcile_is_repeatable() {
        let b = baseline(json!({"A": null, "Z": "note"}));
        let found = restricted(&["A", "B"]);
        assert_eq!(reconcile(&found, &b), reconcile(&found, &b));
    }

    #[test]
    fn test_rebuild_keeps_annotations() {
        let previous = baseline(json!({"A": "reviewed", "Z": "gone"}));
        let rebuilt = rebuild(&restricted(&["A", "B"]), Some(&previous));
        assert_eq!(rebuilt.to_json(), json!({"A": "reviewed", "B": null}));
    }

    #[test]
    fn test_write_baseline_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("baseline.json");
        let rebuilt = rebuild(&restricted(&["A"]), None);
        write_baseline(&path, &rebuilt).unwrap();
        assert_eq!(load_baseline(&path).unwrap(), Some(rebuilt));
    }
}
