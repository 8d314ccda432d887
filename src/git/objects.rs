use std::collections::BTreeMap;

use crate::host::BuildHost;

use super::{Git, GitError, InvokeOptions, StepResult, StepStatus};

/// Parsed `git count-objects -v` output: metric name to value. Sizes are
/// reported by git in KiB.
pub type ObjectCountReport = BTreeMap<String, u64>;

/// Result of one object-count diagnostic. `report` is `None` when the tool
/// produced no output or the step soft-failed.
#[derive(Debug, Clone)]
pub struct CountObjectsOutcome {
    pub step: StepResult,
    pub report: Option<ObjectCountReport>,
}

/// Parses colon-delimited `name: value` lines into a report.
pub fn parse_report(output: &str) -> Result<ObjectCountReport, GitError> {
    let mut report = ObjectCountReport::new();
    for line in output.lines() {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| GitError::MalformedReport {
                line: line.to_string(),
            })?;
        let value = value
            .trim()
            .parse::<u64>()
            .map_err(|_| GitError::MalformedReport {
                line: line.to_string(),
            })?;
        report.insert(name.trim().to_string(), value);
    }
    Ok(report)
}

/// Signed per-metric difference, defined only for keys present in both
/// reports.
pub fn delta(before: &ObjectCountReport, after: &ObjectCountReport) -> BTreeMap<String, i64> {
    after
        .iter()
        .filter_map(|(key, value)| {
            before
                .get(key)
                .map(|previous| (key.clone(), *value as i64 - *previous as i64))
        })
        .collect()
}

/// `(size + size-pack)` growth in KiB, when both reports carry both keys.
pub fn size_delta_kib(before: &ObjectCountReport, after: &ObjectCountReport) -> Option<i64> {
    let sum = |report: &ObjectCountReport| {
        Some(*report.get("size")? as i64 + *report.get("size-pack")? as i64)
    };
    Some(sum(after)? - sum(before)?)
}

fn report_lines<V: std::fmt::Display>(report: &BTreeMap<String, V>) -> Vec<String> {
    report
        .iter()
        .map(|(key, value)| format!("  {key}: {value}"))
        .collect()
}

impl<H: BuildHost> Git<H> {
    /// Runs the object-count diagnostic and returns the parsed report.
    ///
    /// No output is a soft-fail: the report is absent, not an error. When
    /// `previous` is given it must contain both `size` and `size-pack`
    /// (programmer error otherwise) and the step notes carry the
    /// before/after/delta table plus a one-line MiB summary. An execution
    /// failure marks the step as a warning and either raises
    /// [`GitError::Infra`] or yields an absent report, per
    /// `options.can_fail_build`. Malformed report lines always raise.
    pub fn count_objects(
        &mut self,
        previous: Option<&ObjectCountReport>,
        options: InvokeOptions,
    ) -> Result<CountObjectsOutcome, GitError> {
        if let Some(previous) = previous {
            assert!(
                previous.contains_key("size"),
                "previous object-count report must contain `size`"
            );
            assert!(
                previous.contains_key("size-pack"),
                "previous object-count report must contain `size-pack`"
            );
        }

        let can_fail_build = options.can_fail_build;
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| "git count-objects".to_string());

        let mut step = match self.invoke(
            ["count-objects", "-v"],
            InvokeOptions {
                name: Some(name.clone()),
                capture_stdout: true,
                can_fail_build: false,
                ..options
            },
        ) {
            Ok(step) => step,
            Err(error) => {
                if can_fail_build {
                    return Err(GitError::Infra(error.to_string()));
                }
                return Ok(CountObjectsOutcome {
                    step: StepResult {
                        name,
                        status: StepStatus::Warning,
                        stdout: None,
                        notes: vec![error.to_string()],
                    },
                    report: None,
                });
            }
        };

        if !step.succeeded() {
            step.status = StepStatus::Warning;
            if can_fail_build {
                return Err(GitError::Infra(format!("step `{}` failed", step.name)));
            }
            return Ok(CountObjectsOutcome { step, report: None });
        }

        let output = step.stdout.clone().unwrap_or_default();
        if output.is_empty() {
            return Ok(CountObjectsOutcome { step, report: None });
        }

        let report = parse_report(&output)?;

        step.notes.push("result:".to_string());
        step.notes.extend(report_lines(&report));

        if let Some(previous) = previous {
            step.notes.push("before:".to_string());
            step.notes.extend(report_lines(previous));
            step.notes.push("after:".to_string());
            step.notes.extend(report_lines(&report));
            step.notes.push("delta:".to_string());
            step.notes.extend(report_lines(&delta(previous, &report)));
            if let Some(delta_kib) = size_delta_kib(previous, &report) {
                step.notes
                    .push(format!("size delta: {:+.2} MiB", delta_kib as f64 / 1024.0));
            }
        }

        Ok(CountObjectsOutcome {
            step,
            report: Some(report),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::FakeHost;
    use pretty_assertions::assert_eq;

    fn report(entries: &[(&str, u64)]) -> ObjectCountReport {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }

    #[test]
    fn parses_colon_delimited_lines() {
        let parsed = parse_report("size: 10\nsize-pack: 20\ncount: 2").unwrap();
        assert_eq!(
            parsed,
            report(&[("size", 10), ("size-pack", 20), ("count", 2)])
        );
    }

    #[test]
    fn unsplittable_line_is_malformed() {
        let error = parse_report("size: 10\ngarbage").unwrap_err();
        assert!(matches!(
            error,
            GitError::MalformedReport { line } if line == "garbage"
        ));
    }

    #[test]
    fn non_numeric_value_is_malformed() {
        assert!(parse_report("size: lots").is_err());
    }

    #[test]
    fn delta_covers_shared_keys_only() {
        let before = report(&[("size", 10), ("size-pack", 20)]);
        let after = report(&[("size", 15), ("size-pack", 25), ("count", 3)]);
        assert_eq!(
            delta(&before, &after),
            [("size".to_string(), 5), ("size-pack".to_string(), 5)]
                .into_iter()
                .collect()
        );
    }

    #[test]
    fn count_objects_attaches_size_delta_summary() {
        let mut git = Git::new(FakeHost::new());
        git.host_mut()
            .respond(&["count-objects", "-v"], "size: 15\nsize-pack: 25\n");
        let previous = report(&[("size", 10), ("size-pack", 20)]);
        let outcome = git
            .count_objects(
                Some(&previous),
                InvokeOptions {
                    can_fail_build: false,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(outcome.report, Some(report(&[("size", 15), ("size-pack", 25)])));
        assert_eq!(
            outcome.step.notes.last().map(String::as_str),
            // (15 + 25 - 10 - 20) KiB = +0.01 MiB
            Some("size delta: +0.01 MiB")
        );
    }

    #[test]
    fn count_objects_without_output_is_absent() {
        let mut git = Git::new(FakeHost::new());
        git.host_mut().respond(&["count-objects", "-v"], "");
        let outcome = git
            .count_objects(None, InvokeOptions::default())
            .unwrap();
        assert_eq!(outcome.report, None);
        assert!(outcome.step.succeeded());
    }

    #[test]
    fn count_objects_failure_soft_fails_when_allowed() {
        let mut git = Git::new(FakeHost::new());
        git.host_mut().fail(&["count-objects", "-v"], "not a repo");
        let outcome = git
            .count_objects(
                None,
                InvokeOptions {
                    can_fail_build: false,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(outcome.report, None);
        assert_eq!(outcome.step.status, StepStatus::Warning);
    }

    #[test]
    fn count_objects_failure_raises_infra_when_gated() {
        let mut git = Git::new(FakeHost::new());
        git.host_mut().fail(&["count-objects", "-v"], "not a repo");
        let error = git.count_objects(None, InvokeOptions::default());
        assert!(matches!(error, Err(GitError::Infra(_))));
    }

    #[test]
    #[should_panic(expected = "size-pack")]
    fn previous_report_without_size_pack_is_a_contract_violation() {
        let mut git = Git::new(FakeHost::new());
        let previous = report(&[("size", 10)]);
        let _ = git.count_objects(Some(&previous), InvokeOptions::default());
    }
}
