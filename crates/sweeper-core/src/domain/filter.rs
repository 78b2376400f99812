//! Filter engine: decides whether an artifact is slated for deletion.
//!
//! The filter is pure: given the compiled criteria, one artifact and the
//! reference instant it returns keep/skip, with no I/O.
//!
//! Checks run in a fixed order and short-circuit:
//! 1. size >= min_bytes
//! 2. size <= max_bytes
//! 3. name == exact_name
//! 4. created_at older than the active duration
//! 5. name matches the pattern
//!
//! A malformed active duration or pattern fails closed: that check rejects
//! every artifact that reaches it.

use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;

use super::artifact::Artifact;
use super::criteria::FilterCriteria;
use super::errors::FilterConfigError;

#[derive(Debug, Clone)]
enum RecencyRule {
    Any,
    ActiveFor(TimeDelta),
    Broken,
}

#[derive(Debug, Clone)]
enum PatternRule {
    Any,
    Matches(Regex),
    Broken,
}

/// Compiled form of [`FilterCriteria`].
///
/// Compilation happens once per run, so configuration problems are found once
/// and can be reported once instead of for every artifact.
#[derive(Debug, Clone)]
pub struct Filter {
    min_bytes: u64,
    max_bytes: Option<u64>,
    exact_name: Option<String>,
    recency: RecencyRule,
    pattern: PatternRule,
    problems: Vec<FilterConfigError>,
}

impl Filter {
    /// Compile criteria. Never fails; broken criteria are recorded in
    /// [`Filter::problems`] and reject everything.
    pub fn compile(criteria: &FilterCriteria) -> Self {
        let mut problems = Vec::new();

        let recency = match criteria.active_duration() {
            None => RecencyRule::Any,
            Some(value) => match parse_active_duration(value) {
                Ok(active) => RecencyRule::ActiveFor(active),
                Err(problem) => {
                    problems.push(problem);
                    RecencyRule::Broken
                }
            },
        };

        let pattern = match criteria.name_pattern() {
            None => PatternRule::Any,
            Some(pattern) => match compile_pattern(pattern) {
                Ok(re) => PatternRule::Matches(re),
                Err(problem) => {
                    problems.push(problem);
                    PatternRule::Broken
                }
            },
        };

        Self {
            min_bytes: criteria.min_bytes(),
            max_bytes: criteria.max_bytes(),
            exact_name: criteria.exact_name().map(str::to_string),
            recency,
            pattern,
            problems,
        }
    }

    /// Configuration problems found while compiling.
    pub fn problems(&self) -> &[FilterConfigError] {
        &self.problems
    }

    /// Emit one log line per configuration problem.
    pub fn report_problems(&self) {
        for problem in &self.problems {
            tracing::error!(
                error = %problem,
                "filter criterion is unusable; artifacts will not match ANY conditions"
            );
        }
    }

    /// Decide whether `artifact` should be retained (deleted), relative to `now`.
    pub fn evaluate(&self, artifact: &Artifact, now: DateTime<Utc>) -> bool {
        let size = artifact.size_in_bytes;

        // min_bytes is always configured and short-circuits everything else
        if size < self.min_bytes {
            return false;
        }

        if let Some(max_bytes) = self.max_bytes
            && size > max_bytes
        {
            return false;
        }

        if let Some(name) = &self.exact_name
            && artifact.name != *name
        {
            return false;
        }

        match &self.recency {
            RecencyRule::Any => {}
            RecencyRule::Broken => return false,
            RecencyRule::ActiveFor(active) => {
                // no representable cutoff means nothing can be old enough
                let Some(cutoff) = now.checked_sub_signed(*active) else {
                    return false;
                };
                if artifact.created_at >= cutoff {
                    return false;
                }
            }
        }

        match &self.pattern {
            PatternRule::Any => true,
            PatternRule::Broken => false,
            PatternRule::Matches(re) => re.is_match(&artifact.name),
        }
    }

    /// Apply [`Filter::evaluate`] to every artifact, keeping input order.
    pub fn filter_batch(&self, artifacts: &[Artifact], now: DateTime<Utc>) -> Vec<Artifact> {
        artifacts
            .iter()
            .filter(|artifact| {
                let keep = self.evaluate(artifact, now);
                tracing::debug!(
                    name = %artifact.name,
                    size = artifact.size_in_bytes,
                    keep,
                    "evaluated artifact"
                );
                keep
            })
            .cloned()
            .collect()
    }
}

/// One-shot evaluation of raw criteria.
pub fn evaluate(artifact: &Artifact, criteria: &FilterCriteria, now: DateTime<Utc>) -> bool {
    Filter::compile(criteria).evaluate(artifact, now)
}

/// Compile a POSIX ERE-style pattern.
///
/// Perl extensions (`\d`-style classes, `(?...)` groups, lazy quantifiers)
/// are rejected even though the regex engine would accept them.
fn compile_pattern(pattern: &str) -> Result<Regex, FilterConfigError> {
    let invalid = |reason: String| FilterConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };
    if let Some(construct) = perl_extension(pattern) {
        return Err(invalid(format!("{construct} is not POSIX syntax")));
    }
    Regex::new(pattern).map_err(|e| invalid(e.to_string()))
}

/// First Perl-only construct in `pattern`, if any.
fn perl_extension(pattern: &str) -> Option<String> {
    let mut chars = pattern.chars().peekable();
    let mut prev: Option<char> = None;
    let mut in_class = false;
    let mut class_start = false;

    while let Some(c) = chars.next() {
        let starting = class_start;
        class_start = false;
        match c {
            '\\' => {
                let escaped = chars.next()?;
                if "dDwWsSAzbBpP".contains(escaped) {
                    return Some(format!("`\\{escaped}`"));
                }
                // an escaped quantifier is a literal
                prev = None;
                continue;
            }
            '[' if !in_class => {
                in_class = true;
                class_start = true;
                if chars.peek() == Some(&'^') {
                    chars.next();
                }
            }
            ']' if in_class && !starting => in_class = false,
            '(' if !in_class && chars.peek() == Some(&'?') => {
                return Some("`(?`".to_string());
            }
            '?' if !in_class && matches!(prev, Some('*' | '+' | '?' | '}')) => {
                return Some("a lazy quantifier".to_string());
            }
            _ => {}
        }
        prev = Some(c);
    }
    None
}

fn parse_active_duration(value: &str) -> Result<TimeDelta, FilterConfigError> {
    let parsed =
        humantime::parse_duration(value).map_err(|e| FilterConfigError::InvalidDuration {
            value: value.to_string(),
            reason: e.to_string(),
        })?;
    if parsed.is_zero() {
        return Err(FilterConfigError::NonPositiveDuration(value.to_string()));
    }
    TimeDelta::from_std(parsed).map_err(|e| FilterConfigError::InvalidDuration {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArtifactId;
    use chrono::TimeZone;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn artifact(name: &str, size: u64) -> Artifact {
        aged(name, size, TimeDelta::hours(1))
    }

    fn aged(name: &str, size: u64, age: TimeDelta) -> Artifact {
        Artifact::new(ArtifactId::new(1), name, size, now() - age)
    }

    #[rstest]
    #[case::equal_to_min(100, 100, true)]
    #[case::greater_than_min(100, 200, true)]
    #[case::less_than_min(100, 50, false)]
    #[case::zero_min_zero_size(0, 0, true)]
    fn min_bytes_bound(#[case] min_bytes: u64, #[case] size: u64, #[case] keep: bool) {
        let criteria = FilterCriteria::new().with_min_bytes(min_bytes);
        assert_eq!(evaluate(&artifact("test-artifact", size), &criteria, now()), keep);
    }

    #[rstest]
    #[case::equal_to_max(Some(100), 100, true)]
    #[case::greater_than_max(Some(100), 200, false)]
    #[case::less_than_max(Some(100), 50, true)]
    #[case::unbounded(None, 1_000_000, true)]
    fn max_bytes_bound(#[case] max_bytes: Option<u64>, #[case] size: u64, #[case] keep: bool) {
        let criteria = FilterCriteria::new().with_max_bytes(max_bytes);
        assert_eq!(evaluate(&artifact("test-artifact", size), &criteria, now()), keep);
    }

    #[rstest]
    #[case::exact("my-artifact", "my-artifact", true)]
    #[case::different("my-artifact", "other-artifact", false)]
    #[case::partial("my-artifact", "my-artifact-extra", false)]
    #[case::empty_filter("", "any-artifact", true)]
    #[case::case_sensitive("My-Artifact", "my-artifact", false)]
    fn exact_name(#[case] filter: &str, #[case] name: &str, #[case] keep: bool) {
        let criteria = FilterCriteria::new().with_exact_name(Some(filter));
        assert_eq!(evaluate(&artifact(name, 100), &criteria, now()), keep);
    }

    #[rstest]
    #[case::suffix(r"\.bin$", "artifact.bin", true)]
    #[case::suffix_miss(r"\.bin$", "artifact.txt", false)]
    #[case::prefix("^test-", "test-artifact", true)]
    #[case::substring("artifact", "my-artifact-name", true)]
    #[case::empty_pattern("", "any-artifact", true)]
    #[case::invalid_pattern("[invalid", "artifact", false)]
    #[case::posix_class("^build-[[:digit:]]+$", "build-42", true)]
    #[case::perl_digit_class(r"build-\d", "build-42", false)]
    #[case::perl_word_class(r"\w+\.bin", "artifact.bin", false)]
    #[case::perl_flag_group("(?i)ARTIFACT", "artifact", false)]
    #[case::lazy_quantifier("a.*?b", "ab", false)]
    #[case::escaped_backslash(r"\\d", r"x\d", true)]
    fn name_pattern(#[case] pattern: &str, #[case] name: &str, #[case] keep: bool) {
        let criteria = FilterCriteria::new().with_name_pattern(Some(pattern));
        assert_eq!(evaluate(&artifact(name, 100), &criteria, now()), keep);
    }

    #[rstest]
    #[case::older("1h", TimeDelta::hours(2), true)]
    #[case::newer("1h", TimeDelta::minutes(30), false)]
    #[case::just_past_boundary("1h", TimeDelta::hours(1) + TimeDelta::milliseconds(1), true)]
    #[case::exactly_at_boundary("1h", TimeDelta::hours(1), false)]
    #[case::compound("23h59m", TimeDelta::hours(24), true)]
    #[case::empty("", TimeDelta::minutes(1), true)]
    #[case::invalid("invalid", TimeDelta::hours(2), false)]
    #[case::negative("-1h", TimeDelta::hours(2), false)]
    #[case::zero("0s", TimeDelta::hours(2), false)]
    fn active_duration(#[case] duration: &str, #[case] age: TimeDelta, #[case] keep: bool) {
        let criteria = FilterCriteria::new().with_active_duration(Some(duration));
        assert_eq!(evaluate(&aged("test-artifact", 100, age), &criteria, now()), keep);
    }

    #[rstest]
    #[case::all_pass(50, Some(200), "test-artifact.bin", r"\.bin$", "30m", true)]
    #[case::min_fails(200, Some(500), "test-artifact.bin", r"\.bin$", "30m", false)]
    #[case::max_fails(50, Some(80), "test-artifact.bin", r"\.bin$", "30m", false)]
    #[case::name_fails(50, Some(200), "other-artifact.bin", r"\.bin$", "30m", false)]
    #[case::pattern_fails(50, Some(200), "test-artifact.bin", r"\.txt$", "30m", false)]
    #[case::too_new(50, Some(200), "test-artifact.bin", r"\.bin$", "2h", false)]
    #[case::only_min(50, None, "", "", "", true)]
    fn combined(
        #[case] min_bytes: u64,
        #[case] max_bytes: Option<u64>,
        #[case] name: &str,
        #[case] pattern: &str,
        #[case] duration: &str,
        #[case] keep: bool,
    ) {
        let criteria = FilterCriteria::new()
            .with_min_bytes(min_bytes)
            .with_max_bytes(max_bytes)
            .with_exact_name(Some(name))
            .with_name_pattern(Some(pattern))
            .with_active_duration(Some(duration));
        assert_eq!(evaluate(&artifact("test-artifact.bin", 100), &criteria, now()), keep);
    }

    #[rstest]
    #[case::digit(r"build-\d", Some("`\\d`"))]
    #[case::class_in_brackets(r"[\s]", Some("`\\s`"))]
    #[case::group("(?:a|b)", Some("`(?`"))]
    #[case::lazy_plus("a+?", Some("a lazy quantifier"))]
    #[case::literal_question_in_class("a[+?]", None)]
    #[case::optional_group("(ab)?", None)]
    #[case::bracket_first_in_class("[]a]", None)]
    #[case::plain(r"\.bin$", None)]
    #[case::optional_literal_star(r"a\*?", None)]
    fn detects_perl_extensions(#[case] pattern: &str, #[case] found: Option<&str>) {
        assert_eq!(perl_extension(pattern).as_deref(), found);
    }

    #[test]
    fn perl_class_is_recorded_as_a_problem() {
        let filter = Filter::compile(&FilterCriteria::new().with_name_pattern(Some(r"build-\d")));
        assert!(matches!(
            filter.problems(),
            [FilterConfigError::InvalidPattern { reason, .. }] if reason.contains("not POSIX")
        ));
        assert!(!filter.evaluate(&artifact("build-1", 100), now()));
    }

    #[test]
    fn evaluate_is_pure() {
        let filter = Filter::compile(
            &FilterCriteria::new()
                .with_min_bytes(10)
                .with_name_pattern(Some("a+"))
                .with_active_duration(Some("10m")),
        );
        let a = artifact("aaa", 20);
        assert_eq!(filter.evaluate(&a, now()), filter.evaluate(&a, now()));
    }

    #[test]
    fn min_bytes_short_circuits_before_broken_criteria() {
        let filter = Filter::compile(
            &FilterCriteria::new()
                .with_min_bytes(100)
                .with_name_pattern(Some("[invalid")),
        );
        assert_eq!(filter.problems().len(), 1);
        assert!(!filter.evaluate(&artifact("small", 10), now()));
        assert!(!filter.evaluate(&artifact("large", 1000), now()));
    }

    #[test]
    fn records_each_problem_once() {
        let filter = Filter::compile(
            &FilterCriteria::new()
                .with_name_pattern(Some("(unclosed"))
                .with_active_duration(Some("0s")),
        );
        let problems = filter.problems();
        assert_eq!(problems.len(), 2);
        assert!(matches!(problems[0], FilterConfigError::NonPositiveDuration(_)));
        assert!(matches!(problems[1], FilterConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn batch_keeps_matching_artifacts_in_order() {
        let filter = Filter::compile(
            &FilterCriteria::new()
                .with_min_bytes(50)
                .with_max_bytes(Some(200))
                .with_name_pattern(Some(r"\.bin$")),
        );
        let artifacts = vec![
            artifact("artifact1.bin", 100),
            artifact("artifact2.txt", 100),
            artifact("artifact3.bin", 10),
            artifact("artifact4.bin", 300),
            artifact("artifact5.bin", 150),
        ];

        let kept = filter.filter_batch(&artifacts, now());
        let names: Vec<&str> = kept.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["artifact1.bin", "artifact5.bin"]);
    }

    #[test]
    fn empty_batch_yields_empty_result() {
        let filter = Filter::compile(&FilterCriteria::new());
        assert!(filter.filter_batch(&[], now()).is_empty());
    }
}
