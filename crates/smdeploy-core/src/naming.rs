//! Resource and role naming rules.

/// Convert a `-`/`_` separated id into a capitalized concatenation.
///
/// Only the first ASCII letter of each word is changed.
///
/// ```
/// use smdeploy_core::naming::format_name;
///
/// assert_eq!(format_name("fraud-detection"), "FraudDetection");
/// assert_eq!(format_name("rc_team"), "RcTeam");
/// ```
#[must_use]
pub fn format_name(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        let mut out = String::with_capacity(word.len());
        out.push(first.to_ascii_uppercase());
        out.push_str(chars.as_str());
        out
    })
}

/// Normalize an IAM path to `segment/` form: no leading slash, one trailing
/// slash, or the empty string for the root path.
#[must_use]
pub fn normalize_iam_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

/// Prefix `name` with `<prefix>-` unless it already starts with `prefix`.
///
/// Idempotent: `qualify(p, &qualify(p, n)) == qualify(p, n)`.
#[must_use]
pub fn qualify(prefix: &str, name: &str) -> String {
    if name.starts_with(prefix) {
        name.to_owned()
    } else {
        format!("{prefix}-{name}")
    }
}

/// Which of the two derived roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    /// Assumed by models and endpoints.
    Inference,
    /// Assumed by training and processing jobs.
    Execution,
}

impl RoleKind {
    fn suffix(self) -> &'static str {
        match self {
            Self::Inference => "InferenceRole",
            Self::Execution => "ExecutionRole",
        }
    }
}

/// `SageMaker-<Team>-<Project>-<Kind>Role`, with both ids run through [`format_name`].
#[must_use]
pub fn role_name(team_fullname: &str, project: &str, kind: RoleKind) -> String {
    format!(
        "SageMaker-{}-{}-{}",
        format_name(team_fullname),
        format_name(project),
        kind.suffix()
    )
}

/// Full role ARN; `iam_path` must already be normalized.
#[must_use]
pub fn role_arn(account_id: &str, iam_path: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:role/{iam_path}{role_name}")
}
