//! Extra arguments passed to a scheduled job.

use serde::{Deserialize, Serialize};

/// A `key=value` string without `=`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid job argument '{0}': expected key=value")]
pub struct JobArgError(pub String);

/// Ordered job arguments.
///
/// Duplicate keys are kept, in order: the daemon decides which one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobArgs(Vec<(String, String)>);

impl JobArgs {
    /// No arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one argument.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Parse `key=value` assignments, splitting each on its first `=`.
    ///
    /// # Errors
    /// Returns `JobArgError` for the first assignment without `=`.
    pub fn parse<I, S>(assignments: I) -> Result<Self, JobArgError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        assignments
            .into_iter()
            .map(|assignment| {
                let assignment = assignment.as_ref();
                assignment
                    .split_once('=')
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .ok_or_else(|| JobArgError(assignment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Arguments as pairs.
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Form body for `schedule`: the arguments, then `project` and `spider`.
    pub fn schedule_form(&self, project: &str, spider: &str) -> Vec<(String, String)> {
        let mut form = self.0.clone();
        form.push(("project".to_string(), project.to_string()));
        form.push(("spider".to_string(), spider.to_string()));
        form
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for JobArgs {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_schedule_form_appends_project_and_spider() {
        let args: JobArgs = [("a", "1"), ("b", "2")].into_iter().collect();

        assert_eq!(
            args.schedule_form("foo", "bar"),
            pairs(&[("a", "1"), ("b", "2"), ("project", "foo"), ("spider", "bar")])
        );
    }

    #[test]
    fn test_duplicate_keys_are_preserved() {
        let args = JobArgs::new().with("setting", "A=1").with("setting", "B=2");

        assert_eq!(args.len(), 2);
        assert_eq!(args.as_pairs(), pairs(&[("setting", "A=1"), ("setting", "B=2")]).as_slice());
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        let args = JobArgs::parse(["setting=DOWNLOAD_DELAY=2", "empty=", "a=1"]).unwrap();

        assert_eq!(
            args.as_pairs(),
            pairs(&[("setting", "DOWNLOAD_DELAY=2"), ("empty", ""), ("a", "1")]).as_slice()
        );
    }

    #[test]
    fn test_parse_rejects_missing_equals() {
        let err = JobArgs::parse(["a=1", "oops"]).unwrap_err();
        assert_eq!(err, JobArgError("oops".to_string()));
    }

    #[test]
    fn test_empty_args() {
        let args = JobArgs::parse(Vec::<String>::new()).unwrap();
        assert!(args.is_empty());
        assert_eq!(args.schedule_form("p", "s").len(), 2);
    }
}
