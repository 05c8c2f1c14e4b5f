//! Legacy keyword-argument rewriting.
//!
//! Methods whose parameters were renamed can keep accepting the old keyword
//! names. [`LegacyNames`] holds the `(old, new)` pairs of one method and
//! [`ArgumentTranslator`] applies them to a call before it is forwarded.

use crate::{
    args::Args,
    error::ArgumentTranslationError,
    signature::MethodSignature,
};
use std::collections::BTreeMap;

/// The `(old, new)` keyword renames attached to one method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyNames {
    rules: Vec<(String, String)>,
}

impl LegacyNames {
    /// No renames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rename from `old` to `new`.
    pub fn rule(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.rules.push((old.into(), new.into()));
        self
    }

    /// Check if there are no renames.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The renames in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules
            .iter()
            .map(|(old, new)| (old.as_str(), new.as_str()))
    }
}

impl<O, N> FromIterator<(O, N)> for LegacyNames
where
    O: Into<String>,
    N: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (O, N)>>(iter: I) -> Self {
        Self {
            rules: iter
                .into_iter()
                .map(|(old, new)| (old.into(), new.into()))
                .collect(),
        }
    }
}

/// Applies a method's [`LegacyNames`] to incoming call arguments.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentTranslator<'a> {
    signature: &'a MethodSignature,
    rules: &'a LegacyNames,
}

impl<'a> ArgumentTranslator<'a> {
    /// Create a translator for one method.
    pub fn new(signature: &'a MethodSignature, rules: &'a LegacyNames) -> Self {
        Self { signature, rules }
    }

    /// Rewrite legacy keywords, then make sure every required parameter is
    /// covered either by a keyword or by the next positional argument.
    ///
    /// Keywords not named by any rule are carried over as-is and win over a
    /// renamed value for the same name. Positional arguments left over after
    /// the required parameters are appended unchanged.
    pub fn translate(&self, args: Args) -> Result<Args, ArgumentTranslationError> {
        let (positional, mut keywords) = args.into_parts();

        let mut translated = BTreeMap::new();
        for (old, new) in self.rules.iter() {
            if let Some(value) = keywords.remove(old) {
                translated.insert(new.to_owned(), value);
            }
        }
        translated.extend(keywords);

        let mut remaining = positional.into_iter();
        let mut forwarded = Vec::new();
        for param in self.signature.required_params() {
            if translated.contains_key(param.name()) {
                continue;
            }
            match remaining.next() {
                Some(value) => forwarded.push(value),
                None => {
                    return Err(ArgumentTranslationError {
                        param: param.name().to_owned(),
                    });
                }
            }
        }
        forwarded.extend(remaining);

        Ok(Args::from_parts(forwarded, translated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn alter_column() -> MethodSignature {
        MethodSignature::builder("alter_column")
            .param("table_name")
            .param("column_name")
            .param_default("nullable", Value::None)
            .param_default("new_column_name", Value::None)
            .build()
            .unwrap()
    }

    #[test]
    fn test_old_keyword_is_renamed() {
        let sig = alter_column();
        let rules = LegacyNames::new().rule("name", "new_column_name");
        let out = ArgumentTranslator::new(&sig, &rules)
            .translate(Args::new().arg("t").arg("c").kwarg("name", "c2"))
            .unwrap();
        assert_eq!(out.keywords().get("new_column_name"), Some(&Value::from("c2")));
        assert!(!out.keywords().contains_key("name"));
        assert_eq!(out.positional().len(), 2);
    }

    #[test]
    fn test_required_param_given_by_new_keyword() {
        let sig = alter_column();
        let rules: LegacyNames = [("tablename", "table_name")].into_iter().collect();
        let out = ArgumentTranslator::new(&sig, &rules)
            .translate(Args::new().arg("c").kwarg("tablename", "t"))
            .unwrap();
        assert_eq!(out.keywords().get("table_name"), Some(&Value::from("t")));
        assert_eq!(out.positional(), &[Value::from("c")]);
    }

    #[test]
    fn test_missing_required_positional() {
        let sig = alter_column();
        let rules = LegacyNames::new().rule("name", "new_column_name");
        let err = ArgumentTranslator::new(&sig, &rules)
            .translate(Args::new().arg("t"))
            .unwrap_err();
        assert_eq!(err.param, "column_name");
    }

    #[test]
    fn test_leftover_positionals_are_appended() {
        let sig = alter_column();
        let rules = LegacyNames::new().rule("name", "new_column_name");
        let out = ArgumentTranslator::new(&sig, &rules)
            .translate(Args::positional_only(["t", "c", "extra"]))
            .unwrap();
        assert_eq!(
            out.positional(),
            &[Value::from("t"), Value::from("c"), Value::from("extra")]
        );
    }

    #[test]
    fn test_current_keyword_wins_over_renamed() {
        let sig = alter_column();
        let rules = LegacyNames::new().rule("name", "new_column_name");
        let out = ArgumentTranslator::new(&sig, &rules)
            .translate(
                Args::new()
                    .arg("t")
                    .arg("c")
                    .kwarg("name", "old")
                    .kwarg("new_column_name", "new"),
            )
            .unwrap();
        assert_eq!(out.keywords().get("new_column_name"), Some(&Value::from("new")));
    }
}
