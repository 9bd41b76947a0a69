//! Declarative field validation.
//!
//! A [`FieldRuleSet`] maps field names to ordered rules, usually written in the compact
//! `required|min:3|max:255` grammar. [`Validator`] runs every rule of every field against a JSON
//! object and collects one message per failing rule into [`ValidationErrors`].

use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

pub mod errors;
pub mod rule;

pub use errors::ValidationErrors;
pub use rule::{parse_rules, Pattern, Rule};

/// Ordered per-field rule configuration for one record shape.
#[derive(Debug, Clone, Default)]
pub struct FieldRuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl FieldRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` with rules parsed from `rules`. Redeclaring a field replaces its rules in place.
    pub fn field(self, name: &str, rules: &str) -> Self {
        self.field_rules(name, parse_rules(rules))
    }

    /// Adds `name` with already-structured rules.
    pub fn field_rules(mut self, name: &str, rules: Vec<Rule>) -> Self {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, existing)) => *existing = rules,
            None => self.fields.push((name.to_string(), rules)),
        }
        self
    }

    pub fn rules_for(&self, name: &str) -> Option<&[Rule]> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, rules)| rules.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields
            .iter()
            .map(|(field, rules)| (field.as_str(), rules.as_slice()))
    }
}

/// Runs a [`FieldRuleSet`] against records.
#[derive(Debug, Clone)]
pub struct Validator<'r> {
    rules: &'r FieldRuleSet,
    messages: HashMap<String, String>,
    collapse_custom_messages: bool,
}

impl<'r> Validator<'r> {
    pub fn new(rules: &'r FieldRuleSet) -> Self {
        Self {
            rules,
            messages: HashMap::new(),
            collapse_custom_messages: false,
        }
    }

    /// Replaces every generated message for `field` with `message`.
    pub fn with_message(mut self, field: &str, message: &str) -> Self {
        self.messages.insert(field.to_string(), message.to_string());
        self
    }

    pub fn with_messages<I, K, V>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.messages
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// By default a custom message is recorded once per failing rule, so two failures on one
    /// field yield the same text twice. With this set, a field holds at most one copy.
    pub fn collapse_custom_messages(mut self, collapse: bool) -> Self {
        self.collapse_custom_messages = collapse;
        self
    }

    pub fn validate(&self, record: &Map<String, JsonValue>) -> ValidationErrors {
        static ABSENT: JsonValue = JsonValue::Null;

        let mut errors = ValidationErrors::new();
        for (field, rules) in self.rules.iter() {
            let value = record.get(field).unwrap_or(&ABSENT);
            for rule in rules {
                let Some(generated) = rule.check(field, value) else {
                    continue;
                };
                match self.messages.get(field) {
                    Some(custom) => {
                        if self.collapse_custom_messages && errors.contains(field, custom) {
                            continue;
                        }
                        errors.add(field, custom.as_str());
                    }
                    None => errors.add(field, generated),
                }
            }
        }
        errors
    }

    /// Validates an arbitrary JSON value; anything but an object is checked as an empty record.
    pub fn validate_value(&self, record: &JsonValue) -> ValidationErrors {
        match record.as_object() {
            Some(map) => self.validate(map),
            None => self.validate(&Map::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(rules: &str, value: JsonValue) -> ValidationErrors {
        let rules = FieldRuleSet::new().field("f", rules);
        let mut record = Map::new();
        record.insert("f".to_string(), value);
        Validator::new(&rules).validate(&record)
    }

    fn passes(rules: &str, value: JsonValue) -> bool {
        run(rules, value).passes()
    }

    #[test]
    fn required_rejects_null_empty_string_and_empty_sequence() {
        for value in [json!(null), json!(""), json!([])] {
            let errors = run("required", value);
            assert_eq!(errors.get("f"), Some(&["The f field is required.".to_string()][..]));
        }
        let rules = FieldRuleSet::new().field("f", "required");
        let missing = Validator::new(&rules).validate(&Map::new());
        assert!(missing.fails());
        assert!(passes("required", json!(0)));
        assert!(passes("required", json!(false)));
    }

    #[test]
    fn optional_empty_fields_pass_vacuously() {
        let every_rule =
            "array|min:3|max:1|email|float|integer|minvalue:5|maxvalue:1|boolean|regex:/^x$/|in:a|subset:a";
        assert!(passes(every_rule, json!(null)));
        assert!(passes(every_rule, json!("")));
        let rules = FieldRuleSet::new().field("f", every_rule);
        assert!(Validator::new(&rules).validate(&Map::new()).passes());
    }

    #[test]
    fn notempty_ignores_null() {
        assert!(passes("notempty", json!(null)));
        assert!(!passes("notempty", json!("")));
        assert!(!passes("notempty", json!([])));
    }

    #[test]
    fn min_and_max_length() {
        assert!(!passes("min:3", json!("ab")));
        assert!(passes("min:3", json!("abc")));
        assert!(!passes("min:3", json!([1, 2])));
        assert!(passes("min:2", json!([1, 2])));
        assert!(passes("min:3", json!("äöü")));
        assert!(!passes("max:2", json!("abc")));
        assert_eq!(
            run("max:1", json!([1, 2])).first_error(None),
            Some("The f must not have more than 1 items.")
        );
        assert_eq!(
            run("min:3", json!("ab")).first_error(None),
            Some("The f must be at least 3 characters.")
        );
    }

    #[test]
    fn one_of_trims_allowed_list_but_not_input() {
        assert!(passes("in:a,b,c", json!("b")));
        assert!(passes("in: a , b ,c", json!("b")));
        assert!(!passes("in:a,b,c", json!("d")));
        assert!(!passes("in:a,b,c", json!(" b ")));
        assert_eq!(
            run("in:a, b", json!("d")).first_error(None),
            Some("The f must be one of: a, b.")
        );
    }

    #[test]
    fn one_of_is_type_aware() {
        assert!(passes("in:1,2", json!("1")));
        assert!(!passes("in:1,2", json!(1)));
    }

    #[test]
    fn subset_requires_a_sequence() {
        assert!(passes("subset:pc,ps5", json!(["pc"])));
        assert_eq!(
            run("subset:pc,ps5", json!("pc")).first_error(None),
            Some("The f must be an array for subset validation.")
        );
        assert_eq!(
            run("subset:pc,ps5", json!(["pc", "n64"])).first_error(None),
            Some("All values in f must be one of: pc, ps5.")
        );
    }

    #[test]
    fn boolean_literals() {
        for ok in [json!(true), json!(false), json!(0), json!(1), json!("0"), json!("1"), json!("true"), json!("False")] {
            assert!(passes("boolean", ok.clone()), "{} should be boolean", ok);
        }
        for bad in [json!("no"), json!("yes"), json!(2), json!("TRUE"), json!(1.0)] {
            assert!(!passes("boolean", bad.clone()), "{} should not be boolean", bad);
        }
    }

    #[test]
    fn integer_and_float() {
        assert!(passes("integer", json!(0)));
        assert!(passes("integer", json!("0")));
        assert!(passes("integer", json!([1, "2", 0])));
        assert_eq!(
            run("integer", json!([1, "x", "y"])).all_errors(),
            vec!["All values in f must be integers."]
        );
        assert!(!passes("integer", json!("1.5")));
        assert!(passes("float", json!("1.5")));
        assert!(passes("float", json!(3)));
        assert!(!passes("float", json!("abc")));
    }

    #[test]
    fn value_bounds_short_circuit_on_non_numeric() {
        assert!(passes("minvalue:5", json!(5)));
        assert!(!passes("minvalue:5", json!("4.9")));
        assert_eq!(
            run("minvalue:5", json!("abc")).all_errors(),
            vec!["The f must be numeric to validate minimum value."]
        );
        assert_eq!(
            run("maxvalue:10", json!([1, "x", 99])).all_errors(),
            vec!["All values in f must be numeric to validate maximum value."]
        );
        assert_eq!(
            run("maxvalue:10", json!([1, 99, "x"])).all_errors(),
            vec!["All values in f must not exceed 10."]
        );
    }

    #[test]
    fn regex_and_email() {
        assert!(passes(r"regex:/^\d{4}-\d{2}-\d{2}$/", json!("2007-10-10")));
        assert!(!passes(r"regex:/^\d{4}-\d{2}-\d{2}$/", json!("10/10/2007")));
        assert!(passes("email", json!(["a@b.co", "c@d.io"])));
        assert_eq!(
            run("email", json!(["a@b.co", "nope", "also nope"])).all_errors(),
            vec!["All values in f must be valid email addresses."]
        );
    }

    #[test]
    fn failures_accumulate_across_rules() {
        let errors = run("array|min:2|integer", json!("x"));
        assert_eq!(
            errors.all_errors(),
            vec![
                "The f must be an array.",
                "The f must be at least 2 characters.",
                "The f must be an integer.",
            ]
        );
    }

    #[test]
    fn custom_message_repeats_per_failing_rule() {
        let rules = FieldRuleSet::new().field("f", "min:5|integer");
        let record = json!({"f": "abc"});
        let errors = Validator::new(&rules)
            .with_message("f", "Bad f.")
            .validate_value(&record);
        assert_eq!(errors.all_errors(), vec!["Bad f.", "Bad f."]);

        let collapsed = Validator::new(&rules)
            .with_messages([("f", "Bad f.")])
            .collapse_custom_messages(true)
            .validate_value(&record);
        assert_eq!(collapsed.all_errors(), vec!["Bad f."]);
    }

    #[test]
    fn first_error_follows_declaration_order() {
        let rules = FieldRuleSet::new()
            .field("title", "required")
            .field("genre_id", "required|integer");
        let errors = Validator::new(&rules).validate_value(&json!({"genre_id": "x"}));
        assert_eq!(errors.first_error(None), Some("The title field is required."));
        assert_eq!(errors.first_error(Some("genre_id")), Some("The genre_id must be an integer."));
    }

    #[test]
    fn structured_rules_and_redeclaration() {
        let rules = FieldRuleSet::new()
            .field("f", "required")
            .field_rules("g", vec![Rule::MinLength(2)])
            .field("f", "integer");
        assert!(matches!(rules.rules_for("f"), Some([Rule::Integer])));
        let names: Vec<&str> = rules.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["f", "g"]);
    }
}
