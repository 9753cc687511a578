//! Tab completion for wizard commands and their arguments.

use rustyline::completion::{Completer, Pair};
use rustyline::{Context as ReadlineContext, Helper, Highlighter, Hinter, Validator};

use crate::domain::{DistanceUnit, ListingGoal, PoiCategory, PropertyType, TEXT_FIELDS};

const CHOICE_FIELDS: [&str; 3] = ["property_type", "furnishing", "ownership"];

#[derive(Helper, Hinter, Highlighter, Validator)]
pub(crate) struct WizardHelper {
    commands: Vec<String>,
}

impl WizardHelper {
    pub(crate) fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names.into_iter().map(str::to_string).collect();
        commands.sort();
        Self { commands }
    }

    /// Values that may follow the already typed `words`.
    fn choices(&self, words: &[String]) -> Vec<String> {
        let lowered: Vec<String> = words.iter().map(|word| word.to_ascii_lowercase()).collect();
        let words: Vec<&str> = lowered.iter().map(String::as_str).collect();
        match words.as_slice() {
            [] | ["help"] => self.commands.clone(),
            ["goal"] => lowercase_labels(ListingGoal::ALL),
            ["type"] => lowercase_labels(PropertyType::ALL),
            ["unit"] => DistanceUnit::ALL.iter().map(|unit| unit.to_string()).collect(),
            ["set"] => TEXT_FIELDS
                .iter()
                .map(|(key, _)| *key)
                .chain(CHOICE_FIELDS)
                .map(str::to_string)
                .collect(),
            ["poi"] => to_strings(&["add", "rm", "list"]),
            ["image"] => to_strings(&["add", "rm", "list"]),
            ["amenity"] => to_strings(&["add", "rm"]),
            ["poi", "add"] => lowercase_labels(PoiCategory::ALL),
            ["poi", "add", category] => PoiCategory::parse(category)
                .map(|category| to_strings(category.vocabulary()))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

impl Completer for WizardHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (words, start) = split_for_completion(&line[..pos]);
        let partial = line[start..pos].trim_start_matches(['"', '\'']).to_ascii_lowercase();
        let pairs = self
            .choices(&words)
            .into_iter()
            .filter(|choice| choice.to_ascii_lowercase().starts_with(&partial))
            .map(|choice| Pair {
                replacement: quote_if_spaced(&choice),
                display: choice,
            })
            .collect();
        Ok((start, pairs))
    }
}

/// Finished words before the cursor and the byte offset where the word
/// under the cursor begins. An open quote starts a word.
fn split_for_completion(prefix: &str) -> (Vec<String>, usize) {
    let mut start = 0;
    let mut open_quote = None;
    for (index, ch) in prefix.char_indices() {
        match open_quote {
            Some(quote) if ch == quote => open_quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => open_quote = Some(ch),
            None if ch.is_whitespace() => start = index + ch.len_utf8(),
            None => {}
        }
    }
    let words = shell_words::split(&prefix[..start]).unwrap_or_default();
    (words, start)
}

fn quote_if_spaced(choice: &str) -> String {
    if choice.contains(' ') {
        format!("\"{choice}\"")
    } else {
        choice.to_string()
    }
}

fn lowercase_labels<T: ToString>(values: impl IntoIterator<Item = T>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.to_string().to_ascii_lowercase())
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::DefaultHistory;

    fn complete(line: &str) -> (usize, Vec<String>) {
        let helper = WizardHelper::new(vec!["next", "new", "poi", "goal", "unit", "set"]);
        let history = DefaultHistory::new();
        let ctx = ReadlineContext::new(&history);
        let (start, pairs) = helper.complete(line, line.len(), &ctx).expect("complete");
        (start, pairs.into_iter().map(|pair| pair.replacement).collect())
    }

    #[test]
    fn first_word_completes_commands() {
        assert_eq!(complete("ne"), (0, vec!["new".to_string(), "next".to_string()]));
    }

    #[test]
    fn goal_and_unit_arguments_complete_from_domain_values() {
        assert_eq!(complete("goal f").1, vec!["flatmate"]);
        assert_eq!(complete("unit m").1, vec!["meter", "\"min walk\""]);
        assert_eq!(complete("GOAL ").1, vec!["rent", "sale", "flatmate"]);
    }

    #[test]
    fn poi_add_walks_category_then_vocabulary() {
        assert_eq!(complete("poi add t").1, vec!["transit"]);
        let (start, types) = complete("poi add transit \"bus");
        assert_eq!(start, "poi add transit ".len());
        assert_eq!(types, vec!["\"Bus Stop\""]);
        assert!(complete("poi add transit m").1.contains(&"\"Metro Station\"".to_string()));
        assert!(complete("poi add nowhere ").1.is_empty());
    }

    #[test]
    fn set_offers_field_keys() {
        let keys = complete("set own").1;
        assert_eq!(keys, vec!["ownership"]);
        assert!(complete("next ").1.is_empty());
    }
}
