//! Builds a per-field sub-DSL constrained to the alphabet and numeric
//! bound the decomposer inferred for that field (spec.md §4.D).

use std::collections::BTreeSet;

/// A DSL constrained to one field's alphabet: which characters a `Char`
/// atom may carry, which regex-class atoms are usable, and the upper
/// bound for `Number` literals used by `copies`/`{n}`.
#[derive(Debug, Clone)]
pub struct Dsl {
    pub alphabet: Vec<char>,
    pub classes: RegexClasses,
    /// Inclusive upper bound for `Number` terminals (`{n}`), derived from
    /// the longest field value observed among the valid examples.
    pub max_number: u32,
}

/// Which predefined regex-class atoms (`.`, `\d`, `\w`, `\s`) are
/// compatible with a field's alphabet: a class is offered only if every
/// character class member appears in the class's own definition, so the
/// enumerator never proposes an atom that could never match a valid
/// example.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexClasses {
    pub dot: bool,
    pub digit: bool,
    pub word: bool,
    pub space: bool,
}

impl Dsl {
    /// Build the sub-DSL for one field from its observed alphabet and the
    /// longest valid value seen for it.
    pub fn for_field(alphabet: &BTreeSet<char>, max_field_len: usize) -> Self {
        let digit = !alphabet.is_empty() && alphabet.iter().all(|c| c.is_ascii_digit());
        let word = !alphabet.is_empty() && alphabet.iter().all(|c| c.is_alphanumeric() || *c == '_');
        let space = !alphabet.is_empty() && alphabet.iter().all(|c| c.is_whitespace());
        Self {
            alphabet: alphabet.iter().copied().collect(),
            classes: RegexClasses {
                dot: !alphabet.is_empty(),
                digit,
                word,
                space,
            },
            max_number: max_field_len.max(1) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_digit_alphabet_offers_the_digit_class() {
        let alphabet: BTreeSet<char> = "0123456789".chars().collect();
        let dsl = Dsl::for_field(&alphabet, 3);
        assert!(dsl.classes.digit);
        assert!(dsl.classes.dot);
        assert!(!dsl.classes.space);
    }

    #[test]
    fn mixed_alphabet_does_not_offer_digit_class() {
        let alphabet: BTreeSet<char> = "a1b2".chars().collect();
        let dsl = Dsl::for_field(&alphabet, 4);
        assert!(!dsl.classes.digit);
        assert!(dsl.classes.word);
    }

    #[test]
    fn max_number_tracks_longest_field() {
        let alphabet: BTreeSet<char> = "abc".chars().collect();
        let dsl = Dsl::for_field(&alphabet, 7);
        assert_eq!(dsl.max_number, 7);
    }
}
