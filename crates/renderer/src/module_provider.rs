// Rust guideline compliant 2026-02-23

//! Bundled helper namespaces exposed to templates as `module.<name>...`
//! (spec §4.5): random number/string generation, value conversion, and a
//! small fake-data generator standing in for the original's mimesis wrapper.
//!
//! minijinja assembles its function table once, when the `Environment` is
//! built, rather than resolving names lazily per render call the way the
//! original's `importlib`-backed provider does. So "on first access, cached"
//! here means: registered once at plugin construction, not re-looked-up per
//! render. There is no ambient-runtime fallback (Rust has no equivalent to
//! `importlib.import_module` for an arbitrary installed package); a template
//! calling an unregistered `module.*` function gets minijinja's own
//! unknown-function error.

use minijinja::value::Value;
use minijinja::{Environment, Error, ErrorKind};
use rand::seq::IndexedRandom as _;
use rand::Rng as _;

const WORDS: &[&str] =
    &["lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "eiusmod"];
const FIRST_NAMES: &[&str] = &["Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi"];

/// Registers the bundled `random`, `convert`, and `mimesis` helper
/// functions on `env`.
pub fn install(env: &mut Environment<'_>) {
    env.add_function("random_integer", random_integer);
    env.add_function("random_string", random_string);
    env.add_function("random_choice", random_choice);
    env.add_function("convert_to_int", convert_to_int);
    env.add_function("convert_to_float", convert_to_float);
    env.add_function("convert_to_str", convert_to_str);
    env.add_function("mimesis_word", mimesis_word);
    env.add_function("mimesis_name", mimesis_name);
    env.add_function("mimesis_sentence", mimesis_sentence);
}

fn random_integer(low: i64, high: i64) -> Result<i64, Error> {
    if low > high {
        return Err(Error::new(ErrorKind::InvalidOperation, "random_integer: low must not exceed high"));
    }
    Ok(rand::rng().random_range(low..=high))
}

fn random_string(length: usize) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::rng();
    (0..length).map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char).collect()
}

fn random_choice(items: Vec<Value>) -> Result<Value, Error> {
    items
        .choose(&mut rand::rng())
        .cloned()
        .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, "random_choice: sequence is empty"))
}

fn convert_to_int(value: Value) -> Result<i64, Error> {
    value
        .as_str()
        .and_then(|s| s.parse::<i64>().ok())
        .or_else(|| i64::try_from(value.clone()).ok())
        .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, "convert_to_int: value is not integer-convertible"))
}

fn convert_to_float(value: Value) -> Result<f64, Error> {
    value
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| f64::try_from(value.clone()).ok())
        .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, "convert_to_float: value is not float-convertible"))
}

fn convert_to_str(value: Value) -> String {
    value.to_string()
}

fn mimesis_word() -> String {
    (*WORDS.choose(&mut rand::rng()).expect("WORDS is non-empty")).to_owned()
}

fn mimesis_name() -> String {
    (*FIRST_NAMES.choose(&mut rand::rng()).expect("FIRST_NAMES is non-empty")).to_owned()
}

fn mimesis_sentence(word_count: usize) -> String {
    let mut rng = rand::rng();
    let words: Vec<&str> = (0..word_count.max(1)).map(|_| *WORDS.choose(&mut rng).expect("WORDS is non-empty")).collect();
    let mut sentence = words.join(" ");
    if let Some(first) = sentence.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    sentence.push('.');
    sentence
}

#[cfg(test)]
mod tests {
    use super::{convert_to_int, mimesis_sentence, random_integer, random_string};
    use minijinja::value::Value;

    #[test]
    fn random_integer_stays_within_bounds() {
        for _ in 0..50 {
            let n = random_integer(1, 5).unwrap();
            assert!((1..=5).contains(&n));
        }
    }

    #[test]
    fn random_string_has_the_requested_length() {
        assert_eq!(random_string(12).chars().count(), 12);
    }

    #[test]
    fn convert_to_int_parses_numeric_strings() {
        let value = Value::from("42");
        assert_eq!(convert_to_int(value).unwrap(), 42);
    }

    #[test]
    fn mimesis_sentence_ends_with_a_period() {
        assert!(mimesis_sentence(3).ends_with('.'));
    }
}
