//! `place_id` slug derivation.
//!
//! Lowercase, decompose to NFD and drop combining marks, turn whitespace into
//! `_`, keep only `[a-z0-9_]`, collapse `_` runs and trim `_` from both ends.
//! The result is deterministic and `slugify(slugify(x)) == slugify(x)`.

use unicode_normalization::{UnicodeNormalization as _, char::is_combining_mark};

pub fn slugify(input: &str) -> String {
  let mut slug = String::with_capacity(input.len());

  for c in input.to_lowercase().nfd() {
    if is_combining_mark(c) {
      continue;
    }
    let c = if c.is_whitespace() { '_' } else { c };
    if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
      continue;
    }
    if c == '_' && slug.ends_with('_') {
      continue;
    }
    slug.push(c);
  }

  slug.trim_matches('_').to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_accents_and_apostrophes() {
    assert_eq!(slugify("Playa d'Alcúdia"), "playa_dalcudia");
  }

  #[test]
  fn collapses_whitespace_and_punctuation_runs() {
    assert_eq!(slugify("  Cala   Mesquida - Capdepera "), "cala_mesquida_capdepera");
    assert_eq!(slugify("Platja de s'Arenal (Llucmajor)"), "platja_de_sarenal_llucmajor");
  }

  #[test]
  fn keeps_digits() {
    assert_eq!(slugify("Balneario 6"), "balneario_6");
  }

  #[test]
  fn is_idempotent() {
    for input in ["Playa d'Alcúdia", "Ça Nostra  Platja", "__Es Trenc__", "Ñandú"] {
      let once = slugify(input);
      assert_eq!(slugify(&once), once, "input {input:?}");
    }
  }

  #[test]
  fn non_latin_input_can_slug_to_empty() {
    assert_eq!(slugify("海滩"), "");
    assert_eq!(slugify("   "), "");
  }
}
