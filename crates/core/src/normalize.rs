use crate::error::IngestError;
use regex::Regex;

/// Collapses whitespace noise left behind by PDF text extraction.
///
/// The three rules run in a fixed order so that stripping trailing spaces
/// cannot re-introduce runs of blank lines:
/// 1. whitespace immediately before a newline is dropped,
/// 2. runs of two or more newlines collapse to one blank line,
/// 3. runs of two or more interior spaces collapse to one space.
#[derive(Debug, Clone)]
pub struct Normalizer {
    trailing_whitespace: Regex,
    blank_lines: Regex,
    repeated_spaces: Regex,
}

impl Normalizer {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            trailing_whitespace: Regex::new(r"[ \t\r\f]+\n")?,
            blank_lines: Regex::new(r"\n{2,}")?,
            repeated_spaces: Regex::new(r" {2,}")?,
        })
    }

    pub fn normalize(&self, raw: &str) -> String {
        let stripped = self.trailing_whitespace.replace_all(raw, "\n");
        let collapsed = self.blank_lines.replace_all(&stripped, "\n\n");
        self.repeated_spaces.replace_all(&collapsed, " ").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new().expect("patterns should compile")
    }

    #[test]
    fn trailing_spaces_before_newline_are_removed() {
        let output = normalizer().normalize("linha um   \nlinha dois\t\nfim");
        assert_eq!(output, "linha um\nlinha dois\nfim");
    }

    #[test]
    fn runs_of_newlines_collapse_to_one_blank_line() {
        let output = normalizer().normalize("primeiro\n\n\n\nsegundo");
        assert_eq!(output, "primeiro\n\nsegundo");
    }

    #[test]
    fn repeated_interior_spaces_collapse() {
        let output = normalizer().normalize("CNPJ:    12.345.678/0001-99");
        assert_eq!(output, "CNPJ: 12.345.678/0001-99");
    }

    #[test]
    fn trailing_space_removal_does_not_reintroduce_blank_runs() {
        // "a \n \n \nb": each line is whitespace then newline.
        let output = normalizer().normalize("a \n \n \nb");
        assert_eq!(output, "a\n\nb");
    }

    #[test]
    fn normalization_is_idempotent() {
        let normalizer = normalizer();
        let once = normalizer.normalize("um   \n\n\n\ndois    tres \n");
        let twice = normalizer.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalizer().normalize(""), "");
    }
}
