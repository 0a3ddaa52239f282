use regex::Regex;

/// Replaces the first occurrence of `needle` in `haystack`, searching from the
/// start of the string. This is a textual replace, not a splice at the regex
/// match position.
pub fn replace_first(haystack: &str, needle: &str, replacement: &str) -> String {
    match haystack.find(needle) {
        Some(start) => {
            let end = start + needle.len();
            let mut replaced =
                String::with_capacity(haystack.len() - needle.len() + replacement.len());
            replaced.push_str(&haystack[..start]);
            replaced.push_str(replacement);
            replaced.push_str(&haystack[end..]);
            replaced
        }
        None => haystack.to_string(),
    }
}

fn first_match<'a>(extractor: &Regex, text: &'a str) -> &'a str {
    extractor.find(text).map(|m| m.as_str()).unwrap_or_default()
}

#[derive(Debug, PartialEq, Eq)]
pub struct Rewrite {
    pub extracted: String,
    pub subject: String,
}

impl Rewrite {
    pub fn is_empty_extraction(&self) -> bool {
        self.extracted.is_empty()
    }
}

/// What the extract pattern found after substitution, when it was not the replacer.
#[derive(Debug, PartialEq, Eq)]
pub struct Inconsistent {
    pub rematched: String,
}

/// Substitutes the extracted value in `subject` and verifies the extract
/// pattern finds exactly `replacer` in the result.
///
/// An empty extraction leaves the subject untouched and is not verified.
pub fn rewrite_subject(
    subject: &str,
    extractor: &Regex,
    replacer: &str,
) -> Result<Rewrite, Inconsistent> {
    let extracted = first_match(extractor, subject);
    if extracted.is_empty() {
        return Ok(Rewrite {
            extracted: String::new(),
            subject: subject.to_string(),
        });
    }

    let replaced = replace_first(subject, extracted, replacer);
    match extractor.find(&replaced) {
        Some(found) if found.as_str() == replacer => Ok(Rewrite {
            extracted: extracted.to_string(),
            subject: replaced,
        }),
        // no match at all is a failure too, even for an empty replacer
        found => Err(Inconsistent {
            rematched: found.map(|m| m.as_str().to_string()).unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_pattern() -> Regex {
        Regex::new(r"\d[^']+").unwrap()
    }

    #[test]
    fn test_replace_first_only_touches_first_occurrence() {
        assert_eq!("b-a-a", replace_first("a-a-a", "a", "b"));
        assert_eq!("abc", replace_first("abc", "x", "y"));
        assert_eq!("x", replace_first("", "", "x"));
    }

    #[test]
    fn test_rewrite_changes_value() {
        let rewrite = rewrite_subject("will_be_replaced: '0.39.0'", &version_pattern(), "0.76.9")
            .unwrap();
        assert_eq!("0.39.0", rewrite.extracted);
        assert_eq!("will_be_replaced: '0.76.9'", rewrite.subject);
    }

    #[test]
    fn test_rewrite_same_value() {
        let rewrite =
            rewrite_subject("version: '0.39.0'", &version_pattern(), "0.39.0").unwrap();
        assert_eq!("version: '0.39.0'", rewrite.subject);
    }

    #[test]
    fn test_rewrite_symbols() {
        let extractor = Regex::new(r":[<\)]").unwrap();
        let rewrite = rewrite_subject("not_be_replacedB: ':<'", &extractor, ":)").unwrap();
        assert_eq!(":<", rewrite.extracted);
        assert_eq!("not_be_replacedB: ':)'", rewrite.subject);
    }

    #[test]
    fn test_rewrite_rejects_output_the_pattern_cannot_rematch() {
        let result = rewrite_subject("broken_command: '0.39.0'", &version_pattern(), ":)");
        assert_eq!(
            Err(Inconsistent {
                rematched: String::new()
            }),
            result
        );
    }

    #[test]
    fn test_rewrite_rejects_empty_replacer_that_erases_the_value() {
        let result = rewrite_subject("version: '0.39.0'", &version_pattern(), "");
        assert_eq!(
            Err(Inconsistent {
                rematched: String::new()
            }),
            result
        );
    }

    #[test]
    fn test_rewrite_replaces_text_not_match_position() {
        // the pattern matches the trailing "1.0" but the first occurrence of
        // that text is the one that gets replaced, so the check catches it
        let extractor = Regex::new(r"\d\.\d$").unwrap();
        let result = rewrite_subject("1.0 and 1.0", &extractor, "2.0");
        assert_eq!(
            Err(Inconsistent {
                rematched: "1.0".to_string()
            }),
            result
        );

        let extractor = Regex::new(r"= \d\.\d").unwrap();
        let result = rewrite_subject("1.0 = 1.0", &extractor, "= 2.0");
        assert_eq!(
            Ok(Rewrite {
                extracted: "= 1.0".to_string(),
                subject: "1.0 = 2.0".to_string(),
            }),
            result
        );
    }

    #[test]
    fn test_empty_extraction_is_a_no_op() {
        let rewrite = rewrite_subject("no version here", &version_pattern(), "0.76.9").unwrap();
        assert!(rewrite.is_empty_extraction());
        assert_eq!("no version here", rewrite.subject);

        let optional = Regex::new(r"(\d+)?").unwrap();
        let rewrite = rewrite_subject("abc", &optional, "1").unwrap();
        assert!(rewrite.is_empty_extraction());
        assert_eq!("abc", rewrite.subject);
    }
}
