//! Line tokenizer for the modeling language.
//!
//! Highlighting only: every character of a line belongs to some span, and a
//! span either has a [`TokenClass`] or is left unstyled. There are no error
//! states.

/// Reserved words of the modeling language.
pub const KEYWORDS: &[&str] = &[
    "extern", "import", "fixed", "distinct", "random", "origin", "param", "type", "obs", "query",
    "for", "forall", "exists", "if", "then", "else", "null",
];

/// Built-in type names.
pub const TYPE_NAMES: &[&str] = &[
    "Integer",
    "Real",
    "Boolean",
    "NaturalNum",
    "String",
    "List",
    "Map",
    "RealMatrix",
    "IntMatrix",
    "TabularCPD",
    "Categorical",
];

/// Single-character operators.
pub const OPERATORS: &[char] = &[':', '=', '~'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Keyword,
    TypeName,
    Operator,
}

impl TokenClass {
    /// Style name used by the editor theme.
    pub fn style(self) -> &'static str {
        match self {
            TokenClass::Keyword => "keyword",
            TokenClass::TypeName => "tag",
            TokenClass::Operator => "atom",
        }
    }
}

/// Byte range `[start, end)` within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub class: Option<TokenClass>,
}

impl Span {
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Length of the first word in `words` that prefixes `rest` and ends at a word boundary.
///
/// No boundary is required in front of the word: `xobs` yields `x` unstyled
/// followed by the keyword `obs`.
fn match_word(rest: &str, words: &[&str]) -> Option<usize> {
    words.iter().find_map(|w| {
        if !rest.starts_with(w) {
            return None;
        }
        match rest.as_bytes().get(w.len()) {
            Some(&b) if is_word_byte(b) => None,
            _ => Some(w.len()),
        }
    })
}

/// Tokenize a single line.
pub fn tokenize_line(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut pos = 0usize;

    while pos < line.len() {
        let rest = &line[pos..];

        let ws = rest
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if ws > 0 {
            spans.push(Span {
                start: pos,
                end: pos + ws,
                class: None,
            });
            pos += ws;
            continue;
        }

        let (len, class) = if let Some(n) = match_word(rest, KEYWORDS) {
            (n, Some(TokenClass::Keyword))
        } else if let Some(n) = match_word(rest, TYPE_NAMES) {
            (n, Some(TokenClass::TypeName))
        } else {
            // `rest` is non-empty here.
            let c = rest.chars().next().unwrap_or(' ');
            let class = OPERATORS.contains(&c).then_some(TokenClass::Operator);
            (c.len_utf8(), class)
        };

        spans.push(Span {
            start: pos,
            end: pos + len,
            class,
        });
        pos += len;
    }

    spans
}

/// Tokenize a whole document, one span list per line.
pub fn tokenize(text: &str) -> Vec<Vec<Span>> {
    text.split('\n')
        .map(|line| tokenize_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

/// Merge adjacent spans of the same class (unstyled runs included).
///
/// The renderer emits one element per span, so this keeps the overlay small
/// for long identifier runs.
pub fn coalesce(spans: &[Span]) -> Vec<Span> {
    let mut out: Vec<Span> = Vec::with_capacity(spans.len());
    for s in spans {
        match out.last_mut() {
            Some(last) if last.class.is_none() && s.class.is_none() && last.end == s.start => {
                last.end = s.end;
            }
            _ => out.push(*s),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(line: &str) -> Vec<(&str, Option<TokenClass>)> {
        tokenize_line(line)
            .into_iter()
            .map(|s| (s.text(line), s.class))
            .filter(|(t, c)| c.is_some() || !t.trim().is_empty())
            .collect()
    }

    #[test]
    fn recognizes_keywords_types_and_operators() {
        let got = classes("random Boolean Burglary ~ BooleanDistrib(0.001);");
        assert_eq!(got[0], ("random", Some(TokenClass::Keyword)));
        assert_eq!(got[1], ("Boolean", Some(TokenClass::TypeName)));
        assert!(got.contains(&("~", Some(TokenClass::Operator))));
        // `BooleanDistrib` is not a type name: no boundary after `Boolean`.
        assert!(!got
            .iter()
            .skip(2)
            .any(|(_, c)| *c == Some(TokenClass::TypeName)));
    }

    #[test]
    fn longer_alternative_wins_when_prefix_lacks_boundary() {
        let got = classes("forall x");
        assert_eq!(got[0], ("forall", Some(TokenClass::Keyword)));

        let got = classes("RealMatrix m");
        assert_eq!(got[0], ("RealMatrix", Some(TokenClass::TypeName)));
    }

    #[test]
    fn no_boundary_is_required_before_a_word() {
        let spans = tokenize_line("xobs");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].class, None);
        assert_eq!(spans[1].text("xobs"), "obs");
        assert_eq!(spans[1].class, Some(TokenClass::Keyword));
    }

    #[test]
    fn unrecognized_characters_advance_one_at_a_time() {
        let spans = tokenize_line("ab");
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.class.is_none()));
    }

    #[test]
    fn spans_cover_the_whole_line_including_multibyte() {
        let line = "obs  Größe = 3 ; // ünïcode";
        let spans = tokenize_line(line);
        let mut pos = 0;
        for s in &spans {
            assert_eq!(s.start, pos);
            assert!(s.end > s.start);
            pos = s.end;
        }
        assert_eq!(pos, line.len());
    }

    #[test]
    fn operators_are_atoms() {
        let got = classes("a:b=c~d");
        let ops: Vec<_> = got
            .iter()
            .filter(|(_, c)| *c == Some(TokenClass::Operator))
            .map(|(t, _)| *t)
            .collect();
        assert_eq!(ops, vec![":", "=", "~"]);
        assert_eq!(TokenClass::Operator.style(), "atom");
        assert_eq!(TokenClass::TypeName.style(), "tag");
    }

    #[test]
    fn tokenize_splits_lines_and_strips_cr() {
        let lines = tokenize("query A;\r\nobs B = true;");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0].class, Some(TokenClass::Keyword));
        assert_eq!(lines[1][0].class, Some(TokenClass::Keyword));
        assert_eq!(lines[0].last().map(|s| s.end), Some("query A;".len()));
    }

    #[test]
    fn coalesce_merges_unstyled_runs_only() {
        let line = "abc obs";
        let merged = coalesce(&tokenize_line(line));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text(line), "abc ");
        assert_eq!(merged[1].class, Some(TokenClass::Keyword));
    }
}
