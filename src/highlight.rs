//! Syntax colouring for the revealed code, backed by tree-sitter.
//!
//! The highlighter sees a prefix that grows by one character per call, so the
//! previous tree is edited and handed back to the parser instead of starting
//! from scratch. Partial constructs (a string still being typed, half a
//! function) come back as ERROR nodes whose leaves are still coloured.

use crate::types::Language;

use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use thiserror::Error;
use tree_sitter::{InputEdit, Node, Parser, Point, Tree};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HighlightError {
    #[error("control character {ch:?} at byte {offset}")]
    ControlCharacter { ch: char, offset: usize },

    #[error("grammar rejected: {0}")]
    Grammar(String),

    #[error("parser returned no tree")]
    Parse,
}

pub trait Highlighter {
    /// Colours `text`, one output line per `\n`-separated segment.
    fn highlight(
        &mut self,
        text: &str,
        language: Language,
    ) -> Result<Vec<Line<'static>>, HighlightError>;
}

/// Okaidia-like palette.
mod colors {
    use ratatui::style::Color;

    pub const KEYWORD: Color = Color::Rgb(102, 217, 239);
    pub const STRING: Color = Color::Rgb(166, 226, 46);
    pub const REGEX: Color = Color::Rgb(253, 151, 31);
    pub const NUMBER: Color = Color::Rgb(174, 129, 255);
    pub const COMMENT: Color = Color::Rgb(117, 113, 94);
    pub const FUNCTION: Color = Color::Rgb(230, 219, 116);
    pub const TYPE: Color = Color::Rgb(166, 226, 46);
    pub const CONSTANT: Color = Color::Rgb(174, 129, 255);
    pub const OPERATOR: Color = Color::Rgb(249, 38, 114);
    pub const PUNCTUATION: Color = Color::Rgb(248, 248, 242);
    pub const DEFAULT: Color = Color::Rgb(248, 248, 242);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Type,
    Function,
    String,
    Regex,
    Number,
    Comment,
    Operator,
    Punctuation,
    Constant,
    Default,
}

impl TokenKind {
    fn color(self) -> Color {
        match self {
            Self::Keyword => colors::KEYWORD,
            Self::Type => colors::TYPE,
            Self::Function => colors::FUNCTION,
            Self::String => colors::STRING,
            Self::Regex => colors::REGEX,
            Self::Number => colors::NUMBER,
            Self::Comment => colors::COMMENT,
            Self::Operator => colors::OPERATOR,
            Self::Punctuation => colors::PUNCTUATION,
            Self::Constant => colors::CONSTANT,
            Self::Default => colors::DEFAULT,
        }
    }

    pub fn style(self) -> Style {
        Style::default().fg(self.color())
    }
}

pub struct TreeSitterHighlighter {
    parser: Parser,
    /// Tree and source of the previous call, reused when the new text
    /// extends the old one.
    previous: Option<(Tree, String)>,
}

impl TreeSitterHighlighter {
    pub fn new() -> Result<Self, HighlightError> {
        let language: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();

        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| HighlightError::Grammar(e.to_string()))?;

        Ok(Self {
            parser,
            previous: None,
        })
    }

    fn parse(&mut self, text: &str) -> Result<Tree, HighlightError> {
        let old_tree = match self.previous.take() {
            Some((mut tree, old)) if text.starts_with(old.as_str()) => {
                tree.edit(&append_edit(&old, text));
                Some(tree)
            }
            _ => None,
        };

        let tree = self
            .parser
            .parse(text, old_tree.as_ref())
            .ok_or(HighlightError::Parse)?;

        self.previous = Some((tree.clone(), text.to_string()));

        Ok(tree)
    }
}

impl Highlighter for TreeSitterHighlighter {
    fn highlight(
        &mut self,
        text: &str,
        language: Language,
    ) -> Result<Vec<Line<'static>>, HighlightError> {
        if let Some((offset, ch)) = text
            .char_indices()
            .find(|&(_, c)| c.is_control() && c != '\n' && c != '\t')
        {
            return Err(HighlightError::ControlCharacter { ch, offset });
        }

        let tokens = match language {
            Language::JavaScript => {
                let tree = self.parse(text)?;
                tokens(tree.root_node(), text.len())
            }
        };

        Ok(into_lines(text, &tokens))
    }
}

/// Edit describing `new` as `old` with bytes appended.
fn append_edit(old: &str, new: &str) -> InputEdit {
    let old_end = end_point(old);

    InputEdit {
        start_byte: old.len(),
        old_end_byte: old.len(),
        new_end_byte: new.len(),
        start_position: old_end,
        old_end_position: old_end,
        new_end_position: end_point(new),
    }
}

fn end_point(text: &str) -> Point {
    match text.rfind('\n') {
        Some(i) => Point::new(text.matches('\n').count(), text.len() - i - 1),
        None => Point::new(0, text.len()),
    }
}

/// Byte range and kind of each token, covering `0..len` without gaps.
pub fn tokens(root: Node, len: usize) -> Vec<(usize, usize, TokenKind)> {
    let mut out = Vec::new();
    let mut pos = 0;
    let mut cursor = root.walk();

    'walk: loop {
        let node = cursor.node();
        let whole = whole_node_kind(node.kind());

        if whole.is_some() || node.child_count() == 0 {
            let (start, end) = (node.start_byte().max(pos), node.end_byte().min(len));

            if start < end {
                if start > pos {
                    out.push((pos, start, TokenKind::Default));
                }
                out.push((start, end, whole.unwrap_or_else(|| leaf_kind(node))));
                pos = end;
            }
        } else if cursor.goto_first_child() {
            continue;
        }

        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    if pos < len {
        out.push((pos, len, TokenKind::Default));
    }

    out
}

/// Nodes coloured as one piece without looking at their children.
fn whole_node_kind(kind: &str) -> Option<TokenKind> {
    match kind {
        "comment" => Some(TokenKind::Comment),
        "string" | "template_string" => Some(TokenKind::String),
        "regex" => Some(TokenKind::Regex),
        "number" => Some(TokenKind::Number),
        _ => None,
    }
}

fn leaf_kind(node: Node) -> TokenKind {
    let kind = node.kind();

    if !node.is_named() {
        return if kind.chars().all(|c| c.is_ascii_alphabetic()) {
            TokenKind::Keyword
        } else if kind.chars().all(|c| "()[]{};,.".contains(c)) {
            TokenKind::Punctuation
        } else {
            TokenKind::Operator
        };
    }

    match kind {
        "true" | "false" | "null" | "undefined" | "this" | "super" => TokenKind::Constant,
        "identifier" | "property_identifier" => identifier_kind(node),
        _ => TokenKind::Default,
    }
}

fn identifier_kind(node: Node) -> TokenKind {
    let Some(parent) = node.parent() else {
        return TokenKind::Default;
    };

    let is_field =
        |field: &str| parent.child_by_field_name(field).map(|n| n.id()) == Some(node.id());

    match parent.kind() {
        "function_declaration" | "function_expression" | "generator_function_declaration"
        | "method_definition"
            if is_field("name") =>
        {
            TokenKind::Function
        }
        "call_expression" if is_field("function") => TokenKind::Function,
        "member_expression" if is_field("property") => match parent.parent() {
            Some(call) if call.kind() == "call_expression" => {
                let callee = call.child_by_field_name("function").map(|n| n.id());
                if callee == Some(parent.id()) {
                    TokenKind::Function
                } else {
                    TokenKind::Default
                }
            }
            _ => TokenKind::Default,
        },
        "class_declaration" | "class" if is_field("name") => TokenKind::Type,
        "new_expression" if is_field("constructor") => TokenKind::Type,
        _ => TokenKind::Default,
    }
}

fn into_lines(text: &str, tokens: &[(usize, usize, TokenKind)]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();

    for &(start, end, kind) in tokens {
        let mut pieces = text[start..end].split('\n').peekable();

        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                spans.push(Span::styled(piece.replace('\t', "    "), kind.style()));
            }

            if pieces.peek().is_some() {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
        }
    }

    lines.push(Line::from(spans));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(String, TokenKind)> {
        let mut hl = TreeSitterHighlighter::new().unwrap();
        let tree = hl.parse(text).unwrap();

        tokens(tree.root_node(), text.len())
            .into_iter()
            .map(|(s, e, k)| (text[s..e].to_string(), k))
            .filter(|(t, _)| !t.trim().is_empty())
            .collect()
    }

    fn has(tokens: &[(String, TokenKind)], text: &str, kind: TokenKind) -> bool {
        tokens.iter().any(|(t, k)| t == text && *k == kind)
    }

    fn styles(lines: &[Line<'static>]) -> Vec<Vec<(String, Style)>> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| (s.content.to_string(), s.style)).collect())
            .collect()
    }

    #[test]
    fn test_function_declaration() {
        let tokens = kinds("function fibonacci(n) {\n  return n;\n}");

        assert!(has(&tokens, "function", TokenKind::Keyword));
        assert!(has(&tokens, "fibonacci", TokenKind::Function));
        assert!(has(&tokens, "(", TokenKind::Punctuation));
        assert!(has(&tokens, "n", TokenKind::Default));
        assert!(has(&tokens, "return", TokenKind::Keyword));
    }

    #[test]
    fn test_calls_numbers_and_comments() {
        let tokens = kinds("console.log(fibonacci(10)); // 55");

        assert!(has(&tokens, "log", TokenKind::Function));
        assert!(has(&tokens, "fibonacci", TokenKind::Function));
        assert!(has(&tokens, "console", TokenKind::Default));
        assert!(has(&tokens, "10", TokenKind::Number));
        assert!(has(&tokens, "// 55", TokenKind::Comment));
    }

    #[test]
    fn test_regex_literal_stays_contained() {
        let tokens = kinds("s.replace(/'/g, \"\"); let x = 1;");

        assert!(has(&tokens, "/'/g", TokenKind::Regex));
        assert!(has(&tokens, "\"\"", TokenKind::String));
        assert!(has(&tokens, "let", TokenKind::Keyword));
        assert!(has(&tokens, "1", TokenKind::Number));
    }

    #[test]
    fn test_exponent_is_one_number() {
        let tokens = kinds("const e = 1e-5;");
        assert!(has(&tokens, "1e-5", TokenKind::Number));
    }

    #[test]
    fn test_operators_and_constants() {
        let tokens = kinds("if (n <= 1 && ok === true) x = null;");

        assert!(has(&tokens, "if", TokenKind::Keyword));
        assert!(has(&tokens, "<=", TokenKind::Operator));
        assert!(has(&tokens, "===", TokenKind::Operator));
        assert!(has(&tokens, "true", TokenKind::Constant));
        assert!(has(&tokens, "null", TokenKind::Constant));
    }

    #[test]
    fn test_tokens_cover_text() {
        for text in [
            "console.log(fibonacci(10)); // 55\n`t\n${x}` é",
            "function f(a) {\n  if (a",
            "const s = \"unterminated",
        ] {
            let mut hl = TreeSitterHighlighter::new().unwrap();
            let tree = hl.parse(text).unwrap();

            let mut pos = 0;
            for (start, end, _) in tokens(tree.root_node(), text.len()) {
                assert_eq!(start, pos, "gap in {text:?}");
                assert!(end > start);
                pos = end;
            }
            assert_eq!(pos, text.len());
        }
    }

    #[test]
    fn test_growing_prefix_matches_fresh_parse() {
        let source = "function fibonacci(n) {\n  if (n <= 1) return n;\n}";
        let mut incremental = TreeSitterHighlighter::new().unwrap();

        for end in (1..=source.len()).filter(|&i| source.is_char_boundary(i)) {
            let prefix = &source[..end];
            let lines = incremental.highlight(prefix, Language::JavaScript).unwrap();

            let flat: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
            let expected: Vec<&str> = prefix.split('\n').collect();
            assert_eq!(flat, expected, "prefix {prefix:?}");
        }

        let grown = incremental.highlight(source, Language::JavaScript).unwrap();
        let fresh = TreeSitterHighlighter::new()
            .unwrap()
            .highlight(source, Language::JavaScript)
            .unwrap();
        assert_eq!(styles(&grown), styles(&fresh));
    }

    #[test]
    fn test_shorter_text_parses_from_scratch() {
        let mut hl = TreeSitterHighlighter::new().unwrap();
        hl.highlight("let abc = 1;", Language::JavaScript).unwrap();

        let lines = hl.highlight("let", Language::JavaScript).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to_string(), "let");
    }

    #[test]
    fn test_end_point() {
        assert_eq!(end_point("abc"), Point::new(0, 3));
        assert_eq!(end_point("ab\ncd\n"), Point::new(2, 0));
        assert_eq!(end_point("ab\nc"), Point::new(1, 1));
    }

    #[test]
    fn test_one_line_per_segment() {
        let mut hl = TreeSitterHighlighter::new().unwrap();
        let lines = hl.highlight("a\n\nb\n", Language::JavaScript).unwrap();

        let flat: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(flat, vec!["a", "", "b", ""]);
    }

    #[test]
    fn test_control_character_rejected() {
        let mut hl = TreeSitterHighlighter::new().unwrap();
        let err = hl.highlight("ok\u{1b}[2J", Language::JavaScript).unwrap_err();

        assert_eq!(err, HighlightError::ControlCharacter { ch: '\u{1b}', offset: 2 });
    }
}
