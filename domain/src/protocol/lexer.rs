//! Marker tokenizer.

use crate::role::entities::is_role_name;
use std::ops::Range;

/// Longest bracketed span considered as a marker candidate.
const MAX_MARKER_LEN: usize = 96;

/// Marker keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    RequestHelp,
    ShareDiscovery,
    EndShareDiscovery,
    Delegate,
    Handoff,
    Complete,
}

impl Keyword {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "REQUEST_HELP" => Some(Keyword::RequestHelp),
            "SHARE_DISCOVERY" => Some(Keyword::ShareDiscovery),
            "/SHARE_DISCOVERY" => Some(Keyword::EndShareDiscovery),
            "DELEGATE" => Some(Keyword::Delegate),
            "HANDOFF" => Some(Keyword::Handoff),
            "COMPLETE" => Some(Keyword::Complete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::RequestHelp => "REQUEST_HELP",
            Keyword::ShareDiscovery => "SHARE_DISCOVERY",
            Keyword::EndShareDiscovery => "/SHARE_DISCOVERY",
            Keyword::Delegate => "DELEGATE",
            Keyword::Handoff => "HANDOFF",
            Keyword::Complete => "COMPLETE",
        }
    }

    /// Whether the keyword must be followed by `: <role>`.
    pub fn takes_role(&self) -> bool {
        matches!(
            self,
            Keyword::RequestHelp | Keyword::Delegate | Keyword::Handoff
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// Ordinary content, including bracketed text that is not a marker.
    Text,
    /// A well-formed marker.
    Marker {
        keyword: Keyword,
        role: Option<&'a str>,
    },
    /// A known keyword with a bad argument.
    Malformed { reason: &'static str },
}

/// A token with its byte span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Range<usize>,
}

impl Token<'_> {
    pub fn is_text(&self) -> bool {
        matches!(self.kind, TokenKind::Text)
    }
}

/// Splits text into [`Token`]s.
///
/// Adjacent text tokens may be emitted when a `[` turns out not to start a
/// marker; consumers concatenate them.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Try to read a marker starting at `start` (which must be a `[`).
    fn scan_marker(&self, start: usize) -> Option<(TokenKind<'a>, usize)> {
        let rest = &self.src[start + 1..];
        let close = rest
            .char_indices()
            .take_while(|(i, c)| *i <= MAX_MARKER_LEN && *c != '\n' && *c != '[')
            .find(|(_, c)| *c == ']')
            .map(|(i, _)| i)?;
        let inner = &rest[..close];
        let end = start + 1 + close + 1;

        let (head, arg) = match inner.split_once(':') {
            Some((head, arg)) => (head, Some(arg.trim())),
            None => (inner, None),
        };
        let keyword = Keyword::parse(head)?;

        let kind = match (keyword.takes_role(), arg) {
            (true, Some(role)) if is_role_name(role) => TokenKind::Marker {
                keyword,
                role: Some(role),
            },
            (true, Some("")) | (true, None) => TokenKind::Malformed {
                reason: "missing role",
            },
            (true, Some(_)) => TokenKind::Malformed {
                reason: "invalid role name",
            },
            (false, None) => TokenKind::Marker {
                keyword,
                role: None,
            },
            (false, Some(_)) => TokenKind::Malformed {
                reason: "unexpected argument",
            },
        };
        Some((kind, end))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        if start >= self.src.len() {
            return None;
        }

        if self.src.as_bytes()[start] == b'['
            && let Some((kind, end)) = self.scan_marker(start)
        {
            self.pos = end;
            return Some(Token {
                kind,
                span: start..end,
            });
        }

        // Text runs up to the next '[' after the first char, which may be
        // multibyte.
        let first = self.src[start..].chars().next().map_or(1, char::len_utf8);
        let from = start + first;
        let end = self.src[from..]
            .find('[')
            .map(|i| from + i)
            .unwrap_or(self.src.len());
        self.pos = end;
        Some(Token {
            kind: TokenKind::Text,
            span: start..end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind<'_>> {
        Lexer::new(src).map(|t| t.kind).collect()
    }

    fn markers(src: &str) -> Vec<(Keyword, Option<&str>)> {
        Lexer::new(src)
            .filter_map(|t| match t.kind {
                TokenKind::Marker { keyword, role } => Some((keyword, role)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_text_is_single_token() {
        assert_eq!(kinds("hello world"), vec![TokenKind::Text]);
        assert!(kinds("").is_empty());
    }

    #[test]
    fn test_markers_with_roles() {
        assert_eq!(
            markers("a [DELEGATE: pro] b [HANDOFF:sonnet] c [REQUEST_HELP:  opus  ]"),
            vec![
                (Keyword::Delegate, Some("pro")),
                (Keyword::Handoff, Some("sonnet")),
                (Keyword::RequestHelp, Some("opus")),
            ]
        );
    }

    #[test]
    fn test_markers_without_roles() {
        assert_eq!(
            markers("[SHARE_DISCOVERY] x [/SHARE_DISCOVERY] done [COMPLETE]"),
            vec![
                (Keyword::ShareDiscovery, None),
                (Keyword::EndShareDiscovery, None),
                (Keyword::Complete, None),
            ]
        );
    }

    #[test]
    fn test_unknown_brackets_are_text() {
        let src = "see [docs] and vec[0] or [complete] or [ COMPLETE ]";
        assert!(Lexer::new(src).all(|t| t.is_text()));
        let rebuilt: String = Lexer::new(src).map(|t| &src[t.span]).collect();
        assert_eq!(rebuilt, src);
    }

    #[test]
    fn test_malformed_markers() {
        assert_eq!(
            kinds("[DELEGATE]"),
            vec![TokenKind::Malformed {
                reason: "missing role"
            }]
        );
        assert_eq!(
            kinds("[HANDOFF: ]"),
            vec![TokenKind::Malformed {
                reason: "missing role"
            }]
        );
        assert_eq!(
            kinds("[DELEGATE: two words]"),
            vec![TokenKind::Malformed {
                reason: "invalid role name"
            }]
        );
        assert_eq!(
            kinds("[COMPLETE: pro]"),
            vec![TokenKind::Malformed {
                reason: "unexpected argument"
            }]
        );
    }

    #[test]
    fn test_marker_cannot_span_lines() {
        assert!(Lexer::new("[DELEGATE:\npro]").all(|t| t.is_text()));
    }

    #[test]
    fn test_nested_bracket_before_marker() {
        let src = "[[COMPLETE]";
        let tokens: Vec<_> = Lexer::new(src).collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(&src[tokens[0].span.clone()], "[");
        assert_eq!(
            tokens[1].kind,
            TokenKind::Marker {
                keyword: Keyword::Complete,
                role: None
            }
        );
    }

    #[test]
    fn test_spans_cover_multibyte_text() {
        let src = "héllo [COMPLETE] wörld";
        let rebuilt: String = Lexer::new(src).map(|t| &src[t.span]).collect();
        assert_eq!(rebuilt, src);
    }

    #[test]
    fn test_text_starting_with_multibyte_char() {
        let src = "日本語の回答です [COMPLETE]";
        let tokens: Vec<_> = Lexer::new(src).collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(&src[tokens[0].span.clone()], "日本語の回答です ");
        assert!(matches!(
            tokens[1].kind,
            TokenKind::Marker {
                keyword: Keyword::Complete,
                ..
            }
        ));
    }

    #[test]
    fn test_marker_followed_by_multibyte_char() {
        let src = "[COMPLETE]é fini";
        let tokens: Vec<_> = Lexer::new(src).collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(&src[tokens[1].span.clone()], "é fini");

        let src = "完成[COMPLETE]完成";
        let rebuilt: String = Lexer::new(src).map(|t| &src[t.span]).collect();
        assert_eq!(rebuilt, src);
    }
}
