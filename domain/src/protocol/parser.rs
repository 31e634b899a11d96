//! Protocol parser: raw reply in, directives and clean text out.

use super::directive::Directive;
use super::lexer::{Keyword, Lexer, Token, TokenKind};
use super::tool_block::{MalformedToolBlock, extract_tool_blocks};
use crate::role::{RoleId, RoleRegistry};
use crate::tool::ToolCall;
use std::collections::HashSet;

/// Everything the parser extracted from one reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOutput {
    /// Directives in textual order.
    pub directives: Vec<Directive>,
    pub tool_calls: Vec<ToolCall>,
    pub malformed_tool_blocks: Vec<MalformedToolBlock>,
    /// The reply with markers and tool blocks removed.
    pub clean_text: String,
}

impl ParsedOutput {
    pub fn has_tool_requests(&self) -> bool {
        !self.tool_calls.is_empty() || !self.malformed_tool_blocks.is_empty()
    }

    pub fn recoverable_errors(&self) -> impl Iterator<Item = &str> {
        self.directives.iter().filter_map(|d| match d {
            Directive::RecoverableError { message } => Some(message.as_str()),
            _ => None,
        })
    }
}

/// Parses role replies against a role registry.
///
/// Parsing never fails: anything that cannot be honoured becomes a
/// [`Directive::RecoverableError`].
pub struct ProtocolParser<'r> {
    roles: &'r RoleRegistry,
}

impl<'r> ProtocolParser<'r> {
    pub fn new(roles: &'r RoleRegistry) -> Self {
        Self { roles }
    }

    pub fn parse(&self, raw: &str) -> ParsedOutput {
        let blocks = extract_tool_blocks(raw);
        let text = blocks.remaining.as_str();
        let tokens: Vec<Token<'_>> = Lexer::new(text).collect();

        let mut directives = Vec::new();
        let mut consumed_closers: HashSet<usize> = HashSet::new();

        for (i, token) in tokens.iter().enumerate() {
            let raw_marker = &text[token.span.clone()];
            match &token.kind {
                TokenKind::Text => {}
                TokenKind::Malformed { reason } => {
                    directives.push(Directive::RecoverableError {
                        message: format!("malformed marker {}: {}", raw_marker, reason),
                    });
                }
                TokenKind::Marker { keyword, role } => {
                    let role = role.unwrap_or_default();
                    let directive = match keyword {
                        Keyword::RequestHelp => self.resolve(role, raw_marker).map(|target| {
                            let question = rest_of_line(text, &tokens, i);
                            Directive::RequestHelp {
                                target,
                                question: (!question.is_empty()).then_some(question),
                            }
                        }),
                        Keyword::ShareDiscovery => {
                            // Block form only if a closer comes before the next opener.
                            let closer = tokens[i + 1..]
                                .iter()
                                .position(|t| {
                                    matches!(
                                        t.kind,
                                        TokenKind::Marker {
                                            keyword: Keyword::ShareDiscovery
                                                | Keyword::EndShareDiscovery,
                                            ..
                                        }
                                    )
                                })
                                .map(|p| i + 1 + p)
                                .filter(|c| {
                                    matches!(
                                        tokens[*c].kind,
                                        TokenKind::Marker {
                                            keyword: Keyword::EndShareDiscovery,
                                            ..
                                        }
                                    )
                                });
                            let payload = match closer {
                                Some(c) => {
                                    consumed_closers.insert(c);
                                    strip_markers(&text[token.span.end..tokens[c].span.start])
                                        .trim()
                                        .to_string()
                                }
                                None => rest_of_line(text, &tokens, i),
                            };
                            if payload.is_empty() {
                                Err(recoverable(format!("empty discovery in {}", raw_marker)))
                            } else {
                                Ok(Directive::ShareDiscovery { payload })
                            }
                        }
                        Keyword::EndShareDiscovery if consumed_closers.contains(&i) => continue,
                        Keyword::EndShareDiscovery => Err(recoverable(format!(
                            "{} without an opening [SHARE_DISCOVERY]",
                            raw_marker
                        ))),
                        Keyword::Delegate => self.resolve(role, raw_marker).and_then(|target| {
                            let mut subtask = rest_of_line(text, &tokens, i);
                            if subtask.is_empty() {
                                subtask = next_paragraph(text, &tokens, i);
                            }
                            if subtask.is_empty() {
                                Err(recoverable(format!("{} without a subtask", raw_marker)))
                            } else {
                                Ok(Directive::Delegate { target, subtask })
                            }
                        }),
                        Keyword::Handoff => self
                            .resolve(role, raw_marker)
                            .map(|target| Directive::Handoff { target }),
                        Keyword::Complete => Ok(Directive::Complete),
                    };
                    directives.push(directive.unwrap_or_else(|e| e));
                }
            }
        }

        ParsedOutput {
            directives,
            tool_calls: blocks.calls,
            malformed_tool_blocks: blocks.malformed,
            clean_text: clean_text(text),
        }
    }

    fn resolve(&self, name: &str, raw_marker: &str) -> Result<RoleId, Directive> {
        self.roles
            .resolve(name)
            .map(|r| r.id.clone())
            .ok_or_else(|| recoverable(format!("unknown role '{}' in {}", name, raw_marker)))
    }
}

fn recoverable(message: String) -> Directive {
    Directive::RecoverableError { message }
}

/// Text after token `i` up to the next marker, as a slice of `text`.
fn trailing_segment<'a>(text: &'a str, tokens: &[Token<'_>], i: usize) -> &'a str {
    let start = tokens[i].span.end;
    let stop = tokens[i + 1..]
        .iter()
        .find(|t| !t.is_text())
        .map(|t| t.span.start)
        .unwrap_or(text.len());
    &text[start..stop]
}

fn rest_of_line(text: &str, tokens: &[Token<'_>], i: usize) -> String {
    trailing_segment(text, tokens, i)
        .split('\n')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// The paragraph following the marker's line: lines up to a blank line.
fn next_paragraph(text: &str, tokens: &[Token<'_>], i: usize) -> String {
    let segment = trailing_segment(text, tokens, i);
    let Some((_, after)) = segment.split_once('\n') else {
        return String::new();
    };
    after
        .lines()
        .skip_while(|l| l.trim().is_empty())
        .take_while(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Remove markers until none remain.
///
/// Removing a marker can join two fragments into a new one (`[COM[COMPLETE]PLETE]`),
/// so stripping repeats until the text is stable.
fn strip_markers(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let tokens: Vec<Token<'_>> = Lexer::new(&current).collect();
        if tokens.iter().all(Token::is_text) {
            return current;
        }
        current = tokens
            .iter()
            .filter(|t| t.is_text())
            .map(|t| &current[t.span.clone()])
            .collect();
    }
}

/// Strip markers line by line.
///
/// Lines without markers are kept byte for byte (code blocks, Markdown hard
/// breaks). A line that held markers is trimmed, keeping its indentation, and
/// dropped when nothing but markers was on it. Blank lines at either end are
/// removed.
fn clean_text(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.split('\n') {
        let stripped = strip_markers(line);
        if stripped == line {
            lines.push(stripped);
            continue;
        }
        let body = stripped.trim();
        if body.is_empty() {
            continue;
        }
        let indent = &line[..line.len() - line.trim_start().len()];
        lines.push(format!("{}{}", indent, body));
    }

    let is_blank = |l: &String| l.trim().is_empty();
    let first = lines.iter().position(|l| !is_blank(l));
    let last = lines.iter().rposition(|l| !is_blank(l));
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::{RoleDefinition, builtin_roles};

    fn registry() -> RoleRegistry {
        let mut roles = builtin_roles();
        roles.push(RoleDefinition::new("reviewer", "Code-Reviewer"));
        RoleRegistry::from_definitions(roles).unwrap()
    }

    fn parse(text: &str) -> ParsedOutput {
        ProtocolParser::new(&registry()).parse(text)
    }

    #[test]
    fn test_plain_reply_has_no_directives() {
        let out = parse("Here is the answer: use a HashMap.");
        assert!(out.directives.is_empty());
        assert_eq!(out.clean_text, "Here is the answer: use a HashMap.");
    }

    #[test]
    fn test_delegate_and_complete_in_order() {
        let out = parse("[DELEGATE: pro] implement X\n[COMPLETE]");
        assert_eq!(
            out.directives,
            vec![
                Directive::Delegate {
                    target: RoleId::new("pro"),
                    subtask: "implement X".to_string(),
                },
                Directive::Complete,
            ]
        );
        assert_eq!(out.clean_text, "implement X");
    }

    #[test]
    fn test_delegate_subtask_from_next_paragraph() {
        let out = parse("Plan ready.\n[DELEGATE: sonnet]\nFind the race in\nthe scheduler.\n\nThanks.");
        assert_eq!(
            out.directives,
            vec![Directive::Delegate {
                target: RoleId::new("sonnet"),
                subtask: "Find the race in\nthe scheduler.".to_string(),
            }]
        );
    }

    #[test]
    fn test_delegate_without_subtask_is_recoverable() {
        let out = parse("[DELEGATE: pro]");
        assert!(matches!(
            out.directives.as_slice(),
            [Directive::RecoverableError { message }] if message.contains("without a subtask")
        ));
    }

    #[test]
    fn test_request_help_question_is_optional() {
        let out = parse("[REQUEST_HELP: sonnet] why does this deadlock?\n[REQUEST_HELP: opus]");
        assert_eq!(
            out.directives,
            vec![
                Directive::RequestHelp {
                    target: RoleId::new("sonnet"),
                    question: Some("why does this deadlock?".to_string()),
                },
                Directive::RequestHelp {
                    target: RoleId::new("opus"),
                    question: None,
                },
            ]
        );
    }

    #[test]
    fn test_roles_resolve_case_insensitively_and_by_display_name() {
        let out = parse("[HANDOFF: Sonnet] [HANDOFF: code-reviewer]");
        assert_eq!(
            out.directives,
            vec![
                Directive::Handoff {
                    target: RoleId::new("sonnet")
                },
                Directive::Handoff {
                    target: RoleId::new("reviewer")
                },
            ]
        );
    }

    #[test]
    fn test_unknown_role_is_recoverable_and_stripped() {
        let out = parse("Passing on. [DELEGATE: gemini] do it");
        assert_eq!(out.directives.len(), 1);
        match &out.directives[0] {
            Directive::RecoverableError { message } => {
                assert!(message.contains("unknown role 'gemini'"))
            }
            other => panic!("unexpected directive: {:?}", other),
        }
        assert_eq!(out.clean_text, "Passing on.  do it");
    }

    #[test]
    fn test_discovery_line_and_block_forms() {
        let out = parse(
            "[SHARE_DISCOVERY] config lives in ~/.config\n\
             [SHARE_DISCOVERY]\nAPI is v2\nauth uses bearer\n[/SHARE_DISCOVERY]",
        );
        assert_eq!(
            out.directives,
            vec![
                Directive::ShareDiscovery {
                    payload: "config lives in ~/.config".to_string()
                },
                Directive::ShareDiscovery {
                    payload: "API is v2\nauth uses bearer".to_string()
                },
            ]
        );
        assert_eq!(
            out.clean_text,
            "config lives in ~/.config\nAPI is v2\nauth uses bearer"
        );
    }

    #[test]
    fn test_empty_discovery_and_stray_closer() {
        let out = parse("[SHARE_DISCOVERY]\n\ntext [/SHARE_DISCOVERY] more [/SHARE_DISCOVERY]");
        // The first closer belongs to the opener; the block holds only "text".
        assert_eq!(
            out.directives[0],
            Directive::ShareDiscovery {
                payload: "text".to_string()
            }
        );
        assert!(matches!(
            &out.directives[1],
            Directive::RecoverableError { message } if message.contains("without an opening")
        ));

        let empty = parse("[SHARE_DISCOVERY]   \nnext line");
        assert!(matches!(
            empty.directives.as_slice(),
            [Directive::RecoverableError { message }] if message.contains("empty discovery")
        ));
    }

    #[test]
    fn test_malformed_markers_are_recoverable() {
        let out = parse("[DELEGATE] x [COMPLETE: now]");
        assert_eq!(out.directives.len(), 2);
        assert!(out.recoverable_errors().all(|m| m.starts_with("malformed marker")));
        assert_eq!(out.clean_text, "x");
    }

    #[test]
    fn test_ordinary_brackets_are_preserved() {
        let out = parse("Index with v[0] and see [the docs].");
        assert!(out.directives.is_empty());
        assert_eq!(out.clean_text, "Index with v[0] and see [the docs].");
    }

    #[test]
    fn test_tool_blocks_are_extracted() {
        let out = parse(
            "Checking.\n```tool\n{\"tool\": \"read_file\", \"args\": {\"path\": \"Cargo.toml\"}}\n```\n[COMPLETE]",
        );
        assert_eq!(out.tool_calls.len(), 1);
        assert_eq!(out.directives, vec![Directive::Complete]);
        assert_eq!(out.clean_text, "Checking.");
        assert!(out.has_tool_requests());
    }

    #[test]
    fn test_reparsing_clean_text_yields_nothing() {
        let samples = [
            "[DELEGATE: pro] implement X\n[COMPLETE]",
            "[COM[COMPLETE]PLETE] nested",
            "[HAND[DELEGATE: nobody]OFF: pro] joined",
            "[SHARE_DISCOVERY] a [SHARE_DISCOVERY] b [/SHARE_DISCOVERY]",
            "[REQUEST_HELP: sonnet]\n\n\n\n[DELEGATE]\n```tool\n{bad}\n```",
            "plain [text] with v[0]",
        ];
        for sample in samples {
            let first = parse(sample);
            let second = parse(&first.clean_text);
            assert!(
                second.directives.is_empty(),
                "reparse of {:?} produced {:?}",
                sample,
                second.directives
            );
            assert_eq!(second.clean_text, first.clean_text);
        }
    }

    #[test]
    fn test_joined_fragments_are_stripped() {
        let out = parse("[COM[COMPLETE]PLETE] done");
        assert_eq!(out.directives, vec![Directive::Complete]);
        assert_eq!(out.clean_text, "done");
    }

    #[test]
    fn test_multibyte_replies() {
        let out = parse("日本語の回答です [COMPLETE]");
        assert_eq!(out.directives, vec![Directive::Complete]);
        assert_eq!(out.clean_text, "日本語の回答です");

        let out = parse("[COMPLETE]é fini");
        assert_eq!(out.directives, vec![Directive::Complete]);
        assert_eq!(out.clean_text, "é fini");

        let out = parse("分析完毕。[DELEGATE: pro] 实现缓存层");
        assert_eq!(
            out.directives,
            vec![Directive::Delegate {
                target: RoleId::new("pro"),
                subtask: "实现缓存层".to_string(),
            }]
        );
    }

    #[test]
    fn test_lines_without_markers_are_untouched() {
        let reply = "```rust\nfn main() {  \n\n\n    run();\n}\n```\nFirst line with hard break  \nsecond\n    [COMPLETE] indented";
        let out = parse(reply);
        assert_eq!(out.directives, vec![Directive::Complete]);
        assert_eq!(
            out.clean_text,
            "```rust\nfn main() {  \n\n\n    run();\n}\n```\nFirst line with hard break  \nsecond\n    indented"
        );
    }
}
