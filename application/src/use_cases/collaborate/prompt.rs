//! Prompt assembly for role turns.
//!
//! Every backend call is built from scratch:
//!
//! 1. the role's system prompt (identity, other roles, marker protocol, tools)
//! 2. a digest of the discovery ledger, when non-empty
//! 3. the last `context_window` history messages
//! 4. the pending briefing, as the closing instruction

use crate::ports::backend_client::ChatMessage;
use hydra_domain::{
    Author, Briefing, ContextStore, Discovery, Message, RoleDefinition, RoleRegistry, ToolSpec,
};

/// Size cap for a single history entry sent to a backend.
const MAX_ENTRY_CHARS: usize = 12_000;

const PROTOCOL_GUIDE: &str = r#"## Collaboration protocol

Write these markers on their own line when you need them:

- `[DELEGATE: <role>] <subtask>` hands a well-defined subtask to another role. You get control back when it finishes.
- `[REQUEST_HELP: <role>] <question>` asks another role for advice. It sees your recent context and answers you.
- `[HANDOFF: <role>]` gives the whole task to another role.
- `[SHARE_DISCOVERY] <fact>` records a fact every role will see. For longer notes, close the block with `[/SHARE_DISCOVERY]`.
- `[COMPLETE]` means your part is done. A helper or delegate returns control to whoever asked; otherwise the task ends.

Use at most one of DELEGATE, REQUEST_HELP or HANDOFF per reply. Only address the roles listed above."#;

/// System prompt for `role`.
pub fn system_prompt(role: &RoleDefinition, registry: &RoleRegistry, tools: &ToolSpec) -> String {
    let mut prompt = format!(
        "You are {} (role id `{}`), one of several AI roles collaborating with an operator on a software task.\n",
        role.display_name, role.id
    );
    if !role.description.is_empty() {
        prompt.push_str(&format!("\n{}\n", role.description));
    }
    if !role.responsibilities.is_empty() {
        prompt.push_str("\nYour responsibilities:\n");
        for responsibility in &role.responsibilities {
            prompt.push_str(&format!("- {}\n", responsibility));
        }
    }

    let others: Vec<String> = registry
        .available()
        .filter(|other| other.id != role.id)
        .map(|other| {
            if other.description.is_empty() {
                format!("- `{}` ({})", other.id, other.display_name)
            } else {
                format!(
                    "- `{}` ({}): {}",
                    other.id, other.display_name, other.description
                )
            }
        })
        .collect();
    prompt.push_str("\n## Other roles\n\n");
    if others.is_empty() {
        prompt.push_str("No other role is available; finish the task yourself.\n");
    } else {
        prompt.push_str(&others.join("\n"));
        prompt.push('\n');
    }

    prompt.push('\n');
    prompt.push_str(PROTOCOL_GUIDE);
    prompt.push('\n');

    if !tools.is_empty() {
        prompt.push_str(&tool_guide(tools));
    }
    prompt
}

fn tool_guide(tools: &ToolSpec) -> String {
    let listing: Vec<String> = tools
        .sorted()
        .into_iter()
        .map(|tool| {
            let approval = if tool.requires_approval() {
                " (may need operator approval)"
            } else {
                ""
            };
            format!("- `{}`: {}{}", tool.signature(), tool.description, approval)
        })
        .collect();

    format!(
        r#"
## Tools

{}

To use a tool, write a fenced block and stop; the results come back in the next message:

```tool
{{"tool": "read_file", "args": {{"path": "src/main.rs"}}, "reasoning": "why you need it"}}
```

Several blocks may appear in one reply. A declined call comes back as "declined by operator"; do not retry it unchanged.
"#,
        listing.join("\n")
    )
}

/// Messages for one backend call of `role`.
///
/// `round` counts backend calls within the turn, starting at 1. The briefing
/// closes the request on the first round; on tool rounds it moves ahead of
/// the history window so the tool results stay last.
pub fn build_messages(
    role: &RoleDefinition,
    registry: &RoleRegistry,
    tools: &ToolSpec,
    context: &ContextStore,
    context_window: usize,
    briefing: Option<&Briefing>,
    round: usize,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt(role, registry, tools))];

    if let Some(digest) = ledger_digest(context.ledger_snapshot()) {
        messages.push(ChatMessage::system(digest));
    }

    let briefing = briefing.map(|b| ChatMessage::user(render_briefing(b)));
    let (leading, closing) = if round <= 1 {
        (None, briefing)
    } else {
        (briefing, None)
    };

    messages.extend(leading);
    messages.extend(
        context
            .recent_window(context_window)
            .map(|message| to_chat(role, message)),
    );
    messages.extend(closing);
    messages
}

fn ledger_digest(ledger: &[Discovery]) -> Option<String> {
    if ledger.is_empty() {
        return None;
    }
    let lines: Vec<String> = ledger
        .iter()
        .map(|d| format!("- [{}] {}", d.contributor, d.payload))
        .collect();
    Some(format!("Shared discoveries so far:\n{}", lines.join("\n")))
}

/// Own messages become assistant turns; everything else is shown as input
/// with its author.
fn to_chat(role: &RoleDefinition, message: &Message) -> ChatMessage {
    let content = hydra_domain::core::string::truncate(&message.content, MAX_ENTRY_CHARS);
    match &message.author {
        Author::Role(author) if *author == role.id => ChatMessage::assistant(content),
        Author::Role(author) => ChatMessage::user(format!("[{}] {}", author, content)),
        Author::User => ChatMessage::user(content),
        Author::Tool(_) => ChatMessage::user(content),
        Author::System => ChatMessage::system(content),
    }
}

pub fn render_briefing(briefing: &Briefing) -> String {
    match briefing {
        Briefing::Delegation { delegator, subtask } => format!(
            "`{}` delegated this subtask to you:\n\n{}\n\nWork on it, then reply with [COMPLETE] to hand the result back.",
            delegator, subtask
        ),
        Briefing::Help {
            requester,
            question,
            recent,
            ledger,
        } => {
            let mut text = format!("`{}` asks for your help.", requester);
            if let Some(question) = question {
                text.push_str(&format!("\n\nQuestion: {}", question));
            }
            if !recent.is_empty() {
                text.push_str("\n\nTheir recent context:");
                for message in recent {
                    text.push_str(&format!(
                        "\n[{}] {}",
                        message.author,
                        hydra_domain::core::string::truncate(&message.content, MAX_ENTRY_CHARS)
                    ));
                }
            }
            if let Some(digest) = ledger_digest(ledger) {
                text.push_str("\n\n");
                text.push_str(&digest);
            }
            text.push_str(&format!(
                "\n\nAnswer, then reply with [COMPLETE] or [HANDOFF: {}] to return control.",
                requester
            ));
            text
        }
        Briefing::Resume {
            from,
            subtask: Some(subtask),
        } => format!(
            "`{}` finished the subtask you delegated ({}). Their result is above; continue the task.",
            from, subtask
        ),
        Briefing::Resume { from, subtask: None } => format!(
            "`{}` answered your request for help above; continue the task.",
            from
        ),
        Briefing::Handoff { from } => format!(
            "`{}` handed the task over to you. Continue from the conversation above.",
            from
        ),
    }
}
