//! Interactive tool confirmation.
//!
//! The collaboration loop never touches stdin itself. [`InteractiveConfirmation`]
//! sends each request over a channel to the REPL, which owns the terminal and
//! answers it with its own line editor. The read finishes before the request
//! resumes, so a cancelled request cannot leave a read behind that would
//! swallow the next REPL line.
//!
//! When the gatekeeper requires a prompt, the operator sees:
//!
//! ```text
//! ┌─ pro wants to run write_file (file_write)
//! │  reason: create the module skeleton
//! │  path: src/lib.rs
//! │  content: pub mod parser; …
//! └─ Allow? [y/N]
//! ```
//!
//! | Input | Decision |
//! |-------|----------|
//! | `y`, `yes` | Accept |
//! | `n`, `no`, empty line, end of input | Reject |
//! | Ctrl-C | the request is cancelled |

use async_trait::async_trait;
use colored::Colorize;
use hydra_application::{ConfirmationDecision, ConfirmationError, ConfirmationPort};
use hydra_domain::core::string::one_line;
use hydra_domain::{RoleId, ToolCall, ToolDefinition};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Preview width for each argument value
const ARG_PREVIEW_CHARS: usize = 100;

const ALLOW_PROMPT: &str = "└─ Allow? [y/N] ";

/// Receiving end of the prompt channel, held by the REPL.
pub type ConfirmationPrompts = mpsc::UnboundedReceiver<ConfirmationRequest>;

/// [`ConfirmationPort`] that hands every prompt to the terminal owner.
pub struct InteractiveConfirmation {
    tx: mpsc::UnboundedSender<ConfirmationRequest>,
}

impl InteractiveConfirmation {
    pub fn channel() -> (Self, ConfirmationPrompts) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ConfirmationPort for InteractiveConfirmation {
    async fn confirm_tool(
        &self,
        role: &RoleId,
        call: &ToolCall,
        definition: &ToolDefinition,
    ) -> Result<ConfirmationDecision, ConfirmationError> {
        let (reply, answer) = oneshot::channel();
        let request = ConfirmationRequest {
            role: role.clone(),
            call: call.clone(),
            definition: definition.clone(),
            reply,
        };
        self.tx
            .send(request)
            .map_err(|_| ConfirmationError::Io("No terminal is attached to answer".to_string()))?;

        // A dropped reply means the operator interrupted the prompt
        answer.await.map_err(|_| ConfirmationError::Cancelled)
    }
}

/// What the line editor returned for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    Line(String),
    Interrupted,
    Closed,
}

/// One pending prompt.
#[derive(Debug)]
pub struct ConfirmationRequest {
    pub role: RoleId,
    pub call: ToolCall,
    pub definition: ToolDefinition,
    reply: oneshot::Sender<ConfirmationDecision>,
}

impl ConfirmationRequest {
    /// Whether the asking side is still waiting for an answer.
    pub fn is_pending(&self) -> bool {
        !self.reply.is_closed()
    }

    /// Ask until `read` yields a recognisable answer and send it back.
    ///
    /// Returns `None` without reading when the request was already abandoned,
    /// or when the operator interrupted the prompt; the asking side then sees
    /// [`ConfirmationError::Cancelled`].
    pub fn answer(
        self,
        mut read: impl FnMut(&str) -> PromptInput,
    ) -> Option<ConfirmationDecision> {
        if !self.is_pending() {
            debug!(tool = %self.call.tool_name, "Skipping abandoned confirmation");
            return None;
        }

        self.display();
        let decision = loop {
            match read(ALLOW_PROMPT) {
                PromptInput::Line(line) => match parse_answer(&line) {
                    Some(decision) => break decision,
                    None => println!("Please answer y or n."),
                },
                PromptInput::Closed => break ConfirmationDecision::Reject,
                PromptInput::Interrupted => {
                    println!("{}", "  ✗ interrupted".red());
                    return None;
                }
            }
        };

        match decision {
            ConfirmationDecision::Accept => println!("{}", "  ✓ allowed".green()),
            ConfirmationDecision::Reject => println!("{}", "  ✗ declined".red()),
        }
        self.reply.send(decision).ok().map(|()| decision)
    }

    fn display(&self) {
        println!();
        println!(
            "{} {} wants to run {} ({})",
            "┌─".yellow(),
            self.role.to_string().bold(),
            self.definition.name.bold(),
            self.definition.kind.to_string().yellow()
        );
        if let Some(ref reasoning) = self.call.reasoning {
            println!("{}  reason: {}", "│".yellow(), reasoning.dimmed());
        }
        let mut keys: Vec<&String> = self.call.arguments.keys().collect();
        keys.sort();
        for key in keys {
            let value = match &self.call.arguments[key] {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            println!("{}  {}: {}", "│".yellow(), key, one_line(&value, ARG_PREVIEW_CHARS));
        }
    }
}

/// Map an answer line to a decision; `None` when it should be asked again.
pub fn parse_answer(input: &str) -> Option<ConfirmationDecision> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(ConfirmationDecision::Accept),
        "" | "n" | "no" => Some(ConfirmationDecision::Reject),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydra_domain::ToolKind;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;

    fn write_call() -> (ToolCall, ToolDefinition) {
        (
            ToolCall::new("write_file").with_arg("path", "a.txt"),
            ToolDefinition::new("write_file", "Write a file", ToolKind::FileWrite),
        )
    }

    /// Line reader that replays `lines` and counts how often it was asked.
    fn scripted(lines: Vec<PromptInput>) -> (impl FnMut(&str) -> PromptInput, Rc<Cell<usize>>) {
        let reads = Rc::new(Cell::new(0));
        let counter = reads.clone();
        let mut lines: VecDeque<PromptInput> = lines.into();
        let read = move |_: &str| {
            counter.set(counter.get() + 1);
            lines.pop_front().unwrap_or(PromptInput::Closed)
        };
        (read, reads)
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n"), Some(ConfirmationDecision::Accept));
        assert_eq!(parse_answer(" YES "), Some(ConfirmationDecision::Accept));
        assert_eq!(parse_answer("\n"), Some(ConfirmationDecision::Reject));
        assert_eq!(parse_answer("no"), Some(ConfirmationDecision::Reject));
        assert_eq!(parse_answer("maybe"), None);
    }

    #[tokio::test]
    async fn test_answer_reaches_the_asking_side() {
        let (confirmation, mut prompts) = InteractiveConfirmation::channel();
        let (call, definition) = write_call();
        let role = RoleId::new("pro");

        let ask = confirmation.confirm_tool(&role, &call, &definition);
        let serve = async {
            let request = prompts.recv().await.unwrap();
            assert_eq!(request.call.tool_name, "write_file");
            let (read, reads) = scripted(vec![
                PromptInput::Line("maybe".into()),
                PromptInput::Line("y".into()),
            ]);
            let decision = request.answer(read);
            (decision, reads.get())
        };
        let (asked, (served, reads)) = tokio::join!(ask, serve);

        assert_eq!(asked, Ok(ConfirmationDecision::Accept));
        assert_eq!(served, Some(ConfirmationDecision::Accept));
        assert_eq!(reads, 2);
    }

    #[tokio::test]
    async fn test_interrupt_cancels_and_end_of_input_rejects() {
        let (confirmation, mut prompts) = InteractiveConfirmation::channel();
        let (call, definition) = write_call();
        let role = RoleId::new("pro");

        let ask = confirmation.confirm_tool(&role, &call, &definition);
        let serve = async {
            let (read, _) = scripted(vec![PromptInput::Interrupted]);
            prompts.recv().await.unwrap().answer(read)
        };
        let (asked, served) = tokio::join!(ask, serve);
        assert_eq!(asked, Err(ConfirmationError::Cancelled));
        assert_eq!(served, None);

        let ask = confirmation.confirm_tool(&role, &call, &definition);
        let serve = async {
            let (read, _) = scripted(vec![PromptInput::Closed]);
            prompts.recv().await.unwrap().answer(read)
        };
        let (asked, _) = tokio::join!(ask, serve);
        assert_eq!(asked, Ok(ConfirmationDecision::Reject));
    }

    #[tokio::test]
    async fn test_abandoned_request_is_not_read() {
        let (confirmation, mut prompts) = InteractiveConfirmation::channel();
        let (call, definition) = write_call();
        let role = RoleId::new("pro");

        // The request is cancelled while the prompt is still queued
        let ask = confirmation.confirm_tool(&role, &call, &definition);
        assert!(tokio::time::timeout(Duration::from_millis(10), ask).await.is_err());

        let request = prompts.recv().await.unwrap();
        assert!(!request.is_pending());
        let (read, reads) = scripted(vec![PromptInput::Line("y".into())]);
        assert_eq!(request.answer(read), None);
        assert_eq!(reads.get(), 0);
    }

    #[tokio::test]
    async fn test_no_terminal_is_an_error() {
        let (confirmation, prompts) = InteractiveConfirmation::channel();
        drop(prompts);
        let (call, definition) = write_call();

        let result = confirmation
            .confirm_tool(&RoleId::new("pro"), &call, &definition)
            .await;
        assert!(matches!(result, Err(ConfirmationError::Io(_))));
    }
}
