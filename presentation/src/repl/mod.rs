//! REPL (Read-Eval-Print Loop) for interactive sessions
//!
//! Thin shell around [`SessionController`]: reads lines with rustyline,
//! forwards slash commands and requests, and renders the resulting
//! [`UiEvent`]s with [`ReplPresenter`]. Ctrl-C while a request runs cancels
//! it through a [`CancellationToken`]; at the prompt it just clears the line.
//!
//! Tool confirmations are answered here too: while a request runs, the REPL
//! listens on the [`ConfirmationPrompts`] channel and reads the answer with
//! the same line editor, so only one reader ever touches the terminal.

mod presenter;
mod texts;

pub use presenter::ReplPresenter;

use crate::config::ReplConfig;
use crate::confirmation::{ConfirmationPrompts, ConfirmationRequest, PromptInput};
use crate::progress::reporter::{ProgressReporter, SimpleProgress};
use hydra_application::{
    BackendClient, CollaborationProgress, CommandAction, NoProgress, SessionController,
    ToolExecutorPort, UiEvent,
};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::io::IsTerminal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Interactive REPL for a collaboration session
pub struct Repl<B: BackendClient + 'static, T: ToolExecutorPort + 'static> {
    controller: SessionController<B, T>,
    rx: mpsc::UnboundedReceiver<UiEvent>,
    presenter: ReplPresenter,
    config: ReplConfig,
    prompts: Option<ConfirmationPrompts>,
    last_run_failed: bool,
}

impl<B: BackendClient + 'static, T: ToolExecutorPort + 'static> Repl<B, T> {
    /// `rx` must be the receiving end of the controller's event channel.
    pub fn new(
        controller: SessionController<B, T>,
        rx: mpsc::UnboundedReceiver<UiEvent>,
        config: ReplConfig,
    ) -> Self {
        let presenter = ReplPresenter::new()
            .with_final_text(!config.show_progress)
            .with_language(controller.language());
        Self {
            controller,
            rx,
            presenter,
            config,
            prompts: None,
            last_run_failed: false,
        }
    }

    /// Answer tool confirmations coming from `InteractiveConfirmation`.
    pub fn with_prompts(mut self, prompts: ConfirmationPrompts) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn controller(&self) -> &SessionController<B, T> {
        &self.controller
    }

    /// Apply a slash command (used for `--complex` and friends at startup).
    pub fn apply_command(&mut self, command: &str) -> CommandAction {
        let action = self.controller.handle_command(command);
        self.drain_events();
        action
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.controller.send_welcome();
        self.drain_events();

        loop {
            let prompt = self.controller.prompt_string();
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        if self.apply_command(line) == CommandAction::Exit {
                            break;
                        }
                        continue;
                    }

                    self.run_request(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path
            && let Err(e) = rl.save_history(path)
        {
            warn!("Could not save REPL history to {}: {}", path.display(), e);
        }

        Ok(())
    }

    /// Run one request and render its outcome.
    pub async fn run_request(&mut self, request: &str) {
        let token = CancellationToken::new();
        self.controller.set_cancellation(token.clone());

        let watcher = tokio::spawn({
            let token = token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    debug!("Ctrl-C received, cancelling request");
                    token.cancel();
                }
            }
        });

        let progress: Box<dyn CollaborationProgress> = if self.config.show_progress {
            if !std::io::stderr().is_terminal() {
                Box::new(SimpleProgress)
            } else if self.config.verbose_tools {
                Box::new(ProgressReporter::verbose())
            } else {
                Box::new(ProgressReporter::new())
            }
        } else {
            Box::new(NoProgress)
        };

        {
            let run = self.controller.process_request(request, progress.as_ref());
            tokio::pin!(run);
            loop {
                tokio::select! {
                    _ = &mut run => break,
                    Some(prompt) = next_prompt(&mut self.prompts) => {
                        answer_prompt(prompt, &token);
                    }
                }
            }
        }
        watcher.abort();
        self.drain_events();
    }

    /// Whether the most recent request ended in an error or was cancelled.
    pub fn last_run_failed(&self) -> bool {
        self.last_run_failed
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match &event {
                UiEvent::RunFailed { .. } => self.last_run_failed = true,
                UiEvent::RunFinished(_) => self.last_run_failed = false,
                UiEvent::LanguageChanged(language) => self.presenter.set_language(*language),
                _ => {}
            }
            self.presenter.render(&event);
        }
    }
}

async fn next_prompt(prompts: &mut Option<ConfirmationPrompts>) -> Option<ConfirmationRequest> {
    match prompts {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Read the answer on this task; the request stays suspended until it returns.
fn answer_prompt(prompt: ConfirmationRequest, token: &CancellationToken) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            warn!("Cannot open the terminal for confirmation: {}", e);
            // Dropping the request cancels it
            token.cancel();
            return;
        }
    };
    let answered = prompt.answer(|text| match editor.readline(text) {
        Ok(line) => PromptInput::Line(line),
        Err(ReadlineError::Interrupted) => PromptInput::Interrupted,
        Err(ReadlineError::Eof) => PromptInput::Closed,
        Err(e) => {
            warn!("Confirmation read failed: {}", e);
            PromptInput::Closed
        }
    });
    if answered.is_none() {
        token.cancel();
    }
}
