use std::error::Error;
use std::fs;
use std::io::Write;

use paper_core::model::{ItemKey, ProgressSnapshot, Role};
use services::{AppServices, Page, SessionStore};
use tracing::{debug, info};

use crate::command::{Command, HELP};

type ReplResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end over one session.
pub struct Repl<W> {
    services: AppServices,
    store: SessionStore,
    out: W,
}

impl<W: Write> Repl<W> {
    pub fn new(services: AppServices, out: W) -> Self {
        Self {
            services,
            store: SessionStore::new(),
            out,
        }
    }

    pub fn banner(&mut self) -> ReplResult<()> {
        let config = self.services.config();
        let ui = config.ui_config();
        let title = ui["app_title"].as_str().unwrap_or("PaperBuddy");
        writeln!(self.out, "{title}")?;
        if let Some(hint) = ui["stage_selection"]["description"].as_str() {
            writeln!(self.out, "{hint}")?;
        }
        let panel = &config.function_panel_config()["function_panel"]["functions"];
        for function in panel.as_array().into_iter().flatten() {
            if let (Some(icon), Some(text)) =
                (function["icon"].as_str(), function["button_text"].as_str())
            {
                writeln!(self.out, "  {icon} {text}")?;
            }
        }
        if !self.services.chat().is_available() {
            writeln!(
                self.out,
                "(assistant disabled: set {} to enable `ask` and `evaluate`)",
                services::chat::API_KEY_ENV
            )?;
        }
        writeln!(self.out, "type `help` for commands")?;
        Ok(())
    }

    pub fn prompt(&mut self) -> &'static str {
        match self.store.state().current_page() {
            Page::StageSelection => "stages> ",
            Page::Main => "paper> ",
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Parse and run one input line. Command failures are printed, not returned.
    pub async fn handle_line(&mut self, line: &str) -> ReplResult<Flow> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(crate::command::CommandError::Empty) => return Ok(Flow::Continue),
            Err(err) => {
                writeln!(self.out, "{err}")?;
                return Ok(Flow::Continue);
            }
        };
        debug!(?command, "dispatching");
        match self.execute(command).await {
            Ok(flow) => Ok(flow),
            Err(err) => {
                writeln!(self.out, "error: {err}")?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn execute(&mut self, command: Command) -> ReplResult<Flow> {
        let navigator = self.services.navigator();
        let progress = self.services.progress();
        let chat = self.services.chat();
        let state = self.store.state();

        match command {
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Stages => {
                for stage in navigator.stages() {
                    let marker = if state.selected_stage().is_some_and(|s| s.id == stage.id) {
                        '*'
                    } else {
                        ' '
                    };
                    writeln!(
                        self.out,
                        "{marker} [{}] {} {}  {:.0}%  {}",
                        stage.id,
                        stage.icon,
                        stage.name,
                        progress.stage_progress(state, stage.id),
                        stage.description
                    )?;
                }
            }
            Command::Stage(id) => {
                navigator.select_stage(state, id)?;
                writeln!(self.out, "entered stage {id}")?;
            }
            Command::Topics => {
                let topics = navigator.topics(state);
                if topics.is_empty() {
                    writeln!(self.out, "select a stage first (`stages`, `stage <id>`)")?;
                }
                for topic in topics {
                    let stats = progress.topic_stats(state, topic.id);
                    writeln!(
                        self.out,
                        "  [{}] {}  {}/{}  {}",
                        topic.id,
                        topic.name,
                        stats.completed_items,
                        stats.total_items,
                        topic.description
                    )?;
                }
            }
            Command::Topic(id) => {
                navigator.select_topic(state, id)?;
                writeln!(self.out, "selected topic {id}")?;
            }
            Command::Checklist => {
                let checklists = navigator.checklists(state);
                if checklists.is_empty() {
                    writeln!(self.out, "no checklist: select a topic first")?;
                }
                for checklist in checklists {
                    writeln!(self.out, "{}", checklist.name)?;
                    for item in &checklist.items {
                        let key = ItemKey::new(checklist.id, item.id);
                        let mark = if state.checklist_progress().is_completed(key) {
                            'x'
                        } else {
                            ' '
                        };
                        writeln!(
                            self.out,
                            "  [{mark}] {key} {} ({:.0})",
                            item.description,
                            item.weight * paper_core::scoring::SCORE_SCALE
                        )?;
                    }
                }
            }
            Command::Toggle(key) => {
                let done = progress.toggle(state, key.checklist_id, key.item_id);
                let stats = progress.current_stats(state);
                writeln!(
                    self.out,
                    "{key} {}; topic {:.0}%, score {:.0}",
                    if done { "done" } else { "open" },
                    stats.completion_percentage,
                    stats.total_score
                )?;
            }
            Command::Progress => {
                let stats = progress.current_stats(state);
                if let Some(topic) = state.selected_topic() {
                    writeln!(
                        self.out,
                        "{}: {}/{} items, {:.1}%, score {:.0}",
                        topic.name,
                        stats.completed_items,
                        stats.total_items,
                        stats.completion_percentage,
                        stats.total_score
                    )?;
                }
                writeln!(
                    self.out,
                    "overall {:.1}% across {} active stage(s), {} topic(s) complete",
                    progress.overall_progress(state),
                    progress.active_stage_count(state),
                    state.user_progress().completed_topics.len()
                )?;
            }
            Command::Reset(scope) => {
                progress.reset(state, scope);
                writeln!(self.out, "progress reset")?;
            }
            Command::Back => {
                navigator.back_to_stage_selection(state);
                writeln!(self.out, "back to stage selection")?;
            }
            Command::Ask(text) => {
                let stage = state.selected_stage().map(|stage| stage.id);
                let reply = chat.send_message(state, &text, stage).await?;
                writeln!(self.out, "{reply}")?;
            }
            Command::History => {
                let stage = state.selected_stage().map(|stage| stage.id);
                for message in chat.history(state, stage) {
                    let who = match message.role {
                        Role::User => "you",
                        Role::Assistant => "assistant",
                        Role::System => "system",
                    };
                    writeln!(self.out, "{who}: {}", message.content)?;
                }
            }
            Command::Clear => {
                let stage = state.selected_stage().map(|stage| stage.id);
                chat.clear_history(state, stage);
                writeln!(self.out, "conversation cleared")?;
            }
            Command::Evaluate(text) => {
                let evaluation = self.services.evaluator().evaluate(&text).await?;
                writeln!(self.out, "stage: {}", evaluation.current_stage)?;
                for (task, done) in &evaluation.tasks_progress {
                    writeln!(self.out, "  {task}: {:.0}%", done * 100.0)?;
                }
                writeln!(self.out, "advice: {}", evaluation.advice)?;
                writeln!(self.out, "mentor: {}", evaluation.mentor_insights)?;
            }
            Command::Export(path) => {
                let snapshot = progress.export_progress(state);
                fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;
                info!(path = %path.display(), "progress exported");
                writeln!(self.out, "progress written to {}", path.display())?;
            }
            Command::Import(path) => {
                let snapshot: ProgressSnapshot = serde_json::from_str(&fs::read_to_string(&path)?)?;
                progress.import_progress(state, snapshot);
                info!(path = %path.display(), "progress imported");
                writeln!(self.out, "progress loaded from {}", path.display())?;
            }
            Command::NewSession => {
                self.store.clear_session();
                writeln!(self.out, "new session started")?;
            }
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }
}
