use std::fmt;
use std::path::PathBuf;

use paper_core::model::{ItemKey, StageId, TopicId};
use services::ResetScope;

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Stages,
    Stage(StageId),
    Topics,
    Topic(TopicId),
    Checklist,
    Toggle(ItemKey),
    Progress,
    Reset(ResetScope),
    Back,
    Ask(String),
    History,
    Clear,
    Evaluate(String),
    Export(PathBuf),
    Import(PathBuf),
    NewSession,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str, expected: &'static str },
    InvalidArgument { command: &'static str, raw: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::Unknown(cmd) => write!(f, "unknown command: {cmd} (try `help`)"),
            CommandError::MissingArgument { command, expected } => {
                write!(f, "{command} requires {expected}")
            }
            CommandError::InvalidArgument { command, raw } => {
                write!(f, "invalid argument for {command}: {raw}")
            }
        }
    }
}

impl std::error::Error for CommandError {}

fn require<'a>(
    rest: &'a str,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, CommandError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(CommandError::MissingArgument { command, expected });
    }
    Ok(rest)
}

fn parse_id(rest: &str, command: &'static str) -> Result<u64, CommandError> {
    let raw = require(rest, command, "an id")?;
    raw.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        raw: raw.to_owned(),
    })
}

fn parse_reset(rest: &str) -> Result<ResetScope, CommandError> {
    let mut parts = rest.split_whitespace();
    match parts.next() {
        None | Some("all") => Ok(ResetScope::All),
        Some("stage") => Ok(ResetScope::Stage(StageId::new(parse_id(
            parts.next().unwrap_or_default(),
            "reset stage",
        )?))),
        Some("topic") => Ok(ResetScope::Topic(TopicId::new(parse_id(
            parts.next().unwrap_or_default(),
            "reset topic",
        )?))),
        Some(other) => Err(CommandError::InvalidArgument {
            command: "reset",
            raw: other.to_owned(),
        }),
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match head {
            "" => Err(CommandError::Empty),
            "help" | "?" => Ok(Self::Help),
            "stages" => Ok(Self::Stages),
            "stage" => Ok(Self::Stage(StageId::new(parse_id(rest, "stage")?))),
            "topics" => Ok(Self::Topics),
            "topic" => Ok(Self::Topic(TopicId::new(parse_id(rest, "topic")?))),
            "checklist" | "ls" => Ok(Self::Checklist),
            "toggle" | "t" => {
                let raw = require(rest, "toggle", "an item key like 3_7")?;
                raw.parse().map(Self::Toggle).map_err(|_| CommandError::InvalidArgument {
                    command: "toggle",
                    raw: raw.to_owned(),
                })
            }
            "progress" => Ok(Self::Progress),
            "reset" => parse_reset(rest).map(Self::Reset),
            "back" => Ok(Self::Back),
            "ask" => Ok(Self::Ask(require(rest, "ask", "a question")?.to_owned())),
            "history" => Ok(Self::History),
            "clear" => Ok(Self::Clear),
            "evaluate" => Ok(Self::Evaluate(
                require(rest, "evaluate", "a progress description")?.to_owned(),
            )),
            "export" => Ok(Self::Export(require(rest, "export", "a file path")?.into())),
            "import" => Ok(Self::Import(require(rest, "import", "a file path")?.into())),
            "new" => Ok(Self::NewSession),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_owned())),
        }
    }
}

pub const HELP: &str = "\
Commands:
  stages                    list research stages
  stage <id>                enter a stage
  topics                    list topics of the current stage
  topic <id>                select a topic
  checklist                 show the selected topic's checklist
  toggle <checklist>_<item> flip one item
  progress                  show scores for the selected topic and all stages
  reset [all|stage <id>|topic <id>]
  back                      return to stage selection
  ask <question>            talk to the assistant about the current stage
  history                   show this stage's conversation
  clear                     clear this stage's conversation
  evaluate <description>    let the assistant assess your progress
  export <file>             write progress to a JSON file
  import <file>             load progress from a JSON file
  new                       start a fresh session
  quit";
