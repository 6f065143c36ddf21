// everything a user can ask the game to do, and what comes back
use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::{channel, Receiver, Sender};

use anyhow::{anyhow, bail, Context};
use engine::{Board, BoardListener, Color, DrawType, HistoryListener, Move, MoveHistory, Nag, Square};
use log::{debug, info};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Play(Move),
    Undo,
    Redo,
    Reset, // back to the start position
    End,   // forward to the end of the main line
    Fen(Option<String>), // show the FEN, or start over from one
    Moves(Square),       // legal moves starting on a square
    Line,
    Promote,
    Demote,
    Delete,
    Clear,
    Comment(String),
    Nag(Nag),
    Draw,
    Resign,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  e2e4 | e2-e4 | e7e8q   play a move
  undo / redo            step back or forward along the main line
  reset / end            jump to the start or the end of the main line
  fen [record]           show the position, or start over from a FEN record
  moves <square>         legal moves starting on a square
  line                   the moves leading to the current position
  promote / demote       reorder the variation holding the current move
  delete                 delete the current move and what follows it
  clear                  delete every continuation of the current move
  comment <text>         comment the current move (empty clears)
  nag <glyph|number>     toggle an annotation glyph, e.g. nag !? or nag 14
  draw / resign          offer a draw, or resign for the side to move
  help / quit";

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "" => bail!("empty command"),
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "reset" => Command::Reset,
            "end" => Command::End,
            "fen" => Command::Fen((!rest.is_empty()).then(|| rest.to_string())),
            "moves" => {
                let square = rest
                    .parse()
                    .with_context(|| format!("moves needs a square, got '{rest}'"))?;
                Command::Moves(square)
            }
            "line" => Command::Line,
            "promote" => Command::Promote,
            "demote" => Command::Demote,
            "delete" => Command::Delete,
            "clear" => Command::Clear,
            "comment" => Command::Comment(rest.to_string()),
            "nag" => Command::Nag(rest.parse()?),
            "draw" => Command::Draw,
            "resign" => Command::Resign,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Play(
                line.parse()
                    .map_err(|_| anyhow!("unknown command '{line}', try 'help'"))?,
            ),
        };
        Ok(command)
    }
}

/// What the game answers with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Text(text) => f.write_str(text),
            Reply::Quit => f.write_str("bye"),
        }
    }
}

pub trait CommandHandler {
    fn handle(&mut self, command: Command) -> anyhow::Result<Reply>;
}

pub type CommandSender = Sender<Command>;
pub type CommandReceiver = Receiver<Command>;

/// Queue between whatever reads commands and the handler that runs them.
pub struct CommandBus {
    sender: CommandSender,
    receiver: CommandReceiver,
}

impl CommandBus {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Runs commands until `quit` or until every sender is gone. Failed
    /// commands are reported and the loop carries on.
    pub fn run(
        self,
        handler: &mut dyn CommandHandler,
        mut report: impl FnMut(Result<&Reply, &anyhow::Error>),
    ) {
        let Self { sender, receiver } = self;
        drop(sender);
        while let Ok(command) = receiver.recv() {
            debug!("handling {command:?}");
            match handler.handle(command) {
                Ok(Reply::Quit) => {
                    report(Ok(&Reply::Quit));
                    break;
                }
                Ok(reply) => report(Ok(&reply)),
                Err(err) => report(Err(&err)),
            }
        }
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs every board notification.
pub struct LoggingListener;

impl HistoryListener for LoggingListener {
    fn history_changed(&self, history: &MoveHistory) {
        debug!("history changed, {history}");
    }

    fn selection_changed(&self, history: &MoveHistory) {
        debug!("now at {}", history.current_node());
    }
}

impl BoardListener for LoggingListener {
    fn checkmate(&self, board: &Board, loser: Color) {
        info!("{loser} is checkmated after {}", describe_last(board));
    }

    fn drawn(&self, board: &Board, draw: DrawType) {
        info!("draw by {draw} after {}", describe_last(board));
    }

    fn draw_offered(&self, board: &Board) {
        info!("{} offers a draw", board.turn());
    }

    fn resigned(&self, _board: &Board, side: Color) {
        info!("{side} resigns");
    }
}

fn describe_last(board: &Board) -> &str {
    board.last_move_description().unwrap_or("the start position")
}
