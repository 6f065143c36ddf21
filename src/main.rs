use std::io::{self, BufRead, Write};
use std::thread;

use chess_tree::{Command, CommandBus, Game};
use log::{info, warn};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut game = match std::env::args().nth(1) {
        Some(fen) => Game::from_fen(&fen)?,
        None => Game::new(),
    };
    info!("ready, type 'help' for commands");
    println!("{}", game.status());

    let bus = CommandBus::new();
    let sender = bus.sender();

    // stdin reader
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!("stdin closed: {err}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if sender.send(command).is_err() {
                        break;
                    }
                }
                Err(err) => eprintln!("error: {err:#}"),
            }
        }
    });

    let stdout = io::stdout();
    bus.run(&mut game, |result| {
        let mut out = stdout.lock();
        let written = match result {
            Ok(reply) => writeln!(out, "{reply}"),
            Err(err) => writeln!(out, "error: {err:#}"),
        };
        if let Err(err) = written.and_then(|()| out.flush()) {
            warn!("cannot write reply: {err}");
        }
    });
    Ok(())
}
