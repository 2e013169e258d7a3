use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use playdeck_core::playback::status::PlaybackStatus;
use playdeck_core::service::player_service::{CommandResponse, PlayerService, ServiceError};

const HELP: &str = "commands: load <path>, play [speed], pause, stop, reset, \
                    speed <x>, status, unload, help, quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    Play(Option<f64>),
    Pause,
    Stop,
    Reset,
    Speed(f64),
    Status,
    Unload,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

/// Parses one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "load" if rest.is_empty() => return Err(ParseError::MissingArgument("load")),
        "load" => Command::Load(PathBuf::from(rest)),
        "play" if rest.is_empty() => Command::Play(None),
        "play" => Command::Play(Some(parse_number(rest)?)),
        "pause" => Command::Pause,
        "stop" => Command::Stop,
        "reset" => Command::Reset,
        "speed" | "set_speed" if rest.is_empty() => {
            return Err(ParseError::MissingArgument("speed"))
        }
        "speed" | "set_speed" => Command::Speed(parse_number(rest)?),
        "status" => Command::Status,
        "unload" => Command::Unload,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(ParseError::Unknown(word.to_string())),
    };
    Ok(Some(command))
}

fn parse_number(text: &str) -> Result<f64, ParseError> {
    text.trim_end_matches('x')
        .parse()
        .map_err(|_| ParseError::InvalidNumber(text.to_string()))
}

/// One JSON line written back for each command.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Reply {
    Ack(CommandResponse),
    Status(PlaybackStatus),
    Failed { error: ServiceError },
    Rejected { error: String },
}

fn execute(service: &PlayerService, command: Command) -> Reply {
    let result = match command {
        Command::Load(path) => service.load(&path),
        Command::Play(speed) => service.play(speed),
        Command::Pause => service.pause(),
        Command::Stop => service.stop(),
        Command::Reset => service.reset(),
        Command::Speed(speed) => service.set_speed(speed),
        Command::Unload => service.unload(),
        Command::Status => return Reply::Status(service.status()),
        Command::Help | Command::Quit => {
            return Reply::Ack(CommandResponse {
                message: HELP.to_string(),
                speed: None,
                path: None,
            })
        }
    };
    match result {
        Ok(response) => Reply::Ack(response),
        Err(error) => {
            log::warn!("Command failed: {error}");
            Reply::Failed { error }
        }
    }
}

/// Reads commands from `input` until EOF or `quit`, answering each on
/// `output` with one line of JSON.
pub fn run_console(
    service: &PlayerService,
    input: impl BufRead,
    mut output: impl Write,
) -> io::Result<()> {
    for line in input.lines() {
        let reply = match parse_command(&line?) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => execute(service, command),
            Err(e) => Reply::Rejected {
                error: e.to_string(),
            },
        };
        serde_json::to_writer(&mut output, &reply)?;
        writeln!(output)?;
        output.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rstest::rstest;

    use playdeck_core::display::domain::frame_sink::NullFrameSink;
    use playdeck_core::playback::playback_controller::PlaybackController;

    #[rstest]
    #[case("load /videos/a clip.mp4", Command::Load(PathBuf::from("/videos/a clip.mp4")))]
    #[case("play", Command::Play(None))]
    #[case("play 2", Command::Play(Some(2.0)))]
    #[case("PLAY 0.5x", Command::Play(Some(0.5)))]
    #[case("  pause  ", Command::Pause)]
    #[case("stop", Command::Stop)]
    #[case("reset", Command::Reset)]
    #[case("speed 4", Command::Speed(4.0))]
    #[case("set_speed -1", Command::Speed(-1.0))]
    #[case("status", Command::Status)]
    #[case("unload", Command::Unload)]
    #[case("exit", Command::Quit)]
    fn test_parse_command(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(parse_command(line), Ok(Some(expected)));
    }

    #[rstest]
    #[case("load", ParseError::MissingArgument("load"))]
    #[case("speed", ParseError::MissingArgument("speed"))]
    #[case("speed fast", ParseError::InvalidNumber("fast".to_string()))]
    #[case("rewind", ParseError::Unknown("rewind".to_string()))]
    fn test_parse_errors(#[case] line: &str, #[case] expected: ParseError) {
        assert_eq!(parse_command(line), Err(expected));
    }

    #[test]
    fn test_blank_line_is_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    fn run(script: &str) -> Vec<serde_json::Value> {
        let service = PlayerService::new(PlaybackController::with_ffmpeg(Arc::new(NullFrameSink)));
        let mut out = Vec::new();
        run_console(&service, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_console_session() {
        let replies = run("status\nplay\n\nspeed 2\nspeed -1\nbogus\nquit\nstatus\n");
        assert_eq!(replies.len(), 5);

        assert_eq!(replies[0]["loaded"], false);
        assert_eq!(replies[1]["error"]["kind"], "NotLoaded");
        assert_eq!(replies[2]["message"], "Speed set to 2x");
        assert_eq!(replies[2]["speed"], 2.0);
        assert_eq!(replies[3]["error"]["kind"], "InvalidSpeed");
        assert!(replies[4]["error"]
            .as_str()
            .unwrap()
            .starts_with("unknown command 'bogus'"));
    }

    #[test]
    fn test_load_missing_file_reply() {
        let replies = run("load /no/such/file\n");
        assert_eq!(replies[0]["error"]["kind"], "InvalidPath");
    }
}
