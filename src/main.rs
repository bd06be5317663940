// Line-oriented driver: every stdin line is either a transcript or a command.
//
//   :select N    pick candidate row N
//   :audio PATH  transcribe PATH with whisper and handle the result (Ctrl-C cancels)
//   :undo :redo  revert or re-apply the last grade write
//   :abort       drop the current selection
//   :quit        exit

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};

use speak2sheet::{
    AppSettings, GradeTable, GradingSession, JsonSheet, Language, MatchCandidate, Mode, SessionError, SessionEvent,
    WhisperCli, SETTINGS,
};

#[derive(Debug, PartialEq)]
enum Command {
    Transcript(String),
    Select(usize),
    Audio(PathBuf),
    Undo,
    Redo,
    Abort,
    Quit,
    Invalid(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Some(Command::Transcript(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "select" => match arg.parse::<usize>() {
            Ok(row) => Command::Select(row),
            Err(_) => Command::Invalid(line.to_string()),
        },
        "audio" if !arg.is_empty() => Command::Audio(PathBuf::from(arg)),
        "undo" => Command::Undo,
        "redo" => Command::Redo,
        "abort" => Command::Abort,
        "quit" | "q" => Command::Quit,
        _ => Command::Invalid(line.to_string()),
    };
    Some(command)
}

fn load_settings() -> AppSettings {
    match SETTINGS.lock() {
        Ok(settings) => settings.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn grade_prompt(language: Language) -> &'static str {
    match language {
        Language::Greek => "Πείτε τον βαθμό",
        Language::English => "Say the grade",
    }
}

fn grade_saved(language: Language, name: &str, grade: &str) -> String {
    match language {
        Language::Greek => format!("Καταχωρήθηκε {} για {}", grade, name),
        Language::English => format!("Saved {} for {}", grade, name),
    }
}

fn nothing_to_revert(language: Language, redo: bool) -> &'static str {
    match (language, redo) {
        (Language::Greek, false) => "Δεν υπάρχει καταχώρηση για αναίρεση",
        (Language::Greek, true) => "Δεν υπάρχει καταχώρηση για επανάληψη",
        (Language::English, false) => "Nothing to undo",
        (Language::English, true) => "Nothing to redo",
    }
}

fn print_candidates(candidates: &[MatchCandidate], sheet: &JsonSheet, session: &GradingSession) {
    let columns = session.columns();
    for candidate in candidates {
        println!(
            "{}: {} – {}",
            candidate.row,
            sheet.cell(candidate.row, columns.id_column),
            sheet.cell(candidate.row, columns.name_column)
        );
    }
}

fn handle_transcript(transcript: &str, session: &mut GradingSession, sheet: &mut JsonSheet) {
    let language = session.language();
    match session.handle_transcript(transcript, sheet) {
        Ok(SessionEvent::CandidatesFound(candidates)) => print_candidates(&candidates, sheet, session),
        Ok(SessionEvent::GradeWritten { row, grade }) => {
            let name = sheet.cell(row, session.columns().name_column);
            println!("{}", grade_saved(language, &name, &grade));
        }
        Err(e) => report(&e, language),
    }
}

fn report(error: &SessionError, language: Language) {
    log::debug!("[Driver] {:?}", error);
    println!("{}", error.status_message(language));
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(sheet_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: speak2sheet <sheet.json>");
        std::process::exit(2);
    };

    let mut sheet = match JsonSheet::load(&sheet_path) {
        Ok(sheet) => sheet,
        Err(e) => {
            log::error!("[Driver] Failed to load sheet {}: {}", sheet_path.display(), e);
            std::process::exit(1);
        }
    };

    let settings = load_settings();
    let transcriber = WhisperCli::new(&settings.whisper, settings.language);
    let mut session = GradingSession::new(&settings);
    let language = session.language();
    log::info!("[Driver] Grading {} ({} rows)", sheet_path.display(), sheet.row_count());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("[Driver] Failed to read input: {}", e);
                break;
            }
        };
        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            Command::Transcript(text) => handle_transcript(&text, &mut session, &mut sheet),
            Command::Select(row) => match session.select(row) {
                Ok(()) => println!("{}", grade_prompt(language)),
                Err(e) => report(&e, language),
            },
            Command::Audio(path) => {
                let cancel = async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        log::warn!("[Driver] Could not listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                };
                match transcriber.transcribe_until(&path, cancel).await {
                    Ok(text) => {
                        println!("> {}", text);
                        handle_transcript(&text, &mut session, &mut sheet);
                    }
                    Err(e) => report(&session.transcription_failed(e), language),
                }
            }
            Command::Undo if !session.history().can_undo() => println!("{}", nothing_to_revert(language, false)),
            Command::Redo if !session.history().can_redo() => println!("{}", nothing_to_revert(language, true)),
            Command::Undo => match session.undo(&mut sheet) {
                Ok(Some(edit)) => println!("{}: {} -> {}", edit.row, edit.value, edit.previous),
                Ok(None) => {}
                Err(e) => report(&e, language),
            },
            Command::Redo => match session.redo(&mut sheet) {
                Ok(Some(edit)) => println!("{}: {} -> {}", edit.row, edit.previous, edit.value),
                Ok(None) => {}
                Err(e) => report(&e, language),
            },
            Command::Abort => {
                session.abort();
                log::info!("[Driver] Selection cleared");
            }
            Command::Quit => break,
            Command::Invalid(text) => eprintln!("unknown command: {}", text),
        }

        if session.mode() == Mode::RecordingGrade {
            log::debug!("[Driver] Waiting for grade of row {:?}", session.selected_row());
        }
    }
}
