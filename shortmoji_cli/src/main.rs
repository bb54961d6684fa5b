use std::{
    env,
    io::{self, Write},
    path::PathBuf,
};

use env_logger::Env;
use shortmoji_core::{
    config::{MemorySettingsStore, Settings, SettingsChange, SettingsStore},
    engine::Engine,
    index::EmojiIndex,
    key_event::{Action, InputEvent, Key, PointerTarget},
    memory::{FieldHandle, MemoryDropdown},
    session::Session,
};
use shortmoji_index::EmojiTable;

type DemoSession = Session<EmojiTable, FieldHandle>;

struct Args {
    index: Option<PathBuf>,
    auto_replace: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = parse_args(env::args().skip(1))?;
    let table = match &args.index {
        Some(path) => EmojiTable::from_path(path)?,
        None => EmojiTable::builtin(),
    };
    log::info!("loaded {} shortcodes", table.len());

    let store = MemorySettingsStore::new(Settings {
        enabled: true,
        auto_replace: args.auto_replace,
    });
    let dropdown = MemoryDropdown::default();
    let mut session: DemoSession = Session::new(Engine::new(table), Box::new(dropdown.clone()));
    session.attach_settings(&store);

    let mut field = FieldHandle::new("");
    repl(&mut session, &store, &dropdown, &mut field)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut out = Args {
        index: None,
        auto_replace: true,
    };
    while let Some(a) = args.next() {
        match a.as_str() {
            "--index" => match args.next() {
                Some(path) if !path.starts_with("--") => out.index = Some(PathBuf::from(path)),
                _ => anyhow::bail!("--index requires a path (see --help)"),
            },
            "--no-auto-replace" => out.auto_replace = false,
            "--help" | "-h" => print_help(),
            other => log::warn!("unknown argument {other:?}"),
        }
    }
    Ok(out)
}

fn print_help() -> ! {
    println!(
        "usage: shortmoji_cli [--index <path.tsv>] [--no-auto-replace]\n\
         type text as into a text field; `:fire:` is replaced instantly, `:fi` / `#fi` opens suggestions.\n\
         commands: :q quit, :on / :off engine, :auto on|off, :undo, :clear, :search <query>"
    );
    std::process::exit(0);
}

fn repl(
    session: &mut DemoSession,
    store: &MemorySettingsStore,
    dropdown: &MemoryDropdown,
    field: &mut FieldHandle,
) -> anyhow::Result<()> {
    let mut out = io::stdout();
    let mut line = String::new();
    writeln!(out, "shortmoji demo | type :q to exit")?;

    loop {
        line.clear();
        print!("text> ");
        out.flush()?;
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim_end_matches(['\r', '\n']);
        match input {
            ":q" | ":quit" | ":exit" => break,
            ":on" => store.set(SettingsChange::enabled(true)),
            ":off" => store.set(SettingsChange::enabled(false)),
            ":auto on" => store.set(SettingsChange::auto_replace(true)),
            ":auto off" => store.set(SettingsChange::auto_replace(false)),
            ":undo" => {
                if !field.undo() {
                    writeln!(out, "(nothing to undo)")?;
                }
            }
            ":clear" => *field = FieldHandle::new(""),
            _ if input.starts_with(":search ") => {
                let query = input[":search ".len()..].trim().to_lowercase();
                let found = session.engine().search(&query);
                if found.is_empty() {
                    writeln!(out, "(no match for {query:?})")?;
                }
                for c in &found {
                    writeln!(out, "  {} {}", c.glyph, c.label())?;
                }
            }
            _ => {
                type_into(session, field, input, &mut out)?;
                choose(session, dropdown, field, &mut out)?;
            }
        }
        let s = store.load();
        writeln!(
            out,
            "field: {}|  [enabled={} autoReplace={}]",
            field.value(),
            s.enabled,
            s.auto_replace
        )?;
    }
    Ok(())
}

/// 逐字符键入，每个字符派发一次编辑事件。
fn type_into(
    session: &mut DemoSession,
    field: &FieldHandle,
    text: &str,
    out: &mut impl Write,
) -> io::Result<()> {
    for ch in text.chars() {
        field.type_str(ch.encode_utf8(&mut [0; 4]));
        let (_, actions) = session.handle(InputEvent::Edit(field.clone()));
        report(&actions, out)?;
    }
    Ok(())
}

/// 下拉框打开期间的选择循环。
fn choose(
    session: &mut DemoSession,
    dropdown: &MemoryDropdown,
    field: &FieldHandle,
    out: &mut impl Write,
) -> io::Result<()> {
    let mut line = String::new();
    while let Some(ui) = session.ui_state() {
        let at = dropdown.state().position;
        writeln!(out, "  at ({:.0}, {:.0})", at.x, at.y)?;
        for (i, c) in ui.candidate_list.iter().enumerate() {
            let mark = if i == ui.selected { '>' } else { ' ' };
            writeln!(out, "{mark} {}. {} {}", i + 1, c.glyph, c.label())?;
        }
        if let Some(c) = ui.selected_candidate() {
            writeln!(out, "  Enter -> {}", c.glyph)?;
        }
        let rows = ui.candidate_list.len();

        line.clear();
        print!("select [1-{rows}] (Enter, j/k, Tab, Esc=q, or keep typing)> ");
        out.flush()?;
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let sel = line.trim_end_matches(['\r', '\n']);
        let ev = match sel {
            "" => InputEvent::Key(Key::Enter),
            "j" => InputEvent::Key(Key::ArrowDown),
            "k" => InputEvent::Key(Key::ArrowUp),
            "t" | "tab" => InputEvent::Key(Key::Tab),
            "q" | "esc" => InputEvent::Key(Key::Escape),
            _ => match sel.parse::<usize>() {
                Ok(n) if (1..=rows).contains(&n) => {
                    InputEvent::PointerDown(PointerTarget::Row(n - 1))
                }
                _ => {
                    type_into(session, field, sel, out)?;
                    continue;
                }
            },
        };
        let (_, actions) = session.handle(ev);
        report(&actions, out)?;
    }
    Ok(())
}

fn report(actions: &[Action], out: &mut impl Write) -> io::Result<()> {
    for a in actions {
        if let Action::Commit(glyph) = a {
            writeln!(out, "commit: {glyph}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn index_flag_takes_a_path() {
        let a = args(&["--index", "emoji.tsv", "--no-auto-replace"]).unwrap();
        assert_eq!(a.index, Some(PathBuf::from("emoji.tsv")));
        assert!(!a.auto_replace);

        let a = args(&[]).unwrap();
        assert_eq!(a.index, None);
        assert!(a.auto_replace);
    }

    #[test]
    fn index_flag_without_path_is_rejected() {
        assert!(args(&["--index"]).is_err());
        assert!(args(&["--index", "--no-auto-replace"]).is_err());
    }

    #[test]
    fn unknown_arguments_are_ignored() {
        let a = args(&["--verbose", "--index", "x.tsv"]).unwrap();
        assert_eq!(a.index, Some(PathBuf::from("x.tsv")));
    }
}
