//! `homeinspect session`: a line-oriented stand-in for the checklist screens.
//!
//! Each input line is one command against the store. After every command the
//! session drains the store's event stream and prints what changed, the way a
//! UI would re-render the affected rows.

use std::io::Write;

use anyhow::Context;
use anyhow::bail;
use homeinspect_core::InspectConfig;
use homeinspect_core::InspectionStore;
use homeinspect_core::StartedStore;
use homeinspect_core::StoreEvent;
use homeinspect_protocol::CommentId;
use homeinspect_protocol::ResultId;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tokio_util::sync::CancellationToken;

use crate::dump_cmd;

const HELP: &str = "\
commands:
  tree                          print the hierarchy
  text <sec> <sub>              subsection name at positions
  row <sec> <sub> <row>         comment id for a table row
  comment <id>                  comment text
  add <comment>                 attach a new result
  remove <result>               delete a result
  severity <result>             toggle severity
  note <result> <text...>       set the note
  photo <result> <path>         set the photo path
  flags <result> [n...]         set flags
  submit <result>               post a result to the backend
  results                       list local results
  remote                        list results stored on the backend
  status                        entity counts
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Tree,
    Text {
        section: usize,
        subsection: usize,
    },
    Row {
        section: usize,
        subsection: usize,
        row: usize,
    },
    Comment(CommentId),
    Add(CommentId),
    Remove(ResultId),
    Severity(ResultId),
    Note(ResultId, String),
    Photo(ResultId, String),
    Flags(ResultId, Vec<i8>),
    Submit(ResultId),
    Results,
    Remote,
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> anyhow::Result<Option<SessionCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb {
        "tree" => SessionCommand::Tree,
        "text" => SessionCommand::Text {
            section: arg(&mut words, "section position")?,
            subsection: arg(&mut words, "subsection position")?,
        },
        "row" => SessionCommand::Row {
            section: arg(&mut words, "section position")?,
            subsection: arg(&mut words, "subsection position")?,
            row: arg(&mut words, "row")?,
        },
        "comment" => SessionCommand::Comment(arg(&mut words, "comment id")?),
        "add" => SessionCommand::Add(arg(&mut words, "comment id")?),
        "remove" => SessionCommand::Remove(arg(&mut words, "result id")?),
        "severity" => SessionCommand::Severity(arg(&mut words, "result id")?),
        "note" => {
            let id = arg(&mut words, "result id")?;
            SessionCommand::Note(id, words.collect::<Vec<_>>().join(" "))
        }
        "photo" => {
            let id = arg(&mut words, "result id")?;
            let path = words.next().context("missing photo path")?;
            SessionCommand::Photo(id, path.to_string())
        }
        "flags" => {
            let id = arg(&mut words, "result id")?;
            let flags = words
                .map(|w| w.parse::<i8>().with_context(|| format!("bad flag `{w}`")))
                .collect::<anyhow::Result<Vec<_>>>()?;
            SessionCommand::Flags(id, flags)
        }
        "submit" => SessionCommand::Submit(arg(&mut words, "result id")?),
        "results" => SessionCommand::Results,
        "remote" => SessionCommand::Remote,
        "status" => SessionCommand::Status,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => bail!("unknown command `{other}` (try `help`)"),
    };
    Ok(Some(command))
}

fn arg<'a, T>(words: &mut impl Iterator<Item = &'a str>, what: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let word = words.next().with_context(|| format!("missing {what}"))?;
    word.parse()
        .with_context(|| format!("invalid {what} `{word}`"))
}

pub async fn run(config: &InspectConfig) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let StartedStore {
        store, mut events, ..
    } = InspectionStore::start(config)?;
    store
        .wait_ready_or_cancel(config.bootstrap_timeout(), &cancel)
        .await
        .context("waiting for the inspection hierarchy")?;

    let stdout = std::io::stdout();
    drain_events(&mut events, &mut stdout.lock())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(stdout.lock(), "error: {err:#}")?;
                continue;
            }
        };
        if command == SessionCommand::Quit {
            break;
        }

        let output = execute(&store, command).await;
        let mut out = stdout.lock();
        match output {
            Ok(text) if text.is_empty() => {}
            Ok(text) => writeln!(out, "{text}")?,
            Err(err) => writeln!(out, "error: {err:#}")?,
        }
        drain_events(&mut events, &mut out)?;
    }

    tracing::info!("session ended");
    Ok(())
}

/// Run one command and render its reply.
pub async fn execute(store: &InspectionStore, command: SessionCommand) -> anyhow::Result<String> {
    let text = match command {
        SessionCommand::Tree => {
            let tree = dump_cmd::collect_tree(store)?;
            let mut buf = Vec::new();
            dump_cmd::write_tree(&tree, &mut buf)?;
            String::from_utf8_lossy(&buf).trim_end().to_string()
        }
        SessionCommand::Text {
            section,
            subsection,
        } => store.subsection_text(section, subsection)?,
        SessionCommand::Row {
            section,
            subsection,
            row,
        } => match store.comment_id(section, subsection, row)? {
            Some(id) => format!("comment {id}"),
            None => "no comment at that row".to_string(),
        },
        SessionCommand::Comment(id) => store.comment_text(id)?,
        SessionCommand::Add(comment_id) => {
            format!("result {}", store.add_result(comment_id)?)
        }
        SessionCommand::Remove(result_id) => {
            format!("unlinked comment {}", store.remove_result(result_id)?)
        }
        SessionCommand::Severity(result_id) => {
            format!("severity {}", store.change_severity(result_id)?)
        }
        SessionCommand::Note(result_id, note) => store.change_note(result_id, note)?,
        SessionCommand::Photo(result_id, path) => store.change_photo(result_id, path)?,
        SessionCommand::Flags(result_id, flags) => {
            format!("flags {:?}", store.change_flags(result_id, flags)?)
        }
        SessionCommand::Submit(result_id) => {
            let ack = store.submit_result(result_id).await?;
            format!("submitted: {}", ack.data)
        }
        SessionCommand::Results => store
            .live_results()?
            .iter()
            .map(|r| {
                format!(
                    "result {} comment {} severity {} note {:?} {}",
                    r.id,
                    r.comment_id,
                    r.severity,
                    r.note,
                    if r.is_synced() { "synced" } else { "local" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        SessionCommand::Remote => store
            .fetch_remote_results()
            .await?
            .iter()
            .map(|r| format!("remote {} comment {} severity {}", r.id, r.com_id, r.severity))
            .collect::<Vec<_>>()
            .join("\n"),
        SessionCommand::Status => {
            let counts = store.counts()?;
            format!(
                "sections {} subsections {} comments {} results {}",
                counts.sections, counts.subsections, counts.comments, counts.live_results
            )
        }
        SessionCommand::Help => HELP.to_string(),
        SessionCommand::Quit => String::new(),
    };
    Ok(text)
}

fn drain_events(
    events: &mut broadcast::Receiver<StoreEvent>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    loop {
        match events.try_recv() {
            Ok(event) => writeln!(out, "event: {event}")?,
            Err(TryRecvError::Lagged(missed)) => {
                tracing::warn!(missed, "event stream lagged");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}
