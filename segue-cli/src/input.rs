use anyhow::{Context, bail};
use segue_core::{
    GroupId, GroupKind, RepeatMode, Scope, SearchQuery, ShuffleMode, Track, TrackKey,
    commands::QueueCommand,
    queue::{SortField, SortOrder, TrackSort},
    search::SearchField,
};

pub const HELP: &str = "\
commands (indices are 0-based):
  add <file>...              append files
  insert <at> <file>...      insert files at an index
  enqueue <file>...          play files right after the current track
  remove <index>...          remove tracks
  clear                      remove everything
  up|down|top|bottom <index>...
  move <drop> <index>...     drag tracks to the gap before <drop>
  playnext <index>...        move tracks to after the current track
  sort <field> [asc|desc]    title, artist, album or duration
  start | stop | select <index>
  play <file>                select a queued track by file
  group <artist|album|genre> <name>   play one group
  scope all | scope <kind> <name>     narrow what plays
  done                       the current track finished
  next | prev | peek
  repeat [off|one|all] | shuffle [off|on]
  search [name|title|artist|album] <text>
  groups <artist|album|genre>  list the groups in the queue
  gapless                    prepare for gapless playback
  list | help | quit";

/// A parsed line of user input
#[derive(Debug)]
pub enum Input {
    Command(QueueCommand),
    /// Print the queue
    List,
    /// Print the groups of one kind
    Groups(GroupKind),
    Help,
    Empty,
}

pub fn parse_line(line: &str) -> anyhow::Result<Input> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Input::Empty);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb {
        "add" => QueueCommand::Add(tracks(&args)?),
        "insert" => {
            let (at, files) = args.split_first().context("insert needs an index")?;
            QueueCommand::Insert {
                tracks: tracks(files)?,
                at: index(at)?,
            }
        }
        "enqueue" => QueueCommand::EnqueueNext(tracks(&args)?),
        "remove" => QueueCommand::Remove(indices(&args)?),
        "clear" => QueueCommand::Clear,
        "up" => QueueCommand::MoveUp(indices(&args)?),
        "down" => QueueCommand::MoveDown(indices(&args)?),
        "top" => QueueCommand::MoveToTop(indices(&args)?),
        "bottom" => QueueCommand::MoveToBottom(indices(&args)?),
        "move" => {
            let (drop_index, rest) = args.split_first().context("move needs a drop index")?;
            QueueCommand::Move {
                indices: indices(rest)?,
                drop_index: index(drop_index)?,
            }
        }
        "playnext" => QueueCommand::MoveToPlayNext(indices(&args)?),
        "sort" => {
            let field: SortField = args.first().context("sort needs a field")?.parse()?;
            let order: SortOrder = match args.get(1) {
                Some(order) => order.parse()?,
                None => SortOrder::default(),
            };
            QueueCommand::Sort(TrackSort::new(field, order))
        }
        "start" => QueueCommand::Start,
        "stop" => QueueCommand::Stop,
        "select" => QueueCommand::Select(index(args.first().context("select needs an index")?)?),
        "play" => QueueCommand::SelectTrack(TrackKey::new(args.first().context("play needs a file")?)),
        "group" => QueueCommand::SelectGroup(group(&args)?),
        "scope" => match args.as_slice() {
            ["all"] => QueueCommand::SetScope(Scope::AllTracks),
            _ => QueueCommand::SetScope(Scope::Group(group(&args)?)),
        },
        "done" => QueueCommand::Subsequent,
        "next" => QueueCommand::Next,
        "prev" => QueueCommand::Previous,
        "peek" => QueueCommand::Peek,
        "repeat" => match args.first() {
            Some(mode) => QueueCommand::SetRepeatMode(mode.parse::<RepeatMode>()?),
            None => QueueCommand::ToggleRepeatMode,
        },
        "shuffle" => match args.first() {
            Some(mode) => QueueCommand::SetShuffleMode(mode.parse::<ShuffleMode>()?),
            None => QueueCommand::ToggleShuffleMode,
        },
        "search" => QueueCommand::Search(search(&args)?),
        "gapless" => QueueCommand::PrepareGapless,
        "quit" | "exit" => QueueCommand::Quit,
        "list" => return Ok(Input::List),
        "groups" => {
            let kind = args.first().context("groups needs a kind")?.parse::<GroupKind>()?;
            return Ok(Input::Groups(kind));
        }
        "help" => return Ok(Input::Help),
        other => bail!("Unknown command '{}', try 'help'", other),
    };

    Ok(Input::Command(command))
}

fn index(word: &str) -> anyhow::Result<usize> {
    word.parse().with_context(|| format!("'{}' is not a track index", word))
}

fn indices(words: &[&str]) -> anyhow::Result<Vec<usize>> {
    if words.is_empty() {
        bail!("Expected at least one track index");
    }
    words.iter().map(|word| index(word)).collect()
}

fn tracks(files: &[&str]) -> anyhow::Result<Vec<Track>> {
    if files.is_empty() {
        bail!("Expected at least one file");
    }
    Ok(files.iter().map(|file| Track::new(*file)).collect())
}

/// A leading field name narrows the search to that field
fn search(args: &[&str]) -> anyhow::Result<SearchQuery> {
    let (field, text) = match args.split_first() {
        Some((first, rest)) if !rest.is_empty() => match first.parse::<SearchField>() {
            Ok(field) => (Some(field), rest),
            Err(_) => (None, args),
        },
        _ => (None, args),
    };
    if text.is_empty() {
        bail!("search needs some text");
    }

    let query = SearchQuery::new(text.join(" "));
    Ok(match field {
        Some(field) => query.with_fields([field]),
        None => query,
    })
}

fn group(args: &[&str]) -> anyhow::Result<GroupId> {
    let (kind, name) = args.split_first().context("Expected a group kind and name")?;
    if name.is_empty() {
        bail!("Expected a group name");
    }
    Ok(GroupId::new(kind.parse::<GroupKind>()?, name.join(" ")))
}
