use std::fmt;

use bounty::Submission;
use foundation::ids::LocationId;
use foundation::math::Vec3;
use scene::Category;
use scene::picking::Ray;

/// One line of user input, already parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(LocationId),
    Pick(Ray),
    Submit(Submission),
    Close,
    List { limit: usize, offset: usize },
    Search(String),
    Category(Category),
    Categories,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

/// Beacons shown by a bare `list`.
pub const DEFAULT_PAGE_SIZE: usize = 50;

pub const HELP: &str = "\
commands:
  list [limit] [offset]        show beacons, 50 at a time by default
  select <id>                  open the bounty panel for a beacon
  pick ox oy oz dx dy dz       select the beacon hit by a ray
  submit <image> [note...]     claim the bounty on the selected beacon
  close                        close the panel (cancels a running verification)
  search <text>                find beacons by name or category
  category <name>              list beacons in a category
  categories                   list the categories in use
  status                       show counters and wallet stats
  quit";

/// Parses a single input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "select" | "s" => {
            let [id] = rest.as_slice() else {
                return Err(ParseError("usage: select <id>".into()));
            };
            let id = id
                .parse::<u32>()
                .map_err(|_| ParseError(format!("not a location id: {id}")))?;
            Command::Select(LocationId(id))
        }
        "pick" => {
            let nums = rest
                .iter()
                .map(|w| w.parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| ParseError("pick expects six numbers".into()))?;
            let [ox, oy, oz, dx, dy, dz] = nums.as_slice() else {
                return Err(ParseError("usage: pick ox oy oz dx dy dz".into()));
            };
            Command::Pick(Ray::new(Vec3::new(*ox, *oy, *oz), Vec3::new(*dx, *dy, *dz)))
        }
        "submit" => {
            // A bare `submit` is passed through so the app can reject it.
            let mut submission = match rest.first() {
                Some(image) => Submission::with_image(*image),
                None => Submission::without_image(),
            };
            if rest.len() > 1 {
                submission = submission.note(rest[1..].join(" "));
            }
            Command::Submit(submission)
        }
        "close" | "c" => Command::Close,
        "list" | "ls" => {
            let nums = rest
                .iter()
                .map(|w| w.parse::<usize>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| ParseError("usage: list [limit] [offset]".into()))?;
            match nums.as_slice() {
                [] => Command::List {
                    limit: DEFAULT_PAGE_SIZE,
                    offset: 0,
                },
                [limit] => Command::List {
                    limit: *limit,
                    offset: 0,
                },
                [limit, offset] => Command::List {
                    limit: *limit,
                    offset: *offset,
                },
                _ => return Err(ParseError("usage: list [limit] [offset]".into())),
            }
        }
        "search" => {
            if rest.is_empty() {
                return Err(ParseError("usage: search <text>".into()));
            }
            Command::Search(rest.join(" "))
        }
        "category" => {
            let [name] = rest.as_slice() else {
                return Err(ParseError("usage: category <name>".into()));
            };
            Command::Category(name.parse().map_err(|e| ParseError(format!("{e}")))?)
        }
        "categories" => Command::Categories,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(ParseError(format!("unknown command '{other}', try `help`"))),
    };
    Ok(Some(cmd))
}
