//! Line parsing for the interactive prompt.

use gallery_core::GalleryCommand;

pub const HELP: &str = "\
commands:
  next | prev            move one page
  page <n>               jump to page n
  size <n>               set photos per page
  width <px>             set viewport width (page size follows breakpoints)
  upload <url>           add a local photo at the front
  select <id>            toggle selection of a displayed photo
  delete                 delete the selection
  refresh                reload the current page
  help                   show this text
  quit                   exit";

/// What one input line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(GalleryCommand),
    Help,
    Quit,
    Empty,
}

/// Parse one line. Errors are user-facing messages.
pub fn parse_line(line: &str) -> Result<Input, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(Input::Empty);
    };
    let arg = parts.next();

    let command = match verb.to_ascii_lowercase().as_str() {
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" | "q" => return Ok(Input::Quit),
        "next" | "n" => GalleryCommand::NextPage,
        "prev" | "previous" | "p" => GalleryCommand::PreviousPage,
        "refresh" | "r" => GalleryCommand::Refresh,
        "delete" | "del" => GalleryCommand::CommitDelete,
        "page" => GalleryCommand::SetPageNum {
            page_num: parse_arg(verb, arg)?,
        },
        "size" => GalleryCommand::SetPageSize {
            page_size: parse_arg(verb, arg)?,
        },
        "width" => GalleryCommand::SetViewportWidth {
            width_px: parse_arg(verb, arg)?,
        },
        "select" | "s" => GalleryCommand::ToggleSelect {
            id: parse_arg(verb, arg)?,
        },
        "upload" | "u" => {
            let url = arg.ok_or_else(|| format!("'{verb}' needs a URL"))?;
            GalleryCommand::Upload {
                url: url.to_owned(),
            }
        }
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };

    Ok(Input::Command(command))
}

fn parse_arg<T: std::str::FromStr>(verb: &str, arg: Option<&str>) -> Result<T, String> {
    let arg = arg.ok_or_else(|| format!("'{verb}' needs a number"))?;
    arg.parse::<T>()
        .map_err(|_| format!("'{arg}' is not a valid number for '{verb}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_and_mutations() {
        assert_eq!(
            parse_line("page 3"),
            Ok(Input::Command(GalleryCommand::SetPageNum { page_num: 3 }))
        );
        assert_eq!(
            parse_line("  NEXT "),
            Ok(Input::Command(GalleryCommand::NextPage))
        );
        assert_eq!(
            parse_line("select -2"),
            Ok(Input::Command(GalleryCommand::ToggleSelect { id: -2 }))
        );
        assert_eq!(
            parse_line("upload file:///tmp/cat.png"),
            Ok(Input::Command(GalleryCommand::Upload {
                url: "file:///tmp/cat.png".into()
            }))
        );
        assert_eq!(
            parse_line("width 800"),
            Ok(Input::Command(GalleryCommand::SetViewportWidth {
                width_px: 800
            }))
        );
    }

    #[test]
    fn handles_control_words_and_blank_lines() {
        assert_eq!(parse_line(""), Ok(Input::Empty));
        assert_eq!(parse_line("quit"), Ok(Input::Quit));
        assert_eq!(parse_line("help"), Ok(Input::Help));
    }

    #[test]
    fn reports_bad_arguments() {
        assert_eq!(
            parse_line("page"),
            Err("'page' needs a number".to_owned())
        );
        assert_eq!(
            parse_line("size -1"),
            Err("'-1' is not a valid number for 'size'".to_owned())
        );
        assert!(parse_line("dance").is_err());
    }
}
