use anyhow::Result;
use bucket_list::{ItemId, ItemWorkflow, ItemWorkflowController};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::{format_item, load_image};

const HELP: &str = "\
Commands:
  list                 reload and show every item
  title <text>         set the title of the new item, or of the edit in progress
  image <path>|none    pick or clear the image of the new item, or the replacement image
  add [title]          create the new item
  edit <id>            start editing an item
  save                 save the edit in progress
  cancel               leave the edit without saving
  delete <id>          delete an item
  status               show the new item and the edit in progress
  whoami               show who is signed in
  signout              sign out and clear the list
  quit                 leave the shell";

/// One line of shell input
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    List,
    Title(String),
    Image(Option<PathBuf>),
    Add(Option<String>),
    Edit(ItemId),
    Save,
    Cancel,
    Delete(ItemId),
    Status,
    Whoami,
    SignOut,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse a line; `Ok(None)` for blank input
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let item_id = |rest: &str| {
            rest.parse::<ItemId>()
                .map_err(|e| format!("{verb}: {e}"))
        };

        let command = match verb {
            "list" | "ls" => Self::List,
            "title" => Self::Title(rest.to_string()),
            "image" => match rest {
                "" => return Err("image: expected a path or 'none'".to_string()),
                "none" => Self::Image(None),
                path => Self::Image(Some(PathBuf::from(path))),
            },
            "add" => Self::Add((!rest.is_empty()).then(|| rest.to_string())),
            "edit" => Self::Edit(item_id(rest)?),
            "save" => Self::Save,
            "cancel" => Self::Cancel,
            "delete" | "rm" => Self::Delete(item_id(rest)?),
            "status" => Self::Status,
            "whoami" => Self::Whoami,
            "signout" => Self::SignOut,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

/// Run the interactive session until `quit` or end of input.
///
/// Failed actions have already been logged by the workflow; the session
/// carries on with its state unchanged.
pub async fn run(workflow: &ItemWorkflowController) -> Result<()> {
    if let Ok(name) = workflow.display_name() {
        println!("Welcome, {name}");
    }
    if workflow.refresh().await.is_ok() {
        list(workflow).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ShellCommand::parse(&line) {
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => execute(workflow, command).await,
            Ok(None) => {}
            Err(message) => println!("{message}"),
        }
    }
    Ok(())
}

async fn list(workflow: &ItemWorkflowController) {
    let items = workflow.items().await;
    if items.is_empty() {
        println!("Your bucket list is empty.");
    }
    for item in &items {
        println!("{}", format_item(item));
    }
}

async fn execute(workflow: &ItemWorkflowController, command: ShellCommand) {
    match command {
        ShellCommand::List => {
            if workflow.refresh().await.is_ok() {
                list(workflow).await;
            }
        }
        ShellCommand::Title(title) => {
            if !workflow.set_edit_title(title.clone()).await {
                workflow.set_draft_title(title).await;
            }
        }
        ShellCommand::Image(path) => {
            let image = match path {
                Some(path) => match load_image(&path).await {
                    Ok(image) => Some(image),
                    Err(e) => {
                        println!("{e:#}");
                        return;
                    }
                },
                None => None,
            };
            if workflow.editing().await.is_some() {
                workflow.select_edit_image(image).await;
            } else {
                workflow.select_draft_image(image).await;
            }
        }
        ShellCommand::Add(title) => {
            if let Some(title) = title {
                workflow.set_draft_title(title).await;
            }
            if let Ok(Some(item)) = workflow.submit_draft().await {
                println!("{}", format_item(&item));
            }
        }
        ShellCommand::Edit(id) => match workflow.begin_edit(&id).await {
            Ok(session) => println!("Editing {}: {}", session.id, session.title),
            Err(e) => println!("{e}"),
        },
        ShellCommand::Save => match workflow.save_edit().await {
            Ok(Some(item)) => println!("{}", format_item(&item)),
            Ok(None) => {}
            Err(e) if !e.is_remote() => println!("{e}"),
            Err(_) => {}
        },
        ShellCommand::Cancel => {
            workflow.cancel_edit().await;
        }
        ShellCommand::Delete(id) => {
            let _ = workflow.delete_item(&id).await;
        }
        ShellCommand::Status => {
            let draft = workflow.draft().await;
            println!(
                "New item: '{}'{}",
                draft.title,
                if draft.has_image() { " (image selected)" } else { "" }
            );
            if let Some(session) = workflow.editing().await {
                println!(
                    "Editing {}: '{}'{}",
                    session.id,
                    session.title,
                    if session.replacement_image.is_some() {
                        " (new image selected)"
                    } else {
                        ""
                    }
                );
            }
        }
        ShellCommand::Whoami => match workflow.display_name() {
            Ok(name) => println!("Welcome, {name}"),
            Err(e) => println!("{e}"),
        },
        ShellCommand::SignOut => {
            if let Err(e) = workflow.sign_out().await {
                println!("{e}");
            }
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse("  ").unwrap(), None);
        assert_eq!(ShellCommand::parse("ls").unwrap(), Some(ShellCommand::List));
        assert_eq!(
            ShellCommand::parse("title Visit  Japan ").unwrap(),
            Some(ShellCommand::Title("Visit  Japan".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("add").unwrap(),
            Some(ShellCommand::Add(None))
        );
        assert_eq!(
            ShellCommand::parse("image none").unwrap(),
            Some(ShellCommand::Image(None))
        );
        assert_eq!(
            ShellCommand::parse("image pics/shoes.png").unwrap(),
            Some(ShellCommand::Image(Some(PathBuf::from("pics/shoes.png"))))
        );
        assert_eq!(
            ShellCommand::parse("rm abc").unwrap(),
            Some(ShellCommand::Delete("abc".parse().unwrap()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(ShellCommand::parse("edit").is_err());
        assert!(ShellCommand::parse("image").is_err());
        assert!(ShellCommand::parse("frobnicate").is_err());
    }
}
