use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use todo_core::{GroupMode, Tab};

/// Manage your tasks from the terminal
#[derive(Debug, Parser)]
#[command(name = "todo", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Server URL (overrides config file and TODO_SERVER_URL)
    #[arg(short, long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Path to a config file (default: <config dir>/todo-cli/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new account
    Register(CredentialArgs),
    /// Log in and store the access token
    Login(CredentialArgs),
    /// Forget the stored access token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List and edit tasks
    #[command(subcommand)]
    Tasks(TaskCommand),
    /// List and edit categories
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Edit the checklist of a task
    #[command(subcommand)]
    Subtasks(SubtaskCommand),
    /// Show completion statistics
    Stats,
}

#[derive(Debug, Args)]
pub struct CredentialArgs {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    pub email: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Show tasks grouped by category or due date
    List(ListArgs),
    /// Create a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_name = "ID")]
        category: Option<i64>,
        /// Due date as YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
    },
    /// Change fields of a task; unspecified fields keep their value
    Edit {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_name = "ID", conflicts_with = "no_category")]
        category: Option<i64>,
        /// Remove the category
        #[arg(long)]
        no_category: bool,
        #[arg(long, value_parser = parse_date, conflicts_with = "no_due")]
        due: Option<NaiveDate>,
        /// Remove the due date
        #[arg(long)]
        no_due: bool,
    },
    /// Flip a task between pending and completed
    Toggle { id: i64 },
    /// Delete a task
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, value_enum, default_value_t = TabArg::Active)]
    pub tab: TabArg,

    /// Only show tasks of this category
    #[arg(long, value_name = "ID")]
    pub category: Option<i64>,

    /// Only show tasks due on this day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = GroupArg::Category)]
    pub group: GroupArg,
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    List,
    Add {
        name: String,
        /// Hex color such as #3B82F6
        #[arg(long)]
        color: Option<String>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum SubtaskCommand {
    Add { task_id: i64, title: String },
    Toggle { id: i64 },
    Rename { id: i64, title: String },
    Delete { id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TabArg {
    Active,
    Completed,
}

impl From<TabArg> for Tab {
    fn from(arg: TabArg) -> Self {
        match arg {
            TabArg::Active => Tab::Active,
            TabArg::Completed => Tab::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupArg {
    Category,
    Date,
    None,
}

impl From<GroupArg> for GroupMode {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::Category => GroupMode::Category,
            GroupArg::Date => GroupMode::Date,
            GroupArg::None => GroupMode::None,
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_filters() {
        let cli = Cli::try_parse_from([
            "todo",
            "--server",
            "http://api.local",
            "tasks",
            "list",
            "--tab",
            "completed",
            "--date",
            "2024-03-10",
            "--group",
            "date",
        ])
        .unwrap();

        assert_eq!(cli.server.as_deref(), Some("http://api.local"));
        match cli.command {
            Command::Tasks(TaskCommand::List(args)) => {
                assert_eq!(Tab::from(args.tab), Tab::Completed);
                assert_eq!(GroupMode::from(args.group), GroupMode::Date);
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 3, 10));
                assert_eq!(args.category, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_malformed_date() {
        let result = Cli::try_parse_from(["todo", "tasks", "add", "Pagar", "--due", "10/03/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_conflicting_flags() {
        let result =
            Cli::try_parse_from(["todo", "tasks", "edit", "3", "--category", "2", "--no-category"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["todo", "logout", "--config", "/tmp/todo.toml"]).unwrap();
        assert!(matches!(cli.command, Command::Logout));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/todo.toml")));
    }
}
