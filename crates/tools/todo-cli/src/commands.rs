use crate::cli::{
    CategoryCommand, Cli, Command, CredentialArgs, ListArgs, SubtaskCommand, TaskCommand,
};
use crate::config::Settings;
use crate::render;
use anyhow::{Context, Result, anyhow, bail};
use dialoguer::Input;
use todo_client::{ApiClient, ClientError, ClientResult, TaskBoard, TodoApp};
use todo_core::{
    CategoryDraft, CategoryId, Credentials, Selection, SubtaskId, TaskDraft, TaskId,
    compute_stats,
};
use todo_session::FileSessionStore;
use tracing::debug;

type App = TodoApp<FileSessionStore>;

pub async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?.with_server_override(cli.server);
    debug!(server = %settings.server_url, "Using server");

    let store = FileSessionStore::at_default_location()
        .context("Failed to locate the session file")?;
    let api = ApiClient::new(settings.client_config()).context("Invalid server configuration")?;
    let mut app = TodoApp::new(api, store);

    match cli.command {
        Command::Register(args) => register(&mut app, args).await,
        Command::Login(args) => login(&mut app, args).await,
        Command::Logout => {
            app.logout();
            render::success("Logged out");
            Ok(())
        }
        Command::Whoami => {
            require_session(&mut app)?;
            let user = app.current_user().await.map_err(explain)?;
            println!("{} (#{})", user.email, user.id);
            Ok(())
        }
        Command::Tasks(command) => tasks(&mut app, command, &settings).await,
        Command::Categories(command) => categories(&mut app, command).await,
        Command::Subtasks(command) => subtasks(&mut app, command).await,
        Command::Stats => {
            let board = loaded_board(&mut app).await?;
            render::stats(&compute_stats(&board.snapshot().await.tasks));
            Ok(())
        }
    }
}

async fn register(app: &mut App, args: CredentialArgs) -> Result<()> {
    let email = prompt_email(args.email)?;
    let password = match args.password {
        Some(password) => password,
        None => {
            let password =
                rpassword::prompt_password("Password: ").context("Failed to read password")?;
            let confirm = rpassword::prompt_password("Confirm password: ")
                .context("Failed to read password confirmation")?;
            if password != confirm {
                bail!("Passwords do not match");
            }
            password
        }
    };

    app.switch_to_register()?;
    if let Err(e) = app.register(&Credentials::new(email.clone(), password)).await {
        let message = app.message().unwrap_or("Registration failed").to_string();
        return Err(anyhow::Error::new(e).context(message));
    }

    render::success(format!("Registered {email}"));
    println!("You can now log in with: todo login --email {email}");
    Ok(())
}

async fn login(app: &mut App, args: CredentialArgs) -> Result<()> {
    let email = prompt_email(args.email)?;
    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    if let Err(e) = app.login(&Credentials::new(email.clone(), password)).await {
        let message = app.message().unwrap_or("Login failed").to_string();
        return Err(anyhow::Error::new(e).context(message));
    }

    render::success(format!("Logged in as {email}"));
    if let Some(message) = match app.board() {
        Some(board) => board.message().await,
        None => None,
    } {
        eprintln!("{}", console::style(message).yellow());
    }
    Ok(())
}

async fn tasks(app: &mut App, command: TaskCommand, settings: &Settings) -> Result<()> {
    let board = loaded_board(app).await?;

    match command {
        TaskCommand::List(ListArgs {
            tab,
            category,
            date,
            group,
        }) => {
            let selection = Selection {
                tab: tab.into(),
                category: category.map(CategoryId),
                date,
                group_mode: group.into(),
            };
            board.set_selection(selection.clone()).await;
            board
                .with_view(&settings.labels, |view| {
                    render::task_view(view, selection.tab, &settings.labels)
                })
                .await;
        }
        TaskCommand::Add {
            title,
            description,
            category,
            due,
        } => {
            let mut draft = TaskDraft::new(title)
                .with_category(category.map(CategoryId))
                .with_due_date(due);
            draft.description = description;

            let ack = checked(board, board.create_task(draft).await).await?;
            match ack.id {
                Some(id) => render::success(format!("Created task #{id}")),
                None => render::success("Created task"),
            }
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            category,
            no_category,
            due,
            no_due,
        } => {
            let id = TaskId(id);
            let mut draft = match board.snapshot().await.task(id) {
                Some(task) => TaskDraft::from_task(task),
                None => bail!("Task {id} not found"),
            };
            if let Some(title) = title {
                draft.title = title;
            }
            if description.is_some() {
                draft.description = description;
            }
            if no_category {
                draft.category_id = None;
            } else if let Some(category) = category {
                draft.category_id = Some(CategoryId(category));
            }
            if no_due {
                draft.due_date = None;
            } else if due.is_some() {
                draft.due_date = due;
            }

            checked(board, board.update_task(id, draft).await).await?;
            render::success(format!("Updated task #{id}"));
        }
        TaskCommand::Toggle { id } => {
            let id = TaskId(id);
            checked(board, board.toggle_task(id).await).await?;
            let snapshot = board.snapshot().await;
            match snapshot.task(id) {
                Some(task) => println!("{}", render::task_line(task, &settings.labels)),
                None => render::success(format!("Toggled task #{id}")),
            }
        }
        TaskCommand::Delete { id } => {
            checked(board, board.delete_task(TaskId(id)).await).await?;
            render::success(format!("Deleted task #{id}"));
        }
    }
    Ok(())
}

async fn categories(app: &mut App, command: CategoryCommand) -> Result<()> {
    let board = loaded_board(app).await?;

    match command {
        CategoryCommand::List => render::categories(&board.snapshot().await.categories),
        CategoryCommand::Add { name, color } => {
            let ack = checked(board, board.create_category(CategoryDraft::new(name, color)).await)
                .await?;
            match ack.id {
                Some(id) => render::success(format!("Created category #{id}")),
                None => render::success("Created category"),
            }
        }
        CategoryCommand::Edit { id, name, color } => {
            let id = CategoryId(id);
            let current = board
                .snapshot()
                .await
                .categories
                .into_iter()
                .find(|category| category.id == id)
                .ok_or_else(|| anyhow!("Category {id} not found"))?;
            let draft = CategoryDraft {
                name: name.unwrap_or(current.name),
                color: color.unwrap_or(current.color),
            };
            checked(board, board.update_category(id, draft).await).await?;
            render::success(format!("Updated category #{id}"));
        }
        CategoryCommand::Delete { id } => {
            checked(board, board.delete_category(CategoryId(id)).await).await?;
            render::success(format!("Deleted category #{id}"));
        }
    }
    Ok(())
}

async fn subtasks(app: &mut App, command: SubtaskCommand) -> Result<()> {
    let board = loaded_board(app).await?;

    match command {
        SubtaskCommand::Add { task_id, title } => {
            checked(board, board.add_subtask(TaskId(task_id), title).await).await?;
            render::success(format!("Added subtask to task #{task_id}"));
        }
        SubtaskCommand::Toggle { id } => {
            checked(board, board.toggle_subtask(SubtaskId(id)).await).await?;
            render::success(format!("Toggled subtask #{id}"));
        }
        SubtaskCommand::Rename { id, title } => {
            checked(board, board.rename_subtask(SubtaskId(id), title).await).await?;
            render::success(format!("Renamed subtask #{id}"));
        }
        SubtaskCommand::Delete { id } => {
            checked(board, board.delete_subtask(SubtaskId(id)).await).await?;
            render::success(format!("Deleted subtask #{id}"));
        }
    }
    Ok(())
}

fn require_session(app: &mut App) -> Result<()> {
    if !app.restore()? {
        bail!("Not logged in. Run `todo login` first.");
    }
    Ok(())
}

/// Restore the session and load the current task list.
async fn loaded_board(app: &mut App) -> Result<&TaskBoard<ApiClient>> {
    require_session(app)?;
    let board = app
        .board()
        .context("No task board after restoring the session")?;
    checked(board, board.refresh().await).await?;
    Ok(board)
}

/// Attach the board's inline message to a failed action, or warn with it after one that
/// succeeded but could not reload the list.
async fn checked<T>(board: &TaskBoard<ApiClient>, result: ClientResult<T>) -> Result<T> {
    match result {
        Ok(value) => {
            if let Some(message) = board.message().await {
                eprintln!("{}", console::style(message).yellow());
            }
            Ok(value)
        }
        Err(e) => {
            let message = board.message().await.unwrap_or_else(|| e.user_message());
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

fn explain(error: ClientError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

fn prompt_email(email: Option<String>) -> Result<String> {
    match email {
        Some(email) => Ok(email),
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email"),
    }
}
