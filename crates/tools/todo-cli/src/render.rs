use console::style;
use todo_core::{Category, GroupLabels, Tab, Task, TaskStats, TaskView, format_date};

pub fn task_view(view: &TaskView<'_>, tab: Tab, labels: &GroupLabels) {
    let (active, completed) = match tab {
        Tab::Active => (
            style(format!("Active ({})", view.active_count)).bold().underlined(),
            style(format!("Completed ({})", view.completed_count)).dim(),
        ),
        Tab::Completed => (
            style(format!("Active ({})", view.active_count)).dim(),
            style(format!("Completed ({})", view.completed_count))
                .bold()
                .underlined(),
        ),
    };
    println!("{}  {}", active, completed);
    println!();

    if view.is_empty() {
        println!("{}", style("No tasks here.").dim());
    }

    for group in &view.groups {
        if !group.label.is_empty() {
            println!(
                "{} {}",
                style(&group.label).cyan().bold(),
                style(format!("({})", group.tasks.len())).dim()
            );
        }
        for task in &group.tasks {
            println!("  {}", task_line(task, labels));
        }
        println!();
    }

    stats(&view.stats);
}

pub fn task_line(task: &Task, labels: &GroupLabels) -> String {
    let mark = if task.is_completed() {
        style("[x]").green()
    } else {
        style("[ ]").yellow()
    };

    let mut line = format!("{} {} {}", mark, style(format!("#{}", task.id)).dim(), task.title);

    if let Some(due) = task.due_date {
        line.push_str(&format!(
            " {}",
            style(format!("due {}", format_date(due, &labels.date_format))).magenta()
        ));
    }
    if !task.subtasks.is_empty() {
        line.push_str(&format!(
            " {}",
            style(format!(
                "[{}/{}]",
                task.completed_subtasks(),
                task.subtasks.len()
            ))
            .dim()
        ));
    }
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!("\n      {}", style(description).dim()));
    }
    for subtask in &task.subtasks {
        let mark = if subtask.completed { "x" } else { " " };
        line.push_str(&format!(
            "\n      [{}] {} {}",
            mark,
            style(format!("#{}", subtask.id)).dim(),
            subtask.title
        ));
    }
    line
}

pub fn categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("{}", style("No categories yet.").dim());
        return;
    }
    for category in categories {
        println!(
            "{} {} {}",
            style(format!("#{}", category.id)).dim(),
            style(&category.name).bold(),
            style(&category.color).dim()
        );
    }
}

pub fn stats(stats: &TaskStats) {
    println!(
        "{} {}/{} completed ({}%)",
        style("Progress:").bold(),
        stats.completed,
        stats.total,
        stats.percentage.round()
    );
}

pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green().bold(), message);
}
