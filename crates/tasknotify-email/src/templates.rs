//! Email bodies for task notifications.

use tasknotify_protocols::{Task, User};

/// A rendered message: subject plus plain-text and HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Someone assigned `task` to `assignee`.
pub fn task_assignment(task: &Task, assignee: &User, actor: &User, app_url: &str) -> EmailContent {
    let link = task_link(app_url, task);
    let subject = format!("New task assigned: {}", task.title);

    let mut text = format!(
        "Hi {},\n\n{} assigned you a new task: {}\n",
        assignee.name, actor.name, task.title
    );
    let mut details = Vec::new();
    if let Some(description) = &task.description {
        text.push_str(&format!("\n{}\n", description));
    }
    if let Some(priority) = task.priority {
        let priority = format!("{:?}", priority);
        text.push_str(&format!("\nPriority: {}", priority));
        details.push(("Priority", priority));
    }
    if let Some(due) = task.due_date {
        let due = due.format("%Y-%m-%d").to_string();
        text.push_str(&format!("\nDue: {}", due));
        details.push(("Due", due));
    }
    text.push_str(&format!("\n\nView task: {}\n", link));

    let mut body = format!(
        "<p>Hi {},</p>\n<p><strong>{}</strong> assigned you a new task: <strong>{}</strong></p>\n",
        escape_html(&assignee.name),
        escape_html(&actor.name),
        escape_html(&task.title)
    );
    if let Some(description) = &task.description {
        body.push_str(&format!("<p>{}</p>\n", escape_html(description)));
    }
    body.push_str(&details_list(&details));

    EmailContent {
        subject,
        text,
        html: layout(&body, &link),
    }
}

/// `actor` changed `task`; `changes` lists what changed, one entry per field.
pub fn task_update(
    task: &Task,
    recipient: &User,
    actor: &User,
    changes: &[String],
    app_url: &str,
) -> EmailContent {
    let link = task_link(app_url, task);
    let subject = format!("Task updated: {}", task.title);

    let mut text = format!(
        "Hi {},\n\n{} updated the task: {}\n",
        recipient.name, actor.name, task.title
    );
    for change in changes {
        text.push_str(&format!("\n- {}", change));
    }
    text.push_str(&format!("\n\nStatus: {}", task.status.label()));
    text.push_str(&format!("\n\nView task: {}\n", link));

    let mut body = format!(
        "<p>Hi {},</p>\n<p><strong>{}</strong> updated the task <strong>{}</strong></p>\n",
        escape_html(&recipient.name),
        escape_html(&actor.name),
        escape_html(&task.title)
    );
    if !changes.is_empty() {
        body.push_str("<ul>\n");
        for change in changes {
            body.push_str(&format!("<li>{}</li>\n", escape_html(change)));
        }
        body.push_str("</ul>\n");
    }
    body.push_str(&details_list(&[("Status", task.status.label().to_string())]));

    EmailContent {
        subject,
        text,
        html: layout(&body, &link),
    }
}

/// `actor` marked `task` as done.
pub fn task_completion(task: &Task, recipient: &User, actor: &User, app_url: &str) -> EmailContent {
    let link = task_link(app_url, task);
    let subject = format!("Task completed: {}", task.title);

    let text = format!(
        "Hi {},\n\n{} completed the task: {}\n\nView task: {}\n",
        recipient.name, actor.name, task.title, link
    );
    let body = format!(
        "<p>Hi {},</p>\n<p><strong>{}</strong> completed the task <strong>{}</strong></p>\n",
        escape_html(&recipient.name),
        escape_html(&actor.name),
        escape_html(&task.title)
    );

    EmailContent {
        subject,
        text,
        html: layout(&body, &link),
    }
}

fn task_link(app_url: &str, task: &Task) -> String {
    format!("{}/tasks/{}", app_url.trim_end_matches('/'), task.id)
}

fn details_list(details: &[(&str, String)]) -> String {
    if details.is_empty() {
        return String::new();
    }
    let mut out = String::from("<table>\n");
    for (label, value) in details {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            label,
            escape_html(value)
        ));
    }
    out.push_str("</table>\n");
    out
}

fn layout(body: &str, link: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n<html>\n<body style=\"font-family: sans-serif;\">\n",
            "{}<p><a href=\"{}\">View task</a></p>\n",
            "</body>\n</html>\n",
        ),
        body,
        escape_html(link)
    )
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
