// ABOUTME: Human-readable lines for stores, jobs, and events.
// ABOUTME: JSON output serializes the records directly instead.

use storefleet::model::{Event, Job, Store};
use storefleet::repo::StorePage;

pub fn store_lines(store: &Store, job: Option<&Job>) -> Vec<String> {
    let mut lines = vec![format!("{} {} [{}]", store.name, store.id, store.status)];

    if let Some(message) = &store.status_message {
        lines.push(format!("  message:  {message}"));
    }
    lines.push(format!("  engine:   {} ({})", store.engine, store.plan));
    if let Some(title) = &store.display_name {
        lines.push(format!("  title:    {title}"));
    }
    if let Some(namespace) = &store.namespace {
        lines.push(format!("  namespace: {namespace}"));
    }
    if let Some(url) = &store.url {
        lines.push(format!("  url:      {url}"));
    }
    if let Some(admin) = &store.admin_url {
        lines.push(format!("  admin:    {admin}"));
    }
    if let (Some(user), Some(secret)) = (&store.admin_username, &store.admin_password_secret) {
        lines.push(format!("  login:    {user} (password in secret {secret})"));
    }
    if let Some(job) = job {
        lines.push(job_line(job));
    }
    lines
}

pub fn job_line(job: &Job) -> String {
    let mut line = format!(
        "  job:      {} {} {}%",
        job.job_type, job.status, job.progress
    );
    if let Some(step) = &job.current_step {
        line.push_str(&format!(" - {step}"));
    }
    if let Some(error) = &job.error {
        line.push_str(&format!(" ({error})"));
    }
    line
}

pub fn page_lines(page: &StorePage) -> Vec<String> {
    let mut lines = vec![format!(
        "{} of {} store(s), page {}",
        page.stores.len(),
        page.total,
        page.page
    )];
    lines.extend(page.stores.iter().map(|s| {
        format!(
            "{:<36}  {:<24} {:<12} {}",
            s.id.as_str(),
            s.name.as_str(),
            s.status.as_str(),
            s.engine
        )
    }));
    lines
}

pub fn event_lines(events: &[Event]) -> Vec<String> {
    if events.is_empty() {
        return vec!["no events recorded".to_string()];
    }
    events
        .iter()
        .map(|e| {
            format!(
                "{}  {:<24} {}",
                e.created_at.format("%Y-%m-%d %H:%M:%S"),
                e.event_type.as_str(),
                e.message
            )
        })
        .collect()
}
