//! Pure decision logic: what a row asks of the tracker.

use serde::Serialize;

use crate::sheet::RowRecord;
use crate::tracker::{NewTicket, Ticket, TicketState, TicketUpdate};

/// Body text stored on every ticket created or rewritten from a row.
pub fn compose_body(id: &str, priority: &str, description: &str) -> String {
    format!("ID: {}\nPriority: {}\n\n{}", id, priority, description)
}

/// `priority:<lowercased>` for a non-empty priority, nothing otherwise.
pub fn priority_labels(priority: &str) -> Vec<String> {
    if priority.is_empty() {
        Vec::new()
    } else {
        vec![format!("priority:{}", priority.to_lowercase())]
    }
}

/// Row assignee if set, else the default, else nobody.
pub fn resolve_assignee<'a>(
    row: &'a RowRecord,
    default_assignee: Option<&'a str>,
) -> Option<&'a str> {
    row.assignee
        .as_deref()
        .filter(|a| !a.is_empty())
        .or(default_assignee.filter(|a| !a.is_empty()))
}

/// Build the create request for a row that has no ticket yet.
pub fn plan_create(row: &RowRecord, default_assignee: Option<&str>) -> NewTicket {
    NewTicket {
        title: row.title.clone(),
        body: compose_body(&row.id, &row.priority, &row.description),
        labels: priority_labels(&row.priority),
        assignees: resolve_assignee(row, default_assignee)
            .map(|a| vec![a.to_string()])
            .unwrap_or_default(),
    }
}

/// Which field group an update touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    State,
    Content,
    Assignees,
}

/// One remote update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpdate {
    pub kind: UpdateKind,
    pub update: TicketUpdate,
}

/// The updates an existing ticket needs, in the order they are issued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    pub updates: Vec<PlannedUpdate>,
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn kinds(&self) -> Vec<UpdateKind> {
        self.updates.iter().map(|u| u.kind).collect()
    }

    fn push(&mut self, kind: UpdateKind, update: TicketUpdate) {
        self.updates.push(PlannedUpdate { kind, update });
    }
}

/// Compare a row with the ticket it points at and plan the corrective updates.
///
/// - state: closed iff the status is "closed" (any case)
/// - content: title and body rewritten together when the title differs or the
///   body no longer contains the description
/// - assignees: set when the desired login is missing from the ticket, or
///   cleared when nobody is desired but someone is assigned. Extra assignees
///   next to the desired one are left alone.
pub fn plan_update(row: &RowRecord, ticket: &Ticket, default_assignee: Option<&str>) -> UpdatePlan {
    let mut plan = UpdatePlan::default();

    let desired_state = TicketState::from_status(&row.status);
    if ticket.state != desired_state {
        plan.push(UpdateKind::State, TicketUpdate::state(desired_state));
    }

    if ticket.title != row.title || !ticket.body.contains(&row.description) {
        plan.push(
            UpdateKind::Content,
            TicketUpdate::content(
                row.title.clone(),
                compose_body(&row.id, &row.priority, &row.description),
            ),
        );
    }

    let desired_assignee = resolve_assignee(row, default_assignee);
    let needs_assignee_update = match desired_assignee {
        Some(login) => !ticket.assignees.iter().any(|a| a == login),
        None => !ticket.assignees.is_empty(),
    };
    if needs_assignee_update {
        plan.push(
            UpdateKind::Assignees,
            TicketUpdate::assignees(
                desired_assignee
                    .map(|a| vec![a.to_string()])
                    .unwrap_or_default(),
            ),
        );
    }

    plan
}
