//! Support desk: tickets owned by a user, with threaded messages.
//!
//! Tickets are visible to their owner and to staff. Messages are readable by
//! any authenticated caller; who may edit them depends on
//! [`AccessPolicy`] configuration.
use std::collections::HashMap;

use chrono::Utc;
use models::errors::FieldErrors;
use models::support_message;
use models::support_ticket::{self, TicketStatus};
use models::validate;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{self, AccessPolicy, Caller, Operation, Resource};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketPayload {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
}

impl TicketPayload {
    fn validate(&self, partial: bool) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        if !partial {
            validate::required(&mut errs, "subject", self.subject.as_deref());
            validate::required(&mut errs, "description", self.description.as_deref());
        } else {
            validate::not_blank(&mut errs, "subject", self.subject.as_deref());
            validate::not_blank(&mut errs, "description", self.description.as_deref());
        }
        support_ticket::validate_fields(&mut errs, self.subject.as_deref());
        Ok(errs.into_result()?)
    }
}

/// Ticket with its messages, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: support_ticket::Model,
    pub messages: Vec<support_message::Model>,
}

impl TicketView {
    fn new(ticket: support_ticket::Model, mut messages: Vec<support_message::Model>) -> Self {
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Self { ticket, messages }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePayload {
    pub ticket: Option<Uuid>,
    pub message: Option<String>,
}

impl MessagePayload {
    async fn validate(&self, db: &DatabaseConnection, partial: bool) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        if !partial {
            validate::required_value(&mut errs, "ticket", &self.ticket);
            validate::required(&mut errs, "message", self.message.as_deref());
        } else {
            validate::not_blank(&mut errs, "message", self.message.as_deref());
        }
        if let Some(tid) = self.ticket {
            if support_ticket::Entity::find_by_id(tid).one(db).await?.is_none() {
                errs.add("ticket", format!("Invalid pk \"{tid}\" - object does not exist."));
            }
        }
        Ok(errs.into_result()?)
    }
}

async fn with_messages(
    db: &DatabaseConnection,
    tickets: Vec<support_ticket::Model>,
) -> Result<Vec<TicketView>, ServiceError> {
    if tickets.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = tickets.iter().map(|t| t.id).collect();
    let messages = support_message::Entity::find()
        .filter(support_message::Column::TicketId.is_in(ids))
        .all(db)
        .await?;
    let mut by_ticket: HashMap<Uuid, Vec<support_message::Model>> = HashMap::new();
    for m in messages {
        by_ticket.entry(m.ticket_id).or_default().push(m);
    }
    Ok(tickets
        .into_iter()
        .map(|t| {
            let own = by_ticket.remove(&t.id).unwrap_or_default();
            TicketView::new(t, own)
        })
        .collect())
}

async fn load_ticket(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
    op: Operation,
) -> Result<support_ticket::Model, ServiceError> {
    access::require(caller)?;
    let found = support_ticket::Entity::find_by_id(id).one(db).await?;
    policy
        .check(caller, Resource::SupportTicket, op, found.as_ref().map(|t| t.user_id))
        .into_result("ticket")?;
    found.ok_or_else(|| ServiceError::not_found("ticket"))
}

#[instrument(skip_all)]
pub async fn list_tickets(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
) -> Result<Vec<TicketView>, ServiceError> {
    let scope = policy
        .scope(caller, Resource::SupportTicket, Operation::Read)
        .ok_or(ServiceError::Unauthenticated)?;
    let mut q = support_ticket::Entity::find();
    if let Some(owner) = scope.owner_filter() {
        q = q.filter(support_ticket::Column::UserId.eq(owner));
    }
    let tickets = q.order_by_asc(support_ticket::Column::CreatedAt).all(db).await?;
    with_messages(db, tickets).await
}

/// Caller's own tickets, regardless of role.
#[instrument(skip_all)]
pub async fn my_tickets(db: &DatabaseConnection, caller: Option<&Caller>) -> Result<Vec<TicketView>, ServiceError> {
    let caller = access::require(caller)?;
    let tickets = support_ticket::Entity::find()
        .filter(support_ticket::Column::UserId.eq(caller.id))
        .order_by_asc(support_ticket::Column::CreatedAt)
        .all(db)
        .await?;
    with_messages(db, tickets).await
}

pub async fn get_ticket(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
) -> Result<TicketView, ServiceError> {
    let ticket = load_ticket(db, policy, caller, id, Operation::Read).await?;
    let mut views = with_messages(db, vec![ticket]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("ticket"))
}

#[instrument(skip(db, policy, caller, input))]
pub async fn create_ticket(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    input: TicketPayload,
) -> Result<TicketView, ServiceError> {
    policy.check_create(caller).into_result("ticket")?;
    let caller = access::require(caller)?;
    input.validate(false)?;
    let created = support_ticket::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(caller.id),
        subject: Set(input.subject.unwrap_or_default()),
        description: Set(input.description.unwrap_or_default()),
        status: Set(input.status.unwrap_or_default()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    info!(event = "ticket_created", ticket_id = %created.id, user_id = %caller.id);
    Ok(TicketView::new(created, Vec::new()))
}

#[instrument(skip(db, policy, caller, input))]
pub async fn update_ticket(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
    input: TicketPayload,
    partial: bool,
) -> Result<TicketView, ServiceError> {
    let existing = load_ticket(db, policy, caller, id, Operation::Write).await?;
    input.validate(partial)?;
    let mut am: support_ticket::ActiveModel = existing.clone().into();
    if let Some(v) = input.subject { am.subject = Set(v); }
    if let Some(v) = input.description { am.description = Set(v); }
    if let Some(v) = input.status { am.status = Set(v); }
    let ticket = if am.is_changed() { am.update(db).await? } else { existing };
    info!(event = "ticket_updated", ticket_id = %id, status = ?ticket.status);
    let mut views = with_messages(db, vec![ticket]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("ticket"))
}

/// Deleting a ticket removes its messages.
#[instrument(skip(db, policy, caller))]
pub async fn delete_ticket(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
) -> Result<(), ServiceError> {
    let existing = load_ticket(db, policy, caller, id, Operation::Write).await?;
    support_ticket::Entity::delete_by_id(existing.id).exec(db).await?;
    info!(event = "ticket_deleted", ticket_id = %id);
    Ok(())
}

async fn load_message(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
    op: Operation,
) -> Result<support_message::Model, ServiceError> {
    access::require(caller)?;
    let found = support_message::Entity::find_by_id(id).one(db).await?;
    policy
        .check(caller, Resource::SupportMessage, op, found.as_ref().map(|m| m.sender_id))
        .into_result("message")?;
    found.ok_or_else(|| ServiceError::not_found("message"))
}

#[instrument(skip_all)]
pub async fn list_messages(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
) -> Result<Vec<support_message::Model>, ServiceError> {
    let scope = policy
        .scope(caller, Resource::SupportMessage, Operation::Read)
        .ok_or(ServiceError::Unauthenticated)?;
    let mut q = support_message::Entity::find();
    if let Some(owner) = scope.owner_filter() {
        q = q.filter(support_message::Column::SenderId.eq(owner));
    }
    Ok(q.order_by_asc(support_message::Column::CreatedAt).all(db).await?)
}

pub async fn get_message(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
) -> Result<support_message::Model, ServiceError> {
    load_message(db, policy, caller, id, Operation::Read).await
}

#[instrument(skip(db, policy, caller, input))]
pub async fn create_message(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    input: MessagePayload,
) -> Result<support_message::Model, ServiceError> {
    policy.check_create(caller).into_result("message")?;
    let caller = access::require(caller)?;
    input.validate(db, false).await?;
    let Some(ticket_id) = input.ticket else {
        return Err(ServiceError::invalid("ticket", validate::REQUIRED));
    };
    let created = support_message::ActiveModel {
        id: Set(Uuid::new_v4()),
        ticket_id: Set(ticket_id),
        sender_id: Set(caller.id),
        message: Set(input.message.unwrap_or_default()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    info!(event = "message_created", message_id = %created.id, ticket_id = %ticket_id, sender = %caller.id);
    Ok(created)
}

#[instrument(skip(db, policy, caller, input))]
pub async fn update_message(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
    input: MessagePayload,
    partial: bool,
) -> Result<support_message::Model, ServiceError> {
    let existing = load_message(db, policy, caller, id, Operation::Write).await?;
    input.validate(db, partial).await?;
    let mut am: support_message::ActiveModel = existing.clone().into();
    if let Some(v) = input.ticket { am.ticket_id = Set(v); }
    if let Some(v) = input.message { am.message = Set(v); }
    if !am.is_changed() {
        return Ok(existing);
    }
    let updated = am.update(db).await?;
    info!(event = "message_updated", message_id = %id);
    Ok(updated)
}

#[instrument(skip(db, policy, caller))]
pub async fn delete_message(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
) -> Result<(), ServiceError> {
    let existing = load_message(db, policy, caller, id, Operation::Write).await?;
    support_message::Entity::delete_by_id(existing.id).exec(db).await?;
    info!(event = "message_deleted", message_id = %id);
    Ok(())
}
