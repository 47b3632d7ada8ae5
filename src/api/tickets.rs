use super::{AppState, Authenticated};
use crate::core::{Status, Ticket, TicketId};
use crate::embed::EmbedView;
use crate::error::{Result, TicketDeskError};
use crate::service::{NewTicket, TicketService, TicketUpdate};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;

type Body<T> = std::result::Result<Json<T>, JsonRejection>;

fn body<T>(payload: Body<T>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| TicketDeskError::InvalidInput(e.body_text()))
}

/// Run a service call on the blocking pool
///
/// A file-backed store writes its snapshot inside the call, and readers wait
/// on the store lock while it does.
async fn with_service<T, F>(state: &AppState, call: F) -> Result<Json<T>>
where
    F: FnOnce(&TicketService) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let tickets = state.tickets.clone();
    tokio::task::spawn_blocking(move || call(&tickets).map(Json))
        .await
        .map_err(|e| TicketDeskError::custom(format!("Ticket task failed: {e}")))?
}

fn ticket_id(raw: &str) -> Result<TicketId> {
    TicketId::parse_str(raw)
        .map_err(|_| TicketDeskError::InvalidInput(format!("Invalid ticket id: {raw}")))
}

/// `?status=` on list routes
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

impl ListQuery {
    fn status(query: std::result::Result<Query<Self>, QueryRejection>) -> Result<Option<Status>> {
        let Query(query) = query.map_err(|e| TicketDeskError::InvalidInput(e.body_text()))?;
        query.status.as_deref().map(str::parse).transpose()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTicketRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub resolution_notes: Option<String>,
}

impl TryFrom<UpdateTicketRequest> for TicketUpdate {
    type Error = TicketDeskError;

    fn try_from(request: UpdateTicketRequest) -> Result<Self> {
        Ok(Self {
            status: request.status.as_deref().map(str::parse).transpose()?,
            resolution_notes: request.resolution_notes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub agent_id: String,
}

/// `POST /tickets`
pub async fn create_ticket(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    payload: Body<NewTicket>,
) -> Result<Json<Ticket>> {
    let request = body(payload)?;
    with_service(&state, move |tickets| tickets.create_ticket(&principal, request)).await
}

/// `GET /tickets/my`
pub async fn list_own_tickets(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Ticket>>> {
    let status = ListQuery::status(query)?;
    with_service(&state, move |tickets| tickets.list_own_tickets(&principal, status)).await
}

/// `GET /tickets`
pub async fn list_ticket_queue(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Ticket>>> {
    let status = ListQuery::status(query)?;
    with_service(&state, move |tickets| tickets.list_ticket_queue(&principal, status)).await
}

/// `GET /tickets/{id}`
pub async fn get_ticket(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Ticket>> {
    let id = ticket_id(&id)?;
    with_service(&state, move |tickets| tickets.get_ticket(&principal, &id)).await
}

/// `PATCH /tickets/{id}`
pub async fn update_ticket(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    payload: Body<UpdateTicketRequest>,
) -> Result<Json<Ticket>> {
    let id = ticket_id(&id)?;
    let update = TicketUpdate::try_from(body(payload)?)?;
    with_service(&state, move |tickets| {
        tickets.update_ticket(&principal, &id, update)
    })
    .await
}

/// `PATCH /tickets/{id}/assign`
pub async fn assign_ticket(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    payload: Body<AssignRequest>,
) -> Result<Json<Ticket>> {
    let id = ticket_id(&id)?;
    let request = body(payload)?;
    with_service(&state, move |tickets| {
        tickets.assign_ticket(&principal, &id, &request.agent_id)
    })
    .await
}

/// `GET /tickets/embed/{token}`, no authentication
pub async fn embed_view(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<EmbedView>> {
    with_service(&state, move |tickets| tickets.embed_view(&token)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_parses_status() {
        let request: UpdateTicketRequest =
            serde_json::from_str(r#"{"status": "in_progress"}"#).unwrap();
        let update = TicketUpdate::try_from(request).unwrap();
        assert_eq!(update.status, Some(Status::InProgress));
        assert!(update.resolution_notes.is_none());
    }

    #[test]
    fn test_update_request_rejects_unknown_status() {
        let request: UpdateTicketRequest =
            serde_json::from_str(r#"{"status": "Escalated"}"#).unwrap();
        assert!(matches!(
            TicketUpdate::try_from(request),
            Err(TicketDeskError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_update_request_rejects_extra_fields() {
        let result = serde_json::from_str::<UpdateTicketRequest>(r#"{"agent_id": "bob"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_ticket_id() {
        assert!(ticket_id("not-a-uuid").is_err());
        let id = TicketId::new();
        assert_eq!(ticket_id(&id.to_string()).unwrap(), id);
    }
}
