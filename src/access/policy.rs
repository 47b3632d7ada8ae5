use crate::auth::{Principal, Role};
use crate::core::Ticket;
use std::fmt;

/// Operations subject to access control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateTicket,
    ReadTicket,
    /// Role-scoped listing
    ListTickets,
    /// `GET /tickets/my`
    ListOwnTickets,
    /// `GET /tickets`
    ListTicketQueue,
    UpdateTicket,
    AssignTicket,
    ReadEmbed,
}

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoPrincipal,
    RoleNotPermitted(Role),
    NotTicketOwner,
    NotAssignedAgent,
    /// Ticket-scoped operation evaluated without a ticket
    TicketRequired,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPrincipal => f.write_str("authentication required"),
            Self::RoleNotPermitted(role) => write!(f, "role '{role}' may not perform this action"),
            Self::NotTicketOwner => f.write_str("ticket belongs to another customer"),
            Self::NotAssignedAgent => f.write_str("ticket is not assigned to you"),
            Self::TicketRequired => f.write_str("no ticket given"),
        }
    }
}

/// Outcome of [`authorize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `principal` may perform `operation` on `ticket`
///
/// Pure and total: anything not explicitly allowed is denied. Embed reads
/// need no principal; possession of the embed token is the credential.
#[must_use]
pub fn authorize(
    operation: Operation,
    principal: Option<&Principal>,
    ticket: Option<&Ticket>,
) -> Decision {
    if operation == Operation::ReadEmbed {
        return Decision::Allow;
    }

    let Some(principal) = principal else {
        return Decision::Deny(DenyReason::NoPrincipal);
    };
    let role = principal.role;

    match (operation, role) {
        (Operation::CreateTicket | Operation::ListOwnTickets, Role::Customer)
        | (Operation::ListTickets, _)
        | (Operation::ListTicketQueue, Role::Agent | Role::Admin)
        | (Operation::AssignTicket, Role::Admin) => Decision::Allow,

        (Operation::ReadTicket, Role::Admin) => Decision::Allow,
        (Operation::ReadTicket, Role::Customer) => {
            ticket_check(ticket, |t| t.is_owned_by(&principal.identity), DenyReason::NotTicketOwner)
        },
        (Operation::ReadTicket | Operation::UpdateTicket, Role::Agent) => ticket_check(
            ticket,
            |t| t.is_assigned_to(&principal.identity),
            DenyReason::NotAssignedAgent,
        ),

        _ => Decision::Deny(DenyReason::RoleNotPermitted(role)),
    }
}

fn ticket_check(
    ticket: Option<&Ticket>,
    check: impl Fn(&Ticket) -> bool,
    reason: DenyReason,
) -> Decision {
    match ticket {
        Some(t) if check(t) => Decision::Allow,
        Some(_) => Decision::Deny(reason),
        None => Decision::Deny(DenyReason::TicketRequired),
    }
}

/// Which tickets a principal sees when listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    Owner(String),
    Assigned(String),
    All,
}

impl ListScope {
    #[must_use]
    pub fn for_principal(principal: &Principal) -> Self {
        match principal.role {
            Role::Customer => Self::Owner(principal.identity.clone()),
            Role::Agent => Self::Assigned(principal.identity.clone()),
            Role::Admin => Self::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Status, TicketBuilder};

    fn assigned_ticket() -> Ticket {
        TicketBuilder::new()
            .customer("alice")
            .agent("bob")
            .status(Status::InProgress)
            .build()
    }

    #[test]
    fn test_only_customers_create() {
        let op = Operation::CreateTicket;
        assert!(authorize(op, Some(&Principal::customer("alice")), None).is_allowed());
        assert_eq!(
            authorize(op, Some(&Principal::agent("bob")), None),
            Decision::Deny(DenyReason::RoleNotPermitted(Role::Agent))
        );
        assert!(!authorize(op, Some(&Principal::admin("root")), None).is_allowed());
    }

    #[test]
    fn test_read_rules() {
        let ticket = assigned_ticket();
        let op = Operation::ReadTicket;

        assert!(authorize(op, Some(&Principal::customer("alice")), Some(&ticket)).is_allowed());
        assert_eq!(
            authorize(op, Some(&Principal::customer("dave")), Some(&ticket)),
            Decision::Deny(DenyReason::NotTicketOwner)
        );
        assert!(authorize(op, Some(&Principal::agent("bob")), Some(&ticket)).is_allowed());
        assert_eq!(
            authorize(op, Some(&Principal::agent("carol")), Some(&ticket)),
            Decision::Deny(DenyReason::NotAssignedAgent)
        );
        assert!(authorize(op, Some(&Principal::admin("root")), Some(&ticket)).is_allowed());
    }

    #[test]
    fn test_agent_cannot_read_unassigned_ticket() {
        let ticket = TicketBuilder::new().customer("alice").build();
        assert!(
            !authorize(Operation::ReadTicket, Some(&Principal::agent("bob")), Some(&ticket))
                .is_allowed()
        );
    }

    #[test]
    fn test_update_only_by_assigned_agent() {
        let ticket = assigned_ticket();
        let op = Operation::UpdateTicket;

        assert!(authorize(op, Some(&Principal::agent("bob")), Some(&ticket)).is_allowed());
        assert!(!authorize(op, Some(&Principal::agent("carol")), Some(&ticket)).is_allowed());
        assert!(!authorize(op, Some(&Principal::customer("alice")), Some(&ticket)).is_allowed());
        assert!(!authorize(op, Some(&Principal::admin("root")), Some(&ticket)).is_allowed());
    }

    #[test]
    fn test_assign_only_by_admin() {
        let ticket = assigned_ticket();
        let op = Operation::AssignTicket;

        assert!(authorize(op, Some(&Principal::admin("root")), Some(&ticket)).is_allowed());
        assert!(!authorize(op, Some(&Principal::agent("bob")), Some(&ticket)).is_allowed());
        assert!(!authorize(op, Some(&Principal::customer("alice")), Some(&ticket)).is_allowed());
    }

    #[test]
    fn test_list_routes() {
        let customer = Principal::customer("alice");
        let agent = Principal::agent("bob");
        let admin = Principal::admin("root");

        for p in [&customer, &agent, &admin] {
            assert!(authorize(Operation::ListTickets, Some(p), None).is_allowed());
        }
        assert!(authorize(Operation::ListOwnTickets, Some(&customer), None).is_allowed());
        assert!(!authorize(Operation::ListOwnTickets, Some(&agent), None).is_allowed());
        assert!(!authorize(Operation::ListTicketQueue, Some(&customer), None).is_allowed());
        assert!(authorize(Operation::ListTicketQueue, Some(&agent), None).is_allowed());
        assert!(authorize(Operation::ListTicketQueue, Some(&admin), None).is_allowed());
    }

    #[test]
    fn test_embed_needs_no_principal() {
        assert!(authorize(Operation::ReadEmbed, None, None).is_allowed());
        assert_eq!(
            authorize(Operation::ReadTicket, None, None),
            Decision::Deny(DenyReason::NoPrincipal)
        );
    }

    #[test]
    fn test_ticket_scoped_without_ticket_is_denied() {
        assert_eq!(
            authorize(Operation::UpdateTicket, Some(&Principal::agent("bob")), None),
            Decision::Deny(DenyReason::TicketRequired)
        );
    }

    #[test]
    fn test_list_scope() {
        assert_eq!(
            ListScope::for_principal(&Principal::customer("alice")),
            ListScope::Owner("alice".to_string())
        );
        assert_eq!(
            ListScope::for_principal(&Principal::agent("bob")),
            ListScope::Assigned("bob".to_string())
        );
        assert_eq!(ListScope::for_principal(&Principal::admin("root")), ListScope::All);
    }
}
