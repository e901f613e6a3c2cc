use crate::models::OrderStatus;

/// Who is asking for a status change. Determines which legal transitions
/// are permitted on top of the transition table itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Buyer,
    Seller,
    Admin,
    /// The payment webhook and other internal callers.
    System,
}

/// Allowed predecessor states per target status. `Pending` is never a
/// target: orders are born pending and never return there.
pub fn allowed_predecessors(target: OrderStatus) -> &'static [OrderStatus] {
    match target {
        OrderStatus::Pending => &[],
        OrderStatus::Paid => &[OrderStatus::Pending],
        OrderStatus::Processing => &[OrderStatus::Paid],
        OrderStatus::Shipped => &[OrderStatus::Processing],
        OrderStatus::Delivered => &[OrderStatus::Shipped],
        OrderStatus::Cancelled => &[
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Processing,
            OrderStatus::Shipped,
        ],
    }
}

/// Check a transition against the table.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), LifecycleError> {
    if allowed_predecessors(to).contains(&from) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition { from, to })
    }
}

/// Check both the table and the actor's rights over the transition.
///
/// Buyers may cancel an order that hasn't been paid. Sellers advance
/// fulfillment on their own orders and may cancel before shipment. Payment
/// confirmation (`Paid`) belongs to the system. Admins may perform any
/// transition the table allows.
pub fn authorize_transition(
    actor: Actor,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<(), LifecycleError> {
    validate_transition(from, to)?;

    let permitted = match actor {
        Actor::Admin => true,
        Actor::System => to == OrderStatus::Paid || to == OrderStatus::Cancelled,
        Actor::Buyer => to == OrderStatus::Cancelled && from == OrderStatus::Pending,
        Actor::Seller => match to {
            OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Delivered => true,
            OrderStatus::Cancelled => from != OrderStatus::Shipped,
            _ => false,
        },
    };

    if permitted {
        Ok(())
    } else {
        Err(LifecycleError::NotPermitted { actor, to })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("{actor:?} is not permitted to set status {to:?}")]
    NotPermitted { actor: Actor, to: OrderStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ];
        for pair in path.windows(2) {
            validate_transition(pair[0], pair[1]).unwrap();
        }
    }

    #[test]
    fn test_cancel_from_any_non_terminal_state() {
        for from in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Processing,
            OrderStatus::Shipped,
        ] {
            validate_transition(from, OrderStatus::Cancelled).unwrap();
        }
    }

    #[test]
    fn test_terminal_states_are_dead_ends() {
        for from in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(from.is_terminal());
            for to in [
                OrderStatus::Pending,
                OrderStatus::Paid,
                OrderStatus::Processing,
                OrderStatus::Shipped,
                OrderStatus::Delivered,
                OrderStatus::Cancelled,
            ] {
                assert!(
                    validate_transition(from, to).is_err(),
                    "{:?} -> {:?} should be rejected",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_illegal_jumps_rejected() {
        assert!(validate_transition(OrderStatus::Pending, OrderStatus::Shipped).is_err());
        assert!(validate_transition(OrderStatus::Paid, OrderStatus::Delivered).is_err());
        assert!(validate_transition(OrderStatus::Delivered, OrderStatus::Pending).is_err());
    }

    #[test]
    fn test_buyer_may_only_cancel_pending() {
        authorize_transition(Actor::Buyer, OrderStatus::Pending, OrderStatus::Cancelled).unwrap();
        assert!(matches!(
            authorize_transition(Actor::Buyer, OrderStatus::Paid, OrderStatus::Cancelled),
            Err(LifecycleError::NotPermitted { .. })
        ));
        assert!(
            authorize_transition(Actor::Buyer, OrderStatus::Paid, OrderStatus::Processing).is_err()
        );
    }

    #[test]
    fn test_seller_advances_fulfillment() {
        authorize_transition(Actor::Seller, OrderStatus::Paid, OrderStatus::Processing).unwrap();
        authorize_transition(Actor::Seller, OrderStatus::Processing, OrderStatus::Shipped).unwrap();
        authorize_transition(Actor::Seller, OrderStatus::Shipped, OrderStatus::Delivered).unwrap();
        // Payment confirmation is not a seller operation.
        assert!(
            authorize_transition(Actor::Seller, OrderStatus::Pending, OrderStatus::Paid).is_err()
        );
        // No cancelling an order that already shipped.
        assert!(matches!(
            authorize_transition(Actor::Seller, OrderStatus::Shipped, OrderStatus::Cancelled),
            Err(LifecycleError::NotPermitted { .. })
        ));
    }

    #[test]
    fn test_system_confirms_payment() {
        authorize_transition(Actor::System, OrderStatus::Pending, OrderStatus::Paid).unwrap();
        assert!(
            authorize_transition(Actor::System, OrderStatus::Paid, OrderStatus::Shipped).is_err()
        );
    }
}
