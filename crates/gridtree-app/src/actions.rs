//! Action handlers: spawn the fetches requested by the update function
//!
//! Each action runs on its own tokio task and reports back with a
//! [`Message`]. Tasks hold no state; a result is applied only if its slot
//! still expects it (see the ticket check in the registry).

use std::sync::Arc;

use tokio::sync::mpsc;

use gridtree_core::prelude::*;
use gridtree_remote::{TableLoader, Transport};

use crate::handler::UpdateAction;
use crate::message::Message;
use crate::registry::LoadFailure;

/// Execute an action by spawning a background task
pub fn handle_action<T>(action: UpdateAction, msg_tx: mpsc::Sender<Message>, loader: Arc<TableLoader<T>>)
where
    T: Transport + Sync + 'static,
{
    match action {
        UpdateAction::LoadRoot { endpoint, ticket } => {
            tokio::spawn(async move {
                let msg = match loader.load_root(&endpoint).await {
                    Ok(response) => Message::RootLoaded {
                        ticket,
                        endpoint,
                        response: Box::new(response),
                    },
                    Err(e) => Message::RootLoadFailed {
                        ticket,
                        endpoint,
                        error: LoadFailure::from(&e),
                    },
                };
                send(&msg_tx, msg).await;
            });
        }

        UpdateAction::LoadChild {
            slot,
            ticket,
            node,
            parent,
        } => {
            tokio::spawn(async move {
                let msg = match loader.load_child(&slot.table, &node, &parent).await {
                    Ok(response) => Message::ChildLoaded {
                        slot,
                        ticket,
                        response: Box::new(response),
                    },
                    Err(e) => Message::ChildLoadFailed {
                        slot,
                        ticket,
                        error: LoadFailure::from(&e),
                    },
                };
                send(&msg_tx, msg).await;
            });
        }

        UpdateAction::DeleteRow {
            grid,
            record_id,
            base_path,
        } => {
            tokio::spawn(async move {
                let msg = match loader.delete_row(&record_id, &base_path).await {
                    Ok(_) => Message::RowDeleted { grid, record_id },
                    Err(e) => Message::DeleteFailed {
                        grid,
                        record_id,
                        error: LoadFailure::from(&e),
                    },
                };
                send(&msg_tx, msg).await;
            });
        }
    }
}

async fn send(msg_tx: &mpsc::Sender<Message>, msg: Message) {
    if msg_tx.send(msg).await.is_err() {
        debug!("Message channel closed; dropping fetch result");
    }
}
