//! Message processing
//!
//! Runs the TEA update loop for one incoming message, following chained
//! messages and dispatching every resulting action.

use std::sync::Arc;

use tokio::sync::mpsc;

use gridtree_remote::{TableLoader, Transport};

use crate::actions::handle_action;
use crate::handler;
use crate::message::Message;
use crate::state::AppState;

/// Process a message through the TEA update function
pub fn process_message<T>(
    state: &mut AppState,
    message: Message,
    msg_tx: &mpsc::Sender<Message>,
    loader: &Arc<TableLoader<T>>,
) where
    T: Transport + Sync + 'static,
{
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = handler::update(state, m);

        if let Some(action) = result.action {
            handle_action(action, msg_tx.clone(), Arc::clone(loader));
        }

        msg = result.message;
    }
}
