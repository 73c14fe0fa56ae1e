use std::collections::HashMap;

use crate::dom::NodeId;

/// One wired page behavior. Handlers are data, not closures, so the listener
/// store can compare and clone them the way the script-handler store in a
/// scripted runtime would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Handler {
    FormSubmit { form: NodeId },
    FieldBlur { form: NodeId, field: NodeId },
    PhoneInput { field: NodeId },
    ProductChange,
    SelectAllProducts,
    ClearAllProducts,
    AnchorClick { link: NodeId },
    NavLinkClick { link: NodeId },
    AlertDismiss { alert: NodeId },
    SearchInput { input: NodeId },
    PriceFilterInput,
}

/// Bubble-phase listeners per node and event type, matching how the page
/// registers every one of its handlers.
#[derive(Debug, Default)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Handler>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, handler: Handler) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str) -> Vec<Handler> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub(crate) fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Deferred work scheduled against the page's virtual clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimerTask {
    /// `stash` is the detached holder carrying the link's original children.
    RevertLinkLoading { link: NodeId, stash: NodeId },
    DismissAlert { alert: NodeId },
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) task: TimerTask,
}

/// Read-only view of a queued timer, for tests and embedders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
}
