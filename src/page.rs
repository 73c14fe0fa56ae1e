use crate::dom::{Dom, NodeId};
use crate::events::{EventState, ListenerStore, PendingTimer, ScheduledTask, TimerTask};
use crate::html::parse_html;
use crate::{Error, Result, wiring};

/// Scroll alignment recorded for a smooth-scroll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
}

/// Name/value payload of a form submission the page committed to natively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

/// A loaded page: the DOM, its wired listeners, a virtual clock with a timer
/// queue, and records of the side effects a browser would externalize
/// (scrolling, navigation, native form submission).
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    task_queue: Vec<ScheduledTask>,
    active_element: Option<NodeId>,
    now_ms: i64,
    next_timer_id: i64,
    next_task_order: i64,
    pub(crate) tooltips: Vec<NodeId>,
    pub(crate) scrolled_to: Option<(NodeId, ScrollBlock)>,
    pub(crate) navigation: Option<String>,
    pub(crate) submission: Option<FormSubmission>,
    trace: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            task_queue: Vec::new(),
            active_element: None,
            now_ms: 0,
            next_timer_id: 1,
            next_task_order: 0,
            tooltips: Vec::new(),
            scrolled_to: None,
            navigation: None,
            submission: None,
            trace: false,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        })
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::PageRuntime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if !self.trace {
            return;
        }
        if self.trace_to_stderr {
            eprintln!("{line}");
        }
        self.trace_logs.push(line);
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
    }

    // ---- queries ------------------------------------------------------

    pub fn query(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.into()))
    }

    pub fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(selector)
    }

    pub fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.dom.query_selector(selector)?.is_some())
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        Ok(self.dom.text_content(self.query(selector)?))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        Ok(self.dom.value(self.query(selector)?))
    }

    pub fn checked(&self, selector: &str) -> Result<bool> {
        Ok(self.dom.checked(self.query(selector)?))
    }

    pub fn is_disabled(&self, selector: &str) -> Result<bool> {
        Ok(self.dom.disabled(self.query(selector)?))
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        Ok(self.dom.has_class(self.query(selector)?, class_name))
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .dom
            .attr(self.query(selector)?, name)
            .map(ToOwned::to_owned))
    }

    pub fn custom_validity(&self, selector: &str) -> Result<String> {
        Ok(self.dom.custom_validity(self.query(selector)?).to_string())
    }

    // ---- interaction records ------------------------------------------

    pub fn scrolled_to(&self) -> Option<(NodeId, ScrollBlock)> {
        self.scrolled_to
    }

    pub fn navigation(&self) -> Option<&str> {
        self.navigation.as_deref()
    }

    pub fn submission(&self) -> Option<&FormSubmission> {
        self.submission.as_ref()
    }

    pub fn tooltip_count(&self) -> usize {
        self.tooltips.len()
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    // ---- user actions -------------------------------------------------

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.query(selector)?;
        self.trace_line(format!("[action] click selector={selector}"));
        self.click_node(target)
    }

    pub(crate) fn click_node(&mut self, target: NodeId) -> Result<()> {
        if self.dom.disabled(target) {
            return Ok(());
        }

        let click_outcome = self.dispatch_event(target, "click")?;
        if click_outcome.default_prevented {
            return Ok(());
        }

        if self.dom.is_checkbox_input(target) {
            let current = self.dom.checked(target);
            self.dom.set_checked(target, !current);
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
            return Ok(());
        }

        if self.dom.is_radio_input(target) {
            if !self.dom.checked(target) {
                self.uncheck_other_radios_in_group(target);
                self.dom.set_checked(target, true);
                self.dispatch_event(target, "input")?;
                self.dispatch_event(target, "change")?;
            }
            return Ok(());
        }

        if self.dom.is_submit_control(target) {
            if let Some(form) = self.dom.closest_tag(target, "form") {
                self.dispatch_submit(form)?;
            }
            return Ok(());
        }

        // Default anchor navigation; bare fragments never leave the page.
        if self
            .dom
            .tag_name(target)
            .map(|tag| tag.eq_ignore_ascii_case("a"))
            .unwrap_or(false)
        {
            if let Some(href) = self.dom.attr(target, "href").map(ToOwned::to_owned) {
                if !href.starts_with('#') && !href.is_empty() {
                    self.navigation = Some(href);
                }
            }
        }

        Ok(())
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.query(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.trace_line(format!("[action] type selector={selector} text={text}"));
        self.dom.set_value(target, text);
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.query(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        if !self.dom.is_checkbox_input(target) && !self.dom.is_radio_input(target) {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "checkbox or radio input".into(),
                actual: self.dom.tag_name(target).unwrap_or("non-element").into(),
            });
        }

        if self.dom.checked(target) == checked {
            return Ok(());
        }
        if checked && self.dom.is_radio_input(target) {
            self.uncheck_other_radios_in_group(target);
        }
        self.trace_line(format!("[action] set_checked selector={selector} checked={checked}"));
        self.dom.set_checked(target, checked);
        self.dispatch_event(target, "input")?;
        self.dispatch_event(target, "change")?;
        Ok(())
    }

    fn uncheck_other_radios_in_group(&mut self, radio: NodeId) {
        let Some(name) = self.dom.attr(radio, "name").map(ToOwned::to_owned) else {
            return;
        };
        let scope = self
            .dom
            .closest_tag(radio, "form")
            .unwrap_or(self.dom.root());
        for other in self.dom.radios_in_group(scope, &name) {
            if other != radio {
                self.dom.set_checked(other, false);
            }
        }
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.query(selector)?;
        self.focus_node(target)
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.query(selector)?;
        self.blur_node(target)
    }

    pub(crate) fn focus_node(&mut self, node: NodeId) -> Result<()> {
        if self.dom.disabled(node) {
            return Ok(());
        }
        if self.active_element == Some(node) {
            return Ok(());
        }
        if let Some(current) = self.active_element {
            self.blur_node(current)?;
        }
        self.active_element = Some(node);
        self.dispatch_event(node, "focus")?;
        Ok(())
    }

    pub(crate) fn blur_node(&mut self, node: NodeId) -> Result<()> {
        if self.active_element != Some(node) {
            return Ok(());
        }
        self.dispatch_event(node, "blur")?;
        self.active_element = None;
        Ok(())
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.query(selector)?;
        let form = if self
            .dom
            .tag_name(target)
            .map(|tag| tag.eq_ignore_ascii_case("form"))
            .unwrap_or(false)
        {
            Some(target)
        } else {
            self.dom.closest_tag(target, "form")
        };
        if let Some(form) = form {
            self.dispatch_submit(form)?;
        }
        Ok(())
    }

    /// Fires the submit event; when no handler prevents it, the submission
    /// proceeds "natively": field data is captured and the page navigates.
    pub(crate) fn dispatch_submit(&mut self, form: NodeId) -> Result<()> {
        let outcome = self.dispatch_event(form, "submit")?;
        if outcome.default_prevented {
            return Ok(());
        }
        let action = self
            .dom
            .attr(form, "action")
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| "/".to_string());
        let fields = self.dom.submission_pairs(form);
        self.trace_line(format!(
            "[action] submit form action={action} fields={}",
            fields.len()
        ));
        self.submission = Some(FormSubmission {
            action: action.clone(),
            fields,
        });
        self.navigation = Some(action);
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.query(selector)?;
        self.dispatch_event(target, event)?;
        Ok(())
    }

    pub(crate) fn dispatch_event(
        &mut self,
        target: NodeId,
        event_type: &str,
    ) -> Result<EventState> {
        let mut event = EventState::new(event_type, target);

        // Target phase, then bubble towards the root.
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            self.invoke_listeners(node, &mut event)?;
            if event.propagation_stopped {
                break;
            }
            cursor = self.dom.parent(node);
        }

        self.trace_line(format!(
            "[event] {} target={} default_prevented={}",
            event_type, event.target.0, event.default_prevented
        ));
        Ok(event)
    }

    fn invoke_listeners(&mut self, node_id: NodeId, event: &mut EventState) -> Result<()> {
        let handlers = self.listeners.get(node_id, &event.event_type);
        for handler in handlers {
            wiring::run_handler(self, handler, event)?;
        }
        Ok(())
    }

    // ---- virtual clock ------------------------------------------------

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn set_timeout(&mut self, task: TimerTask, delay_ms: i64) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        let due_at = self.now_ms.saturating_add(delay_ms.max(0));
        self.trace_line(format!("[timer] schedule id={id} due_at={due_at}"));
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            task,
        });
        id
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != timer_id);
        before != self.task_queue.len()
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::PageRuntime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        self.run_due_timers()?;
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.now_ms {
            return Err(Error::PageRuntime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        self.now_ms = target_ms;
        self.run_due_timers()?;
        Ok(())
    }

    /// Runs every queued timer, advancing the clock to each one's due time.
    pub fn flush(&mut self) -> Result<usize> {
        self.run_timer_queue(None)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        self.run_timer_queue(Some(self.now_ms))
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>) -> Result<usize> {
        let mut ran = 0usize;
        while let Some(next_idx) = self.next_task_index(due_limit) {
            let task = self.task_queue.remove(next_idx);
            if task.due_at > self.now_ms {
                self.now_ms = task.due_at;
            }
            self.trace_line(format!(
                "[timer] run id={} due_at={} now_ms={}",
                task.id, task.due_at, self.now_ms
            ));
            wiring::run_timer_task(self, task.task)?;
            ran += 1;
        }
        Ok(ran)
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.map(|limit| task.due_at <= limit).unwrap_or(true))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    // ---- presenter surface --------------------------------------------

    /// Injects a dismissible alert banner; `error` renders as the `danger`
    /// visual category. Auto-expires after five seconds.
    pub fn show_alert(&mut self, message: &str, level: &str) -> Result<NodeId> {
        wiring::show_alert(self, message, level)
    }

    // ---- assertions ---------------------------------------------------

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.query(selector)?;
        Ok(())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let node = self.query(selector)?;
        let actual = self.dom.text_content(node);
        if actual.trim() != expected.trim() {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.dom.snippet(node),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let node = self.query(selector)?;
        let actual = self.dom.value(node);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.dom.snippet(node),
            });
        }
        Ok(())
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let node = self.query(selector)?;
        let actual = self.dom.checked(node);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.dom.snippet(node),
            });
        }
        Ok(())
    }
}
