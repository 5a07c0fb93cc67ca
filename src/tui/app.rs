use std::time::Instant;

use chrono::{Local, NaiveDate};
use ratatui::widgets::TableState;

use crate::config::Config;
use crate::dates::parse_entry_date;
use crate::error::TaskError;
use crate::lifecycle::{complete_task, create_task, edit_task, reactivate_task};
use crate::models::{Priority, Recurrence, Task, TaskDraft, TaskId};
use crate::query::{parse_filter_date, query, ListKind, QuickRange, SortOrder, TaskFilter};
use crate::reminder::{Notifier, ReminderScheduler};
use crate::storage::{Persistence, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
    Filtering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    None,
    Name,
    Due,
    Info,
    Search,
    FromDate,
}

/// Priority selector of the filter bar. `Overdue` only applies to the active tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
    Overdue,
}

impl PriorityFilter {
    fn next(self, kind: ListKind) -> PriorityFilter {
        match self {
            PriorityFilter::All => PriorityFilter::Only(Priority::Red),
            PriorityFilter::Only(Priority::Red) => PriorityFilter::Only(Priority::Blue),
            PriorityFilter::Only(Priority::Blue) => PriorityFilter::Only(Priority::Green),
            PriorityFilter::Only(Priority::Green) if kind == ListKind::Active => PriorityFilter::Overdue,
            PriorityFilter::Only(Priority::Green) | PriorityFilter::Overdue => PriorityFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityFilter::All => "All",
            PriorityFilter::Only(Priority::Red) => "Red",
            PriorityFilter::Only(Priority::Blue) => "Blue",
            PriorityFilter::Only(Priority::Green) => "Green",
            PriorityFilter::Overdue => "Overdue",
        }
    }
}

/// Filter bar state for one tab, kept as typed so a bad date can be reported on each refresh.
#[derive(Debug, Clone, Default)]
pub struct FilterForm {
    pub priority: PriorityFilter,
    pub from_text: String,
    pub search: String,
    pub quick_range: Option<QuickRange>,
    pub order: SortOrder,
}

impl FilterForm {
    /// Builds the query filter. An invalid from-date is returned alongside so it can be shown.
    fn to_filter(&self) -> (TaskFilter, Option<TaskError>) {
        let (min_date, err) = match parse_filter_date(&self.from_text) {
            Ok(d) => (d, None),
            Err(e) => (None, Some(e)),
        };
        let (priority, overdue_only) = match self.priority {
            PriorityFilter::All => (None, false),
            PriorityFilter::Only(p) => (Some(p), false),
            PriorityFilter::Overdue => (None, true),
        };
        let filter = TaskFilter {
            priority,
            overdue_only,
            min_date,
            quick_range: self.quick_range,
            name_contains: self.search.clone(),
        };
        (filter, err)
    }
}

/// State for the multi-step "Add Task" wizard.
#[derive(Debug, Default)]
pub struct AddState {
    pub draft: TaskDraft,
    pub step: usize, // 0: Name, 1: Due, 2: Info, 3: Priority, 4: Recur
}

/// A reminder waiting to be dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub message: String,
}

struct PopupNotifier<'a>(&'a mut Option<Popup>);

impl Notifier for PopupNotifier<'_> {
    fn notify(&mut self, title: &str, message: &str) {
        *self.0 = Some(Popup {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

pub struct App<P: Persistence> {
    pub store: TaskStore<P>,
    pub view: ListKind,
    /// Ids of the rows currently shown, in display order.
    pub visible: Vec<TaskId>,
    pub state: TableState,
    pub active_filter: FilterForm,
    pub finished_filter: FilterForm,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<TaskId>,
    pub add_state: AddState,
    pub status: Option<String>,
    pub popup: Option<Popup>,
    /// Collapsed to the one-line indicator view.
    pub minimized: bool,
    pub should_quit: bool,
    pub scheduler: ReminderScheduler,
}

impl<P: Persistence> App<P> {
    /// Creates a new App over an opened store.
    pub fn new(store: TaskStore<P>, config: &Config) -> App<P> {
        let mut app = App {
            store,
            view: ListKind::Active,
            visible: Vec::new(),
            state: TableState::default(),
            active_filter: FilterForm::default(),
            finished_filter: FilterForm::default(),
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            status: None,
            popup: None,
            minimized: false,
            should_quit: false,
            scheduler: ReminderScheduler::from_config(config),
        };
        app.refresh();
        app
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn filter_form(&self) -> &FilterForm {
        match self.view {
            ListKind::Active => &self.active_filter,
            ListKind::Finished => &self.finished_filter,
        }
    }

    fn filter_form_mut(&mut self) -> &mut FilterForm {
        match self.view {
            ListKind::Active => &mut self.active_filter,
            ListKind::Finished => &mut self.finished_filter,
        }
    }

    /// Rows of the current tab, in display order.
    pub fn rows(&self) -> Vec<&Task> {
        self.visible
            .iter()
            .filter_map(|id| self.store.get(self.view, *id))
            .collect()
    }

    /// Re-runs the query for the current tab and keeps the selection in range.
    pub fn refresh(&mut self) {
        let today = self.today();
        let (filter, err) = self.filter_form().to_filter();
        let order = self.filter_form().order;
        self.visible = query(self.store.list(self.view), self.view, &filter, order, today)
            .into_iter()
            .map(|t| t.id)
            .collect();
        if let Some(e) = err {
            self.status = Some(e.to_string());
        }

        if self.visible.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.visible.len() {
                self.state.select(Some(self.visible.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.state.selected().and_then(|i| self.visible.get(i).copied())
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_id().and_then(|id| self.store.get(self.view, id))
    }

    /// Selects the next row.
    pub fn next(&mut self) {
        if self.visible.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row.
    pub fn previous(&mut self) {
        if self.visible.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Switches between the Active and Finished tabs.
    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            ListKind::Active => ListKind::Finished,
            ListKind::Finished => ListKind::Active,
        };
        self.state.select(None);
        self.refresh();
    }

    fn report(&mut self, result: Result<String, TaskError>) {
        self.status = Some(match result {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        });
        self.refresh();
    }

    /// Completes the selected active task.
    pub fn complete_selected(&mut self) {
        if self.view != ListKind::Active { return; }
        let Some(id) = self.selected_id() else {
            self.status = Some("Please select an active task first.".into());
            return;
        };
        let today = self.today();
        let result = complete_task(&mut self.store, id, today).map(|done| match done.successor {
            Some(_) => "Task has been completed. Next occurrence created.".to_string(),
            None => "Task has been completed.".to_string(),
        });
        self.report(result);
    }

    /// Sets the selected finished task active again.
    pub fn reactivate_selected(&mut self) {
        if self.view != ListKind::Finished { return; }
        let Some(id) = self.selected_id() else {
            self.status = Some("Please select a finished task first.".into());
            return;
        };
        let result = reactivate_task(&mut self.store, id).map(|_| "Task has been set active again.".to_string());
        self.report(result);
    }

    /// Applies a field change to the selected active task through the edit operation.
    fn edit_selected(&mut self, change: impl FnOnce(&mut TaskDraft)) {
        let Some(task) = self.selected_task().filter(|_| self.view == ListKind::Active) else { return; };
        let id = task.id;
        let mut draft = TaskDraft::from_task(task);
        change(&mut draft);
        let result = edit_task(&mut self.store, id, &draft).map(|_| "Task updated.".to_string());
        self.report(result);
    }

    pub fn cycle_priority(&mut self) {
        self.edit_selected(|d| {
            d.priority = match d.priority {
                Priority::Green => Priority::Blue,
                Priority::Blue => Priority::Red,
                Priority::Red => Priority::Green,
            }
        });
    }

    pub fn cycle_recurrence(&mut self) {
        self.edit_selected(|d| {
            d.recurrence = match d.recurrence {
                None => Some(Recurrence::Daily),
                Some(Recurrence::Daily) => Some(Recurrence::Weekly),
                Some(Recurrence::Weekly) => Some(Recurrence::Monthly),
                Some(Recurrence::Monthly) => None,
            }
        });
    }

    pub fn cycle_priority_filter(&mut self) {
        let kind = self.view;
        let form = self.filter_form_mut();
        form.priority = form.priority.next(kind);
        self.refresh();
    }

    pub fn set_quick_range(&mut self, range: Option<QuickRange>) {
        if self.view != ListKind::Active { return; }
        self.active_filter.quick_range = range;
        if range.is_some() {
            self.active_filter.from_text.clear();
        }
        self.refresh();
    }

    pub fn toggle_sort(&mut self) {
        let form = self.filter_form_mut();
        form.order = form.order.toggled();
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        *self.filter_form_mut() = FilterForm::default();
        self.status = None;
        self.refresh();
    }

    /// Collapses to the indicator line.
    pub fn minimize(&mut self) {
        self.minimized = true;
    }

    /// Restores the full window from the indicator.
    pub fn show(&mut self) {
        self.minimized = false;
        self.refresh();
    }

    pub fn quit(&mut self) {
        self.scheduler.cancel();
        self.should_quit = true;
    }

    pub fn dismiss_popup(&mut self) {
        self.popup = None;
    }

    /// Runs the reminder check if it is due.
    pub fn on_tick(&mut self, now: Instant) {
        let today = self.today();
        let mut notifier = PopupNotifier(&mut self.popup);
        self.scheduler.tick(now, self.store.active(), today, &mut notifier);
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Initiates editing of a text field of the selected active task.
    pub fn start_edit(&mut self, field: InputField) {
        if self.view != ListKind::Active { return; }
        let Some(t) = self.selected_task() else { return; };
        let (id, prefill) = match field {
            InputField::Name => (t.id, t.name.clone()),
            InputField::Due => (t.id, t.date.clone()),
            InputField::Info => (t.id, t.info.clone()),
            _ => return,
        };
        self.target_id = Some(id);
        self.input_field = field;
        self.input_buffer = prefill;
        self.input_mode = InputMode::Editing;
    }

    /// Initiates typing into a filter field.
    pub fn start_filter(&mut self, field: InputField) {
        self.input_buffer = match field {
            InputField::Search => self.filter_form().search.clone(),
            InputField::FromDate => self.filter_form().from_text.clone(),
            _ => return,
        };
        self.input_field = field;
        self.input_mode = InputMode::Filtering;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Handles Enter based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Filtering => self.handle_filter_input(),
            InputMode::Normal => {}
        }
    }

    fn handle_adding_input(&mut self) {
        let input = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => { // Name
                if input.is_empty() {
                    self.status = Some(TaskError::MissingFields.to_string());
                    return;
                }
                self.add_state.draft.name = input;
            }
            1 => { // Due
                if input.is_empty() {
                    self.status = Some(TaskError::MissingFields.to_string());
                    return;
                }
                if parse_entry_date(&input).is_none() {
                    self.status = Some(TaskError::InvalidDueDate(input).to_string());
                    return;
                }
                self.add_state.draft.date = input;
            }
            2 => { // Info
                self.add_state.draft.info = input;
            }
            3 => { // Priority
                if !input.is_empty() {
                    match input.parse::<Priority>() {
                        Ok(p) => self.add_state.draft.priority = p,
                        Err(e) => {
                            self.status = Some(e);
                            return;
                        }
                    }
                }
            }
            4 => { // Recur
                match Recurrence::parse_option(&input) {
                    Ok(r) => self.add_state.draft.recurrence = r,
                    Err(e) => {
                        self.status = Some(e);
                        return;
                    }
                }
                let today = self.today();
                let draft = std::mem::take(&mut self.add_state.draft);
                let result = create_task(&mut self.store, &draft, today).map(|_| "Task has been added.".to_string());
                self.cancel_input();
                self.view = ListKind::Active;
                self.report(result);
                return;
            }
            _ => {}
        }
        self.add_state.step += 1;
        self.input_buffer.clear();
    }

    fn handle_editing_input(&mut self) {
        let Some(id) = self.target_id.take() else {
            self.cancel_input();
            return;
        };
        let field = self.input_field;
        let value = std::mem::take(&mut self.input_buffer);
        self.cancel_input();
        let Some(task) = self.store.get(ListKind::Active, id) else {
            self.report(Err(TaskError::NotFound { id, list: ListKind::Active }));
            return;
        };
        let mut draft = TaskDraft::from_task(task);
        match field {
            InputField::Name => draft.name = value,
            InputField::Due => draft.date = value,
            InputField::Info => draft.info = value,
            _ => return,
        }
        let result = edit_task(&mut self.store, id, &draft).map(|_| "Task updated.".to_string());
        self.report(result);
    }

    fn handle_filter_input(&mut self) {
        let field = self.input_field;
        let value = std::mem::take(&mut self.input_buffer);
        self.cancel_input();
        self.status = None;
        let view = self.view;
        let form = self.filter_form_mut();
        match field {
            InputField::Search => form.search = value,
            InputField::FromDate => {
                form.from_text = value;
                if view == ListKind::Active {
                    form.quick_range = None;
                }
            }
            _ => {}
        }
        self.refresh();
    }
}
