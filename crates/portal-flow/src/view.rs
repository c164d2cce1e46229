//! The single display region and the views that take turns owning it

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::config::WorkflowConfig;
use crate::selection::display_name;
use crate::workflow::{lock, FormHandle, FormState, LastResult};

/// Serializable description of one file input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    /// Accept hint, e.g. `.xls,.xlsx`
    pub accept: String,
    /// File name of the current pick
    pub selected: Option<String>,
    pub path: Option<String>,
}

/// Everything a front end needs to draw a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub form_id: u64,
    pub process_id: String,
    pub title: String,
    pub fields: Vec<FieldView>,
    pub submit_label: String,
    pub state: FormState,
    /// Submit control should be disabled while true
    pub busy: bool,
    pub last_result: Option<LastResult>,
}

impl FormView {
    pub fn of(form: &FormHandle) -> Self {
        let config = form.config();
        let fields = config
            .fields
            .iter()
            .map(|field| {
                let picked = form.picked(&field.name);
                FieldView {
                    name: field.name.clone(),
                    label: field.label.clone(),
                    accept: field.accept(),
                    selected: picked.as_deref().map(display_name),
                    path: picked.map(|p| p.to_string_lossy().to_string()),
                }
            })
            .collect();

        FormView {
            form_id: form.id(),
            process_id: config.id.clone(),
            title: config.title.clone(),
            fields,
            submit_label: config.submit_label.clone(),
            state: form.state(),
            busy: form.is_busy(),
            last_result: form.last_result(),
        }
    }
}

/// Content of the display region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewSnapshot {
    Home,
    Form(FormView),
}

/// Surface the active view is drawn on
pub trait Workspace: Send + Sync {
    fn mount(&self, view: &ViewSnapshot);

    /// Teardown of the view being replaced; nothing to release by default
    fn unmount(&self, _view: &ViewSnapshot) {}
}

#[derive(Debug)]
enum ActiveView {
    Home,
    Form(Arc<FormHandle>),
}

impl ActiveView {
    fn snapshot(&self) -> ViewSnapshot {
        match self {
            ActiveView::Home => ViewSnapshot::Home,
            ActiveView::Form(form) => ViewSnapshot::Form(FormView::of(form)),
        }
    }
}

/// Owns the display region; exactly one view is active at a time
#[derive(Debug)]
pub struct ViewController<W> {
    workspace: W,
    active: Mutex<ActiveView>,
}

impl<W: Workspace> ViewController<W> {
    /// Starts on the home view without mounting anything yet
    pub fn new(workspace: W) -> Self {
        Self {
            workspace,
            active: Mutex::new(ActiveView::Home),
        }
    }

    pub fn workspace(&self) -> &W {
        &self.workspace
    }

    /// Replace the region with a fresh form for `config`
    pub fn render(&self, config: Arc<WorkflowConfig>) -> Arc<FormHandle> {
        let form = Arc::new(FormHandle::new(config));
        log::info!("view: rendering {} as form {}", form.config().id, form.id());
        self.replace(ActiveView::Form(form.clone()));
        form
    }

    pub fn show_home(&self) {
        self.replace(ActiveView::Home);
    }

    fn replace(&self, next: ActiveView) {
        let mut active = lock(&self.active);
        let previous = std::mem::replace(&mut *active, next);
        if let ActiveView::Form(form) = &previous {
            if form.is_busy() {
                log::warn!("view: form {} replaced while a submission is running", form.id());
            }
        }
        self.workspace.unmount(&previous.snapshot());
        self.workspace.mount(&active.snapshot());
    }

    /// The form with `form_id`, if it still owns the region
    pub fn active_form(&self, form_id: u64) -> Option<Arc<FormHandle>> {
        match &*lock(&self.active) {
            ActiveView::Form(form) if form.id() == form_id => Some(form.clone()),
            _ => None,
        }
    }

    pub fn current(&self) -> ViewSnapshot {
        lock(&self.active).snapshot()
    }

    /// Redraw the active view and return what was drawn
    pub fn refresh(&self) -> ViewSnapshot {
        let active = lock(&self.active);
        let snapshot = active.snapshot();
        self.workspace.mount(&snapshot);
        snapshot
    }

    /// Redraw only if `form_id` is still the active form
    pub fn refresh_form(&self, form_id: u64) -> bool {
        let active = lock(&self.active);
        match &*active {
            ActiveView::Form(form) if form.id() == form_id => {
                self.workspace.mount(&active.snapshot());
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ViewController, ViewSnapshot, Workspace};
    use crate::catalog;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<(&'static str, ViewSnapshot)>>,
    }

    impl Workspace for Recording {
        fn mount(&self, view: &ViewSnapshot) {
            self.events.lock().unwrap().push(("mount", view.clone()));
        }

        fn unmount(&self, view: &ViewSnapshot) {
            self.events.lock().unwrap().push(("unmount", view.clone()));
        }
    }

    fn kinds(events: &[(&'static str, ViewSnapshot)]) -> Vec<String> {
        events
            .iter()
            .map(|(action, view)| match view {
                ViewSnapshot::Home => format!("{} home", action),
                ViewSnapshot::Form(form) => format!("{} {}", action, form.process_id),
            })
            .collect()
    }

    #[test]
    fn switching_views_unmounts_previous_before_mounting_next() {
        let controller = ViewController::new(Recording::default());
        controller.render(Arc::new(catalog::inventario()));
        controller.render(Arc::new(catalog::liquidacion()));
        controller.show_home();

        let events = controller.workspace().events.lock().unwrap();
        assert_eq!(
            kinds(&events),
            vec![
                "unmount home",
                "mount inventario",
                "unmount inventario",
                "mount liquidacion",
                "unmount liquidacion",
                "mount home",
            ]
        );
    }

    #[test]
    fn replaced_form_becomes_stale() {
        let controller = ViewController::new(Recording::default());
        let first = controller.render(Arc::new(catalog::inventario()));
        assert!(controller.active_form(first.id()).is_some());

        let second = controller.render(Arc::new(catalog::inventario()));
        assert!(controller.active_form(first.id()).is_none());
        assert!(controller.active_form(second.id()).is_some());
        assert!(!controller.refresh_form(first.id()));

        // The discarded form starts with fresh picks, nothing carries over
        first.select("file", PathBuf::from("/data/ventas.xlsx")).unwrap();
        assert_eq!(second.picked("file"), None);
    }

    #[test]
    fn form_view_reflects_picks_and_accept_hints() {
        let controller = ViewController::new(Recording::default());
        let form = controller.render(Arc::new(catalog::agendamiento_v2()));
        form.select("manager_file", PathBuf::from("/data/Manager Junio.xlsx"))
            .unwrap();
        assert!(controller.refresh_form(form.id()));

        let ViewSnapshot::Form(view) = controller.current() else {
            panic!("expected a form view");
        };
        assert_eq!(view.form_id, form.id());
        assert_eq!(view.title, "Cruce Agendamiento");
        assert_eq!(view.fields.len(), 2);
        assert_eq!(view.fields[0].accept, ".xls,.xlsx");
        assert_eq!(view.fields[0].selected.as_deref(), Some("Manager Junio.xlsx"));
        assert_eq!(view.fields[1].selected, None);
        assert!(!view.busy);

        let events = controller.workspace().events.lock().unwrap();
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn refresh_remounts_the_active_view_without_teardown() {
        let controller = ViewController::new(Recording::default());
        assert_eq!(controller.refresh(), ViewSnapshot::Home);

        let form = controller.render(Arc::new(catalog::inventario()));
        form.select("file", PathBuf::from("/data/ventas.xlsx")).unwrap();
        let ViewSnapshot::Form(view) = controller.refresh() else {
            panic!("expected a form view");
        };
        assert_eq!(view.form_id, form.id());
        assert_eq!(view.fields[0].selected.as_deref(), Some("ventas.xlsx"));

        let events = controller.workspace().events.lock().unwrap();
        assert_eq!(
            kinds(&events),
            vec!["mount home", "unmount home", "mount inventario", "mount inventario"]
        );
    }

    #[test]
    fn snapshot_serializes_with_kind_tag() {
        let home = serde_json::to_value(ViewSnapshot::Home).unwrap();
        assert_eq!(home, serde_json::json!({ "kind": "home" }));

        let controller = ViewController::new(Recording::default());
        controller.render(Arc::new(catalog::liquidacion()));
        let value = serde_json::to_value(controller.current()).unwrap();
        assert_eq!(value["kind"], "form");
        assert_eq!(value["process_id"], "liquidacion");
        assert_eq!(value["submit_label"], "Generar Recibos");
        assert_eq!(value["state"], "idle");
        assert_eq!(value["last_result"], serde_json::Value::Null);
    }
}
