//! Controller - the user's selections wired into catalog and poller
//!
//! Front ends (the CLI here) only talk to the controller. It owns the
//! session cookies, the course catalog and the live [`PollConfig`]. A
//! running poller watches that config, so a new course, category or term
//! picked mid-run is used from the next attempt on.

use crate::app::poller::{PollEvent, Poller};
use crate::catalog::CourseCatalog;
use crate::config::{PollInterval, TermConfig};
use crate::error::{ErrorKind, Result};
use crate::interface::RequestApi;
use crate::model::dtos::PollConfig;
use crate::model::structs::{CourseCategory, CourseRecord};
use crate::session::{CookieObserver, SessionCookies};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub struct Controller<C> {
    catalog: CourseCatalog,
    session: SessionCookies,
    selection: watch::Sender<PollConfig>,
    poller: Poller<C>,
    events: mpsc::UnboundedReceiver<PollEvent>,
}

impl<C: RequestApi> Controller<C> {
    /// Build a controller and load whatever the catalog file holds.
    ///
    /// A corrupt catalog file is logged and leaves the catalog empty.
    pub fn new(client: Arc<C>, mut catalog: CourseCatalog, session: SessionCookies) -> Self {
        if let Err(e) = catalog.load_from_disk() {
            tracing::warn!(path = %catalog.path().display(), "读取失败: {e}");
        }
        let (poller, events) = Poller::new(client);
        let (selection, _) = watch::channel(PollConfig::default());
        Self {
            catalog,
            session,
            selection,
            poller,
            events,
        }
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    pub fn session(&self) -> &SessionCookies {
        &self.session
    }

    pub fn target(&self) -> Option<CourseRecord> {
        self.selection.borrow().target.clone()
    }

    pub fn category(&self) -> CourseCategory {
        self.selection.borrow().category
    }

    pub fn interval(&self) -> PollInterval {
        self.selection.borrow().interval
    }

    pub fn term(&self) -> TermConfig {
        self.selection.borrow().term.clone()
    }

    pub fn is_running(&self) -> bool {
        self.poller.is_running()
    }

    /// Import a pasted course list response. Returns how many courses were
    /// new.
    pub fn import_payload(&mut self, raw: &str) -> Result<usize> {
        let added = self.catalog.add_from_response(raw)?;
        tracing::info!("新增 {added} 门");
        Ok(added)
    }

    pub fn select_course(&mut self, pid: &str) -> Result<CourseRecord> {
        let course = self
            .catalog
            .get(pid)
            .cloned()
            .ok_or_else(|| ErrorKind::CourseError(format!("no course with pid {pid}")))?;
        tracing::info!("锁定: {}", course.name);
        self.selection
            .send_modify(|config| config.target = Some(course.clone()));
        Ok(course)
    }

    pub fn set_category(&mut self, category: CourseCategory) {
        self.selection
            .send_modify(|config| config.category = category);
    }

    /// Takes effect the next time polling starts.
    pub fn set_interval(&mut self, interval: PollInterval) {
        self.selection
            .send_modify(|config| config.interval = interval);
    }

    pub fn set_term(&mut self, term: TermConfig) {
        self.selection.send_modify(|config| config.term = term);
    }

    pub fn on_cookie(&self, name: &str, value: &str) {
        self.session.on_cookie(name, value);
    }

    /// Start polling for the selected course. Missing cookies or a missing
    /// target are reported and nothing starts.
    pub fn start(&mut self) -> Result<()> {
        self.poller.start(self.selection.subscribe(), &self.session)
    }

    pub fn stop(&mut self) -> bool {
        self.poller.stop()
    }

    /// Empty the catalog and forget the selected course.
    ///
    /// A running loop is not stopped; it skips its ticks until another
    /// course is selected.
    pub fn clear_all(&mut self) -> Result<()> {
        self.selection.send_modify(|config| config.target = None);
        self.catalog.clear()
    }

    /// Wait for the next poller event.
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        self.events.recv().await
    }
}
