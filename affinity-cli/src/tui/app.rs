//! Key handling and loading for the interactive review screen

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info};
use ratatui::Frame;

use crate::api::{CachedGateway, CrmGateway};
use crate::context::AppContext;
use crate::services::filter::cycle_selection;
use crate::services::{ActionOutcome, Enricher, EntryLoader, FieldUpdater};
use crate::session::{Banner, BannerKind, Session, View};

pub const NO_ENTRIES: &str = "Failed to fetch list entries or no entries found";

pub struct App<'a, G: CrmGateway> {
    pub ctx: &'a AppContext,
    gateway: &'a CachedGateway<G>,
    pub session: Session,
    loader: EntryLoader,
    pub should_quit: bool,
    pub today: NaiveDate,
}

impl<'a, G: CrmGateway> App<'a, G> {
    pub fn new(ctx: &'a AppContext, gateway: &'a CachedGateway<G>) -> Self {
        Self {
            ctx,
            gateway,
            session: Session::new(),
            loader: EntryLoader::default(),
            should_quit: false,
            today: Local::now().date_naive(),
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.session.loading_complete
    }

    pub fn loading_progress(&self) -> (usize, usize) {
        (self.loader.loaded(), self.loader.total())
    }

    /// Fetch the entry page and enrich the first entry
    pub async fn start_loading(&mut self) {
        self.session.reset();
        self.loader =
            EntryLoader::fetch(self.gateway, self.ctx.deals_list(), self.ctx.config.api.page_size)
                .await;
        self.drain_errors();

        if self.loader.total() == 0 {
            self.session.loading_complete = true;
            self.session.set_banner(BannerKind::Error, NO_ENTRIES);
            return;
        }
        self.load_step().await;
    }

    /// Enrich one more entry. Returns false once nothing is left.
    pub async fn load_step(&mut self) -> bool {
        let ctx = self.ctx;
        let enricher = Enricher::new(self.gateway, &ctx.field_map, ctx.tracking_list());
        let Some(deal) = self.loader.next(&enricher).await else {
            self.session.loading_complete = true;
            return false;
        };
        self.session.push_deal(deal);
        self.drain_errors();

        if self.loader.is_complete() {
            self.session.loading_complete = true;
            info!("Loaded all {} deals", self.session.deals.len());
        }
        true
    }

    /// Surface recorded read failures in the banner
    fn drain_errors(&mut self) {
        let errors = self.gateway.take_errors();
        if let Some(last) = errors.last() {
            let message = if errors.len() > 1 {
                format!("{} (and {} more errors)", last, errors.len() - 1)
            } else {
                last.clone()
            };
            self.session.set_banner(BannerKind::Error, message);
        }
    }

    pub async fn reload(&mut self) {
        info!("Clearing cache and reloading");
        self.gateway.clear().await;
        self.session.banner = None;
        self.start_loading().await;
        if self.session.banner.is_none() {
            self.session.set_banner(BannerKind::Info, "Cache cleared, reloading");
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.session.picker.visible {
            self.handle_picker_key(key).await;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.session.view = self.session.view.toggle(),
            KeyCode::Char('R') => self.reload().await,
            _ if self.session.view == View::Queue => self.handle_queue_key(key).await,
            _ => {}
        }
    }

    async fn handle_queue_key(&mut self, key: KeyEvent) {
        let ctx = self.ctx;
        let roles = &ctx.roles;
        let config = &ctx.config;
        match key.code {
            KeyCode::Right => self.session.next(roles, self.today),
            KeyCode::Left => self.session.previous(roles, self.today),
            KeyCode::Char('t') => {
                if self.session.current(roles, self.today).is_some()
                    && !ctx.people.assignable().is_empty()
                {
                    self.session.picker.open();
                }
            }
            KeyCode::Char('x') => self.pass_current().await,
            KeyCode::Char('p') => {
                let mut filter = self.session.filter.clone();
                filter.profile = cycle_selection(&filter.profile, &config.profiles);
                self.session.set_filter(filter);
            }
            KeyCode::Char('c') => {
                let mut filter = self.session.filter.clone();
                filter.category = cycle_selection(&filter.category, &config.categories);
                self.session.set_filter(filter);
            }
            KeyCode::Char('r') => {
                let mut filter = self.session.filter.clone();
                filter.review = filter.review.next();
                self.session.set_filter(filter);
            }
            KeyCode::Char('d') => {
                let mut filter = self.session.filter.clone();
                filter.date_range = filter.date_range.next();
                self.session.set_filter(filter);
            }
            _ => {}
        }
    }

    async fn handle_picker_key(&mut self, key: KeyEvent) {
        let ctx = self.ctx;
        let people = ctx.people.assignable();
        match key.code {
            KeyCode::Esc => self.session.picker.close(),
            KeyCode::Down | KeyCode::Char('j') => self.session.picker.next(people.len()),
            KeyCode::Up | KeyCode::Char('k') => self.session.picker.previous(people.len()),
            KeyCode::Enter => {
                self.session.picker.close();
                if let Some(name) = people.get(self.session.picker.selected) {
                    self.track_current(name).await;
                }
            }
            _ => {}
        }
    }

    async fn track_current(&mut self, person: &str) {
        let ctx = self.ctx;
        let Some(idx) = self.session.current(&ctx.roles, self.today) else {
            return;
        };
        let Some(person_id) = ctx.people.id_of(person) else {
            self.session
                .set_banner(BannerKind::Error, format!("Unknown person: {}", person));
            return;
        };

        let updater = FieldUpdater::new(self.gateway, &ctx.roles, ctx.tracking_list());
        let deal = &mut self.session.deals[idx];
        let report = updater.track_entry(deal, person_id).await;
        let outcome = report.outcome(deal.name(), person);
        self.finish_action(idx, outcome);
    }

    async fn pass_current(&mut self) {
        let ctx = self.ctx;
        let Some(idx) = self.session.current(&ctx.roles, self.today) else {
            return;
        };
        let updater = FieldUpdater::new(self.gateway, &ctx.roles, ctx.tracking_list());
        let outcome = updater
            .pass_entry(&mut self.session.deals[idx], ctx.pass_id)
            .await;
        self.finish_action(idx, outcome);
    }

    fn finish_action(&mut self, idx: usize, outcome: ActionOutcome) {
        // Write failures were already logged by the client
        let errors = self.gateway.take_errors();
        if !errors.is_empty() {
            debug!("Discarding {} recorded write errors", errors.len());
        }
        if outcome.advances() {
            self.session.advance_past(idx, &self.ctx.roles, self.today);
        } else {
            self.session.anchor_at(idx, &self.ctx.roles, self.today);
        }
        self.session.banner = Some(Banner::from(&outcome));
    }

    pub fn draw(&self, frame: &mut Frame) {
        super::views::draw(frame, self);
    }
}
