use std::sync::Arc;

use iced::keyboard::{self, key};
use iced::widget::{button, column, container, row, scrollable, svg, text, text_input, Row};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use iced_aw::Wrap;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod shell;
mod state;
mod view;

#[cfg(test)]
mod testing;

use api::{HttpTransport, PokeApi, Transport};
use config::{Settings, GENERATIONS};
use shell::{AssetManifest, InstallReport, ShellCache};
use state::data::{Detail, Record};
use state::{Catalog, DetailState, DetailTicket, LoadStep, LoadTicket};
use view::card::CardView;
use view::format::capitalize;
use view::ImageStore;

/// Id of the search box, focused on startup
const SEARCH_INPUT: &str = "search";

const CARD_SPACING: f32 = 12.0;
const TAG_SPACING: f32 = 6.0;
const ICON_SIZE: f32 = 18.0;

/// Main application state
struct Pokedex {
    /// Collection, filter state and detail view
    catalog: Catalog,
    api: PokeApi,
    shell: Arc<ShellCache>,
    settings: Arc<Settings>,
    /// Decoded sprites and type icons
    images: ImageStore,
    /// Card whose sprite is under the cursor
    hovered: Option<u32>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
///
/// Every UI interaction lands here and is forwarded to one of the catalog's
/// operations: `select_generation`, `set_filter` (via tag/query edits) or
/// `open_detail`.
#[derive(Debug, Clone)]
pub enum Message {
    /// User picked a generation button (index into `GENERATIONS`)
    SelectGeneration(usize),
    /// One id of the running load completed
    RecordFetched(LoadTicket, Result<Record, String>),
    /// User clicked a tag button
    ToggleTag(String),
    /// Search box edited
    QueryChanged(String),
    /// User clicked a card
    OpenDetail(u32),
    DetailFetched(DetailTicket, Result<Box<Detail>, String>),
    /// Close button, backdrop click or Escape
    CloseDetail,
    ToggleDetailSprite,
    CardHovered(u32),
    CardLeft(u32),
    /// Shell cache install/activation finished
    ShellReady(Result<InstallReport, String>),
    /// Sprite or icon bytes arrived (or failed)
    ImageLoaded(String, Result<Vec<u8>, String>),
}

impl Pokedex {
    /// Create a new instance of the application and kick off startup work:
    /// shell install, the first generation load and search focus
    fn new() -> (Self, Task<Message>) {
        let settings = Arc::new(Settings::default());

        let transport: Arc<dyn Transport> = match HttpTransport::new(settings.request_timeout) {
            Ok(transport) => Arc::new(transport),
            Err(e) => {
                warn!(error = %e, "falling back to default HTTP client");
                Arc::new(HttpTransport::default())
            }
        };

        let api = PokeApi::new(transport.clone(), settings.clone());
        let shell = Arc::new(ShellCache::new(settings.cache_root.clone(), transport));

        info!(cache_root = %settings.cache_root.display(), "Pokédex starting");

        let mut app = Pokedex {
            catalog: Catalog::new(),
            api,
            shell,
            settings,
            images: ImageStore::default(),
            hovered: None,
            status: String::new(),
        };

        let install = app.install_shell();
        let load = app.select_generation(0);
        let focus = text_input::focus(text_input::Id::new(SEARCH_INPUT));

        (app, Task::batch([install, load, focus]))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectGeneration(index) => self.select_generation(index),
            Message::RecordFetched(ticket, result) => {
                let step = self.catalog.record_fetched(ticket, result);
                self.drive(step)
            }
            Message::ToggleTag(tag) => {
                let mut next = self.catalog.filter().clone();
                next.toggle_tag(&tag);
                self.catalog.set_filter(next.tag, next.query);
                Task::none()
            }
            Message::QueryChanged(query) => {
                let tag = self.catalog.filter().tag.clone();
                self.catalog.set_filter(tag, query);
                Task::none()
            }
            Message::OpenDetail(id) => {
                let ticket = self.catalog.open_detail(id);
                let api = self.api.clone();
                Task::perform(
                    async move {
                        api.fetch_detail(ticket.id)
                            .await
                            .map(Box::new)
                            .map_err(|e| e.to_string())
                    },
                    move |result| Message::DetailFetched(ticket, result),
                )
            }
            Message::DetailFetched(ticket, result) => {
                let sprites = result
                    .as_ref()
                    .map(|detail| {
                        let refs = &detail.record.sprites;
                        [refs.normal.clone(), refs.alternate.clone()]
                    })
                    .ok();

                if self.catalog.detail_fetched(ticket, result.map(|detail| *detail)) {
                    if let Some(urls) = sprites {
                        return self.request_images(urls.into_iter().flatten());
                    }
                }
                Task::none()
            }
            Message::CloseDetail => {
                self.catalog.close_detail();
                Task::none()
            }
            Message::ToggleDetailSprite => {
                self.catalog.toggle_detail_sprite();
                Task::none()
            }
            Message::CardHovered(id) => {
                self.hovered = Some(id);
                Task::none()
            }
            Message::CardLeft(id) => {
                if self.hovered == Some(id) {
                    self.hovered = None;
                }
                Task::none()
            }
            Message::ShellReady(result) => {
                match result {
                    Ok(report) => {
                        info!(
                            cache = %report.cache_name,
                            assets = report.assets,
                            bytes = report.bytes,
                            downloaded = report.downloaded,
                            "shell ready"
                        );
                    }
                    Err(message) => warn!(%message, "shell cache unavailable, icons come from the network"),
                }
                let icons: Vec<String> = self
                    .catalog
                    .tag_index()
                    .iter()
                    .map(|t| self.settings.type_icon(&t.tag))
                    .collect();
                self.request_images(icons)
            }
            Message::ImageLoaded(url, result) => {
                match result {
                    Ok(bytes) => self.images.insert(url, bytes),
                    Err(message) => debug!(%url, %message, "image unavailable"),
                }
                Task::none()
            }
        }
    }

    /// Reset filters and start loading a generation
    fn select_generation(&mut self, index: usize) -> Task<Message> {
        let Some(generation) = GENERATIONS.get(index) else {
            return Task::none();
        };

        self.hovered = None;
        self.status = format!("Loading {}...", generation.name);
        self.images.clear_bitmaps();

        // An open detail view outlives the collection it was opened from
        let detail_sprites: Vec<String> = match self.catalog.detail() {
            DetailState::Ready { detail, .. } => {
                let refs = &detail.record.sprites;
                refs.normal.iter().chain(refs.alternate.iter()).cloned().collect()
            }
            _ => Vec::new(),
        };

        let step = self.catalog.select_generation(generation.start, generation.end);
        let load = self.drive(step);
        Task::batch([load, self.request_images(detail_sprites)])
    }

    /// Turn a loader step into the next background fetch
    fn drive(&mut self, step: LoadStep) -> Task<Message> {
        match step {
            LoadStep::Fetch(ticket) => {
                let api = self.api.clone();
                Task::perform(
                    async move { api.fetch_record(ticket.id).await.map_err(|e| e.to_string()) },
                    move |result| Message::RecordFetched(ticket, result),
                )
            }
            LoadStep::Finished(summary) => {
                self.status = if summary.failed.is_empty() {
                    format!("{} Pokémon loaded.", summary.loaded)
                } else {
                    format!(
                        "{} Pokémon loaded, {} could not be fetched.",
                        summary.loaded,
                        summary.failed.len()
                    )
                };

                let mut urls = Vec::new();
                for record in self.catalog.records() {
                    urls.extend(record.sprites.normal.iter().cloned());
                    urls.extend(record.sprites.alternate.iter().cloned());
                }
                for tag in self.catalog.tag_index() {
                    urls.push(self.settings.type_icon(&tag.tag));
                }
                self.request_images(urls)
            }
            LoadStep::Stale => Task::none(),
        }
    }

    /// Fetch each not-yet-requested image through the shell cache
    fn request_images(&mut self, urls: impl IntoIterator<Item = String>) -> Task<Message> {
        let tasks: Vec<Task<Message>> = urls
            .into_iter()
            .filter(|url| self.images.claim(url))
            .map(|url| {
                let shell = self.shell.clone();
                Task::perform(
                    async move {
                        let result = shell.fetch(&url).await.map_err(|e| e.to_string());
                        (url, result)
                    },
                    |(url, result)| Message::ImageLoaded(url, result),
                )
            })
            .collect();

        Task::batch(tasks)
    }

    fn install_shell(&self) -> Task<Message> {
        let shell = self.shell.clone();
        let manifest = AssetManifest::from_settings(&self.settings);
        Task::perform(
            async move { shell.ensure(&manifest).await.map_err(|e| e.to_string()) },
            Message::ShellReady,
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let generations = GENERATIONS
            .iter()
            .enumerate()
            .fold(Row::new().spacing(8), |row, (index, generation)| {
                row.push(button(generation.name).on_press(Message::SelectGeneration(index)))
            });

        let search = text_input("Search by name or number", &self.catalog.filter().query)
            .id(text_input::Id::new(SEARCH_INPUT))
            .on_input(Message::QueryChanged)
            .padding(10);

        let active_tag = self.catalog.filter().tag.as_deref();
        let tag_buttons: Vec<Element<Message>> = self
            .catalog
            .tag_index()
            .iter()
            .map(|entry| {
                let label = text(format!("{} ({})", capitalize(&entry.tag), entry.count));
                let content: Element<Message> =
                    match self.images.vector(&self.settings.type_icon(&entry.tag)) {
                        Some(icon) => row![
                            svg(icon.clone())
                                .width(Length::Fixed(ICON_SIZE))
                                .height(Length::Fixed(ICON_SIZE)),
                            label
                        ]
                        .spacing(6)
                        .align_y(Alignment::Center)
                        .into(),
                        None => label.into(),
                    };

                let style: fn(&Theme, button::Status) -> button::Style =
                    if active_tag == Some(entry.tag.as_str()) {
                        button::primary
                    } else {
                        button::secondary
                    };

                button(content)
                    .style(style)
                    .on_press(Message::ToggleTag(entry.tag.clone()))
                    .into()
            })
            .collect();

        let body: Element<Message> = match self.catalog.progress() {
            Some(progress) => container(text(format!(
                "Loading... {} / {}",
                progress.done(),
                progress.total()
            )))
            .center_x(Length::Fill)
            .padding(40)
            .into(),
            None => {
                let visible = self.catalog.visible();
                if visible.is_empty() && !self.catalog.filter().is_empty() {
                    container(text("No Pokémon match the current filter."))
                        .center_x(Length::Fill)
                        .padding(40)
                        .into()
                } else {
                    let cards: Vec<Element<Message>> = visible
                        .into_iter()
                        .map(|record| {
                            let card = CardView::from_record(record);
                            view::card::view(&card, self.hovered == Some(record.id), &self.images)
                        })
                        .collect();

                    scrollable(Wrap::with_elements(cards).spacing(CARD_SPACING).line_spacing(CARD_SPACING))
                        .height(Length::Fill)
                        .into()
                }
            }
        };

        let content = column![
            text("Pokédex").size(40),
            generations,
            search,
            Wrap::with_elements(tag_buttons).spacing(TAG_SPACING).line_spacing(TAG_SPACING),
            text(&self.status).size(14),
            body,
        ]
        .spacing(16)
        .padding(24);

        let base = container(content).width(Length::Fill).height(Length::Fill).into();

        view::detail::overlay(base, self.catalog.detail(), &self.images)
    }

    /// Escape closes the detail view
    fn subscription(&self) -> Subscription<Message> {
        if self.catalog.detail().is_open() {
            keyboard::on_key_press(|key, _modifiers| match key {
                keyboard::Key::Named(key::Named::Escape) => Some(Message::CloseDetail),
                _ => None,
            })
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,pokedex_viewer=info")),
        )
        .init();

    iced::application("Pokédex", Pokedex::update, Pokedex::view)
        .subscription(Pokedex::subscription)
        .theme(Pokedex::theme)
        .centered()
        .run_with(Pokedex::new)
}
