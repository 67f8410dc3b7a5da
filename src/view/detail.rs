/// Expanded detail view shown as a modal over the card grid.
///
/// Clicking the dimmed backdrop, pressing the close button and pressing
/// Escape all emit [`Message::CloseDetail`].

use iced::widget::{
    button, center, column, container, image, mouse_area, opaque, row, scrollable, stack, text,
    Column, Space,
};
use iced::{Color, Element, Length};

use super::format::{capitalize, join_capitalized, location_name};
use super::images::ImageStore;
use crate::config::UNKNOWN;
use crate::state::catalog::DetailState;
use crate::state::data::Detail;
use crate::Message;

const SPRITE_SIZE: f32 = 160.0;

/// Display-ready projection of a loaded detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub header: String,
    pub types: String,
    pub abilities: String,
    pub habitat: String,
    pub locations: String,
    pub moves: String,
    /// (stat name, base value) in API order
    pub stats: Vec<(String, u32)>,
    /// Sprite currently selected by the toggle
    pub sprite: Option<String>,
    pub can_toggle: bool,
}

impl DetailView {
    pub fn from_detail(detail: &Detail, alternate: bool) -> Self {
        let record = &detail.record;

        let locations = if detail.locations.is_empty() {
            UNKNOWN.to_string()
        } else {
            detail
                .locations
                .iter()
                .map(|l| location_name(l))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let sprite = if alternate {
            record.sprites.alternate.clone()
        } else {
            record.sprites.normal.clone()
        };

        Self {
            header: format!("{} (#{})", capitalize(&record.name), record.id),
            types: join_capitalized(&record.types, " / "),
            abilities: join_capitalized(&record.abilities, ", "),
            habitat: detail
                .habitat
                .as_deref()
                .map(capitalize)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            locations,
            moves: join_capitalized(&detail.moves, ", "),
            stats: detail
                .stats
                .iter()
                .map(|s| (capitalize(&s.name), s.base))
                .collect(),
            sprite,
            can_toggle: record.sprites.alternate.is_some(),
        }
    }
}

/// Overlay `base` with the detail surface, or return `base` untouched when closed
pub fn overlay<'a>(
    base: Element<'a, Message>,
    state: &DetailState,
    images: &ImageStore,
) -> Element<'a, Message> {
    let body: Element<'a, Message> = match state {
        DetailState::Closed => return base,
        DetailState::Loading { .. } => text("Loading...").size(18).into(),
        DetailState::Failed { .. } => text("Could not load this Pokémon's data.").size(18).into(),
        DetailState::Ready { detail, alternate } => {
            ready(&DetailView::from_detail(detail, *alternate), images)
        }
    };

    let surface = container(
        column![
            row![
                Space::with_width(Length::Fill),
                button("Close").on_press(Message::CloseDetail)
            ],
            scrollable(body).height(Length::Shrink),
        ]
        .spacing(12),
    )
    .padding(20)
    .max_width(560)
    .max_height(640)
    .style(container::rounded_box);

    modal(base, surface, Message::CloseDetail)
}

fn ready<'a>(view: &DetailView, images: &ImageStore) -> Element<'a, Message> {
    let sprite: Element<'a, Message> = match view.sprite.as_deref().and_then(|url| images.bitmap(url)) {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(SPRITE_SIZE))
            .height(Length::Fixed(SPRITE_SIZE))
            .into(),
        None => Space::new(Length::Fixed(SPRITE_SIZE), Length::Fixed(SPRITE_SIZE)).into(),
    };

    let toggle = button("Toggle shiny").on_press_maybe(view.can_toggle.then_some(Message::ToggleDetailSprite));

    let stats = view.stats.iter().fold(Column::new().spacing(2), |col, (name, base)| {
        col.push(text(format!("{}: {}", name, base)).size(14))
    });

    column![
        text(view.header.clone()).size(28),
        sprite,
        toggle,
        text(format!("Type: {}", view.types)),
        text(format!("Abilities: {}", view.abilities)),
        text(format!("Habitat: {}", view.habitat)),
        text(format!("Found in: {}", view.locations)),
        text(format!("Moves: {}", view.moves)).size(13),
        text("Base stats").size(20),
        stats,
    ]
    .spacing(8)
    .into()
}

/// Dimmed backdrop that swallows input to `base` and reports clicks on itself
fn modal<'a>(
    base: Element<'a, Message>,
    content: impl Into<Element<'a, Message>>,
    on_blank_press: Message,
) -> Element<'a, Message> {
    stack![
        base,
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| {
                container::Style {
                    background: Some(
                        Color {
                            a: 0.8,
                            ..Color::BLACK
                        }
                        .into(),
                    ),
                    ..container::Style::default()
                }
            }))
            .on_press(on_blank_press)
        )
    ]
    .into()
}
