use iced::widget::{column, container, image, mouse_area, text, Space};
use iced::{Element, Length};

use super::format::{capitalize, join_capitalized, padded_id, tenths};
use super::images::ImageStore;
use crate::state::data::Record;
use crate::Message;

const SPRITE_SIZE: f32 = 96.0;

/// Display-ready projection of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: u32,
    pub title: String,
    pub types: String,
    pub abilities: String,
    /// Metres, one decimal
    pub height: String,
    /// Kilograms, one decimal
    pub weight: String,
    pub description: String,
    pub sprite: Option<String>,
    pub alternate: Option<String>,
}

impl CardView {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id,
            title: format!("{} - {}", padded_id(record.id), capitalize(&record.name)),
            types: join_capitalized(&record.types, " / "),
            abilities: join_capitalized(&record.abilities, ", "),
            height: tenths(record.height),
            weight: tenths(record.weight),
            description: record.description.clone(),
            sprite: record.sprites.normal.clone(),
            alternate: record.sprites.alternate.clone(),
        }
    }

    /// Hovering swaps to the alternate sprite when there is one
    pub fn sprite_for(&self, hovered: bool) -> Option<&str> {
        if hovered {
            self.alternate.as_deref().or(self.sprite.as_deref())
        } else {
            self.sprite.as_deref()
        }
    }
}

pub fn view<'a>(card: &CardView, hovered: bool, images: &ImageStore) -> Element<'a, Message> {
    let sprite: Element<'a, Message> = match card.sprite_for(hovered).and_then(|url| images.bitmap(url)) {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(SPRITE_SIZE))
            .height(Length::Fixed(SPRITE_SIZE))
            .into(),
        None => Space::new(Length::Fixed(SPRITE_SIZE), Length::Fixed(SPRITE_SIZE)).into(),
    };

    let sprite = mouse_area(sprite)
        .on_enter(Message::CardHovered(card.id))
        .on_exit(Message::CardLeft(card.id));

    let body = column![
        text(card.title.clone()).size(18),
        sprite,
        text(format!("Type: {}", card.types)).size(13),
        text(format!("Height: {} m", card.height)).size(13),
        text(format!("Weight: {} kg", card.weight)).size(13),
        text(format!("Abilities: {}", card.abilities)).size(13),
        text(format!("Description: {}", card.description)).size(13),
    ]
    .spacing(4)
    .width(Length::Fixed(240.0));

    mouse_area(container(body).padding(12).style(container::rounded_box))
        .on_press(Message::OpenDetail(card.id))
        .into()
}
