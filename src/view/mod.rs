/// Presentation module
///
/// Pure view models (`CardView`, `DetailView`) plus the iced widgets that
/// draw them. Nothing in here mutates application state; interaction is
/// reported back as `Message`s.

pub mod card;
pub mod detail;
pub mod format;
pub mod images;

pub use images::ImageStore;
