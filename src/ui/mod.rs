/// Presentation: the dashboard page and the map it embeds.
pub mod map;
pub mod page;
