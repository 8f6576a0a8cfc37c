//! Display formatting for ranked hydrants.

use std::fmt::Write as _;

use hydrant_map_hydrant_models::{Coordinate, DisplayEntry, RankedHydrant};

/// Header line of the chat caption.
pub const CAPTION_HEADER: &str = "Ближайшие гидранты:";

/// Caption used when no hydrant was selected.
pub const EMPTY_CAPTION: &str = "Рядом не найдено ни одного гидранта.";

/// Zoom level of deep links.
const LINK_ZOOM: u8 = 18;

/// Yandex Maps deep link with a pin on `coordinate`.
#[must_use]
pub fn map_link(coordinate: &Coordinate) -> String {
    format!(
        "https://yandex.ru/maps/?pt={},{}&z={LINK_ZOOM}",
        coordinate.longitude(),
        coordinate.latitude()
    )
}

/// Turns ranked hydrants into numbered display entries.
#[must_use]
pub fn format_entries(ranked: &[RankedHydrant<'_>]) -> Vec<DisplayEntry> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, r)| DisplayEntry {
            rank: i + 1,
            label: r.record.label.clone(),
            distance_meters: r.geodesic_meters,
            link_url: map_link(&r.record.coordinate),
        })
        .collect()
}

/// Markdown caption listing each entry as a link with its distance.
#[must_use]
pub fn caption(entries: &[DisplayEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_CAPTION.to_string();
    }

    let mut out = CAPTION_HEADER.to_string();
    for entry in entries {
        let _ = write!(
            out,
            "\n[Гидрант {} — {} м]({})",
            entry.rank, entry.distance_meters, entry.link_url
        );
    }
    out
}
