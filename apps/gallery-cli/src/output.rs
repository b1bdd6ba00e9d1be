use std::fmt::Write as _;

use gallery_core::{GalleryEvent, PageSnapshot};

/// Render one runtime event for stdout.
pub fn render_event(event: &GalleryEvent) -> String {
    match event {
        GalleryEvent::PageLoaded(snapshot) => render_page(snapshot),
        GalleryEvent::SelectionChanged { selected_ids } => {
            format!("selected: {}", render_ids(selected_ids))
        }
        GalleryEvent::PhotoUploaded(photo) => {
            format!("uploaded photo {} ({})", photo.id, photo.url)
        }
        GalleryEvent::FetchFailed { code, message, .. } => {
            format!("could not load page ({code}): {message}; keeping previous page")
        }
        GalleryEvent::CommandRejected { message, .. } => format!("rejected: {message}"),
    }
}

fn render_page(snapshot: &PageSnapshot) -> String {
    let mut out = format!(
        "-- page {} ({} of {} photos) --\n",
        snapshot.page_num,
        snapshot.photos.len(),
        snapshot.page_size
    );
    for photo in &snapshot.photos {
        let mark = if snapshot.selected_ids.contains(&photo.id) {
            "[x]"
        } else {
            "[ ]"
        };
        let _ = writeln!(out, "{mark} {:>5}  {}  {}", photo.id, photo.title, photo.url);
    }
    let _ = write!(
        out,
        "{}{}",
        if snapshot.has_previous { "<prev " } else { "" },
        if snapshot.has_next { "next>" } else { "(end)" }
    );
    out
}

fn render_ids(ids: &[i64]) -> String {
    if ids.is_empty() {
        return "none".to_owned();
    }
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::Photo;

    fn photo(id: i64) -> Photo {
        Photo {
            id,
            title: format!("P{id}"),
            description: String::new(),
            url: format!("https://x/{id}"),
            user: 1,
        }
    }

    #[test]
    fn renders_page_with_selection_marks() {
        let snapshot = PageSnapshot {
            page_num: 2,
            page_size: 2,
            photos: vec![photo(5), photo(6)],
            selected_ids: vec![6],
            has_previous: true,
            has_next: true,
        };
        let text = render_page(&snapshot);

        assert!(text.starts_with("-- page 2 (2 of 2 photos) --"));
        assert!(text.contains("[ ]     5  P5  https://x/5"));
        assert!(text.contains("[x]     6  P6  https://x/6"));
        assert!(text.ends_with("<prev next>"));
    }

    #[test]
    fn short_page_shows_end_marker() {
        let mut snapshot = PageSnapshot::empty(4);
        snapshot.photos = vec![photo(1)];
        assert!(render_page(&snapshot).ends_with("(end)"));
    }

    #[test]
    fn renders_selection_changes() {
        let event = GalleryEvent::SelectionChanged {
            selected_ids: vec![],
        };
        assert_eq!(render_event(&event), "selected: none");
    }
}
