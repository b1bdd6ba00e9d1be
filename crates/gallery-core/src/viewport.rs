/// Page size used before any viewport width is known.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Photos per page for a viewport width, matching the grid breakpoints.
pub fn page_size_for_width(width_px: u32) -> u32 {
    match width_px {
        992.. => 12,
        768.. => 9,
        576.. => 6,
        _ => 4,
    }
}
