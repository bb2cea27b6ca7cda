use ratatui::layout::Rect;

/// A `percent_x` × `height` rectangle centered in `area`, clipped to it.
pub fn center_popup(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = centered_width(area.width, percent_x);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// `percent` of `total`, at least 20 columns when that fits.
pub fn centered_width(total: u16, percent: u16) -> u16 {
    let scaled = (u32::from(total) * u32::from(percent.min(100)) / 100) as u16;
    scaled.max(20).min(total)
}
