use eframe::egui;

/// Frame styled as a tab. Returns the click response of the whole frame.
pub fn tab_style_button(
    ui: &mut egui::Ui,
    id_source: impl std::hash::Hash,
    is_active: bool,
    add_contents: impl FnOnce(&mut egui::Ui),
) -> egui::Response {
    // Define colors
    let (mut fill, text_color) = if is_active {
        (
            ui.visuals().widgets.active.bg_fill,
            ui.visuals().widgets.active.fg_stroke.color,
        )
    } else {
        (
            ui.visuals().widgets.noninteractive.bg_fill,
            ui.visuals().widgets.inactive.fg_stroke.color,
        )
    };

    // Create a unique ID for this tab's interaction
    let id = ui.make_persistent_id(id_source);

    // Highlight on hover if not active. Hover state is from the previous frame.
    let was_hovered = ui.ctx().read_response(id).is_some_and(|r| r.hovered());
    if was_hovered && !is_active {
        fill = ui.visuals().widgets.hovered.bg_fill;
    }

    let response = egui::Frame::new()
        .fill(fill)
        .corner_radius(4.0)
        .inner_margin(egui::Margin::symmetric(10, 4))
        .show(ui, |ui| {
            // Ensure text doesn't steal focus/hover from the frame
            ui.style_mut().interaction.selectable_labels = false;

            // Set the default text color for this block
            ui.visuals_mut().override_text_color = Some(text_color);

            add_contents(ui);
        })
        .response;

    // Manual click handling for the frame area
    ui.interact(response.rect, id, egui::Sense::click())
}
