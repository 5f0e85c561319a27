use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::filter::NumericRange;
use crate::state::{AppState, Category};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Titanic Dashboard");
    ui.label(RichText::new("Pick filters to explore the data.").small());
    ui.separator();

    let table = match &state.table {
        Some(t) => t,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the closures.
    let total = table.len();
    let classes: Vec<u8> = table.classes.iter().copied().collect();
    let sexes = table.sexes.clone();
    let ports = table.ports.clone();
    let age_bounds = table.age_bounds.map(|(lo, hi)| (lo.floor(), hi.ceil()));
    let fare_bounds = table.fare_bounds;
    let family_bounds = table.family_bounds;

    ui.label(format!("Total passengers: {total}"));
    ui.add_space(4.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Categorical multiselects (collapsible) ----
            let class_items: Vec<(String, bool)> = classes
                .iter()
                .map(|c| (c.to_string(), state.filters.classes.contains(c)))
                .collect();
            match multiselect(ui, "Class", &class_items) {
                Some(Pick::All) => state.select_all(Category::Class),
                Some(Pick::Clear) => state.clear(Category::Class),
                Some(Pick::Toggle(i)) => state.toggle_class(classes[i]),
                None => {}
            }

            let sex_items: Vec<(String, bool)> = sexes
                .iter()
                .map(|s| (s.clone(), state.filters.sexes.contains(s)))
                .collect();
            match multiselect(ui, "Sex", &sex_items) {
                Some(Pick::All) => state.select_all(Category::Sex),
                Some(Pick::Clear) => state.clear(Category::Sex),
                Some(Pick::Toggle(i)) => state.toggle_sex(&sexes[i]),
                None => {}
            }

            let port_items: Vec<(String, bool)> = ports
                .iter()
                .map(|p| (p.clone(), state.filters.ports.contains(p)))
                .collect();
            match multiselect(ui, "Port of embarkation", &port_items) {
                Some(Pick::All) => state.select_all(Category::Port),
                Some(Pick::Clear) => state.clear(Category::Port),
                Some(Pick::Toggle(i)) => state.toggle_port(&ports[i]),
                None => {}
            }
            ui.separator();

            // ---- Range sliders ----
            let mut changed = false;
            if let Some((lo, hi)) = age_bounds {
                ui.strong("Age");
                changed |= range_sliders(ui, &mut state.filters.age, lo..=hi, Some(1.0));
            }
            if let Some((lo, hi)) = fare_bounds {
                ui.strong("Fare");
                changed |= range_sliders(ui, &mut state.filters.fare, lo..=hi, None);
            }

            ui.strong("Family aboard (siblings/spouses + parents/children)");
            let (fam_lo, fam_hi) = family_bounds;
            let family = &mut state.filters.family_size;
            changed |= ui
                .add(Slider::new(&mut family.lo, fam_lo..=fam_hi).text("from"))
                .changed();
            changed |= ui
                .add(Slider::new(&mut family.hi, fam_lo..=fam_hi).text("to"))
                .changed();
            if family.lo > family.hi {
                family.hi = family.lo;
            }
            ui.separator();

            // ---- Missing-value options ----
            changed |= ui
                .checkbox(&mut state.filters.drop_missing_age, "Exclude missing age")
                .changed();
            changed |= ui
                .checkbox(&mut state.filters.drop_missing_port, "Exclude missing port")
                .changed();

            if changed {
                state.refilter();
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
            if let Some(dash) = &state.dashboard {
                ui.label(
                    RichText::new(format!("Rows after filtering: {}", dash.view.len()))
                        .color(Color32::from_rgb(60, 140, 80)),
                );
            }
        });
}

/// What the user did in a multiselect this frame.
enum Pick {
    All,
    Clear,
    Toggle(usize),
}

/// Collapsible checkbox list for one categorical field; `items` are
/// `(label, selected)` pairs.
fn multiselect(ui: &mut Ui, title: &str, items: &[(String, bool)]) -> Option<Pick> {
    let n_selected = items.iter().filter(|(_, selected)| *selected).count();
    let header_text = format!("{title}  ({n_selected}/{})", items.len());
    let mut pick = None;

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    pick = Some(Pick::All);
                }
                if ui
                    .small_button("Clear")
                    .on_hover_text("An empty selection does not filter this field")
                    .clicked()
                {
                    pick = Some(Pick::Clear);
                }
            });

            for (i, (label, selected)) in items.iter().enumerate() {
                let mut checked = *selected;
                if ui.checkbox(&mut checked, label.as_str()).changed() {
                    pick = Some(Pick::Toggle(i));
                }
            }
        });

    pick
}

/// Paired "from"/"to" sliders over a float range. Returns whether either moved.
fn range_sliders(
    ui: &mut Ui,
    range: &mut NumericRange<f64>,
    bounds: RangeInclusive<f64>,
    step: Option<f64>,
) -> bool {
    let mut from = Slider::new(&mut range.lo, bounds.clone()).text("from");
    let mut to = Slider::new(&mut range.hi, bounds).text("to");
    if let Some(step) = step {
        from = from.step_by(step);
        to = to.step_by(step);
    }
    let changed = ui.add(from).changed() | ui.add(to).changed();
    if range.lo > range.hi {
        range.hi = range.lo;
    }
    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(dash)) = (&state.table, &state.dashboard) {
            ui.label(format!(
                "{} passengers loaded, {} visible",
                table.len(),
                dash.view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open passenger data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
