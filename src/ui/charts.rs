use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Stroke, Ui};
use egui_extras::{Column, Size, StripBuilder, TableBuilder};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotPoints, Points};

use crate::color::{self, ColorMap};
use crate::data::aggregate::{AgeBin, GroupBy, GroupRate};
use crate::state::{AppState, Dashboard};

// ---------------------------------------------------------------------------
// Main area: three columns (1.5 : 4.5 : 2)
// ---------------------------------------------------------------------------

/// Render the dashboard in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(dash) = &state.dashboard else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a passenger file to begin  (File → Open…)");
        });
        return;
    };

    StripBuilder::new(ui)
        .size(Size::relative(1.5 / 8.0))
        .size(Size::relative(4.5 / 8.0))
        .size(Size::remainder())
        .horizontal(|mut strip| {
            strip.cell(|ui| {
                ScrollArea::vertical()
                    .id_salt("summary_column")
                    .show(ui, |ui| summary_column(ui, dash, state));
            });
            strip.cell(|ui| {
                ScrollArea::vertical()
                    .id_salt("distribution_column")
                    .show(ui, |ui| distribution_column(ui, dash, state));
            });
            strip.cell(|ui| {
                ScrollArea::vertical()
                    .id_salt("ranking_column")
                    .show(ui, |ui| ranking_column(ui, dash, state));
            });
        });
}

// ---------------------------------------------------------------------------
// Left column: headline metrics and group rates
// ---------------------------------------------------------------------------

fn summary_column(ui: &mut Ui, dash: &Dashboard, state: &AppState) {
    ui.heading("📊 Summary");

    let s = &dash.summary;
    let pct = |p: Option<f64>| p.map_or_else(|| "no data".to_string(), |v| format!("{v:.1}%"));
    metric(ui, "Passengers", s.total.to_string(), None);
    metric(ui, "Survived", s.survived.to_string(), Some(pct(s.survived_pct())));
    metric(ui, "Died", s.died.to_string(), Some(pct(s.died_pct())));

    ui.separator();
    ui.strong("Survival rate by sex (%)");
    rate_chart(ui, "sex_rate", &dash.by_sex, state.colors.get(GroupBy::Sex));

    ui.separator();
    ui.strong("Survival rate by class (%)");
    rate_chart(ui, "class_rate", &dash.by_class, state.colors.get(GroupBy::Class));
}

/// A centred metric card with an optional delta line.
fn metric(ui: &mut Ui, label: &str, value: String, delta: Option<String>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(label).strong());
            ui.label(RichText::new(value).size(22.0));
            if let Some(delta) = delta {
                ui.label(RichText::new(delta).small());
            }
        });
    });
}

/// Bar chart of one group-rate table, one coloured bar per key.
fn rate_chart(ui: &mut Ui, id: &str, rates: &[GroupRate], colors: &ColorMap) {
    if rates.is_empty() {
        ui.label("No data");
        return;
    }

    let bars: Vec<Bar> = rates
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.rate)
                .name(format!("{} ({} passengers)", g.key, g.count))
                .fill(colors.color_for(&g.key))
        })
        .collect();
    let labels: Vec<String> = rates.iter().map(|g| g.key.to_string()).collect();

    Plot::new(id)
        .height(180.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .include_y(0.0)
        .include_y(100.0)
        .y_axis_label("Survival rate (%)")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.6));
        });
}

/// Axis label for a bar placed at an integer position.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Middle column: heatmap, age histogram, fare box plot
// ---------------------------------------------------------------------------

fn distribution_column(ui: &mut Ui, dash: &Dashboard, state: &AppState) {
    ui.heading("🗺️ Distributions");

    ui.strong("Survival rate (%) by age band × class");
    heatmap(ui, dash, state.config.age_bin_width, state.config.age_bin_count);

    ui.separator();
    ui.strong("Age distribution by outcome");
    age_histogram(ui, dash);

    ui.separator();
    ui.strong("Fare by class and outcome");
    fare_box_plot(ui, dash);
}

fn heatmap(ui: &mut Ui, dash: &Dashboard, width: u32, count: u32) {
    if dash.heatmap.is_empty() {
        ui.label("No passengers with a known age");
        return;
    }

    let cells: BTreeMap<(u8, u32), (f64, usize)> = dash
        .heatmap
        .iter()
        .map(|c| ((c.class, c.bin.lo), (c.rate, c.count)))
        .collect();
    let classes: Vec<u8> = {
        let mut v: Vec<u8> = dash.heatmap.iter().map(|c| c.class).collect();
        v.dedup();
        v
    };
    let bins: Vec<AgeBin> = (0..count).map(|i| AgeBin { lo: i * width, width }).collect();

    egui::Grid::new("age_class_heatmap")
        .spacing([2.0, 2.0])
        .min_col_width(42.0)
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new("Class").small());
            for bin in &bins {
                ui.label(RichText::new(bin.label()).small());
            }
            ui.end_row();

            for class in &classes {
                ui.label(class.to_string());
                for bin in &bins {
                    match cells.get(&(*class, bin.lo)) {
                        Some(&(rate, n)) => {
                            let fill = color::heat_color(rate);
                            let text = if rate > 60.0 { Color32::WHITE } else { Color32::BLACK };
                            ui.label(
                                RichText::new(format!("{rate:.0}"))
                                    .background_color(fill)
                                    .color(text)
                                    .monospace(),
                            )
                            .on_hover_text(format!(
                                "Class {class}, age {}: {rate:.1}% of {n}",
                                bin.label()
                            ));
                        }
                        None => {
                            ui.label(RichText::new("–").weak());
                        }
                    }
                }
                ui.end_row();
            }
        });
}

fn age_histogram(ui: &mut Ui, dash: &Dashboard) {
    if dash.age_histogram.is_empty() {
        ui.label("No passengers with a known age");
        return;
    }

    let series = |survived: bool, fill: Color32| {
        let bars: Vec<Bar> = dash
            .age_histogram
            .iter()
            .map(|b| {
                let n = if survived { b.survived } else { b.died };
                Bar::new(b.center(), n as f64).width(b.width()).fill(fill)
            })
            .collect();
        BarChart::new(bars)
            .name(if survived { "Survived" } else { "Died" })
            .color(fill)
    };

    Plot::new("age_histogram")
        .height(240.0)
        .legend(Legend::default())
        .x_axis_label("Age")
        .y_axis_label("Passengers")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(series(false, color::DIED.gamma_multiply(0.7)));
            plot_ui.bar_chart(series(true, color::SURVIVED.gamma_multiply(0.7)));
        });
}

fn fare_box_plot(ui: &mut Ui, dash: &Dashboard) {
    if dash.fare_spread.is_empty() {
        ui.label("No passengers with a known fare");
        return;
    }

    let mut died = Vec::new();
    let mut survived = Vec::new();
    let mut outliers: Vec<[f64; 2]> = Vec::new();

    for s in &dash.fare_spread {
        let (offset, stroke_color, target) = if s.survived {
            (0.2, color::SURVIVED, &mut survived)
        } else {
            (-0.2, color::DIED, &mut died)
        };
        let x = s.class as f64 + offset;
        target.push(
            BoxElem::new(
                x,
                BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
            )
            .name(format!("Class {}", s.class))
            .box_width(0.35)
            .whisker_width(0.2)
            .fill(stroke_color.gamma_multiply(0.4))
            .stroke(Stroke::new(1.5, stroke_color)),
        );
        outliers.extend(s.outliers.iter().map(|&fare| [x, fare]));
    }

    Plot::new("fare_box_plot")
        .height(240.0)
        .legend(Legend::default())
        .x_axis_label("Class")
        .y_axis_label("Fare")
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(died).name("Died"));
            plot_ui.box_plot(BoxPlot::new(survived).name("Survived"));
            plot_ui.points(
                Points::new(PlotPoints::from(outliers))
                    .name("Outliers")
                    .radius(2.0)
                    .color(Color32::GRAY),
            );
        });
}

// ---------------------------------------------------------------------------
// Right column: rankings and details
// ---------------------------------------------------------------------------

fn ranking_column(ui: &mut Ui, dash: &Dashboard, state: &AppState) {
    ui.heading("🏆 Rankings");

    ui.strong(format!(
        "Top {} family sizes by survival rate",
        state.config.top_families
    ));
    rate_chart(
        ui,
        "family_rate",
        &dash.top_families,
        state.colors.get(GroupBy::FamilySize),
    );

    ui.separator();
    ui.strong(format!("Top {} fares", state.config.top_fares));
    fare_table(ui, dash);

    ui.separator();
    ui.strong("Survival rate by port (%)");
    rate_chart(ui, "port_rate", &dash.by_port, state.colors.get(GroupBy::Port));

    ui.separator();
    about(ui);
}

fn fare_table(ui: &mut Ui, dash: &Dashboard) {
    if dash.top_fares.is_empty() {
        ui.label("No data");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::remainder().clip(true))
        .column(Column::auto())
        .column(Column::auto())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Name");
            });
            header.col(|ui| {
                ui.strong("Fare");
            });
            header.col(|ui| {
                ui.strong("Outcome");
            });
        })
        .body(|mut body| {
            for row in &dash.top_fares {
                body.row(18.0, |mut tr| {
                    tr.col(|ui| {
                        ui.label(row.name.as_str()).on_hover_text(row.name.as_str());
                    });
                    tr.col(|ui| {
                        ui.label(format!("{:.2}", row.fare));
                    });
                    tr.col(|ui| {
                        let (text, c) = if row.survived {
                            ("Survived", color::SURVIVED)
                        } else {
                            ("Died", color::DIED)
                        };
                        ui.label(RichText::new(text).color(c));
                    });
                });
            }
        });
}

fn about(ui: &mut Ui) {
    ui.heading("ℹ️ About");
    ui.label("Dataset: Titanic passenger survival (Kaggle Titanic challenge).");
    ui.add_space(4.0);
    for line in [
        "Pclass: ticket class (1 = upper, 3 = lower)",
        "Sex, Age",
        "SibSp: siblings / spouses aboard",
        "Parch: parents / children aboard",
        "Fare: ticket fare",
        "Embarked: port (C = Cherbourg, Q = Queenstown, S = Southampton)",
        "Survived: 0 = died, 1 = survived",
    ] {
        ui.label(RichText::new(format!("• {line}")).small());
    }
    ui.add_space(4.0);
    ui.label("Explore how age, sex, class, family, fare and port relate to survival.");
}
