use chartwork::charts::{ChartKind, TreemapDataset};
use chartwork::physics::{Phase, Simulation, StopReason};
use std::ops::RangeInclusive;

use eframe::egui::{self, Align, Context, Layout, RichText};

/// Reaches the network chart's default of -400 with room either side.
const CHARGE_RANGE: RangeInclusive<f32> = -1000.0..=0.0;

/// Button pressed in the simulation panel this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SimulationAction {
    Reheat,
    Stop,
}

/// Chart tabs, plus dataset sub-tabs while a treemap is active. Returns the
/// chart the user picked, if it differs from `active`.
pub(super) fn navigation_bar(ctx: &Context, active: ChartKind, busy: bool) -> Option<ChartKind> {
    let mut picked = None;
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            for kind in tab_kinds() {
                let selected = kind.label() == active.label();
                if ui.selectable_label(selected, kind.label()).clicked() && !selected {
                    picked = Some(kind);
                }
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if busy {
                    ui.spinner();
                }
            });
        });

        if let ChartKind::Treemap(current) = active {
            ui.horizontal(|ui| {
                for which in TreemapDataset::ALL {
                    if ui
                        .selectable_label(which == current, which.label())
                        .clicked()
                        && which != current
                    {
                        picked = Some(ChartKind::Treemap(which));
                    }
                }
            });
        }
    });
    picked
}

/// One tab per chart; the treemaps share the first dataset's tab.
fn tab_kinds() -> impl Iterator<Item = ChartKind> {
    ChartKind::ALL.into_iter().filter(|kind| {
        !matches!(
            kind,
            ChartKind::Treemap(TreemapDataset::Movies | TreemapDataset::VideoGames)
        )
    })
}

/// Live force settings for the network chart.
pub(super) fn simulation_panel(ctx: &Context, simulation: &mut Simulation) -> Option<SimulationAction> {
    let mut action = None;
    egui::SidePanel::left("controls")
        .resizable(true)
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.heading("Simulation");
            ui.add_space(6.0);

            let mut settings = simulation.settings();
            let mut changed = false;
            changed |= ui
                .add(
                    egui::Slider::new(&mut settings.charge_strength, CHARGE_RANGE)
                        .text("Charge")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Many-body strength; negative values push nodes apart.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut settings.link_distance, 5.0..=200.0)
                        .text("Link distance")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Rest length of every link, in pixels.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut settings.alpha_decay, 0.001..=0.2)
                        .logarithmic(true)
                        .text("Decay")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("How quickly the layout cools each tick.")
                .changed();

            if changed && let Err(error) = simulation.update_settings(settings) {
                log::warn!("rejected simulation settings: {error}");
            }

            ui.add_space(10.0);
            let cancelled = simulation.phase() == Phase::Stopped(StopReason::Cancelled);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!cancelled, egui::Button::new("Reheat"))
                    .on_hover_text("Warm the layout up again.")
                    .clicked()
                {
                    action = Some(SimulationAction::Reheat);
                }
                if ui
                    .add_enabled(!cancelled, egui::Button::new("Stop"))
                    .on_hover_text("Freeze the layout for good.")
                    .clicked()
                {
                    action = Some(SimulationAction::Stop);
                }
            });

            ui.add_space(10.0);
            ui.collapsing("Status", |ui| {
                let phase = match simulation.phase() {
                    Phase::Running => "running",
                    Phase::Settling => "settling",
                    Phase::Stopped(StopReason::Settled) => "settled",
                    Phase::Stopped(StopReason::Cancelled) => "stopped",
                };
                ui.label(RichText::new(format!("Phase: {phase}")).monospace());
                ui.label(RichText::new(format!("Alpha: {:.4}", simulation.alpha())).monospace());
                ui.label(RichText::new(format!("Ticks: {}", simulation.ticks())).monospace());
            });
        });
    action
}
