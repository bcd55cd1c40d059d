use chartwork::charts::{ChartKind, ChartView};
use chartwork::interaction::{HoverMachine, HoverState, hit_test};
use chartwork::scene::Heading;
use eframe::egui::{self, Color32, Context, Id, Order, RichText, Sense, Ui};

use super::controls::{SimulationAction, simulation_panel};
use super::painter::ScenePainter;

/// A built chart and the per-frame state around it.
pub(super) struct ChartPane {
    kind: ChartKind,
    chart: Box<dyn ChartView>,
    hover: HoverMachine,
    painter: ScenePainter,
}

impl ChartPane {
    pub(super) fn new(kind: ChartKind, chart: Box<dyn ChartView>) -> Self {
        Self {
            kind,
            chart,
            hover: HoverMachine::new(),
            painter: ScenePainter::default(),
        }
    }

    pub(super) fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Cancels live layout before the pane is replaced.
    pub(super) fn stop(&mut self) {
        self.hover.leave();
        self.chart.stop();
    }

    pub(super) fn show(&mut self, ctx: &Context) {
        let action = self
            .chart
            .simulation_mut()
            .and_then(|simulation| simulation_panel(ctx, simulation));
        match action {
            Some(SimulationAction::Reheat) => {
                if let Some(simulation) = self.chart.simulation_mut() {
                    let target = simulation.settings().reheat_target;
                    simulation.reheat(target);
                }
            }
            Some(SimulationAction::Stop) => self.stop(),
            None => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().auto_shrink(false).show(ui, |ui| {
                show_heading(ui, &self.chart.scene().heading);
                ui.add_space(8.0);
                self.canvas(ui);
            });
        });

        if self.chart.is_animating() {
            ctx.request_repaint();
        }
    }

    fn canvas(&mut self, ui: &mut Ui) {
        if self.chart.is_animating() {
            self.chart.tick();
        }

        let size = self.chart.scene().size;
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        let origin = rect.min.to_vec2();

        if response.drag_started()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let local = pointer - origin;
            if let Some(mark) = hit_test(self.chart.scene().hit_regions(), local) {
                self.chart.drag_start(mark, local);
            }
        }
        if response.dragged()
            && self.chart.dragged().is_some()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.chart.drag_move(pointer - origin);
        }
        if response.drag_stopped() {
            self.chart.drag_end();
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::WHITE);
        self.painter
            .paint(&painter, origin, self.chart.scene(), self.chart.revision());

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .map(|pointer| pointer - origin);
        let chart = &self.chart;
        self.hover.update(
            pointer,
            chart.scene().hit_regions(),
            chart.dragged(),
            |mark| chart.tooltip(mark),
        );

        if let HoverState::Showing {
            content, anchor, ..
        } = self.hover.state()
        {
            egui::Area::new(Id::new("chart_tooltip"))
                .order(Order::Tooltip)
                .fixed_pos(*anchor + origin)
                .interactable(false)
                .show(ui.ctx(), |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        let mut lines = content.lines.iter();
                        if let Some(first) = lines.next() {
                            ui.label(RichText::new(first).strong());
                        }
                        for line in lines {
                            ui.label(line);
                        }
                    });
                });
        }
    }
}

fn show_heading(ui: &mut Ui, heading: &Heading) {
    ui.vertical_centered(|ui| {
        ui.heading(RichText::new(&heading.title).strong());
        if let Some(subtitle) = &heading.subtitle {
            ui.label(subtitle);
        }
        for note in &heading.notes {
            ui.label(RichText::new(note).small().weak());
        }
    });
}
