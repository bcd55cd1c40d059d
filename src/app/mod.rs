use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use chartwork::charts::{ChartKind, assemble};
use chartwork::config::ConfigFile;
use chartwork::data::{Dataset, load_dataset};
use eframe::egui::{self, Context};

mod controls;
mod painter;
mod pane;
mod tessellate;

use pane::ChartPane;

pub struct ChartworkApp {
    data_dir: PathBuf,
    config: ConfigFile,
    active: ChartKind,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ChartPane>),
    Error(String),
}

impl ChartworkApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        data_dir: PathBuf,
        config: ConfigFile,
        initial: ChartKind,
    ) -> Self {
        let state = Self::start_load(data_dir.clone(), initial);
        Self {
            data_dir,
            config,
            active: initial,
            state,
        }
    }

    fn spawn_load(data_dir: PathBuf, kind: ChartKind) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(&data_dir, kind.dataset_file())
                .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_dir: PathBuf, kind: ChartKind) -> AppState {
        log::info!("loading {}", kind.label());
        AppState::Loading {
            rx: Self::spawn_load(data_dir, kind),
        }
    }

    fn build(config: &ConfigFile, kind: ChartKind, dataset: &Dataset) -> AppState {
        let chart = config
            .resolve(kind)
            .and_then(|config| assemble(kind, dataset, &config));
        match chart {
            Ok(chart) => AppState::Ready(Box::new(ChartPane::new(kind, chart))),
            Err(error) => {
                log::error!("failed to build {}: {error}", kind.label());
                AppState::Error(error.to_string())
            }
        }
    }
}

impl eframe::App for ChartworkApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        let busy = matches!(self.state, AppState::Loading { .. });
        if let Some(kind) = controls::navigation_bar(ctx, self.active, busy) {
            if let AppState::Ready(pane) = &mut self.state {
                log::debug!("leaving {}", pane.kind().label());
                pane.stop();
            }
            self.active = kind;
            transition = Some(Self::start_load(self.data_dir.clone(), kind));
            ctx.request_repaint();
        }

        match &mut self.state {
            AppState::Loading { rx } if transition.is_none() => {
                match rx.try_recv() {
                    Ok(Ok(dataset)) => {
                        transition = Some(Self::build(&self.config, self.active, &dataset));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading {}...", self.active.label()));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Loading { .. } => {}
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading(format!("Failed to load {}", self.active.label()));
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_dir.clone(), self.active));
                    }
                });
            }
            AppState::Ready(pane) => pane.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
